use std::{any::TypeId, collections::HashMap, sync::Arc};

use crate::{
    token::{InjectionToken, Token, TokenRef},
    types::{DynError, Injectable, Instance, ProviderFactory, TypeInfo},
};

/// One annotation attached to a constructor parameter slot.
///
/// These are the tagged stand-ins for the decorator values a reflective
/// metadata system would record: token-bearing entries select what to
/// inject, marker entries adjust optionality and visibility.
#[derive(Clone, Debug)]
pub enum Annotation {
    /// Raw class reference
    Type(TypeInfo),
    /// Injection-token reference
    Token(InjectionToken),
    /// Literal value used as a token
    Literal(String),
    /// Explicit-inject wrapper; overrides any previously scanned token
    Inject(TokenRef),
    /// Marks the dependency as optional
    Optional,
    /// Restricts resolution to the requesting injector
    OnlySelf,
    /// Resolution starts at the parent injector
    SkipSelf,
}

impl Annotation {
    pub fn ty<T: 'static>() -> Self {
        Annotation::Type(TypeInfo::of::<T>())
    }

    pub fn token(token: InjectionToken) -> Self {
        Annotation::Token(token)
    }

    pub fn literal(value: impl Into<String>) -> Self {
        Annotation::Literal(value.into())
    }

    pub fn inject(token: impl Into<TokenRef>) -> Self {
        Annotation::Inject(token.into())
    }

    /// Explicit-inject wrapper with a deferred token supplier.
    pub fn inject_forward(supplier: impl Fn() -> Token + Send + Sync + 'static) -> Self {
        Annotation::Inject(TokenRef::forward(supplier))
    }
}

struct ClassMetadata {
    parameters: Option<Vec<Option<Vec<Annotation>>>>,
    factory: ProviderFactory,
}

/// Explicit stand-in for runtime constructor reflection.
///
/// Injectable classes register their per-parameter annotation lists and
/// a constructor wrapper here; the dependency extractor and the factory
/// resolver read them back.
#[derive(Default)]
pub struct Reflector {
    classes: HashMap<TypeId, ClassMetadata>,
}

impl Reflector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `T` with one annotation list per constructor parameter
    /// and a constructor wrapper invoked positionally with the resolved
    /// arguments.
    pub fn register<T, F>(&mut self, params: Vec<Vec<Annotation>>, construct: F)
    where
        T: Injectable,
        F: Fn(Vec<Option<Instance>>) -> Result<Instance, DynError> + Send + Sync + 'static,
    {
        self.register_raw::<T, F>(Some(params.into_iter().map(Some).collect()), construct);
    }

    /// Full-fidelity registration: `None` parameter metadata means no
    /// metadata was recorded at all (zero-arg assumption downstream),
    /// while a `None` slot marks a parameter without annotations, which
    /// the extractor rejects as a configuration error.
    pub fn register_raw<T, F>(
        &mut self,
        parameters: Option<Vec<Option<Vec<Annotation>>>>,
        construct: F,
    ) where
        T: Injectable,
        F: Fn(Vec<Option<Instance>>) -> Result<Instance, DynError> + Send + Sync + 'static,
    {
        self.classes.insert(
            TypeId::of::<T>(),
            ClassMetadata {
                parameters,
                factory: Arc::new(construct),
            },
        );
    }

    /// Per-parameter annotation lists recorded for `class`, or `None`
    /// when no metadata exists.
    pub fn parameters(&self, class: &TypeInfo) -> Option<&[Option<Vec<Annotation>>]> {
        self.classes
            .get(&class.type_id)
            .and_then(|metadata| metadata.parameters.as_deref())
    }

    /// Constructor wrapper for `class`.
    ///
    /// An unregistered class still resolves, so the dependency graph
    /// walk can enumerate leaf classes nobody registered; the returned
    /// factory reports the missing registration only when invoked.
    pub fn factory(&self, class: &TypeInfo) -> ProviderFactory {
        match self.classes.get(&class.type_id) {
            Some(metadata) => metadata.factory.clone(),
            None => {
                let type_name = class.type_name;
                Arc::new(move |_args| {
                    Err(format!("no constructor registered for '{type_name}'").into())
                })
            }
        }
    }
}
