use std::sync::Arc;

use crate::{
    reflector::Annotation,
    token::{Token, TokenRef},
    types::{DynError, Injectable, Instance, ProviderFactory, TypeInfo},
};

/// A declaration describing how to produce a value for a token.
#[derive(Clone, Debug)]
pub enum Provider {
    /// Bare-class shorthand for `{provide: C, use_class: C}`
    Type(TypeInfo),
    Class(ClassProvider),
    Value(ValueProvider),
    Factory(FactoryProvider),
    Existing(ExistingProvider),
}

/// Binds a token to a class whose constructor produces the value
#[derive(Clone, Debug)]
pub struct ClassProvider {
    pub provide: Token,
    pub use_class: TokenRef,
    pub multi: bool,
}

/// Binds a token to an already-constructed value
#[derive(Clone, Debug)]
pub struct ValueProvider {
    pub provide: Token,
    pub use_value: Instance,
    pub multi: bool,
}

/// Binds a token to a factory function with an optional explicit
/// dependency list
#[derive(Clone)]
pub struct FactoryProvider {
    pub provide: Token,
    pub use_factory: ProviderFactory,
    pub deps: Option<Vec<Vec<Annotation>>>,
    pub multi: bool,
}

impl std::fmt::Debug for FactoryProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FactoryProvider")
            .field("provide", &self.provide)
            .field("deps", &self.deps)
            .field("multi", &self.multi)
            .finish()
    }
}

/// Aliases a token to an existing binding
#[derive(Clone, Debug)]
pub struct ExistingProvider {
    pub provide: Token,
    pub use_existing: TokenRef,
    pub multi: bool,
}

impl Provider {
    /// Shorthand provider for a registered class.
    pub fn of<T: 'static>() -> Provider {
        Provider::Type(TypeInfo::of::<T>())
    }

    pub fn class(provide: impl Into<Token>, use_class: impl Into<TokenRef>) -> Provider {
        Provider::Class(ClassProvider {
            provide: provide.into(),
            use_class: use_class.into(),
            multi: false,
        })
    }

    pub fn value(provide: impl Into<Token>, value: impl Injectable) -> Provider {
        Provider::Value(ValueProvider {
            provide: provide.into(),
            use_value: Instance::new(value),
            multi: false,
        })
    }

    pub fn factory<F>(
        provide: impl Into<Token>,
        deps: Option<Vec<Vec<Annotation>>>,
        factory: F,
    ) -> Provider
    where
        F: Fn(Vec<Option<Instance>>) -> Result<Instance, DynError> + Send + Sync + 'static,
    {
        Provider::Factory(FactoryProvider {
            provide: provide.into(),
            use_factory: Arc::new(factory),
            deps,
            multi: false,
        })
    }

    pub fn existing(provide: impl Into<Token>, use_existing: impl Into<TokenRef>) -> Provider {
        Provider::Existing(ExistingProvider {
            provide: provide.into(),
            use_existing: use_existing.into(),
            multi: false,
        })
    }

    /// Flags the provider to accumulate multiple factories under one
    /// token. The bare-class shorthand carries no multi flag.
    pub fn multi(mut self) -> Provider {
        match &mut self {
            Provider::Type(_) => {}
            Provider::Class(provider) => provider.multi = true,
            Provider::Value(provider) => provider.multi = true,
            Provider::Factory(provider) => provider.multi = true,
            Provider::Existing(provider) => provider.multi = true,
        }
        self
    }
}

/// A provider rewritten into one of the four canonical shapes.
#[derive(Clone, Debug)]
pub enum NormalizedProvider {
    Class(ClassProvider),
    Value(ValueProvider),
    Factory(FactoryProvider),
    Existing(ExistingProvider),
}

impl NormalizedProvider {
    pub fn provide(&self) -> &Token {
        match self {
            NormalizedProvider::Class(provider) => &provider.provide,
            NormalizedProvider::Value(provider) => &provider.provide,
            NormalizedProvider::Factory(provider) => &provider.provide,
            NormalizedProvider::Existing(provider) => &provider.provide,
        }
    }

    pub fn multi(&self) -> bool {
        match self {
            NormalizedProvider::Class(provider) => provider.multi,
            NormalizedProvider::Value(provider) => provider.multi,
            NormalizedProvider::Factory(provider) => provider.multi,
            NormalizedProvider::Existing(provider) => provider.multi,
        }
    }
}

/// Rewrites convenience shorthand into canonical provider shapes.
///
/// Pure and order-preserving, one output per input. No legality checks
/// happen here; malformed declarations surface when the factory
/// resolver runs.
pub fn normalize(providers: Vec<Provider>) -> Vec<NormalizedProvider> {
    providers
        .into_iter()
        .map(|provider| match provider {
            Provider::Type(class) => NormalizedProvider::Class(ClassProvider {
                provide: Token::Class(class),
                use_class: TokenRef::Concrete(Token::Class(class)),
                multi: false,
            }),
            Provider::Class(provider) => NormalizedProvider::Class(provider),
            Provider::Value(provider) => NormalizedProvider::Value(provider),
            Provider::Factory(provider) => NormalizedProvider::Factory(provider),
            Provider::Existing(provider) => NormalizedProvider::Existing(provider),
        })
        .collect()
}
