use std::sync::Arc;

use crate::{
    dependency::{construct_dependencies, dependencies_for, ReflectiveDependency},
    errors::ResolveError,
    key::KeyRegistry,
    provider::NormalizedProvider,
    reflector::Reflector,
    token::{resolve_forward_ref, Token},
    types::{DynError, Instance, ProviderFactory},
};

/// A factory function together with the dependencies to resolve for its
/// arguments, in constructor parameter order. Callers invoke `factory`
/// positionally with the resolved values.
#[derive(Clone)]
pub struct ResolvedFactory {
    pub factory: ProviderFactory,
    pub dependencies: Vec<ReflectiveDependency>,
}

impl std::fmt::Debug for ResolvedFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFactory")
            .field("factory", &"<factory>")
            .field("dependencies", &self.dependencies)
            .finish()
    }
}

/// Resolves one normalized provider into its factory/dependency pair.
/// Pure; no instance is constructed here.
pub fn resolve_reflective_factory(
    provider: &NormalizedProvider,
    reflector: &Reflector,
    registry: &KeyRegistry,
) -> Result<ResolvedFactory, ResolveError> {
    match provider {
        NormalizedProvider::Class(provider) => {
            let token = resolve_forward_ref(&provider.use_class);
            let Token::Class(class) = token else {
                return Err(ResolveError::InvalidUseClass {
                    provide: provider.provide.clone(),
                    actual: token,
                });
            };
            Ok(ResolvedFactory {
                factory: reflector.factory(&class),
                dependencies: dependencies_for(class, reflector, registry)?,
            })
        }
        NormalizedProvider::Existing(provider) => {
            let token = resolve_forward_ref(&provider.use_existing);
            let key = registry.get(&token);
            // Identity over the single aliased argument
            let factory: ProviderFactory =
                Arc::new(|args: Vec<Option<Instance>>| -> Result<Instance, DynError> {
                    args.into_iter()
                        .next()
                        .flatten()
                        .ok_or_else(|| "alias dependency was not supplied".into())
                });
            Ok(ResolvedFactory {
                factory,
                dependencies: vec![ReflectiveDependency::from_key(key)],
            })
        }
        NormalizedProvider::Factory(provider) => {
            // An omitted deps list means a dependency-free factory; a
            // closure has no parameter metadata to fall back on.
            let dependencies = match &provider.deps {
                Some(deps) => {
                    construct_dependencies(&provider.provide.to_string(), deps, registry)?
                }
                None => Vec::new(),
            };
            Ok(ResolvedFactory {
                factory: provider.use_factory.clone(),
                dependencies,
            })
        }
        NormalizedProvider::Value(provider) => {
            let value = provider.use_value.clone();
            let factory: ProviderFactory = Arc::new(move |_args| Ok(value.clone()));
            Ok(ResolvedFactory {
                factory,
                dependencies: Vec::new(),
            })
        }
    }
}
