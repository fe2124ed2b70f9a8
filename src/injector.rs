use std::{
    collections::HashMap,
    fmt,
    sync::{Arc, Mutex},
};

use crate::{
    dependency::{ReflectiveDependency, Visibility},
    errors::{RequireError, ResolveError},
    factory::ResolvedFactory,
    key::{KeyRegistry, ReflectiveKey},
    provider::Provider,
    reflector::Reflector,
    resolve::{resolve_reflective_providers, ResolvedProvider, ResolvedProviderMap},
    token::Token,
    types::{Injectable, Instance},
};

/// What a lookup does when the token has no binding anywhere in the
/// injector hierarchy.
#[derive(Clone)]
pub enum NotFound {
    /// Fail with [`RequireError::NoProvider`]
    Throw,
    /// Return this value instead
    Value(Instance),
}

/// Lookup contract shared by the whole injector hierarchy.
pub trait Injector: Send + Sync {
    /// Retrieves an instance for `token`, falling back per `not_found`.
    fn get_with(&self, token: &Token, not_found: NotFound) -> Result<Instance, RequireError>;

    /// Retrieves an instance for `token`, failing if it has no binding.
    fn get(&self, token: &Token) -> Result<Instance, RequireError> {
        self.get_with(token, NotFound::Throw)
    }

    /// Retrieves an instance for `token`, returning `not_found_value`
    /// when it has no binding.
    fn get_or(&self, token: &Token, not_found_value: Instance) -> Result<Instance, RequireError> {
        self.get_with(token, NotFound::Value(not_found_value))
    }
}

/// Base case of every injector hierarchy: fails every lookup unless the
/// caller supplied a fallback value.
#[derive(Default)]
pub struct NullInjector;

impl Injector for NullInjector {
    fn get_with(&self, token: &Token, not_found: NotFound) -> Result<Instance, RequireError> {
        match not_found {
            NotFound::Throw => Err(RequireError::NoProvider(token.clone())),
            NotFound::Value(value) => Ok(value),
        }
    }
}

/// Injector over a merged resolved-provider table.
///
/// Instances are constructed lazily on first request, walking each
/// factory's dependency descriptors, and cached per injector instance.
/// Lookups that miss the local table continue at the parent; the
/// hierarchy bottoms out at [`NullInjector`].
pub struct ReflectiveInjector {
    parent: Arc<dyn Injector>,
    registry: Arc<KeyRegistry>,
    providers: ResolvedProviderMap,
    /// Singletons constructed by this injector, by key id
    instances: Mutex<HashMap<usize, Instance>>,
    /// Keys currently under construction, for cycle detection
    constructing: Mutex<Vec<ReflectiveKey>>,
}

impl fmt::Debug for ReflectiveInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_struct("ReflectiveInjector");
        for provider in self.providers.values() {
            let state = if self
                .instances
                .lock()
                .unwrap()
                .contains_key(&provider.key.id)
            {
                "constructed"
            } else {
                "pending"
            };
            map.field(&provider.key.token.to_string(), &state);
        }
        map.finish()
    }
}

impl ReflectiveInjector {
    /// Resolves `providers` and creates an injector owning the merged
    /// table.
    pub fn resolve_and_create(
        providers: Vec<Provider>,
        reflector: &Reflector,
        registry: Arc<KeyRegistry>,
    ) -> Result<ReflectiveInjector, ResolveError> {
        let resolved = resolve_reflective_providers(providers, reflector, &registry)?;
        Ok(Self::from_resolved_providers(resolved, registry))
    }

    /// Creates an injector from already-resolved providers.
    pub fn from_resolved_providers(
        resolved: Vec<ResolvedProvider>,
        registry: Arc<KeyRegistry>,
    ) -> ReflectiveInjector {
        Self::with_parent(resolved, registry, Arc::new(NullInjector))
    }

    /// Child injector: lookups missing in the child fall back to this
    /// injector.
    pub fn resolve_and_create_child(
        self: Arc<Self>,
        providers: Vec<Provider>,
        reflector: &Reflector,
    ) -> Result<ReflectiveInjector, ResolveError> {
        let resolved = resolve_reflective_providers(providers, reflector, &self.registry)?;
        let registry = self.registry.clone();
        Ok(Self::with_parent(resolved, registry, self as Arc<dyn Injector>))
    }

    fn with_parent(
        resolved: Vec<ResolvedProvider>,
        registry: Arc<KeyRegistry>,
        parent: Arc<dyn Injector>,
    ) -> ReflectiveInjector {
        let mut providers = ResolvedProviderMap::new();
        for provider in resolved {
            providers.insert(provider.key.id, provider);
        }
        ReflectiveInjector {
            parent,
            registry,
            providers,
            instances: Mutex::new(HashMap::new()),
            constructing: Mutex::new(Vec::new()),
        }
    }

    /// Typed lookup: retrieves the instance bound to `T`'s class token
    /// and downcasts it.
    pub fn require<T: Injectable>(&self) -> Result<Arc<T>, RequireError> {
        let instance = self.get(&Token::of::<T>())?;
        instance
            .downcast()
            .map_err(|actual_type| RequireError::DowncastFailed {
                required_type: std::any::type_name::<T>(),
                actual_type,
            })
    }

    fn get_by_key(
        &self,
        key: &ReflectiveKey,
        visibility: Option<Visibility>,
        not_found: NotFound,
    ) -> Result<Instance, RequireError> {
        if visibility == Some(Visibility::SkipSelf) {
            return self.parent.get_with(&key.token, not_found);
        }
        if let Some(provider) = self.providers.get(&key.id) {
            return self.construct_provider(provider);
        }
        if visibility == Some(Visibility::OnlySelf) {
            return match not_found {
                NotFound::Throw => Err(RequireError::NoProvider(key.token.clone())),
                NotFound::Value(value) => Ok(value),
            };
        }
        self.parent.get_with(&key.token, not_found)
    }

    fn construct_provider(&self, provider: &ResolvedProvider) -> Result<Instance, RequireError> {
        {
            let instances = self.instances.lock().unwrap();
            if let Some(instance) = instances.get(&provider.key.id) {
                return Ok(instance.clone());
            }
        }

        self.enter(&provider.key)?;
        let result = if provider.multi_provider {
            provider
                .resolved_factories
                .iter()
                .map(|factory| self.instantiate(&provider.key, factory))
                .collect::<Result<Vec<Instance>, _>>()
                .map(Instance::new)
        } else {
            self.instantiate(&provider.key, provider.resolved_factory())
        };
        self.leave();

        let instance = result?;
        self.instances
            .lock()
            .unwrap()
            .insert(provider.key.id, instance.clone());
        Ok(instance)
    }

    fn instantiate(
        &self,
        key: &ReflectiveKey,
        factory: &ResolvedFactory,
    ) -> Result<Instance, RequireError> {
        let mut args = Vec::with_capacity(factory.dependencies.len());
        for dependency in &factory.dependencies {
            args.push(self.resolve_dependency(dependency)?);
        }
        tracing::debug!(token = %key.token, "constructing instance");
        (factory.factory)(args).map_err(|error| RequireError::FactoryFailed {
            token: key.token.clone(),
            error: Arc::new(error),
        })
    }

    /// An optional dependency degrades to `None` when its own token is
    /// unbound, or when requesting it would close a construction cycle
    /// on that token. Failures deeper in the dependency's own
    /// construction are real misconfigurations and propagate.
    fn resolve_dependency(
        &self,
        dependency: &ReflectiveDependency,
    ) -> Result<Option<Instance>, RequireError> {
        let result = self.get_by_key(&dependency.key, dependency.visibility, NotFound::Throw);
        if !dependency.optional {
            return result.map(Some);
        }
        match result {
            Ok(instance) => Ok(Some(instance)),
            Err(RequireError::NoProvider(token)) if token == dependency.key.token => Ok(None),
            Err(RequireError::CircularDependency { chain })
                if chain.last() == Some(&dependency.key.token) =>
            {
                Ok(None)
            }
            Err(error) => Err(error),
        }
    }

    fn enter(&self, key: &ReflectiveKey) -> Result<(), RequireError> {
        let mut constructing = self.constructing.lock().unwrap();
        if let Some(start) = constructing.iter().position(|entry| entry.id == key.id) {
            // Outer frames that merely depend on the cycle are not
            // part of it; the chain starts at the re-entrant key.
            let mut chain: Vec<Token> = constructing[start..]
                .iter()
                .map(|entry| entry.token.clone())
                .collect();
            chain.push(key.token.clone());
            return Err(RequireError::CircularDependency { chain });
        }
        constructing.push(key.clone());
        Ok(())
    }

    fn leave(&self) {
        self.constructing.lock().unwrap().pop();
    }
}

impl Injector for ReflectiveInjector {
    fn get_with(&self, token: &Token, not_found: NotFound) -> Result<Instance, RequireError> {
        let key = self.registry.get(token);
        self.get_by_key(&key, None, not_found)
    }
}
