//! Reflective dependency-injection container.
//!
//! Providers declare how to produce a value for a token (class, value,
//! factory or alias binding). [`resolve_reflective_providers`] turns a
//! raw provider list into a normalized, merged, key-addressed table,
//! and a [`ReflectiveInjector`] built over that table lazily constructs
//! instances along the dependency chain, caching singletons per
//! injector and honoring optionality and visibility markers.
//!
//! Rust has no ambient reflection over constructor parameters, so
//! injectable classes register their per-parameter annotations and a
//! constructor wrapper with a [`Reflector`] up front:
//!
//! ```
//! use std::sync::Arc;
//! use reflective_di::{
//!     Annotation, Instance, KeyRegistry, Provider, Reflector, ReflectiveInjector,
//! };
//!
//! struct Engine;
//! struct Car {
//!     engine: Arc<Engine>,
//! }
//!
//! let mut reflector = Reflector::new();
//! reflector.register::<Engine, _>(Vec::new(), |_args| Ok(Instance::new(Engine)));
//! reflector.register::<Car, _>(vec![vec![Annotation::ty::<Engine>()]], |mut args| {
//!     let engine = args
//!         .remove(0)
//!         .ok_or("engine missing")?
//!         .downcast::<Engine>()
//!         .map_err(|_| "engine had the wrong type")?;
//!     Ok(Instance::new(Car { engine }))
//! });
//!
//! let registry = Arc::new(KeyRegistry::new());
//! let injector = ReflectiveInjector::resolve_and_create(
//!     vec![Provider::of::<Engine>(), Provider::of::<Car>()],
//!     &reflector,
//!     registry,
//! )
//! .unwrap();
//!
//! let car = injector.require::<Car>().unwrap();
//! let engine = injector.require::<Engine>().unwrap();
//! assert!(Arc::ptr_eq(&car.engine, &engine));
//! ```

pub mod dependency;
pub mod dependency_graph;
pub mod errors;
pub mod factory;
pub mod injector;
pub mod key;
pub mod provider;
pub mod reflector;
pub mod resolve;
pub mod token;
pub mod types;

pub use dependency::{construct_dependencies, dependencies_for, ReflectiveDependency, Visibility};
pub use dependency_graph::ReflectiveDependencyResolver;
pub use errors::{RequireError, ResolveError};
pub use factory::{resolve_reflective_factory, ResolvedFactory};
pub use injector::{Injector, NotFound, NullInjector, ReflectiveInjector};
pub use key::{KeyRegistry, ReflectiveKey};
pub use provider::{
    normalize, ClassProvider, ExistingProvider, FactoryProvider, NormalizedProvider, Provider,
    ValueProvider,
};
pub use reflector::{Annotation, Reflector};
pub use resolve::{
    merge_resolved_providers, resolve_provider, resolve_reflective_providers, ResolvedProvider,
    ResolvedProviderMap,
};
pub use token::{resolve_forward_ref, InjectionToken, Token, TokenRef};
pub use types::{DynError, Injectable, Instance, ProviderFactory, TypeInfo};
