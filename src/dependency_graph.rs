use std::{any::TypeId, collections::HashSet};

use crate::{
    errors::ResolveError,
    key::KeyRegistry,
    provider::Provider,
    reflector::Reflector,
    resolve::resolve_reflective_providers,
    token::Token,
    types::TypeInfo,
};

/// Walks constructor dependencies to collect the full transitive class
/// set reachable from a group of roots.
pub struct ReflectiveDependencyResolver;

impl ReflectiveDependencyResolver {
    /// Returns every class reachable from `roots` via constructor
    /// dependencies, each at most once, in first-discovery order.
    ///
    /// Optional dependencies are not treated specially: an optional but
    /// unbound class still appears in the output, so the result is a
    /// superset of what a concrete injector will actually construct.
    /// Because dependencies are expanded dynamically, the output is
    /// unsuitable for tree-shaking-style static analysis. Tokens that
    /// are not classes carry no constructor and are not expanded.
    ///
    /// The visited set guarantees termination even when class
    /// declarations form cycles through forward references.
    pub fn resolve(
        roots: &[TypeInfo],
        reflector: &Reflector,
        registry: &KeyRegistry,
    ) -> Result<Vec<TypeInfo>, ResolveError> {
        let mut visited = HashSet::new();
        let mut classes = Vec::new();
        for root in roots {
            visit(*root, reflector, registry, &mut visited, &mut classes)?;
        }
        return Ok(classes);

        fn visit(
            class: TypeInfo,
            reflector: &Reflector,
            registry: &KeyRegistry,
            visited: &mut HashSet<TypeId>,
            classes: &mut Vec<TypeInfo>,
        ) -> Result<(), ResolveError> {
            if !visited.insert(class.type_id) {
                return Ok(());
            }
            classes.push(class);

            let providers =
                resolve_reflective_providers(vec![Provider::Type(class)], reflector, registry)?;
            for provider in &providers {
                for factory in &provider.resolved_factories {
                    for dependency in &factory.dependencies {
                        if let Token::Class(next) = &dependency.key.token {
                            visit(*next, reflector, registry, visited, classes)?;
                        }
                    }
                }
            }
            Ok(())
        }
    }
}
