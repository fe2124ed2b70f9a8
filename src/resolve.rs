use std::fmt;

use indexmap::IndexMap;

use crate::{
    errors::ResolveError,
    factory::{resolve_reflective_factory, ResolvedFactory},
    key::{KeyRegistry, ReflectiveKey},
    provider::{normalize, NormalizedProvider, Provider},
    reflector::Reflector,
};

/// A key-addressed provider with its resolved factories.
///
/// A regular provider holds exactly one factory; a multi provider
/// accumulates one per registration sharing the token.
#[derive(Clone)]
pub struct ResolvedProvider {
    pub key: ReflectiveKey,
    pub resolved_factories: Vec<ResolvedFactory>,
    pub multi_provider: bool,
}

impl ResolvedProvider {
    /// First (and for regular providers, only) factory.
    pub fn resolved_factory(&self) -> &ResolvedFactory {
        &self.resolved_factories[0]
    }

    /// Copies the factory list so the merger can append to its own
    /// entry without mutating a caller-owned provider.
    pub fn shallow_clone(&self) -> ResolvedProvider {
        ResolvedProvider {
            key: self.key.clone(),
            resolved_factories: self.resolved_factories.clone(),
            multi_provider: self.multi_provider,
        }
    }
}

impl fmt::Debug for ResolvedProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedProvider")
            .field("token", &self.key.token)
            .field("factories", &self.resolved_factories.len())
            .field("multi", &self.multi_provider)
            .finish()
    }
}

/// Table from token key id to provider, in first-registration order.
pub type ResolvedProviderMap = IndexMap<usize, ResolvedProvider>;

/// Wraps one normalized provider with its token key and multiplicity.
pub fn resolve_provider(
    provider: &NormalizedProvider,
    reflector: &Reflector,
    registry: &KeyRegistry,
) -> Result<ResolvedProvider, ResolveError> {
    Ok(ResolvedProvider {
        key: registry.get(provider.provide()),
        resolved_factories: vec![resolve_reflective_factory(provider, reflector, registry)?],
        multi_provider: provider.multi(),
    })
}

/// Merges resolved providers into a table where each key is contained
/// exactly once.
///
/// Multi registrations for one token concatenate their factories in
/// registration order; for regular providers the later registration
/// replaces the earlier one. A token registered both ways is a
/// configuration error. Input order therefore decides both the final
/// multi ordering and the scalar override winner, so base providers
/// must be merged before overriding ones.
pub fn merge_resolved_providers(
    providers: Vec<ResolvedProvider>,
    mut table: ResolvedProviderMap,
) -> Result<ResolvedProviderMap, ResolveError> {
    for provider in providers {
        match table.get_mut(&provider.key.id) {
            Some(existing) => {
                if provider.multi_provider != existing.multi_provider {
                    return Err(ResolveError::MixingMultiProvidersWithRegularProviders {
                        existing: Box::new(existing.clone()),
                        conflicting: Box::new(provider),
                    });
                }
                if provider.multi_provider {
                    existing.resolved_factories.extend(provider.resolved_factories);
                } else {
                    // Last registration wins for scalar bindings
                    *existing = provider;
                }
            }
            None => {
                // Multi providers are cloned on insert: later merges
                // push into the stored entry, never the caller's.
                let id = provider.key.id;
                let entry = if provider.multi_provider {
                    provider.shallow_clone()
                } else {
                    provider
                };
                table.insert(id, entry);
            }
        }
    }
    Ok(table)
}

/// Resolves a raw provider list into merged, key-unique providers in
/// first-registration order. Entry point for injector construction.
pub fn resolve_reflective_providers(
    providers: Vec<Provider>,
    reflector: &Reflector,
    registry: &KeyRegistry,
) -> Result<Vec<ResolvedProvider>, ResolveError> {
    let normalized = normalize(providers);
    tracing::debug!(providers = normalized.len(), "resolving provider list");
    let resolved = normalized
        .iter()
        .map(|provider| resolve_provider(provider, reflector, registry))
        .collect::<Result<Vec<_>, _>>()?;
    let table = merge_resolved_providers(resolved, ResolvedProviderMap::new())?;
    Ok(table.into_values().collect())
}
