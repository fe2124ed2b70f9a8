use std::sync::Arc;

use thiserror::Error;

use crate::{resolve::ResolvedProvider, token::Token, types::DynError};

/// Errors raised while normalizing, resolving and merging providers.
///
/// All of these are configuration errors: they surface synchronously at
/// resolution time and are never retried or suppressed.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// A constructor parameter has no resolvable token metadata
    #[error("Cannot resolve all parameters for '{class}' ({params}). Make sure every parameter carries resolvable injection metadata.")]
    NoAnnotation { class: String, params: String },

    /// A token is registered both as a multi provider and as a regular
    /// provider across the merged set
    #[error("Cannot mix multi providers and regular providers: {existing:?} conflicts with {conflicting:?}")]
    MixingMultiProvidersWithRegularProviders {
        existing: Box<ResolvedProvider>,
        conflicting: Box<ResolvedProvider>,
    },

    /// A class provider's `use_class` resolved to a non-class token
    #[error("useClass for '{provide}' must reference an injectable class, got '{actual}'")]
    InvalidUseClass { provide: Token, actual: Token },
}

/// Errors when requesting an instance from an injector
#[derive(Error, Debug, Clone)]
pub enum RequireError {
    #[error("No provider for {0}!")]
    NoProvider(Token),

    #[error("Circular dependency detected: {}", display_chain(.chain))]
    CircularDependency { chain: Vec<Token> },

    /// The provider factory itself failed during instantiation
    #[error("Factory for '{token}' failed - error: {error:?}")]
    FactoryFailed { token: Token, error: Arc<DynError> },

    #[error("Failed to downcast, required: '{required_type}' actual: '{actual_type}'")]
    DowncastFailed {
        required_type: &'static str,
        actual_type: &'static str,
    },
}

pub(crate) fn display_chain(chain: &[Token]) -> String {
    chain
        .iter()
        .map(Token::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}
