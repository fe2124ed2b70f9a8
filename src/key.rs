use std::{collections::HashMap, sync::Mutex};

use crate::token::Token;

/// Key assigned to a binding token. The `id` is stable for the lifetime
/// of the registry that produced it, so it can serve as a map key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReflectiveKey {
    pub token: Token,
    pub id: usize,
}

/// Assigns every distinct token a stable integer identity, enabling
/// map lookups instead of identity scans.
///
/// One registry per injection universe; it is passed explicitly to the
/// resolver components so tests never share key state. Keys are never
/// evicted.
#[derive(Default)]
pub struct KeyRegistry {
    // Key creation is a read-then-maybe-insert race under concurrent use
    keys: Mutex<HashMap<Token, usize>>,
}

impl KeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the key for `token`, creating one on first request.
    /// Repeated calls with the same token identity yield the same id.
    pub fn get(&self, token: &Token) -> ReflectiveKey {
        let mut keys = self.keys.lock().unwrap();
        let next = keys.len();
        let id = *keys.entry(token.clone()).or_insert(next);
        ReflectiveKey {
            token: token.clone(),
            id,
        }
    }

    /// Number of distinct tokens registered so far.
    pub fn len(&self) -> usize {
        self.keys.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
