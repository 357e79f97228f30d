use std::collections::HashMap;

use crate::Actor;

/// Token-to-actor registry backing bearer authentication.
///
/// The directory is immutable after construction; the API layer builds it
/// at startup (from seed data or configuration) and resolves the bearer
/// token of each request against it. An unknown token means the request is
/// unauthenticated, which the transport maps to 401.
#[derive(Debug, Default)]
pub struct TokenDirectory {
    tokens: HashMap<String, Actor>,
}

impl TokenDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, token: impl Into<String>, actor: Actor) {
        self.tokens.insert(token.into(), actor);
    }

    pub fn resolve(&self, token: &str) -> Option<Actor> {
        self.tokens.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
