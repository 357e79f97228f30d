//! Request-scoped identity, injected by the auth middleware.

use stockline_auth::Actor;

/// The authenticated caller, attached to request extensions once the
/// bearer token has been resolved. Handlers extract it with
/// `Extension<ActorContext>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorContext {
    actor: Actor,
}

impl ActorContext {
    pub fn new(actor: Actor) -> Self {
        Self { actor }
    }

    pub fn actor(&self) -> Actor {
        self.actor
    }
}
