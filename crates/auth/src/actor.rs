use serde::{Deserialize, Serialize};

use stockline_core::{CompanyId, UserId};

use crate::Role;

/// A fully resolved, authenticated caller.
///
/// Everything an operation needs to know about who is acting: identity,
/// the company whose data they may touch, and their role within it.
/// Construction is decoupled from transport; the API layer builds actors
/// from bearer tokens, tests build them directly.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub company_id: CompanyId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, company_id: CompanyId, role: Role) -> Self {
        Self {
            user_id,
            company_id,
            role,
        }
    }
}
