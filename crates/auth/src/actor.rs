use serde::{Deserialize, Serialize};

use motocrm_core::UserId;

use crate::Role;

/// An authenticated caller, as resolved by the transport layer.
///
/// Construction is intentionally decoupled from storage and transport: the
/// API layer derives this from its token claims and hands it to every
/// operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
