//! `motocrm-auth` — roles, capabilities and the authorization policy.
//!
//! Token issuance and transport-level authentication are out of scope; this
//! crate only answers "may this role perform this operation?" as a pure,
//! centralized policy check consumed by every mutation path.

pub mod actor;
pub mod capability;
pub mod roles;

pub use actor::Actor;
pub use capability::{allows, authorize, required_roles, AuthzError, Capability};
pub use roles::Role;
