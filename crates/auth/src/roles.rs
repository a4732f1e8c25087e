use serde::{Deserialize, Serialize};

/// Role of an authenticated user.
///
/// The set is closed: the funnel has a fixed staff hierarchy, so roles are an
/// enum rather than opaque strings. Wire spellings match the upstream
/// identity provider (`SUPER_ADMIN`, `ASESOR`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    SuperAdmin,
    Admin,
    Coordinador,
    Auxiliar,
    Asesor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::SuperAdmin => "SUPER_ADMIN",
            Role::Admin => "ADMIN",
            Role::Coordinador => "COORDINADOR",
            Role::Auxiliar => "AUXILIAR",
            Role::Asesor => "ASESOR",
        }
    }

    /// Whether this role manages the funnel (sees every customer, may assign
    /// advisors). Advisors only ever see their own portfolio.
    pub fn is_supervisor(&self) -> bool {
        matches!(self, Role::SuperAdmin | Role::Admin | Role::Coordinador)
    }
}

impl core::fmt::Display for Role {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}
