//! Roles and the resolved identity of an authenticated caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::{TechnicianId, UserId};

/// Role attribute stored on every user account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Technician,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::User, Role::Technician, Role::Admin];

    /// Stable lowercase token used in storage and URLs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Technician => "technician",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raised when a role token is not one of the known roles.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Ok(Self::User),
            "technician" => Ok(Self::Technician),
            "admin" => Ok(Self::Admin),
            other => Err(UnknownRole(other.to_owned())),
        }
    }
}

/// Authenticated principal as seen by the workflow engine.
///
/// `technician_id` is only ever populated for [`Role::Technician`] callers
/// with a technician profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    user_id: UserId,
    role: Role,
    technician_id: Option<TechnicianId>,
}

impl Actor {
    #[must_use]
    pub fn user(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::User,
            technician_id: None,
        }
    }

    #[must_use]
    pub fn admin(user_id: UserId) -> Self {
        Self {
            user_id,
            role: Role::Admin,
            technician_id: None,
        }
    }

    #[must_use]
    pub fn technician(user_id: UserId, technician_id: Option<TechnicianId>) -> Self {
        Self {
            user_id,
            role: Role::Technician,
            technician_id,
        }
    }

    /// Build an actor from a stored role, dropping a profile id that does not
    /// belong to a technician.
    #[must_use]
    pub fn from_parts(user_id: UserId, role: Role, technician_id: Option<TechnicianId>) -> Self {
        match role {
            Role::Technician => Self::technician(user_id, technician_id),
            Role::Admin => Self::admin(user_id),
            Role::User => Self::user(user_id),
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn technician_id(&self) -> Option<TechnicianId> {
        self.technician_id
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("user", Role::User)]
    #[case(" Technician ", Role::Technician)]
    #[case("ADMIN", Role::Admin)]
    fn parses_role_tokens(#[case] raw: &str, #[case] expected: Role) {
        assert_eq!(raw.parse::<Role>(), Ok(expected));
    }

    #[rstest]
    fn rejects_unknown_role() {
        assert_eq!("owner".parse::<Role>(), Err(UnknownRole("owner".into())));
    }

    #[rstest]
    fn non_technicians_never_carry_profile_ids() {
        let actor = Actor::from_parts(UserId::new(1), Role::Admin, Some(TechnicianId::new(4)));
        assert_eq!(actor.technician_id(), None);
        assert!(actor.is_admin());

        let tech = Actor::from_parts(UserId::new(2), Role::Technician, Some(TechnicianId::new(4)));
        assert_eq!(tech.technician_id(), Some(TechnicianId::new(4)));
    }
}
