//! Login credentials and the configurable role gate applied at login.
//!
//! Inbound payload parsing stays outside the domain; handlers build
//! [`LoginCredentials`] through the validating constructor before talking to
//! the account service.

use std::collections::BTreeSet;
use std::fmt;

use zeroize::Zeroizing;

use super::Role;

/// Domain error returned when login payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Password was blank.
    EmptyPassword,
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
        }
    }
}

impl std::error::Error for LoginValidationError {}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is trimmed, lowercased and non-empty.
/// - `password` is non-empty; surrounding whitespace is preserved.
///
/// # Examples
/// ```
/// use dispatch::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" Ana@Example.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "ana@example.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = email.trim();
        if normalized.is_empty() {
            return Err(LoginValidationError::EmptyEmail);
        }
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }
        Ok(Self {
            email: normalized.to_lowercase(),
            password: Zeroizing::new(password.to_owned()),
        })
    }

    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Roles allowed to open a session.
///
/// `POST /login` admits any role in the set; `POST /login/{role}` additionally
/// insists the account holds exactly that role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginPolicy {
    accepted: BTreeSet<Role>,
}

/// Why a login was refused after the password matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginDenial {
    /// The account role is not accepted by this deployment.
    RoleNotAccepted(Role),
    /// The endpoint required a different role.
    RoleMismatch { required: Role, actual: Role },
}

impl LoginPolicy {
    /// Build a policy from the accepted roles. An empty list accepts every role.
    #[must_use]
    pub fn new(accepted: impl IntoIterator<Item = Role>) -> Self {
        let mut accepted: BTreeSet<Role> = accepted.into_iter().collect();
        if accepted.is_empty() {
            accepted.extend(Role::ALL);
        }
        Self { accepted }
    }

    #[must_use]
    pub fn accepts(&self, role: Role) -> bool {
        self.accepted.contains(&role)
    }

    pub fn check(&self, actual: Role, required: Option<Role>) -> Result<(), LoginDenial> {
        match required {
            Some(required) if required != actual => {
                return Err(LoginDenial::RoleMismatch { required, actual });
            }
            _ => {}
        }
        if !self.accepts(actual) {
            return Err(LoginDenial::RoleNotAccepted(actual));
        }
        Ok(())
    }
}

impl Default for LoginPolicy {
    fn default() -> Self {
        Self::new(Role::ALL)
    }
}

impl fmt::Display for LoginDenial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RoleNotAccepted(role) => write!(f, "role {role} may not log in here"),
            Self::RoleMismatch { required, .. } => write!(f, "this login requires role {required}"),
        }
    }
}
