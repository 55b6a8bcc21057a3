//! User accounts and registration input.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use zeroize::Zeroizing;

use super::{Role, UserId};

/// Maximum length of names and email addresses.
pub const USER_TEXT_MAX: usize = 255;
/// Minimum password length accepted at registration.
pub const PASSWORD_MIN: usize = 8;

/// Validation errors returned by [`NewUserAccount::try_new`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyName,
    NameTooLong { max: usize },
    InvalidEmail,
    EmailTooLong { max: usize },
    PasswordTooShort { min: usize },
}

impl UserValidationError {
    /// Request field the error refers to.
    #[must_use]
    pub fn field(&self) -> &'static str {
        match self {
            Self::EmptyName | Self::NameTooLong { .. } => "name",
            Self::InvalidEmail | Self::EmailTooLong { .. } => "email",
            Self::PasswordTooShort { .. } => "password",
        }
    }
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyName => write!(f, "name must not be empty"),
            Self::NameTooLong { max } => write!(f, "name must be at most {max} characters"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmailTooLong { max } => write!(f, "email must be at most {max} characters"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Optional contact fields captured at registration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ContactDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dni: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
}

impl ContactDetails {
    /// Drop blank values so storage never holds empty strings.
    #[must_use]
    pub fn normalised(self) -> Self {
        fn clean(value: Option<String>) -> Option<String> {
            value
                .map(|v| v.trim().to_owned())
                .filter(|v| !v.is_empty())
        }
        Self {
            dni: clean(self.dni),
            phone: clean(self.phone),
            address: clean(self.address),
            city: clean(self.city),
        }
    }
}

/// Persisted user account as exposed to callers. Never carries the password
/// digest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    #[schema(value_type = i64)]
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(flatten)]
    pub contact: ContactDetails,
    pub created_at: DateTime<Utc>,
}

/// Account row together with its stored password digest, used for login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredCredentials {
    pub account: UserAccount,
    pub password_hash: String,
}

/// Validated registration input.
///
/// ## Invariants
/// - `name` is trimmed, non-empty and at most [`USER_TEXT_MAX`] characters.
/// - `email` is trimmed, lowercased, contains `@` and is at most
///   [`USER_TEXT_MAX`] characters.
/// - `password` has at least [`PASSWORD_MIN`] characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserAccount {
    name: String,
    email: String,
    password: Zeroizing<String>,
    contact: ContactDetails,
}

impl NewUserAccount {
    pub fn try_new(
        name: &str,
        email: &str,
        password: &str,
        contact: ContactDetails,
    ) -> Result<Self, UserValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(UserValidationError::EmptyName);
        }
        if name.chars().count() > USER_TEXT_MAX {
            return Err(UserValidationError::NameTooLong { max: USER_TEXT_MAX });
        }

        let email = email.trim().to_lowercase();
        if email.chars().count() > USER_TEXT_MAX {
            return Err(UserValidationError::EmailTooLong { max: USER_TEXT_MAX });
        }
        if !is_plausible_email(&email) {
            return Err(UserValidationError::InvalidEmail);
        }

        if password.chars().count() < PASSWORD_MIN {
            return Err(UserValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }

        Ok(Self {
            name: name.to_owned(),
            email,
            password: Zeroizing::new(password.to_owned()),
            contact: contact.normalised(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn password(&self) -> &str {
        self.password.as_str()
    }

    pub fn contact(&self) -> &ContactDetails {
        &self.contact
    }

    /// Pair the account with its role and password digest for persistence.
    #[must_use]
    pub fn into_record(self, role: Role, password_hash: String) -> NewUserRecord {
        NewUserRecord {
            name: self.name,
            email: self.email,
            role,
            contact: self.contact,
            password_hash,
        }
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && !domain.is_empty() && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

/// Row to insert into the user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUserRecord {
    pub name: String,
    pub email: String,
    pub role: Role,
    pub contact: ContactDetails,
    pub password_hash: String,
}
