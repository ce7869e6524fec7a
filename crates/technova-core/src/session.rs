//! Session and sign-in
//!
//! At most one user is signed in at a time. Sign-in goes through the
//! [`Authenticator`] trait; the portal ships only [`MockAuthenticator`],
//! which accepts any well-formed credentials without checking a password.
//! It exists for local use and demos and must not guard anything real.

use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::models::ValidationError;

/// Avatar service used for generated profile pictures
const AVATAR_ENDPOINT: &str = "https://ui-avatars.com/api/";

/// The signed-in user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Session identifier, fresh for every sign-in
    pub id: String,
    /// Display name
    pub username: String,
    pub email: String,
    /// Avatar image URL
    pub avatar: String,
}

/// What the sign-in form collects
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub email: String,
    pub password: String,
    /// Display name; required when registering, optional otherwise
    pub username: Option<String>,
    /// Creating a new account rather than signing in
    pub register: bool,
}

impl Credentials {
    /// Sign in with an existing account
    pub fn login(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            username: None,
            register: false,
        }
    }

    /// Register a new account
    pub fn register(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
            username: Some(username.into()),
            register: true,
        }
    }

    /// Check that every field the form requires is filled in
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.email.trim().is_empty() {
            return Err(ValidationError::MissingField("email"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::MissingField("password"));
        }
        if self.register && self.username().is_none() {
            return Err(ValidationError::MissingField("username"));
        }
        Ok(())
    }

    /// The username, if one was given and is not blank
    pub fn username(&self) -> Option<&str> {
        self.username
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }

    /// Name shown for the user: the username, or the local part of the email
    pub fn display_name(&self) -> String {
        match self.username() {
            Some(name) => name.to_string(),
            None => {
                let email = self.email.trim();
                email.split('@').next().unwrap_or(email).to_string()
            }
        }
    }
}

/// Errors raised during sign-in
#[derive(Error, Debug)]
pub enum AuthError {
    /// A required field was blank
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// The authenticator refused the credentials
    #[error("Sign-in rejected: {0}")]
    Rejected(String),
}

/// Verifies credentials and produces the session user
pub trait Authenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError>;
}

/// Accepts every well-formed set of credentials
///
/// No password is checked and nothing is stored server-side.
#[derive(Debug, Clone, Copy, Default)]
pub struct MockAuthenticator;

impl Authenticator for MockAuthenticator {
    fn authenticate(&self, credentials: &Credentials) -> Result<User, AuthError> {
        credentials.validate()?;

        let avatar_name = credentials
            .username()
            .unwrap_or_else(|| credentials.email.trim());

        Ok(User {
            id: Uuid::new_v4().simple().to_string(),
            username: credentials.display_name(),
            email: credentials.email.trim().to_string(),
            avatar: avatar_url(avatar_name),
        })
    }
}

/// Build the generated avatar URL for a name
pub fn avatar_url(name: &str) -> String {
    match Url::parse_with_params(AVATAR_ENDPOINT, &[("name", name), ("background", "random")]) {
        Ok(url) => url.to_string(),
        Err(_) => AVATAR_ENDPOINT.to_string(),
    }
}
