use std::fmt;

use thiserror::Error;

use crate::domain::matching::Titled;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    #[error("WebDriver is unavailable")]
    DriverUnavailable,
    #[error("Authentication failed")]
    AuthenticationFailed,
    #[error("Failed to navigate to {0}")]
    NavigationFailed(String),
    #[error("Element not found: {0}")]
    ElementNotFound(&'static str),
    #[error("Timed out waiting for {0}")]
    Timeout(&'static str),
    #[error("Failed to access field '{0}'")]
    FieldAccessFailed(String),
    #[error("Failed to submit the integration form")]
    SubmissionFailed,
    #[error("Session expired, redirected to the login page")]
    SessionExpired,
    #[error("WebDriver command failed while reading {0}")]
    CommandFailed(&'static str),
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An integration box on the listing page: its title and whatever the driver
/// needs to open it for editing.
#[derive(Debug, Clone)]
pub struct UiCandidate<H> {
    pub title: String,
    pub handle: H,
}

impl<H> Titled for UiCandidate<H> {
    fn title(&self) -> &str {
        &self.title
    }
}

/// A logged-in admin console session.
///
/// Implementations wait for the page to be ready before acting and give up
/// after a bounded timeout with [`SessionError::Timeout`].
#[async_trait::async_trait]
pub trait SessionDriver: Send + Sync {
    type Handle: Send + Sync;

    async fn authenticate(
        &self,
        credentials: &Credentials,
    ) -> error_stack::Result<(), SessionError>;

    /// Navigates (or reloads) the integrations listing page.
    async fn open_integrations(&self) -> error_stack::Result<(), SessionError>;

    async fn list_candidates(
        &self,
    ) -> error_stack::Result<Vec<UiCandidate<Self::Handle>>, SessionError>;

    /// Opens the edit form of a candidate.
    async fn select(&self, handle: &Self::Handle) -> error_stack::Result<(), SessionError>;

    async fn read_field_value(&self, field_id: &str) -> error_stack::Result<String, SessionError>;

    async fn write_field_value(
        &self,
        field_id: &str,
        value: &str,
    ) -> error_stack::Result<(), SessionError>;

    /// Saves the currently open edit form.
    async fn submit(&self) -> error_stack::Result<(), SessionError>;

    async fn close(&self);
}

/// Opens browser sessions on demand, so nothing is launched until the sheet
/// has been read and validated.
#[async_trait::async_trait]
pub trait SessionFactory: Send + Sync {
    type Driver: SessionDriver;

    async fn open(&self) -> error_stack::Result<Self::Driver, SessionError>;
}
