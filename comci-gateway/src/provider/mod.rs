//! Timetable provider interface.
//!
//! The gateway never talks to the Comcigan site itself. It depends only on
//! this contract, which mirrors the provider library's `init` / `setSchool` /
//! `search` / `getTimetable` / `getClassTime` calls:
//!
//! - [`TimetableProvider::open_session`] creates and initialises a session
//! - [`ProviderSession::set_school`] binds the session to a school code
//! - the remaining session methods fetch data for the bound school
//!
//! A session is opened per request and dropped once the response is built.

mod error;
mod fixture;
mod remote;
#[cfg(test)]
pub(crate) mod scripted;

use async_trait::async_trait;
use serde_json::Value;

pub use error::ProviderError;
pub use fixture::{FixtureData, FixtureProvider};
pub use remote::{RemoteConfig, RemoteProvider};

/// Factory for provider sessions.
#[async_trait]
pub trait TimetableProvider: Send + Sync {
    /// Create a session and load whatever the provider needs up front.
    async fn open_session(&self) -> Result<Box<dyn ProviderSession>, ProviderError>;
}

/// A single provider session.
#[async_trait]
pub trait ProviderSession: Send {
    /// Bind this session to a school.
    fn set_school(&mut self, code: u32) -> Result<(), ProviderError>;

    /// Search schools by keyword. Entries are returned as the provider shapes them.
    async fn search(&mut self, keyword: &str) -> Result<Vec<Value>, ProviderError>;

    /// Full timetable for the bound school: grade → class → days → periods.
    async fn timetable(&mut self) -> Result<Value, ProviderError>;

    /// Start/end times of each period for the bound school.
    async fn class_times(&mut self) -> Result<Value, ProviderError>;
}
