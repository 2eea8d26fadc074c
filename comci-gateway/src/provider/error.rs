//! Provider error types.

/// Errors raised by a timetable provider.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// HTTP request failed (network error, timeout, etc.)
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Provider returned an error status
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    /// Provider response was not valid JSON
    #[error("JSON parse error: {message}")]
    Json { message: String },

    /// No data is known for the requested school code
    #[error("unknown school code: {0}")]
    UnknownSchool(u32),

    /// A school-bound call was made before `set_school`
    #[error("school not set: call set_school first")]
    SchoolNotSet,

    /// Fixture data could not be loaded
    #[error("fixture error: {message}")]
    Fixture { message: String },
}
