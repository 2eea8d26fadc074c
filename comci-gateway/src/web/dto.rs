//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};

/// Query for `/school` and `/search`.
///
/// Either `name` or `keyword` may carry the search term.
#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
    pub keyword: Option<String>,
}

impl SearchParams {
    /// The first non-blank of `name` and `keyword`.
    pub fn term(&self) -> Option<&str> {
        [self.name.as_deref(), self.keyword.as_deref()]
            .into_iter()
            .flatten()
            .find(|s| !s.trim().is_empty())
    }
}

/// Query for `/timetable` and `/today`.
#[derive(Debug, Default, Deserialize)]
pub struct TimetableParams {
    /// School code
    pub code: Option<String>,
    pub grade: Option<String>,
    pub class: Option<String>,
}

/// Query for `/classtime`.
#[derive(Debug, Default, Deserialize)]
pub struct ClassTimeParams {
    /// School code
    pub code: Option<String>,
}

/// Successful response: `ok: true` followed by the payload's fields.
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub ok: bool,
    #[serde(flatten)]
    pub payload: T,
}

impl<T> Envelope<T> {
    pub fn ok(payload: T) -> Self {
        Self { ok: true, payload }
    }
}

/// Failed response: `ok: false` and a message, nothing else.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub ok: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            ok: false,
            error: error.into(),
        }
    }
}

/// Response for `/`.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub name: &'static str,
    pub endpoints: Vec<&'static str>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_term_prefers_name() {
        let params = SearchParams {
            name: Some("경기북".into()),
            keyword: Some("서울".into()),
        };
        assert_eq!(params.term(), Some("경기북"));
    }

    #[test]
    fn search_term_skips_blank_name() {
        let params = SearchParams {
            name: Some("  ".into()),
            keyword: Some("서울".into()),
        };
        assert_eq!(params.term(), Some("서울"));
        assert_eq!(SearchParams::default().term(), None);
    }

    #[test]
    fn envelope_flattens_payload() {
        let body = serde_json::to_value(Envelope::ok(IndexResponse {
            name: "comci-api",
            endpoints: vec!["/timetable"],
        }))
        .unwrap();
        assert_eq!(
            body,
            json!({ "ok": true, "name": "comci-api", "endpoints": ["/timetable"] })
        );
    }

    #[test]
    fn error_response_shape() {
        let body = serde_json::to_value(ErrorResponse::new("Missing query: code")).unwrap();
        assert_eq!(body, json!({ "ok": false, "error": "Missing query: code" }));
    }
}
