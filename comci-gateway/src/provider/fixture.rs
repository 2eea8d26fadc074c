//! Fixture-backed provider for development and testing.
//!
//! Loads a JSON document of schools, timetables and class times and serves
//! it as if it came from the live provider.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::error::ProviderError;
use super::{ProviderSession, TimetableProvider};

/// Fixture document layout.
///
/// ```json
/// {
///   "schools": [{ "code": 1373, "name": "경기북과학고등학교", "region": "경기" }],
///   "timetables": { "1373": { "1": { "4": [[...], [...]] } } },
///   "classTimes": { "1373": ["1(09:00)", "2(09:50)"] }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FixtureData {
    /// School search entries. Matched against their `name` field.
    #[serde(default)]
    pub schools: Vec<Value>,

    /// Timetable structures keyed by school code.
    #[serde(default)]
    pub timetables: HashMap<String, Value>,

    /// Class time tables keyed by school code.
    #[serde(default)]
    pub class_times: HashMap<String, Value>,
}

/// Provider that serves data from a [`FixtureData`] document.
#[derive(Debug, Clone)]
pub struct FixtureProvider {
    data: Arc<FixtureData>,
}

impl FixtureProvider {
    /// Create a provider from already-parsed fixture data.
    pub fn new(data: FixtureData) -> Self {
        Self {
            data: Arc::new(data),
        }
    }

    /// Load fixture data from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ProviderError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| ProviderError::Fixture {
            message: format!("Failed to read {:?}: {}", path, e),
        })?;

        let data: FixtureData =
            serde_json::from_str(&json).map_err(|e| ProviderError::Fixture {
                message: format!("Failed to parse {:?}: {}", path, e),
            })?;

        Ok(Self::new(data))
    }

    /// Number of schools available for search.
    pub fn school_count(&self) -> usize {
        self.data.schools.len()
    }
}

#[async_trait]
impl TimetableProvider for FixtureProvider {
    async fn open_session(&self) -> Result<Box<dyn ProviderSession>, ProviderError> {
        Ok(Box::new(FixtureSession {
            data: Arc::clone(&self.data),
            school: None,
        }))
    }
}

struct FixtureSession {
    data: Arc<FixtureData>,
    school: Option<u32>,
}

impl FixtureSession {
    fn school(&self) -> Result<u32, ProviderError> {
        self.school.ok_or(ProviderError::SchoolNotSet)
    }

    fn lookup(map: &HashMap<String, Value>, code: u32) -> Result<Value, ProviderError> {
        map.get(&code.to_string())
            .cloned()
            .ok_or(ProviderError::UnknownSchool(code))
    }
}

#[async_trait]
impl ProviderSession for FixtureSession {
    fn set_school(&mut self, code: u32) -> Result<(), ProviderError> {
        self.school = Some(code);
        Ok(())
    }

    async fn search(&mut self, keyword: &str) -> Result<Vec<Value>, ProviderError> {
        Ok(self
            .data
            .schools
            .iter()
            .filter(|school| {
                school
                    .get("name")
                    .and_then(Value::as_str)
                    .is_some_and(|name| name.contains(keyword))
            })
            .cloned()
            .collect())
    }

    async fn timetable(&mut self) -> Result<Value, ProviderError> {
        let code = self.school()?;
        Self::lookup(&self.data.timetables, code)
    }

    async fn class_times(&mut self) -> Result<Value, ProviderError> {
        let code = self.school()?;
        Self::lookup(&self.data.class_times, code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::io::Write;

    fn sample() -> FixtureData {
        serde_json::from_value(json!({
            "schools": [
                { "code": 1373, "name": "경기북과학고등학교", "region": "경기" },
                { "code": 2291, "name": "서울과학고등학교", "region": "서울" },
                { "code": 4410, "name": "부산중학교", "region": "부산" }
            ],
            "timetables": { "1373": { "1": { "4": [[], [], [], [], []] } } },
            "classTimes": { "1373": ["1(09:00)", "2(09:50)"] }
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn search_matches_name_substring() {
        let provider = FixtureProvider::new(sample());
        let mut session = provider.open_session().await.unwrap();

        let results = session.search("과학고").await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["code"], 1373);

        let results = session.search("없는학교").await.unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn timetable_requires_school() {
        let provider = FixtureProvider::new(sample());
        let mut session = provider.open_session().await.unwrap();

        let err = session.timetable().await.unwrap_err();
        assert!(matches!(err, ProviderError::SchoolNotSet));

        session.set_school(1373).unwrap();
        let data = session.timetable().await.unwrap();
        assert!(data["1"]["4"].is_array());
    }

    #[tokio::test]
    async fn unknown_school_is_an_error() {
        let provider = FixtureProvider::new(sample());
        let mut session = provider.open_session().await.unwrap();
        session.set_school(9999).unwrap();

        let err = session.class_times().await.unwrap_err();
        assert!(matches!(err, ProviderError::UnknownSchool(9999)));
    }

    #[tokio::test]
    async fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"schools": [{{"code": 1, "name": "테스트고"}}], "classTimes": {{"1": []}}}}"#
        )
        .unwrap();

        let provider = FixtureProvider::load(file.path()).unwrap();
        assert_eq!(provider.school_count(), 1);

        let mut session = provider.open_session().await.unwrap();
        session.set_school(1).unwrap();
        assert_eq!(session.class_times().await.unwrap(), json!([]));
    }

    #[tokio::test]
    async fn bundled_fixture_loads() {
        let provider = FixtureProvider::load("data/fixture.json").unwrap();
        assert_eq!(provider.school_count(), 3);

        let mut session = provider.open_session().await.unwrap();
        session.set_school(1373).unwrap();
        let timetable = session.timetable().await.unwrap();
        assert!(timetable["1"]["4"].is_array());
    }

    #[test]
    fn load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let err = FixtureProvider::load(dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, ProviderError::Fixture { .. }));
    }
}
