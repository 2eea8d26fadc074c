//! Typed view over the provider's timetable structure.
//!
//! The provider returns a loosely typed nested structure
//! (grade → class → days → periods) whose keys may arrive as strings,
//! padded strings or array positions. [`normalize`] converts it into
//! integer-keyed maps once, right after fetching, so lookups never have
//! to try alternative key forms.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Classes of one grade, keyed by class number.
pub type ClassMap = BTreeMap<u32, Value>;

/// How provider keys are interpreted during normalisation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeyTolerance {
    /// Only object keys in canonical decimal form (`"1"`, `"12"`).
    Strict,
    /// Also padded keys (`"01"`, `" 2"`) and arrays indexed by position.
    #[default]
    Lenient,
}

impl FromStr for KeyTolerance {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "strict" => Ok(KeyTolerance::Strict),
            "lenient" => Ok(KeyTolerance::Lenient),
            other => Err(format!("expected strict or lenient, got {other:?}")),
        }
    }
}

/// The top-level structure cannot be used.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StructureError {
    /// Missing, or not a container at all
    #[error("timetable structure unavailable from upstream (got {found})")]
    Missing { found: &'static str },

    /// A container the configured key tolerance does not accept
    #[error("timetable structure shape not supported with {tolerance:?} key tolerance (got {found})")]
    UnsupportedShape {
        found: &'static str,
        tolerance: KeyTolerance,
    },
}

/// Requested grade or class is absent from the provider's data.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupError {
    #[error("grade {grade} not found (available grades: {})", KeyList(.available))]
    GradeNotFound { grade: u32, available: Vec<u32> },

    #[error("class {class} not found in grade {grade} (available classes: {})", KeyList(.available))]
    ClassNotFound {
        grade: u32,
        class: u32,
        available: Vec<u32>,
    },
}

/// Comma-separated key list, `none` when empty.
struct KeyList<'a>(&'a [u32]);

impl fmt::Display for KeyList<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return write!(f, "none");
        }
        for (i, key) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// Provider timetable with canonical integer keys.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NormalizedTimetable {
    grades: BTreeMap<u32, ClassMap>,
}

impl NormalizedTimetable {
    /// Available grade numbers, ascending.
    pub fn grades(&self) -> Vec<u32> {
        self.grades.keys().copied().collect()
    }

    /// Look up the week for a grade and class.
    pub fn class_week(&self, grade: u32, class: u32) -> Result<&Value, LookupError> {
        let classes = self
            .grades
            .get(&grade)
            .ok_or_else(|| LookupError::GradeNotFound {
                grade,
                available: self.grades(),
            })?;

        classes
            .get(&class)
            .ok_or_else(|| LookupError::ClassNotFound {
                grade,
                class,
                available: classes.keys().copied().collect(),
            })
    }
}

/// Normalise the provider's structure into integer-keyed maps.
///
/// Keys that normalise to the same grade are merged. If two of them also
/// share a class, the first in map order is kept and the collision is logged.
pub fn normalize(
    raw: &Value,
    tolerance: KeyTolerance,
) -> Result<NormalizedTimetable, StructureError> {
    let top = entries(raw, tolerance).ok_or_else(|| match raw {
        Value::Array(_) => StructureError::UnsupportedShape {
            found: value_kind(raw),
            tolerance,
        },
        _ => StructureError::Missing {
            found: value_kind(raw),
        },
    })?;

    let mut grades: BTreeMap<u32, ClassMap> = BTreeMap::new();
    for (grade, classes) in top {
        let merged = grades.entry(grade).or_default();
        for (class, week) in entries(classes, tolerance).unwrap_or_default() {
            if merged.contains_key(&class) {
                warn!(grade, class, "duplicate timetable key after normalisation, keeping first");
                continue;
            }
            merged.insert(class, week.clone());
        }
    }

    Ok(NormalizedTimetable { grades })
}

/// Integer-keyed children of a container, or `None` for non-containers.
fn entries(value: &Value, tolerance: KeyTolerance) -> Option<Vec<(u32, &Value)>> {
    match value {
        Value::Object(map) => Some(object_entries(map, tolerance)),
        Value::Array(items) if tolerance == KeyTolerance::Lenient => Some(
            items
                .iter()
                .enumerate()
                .filter(|(_, item)| !item.is_null())
                .filter_map(|(i, item)| u32::try_from(i).ok().map(|i| (i, item)))
                .collect(),
        ),
        _ => None,
    }
}

fn object_entries(map: &Map<String, Value>, tolerance: KeyTolerance) -> Vec<(u32, &Value)> {
    map.iter()
        .filter_map(|(key, value)| match parse_key(key, tolerance) {
            Some(k) => Some((k, value)),
            None => {
                debug!(key = %key, "skipping non-numeric timetable key");
                None
            }
        })
        .collect()
}

fn parse_key(key: &str, tolerance: KeyTolerance) -> Option<u32> {
    match tolerance {
        KeyTolerance::Strict => {
            let canonical = !key.is_empty()
                && key.bytes().all(|b| b.is_ascii_digit())
                && (key == "0" || !key.starts_with('0'));
            if canonical { key.parse().ok() } else { None }
        }
        KeyTolerance::Lenient => key.trim().parse().ok(),
    }
}

/// Short name of a JSON value's type, for error messages.
pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Parse a query value the way the provider's callers always have:
/// surrounding whitespace is ignored, an optional sign and a leading run of
/// digits are read, and anything after the digits is discarded.
///
/// Returns `None` when there are no leading digits or the result is not
/// strictly positive.
pub fn parse_positive(input: &str) -> Option<u32> {
    let s = input.trim();
    let (negative, digits) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    let digits = &digits[..end];
    if digits.is_empty() || negative {
        return None;
    }

    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// One period of a day, as shown in the daily view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PeriodEntry {
    /// Period number from the provider, or the 1-based position.
    pub period: u32,
    pub subject: String,
    pub teacher: String,
}

/// Project the periods of one weekday out of a class's week.
///
/// `weekday_index` is 0 for Monday. Days without data yield no periods.
pub fn day_periods(week: &Value, weekday_index: usize) -> Vec<PeriodEntry> {
    let Some(Value::Array(periods)) = week.get(weekday_index) else {
        return Vec::new();
    };

    periods
        .iter()
        .enumerate()
        .map(|(i, entry)| PeriodEntry {
            period: entry
                .get("classTime")
                .and_then(Value::as_u64)
                .and_then(|n| u32::try_from(n).ok())
                .filter(|&n| n > 0)
                .unwrap_or(i as u32 + 1),
            subject: string_field(entry, "subject"),
            teacher: string_field(entry, "teacher"),
        })
        .collect()
}

fn string_field(entry: &Value, field: &str) -> String {
    entry
        .get(field)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}
