//! Timetable query gateway.
//!
//! Validates query parameters, delegates to a [`TimetableProvider`] session
//! and translates results and failures into [`GatewayError`] categories.
//! Each operation opens a fresh session and drops it before returning; no
//! state is kept between calls.

mod error;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

use crate::clock::Clock;
use crate::config::GatewayConfig;
use crate::provider::TimetableProvider;
use crate::timetable::{self, KeyTolerance, PeriodEntry};

pub use error::GatewayError;

/// Validated `/timetable` parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimetableQuery {
    pub school_code: u32,
    pub grade: u32,
    pub class: u32,
}

impl TimetableQuery {
    /// Parse raw query values. All three must be positive integers.
    pub fn parse(
        code: Option<&str>,
        grade: Option<&str>,
        class: Option<&str>,
    ) -> Result<Self, GatewayError> {
        let parsed = (
            code.and_then(timetable::parse_positive),
            grade.and_then(timetable::parse_positive),
            class.and_then(timetable::parse_positive),
        );
        match parsed {
            (Some(school_code), Some(grade), Some(class)) => Ok(Self {
                school_code,
                grade,
                class,
            }),
            _ => Err(GatewayError::InvalidArgument(
                "Missing query: code, grade, class".to_string(),
            )),
        }
    }
}

/// Parse a school code on its own.
pub fn parse_school_code(code: Option<&str>) -> Result<u32, GatewayError> {
    code.and_then(timetable::parse_positive)
        .ok_or_else(|| GatewayError::InvalidArgument("Missing query: code".to_string()))
}

/// Validate a search keyword, returning it trimmed.
pub fn parse_keyword(keyword: Option<&str>) -> Result<&str, GatewayError> {
    keyword
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .ok_or_else(|| GatewayError::InvalidArgument("Missing query: name".to_string()))
}

/// School search results, unmodified from the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SchoolList {
    pub count: usize,
    pub results: Vec<Value>,
}

/// One class's slice of the provider timetable.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimetableSlice {
    pub school_code: u32,
    pub grade: u32,
    pub class: u32,
    pub timetable: Value,
}

/// Returned instead of data on Saturdays and Sundays.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeekendNotice {
    pub weekend: bool,
    pub date: String,
    pub periods: Vec<PeriodEntry>,
}

/// Periods for one class on the current day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySchedule {
    pub date: String,
    pub grade: u32,
    pub class: u32,
    pub periods: Vec<PeriodEntry>,
}

/// Period start/end times, unmodified from the provider.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClassTimes {
    pub results: Value,
}

/// Result of a timetable-style request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Scheduled<T> {
    Weekend(WeekendNotice),
    Data(T),
}

/// The gateway itself. Cheap to clone; shared across requests.
#[derive(Clone)]
pub struct Gateway {
    provider: Arc<dyn TimetableProvider>,
    clock: Arc<dyn Clock>,
    key_tolerance: KeyTolerance,
    provider_timeout: Duration,
    weekend_short_circuit: bool,
}

impl Gateway {
    /// Create a gateway over `provider`, configured from `config`.
    pub fn new(
        provider: Arc<dyn TimetableProvider>,
        clock: Arc<dyn Clock>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            provider,
            clock,
            key_tolerance: config.key_tolerance,
            provider_timeout: config.provider_timeout,
            weekend_short_circuit: config.weekend_short_circuit,
        }
    }

    /// Search schools by name.
    pub async fn search_schools(&self, keyword: &str) -> Result<SchoolList, GatewayError> {
        debug!(keyword, "searching schools");
        let results = self
            .bounded(async {
                let mut session = self.provider.open_session().await?;
                Ok::<_, GatewayError>(session.search(keyword).await?)
            })
            .await?;

        info!(keyword, count = results.len(), "school search complete");
        Ok(SchoolList {
            count: results.len(),
            results,
        })
    }

    /// Fetch one class's week from the school's timetable.
    pub async fn get_timetable(
        &self,
        query: TimetableQuery,
    ) -> Result<Scheduled<TimetableSlice>, GatewayError> {
        if self.weekend_short_circuit && self.clock.is_weekend() {
            return Ok(Scheduled::Weekend(self.weekend_notice()));
        }

        let week = self.fetch_class_week(query).await?;
        Ok(Scheduled::Data(TimetableSlice {
            school_code: query.school_code,
            grade: query.grade,
            class: query.class,
            timetable: week,
        }))
    }

    /// Today's periods for one class.
    pub async fn get_today(
        &self,
        query: TimetableQuery,
    ) -> Result<Scheduled<DaySchedule>, GatewayError> {
        if self.clock.is_weekend() {
            return Ok(Scheduled::Weekend(self.weekend_notice()));
        }

        let week = self.fetch_class_week(query).await?;
        Ok(Scheduled::Data(DaySchedule {
            date: self.date_string(),
            grade: query.grade,
            class: query.class,
            periods: timetable::day_periods(&week, self.clock.weekday_index()),
        }))
    }

    /// Period start/end times for a school.
    pub async fn get_class_times(&self, school_code: u32) -> Result<ClassTimes, GatewayError> {
        debug!(school_code, "fetching class times");
        let results = self
            .bounded(async {
                let mut session = self.provider.open_session().await?;
                session.set_school(school_code)?;
                Ok::<_, GatewayError>(session.class_times().await?)
            })
            .await?;

        Ok(ClassTimes { results })
    }

    async fn fetch_class_week(&self, query: TimetableQuery) -> Result<Value, GatewayError> {
        debug!(?query, "fetching timetable");
        let raw = self
            .bounded(async {
                let mut session = self.provider.open_session().await?;
                session.set_school(query.school_code)?;
                Ok::<_, GatewayError>(session.timetable().await?)
            })
            .await?;

        let normalized = timetable::normalize(&raw, self.key_tolerance)?;
        let week = normalized.class_week(query.grade, query.class)?;
        Ok(week.clone())
    }

    /// Run provider work under the configured timeout.
    async fn bounded<T, F>(&self, work: F) -> Result<T, GatewayError>
    where
        F: Future<Output = Result<T, GatewayError>>,
    {
        tokio::time::timeout(self.provider_timeout, work)
            .await
            .unwrap_or_else(|_| {
                Err(GatewayError::UpstreamFailure(format!(
                    "provider did not respond within {:?}",
                    self.provider_timeout
                )))
            })
    }

    fn weekend_notice(&self) -> WeekendNotice {
        WeekendNotice {
            weekend: true,
            date: self.date_string(),
            periods: Vec::new(),
        }
    }

    fn date_string(&self) -> String {
        self.clock.today().format("%Y-%m-%d").to_string()
    }
}
