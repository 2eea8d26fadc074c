//! Timetable query gateway.
//!
//! Exposes a Comcigan timetable provider as a small JSON API:
//! school search, a class's weekly timetable, today's periods and
//! per-period class times.

pub mod clock;
pub mod config;
pub mod gateway;
pub mod provider;
pub mod timetable;
pub mod web;
