//! Terminal rendering of forecast reports
//!
//! [`Report`] turns a cached or freshly fetched [`crate::data::WeatherResponse`]
//! into the plain-text report printed by the CLI.

mod report;
pub mod style;

pub use report::{Report, ReportError};
