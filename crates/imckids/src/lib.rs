//! `imckids` - BMI tracking for preschool children
//!
//! This library computes Body Mass Index, classifies it against age- and
//! sex-specific percentile thresholds for children aged 4 and 5, keeps an
//! append-only log of weigh-ins and issues a PDF certificate per weigh-in.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod certificate;
pub mod classify;
pub mod cli;
pub mod config;
pub mod error;
pub mod logging;
pub mod record;
pub mod report;
pub mod storage;

pub use certificate::Certificates;
pub use classify::{bmi, classify, describe, Category, Cohort, Sex};
pub use config::Config;
pub use error::{Error, Result};
pub use logging::init_logging;
pub use record::{ClassifiedRecord, MeasurementRecord, Submission};
pub use report::Report;
pub use storage::{ClearReport, RecordStore};
