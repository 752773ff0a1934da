//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::classify::Sex;
use crate::record::{Submission, DATE_FORMAT};

/// Sex as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SexArg {
    /// Masculino
    #[value(name = "M", alias = "m")]
    Male,
    /// Feminino
    #[value(name = "F", alias = "f")]
    Female,
}

impl From<SexArg> for Sex {
    fn from(arg: SexArg) -> Self {
        match arg {
            SexArg::Male => Sex::Male,
            SexArg::Female => Sex::Female,
        }
    }
}

/// Parse a `DD/MM/YYYY` date.
fn parse_date(text: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(text, DATE_FORMAT)
        .map_err(|e| format!("expected DD/MM/YYYY, got {text:?}: {e}"))
}

/// Measurements shared by `register` and `classify`.
#[derive(Debug, Args)]
pub struct MeasurementArgs {
    /// Age in years (4 or 5)
    #[arg(short, long)]
    pub age: u8,

    /// Height in meters
    #[arg(long, value_name = "METERS")]
    pub height: f64,

    /// Weight in kilograms
    #[arg(short, long, value_name = "KG")]
    pub weight: f64,

    /// Sex
    #[arg(short, long, value_enum)]
    pub sex: SexArg,
}

/// Register command arguments.
#[derive(Debug, Args)]
pub struct RegisterCommand {
    /// Child's name
    #[arg(short, long)]
    pub name: String,

    /// Age, height, weight and sex of the weigh-in
    #[command(flatten)]
    pub measurement: MeasurementArgs,

    /// Weigh-in date as DD/MM/YYYY (defaults to today)
    #[arg(short, long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,

    /// Skip generating the certificate
    #[arg(long)]
    pub no_certificate: bool,
}

impl RegisterCommand {
    /// Build the intake submission, using `today` when no date was given.
    #[must_use]
    pub fn submission(&self, today: NaiveDate) -> Submission {
        Submission {
            name: self.name.clone(),
            age: self.measurement.age,
            height_m: self.measurement.height,
            weight_kg: self.measurement.weight,
            sex: self.measurement.sex.into(),
            weigh_date: self.date.unwrap_or(today),
        }
    }
}

/// List command arguments.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Report command arguments.
#[derive(Debug, Args)]
pub struct ReportCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Clear command arguments.
#[derive(Debug, Args)]
pub struct ClearCommand {
    /// Confirm deletion of all records and certificates
    #[arg(long)]
    pub yes: bool,
}

/// Certificate commands.
#[derive(Debug, Subcommand)]
pub enum CertificatesCommand {
    /// List generated certificates
    List,

    /// Regenerate the certificate of every record
    Generate,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show configuration file path
    Path,

    /// Validate configuration file
    Validate {
        /// Path to configuration file to validate
        file: Option<PathBuf>,
    },
}
