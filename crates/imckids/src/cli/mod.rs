//! Command-line interface for imckids.
//!
//! This module provides the CLI structure for the `imckids` binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    CertificatesCommand, ClearCommand, ConfigCommand, ListCommand, MeasurementArgs,
    RegisterCommand, ReportCommand, SexArg,
};

/// imckids - BMI tracking for preschool children
///
/// Records height and weight of children aged 4 to 5, classifies their BMI
/// against age- and sex-specific percentiles, and issues certificates.
#[derive(Debug, Parser)]
#[command(name = "imckids")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for info, -vv for debug, -vvv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Record a weigh-in, classify it and issue a certificate
    Register(RegisterCommand),

    /// Compute BMI and classification without saving
    Classify(MeasurementArgs),

    /// List all records with their current classification
    List(ListCommand),

    /// Show aggregate figures over all records
    Report(ReportCommand),

    /// Manage generated certificates
    #[command(subcommand)]
    Certificates(CertificatesCommand),

    /// Delete all records and certificates
    Clear(ClearCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Command {
    /// Whether the command takes a measurement entered by the user.
    #[must_use]
    pub fn takes_measurement(&self) -> bool {
        matches!(self, Self::Register(_) | Self::Classify(_))
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        if self.quiet {
            crate::logging::Verbosity::Quiet
        } else {
            match self.verbose {
                0 => crate::logging::Verbosity::Normal,
                1 => crate::logging::Verbosity::Verbose,
                2 => crate::logging::Verbosity::Debug,
                _ => crate::logging::Verbosity::Trace,
            }
        }
    }
}
