//! `imckids` - CLI for recording and classifying children's BMI
//!
//! Each command runs to completion against the configured record log and
//! certificates directory.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;

use imckids::cli::{
    CertificatesCommand, Cli, Command, ConfigCommand, MeasurementArgs, RegisterCommand,
};
use imckids::{
    classify, describe, init_logging, Certificates, Config, Error, RecordStore, Report, Sex,
};

/// Exit status when an entered measurement is rejected.
const EXIT_REJECTED: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let takes_measurement = cli.command.takes_measurement();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            let (message, code) = describe_failure(&err, takes_measurement);
            eprintln!("{message}");
            ExitCode::from(code)
        }
    }
}

/// User-facing message and exit status for a failed command.
///
/// Only commands that take a measurement report caller errors as a rejected
/// measurement. The same error raised while reading the log (an unsupported
/// age in a stored row) is a data problem and gets the full chain.
fn describe_failure(err: &anyhow::Error, takes_measurement: bool) -> (String, u8) {
    match err.downcast_ref::<Error>() {
        Some(e) if takes_measurement && e.is_caller_error() => {
            (format!("Cannot accept measurement: {e}"), EXIT_REJECTED)
        }
        _ => (format!("Error: {err:#}"), 1),
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::load_from(cli.config.clone())?;
    let store = RecordStore::from_config(&config);
    let certificates = Certificates::new(config.certificates_dir());

    match cli.command {
        Command::Register(cmd) => handle_register(&config, &store, &certificates, &cmd),
        Command::Classify(args) => handle_classify(&args),
        Command::List(cmd) => handle_list(&store, cmd.json),
        Command::Report(cmd) => handle_report(&store, cmd.json),
        Command::Certificates(cmd) => handle_certificates(&store, &certificates, &cmd),
        Command::Clear(cmd) => handle_clear(&store, cmd.yes),
        Command::Config(cmd) => handle_config(&config, cmd),
    }
}

fn handle_register(
    config: &Config,
    store: &RecordStore,
    certificates: &Certificates,
    cmd: &RegisterCommand,
) -> anyhow::Result<()> {
    let today = chrono::Local::now().date_naive();
    let classified = cmd.submission(today).validate(&config.intake)?;
    let record = classified.record();

    println!(
        "BMI of {}: {:.2} ({})",
        record.name(),
        record.bmi(),
        classified.classification()
    );
    println!("{}", classified.recommendation());

    store.append(record)?;
    println!("Saved to {}", store.records_path().display());

    if !cmd.no_certificate {
        let path = certificates.write(&classified)?;
        println!("Certificate: {}", path.display());
    }
    Ok(())
}

fn handle_classify(args: &MeasurementArgs) -> anyhow::Result<()> {
    let sex = Sex::from(args.sex);
    let value = imckids::bmi(args.weight, args.height)?;
    let category = classify(value, args.age, sex)?;

    println!("BMI: {value:.2} ({category})");
    println!("{}", describe(category));
    Ok(())
}

fn handle_list(store: &RecordStore, json: bool) -> anyhow::Result<()> {
    let records = store.load_all()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&records)?);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records yet.");
        return Ok(());
    }

    println!(
        "{:<24} {:>4} {:>7} {:>7} {:>7}  {:<10} {:<3} Classification",
        "Name", "Age", "Height", "Weight", "BMI", "Date", "Sex"
    );
    for classified in &records {
        let r = classified.record();
        println!(
            "{:<24} {:>4} {:>7.2} {:>7.2} {:>7.2}  {:<10} {:<3} {}",
            r.name(),
            r.age(),
            r.height_m(),
            r.weight_kg(),
            r.bmi(),
            r.weigh_date_text(),
            r.sex(),
            classified.classification()
        );
    }
    Ok(())
}

fn handle_report(store: &RecordStore, json: bool) -> anyhow::Result<()> {
    let report = Report::from_records(&store.load_all()?);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{report}");
    }
    Ok(())
}

fn handle_certificates(
    store: &RecordStore,
    certificates: &Certificates,
    cmd: &CertificatesCommand,
) -> anyhow::Result<()> {
    match cmd {
        CertificatesCommand::List => {
            let names = certificates.list()?;
            if names.is_empty() {
                println!("No certificates generated yet.");
            }
            for name in names {
                println!("{}", certificates.dir().join(name).display());
            }
        }
        CertificatesCommand::Generate => {
            let records = store.load_all()?;
            for classified in &records {
                let path = certificates.write(classified).with_context(|| {
                    format!("generating certificate for {}", classified.record().name())
                })?;
                println!("{}", path.display());
            }
            println!("Generated {} certificates.", records.len());
        }
    }
    Ok(())
}

fn handle_clear(store: &RecordStore, yes: bool) -> anyhow::Result<()> {
    if !yes {
        println!("This will delete all records and certificates.");
        println!("Use --yes to confirm.");
        return Ok(());
    }

    let report = store.clear_all()?;
    if report.records_removed || report.certificates_removed {
        println!("All records and certificates were removed.");
    } else {
        println!("Nothing to remove.");
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Records path:       {}", config.records_path().display());
                println!(
                    "  Certificates dir:   {}",
                    config.certificates_dir().display()
                );
                println!();
                println!("[Intake]");
                println!(
                    "  Height (m):         {} to {}",
                    config.intake.min_height_m, config.intake.max_height_m
                );
                println!(
                    "  Weight (kg):        {} to {}",
                    config.intake.min_weight_kg, config.intake.max_weight_kg
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => println!("Configuration error: {e}"),
            }
        }
    }
    Ok(())
}
