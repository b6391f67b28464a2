//! `rdf-form` command line
//!
//! Loads a JSON-LD record and field definitions, runs them through the
//! widget controllers and prints the serialised record or a required-field
//! report.

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgMatches, Command};
use rdf_form_core::{load_config, parse_definitions, read_json, Form, Services, WidgetRegistry};
use rdf_form_enrich::{FormConfig, RedrawFn};
use rdf_form_value::LanguageConfig;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

fn input_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("record")
                .long("record")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON-LD record (object keyed by binding)"),
        )
        .arg(
            Arg::new("fields")
                .long("fields")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("JSON array of field definitions"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .value_parser(value_parser!(PathBuf))
                .help("TOML form configuration"),
        )
        .arg(
            Arg::new("languages")
                .long("languages")
                .default_value("en")
                .help("Comma-separated content languages"),
        )
        .arg(
            Arg::new("interface-language")
                .long("interface-language")
                .default_value("en")
                .help("Interface language"),
        )
}

fn cli() -> Command {
    Command::new("rdf-form")
        .version(rdf_form_core::VERSION)
        .about("Edit and validate RDF record attributes")
        .subcommand_required(true)
        .subcommand(input_args(
            Command::new("serialize").about("Print the record as the form would save it"),
        ))
        .subcommand(input_args(
            Command::new("check").about("Report required fields without a value"),
        ))
}

fn path<'a>(args: &'a ArgMatches, name: &str) -> Result<&'a PathBuf> {
    args.get_one::<PathBuf>(name)
        .with_context(|| format!("missing --{name}"))
}

fn load_form(args: &ArgMatches) -> Result<Form> {
    let record_path = path(args, "record")?;
    let record = read_json(record_path).with_context(|| format!("loading {}", record_path.display()))?;
    let fields_path = path(args, "fields")?;
    let definitions = read_json(fields_path)
        .and_then(parse_definitions)
        .with_context(|| format!("loading field definitions from {}", fields_path.display()))?;

    let config = match args.get_one::<PathBuf>("config") {
        Some(config_path) => {
            load_config(config_path).with_context(|| format!("loading {}", config_path.display()))?
        }
        None => FormConfig::default(),
    };
    let services = Services::from_config(&config).context("building lookup services")?;

    let interface = args
        .get_one::<String>("interface-language")
        .map_or("en", String::as_str);
    let languages = args
        .get_one::<String>("languages")
        .map_or("en", String::as_str)
        .split(',')
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .map(|code| (code, code));
    let languages = LanguageConfig::new(interface, languages);

    let redraw: RedrawFn = Arc::new(|| {});
    let form = Form::build(
        &record,
        definitions,
        &languages,
        &WidgetRegistry::with_defaults(),
        &services,
        &config,
        &redraw,
    )?;
    Ok(form)
}

fn run() -> Result<ExitCode> {
    match cli().get_matches().subcommand() {
        Some(("serialize", args)) => {
            let form = load_form(args)?;
            println!("{}", serde_json::to_string_pretty(&form.serialize())?);
            Ok(ExitCode::SUCCESS)
        }
        Some(("check", args)) => {
            let form = load_form(args)?;
            let missing = form.missing_required();
            if missing.is_empty() {
                println!("All required fields have a value");
                return Ok(ExitCode::SUCCESS);
            }
            for binding in &missing {
                println!("missing required value: {binding}");
            }
            Ok(ExitCode::FAILURE)
        }
        _ => Ok(ExitCode::SUCCESS),
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    match run() {
        Ok(code) => code,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::from(2)
        }
    }
}
