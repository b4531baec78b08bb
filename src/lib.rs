pub mod cli;
pub mod commit;
pub mod data;
pub mod decode;
pub mod fields;
pub mod io_utils;
pub mod mapping;
pub mod store;
pub mod table;
pub mod validate;

use std::{env, path::Path, sync::OnceLock};

use anyhow::{Context, Result, ensure};
use clap::Parser;
use log::LevelFilter;
use serde_json::json;

use crate::cli::{CheckArgs, Cli, Commands, ImportArgs, ProbeArgs, TemplateArgs};
use crate::data::RowValidationResult;
use crate::decode::DecodedRoster;
use crate::fields::{FIELDS, Field};
use crate::mapping::FieldMapping;
use crate::store::{JsonStore, StudentStore};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("roster_ingest", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Probe(args) => handle_probe(&args),
        Commands::Check(args) => handle_check(&args),
        Commands::Import(args) => handle_import(&args),
        Commands::Template(args) => handle_template(&args),
    }
}

/// Decode → guess mapping → apply overrides → project → validate. The shared
/// front half of every subcommand; re-projection always starts from the
/// decoded rows.
fn load_validated(
    input: &Path,
    encoding_label: Option<&str>,
    overrides: &[(Field, String)],
) -> Result<(DecodedRoster, FieldMapping, Vec<RowValidationResult>)> {
    let encoding = io_utils::resolve_encoding(encoding_label)?;
    let roster = decode::decode_file(input, encoding)
        .with_context(|| format!("Decoding roster upload {input:?}"))?;

    let mut mapping = FieldMapping::guess(&roster.columns)?;
    for (field, column) in overrides {
        ensure!(
            roster.columns.contains(column),
            "Mapped column '{column}' for field '{field}' is not present in the file"
        );
        mapping.assign(*field, column.clone());
    }

    let rows = mapping::apply(&mapping, &roster.rows);
    let results = validate::validate_rows(&rows);
    Ok((roster, mapping, results))
}

fn handle_probe(args: &ProbeArgs) -> Result<()> {
    let (roster, mapping, results) =
        load_validated(&args.input, args.input_encoding.as_deref(), &[])?;
    let dirty = results.iter().filter(|result| !result.is_clean()).count();

    if args.json {
        let payload = json!({
            "columns": roster.columns,
            "mapping": mapping,
            "row_count": results.len(),
            "rows_with_violations": dirty,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = mapping
        .entries()
        .map(|(field, column)| vec![field.key().to_string(), column.to_string()])
        .collect();
    table::print_table(&["field", "mapped column"], &rows);
    println!();
    println!(
        "{} column(s), {} data row(s), {} row(s) with violations",
        roster.columns.len(),
        results.len(),
        dirty
    );
    Ok(())
}

fn handle_check(args: &CheckArgs) -> Result<()> {
    let (_, _, results) =
        load_validated(&args.input, args.input_encoding.as_deref(), &args.overrides)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&results)?);
        return Ok(());
    }

    let rows: Vec<Vec<String>> = results
        .iter()
        .enumerate()
        .map(|(index, result)| {
            vec![
                (index + 1).to_string(),
                result.row.get(Field::StudentId).to_string(),
                if result.is_clean() { "ok" } else { "invalid" }.to_string(),
                result.violations().join("; "),
            ]
        })
        .collect();
    table::print_table(&["row", "student id", "status", "violations"], &rows);

    let dirty = results.iter().filter(|result| !result.is_clean()).count();
    println!();
    println!("{} row(s) checked, {} with violations", results.len(), dirty);
    Ok(())
}

fn handle_import(args: &ImportArgs) -> Result<()> {
    let (_, _, results) =
        load_validated(&args.input, args.input_encoding.as_deref(), &args.overrides)?;

    let mut store = JsonStore::open(&args.store)?;
    let outcome = commit::commit_rows(&results, &mut store)?;
    store.save()?;

    println!("success_count: {}", outcome.success_count);
    println!("failure_count: {}", outcome.failure_count);
    println!("students_in_store: {}", store.all()?.len());
    Ok(())
}

fn handle_template(args: &TemplateArgs) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(&args.output)?;
    writer
        .write_record(FIELDS.map(Field::label))
        .context("Writing template header")?;
    writer.flush().context("Flushing template file")?;
    println!("Template written to '{}'", args.output.display());
    Ok(())
}
