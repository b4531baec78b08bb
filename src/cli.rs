use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::fields::Field;

#[derive(Debug, Parser)]
#[command(author, version, about = "Ingest and validate student roster uploads", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Decode a roster file and report its columns and the guessed field mapping
    Probe(ProbeArgs),
    /// Decode, map, and validate a roster file, reporting per-row violations
    Check(CheckArgs),
    /// Run the full pipeline and upsert clean rows into a student store
    Import(ImportArgs),
    /// Write a sample roster CSV with the canonical column headings
    Template(TemplateArgs),
}

#[derive(Debug, Args)]
pub struct ProbeArgs {
    /// Roster file to inspect (.csv, .xlsx, or .xls)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Character encoding for delimited-text inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Emit machine-readable JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct CheckArgs {
    /// Roster file to validate (.csv, .xlsx, or .xls)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Mapping overrides such as `phone_number=Mobile No` (repeatable)
    #[arg(long = "map", value_parser = parse_mapping_override, action = clap::ArgAction::Append)]
    pub overrides: Vec<(Field, String)>,
    /// Character encoding for delimited-text inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// Emit machine-readable JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Args)]
pub struct ImportArgs {
    /// Roster file to import (.csv, .xlsx, or .xls)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// JSON student store to upsert into (created when missing)
    #[arg(short = 's', long = "store")]
    pub store: PathBuf,
    /// Mapping overrides such as `phone_number=Mobile No` (repeatable)
    #[arg(long = "map", value_parser = parse_mapping_override, action = clap::ArgAction::Append)]
    pub overrides: Vec<(Field, String)>,
    /// Character encoding for delimited-text inputs (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct TemplateArgs {
    /// Destination CSV file
    #[arg(short = 'o', long = "output")]
    pub output: PathBuf,
}

pub fn parse_mapping_override(value: &str) -> Result<(Field, String), String> {
    let (field, column) = value
        .split_once('=')
        .ok_or_else(|| format!("Expected `field=column`, got '{value}'"))?;
    let field: Field = field.parse()?;
    let column = column.trim();
    if column.is_empty() {
        return Err(format!("Mapping for '{field}' names an empty column"));
    }
    Ok((field, column.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mapping_override_parses_field_and_column() {
        let (field, column) = parse_mapping_override("phone_number=Mobile No").unwrap();
        assert_eq!(field, Field::PhoneNumber);
        assert_eq!(column, "Mobile No");
    }

    #[test]
    fn mapping_override_rejects_bad_shapes() {
        assert!(parse_mapping_override("phone_number").is_err());
        assert!(parse_mapping_override("nickname=Nick").is_err());
        assert!(parse_mapping_override("email=  ").is_err());
    }
}
