//! SQL command implementation

use super::{load_config, load_schema};
use crate::cli::error::CliError;
use crate::export::SchemaSqlExporter;
use std::path::Path;

/// Handle the sql command: print the create (or drop) script of a schema
pub fn handle_sql(input: &str, config: Option<&Path>, drop: bool) -> Result<(), CliError> {
    let config = load_config(config)?;
    let schema = load_schema(input, &config)?;

    let script = if drop {
        SchemaSqlExporter::export_drop(&schema)?
    } else {
        SchemaSqlExporter::export(&schema)?
    };

    print!("{}", script);
    Ok(())
}
