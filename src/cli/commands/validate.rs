//! Validate command implementation

use super::{load_config, load_schema};
use crate::cli::error::CliError;
use crate::db::RecordingDatabase;
use crate::entities::Entities;
use std::path::Path;
use std::sync::Arc;

/// Handle the validate command.
///
/// Besides the schema checks this builds every store, so accessor name
/// collisions and foreign key cycles are reported too.
pub fn handle_validate(input: &str, config: Option<&Path>) -> Result<(), CliError> {
    let config = load_config(config)?;
    let schema = load_schema(input, &config)?;

    let formats = schema.data_formats().len();
    let relations = schema.relations().len();
    Entities::new(
        schema,
        Arc::new(RecordingDatabase::new()),
        config.stores.duplicate_function_names,
    )?;

    println!(
        "Validation successful: {} data format(s), {} relation(s)",
        formats, relations
    );
    Ok(())
}
