//! Inspect command implementation

use super::{load_config, load_schema};
use crate::cli::error::CliError;
use crate::cli::output::{format_relations, format_store_functions};
use crate::store::plan_relation_functions;
use std::path::Path;

/// Handle the inspect command: print relation names and the accessors of
/// each store (or of one data format's store)
pub fn handle_inspect(
    input: &str,
    config: Option<&Path>,
    data_format: Option<&str>,
) -> Result<(), CliError> {
    let config = load_config(config)?;
    let schema = load_schema(input, &config)?;

    let names: Vec<&str> = match data_format {
        Some(name) => {
            schema.require_data_format(name)?;
            vec![name]
        }
        None => schema.data_formats().keys().map(String::as_str).collect(),
    };

    let mut output = format_relations(schema.relations());
    for name in names {
        let plans = plan_relation_functions(
            schema.data_formats(),
            schema.relations(),
            name,
            schema.sql_options(),
            config.stores.duplicate_function_names,
        )?;
        output.push_str(&format_store_functions(name, &plans));
    }

    print!("{}", output);
    Ok(())
}
