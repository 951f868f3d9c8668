//! Output formatting for CLI

use crate::relations::RelationsDict;
use crate::store::RelationFunctionPlan;
use indexmap::IndexMap;

/// List relation names in declaration order
pub fn format_relations(relations: &RelationsDict) -> String {
    let mut output = format!("Relations ({}):\n", relations.len());
    for relation in relations.iter() {
        output.push_str(&format!("  {}\n", relation.name));
    }
    output
}

/// List the relation accessors of one store
pub fn format_store_functions(
    data_format: &str,
    plans: &IndexMap<String, RelationFunctionPlan>,
) -> String {
    let mut output = format!("\nStore {} ({} function(s)):\n", data_format, plans.len());
    for (name, plan) in plans {
        output.push_str(&format!(
            "  {} [{}] {}\n",
            name, plan.role, plan.relation_name
        ));
    }
    output
}
