//! Provisioning order of entity tables
//!
//! A table holding a foreign key can only be created after the table it
//! references. The order is a topological sort of the graph with an edge
//! referenced -> holder for every relation that puts a foreign key clause on
//! an entity table. Formats without a constraint between them keep their
//! declaration order.

use super::factory::Relation;
use crate::error::SchemaError;
use petgraph::Direction;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Data format names ordered so that referenced formats come before the
/// formats referencing them.
///
/// Relations within one format and relations without foreign key SQL (SQL
/// generation disabled) do not constrain the order.
pub fn provisioning_order<'a, F, R>(format_names: F, relations: R) -> Result<Vec<String>, SchemaError>
where
    F: IntoIterator<Item = &'a str>,
    R: IntoIterator<Item = &'a Relation>,
{
    let mut graph = DiGraph::<&str, ()>::new();
    let mut nodes: HashMap<&str, NodeIndex> = HashMap::new();

    for name in format_names {
        nodes.entry(name).or_insert_with(|| graph.add_node(name));
    }

    for relation in relations {
        if relation.foreign_key_sql().is_none() {
            continue;
        }
        let declaration = &relation.declaration;
        let (Some(holder), Some(referenced)) =
            (declaration.foreign_key_holder(), declaration.referenced_field())
        else {
            continue;
        };
        if holder.format_name == referenced.format_name {
            continue;
        }

        let from = nodes.get(referenced.format_name.as_str());
        let to = nodes.get(holder.format_name.as_str());
        match (from, to) {
            (Some(&from), Some(&to)) => {
                graph.update_edge(from, to, ());
            }
            _ => {
                let missing = if from.is_none() {
                    &referenced.format_name
                } else {
                    &holder.format_name
                };
                return Err(SchemaError::UnknownDataFormat(missing.clone()));
            }
        }
    }

    // Kahn's algorithm, always taking the earliest declared ready format
    let mut in_degree: Vec<usize> = graph
        .node_indices()
        .map(|n| graph.neighbors_directed(n, Direction::Incoming).count())
        .collect();
    let mut ready: BinaryHeap<Reverse<NodeIndex>> = graph
        .node_indices()
        .filter(|n| in_degree[n.index()] == 0)
        .map(Reverse)
        .collect();

    let mut order = Vec::with_capacity(graph.node_count());
    while let Some(Reverse(node)) = ready.pop() {
        order.push(graph[node].to_string());
        for next in graph.neighbors_directed(node, Direction::Outgoing) {
            in_degree[next.index()] -= 1;
            if in_degree[next.index()] == 0 {
                ready.push(Reverse(next));
            }
        }
    }

    if order.len() < graph.node_count() {
        let mut names: Vec<String> = tarjan_scc(&graph)
            .into_iter()
            .find(|component| component.len() > 1)
            .unwrap_or_default()
            .into_iter()
            .map(|n| graph[n].to_string())
            .collect();
        names.sort();
        return Err(SchemaError::ForeignKeyCycle(names));
    }

    Ok(order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SqlOptions;
    use crate::models::{FieldRef, RelationDeclaration};
    use crate::relations::create_relation;

    fn relation(declaration: RelationDeclaration) -> Relation {
        create_relation(&declaration, &SqlOptions::default())
    }

    fn position(order: &[String], name: &str) -> usize {
        order.iter().position(|n| n == name).unwrap()
    }

    #[test]
    fn test_referenced_tables_first() {
        let relations = vec![
            relation(RelationDeclaration::one_to_many(
                FieldRef::new("user", "id"),
                FieldRef::new("recipe", "createdByUserId"),
            )),
            relation(RelationDeclaration::one_to_one(
                FieldRef::new("user", "id"),
                FieldRef::new("userAddress", "userId"),
            )),
            relation(RelationDeclaration::many_to_many(
                FieldRef::new("recipe", "id"),
                FieldRef::new("userGroup", "id"),
            )),
        ];

        let order = provisioning_order(
            ["recipe", "userAddress", "userGroup", "user"],
            &relations,
        )
        .unwrap();

        assert_eq!(order.len(), 4);
        assert!(position(&order, "user") < position(&order, "recipe"));
        assert!(position(&order, "user") < position(&order, "userAddress"));
    }

    #[test]
    fn test_unconstrained_formats_keep_declaration_order() {
        let relations = vec![relation(RelationDeclaration::one_to_many(
            FieldRef::new("user", "id"),
            FieldRef::new("recipe", "createdByUserId"),
        ))];

        let order = provisioning_order(["recipe", "user", "ingredient"], &relations).unwrap();
        assert_eq!(order, vec!["user", "recipe", "ingredient"]);

        let order = provisioning_order(["ingredient", "recipe", "userGroup", "user"], &relations)
            .unwrap();
        assert_eq!(order, vec!["ingredient", "userGroup", "user", "recipe"]);
    }

    #[test]
    fn test_relations_without_sql_do_not_constrain() {
        let options = SqlOptions::new().with_enable_sql(false);
        let relations = vec![
            create_relation(
                &RelationDeclaration::one_to_one(FieldRef::new("a", "id"), FieldRef::new("b", "aId")),
                &options,
            ),
            create_relation(
                &RelationDeclaration::one_to_one(FieldRef::new("b", "id"), FieldRef::new("a", "bId")),
                &options,
            ),
        ];

        let order = provisioning_order(["b", "a"], &relations).unwrap();
        assert_eq!(order, vec!["b", "a"]);
    }

    #[test]
    fn test_self_relation_ignored() {
        let relations = vec![relation(RelationDeclaration::one_to_many(
            FieldRef::new("employee", "id"),
            FieldRef::new("employee", "managerId"),
        ))];

        let order = provisioning_order(["employee"], &relations).unwrap();
        assert_eq!(order, vec!["employee"]);
    }

    #[test]
    fn test_cycle() {
        let relations = vec![
            relation(RelationDeclaration::one_to_one(
                FieldRef::new("a", "id"),
                FieldRef::new("b", "aId"),
            )),
            relation(RelationDeclaration::one_to_one(
                FieldRef::new("b", "id"),
                FieldRef::new("a", "bId"),
            )),
        ];

        let result = provisioning_order(["a", "b", "c"], &relations);
        match result {
            Err(SchemaError::ForeignKeyCycle(names)) => assert_eq!(names, vec!["a", "b"]),
            other => panic!("expected a cycle, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_format() {
        let relations = vec![relation(RelationDeclaration::one_to_many(
            FieldRef::new("user", "id"),
            FieldRef::new("recipe", "createdByUserId"),
        ))];

        assert!(matches!(
            provisioning_order(["user"], &relations),
            Err(SchemaError::UnknownDataFormat(name)) if name == "recipe"
        ));
    }
}
