//! Relations module
//!
//! Turns relation declarations into named relations carrying their DDL, and
//! provides the lookups and ordering the store generator builds on:
//! - identity: canonical relation names
//! - sql: join table and foreign key DDL
//! - factory: declaration -> Relation
//! - lookup: relations relevant to one data format
//! - order: table provisioning order

pub mod factory;
pub mod identity;
pub mod lookup;
pub mod order;
pub mod sql;

pub use factory::{JoinTableSql, Relation, RelationSql, create_relation};
pub use identity::relation_name;
pub use lookup::{relations_imposing_foreign_key_on, relations_relevant_to};
pub use order::provisioning_order;

use crate::config::SqlOptions;
use crate::error::SchemaError;
use crate::models::RelationDeclaration;
use indexmap::IndexMap;

/// Relations keyed by their canonical name, in declaration order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelationsDict {
    relations: IndexMap<String, Relation>,
}

impl RelationsDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build relations for the declarations, failing on a repeated declaration
    pub fn from_declarations(
        declarations: &[RelationDeclaration],
        options: &SqlOptions,
    ) -> Result<Self, SchemaError> {
        let mut dict = Self::new();
        for declaration in declarations {
            dict.insert(create_relation(declaration, options))?;
        }
        Ok(dict)
    }

    /// Add a relation. Names are unique.
    pub fn insert(&mut self, relation: Relation) -> Result<(), SchemaError> {
        if self.relations.contains_key(&relation.name) {
            return Err(SchemaError::DuplicateRelation(relation.name));
        }
        self.relations.insert(relation.name.clone(), relation);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&Relation> {
        self.relations.get(name)
    }

    pub fn len(&self) -> usize {
        self.relations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relations.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.relations.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Relation> {
        self.relations.values()
    }

    /// Relations in which the data format occupies either endpoint
    pub fn relevant_to(&self, format_name: &str) -> Vec<&Relation> {
        relations_relevant_to(self.iter(), format_name)
    }

    /// Relations putting a foreign key on the data format's table
    pub fn imposing_foreign_key_on(&self, format_name: &str) -> Vec<&Relation> {
        relations_imposing_foreign_key_on(self.iter(), format_name)
    }

    /// Join tables of all many-to-many relations, in declaration order
    pub fn join_tables(&self) -> impl Iterator<Item = &JoinTableSql> {
        self.iter().filter_map(Relation::join_table)
    }
}

impl<'a> IntoIterator for &'a RelationsDict {
    type Item = &'a Relation;
    type IntoIter = indexmap::map::Values<'a, String, Relation>;

    fn into_iter(self) -> Self::IntoIter {
        self.relations.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldRef;

    #[test]
    fn test_from_declarations_preserves_order() {
        let declarations = vec![
            RelationDeclaration::one_to_many(
                FieldRef::new("user", "id"),
                FieldRef::new("recipe", "createdByUserId"),
            ),
            RelationDeclaration::many_to_many(
                FieldRef::new("user", "id"),
                FieldRef::new("userGroup", "id"),
            ),
        ];

        let dict = RelationsDict::from_declarations(&declarations, &SqlOptions::default()).unwrap();

        assert_eq!(
            dict.names().collect::<Vec<_>>(),
            vec![
                "user.id <-->> recipe.createdByUserId",
                "user.id <<-->> userGroup.id"
            ]
        );
        assert_eq!(dict.join_tables().count(), 1);
        assert!(dict.get("user.id <<-->> userGroup.id").is_some());
    }

    #[test]
    fn test_duplicate_relation() {
        let declaration = RelationDeclaration::one_to_one(
            FieldRef::new("user", "id"),
            FieldRef::new("userAddress", "userId"),
        );
        let result = RelationsDict::from_declarations(
            &[declaration.clone(), declaration],
            &SqlOptions::default(),
        );

        assert!(matches!(
            result,
            Err(SchemaError::DuplicateRelation(name)) if name == "user.id <--> userAddress.userId"
        ));
    }
}
