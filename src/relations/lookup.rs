//! Selecting the relations that concern one data format

use super::factory::Relation;
use crate::models::RelationDeclaration;

/// Every relation in which the data format occupies either endpoint.
///
/// Keeps the input order and does not deduplicate, so filtering the result
/// again returns it unchanged.
pub fn relations_relevant_to<'a, I>(relations: I, format_name: &str) -> Vec<&'a Relation>
where
    I: IntoIterator<Item = &'a Relation>,
{
    relations
        .into_iter()
        .filter(|relation| relation.declaration.involves(format_name))
        .collect()
}

/// Relations that put a foreign key column on the data format's table: those
/// where it is the "to many" side of a one-to-many relation or the "to one"
/// side of a one-to-one relation. Many-to-many relations never qualify.
pub fn relations_imposing_foreign_key_on<'a, I>(relations: I, format_name: &str) -> Vec<&'a Relation>
where
    I: IntoIterator<Item = &'a Relation>,
{
    relations
        .into_iter()
        .filter(|relation| match &relation.declaration {
            RelationDeclaration::ManyToMany(_) => false,
            RelationDeclaration::OneToMany(d) => d.to_many_field.format_name == format_name,
            RelationDeclaration::OneToOne(d) => d.to_one_field.format_name == format_name,
        })
        .collect()
}
