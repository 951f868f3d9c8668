//! Canonical relation names

use crate::models::RelationDeclaration;

/// Unique name of a relation, e.g. `user.id <<-->> userGroup.id`.
///
/// The arrow encodes the shape: `<<-->>` many-to-many, `<-->>` one-to-many,
/// `<-->` one-to-one.
pub fn relation_name(declaration: &RelationDeclaration) -> String {
    let (first, second) = declaration.field_refs();
    format!(
        "{} {} {}",
        first,
        declaration.relation_type().arrow(),
        second
    )
}
