//! Relation declaration model for the SDK

use super::data_format::FieldRef;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The three relation shapes
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationType {
    ManyToMany,
    OneToMany,
    OneToOne,
}

impl RelationType {
    /// Arrow used in canonical relation names
    pub fn arrow(&self) -> &'static str {
        match self {
            RelationType::ManyToMany => "<<-->>",
            RelationType::OneToMany => "<-->>",
            RelationType::OneToOne => "<-->",
        }
    }
}

impl fmt::Display for RelationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RelationType::ManyToMany => "MANY_TO_MANY",
            RelationType::OneToMany => "ONE_TO_MANY",
            RelationType::OneToOne => "ONE_TO_ONE",
        };
        f.write_str(text)
    }
}

/// Many-to-many relation, materialized as a join table.
///
/// The order of the two field refs only affects naming.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ManyToManyDeclaration {
    pub field_ref1: FieldRef,
    pub field_ref2: FieldRef,
    /// Accessor name on field_ref2's store returning field_ref1 records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_related_field_ref1_records_name: Option<String>,
    /// Accessor name on field_ref1's store returning field_ref2 records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_related_field_ref2_records_name: Option<String>,
}

impl ManyToManyDeclaration {
    pub fn new(field_ref1: FieldRef, field_ref2: FieldRef) -> Self {
        Self {
            field_ref1,
            field_ref2,
            get_related_field_ref1_records_name: None,
            get_related_field_ref2_records_name: None,
        }
    }

    pub fn with_field_ref1_records_name(mut self, name: impl Into<String>) -> Self {
        self.get_related_field_ref1_records_name = Some(name.into());
        self
    }

    pub fn with_field_ref2_records_name(mut self, name: impl Into<String>) -> Self {
        self.get_related_field_ref2_records_name = Some(name.into());
        self
    }
}

/// One-to-many relation. The "to many" side holds the foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OneToManyDeclaration {
    pub from_one_field: FieldRef,
    pub to_many_field: FieldRef,
    /// Accessor name on the "to many" store returning the "from one" record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_related_from_one_record_name: Option<String>,
    /// Accessor name on the "from one" store returning the "to many" records
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_related_to_many_records_name: Option<String>,
}

impl OneToManyDeclaration {
    pub fn new(from_one_field: FieldRef, to_many_field: FieldRef) -> Self {
        Self {
            from_one_field,
            to_many_field,
            get_related_from_one_record_name: None,
            get_related_to_many_records_name: None,
        }
    }

    pub fn with_from_one_record_name(mut self, name: impl Into<String>) -> Self {
        self.get_related_from_one_record_name = Some(name.into());
        self
    }

    pub fn with_to_many_records_name(mut self, name: impl Into<String>) -> Self {
        self.get_related_to_many_records_name = Some(name.into());
        self
    }
}

/// One-to-one relation. The "to one" side holds the foreign key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OneToOneDeclaration {
    pub from_one_field: FieldRef,
    pub to_one_field: FieldRef,
    /// Accessor name on the "to one" store returning the "from one" record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_related_from_one_record_name: Option<String>,
    /// Accessor name on the "from one" store returning the "to one" record
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub get_related_to_one_record_name: Option<String>,
}

impl OneToOneDeclaration {
    pub fn new(from_one_field: FieldRef, to_one_field: FieldRef) -> Self {
        Self {
            from_one_field,
            to_one_field,
            get_related_from_one_record_name: None,
            get_related_to_one_record_name: None,
        }
    }

    pub fn with_from_one_record_name(mut self, name: impl Into<String>) -> Self {
        self.get_related_from_one_record_name = Some(name.into());
        self
    }

    pub fn with_to_one_record_name(mut self, name: impl Into<String>) -> Self {
        self.get_related_to_one_record_name = Some(name.into());
        self
    }
}

/// A declared relation between two fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationDeclaration {
    ManyToMany(ManyToManyDeclaration),
    OneToMany(OneToManyDeclaration),
    OneToOne(OneToOneDeclaration),
}

impl RelationDeclaration {
    pub fn many_to_many(field_ref1: FieldRef, field_ref2: FieldRef) -> Self {
        Self::ManyToMany(ManyToManyDeclaration::new(field_ref1, field_ref2))
    }

    pub fn one_to_many(from_one_field: FieldRef, to_many_field: FieldRef) -> Self {
        Self::OneToMany(OneToManyDeclaration::new(from_one_field, to_many_field))
    }

    pub fn one_to_one(from_one_field: FieldRef, to_one_field: FieldRef) -> Self {
        Self::OneToOne(OneToOneDeclaration::new(from_one_field, to_one_field))
    }

    pub fn relation_type(&self) -> RelationType {
        match self {
            RelationDeclaration::ManyToMany(_) => RelationType::ManyToMany,
            RelationDeclaration::OneToMany(_) => RelationType::OneToMany,
            RelationDeclaration::OneToOne(_) => RelationType::OneToOne,
        }
    }

    /// Both endpoints, in declaration order
    pub fn field_refs(&self) -> (&FieldRef, &FieldRef) {
        match self {
            RelationDeclaration::ManyToMany(d) => (&d.field_ref1, &d.field_ref2),
            RelationDeclaration::OneToMany(d) => (&d.from_one_field, &d.to_many_field),
            RelationDeclaration::OneToOne(d) => (&d.from_one_field, &d.to_one_field),
        }
    }

    /// Whether the data format occupies either endpoint
    pub fn involves(&self, format_name: &str) -> bool {
        let (first, second) = self.field_refs();
        first.format_name == format_name || second.format_name == format_name
    }

    /// The field holding the foreign key column, if the relation puts one on
    /// an entity table. Many-to-many relations keep theirs in the join table.
    pub fn foreign_key_holder(&self) -> Option<&FieldRef> {
        match self {
            RelationDeclaration::ManyToMany(_) => None,
            RelationDeclaration::OneToMany(d) => Some(&d.to_many_field),
            RelationDeclaration::OneToOne(d) => Some(&d.to_one_field),
        }
    }

    /// The field referenced by the foreign key, if any
    pub fn referenced_field(&self) -> Option<&FieldRef> {
        match self {
            RelationDeclaration::ManyToMany(_) => None,
            RelationDeclaration::OneToMany(d) => Some(&d.from_one_field),
            RelationDeclaration::OneToOne(d) => Some(&d.from_one_field),
        }
    }

    /// Roles the data format plays in this relation, in role order.
    ///
    /// Empty when the format is not involved; two roles for a relation whose
    /// endpoints are both on the format.
    pub fn roles_of(&self, format_name: &str) -> Vec<RelationRole> {
        let (first, second) = self.field_refs();
        let (first_role, second_role) = match self {
            RelationDeclaration::ManyToMany(_) => (
                RelationRole::ManyToManyFieldRef1,
                RelationRole::ManyToManyFieldRef2,
            ),
            RelationDeclaration::OneToMany(_) => {
                (RelationRole::OneToManyFromOne, RelationRole::OneToManyToMany)
            }
            RelationDeclaration::OneToOne(_) => {
                (RelationRole::OneToOneFromOne, RelationRole::OneToOneToOne)
            }
        };

        let mut roles = Vec::new();
        if first.format_name == format_name {
            roles.push(first_role);
        }
        if second.format_name == format_name {
            roles.push(second_role);
        }
        roles
    }

    /// `(local, other)` endpoints seen from `role`, or `None` when the role
    /// belongs to another relation shape
    pub fn endpoints(&self, role: RelationRole) -> Option<(&FieldRef, &FieldRef)> {
        match (self, role) {
            (RelationDeclaration::OneToOne(d), RelationRole::OneToOneFromOne) => {
                Some((&d.from_one_field, &d.to_one_field))
            }
            (RelationDeclaration::OneToOne(d), RelationRole::OneToOneToOne) => {
                Some((&d.to_one_field, &d.from_one_field))
            }
            (RelationDeclaration::OneToMany(d), RelationRole::OneToManyFromOne) => {
                Some((&d.from_one_field, &d.to_many_field))
            }
            (RelationDeclaration::OneToMany(d), RelationRole::OneToManyToMany) => {
                Some((&d.to_many_field, &d.from_one_field))
            }
            (RelationDeclaration::ManyToMany(d), RelationRole::ManyToManyFieldRef1) => {
                Some((&d.field_ref1, &d.field_ref2))
            }
            (RelationDeclaration::ManyToMany(d), RelationRole::ManyToManyFieldRef2) => {
                Some((&d.field_ref2, &d.field_ref1))
            }
            _ => None,
        }
    }

    /// Accessor name override for the store playing `role`
    pub fn function_name_override(&self, role: RelationRole) -> Option<&str> {
        let name = match (self, role) {
            (RelationDeclaration::OneToOne(d), RelationRole::OneToOneFromOne) => {
                &d.get_related_to_one_record_name
            }
            (RelationDeclaration::OneToOne(d), RelationRole::OneToOneToOne) => {
                &d.get_related_from_one_record_name
            }
            (RelationDeclaration::OneToMany(d), RelationRole::OneToManyFromOne) => {
                &d.get_related_to_many_records_name
            }
            (RelationDeclaration::OneToMany(d), RelationRole::OneToManyToMany) => {
                &d.get_related_from_one_record_name
            }
            (RelationDeclaration::ManyToMany(d), RelationRole::ManyToManyFieldRef1) => {
                &d.get_related_field_ref2_records_name
            }
            (RelationDeclaration::ManyToMany(d), RelationRole::ManyToManyFieldRef2) => {
                &d.get_related_field_ref1_records_name
            }
            _ => return None,
        };
        name.as_deref()
    }
}

impl From<ManyToManyDeclaration> for RelationDeclaration {
    fn from(d: ManyToManyDeclaration) -> Self {
        RelationDeclaration::ManyToMany(d)
    }
}

impl From<OneToManyDeclaration> for RelationDeclaration {
    fn from(d: OneToManyDeclaration) -> Self {
        RelationDeclaration::OneToMany(d)
    }
}

impl From<OneToOneDeclaration> for RelationDeclaration {
    fn from(d: OneToOneDeclaration) -> Self {
        RelationDeclaration::OneToOne(d)
    }
}

/// Which endpoint of which relation shape a data format occupies.
///
/// Stores group their relation accessors by role, in the order of [`RelationRole::ALL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationRole {
    OneToOneFromOne,
    OneToOneToOne,
    OneToManyFromOne,
    OneToManyToMany,
    ManyToManyFieldRef1,
    ManyToManyFieldRef2,
}

impl RelationRole {
    pub const ALL: [RelationRole; 6] = [
        RelationRole::OneToOneFromOne,
        RelationRole::OneToOneToOne,
        RelationRole::OneToManyFromOne,
        RelationRole::OneToManyToMany,
        RelationRole::ManyToManyFieldRef1,
        RelationRole::ManyToManyFieldRef2,
    ];

    pub fn relation_type(&self) -> RelationType {
        match self {
            RelationRole::OneToOneFromOne | RelationRole::OneToOneToOne => RelationType::OneToOne,
            RelationRole::OneToManyFromOne | RelationRole::OneToManyToMany => {
                RelationType::OneToMany
            }
            RelationRole::ManyToManyFieldRef1 | RelationRole::ManyToManyFieldRef2 => {
                RelationType::ManyToMany
            }
        }
    }

    /// Whether traversing from this role can yield more than one row
    pub fn returns_many(&self) -> bool {
        matches!(
            self,
            RelationRole::OneToManyFromOne
                | RelationRole::ManyToManyFieldRef1
                | RelationRole::ManyToManyFieldRef2
        )
    }
}

impl fmt::Display for RelationRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            RelationRole::OneToOneFromOne => "one-to-one (from one)",
            RelationRole::OneToOneToOne => "one-to-one (to one)",
            RelationRole::OneToManyFromOne => "one-to-many (from one)",
            RelationRole::OneToManyToMany => "one-to-many (to many)",
            RelationRole::ManyToManyFieldRef1 => "many-to-many (field ref 1)",
            RelationRole::ManyToManyFieldRef2 => "many-to-many (field ref 2)",
        };
        f.write_str(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_id() -> FieldRef {
        FieldRef::new("user", "id")
    }

    #[test]
    fn test_foreign_key_holder() {
        let recipe = FieldRef::new("recipe", "createdByUserId");
        let one_to_many = RelationDeclaration::one_to_many(user_id(), recipe.clone());
        assert_eq!(one_to_many.foreign_key_holder(), Some(&recipe));
        assert_eq!(one_to_many.referenced_field(), Some(&user_id()));

        let many_to_many =
            RelationDeclaration::many_to_many(user_id(), FieldRef::new("userGroup", "id"));
        assert!(many_to_many.foreign_key_holder().is_none());
    }

    #[test]
    fn test_roles_of() {
        let relation =
            RelationDeclaration::one_to_one(user_id(), FieldRef::new("userAddress", "userId"));
        assert_eq!(relation.roles_of("user"), vec![RelationRole::OneToOneFromOne]);
        assert_eq!(
            relation.roles_of("userAddress"),
            vec![RelationRole::OneToOneToOne]
        );
        assert!(relation.roles_of("recipe").is_empty());

        let self_relation =
            RelationDeclaration::one_to_many(user_id(), FieldRef::new("user", "managerId"));
        assert_eq!(
            self_relation.roles_of("user"),
            vec![RelationRole::OneToManyFromOne, RelationRole::OneToManyToMany]
        );
    }

    #[test]
    fn test_endpoints_and_overrides() {
        let address = FieldRef::new("userAddress", "userId");
        let relation = RelationDeclaration::OneToOne(
            OneToOneDeclaration::new(user_id(), address.clone())
                .with_to_one_record_name("getAddress"),
        );

        assert_eq!(
            relation.endpoints(RelationRole::OneToOneFromOne),
            Some((&user_id(), &address))
        );
        assert_eq!(
            relation.endpoints(RelationRole::OneToOneToOne),
            Some((&address, &user_id()))
        );
        assert!(relation.endpoints(RelationRole::ManyToManyFieldRef1).is_none());

        assert_eq!(
            relation.function_name_override(RelationRole::OneToOneFromOne),
            Some("getAddress")
        );
        assert!(relation
            .function_name_override(RelationRole::OneToOneToOne)
            .is_none());
    }

    #[test]
    fn test_deserialize_tagged_declaration() {
        let json = r#"{
            "type": "MANY_TO_MANY",
            "field_ref1": "user.id",
            "field_ref2": "userGroup.id",
            "get_related_field_ref2_records_name": "getUserGroups"
        }"#;

        let declaration: RelationDeclaration = serde_json::from_str(json).unwrap();
        match declaration {
            RelationDeclaration::ManyToMany(d) => {
                assert_eq!(d.field_ref1, user_id());
                assert_eq!(d.field_ref2, FieldRef::new("userGroup", "id"));
                assert_eq!(
                    d.get_related_field_ref2_records_name.as_deref(),
                    Some("getUserGroups")
                );
                assert!(d.get_related_field_ref1_records_name.is_none());
            }
            other => panic!("unexpected declaration: {:?}", other),
        }
    }

    #[test]
    fn test_returns_many() {
        let many: Vec<_> = RelationRole::ALL
            .iter()
            .filter(|role| role.returns_many())
            .collect();
        assert_eq!(
            many,
            vec![
                &RelationRole::OneToManyFromOne,
                &RelationRole::ManyToManyFieldRef1,
                &RelationRole::ManyToManyFieldRef2
            ]
        );
    }
}
