//! Relation accessors: prepared relation traversals bound to a database handle

use crate::db::{Database, Record};
use crate::error::StoreError;
use crate::models::{DataFormat, RelationDeclaration, RelationRole};
use crate::naming::capitalize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Default accessor name for the store playing `role` in the relation:
/// `getRelated{OtherFormat}Record(s)On{OtherField}`, plural for roles that
/// return many rows. An override on the declaration takes precedence.
pub fn relation_function_name(declaration: &RelationDeclaration, role: RelationRole) -> Option<String> {
    if let Some(name) = declaration.function_name_override(role) {
        return Some(name.to_string());
    }

    let (_, other) = declaration.endpoints(role)?;
    let record = if role.returns_many() { "Records" } else { "Record" };
    Some(format!(
        "getRelated{}{}On{}",
        capitalize(&other.format_name),
        record,
        capitalize(&other.field_name)
    ))
}

/// Result of a relation accessor
#[derive(Debug, Clone, PartialEq)]
pub enum RelatedRecords {
    /// One-to-one roles and the "to many" side of one-to-many relations
    One(Option<Record>),
    /// The "from one" side of one-to-many relations and many-to-many roles
    Many(Vec<Record>),
}

impl RelatedRecords {
    /// The single record, or the first of many
    pub fn into_one(self) -> Option<Record> {
        match self {
            RelatedRecords::One(record) => record,
            RelatedRecords::Many(records) => records.into_iter().next(),
        }
    }

    pub fn into_many(self) -> Vec<Record> {
        match self {
            RelatedRecords::One(record) => record.into_iter().collect(),
            RelatedRecords::Many(records) => records,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            RelatedRecords::One(record) => usize::from(record.is_some()),
            RelatedRecords::Many(records) => records.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A relation traversal for one store
#[derive(Clone)]
pub struct RelationAccessor {
    function_name: String,
    relation_name: String,
    role: RelationRole,
    sql: String,
    target: DataFormat,
    db: Arc<dyn Database>,
}

impl fmt::Debug for RelationAccessor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RelationAccessor")
            .field("function_name", &self.function_name)
            .field("relation_name", &self.relation_name)
            .field("role", &self.role)
            .field("sql", &self.sql)
            .field("target", &self.target.name)
            .finish_non_exhaustive()
    }
}

impl RelationAccessor {
    pub fn new(
        function_name: impl Into<String>,
        relation_name: impl Into<String>,
        role: RelationRole,
        sql: impl Into<String>,
        target: DataFormat,
        db: Arc<dyn Database>,
    ) -> Self {
        Self {
            function_name: function_name.into(),
            relation_name: relation_name.into(),
            role,
            sql: sql.into(),
            target,
            db,
        }
    }

    pub fn function_name(&self) -> &str {
        &self.function_name
    }

    pub fn relation_name(&self) -> &str {
        &self.relation_name
    }

    pub fn role(&self) -> RelationRole {
        self.role
    }

    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Data format of the related records
    pub fn target(&self) -> &DataFormat {
        &self.target
    }

    pub fn returns_many(&self) -> bool {
        self.role.returns_many()
    }

    /// Fetch the records related to the local field value, keyed by the
    /// target format's field names
    pub async fn call(&self, value: impl Into<Value>) -> Result<RelatedRecords, StoreError> {
        let params = [value.into()];

        if self.returns_many() {
            let rows = self.db.query_get_rows(&self.sql, &params).await?;
            Ok(RelatedRecords::Many(
                rows.into_iter()
                    .map(|row| self.target.record_from_row(row))
                    .collect(),
            ))
        } else {
            let row = self.db.query_get_first_row(&self.sql, &params).await?;
            Ok(RelatedRecords::One(
                row.map(|row| self.target.record_from_row(row)),
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::{QueryKind, RecordingDatabase};
    use crate::models::{Field, FieldRef, ManyToManyDeclaration, OneToManyDeclaration};
    use serde_json::json;

    #[test]
    fn test_default_function_names() {
        let one_to_many = RelationDeclaration::one_to_many(
            FieldRef::new("user", "id"),
            FieldRef::new("recipe", "createdByUserId"),
        );
        assert_eq!(
            relation_function_name(&one_to_many, RelationRole::OneToManyFromOne).as_deref(),
            Some("getRelatedRecipeRecordsOnCreatedByUserId")
        );
        assert_eq!(
            relation_function_name(&one_to_many, RelationRole::OneToManyToMany).as_deref(),
            Some("getRelatedUserRecordOnId")
        );
        assert!(relation_function_name(&one_to_many, RelationRole::OneToOneFromOne).is_none());

        let many_to_many = RelationDeclaration::many_to_many(
            FieldRef::new("user", "id"),
            FieldRef::new("userGroup", "id"),
        );
        assert_eq!(
            relation_function_name(&many_to_many, RelationRole::ManyToManyFieldRef1).as_deref(),
            Some("getRelatedUserGroupRecordsOnId")
        );
        assert_eq!(
            relation_function_name(&many_to_many, RelationRole::ManyToManyFieldRef2).as_deref(),
            Some("getRelatedUserRecordsOnId")
        );
    }

    #[test]
    fn test_override_function_names() {
        let declaration: RelationDeclaration = ManyToManyDeclaration::new(
            FieldRef::new("user", "id"),
            FieldRef::new("userGroup", "id"),
        )
        .with_field_ref1_records_name("getMembers")
        .with_field_ref2_records_name("getGroups")
        .into();

        assert_eq!(
            relation_function_name(&declaration, RelationRole::ManyToManyFieldRef1).as_deref(),
            Some("getGroups")
        );
        assert_eq!(
            relation_function_name(&declaration, RelationRole::ManyToManyFieldRef2).as_deref(),
            Some("getMembers")
        );

        let declaration: RelationDeclaration = OneToManyDeclaration::new(
            FieldRef::new("user", "id"),
            FieldRef::new("recipe", "createdByUserId"),
        )
        .with_from_one_record_name("getCreator")
        .into();
        assert_eq!(
            relation_function_name(&declaration, RelationRole::OneToManyToMany).as_deref(),
            Some("getCreator")
        );
    }

    #[tokio::test]
    async fn test_call_many() {
        let db = Arc::new(RecordingDatabase::new().respond_with(
            "FROM public.recipe",
            vec![json!({"id": 1, "created_by_user_id": 7}).as_object().cloned().unwrap()],
        ));
        let accessor = RelationAccessor::new(
            "getRelatedRecipeRecordsOnCreatedByUserId",
            "user.id <-->> recipe.createdByUserId",
            RelationRole::OneToManyFromOne,
            "SELECT r.id, r.created_by_user_id FROM public.recipe r WHERE r.created_by_user_id = $1",
            DataFormat::new(
                "recipe",
                vec![Field::serial("id"), Field::integer("createdByUserId")],
            ),
            db.clone(),
        );

        let records = accessor.call(7).await.unwrap().into_many();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].get("createdByUserId"), Some(&json!(7)));

        let queries = db.queries();
        assert_eq!(queries.len(), 1);
        assert_eq!(queries[0].kind, QueryKind::Rows);
        assert_eq!(queries[0].params, vec![json!(7)]);
    }

    #[tokio::test]
    async fn test_call_one_without_row() {
        let db = Arc::new(RecordingDatabase::new());
        let accessor = RelationAccessor::new(
            "getRelatedUserRecordOnId",
            "user.id <-->> recipe.createdByUserId",
            RelationRole::OneToManyToMany,
            "SELECT r.id FROM public.user r WHERE r.id = $1",
            DataFormat::new("user", vec![Field::serial("id")]),
            db.clone(),
        );

        let related = accessor.call(3).await.unwrap();
        assert_eq!(related, RelatedRecords::One(None));
        assert!(related.is_empty());
        assert_eq!(db.queries()[0].kind, QueryKind::FirstRow);
    }
}
