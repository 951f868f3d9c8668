//! Entity store generation
//!
//! A store is built for one data format. It combines:
//! - base CRUD on the format's table ([`BaseStore`])
//! - one relation accessor per relation the format takes part in, keyed by
//!   function name (`getRelatedRecipeRecordsOnCreatedByUserId`, or an override)
//! - provisioning of the format's table, including its foreign key constraints

pub mod accessor;
pub mod base;
pub mod select;

pub use accessor::{RelatedRecords, RelationAccessor, relation_function_name};
pub use base::BaseStore;

use crate::config::{DuplicateFunctionNamePolicy, SqlOptions};
use crate::db::{Database, Record};
use crate::error::{SchemaError, StoreError};
use crate::export::SchemaSqlExporter;
use crate::models::{DataFormat, RelationRole};
use crate::relations::RelationsDict;
use crate::schema::Schema;
use indexmap::IndexMap;
use indexmap::map::Entry;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Inputs of [`create_entity_store`]
#[derive(Clone)]
pub struct EntityStoreOptions<'a> {
    pub data_formats: &'a IndexMap<String, DataFormat>,
    pub relations: &'a RelationsDict,
    /// The data format the store is built for
    pub data_format_name: &'a str,
    pub db: Arc<dyn Database>,
    pub sql_options: &'a SqlOptions,
    pub duplicate_function_names: DuplicateFunctionNamePolicy,
}

impl<'a> EntityStoreOptions<'a> {
    /// Options for one data format of a schema, failing on duplicate function names
    pub fn from_schema(schema: &'a Schema, data_format_name: &'a str, db: Arc<dyn Database>) -> Self {
        Self {
            data_formats: schema.data_formats(),
            relations: schema.relations(),
            data_format_name,
            db,
            sql_options: schema.sql_options(),
            duplicate_function_names: DuplicateFunctionNamePolicy::default(),
        }
    }

    pub fn with_duplicate_function_names(mut self, policy: DuplicateFunctionNamePolicy) -> Self {
        self.duplicate_function_names = policy;
        self
    }
}

/// A relation accessor before it is bound to a database handle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RelationFunctionPlan {
    pub function_name: String,
    pub relation_name: String,
    pub role: RelationRole,
    /// Data format the accessor returns records of
    pub target_format: String,
    pub sql: String,
}

/// Name and prepare the relation accessors of a data format's store.
///
/// Accessors are grouped by role in the order of [`RelationRole::ALL`] and by
/// declaration order within a role. A relation with both endpoints on the
/// format yields an accessor for each of its roles. Two accessors with the
/// same name fail with `DuplicateRelationFunctionName` unless the policy is
/// `Overwrite`, in which case the later one replaces the earlier one.
pub fn plan_relation_functions(
    data_formats: &IndexMap<String, DataFormat>,
    relations: &RelationsDict,
    data_format_name: &str,
    sql_options: &SqlOptions,
    policy: DuplicateFunctionNamePolicy,
) -> Result<IndexMap<String, RelationFunctionPlan>, SchemaError> {
    if !data_formats.contains_key(data_format_name) {
        return Err(SchemaError::UnknownDataFormat(data_format_name.to_string()));
    }

    let relevant = relations.relevant_to(data_format_name);
    let mut plans: IndexMap<String, RelationFunctionPlan> = IndexMap::new();

    for role in RelationRole::ALL {
        for relation in &relevant {
            let declaration = &relation.declaration;
            if !declaration.roles_of(data_format_name).contains(&role) {
                continue;
            }
            let (Some(function_name), Some((_, other)), Some(sql)) = (
                relation_function_name(declaration, role),
                declaration.endpoints(role),
                select::relation_select_sql(data_formats, declaration, role, sql_options),
            ) else {
                continue;
            };

            let plan = RelationFunctionPlan {
                function_name: function_name.clone(),
                relation_name: relation.name.clone(),
                role,
                target_format: other.format_name.clone(),
                sql: sql?,
            };

            match plans.entry(function_name) {
                Entry::Vacant(entry) => {
                    entry.insert(plan);
                }
                Entry::Occupied(mut entry) => match policy {
                    DuplicateFunctionNamePolicy::Fail => {
                        return Err(SchemaError::DuplicateRelationFunctionName {
                            data_format: data_format_name.to_string(),
                            function_name: entry.key().clone(),
                            first_relation: entry.get().relation_name.clone(),
                            second_relation: plan.relation_name,
                        });
                    }
                    DuplicateFunctionNamePolicy::Overwrite => {
                        warn!(
                            "Function {} on the {} store from {} is replaced by the one from {}",
                            entry.key(),
                            data_format_name,
                            entry.get().relation_name,
                            plan.relation_name
                        );
                        entry.insert(plan);
                    }
                },
            }
        }
    }

    Ok(plans)
}

/// Build the store of one data format
pub fn create_entity_store(options: EntityStoreOptions<'_>) -> Result<Store, SchemaError> {
    let data_format = options
        .data_formats
        .get(options.data_format_name)
        .ok_or_else(|| SchemaError::UnknownDataFormat(options.data_format_name.to_string()))?;

    let plans = plan_relation_functions(
        options.data_formats,
        options.relations,
        options.data_format_name,
        options.sql_options,
        options.duplicate_function_names,
    )?;

    let functions = plans
        .into_iter()
        .map(|(name, plan)| {
            debug!("{} store: {} ({})", data_format.name, name, plan.role);
            let target = options
                .data_formats
                .get(&plan.target_format)
                .ok_or_else(|| SchemaError::UnknownDataFormat(plan.target_format.clone()))?;
            let accessor = RelationAccessor::new(
                plan.function_name,
                plan.relation_name,
                plan.role,
                plan.sql,
                target.clone(),
                options.db.clone(),
            );
            Ok((name, accessor))
        })
        .collect::<Result<IndexMap<String, RelationAccessor>, SchemaError>>()?;

    let foreign_keys = options.relations.imposing_foreign_key_on(&data_format.name);
    let create_table_sql =
        SchemaSqlExporter::create_table_sql(data_format, &foreign_keys, options.sql_options);
    let drop_table_sql = SchemaSqlExporter::drop_table_sql(data_format, options.sql_options);

    info!(
        "Created store for {} with {} relation functions",
        data_format.name,
        functions.len()
    );

    Ok(Store {
        base: BaseStore::new(data_format.clone(), options.db.clone(), options.sql_options),
        functions,
        create_table_sql,
        drop_table_sql,
        db: options.db,
    })
}

/// Generated data access for one data format
#[derive(Clone)]
pub struct Store {
    base: BaseStore,
    functions: IndexMap<String, RelationAccessor>,
    create_table_sql: String,
    drop_table_sql: String,
    db: Arc<dyn Database>,
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("data_format", &self.base.data_format().name)
            .field("functions", &self.functions.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Store {
    pub fn data_format(&self) -> &DataFormat {
        self.base.data_format()
    }

    pub fn base(&self) -> &BaseStore {
        &self.base
    }

    /// Relation accessor names, in role order
    pub fn function_names(&self) -> impl Iterator<Item = &str> {
        self.functions.keys().map(String::as_str)
    }

    pub fn has_function(&self, function_name: &str) -> bool {
        self.functions.contains_key(function_name)
    }

    pub fn accessor(&self, function_name: &str) -> Option<&RelationAccessor> {
        self.functions.get(function_name)
    }

    pub fn accessors(&self) -> impl Iterator<Item = &RelationAccessor> {
        self.functions.values()
    }

    /// Call a relation accessor by name with the local field value
    pub async fn call(
        &self,
        function_name: &str,
        value: impl Into<Value>,
    ) -> Result<RelatedRecords, StoreError> {
        let accessor = self
            .accessor(function_name)
            .ok_or_else(|| StoreError::UnknownFunction {
                data_format: self.data_format().name.clone(),
                function_name: function_name.to_string(),
            })?;
        accessor.call(value).await
    }

    pub fn create_table_sql(&self) -> &str {
        &self.create_table_sql
    }

    pub fn drop_table_sql(&self) -> &str {
        &self.drop_table_sql
    }

    /// Create the table if it does not exist
    pub async fn provision(&self) -> Result<bool, StoreError> {
        info!("Provisioning {}", self.base.table());
        self.db.execute_batch(&self.create_table_sql).await?;
        Ok(true)
    }

    /// Drop the table if it exists
    pub async fn unprovision(&self) -> Result<bool, StoreError> {
        info!("Unprovisioning {}", self.base.table());
        self.db.execute_batch(&self.drop_table_sql).await?;
        Ok(true)
    }

    pub async fn get_all(&self) -> Result<Vec<Record>, StoreError> {
        self.base.get_all().await
    }

    pub async fn get_by(
        &self,
        field_name: &str,
        value: impl Into<Value>,
    ) -> Result<Option<Record>, StoreError> {
        self.base.get_by(field_name, value).await
    }

    pub async fn get_many_by(
        &self,
        field_name: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Record>, StoreError> {
        self.base.get_many_by(field_name, value).await
    }

    pub async fn add(&self, record: Record) -> Result<Option<Record>, StoreError> {
        self.base.add(record).await
    }

    pub async fn delete_by(
        &self,
        field_name: &str,
        value: impl Into<Value>,
    ) -> Result<Vec<Record>, StoreError> {
        self.base.delete_by(field_name, value).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::RecordingDatabase;
    use crate::models::{Field, FieldRef, OneToManyDeclaration, RelationDeclaration};

    fn schema(declarations: Vec<RelationDeclaration>) -> Schema {
        Schema::new(
            vec![
                DataFormat::new(
                    "employee",
                    vec![Field::serial("id"), Field::integer("managerId").nullable()],
                ),
                DataFormat::new("team", vec![Field::serial("id"), Field::integer("leadId")]),
            ],
            declarations,
            SqlOptions::default(),
        )
        .unwrap()
    }

    fn plan(schema: &Schema, policy: DuplicateFunctionNamePolicy) -> Result<Vec<String>, SchemaError> {
        plan_relation_functions(
            schema.data_formats(),
            schema.relations(),
            "employee",
            schema.sql_options(),
            policy,
        )
        .map(|plans| plans.keys().cloned().collect())
    }

    #[test]
    fn test_self_relation_has_both_roles() {
        let schema = schema(vec![RelationDeclaration::one_to_many(
            FieldRef::new("employee", "id"),
            FieldRef::new("employee", "managerId"),
        )]);

        assert_eq!(
            plan(&schema, DuplicateFunctionNamePolicy::Fail).unwrap(),
            vec![
                "getRelatedEmployeeRecordsOnManagerId",
                "getRelatedEmployeeRecordOnId"
            ]
        );
    }

    #[test]
    fn test_duplicate_function_names() {
        let schema = schema(vec![
            RelationDeclaration::one_to_many(
                FieldRef::new("employee", "id"),
                FieldRef::new("team", "leadId"),
            ),
            OneToManyDeclaration::new(
                FieldRef::new("employee", "managerId"),
                FieldRef::new("team", "id"),
            )
            .with_to_many_records_name("getRelatedTeamRecordsOnLeadId")
            .into(),
        ]);

        match plan(&schema, DuplicateFunctionNamePolicy::Fail) {
            Err(SchemaError::DuplicateRelationFunctionName {
                data_format,
                function_name,
                first_relation,
                second_relation,
            }) => {
                assert_eq!(data_format, "employee");
                assert_eq!(function_name, "getRelatedTeamRecordsOnLeadId");
                assert_eq!(first_relation, "employee.id <-->> team.leadId");
                assert_eq!(second_relation, "employee.managerId <-->> team.id");
            }
            other => panic!("unexpected result: {:?}", other),
        }

        let plans = plan_relation_functions(
            schema.data_formats(),
            schema.relations(),
            "employee",
            schema.sql_options(),
            DuplicateFunctionNamePolicy::Overwrite,
        )
        .unwrap();
        assert_eq!(plans.len(), 1);
        assert_eq!(
            plans["getRelatedTeamRecordsOnLeadId"].relation_name,
            "employee.managerId <-->> team.id"
        );
        assert_eq!(plans["getRelatedTeamRecordsOnLeadId"].target_format, "team");
    }

    #[test]
    fn test_unknown_data_format() {
        let schema = schema(vec![]);
        let db: Arc<dyn Database> = Arc::new(RecordingDatabase::new());
        let result = create_entity_store(EntityStoreOptions::from_schema(&schema, "project", db));
        assert!(matches!(result, Err(SchemaError::UnknownDataFormat(_))));
    }

    #[tokio::test]
    async fn test_unknown_function() {
        let schema = schema(vec![]);
        let db: Arc<dyn Database> = Arc::new(RecordingDatabase::new());
        let store = create_entity_store(EntityStoreOptions::from_schema(&schema, "team", db)).unwrap();

        assert_eq!(store.function_names().count(), 0);
        assert!(matches!(
            store.call("getRelatedEmployeeRecordOnId", 1).await,
            Err(StoreError::UnknownFunction { .. })
        ));
    }
}
