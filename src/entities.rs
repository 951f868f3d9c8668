//! All stores of a schema
//!
//! Builds one store per data format and provisions the whole schema: entity
//! tables in foreign key dependency order, then the join tables of
//! many-to-many relations. Unprovisioning runs the same steps in reverse.

use crate::config::DuplicateFunctionNamePolicy;
use crate::db::Database;
use crate::error::{SchemaError, StoreError};
use crate::schema::Schema;
use crate::store::{EntityStoreOptions, Store, create_entity_store};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// One store per data format, sharing a database handle
#[derive(Clone)]
pub struct Entities {
    schema: Schema,
    stores: IndexMap<String, Store>,
    provisioning_order: Vec<String>,
    db: Arc<dyn Database>,
}

impl fmt::Debug for Entities {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entities")
            .field("stores", &self.stores)
            .field("provisioning_order", &self.provisioning_order)
            .finish_non_exhaustive()
    }
}

impl Entities {
    pub fn new(
        schema: Schema,
        db: Arc<dyn Database>,
        policy: DuplicateFunctionNamePolicy,
    ) -> Result<Self, SchemaError> {
        let provisioning_order = schema.provisioning_order()?;

        let mut stores = IndexMap::with_capacity(schema.data_formats().len());
        for name in schema.data_formats().keys() {
            let options = EntityStoreOptions::from_schema(&schema, name, db.clone())
                .with_duplicate_function_names(policy);
            stores.insert(name.clone(), create_entity_store(options)?);
        }

        info!(
            "Created {} stores, provisioning order: {}",
            stores.len(),
            provisioning_order.join(", ")
        );

        Ok(Self {
            schema,
            stores,
            provisioning_order,
            db,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Store of a data format
    pub fn store(&self, data_format_name: &str) -> Option<&Store> {
        self.stores.get(data_format_name)
    }

    pub fn stores(&self) -> impl Iterator<Item = (&str, &Store)> {
        self.stores.iter().map(|(name, store)| (name.as_str(), store))
    }

    /// Data format names, referenced formats first
    pub fn provisioning_order(&self) -> &[String] {
        &self.provisioning_order
    }

    fn ordered_stores(&self) -> impl DoubleEndedIterator<Item = &Store> {
        self.provisioning_order
            .iter()
            .filter_map(|name| self.stores.get(name))
    }

    /// Create every table: entity tables in provisioning order, then join tables
    pub async fn provision(&self) -> Result<bool, StoreError> {
        for store in self.ordered_stores() {
            store.provision().await?;
        }
        for join_table in self.schema.relations().join_tables() {
            info!("Provisioning join table {}", join_table.join_table_name);
            self.db
                .execute_batch(&join_table.create_join_table_sql)
                .await?;
        }
        Ok(true)
    }

    /// Drop every table: join tables first, then entity tables in reverse
    /// provisioning order
    pub async fn unprovision(&self) -> Result<bool, StoreError> {
        let join_tables: Vec<_> = self.schema.relations().join_tables().collect();
        for join_table in join_tables.into_iter().rev() {
            info!("Unprovisioning join table {}", join_table.join_table_name);
            self.db.execute_batch(&join_table.drop_join_table_sql).await?;
        }
        for store in self.ordered_stores().rev() {
            store.unprovision().await?;
        }
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SqlOptions;
    use crate::db::{QueryKind, RecordingDatabase};
    use crate::models::{DataFormat, Field, FieldRef, RelationDeclaration};

    fn schema() -> Schema {
        Schema::new(
            vec![
                DataFormat::new(
                    "recipe",
                    vec![Field::serial("id"), Field::integer("createdByUserId")],
                ),
                DataFormat::new("user", vec![Field::serial("id")]),
                DataFormat::new("ingredient", vec![Field::serial("id")]),
            ],
            vec![
                RelationDeclaration::one_to_many(
                    FieldRef::new("user", "id"),
                    FieldRef::new("recipe", "createdByUserId"),
                ),
                RelationDeclaration::many_to_many(
                    FieldRef::new("recipe", "id"),
                    FieldRef::new("ingredient", "id"),
                ),
            ],
            SqlOptions::default(),
        )
        .unwrap()
    }

    fn batches(db: &RecordingDatabase) -> Vec<String> {
        db.queries()
            .into_iter()
            .filter(|q| q.kind == QueryKind::Batch)
            .map(|q| q.sql.lines().next().unwrap_or_default().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_provision_order() {
        let db = Arc::new(RecordingDatabase::new());
        let entities =
            Entities::new(schema(), db.clone(), DuplicateFunctionNamePolicy::Fail).unwrap();

        assert!(entities.provision().await.unwrap());
        assert_eq!(
            batches(&db),
            vec![
                "CREATE TABLE IF NOT EXISTS public.user",
                "CREATE TABLE IF NOT EXISTS public.recipe",
                "CREATE TABLE IF NOT EXISTS public.ingredient",
                "CREATE TABLE IF NOT EXISTS public.recipe_to_ingredient",
            ]
        );

        db.clear();
        assert!(entities.unprovision().await.unwrap());
        assert_eq!(
            batches(&db),
            vec![
                "drop table if exists public.recipe_to_ingredient;",
                "drop table if exists public.ingredient;",
                "drop table if exists public.recipe;",
                "drop table if exists public.user;",
            ]
        );
    }

    #[test]
    fn test_stores() {
        let db: Arc<dyn Database> = Arc::new(RecordingDatabase::new());
        let entities = Entities::new(schema(), db, DuplicateFunctionNamePolicy::Fail).unwrap();

        assert_eq!(entities.stores().count(), 3);
        let recipe = entities.store("recipe").unwrap();
        assert_eq!(
            recipe.function_names().collect::<Vec<_>>(),
            vec![
                "getRelatedUserRecordOnId",
                "getRelatedIngredientRecordsOnId"
            ]
        );
        assert!(entities.store("unknown").is_none());
    }

    #[tokio::test]
    async fn test_foreign_key_cycle_without_sql() {
        let schema = Schema::new(
            vec![
                DataFormat::new("a", vec![Field::serial("id"), Field::integer("bId")]),
                DataFormat::new("b", vec![Field::serial("id"), Field::integer("aId")]),
            ],
            vec![
                RelationDeclaration::one_to_one(FieldRef::new("a", "id"), FieldRef::new("b", "aId")),
                RelationDeclaration::one_to_one(FieldRef::new("b", "id"), FieldRef::new("a", "bId")),
            ],
            SqlOptions::new().with_enable_sql(false),
        )
        .unwrap();

        let db = Arc::new(RecordingDatabase::new());
        let entities =
            Entities::new(schema, db.clone(), DuplicateFunctionNamePolicy::Fail).unwrap();

        assert_eq!(entities.provisioning_order(), ["a", "b"]);
        assert_eq!(
            entities.store("a").unwrap().function_names().collect::<Vec<_>>(),
            vec!["getRelatedBRecordOnAId", "getRelatedBRecordOnId"]
        );

        assert!(entities.provision().await.unwrap());
        let batches = batches(&db);
        assert_eq!(
            batches,
            vec![
                "CREATE TABLE IF NOT EXISTS public.a",
                "CREATE TABLE IF NOT EXISTS public.b",
            ]
        );
        assert!(db.queries().iter().all(|q| !q.sql.contains("constraint")));
    }
}
