//! PostgreSQL backend tests
//!
//! Run against a live server by setting ENTITY_STORE_TEST_DATABASE_URL; every
//! test returns early when it is not set.

#![cfg(feature = "postgres-backend")]

use entity_store_sdk::{
    DatabaseConfig, DuplicateFunctionNamePolicy, Entities, PostgresDatabase, SchemaDocument,
    SqlOptions,
};
use serde_json::{Value, json};
use std::sync::Arc;

const FIXTURE: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/tests/fixtures/recipes.yaml");

fn database() -> Option<Arc<PostgresDatabase>> {
    let url = std::env::var("ENTITY_STORE_TEST_DATABASE_URL").ok()?;
    let config = DatabaseConfig {
        url: Some(url),
        max_connections: 2,
    };
    Some(Arc::new(PostgresDatabase::connect(&config).unwrap()))
}

fn record(value: Value) -> entity_store_sdk::Record {
    value.as_object().cloned().unwrap()
}

mod postgres_tests {
    use super::*;

    #[tokio::test]
    async fn test_provision_and_query_relations() {
        let Some(db) = database() else {
            return;
        };

        let schema = SchemaDocument::from_file(FIXTURE)
            .unwrap()
            .into_schema(SqlOptions::new().with_tablespace(None).with_owner(None))
            .unwrap();
        let entities = Entities::new(schema, db, DuplicateFunctionNamePolicy::Fail).unwrap();

        entities.unprovision().await.unwrap();
        assert!(entities.provision().await.unwrap());
        assert!(entities.provision().await.unwrap());

        let users = entities.store("user").unwrap();
        let user = users
            .add(record(json!({"name": "Ada", "email": "ada@example.com"})))
            .await
            .unwrap()
            .unwrap();
        let user_id = user.get("id").cloned().unwrap();

        let recipes = entities.store("recipe").unwrap();
        recipes
            .add(record(json!({
                "title": "Soup",
                "createdByUserId": user_id,
                "createdAt": "2024-05-01T12:00:00Z"
            })))
            .await
            .unwrap();

        let related = users
            .call("getRelatedRecipeRecordsOnCreatedByUserId", user_id.clone())
            .await
            .unwrap()
            .into_many();
        assert_eq!(related.len(), 1);
        assert_eq!(related[0].get("title"), Some(&json!("Soup")));

        let creator = recipes
            .call("getRelatedUserRecordOnId", user_id)
            .await
            .unwrap()
            .into_one()
            .unwrap();
        assert_eq!(creator.get("email"), Some(&json!("ada@example.com")));

        assert!(entities.unprovision().await.unwrap());
        assert!(entities.unprovision().await.unwrap());
    }
}
