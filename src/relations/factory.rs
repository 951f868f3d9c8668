//! Materialized relations: a declaration with its name and DDL attached

use super::identity::relation_name;
use super::sql;
use crate::config::SqlOptions;
use crate::models::RelationDeclaration;
use tracing::debug;

/// DDL of a many-to-many relation's join table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTableSql {
    pub join_table_name: String,
    pub create_join_table_sql: String,
    pub drop_join_table_sql: String,
}

/// SQL attached to a relation, one variant per relation shape
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RelationSql {
    ManyToMany(JoinTableSql),
    /// Foreign key clause for the "to many" side's table
    OneToMany { foreign_key_sql: String },
    /// Foreign key clause for the "to one" side's table
    OneToOne { foreign_key_sql: String },
}

impl RelationSql {
    /// The foreign key clause, for relations that put one on an entity table
    pub fn foreign_key_sql(&self) -> Option<&str> {
        match self {
            RelationSql::ManyToMany(_) => None,
            RelationSql::OneToMany { foreign_key_sql } | RelationSql::OneToOne { foreign_key_sql } => {
                Some(foreign_key_sql.as_str())
            }
        }
    }

    pub fn join_table(&self) -> Option<&JoinTableSql> {
        match self {
            RelationSql::ManyToMany(join_table) => Some(join_table),
            _ => None,
        }
    }
}

/// A declared relation, named and (optionally) carrying its DDL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Relation {
    pub name: String,
    pub declaration: RelationDeclaration,
    /// `None` when SQL generation is disabled
    pub sql: Option<RelationSql>,
}

/// Build a relation from its declaration.
///
/// With `enable_sql` off the relation carries no DDL and can only be used for
/// naming and lookups.
pub fn create_relation(declaration: &RelationDeclaration, options: &SqlOptions) -> Relation {
    let name = relation_name(declaration);

    let sql = options.enable_sql.then(|| match declaration {
        RelationDeclaration::ManyToMany(d) => RelationSql::ManyToMany(JoinTableSql {
            join_table_name: sql::join_table_name(d),
            create_join_table_sql: sql::create_join_table_sql(d, options),
            drop_join_table_sql: sql::drop_join_table_sql(d, options),
        }),
        RelationDeclaration::OneToMany(d) => RelationSql::OneToMany {
            foreign_key_sql: sql::one_to_many_foreign_key_sql(d, options),
        },
        RelationDeclaration::OneToOne(d) => RelationSql::OneToOne {
            foreign_key_sql: sql::one_to_one_foreign_key_sql(d, options),
        },
    });

    debug!("Created relation {} (sql: {})", name, sql.is_some());

    Relation {
        name,
        declaration: declaration.clone(),
        sql,
    }
}

impl Relation {
    /// Join table DDL, for many-to-many relations with SQL enabled
    pub fn join_table(&self) -> Option<&JoinTableSql> {
        self.sql.as_ref().and_then(RelationSql::join_table)
    }

    /// Foreign key clause, for one-to-many and one-to-one relations with SQL enabled
    pub fn foreign_key_sql(&self) -> Option<&str> {
        self.sql.as_ref().and_then(RelationSql::foreign_key_sql)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldRef;

    #[test]
    fn test_create_many_to_many_relation() {
        let declaration = RelationDeclaration::many_to_many(
            FieldRef::new("user", "id"),
            FieldRef::new("userGroup", "id"),
        );
        let relation = create_relation(&declaration, &SqlOptions::default());

        assert_eq!(relation.name, "user.id <<-->> userGroup.id");
        assert_eq!(relation.declaration, declaration);
        let join_table = relation.join_table().unwrap();
        assert_eq!(join_table.join_table_name, "user_to_user_group");
        assert_eq!(
            join_table.drop_join_table_sql,
            "drop table if exists public.user_to_user_group;"
        );
        assert!(relation.foreign_key_sql().is_none());
    }

    #[test]
    fn test_create_one_to_many_relation() {
        let declaration = RelationDeclaration::one_to_many(
            FieldRef::new("user", "id"),
            FieldRef::new("recipe", "createdByUserId"),
        );
        let relation = create_relation(&declaration, &SqlOptions::default());

        assert!(relation.join_table().is_none());
        assert!(relation
            .foreign_key_sql()
            .unwrap()
            .contains("recipe_to_user_created_by_user_id_fkey"));
    }

    #[test]
    fn test_sql_disabled() {
        let declaration = RelationDeclaration::one_to_one(
            FieldRef::new("user", "id"),
            FieldRef::new("userAddress", "userId"),
        );
        let relation =
            create_relation(&declaration, &SqlOptions::default().with_enable_sql(false));

        assert_eq!(relation.name, "user.id <--> userAddress.userId");
        assert!(relation.sql.is_none());
    }

    #[test]
    fn test_deterministic() {
        let declaration = RelationDeclaration::many_to_many(
            FieldRef::new("recipe", "id"),
            FieldRef::new("ingredient", "id"),
        );
        let options = SqlOptions::default();
        assert_eq!(
            create_relation(&declaration, &options),
            create_relation(&declaration, &options)
        );
    }
}
