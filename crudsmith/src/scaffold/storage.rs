//! Storage schema generation
//!
//! Describes the table backing an entity: an identity column, one column per
//! field in field order, the timestamp pair and a cascading foreign key for
//! every foreign field that names its related table.

use super::field_type::ColumnKind;
use super::schema::EntitySchema;
use crate::config::DatabaseBackend;
use serde::Serialize;

/// Where a column comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnRole {
    /// Auto-incrementing primary key
    Identity,
    /// Column backing an entity field
    Field,
    /// `created_at` / `updated_at`
    Timestamp,
}

/// One table column
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColumnDescriptor {
    /// Column name
    pub name: String,
    /// Storage kind
    pub kind: ColumnKind,
    /// Origin of the column
    pub role: ColumnRole,
}

impl ColumnDescriptor {
    /// Column definition for a `CREATE TABLE` statement
    #[must_use]
    pub fn definition(&self, backend: DatabaseBackend) -> String {
        let sql_type = self.kind.sql_type(backend);
        match self.role {
            ColumnRole::Identity => format!("{} {sql_type}", self.name),
            ColumnRole::Field => format!("{} {sql_type} NOT NULL", self.name),
            ColumnRole::Timestamp => {
                format!("{} {sql_type} NOT NULL DEFAULT CURRENT_TIMESTAMP", self.name)
            }
        }
    }
}

/// Referential action on delete of the referenced row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OnDelete {
    /// Delete referencing rows
    Cascade,
}

impl OnDelete {
    /// SQL clause
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Cascade => "ON DELETE CASCADE",
        }
    }
}

/// Foreign-key constraint from a field column to `related_table.id`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ForeignKeyConstraint {
    /// Constraint name
    pub name: String,
    /// Referencing column
    pub column: String,
    /// Referenced table
    pub references_table: String,
    /// Referenced column
    pub references_column: String,
    /// Delete behavior
    pub on_delete: OnDelete,
}

impl ForeignKeyConstraint {
    /// Constraint clause for a `CREATE TABLE` statement
    #[must_use]
    pub fn definition(&self) -> String {
        format!(
            "CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {}({}) {}",
            self.name,
            self.column,
            self.references_table,
            self.references_column,
            self.on_delete.as_sql()
        )
    }
}

/// Table description of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StorageSchemaDescriptor {
    /// Table name
    pub table_name: String,
    /// Columns in table order
    pub columns: Vec<ColumnDescriptor>,
    /// Foreign-key constraints in field order
    pub constraints: Vec<ForeignKeyConstraint>,
}

impl StorageSchemaDescriptor {
    /// The identity column
    #[must_use]
    pub fn identity(&self) -> Option<&ColumnDescriptor> {
        self.columns
            .iter()
            .find(|column| column.role == ColumnRole::Identity)
    }

    /// Every column except the identity column
    pub fn non_identity_columns(&self) -> impl Iterator<Item = &ColumnDescriptor> {
        self.columns
            .iter()
            .filter(|column| column.role != ColumnRole::Identity)
    }

    /// Column by name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|column| column.name == name)
    }

    /// Column names in table order
    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    /// Every column and constraint clause of the `CREATE TABLE` body
    #[must_use]
    pub fn definitions(&self, backend: DatabaseBackend) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| column.definition(backend))
            .chain(self.constraints.iter().map(ForeignKeyConstraint::definition))
            .collect()
    }
}

/// Describe the table backing `schema`
///
/// Foreign fields without a related table get a plain integer column and no
/// constraint.
#[must_use]
pub fn generate_storage_schema(schema: &EntitySchema) -> StorageSchemaDescriptor {
    let table = schema.table_name();

    let mut columns = Vec::with_capacity(schema.fields().len() + 3);
    columns.push(ColumnDescriptor {
        name: "id".to_string(),
        kind: ColumnKind::Identity,
        role: ColumnRole::Identity,
    });

    let mut constraints = Vec::new();
    for field in schema.fields() {
        let mapping = field.mapping();
        columns.push(ColumnDescriptor {
            name: field.column_name.clone(),
            kind: mapping.column,
            role: ColumnRole::Field,
        });

        if !mapping.references {
            continue;
        }
        if let Some(related_table) = &field.related_table {
            constraints.push(ForeignKeyConstraint {
                name: format!("fk_{table}_{}", field.column_name),
                column: field.column_name.clone(),
                references_table: related_table.clone(),
                references_column: "id".to_string(),
                on_delete: OnDelete::Cascade,
            });
        } else {
            tracing::debug!(
                column = %field.column_name,
                "foreign field without related table, no constraint emitted"
            );
        }
    }

    for name in ["created_at", "updated_at"] {
        columns.push(ColumnDescriptor {
            name: name.to_string(),
            kind: ColumnKind::Timestamp,
            role: ColumnRole::Timestamp,
        });
    }

    StorageSchemaDescriptor {
        table_name: table.to_string(),
        columns,
        constraints,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::schema::{EntityInput, FieldInput};

    fn schema(fields: Vec<FieldInput>) -> EntitySchema {
        EntitySchema::build(&EntityInput {
            model_name: "Client".into(),
            table_name: "clients".into(),
            short_name: "clients".into(),
            fields,
            ..EntityInput::default()
        })
        .unwrap()
    }

    fn owner() -> FieldInput {
        FieldInput {
            related_table: Some("users".into()),
            related_model: Some("User".into()),
            display_column: Some("email".into()),
            ..FieldInput::new("owner_id", "foreign")
        }
    }

    #[test]
    fn test_column_order() {
        let storage = generate_storage_schema(&schema(vec![
            FieldInput::new("name", "short_text"),
            owner(),
        ]));

        assert_eq!(
            storage.column_names(),
            ["id", "name", "owner_id", "created_at", "updated_at"]
        );
        assert_eq!(storage.identity().map(|c| c.name.as_str()), Some("id"));
        assert_eq!(storage.non_identity_columns().count(), 4);
    }

    #[test]
    fn test_foreign_constraint() {
        let storage = generate_storage_schema(&schema(vec![owner()]));

        assert_eq!(storage.constraints.len(), 1);
        let constraint = &storage.constraints[0];
        assert_eq!(constraint.column, "owner_id");
        assert_eq!(constraint.references_table, "users");
        assert_eq!(constraint.on_delete, OnDelete::Cascade);
        assert_eq!(
            constraint.definition(),
            "CONSTRAINT fk_clients_owner_id FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE"
        );
    }

    #[test]
    fn test_foreign_without_table_has_no_constraint() {
        let storage = generate_storage_schema(&schema(vec![FieldInput::new(
            "owner_id", "foreign",
        )]));

        assert!(storage.constraints.is_empty());
        assert_eq!(
            storage.column("owner_id").map(|c| c.kind),
            Some(ColumnKind::BigInt)
        );
    }

    #[test]
    fn test_definitions() {
        let storage = generate_storage_schema(&schema(vec![
            FieldInput::new("active", "boolean"),
            FieldInput::new("price", "money"),
        ]));

        let definitions = storage.definitions(DatabaseBackend::Postgres);
        assert_eq!(definitions[0], "id BIGSERIAL PRIMARY KEY");
        assert_eq!(definitions[1], "active SMALLINT NOT NULL");
        assert_eq!(definitions[2], "price VARCHAR(20) NOT NULL");
        assert_eq!(
            definitions[3],
            "created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP"
        );

        let sqlite = storage.definitions(DatabaseBackend::Sqlite);
        assert_eq!(sqlite[0], "id INTEGER PRIMARY KEY AUTOINCREMENT");
        assert_eq!(sqlite[1], "active INTEGER NOT NULL");
    }
}
