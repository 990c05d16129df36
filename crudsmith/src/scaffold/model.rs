//! Model descriptor generation
//!
//! The model descriptor lists the columns accepted from form input (the
//! mass-assignment allow-list) and one relation accessor per foreign field.
//! Accessor names come from [`TemplateHelpers::relation_accessor`] so the
//! views can reference them verbatim.

use super::helpers::TemplateHelpers;
use super::schema::EntitySchema;
use crate::config::DatabaseBackend;
use serde::Serialize;

/// A persisted field of the generated model struct
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelField {
    /// Column and struct field name
    pub name: String,
    /// Rust type of the struct field
    pub rust_type: &'static str,
    /// Expression building the value from the submitted form
    pub from_form: String,
    /// Whether the submitted value can fail to convert
    pub fallible: bool,
}

/// Named lookup resolving a foreign column to its related record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelationAccessor {
    /// Accessor name seen by views, e.g. `ownerIdRelation`
    pub name: String,
    /// Struct field holding the loaded record, e.g. `owner_id_relation`
    pub field: String,
    /// Method loading the relation for one record
    pub loader: String,
    /// Join column on this model
    pub column: String,
    /// Related model type
    pub related_model: String,
    /// Module of the related model
    pub related_module: String,
    /// Table of the related model
    pub related_table: String,
    /// Column of the related model shown to users
    pub display_column: String,
}

impl RelationAccessor {
    /// Query loading the related record of one row
    #[must_use]
    pub fn lookup_sql(&self, backend: DatabaseBackend) -> String {
        format!(
            "SELECT * FROM {} WHERE id = {}",
            self.related_table,
            backend.placeholder(1)
        )
    }

    /// Query loading every related record referenced from `table`
    #[must_use]
    pub fn eager_sql(&self, table: &str) -> String {
        format!(
            "SELECT * FROM {} WHERE id IN (SELECT {} FROM {table})",
            self.related_table, self.column
        )
    }
}

/// Data-model description of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelDescriptor {
    /// Model type name
    pub model_name: String,
    /// Module the model lives in
    pub module_name: String,
    /// Backing table
    pub table_name: String,
    /// Type holding mass-assignable input
    pub input_name: String,
    /// Mass-assignable columns, in field order
    pub fillable: Vec<String>,
    /// Persisted fields, in field order
    pub fields: Vec<ModelField>,
    /// Relation accessors, in field order
    pub relations: Vec<RelationAccessor>,
}

impl ModelDescriptor {
    /// Relation accessor by name
    #[must_use]
    pub fn relation(&self, name: &str) -> Option<&RelationAccessor> {
        self.relations.iter().find(|relation| relation.name == name)
    }

    /// Whether reading form input can fail on a malformed value
    #[must_use]
    pub fn has_fallible_input(&self) -> bool {
        self.fields.iter().any(|field| field.fallible)
    }

    /// Related models to import, deduplicated, in first-use order
    #[must_use]
    pub fn related_imports(&self) -> Vec<(&str, &str)> {
        let mut imports: Vec<(&str, &str)> = Vec::new();
        for relation in &self.relations {
            let import = (
                relation.related_module.as_str(),
                relation.related_model.as_str(),
            );
            if relation.related_model != self.model_name && !imports.contains(&import) {
                imports.push(import);
            }
        }
        imports
    }

    /// Query listing every record
    #[must_use]
    pub fn all_sql(&self) -> String {
        format!("SELECT * FROM {} ORDER BY id", self.table_name)
    }

    /// Query loading one record by id
    #[must_use]
    pub fn find_sql(&self, backend: DatabaseBackend) -> String {
        format!("SELECT * FROM {} WHERE id = {}", self.table_name, backend.placeholder(1))
    }

    /// Statement deleting one record by id
    #[must_use]
    pub fn delete_sql(&self, backend: DatabaseBackend) -> String {
        format!("DELETE FROM {} WHERE id = {}", self.table_name, backend.placeholder(1))
    }

    /// `INSERT` statement for the fillable columns
    #[must_use]
    pub fn insert_sql(&self, backend: DatabaseBackend) -> String {
        let placeholders: Vec<String> = (1..=self.fillable.len())
            .map(|index| backend.placeholder(index))
            .collect();
        format!(
            "INSERT INTO {} ({}) VALUES ({}) RETURNING *",
            self.table_name,
            self.fillable.join(", "),
            placeholders.join(", ")
        )
    }

    /// `UPDATE` statement for the fillable columns; the id binds last
    #[must_use]
    pub fn update_sql(&self, backend: DatabaseBackend) -> String {
        let assignments: Vec<String> = self
            .fillable
            .iter()
            .enumerate()
            .map(|(index, column)| format!("{column} = {}", backend.placeholder(index + 1)))
            .collect();
        format!(
            "UPDATE {} SET {}, updated_at = CURRENT_TIMESTAMP WHERE id = {} RETURNING *",
            self.table_name,
            assignments.join(", "),
            backend.placeholder(self.fillable.len() + 1)
        )
    }
}

/// Describe the model backing `schema`
#[must_use]
pub fn generate_model_descriptor(schema: &EntitySchema) -> ModelDescriptor {
    let fields = schema
        .fields()
        .iter()
        .map(|field| {
            let column = field.mapping().column;
            ModelField {
                name: field.column_name.clone(),
                rust_type: column.rust_type(),
                from_form: column.parse_expr(
                    &format!("value(form, \"{}\")", field.column_name),
                    &field.column_name,
                ),
                fallible: column.parse_is_fallible(),
            }
        })
        .collect();

    let relations = schema
        .foreign_fields()
        .map(|field| {
            let related_model = field.related_model_or_placeholder().to_string();
            RelationAccessor {
                name: TemplateHelpers::relation_accessor(&field.column_name),
                field: TemplateHelpers::relation_field(&field.column_name),
                loader: format!("load_{}", TemplateHelpers::relation_field(&field.column_name)),
                column: field.column_name.clone(),
                related_module: TemplateHelpers::to_module_name(&related_model),
                related_table: field.related_table_or_derived(),
                display_column: field.display_column_or_default().to_string(),
                related_model,
            }
        })
        .collect();

    ModelDescriptor {
        model_name: schema.model_name().to_string(),
        module_name: TemplateHelpers::to_module_name(schema.model_name()),
        table_name: schema.table_name().to_string(),
        input_name: format!("{}Input", schema.model_name()),
        fillable: schema
            .fields()
            .iter()
            .map(|field| field.column_name.clone())
            .collect(),
        fields,
        relations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::schema::{EntityInput, FieldInput};

    fn client() -> EntitySchema {
        EntitySchema::build(&EntityInput {
            model_name: "Client".into(),
            table_name: "clients".into(),
            short_name: "clients".into(),
            fields: vec![
                FieldInput::new("name", "short_text"),
                FieldInput {
                    related_table: Some("users".into()),
                    related_model: Some("User".into()),
                    display_column: Some("email".into()),
                    ..FieldInput::new("owner_id", "foreign")
                },
                FieldInput::new("active", "boolean"),
            ],
            ..EntityInput::default()
        })
        .unwrap()
    }

    #[test]
    fn test_fillable_in_field_order() {
        let model = generate_model_descriptor(&client());
        assert_eq!(model.fillable, ["name", "owner_id", "active"]);
        assert_eq!(model.module_name, "client");
        assert_eq!(model.input_name, "ClientInput");
    }

    #[test]
    fn test_relation_accessor() {
        let model = generate_model_descriptor(&client());
        assert_eq!(model.relations.len(), 1);

        let relation = model.relation("ownerIdRelation").unwrap();
        assert_eq!(relation.field, "owner_id_relation");
        assert_eq!(relation.loader, "load_owner_id_relation");
        assert_eq!(relation.column, "owner_id");
        assert_eq!(relation.related_model, "User");
        assert_eq!(relation.related_module, "user");
        assert_eq!(relation.related_table, "users");
        assert_eq!(relation.display_column, "email");
        assert_eq!(model.related_imports(), [("user", "User")]);
    }

    #[test]
    fn test_placeholder_relation() {
        let schema = EntitySchema::build(&EntityInput {
            model_name: "Task".into(),
            table_name: "tasks".into(),
            short_name: "tasks".into(),
            fields: vec![FieldInput::new("category", "foreign")],
            ..EntityInput::default()
        })
        .unwrap();

        let model = generate_model_descriptor(&schema);
        let relation = model.relation("categoryRelation").unwrap();
        assert_eq!(relation.related_model, "RelatedModel");
        assert_eq!(relation.related_table, "related_models");
        assert_eq!(relation.display_column, "name");
    }

    #[test]
    fn test_form_conversions() {
        let model = generate_model_descriptor(&client());
        assert_eq!(model.fields[0].from_form, "value(form, \"name\").to_string()");
        assert_eq!(model.fields[1].rust_type, "i64");
        assert_eq!(model.fields[2].from_form, "i16::from(value(form, \"active\") == \"1\")");
    }

    #[test]
    fn test_malformed_numbers_fail_instead_of_defaulting() {
        let model = generate_model_descriptor(&client());
        let owner = &model.fields[1];
        assert!(owner.fallible);
        assert_eq!(
            owner.from_form,
            "value(form, \"owner_id\").parse::<i64>().map_err(|err| invalid(\"owner_id\", err))?"
        );
        assert!(!owner.from_form.contains("unwrap_or_default"));
        assert!(!model.fields[0].fallible);
        assert!(model.has_fallible_input());
    }

    #[test]
    fn test_sql_statements() {
        let model = generate_model_descriptor(&client());
        assert_eq!(
            model.insert_sql(DatabaseBackend::Postgres),
            "INSERT INTO clients (name, owner_id, active) VALUES ($1, $2, $3) RETURNING *"
        );
        assert_eq!(
            model.update_sql(DatabaseBackend::Sqlite),
            "UPDATE clients SET name = ?, owner_id = ?, active = ?, updated_at = CURRENT_TIMESTAMP WHERE id = ? RETURNING *"
        );
        assert_eq!(
            model.delete_sql(DatabaseBackend::Postgres),
            "DELETE FROM clients WHERE id = $1"
        );
    }

    #[test]
    fn test_relation_queries() {
        let model = generate_model_descriptor(&client());
        let relation = model.relation("ownerIdRelation").unwrap();
        assert_eq!(
            relation.lookup_sql(DatabaseBackend::Postgres),
            "SELECT * FROM users WHERE id = $1"
        );
        assert_eq!(
            relation.eager_sql(&model.table_name),
            "SELECT * FROM users WHERE id IN (SELECT owner_id FROM clients)"
        );
    }
}
