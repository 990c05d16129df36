//! Entity schema: the validated description of one generation request
//!
//! Raw intake ([`EntityInput`]) is forgiving: field rows missing a column name or
//! a type are pruned instead of rejected. What survives is checked once in
//! [`EntitySchema::build`]; after that the schema is read-only and every
//! generator can rely on its invariants.

use super::field_type::{FieldMapping, FieldType};
use super::helpers::TemplateHelpers;
use crate::error::ValidationError;
use chrono::{Local, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Related model used when a foreign field leaves `related_model` empty
///
/// The generated reference does not resolve; it marks the spot to fix by hand.
pub const RELATED_MODEL_PLACEHOLDER: &str = "RelatedModel";

/// Display column used when a foreign field leaves `display_column` empty
pub const DEFAULT_DISPLAY_COLUMN: &str = "name";

/// Columns the storage schema always adds
pub const RESERVED_COLUMNS: [&str; 3] = ["id", "created_at", "updated_at"];

/// One field row as submitted by the intake layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldInput {
    /// Column name
    #[serde(default)]
    pub column_name: Option<String>,
    /// Human label
    #[serde(default)]
    pub view_name: Option<String>,
    /// Type name, resolved through the registry
    #[serde(default, rename = "data_type", alias = "type")]
    pub data_type: Option<String>,
    /// Referenced table (foreign fields)
    #[serde(default)]
    pub related_table: Option<String>,
    /// Referenced model (foreign fields)
    #[serde(default)]
    pub related_model: Option<String>,
    /// Column of the related model shown to users (foreign fields)
    #[serde(default)]
    pub display_column: Option<String>,
}

impl FieldInput {
    /// Row with a column and a type name
    pub fn new(column_name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            column_name: Some(column_name.into()),
            data_type: Some(data_type.into()),
            ..Self::default()
        }
    }

    /// Whether the row carries a non-blank column name and type
    #[must_use]
    pub fn is_complete(&self) -> bool {
        non_blank(self.column_name.as_deref()).is_some()
            && non_blank(self.data_type.as_deref()).is_some()
    }
}

/// A generation request as submitted by the intake layer
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntityInput {
    /// Model (type) name, e.g. `Client`
    #[serde(default)]
    pub model_name: String,
    /// Backing table, e.g. `clients`
    #[serde(default)]
    pub table_name: String,
    /// URL and route-name prefix, e.g. `clients`
    #[serde(default, alias = "entity_short_name")]
    pub short_name: String,
    /// Title used in pages and messages; derived from the model name when blank
    #[serde(default, alias = "entity_display_title")]
    pub display_title: String,
    /// Render one list page with dialogs instead of separate pages
    #[serde(default)]
    pub one_page: bool,
    /// Field rows, in display order
    #[serde(default)]
    pub fields: Vec<FieldInput>,
}

/// One validated field of an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    /// Column name, unique within the entity
    pub column_name: String,
    /// Human label
    pub view_name: String,
    /// Field type
    #[serde(rename = "data_type", alias = "type")]
    pub field_type: FieldType,
    /// Referenced table
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_table: Option<String>,
    /// Referenced model
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_model: Option<String>,
    /// Column of the related model shown to users
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_column: Option<String>,
}

impl FieldDefinition {
    /// Field with a label derived from the column name
    pub fn new(column_name: impl Into<String>, field_type: FieldType) -> Self {
        let column_name = column_name.into();
        Self {
            view_name: TemplateHelpers::to_view_name(&column_name),
            column_name,
            field_type,
            related_table: None,
            related_model: None,
            display_column: None,
        }
    }

    /// Override the label
    #[must_use]
    pub fn with_view_name(mut self, view_name: impl Into<String>) -> Self {
        self.view_name = view_name.into();
        self
    }

    /// Set the foreign-key target
    #[must_use]
    pub fn references(
        mut self,
        related_table: impl Into<String>,
        related_model: impl Into<String>,
        display_column: impl Into<String>,
    ) -> Self {
        self.related_table = Some(related_table.into());
        self.related_model = Some(related_model.into());
        self.display_column = Some(display_column.into());
        self
    }

    /// Registry mappings of this field's type
    #[must_use]
    pub fn mapping(&self) -> &'static FieldMapping {
        self.field_type.mapping()
    }

    /// Whether this field references another model
    #[must_use]
    pub fn is_foreign(&self) -> bool {
        self.field_type == FieldType::Foreign
    }

    /// Related model, or [`RELATED_MODEL_PLACEHOLDER`]
    #[must_use]
    pub fn related_model_or_placeholder(&self) -> &str {
        self.related_model
            .as_deref()
            .unwrap_or(RELATED_MODEL_PLACEHOLDER)
    }

    /// Display column, or [`DEFAULT_DISPLAY_COLUMN`]
    #[must_use]
    pub fn display_column_or_default(&self) -> &str {
        self.display_column
            .as_deref()
            .unwrap_or(DEFAULT_DISPLAY_COLUMN)
    }

    /// Related table, or the table name derived from the related model
    #[must_use]
    pub fn related_table_or_derived(&self) -> String {
        self.related_table.clone().unwrap_or_else(|| {
            TemplateHelpers::to_table_name(self.related_model_or_placeholder())
        })
    }

    /// Relation accessor name for foreign fields
    #[must_use]
    pub fn relation_accessor(&self) -> Option<String> {
        self.is_foreign()
            .then(|| TemplateHelpers::relation_accessor(&self.column_name))
    }

    fn from_input(input: &FieldInput) -> Option<Self> {
        let column_name = non_blank(input.column_name.as_deref())?;
        let data_type = non_blank(input.data_type.as_deref())?;

        let view_name = non_blank(input.view_name.as_deref()).map_or_else(
            || TemplateHelpers::to_view_name(column_name),
            str::to_string,
        );

        Some(Self {
            column_name: column_name.to_string(),
            view_name,
            field_type: FieldType::from_name(data_type),
            related_table: non_blank(input.related_table.as_deref()).map(str::to_string),
            related_model: non_blank(input.related_model.as_deref()).map(str::to_string),
            display_column: non_blank(input.display_column.as_deref()).map(str::to_string),
        })
    }

    pub(crate) fn to_input(&self) -> FieldInput {
        FieldInput {
            column_name: Some(self.column_name.clone()),
            view_name: Some(self.view_name.clone()),
            data_type: Some(self.field_type.as_str().to_string()),
            related_table: self.related_table.clone(),
            related_model: self.related_model.clone(),
            display_column: self.display_column.clone(),
        }
    }
}

/// Validated, immutable description of one generated CRUD subject
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntitySchema {
    model_name: String,
    table_name: String,
    short_name: String,
    display_title: String,
    fields: Vec<FieldDefinition>,
    created_at: NaiveDateTime,
}

impl EntitySchema {
    /// Build a schema stamped with the current local time
    ///
    /// # Errors
    ///
    /// See [`EntitySchema::build_at`].
    pub fn build(input: &EntityInput) -> Result<Self, ValidationError> {
        let now = Local::now().naive_local();
        Self::build_at(input, now.with_nanosecond(0).unwrap_or(now))
    }

    /// Build a schema with an explicit creation time
    ///
    /// Incomplete field rows are dropped before validation.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] if the model name, table name or short name
    /// is blank, if no complete field row remains, if a column name repeats or
    /// collides with a generated column, or if two foreign columns map to the
    /// same relation accessor.
    pub fn build_at(
        input: &EntityInput,
        created_at: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        let model_name =
            non_blank(Some(&input.model_name)).ok_or(ValidationError::MissingModelName)?;
        let table_name =
            non_blank(Some(&input.table_name)).ok_or(ValidationError::MissingTableName)?;
        let short_name =
            non_blank(Some(&input.short_name)).ok_or(ValidationError::MissingShortName)?;

        let fields: Vec<FieldDefinition> = input
            .fields
            .iter()
            .filter_map(|row| {
                let field = FieldDefinition::from_input(row);
                if field.is_none() {
                    tracing::debug!(?row, "dropping incomplete field row");
                }
                field
            })
            .collect();

        Self::from_parts(
            model_name.to_string(),
            table_name.to_string(),
            short_name.to_string(),
            non_blank(Some(&input.display_title)).map_or_else(
                || TemplateHelpers::to_title(model_name),
                str::to_string,
            ),
            fields,
            created_at,
        )
    }

    /// Assemble a schema from already-normalized parts
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] on an empty field list, a bad column name,
    /// or two foreign columns sharing a relation accessor.
    fn from_parts(
        model_name: String,
        table_name: String,
        short_name: String,
        display_title: String,
        fields: Vec<FieldDefinition>,
        created_at: NaiveDateTime,
    ) -> Result<Self, ValidationError> {
        if fields.is_empty() {
            return Err(ValidationError::NoFields);
        }

        let mut seen = HashSet::new();
        let mut relations: HashMap<String, &str> = HashMap::new();
        for field in &fields {
            if RESERVED_COLUMNS.contains(&field.column_name.as_str()) {
                return Err(ValidationError::ReservedColumn {
                    column: field.column_name.clone(),
                });
            }
            if !seen.insert(field.column_name.as_str()) {
                return Err(ValidationError::DuplicateColumn {
                    column: field.column_name.clone(),
                });
            }
            if field.is_foreign() {
                // The struct field and options variable derive from the snake
                // case column, the accessor from its camel case.
                let names = [
                    TemplateHelpers::relation_accessor(&field.column_name),
                    TemplateHelpers::relation_field(&field.column_name),
                ];
                for name in names {
                    if let Some(first) = relations.insert(name, &field.column_name) {
                        return Err(ValidationError::RelationCollision {
                            first: first.to_string(),
                            second: field.column_name.clone(),
                            accessor: TemplateHelpers::relation_accessor(&field.column_name),
                        });
                    }
                }
            }
            if field.is_foreign() && field.related_model.is_none() {
                tracing::warn!(
                    column = %field.column_name,
                    placeholder = RELATED_MODEL_PLACEHOLDER,
                    "foreign field has no related model; generated reference will not resolve"
                );
            }
        }

        Ok(Self {
            model_name,
            table_name,
            short_name,
            display_title,
            fields,
            created_at,
        })
    }

    /// Model name
    #[must_use]
    pub fn model_name(&self) -> &str {
        &self.model_name
    }

    /// Backing table
    #[must_use]
    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    /// URL and route-name prefix
    #[must_use]
    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    /// Title used in pages and messages
    #[must_use]
    pub fn display_title(&self) -> &str {
        &self.display_title
    }

    /// Fields in display order
    #[must_use]
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// Foreign fields in display order
    pub fn foreign_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|field| field.is_foreign())
    }

    /// Creation time of the run
    #[must_use]
    pub const fn created_at(&self) -> NaiveDateTime {
        self.created_at
    }

    /// Whether any field uses the rich-text editor
    #[must_use]
    pub fn has_rich_text(&self) -> bool {
        self.fields
            .iter()
            .any(|field| field.field_type == FieldType::RichText)
    }

    /// Intake seeded from this schema, for an edit pass
    #[must_use]
    pub fn to_input(&self, one_page: bool) -> EntityInput {
        EntityInput {
            model_name: self.model_name.clone(),
            table_name: self.table_name.clone(),
            short_name: self.short_name.clone(),
            display_title: self.display_title.clone(),
            one_page,
            fields: self.fields.iter().map(FieldDefinition::to_input).collect(),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
