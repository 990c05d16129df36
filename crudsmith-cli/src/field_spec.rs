//! Field specifications given on the command line
//!
//! A field is written as `column:type`, and foreign fields may append the
//! reference: `column:foreign:related_table:related_model:display_column`.
//! Trailing reference parts may be left out or empty.

use anyhow::{bail, Result};
use crudsmith::scaffold::{FieldInput, FieldType};

/// Parse one field specification
///
/// Type names are not checked here; unknown names fall back to `short_text`
/// when the schema is built.
///
/// # Errors
///
/// Returns an error if the column or type is missing, if more than five parts
/// are given, or if a non-foreign field carries reference parts.
pub fn parse_field_spec(spec: &str) -> Result<FieldInput> {
    let parts: Vec<&str> = spec.split(':').map(str::trim).collect();
    let [column, data_type, reference @ ..] = parts.as_slice() else {
        bail!("Invalid field '{spec}': expected column:type");
    };

    if column.is_empty() {
        bail!("Invalid field '{spec}': missing column name");
    }
    if data_type.is_empty() {
        bail!("Invalid field '{spec}': missing type");
    }
    if reference.len() > 3 {
        bail!("Invalid field '{spec}': expected at most column:type:related_table:related_model:display_column");
    }

    let part = |index: usize| {
        reference
            .get(index)
            .filter(|value| !value.is_empty())
            .map(ToString::to_string)
    };

    let field = FieldInput {
        related_table: part(0),
        related_model: part(1),
        display_column: part(2),
        ..FieldInput::new(*column, *data_type)
    };

    let has_reference = field.related_table.is_some()
        || field.related_model.is_some()
        || field.display_column.is_some();
    if has_reference && FieldType::parse_known(data_type) != Some(FieldType::Foreign) {
        bail!("Invalid field '{spec}': only foreign fields take a reference");
    }

    Ok(field)
}
