//! CRUD scaffold engine
//!
//! Turns one [`EntitySchema`] into a complete CRUD code set for an axum, sqlx
//! and minijinja application driven by HTMX:
//!
//! - SQL migration ([`storage`])
//! - sqlx model ([`model`])
//! - handlers and route table ([`operations`])
//! - page templates ([`views`])
//!
//! Every generator reads field behavior from the shared registry in
//! [`field_type`], so the artifacts agree on how each field is stored, edited
//! and displayed.

pub mod field_type;
pub mod generator;
pub mod helpers;
pub mod model;
pub mod operations;
pub mod schema;
pub mod storage;
pub mod templates;
pub mod views;

use crate::config::DatabaseBackend;
use serde::{Deserialize, Serialize};
use std::fmt;

pub use field_type::{ColumnKind, DisplayRendering, FieldMapping, FieldType, FormControl};
pub use generator::{ArtifactKind, ArtifactSet, GeneratedFile, ScaffoldGenerator};
pub use helpers::TemplateHelpers;
pub use model::{generate_model_descriptor, ModelDescriptor, RelationAccessor};
pub use operations::{generate_operations, Operation, OperationKind, OperationSet, RouteTable};
pub use schema::{EntityInput, EntitySchema, FieldDefinition, FieldInput};
pub use storage::{generate_storage_schema, ForeignKeyConstraint, StorageSchemaDescriptor};
pub use views::{generate_views, ViewArtifactSet, ViewDescriptor, ViewKind};

/// Rendering strategy for handlers, routes and views
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationMode {
    /// Separate list, create, edit and show pages
    #[default]
    Standard,
    /// One list page with inline create and edit dialogs
    OnePage,
}

impl GenerationMode {
    /// Mode selected by the intake `one_page` flag
    #[must_use]
    pub const fn from_one_page(one_page: bool) -> Self {
        if one_page {
            Self::OnePage
        } else {
            Self::Standard
        }
    }

    /// Whether this is [`GenerationMode::OnePage`]
    #[must_use]
    pub const fn is_one_page(self) -> bool {
        matches!(self, Self::OnePage)
    }

    /// Stable name used in logs and listings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::OnePage => "one_page",
        }
    }
}

impl fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Settings that shape generated artifacts without changing their structure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScaffoldOptions {
    /// SQL dialect of the migration and model queries
    pub backend: DatabaseBackend,
    /// Layout template every generated page extends
    pub layout: String,
    /// Filter applied to formatted-number displays
    pub number_filter: String,
    /// Options offered by dropdown and radio controls
    pub placeholder_options: Vec<String>,
}

impl Default for ScaffoldOptions {
    fn default() -> Self {
        crate::config::CrudsmithConfig::default().scaffold_options()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_from_flag() {
        assert_eq!(GenerationMode::from_one_page(true), GenerationMode::OnePage);
        assert_eq!(GenerationMode::from_one_page(false), GenerationMode::Standard);
        assert!(GenerationMode::OnePage.is_one_page());
    }

    #[test]
    fn test_default_options() {
        let options = ScaffoldOptions::default();
        assert_eq!(options.backend, DatabaseBackend::Postgres);
        assert_eq!(options.placeholder_options, ["Option1", "Option2", "Option3"]);
    }
}
