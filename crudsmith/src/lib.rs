//! crudsmith: CRUD scaffolding from declarative entity descriptions
//!
//! An entity description (model name, table, URL short name and an ordered
//! list of typed fields) is validated into an [`EntitySchema`] and turned into a
//! complete code set for an axum + sqlx + minijinja application driven by HTMX:
//! a SQL migration, a model, handlers, a route table and page templates.
//!
//! # Quick Start
//!
//! ```rust
//! use crudsmith::scaffold::{EntityInput, EntitySchema, FieldInput, GenerationMode};
//! use crudsmith::scaffold::{ScaffoldGenerator, ScaffoldOptions};
//!
//! # fn main() -> crudsmith::Result<()> {
//! let input = EntityInput {
//!     model_name: "Client".into(),
//!     table_name: "clients".into(),
//!     short_name: "clients".into(),
//!     fields: vec![FieldInput::new("name", "short_text")],
//!     ..EntityInput::default()
//! };
//!
//! let schema = EntitySchema::build(&input)?;
//! let artifacts = ScaffoldGenerator::new(schema, GenerationMode::Standard, ScaffoldOptions::default())?
//!     .generate()?;
//! assert_eq!(artifacts.len(), 8);
//! # Ok(())
//! # }
//! ```
//!
//! # Modes
//!
//! - [`GenerationMode::Standard`](scaffold::GenerationMode::Standard): list,
//!   create, edit and show pages
//! - [`GenerationMode::OnePage`](scaffold::GenerationMode::OnePage): one list
//!   page with inline create and edit dialogs
//!
//! Generation runs are recorded on disk by [`runs::RunStore`] so they can be
//! listed and regenerated later.

#![allow(clippy::missing_errors_doc)]

pub mod config;
pub mod error;
pub mod observability;
pub mod runs;
pub mod scaffold;

pub use config::{CrudsmithConfig, DatabaseBackend};
pub use error::{Result, ScaffoldError, ValidationError};
pub use runs::{RunAmendment, RunOutcome, RunRecord, RunStore, StoredRun};
pub use scaffold::{EntityInput, EntitySchema, GenerationMode, ScaffoldOptions};
