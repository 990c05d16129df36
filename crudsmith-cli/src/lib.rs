//! crudsmith command-line interface
//!
//! The intake layer of the scaffolder: collects entity descriptions from flags,
//! field specifications and JSON intake files, and drives [`crudsmith::RunStore`].

pub mod commands;
pub mod field_spec;

pub use field_spec::parse_field_spec;
