//! Generation runs on disk
//!
//! Every generation writes its artifacts together with a JSON record of the
//! request into a run directory under the projects root. An edit pass seeds
//! the intake from a record, applies a [`RunAmendment`] and generates again
//! with the original creation time. The record is rewritten only when the
//! amendment changes the schema.
//!
//! ```text
//! projects/
//!   Client - clients 20240305_143000/
//!     entity_config.json
//!     migrations/20240305143000_create_clients.sql
//!     src/models/client.rs
//!     ...
//! ```

use crate::config::CrudsmithConfig;
use crate::error::{Result, ScaffoldError};
use crate::scaffold::{
    EntityInput, EntitySchema, FieldDefinition, FieldInput, GenerationMode, ScaffoldGenerator,
    ScaffoldOptions,
};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File holding the record inside a run directory
pub const RECORD_FILE: &str = "entity_config.json";

/// Persisted description of one generation run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRecord {
    /// Model name
    pub model_name: String,
    /// Backing table
    pub table_name: String,
    /// URL and route-name prefix
    pub entity_short_name: String,
    /// Title used in pages and messages
    pub entity_display_title: String,
    /// Whether the run used one-page mode
    #[serde(default)]
    pub one_page: bool,
    /// Validated fields, in display order
    pub fields: Vec<FieldDefinition>,
    /// Creation time of the run
    #[serde(with = "record_time")]
    pub created_at: NaiveDateTime,
}

impl RunRecord {
    /// Record describing `schema` generated in `mode`
    #[must_use]
    pub fn from_schema(schema: &EntitySchema, mode: GenerationMode) -> Self {
        Self {
            model_name: schema.model_name().to_string(),
            table_name: schema.table_name().to_string(),
            entity_short_name: schema.short_name().to_string(),
            entity_display_title: schema.display_title().to_string(),
            one_page: mode.is_one_page(),
            fields: schema.fields().to_vec(),
            created_at: schema.created_at(),
        }
    }

    /// Rebuild the schema, keeping the original creation time
    ///
    /// The record goes through the same validation as fresh intake, so a hand
    /// edited record cannot bypass it.
    ///
    /// # Errors
    ///
    /// Returns an error if the record was edited into an invalid state.
    pub fn to_schema(&self) -> Result<EntitySchema> {
        Ok(EntitySchema::build_at(&self.to_input(), self.created_at)?)
    }

    /// Intake seeded from this record, for an edit pass
    #[must_use]
    pub fn to_input(&self) -> EntityInput {
        EntityInput {
            model_name: self.model_name.clone(),
            table_name: self.table_name.clone(),
            short_name: self.entity_short_name.clone(),
            display_title: self.entity_display_title.clone(),
            one_page: self.one_page,
            fields: self.fields.iter().map(FieldDefinition::to_input).collect(),
        }
    }

    /// Mode the run was generated in
    #[must_use]
    pub const fn mode(&self) -> GenerationMode {
        GenerationMode::from_one_page(self.one_page)
    }

    /// Directory name of the run, e.g. `Client - clients 20240305_143000`
    #[must_use]
    pub fn run_dir_name(&self) -> String {
        format!(
            "{} - {} {}",
            path_segment(&self.model_name),
            path_segment(&self.entity_short_name),
            self.created_at.format("%Y%m%d_%H%M%S")
        )
    }
}

/// `name` as a single directory-name segment
fn path_segment(name: &str) -> String {
    name.trim_matches(['/', '\\']).replace(['/', '\\'], "_")
}

mod record_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// Changes an edit pass applies to a stored run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunAmendment {
    /// Replacement display title
    pub display_title: Option<String>,
    /// Fields to add; a field naming an existing column replaces it in place
    pub fields: Vec<FieldInput>,
    /// Columns to drop
    pub remove: Vec<String>,
}

impl RunAmendment {
    /// Whether the amendment leaves the intake unchanged
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.display_title.is_none() && self.fields.is_empty() && self.remove.is_empty()
    }

    /// Apply the amendment to an intake seeded from a record
    ///
    /// Removals apply first. A replacing field without a label keeps the
    /// label of the field it replaces.
    pub fn apply(&self, input: &mut EntityInput) {
        if let Some(title) = &self.display_title {
            input.display_title.clone_from(title);
        }

        input.fields.retain(|row| {
            column_of(row).is_none_or(|column| !self.remove.iter().any(|name| name.trim() == column))
        });

        for field in &self.fields {
            let column = column_of(field);
            match input
                .fields
                .iter_mut()
                .find(|row| column.is_some() && column_of(row) == column)
            {
                Some(row) => {
                    let view_name = row.view_name.take();
                    *row = field.clone();
                    if row.view_name.is_none() {
                        row.view_name = view_name;
                    }
                }
                None => input.fields.push(field.clone()),
            }
        }
    }
}

fn column_of(row: &FieldInput) -> Option<&str> {
    row.column_name.as_deref().map(str::trim)
}

/// Result of a generation run
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Directory holding the record
    pub run_dir: PathBuf,
    /// Directory the artifacts were written to
    pub output_dir: PathBuf,
    /// Record of the run
    pub record: RunRecord,
    /// Written artifact paths
    pub written: Vec<PathBuf>,
}

/// A stored run, as found by [`RunStore::list`]
#[derive(Debug, Clone)]
pub struct StoredRun {
    /// Run directory
    pub dir: PathBuf,
    /// Record of the run
    pub record: RunRecord,
}

/// Run directories beneath a projects root
#[derive(Debug, Clone)]
pub struct RunStore {
    root: PathBuf,
}

impl RunStore {
    /// Store rooted at `root`
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store rooted at the configured projects root
    #[must_use]
    pub fn from_config(config: &CrudsmithConfig) -> Self {
        Self::new(config.projects.root.clone())
    }

    /// Projects root
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Validate `input`, generate its artifacts and record the run
    ///
    /// Artifacts go to `output` when given, otherwise into the new run
    /// directory. Nothing is written if validation or rendering fails.
    ///
    /// # Errors
    ///
    /// Returns an error if validation, rendering or a write fails.
    pub fn generate(
        &self,
        input: &EntityInput,
        output: Option<&Path>,
        options: &ScaffoldOptions,
    ) -> Result<RunOutcome> {
        let schema = EntitySchema::build(input)?;
        let mode = GenerationMode::from_one_page(input.one_page);
        let record = RunRecord::from_schema(&schema, mode);
        let run_dir = self.root.join(record.run_dir_name());

        let artifacts = ScaffoldGenerator::new(schema, mode, options.clone())?.generate()?;

        std::fs::create_dir_all(&run_dir).map_err(|err| ScaffoldError::io(&run_dir, err))?;
        Self::save(&run_dir, &record)?;

        let output_dir = output.map_or_else(|| run_dir.clone(), Path::to_path_buf);
        let written = artifacts.write_to(&output_dir)?;

        tracing::info!(
            run = %run_dir.display(),
            output = %output_dir.display(),
            files = written.len(),
            "run recorded"
        );

        Ok(RunOutcome {
            run_dir,
            output_dir,
            record,
            written,
        })
    }

    /// Generate a stored run again
    ///
    /// The stored record is left as is; `mode` overrides the recorded mode
    /// and `output` the run directory as the artifact location. The original
    /// creation time is kept, so unchanged runs regenerate byte-identical
    /// files.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing or invalid, or a write fails.
    pub fn regenerate(
        &self,
        run_dir: &Path,
        mode: Option<GenerationMode>,
        output: Option<&Path>,
        options: &ScaffoldOptions,
    ) -> Result<RunOutcome> {
        self.amend(run_dir, &RunAmendment::default(), mode, output, options)
    }

    /// Apply `amendment` to a stored run and generate it again
    ///
    /// The amended intake is validated like fresh intake and keeps the
    /// original creation time. A non-empty amendment rewrites the stored
    /// record with the recorded mode; `mode` only applies to this pass.
    /// Nothing is written if validation or rendering fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the record is missing, the amended intake is
    /// invalid, or a write fails.
    pub fn amend(
        &self,
        run_dir: &Path,
        amendment: &RunAmendment,
        mode: Option<GenerationMode>,
        output: Option<&Path>,
        options: &ScaffoldOptions,
    ) -> Result<RunOutcome> {
        let stored = Self::load(run_dir)?;
        let mut input = stored.to_input();
        amendment.apply(&mut input);

        let schema = EntitySchema::build_at(&input, stored.created_at)?;
        let mode = mode.unwrap_or_else(|| stored.mode());
        let record = RunRecord::from_schema(&schema, mode);

        let artifacts = ScaffoldGenerator::new(schema, mode, options.clone())?.generate()?;

        if !amendment.is_empty() {
            let amended = RunRecord {
                one_page: stored.one_page,
                ..record.clone()
            };
            Self::save(run_dir, &amended)?;
        }

        let output_dir = output.map_or_else(|| run_dir.to_path_buf(), Path::to_path_buf);
        let written = artifacts.write_to(&output_dir)?;

        tracing::info!(
            run = %run_dir.display(),
            output = %output_dir.display(),
            %mode,
            amended = !amendment.is_empty(),
            files = written.len(),
            "run regenerated"
        );

        Ok(RunOutcome {
            run_dir: run_dir.to_path_buf(),
            output_dir,
            record,
            written,
        })
    }

    /// Read the record of a run directory
    ///
    /// # Errors
    ///
    /// Returns [`ScaffoldError::RunNotFound`] if the directory holds no record.
    pub fn load(run_dir: &Path) -> Result<RunRecord> {
        let path = run_dir.join(RECORD_FILE);
        if !path.is_file() {
            return Err(ScaffoldError::RunNotFound(run_dir.to_path_buf()));
        }

        let raw = std::fs::read_to_string(&path).map_err(|err| ScaffoldError::io(&path, err))?;
        Ok(serde_json::from_str(&raw)?)
    }

    fn save(run_dir: &Path, record: &RunRecord) -> Result<()> {
        let path = run_dir.join(RECORD_FILE);
        let json = serde_json::to_string_pretty(record)?;
        std::fs::write(&path, json).map_err(|err| ScaffoldError::io(&path, err))
    }

    /// Every stored run, newest first
    ///
    /// A missing root yields an empty list. Directories with an unreadable
    /// record are skipped with a warning.
    #[must_use]
    pub fn list(&self) -> Vec<StoredRun> {
        if !self.root.is_dir() {
            return Vec::new();
        }

        let mut runs: Vec<StoredRun> = WalkDir::new(&self.root)
            .min_depth(2)
            .max_depth(2)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .filter(|entry| entry.file_type().is_file() && entry.file_name() == RECORD_FILE)
            .filter_map(|entry| {
                let dir = entry.path().parent()?.to_path_buf();
                match Self::load(&dir) {
                    Ok(record) => Some(StoredRun { dir, record }),
                    Err(err) => {
                        tracing::warn!(dir = %dir.display(), error = %err, "skipping unreadable run");
                        None
                    }
                }
            })
            .collect();

        runs.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then_with(|| a.dir.cmp(&b.dir))
        });
        runs
    }
}
