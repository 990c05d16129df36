//! CRUD scaffold generator orchestrator
//!
//! This module turns a validated [`EntitySchema`] into the artifacts of one
//! CRUD resource:
//! - Migration (`migrations/{timestamp}_create_{table}.sql`)
//! - Model (`src/models/{model}.rs`)
//! - Handlers (`src/handlers/{short}.rs`)
//! - Route table (`src/routes/{short}.rs`)
//! - Page templates (`templates/{short}/*.html`)
//!
//! Every artifact is rendered in memory first, so a rendering failure leaves
//! the output directory untouched.

use super::model::{generate_model_descriptor, ModelDescriptor};
use super::operations::{generate_operations, OperationSet, RouteTable};
use super::schema::EntitySchema;
use super::storage::{generate_storage_schema, StorageSchemaDescriptor};
use super::templates::TemplateRegistry;
use super::views::{generate_views_with, ViewArtifactSet, ViewKind};
use super::{GenerationMode, ScaffoldOptions};
use crate::error::{Result, ScaffoldError};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Category of a generated file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    /// SQL migration
    StorageSchema,
    /// sqlx model
    Model,
    /// axum handlers
    Handler,
    /// axum router
    RouteTable,
    /// Page template
    View,
}

impl ArtifactKind {
    /// Lowercase name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::StorageSchema => "storage_schema",
            Self::Model => "model",
            Self::Handler => "handler",
            Self::RouteTable => "route_table",
            Self::View => "view",
        }
    }
}

impl fmt::Display for ArtifactKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Generated file information
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GeneratedFile {
    /// File path relative to the output root
    pub path: PathBuf,
    /// File content
    pub content: String,
    /// Description of what this file does
    pub description: String,
    /// Artifact category
    pub kind: ArtifactKind,
}

/// Every file generated for one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArtifactSet {
    /// Mode the files were generated in
    pub mode: GenerationMode,
    /// Files in generation order
    pub files: Vec<GeneratedFile>,
}

impl ArtifactSet {
    /// Number of files
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether nothing was generated
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Iterate over the files
    pub fn iter(&self) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter()
    }

    /// File by relative path
    #[must_use]
    pub fn find(&self, path: impl AsRef<Path>) -> Option<&GeneratedFile> {
        let path = path.as_ref();
        self.files.iter().find(|file| file.path == path)
    }

    /// Files of one category
    pub fn of_kind(&self, kind: ArtifactKind) -> impl Iterator<Item = &GeneratedFile> {
        self.files.iter().filter(move |file| file.kind == kind)
    }

    /// Write every file under `root`, creating directories as needed
    ///
    /// Existing files are overwritten. Returns the written paths.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory or file cannot be written.
    pub fn write_to(&self, root: &Path) -> Result<Vec<PathBuf>> {
        let mut written = Vec::with_capacity(self.files.len());

        for file in &self.files {
            let path = root.join(&file.path);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).map_err(|err| ScaffoldError::io(parent, err))?;
            }
            std::fs::write(&path, &file.content).map_err(|err| ScaffoldError::io(&path, err))?;
            tracing::debug!(path = %path.display(), kind = %file.kind, "artifact written");
            written.push(path);
        }

        Ok(written)
    }
}

impl<'a> IntoIterator for &'a ArtifactSet {
    type Item = &'a GeneratedFile;
    type IntoIter = std::slice::Iter<'a, GeneratedFile>;

    fn into_iter(self) -> Self::IntoIter {
        self.files.iter()
    }
}

/// CRUD scaffold generator
pub struct ScaffoldGenerator {
    schema: EntitySchema,
    mode: GenerationMode,
    options: ScaffoldOptions,
    templates: TemplateRegistry,
}

impl ScaffoldGenerator {
    /// Create a generator for a validated schema
    ///
    /// # Errors
    ///
    /// Returns an error if the embedded templates fail to load.
    pub fn new(schema: EntitySchema, mode: GenerationMode, options: ScaffoldOptions) -> Result<Self> {
        let templates = TemplateRegistry::new()?;

        Ok(Self {
            schema,
            mode,
            options,
            templates,
        })
    }

    /// Schema being generated
    #[must_use]
    pub const fn schema(&self) -> &EntitySchema {
        &self.schema
    }

    /// Generation mode
    #[must_use]
    pub const fn mode(&self) -> GenerationMode {
        self.mode
    }

    /// Generate all CRUD files
    ///
    /// Standard mode yields eight files and one-page mode five: migration,
    /// model, handlers, routes and the page templates.
    ///
    /// # Errors
    ///
    /// Returns an error if template rendering fails for any file.
    #[tracing::instrument(skip(self), fields(model = self.schema.model_name(), mode = %self.mode))]
    pub fn generate(&self) -> Result<ArtifactSet> {
        let storage = generate_storage_schema(&self.schema);
        let model = generate_model_descriptor(&self.schema);
        let operations = generate_operations(&self.schema, self.mode);
        let routes = RouteTable::from_operations(&operations);
        let views = generate_views_with(&self.schema, self.mode, &self.options);

        let mut files = vec![
            self.generate_migration(&storage)?,
            self.generate_model(&model)?,
            self.generate_handlers(&operations, &model)?,
            self.generate_routes(&routes)?,
        ];
        files.extend(self.generate_views(&views)?);

        tracing::info!(files = files.len(), "scaffold generated");

        Ok(ArtifactSet {
            mode: self.mode,
            files,
        })
    }

    /// Generate all CRUD files and write them under `root`
    ///
    /// # Errors
    ///
    /// Returns an error if rendering or a write fails. A rendering failure
    /// writes nothing.
    pub fn write_to(&self, root: &Path) -> Result<Vec<PathBuf>> {
        self.generate()?.write_to(root)
    }

    fn generate_migration(&self, storage: &StorageSchemaDescriptor) -> Result<GeneratedFile> {
        let content = self.templates.render(
            "migration.sql",
            serde_json::json!({
                "model_name": self.schema.model_name(),
                "table_name": storage.table_name,
                "definitions": storage.definitions(self.options.backend),
            }),
        )?;

        Ok(GeneratedFile {
            path: PathBuf::from("migrations").join(format!(
                "{}_create_{}.sql",
                self.schema.created_at().format("%Y%m%d%H%M%S"),
                storage.table_name
            )),
            content,
            description: format!("Migration for {} table", storage.table_name),
            kind: ArtifactKind::StorageSchema,
        })
    }

    fn generate_model(&self, model: &ModelDescriptor) -> Result<GeneratedFile> {
        let backend = self.options.backend;
        let relations: Vec<serde_json::Value> = model
            .relations
            .iter()
            .map(|relation| {
                serde_json::json!({
                    "name": relation.name,
                    "field": relation.field,
                    "loader": relation.loader,
                    "column": relation.column,
                    "related_model": relation.related_model,
                    "lookup_sql": relation.lookup_sql(backend),
                    "eager_sql": relation.eager_sql(&model.table_name),
                })
            })
            .collect();
        let related_imports: Vec<serde_json::Value> = model
            .related_imports()
            .into_iter()
            .map(|(module, name)| serde_json::json!({ "module": module, "model": name }))
            .collect();

        let content = self.templates.render(
            "model.rs",
            serde_json::json!({
                "model_name": model.model_name,
                "table_name": model.table_name,
                "input_name": model.input_name,
                "pool": backend.pool_type(),
                "fillable": model.fillable,
                "fields": model.fields,
                "fallible_input": model.has_fallible_input(),
                "relations": relations,
                "related_imports": related_imports,
                "all_sql": model.all_sql(),
                "find_sql": model.find_sql(backend),
                "insert_sql": model.insert_sql(backend),
                "update_sql": model.update_sql(backend),
                "delete_sql": model.delete_sql(backend),
            }),
        )?;

        Ok(GeneratedFile {
            path: PathBuf::from(format!("src/models/{}.rs", model.module_name)),
            content,
            description: format!("{} model", model.model_name),
            kind: ArtifactKind::Model,
        })
    }

    fn generate_handlers(
        &self,
        operations: &OperationSet,
        model: &ModelDescriptor,
    ) -> Result<GeneratedFile> {
        let option_imports: Vec<serde_json::Value> = operations
            .option_imports()
            .into_iter()
            .filter(|(_, name)| *name != model.model_name)
            .map(|(module, name)| serde_json::json!({ "module": module, "model": name }))
            .collect();

        let content = self.templates.render(
            "handler.rs",
            serde_json::json!({
                "model_name": model.model_name,
                "model_module": model.module_name,
                "input_name": model.input_name,
                "handler_module": operations.handler_module,
                "operations": operations.operations,
                "option_imports": option_imports,
                "has_relations": !model.relations.is_empty(),
            }),
        )?;

        Ok(GeneratedFile {
            path: PathBuf::from(format!("src/handlers/{}.rs", operations.handler_module)),
            content,
            description: format!("{} handlers", model.model_name),
            kind: ArtifactKind::Handler,
        })
    }

    fn generate_routes(&self, table: &RouteTable) -> Result<GeneratedFile> {
        let imports = table.routing_imports();
        let routing_use = match imports.as_slice() {
            [single] => format!("use axum::routing::{single};"),
            many => format!("use axum::routing::{{{}}};", many.join(", ")),
        };

        let mut named_routes = Vec::with_capacity(table.len());
        let mut routes = Vec::with_capacity(table.routes.len());
        for entry in &table.routes {
            let chain: Vec<String> = entry
                .handlers
                .iter()
                .enumerate()
                .map(|(index, handler)| {
                    let call = format!(
                        "{}({}::{})",
                        handler.method.routing_fn(),
                        table.handler_module,
                        handler.handler
                    );
                    if index == 0 {
                        call
                    } else {
                        format!(".{call}")
                    }
                })
                .collect();
            routes.push(serde_json::json!({ "path": entry.path, "chain": chain.concat() }));

            for handler in &entry.handlers {
                named_routes.push(serde_json::json!({
                    "name": handler.route_name,
                    "method": handler.method.as_str(),
                    "path": entry.path,
                }));
            }
        }

        let content = self.templates.render(
            "routes.rs",
            serde_json::json!({
                "model_name": self.schema.model_name(),
                "handler_module": table.handler_module,
                "route_prefix": table.route_prefix,
                "routing_use": routing_use,
                "named_routes": named_routes,
                "routes": routes,
            }),
        )?;

        Ok(GeneratedFile {
            path: PathBuf::from(format!("src/routes/{}.rs", table.handler_module)),
            content,
            description: format!("{} route table", self.schema.model_name()),
            kind: ArtifactKind::RouteTable,
        })
    }

    fn generate_views(&self, views: &ViewArtifactSet) -> Result<Vec<GeneratedFile>> {
        views
            .views
            .iter()
            .map(|view| {
                let template = match (view.one_page, view.kind) {
                    (true, _) => "one_page.html",
                    (false, ViewKind::List) => "list.html",
                    (false, ViewKind::Create | ViewKind::Edit) => "form.html",
                    (false, ViewKind::Show) => "show.html",
                };
                let content = self.templates.render(
                    template,
                    serde_json::json!({ "view": view, "layout": self.options.layout }),
                )?;

                Ok(GeneratedFile {
                    path: PathBuf::from("templates").join(&view.template_path),
                    content,
                    description: format!("{} page {}", self.schema.model_name(), view.template_path),
                    kind: ArtifactKind::View,
                })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::schema::{EntityInput, FieldInput};
    use chrono::NaiveDate;

    fn client() -> EntitySchema {
        let created_at = NaiveDate::from_ymd_opt(2024, 3, 5)
            .and_then(|date| date.and_hms_opt(14, 30, 0))
            .unwrap();
        EntitySchema::build_at(
            &EntityInput {
                model_name: "Client".into(),
                table_name: "clients".into(),
                short_name: "clients".into(),
                display_title: "Client".into(),
                fields: vec![
                    FieldInput::new("name", "short_text"),
                    FieldInput {
                        related_table: Some("users".into()),
                        related_model: Some("User".into()),
                        display_column: Some("email".into()),
                        ..FieldInput::new("owner_id", "foreign")
                    },
                    FieldInput::new("notes", "rich_text"),
                ],
                ..EntityInput::default()
            },
            created_at,
        )
        .unwrap()
    }

    fn generate(mode: GenerationMode) -> ArtifactSet {
        ScaffoldGenerator::new(client(), mode, ScaffoldOptions::default())
            .unwrap()
            .generate()
            .unwrap()
    }

    fn content<'a>(set: &'a ArtifactSet, path: &str) -> &'a str {
        &set.find(path).unwrap_or_else(|| panic!("missing {path}")).content
    }

    #[test]
    fn test_standard_file_set() {
        let set = generate(GenerationMode::Standard);
        let paths: Vec<_> = set.iter().map(|file| file.path.to_string_lossy().into_owned()).collect();
        assert_eq!(
            paths,
            [
                "migrations/20240305143000_create_clients.sql",
                "src/models/client.rs",
                "src/handlers/clients.rs",
                "src/routes/clients.rs",
                "templates/clients/index.html",
                "templates/clients/create.html",
                "templates/clients/edit.html",
                "templates/clients/show.html",
            ]
        );
        assert_eq!(set.of_kind(ArtifactKind::View).count(), 4);
    }

    #[test]
    fn test_one_page_file_set() {
        let set = generate(GenerationMode::OnePage);
        assert_eq!(set.len(), 5);
        assert!(set.find("templates/clients/index.html").is_some());
        assert!(set.find("templates/clients/create.html").is_none());
    }

    #[test]
    fn test_migration_content() {
        let set = generate(GenerationMode::Standard);
        let sql = content(&set, "migrations/20240305143000_create_clients.sql");
        assert!(sql.contains("CREATE TABLE IF NOT EXISTS clients ("));
        assert!(sql.contains("    id BIGSERIAL PRIMARY KEY,\n"));
        assert!(sql.contains(
            "CONSTRAINT fk_clients_owner_id FOREIGN KEY (owner_id) REFERENCES users(id) ON DELETE CASCADE"
        ));
        assert!(sql.contains("DROP TABLE IF EXISTS clients;"));
    }

    #[test]
    fn test_model_content() {
        let set = generate(GenerationMode::Standard);
        let model = content(&set, "src/models/client.rs");
        assert!(model.contains("pub struct Client {"));
        assert!(model.contains("use super::user::User;"));
        assert!(model.contains(r#"pub const FILLABLE: &[&str] = &["name", "owner_id", "notes"];"#));
        assert!(model.contains(r#"#[serde(rename = "ownerIdRelation""#));
        assert!(model.contains("pub owner_id_relation: Option<Box<User>>,"));
        assert!(model.contains("pub async fn load_owner_id_relation("));
        assert!(model.contains("pub async fn eager_load("));
        assert!(model.contains("SELECT * FROM users WHERE id IN (SELECT owner_id FROM clients)"));
    }

    #[test]
    fn test_model_rejects_malformed_input() {
        let set = generate(GenerationMode::Standard);
        let model = content(&set, "src/models/client.rs");
        assert!(model.contains(
            "pub fn try_from_form(form: &HashMap<String, String>) -> Result<Self, String> {"
        ));
        assert!(model.contains(r#"invalid("owner_id", err))?,"#));
        assert!(model.contains("fn invalid(column: &str, err: impl std::fmt::Display) -> String {"));
        assert!(!model.contains("unwrap_or_default"));

        let handlers = content(&set, "src/handlers/clients.rs");
        assert!(handlers.contains("match ClientInput::try_from_form(&form) {"));
        assert!(handlers.contains(
            "Ok(input) => Client::create(&state.db, &input).await.map_err(|err| err.to_string()),"
        ));
    }

    #[test]
    fn test_handler_content() {
        let set = generate(GenerationMode::Standard);
        let handlers = content(&set, "src/handlers/clients.rs");
        for name in ["index", "create", "store", "show", "edit", "update", "destroy"] {
            assert!(handlers.contains(&format!("pub async fn {name}(")), "{name}");
        }
        assert!(handlers.contains("item.load_relations(&state.db).await?;"));
        assert!(handlers.contains("let owner_id_options = User::all(&state.db).await?;"));
        assert!(handlers.contains(r#"flash.success("Client created successfully!")"#));
        assert!(handlers.contains(r#"Redirect::to(&format!("/clients/{id}/edit"))"#));
    }

    #[test]
    fn test_one_page_handlers_eager_load() {
        let set = generate(GenerationMode::OnePage);
        let handlers = content(&set, "src/handlers/clients.rs");
        assert!(handlers.contains("Client::eager_load(&mut items, &state.db).await?;"));
        assert!(!handlers.contains("pub async fn show("));
        assert!(!handlers.contains("pub async fn create("));
    }

    #[test]
    fn test_routes_content() {
        let set = generate(GenerationMode::Standard);
        let routes = content(&set, "src/routes/clients.rs");
        assert!(routes.contains("use axum::routing::get;"));
        assert!(routes.contains(
            r#".route("/clients", get(clients::index).post(clients::store))"#
        ));
        assert!(routes.contains(r#"("clients.destroy", "DELETE", "/clients/{id}"),"#));
    }

    #[test]
    fn test_views_content() {
        let set = generate(GenerationMode::Standard);

        let list = content(&set, "templates/clients/index.html");
        assert!(list.starts_with(r#"{% extends "layouts/app.html" %}"#));
        assert!(list.contains("<th>#</th>"));
        assert!(list.contains("{{ loop.index }}"));
        assert!(list.contains(r#"hx-confirm="Are you sure?""#));
        assert!(!list.contains("ckeditor"));
        assert!(list.contains(r#"<table class="table table-bordered data-table">"#));
        assert!(list.contains("new DataTable('table.data-table'"));
        assert!(list.contains("searchBuilder"));
        assert!(list.contains("buttons: ['copy', 'csv', 'excel', 'pdf', 'print']"));
        assert_eq!(list.matches("{% block scripts %}").count(), 1);

        let create = content(&set, "templates/clients/create.html");
        assert!(create.contains(r#"hx-post="/clients""#));
        assert!(create.contains("ckeditor"));
        assert!(!create.contains("DataTable"));

        let edit = content(&set, "templates/clients/edit.html");
        assert!(edit.contains(r#"hx-put="/clients/{{ item.id }}""#));
        assert!(edit.contains("Are you sure you want to update this Client?"));
    }

    #[test]
    fn test_one_page_view_has_dialogs() {
        let set = generate(GenerationMode::OnePage);
        let page = content(&set, "templates/clients/index.html");
        assert_eq!(page.matches("<dialog").count(), 2);
        assert!(page.contains("showModal()"));
        assert!(page.contains(r#"id="create-clients-dialog""#));
        assert!(page.contains(r#"id="edit-clients-{{ item.id }}""#));
        assert!(page.contains("ckeditor"));
        assert!(page.contains("new DataTable('table.data-table'"));
        assert!(page.contains("searchBuilder"));
        assert_eq!(page.matches("{% block scripts %}").count(), 1);
    }

    #[test]
    fn test_generation_is_idempotent() {
        assert_eq!(generate(GenerationMode::Standard), generate(GenerationMode::Standard));
    }

    #[test]
    fn test_write_to() {
        let dir = tempfile::tempdir().unwrap();
        let set = generate(GenerationMode::OnePage);
        let written = set.write_to(dir.path()).unwrap();

        assert_eq!(written.len(), 5);
        let model = std::fs::read_to_string(dir.path().join("src/models/client.rs")).unwrap();
        assert_eq!(model, content(&set, "src/models/client.rs"));
    }
}
