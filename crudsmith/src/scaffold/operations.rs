//! Handler and route generation
//!
//! An [`OperationSet`] describes the CRUD handlers of one entity: which
//! operations exist in the selected [`GenerationMode`], how each is bound to a
//! verb and path, which relations and dropdown options each page loads, and
//! what each mutation reports on success or failure. [`RouteTable`] groups the
//! same operations by path for the generated axum router.

use super::helpers::TemplateHelpers;
use super::schema::EntitySchema;
use super::GenerationMode;
use serde::Serialize;
use std::fmt;

/// CRUD operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    /// List every record
    Index,
    /// Show the create form
    Create,
    /// Persist a new record
    Store,
    /// Show one record
    Show,
    /// Show the edit form
    Edit,
    /// Persist changes to a record
    Update,
    /// Delete a record
    Destroy,
}

impl OperationKind {
    /// Operations of a multi-page scaffold, in route order
    pub const STANDARD: [Self; 7] = [
        Self::Index,
        Self::Create,
        Self::Store,
        Self::Show,
        Self::Edit,
        Self::Update,
        Self::Destroy,
    ];

    /// Operations of a one-page scaffold, in route order
    pub const ONE_PAGE: [Self; 4] = [Self::Index, Self::Store, Self::Update, Self::Destroy];

    /// Operations available in `mode`
    #[must_use]
    pub const fn for_mode(mode: GenerationMode) -> &'static [Self] {
        match mode {
            GenerationMode::Standard => &Self::STANDARD,
            GenerationMode::OnePage => &Self::ONE_PAGE,
        }
    }

    /// Handler and route-name suffix
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Index => "index",
            Self::Create => "create",
            Self::Store => "store",
            Self::Show => "show",
            Self::Edit => "edit",
            Self::Update => "update",
            Self::Destroy => "destroy",
        }
    }

    /// HTTP verb
    #[must_use]
    pub const fn method(self) -> HttpMethod {
        match self {
            Self::Index | Self::Create | Self::Show | Self::Edit => HttpMethod::Get,
            Self::Store => HttpMethod::Post,
            Self::Update => HttpMethod::Put,
            Self::Destroy => HttpMethod::Delete,
        }
    }

    /// Path relative to the entity prefix
    #[must_use]
    pub const fn relative_path(self) -> &'static str {
        match self {
            Self::Index | Self::Store => "/",
            Self::Create => "/create",
            Self::Show | Self::Update | Self::Destroy => "/{id}",
            Self::Edit => "/{id}/edit",
        }
    }

    /// Whether the path carries the record id
    #[must_use]
    pub const fn takes_id(self) -> bool {
        matches!(self, Self::Show | Self::Edit | Self::Update | Self::Destroy)
    }

    /// Whether the operation changes stored data
    #[must_use]
    pub const fn is_mutation(self) -> bool {
        matches!(self, Self::Store | Self::Update | Self::Destroy)
    }

    /// Past tense and progressive forms used in outcome messages
    const fn verb_forms(self) -> Option<(&'static str, &'static str)> {
        match self {
            Self::Store => Some(("created", "creating")),
            Self::Update => Some(("updated", "updating")),
            Self::Destroy => Some(("deleted", "deleting")),
            Self::Index | Self::Create | Self::Show | Self::Edit => None,
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// HTTP verb of a route
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// GET
    Get,
    /// POST
    Post,
    /// PUT
    Put,
    /// DELETE
    Delete,
}

impl HttpMethod {
    /// Upper-case verb
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }

    /// axum routing function for this verb
    #[must_use]
    pub const fn routing_fn(self) -> &'static str {
        match self {
            Self::Get => "get",
            Self::Post => "post",
            Self::Put => "put",
            Self::Delete => "delete",
        }
    }

    /// HTMX request attribute for this verb
    #[must_use]
    pub const fn htmx_attr(self) -> &'static str {
        match self {
            Self::Get => "hx-get",
            Self::Post => "hx-post",
            Self::Put => "hx-put",
            Self::Delete => "hx-delete",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a mutation reports and where it sends the user
///
/// Redirect paths may contain `{id}`, the id of the record being changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MutationOutcome {
    /// Flash message on success
    pub success_message: String,
    /// Flash message prefix on failure; the error text follows
    pub failure_prefix: String,
    /// Redirect after success
    pub success_redirect: String,
    /// Redirect after failure, back to the originating page
    pub failure_redirect: String,
}

impl MutationOutcome {
    /// Failure message for an underlying error text
    #[must_use]
    pub fn failure_message(&self, error: &str) -> String {
        format!("{}{error}", self.failure_prefix)
    }
}

/// Records a page needs to fill a related-record dropdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OptionSource {
    /// Foreign column the dropdown edits
    pub column: String,
    /// Template variable holding the records
    pub variable: String,
    /// Related model type
    pub related_model: String,
    /// Module of the related model
    pub related_module: String,
    /// Column shown as the option label
    pub display_column: String,
}

/// How an operation loads relation accessors before rendering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationLoading {
    /// Relations are not loaded
    #[default]
    None,
    /// One lookup per record and relation
    PerRecord,
    /// One lookup per relation for the whole list
    Eager,
}

/// One generated handler
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Operation {
    /// Operation kind
    pub kind: OperationKind,
    /// Handler function name
    pub handler: String,
    /// Route name, `<short_name>.<operation>`
    pub route_name: String,
    /// HTTP verb
    pub method: HttpMethod,
    /// Path relative to the entity prefix
    pub path: String,
    /// Absolute path
    pub full_path: String,
    /// Template rendered by page operations
    pub view: Option<String>,
    /// Relation loading before rendering
    pub relation_loading: RelationLoading,
    /// Dropdown option sources for the rendered forms
    pub option_sources: Vec<OptionSource>,
    /// Outcome reporting of mutations
    pub outcome: Option<MutationOutcome>,
}

impl Operation {
    /// Whether the path carries the record id
    #[must_use]
    pub const fn takes_id(&self) -> bool {
        self.kind.takes_id()
    }
}

/// Every handler of one entity in one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperationSet {
    /// Rendering strategy
    pub mode: GenerationMode,
    /// Model type name
    pub model_name: String,
    /// Module of the model
    pub model_module: String,
    /// Module of the handlers and routes
    pub handler_module: String,
    /// Entity URL prefix
    pub route_prefix: String,
    /// Operations in route order
    pub operations: Vec<Operation>,
}

impl OperationSet {
    /// Operation of the given kind
    #[must_use]
    pub fn get(&self, kind: OperationKind) -> Option<&Operation> {
        self.operations.iter().find(|operation| operation.kind == kind)
    }

    /// Operation kinds in route order
    #[must_use]
    pub fn kinds(&self) -> Vec<OperationKind> {
        self.operations.iter().map(|operation| operation.kind).collect()
    }

    /// Related models the handlers query for dropdowns, deduplicated
    #[must_use]
    pub fn option_imports(&self) -> Vec<(&str, &str)> {
        let mut imports: Vec<(&str, &str)> = Vec::new();
        for source in self
            .operations
            .iter()
            .flat_map(|operation| &operation.option_sources)
        {
            let import = (source.related_module.as_str(), source.related_model.as_str());
            if source.related_model != self.model_name && !imports.contains(&import) {
                imports.push(import);
            }
        }
        imports
    }
}

/// Describe the handlers of `schema` in `mode`
#[must_use]
pub fn generate_operations(schema: &EntitySchema, mode: GenerationMode) -> OperationSet {
    let short = schema.short_name();
    let prefix = TemplateHelpers::to_route_prefix(short);
    let view_dir = short.trim_matches('/');
    let title = schema.display_title();

    let option_sources: Vec<OptionSource> = schema
        .foreign_fields()
        .map(|field| {
            let related_model = field.related_model_or_placeholder().to_string();
            OptionSource {
                column: field.column_name.clone(),
                variable: TemplateHelpers::options_variable(&field.column_name),
                related_module: TemplateHelpers::to_module_name(&related_model),
                display_column: field.display_column_or_default().to_string(),
                related_model,
            }
        })
        .collect();

    let operations = OperationKind::for_mode(mode)
        .iter()
        .map(|&kind| {
            let relative = kind.relative_path();
            let full_path = if relative == "/" {
                prefix.clone()
            } else {
                format!("{prefix}{relative}")
            };

            let view = match (mode, kind) {
                (_, OperationKind::Index) => Some(format!("{view_dir}/index.html")),
                (GenerationMode::Standard, OperationKind::Create) => {
                    Some(format!("{view_dir}/create.html"))
                }
                (GenerationMode::Standard, OperationKind::Show) => {
                    Some(format!("{view_dir}/show.html"))
                }
                (GenerationMode::Standard, OperationKind::Edit) => {
                    Some(format!("{view_dir}/edit.html"))
                }
                _ => None,
            };

            let relation_loading = match (mode, kind) {
                (GenerationMode::OnePage, OperationKind::Index) => RelationLoading::Eager,
                (GenerationMode::Standard, OperationKind::Index | OperationKind::Show) => {
                    RelationLoading::PerRecord
                }
                _ => RelationLoading::None,
            };

            let renders_form = matches!(
                (mode, kind),
                (GenerationMode::OnePage, OperationKind::Index)
                    | (
                        GenerationMode::Standard,
                        OperationKind::Create | OperationKind::Edit
                    )
            );

            Operation {
                kind,
                handler: kind.as_str().to_string(),
                route_name: format!("{view_dir}.{kind}"),
                method: kind.method(),
                path: relative.to_string(),
                full_path,
                view,
                relation_loading,
                option_sources: if renders_form {
                    option_sources.clone()
                } else {
                    Vec::new()
                },
                outcome: mutation_outcome(kind, mode, title, &prefix),
            }
        })
        .collect();

    OperationSet {
        mode,
        model_name: schema.model_name().to_string(),
        model_module: TemplateHelpers::to_module_name(schema.model_name()),
        handler_module: TemplateHelpers::to_module_name(short),
        route_prefix: prefix,
        operations,
    }
}

fn mutation_outcome(
    kind: OperationKind,
    mode: GenerationMode,
    title: &str,
    prefix: &str,
) -> Option<MutationOutcome> {
    let (done, doing) = kind.verb_forms()?;

    let failure_redirect = match (mode, kind) {
        (GenerationMode::Standard, OperationKind::Store) => format!("{prefix}/create"),
        (GenerationMode::Standard, OperationKind::Update) => format!("{prefix}/{{id}}/edit"),
        _ => prefix.to_string(),
    };

    Some(MutationOutcome {
        success_message: format!("{title} {done} successfully!"),
        failure_prefix: format!("Error {doing} {title}: "),
        success_redirect: prefix.to_string(),
        failure_redirect,
    })
}

/// One handler bound to a path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteHandler {
    /// HTTP verb
    pub method: HttpMethod,
    /// Handler function name
    pub handler: String,
    /// Route name
    pub route_name: String,
}

/// Handlers sharing one path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteEntry {
    /// Absolute path
    pub path: String,
    /// Handlers in operation order
    pub handlers: Vec<RouteHandler>,
}

/// Route table of one entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTable {
    /// Module of the handlers
    pub handler_module: String,
    /// Entity URL prefix
    pub route_prefix: String,
    /// Paths in first-use order
    pub routes: Vec<RouteEntry>,
}

impl RouteTable {
    /// Group `operations` by path
    #[must_use]
    pub fn from_operations(operations: &OperationSet) -> Self {
        let mut routes: Vec<RouteEntry> = Vec::new();

        for operation in &operations.operations {
            let handler = RouteHandler {
                method: operation.method,
                handler: operation.handler.clone(),
                route_name: operation.route_name.clone(),
            };

            match routes
                .iter_mut()
                .find(|entry| entry.path == operation.full_path)
            {
                Some(entry) => entry.handlers.push(handler),
                None => routes.push(RouteEntry {
                    path: operation.full_path.clone(),
                    handlers: vec![handler],
                }),
            }
        }

        Self {
            handler_module: operations.handler_module.clone(),
            route_prefix: operations.route_prefix.clone(),
            routes,
        }
    }

    /// Route name bound to `method` and `path`
    #[must_use]
    pub fn resolve(&self, method: HttpMethod, path: &str) -> Option<&str> {
        self.routes
            .iter()
            .find(|entry| entry.path == path)?
            .handlers
            .iter()
            .find(|handler| handler.method == method)
            .map(|handler| handler.route_name.as_str())
    }

    /// axum routing functions the generated router imports, sorted
    #[must_use]
    pub fn routing_imports(&self) -> Vec<&'static str> {
        let mut imports: Vec<&'static str> = self
            .routes
            .iter()
            .filter_map(|entry| entry.handlers.first())
            .map(|handler| handler.method.routing_fn())
            .collect();
        imports.sort_unstable();
        imports.dedup();
        imports
    }

    /// Number of bound handlers
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes.iter().map(|entry| entry.handlers.len()).sum()
    }

    /// Whether no handler is bound
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
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
            ],
            ..EntityInput::default()
        })
        .unwrap()
    }

    #[test]
    fn test_standard_operations() {
        let set = generate_operations(&client(), GenerationMode::Standard);
        assert_eq!(set.kinds(), OperationKind::STANDARD);

        let expected = [
            ("clients.index", HttpMethod::Get, "/clients"),
            ("clients.create", HttpMethod::Get, "/clients/create"),
            ("clients.store", HttpMethod::Post, "/clients"),
            ("clients.show", HttpMethod::Get, "/clients/{id}"),
            ("clients.edit", HttpMethod::Get, "/clients/{id}/edit"),
            ("clients.update", HttpMethod::Put, "/clients/{id}"),
            ("clients.destroy", HttpMethod::Delete, "/clients/{id}"),
        ];
        for (operation, (name, method, path)) in set.operations.iter().zip(expected) {
            assert_eq!(operation.route_name, name);
            assert_eq!(operation.method, method);
            assert_eq!(operation.full_path, path);
        }
    }

    #[test]
    fn test_one_page_operations() {
        let set = generate_operations(&client(), GenerationMode::OnePage);
        assert_eq!(set.kinds(), OperationKind::ONE_PAGE);

        let index = set.get(OperationKind::Index).unwrap();
        assert_eq!(index.relation_loading, RelationLoading::Eager);
        assert_eq!(index.option_sources.len(), 1);
        assert_eq!(index.option_sources[0].variable, "owner_id_options");
        assert_eq!(index.view.as_deref(), Some("clients/index.html"));
        assert!(set.get(OperationKind::Create).is_none());
        assert!(set.get(OperationKind::Show).is_none());
    }

    #[test]
    fn test_standard_relation_loading_and_options() {
        let set = generate_operations(&client(), GenerationMode::Standard);
        let loading = |kind| set.get(kind).unwrap().relation_loading;
        assert_eq!(loading(OperationKind::Index), RelationLoading::PerRecord);
        assert_eq!(loading(OperationKind::Show), RelationLoading::PerRecord);
        assert_eq!(loading(OperationKind::Edit), RelationLoading::None);

        let sources = |kind| set.get(kind).unwrap().option_sources.len();
        assert_eq!(sources(OperationKind::Create), 1);
        assert_eq!(sources(OperationKind::Edit), 1);
        assert_eq!(sources(OperationKind::Index), 0);
        assert_eq!(set.option_imports(), [("user", "User")]);
    }

    #[test]
    fn test_mutation_outcomes() {
        let set = generate_operations(&client(), GenerationMode::Standard);

        let store = set.get(OperationKind::Store).unwrap().outcome.as_ref().unwrap();
        assert_eq!(store.success_message, "Client created successfully!");
        assert_eq!(store.failure_message("boom"), "Error creating Client: boom");
        assert_eq!(store.success_redirect, "/clients");
        assert_eq!(store.failure_redirect, "/clients/create");

        let update = set.get(OperationKind::Update).unwrap().outcome.as_ref().unwrap();
        assert_eq!(update.success_message, "Client updated successfully!");
        assert_eq!(update.failure_redirect, "/clients/{id}/edit");

        let destroy = set.get(OperationKind::Destroy).unwrap().outcome.as_ref().unwrap();
        assert_eq!(destroy.failure_prefix, "Error deleting Client: ");
        assert_eq!(destroy.failure_redirect, "/clients");

        assert!(set.get(OperationKind::Index).unwrap().outcome.is_none());
    }

    #[test]
    fn test_one_page_failures_return_to_list() {
        let set = generate_operations(&client(), GenerationMode::OnePage);
        for kind in [OperationKind::Store, OperationKind::Update, OperationKind::Destroy] {
            let outcome = set.get(kind).unwrap().outcome.as_ref().unwrap();
            assert_eq!(outcome.failure_redirect, "/clients");
        }
    }

    #[test]
    fn test_route_table_groups_by_path() {
        let set = generate_operations(&client(), GenerationMode::Standard);
        let table = RouteTable::from_operations(&set);

        assert_eq!(table.routes.len(), 4);
        assert_eq!(table.len(), 7);
        assert_eq!(table.resolve(HttpMethod::Put, "/clients/{id}"), Some("clients.update"));
        assert_eq!(table.resolve(HttpMethod::Post, "/clients"), Some("clients.store"));
        assert_eq!(table.resolve(HttpMethod::Post, "/clients/create"), None);
        assert_eq!(table.routing_imports(), ["get"]);
    }

    #[test]
    fn test_one_page_route_table() {
        let set = generate_operations(&client(), GenerationMode::OnePage);
        let table = RouteTable::from_operations(&set);

        assert_eq!(table.routes.len(), 2);
        assert_eq!(table.routes[1].path, "/clients/{id}");
        assert_eq!(table.routes[1].handlers[0].method, HttpMethod::Put);
        assert_eq!(table.routing_imports(), ["get", "put"]);
    }
}
