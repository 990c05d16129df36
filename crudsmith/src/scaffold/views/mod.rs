//! View generation
//!
//! Builds one [`ViewDescriptor`] per page template the mode calls for:
//!
//! - [`GenerationMode::Standard`]: list, create, edit and show pages
//! - [`GenerationMode::OnePage`]: a single list page carrying one create
//!   dialog and, inside the row loop, one edit dialog per record
//!
//! Field controls and display values come from [`markup`], driven by the
//! registry mappings of each field type. The identity column is never an
//! editable control.

pub mod markup;

use super::helpers::TemplateHelpers;
use super::operations::HttpMethod;
use super::schema::EntitySchema;
use super::{GenerationMode, ScaffoldOptions};
use markup::{expr, FormScope, RECORD};
use serde::Serialize;

/// Confirmation asked before deleting a record
pub const DELETE_CONFIRMATION: &str = "Are you sure?";

/// Page template kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Table of every record
    List,
    /// Create form
    Create,
    /// Edit form
    Edit,
    /// Read-only detail page
    Show,
}

impl ViewKind {
    /// Template file name
    #[must_use]
    pub const fn file_name(self) -> &'static str {
        match self {
            Self::List => "index.html",
            Self::Create => "create.html",
            Self::Edit => "edit.html",
            Self::Show => "show.html",
        }
    }
}

/// A field as shown in lists and detail pages
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldView {
    /// Column name
    pub column: String,
    /// Escaped label
    pub label: String,
    /// Display expression for the current record
    pub display: String,
}

/// A form on a page, standalone or inside a dialog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FormDescriptor {
    /// Form element id
    pub id: String,
    /// Enclosing `<dialog>` id, for dialog forms
    pub dialog_id: Option<String>,
    /// Dialog heading or page heading
    pub heading: String,
    /// HTMX request attribute, e.g. `hx-post`
    pub htmx_attr: &'static str,
    /// Request URL, possibly with a record id expression
    pub action: String,
    /// Confirmation asked before submitting
    pub confirm: Option<String>,
    /// Form groups in field order
    pub controls: Vec<String>,
    /// Submit button label
    pub submit_label: String,
}

/// One page template
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewDescriptor {
    /// Page kind
    pub kind: ViewKind,
    /// Template path relative to the templates directory
    pub template_path: String,
    /// Escaped entity display title
    pub title: String,
    /// Entity URL prefix
    pub route_prefix: String,
    /// Fields in display order
    pub fields: Vec<FieldView>,
    /// Forms on the page
    pub forms: Vec<FormDescriptor>,
    /// Whether the page loads the rich-text editor
    pub rich_text: bool,
    /// Whether the record table gets search-builder filtering and export buttons
    pub data_table: bool,
    /// Whether forms live in dialogs on the list page
    pub one_page: bool,
    /// Confirmation asked before deleting
    pub delete_confirmation: &'static str,
}

impl ViewDescriptor {
    /// Form by dialog id prefix (`create-` or `edit-`)
    fn dialog(&self, prefix: &str) -> Option<&FormDescriptor> {
        self.forms.iter().find(|form| {
            form.dialog_id
                .as_deref()
                .is_some_and(|id| id.starts_with(prefix))
        })
    }

    /// Inline create dialog of a one-page list
    #[must_use]
    pub fn create_dialog(&self) -> Option<&FormDescriptor> {
        self.dialog("create-")
    }

    /// Per-record edit dialog of a one-page list
    #[must_use]
    pub fn edit_dialog(&self) -> Option<&FormDescriptor> {
        self.dialog("edit-")
    }

    /// Standalone form of a create or edit page
    #[must_use]
    pub fn form(&self) -> Option<&FormDescriptor> {
        self.forms.iter().find(|form| form.dialog_id.is_none())
    }
}

/// Every page template of one entity in one mode
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ViewArtifactSet {
    /// Rendering strategy
    pub mode: GenerationMode,
    /// Pages in generation order
    pub views: Vec<ViewDescriptor>,
}

impl ViewArtifactSet {
    /// Page of the given kind
    #[must_use]
    pub fn get(&self, kind: ViewKind) -> Option<&ViewDescriptor> {
        self.views.iter().find(|view| view.kind == kind)
    }

    /// Number of pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.views.len()
    }

    /// Whether there are no pages
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

/// Describe the pages of `schema` in `mode` with default options
#[must_use]
pub fn generate_views(schema: &EntitySchema, mode: GenerationMode) -> ViewArtifactSet {
    generate_views_with(schema, mode, &ScaffoldOptions::default())
}

/// Describe the pages of `schema` in `mode`
#[must_use]
pub fn generate_views_with(
    schema: &EntitySchema,
    mode: GenerationMode,
    options: &ScaffoldOptions,
) -> ViewArtifactSet {
    let builder = ViewBuilder::new(schema, options);

    let views = match mode {
        GenerationMode::Standard => vec![
            builder.page(ViewKind::List, Vec::new()),
            builder.page(ViewKind::Create, vec![builder.form(FormScope::Create)]),
            builder.page(ViewKind::Edit, vec![builder.form(FormScope::Edit)]),
            builder.page(ViewKind::Show, Vec::new()),
        ],
        GenerationMode::OnePage => {
            let mut list = builder.page(
                ViewKind::List,
                vec![
                    builder.form(FormScope::CreateDialog),
                    builder.form(FormScope::EditDialog),
                ],
            );
            list.one_page = true;
            vec![list]
        }
    };

    tracing::debug!(
        model = schema.model_name(),
        %mode,
        views = views.len(),
        "view descriptors built"
    );

    ViewArtifactSet { mode, views }
}

struct ViewBuilder<'a> {
    schema: &'a EntitySchema,
    options: &'a ScaffoldOptions,
    prefix: String,
    slug: String,
    title: String,
}

impl<'a> ViewBuilder<'a> {
    fn new(schema: &'a EntitySchema, options: &'a ScaffoldOptions) -> Self {
        Self {
            schema,
            options,
            prefix: TemplateHelpers::to_route_prefix(schema.short_name()),
            slug: TemplateHelpers::to_module_name(schema.short_name()).replace('_', "-"),
            title: markup::escape(schema.display_title()),
        }
    }

    fn page(&self, kind: ViewKind, forms: Vec<FormDescriptor>) -> ViewDescriptor {
        let fields = self
            .schema
            .fields()
            .iter()
            .map(|field| FieldView {
                column: field.column_name.clone(),
                label: markup::escape(&field.view_name),
                display: markup::display(field, RECORD, &self.options.number_filter),
            })
            .collect();

        ViewDescriptor {
            kind,
            template_path: format!(
                "{}/{}",
                self.schema.short_name().trim_matches('/'),
                kind.file_name()
            ),
            title: self.title.clone(),
            route_prefix: self.prefix.clone(),
            fields,
            rich_text: !forms.is_empty() && self.schema.has_rich_text(),
            data_table: kind == ViewKind::List,
            forms,
            one_page: false,
            delete_confirmation: DELETE_CONFIRMATION,
        }
    }

    fn form(&self, scope: FormScope) -> FormDescriptor {
        let record_id = expr(&format!("{RECORD}.id"));
        let controls = self
            .schema
            .fields()
            .iter()
            .map(|field| markup::control(field, scope, &self.options.placeholder_options))
            .collect();

        let (id, dialog_id, heading, method, action, confirm, submit_label) = match scope {
            FormScope::Create => (
                format!("create-{}-form", self.slug),
                None,
                format!("Add New {}", self.title),
                HttpMethod::Post,
                self.prefix.clone(),
                None,
                "Save",
            ),
            FormScope::Edit => (
                format!("edit-{}-form", self.slug),
                None,
                format!("Edit {}", self.title),
                HttpMethod::Put,
                format!("{}/{record_id}", self.prefix),
                Some(format!("Are you sure you want to update this {}?", self.title)),
                "Update",
            ),
            FormScope::CreateDialog => (
                format!("create-{}-form", self.slug),
                Some(format!("create-{}-dialog", self.slug)),
                format!("Add New {}", self.title),
                HttpMethod::Post,
                self.prefix.clone(),
                None,
                "Save",
            ),
            FormScope::EditDialog => (
                format!("edit-{}-form-{record_id}", self.slug),
                Some(format!("edit-{}-{record_id}", self.slug)),
                format!("Edit {}", self.title),
                HttpMethod::Put,
                format!("{}/{record_id}", self.prefix),
                None,
                "Update",
            ),
        };

        FormDescriptor {
            id,
            dialog_id,
            heading,
            htmx_attr: method.htmx_attr(),
            action,
            confirm,
            controls,
            submit_label: submit_label.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scaffold::schema::{EntityInput, FieldInput};

    fn client(extra: Vec<FieldInput>) -> EntitySchema {
        let mut fields = vec![
            FieldInput::new("name", "short_text"),
            FieldInput {
                related_table: Some("users".into()),
                related_model: Some("User".into()),
                display_column: Some("email".into()),
                ..FieldInput::new("owner_id", "foreign")
            },
        ];
        fields.extend(extra);
        EntitySchema::build(&EntityInput {
            model_name: "Client".into(),
            table_name: "clients".into(),
            short_name: "clients".into(),
            fields,
            ..EntityInput::default()
        })
        .unwrap()
    }

    #[test]
    fn test_standard_pages() {
        let views = generate_views(&client(Vec::new()), GenerationMode::Standard);
        assert_eq!(views.len(), 4);

        let paths: Vec<&str> = views.views.iter().map(|v| v.template_path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "clients/index.html",
                "clients/create.html",
                "clients/edit.html",
                "clients/show.html"
            ]
        );

        let edit = views.get(ViewKind::Edit).unwrap().form().unwrap();
        assert_eq!(edit.htmx_attr, "hx-put");
        assert_eq!(edit.action, "/clients/{{ item.id }}");
        assert!(edit.confirm.is_some());

        let create = views.get(ViewKind::Create).unwrap().form().unwrap();
        assert_eq!(create.htmx_attr, "hx-post");
        assert_eq!(create.controls.len(), 2);
        assert!(create.confirm.is_none());
    }

    #[test]
    fn test_show_resolves_relation() {
        let views = generate_views(&client(Vec::new()), GenerationMode::Standard);
        let show = views.get(ViewKind::Show).unwrap();
        let owner = show.fields.iter().find(|f| f.column == "owner_id").unwrap();
        assert!(owner.display.contains("item.ownerIdRelation.email"));
    }

    #[test]
    fn test_one_page_dialogs() {
        let views = generate_views(&client(Vec::new()), GenerationMode::OnePage);
        assert_eq!(views.len(), 1);

        let list = views.get(ViewKind::List).unwrap();
        assert!(list.one_page);
        assert!(views.get(ViewKind::Create).is_none());
        assert!(views.get(ViewKind::Show).is_none());

        let create = list.create_dialog().unwrap();
        assert_eq!(create.dialog_id.as_deref(), Some("create-clients-dialog"));

        let edit = list.edit_dialog().unwrap();
        assert_eq!(edit.dialog_id.as_deref(), Some("edit-clients-{{ item.id }}"));
        assert!(edit.controls[0].contains("id=\"name-{{ item.id }}\""));
        assert!(edit.controls[0].contains("value=\"{{ item.name }}\""));
        assert!(list.form().is_none());
    }

    #[test]
    fn test_data_table_only_on_list_pages() {
        let schema = client(vec![FieldInput::new("name", "short_text")]);
        let views = generate_views(&schema, GenerationMode::Standard);
        assert!(views.get(ViewKind::List).unwrap().data_table);
        assert!(!views.get(ViewKind::Create).unwrap().data_table);
        assert!(!views.get(ViewKind::Show).unwrap().data_table);

        let one_page = generate_views(&schema, GenerationMode::OnePage);
        assert!(one_page.get(ViewKind::List).unwrap().data_table);
    }

    #[test]
    fn test_rich_text_only_on_form_pages() {
        let schema = client(vec![FieldInput::new("notes", "rich_text")]);

        let views = generate_views(&schema, GenerationMode::Standard);
        assert!(views.get(ViewKind::Create).unwrap().rich_text);
        assert!(views.get(ViewKind::Edit).unwrap().rich_text);
        assert!(!views.get(ViewKind::List).unwrap().rich_text);
        assert!(!views.get(ViewKind::Show).unwrap().rich_text);

        let plain = generate_views(&client(Vec::new()), GenerationMode::Standard);
        assert!(!plain.get(ViewKind::Create).unwrap().rich_text);

        let one_page = generate_views(&schema, GenerationMode::OnePage);
        assert!(one_page.get(ViewKind::List).unwrap().rich_text);
    }

    #[test]
    fn test_field_order_and_no_identity_control() {
        let views = generate_views(
            &client(vec![FieldInput::new("active", "boolean")]),
            GenerationMode::Standard,
        );
        let form = views.get(ViewKind::Create).unwrap().form().unwrap();

        assert_eq!(form.controls.len(), 3);
        assert!(form.controls[0].contains("name=\"name\""));
        assert!(form.controls[1].contains("name=\"owner_id\""));
        assert!(form.controls[2].contains("name=\"active\""));
        assert!(form.controls.iter().all(|c| !c.contains("name=\"id\"")));
    }
}
