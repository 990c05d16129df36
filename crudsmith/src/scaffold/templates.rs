//! Embedded templates for generated artifacts
//!
//! Artifacts are rendered with minijinja, with auto-escaping off since the
//! output is source code. Page shells emit minijinja syntax of the generated
//! application through the `expr` and `tag` functions, and Rust string
//! literals are produced with the `rust_str` filter.

use super::views::markup;
use crate::error::Result;
use minijinja::{AutoEscape, Environment};
use serde::Serialize;

/// SQL migration
pub const MIGRATION_TEMPLATE: &str = r"-- Create the {{ table_name }} table for {{ model_name }}

-- up
CREATE TABLE IF NOT EXISTS {{ table_name }} (
{% for definition in definitions %}
    {{ definition }}{{ ',' if not loop.last else '' }}
{% endfor %}
);

-- down
DROP TABLE IF EXISTS {{ table_name }};
";

/// sqlx model with mass-assignable input and relation loaders
pub const MODEL_TEMPLATE: &str = r#"//! {{ model_name }} model backed by the `{{ table_name }}` table

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
{% for import in related_imports %}

use super::{{ import.module }}::{{ import.model }};
{% endfor %}

/// Columns accepted from form input
pub const FILLABLE: &[&str] = &[{% for column in fillable %}{{ column|rust_str }}{{ ', ' if not loop.last else '' }}{% endfor %}];

/// {{ model_name }} record
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct {{ model_name }} {
    pub id: i64,
{% for field in fields %}
    pub {{ field.name }}: {{ field.rust_type }},
{% endfor %}
    pub created_at: chrono::NaiveDateTime,
    pub updated_at: chrono::NaiveDateTime,
{% for relation in relations %}
    /// {{ relation.related_model }} referenced by `{{ relation.column }}`
    #[serde(rename = "{{ relation.name }}", default, skip_serializing_if = "Option::is_none")]
    #[sqlx(skip)]
    pub {{ relation.field }}: Option<Box<{{ relation.related_model }}>>,
{% endfor %}
}

/// Mass-assignable {{ model_name }} input
#[derive(Debug, Clone, Default, Deserialize)]
pub struct {{ input_name }} {
{% for field in fields %}
    pub {{ field.name }}: {{ field.rust_type }},
{% endfor %}
}

impl {{ input_name }} {
    /// Read the `FILLABLE` columns from submitted form values
    ///
    /// Fails with a message naming the column when a value does not convert.
    pub fn try_from_form(form: &HashMap<String, String>) -> Result<Self, String> {
        Ok(Self {
{% for field in fields %}
            {{ field.name }}: {{ field.from_form }},
{% endfor %}
        })
    }
}

fn value<'a>(form: &'a HashMap<String, String>, column: &str) -> &'a str {
    form.get(column).map_or("", String::as_str)
}
{% if fallible_input %}

fn invalid(column: &str, err: impl std::fmt::Display) -> String {
    format!("invalid value for {column}: {err}")
}
{% endif %}

impl {{ model_name }} {
    /// Every record, oldest first
    pub async fn all(pool: &{{ pool }}) -> sqlx::Result<Vec<Self>> {
        sqlx::query_as::<_, Self>({{ all_sql|rust_str }})
            .fetch_all(pool)
            .await
    }

    /// Record by id
    pub async fn find(pool: &{{ pool }}, id: i64) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>({{ find_sql|rust_str }})
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Insert a record
    pub async fn create(pool: &{{ pool }}, input: &{{ input_name }}) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>({{ insert_sql|rust_str }})
{% for column in fillable %}
            .bind(&input.{{ column }})
{% endfor %}
            .fetch_one(pool)
            .await
    }

    /// Update a record
    pub async fn update(pool: &{{ pool }}, id: i64, input: &{{ input_name }}) -> sqlx::Result<Self> {
        sqlx::query_as::<_, Self>({{ update_sql|rust_str }})
{% for column in fillable %}
            .bind(&input.{{ column }})
{% endfor %}
            .bind(id)
            .fetch_one(pool)
            .await
    }

    /// Delete a record
    pub async fn delete(pool: &{{ pool }}, id: i64) -> sqlx::Result<()> {
        sqlx::query({{ delete_sql|rust_str }})
            .bind(id)
            .execute(pool)
            .await?;
        Ok(())
    }
{% for relation in relations %}

    /// Load `{{ relation.name }}` for this record
    pub async fn {{ relation.loader }}(&mut self, pool: &{{ pool }}) -> sqlx::Result<()> {
        self.{{ relation.field }} = sqlx::query_as::<_, {{ relation.related_model }}>({{ relation.lookup_sql|rust_str }})
            .bind(self.{{ relation.column }})
            .fetch_optional(pool)
            .await?
            .map(Box::new);
        Ok(())
    }
{% endfor %}
{% if relations %}

    /// Load every relation of this record, one query per relation
    pub async fn load_relations(&mut self, pool: &{{ pool }}) -> sqlx::Result<()> {
{% for relation in relations %}
        self.{{ relation.loader }}(pool).await?;
{% endfor %}
        Ok(())
    }

    /// Load every relation of `items`, one query per relation for the whole list
    pub async fn eager_load(items: &mut [Self], pool: &{{ pool }}) -> sqlx::Result<()> {
{% for relation in relations %}
        let related: HashMap<i64, {{ relation.related_model }}> =
            sqlx::query_as::<_, {{ relation.related_model }}>({{ relation.eager_sql|rust_str }})
                .fetch_all(pool)
                .await?
                .into_iter()
                .map(|record| (record.id, record))
                .collect();
        for item in items.iter_mut() {
            item.{{ relation.field }} = related.get(&item.{{ relation.column }}).cloned().map(Box::new);
        }
{% endfor %}
        Ok(())
    }
{% endif %}
}
"#;

/// axum handlers
pub const HANDLER_TEMPLATE: &str = r#"//! {{ model_name }} handlers
//!
//! Routes are registered in `crate::routes::{{ handler_module }}`.

use std::collections::HashMap;

use axum::extract::{Form, Path, State};
use axum::response::{Html, Redirect};
use axum_flash::{Flash, IncomingFlashes};
use minijinja::context;

use crate::error::AppResult;
use crate::models::{{ model_module }}::{{ model_name }};
use crate::models::{{ model_module }}::{{ input_name }};
{% for import in option_imports %}
use crate::models::{{ import.module }}::{{ import.model }};
{% endfor %}
use crate::AppState;

/// Flash messages for the page being rendered
fn flash_messages(flashes: &IncomingFlashes) -> Vec<minijinja::Value> {
    flashes
        .iter()
        .map(|(level, text)| context! { level => format!("{level:?}").to_lowercase(), text })
        .collect()
}
{% for op in operations %}
{% set loads = has_relations and op.relation_loading != "none" %}
{% if op.kind == "index" %}

/// List every {{ model_name }}
pub async fn index(
    State(state): State<AppState>,
    flashes: IncomingFlashes,
) -> AppResult<(IncomingFlashes, Html<String>)> {
    let {{ 'mut ' if loads else '' }}items = {{ model_name }}::all(&state.db).await?;
{% if loads and op.relation_loading == "eager" %}
    {{ model_name }}::eager_load(&mut items, &state.db).await?;
{% elif loads %}
    for item in &mut items {
        item.load_relations(&state.db).await?;
    }
{% endif %}
{% include "_option_sources.rs" %}
    let html = state.templates.get_template({{ op.view|rust_str }})?.render(context! {
        items,
{% for source in op.option_sources %}
        {{ source.variable }},
{% endfor %}
        flashes => flash_messages(&flashes),
    })?;
    Ok((flashes, Html(html)))
}
{% elif op.kind == "create" %}

/// Show the {{ model_name }} create form
pub async fn create(
    State(state): State<AppState>,
    flashes: IncomingFlashes,
) -> AppResult<(IncomingFlashes, Html<String>)> {
{% include "_option_sources.rs" %}
    let html = state.templates.get_template({{ op.view|rust_str }})?.render(context! {
{% for source in op.option_sources %}
        {{ source.variable }},
{% endfor %}
        flashes => flash_messages(&flashes),
    })?;
    Ok((flashes, Html(html)))
}
{% elif op.kind == "show" or op.kind == "edit" %}

/// {{ 'Show one' if op.kind == "show" else 'Show the edit form for a' }} {{ model_name }}
pub async fn {{ op.handler }}(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    flashes: IncomingFlashes,
) -> AppResult<(IncomingFlashes, Html<String>)> {
    let {{ 'mut ' if loads else '' }}item = {{ model_name }}::find(&state.db, id).await?;
{% if loads %}
    item.load_relations(&state.db).await?;
{% endif %}
{% include "_option_sources.rs" %}
    let html = state.templates.get_template({{ op.view|rust_str }})?.render(context! {
        item,
{% for source in op.option_sources %}
        {{ source.variable }},
{% endfor %}
        flashes => flash_messages(&flashes),
    })?;
    Ok((flashes, Html(html)))
}
{% elif op.kind == "store" %}

/// Store a new {{ model_name }}
pub async fn store(
    State(state): State<AppState>,
    flash: Flash,
    Form(form): Form<HashMap<String, String>>,
) -> (Flash, Redirect) {
    let result = match {{ input_name }}::try_from_form(&form) {
        Ok(input) => {{ model_name }}::create(&state.db, &input).await.map_err(|err| err.to_string()),
        Err(err) => Err(err),
    };
    match result {
{% include "_outcome.rs" %}
    }
}
{% elif op.kind == "update" %}

/// Update a {{ model_name }}
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    flash: Flash,
    Form(form): Form<HashMap<String, String>>,
) -> (Flash, Redirect) {
    let result = match {{ input_name }}::try_from_form(&form) {
        Ok(input) => {{ model_name }}::update(&state.db, id, &input).await.map_err(|err| err.to_string()),
        Err(err) => Err(err),
    };
    match result {
{% include "_outcome.rs" %}
    }
}
{% elif op.kind == "destroy" %}

/// Delete a {{ model_name }}
pub async fn destroy(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    flash: Flash,
) -> (Flash, Redirect) {
    match {{ model_name }}::delete(&state.db, id).await {
{% include "_outcome.rs" %}
    }
}
{% endif %}
{% endfor %}
"#;

/// Queries filling related-record dropdowns
const OPTION_SOURCES_PARTIAL: &str = r"{% for source in op.option_sources %}
    let {{ source.variable }} = {{ source.related_model }}::all(&state.db).await?;
{% endfor %}
";

/// Success and failure arms of a mutation
const OUTCOME_PARTIAL: &str = r#"        Ok(_) => (
            flash.success({{ op.outcome.success_message|rust_str }}),
            Redirect::to({{ op.outcome.success_redirect|rust_str }}),
        ),
        Err(err) => (
            flash.error(format!("{}{err}", {{ op.outcome.failure_prefix|rust_str }})),
{% if "{id}" in op.outcome.failure_redirect %}
            Redirect::to(&format!({{ op.outcome.failure_redirect|rust_str }})),
{% else %}
            Redirect::to({{ op.outcome.failure_redirect|rust_str }}),
{% endif %}
        ),
"#;

/// axum router
pub const ROUTES_TEMPLATE: &str = r#"//! {{ model_name }} routes
//!
//! | name | method | path |
//! |---|---|---|
{% for route in named_routes %}
//! | `{{ route.name }}` | {{ route.method }} | `{{ route.path }}` |
{% endfor %}

use axum::Router;
{{ routing_use }}

use crate::handlers::{{ handler_module }};
use crate::AppState;

/// Named routes as `(name, method, path)`
pub const NAMED_ROUTES: &[(&str, &str, &str)] = &[
{% for route in named_routes %}
    ({{ route.name|rust_str }}, {{ route.method|rust_str }}, {{ route.path|rust_str }}),
{% endfor %}
];

/// {{ model_name }} routes under `{{ route_prefix }}`
pub fn routes() -> Router<AppState> {
    Router::new()
{% for route in routes %}
        .route({{ route.path|rust_str }}, {{ route.chain }})
{% endfor %}
}
"#;

/// Standard list page
pub const LIST_VIEW_TEMPLATE: &str = r#"{{ tag('extends "' ~ layout ~ '"') }}

{{ tag("block title") }}{{ view.title }} List{{ tag("endblock") }}

{{ tag("block content") }}
<div class="container-fluid">
{% include "_flashes.html" %}
  <div class="row mb-3">
    <div class="col-12">
      <a href="{{ view.route_prefix }}/create" class="btn btn-primary">Add New {{ view.title }}</a>
    </div>
  </div>
  <div class="card">
    <div class="card-header">
      <h3 class="card-title">{{ view.title }} List</h3>
    </div>
    <div class="card-body">
{% include "_table.html" %}
    </div>
  </div>
</div>
{{ tag("endblock") }}
{% include "_scripts.html" %}
"#;

/// Standard create and edit pages
pub const FORM_VIEW_TEMPLATE: &str = r#"{{ tag('extends "' ~ layout ~ '"') }}

{% for form in view.forms %}
{{ tag("block title") }}{{ form.heading }}{{ tag("endblock") }}

{{ tag("block content") }}
<div class="container">
{% include "_flashes.html" %}
  <div class="card">
    <div class="card-header">
      <h3 class="card-title">{{ form.heading }}</h3>
    </div>
    <div class="card-body">
{% include "_form.html" %}
    </div>
  </div>
</div>
{{ tag("endblock") }}
{% endfor %}
{% include "_scripts.html" %}
"#;

/// Standard show page
pub const SHOW_VIEW_TEMPLATE: &str = r#"{{ tag('extends "' ~ layout ~ '"') }}

{{ tag("block title") }}{{ view.title }} Details{{ tag("endblock") }}

{{ tag("block content") }}
<div class="container">
{% include "_flashes.html" %}
  <div class="card">
    <div class="card-header">
      <h3 class="card-title">{{ view.title }} Details</h3>
    </div>
    <div class="card-body">
{% for field in view.fields %}
      <p><strong>{{ field.label }}:</strong> {{ field.display }}</p>
{% endfor %}
      <a href="{{ view.route_prefix }}" class="btn btn-secondary">Back to List</a>
      <a href="{{ view.route_prefix }}/{{ expr("item.id") }}/edit" class="btn btn-primary">Edit</a>
    </div>
  </div>
</div>
{{ tag("endblock") }}
"#;

/// One-page list with inline create and edit dialogs
pub const ONE_PAGE_VIEW_TEMPLATE: &str = r#"{{ tag('extends "' ~ layout ~ '"') }}
{% set create = view.forms[0] %}
{% set edit = view.forms[1] %}

{{ tag("block title") }}{{ view.title }} List{{ tag("endblock") }}

{{ tag("block content") }}
<div class="container-fluid">
{% include "_flashes.html" %}
  <div class="row mb-3">
    <div class="col-12">
      <button type="button" class="btn btn-primary" onclick="document.getElementById('{{ create.dialog_id }}').showModal()">Add New {{ view.title }}</button>
    </div>
  </div>
  <div class="card">
    <div class="card-header">
      <h3 class="card-title">{{ view.title }} List</h3>
    </div>
    <div class="card-body">
{% include "_table.html" %}
    </div>
  </div>
{% set form = create %}
{% include "_dialog.html" %}
</div>
{{ tag("endblock") }}
{% include "_scripts.html" %}
"#;

/// Record table shared by both list pages
const TABLE_PARTIAL: &str = r#"      <table class="table table-bordered data-table">
        <thead>
          <tr>
            <th>#</th>
{% for field in view.fields %}
            <th>{{ field.label }}</th>
{% endfor %}
            <th>Actions</th>
          </tr>
        </thead>
        <tbody>
          {{ tag("for item in items") }}
          <tr>
            <td>{{ expr("loop.index") }}</td>
{% for field in view.fields %}
            <td>{{ field.display }}</td>
{% endfor %}
            <td>
{% if view.one_page %}
              <button type="button" class="btn btn-sm btn-primary" onclick="document.getElementById('{{ edit.dialog_id }}').showModal()">Edit</button>
{% else %}
              <a href="{{ view.route_prefix }}/{{ expr("item.id") }}" class="btn btn-sm btn-info">View</a>
              <a href="{{ view.route_prefix }}/{{ expr("item.id") }}/edit" class="btn btn-sm btn-primary">Edit</a>
{% endif %}
              <button type="button" class="btn btn-sm btn-danger"
                      hx-delete="{{ view.route_prefix }}/{{ expr("item.id") }}"
                      hx-confirm="{{ view.delete_confirmation }}"
                      hx-target="body">Delete</button>
{% if view.one_page %}
{% set form = edit %}
{% include "_dialog.html" %}
{% endif %}
            </td>
          </tr>
          {{ tag("endfor") }}
        </tbody>
      </table>
"#;

/// Flash messages
const FLASHES_PARTIAL: &str = r#"  {{ tag("for flash in flashes") }}
  <div class="alert alert-{{ expr("flash.level") }}" role="alert">{{ expr("flash.text") }}</div>
  {{ tag("endfor") }}
"#;

/// Form body shared by pages and dialogs
const FORM_PARTIAL: &str = r#"<form id="{{ form.id }}" {{ form.htmx_attr }}="{{ form.action }}" hx-target="body"{% if form.confirm %} hx-confirm="{{ form.confirm }}"{% endif %}>
{% for control in form.controls %}
  {{ control|indent(2) }}
{% endfor %}
  <button type="submit" class="btn btn-primary">{{ form.submit_label }}</button>
{% if form.dialog_id %}
  <button type="button" class="btn btn-secondary" onclick="this.closest('dialog').close()">Cancel</button>
{% else %}
  <a href="{{ view.route_prefix }}" class="btn btn-secondary">Cancel</a>
{% endif %}
</form>
"#;

/// Dialog wrapping a form
const DIALOG_PARTIAL: &str = r#"<dialog id="{{ form.dialog_id }}" class="crud-dialog">
  <h5>{{ form.heading }}</h5>
{% include "_form.html" %}
</dialog>
"#;

/// Page scripts: the rich-text editor on pages with a rich-text control, and
/// search-builder filtering with export buttons on list pages
const SCRIPTS_PARTIAL: &str = r#"{% if view.rich_text or view.data_table %}

{{ tag("block scripts") }}
{% if view.data_table %}
<link rel="stylesheet" href="https://cdn.datatables.net/2.0.8/css/dataTables.dataTables.css">
<link rel="stylesheet" href="https://cdn.datatables.net/buttons/3.0.2/css/buttons.dataTables.css">
<link rel="stylesheet" href="https://cdn.datatables.net/searchbuilder/1.7.1/css/searchBuilder.dataTables.css">
<link rel="stylesheet" href="https://cdn.datatables.net/datetime/1.5.2/css/dataTables.dateTime.min.css">
<script src="https://cdn.datatables.net/2.0.8/js/dataTables.js"></script>
<script src="https://cdn.datatables.net/buttons/3.0.2/js/dataTables.buttons.js"></script>
<script src="https://cdn.datatables.net/buttons/3.0.2/js/buttons.dataTables.js"></script>
<script src="https://cdn.datatables.net/searchbuilder/1.7.1/js/dataTables.searchBuilder.js"></script>
<script src="https://cdn.datatables.net/searchbuilder/1.7.1/js/searchBuilder.dataTables.js"></script>
<script src="https://cdn.datatables.net/datetime/1.5.2/js/dataTables.dateTime.min.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/jszip/3.10.1/jszip.min.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/pdfmake/0.2.7/pdfmake.min.js"></script>
<script src="https://cdnjs.cloudflare.com/ajax/libs/pdfmake/0.2.7/vfs_fonts.js"></script>
<script src="https://cdn.datatables.net/buttons/3.0.2/js/buttons.html5.min.js"></script>
<script src="https://cdn.datatables.net/buttons/3.0.2/js/buttons.print.min.js"></script>
<script>
  new DataTable('table.data-table', {
    paging: false,
    scrollY: 465,
    layout: {
      top: { searchBuilder: {} },
      topStart: { buttons: ['copy', 'csv', 'excel', 'pdf', 'print'] }
    }
  });
</script>
{% endif %}
{% if view.rich_text %}
<script src="https://cdn.ckeditor.com/ckeditor5/36.0.1/classic/ckeditor.js"></script>
<script>
  document.querySelectorAll('textarea.rich-text').forEach(function (textarea) {
    ClassicEditor.create(textarea).catch(function (error) { console.error(error); });
  });
</script>
{% endif %}
{{ tag("endblock") }}
{% endif %}
"#;

/// Template names and sources, in registration order
const TEMPLATES: [(&str, &str); 15] = [
    ("migration.sql", MIGRATION_TEMPLATE),
    ("model.rs", MODEL_TEMPLATE),
    ("handler.rs", HANDLER_TEMPLATE),
    ("_option_sources.rs", OPTION_SOURCES_PARTIAL),
    ("_outcome.rs", OUTCOME_PARTIAL),
    ("routes.rs", ROUTES_TEMPLATE),
    ("list.html", LIST_VIEW_TEMPLATE),
    ("form.html", FORM_VIEW_TEMPLATE),
    ("show.html", SHOW_VIEW_TEMPLATE),
    ("one_page.html", ONE_PAGE_VIEW_TEMPLATE),
    ("_table.html", TABLE_PARTIAL),
    ("_flashes.html", FLASHES_PARTIAL),
    ("_form.html", FORM_PARTIAL),
    ("_dialog.html", DIALOG_PARTIAL),
    ("_scripts.html", SCRIPTS_PARTIAL),
];

/// Loaded artifact templates
pub struct TemplateRegistry {
    env: Environment<'static>,
}

impl TemplateRegistry {
    /// Load every embedded template
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to parse.
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_trim_blocks(true);
        env.set_lstrip_blocks(true);
        env.set_keep_trailing_newline(true);

        env.add_function("expr", |body: String| markup::expr(&body));
        env.add_function("tag", |body: String| markup::tag(&body));
        env.add_filter("rust_str", |value: String| format!("{value:?}"));

        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }

        Ok(Self { env })
    }

    /// Render a template by name
    ///
    /// # Errors
    ///
    /// Returns an error if the template is unknown or rendering fails.
    pub fn render<S: Serialize>(&self, name: &str, context: S) -> Result<String> {
        let template = self.env.get_template(name)?;
        Ok(template.render(context)?)
    }
}
