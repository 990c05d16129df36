//! Field markup for generated page templates
//!
//! Controls and display values are rendered here, once per field and form
//! scope, and spliced into the page shells. The output is itself a minijinja
//! template of the generated application, so record values are written as
//! `{{ item.<column> }}` expressions rather than literal data.

use std::fmt::Write;

use crate::scaffold::field_type::{DisplayRendering, FormControl};
use crate::scaffold::helpers::TemplateHelpers;
use crate::scaffold::schema::FieldDefinition;

/// Template variable holding the current record in generated pages
pub const RECORD: &str = "item";

/// Loop variable for related records in dropdowns
const RELATED: &str = "related";

/// Output expression `{{ body }}`
#[must_use]
pub fn expr(body: &str) -> String {
    format!("{{{{ {body} }}}}")
}

/// Statement tag `{% body %}`
#[must_use]
pub fn tag(body: &str) -> String {
    format!("{{% {body} %}}")
}

/// Escape text for HTML content and attribute values
#[must_use]
pub fn escape(text: &str) -> String {
    minijinja::HtmlEscape(text).to_string()
}

/// Form a control belongs to
///
/// The scope decides whether values come from the current record and how
/// element ids are made unique on the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormScope {
    /// Standalone create page
    Create,
    /// Standalone edit page
    Edit,
    /// Create dialog on a one-page list
    CreateDialog,
    /// Per-record edit dialog on a one-page list
    EditDialog,
}

impl FormScope {
    /// Record the controls are pre-populated from
    #[must_use]
    pub const fn record(self) -> Option<&'static str> {
        match self {
            Self::Edit | Self::EditDialog => Some(RECORD),
            Self::Create | Self::CreateDialog => None,
        }
    }

    /// Element id of a control
    #[must_use]
    pub fn control_id(self, column: &str) -> String {
        match self {
            Self::Create | Self::Edit => column.to_string(),
            Self::CreateDialog => format!("create-{column}"),
            Self::EditDialog => format!("{column}-{}", expr(&format!("{RECORD}.id"))),
        }
    }
}

/// Form group (label plus control) for one field
#[must_use]
pub fn control(field: &FieldDefinition, scope: FormScope, placeholder_options: &[String]) -> String {
    let mapping = field.mapping();
    let id = scope.control_id(&field.column_name);
    let label = escape(&field.view_name);
    let value = scope
        .record()
        .map(|record| format!("{record}.{}", field.column_name));

    let mut html = String::with_capacity(256);

    if mapping.control == FormControl::Checkbox {
        html.push_str("<div class=\"form-check\">\n");
        // Fallback submits "0" when the box is unchecked; the checkbox overrides it.
        let _ = writeln!(
            html,
            "  <input type=\"hidden\" name=\"{}\" value=\"0\">",
            field.column_name
        );
        html.push_str("  <input type=\"checkbox\" class=\"form-check-input\"");
        write_attr(&mut html, "id", &id);
        write_attr(&mut html, "name", &field.column_name);
        write_attr(&mut html, "value", "1");
        if let Some(value) = &value {
            html.push_str(&tag(&format!("if {value}")));
            html.push_str(" checked");
            html.push_str(&tag("endif"));
        }
        html.push_str(">\n");
        let _ = writeln!(
            html,
            "  <label class=\"form-check-label\" for=\"{id}\">{label}</label>"
        );
        html.push_str("</div>");
        return html;
    }

    html.push_str("<div class=\"form-group\">\n");
    let _ = writeln!(html, "  <label for=\"{id}\">{label}</label>");

    match mapping.control {
        FormControl::TextInput
        | FormControl::NumberInput { .. }
        | FormControl::DatePicker
        | FormControl::DateTimePicker => {
            html.push_str("  <input");
            write_attr(&mut html, "type", mapping.control.input_type().unwrap_or("text"));
            write_attr(&mut html, "id", &id);
            write_attr(&mut html, "name", &field.column_name);
            write_attr(&mut html, "class", "form-control");
            if let FormControl::NumberInput { step: Some(step) } = mapping.control {
                write_attr(&mut html, "step", step);
            }
            if let Some(value) = &value {
                write_attr(&mut html, "value", &expr(value));
            }
            html.push_str(" required>\n");
        }
        FormControl::TextArea | FormControl::RichTextEditor => {
            html.push_str("  <textarea");
            write_attr(&mut html, "id", &id);
            write_attr(&mut html, "name", &field.column_name);
            if mapping.control == FormControl::RichTextEditor {
                write_attr(&mut html, "class", "form-control rich-text");
            } else {
                write_attr(&mut html, "class", "form-control");
            }
            write_attr(&mut html, "rows", "4");
            if mapping.control.required() {
                html.push_str(" required");
            }
            html.push('>');
            if let Some(value) = &value {
                html.push_str(&expr(value));
            }
            html.push_str("</textarea>\n");
        }
        FormControl::Dropdown => {
            html.push_str("  <select");
            write_attr(&mut html, "id", &id);
            write_attr(&mut html, "name", &field.column_name);
            write_attr(&mut html, "class", "form-control");
            html.push_str(" required>\n");
            html.push_str("    <option value=\"\">-- Select --</option>\n");
            for option in placeholder_options {
                let option = escape(option);
                let _ = writeln!(
                    html,
                    "    <option value=\"{option}\"{}>{option}</option>",
                    selected_when(value.as_deref(), &format!("\"{option}\""), "selected")
                );
            }
            html.push_str("  </select>\n");
        }
        FormControl::RadioGroup => {
            for (index, option) in placeholder_options.iter().enumerate() {
                let option = escape(option);
                let option_id = format!("{id}-{}", index + 1);
                html.push_str("  <div class=\"form-check form-check-inline\">\n");
                html.push_str("    <input type=\"radio\" class=\"form-check-input\"");
                write_attr(&mut html, "id", &option_id);
                write_attr(&mut html, "name", &field.column_name);
                write_attr(&mut html, "value", &option);
                html.push_str(" required");
                html.push_str(&selected_when(
                    value.as_deref(),
                    &format!("\"{option}\""),
                    "checked",
                ));
                html.push_str(">\n");
                let _ = writeln!(
                    html,
                    "    <label class=\"form-check-label\" for=\"{option_id}\">{option}</label>"
                );
                html.push_str("  </div>\n");
            }
        }
        FormControl::RelatedDropdown => {
            let options = TemplateHelpers::options_variable(&field.column_name);
            html.push_str("  <select");
            write_attr(&mut html, "id", &id);
            write_attr(&mut html, "name", &field.column_name);
            write_attr(&mut html, "class", "form-control");
            html.push_str(" required>\n");
            html.push_str("    <option value=\"\">-- Select --</option>\n");
            let _ = writeln!(html, "    {}", tag(&format!("for {RELATED} in {options}")));
            let _ = writeln!(
                html,
                "    <option value=\"{}\"{}>{}</option>",
                expr(&format!("{RELATED}.id")),
                selected_when(value.as_deref(), &format!("{RELATED}.id"), "selected"),
                expr(&format!(
                    "{RELATED}.{}",
                    field.display_column_or_default()
                ))
            );
            let _ = writeln!(html, "    {}", tag("endfor"));
            html.push_str("  </select>\n");
        }
        FormControl::Checkbox => {}
    }

    html.push_str("</div>");
    html
}

/// Display value of one field of `record`
#[must_use]
pub fn display(field: &FieldDefinition, record: &str, number_filter: &str) -> String {
    let value = format!("{record}.{}", field.column_name);
    match field.mapping().display {
        DisplayRendering::Raw => expr(&value),
        DisplayRendering::Markup => expr(&format!("{value}|safe")),
        DisplayRendering::FormattedNumber => expr(&format!("{value}|{number_filter}")),
        DisplayRendering::RelationLookup => {
            let accessor = format!(
                "{record}.{}",
                TemplateHelpers::relation_accessor(&field.column_name)
            );
            expr(&format!(
                "{accessor}.{} if {accessor} else \"\"",
                field.display_column_or_default()
            ))
        }
    }
}

/// `{% if value == candidate %} attr{% endif %}`, or nothing without a record
fn selected_when(value: Option<&str>, candidate: &str, attr: &str) -> String {
    value.map_or_else(String::new, |value| {
        format!(
            "{} {attr}{}",
            tag(&format!("if {value} == {candidate}")),
            tag("endif")
        )
    })
}

fn write_attr(html: &mut String, name: &str, value: &str) {
    let _ = write!(html, " {name}=\"{value}\"");
}
