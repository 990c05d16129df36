//! Field type vocabulary and the shared field-type registry
//!
//! Every generator asks this module how a field is stored, how it is edited and
//! how it is displayed. The three answers come from a single static table so the
//! migration, the forms and the read-only views can never disagree about a type.
//!
//! # Supported Field Types
//!
//! | type | column | form control | display |
//! |---|---|---|---|
//! | `short_text` | `VARCHAR(191)` | text input | raw value |
//! | `long_text` | `TEXT` | textarea | raw value |
//! | `rich_text` | `TEXT` | rich-text editor | unescaped markup |
//! | `integer` | `BIGINT` | number input | formatted number |
//! | `money` | `VARCHAR(20)` | number input, step `0.01` | formatted number |
//! | `date` | `DATE` | date picker | raw value |
//! | `datetime` | `TIMESTAMP` | date-time picker | raw value |
//! | `boolean` | `SMALLINT` (0/1) | checkbox with hidden `0` fallback | raw value |
//! | `select` | `VARCHAR(191)` | dropdown with placeholder options | raw value |
//! | `radio` | `VARCHAR(191)` | radio group with placeholder options | raw value |
//! | `foreign` | `BIGINT` + FK to `related_table.id` | dropdown of related records | relation lookup |
//!
//! Unknown type names never fail: they resolve to `short_text`.
//!
//! # Examples
//!
//! ```
//! use crudsmith::scaffold::field_type::{DisplayRendering, FieldType, FormControl};
//!
//! let money = FieldType::from_name("money");
//! assert_eq!(money.mapping().control, FormControl::NumberInput { step: Some("0.01") });
//! assert_eq!(money.mapping().display, DisplayRendering::FormattedNumber);
//!
//! // Unrecognized names degrade to short text
//! assert_eq!(FieldType::from_name("bogus"), FieldType::ShortText);
//! ```

use crate::config::DatabaseBackend;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of field kinds a scaffold can contain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FieldType {
    /// Single-line text
    ShortText,
    /// Multi-line plain text
    LongText,
    /// Multi-line text edited with a rich-text editor and rendered as markup
    RichText,
    /// 64-bit integer
    Integer,
    /// Monetary amount, stored as a short string with two-decimal input
    Money,
    /// Calendar date
    Date,
    /// Date and time
    DateTime,
    /// 0/1 flag
    Boolean,
    /// One value out of a closed option list
    Select,
    /// One value out of a closed option list, shown as radio buttons
    Radio,
    /// Reference to a record of another model
    Foreign,
}

/// Storage column kind of a generated table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ColumnKind {
    /// Auto-incrementing 64-bit primary key
    Identity,
    /// Length-limited string
    BoundedString {
        /// Maximum length in characters
        max_len: u16,
    },
    /// Unbounded string
    Text,
    /// 64-bit integer
    BigInt,
    /// Small integer holding 0 or 1
    SmallInt,
    /// Calendar date
    Date,
    /// Date and time without zone
    Timestamp,
}

/// Form control used to edit a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "control", rename_all = "snake_case")]
pub enum FormControl {
    /// `<input type="text">`
    TextInput,
    /// Plain `<textarea>`
    TextArea,
    /// `<textarea>` upgraded by a rich-text editor script
    RichTextEditor,
    /// `<input type="number">`
    NumberInput {
        /// Optional `step` attribute
        step: Option<&'static str>,
    },
    /// `<input type="date">`
    DatePicker,
    /// `<input type="datetime-local">`
    DateTimePicker,
    /// Checkbox preceded by a hidden `"0"` fallback
    Checkbox,
    /// `<select>` over the placeholder option set
    Dropdown,
    /// Radio group over the placeholder option set
    RadioGroup,
    /// `<select>` over records of the related model
    RelatedDropdown,
}

/// How a field value is shown in lists and detail pages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayRendering {
    /// Escaped value as stored
    Raw,
    /// Unescaped markup
    Markup,
    /// Value passed through the number formatting filter
    FormattedNumber,
    /// Resolve the relation accessor and show its display column
    RelationLookup,
}

/// The three mappings the registry holds for one field type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldMapping {
    /// Storage column kind
    pub column: ColumnKind,
    /// Whether the column carries a referential constraint
    pub references: bool,
    /// Form control kind
    pub control: FormControl,
    /// Display rendering strategy
    pub display: DisplayRendering,
}

const fn mapping(
    column: ColumnKind,
    control: FormControl,
    display: DisplayRendering,
) -> FieldMapping {
    FieldMapping {
        column,
        references: false,
        control,
        display,
    }
}

/// Registry rows, indexed by `FieldType as usize`
static REGISTRY: [FieldMapping; 11] = [
    // short_text
    mapping(
        ColumnKind::BoundedString { max_len: 191 },
        FormControl::TextInput,
        DisplayRendering::Raw,
    ),
    // long_text
    mapping(ColumnKind::Text, FormControl::TextArea, DisplayRendering::Raw),
    // rich_text
    mapping(
        ColumnKind::Text,
        FormControl::RichTextEditor,
        DisplayRendering::Markup,
    ),
    // integer
    mapping(
        ColumnKind::BigInt,
        FormControl::NumberInput { step: None },
        DisplayRendering::FormattedNumber,
    ),
    // money
    mapping(
        ColumnKind::BoundedString { max_len: 20 },
        FormControl::NumberInput { step: Some("0.01") },
        DisplayRendering::FormattedNumber,
    ),
    // date
    mapping(ColumnKind::Date, FormControl::DatePicker, DisplayRendering::Raw),
    // datetime
    mapping(
        ColumnKind::Timestamp,
        FormControl::DateTimePicker,
        DisplayRendering::Raw,
    ),
    // boolean
    mapping(ColumnKind::SmallInt, FormControl::Checkbox, DisplayRendering::Raw),
    // select
    mapping(
        ColumnKind::BoundedString { max_len: 191 },
        FormControl::Dropdown,
        DisplayRendering::Raw,
    ),
    // radio
    mapping(
        ColumnKind::BoundedString { max_len: 191 },
        FormControl::RadioGroup,
        DisplayRendering::Raw,
    ),
    // foreign
    FieldMapping {
        column: ColumnKind::BigInt,
        references: true,
        control: FormControl::RelatedDropdown,
        display: DisplayRendering::RelationLookup,
    },
];

impl FieldType {
    /// Every field type, in registry order
    pub const ALL: [Self; 11] = [
        Self::ShortText,
        Self::LongText,
        Self::RichText,
        Self::Integer,
        Self::Money,
        Self::Date,
        Self::DateTime,
        Self::Boolean,
        Self::Select,
        Self::Radio,
        Self::Foreign,
    ];

    /// Resolve a type name, falling back to [`FieldType::ShortText`]
    ///
    /// Accepts the canonical wire names plus a few common aliases
    /// (`string`, `text`, `bigint`, `bool`, `decimal`, `references`, ...).
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudsmith::scaffold::field_type::FieldType;
    /// assert_eq!(FieldType::from_name("rich_text"), FieldType::RichText);
    /// assert_eq!(FieldType::from_name("references"), FieldType::Foreign);
    /// assert_eq!(FieldType::from_name("no-such-type"), FieldType::ShortText);
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        Self::parse_known(name).unwrap_or_else(|| {
            tracing::warn!(
                field_type = name,
                "unknown field type, falling back to short_text"
            );
            Self::ShortText
        })
    }

    /// Resolve a type name without the fallback
    #[must_use]
    pub fn parse_known(name: &str) -> Option<Self> {
        let field_type = match name.trim().to_lowercase().as_str() {
            "short_text" | "string" | "varchar" => Self::ShortText,
            "long_text" | "text" => Self::LongText,
            "rich_text" | "richtext" | "html" => Self::RichText,
            "integer" | "int" | "bigint" => Self::Integer,
            "money" | "decimal" => Self::Money,
            "date" => Self::Date,
            "datetime" | "timestamp" => Self::DateTime,
            "boolean" | "bool" => Self::Boolean,
            "select" | "enum" => Self::Select,
            "radio" => Self::Radio,
            "foreign" | "references" | "belongs_to" => Self::Foreign,
            _ => return None,
        };
        Some(field_type)
    }

    /// Canonical wire name
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ShortText => "short_text",
            Self::LongText => "long_text",
            Self::RichText => "rich_text",
            Self::Integer => "integer",
            Self::Money => "money",
            Self::Date => "date",
            Self::DateTime => "datetime",
            Self::Boolean => "boolean",
            Self::Select => "select",
            Self::Radio => "radio",
            Self::Foreign => "foreign",
        }
    }

    /// Human-readable description used by `crudsmith types`
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::ShortText => "Short Text",
            Self::LongText => "Long Text",
            Self::RichText => "Rich Text",
            Self::Integer => "Integer Number",
            Self::Money => "Money Number",
            Self::Date => "Date",
            Self::DateTime => "Date & Time",
            Self::Boolean => "Boolean",
            Self::Select => "Select Dropdown",
            Self::Radio => "Radio Group",
            Self::Foreign => "Foreign Key Dropdown",
        }
    }

    /// Registry entry for this type
    #[must_use]
    pub fn mapping(self) -> &'static FieldMapping {
        &REGISTRY[self as usize]
    }
}

impl From<&str> for FieldType {
    fn from(name: &str) -> Self {
        Self::from_name(name)
    }
}

impl From<String> for FieldType {
    fn from(name: String) -> Self {
        Self::from_name(&name)
    }
}

impl From<FieldType> for String {
    fn from(field_type: FieldType) -> Self {
        field_type.as_str().to_string()
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ColumnKind {
    /// SQL column type for the given backend
    #[must_use]
    pub fn sql_type(self, backend: DatabaseBackend) -> String {
        match (self, backend) {
            (Self::Identity, DatabaseBackend::Postgres) => "BIGSERIAL PRIMARY KEY".to_string(),
            (Self::Identity, DatabaseBackend::Sqlite) => {
                "INTEGER PRIMARY KEY AUTOINCREMENT".to_string()
            }
            (Self::BoundedString { max_len }, _) => format!("VARCHAR({max_len})"),
            (Self::Text, _) => "TEXT".to_string(),
            (Self::BigInt, DatabaseBackend::Postgres) => "BIGINT".to_string(),
            (Self::SmallInt, DatabaseBackend::Postgres) => "SMALLINT".to_string(),
            (Self::BigInt | Self::SmallInt, DatabaseBackend::Sqlite) => "INTEGER".to_string(),
            (Self::Date, _) => "DATE".to_string(),
            (Self::Timestamp, _) => "TIMESTAMP".to_string(),
        }
    }

    /// Rust type of the column in the generated model
    #[must_use]
    pub const fn rust_type(self) -> &'static str {
        match self {
            Self::Identity | Self::BigInt => "i64",
            Self::BoundedString { .. } | Self::Text => "String",
            Self::SmallInt => "i16",
            Self::Date => "chrono::NaiveDate",
            Self::Timestamp => "chrono::NaiveDateTime",
        }
    }

    /// Expression converting the raw form value `raw` (an `&str`) into the column type
    ///
    /// Fallible conversions end in `?` and report through the generated
    /// `invalid(column, err)` helper, naming `column`.
    #[must_use]
    pub fn parse_expr(self, raw: &str, column: &str) -> String {
        match self {
            Self::BoundedString { .. } | Self::Text => format!("{raw}.to_string()"),
            Self::Identity | Self::BigInt => {
                format!("{raw}.parse::<i64>().map_err(|err| invalid({column:?}, err))?")
            }
            Self::SmallInt => format!("i16::from({raw} == \"1\")"),
            Self::Date => format!(
                "chrono::NaiveDate::parse_from_str({raw}, \"%Y-%m-%d\").map_err(|err| invalid({column:?}, err))?"
            ),
            Self::Timestamp => format!(
                "chrono::NaiveDateTime::parse_from_str({raw}, \"%Y-%m-%dT%H:%M\").map_err(|err| invalid({column:?}, err))?"
            ),
        }
    }

    /// Whether converting a submitted value can fail
    #[must_use]
    pub const fn parse_is_fallible(self) -> bool {
        matches!(self, Self::Identity | Self::BigInt | Self::Date | Self::Timestamp)
    }
}

impl FormControl {
    /// `type` attribute for `<input>`-based controls
    #[must_use]
    pub const fn input_type(self) -> Option<&'static str> {
        match self {
            Self::TextInput => Some("text"),
            Self::NumberInput { .. } => Some("number"),
            Self::DatePicker => Some("date"),
            Self::DateTimePicker => Some("datetime-local"),
            Self::Checkbox => Some("checkbox"),
            Self::TextArea
            | Self::RichTextEditor
            | Self::Dropdown
            | Self::RadioGroup
            | Self::RelatedDropdown => None,
        }
    }

    /// Whether the control is marked `required` on the client
    ///
    /// A checkbox always submits through its hidden fallback, so it is never required.
    #[must_use]
    pub const fn required(self) -> bool {
        !matches!(self, Self::Checkbox)
    }

    /// Whether the control draws from the placeholder option set
    #[must_use]
    pub const fn uses_placeholder_options(self) -> bool {
        matches!(self, Self::Dropdown | Self::RadioGroup)
    }

    /// Short name for listings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TextInput => "text input",
            Self::TextArea => "textarea",
            Self::RichTextEditor => "rich-text editor",
            Self::NumberInput { .. } => "number input",
            Self::DatePicker => "date picker",
            Self::DateTimePicker => "date-time picker",
            Self::Checkbox => "checkbox",
            Self::Dropdown => "dropdown",
            Self::RadioGroup => "radio group",
            Self::RelatedDropdown => "related dropdown",
        }
    }
}

impl DisplayRendering {
    /// Short name for listings
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Raw => "raw",
            Self::Markup => "markup",
            Self::FormattedNumber => "formatted number",
            Self::RelationLookup => "relation lookup",
        }
    }
}
