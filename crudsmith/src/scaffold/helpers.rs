//! Naming helpers shared by the generators
//!
//! Every derived identifier (labels, module names, relation accessors, route
//! prefixes) is computed here so the artifacts that reference each other agree
//! on spelling.

use inflector::Inflector;

/// Naming conventions for generated code
pub struct TemplateHelpers;

impl TemplateHelpers {
    /// Convert string to `snake_case`
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudsmith::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_snake_case("ClientContact"), "client_contact");
    /// assert_eq!(TemplateHelpers::to_snake_case("client-contacts"), "client_contacts");
    /// ```
    #[must_use]
    pub fn to_snake_case(input: &str) -> String {
        input.to_snake_case()
    }

    /// Convert string to camelCase
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudsmith::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_camel_case("owner_id"), "ownerId");
    /// ```
    #[must_use]
    pub fn to_camel_case(input: &str) -> String {
        input.to_camel_case()
    }

    /// Pluralized `snake_case` table name for a model
    ///
    /// Used when a foreign field names a related model but no related table.
    #[must_use]
    pub fn to_table_name(model: &str) -> String {
        Self::to_snake_case(model).to_plural()
    }

    /// Human-readable title from a model name
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudsmith::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_title("ExternalLawyer"), "External Lawyer");
    /// ```
    #[must_use]
    pub fn to_title(model: &str) -> String {
        model.to_title_case()
    }

    /// Default field label: split on `_` and upper-case the first letter of each segment
    ///
    /// Segments keep the rest of their spelling, and empty segments are dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudsmith::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_view_name("owner_id"), "Owner Id");
    /// assert_eq!(TemplateHelpers::to_view_name("vatNumber"), "VatNumber");
    /// assert_eq!(TemplateHelpers::to_view_name("due__date"), "Due Date");
    /// ```
    #[must_use]
    pub fn to_view_name(column: &str) -> String {
        column
            .split('_')
            .filter(|segment| !segment.is_empty())
            .map(|segment| {
                let mut chars = segment.chars();
                chars.next().map_or_else(String::new, |first| {
                    first.to_uppercase().chain(chars).collect()
                })
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Relation accessor name for a foreign column
    ///
    /// The column in lower camel case followed by `Relation`. Model descriptors
    /// declare the accessor under this name and views read it back verbatim.
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudsmith::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::relation_accessor("owner_id"), "ownerIdRelation");
    /// assert_eq!(TemplateHelpers::relation_accessor("Category"), "categoryRelation");
    /// ```
    #[must_use]
    pub fn relation_accessor(column: &str) -> String {
        format!("{}Relation", Self::to_camel_case(column))
    }

    /// Rust field name holding a loaded relation in the generated model
    #[must_use]
    pub fn relation_field(column: &str) -> String {
        format!("{}_relation", Self::to_snake_case(column))
    }

    /// Context variable holding the dropdown options of a foreign column
    #[must_use]
    pub fn options_variable(column: &str) -> String {
        format!("{}_options", Self::to_snake_case(column))
    }

    /// Rust module name for a model or entity short name
    #[must_use]
    pub fn to_module_name(name: &str) -> String {
        Self::to_snake_case(name)
    }

    /// URL prefix of an entity
    ///
    /// # Examples
    ///
    /// ```
    /// # use crudsmith::scaffold::helpers::TemplateHelpers;
    /// assert_eq!(TemplateHelpers::to_route_prefix("clients"), "/clients");
    /// ```
    #[must_use]
    pub fn to_route_prefix(short_name: &str) -> String {
        format!("/{}", short_name.trim_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snake_case() {
        assert_eq!(TemplateHelpers::to_snake_case("UserProfile"), "user_profile");
        assert_eq!(TemplateHelpers::to_snake_case("simple"), "simple");
    }

    #[test]
    fn test_view_name() {
        assert_eq!(TemplateHelpers::to_view_name("name"), "Name");
        assert_eq!(TemplateHelpers::to_view_name("owner_id"), "Owner Id");
        assert_eq!(TemplateHelpers::to_view_name("is_active_member"), "Is Active Member");
        assert_eq!(TemplateHelpers::to_view_name("_leading"), "Leading");
    }

    #[test]
    fn test_relation_accessor() {
        assert_eq!(TemplateHelpers::relation_accessor("owner_id"), "ownerIdRelation");
        assert_eq!(TemplateHelpers::relation_accessor("user"), "userRelation");
        assert_eq!(TemplateHelpers::relation_accessor("ownerId"), "ownerIdRelation");
    }

    #[test]
    fn test_relation_field_and_options() {
        assert_eq!(TemplateHelpers::relation_field("owner_id"), "owner_id_relation");
        assert_eq!(TemplateHelpers::options_variable("owner_id"), "owner_id_options");
    }

    #[test]
    fn test_table_name() {
        assert_eq!(TemplateHelpers::to_table_name("User"), "users");
        assert_eq!(TemplateHelpers::to_table_name("Category"), "categories");
    }

    #[test]
    fn test_title() {
        assert_eq!(TemplateHelpers::to_title("Client"), "Client");
        assert_eq!(TemplateHelpers::to_title("UserProfile"), "User Profile");
    }

    #[test]
    fn test_route_prefix() {
        assert_eq!(TemplateHelpers::to_route_prefix("/clients/"), "/clients");
    }
}
