//! Rust source generation from database schema metadata.
//!
//! Schema metadata is read from a live database by an introspector (see
//! `jetsql-sqlite`) or deserialized from JSON:
//!
//! ```json
//! {"tables": [{"schema": null, "name": "users", "columns": [
//!     {"name": "id", "sql_type": "INTEGER", "primary_key": true},
//!     {"name": "email", "sql_type": "TEXT", "nullable": true}
//! ]}]}
//! ```
//!
//! Each table becomes one module holding a `{Name}Table` struct with a typed
//! [`Column`](crate::table::Column) per column and a
//! [`TableSource`](crate::table::TableSource) implementation.

use std::collections::HashSet;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

/// Every table of a database.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaMeta {
    pub tables: Vec<TableMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableMeta {
    #[serde(default)]
    pub schema: Option<String>,
    pub name: String,
    pub columns: Vec<ColumnMeta>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    /// Declared SQL type as reported by the database, e.g. `VARCHAR(64)`.
    pub sql_type: String,
    #[serde(default)]
    pub nullable: bool,
    #[serde(default)]
    pub primary_key: bool,
}

/// Category a generated column is typed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ColumnKind {
    Bool,
    String,
    Integer,
    Float,
    Blob,
    Date,
    Time,
    Timestamp,
    Interval,
    Array,
}

impl ColumnKind {
    /// Name of the marker type in `jetsql_core::expr::kind`.
    #[must_use]
    pub const fn marker(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::String => "Text",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Blob => "Blob",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Timestamp => "Timestamp",
            Self::Interval => "Interval",
            Self::Array => "Array",
        }
    }

    /// Name of the matching `ExprKind` variant.
    #[must_use]
    pub const fn expr_kind(self) -> &'static str {
        match self {
            Self::Bool => "Bool",
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Blob => "Blob",
            Self::Date => "Date",
            Self::Time => "Time",
            Self::Timestamp => "Timestamp",
            Self::Interval => "Interval",
            Self::Array => "Array",
        }
    }
}

/// Maps a declared SQL type to a column kind.
///
/// The base type name is the first word of the lowercased type, ignoring
/// `unsigned`, so `VARCHAR(64)`, `character varying` and `INT UNSIGNED`
/// resolve through `varchar`, `character` and `int`. Arrays (`integer[]`,
/// `_int4`, `ARRAY`) are recognized first. Unknown types fall back to
/// `String`.
#[must_use]
pub fn column_kind_for(sql_type: &str) -> ColumnKind {
    let t = sql_type.trim().to_ascii_lowercase();
    if t.ends_with("[]") || t.starts_with('_') || t.split_whitespace().any(|w| w == "array") {
        return ColumnKind::Array;
    }
    if t == "tinyint(1)" {
        return ColumnKind::Bool;
    }
    let base = t
        .split(|c: char| !c.is_ascii_alphanumeric())
        .find(|w| !w.is_empty() && *w != "unsigned")
        .unwrap_or_default();
    match base {
        "timestamp" | "timestamptz" | "datetime" | "datetime2" | "smalldatetime"
        | "datetimeoffset" => ColumnKind::Timestamp,
        "interval" => ColumnKind::Interval,
        "date" => ColumnKind::Date,
        "time" | "timetz" => ColumnKind::Time,
        "bool" | "boolean" => ColumnKind::Bool,
        "bit" if t == "bit" => ColumnKind::Bool,
        "int" | "integer" | "tinyint" | "smallint" | "mediumint" | "bigint" | "int2" | "int4"
        | "int8" | "serial" | "smallserial" | "bigserial" | "serial4" | "serial8" | "big" => {
            ColumnKind::Integer
        }
        "real" | "float" | "float4" | "float8" | "double" | "numeric" | "decimal" | "dec"
        | "money" => ColumnKind::Float,
        "blob" | "tinyblob" | "mediumblob" | "longblob" | "bytea" | "binary" | "varbinary" => {
            ColumnKind::Blob
        }
        _ => ColumnKind::String,
    }
}

static RUST_KEYWORDS: LazyLock<HashSet<&'static str>> = LazyLock::new(|| {
    [
        "as", "async", "await", "break", "const", "continue", "crate", "dyn", "else", "enum",
        "extern", "false", "fn", "for", "if", "impl", "in", "let", "loop", "match", "mod", "move",
        "mut", "pub", "ref", "return", "static", "struct", "trait", "true", "type", "unsafe",
        "use", "where", "while", "abstract", "become", "box", "do", "final", "macro", "override",
        "priv", "try", "typeof", "unsized", "virtual", "yield",
    ]
    .into_iter()
    .collect()
});

/// `self`, `super`, `crate` and `Self` cannot be raw identifiers.
const UNRAWABLE: &[&str] = &["self", "Self", "super", "crate"];

/// A valid snake_case Rust identifier for a column or module name.
#[must_use]
pub fn field_name(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for (i, ch) in name.chars().enumerate() {
        if i == 0 && ch.is_ascii_digit() {
            out.push('_');
        }
        if ch.is_ascii_alphanumeric() || ch == '_' {
            out.push(ch.to_ascii_lowercase());
        } else if matches!(ch, '-' | ' ' | '.') {
            out.push('_');
        }
    }
    if out.is_empty() {
        return String::from("_");
    }
    if UNRAWABLE.contains(&out.as_str()) {
        out.push('_');
        out
    } else if RUST_KEYWORDS.contains(out.as_str()) {
        format!("r#{out}")
    } else {
        out
    }
}

/// `user_profiles` -> `UserProfiles`.
#[must_use]
pub fn pascal_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut upper = true;
    for ch in name.chars() {
        if !ch.is_ascii_alphanumeric() {
            upper = true;
        } else if upper {
            out.push(ch.to_ascii_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// Name of the generated struct for `table`.
#[must_use]
pub fn struct_name(table: &TableMeta) -> String {
    format!("{}Table", pascal_case(&table.name))
}

/// File name, without directory, of the module generated for `table`.
#[must_use]
pub fn module_file_name(table: &TableMeta) -> String {
    format!("{}.rs", field_name(&table.name).trim_start_matches("r#"))
}

fn rust_str(s: &str) -> String {
    format!("{s:?}")
}

/// Generates the module for one table.
#[must_use]
pub fn generate_table_module(table: &TableMeta) -> String {
    let name = struct_name(table);
    let qualified = table
        .schema
        .as_ref()
        .map_or_else(|| table.name.clone(), |s| format!("{s}.{}", table.name));
    let fields: Vec<(String, &ColumnMeta, ColumnKind)> = table
        .columns
        .iter()
        .map(|c| (field_name(&c.name), c, column_kind_for(&c.sql_type)))
        .collect();

    let mut out = String::new();
    out.push_str(&format!(
        "//! Table `{qualified}`.\n//!\n//! Generated by jetsql-gen. Do not edit by hand.\n\n"
    ));
    out.push_str("use jetsql_core::expr::kind;\n");
    out.push_str("use jetsql_core::expr::ExprKind;\n");
    out.push_str("use jetsql_core::table::{Column, ColumnList, Table, TableSource};\n\n");

    out.push_str("#[derive(Debug, Clone)]\n");
    out.push_str(&format!("pub struct {name} {{\n"));
    out.push_str("    table: Table,\n");
    for (field, column, kind) in &fields {
        let mut notes = vec![column.sql_type.clone()];
        if column.primary_key {
            notes.push(String::from("primary key"));
        }
        if column.nullable {
            notes.push(String::from("nullable"));
        }
        out.push_str(&format!(
            "    /// `{}` {}\n    pub {field}: Column<kind::{}>,\n",
            column.name,
            notes.join(", "),
            kind.marker()
        ));
    }
    out.push_str("}\n\n");

    out.push_str(&format!("impl {name} {{\n"));
    out.push_str("    const COLUMNS: &[(&str, ExprKind)] = &[\n");
    for (_, column, kind) in &fields {
        out.push_str(&format!(
            "        ({}, ExprKind::{}),\n",
            rust_str(&column.name),
            kind.expr_kind()
        ));
    }
    out.push_str("    ];\n\n");

    let schema = table
        .schema
        .as_ref()
        .map_or_else(|| String::from("None"), |s| format!("Some({})", rust_str(s)));
    out.push_str("    #[must_use]\n    pub fn new() -> Self {\n");
    out.push_str(&format!(
        "        Self::build(Table::new({schema}, {}, Self::COLUMNS))\n    }}\n\n",
        rust_str(&table.name)
    ));
    out.push_str(
        "    /// The table under `alias`, for self joins.\n    #[must_use]\n    \
         pub fn as_(&self, alias: &str) -> Self {\n        \
         Self::build(self.table.as_(alias))\n    }\n\n",
    );
    out.push_str(
        "    #[must_use]\n    pub fn from_schema(&self, schema: &str) -> Self {\n        \
         Self::build(self.table.from_schema(schema))\n    }\n\n",
    );

    let keys: Vec<String> = fields
        .iter()
        .filter(|(_, c, _)| c.primary_key)
        .map(|(f, _, _)| format!("&self.{f}"))
        .collect();
    out.push_str("    /// Every column except the primary key.\n    #[must_use]\n");
    out.push_str("    pub fn mutable_columns(&self) -> ColumnList {\n");
    if keys.is_empty() {
        out.push_str("        self.all_columns()\n");
    } else {
        out.push_str(&format!(
            "        self.all_columns().except(({},))\n",
            keys.join(", ")
        ));
    }
    out.push_str("    }\n\n");

    out.push_str("    fn build(table: Table) -> Self {\n");
    out.push_str("        let owner = table.reference_name().to_owned();\n");
    out.push_str("        Self {\n");
    for (field, column, _) in &fields {
        out.push_str(&format!(
            "            {field}: Column::new(&owner, {}),\n",
            rust_str(&column.name)
        ));
    }
    out.push_str("            table,\n        }\n    }\n}\n\n");

    out.push_str(&format!(
        "impl Default for {name} {{\n    \
         fn default() -> Self {{\n        Self::new()\n    }}\n}}\n\n"
    ));
    out.push_str(&format!(
        "impl TableSource for {name} {{\n    \
         fn table(&self) -> &Table {{\n        &self.table\n    }}\n}}\n"
    ));
    out
}

/// Generates `mod.rs` declaring every table module and re-exporting its
/// struct.
#[must_use]
pub fn generate_mod_file(schema: &SchemaMeta) -> String {
    let mut out = String::from("//! Generated by jetsql-gen. Do not edit by hand.\n\n");
    for table in &schema.tables {
        let module = field_name(&table.name);
        out.push_str(&format!(
            "pub mod {module};\npub use {module}::{};\n",
            struct_name(table)
        ));
    }
    out
}

/// A file produced by [`generate_schema`], relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub file_name: String,
    pub content: String,
}

/// Every table module plus `mod.rs`.
#[must_use]
pub fn generate_schema(schema: &SchemaMeta) -> Vec<GeneratedFile> {
    let mut files: Vec<GeneratedFile> = schema
        .tables
        .iter()
        .map(|t| GeneratedFile {
            file_name: module_file_name(t),
            content: generate_table_module(t),
        })
        .collect();
    files.push(GeneratedFile {
        file_name: String::from("mod.rs"),
        content: generate_mod_file(schema),
    });
    files
}
