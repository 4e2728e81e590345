//! Derive macro for typed jetsql table definitions.
//!
//! `#[derive(Table)]` on a record struct generates a companion table value
//! with one typed column per field, and implements `jetsql_core::Model` for
//! the struct so its values can be inserted directly.

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{
    parse_macro_input, Attribute, Data, DeriveInput, Fields, GenericArgument, Ident, LitStr, Meta,
    PathArguments, Type,
};

/// Derives a typed table for a struct.
///
/// # Attributes
///
/// - `#[table(name = "users")]` - SQL table name (defaults to the snake_case
///   struct name)
/// - `#[table(schema = "app")]` - schema the table lives in
///
/// # Field Attributes
///
/// - `#[column(primary_key)]` - excluded from `mutable_columns()`
/// - `#[column(name = "column_name")]` - SQL column name (defaults to the
///   field name)
/// - `#[column(kind = "Timestamp")]` - column kind marker, when it cannot be
///   inferred from the field type
/// - `#[column(skip)]` - the field is not a column
///
/// # Generated Items
///
/// For a struct `User`, this macro generates:
///
/// - `UserTable` with a public `Column<K>` field per column, the
///   constructors `new`, `as_` and `from_schema`, `mutable_columns` and an
///   implementation of `TableSource`
/// - `impl Model for User`
/// - `User::table()`
#[proc_macro_derive(Table, attributes(table, column))]
pub fn derive_table(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    derive_table_impl(&input)
        .unwrap_or_else(|e| e.to_compile_error())
        .into()
}

fn derive_table_impl(input: &DeriveInput) -> syn::Result<TokenStream2> {
    let struct_name = &input.ident;
    let table_attrs = parse_table_attrs(&input.attrs, struct_name)?;

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(fields) => &fields.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    input,
                    "Table derive only supports structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                input,
                "Table derive only supports structs",
            ));
        }
    };

    let mut columns: Vec<ColumnInfo> = Vec::new();
    for field in fields {
        let Some(field_name) = field.ident.clone() else {
            continue;
        };
        let attrs = parse_column_attrs(&field.attrs)?;
        if attrs.skip {
            continue;
        }
        let kind = match attrs.kind {
            Some(kind) => format_ident!("{}", kind.value(), span = kind.span()),
            None => infer_kind(&field.ty).ok_or_else(|| {
                syn::Error::new_spanned(
                    &field.ty,
                    "cannot infer the column kind of this type; add #[column(kind = \"...\")]",
                )
            })?,
        };
        columns.push(ColumnInfo {
            column_name: attrs
                .name
                .unwrap_or_else(|| field_name.to_string().trim_start_matches("r#").to_owned()),
            field_name,
            kind,
            primary_key: attrs.primary_key,
        });
    }

    let table_struct_name = format_ident!("{}Table", struct_name);
    let table_name = &table_attrs.name;
    let schema = match &table_attrs.schema {
        Some(schema) => quote! { ::core::option::Option::Some(#schema) },
        None => quote! { ::core::option::Option::None },
    };

    let column_fields: Vec<TokenStream2> = columns
        .iter()
        .map(|c| {
            let field = &c.field_name;
            let kind = &c.kind;
            let doc = format!("Column `{}`.", c.column_name);
            quote! {
                #[doc = #doc]
                pub #field: ::jetsql_core::table::Column<::jetsql_core::expr::kind::#kind>
            }
        })
        .collect();

    let column_entries: Vec<TokenStream2> = columns
        .iter()
        .map(|c| {
            let name = &c.column_name;
            let kind = &c.kind;
            quote! {
                (#name, <::jetsql_core::expr::kind::#kind as ::jetsql_core::expr::kind::Kind>::KIND)
            }
        })
        .collect();

    let column_inits: Vec<TokenStream2> = columns
        .iter()
        .map(|c| {
            let field = &c.field_name;
            let name = &c.column_name;
            quote! { #field: ::jetsql_core::table::Column::new(&owner, #name) }
        })
        .collect();

    let keys: Vec<&Ident> = columns
        .iter()
        .filter(|c| c.primary_key)
        .map(|c| &c.field_name)
        .collect();
    let mutable = if keys.is_empty() {
        quote! { ::jetsql_core::table::TableSource::all_columns(self) }
    } else {
        quote! { ::jetsql_core::table::TableSource::all_columns(self).except((#(&self.#keys,)*)) }
    };

    let field_values: Vec<TokenStream2> = columns
        .iter()
        .map(|c| {
            let field = &c.field_name;
            let name = &c.column_name;
            quote! {
                #name => ::core::result::Result::Ok(::core::option::Option::Some(
                    ::jetsql_core::ToSqlValue::to_sql_value(
                        ::core::clone::Clone::clone(&self.#field),
                    ),
                ))
            }
        })
        .collect();

    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let table_doc = format!("Typed table for [`{struct_name}`].");

    Ok(quote! {
        #[doc = #table_doc]
        #[derive(Debug, Clone)]
        pub struct #table_struct_name {
            table: ::jetsql_core::table::Table,
            #(#column_fields,)*
        }

        impl #table_struct_name {
            const COLUMNS: &[(&str, ::jetsql_core::expr::ExprKind)] = &[#(#column_entries),*];

            #[must_use]
            pub fn new() -> Self {
                Self::build(::jetsql_core::table::Table::new(#schema, #table_name, Self::COLUMNS))
            }

            /// The table under `alias`; every column is re-qualified.
            #[must_use]
            pub fn as_(&self, alias: &str) -> Self {
                Self::build(self.table.as_(alias))
            }

            #[must_use]
            pub fn from_schema(&self, schema: &str) -> Self {
                Self::build(self.table.from_schema(schema))
            }

            /// Every column except the primary key.
            #[must_use]
            pub fn mutable_columns(&self) -> ::jetsql_core::table::ColumnList {
                #mutable
            }

            fn build(table: ::jetsql_core::table::Table) -> Self {
                let owner = ::std::string::String::from(table.reference_name());
                Self {
                    #(#column_inits,)*
                    table,
                }
            }
        }

        impl ::core::default::Default for #table_struct_name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl ::jetsql_core::table::TableSource for #table_struct_name {
            fn table(&self) -> &::jetsql_core::table::Table {
                &self.table
            }
        }

        impl #impl_generics ::jetsql_core::Model for #struct_name #ty_generics #where_clause {
            fn field_value(
                &self,
                column: &str,
            ) -> ::jetsql_core::Result<::core::option::Option<::jetsql_core::SqlValue>> {
                match column {
                    #(#field_values,)*
                    _ => ::core::result::Result::Ok(::core::option::Option::None),
                }
            }
        }

        impl #impl_generics #struct_name #ty_generics #where_clause {
            /// The typed table this record belongs to.
            #[must_use]
            pub fn table() -> #table_struct_name {
                #table_struct_name::new()
            }
        }
    })
}

struct ColumnInfo {
    field_name: Ident,
    column_name: String,
    kind: Ident,
    primary_key: bool,
}

struct TableAttrs {
    name: String,
    schema: Option<String>,
}

#[derive(Default)]
struct ColumnAttrs {
    name: Option<String>,
    kind: Option<LitStr>,
    primary_key: bool,
    skip: bool,
}

fn parse_table_attrs(attrs: &[Attribute], struct_name: &Ident) -> syn::Result<TableAttrs> {
    let mut result = TableAttrs {
        name: to_snake_case(&struct_name.to_string()),
        schema: None,
    };
    for attr in attrs {
        if !attr.path().is_ident("table") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                result.name = meta.value()?.parse::<LitStr>()?.value();
            } else if meta.path.is_ident("schema") {
                result.schema = Some(meta.value()?.parse::<LitStr>()?.value());
            } else {
                return Err(meta.error("expected `name` or `schema`"));
            }
            Ok(())
        })?;
    }
    Ok(result)
}

fn parse_column_attrs(attrs: &[Attribute]) -> syn::Result<ColumnAttrs> {
    let mut result = ColumnAttrs::default();
    for attr in attrs {
        if !attr.path().is_ident("column") || matches!(attr.meta, Meta::Path(_)) {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("primary_key") {
                result.primary_key = true;
            } else if meta.path.is_ident("skip") {
                result.skip = true;
            } else if meta.path.is_ident("name") {
                result.name = Some(meta.value()?.parse::<LitStr>()?.value());
            } else if meta.path.is_ident("kind") {
                result.kind = Some(meta.value()?.parse::<LitStr>()?);
            } else {
                return Err(meta.error("expected `primary_key`, `skip`, `name` or `kind`"));
            }
            Ok(())
        })?;
    }
    Ok(result)
}

/// Kind marker for a field type; `Option<T>` is looked through.
fn infer_kind(ty: &Type) -> Option<Ident> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    let ident = segment.ident.to_string();
    let kind = match ident.as_str() {
        "Option" => return infer_kind(first_type_argument(&segment.arguments)?),
        "Vec" => match first_type_argument(&segment.arguments)? {
            Type::Path(inner) if inner.path.is_ident("u8") => "Blob",
            _ => "Array",
        },
        "bool" => "Bool",
        "i8" | "i16" | "i32" | "i64" | "u8" | "u16" | "u32" => "Integer",
        "f32" | "f64" => "Float",
        "String" => "Text",
        "NaiveDate" => "Date",
        "NaiveTime" => "Time",
        "NaiveDateTime" | "DateTime" => "Timestamp",
        _ => return None,
    };
    Some(format_ident!("{}", kind))
}

fn first_type_argument(arguments: &PathArguments) -> Option<&Type> {
    let PathArguments::AngleBracketed(args) = arguments else {
        return None;
    };
    args.args.iter().find_map(|arg| match arg {
        GenericArgument::Type(ty) => Some(ty),
        _ => None,
    })
}

fn to_snake_case(s: &str) -> String {
    let mut result = String::new();
    for (i, c) in s.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                result.push('_');
            }
            result.push(c.to_ascii_lowercase());
        } else {
            result.push(c);
        }
    }
    result
}
