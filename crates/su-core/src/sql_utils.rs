//! SQL quoting utilities
//!
//! The single place where identifiers and values are turned into SQL text.
//! Everything that ends up in a generated script goes through one of these.

use crate::error::{CoreError, CoreResult};

/// Quote a SQL identifier.
///
/// Wraps the identifier in double quotes and doubles embedded double quotes.
///
/// # Examples
/// ```
/// use su_core::sql_utils::quote_ident;
/// assert_eq!(quote_ident("users"), r#""users""#);
/// assert_eq!(quote_ident(r#"my"table"#), r#""my""table""#);
/// ```
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote a schema and a relation name into `"schema"."name"`.
///
/// # Examples
/// ```
/// use su_core::sql_utils::quote_qualified;
/// assert_eq!(quote_qualified("staging", "orders"), r#""staging"."orders""#);
/// ```
pub fn quote_qualified(schema: &str, name: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(name))
}

/// Quote a dotted name (`a.b.c`) part by part.
pub fn quote_dotted(name: &str) -> String {
    name.split('.').map(quote_ident).collect::<Vec<_>>().join(".")
}

/// Quote a value as a standard SQL string literal.
///
/// # Examples
/// ```
/// use su_core::sql_utils::quote_literal;
/// assert_eq!(quote_literal("O'Brien"), "'O''Brien'");
/// ```
pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

/// Reject text bound for a psql backslash-command line.
///
/// A meta-command ends at the first line break whatever the quoting, so the
/// rest of the value would run as a command of its own.
pub fn ensure_single_line(value: &str) -> CoreResult<()> {
    if value.contains(['\n', '\r']) {
        return Err(CoreError::LineBreakInMetaCommand {
            value: value.to_string(),
        });
    }
    Ok(())
}

/// Quote an argument of a psql backslash command such as `\copy`.
///
/// psql processes backslash escapes inside single-quoted meta-command
/// arguments, so backslashes are doubled as well as quotes. Line breaks are
/// rejected with [`ensure_single_line`].
pub fn quote_psql_arg(value: &str) -> CoreResult<String> {
    ensure_single_line(value)?;
    Ok(format!("'{}'", value.replace('\\', "\\\\").replace('\'', "''")))
}
