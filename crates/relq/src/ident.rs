//! Safe SQL identifier handling.
//!
//! [`Ident`] represents a SQL identifier (schema/table/column), supporting dotted
//! notation and quoted identifiers.
//!
//! - Unquoted parts are validated against: `[A-Za-z_][A-Za-z0-9_$]*`
//! - Quoted parts allow any characters except NUL and escape `"` as `""`
//! - At render time an unquoted part that collides with a reserved word of the
//!   active dialect is quoted automatically
//!
//! # Example
//! ```ignore
//! use relq::Ident;
//!
//! let t = Ident::parse("public.users")?;
//! let c = Ident::parse(r#""CamelCase"."UserTable""#)?;
//! # Ok::<(), relq::SqlError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};

/// A part of a SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdentPart {
    /// Unquoted identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Unquoted(String),
    /// Quoted identifier: allows any characters except NUL.
    Quoted(String),
}

/// A SQL identifier (column, table, or schema name).
///
/// Supports dotted notation (e.g., `schema.table.column`) and quoted identifiers
/// (e.g., `"CamelCase"."User"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub parts: Vec<IdentPart>,
}

impl Ident {
    /// Create a single-part identifier from an exact name, quoting unconditionally.
    pub fn exact(name: &str) -> SqlResult<Self> {
        if name.is_empty() {
            return Err(SqlError::identifier("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(SqlError::identifier(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Self {
            parts: vec![IdentPart::Quoted(name.to_string())],
        })
    }

    /// Parse an identifier string, supporting dotted and quoted forms.
    ///
    /// - Dotted: `schema.table.column`
    /// - Quoted: `"CamelCase"."UserTable"`
    /// - Mixed: `public."UserTable".id`
    pub fn parse(s: &str) -> SqlResult<Self> {
        if s.is_empty() {
            return Err(SqlError::identifier("Identifier cannot be empty"));
        }
        if s.contains('\0') {
            return Err(SqlError::identifier(
                "Identifier cannot contain NUL character",
            ));
        }

        let mut parts = Vec::new();
        let mut chars = s.chars().peekable();

        while chars.peek().is_some() {
            // Consume '.' between parts (but require there is a next part).
            if !parts.is_empty() {
                match chars.next() {
                    Some('.') => {
                        if chars.peek().is_none() {
                            return Err(SqlError::identifier("Trailing '.' in identifier"));
                        }
                    }
                    Some(c) => {
                        return Err(SqlError::identifier(format!(
                            "Expected '.' between identifier parts, got '{c}'"
                        )));
                    }
                    None => break,
                }
            }

            // Quoted identifier part.
            if chars.peek() == Some(&'"') {
                chars.next(); // opening quote
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('"') => {
                            // Escaped quote: ""
                            if chars.peek() == Some(&'"') {
                                chars.next();
                                name.push('"');
                            } else {
                                break;
                            }
                        }
                        Some(c) => name.push(c),
                        None => return Err(SqlError::identifier("Unclosed quoted identifier")),
                    }
                }
                if name.is_empty() {
                    return Err(SqlError::identifier("Empty quoted identifier"));
                }
                parts.push(IdentPart::Quoted(name));
                continue;
            }

            // Unquoted identifier part.
            let mut name = String::new();
            while let Some(&c) = chars.peek() {
                if c == '.' {
                    break;
                }
                if name.is_empty() {
                    // First char: letter or underscore.
                    if c == '_' || c.is_ascii_alphabetic() {
                        name.push(c);
                        chars.next();
                    } else {
                        return Err(SqlError::identifier(format!(
                            "Invalid identifier start character: '{c}'"
                        )));
                    }
                } else {
                    // Subsequent chars: letter, digit, underscore, or $.
                    if c == '_' || c == '$' || c.is_ascii_alphanumeric() {
                        name.push(c);
                        chars.next();
                    } else {
                        return Err(SqlError::identifier(format!(
                            "Invalid character in identifier: '{c}'"
                        )));
                    }
                }
            }
            if name.is_empty() {
                return Err(SqlError::identifier("Empty identifier segment"));
            }
            parts.push(IdentPart::Unquoted(name));
        }

        if parts.is_empty() {
            return Err(SqlError::identifier("Empty identifier"));
        }

        Ok(Self { parts })
    }

    /// The last (most specific) part as plain text, e.g. the column name of
    /// `schema.table.column`.
    pub fn last_part(&self) -> &str {
        match self.parts.last() {
            Some(IdentPart::Unquoted(s)) | Some(IdentPart::Quoted(s)) => s,
            None => "",
        }
    }

    /// Render the identifier as SQL for the given dialect.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        let mut out = String::new();
        self.write_sql(&mut out, dialect);
        out
    }

    pub(crate) fn write_sql(&self, out: &mut String, dialect: &dyn Dialect) {
        for (i, part) in self.parts.iter().enumerate() {
            if i > 0 {
                out.push('.');
            }
            match part {
                IdentPart::Unquoted(s) => {
                    if dialect.is_reserved(s) {
                        write_quoted(out, s);
                    } else {
                        out.push_str(s);
                    }
                }
                IdentPart::Quoted(s) => write_quoted(out, s),
            }
        }
    }
}

fn write_quoted(out: &mut String, name: &str) {
    out.push('"');
    for ch in name.chars() {
        if ch == '"' {
            out.push('"');
            out.push('"');
        } else {
            out.push(ch);
        }
    }
    out.push('"');
}

/// Convert an input into an [`Ident`].
///
/// This is mainly for ergonomics in builder APIs.
pub trait IntoIdent {
    fn into_ident(self) -> SqlResult<Ident>;
}

impl IntoIdent for Ident {
    fn into_ident(self) -> SqlResult<Ident> {
        Ok(self)
    }
}

impl IntoIdent for &Ident {
    fn into_ident(self) -> SqlResult<Ident> {
        Ok(self.clone())
    }
}

impl IntoIdent for &str {
    fn into_ident(self) -> SqlResult<Ident> {
        Ident::parse(self)
    }
}

impl IntoIdent for String {
    fn into_ident(self) -> SqlResult<Ident> {
        Ident::parse(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::GenericDialect;

    fn sql(s: &str) -> String {
        Ident::parse(s).unwrap().to_sql(&GenericDialect)
    }

    #[test]
    fn ident_simple() {
        assert_eq!(sql("users"), "users");
    }

    #[test]
    fn ident_dotted() {
        assert_eq!(sql("public.users"), "public.users");
    }

    #[test]
    fn ident_three_parts() {
        assert_eq!(sql("schema.table1.col"), "schema.table1.col");
    }

    #[test]
    fn ident_quoted() {
        assert_eq!(sql(r#""CamelCase""#), r#""CamelCase""#);
    }

    #[test]
    fn ident_quoted_with_escape() {
        assert_eq!(sql(r#""has""quote""#), r#""has""quote""#);
    }

    #[test]
    fn ident_mixed_quoted_unquoted() {
        assert_eq!(sql(r#"public."UserTable".id"#), r#"public."UserTable".id"#);
    }

    #[test]
    fn ident_reserved_word_gets_quoted() {
        assert_eq!(sql("order"), r#""order""#);
        assert_eq!(sql("users.select"), r#"users."select""#);
    }

    #[test]
    fn ident_exact_always_quotes() {
        let ident = Ident::exact("weird name").unwrap();
        assert_eq!(ident.to_sql(&GenericDialect), r#""weird name""#);
    }

    #[test]
    fn ident_with_dollar() {
        assert_eq!(sql("my_var$1"), "my_var$1");
    }

    #[test]
    fn ident_rejects_empty() {
        assert!(Ident::parse("").is_err());
    }

    #[test]
    fn ident_rejects_start_digit() {
        assert!(Ident::parse("1table").is_err());
    }

    #[test]
    fn ident_rejects_space() {
        assert!(Ident::parse("my table").is_err());
    }

    #[test]
    fn ident_rejects_double_dot() {
        assert!(Ident::parse("schema..table").is_err());
    }

    #[test]
    fn ident_rejects_trailing_dot() {
        assert!(Ident::parse("schema.").is_err());
    }

    #[test]
    fn ident_rejects_unclosed_quote() {
        assert!(Ident::parse(r#""unclosed"#).is_err());
    }
}
