use std::fmt::Display;

use enum_as_inner::EnumAsInner;
use serde::{Deserialize, Serialize};

use super::{DbError, Type};

/// A single stored field value.
///
/// Serialized as the bare JSON scalar, so a record on disk reads as
/// `{"ID": 1, "name": "Sergei", "active": true}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, EnumAsInner, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Datum {
    Int(i64),
    Str(String),
    Bool(bool),
}

/// The string form is what equality filters compare against.
impl Display for Datum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Datum::Int(v) => write!(f, "{}", v),
            Datum::Str(v) => write!(f, "{}", v),
            Datum::Bool(v) => write!(f, "{}", v),
        }
    }
}

impl From<i64> for Datum {
    fn from(v: i64) -> Self {
        Datum::Int(v)
    }
}

impl From<&str> for Datum {
    fn from(v: &str) -> Self {
        Datum::Str(v.to_string())
    }
}

impl From<bool> for Datum {
    fn from(v: bool) -> Self {
        Datum::Bool(v)
    }
}

impl Datum {
    pub fn typ(&self) -> Type {
        match self {
            Datum::Int(_) => Type::Int,
            Datum::Str(_) => Type::Str,
            Datum::Bool(_) => Type::Bool,
        }
    }

    /// Build a datum of type `typ` from raw user text.
    ///
    /// Only integers can fail. Booleans are lenient: anything other than a
    /// case-insensitive `true` is `false`.
    pub fn coerce(raw: &str, typ: Type) -> Result<Self, DbError> {
        let text = strip_quotes(raw.trim());
        match typ {
            Type::Int => text.trim().parse().map(Datum::Int).map_err(|_| {
                DbError::validation(format!("\"{}\" is not a valid int", raw))
            }),
            Type::Str => Ok(Datum::Str(text.to_string())),
            Type::Bool => Ok(Datum::Bool(text.eq_ignore_ascii_case("true"))),
        }
    }

    /// Compare by string form, so `Int(1)` matches the text `"1"`.
    pub fn matches_text(&self, text: &str) -> bool {
        match self {
            Datum::Str(v) => v == text,
            other => other.to_string() == text,
        }
    }
}

/// Remove one layer of matching single or double quotes.
pub fn strip_quotes(text: &str) -> &str {
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            return &text[1..text.len() - 1];
        }
    }
    text
}
