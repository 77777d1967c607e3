use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use super::DbError;

/// Declared type of a column. The set is closed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Type {
    Int,
    Str,
    Bool,
}

impl Type {
    pub const ALL: [Type; 3] = [Type::Int, Type::Str, Type::Bool];

    pub fn name(&self) -> &'static str {
        match self {
            Type::Int => "int",
            Type::Str => "str",
            Type::Bool => "bool",
        }
    }
}

impl Display for Type {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Type {
    type Err = DbError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Type::ALL
            .into_iter()
            .find(|typ| typ.name() == s)
            .ok_or_else(|| {
                let supported = Type::ALL
                    .iter()
                    .map(Type::name)
                    .collect::<Vec<_>>()
                    .join(", ");
                DbError::validation(format!(
                    "unsupported type \"{}\", expected one of: {}",
                    s, supported
                ))
            })
    }
}
