use std::{error::Error, fmt::Display};

#[derive(Clone, Debug)]
pub struct DbError {
    pub kind: ErrorKind,
    pub message: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// A table or column that does not exist.
    NotFound,
    /// Input that parsed but breaks a schema rule.
    Validation,
    /// Input that could not be parsed into a command.
    Syntax,
    /// An on-disk document that is not valid JSON.
    Corruption,
    Io,
}

impl Error for DbError {}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::NotFound => write!(f, "Not Found"),
            ErrorKind::Validation => write!(f, "Validation Error"),
            ErrorKind::Syntax => write!(f, "Syntax Error"),
            ErrorKind::Corruption => write!(f, "Corrupted Document"),
            ErrorKind::Io => write!(f, "I/O Error"),
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl DbError {
    pub fn new(kind: ErrorKind, message: impl AsRef<str>) -> Self {
        Self {
            kind,
            message: message.as_ref().to_string(),
        }
    }

    pub fn not_found(message: impl AsRef<str>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn validation(message: impl AsRef<str>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    pub fn syntax(message: impl AsRef<str>) -> Self {
        Self::new(ErrorKind::Syntax, message)
    }
}

impl From<std::io::Error> for DbError {
    fn from(e: std::io::Error) -> Self {
        Self::new(ErrorKind::Io, e.to_string())
    }
}

impl From<serde_json::Error> for DbError {
    fn from(e: serde_json::Error) -> Self {
        if e.is_io() {
            Self::new(ErrorKind::Io, e.to_string())
        } else {
            Self::new(ErrorKind::Corruption, e.to_string())
        }
    }
}
