//! Errors

use std::fmt;

use thiserror::Error;

/// A field of an encoded word, as named in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Charset,
    Encoding,
    Payload,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Field::Charset => "charset",
            Field::Encoding => "encoding",
            Field::Payload => "payload",
        })
    }
}

/// Ways in which a string fails to be an encoded word.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FormatError {
    #[error("expected exactly 4 '?' delimiters, found {found}")]
    DelimiterCount { found: usize },
    #[error("missing '=?' prefix or '?=' suffix")]
    MissingEnvelope,
    #[error("empty {0} field")]
    EmptyField(Field),
    #[error("'?' is not allowed in the {0} field")]
    DelimiterInField(Field),
}

/// Failures of the base64 and charset conversion stages.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConversionError {
    #[error("unknown charset {charset}")]
    UnknownCharset { charset: String },
    #[error("input is not valid {charset}")]
    Malformed { charset: &'static str },
    #[error("text cannot be represented in {charset}")]
    Unmappable { charset: &'static str },
    #[error("encoding into {charset} is not supported")]
    UnsupportedTarget { charset: &'static str },
    #[error("base64 payload has invalid length {length} (not a multiple of 4)")]
    InvalidBase64Length { length: usize },
    #[error("base64 payload is malformed: {0}")]
    InvalidBase64(base64::DecodeError),
    #[error("destination holds {capacity} bytes, {needed} needed")]
    BufferTooSmall { needed: usize, capacity: usize },
}

/// The three mutually exclusive failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    InvalidFormat,
    UnsupportedEncoding,
    Conversion,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
    #[error("invalid encoded word: {0}")]
    InvalidFormat(#[from] FormatError),
    #[error("unsupported encoding {tag:?}, only \"B\" is supported")]
    UnsupportedEncoding { tag: String },
    #[error("conversion failed: {0}")]
    Conversion(#[from] ConversionError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::InvalidFormat(_) => ErrorKind::InvalidFormat,
            Error::UnsupportedEncoding { .. } => ErrorKind::UnsupportedEncoding,
            Error::Conversion(_) => ErrorKind::Conversion,
        }
    }
}
