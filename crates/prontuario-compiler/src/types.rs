//! Error taxonomy and configuration shared by the compiler stages.

use std::time::Duration;

use prontuario_types::RecordField;
use thiserror::Error;

use crate::token::TokenKind;

/// A character the lexer could not match against any token kind.
///
/// Lexical errors are diagnostics: they accumulate while lexing continues
/// and never abort a compilation on their own.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid character '{character}' at line {line}")]
pub struct LexicalError {
    /// Source line (1-based) of the offending character.
    pub line: usize,
    /// The character that was skipped.
    pub character: char,
}

/// Errors that abort parsing: the token stream does not form a note.
#[derive(Error, Debug)]
pub enum SyntaxError {
    /// A token of the wrong kind at a grammar position.
    #[error("syntax error at line {line}: expected {expected}, found {found} '{text}'")]
    UnexpectedToken {
        /// The kind the grammar required here.
        expected: TokenKind,
        /// The kind actually found.
        found: TokenKind,
        /// Source text of the offending token.
        text: String,
        /// Source line of the offending token.
        line: usize,
    },

    /// The token stream ran out before the note was complete.
    #[error("syntax error: unexpected end of input, expected {expected}")]
    UnexpectedEnd {
        /// The kind the grammar required next.
        expected: TokenKind,
    },

    /// Tokens remain after a complete note.
    #[error("syntax error at line {line}: unexpected {kind} '{text}' after end of note")]
    TrailingToken {
        /// Kind of the first extra token.
        kind: TokenKind,
        /// Source text of the first extra token.
        text: String,
        /// Source line of the first extra token.
        line: usize,
    },

    /// The medication name is not known to the registry.
    #[error("syntax error at line {line}: medication '{name}' not found in registry")]
    UnknownMedication {
        /// The medication name as written in the note.
        name: String,
        /// Source line of the medication name.
        line: usize,
    },

    /// The registry could not answer the medication lookup.
    #[error("syntax error at line {line}: medication registry unavailable while resolving '{name}': {source}")]
    RegistryUnavailable {
        /// The medication name as written in the note.
        name: String,
        /// Source line of the medication name.
        line: usize,
        /// The underlying registry failure.
        #[source]
        source: RegistryError,
    },
}

impl SyntaxError {
    /// Returns the source line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::UnexpectedToken { line, .. }
            | Self::TrailingToken { line, .. }
            | Self::UnknownMedication { line, .. }
            | Self::RegistryUnavailable { line, .. } => Some(*line),
            Self::UnexpectedEnd { .. } => None,
        }
    }

    /// Returns the offending source text, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::UnexpectedToken { text, .. } | Self::TrailingToken { text, .. } => Some(text),
            Self::UnknownMedication { name, .. } | Self::RegistryUnavailable { name, .. } => {
                Some(name)
            }
            Self::UnexpectedEnd { .. } => None,
        }
    }
}

/// Why a consultation date was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateProblem {
    /// Not a valid `DD/MM/YYYY` calendar date.
    Malformed,
    /// Later than the validation date.
    InFuture,
}

impl std::fmt::Display for DateProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => f.write_str("expected a DD/MM/YYYY calendar date"),
            Self::InFuture => f.write_str("consultation date is in the future"),
        }
    }
}

/// Why a dosage was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DosageProblem {
    /// No numeric amount or no recognized unit.
    Malformed,
    /// Amount below the permitted minimum.
    BelowMinimum,
    /// Amount above the permitted maximum.
    AboveMaximum,
}

impl std::fmt::Display for DosageProblem {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        use prontuario_types::well_known::{DOSAGE_UNIT, MAX_DOSAGE_MG, MIN_DOSAGE_MG};

        match self {
            Self::Malformed => write!(f, "expected a whole amount followed by '{DOSAGE_UNIT}'"),
            Self::BelowMinimum => {
                write!(f, "below permitted minimum of {MIN_DOSAGE_MG}{DOSAGE_UNIT}")
            }
            Self::AboveMaximum => {
                write!(f, "above permitted maximum of {MAX_DOSAGE_MG}{DOSAGE_UNIT}")
            }
        }
    }
}

/// Semantic rule violations found in a parsed record.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The CPF does not have the `ddd.ddd.ddd-dd` shape.
    #[error("invalid CPF '{value}': expected the ddd.ddd.ddd-dd format")]
    InvalidCpf {
        /// The rejected value.
        value: String,
    },

    /// The consultation date is malformed or in the future.
    #[error("invalid date '{value}': {problem}")]
    InvalidDate {
        /// The rejected value.
        value: String,
        /// What is wrong with it.
        problem: DateProblem,
    },

    /// The CID code does not have the `A00` / `A00.0` shape.
    #[error("invalid CID '{value}': expected a letter and two digits, optionally followed by '.' and a digit")]
    InvalidCid {
        /// The rejected value.
        value: String,
    },

    /// A medication sub-field is blank.
    #[error("invalid medication: {field} is empty")]
    InvalidMedication {
        /// Name of the blank sub-field.
        field: &'static str,
    },

    /// The dosage is malformed or out of range.
    #[error("invalid dosage '{value}': {problem}")]
    InvalidDosage {
        /// The rejected value.
        value: String,
        /// What is wrong with it.
        problem: DosageProblem,
    },
}

/// The class of a [`ValidationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValidationKind {
    /// `invalid-cpf`
    Cpf,
    /// `invalid-date`
    Date,
    /// `invalid-cid`
    Cid,
    /// `invalid-medication`
    Medication,
    /// `invalid-dosage`
    Dosage,
}

impl ValidationKind {
    /// Returns the kebab-case tag of this kind.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cpf => "invalid-cpf",
            Self::Date => "invalid-date",
            Self::Cid => "invalid-cid",
            Self::Medication => "invalid-medication",
            Self::Dosage => "invalid-dosage",
        }
    }
}

impl ValidationError {
    /// Returns the class of this violation.
    pub fn kind(&self) -> ValidationKind {
        match self {
            Self::InvalidCpf { .. } => ValidationKind::Cpf,
            Self::InvalidDate { .. } => ValidationKind::Date,
            Self::InvalidCid { .. } => ValidationKind::Cid,
            Self::InvalidMedication { .. } => ValidationKind::Medication,
            Self::InvalidDosage { .. } => ValidationKind::Dosage,
        }
    }

    /// Returns the record field the violation concerns.
    pub fn field(&self) -> RecordField {
        match self {
            Self::InvalidCpf { .. } => RecordField::Cpf,
            Self::InvalidDate { .. } => RecordField::ConsultationDate,
            Self::InvalidCid { .. } => RecordField::Cid,
            Self::InvalidMedication { .. } => RecordField::Medication,
            Self::InvalidDosage { .. } => RecordField::Dosage,
        }
    }
}

/// Failures talking to the medication registry.
#[derive(Error, Debug)]
pub enum RegistryError {
    /// The HTTP client could not be constructed.
    #[error("failed to build registry HTTP client: {0}")]
    Client(String),

    /// The configured base URL cannot carry a request path.
    #[error("invalid registry URL '{url}'")]
    InvalidUrl {
        /// The offending URL.
        url: String,
    },

    /// The request did not reach the registry.
    #[error("registry unavailable at {url}: {message}")]
    Unavailable {
        /// The requested URL.
        url: String,
        /// Transport error description.
        message: String,
    },

    /// The registry did not answer within the configured timeout.
    #[error("registry request to {url} timed out after {timeout_secs}s")]
    Timeout {
        /// The requested URL.
        url: String,
        /// The configured timeout in seconds.
        timeout_secs: u64,
    },

    /// The registry answered with a status other than success or not-found.
    #[error("registry returned unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly empty.
        body: String,
    },

    /// The response body could not be decoded.
    #[error("malformed registry response: {0}")]
    Decode(String),

    /// A non-HTTP registry backend failed.
    #[error("registry backend error: {0}")]
    Backend(String),
}

/// Top-level failure of compiling one note.
#[derive(Error, Debug)]
pub enum CompileError {
    /// Grammar mismatch or unresolved medication.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Semantic rule violation.
    #[error("{source} (line {line})")]
    Validation {
        /// The violated rule.
        #[source]
        source: ValidationError,
        /// Source line of the offending value.
        line: usize,
    },
}

/// The class of a [`CompileError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// See [`SyntaxError`].
    Syntax,
    /// See [`ValidationError`].
    Validation(ValidationKind),
}

impl CompileError {
    /// Returns the class of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Syntax(_) => ErrorKind::Syntax,
            Self::Validation { source, .. } => ErrorKind::Validation(source.kind()),
        }
    }

    /// Returns the source line the error points at, if any.
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Syntax(e) => e.line(),
            Self::Validation { line, .. } => Some(*line),
        }
    }

    /// Returns the offending source text, if any.
    pub fn token(&self) -> Option<&str> {
        match self {
            Self::Syntax(e) => e.token(),
            Self::Validation { source, .. } => match source {
                ValidationError::InvalidCpf { value }
                | ValidationError::InvalidDate { value, .. }
                | ValidationError::InvalidCid { value }
                | ValidationError::InvalidDosage { value, .. } => Some(value),
                ValidationError::InvalidMedication { .. } => None,
            },
        }
    }
}

/// Result type for parsing.
pub type SyntaxResult<T> = Result<T, SyntaxError>;

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result type for a whole compilation.
pub type CompileResult<T> = Result<T, CompileError>;

/// Environment variable holding the registry base URL.
pub const REGISTRY_URL_ENV: &str = "PRONTUARIO_REGISTRY_URL";

/// Environment variable holding the registry timeout in seconds.
pub const REGISTRY_TIMEOUT_ENV: &str = "PRONTUARIO_REGISTRY_TIMEOUT_SECS";

/// Configuration for the HTTP medication registry client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryConfig {
    /// Base URL of the medication directory service.
    pub base_url: String,
    /// Upper bound on each registry request.
    pub timeout: Duration,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(5),
        }
    }
}

impl RegistryConfig {
    /// Creates a config for the given base URL with the default timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    /// Reads the config through `lookup`, keyed by [`REGISTRY_URL_ENV`] and
    /// [`REGISTRY_TIMEOUT_ENV`].
    ///
    /// Returns `None` when no URL is set, meaning no remote registry is
    /// configured. A missing, unparsable or zero timeout falls back to the
    /// default.
    pub fn from_source<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let base_url = lookup(REGISTRY_URL_ENV).filter(|url| !url.trim().is_empty())?;
        let mut config = Self::new(base_url);
        if let Some(secs) = lookup(REGISTRY_TIMEOUT_ENV)
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|&secs| secs > 0)
        {
            config.timeout = Duration::from_secs(secs);
        }
        Some(config)
    }

    /// Returns the timeout in whole seconds.
    pub fn timeout_secs(&self) -> u64 {
        self.timeout.as_secs()
    }
}
