//! Token definitions for medical notes.
//!
//! The eight token kinds are defined with the logos derive macro. Keywords
//! and field tags are fixed literals; the only open-ended kind is the
//! double-quoted string literal carrying every field value.
use std::fmt;
use std::ops::Range;

use logos::Logos;
use prontuario_types::well_known;

/// All token kinds a note can contain.
///
/// Spaces, tabs and line breaks are skipped by the lexer and never produce a
/// token. Anything else that matches no kind is a lexical error.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[logos(skip r"[ \t\r\n]+")]
pub enum TokenKind {
    /// `PACIENTE`
    #[token("PACIENTE")]
    Patient,

    /// `CPF:`
    #[token("CPF:")]
    Cpf,

    /// `MEDICAMENTO`
    #[token("MEDICAMENTO")]
    Medication,

    /// `DOSAGEM:`
    #[token("DOSAGEM:")]
    Dosage,

    /// `CONSULTA`
    #[token("CONSULTA")]
    Consultation,

    /// `DATA:`
    #[token("DATA:")]
    Date,

    /// `CID:`
    #[token("CID:")]
    Cid,

    /// A non-empty double-quoted value. Values never span lines.
    #[regex(r#""[^"\n]+""#)]
    StringLiteral,
}

impl TokenKind {
    /// Every kind, in lexer priority order.
    pub const ALL: [TokenKind; 8] = [
        Self::Patient,
        Self::Cpf,
        Self::Medication,
        Self::Dosage,
        Self::Consultation,
        Self::Date,
        Self::Cid,
        Self::StringLiteral,
    ];

    /// Returns the fixed literal of a keyword or tag kind.
    ///
    /// Returns `None` for string literals, whose text varies.
    pub fn literal(self) -> Option<&'static str> {
        match self {
            Self::Patient => Some(well_known::PATIENT_KEYWORD),
            Self::Cpf => Some(well_known::CPF_TAG),
            Self::Medication => Some(well_known::MEDICATION_KEYWORD),
            Self::Dosage => Some(well_known::DOSAGE_TAG),
            Self::Consultation => Some(well_known::CONSULTATION_KEYWORD),
            Self::Date => Some(well_known::DATE_TAG),
            Self::Cid => Some(well_known::CID_TAG),
            Self::StringLiteral => None,
        }
    }

    /// Check if this kind is a field tag (`CPF:`, `DATA:`, `CID:`, `DOSAGEM:`)
    pub fn is_field_tag(self) -> bool {
        matches!(self, Self::Cpf | Self::Date | Self::Cid | Self::Dosage)
    }

    /// Check if this kind is a sentence keyword
    pub fn is_keyword(self) -> bool {
        matches!(self, Self::Patient | Self::Consultation | Self::Medication)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.literal() {
            Some(literal) if self.is_keyword() => write!(f, "keyword {literal}"),
            Some(literal) => write!(f, "field tag {literal}"),
            None => f.write_str("string literal"),
        }
    }
}

/// A token borrowed from the source text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'src> {
    /// What kind of token this is.
    pub kind: TokenKind,
    /// The exact matched source text.
    pub text: &'src str,
    /// Source line (1-based).
    pub line: usize,
    /// Byte range in the source.
    pub span: Range<usize>,
}

impl<'src> Token<'src> {
    /// Returns the text between the quotes of a string literal.
    ///
    /// Other kinds are returned unchanged.
    pub fn unquoted(&self) -> &'src str {
        match self.kind {
            TokenKind::StringLiteral => self
                .text
                .strip_prefix('"')
                .and_then(|s| s.strip_suffix('"'))
                .unwrap_or(self.text),
            _ => self.text,
        }
    }
}
