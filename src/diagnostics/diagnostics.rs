use thiserror::Error;

use crate::Location;

/// How bad a diagnostic is. Warnings never make the tree invalid; errors
/// mean the tree contains missing or placeholder nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// The closed set of diagnostic codes the engine can produce. The display
/// strings are short descriptions, not a rendering contract; embedders are
/// expected to map codes to their own message catalog.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagnosticCode {
    #[error("invalid byte sequence for the source encoding")]
    InvalidByte,
    #[error("unrecognized token")]
    UnrecognizedToken,
    #[error("unterminated string literal")]
    UntermString,
    #[error("unterminated regular expression")]
    UntermRegexp,
    #[error("unterminated heredoc")]
    UntermHeredoc,
    #[error("unterminated embedded expression")]
    UntermEmbexpr,
    #[error("could not understand the encoding specified in the magic comment")]
    UnknownEncoding,
    #[error("ambiguity between regexp and division; wrap the regexp in parentheses or add a space after the operator")]
    AmbiguousSlash,
    #[error("unexpected token")]
    UnexpectedToken,
    #[error("expected an expression")]
    ExpectedExpression,
    #[error("expected an identifier")]
    ExpectedIdentifier,
    #[error("expected a parameter name")]
    ExpectedParameter,
    #[error("expected a ')' to close the parenthesized expression")]
    ExpectedParenClose,
    #[error("expected a ']' to close the collection")]
    ExpectedBracketClose,
    #[error("expected a '=>' between the hash key and value")]
    ExpectedHashRocket,
    #[error("expected a '}}' to close the hash literal")]
    ExpectedBraceClose,
    #[error("expected a '}}' to close the embedded expression")]
    ExpectedEmbexprClose,
    #[error("expected an 'end' to close the block")]
    ExpectedEnd,
}

impl DiagnosticCode {
    /// The severity class of the code. Encoding substitution and slash
    /// ambiguity leave a fully usable tree behind, so they are warnings;
    /// everything else marks a malformed region.
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticCode::UnknownEncoding | DiagnosticCode::AmbiguousSlash => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Stable numeric tag for the serialized diagnostics trailer. New codes
    /// get new tags; existing tags never change meaning.
    pub fn tag(self) -> u8 {
        match self {
            DiagnosticCode::InvalidByte => 0,
            DiagnosticCode::UnrecognizedToken => 1,
            DiagnosticCode::UntermString => 2,
            DiagnosticCode::UntermRegexp => 3,
            DiagnosticCode::UntermHeredoc => 4,
            DiagnosticCode::UntermEmbexpr => 5,
            DiagnosticCode::UnknownEncoding => 6,
            DiagnosticCode::AmbiguousSlash => 7,
            DiagnosticCode::UnexpectedToken => 8,
            DiagnosticCode::ExpectedExpression => 9,
            DiagnosticCode::ExpectedIdentifier => 10,
            DiagnosticCode::ExpectedParameter => 11,
            DiagnosticCode::ExpectedParenClose => 12,
            DiagnosticCode::ExpectedBracketClose => 13,
            DiagnosticCode::ExpectedHashRocket => 14,
            DiagnosticCode::ExpectedBraceClose => 15,
            DiagnosticCode::ExpectedEmbexprClose => 16,
            DiagnosticCode::ExpectedEnd => 17,
        }
    }
}

/// A single collected diagnostic: what went wrong, how bad it is, and the
/// byte range it covers. Ordering in the list is order of detection, which
/// approximates but is not guaranteed to equal source order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub location: Location,
}

/// The append-only collector shared by the lexer and the parser.
#[derive(Debug, Default)]
pub struct DiagnosticList {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticList {
    pub fn new() -> Self {
        DiagnosticList {
            diagnostics: vec![],
        }
    }

    pub fn append(&mut self, code: DiagnosticCode, location: Location) {
        self.diagnostics.push(Diagnostic {
            severity: code.severity(),
            code,
            location,
        });
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.diagnostics.iter()
    }

    pub fn len(&self) -> usize {
        self.diagnostics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Number of error-severity records.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Number of warning-severity records.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }
}
