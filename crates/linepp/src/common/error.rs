//! Error types and diagnostic reporting

use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::{Files, SimpleFiles};
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};
use thiserror::Error;

use crate::provider::ProviderError;

/// Preprocessing error, tagged with the line counter value at the point of failure
///
/// Every variant is fatal: once returned, the preprocessor refuses further reads.
#[derive(Error, Debug)]
pub enum PreprocessError {
    #[error("line {line}: malformed statement: {message}")]
    MalformedStatement { message: String, line: usize },

    #[error("line {line}: unknown statement `{statement}`")]
    UnknownStatement { statement: String, line: usize },

    #[error("line {line}: `else` without a matching `if`")]
    ElseWithoutIf { line: usize },

    #[error("line {line}: `endif` without a matching `if`")]
    EndifWithoutIf { line: usize },

    #[error("line {line}: `case` outside of a `switch`")]
    CaseWithoutSwitch { line: usize },

    #[error("line {line}: `default` outside of a `switch`")]
    DefaultWithoutSwitch { line: usize },

    #[error("line {line}: `endswitch` without a matching `switch`")]
    EndswitchWithoutSwitch { line: usize },

    #[error("line {line}: `case` after `default`")]
    CaseAfterDefault { line: usize },

    #[error("line {line}: duplicate `case {value}`")]
    DuplicateCase { value: String, line: usize },

    #[error("line {line}: end of input with {depth} unclosed conditional block(s)")]
    UnclosedConditional { depth: usize, line: usize },

    #[error("line {line}: undefined variable `{name}`")]
    UndefinedVariable { name: String, line: usize },

    #[error("line {line}: cannot resolve `{reference}`: {error}")]
    ProfileResolution {
        reference: String,
        #[source]
        error: ProviderError,
        line: usize,
    },

    #[error("line {line}: more than {limit} variable expansions (recursive definition?)")]
    ExpansionLimitExceeded { limit: usize, line: usize },

    #[error("invalid argument: {message}")]
    InvalidArgument { message: String, line: usize },

    #[error("line {line}: read failed: {error}")]
    Io {
        #[source]
        error: std::io::Error,
        line: usize,
    },

    #[error("line {line}: stream is unusable after an earlier error")]
    StreamFailed { line: usize },
}

impl PreprocessError {
    pub fn malformed(message: impl Into<String>, line: usize) -> Self {
        Self::MalformedStatement {
            message: message.into(),
            line,
        }
    }

    pub fn unknown(statement: impl Into<String>, line: usize) -> Self {
        Self::UnknownStatement {
            statement: statement.into(),
            line,
        }
    }

    pub fn undefined(name: impl Into<String>, line: usize) -> Self {
        Self::UndefinedVariable {
            name: name.into(),
            line,
        }
    }

    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
            line: 0,
        }
    }

    /// The 1-based line the error was raised on, or `None` when it was raised
    /// before any input was read.
    pub fn line(&self) -> Option<usize> {
        let line = match self {
            Self::MalformedStatement { line, .. }
            | Self::UnknownStatement { line, .. }
            | Self::ElseWithoutIf { line }
            | Self::EndifWithoutIf { line }
            | Self::CaseWithoutSwitch { line }
            | Self::DefaultWithoutSwitch { line }
            | Self::EndswitchWithoutSwitch { line }
            | Self::CaseAfterDefault { line }
            | Self::DuplicateCase { line, .. }
            | Self::UnclosedConditional { line, .. }
            | Self::UndefinedVariable { line, .. }
            | Self::ProfileResolution { line, .. }
            | Self::ExpansionLimitExceeded { line, .. }
            | Self::InvalidArgument { line, .. }
            | Self::Io { line, .. }
            | Self::StreamFailed { line } => *line,
        };
        (line > 0).then_some(line)
    }

    /// Short category used as the headline of a rendered diagnostic
    pub fn category(&self) -> &'static str {
        match self {
            Self::MalformedStatement { .. } | Self::UnknownStatement { .. } => "Statement error",
            Self::ElseWithoutIf { .. }
            | Self::EndifWithoutIf { .. }
            | Self::CaseWithoutSwitch { .. }
            | Self::DefaultWithoutSwitch { .. }
            | Self::EndswitchWithoutSwitch { .. }
            | Self::CaseAfterDefault { .. }
            | Self::DuplicateCase { .. }
            | Self::UnclosedConditional { .. } => "Nesting error",
            Self::UndefinedVariable { .. }
            | Self::ProfileResolution { .. }
            | Self::ExpansionLimitExceeded { .. } => "Expansion error",
            Self::InvalidArgument { .. } => "Invalid argument",
            Self::Io { .. } | Self::StreamFailed { .. } => "IO error",
        }
    }
}

pub type PreprocessResult<T> = Result<T, PreprocessError>;

/// Diagnostic reporter for pretty error output
pub struct DiagnosticReporter {
    files: SimpleFiles<String, String>,
    writer: StandardStream,
    config: term::Config,
}

impl DiagnosticReporter {
    pub fn new() -> Self {
        Self {
            files: SimpleFiles::new(),
            writer: StandardStream::stderr(ColorChoice::Auto),
            config: term::Config::default(),
        }
    }

    pub fn add_file(&mut self, name: impl Into<String>, source: impl Into<String>) -> usize {
        self.files.add(name.into(), source.into())
    }

    /// Build the diagnostic for an error, labelling the offending line when it is known
    pub fn diagnostic(&self, file_id: usize, error: &PreprocessError) -> Diagnostic<usize> {
        let diagnostic = Diagnostic::error().with_message(error.category());

        let range = error
            .line()
            .and_then(|line| self.files.line_range(file_id, line - 1).ok());

        match range {
            Some(range) => diagnostic
                .with_labels(vec![Label::primary(file_id, range).with_message(error.to_string())]),
            None => diagnostic.with_notes(vec![error.to_string()]),
        }
    }

    pub fn report_error(&self, file_id: usize, error: &PreprocessError) {
        let diagnostic = self.diagnostic(file_id, error);
        let _ = term::emit(&mut self.writer.lock(), &self.config, &self.files, &diagnostic);
    }
}

impl Default for DiagnosticReporter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_line_is_reported() {
        let err = PreprocessError::undefined("FOO", 3);
        assert_eq!(err.line(), Some(3));
        assert_eq!(err.to_string(), "line 3: undefined variable `FOO`");
    }

    #[test]
    fn test_argument_errors_have_no_line() {
        let err = PreprocessError::invalid_argument("bad name");
        assert_eq!(err.line(), None);
        assert_eq!(err.category(), "Invalid argument");
    }

    #[test]
    fn test_diagnostic_labels_line() {
        let mut reporter = DiagnosticReporter::new();
        let file_id = reporter.add_file("input.txt", "first\n#bogus\nthird\n");
        let err = PreprocessError::unknown("bogus", 2);

        let diagnostic = reporter.diagnostic(file_id, &err);
        assert_eq!(diagnostic.message, "Statement error");
        assert_eq!(diagnostic.labels.len(), 1);
        assert_eq!(diagnostic.labels[0].range, 6..13);
    }

    #[test]
    fn test_diagnostic_without_line_uses_note() {
        let mut reporter = DiagnosticReporter::new();
        let file_id = reporter.add_file("input.txt", "x\n");
        let err = PreprocessError::invalid_argument("bad marker");

        let diagnostic = reporter.diagnostic(file_id, &err);
        assert!(diagnostic.labels.is_empty());
        assert_eq!(diagnostic.notes.len(), 1);
    }
}
