//! Common infrastructure shared by the preprocessor and the command-line tool

mod error;

pub use error::{DiagnosticReporter, PreprocessError, PreprocessResult};
