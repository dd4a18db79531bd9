//! Line preprocessor - streaming variable expansion and conditional blocks
//!
//! This library transforms text line by line while it is being read:
//! comments are stripped, `#define`/`#if`/`#switch` statements are evaluated
//! and `$<NAME>` style variable references are expanded.
//!
//! ## Architecture
//!
//! - **Preprocessor** (`preprocessor/`): the line state machine, its statement
//!   grammar, reference patterns and formatting
//! - **Sources** (`source`): the line source contract and adapters
//! - **Providers** (`provider`, `environment`): secret, profile and
//!   environment lookups used during expansion
//! - **Common** (`common/`): errors and diagnostic reporting

pub mod common;
pub mod environment;
pub mod preprocessor;
pub mod provider;
pub mod source;

// Re-exports for convenience
pub use common::{DiagnosticReporter, PreprocessError, PreprocessResult};
pub use environment::{Environment, ProcessEnvironment};
pub use preprocessor::{LineEnding, LinePreprocessor, PreprocessorConfig, VariableStyle, VariableTable};
pub use provider::{MemoryProvider, ProfileProvider, ProviderError};
pub use source::{IterSource, LineSource, ReaderSource, StrSource};
