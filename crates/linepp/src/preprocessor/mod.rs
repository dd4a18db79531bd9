//! Streaming line preprocessor
//!
//! Wraps a [`LineSource`] and produces processed lines on demand. For every raw
//! line it performs, in order:
//! - comment detection (strip, remove or pass through)
//! - blank-line filtering
//! - statement dispatch (`define`, `if`/`else`/`endif`,
//!   `switch`/`case`/`default`/`endswitch`)
//! - variable expansion, tab expansion and indentation
//!
//! Nothing is buffered beyond the current line. Any error is terminal: the
//! preprocessor refuses further reads once one has been returned.

mod config;
mod frame;
mod pattern;
mod statement;
mod text;
mod variables;

use std::sync::Arc;

use log::{debug, trace};

use crate::common::{PreprocessError, PreprocessResult};
use crate::environment::{Environment, ProcessEnvironment};
use crate::provider::{ProfileProvider, ProviderError};
use crate::source::LineSource;

pub use config::{LineEnding, PreprocessorConfig, VariableStyle};
pub use frame::{ConditionalFrame, FrameKind, FrameStack};
pub use pattern::{DEFAULT_SECRET_PROPERTY, Reference, ReferenceMatch, ReferencePattern};
pub use statement::{Condition, Keyword, Statement};
pub use text::{expand_tabs, indent};
pub use variables::{VariableTable, is_valid_name};

/// Substitutions allowed on a single line before expansion is abandoned
pub const MAX_EXPANSIONS: usize = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    Reading,
    Finished,
    Failed,
}

/// Line preprocessor over a line source
///
/// Not meant for concurrent use; all state is owned and mutated through
/// `&mut self`.
pub struct LinePreprocessor<S> {
    source: S,
    config: PreprocessorConfig,
    variables: VariableTable,
    frames: FrameStack,
    line_number: usize,
    provider: Option<Arc<dyn ProfileProvider>>,
    environment: Box<dyn Environment>,
    state: ReadState,
}

impl<S: LineSource> LinePreprocessor<S> {
    /// Create a preprocessor with the default configuration and no variables
    pub fn new(source: S) -> Self {
        Self::with_variables(source, VariableTable::new())
    }

    /// Create a preprocessor seeded with `variables`
    pub fn with_variables(source: S, variables: VariableTable) -> Self {
        Self {
            source,
            config: PreprocessorConfig::default(),
            variables,
            frames: FrameStack::new(),
            line_number: 0,
            provider: None,
            environment: Box::new(ProcessEnvironment),
            state: ReadState::Reading,
        }
    }

    pub fn with_config(mut self, config: PreprocessorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_provider(mut self, provider: Arc<dyn ProfileProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn with_environment(mut self, environment: impl Environment + 'static) -> Self {
        self.environment = Box::new(environment);
        self
    }

    pub fn config(&self) -> &PreprocessorConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut PreprocessorConfig {
        &mut self.config
    }

    pub fn set_provider(&mut self, provider: Option<Arc<dyn ProfileProvider>>) {
        self.provider = provider;
    }

    /// Set a variable; fails with `InvalidArgument` for an illegal name
    pub fn set(&mut self, name: &str, value: impl ToString) -> PreprocessResult<()> {
        self.variables.set(name, value)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.variables.get(name)
    }

    pub fn variables(&self) -> &VariableTable {
        &self.variables
    }

    /// Number of raw lines pulled from the source so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Number of open `if`/`switch` blocks
    pub fn depth(&self) -> usize {
        self.frames.depth()
    }

    pub fn frames(&self) -> &FrameStack {
        &self.frames
    }

    /// Produce the next processed line, or `None` at end of input
    pub fn next_line(&mut self) -> PreprocessResult<Option<String>> {
        match self.state {
            ReadState::Failed => {
                return Err(PreprocessError::StreamFailed {
                    line: self.line_number,
                });
            }
            ReadState::Finished => return Ok(None),
            ReadState::Reading => {}
        }

        match self.pull_line() {
            Ok(Some(line)) => Ok(Some(line)),
            Ok(None) => {
                self.state = ReadState::Finished;
                Ok(None)
            }
            Err(e) => {
                self.state = ReadState::Failed;
                Err(e)
            }
        }
    }

    /// Drain the stream, terminating every line with the configured line ending
    pub fn read_to_end(&mut self) -> PreprocessResult<String> {
        let ending = self.config.line_ending.as_str();
        let mut out = String::new();
        while let Some(line) = self.next_line()? {
            out.push_str(&line);
            out.push_str(ending);
        }
        Ok(out)
    }

    fn pull_line(&mut self) -> PreprocessResult<Option<String>> {
        loop {
            let raw = self.source.next_line().map_err(|error| PreprocessError::Io {
                error,
                line: self.line_number + 1,
            })?;

            let Some(raw) = raw else {
                let depth = self.frames.depth();
                if depth > 0 {
                    return Err(PreprocessError::UnclosedConditional {
                        depth,
                        line: self.line_number,
                    });
                }
                return Ok(None);
            };
            self.line_number += 1;

            if self.config.is_comment(&raw) {
                if self.config.remove_comments {
                    continue;
                }
                if self.config.strip_comments {
                    return Ok(Some(String::new()));
                }
                return Ok(Some(raw));
            }

            if self.config.remove_blank && raw.trim().is_empty() {
                continue;
            }

            if let Some(text) = self.config.statement_text(&raw) {
                if !self.config.process_statements {
                    return Ok(Some(raw));
                }
                self.process_statement(text)?;
                return Ok(Some(String::new()));
            }

            if !self.frames.output_enabled() {
                return Ok(Some(String::new()));
            }

            return self.format_line(raw).map(Some);
        }
    }

    fn format_line(&self, raw: String) -> PreprocessResult<String> {
        if !self.config.expand_variables {
            return Ok(raw);
        }

        let expanded = self.expand(&raw)?;
        let expanded = expand_tabs(&expanded, self.config.tab_stop);
        Ok(indent(expanded, self.config.indent))
    }

    /// Expand every variable reference in `text`, rescanning after each substitution
    pub fn expand(&self, text: &str) -> PreprocessResult<String> {
        let pattern = self.config.style.pattern();
        let mut text = text.to_string();
        let mut count = 0;

        while let Some(found) = pattern.find(&text) {
            count += 1;
            if count > MAX_EXPANSIONS {
                return Err(PreprocessError::ExpansionLimitExceeded {
                    limit: MAX_EXPANSIONS,
                    line: self.line_number,
                });
            }

            let value = self.resolve(&found.name)?;
            trace!("line {}: expanded `{}`", self.line_number, found.name);
            text.replace_range(found.span, &value);
        }

        Ok(text)
    }

    fn resolve(&self, name: &str) -> PreprocessResult<String> {
        let line = self.line_number;

        match Reference::classify(name) {
            Reference::Local(var) => self
                .variables
                .get(&var)
                .map(str::to_string)
                .or_else(|| self.config.default_variable.clone())
                .ok_or_else(|| PreprocessError::undefined(var, line)),

            Reference::Env(var) => self
                .environment
                .var(&var)
                .or_else(|| self.config.default_env_variable.clone())
                .ok_or_else(|| PreprocessError::undefined(name, line)),

            Reference::Secret { name: secret, source } => self
                .provider()
                .and_then(|p| p.secret_value(&secret, source.as_deref()))
                .map_err(|error| PreprocessError::ProfileResolution {
                    reference: name.to_string(),
                    error,
                    line,
                }),

            Reference::Profile(profile) => self
                .provider()
                .and_then(|p| p.profile_value(&profile))
                .map_err(|error| PreprocessError::ProfileResolution {
                    reference: name.to_string(),
                    error,
                    line,
                }),
        }
    }

    fn provider(&self) -> Result<&dyn ProfileProvider, ProviderError> {
        self.provider.as_deref().ok_or(ProviderError::NotAvailable)
    }

    fn process_statement(&mut self, text: &str) -> PreprocessResult<()> {
        let line = self.line_number;
        let statement = Statement::parse(text, line)?;
        let enabled = self.frames.output_enabled();
        debug!("line {line}: {statement:?} (output {enabled})");

        match statement {
            Statement::Define { name, value } => {
                if enabled {
                    self.variables.set(name, value)?;
                }
            }

            Statement::If(expr) => {
                let condition = if enabled {
                    let expr = self.expand(expr)?;
                    Condition::parse(&expr, line)?.evaluate(&self.variables)
                } else {
                    Condition::parse(expr, line)?;
                    false
                };
                self.frames.push_if(condition);
                debug!("line {line}: push if ({condition}), depth {}", self.frames.depth());
            }

            Statement::Else => {
                let frame = self.frames.current_mut();
                if frame.kind != FrameKind::If {
                    return Err(PreprocessError::ElseWithoutIf { line });
                }
                frame.output_enabled = frame.parent_enabled && !frame.output_enabled;
            }

            Statement::Endif => {
                if self.frames.current().kind != FrameKind::If {
                    return Err(PreprocessError::EndifWithoutIf { line });
                }
                self.frames.pop();
                debug!("line {line}: pop if, depth {}", self.frames.depth());
            }

            Statement::Switch(value) => {
                let value = if enabled {
                    self.expand(value)?.trim().to_string()
                } else {
                    value.to_string()
                };
                self.frames.push_switch(value);
                debug!("line {line}: push switch, depth {}", self.frames.depth());
            }

            Statement::Case(value) => {
                let frame = self.frames.current();
                if frame.kind != FrameKind::Switch {
                    return Err(PreprocessError::CaseWithoutSwitch { line });
                }
                if frame.switch_default_seen {
                    return Err(PreprocessError::CaseAfterDefault { line });
                }
                if !frame.parent_enabled {
                    return Ok(());
                }

                let value = self.expand(value)?.trim().to_string();
                let frame = self.frames.current_mut();
                if frame.switch_value.as_deref() == Some(value.as_str()) {
                    if frame.switch_matched {
                        return Err(PreprocessError::DuplicateCase { value, line });
                    }
                    frame.output_enabled = true;
                    frame.switch_matched = true;
                } else {
                    frame.output_enabled = false;
                }
            }

            Statement::Default => {
                let frame = self.frames.current_mut();
                if frame.kind != FrameKind::Switch {
                    return Err(PreprocessError::DefaultWithoutSwitch { line });
                }
                if frame.switch_matched {
                    frame.output_enabled = false;
                } else {
                    frame.output_enabled = frame.parent_enabled;
                    frame.switch_default_seen = true;
                }
            }

            Statement::Endswitch => {
                if self.frames.current().kind != FrameKind::Switch {
                    return Err(PreprocessError::EndswitchWithoutSwitch { line });
                }
                self.frames.pop();
                debug!("line {line}: pop switch, depth {}", self.frames.depth());
            }
        }

        Ok(())
    }
}

impl<S: LineSource> Iterator for LinePreprocessor<S> {
    type Item = PreprocessResult<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ReadState::Failed {
            return None;
        }
        self.next_line().transpose()
    }
}
