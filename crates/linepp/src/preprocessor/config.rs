//! Processing configuration

use crate::common::{PreprocessError, PreprocessResult};

/// Bracket style of variable references
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VariableStyle {
    /// `$<NAME>`
    #[default]
    Angle,
    /// `${NAME}`
    Curly,
    /// `$(NAME)`
    Paren,
}

/// Line terminator used when draining a whole stream
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    /// `\r\n` on Windows, `\n` elsewhere
    #[default]
    Platform,
    CrLf,
    Lf,
}

impl LineEnding {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Platform if cfg!(windows) => "\r\n",
            Self::Platform | Self::Lf => "\n",
            Self::CrLf => "\r\n",
        }
    }
}

/// Settings read by the preprocessor on every line
#[derive(Debug, Clone)]
pub struct PreprocessorConfig {
    statement_leader: char,
    comment_markers: Vec<String>,
    pub style: VariableStyle,
    /// Emit comment lines as empty lines
    pub strip_comments: bool,
    /// Drop comment lines entirely (wins over `strip_comments`)
    pub remove_comments: bool,
    /// Drop blank and whitespace-only lines
    pub remove_blank: bool,
    pub process_statements: bool,
    /// Expand variables, tabs and indentation on text lines
    pub expand_variables: bool,
    /// Tab stop width; `0` leaves tabs alone
    pub tab_stop: usize,
    /// Spaces prefixed to non-blank text lines
    pub indent: usize,
    /// Substituted for undefined local variables
    pub default_variable: Option<String>,
    /// Substituted for undefined environment variables
    pub default_env_variable: Option<String>,
    pub line_ending: LineEnding,
}

impl Default for PreprocessorConfig {
    fn default() -> Self {
        Self {
            statement_leader: '#',
            comment_markers: vec!["//".to_string()],
            style: VariableStyle::Angle,
            strip_comments: true,
            remove_comments: false,
            remove_blank: false,
            process_statements: true,
            expand_variables: true,
            tab_stop: 0,
            indent: 0,
            default_variable: None,
            default_env_variable: None,
            line_ending: LineEnding::Platform,
        }
    }
}

impl PreprocessorConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configuration for YAML-like text: `@` statements and `#` comments
    pub fn yaml() -> Self {
        Self {
            statement_leader: '@',
            comment_markers: vec!["#".to_string()],
            ..Self::default()
        }
    }

    pub fn statement_leader(&self) -> char {
        self.statement_leader
    }

    pub fn set_statement_leader(&mut self, leader: char) -> PreprocessResult<()> {
        if leader.is_whitespace() || leader.is_control() {
            return Err(PreprocessError::invalid_argument(format!(
                "statement leader {leader:?} must be a visible character"
            )));
        }
        self.statement_leader = leader;
        Ok(())
    }

    pub fn comment_markers(&self) -> &[String] {
        &self.comment_markers
    }

    pub fn add_comment_marker(&mut self, marker: impl Into<String>) -> PreprocessResult<()> {
        let marker = marker.into();
        if marker.is_empty() || marker.chars().any(char::is_whitespace) {
            return Err(PreprocessError::invalid_argument(format!(
                "comment marker {marker:?} must be non-empty and free of whitespace"
            )));
        }
        if !self.comment_markers.contains(&marker) {
            self.comment_markers.push(marker);
        }
        Ok(())
    }

    pub fn clear_comment_markers(&mut self) {
        self.comment_markers.clear();
    }

    /// Whether `line` starts, after leading whitespace, with a comment marker
    pub fn is_comment(&self, line: &str) -> bool {
        let trimmed = line.trim_start();
        self.comment_markers
            .iter()
            .any(|marker| trimmed.starts_with(marker.as_str()))
    }

    /// The statement text following the leader, if `line` is a statement
    pub fn statement_text<'a>(&self, line: &'a str) -> Option<&'a str> {
        let rest = line.trim_start().strip_prefix(self.statement_leader)?;
        (!rest.is_empty()).then(|| rest.trim_end())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = PreprocessorConfig::default();
        assert_eq!(config.statement_leader(), '#');
        assert_eq!(config.comment_markers(), ["//"]);
        assert!(config.strip_comments);
        assert!(!config.remove_comments);
        assert!(config.process_statements);
        assert!(config.expand_variables);
    }

    #[test]
    fn test_comment_detection() {
        let config = PreprocessorConfig::default();
        assert!(config.is_comment("   // note"));
        assert!(config.is_comment("//"));
        assert!(!config.is_comment("x // trailing"));
        assert!(!config.is_comment("/ not"));
    }

    #[test]
    fn test_statement_text() {
        let config = PreprocessorConfig::default();
        assert_eq!(config.statement_text("  #define X=1  "), Some("define X=1"));
        assert_eq!(config.statement_text("#"), None);
        assert_eq!(config.statement_text("text"), None);
        assert_eq!(config.statement_text("# "), Some(""));
    }

    #[test]
    fn test_yaml_mode() {
        let config = PreprocessorConfig::yaml();
        assert!(config.is_comment("  # a yaml comment"));
        assert_eq!(config.statement_text("@if a==a"), Some("if a==a"));
    }

    #[test]
    fn test_invalid_markers_rejected() {
        let mut config = PreprocessorConfig::default();
        assert!(matches!(
            config.add_comment_marker(""),
            Err(PreprocessError::InvalidArgument { .. })
        ));
        assert!(matches!(
            config.add_comment_marker("- -"),
            Err(PreprocessError::InvalidArgument { .. })
        ));
        assert!(config.set_statement_leader(' ').is_err());

        config.add_comment_marker(";").unwrap();
        config.add_comment_marker(";").unwrap();
        assert_eq!(config.comment_markers(), ["//", ";"]);

        config.clear_comment_markers();
        assert!(!config.is_comment("// no longer"));
    }
}
