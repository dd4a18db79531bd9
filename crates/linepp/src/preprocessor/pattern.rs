//! Variable reference matching
//!
//! One compiled pattern per bracket style. A reference name is either a plain
//! variable, `env:NAME`, `secret:NAME[PROPERTY]:SOURCE` (selector and source
//! optional) or `profile:NAME[PROPERTY]`.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use super::config::VariableStyle;

/// Property selected from a secret when the reference names none
pub const DEFAULT_SECRET_PROPERTY: &str = "password";

const NAME: &str = r"[A-Za-z0-9_.\-]+";

static ANGLE: LazyLock<ReferencePattern> = LazyLock::new(|| ReferencePattern::new("<", ">"));
static CURLY: LazyLock<ReferencePattern> = LazyLock::new(|| ReferencePattern::new("{", "}"));
static PAREN: LazyLock<ReferencePattern> = LazyLock::new(|| ReferencePattern::new("(", ")"));

impl VariableStyle {
    /// The compiled pattern for this style
    pub fn pattern(self) -> &'static ReferencePattern {
        match self {
            Self::Angle => &*ANGLE,
            Self::Curly => &*CURLY,
            Self::Paren => &*PAREN,
        }
    }
}

/// What a reference resolves against
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reference {
    Local(String),
    Env(String),
    /// `name` includes the property selector, e.g. `db[password]`
    Secret { name: String, source: Option<String> },
    Profile(String),
}

impl Reference {
    /// Classify the captured reference name
    pub fn classify(name: &str) -> Self {
        if let Some(rest) = name.strip_prefix("env:") {
            return Self::Env(rest.to_string());
        }

        if let Some(rest) = name.strip_prefix("secret:") {
            let (ident, source) = match rest.split_once(':') {
                Some((ident, source)) => (ident, Some(source.to_string())),
                None => (rest, None),
            };
            let name = if ident.ends_with(']') {
                ident.to_string()
            } else {
                format!("{ident}[{DEFAULT_SECRET_PROPERTY}]")
            };
            return Self::Secret { name, source };
        }

        if let Some(rest) = name.strip_prefix("profile:") {
            return Self::Profile(rest.to_string());
        }

        Self::Local(name.to_string())
    }
}

/// A reference found in a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceMatch {
    /// Byte span of the whole reference, brackets included
    pub span: Range<usize>,
    /// The text between the brackets
    pub name: String,
}

/// Compiled matcher for one bracket style
#[derive(Debug)]
pub struct ReferencePattern {
    regex: Regex,
}

impl ReferencePattern {
    fn new(open: &str, close: &str) -> Self {
        let pattern = format!(
            r"\${open}(?P<name>secret:{NAME}(?:\[{NAME}\])?(?::{NAME})?|profile:{NAME}(?:\[{NAME}\])?|(?:env:)?{NAME}){close}",
            open = regex::escape(open),
            close = regex::escape(close),
        );
        Self {
            regex: Regex::new(&pattern).unwrap(),
        }
    }

    /// Find the first reference in `text`
    pub fn find(&self, text: &str) -> Option<ReferenceMatch> {
        let caps = self.regex.captures(text)?;
        let whole = caps.get(0)?;
        Some(ReferenceMatch {
            span: whole.range(),
            name: caps["name"].to_string(),
        })
    }
}
