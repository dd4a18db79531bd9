//! Statement grammar
//!
//! The keyword is lexed with logos; arguments are matched with regexes:
//!
//! ```text
//! define NAME[=VALUE]
//! if (A==B | A!=B | defined(NAME) | undefined(NAME))
//! else
//! endif
//! switch VALUE
//! case VALUE
//! default
//! endswitch
//! ```

use std::fmt;
use std::sync::LazyLock;

use logos::Logos;
use regex::Regex;

use super::variables::VariableTable;
use crate::common::{PreprocessError, PreprocessResult};

static DEFINE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([A-Za-z0-9_.\-]+)\s*(?:=(.*))?$").unwrap());

static DEFINED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(defined|undefined)\(\s*([A-Za-z0-9_.\-]+)\s*\)$").unwrap()
});

static COMPARE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)(==|!=)(.*)$").unwrap());

/// Statement keywords
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t]+")]
pub enum Keyword {
    #[token("define")]
    Define,
    #[token("if")]
    If,
    #[token("else")]
    Else,
    #[token("endif")]
    Endif,
    #[token("switch")]
    Switch,
    #[token("case")]
    Case,
    #[token("default")]
    Default,
    #[token("endswitch")]
    Endswitch,

    /// Any other word; never a valid statement
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,
}

impl fmt::Display for Keyword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Define => "define",
            Self::If => "if",
            Self::Else => "else",
            Self::Endif => "endif",
            Self::Switch => "switch",
            Self::Case => "case",
            Self::Default => "default",
            Self::Endswitch => "endswitch",
            Self::Word => "<word>",
        };
        write!(f, "{s}")
    }
}

/// A parsed statement; expression and value arguments are still unexpanded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement<'a> {
    Define { name: &'a str, value: &'a str },
    If(&'a str),
    Else,
    Endif,
    Switch(&'a str),
    Case(&'a str),
    Default,
    Endswitch,
}

impl<'a> Statement<'a> {
    /// Parse the text following the statement leader
    pub fn parse(text: &'a str, line: usize) -> PreprocessResult<Self> {
        let mut lexer = Keyword::lexer(text);

        let keyword = match lexer.next() {
            Some(Ok(keyword)) if keyword != Keyword::Word => keyword,
            _ => return Err(PreprocessError::unknown(text.trim(), line)),
        };

        let rest = lexer.remainder();
        if !rest.is_empty() && !rest.starts_with(char::is_whitespace) {
            return Err(PreprocessError::unknown(text.trim(), line));
        }
        let args = rest.trim();

        match keyword {
            Keyword::Define => {
                let caps = DEFINE_RE.captures(args).ok_or_else(|| {
                    PreprocessError::malformed(
                        format!("expected `define NAME[=VALUE]`, found `{}`", text.trim()),
                        line,
                    )
                })?;
                let name = caps.get(1).map_or("", |m| m.as_str());
                let value = caps.get(2).map_or("", |m| m.as_str().trim());
                Ok(Self::Define { name, value })
            }
            Keyword::If => Ok(Self::If(require_argument(keyword, args, line)?)),
            Keyword::Switch => Ok(Self::Switch(require_argument(keyword, args, line)?)),
            Keyword::Case => Ok(Self::Case(require_argument(keyword, args, line)?)),
            Keyword::Else => forbid_argument(keyword, args, line).map(|()| Self::Else),
            Keyword::Endif => forbid_argument(keyword, args, line).map(|()| Self::Endif),
            Keyword::Default => forbid_argument(keyword, args, line).map(|()| Self::Default),
            Keyword::Endswitch => forbid_argument(keyword, args, line).map(|()| Self::Endswitch),
            Keyword::Word => unreachable!(),
        }
    }
}

fn require_argument(keyword: Keyword, args: &str, line: usize) -> PreprocessResult<&str> {
    if args.is_empty() {
        Err(PreprocessError::malformed(format!("`{keyword}` requires an argument"), line))
    } else {
        Ok(args)
    }
}

fn forbid_argument(keyword: Keyword, args: &str, line: usize) -> PreprocessResult<()> {
    if args.is_empty() {
        Ok(())
    } else {
        Err(PreprocessError::malformed(
            format!("`{keyword}` takes no argument, found `{args}`"),
            line,
        ))
    }
}

/// Condition of an `if` statement, parsed after variable expansion
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    Equals(String, String),
    NotEquals(String, String),
    Defined(String),
    Undefined(String),
}

impl Condition {
    pub fn parse(expr: &str, line: usize) -> PreprocessResult<Self> {
        let expr = expr.trim();

        if let Some(caps) = DEFINED_RE.captures(expr) {
            let name = caps[2].to_string();
            return Ok(if &caps[1] == "defined" {
                Self::Defined(name)
            } else {
                Self::Undefined(name)
            });
        }

        if let Some(caps) = COMPARE_RE.captures(expr) {
            let left = caps[1].trim().to_string();
            let right = caps[3].trim().to_string();
            return Ok(if &caps[2] == "==" {
                Self::Equals(left, right)
            } else {
                Self::NotEquals(left, right)
            });
        }

        Err(PreprocessError::malformed(
            format!("invalid condition `{expr}`"),
            line,
        ))
    }

    pub fn evaluate(&self, variables: &VariableTable) -> bool {
        match self {
            Self::Equals(left, right) => left == right,
            Self::NotEquals(left, right) => left != right,
            Self::Defined(name) => variables.contains(name),
            Self::Undefined(name) => !variables.contains(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_define() {
        assert_eq!(
            Statement::parse("define X=A", 1).unwrap(),
            Statement::Define { name: "X", value: "A" }
        );
        assert_eq!(
            Statement::parse("define  name.v-1 =  spaced value ", 1).unwrap(),
            Statement::Define { name: "name.v-1", value: "spaced value" }
        );
        assert_eq!(
            Statement::parse("define FLAG", 1).unwrap(),
            Statement::Define { name: "FLAG", value: "" }
        );
        assert_eq!(
            Statement::parse("define X=$<Y>", 1).unwrap(),
            Statement::Define { name: "X", value: "$<Y>" }
        );
    }

    #[test]
    fn test_malformed_define() {
        for text in ["define", "define =x", "define a b", "define a$b=1"] {
            assert!(
                matches!(
                    Statement::parse(text, 4),
                    Err(PreprocessError::MalformedStatement { line: 4, .. })
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn test_block_keywords() {
        assert_eq!(Statement::parse("if a==b", 1).unwrap(), Statement::If("a==b"));
        assert_eq!(Statement::parse(" else", 1).unwrap(), Statement::Else);
        assert_eq!(Statement::parse("endif", 1).unwrap(), Statement::Endif);
        assert_eq!(Statement::parse("switch $<X>", 1).unwrap(), Statement::Switch("$<X>"));
        assert_eq!(Statement::parse("case  B ", 1).unwrap(), Statement::Case("B"));
        assert_eq!(Statement::parse("default", 1).unwrap(), Statement::Default);
        assert_eq!(Statement::parse("endswitch", 1).unwrap(), Statement::Endswitch);
    }

    #[test]
    fn test_unknown_statements() {
        for text in ["include foo", "defined", "ifdef X", "if$<X>==A", "", "!x", "elif a==b"] {
            assert!(
                matches!(
                    Statement::parse(text, 2),
                    Err(PreprocessError::UnknownStatement { line: 2, .. })
                ),
                "{text}"
            );
        }
    }

    #[test]
    fn test_argument_arity() {
        assert!(matches!(
            Statement::parse("if", 1),
            Err(PreprocessError::MalformedStatement { .. })
        ));
        assert!(matches!(
            Statement::parse("endif extra", 1),
            Err(PreprocessError::MalformedStatement { .. })
        ));
        assert!(matches!(
            Statement::parse("case", 1),
            Err(PreprocessError::MalformedStatement { .. })
        ));
    }

    #[test]
    fn test_conditions() {
        assert_eq!(
            Condition::parse(" A == A ", 1).unwrap(),
            Condition::Equals("A".into(), "A".into())
        );
        assert_eq!(
            Condition::parse("x!=y", 1).unwrap(),
            Condition::NotEquals("x".into(), "y".into())
        );
        assert_eq!(
            Condition::parse("defined(FOO)", 1).unwrap(),
            Condition::Defined("FOO".into())
        );
        assert_eq!(
            Condition::parse("undefined( FOO )", 1).unwrap(),
            Condition::Undefined("FOO".into())
        );
        assert_eq!(
            Condition::parse("==", 1).unwrap(),
            Condition::Equals(String::new(), String::new())
        );
        assert!(matches!(
            Condition::parse("just text", 9),
            Err(PreprocessError::MalformedStatement { line: 9, .. })
        ));
    }

    #[test]
    fn test_condition_evaluation() {
        let mut vars = VariableTable::new();
        vars.set("FOO", "1").unwrap();

        assert!(Condition::Defined("FOO".into()).evaluate(&vars));
        assert!(!Condition::Defined("BAR".into()).evaluate(&vars));
        assert!(Condition::Undefined("BAR".into()).evaluate(&vars));
        assert!(!Condition::Equals("a".into(), "A".into()).evaluate(&vars));
        assert!(Condition::NotEquals("a".into(), "A".into()).evaluate(&vars));
    }
}
