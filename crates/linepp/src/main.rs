//! linepp - streaming line preprocessor
//!
//! Usage: linepp [OPTIONS] [INPUT] [-o <output>]

use std::fs;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser as ClapParser, ValueEnum};
use line_preprocessor::{
    DiagnosticReporter, LineEnding, LinePreprocessor, MemoryProvider, PreprocessError,
    PreprocessorConfig, StrSource, VariableStyle, VariableTable,
};

/// Variable reference style
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Style {
    /// $<NAME>
    #[default]
    Angle,
    /// ${NAME}
    Curly,
    /// $(NAME)
    Paren,
}

impl From<Style> for VariableStyle {
    fn from(style: Style) -> Self {
        match style {
            Style::Angle => VariableStyle::Angle,
            Style::Curly => VariableStyle::Curly,
            Style::Paren => VariableStyle::Paren,
        }
    }
}

/// Output line terminator
#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Default)]
enum Ending {
    #[default]
    Platform,
    Crlf,
    Lf,
}

impl From<Ending> for LineEnding {
    fn from(ending: Ending) -> Self {
        match ending {
            Ending::Platform => LineEnding::Platform,
            Ending::Crlf => LineEnding::CrLf,
            Ending::Lf => LineEnding::Lf,
        }
    }
}

#[derive(ClapParser, Debug)]
#[command(name = "linepp")]
#[command(version)]
#[command(about = "Expand variables, strip comments and evaluate #if/#switch blocks", long_about = None)]
struct Args {
    /// Input file (stdin when omitted)
    input: Option<PathBuf>,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Define a variable (NAME=VALUE)
    #[arg(short = 'D', long = "define", value_parser = parse_key_value)]
    defines: Vec<(String, String)>,

    /// Statement leader character
    #[arg(long)]
    leader: Option<char>,

    /// Comment marker (repeatable; replaces the default `//`)
    #[arg(long = "comment")]
    comments: Vec<String>,

    /// YAML mode: `@` statements and `#` comments
    #[arg(long)]
    yaml: bool,

    /// Variable reference style
    #[arg(long, value_enum, default_value = "angle")]
    style: Style,

    /// Pass comment lines through unchanged
    #[arg(long)]
    keep_comments: bool,

    /// Drop comment lines entirely
    #[arg(long)]
    remove_comments: bool,

    /// Drop blank lines
    #[arg(long)]
    remove_blank: bool,

    /// Pass statements through without evaluating them
    #[arg(long)]
    no_statements: bool,

    /// Disable variable expansion and formatting
    #[arg(long)]
    no_expand: bool,

    /// Expand tabs to this stop width
    #[arg(long, default_value = "0")]
    tab_stop: usize,

    /// Indent non-blank lines by this many spaces
    #[arg(long, default_value = "0")]
    indent: usize,

    /// Value substituted for undefined variables
    #[arg(long)]
    default_variable: Option<String>,

    /// Value substituted for undefined environment variables
    #[arg(long)]
    default_env: Option<String>,

    /// Output line terminator
    #[arg(long, value_enum, default_value = "platform")]
    line_ending: Ending,

    /// Secret value (NAME[PROPERTY][:SOURCE]=VALUE)
    #[arg(long = "secret", value_parser = parse_key_value)]
    secrets: Vec<(String, String)>,

    /// Profile value (NAME=VALUE)
    #[arg(long = "profile", value_parser = parse_key_value)]
    profile: Vec<(String, String)>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

/// A preprocessing error whose diagnostic has already been rendered
#[derive(Debug, thiserror::Error)]
#[error("preprocessing failed")]
struct Reported;

/// The message `main` prints for an error, or `None` if it was already reported
fn error_message(error: &anyhow::Error) -> Option<String> {
    (!error.is::<Reported>()).then(|| format!("error: {error:#}"))
}

fn parse_key_value(s: &str) -> Result<(String, String), String> {
    s.split_once('=')
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .ok_or_else(|| format!("expected KEY=VALUE, found `{s}`"))
}

fn main() {
    let args = Args::parse();

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if args.verbose { "debug" } else { "warn" }),
    )
    .init();

    if let Err(e) = run(&args) {
        if let Some(message) = error_message(&e) {
            eprintln!("{message}");
        }
        process::exit(1);
    }
}

fn build_config(args: &Args) -> Result<PreprocessorConfig, PreprocessError> {
    let mut config = if args.yaml {
        PreprocessorConfig::yaml()
    } else {
        PreprocessorConfig::default()
    };

    if let Some(leader) = args.leader {
        config.set_statement_leader(leader)?;
    }
    if !args.comments.is_empty() {
        config.clear_comment_markers();
        for marker in &args.comments {
            config.add_comment_marker(marker.clone())?;
        }
    }

    config.style = args.style.into();
    config.strip_comments = !args.keep_comments;
    config.remove_comments = args.remove_comments;
    config.remove_blank = args.remove_blank;
    config.process_statements = !args.no_statements;
    config.expand_variables = !args.no_expand;
    config.tab_stop = args.tab_stop;
    config.indent = args.indent;
    config.default_variable.clone_from(&args.default_variable);
    config.default_env_variable.clone_from(&args.default_env);
    config.line_ending = args.line_ending.into();

    Ok(config)
}

fn run(args: &Args) -> anyhow::Result<()> {
    // Read input
    let (filename, source) = match &args.input {
        Some(path) => (
            path.display().to_string(),
            fs::read_to_string(path).with_context(|| format!("cannot read {}", path.display()))?,
        ),
        None => {
            let mut source = String::new();
            io::stdin().read_to_string(&mut source).context("cannot read stdin")?;
            ("<stdin>".to_string(), source)
        }
    };

    // Set up diagnostic reporter
    let mut reporter = DiagnosticReporter::new();
    let file_id = reporter.add_file(&filename, source.as_str());

    let config = build_config(args)?;
    let ending = config.line_ending.as_str();

    let mut variables = VariableTable::new();
    for (name, value) in &args.defines {
        variables.set(name, value)?;
    }

    let mut preprocessor =
        LinePreprocessor::with_variables(StrSource::new(&source), variables).with_config(config);

    if !args.secrets.is_empty() || !args.profile.is_empty() {
        let mut provider = MemoryProvider::new();
        for (key, value) in &args.secrets {
            provider.insert_secret(key, value);
        }
        for (name, value) in &args.profile {
            provider.insert_profile(name, value);
        }
        preprocessor = preprocessor.with_provider(Arc::new(provider));
    }

    if args.verbose {
        eprintln!("Preprocessing {filename}");
    }

    let mut out: Box<dyn Write> = match &args.output {
        Some(path) => Box::new(BufWriter::new(
            fs::File::create(path).with_context(|| format!("cannot create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    loop {
        match preprocessor.next_line() {
            Ok(Some(line)) => {
                out.write_all(line.as_bytes())?;
                out.write_all(ending.as_bytes())?;
            }
            Ok(None) => break,
            Err(e) => {
                reporter.report_error(file_id, &e);
                return Err(Reported.into());
            }
        }
    }
    out.flush()?;

    if args.verbose {
        eprintln!("Processed {} lines", preprocessor.line_number());
    }

    Ok(())
}
