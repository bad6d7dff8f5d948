use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use codespan_reporting::diagnostic::{Diagnostic, Label};
use codespan_reporting::files::SimpleFile;
use codespan_reporting::term::{
    self,
    termcolor::{ColorChoice, StandardStream},
};
use colored::Colorize;
use tracing_subscriber::EnvFilter;

use termpose_syntax::{escape, format, parse, ParseError, PrintConfig, Term};

#[derive(Parser)]
#[command(author, version, about = "Termpose - an indentation-driven tree notation")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check termpose files for syntax errors
    Check {
        /// Files to check
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
    },
    /// Rewrite termpose files in canonical form
    Format {
        /// Files to format
        #[arg(value_name = "FILES", required = true)]
        files: Vec<PathBuf>,
        /// Check formatting without modifying files
        #[arg(long)]
        check: bool,
        /// Indentation per level: a number of spaces, or `tab`
        #[arg(long, default_value = "tab", value_parser = parse_indent)]
        indent: String,
        /// Maximum line width before a form is split
        #[arg(long, default_value_t = 80)]
        max_width: usize,
    },
    /// Show the parsed tree of a file
    Tree {
        /// Path to the file
        #[arg(value_name = "FILE")]
        file: PathBuf,
        /// Output format
        #[arg(long, short, default_value = "text")]
        format: TreeFormat,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum TreeFormat {
    /// Indented outline with source positions
    Text,
    /// JSON output
    Json,
}

fn parse_indent(value: &str) -> Result<String, String> {
    if value == "tab" {
        return Ok("\t".to_string());
    }
    match value.parse::<usize>() {
        Ok(width @ 1..=16) => Ok(" ".repeat(width)),
        _ => Err(format!("expected `tab` or a number of spaces from 1 to 16, got `{value}`")),
    }
}

fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match run(cli) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("{}: {:#}", "error".red().bold(), e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<bool> {
    match cli.command {
        Commands::Check { files } => check_files(&files),
        Commands::Format {
            files,
            check,
            indent,
            max_width,
        } => {
            let config = PrintConfig {
                indent,
                max_width,
            };
            format_files(&files, check, &config)
        }
        Commands::Tree { file, format } => tree_file(&file, format),
    }
}

fn read(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Render a parse error against its source.
fn report(path: &Path, source: &str, error: &ParseError) -> Result<()> {
    let file = SimpleFile::new(path.display().to_string(), source);
    let range = error.span.range();
    let end = range.end.min(source.len());
    let start = range.start.min(end);
    let diagnostic = Diagnostic::error()
        .with_message(error.kind.to_string())
        .with_labels(vec![Label::primary((), start..end)]);

    let choice = if std::io::stderr().is_terminal() {
        ColorChoice::Auto
    } else {
        ColorChoice::Never
    };
    let writer = StandardStream::stderr(choice);
    term::emit(&mut writer.lock(), &term::Config::default(), &file, &diagnostic)?;
    Ok(())
}

fn check_files(files: &[PathBuf]) -> Result<bool> {
    let mut failed = 0usize;

    for path in files {
        let content = read(path)?;
        match parse(&content) {
            Ok(_) => println!("{} {}", "✓".green().bold(), path.display()),
            Err(e) => {
                report(path, &content, &e)?;
                failed += 1;
            }
        }
    }

    if failed > 0 {
        eprintln!(
            "\n{}: {} of {} file(s) failed to parse",
            "error".red().bold(),
            failed,
            files.len()
        );
    }

    Ok(failed == 0)
}

fn format_files(files: &[PathBuf], check: bool, config: &PrintConfig) -> Result<bool> {
    let mut all_ok = true;

    for path in files {
        let content = read(path)?;

        let root = match parse(&content) {
            Ok(root) => root,
            Err(e) => {
                report(path, &content, &e)?;
                all_ok = false;
                continue;
            }
        };

        let formatted = format(&root, config);

        if check {
            if formatted == content {
                println!("{} {}", "✓".green().bold(), path.display());
            } else {
                println!(
                    "{}: {} would be reformatted",
                    "warning".yellow().bold(),
                    path.display()
                );
                all_ok = false;
            }
        } else if formatted == content {
            println!("{} {} (unchanged)", "✓".green().bold(), path.display());
        } else {
            std::fs::write(path, &formatted)
                .with_context(|| format!("failed to write {}", path.display()))?;
            tracing::debug!(path = %path.display(), "rewrote file");
            println!("{} {}", "formatted".green().bold(), path.display());
        }
    }

    Ok(all_ok)
}

fn tree_file(path: &Path, format: TreeFormat) -> Result<bool> {
    let content = read(path)?;
    let root = match parse(&content) {
        Ok(root) => root,
        Err(e) => {
            report(path, &content, &e)?;
            return Ok(false);
        }
    };

    match format {
        TreeFormat::Text => {
            let mut out = String::new();
            for item in root.children() {
                outline(item, 0, &mut out);
            }
            print!("{out}");
        }
        TreeFormat::Json => {
            let items: Vec<_> = root.children().iter().map(to_json).collect();
            println!("{}", serde_json::to_string_pretty(&items)?);
        }
    }

    Ok(true)
}

fn outline(term: &Term, depth: usize, out: &mut String) {
    let (line, column) = term.line_and_column();
    out.push_str(&"  ".repeat(depth));
    out.push_str(&escape(term.head()));
    out.push_str(&format!("  {}\n", format!("{line}:{column}").dimmed()));
    for child in term.children() {
        outline(child, depth + 1, out);
    }
}

fn to_json(term: &Term) -> serde_json::Value {
    let (line, column) = term.line_and_column();
    serde_json::json!({
        "head": term.head(),
        "children": term.children().iter().map(to_json).collect::<Vec<_>>(),
        "line": line,
        "column": column,
    })
}
