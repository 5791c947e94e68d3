//! Command-line interface for evolint.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use walkdir::WalkDir;

use crate::checks::CHECKS;
use crate::config::{self, Config, DEFAULT_CONFIG, DEFAULT_CONFIG_NAMES};
use crate::detect::Runner;
use crate::report;

/// Exit codes.
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FAILED: i32 = 1;
pub const EXIT_ERROR: i32 = 2;

/// Static analysis for C/C++ code-evolution hazards.
///
/// Evolint reads translation units exported as JSON by a compiler front end
/// and reports assignment operators that forget fields, virtual methods that
/// hide base methods, and a handful of project-specific idioms.
#[derive(Parser)]
#[command(name = "evolint")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Lint unit files
    #[command(visible_alias = "check")]
    Lint(LintArgs),
    /// List every available check
    ListChecks,
    /// Write a default config file
    Init(InitArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Pretty,
    Json,
}

/// Arguments for the lint command.
#[derive(Parser)]
pub struct LintArgs {
    /// Unit file or directory of unit files (*.json)
    pub path: PathBuf,

    /// Path to config YAML file (default: auto-discover)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "pretty")]
    pub format: Format,

    /// Extra check globs applied after the config's list (e.g. "-evolution-zero-*")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub checks: Vec<String>,

    /// Show suppressed diagnostics in output
    #[arg(long)]
    pub show_suppressed: bool,
}

/// Arguments for the init command.
#[derive(Parser)]
pub struct InitArgs {
    /// Output file path
    #[arg(short, long, default_value = ".evolint.yaml")]
    pub output: PathBuf,
}

/// Find a config next to the linted path, falling back to the current
/// directory.
fn discover_config(path: &Path) -> Option<PathBuf> {
    let dir = if path.is_dir() {
        path
    } else {
        path.parent().unwrap_or(Path::new("."))
    };
    Config::discover(dir).or_else(|| Config::discover(Path::new(".")))
}

/// Collect unit files under `root`, skipping hidden directories and
/// excluded paths.
fn collect_units(root: &Path, config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(root)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|e| {
            let name = e.file_name().to_string_lossy();
            !(e.depth() > 0 && e.file_type().is_dir() && name.starts_with('.'))
        })
    {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        if path.extension().and_then(|e| e.to_str()) != Some("json") {
            continue;
        }
        if config.is_path_excluded(path) {
            debug!(path = %path.display(), "excluded");
            continue;
        }
        files.push(path.to_path_buf());
    }

    Ok(files)
}

/// Run the lint command.
pub fn run_lint(args: &LintArgs) -> anyhow::Result<i32> {
    let config_path = args.config.clone().or_else(|| discover_config(&args.path));

    let mut config = match &config_path {
        Some(p) => match Config::parse_file(p) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("Error parsing config: {:#}", e);
                return Ok(EXIT_ERROR);
            }
        },
        None => Config::default(),
    };
    config.checks.extend(args.checks.iter().cloned());

    if let Err(e) = config::validate(&config) {
        eprintln!("Error: invalid config: {:#}", e);
        return Ok(EXIT_ERROR);
    }
    match &config_path {
        Some(p) => info!(config = %p.display(), "using config"),
        None => info!("no config found, using defaults"),
    }

    let metadata = match std::fs::metadata(&args.path) {
        Ok(m) => m,
        Err(e) => {
            eprintln!("Error: cannot access path {:?}: {}", args.path, e);
            return Ok(EXIT_ERROR);
        }
    };

    let files = if metadata.is_dir() {
        collect_units(&args.path, &config)?
    } else {
        vec![args.path.clone()]
    };

    if files.is_empty() {
        eprintln!("Warning: no unit files to lint");
        return Ok(EXIT_SUCCESS);
    }

    let runner = Runner::from_config(&config)?;
    info!(
        units = files.len(),
        checks = runner.registry().len(),
        "starting lint"
    );
    let result = runner.run_files(&files);

    let path_str = args.path.to_string_lossy().to_string();
    match args.format {
        Format::Json => report::write_json(&path_str, &result)?,
        Format::Pretty => report::write_pretty(&path_str, &result, args.show_suppressed),
    }

    Ok(exit_code(&result))
}

/// Failures outrank diagnostics.
fn exit_code(result: &crate::detect::LintResult) -> i32 {
    if result.has_failures() {
        EXIT_ERROR
    } else if !result.diagnostics.is_empty() {
        EXIT_FAILED
    } else {
        EXIT_SUCCESS
    }
}

/// Run the list-checks command.
pub fn run_list_checks() -> anyhow::Result<i32> {
    println!("Available checks:");
    println!();
    for (name, description) in CHECKS {
        println!("  {:<44} {}", name, description);
    }
    Ok(EXIT_SUCCESS)
}

/// Run the init command.
pub fn run_init(args: &InitArgs) -> anyhow::Result<i32> {
    if args.output.exists() {
        eprintln!("Error: file already exists: {}", args.output.display());
        eprintln!("Remove it or use --output to specify a different path");
        return Ok(EXIT_ERROR);
    }

    if let Some(parent) = args.output.parent() {
        if !parent.as_os_str().is_empty() && parent != Path::new(".") {
            if let Err(e) = std::fs::create_dir_all(parent) {
                eprintln!("Error: failed to create directory: {}", e);
                return Ok(EXIT_ERROR);
            }
        }
    }

    if let Err(e) = std::fs::write(&args.output, DEFAULT_CONFIG) {
        eprintln!("Error: failed to write config: {}", e);
        return Ok(EXIT_ERROR);
    }

    println!("Created {}", args.output.display());
    println!();
    println!("Next steps:");
    println!("  1. Edit {} to select checks and options", args.output.display());
    if !DEFAULT_CONFIG_NAMES
        .iter()
        .any(|name| args.output.file_name() == Some(std::ffi::OsStr::new(name)))
    {
        println!(
            "  2. Run: evolint lint <units> --config {}",
            args.output.display()
        );
    } else {
        println!("  2. Run: evolint lint <units>");
    }

    Ok(EXIT_SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::detect::{CheckFailure, LintResult};
    use tempfile::TempDir;

    #[test]
    fn test_collect_units_skips_hidden_and_excluded() {
        let temp = TempDir::new().unwrap();
        let root = temp.path();
        std::fs::create_dir_all(root.join("generated")).unwrap();
        std::fs::create_dir_all(root.join(".cache")).unwrap();
        std::fs::write(root.join("b.json"), "{}").unwrap();
        std::fs::write(root.join("a.json"), "{}").unwrap();
        std::fs::write(root.join("notes.txt"), "").unwrap();
        std::fs::write(root.join("generated/g.json"), "{}").unwrap();
        std::fs::write(root.join(".cache/c.json"), "{}").unwrap();

        let config = Config {
            excluded_paths: vec!["**/generated/**".to_string()],
            ..Config::default()
        };
        let files = collect_units(root, &config).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.json", "b.json"]);
    }

    #[test]
    fn test_exit_codes() {
        let mut result = LintResult::new();
        assert_eq!(exit_code(&result), EXIT_SUCCESS);

        result.diagnostics.push(crate::detect::Diagnostic {
            check: "evolution-assert-usage".to_string(),
            unit: "a.cpp".to_string(),
            span: crate::ast::Span::new(0, 1),
            location: None,
            severity: crate::detect::Severity::Warning,
            template: "m".to_string(),
            args: Vec::new(),
            notes: Vec::new(),
            edits: Vec::new(),
        });
        assert_eq!(exit_code(&result), EXIT_FAILED);

        result.failures.push(CheckFailure {
            check: "evolution-assert-usage".to_string(),
            unit: "a.cpp".to_string(),
            error: "boom".to_string(),
        });
        assert_eq!(exit_code(&result), EXIT_ERROR);
    }

    #[test]
    fn test_init_writes_default_config_once() {
        let temp = TempDir::new().unwrap();
        let output = temp.path().join("cfg/evolint.yaml");
        let args = InitArgs {
            output: output.clone(),
        };
        assert_eq!(run_init(&args).unwrap(), EXIT_SUCCESS);
        let config = Config::parse_file(&output).unwrap();
        config::validate(&config).unwrap();
        assert_eq!(run_init(&args).unwrap(), EXIT_ERROR);
    }

    #[test]
    fn test_cli_parses_lint_flags() {
        let cli = Cli::try_parse_from([
            "evolint",
            "-vv",
            "lint",
            "units",
            "--format",
            "json",
            "--checks",
            "-*,evolution-assert-usage",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Lint(args) = cli.command else {
            panic!("expected lint");
        };
        assert_eq!(args.format, Format::Json);
        assert_eq!(args.checks, vec!["-*", "evolution-assert-usage"]);
    }
}
