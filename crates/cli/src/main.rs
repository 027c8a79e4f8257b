//! markerfix command-line tool.
//!
//! Resolves Git-style conflict markers in place (keeping the stashed side),
//! previews resolution without writing, counts brace balance, and generates /
//! validates the optional `markerfix.toml` configuration file.

mod style;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use comfy_table::{presets::UTF8_FULL, Cell, ContentArrangement, Table};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, reload, EnvFilter, Registry};

use markerfix_core::braces::BraceCounter;
use markerfix_core::config::{MarkerfixConfig, DEFAULT_CONFIG_FILE};
use markerfix_core::conflict::MarkerResolver;

/// Log level used before (or without) a configuration file.
const FALLBACK_LOG_LEVEL: &str = "warn";

// ---------------------------------------------------------------------------
// CLI argument definitions
// ---------------------------------------------------------------------------

/// markerfix command-line tool.
#[derive(Parser, Debug)]
#[command(
    name = "markerfix",
    version,
    about = "Resolve Git conflict markers in place, keeping the stashed side"
)]
struct Cli {
    /// Path to the TOML configuration file (default: ./markerfix.toml if present).
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve conflict markers in place, keeping the stashed side.
    Resolve {
        /// Files to rewrite. Defaults to `resolve.targets` from the config.
        paths: Vec<PathBuf>,
    },

    /// Report what `resolve` would do without writing anything.
    Check {
        /// Files to inspect. Defaults to `resolve.targets` from the config.
        paths: Vec<PathBuf>,
    },

    /// Count curly-brace balance outside line comments (never writes).
    Braces {
        /// Files to count. Defaults to `resolve.targets` from the config.
        paths: Vec<PathBuf>,

        /// Line-comment prefix; overrides `braces.comment_prefix`.
        #[arg(long)]
        comment_prefix: Option<String>,
    },

    /// Generate a default configuration file.
    Init {
        /// Output path for the generated config file.
        #[arg(short, long, default_value = DEFAULT_CONFIG_FILE)]
        output: PathBuf,
    },

    /// Validate a configuration file.
    Validate,
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> ExitCode {
    let cli = Cli::parse();
    let log = init_tracing();

    match run(cli, &log) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli, log: &LogControl) -> Result<ExitCode> {
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init { output } => cmd_init(&output),
        Commands::Validate => cmd_validate(config_path),
        Commands::Resolve { paths } => {
            let config = load_config(config_path, log)?;
            cmd_resolve(&select_targets(paths, &config)?)
        }
        Commands::Check { paths } => {
            let config = load_config(config_path, log)?;
            cmd_check(&select_targets(paths, &config)?)
        }
        Commands::Braces {
            paths,
            comment_prefix,
        } => {
            let config = load_config(config_path, log)?;
            let prefix = comment_prefix.unwrap_or_else(|| config.braces.comment_prefix.clone());
            cmd_braces(&select_targets(paths, &config)?, &prefix)
        }
    }
}

// ---------------------------------------------------------------------------
// Logging
// ---------------------------------------------------------------------------

/// Handle on the installed filter so the configured level can be applied
/// once the config file has been read.
struct LogControl {
    handle: reload::Handle<EnvFilter, Registry>,
    /// `RUST_LOG` was set; it wins over `general.log_level`.
    from_env: bool,
}

impl LogControl {
    fn apply_level(&self, level: &str) -> Result<()> {
        if self.from_env {
            return Ok(());
        }
        self.handle
            .reload(EnvFilter::new(level))
            .context("failed to apply configured log level")
    }
}

/// Install the stderr subscriber at the fallback level.
fn init_tracing() -> LogControl {
    let (filter, from_env) = match EnvFilter::try_from_default_env() {
        Ok(filter) => (filter, true),
        Err(_) => (EnvFilter::new(FALLBACK_LOG_LEVEL), false),
    };
    let (filter, handle) = reload::Layer::new(filter);

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    LogControl { handle, from_env }
}

// ---------------------------------------------------------------------------
// Config helpers
// ---------------------------------------------------------------------------

fn load_config(path: Option<&Path>, log: &LogControl) -> Result<MarkerfixConfig> {
    let config = MarkerfixConfig::load_and_validate(path, Path::new("."))
        .context("failed to load configuration")?;
    log.apply_level(&config.general.log_level)?;
    Ok(config)
}

/// Paths from the command line, or the configured targets when none given.
fn select_targets(paths: Vec<PathBuf>, config: &MarkerfixConfig) -> Result<Vec<PathBuf>> {
    if !paths.is_empty() {
        return Ok(paths);
    }
    if config.resolve.targets.is_empty() {
        anyhow::bail!(
            "no files given. Pass paths on the command line or set resolve.targets in {}",
            DEFAULT_CONFIG_FILE
        );
    }
    Ok(config.resolve.targets.clone())
}

// ---------------------------------------------------------------------------
// Subcommand implementations
// ---------------------------------------------------------------------------

fn cmd_resolve(paths: &[PathBuf]) -> Result<ExitCode> {
    for path in paths {
        if paths.len() > 1 {
            println!("{}", style::dim(&path.display().to_string()));
        }

        let report = MarkerResolver::resolve_file(path)
            .with_context(|| format!("failed to resolve {}", path.display()))?;

        println!("{}", report.summary());
        if !report.is_terminated() {
            println!(
                "{}",
                style::warn(&format!(
                    "input ended {} (unterminated conflict)",
                    report.final_state
                ))
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_check(paths: &[PathBuf]) -> Result<ExitCode> {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["File", "Conflicts", "Kept", "Dropped", "Ends"]);

    let mut pending = 0usize;
    for path in paths {
        let report = MarkerResolver::scan_file(path)
            .with_context(|| format!("failed to check {}", path.display()))?;

        if report.conflicts > 0 || !report.is_terminated() {
            pending += 1;
        }

        table.add_row(vec![
            Cell::new(path.display()),
            Cell::new(report.conflicts),
            Cell::new(report.lines_kept),
            Cell::new(report.lines_dropped),
            Cell::new(report.final_state),
        ]);
    }

    println!();
    println!("{}", style::header("Conflict marker check"));
    println!();
    println!("{}", table);
    println!();

    if pending == 0 {
        println!("{}", style::success("No conflict markers found"));
        Ok(ExitCode::SUCCESS)
    } else {
        println!(
            "{}",
            style::warn(&format!(
                "{} of {} file(s) still contain conflict markers",
                pending,
                paths.len()
            ))
        );
        Ok(ExitCode::FAILURE)
    }
}

fn cmd_braces(paths: &[PathBuf], comment_prefix: &str) -> Result<ExitCode> {
    for path in paths {
        if paths.len() > 1 {
            println!("{}", style::dim(&path.display().to_string()));
        }

        let result = BraceCounter::count_file(path, comment_prefix)
            .with_context(|| format!("failed to count braces in {}", path.display()))?;

        println!("{}", result.summary());
        if let Some(line) = result.lowest_line {
            println!(
                "{}",
                style::warn(&format!(
                    "balance drops to {} at line {}",
                    result.lowest, line
                ))
            );
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn cmd_init(output: &Path) -> Result<ExitCode> {
    if output.exists() {
        anyhow::bail!(
            "file already exists: {}. Use a different path or remove the existing file.",
            output.display()
        );
    }

    std::fs::write(output, MarkerfixConfig::template()).context("failed to write config file")?;

    println!("Default configuration written to {}", output.display());
    println!();
    println!("Next steps:");
    println!("  1. List the files to resolve under [resolve] targets");
    println!(
        "  2. Validate with: markerfix validate --config {}",
        output.display()
    );
    println!(
        "  3. Preview with: markerfix check --config {}",
        output.display()
    );

    Ok(ExitCode::SUCCESS)
}

fn cmd_validate(config_path: Option<&Path>) -> Result<ExitCode> {
    let shown = config_path
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| format!("{} (or defaults)", DEFAULT_CONFIG_FILE));
    println!("Validating configuration: {}", shown);
    println!();

    let config = MarkerfixConfig::discover(config_path, Path::new("."))
        .context("failed to parse configuration")?;
    println!("  [OK] TOML structure is valid");

    match config.validate() {
        Ok(()) => {
            println!("  [OK] All fields are valid");
        }
        Err(e) => {
            println!("  [FAIL] Validation error: {}", e);
            anyhow::bail!("configuration validation failed");
        }
    }

    let missing: Vec<&PathBuf> = config
        .resolve
        .targets
        .iter()
        .filter(|t| !t.is_file())
        .collect();

    println!();
    println!("Configuration summary:");
    println!("  Log level     : {}", config.general.log_level);
    println!("  Targets       : {}", config.resolve.targets.len());
    for target in &config.resolve.targets {
        let mark = if target.is_file() { "ok" } else { "MISSING" };
        println!("    - {} [{}]", target.display(), mark);
    }
    println!("  Comment prefix: {:?}", config.braces.comment_prefix);
    println!();

    if missing.is_empty() {
        println!("Configuration is valid.");
    } else {
        println!(
            "{}",
            style::warn(&format!("{} target(s) not found on disk", missing.len()))
        );
    }

    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_resolve_with_paths() {
        let cli = Cli::try_parse_from(["markerfix", "resolve", "a.kt", "b.kt"]).unwrap();
        match cli.command {
            Commands::Resolve { paths } => {
                assert_eq!(paths, vec![PathBuf::from("a.kt"), PathBuf::from("b.kt")]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(cli.config.is_none());
    }

    #[test]
    fn test_parse_global_config_flag() {
        let cli =
            Cli::try_parse_from(["markerfix", "braces", "--config", "x.toml", "--comment-prefix", "#"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("x.toml")));
        match cli.command {
            Commands::Braces {
                paths,
                comment_prefix,
            } => {
                assert!(paths.is_empty());
                assert_eq!(comment_prefix.as_deref(), Some("#"));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_select_targets_prefers_command_line() {
        let mut config = MarkerfixConfig::default();
        config.resolve.targets = vec![PathBuf::from("from-config.kt")];

        let chosen = select_targets(vec![PathBuf::from("cli.kt")], &config).unwrap();
        assert_eq!(chosen, vec![PathBuf::from("cli.kt")]);

        let chosen = select_targets(Vec::new(), &config).unwrap();
        assert_eq!(chosen, vec![PathBuf::from("from-config.kt")]);
    }

    #[test]
    fn test_select_targets_requires_something() {
        let err = select_targets(Vec::new(), &MarkerfixConfig::default()).unwrap_err();
        assert!(err.to_string().contains("resolve.targets"));
    }

    fn same_code(actual: ExitCode, expected: ExitCode) -> bool {
        format!("{:?}", actual) == format!("{:?}", expected)
    }

    fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    const CONFLICTED: &str = "a\n<<<<<<< HEAD\nup\n=======\nst\n>>>>>>> b\nz\n";

    #[test]
    fn test_check_fails_when_markers_remain() {
        let dir = tempfile::tempdir().unwrap();
        let clean = write_file(dir.path(), "clean.kt", "fun f() {}\n");
        let conflicted = write_file(dir.path(), "conflicted.kt", CONFLICTED);

        let code = cmd_check(&[clean.clone(), conflicted.clone()]).unwrap();
        assert!(same_code(code, ExitCode::FAILURE));

        // Nothing is written by a check.
        assert_eq!(std::fs::read_to_string(&conflicted).unwrap(), CONFLICTED);
    }

    #[test]
    fn test_check_fails_on_unterminated_conflict() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(dir.path(), "open.kt", "=======\nstray\n");
        assert!(same_code(cmd_check(&[path]).unwrap(), ExitCode::SUCCESS));

        let path = write_file(dir.path(), "open2.kt", "<<<<<<< HEAD\nup\n");
        assert!(same_code(cmd_check(&[path]).unwrap(), ExitCode::FAILURE));
    }

    #[test]
    fn test_check_succeeds_on_clean_file() {
        let dir = tempfile::tempdir().unwrap();
        let clean = write_file(dir.path(), "clean.kt", "fun f() {}\n");

        let code = cmd_check(&[clean]).unwrap();
        assert!(same_code(code, ExitCode::SUCCESS));
    }

    #[test]
    fn test_check_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = cmd_check(&[dir.path().join("missing.kt")]).unwrap_err();
        assert!(format!("{:#}", err).contains("file not found"));
    }

    #[test]
    fn test_resolve_rewrites_every_file() {
        let dir = tempfile::tempdir().unwrap();
        let first = write_file(dir.path(), "first.kt", CONFLICTED);
        let second = write_file(
            dir.path(),
            "second.kt",
            "<<<<<<< HEAD\nx\n=======\ny\n>>>>>>> b\n<<<<<<< HEAD\np\n=======\nq\n>>>>>>> b\n",
        );

        let code = cmd_resolve(&[first.clone(), second.clone()]).unwrap();

        assert!(same_code(code, ExitCode::SUCCESS));
        assert_eq!(std::fs::read_to_string(&first).unwrap(), "a\nst\nz\n");
        assert_eq!(std::fs::read_to_string(&second).unwrap(), "y\nq\n");
        assert!(same_code(cmd_check(&[first, second]).unwrap(), ExitCode::SUCCESS));
    }

    #[test]
    fn test_resolve_stops_at_first_failure() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing.kt");
        let later = write_file(dir.path(), "later.kt", CONFLICTED);

        assert!(cmd_resolve(&[missing, later.clone()]).is_err());
        assert_eq!(std::fs::read_to_string(&later).unwrap(), CONFLICTED);
    }

    #[test]
    fn test_braces_accepts_several_paths() {
        let cli = Cli::try_parse_from(["markerfix", "braces", "a.kt", "b.kt"]).unwrap();
        match cli.command {
            Commands::Braces { paths, .. } => assert_eq!(paths.len(), 2),
            other => panic!("unexpected command: {:?}", other),
        }

        let dir = tempfile::tempdir().unwrap();
        let a = write_file(dir.path(), "a.kt", "class A {\n}\n");
        let b = write_file(dir.path(), "b.kt", "} {\n");
        assert!(same_code(cmd_braces(&[a, b], "//").unwrap(), ExitCode::SUCCESS));
    }

    #[test]
    fn test_configured_log_level_is_applied() {
        let (filter, handle) = reload::Layer::new(EnvFilter::new("warn"));
        let subscriber = tracing_subscriber::registry().with(filter);

        tracing::subscriber::with_default(subscriber, || {
            assert!(!tracing::enabled!(tracing::Level::INFO));

            let log = LogControl {
                handle,
                from_env: false,
            };
            log.apply_level("info").unwrap();

            assert!(tracing::enabled!(tracing::Level::INFO));
        });
    }

    #[test]
    fn test_env_filter_wins_over_configured_level() {
        let (filter, handle) = reload::Layer::new(EnvFilter::new("error"));
        let subscriber = tracing_subscriber::registry().with(filter);

        tracing::subscriber::with_default(subscriber, || {
            let log = LogControl {
                handle,
                from_env: true,
            };
            log.apply_level("trace").unwrap();

            assert!(!tracing::enabled!(tracing::Level::WARN));
        });
    }

    #[test]
    fn test_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markerfix.toml");

        cmd_init(&path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert_eq!(written, MarkerfixConfig::template());

        assert!(cmd_init(&path).is_err());
    }
}
