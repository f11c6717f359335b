use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use modscope::analysis::Analyzer;
use modscope::config::Config;
use modscope::context::AnalysisContext;
use modscope::export::{export, ExportFormat};
use modscope::loader::GraphLoader;

#[derive(Parser)]
#[command(name = "modscope")]
#[command(version)]
#[command(
    about = "Module dependency analyzer: cycles, break points and extraction difficulty",
    long_about = None
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a module graph manifest
    Analyze {
        /// Manifest file or directory containing one (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Configuration file (defaults to modscope.toml next to the manifest)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output format: text, json, csv, markdown
        #[arg(short, long, default_value = "text")]
        format: ExportFormat,

        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Increase log verbosity (-v info, -vv debug)
        #[arg(short, long, action = clap::ArgAction::Count)]
        verbose: u8,
    },
    /// Show version information
    Version,
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "modscope=info",
        _ => "modscope=debug",
    };
    // RUST_LOG wins over -v
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).with_writer(io::stderr))
        .init();
}

/// Directory that holds the configuration for `path`.
fn config_dir(path: &Path) -> &Path {
    if path.is_dir() {
        path
    } else {
        path.parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."))
    }
}

fn analyze(
    path: &Path,
    config: Option<&Path>,
    format: ExportFormat,
    output: Option<&Path>,
) -> Result<()> {
    let project = GraphLoader::new()
        .load(path)
        .with_context(|| format!("Failed to load module graph from {}", path.display()))?;
    info!(
        project = %project.name,
        source = %project.source.display(),
        modules = project.graph.module_count(),
        "Loaded module graph"
    );

    let config = Config::discover(config, config_dir(path)).context("Invalid configuration")?;

    let report = Analyzer::new(config)
        .analyze_project(project, &AnalysisContext::new())
        .context("Analysis failed")?;

    match output {
        Some(file) => {
            let handle = File::create(file)
                .with_context(|| format!("Failed to create {}", file.display()))?;
            let mut writer = BufWriter::new(handle);
            export(format, &report, &mut writer)?;
            writer.flush()?;
            info!(path = %file.display(), %format, "Report written");
        }
        None => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            export(format, &report, &mut writer)?;
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Analyze {
            path,
            config,
            format,
            output,
            verbose,
        }) => {
            init_logging(verbose);
            analyze(&path, config.as_deref(), format, output.as_deref())
        }
        Some(Commands::Version) => {
            println!("modscope v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        None => {
            println!("ModScope - Module Dependency Analyzer");
            println!("Run 'modscope analyze <PATH>' to analyze a module graph");
            println!("Run 'modscope --help' for more information");
            Ok(())
        }
    }
}
