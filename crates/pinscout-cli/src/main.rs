use anyhow::{bail, Context};
use clap::Parser;
use pinscout_core::{load_manifest, read_manifest, Config, ExportFormat, Exporter};
use pinscout_deps::{render_manifest, Manifest, RenderOptions};
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "pinscout")]
#[command(version, about = "Validate and inspect pinned Python requirements files", long_about = None)]
struct Cli {
    /// Config file (default: <config dir>/pinscout/config.toml)
    #[arg(long, global = true, env = "PINSCOUT_CONFIG")]
    config: Option<PathBuf>,

    /// Print debug logs
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Validate a lock file
    Check {
        /// Lock file path, `-` for stdin
        file: PathBuf,
    },
    /// Print the pinned requirements
    Show {
        /// Lock file path, `-` for stdin
        file: PathBuf,
        /// Output format (table, json, csv, markdown)
        #[arg(short, long, value_parser = parse_format)]
        format: Option<ExportFormat>,
        /// Print counts instead of records
        #[arg(long)]
        summary: bool,
    },
    /// Write the pinned requirements to a file
    Export {
        /// Lock file path, `-` for stdin
        file: PathBuf,
        /// Destination; format follows the extension unless --format is given
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long, value_parser = parse_format)]
        format: Option<ExportFormat>,
    },
    /// Re-render a lock file with aligned comments
    Fmt {
        /// Lock file path, `-` for stdin
        file: PathBuf,
        /// Rewrite the file in place instead of printing
        #[arg(short, long)]
        write: bool,
        /// Column to align inline comments to
        #[arg(long)]
        comment_column: Option<usize>,
    },
    /// Print the effective configuration
    Config,
}

fn parse_format(s: &str) -> Result<ExportFormat, String> {
    s.parse().map_err(|e: pinscout_core::Error| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so piped output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter(cli.verbose).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;

    match cli.command {
        Commands::Check { file } => {
            let manifest = load(&file)?;
            let summary = manifest.summary();
            println!(
                "{}: {} requirements ({} marker-gated, {} excluded)",
                file.display(),
                summary.total_count,
                summary.conditional_count,
                summary.excluded_count
            );
        }
        Commands::Show {
            file,
            format,
            summary,
        } => {
            let manifest = load(&file)?;
            let format = format.unwrap_or(config.output.format);
            if summary {
                print_summary(&manifest, format)?;
            } else {
                print!("{}", Exporter::render(&manifest, format)?);
            }
        }
        Commands::Export {
            file,
            output,
            format,
        } => {
            let manifest = load(&file)?;
            match format {
                Some(format) => Exporter::export_to_file_with_format(&manifest, &output, format)?,
                None => Exporter::export_to_file(&manifest, &output)?,
            }
            println!(
                "Exported {} requirements to {}",
                manifest.len(),
                output.display()
            );
        }
        Commands::Fmt {
            file,
            write,
            comment_column,
        } => {
            let manifest = load(&file)?;
            let options = RenderOptions {
                comment_column: comment_column.unwrap_or(config.render.comment_column),
            };
            let rendered = render_manifest(&manifest, &options);

            if write {
                if is_stdin(&file) {
                    bail!("--write needs a file path, not stdin");
                }
                std::fs::write(&file, rendered)
                    .with_context(|| format!("Failed to write {}", file.display()))?;
                tracing::info!(path = %file.display(), "reformatted");
            } else {
                print!("{}", rendered);
            }
        }
        Commands::Config => {
            print!("{}", config.to_toml()?);
        }
    }

    Ok(())
}

/// Log filter used when RUST_LOG isn't set
fn default_filter(verbose: bool) -> &'static str {
    if verbose {
        "pinscout=debug"
    } else {
        "pinscout=info"
    }
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

fn load(path: &Path) -> anyhow::Result<Manifest> {
    let manifest = if is_stdin(path) {
        read_manifest(std::io::stdin().lock())?
    } else {
        load_manifest(path)?
    };
    Ok(manifest)
}

fn print_summary(manifest: &Manifest, format: ExportFormat) -> anyhow::Result<()> {
    let summary = manifest.summary();
    match format {
        ExportFormat::Json => println!("{}", serde_json::to_string_pretty(&summary)?),
        _ => {
            println!("total:        {}", summary.total_count);
            println!("always:       {}", summary.unconditional_count);
            println!("conditional:  {}", summary.conditional_count);
            println!("annotated:    {}", summary.annotated_count);
            println!("excluded:     {}", summary.excluded_count);
        }
    }
    Ok(())
}
