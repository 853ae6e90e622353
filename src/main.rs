use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use ctxkit::config::{load_or_default, DocumentConfig};
use ctxkit::content::Catalog;
use ctxkit::pdf;
use ctxkit::probe::{CheckKind, HuggingFaceProbe, InferenceProbe, Probe, ProbeReport};
use ctxkit::ui::{print_section, print_status, Status};
use ctxkit::utils::display::{is_terminal, terminal_width, truncate_with_ellipsis};
use ctxkit::utils::HttpClient;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// ctxkit - Generate, split, and analyze large synthetic PDFs for context-window testing
#[derive(Parser, Debug)]
#[command(name = "ctxkit")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(author = "hongkongkiwi")]
#[command(about = "Generate, split, and analyze large synthetic PDFs and probe model endpoints", long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose logging (can be used multiple times for more verbosity: -v, -vv, -vvv)
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(long, short)]
    quiet: bool,

    /// Output format
    #[arg(long, short, value_enum, global = true, default_value_t = OutputFormat::Auto)]
    output: OutputFormat,

    /// Configuration file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Show all environment variables
    #[arg(long, global = true)]
    env: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Output format for results
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum OutputFormat {
    /// Automatic based on terminal (table if TTY, JSON otherwise)
    Auto,
    /// Table format (human-readable)
    Table,
    /// JSON format (machine-readable)
    Json,
    /// Plain text format
    Plain,
}

/// Which endpoint group to probe
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ProbeTarget {
    /// All probes
    All,
    /// HuggingFace whoami, avatar spaces and TTS models
    Huggingface,
    /// Local LLM inference endpoint
    Inference,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the large synthetic research document
    #[command(alias = "gen")]
    Generate {
        /// Output path for the generated PDF
        #[arg(long)]
        document: Option<PathBuf>,

        /// Number of passes over the section catalog
        #[arg(long)]
        cycles: Option<usize>,

        /// Copies of each expanded paragraph per section
        #[arg(long)]
        repetitions: Option<usize>,

        /// Alternate section catalog (TOML file)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Split a document into single-page files
    Split {
        /// Source document (default: the generated document path)
        #[arg(long)]
        document: Option<PathBuf>,

        /// Directory for the page files
        #[arg(long)]
        pages_dir: Option<PathBuf>,
    },

    /// Extract text and token estimates from page files
    #[command(alias = "x")]
    Extract {
        /// Directory holding the page files
        #[arg(long)]
        pages_dir: Option<PathBuf>,

        /// Directory for the extracted text files
        #[arg(long)]
        text_dir: Option<PathBuf>,

        /// Characters-per-token ratio for the token estimate
        #[arg(long)]
        chars_per_token: Option<f64>,
    },

    /// Run the full generate, split, extract pipeline
    Run {
        /// Output path for the generated PDF
        #[arg(long)]
        document: Option<PathBuf>,

        /// Number of passes over the section catalog
        #[arg(long)]
        cycles: Option<usize>,

        /// Copies of each expanded paragraph per section
        #[arg(long)]
        repetitions: Option<usize>,

        /// Alternate section catalog (TOML file)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Directory for the page files
        #[arg(long)]
        pages_dir: Option<PathBuf>,

        /// Directory for the extracted text files
        #[arg(long)]
        text_dir: Option<PathBuf>,
    },

    /// Check availability of the remote and local model endpoints
    Probe {
        /// Which endpoints to check
        #[arg(long, short, value_enum, default_value_t = ProbeTarget::All)]
        target: ProbeTarget,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Print all available environment variables
fn print_env_vars() {
    println!("ctxkit - Environment Variables");
    println!();
    println!("Tokens:");
    println!("  HF_TOKEN                    HuggingFace API token used by the probes");
    println!("  NEXT_PUBLIC_HF_TOKEN        Fallback HuggingFace token variable");
    println!();
    println!("Configuration Overrides (CTXKIT_<SECTION>__<KEY>):");
    println!("  CTXKIT_DOCUMENT__CYCLES          Catalog passes for generate (default: 20)");
    println!("  CTXKIT_DOCUMENT__REPETITIONS     Paragraph copies per section (default: 200)");
    println!("  CTXKIT_SPLIT__PAGES_DIR          Directory for single-page files (default: pdf_pages)");
    println!("  CTXKIT_EXTRACT__TEXT_DIR         Directory for extracted text (default: pdf_text)");
    println!("  CTXKIT_EXTRACT__CHARS_PER_TOKEN  Token-estimate ratio (default: 3.8)");
    println!();
    println!("Other Settings:");
    println!("  CTXKIT_QUIET                Suppress progress output");
    println!("  RUST_LOG                    Rust logging level (e.g., debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export CTXKIT_DOCUMENT__CYCLES=\"2\"");
    println!("  export HF_TOKEN=\"hf_...\"");
    std::process::exit(0);
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Show environment variables and exit if requested
    if cli.env {
        print_env_vars();
    }

    // Initialize tracing based on verbosity
    let log_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let env_filter = if cli.quiet { "error" } else { log_level };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| format!("ctxkit={}", env_filter)),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = load_or_default(cli.config.as_ref())?;

    let format = resolve_format(cli.output);
    // Keep stdout parseable in JSON mode: module console output off.
    let quiet = cli.quiet || format == OutputFormat::Json;

    // Execute command
    match cli.command {
        Some(Commands::Generate {
            document,
            cycles,
            repetitions,
            catalog,
        }) => {
            apply_document_flags(&mut config.document, document, cycles, repetitions, catalog);
            let catalog = load_catalog(&config.document)?;
            let summary = pdf::build(&catalog, &config.document, quiet)?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }

        Some(Commands::Split {
            document,
            pages_dir,
        }) => {
            if let Some(path) = document {
                config.split.input = path;
            }
            if let Some(dir) = pages_dir {
                config.split.pages_dir = dir;
            }
            let summary = pdf::split(&config.split, quiet)?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }

        Some(Commands::Extract {
            pages_dir,
            text_dir,
            chars_per_token,
        }) => {
            if let Some(dir) = pages_dir {
                config.extract.pages_dir = dir;
            }
            if let Some(dir) = text_dir {
                config.extract.text_dir = dir;
            }
            if let Some(ratio) = chars_per_token {
                config.extract.chars_per_token = ratio;
            }
            let summary = pdf::extract(&config.extract, quiet)?;
            if format == OutputFormat::Json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            }
        }

        Some(Commands::Run {
            document,
            cycles,
            repetitions,
            catalog,
            pages_dir,
            text_dir,
        }) => {
            apply_document_flags(&mut config.document, document, cycles, repetitions, catalog);
            if let Some(dir) = pages_dir {
                config.split.pages_dir = dir;
            }
            if let Some(dir) = text_dir {
                config.extract.text_dir = dir;
            }
            // The stages hand off through the filesystem.
            config.split.input = config.document.output.clone();
            config.extract.pages_dir = config.split.pages_dir.clone();

            let catalog = load_catalog(&config.document)?;

            if !quiet {
                print_section("Generate");
            }
            let build = pdf::build(&catalog, &config.document, quiet)?;

            if !quiet {
                print_section("Split");
            }
            let split = pdf::split(&config.split, quiet)?;

            if !quiet {
                print_section("Extract");
            }
            let extract = pdf::extract(&config.extract, quiet)?;

            if format == OutputFormat::Json {
                let combined = serde_json::json!({
                    "build": build,
                    "split": split,
                    "extract": extract,
                });
                println!("{}", serde_json::to_string_pretty(&combined)?);
            }
        }

        Some(Commands::Probe { target }) => {
            let client = HttpClient::new();
            let mut reports = Vec::new();

            if matches!(target, ProbeTarget::All | ProbeTarget::Huggingface) {
                let probe = HuggingFaceProbe::new(config.probe.clone());
                reports.push(probe.run(&client).await);
            }
            if matches!(target, ProbeTarget::All | ProbeTarget::Inference) {
                let probe = InferenceProbe::new(config.probe.clone());
                reports.push(probe.run(&client).await);
            }

            output_reports(&reports, format)?;
        }

        Some(Commands::Completions { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            clap_complete::generate(shell, &mut cmd, name, &mut std::io::stdout());
        }

        None => {
            // No command provided - show help
            println!("No command provided. Use --help for usage information.");
            println!("Common commands:");
            println!("  generate         - Generate the large research document");
            println!("  split            - Split it into single-page files");
            println!("  extract          - Extract text and token estimates");
            println!("  run              - Full generate, split, extract pipeline");
            println!("  probe            - Check model endpoint availability");
        }
    }

    Ok(())
}

/// Resolve Auto to a concrete format based on the terminal
fn resolve_format(format: OutputFormat) -> OutputFormat {
    if format == OutputFormat::Auto {
        if is_terminal() {
            OutputFormat::Table
        } else {
            OutputFormat::Json
        }
    } else {
        format
    }
}

fn apply_document_flags(
    config: &mut DocumentConfig,
    document: Option<PathBuf>,
    cycles: Option<usize>,
    repetitions: Option<usize>,
    catalog: Option<PathBuf>,
) {
    if let Some(path) = document {
        config.output = path;
    }
    if let Some(cycles) = cycles {
        config.cycles = cycles;
    }
    if let Some(repetitions) = repetitions {
        config.repetitions = repetitions;
    }
    if let Some(path) = catalog {
        config.catalog = Some(path);
    }
}

fn load_catalog(config: &DocumentConfig) -> Result<Catalog> {
    let catalog = match &config.catalog {
        Some(path) => Catalog::from_path(path)?,
        None => Catalog::builtin()?,
    };
    Ok(catalog)
}

fn output_reports(reports: &[ProbeReport], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(reports)?);
        }
        OutputFormat::Plain => {
            for report in reports {
                for check in &report.checks {
                    println!(
                        "{} {} {} ({} ms)",
                        check.name, check.url, check.health, check.elapsed_ms
                    );
                }
                println!(
                    "{}: {}",
                    report.probe,
                    if report.ready { "ready" } else { "not ready" }
                );
            }
        }
        OutputFormat::Table | OutputFormat::Auto => {
            for report in reports {
                print_report_table(report);
            }
        }
    }
    Ok(())
}

fn print_report_table(report: &ProbeReport) {
    use comfy_table::{Attribute, Cell, Table};

    print_section(&format!("Probe: {}", report.probe));

    let url_width = terminal_width().saturating_sub(50).clamp(24, 60);
    let mut table = Table::new();
    table.load_preset(comfy_table::presets::UTF8_FULL);
    table.set_header(vec!["Endpoint", "URL", "Status", "Latency"]);

    for check in &report.checks {
        table.add_row(vec![
            Cell::new(&check.name).add_attribute(Attribute::Bold),
            Cell::new(truncate_with_ellipsis(&check.url, url_width)),
            Cell::new(check.health.to_string()),
            Cell::new(format!("{} ms", check.elapsed_ms)),
        ]);
    }
    println!("{table}");

    for note in &report.notes {
        print_status(Status::Info, note);
    }

    for (kind, label) in [
        (CheckKind::Auth, "Authentication"),
        (CheckKind::AvatarSpace, "Avatar endpoints"),
        (CheckKind::TtsModel, "TTS models"),
        (CheckKind::Inference, "Inference endpoints"),
    ] {
        let total = report.total_of(kind);
        if total > 0 {
            println!(
                "{} ({}/{} available)",
                label,
                report.available_of(kind),
                total
            );
        }
    }

    if report.ready {
        print_status(Status::Success, &format!("{}: system ready", report.probe));
    } else {
        print_status(
            Status::Warning,
            &format!("{}: system not fully ready", report.probe),
        );
    }
}
