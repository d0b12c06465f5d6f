mod settings;

use std::{
    fs,
    io::IsTerminal,
    path::{Path, PathBuf},
    process::ExitCode,
};

use aibom_tools_core::{
    aggregate, collect_scans, load_policy_file, normalize_type_filter, render_report,
    report::timestamp_now, CanonicalType, ConfigurationError, FileTargetProvider, OutputFormat,
    PolicyFormatError, PolicyOutcome, RenderOptions, Report, Target, TargetOutcome,
    TargetRetrievalError,
};
use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use settings::Settings;
use tracing_subscriber::{filter::LevelFilter, EnvFilter};

#[derive(Parser, Debug)]
#[command(
    name = "aibom-tools",
    author,
    version,
    about = "AI Bill of Materials aggregation CLI"
)]
struct Cli {
    /// Inventory directory containing targets.json and aiboms/<target id>.json
    #[arg(long, value_name = "DIR", global = true)]
    inventory: Option<PathBuf>,

    /// Organization the targets belong to (shown in the scan banner)
    #[arg(long = "org-id", value_name = "ID", global = true)]
    org_id: Option<String>,

    /// Group the targets belong to (takes precedence over --org-id in the banner)
    #[arg(long = "group-id", value_name = "ID", global = true)]
    group_id: Option<String>,

    /// Settings file (TOML, YAML or JSON); AIBOM_TOOLS_* variables override it
    #[arg(long, value_name = "FILE", global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging and print full error chains
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Aggregate the AI-BOMs of every supported target and report on them
    Scan(ScanArgs),
    /// List the component type names accepted by --include
    ListTypes {
        /// Emit types as JSON instead of human-readable text
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args, Debug, Default)]
struct ScanArgs {
    /// Write the raw AI-BOMs of all scanned targets to this JSON file
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Write an HTML report to this file
    #[arg(long, value_name = "FILE")]
    html: Option<PathBuf>,

    /// Comma-separated component types to include (e.g. 'ML Model,Application,Library')
    #[arg(short, long, value_name = "TYPES")]
    include: Option<String>,

    /// Policy document listing rejected model names under `reject`
    #[arg(long, value_name = "FILE")]
    policy: Option<PathBuf>,

    /// Disable ANSI colors in console output
    #[arg(long)]
    no_color: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let settings = Settings::load(cli.config.as_deref());
    let debug = cli.debug || settings.as_ref().is_ok_and(|s| s.debug);
    init_tracing(debug);

    let result = match settings {
        Ok(settings) => run(cli, settings).await,
        Err(err) => Err(err.into()),
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err:#}");
            if debug {
                eprintln!("{err:?}");
            }
            ExitCode::from(exit_status(&err))
        }
    }
}

async fn run(mut cli: Cli, settings: Settings) -> Result<()> {
    match cli.command.take().unwrap_or(Commands::Scan(ScanArgs::default())) {
        Commands::Scan(args) => scan(&cli, &settings, args).await,
        Commands::ListTypes { json } => list_types(json),
    }
}

async fn scan(cli: &Cli, settings: &Settings, args: ScanArgs) -> Result<()> {
    // Reject bad input before touching the inventory.
    let include = args.include.or_else(|| settings.include.clone());
    let filter = normalize_type_filter(include.as_deref())?;
    let policy = args
        .policy
        .or_else(|| settings.policy.clone())
        .map(|path| load_policy_file(&path))
        .transpose()?;
    let inventory = settings.resolve_inventory(cli.inventory.clone())?;
    let scope = settings.scope_label(cli.org_id.as_deref(), cli.group_id.as_deref());

    let provider = FileTargetProvider::new(&inventory);
    let batch = collect_scans(
        &provider,
        |targets| print_listing(targets, scope.as_deref()),
        print_outcome,
    )
    .await?;

    println!("\n🎉 Scan Complete!");
    println!("{}", "=".repeat(50));

    let summary = aggregate(&batch.aggregates, filter.as_ref());
    let policy_outcome = policy
        .as_ref()
        .map(|policy| PolicyOutcome::evaluate(&batch.aggregates, policy));
    let report = Report {
        targets: &batch.aggregates,
        summary: &summary,
        policy: policy_outcome.as_ref(),
    };
    let options = RenderOptions {
        color: !args.no_color && std::io::stdout().is_terminal(),
        generated_at: timestamp_now(),
    };

    println!();
    print!("{}", render_report(&report, OutputFormat::Console, &options)?);

    if let Some(path) = &args.output {
        write_report(path, &render_report(&report, OutputFormat::Json, &options)?)?;
        println!("📄 JSON report saved to: {}", path.display());
    }
    if let Some(path) = &args.html {
        write_report(path, &render_report(&report, OutputFormat::Html, &options)?)?;
        println!("🌐 HTML report saved to: {}", path.display());
    }
    Ok(())
}

fn print_listing(targets: &[Target], scope: Option<&str>) {
    match scope {
        Some(scope) => println!("🎯 Found {} total targets in the {scope}.", targets.len()),
        None => println!("🎯 Found {} total targets.", targets.len()),
    }
    let supported = targets.iter().filter(|t| t.is_supported()).count();
    println!("📊 Processing {supported} supported targets...");
}

fn print_outcome(outcome: &TargetOutcome) {
    match outcome {
        TargetOutcome::Scanned {
            target_name,
            components,
        } => println!("  ✅ {target_name}: {components} AI components"),
        TargetOutcome::Failed { target_name } => println!("  ❌ Error scanning {target_name}"),
        TargetOutcome::Skipped { target_name, .. } => {
            println!("  ⏭️  Skipping {target_name} (unsupported type)")
        }
    }
}

fn write_report(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents)
        .with_context(|| format!("failed to write report to {}", path.display()))
}

fn list_types(json: bool) -> Result<()> {
    if json {
        let types: Vec<_> = CanonicalType::FILTERABLE
            .iter()
            .map(|kind| {
                serde_json::json!({
                    "type": kind.internal_id(),
                    "label": kind.plural_label(),
                    "aliases": kind.aliases(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&types)?);
        return Ok(());
    }

    println!(
        "{} component type(s) accepted by --include",
        CanonicalType::FILTERABLE.len()
    );
    for kind in CanonicalType::FILTERABLE {
        println!(
            "- {id:<24} {icon} {label:<13} :: {aliases}",
            id = kind.internal_id(),
            icon = kind.icon(),
            label = kind.plural_label(),
            aliases = kind.aliases().join(", ")
        );
    }
    Ok(())
}

/// 2 configuration, 3 policy format, 4 target retrieval, 1 anything else.
fn exit_status(err: &anyhow::Error) -> u8 {
    for cause in err.chain() {
        if cause.is::<ConfigurationError>() {
            return 2;
        }
        if cause.is::<PolicyFormatError>() {
            return 3;
        }
        if cause.is::<TargetRetrievalError>() {
            return 4;
        }
    }
    1
}

fn init_tracing(debug: bool) {
    let from_env = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter(debug, from_env.as_deref()))
        .with_writer(std::io::stderr)
        .try_init();
}

/// `RUST_LOG` (or `info,tokio=warn`) with `--debug` raising the default level on top.
fn log_filter(debug: bool, from_env: Option<&str>) -> EnvFilter {
    let filter = from_env
        .and_then(|directives| EnvFilter::try_new(directives).ok())
        .unwrap_or_else(|| EnvFilter::new("info,tokio=warn"));
    if debug {
        filter.add_directive(LevelFilter::DEBUG.into())
    } else {
        filter
    }
}
