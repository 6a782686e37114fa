use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use downloads_galaxy::scanner::Scanner;
use downloads_galaxy::server;
use downloads_galaxy::settings::{default_root, expand_path, resolve_root, Settings};

#[derive(Parser)]
#[command(name = "downloads-galaxy")]
#[command(about = "Browse a folder's files, grouped and sized, in your web browser", long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    serve: ServeArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the web viewer (the default)
    Serve(ServeArgs),
    /// Scan once and print the result as JSON
    Scan(ScanArgs),
}

#[derive(Args)]
struct TargetArgs {
    /// Folder to index (default: your Downloads folder)
    folder: Option<PathBuf>,

    /// Path to settings file
    #[arg(short = 'c', long)]
    config: Option<String>,
}

#[derive(Args)]
struct ServeArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Port to listen on
    #[arg(short, long, env = "PORT")]
    port: Option<u16>,

    /// Directory holding the viewer page and other static files
    #[arg(long)]
    static_dir: Option<PathBuf>,
}

#[derive(Args)]
struct ScanArgs {
    #[command(flatten)]
    target: TargetArgs,

    /// Pretty-print the JSON output
    #[arg(long)]
    pretty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Logs go to stderr so `scan` output stays valid JSON
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "downloads_galaxy=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match cli.command {
        None => run_server(cli.serve).await,
        Some(Commands::Serve(args)) => run_server(args).await,
        Some(Commands::Scan(args)) => run_scan(args).await,
    }
}

fn load_settings(target: &TargetArgs) -> Result<Settings> {
    let settings_path = if let Some(config) = &target.config {
        PathBuf::from(shellexpand::tilde(config).to_string())
    } else {
        Settings::default_path()
    };

    Settings::load(&settings_path).context("Failed to load settings")
}

async fn run_server(args: ServeArgs) -> Result<()> {
    let settings = load_settings(&args.target)?;
    let folder = args.target.folder.unwrap_or_else(default_root);

    println!("\n🌌 Downloads Galaxy Server");
    println!("{}", "=".repeat(40));
    println!("📂 Scanning: {}", expand_path(&folder).display());

    let root = resolve_root(&folder)?;

    let config = settings.server_config(args.port, args.static_dir);

    println!("🌐 Open http://localhost:{} in your browser", config.addr.port());
    println!("⌨️  Press Ctrl+C to stop\n");

    server::serve(settings.scan_options(root), config).await?;

    println!("\n\n👋 Server stopped");
    Ok(())
}

async fn run_scan(args: ScanArgs) -> Result<()> {
    let settings = load_settings(&args.target)?;
    let folder = args.target.folder.unwrap_or_else(default_root);
    let root = resolve_root(&folder)?;

    let scanner = Scanner::new(settings.scan_options(root));
    // Scan in a blocking thread to not block the tokio runtime
    let result = tokio::task::spawn_blocking(move || scanner.scan()).await?;

    let json = if args.pretty {
        serde_json::to_string_pretty(&result)?
    } else {
        serde_json::to_string(&result)?
    };
    println!("{}", json);

    Ok(())
}
