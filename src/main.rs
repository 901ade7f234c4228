//! CLI entry point for innstastay

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "innstastay")]
#[command(version)]
#[command(about = "Server-rendered hotel marketing and booking-comparison site", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output (includes raw upstream rate payloads)
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the site server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long)]
        ip: Option<String>,
    },

    /// Render a single page to stdout or a file
    Render {
        /// Page slug to render
        slug: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate the content graph (dangling references, cycles, unknown blocks)
    Check,

    /// List store content
    List {
        /// Type of content to list (page, fragment)
        #[arg(default_value = "page")]
        r#type: String,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "innstastay=debug,info"
    } else {
        "innstastay=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Determine base directory
    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    match cli.command {
        Commands::Serve { port, ip } => {
            let app = innstastay::InnstaStay::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| app.config.server.ip.clone());
            let port = port.unwrap_or(app.config.server.port);

            let store = app.open_store()?;
            let state = Arc::new(innstastay::server::ServerState::new(
                app.config.clone(),
                store,
                cli.debug,
            )?);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            innstastay::server::start(state, &ip, port).await?;
        }

        Commands::Render { slug, output } => {
            let app = innstastay::InnstaStay::new(&base_dir)?;
            tracing::info!("Rendering page: {}", slug);
            innstastay::commands::render::run(&app, &slug, output.as_deref()).await?;
        }

        Commands::Check => {
            let app = innstastay::InnstaStay::new(&base_dir)?;
            tracing::info!("Checking content graph...");
            innstastay::commands::check::run(&app).await?;
        }

        Commands::List { r#type } => {
            let app = innstastay::InnstaStay::new(&base_dir)?;
            innstastay::commands::list::run(&app, &r#type).await?;
        }

        Commands::Version => {
            println!("innstastay version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
