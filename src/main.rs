//! CLI entry point for folio

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use folio::commands::new::NewPost;

#[derive(Parser)]
#[command(name = "folio")]
#[command(version)]
#[command(about = "Content store and JSON API for a personal portfolio blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List site information
    #[command(alias = "ls")]
    List {
        /// Type of content to list (post, tag, category, series)
        #[arg(default_value = "post")]
        r#type: String,
    },

    /// Show a single post
    Show {
        /// Slug of the post
        slug: String,
    },

    /// Show a series and its posts in order
    Series {
        /// Name of the series
        name: String,
    },

    /// Check every content file and report the ones that fail to load
    Check,

    /// Create a new draft post
    New {
        /// Title of the new post
        title: String,

        /// Short summary
        #[arg(short, long)]
        excerpt: Option<String>,

        /// Category
        #[arg(short = 'C', long)]
        category: Option<String>,

        /// Comma-separated tags
        #[arg(short, long, value_delimiter = ',')]
        tags: Vec<String>,

        /// Series the post belongs to
        #[arg(short, long)]
        series: Option<String>,

        /// Position within the series
        #[arg(short, long, requires = "series")]
        order: Option<i64>,
    },

    /// Serve the content as a JSON API
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to server.port in _config.yml)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to (defaults to server.ip in _config.yml)
        #[arg(short, long)]
        ip: Option<String>,

        /// Disable file watching
        #[arg(long)]
        r#static: bool,
    },

    /// Display version information
    Version,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "folio=debug,info"
    } else {
        "folio=info"
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
        Commands::List { r#type } => {
            let folio = folio::Folio::new(&base_dir)?;
            folio::commands::list::run(&folio, &r#type)?;
        }

        Commands::Show { slug } => {
            let folio = folio::Folio::new(&base_dir)?;
            folio::commands::show::run(&folio, &slug)?;
        }

        Commands::Series { name } => {
            let folio = folio::Folio::new(&base_dir)?;
            folio::commands::series::run(&folio, &name)?;
        }

        Commands::Check => {
            let folio = folio::Folio::new(&base_dir)?;
            folio::commands::check::run(&folio)?;
        }

        Commands::New {
            title,
            excerpt,
            category,
            tags,
            series,
            order,
        } => {
            let folio = folio::Folio::new(&base_dir)?;
            tracing::info!("Creating new post with title: {}", title);
            let new = NewPost {
                title,
                excerpt,
                category,
                tags,
                series,
                series_order: order,
            };
            folio::commands::new::run(&folio, &new)?;
        }

        Commands::Serve { port, ip, r#static } => {
            let folio = folio::Folio::new(&base_dir)?;
            let ip = ip.unwrap_or_else(|| folio.config.server.ip.clone());
            let port = port.unwrap_or(folio.config.server.port);

            tracing::info!("Starting server at http://{}:{}", ip, port);
            folio::server::start(&folio, &ip, port, !r#static).await?;
        }

        Commands::Version => {
            println!("folio version {}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}
