//! CLI entry point for blogsmith

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use blogsmith::{commands, server, Blog};

#[derive(Parser)]
#[command(name = "blogsmith")]
#[command(version)]
#[command(about = "Content pipeline and local admin server for a Markdown blog", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short = 'C', long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write rss.xml, sitemap.xml, robots.txt, search.json and categories.json
    #[command(alias = "b")]
    Build {
        /// Rebuild when posts or the config change
        #[arg(short, long)]
        watch: bool,
    },

    /// Start the admin server
    #[command(alias = "s")]
    Serve {
        /// Port to listen on (defaults to admin_port from the config)
        #[arg(short, long)]
        port: Option<u16>,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,
    },

    /// List posts or categories
    List {
        /// Type of content to list (posts, categories)
        #[arg(default_value = "posts")]
        r#type: String,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// File name stem (defaults to the title)
        #[arg(short, long)]
        slug: Option<String>,

        /// Category, may be repeated
        #[arg(short, long = "category")]
        categories: Vec<String>,
    },

    /// Rename or delete a category in every post
    Category {
        #[command(subcommand)]
        action: CategoryAction,
    },

    /// Commit and push the site repository
    Publish {
        /// Commit message
        #[arg(short, long)]
        message: Option<String>,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// Rename a category (merging into an existing one is allowed)
    Rename { from: String, to: String },
    /// Remove a category from every post
    Delete { name: String },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.debug {
        "blogsmith=debug,tower_http=debug,info"
    } else {
        "blogsmith=info"
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
    let blog = Blog::new(&base_dir)?;

    match cli.command {
        Commands::Build { watch } => {
            tracing::info!("Building views...");
            commands::build::run(&blog)?;
            println!("Built successfully!");

            if watch {
                commands::build::watch(&blog)?;
            }
        }

        Commands::Serve { port, ip } => {
            let port = port.unwrap_or(blog.config.admin_port);
            tracing::info!("Starting admin server at http://{}:{}", ip, port);
            server::start(&blog, &ip, port).await?;
        }

        Commands::List { r#type } => {
            commands::list::run(&blog, &r#type)?;
        }

        Commands::New {
            title,
            slug,
            categories,
        } => {
            tracing::info!("Creating new post with title: {}", title);
            commands::new::create_post(&blog, &title, slug.as_deref(), &categories)?;
        }

        Commands::Category { action } => match action {
            CategoryAction::Rename { from, to } => {
                commands::category::rename(&blog, &from, &to)?;
            }
            CategoryAction::Delete { name } => {
                commands::category::delete(&blog, &name)?;
            }
        },

        Commands::Publish { message } => {
            commands::publish::run(&blog, message.as_deref()).await?;
        }
    }

    Ok(())
}
