mod config;
mod neighbors_cmd;
mod output;
mod view_cmd;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use neighbors_cmd::NeighborsArgs;
use output::OutputFormat;
use view_cmd::ScopeArg;

#[derive(Parser)]
#[command(name = "tscope", about = "Inspect agent transcripts as outlines and detail rows")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the reduced outline of a transcript (.json or .jsonl)
    Outline {
        file: PathBuf,

        /// Mark the outline row the detail list would select at this event id
        #[arg(long)]
        at: Option<String>,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Print every detail row, honoring detail collapse state
    Detail {
        file: PathBuf,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Collapse or expand a node and remember it for this transcript
    Toggle {
        file: PathBuf,

        /// Node id to flip
        id: String,

        #[arg(long, value_enum, default_value = "outline")]
        scope: ScopeArg,
    },

    /// Resolve the previous/next item around an id in a server listing
    Neighbors {
        /// Item id to locate
        id: String,

        /// Listing location on the server
        #[arg(long)]
        location: String,

        #[arg(long)]
        filter: Option<String>,

        /// Listing order (defaults to the configured ordering)
        #[arg(long)]
        order: Option<String>,

        /// Server base URL (defaults to the configured server)
        #[arg(long)]
        server: Option<String>,

        #[arg(long)]
        page_size: Option<usize>,

        /// Stop paging after this many pages
        #[arg(long, default_value_t = 20)]
        max_pages: usize,

        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show or set configuration
    Config {
        /// Set the listing server URL
        #[arg(long)]
        server: Option<String>,

        /// Set the listing page size
        #[arg(long)]
        page_size: Option<usize>,

        /// Start with every expandable node collapsed
        #[arg(long)]
        default_collapsed: Option<bool>,

        /// Set the sticky header offset in pixels
        #[arg(long)]
        offset_px: Option<f32>,

        /// Set where collapse state is stored
        #[arg(long)]
        collapse_store_dir: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Outline { file, at, format } => {
            view_cmd::run_outline(&file, format, at.as_deref())
        }
        Commands::Detail { file, format } => view_cmd::run_detail(&file, format),
        Commands::Toggle { file, id, scope } => view_cmd::run_toggle(&file, &id, scope),
        Commands::Neighbors {
            id,
            location,
            filter,
            order,
            server,
            page_size,
            max_pages,
            format,
        } => {
            neighbors_cmd::run_neighbors(NeighborsArgs {
                id,
                location,
                filter,
                order,
                server,
                page_size,
                max_pages,
                format,
            })
            .await
        }
        Commands::Config {
            server,
            page_size,
            default_collapsed,
            offset_px,
            collapse_store_dir,
        } => {
            let update = config::ConfigUpdate {
                server,
                page_size,
                default_collapsed,
                offset_px,
                collapse_store_dir,
            };
            if update.is_empty() {
                config::show_config()
            } else {
                config::set_config(update)
            }
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
