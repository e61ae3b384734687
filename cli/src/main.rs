//! Command-line client for the TV catalog.
//!
//! Commands:
//! - list: List your TVs (paginate, search, or filter)
//! - show: Show one TV
//! - create: Add a TV
//! - update: Change a TV (optimistic concurrency on its version)
//! - delete: Remove a TV
//!
//! Configuration via environment:
//! - TVCAT_URL: Base URL of the catalog server (default: http://localhost:8000)
//! - TVCAT_TOKEN: JWT Bearer token for authentication
//! - TVCAT_USER: User id sent as X-User-Id (servers in dev identity mode)

mod commands;

use clap::{Parser, Subcommand};

use commands::{
    create::CreateArgs, delete::DeleteArgs, list::ListArgs, show::ShowArgs, update::UpdateArgs,
};

/// TV catalog CLI
///
/// JSON output by default; --human for formatted output.
#[derive(Parser)]
#[command(name = "tvcat")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Output human-readable formatted text instead of JSON
    #[arg(long, global = true)]
    human: bool,

    /// Catalog server URL
    #[arg(
        long,
        env = "TVCAT_URL",
        default_value = "http://localhost:8000",
        global = true
    )]
    url: String,

    /// JWT Bearer token for authentication
    #[arg(long, env = "TVCAT_TOKEN", global = true)]
    token: Option<String>,

    /// User id for servers running with ALLOW_DEV_IDENTITY
    #[arg(long, env = "TVCAT_USER", global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List your TVs
    List(ListArgs),

    /// Show one TV
    Show(ShowArgs),

    /// Add a TV
    Create(CreateArgs),

    /// Change a TV
    Update(UpdateArgs),

    /// Delete a TV
    Delete(DeleteArgs),
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let client = match commands::build_client(cli.token.as_deref(), cli.user.as_deref()) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let base_url = cli.url.trim_end_matches('/');
    let result = match cli.command {
        Commands::List(args) => commands::list::execute(&client, base_url, cli.human, args).await,
        Commands::Show(args) => commands::show::execute(&client, base_url, cli.human, args).await,
        Commands::Create(args) => {
            commands::create::execute(&client, base_url, cli.human, args).await
        }
        Commands::Update(args) => {
            commands::update::execute(&client, base_url, cli.human, args).await
        }
        Commands::Delete(args) => {
            commands::delete::execute(&client, base_url, cli.human, args).await
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
