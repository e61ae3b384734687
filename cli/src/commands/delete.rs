//! DELETE command - Remove a TV.

use anyhow::Result;
use catalog_core::TvId;
use clap::Args;
use colored::Colorize;
use serde::Serialize;

use super::{HumanReadable, output, send_request};

/// Arguments for the delete command.
#[derive(Args)]
pub struct DeleteArgs {
    /// TV ID to delete
    pub id: TvId,

    /// Skip confirmation prompt (for non-interactive use)
    #[arg(long, short = 'y')]
    pub yes: bool,
}

/// Printed after a successful delete; the server answers 204 with no body.
#[derive(Debug, Serialize)]
pub struct Deleted {
    pub id: TvId,
    pub deleted: bool,
}

impl HumanReadable for Deleted {
    fn print_human(&self) {
        println!("{}", "TV deleted successfully!".green().bold());
        println!();
        println!("  {} {}", "ID:".cyan(), self.id);
    }
}

/// Execute the delete command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: DeleteArgs,
) -> Result<()> {
    // Confirmation prompt for interactive use
    if human && !args.yes {
        eprint!(
            "{} Are you sure you want to delete TV {}? [y/N] ",
            "Warning:".yellow().bold(),
            args.id
        );

        use std::io::Write;
        std::io::stderr().flush()?;

        let mut input = String::new();
        std::io::stdin().read_line(&mut input)?;

        if !input.trim().eq_ignore_ascii_case("y") {
            eprintln!("Aborted.");
            return Ok(());
        }
    }

    let url = format!("{}/tv/{}", base_url, args.id);

    send_request(client.delete(&url)).await?;

    output(
        &Deleted {
            id: args.id,
            deleted: true,
        },
        human,
    )
}
