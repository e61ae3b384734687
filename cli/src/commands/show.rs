//! SHOW command - Show one TV.

use anyhow::Result;
use catalog_core::{Tv, TvId};
use clap::Args;

use super::{make_request, output};

/// Arguments for the show command.
#[derive(Args)]
pub struct ShowArgs {
    /// TV ID
    pub id: TvId,
}

/// Execute the show command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ShowArgs,
) -> Result<()> {
    let url = format!("{}/tv/{}", base_url, args.id);

    let tv: Tv = make_request(client.get(&url)).await?;

    output(&tv, human)
}
