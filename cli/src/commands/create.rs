//! CREATE command - Add a TV.

use anyhow::Result;
use catalog_core::{Tv, TvDraft};
use clap::{ArgAction, Args};
use colored::Colorize;

use super::{HumanReadable, make_request, output};

/// Arguments for the create command.
#[derive(Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub manufacturer: String,

    #[arg(long)]
    pub model: String,

    /// Whether the TV is a smart TV
    #[arg(long, action = ArgAction::Set)]
    pub smart: bool,

    /// YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub fabrication_date: String,

    #[arg(long)]
    pub price: f64,
}

impl From<CreateArgs> for TvDraft {
    fn from(args: CreateArgs) -> Self {
        TvDraft {
            manufacturer: Some(args.manufacturer),
            model: Some(args.model),
            is_smart: Some(args.smart),
            fabrication_date: Some(args.fabrication_date),
            price: Some(args.price),
            ..TvDraft::default()
        }
    }
}

/// Response wrapper so the human view can announce the creation.
#[derive(serde::Serialize)]
#[serde(transparent)]
struct Created(Tv);

impl HumanReadable for Created {
    fn print_human(&self) {
        println!("{}", "TV created successfully!".green().bold());
        println!();
        self.0.print_human();
    }
}

/// Execute the create command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: CreateArgs,
) -> Result<()> {
    let url = format!("{}/tv", base_url);
    let draft = TvDraft::from(args);

    let tv: Tv = make_request(client.post(&url).json(&draft)).await?;

    output(&Created(tv), human)
}
