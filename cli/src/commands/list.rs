//! LIST command - List your TVs.

use anyhow::Result;
use catalog_core::{QueryPage, Tv};
use clap::{Args, ValueEnum};
use colored::Colorize;

use super::{HumanReadable, make_request, output};

/// Arguments for the list command.
///
/// The server applies one mode per call: page+limit, else search, else the
/// date/type filters.
#[derive(Args)]
pub struct ListArgs {
    /// Page number (1-based); needs --limit
    #[arg(long, requires = "limit")]
    pub page: Option<u32>,

    /// Page size; needs --page
    #[arg(long, requires = "page")]
    pub limit: Option<u32>,

    /// Case-insensitive match on manufacturer or model
    #[arg(long)]
    pub search: Option<String>,

    /// Earliest fabrication date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub start_date: Option<String>,

    /// Latest fabrication date (YYYY-MM-DD or RFC 3339)
    #[arg(long)]
    pub end_date: Option<String>,

    /// Only smart or only non-smart TVs
    #[arg(long = "type", value_enum)]
    pub kind: Option<KindArg>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum KindArg {
    Smart,
    #[value(name = "nonSmart")]
    NonSmart,
}

impl KindArg {
    fn as_param(self) -> &'static str {
        match self {
            Self::Smart => "smart",
            Self::NonSmart => "nonSmart",
        }
    }
}

impl ListArgs {
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = Vec::new();
        if let Some(page) = self.page {
            query.push(("page", page.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit", limit.to_string()));
        }
        if let Some(search) = &self.search {
            query.push(("search", search.clone()));
        }
        if let Some(start) = &self.start_date {
            query.push(("startDate", start.clone()));
        }
        if let Some(end) = &self.end_date {
            query.push(("endDate", end.clone()));
        }
        if let Some(kind) = self.kind {
            query.push(("type", kind.as_param().to_string()));
        }
        query
    }
}

impl HumanReadable for QueryPage<Tv> {
    fn print_human(&self) {
        println!("{}", "Your TVs".green().bold());
        println!("{}", "=".repeat(60));
        println!();

        if self.items.is_empty() {
            println!("  {}", "(No TVs)".dimmed());
            return;
        }

        for tv in &self.items {
            tv.print_human();
            println!();
        }

        println!(
            "  {} {}   {} {}",
            "Shown:".cyan(),
            self.items.len(),
            "Pages:".cyan(),
            self.total_pages
        );
    }
}

/// Execute the list command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: ListArgs,
) -> Result<()> {
    let url = format!("{}/tv", base_url);

    let response: QueryPage<Tv> = make_request(client.get(&url).query(&args.query())).await?;

    output(&response, human)
}
