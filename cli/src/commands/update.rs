//! UPDATE command - Change a TV.
//!
//! Fetches the current record, overlays the given fields and sends the full
//! record back. The version sent is the one just fetched unless `--version`
//! pins it, so a concurrent change made elsewhere surfaces as a conflict.

use anyhow::Result;
use catalog_core::{Tv, TvDraft, TvId};
use clap::{ArgAction, Args};
use colored::Colorize;

use super::{HumanReadable, make_request, output};

/// Arguments for the update command.
#[derive(Args)]
pub struct UpdateArgs {
    /// TV ID to update
    pub id: TvId,

    #[arg(long)]
    pub manufacturer: Option<String>,

    #[arg(long)]
    pub model: Option<String>,

    #[arg(long, action = ArgAction::Set)]
    pub smart: Option<bool>,

    /// YYYY-MM-DD or RFC 3339
    #[arg(long)]
    pub fabrication_date: Option<String>,

    #[arg(long)]
    pub price: Option<f64>,

    /// Version you based this change on (default: the current one)
    #[arg(long)]
    pub version: Option<u64>,
}

impl UpdateArgs {
    /// The full replacement body for `current`.
    fn overlay(self, current: &Tv) -> TvDraft {
        let base = TvDraft::from(current);
        TvDraft {
            id: Some(current.id),
            manufacturer: self.manufacturer.or(base.manufacturer),
            model: self.model.or(base.model),
            is_smart: self.smart.or(base.is_smart),
            fabrication_date: self.fabrication_date.or(base.fabrication_date),
            price: self.price.or(base.price),
            version: self.version.or(base.version),
        }
    }
}

#[derive(serde::Serialize)]
#[serde(transparent)]
struct Updated(Tv);

impl HumanReadable for Updated {
    fn print_human(&self) {
        println!("{}", "TV updated successfully!".green().bold());
        println!();
        self.0.print_human();
    }
}

/// Execute the update command.
pub async fn execute(
    client: &reqwest::Client,
    base_url: &str,
    human: bool,
    args: UpdateArgs,
) -> Result<()> {
    let url = format!("{}/tv/{}", base_url, args.id);

    let current: Tv = make_request(client.get(&url)).await?;
    let draft = args.overlay(&current);

    let tv: Tv = make_request(client.put(&url).json(&draft)).await?;

    output(&Updated(tv), human)
}

#[cfg(test)]
mod tests {
    use super::*;
    use catalog_core::OwnerId;

    fn current() -> Tv {
        let fields = TvDraft {
            manufacturer: Some("LG".into()),
            model: Some("32LWG6000".into()),
            is_smart: Some(false),
            fabrication_date: Some("2020-07-08".into()),
            price: Some(299.0),
            ..TvDraft::default()
        }
        .validate()
        .unwrap();
        Tv::from_fields(TvId::new(), OwnerId::new("me"), fields, 3)
    }

    fn args(id: TvId) -> UpdateArgs {
        UpdateArgs {
            id,
            manufacturer: None,
            model: None,
            smart: None,
            fabrication_date: None,
            price: None,
            version: None,
        }
    }

    #[test]
    fn test_overlay_keeps_unset_fields_and_current_version() {
        let tv = current();
        let draft = UpdateArgs {
            price: Some(249.0),
            ..args(tv.id)
        }
        .overlay(&tv);

        assert_eq!(draft.price, Some(249.0));
        assert_eq!(draft.model.as_deref(), Some("32LWG6000"));
        assert_eq!(draft.version, Some(3));
        assert_eq!(draft.id, Some(tv.id));
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_overlay_pinned_version() {
        let tv = current();
        let draft = UpdateArgs {
            version: Some(1),
            ..args(tv.id)
        }
        .overlay(&tv);
        assert_eq!(draft.version, Some(1));
    }
}
