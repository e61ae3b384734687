//! Command implementations for the tvcat CLI.
//!
//! Each command module provides:
//! - Args struct for clap argument parsing
//! - execute() function that performs the command
//! - Human-readable and JSON output formatting

pub mod create;
pub mod delete;
pub mod list;
pub mod show;
pub mod update;

use anyhow::Result;
use catalog_core::Tv;
use colored::Colorize;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;

/// Header carrying the user id on dev-identity servers.
const DEV_IDENTITY_HEADER: &str = "x-user-id";

/// Common error type for HTTP requests.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Version conflict: you sent version {submitted}, the server has {stored}")]
    VersionConflict { submitted: u64, stored: u64 },
}

/// Build an HTTP client carrying the caller identity.
pub fn build_client(token: Option<&str>, user: Option<&str>) -> Result<reqwest::Client> {
    let mut headers = HeaderMap::new();

    if let Some(token) = token {
        let value = HeaderValue::from_str(&format!("Bearer {}", token))
            .map_err(|e| anyhow::anyhow!("Invalid token value: {}", e))?;
        headers.insert(AUTHORIZATION, value);
    }
    if let Some(user) = user {
        let value = HeaderValue::from_str(user)
            .map_err(|e| anyhow::anyhow!("Invalid user value: {}", e))?;
        headers.insert(HeaderName::from_static(DEV_IDENTITY_HEADER), value);
    }

    Ok(reqwest::Client::builder().default_headers(headers).build()?)
}

/// Print output in JSON or human-readable format.
pub fn output<T: Serialize + HumanReadable>(value: &T, human: bool) -> Result<()> {
    if human {
        value.print_human();
    } else {
        println!("{}", serde_json::to_string_pretty(value)?);
    }
    Ok(())
}

/// Trait for types that can be printed in human-readable format.
pub trait HumanReadable {
    fn print_human(&self);
}

impl HumanReadable for Tv {
    fn print_human(&self) {
        let smart = if self.is_smart {
            "smart".green()
        } else {
            "non-smart".normal()
        };
        println!("  {} {} {}", self.manufacturer.bold(), self.model, smart);
        println!("    {} {}", "ID:".cyan(), self.id);
        println!("    {} {:.2}", "Price:".cyan(), self.price);
        println!(
            "    {} {}",
            "Fabricated:".cyan(),
            self.fabrication_date.format("%Y-%m-%d")
        );
        println!("    {} {}", "Version:".cyan(), self.version);
    }
}

/// Send a request and fail on any non-success status.
pub async fn send_request(request: reqwest::RequestBuilder) -> Result<reqwest::Response, CliError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    Err(server_error(status.as_u16(), &body))
}

/// Make an HTTP request and decode its JSON body.
pub async fn make_request<T: serde::de::DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, CliError> {
    let response = send_request(request).await?;
    Ok(response.json::<T>().await?)
}

/// Turn an error response body into a [`CliError`].
fn server_error(status: u16, body: &str) -> CliError {
    let Ok(json) = serde_json::from_str::<serde_json::Value>(body) else {
        return CliError::Server {
            status,
            message: body.to_string(),
        };
    };

    if json.get("versionError").and_then(|v| v.as_bool()) == Some(true) {
        let version = |key: &str| json.get(key).and_then(|v| v.as_u64()).unwrap_or_default();
        return CliError::VersionConflict {
            submitted: version("submittedVersion"),
            stored: version("storedVersion"),
        };
    }

    let message = json
        .pointer("/error/message")
        .or_else(|| json.get("message"))
        .and_then(|v| v.as_str())
        .unwrap_or(body)
        .to_string();
    CliError::Server { status, message }
}
