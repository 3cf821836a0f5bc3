//! Terminal replacement for the admin panel's upload form.
//!
//! Takes a CSV export of the award sheet (full name, email, points,
//! reason), posts the parsed rows to the reconciliation endpoint in one
//! request and prints the per-row outcomes. Posting the same sheet twice
//! awards the points twice.

use std::{fs::File, io::Read, path::PathBuf, time::Duration};

use anyhow::{bail, Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// CSV export of the award sheet: full name, email, points, reason
    file: PathBuf,

    /// Reconciliation endpoint
    #[arg(long, default_value = "http://localhost:8080/api/ispring-rewards")]
    endpoint: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SheetRow {
    full_name: String,
    email: String,
    points: i64,
    reason: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RowOutcome {
    success: bool,
    full_name: String,
    email: String,
    points: i64,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Deserialize)]
struct RewardsResponse {
    results: Vec<RowOutcome>,
}

#[derive(Deserialize)]
struct ErrorResponse {
    error: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file = File::open(&args.file)
        .with_context(|| format!("Failed to open {}", args.file.display()))?;
    let rows = parse_rows(file)?;

    if rows.is_empty() {
        bail!("No usable rows in {}", args.file.display());
    }

    println!("Parsed rows: {}\n", rows.len());

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::with_template("{spinner:.green} {msg}").unwrap());
    pb.set_message(format!("Submitting {} rows...", rows.len()));
    pb.enable_steady_tick(Duration::from_millis(100));

    let response = Client::new()
        .post(&args.endpoint)
        .json(&json!({ "rows": rows }))
        .send()
        .await
        .context("Request to the reconciliation endpoint failed")?;

    pb.finish_and_clear();

    let status = response.status();
    if !status.is_success() {
        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|e| e.error)
            .unwrap_or_else(|_| status.to_string());
        bail!("Upload failed: {message}");
    }

    let data: RewardsResponse = response
        .json()
        .await
        .context("Endpoint returned an unreadable response")?;

    report(&data.results);

    Ok(())
}

/// The first row is the sheet header. Rows missing a name or an email are
/// skipped, a points cell that does not parse counts as 0.
fn parse_rows<R: Read>(reader: R) -> Result<Vec<SheetRow>> {
    let mut csv = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut rows = Vec::new();

    for record in csv.records() {
        let record = record.context("Malformed CSV record")?;

        let full_name = record.get(0).unwrap_or("").trim().to_string();
        let email = record.get(1).unwrap_or("").trim().to_string();

        if full_name.is_empty() || email.is_empty() {
            continue;
        }

        rows.push(SheetRow {
            full_name,
            email,
            points: record.get(2).unwrap_or("").trim().parse().unwrap_or(0),
            reason: record.get(3).unwrap_or("").trim().to_string(),
        });
    }

    Ok(rows)
}

fn report(results: &[RowOutcome]) {
    let mut succeeded = 0;
    let mut failed = 0;

    for outcome in results {
        if outcome.success {
            succeeded += 1;
            println!(
                "ok    {} <{}>  {:+}",
                outcome.full_name, outcome.email, outcome.points
            );
        } else {
            failed += 1;
            println!(
                "fail  {} <{}>  {}",
                outcome.full_name,
                outcome.email,
                outcome.error.as_deref().unwrap_or("unknown error")
            );
        }
    }

    println!("\nSucceeded: {succeeded}");
    println!("Failed: {failed}");
}
