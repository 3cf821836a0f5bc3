//! Gamification points submitter.
//!
//! A separate credential convention from the directory: the award endpoint
//! takes the token itself as the `Authorization` value, without a
//! `Bearer ` prefix.

use reqwest::{
    header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
    Client,
};
use thiserror::Error;
use tracing::{debug, error};

use crate::config::Config;

/// Upstream bodies are truncated to this many characters in error messages.
const BODY_PREVIEW_LIMIT: usize = 100;

/// Caught per row by the reconciliation loop, never fatal to a batch.
#[derive(Error, Debug)]
pub enum AwardError {
    #[error("Award request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to add reward ({status}): {body}...")]
    Rejected { status: u16, body: String },
}

// Values are interpolated verbatim, the endpoint does not take XML-escaped
// text in these elements.
fn award_body(user_id: &str, amount: i64, reason: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<awardGamificationPoints>
    <userId>{user_id}</userId>
    <amount>{amount}</amount>
    <reason>{reason}</reason>
</awardGamificationPoints>"#
    )
}

fn truncate(body: &str, limit: usize) -> String {
    body.chars().take(limit).collect()
}

pub async fn award(
    http: &Client,
    config: &Config,
    token: &str,
    user_id: &str,
    amount: i64,
    reason: &str,
) -> Result<(), AwardError> {
    let url = format!("{}/gamification/points/award", config.learn_base_url);

    debug!("Awarding {amount} points to user {user_id}");

    let response = http
        .post(&url)
        .header(AUTHORIZATION, token)
        .header(CONTENT_TYPE, "application/xml")
        .header(ACCEPT, "application/xml")
        .body(award_body(user_id, amount, reason))
        .send()
        .await?;

    let status = response.status();
    let body = response.text().await.unwrap_or_default();

    debug!("Award response status {status}: {}", truncate(&body, 200));

    if !status.is_success() {
        error!("Award failed for user {user_id} ({status}): {body}");
        return Err(AwardError::Rejected {
            status: status.as_u16(),
            body: truncate(&body, BODY_PREVIEW_LIMIT),
        });
    }

    Ok(())
}
