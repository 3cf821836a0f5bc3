//! # Reconciliation
//!
//! Matches uploaded sheet rows to directory users by email and posts one
//! award per match. Best effort by design: a bad email in row 50 must not
//! block the other rows, so award failures are recorded in that row's
//! outcome and the loop moves on. Only token exchange and the directory
//! fetch abort a batch.
//!
//! Each run re-authenticates and re-fetches the directory, the email map
//! lives only for the duration of one request. Re-posting the same sheet
//! awards the same points again, there is no idempotency key.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::{
    award,
    directory::{self, DirectoryUser},
    error::AppError,
    state::AppState,
};

pub const USER_NOT_FOUND: &str = "Пользователь не найден или неактивен";

/// One parsed spreadsheet row. The email is the join key, the full name is
/// display only.
#[derive(Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct SheetRow {
    pub full_name: String,
    pub email: String,
    pub points: i64,
    #[serde(default)]
    pub reason: String,
}

#[derive(Serialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RowOutcome {
    pub success: bool,
    pub full_name: String,
    pub email: String,
    pub points: i64,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl RowOutcome {
    fn success(row: SheetRow) -> Self {
        Self {
            success: true,
            full_name: row.full_name,
            email: row.email,
            points: row.points,
            reason: row.reason,
            error: None,
        }
    }

    fn failure(row: SheetRow, error: String) -> Self {
        Self {
            success: false,
            error: Some(error),
            ..Self::success(row)
        }
    }
}

/// Runs one batch. Returns exactly one outcome per input row, in input
/// order.
pub async fn run(state: &AppState, rows: Vec<SheetRow>) -> Result<Vec<RowOutcome>, AppError> {
    let token = directory::access_token(&state.http, &state.config).await?;
    let users = directory::active_users(&state.http, &state.config, &token).await?;

    info!(
        "Matching {} rows against {} directory users",
        rows.len(),
        users.len()
    );

    let by_email: HashMap<String, DirectoryUser> = users
        .into_iter()
        .map(|user| (user.email.to_lowercase(), user))
        .collect();

    let mut results = Vec::with_capacity(rows.len());

    for row in rows {
        let email = row.email.to_lowercase().trim().to_string();

        let Some(user) = by_email.get(&email) else {
            warn!("No directory match for {}", row.email);
            results.push(RowOutcome::failure(row, USER_NOT_FOUND.to_string()));
            continue;
        };

        match award::award(
            &state.http,
            &state.config,
            &token,
            &user.user_id,
            row.points,
            &row.reason,
        )
        .await
        {
            Ok(()) => results.push(RowOutcome::success(row)),
            Err(e) => {
                warn!("Award failed for {}: {e}", row.email);
                results.push(RowOutcome::failure(row, e.to_string()));
            }
        }
    }

    Ok(results)
}
