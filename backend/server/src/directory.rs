//! # iSpring directory
//!
//! Read-only client for the LMS user directory.
//!
//! Authentication is a client-credentials grant against the account domain;
//! the listing endpoint lives on a separate API domain and is paged with a
//! fixed page size. The API returns profile attributes as a generic
//! (name, value) field list, which gets folded into a [`FieldIndex`] once
//! per user so email and name lookups are not linear scans.

use std::collections::HashMap;

use reqwest::{header::ACCEPT, Client};
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, error};

use crate::{config::Config, error::AppError};

pub const PAGE_SIZE: u32 = 1000;

const FIELD_EMAIL: &str = "EMAIL";
const FIELD_FIRST_NAME: &str = "FIRST_NAME";
const FIELD_LAST_NAME: &str = "LAST_NAME";

#[derive(Deserialize)]
pub struct ProfileField {
    pub name: String,
    pub value: String,
}

/// Profile field lookup built once per fetched user.
pub struct FieldIndex(HashMap<String, String>);

impl FieldIndex {
    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }
}

impl FromIterator<ProfileField> for FieldIndex {
    fn from_iter<I: IntoIterator<Item = ProfileField>>(iter: I) -> Self {
        Self(iter.into_iter().map(|f| (f.name, f.value)).collect())
    }
}

/// User record as the listing endpoint returns it.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawUser {
    pub user_id: String,
    #[serde(default)]
    pub status: i32,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub department_id: String,
    #[serde(default)]
    pub role_id: String,
    #[serde(default)]
    pub fields: Vec<ProfileField>,
}

/// User record with contact attributes pulled out of the field list.
/// Fetched fresh per reconciliation run, never cached across runs.
pub struct DirectoryUser {
    pub user_id: String,
    pub status: i32,
    pub groups: Vec<String>,
    pub department_id: String,
    pub role_id: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<RawUser> for DirectoryUser {
    fn from(raw: RawUser) -> Self {
        let fields: FieldIndex = raw.fields.into_iter().collect();

        Self {
            email: fields.resolve(FIELD_EMAIL).unwrap_or_default().to_string(),
            first_name: fields
                .resolve(FIELD_FIRST_NAME)
                .unwrap_or_default()
                .to_string(),
            last_name: fields
                .resolve(FIELD_LAST_NAME)
                .unwrap_or_default()
                .to_string(),
            user_id: raw.user_id,
            status: raw.status,
            groups: raw.groups,
            department_id: raw.department_id,
            role_id: raw.role_id,
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserListResponse {
    total_users_number: u32,
    #[serde(default)]
    user_profiles: Vec<RawUser>,
}

pub async fn access_token(http: &Client, config: &Config) -> Result<String, AppError> {
    let url = format!("{}/api/v3/token", config.auth_base_url);
    let params = [
        ("grant_type", "client_credentials"),
        ("client_id", config.client_id.as_str()),
        ("client_secret", config.client_secret.as_str()),
    ];

    let response = http
        .post(&url)
        .header(ACCEPT, "application/json")
        .form(&params)
        .send()
        .await
        .map_err(|e| AppError::Auth(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("Authorization error body: {body}");
        return Err(AppError::Auth(format!("status {status}")));
    }

    let token: TokenResponse = response
        .json()
        .await
        .map_err(|e| AppError::Auth(e.to_string()))?;

    Ok(token.access_token)
}

/// Pages through the full user list. The loop stops once the reported
/// total is covered or a page comes back empty, whichever happens first,
/// so an inconsistent total cannot keep it spinning.
pub async fn active_users(
    http: &Client,
    config: &Config,
    token: &str,
) -> Result<Vec<DirectoryUser>, AppError> {
    let url = format!("{}/api/v2/user/list", config.api_base_url);
    let mut users = Vec::new();
    let mut page: u32 = 1;

    loop {
        debug!("Fetching user page {page}");

        let response = http
            .post(&url)
            .bearer_auth(token)
            .json(&json!({ "page": page, "pageSize": PAGE_SIZE }))
            .send()
            .await
            .map_err(|e| AppError::DirectoryFetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("User list failed on page {page} ({status}): {body}");
            return Err(AppError::DirectoryFetch(format!(
                "status {status} on page {page}"
            )));
        }

        let data: UserListResponse = response
            .json()
            .await
            .map_err(|e| AppError::DirectoryFetch(e.to_string()))?;

        let fetched = data.user_profiles.len();
        users.extend(data.user_profiles.into_iter().map(DirectoryUser::from));

        debug!(
            "Fetched {fetched} users on page {page}, {} in total",
            users.len()
        );

        let expected_pages = data.total_users_number.div_ceil(PAGE_SIZE);
        if page >= expected_pages || fetched == 0 {
            break;
        }

        page += 1;
    }

    Ok(users)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, value: &str) -> ProfileField {
        ProfileField {
            name: name.to_string(),
            value: value.to_string(),
        }
    }

    fn raw_user(fields: Vec<ProfileField>) -> RawUser {
        RawUser {
            user_id: "u1".to_string(),
            status: 1,
            groups: vec![],
            department_id: "d1".to_string(),
            role_id: "r1".to_string(),
            fields,
        }
    }

    #[test]
    fn test_resolve_known_field() {
        let index: FieldIndex = vec![field("EMAIL", "a@b.c"), field("FIRST_NAME", "Анна")]
            .into_iter()
            .collect();

        assert_eq!(index.resolve("EMAIL"), Some("a@b.c"));
        assert_eq!(index.resolve("FIRST_NAME"), Some("Анна"));
        assert_eq!(index.resolve("LAST_NAME"), None);
    }

    #[test]
    fn test_contact_attributes_extracted() {
        let user: DirectoryUser = raw_user(vec![
            field("EMAIL", "anna@example.com"),
            field("FIRST_NAME", "Анна"),
            field("LAST_NAME", "Иванова"),
            field("USER_DEFINED_FIELD2", "ignored"),
        ])
        .into();

        assert_eq!(user.email, "anna@example.com");
        assert_eq!(user.first_name, "Анна");
        assert_eq!(user.last_name, "Иванова");
        assert_eq!(user.user_id, "u1");
    }

    #[test]
    fn test_missing_fields_default_to_empty() {
        let user: DirectoryUser = raw_user(vec![]).into();

        assert_eq!(user.email, "");
        assert_eq!(user.first_name, "");
        assert_eq!(user.last_name, "");
    }
}
