//! # Hosted store
//!
//! Thin client over the hosted PostgREST API that holds the catalog and
//! order tables. The backend only proxies: no local persistence, no
//! caching, every request goes straight upstream with the service key.
//!
//! Image files live in the hosted object storage and are uploaded by the
//! admin frontend directly; products only carry the resulting URLs.

use chrono::{DateTime, Utc};
use reqwest::{Client, Method, RequestBuilder};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::error;

use crate::{config::Config, error::AppError};

#[derive(Serialize, Deserialize)]
pub struct Product {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub size: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub old_price: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    pub remains: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub is_gift: bool,
}

/// Insert payload, the store assigns the id.
#[derive(Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    #[serde(default)]
    pub size: Option<String>,
    pub price: i64,
    #[serde(default)]
    pub old_price: Option<i64>,
    #[serde(default)]
    pub description: Option<String>,
    pub remains: i64,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    #[serde(default)]
    pub is_gift: bool,
}

#[derive(Serialize, Deserialize)]
pub struct OrderItem {
    pub name: String,
    pub price: i64,
    pub quantity: i64,
}

#[derive(Serialize, Deserialize)]
pub struct Order {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<String>,
    pub user_name: String,
    pub email: String,
    #[serde(default)]
    pub telegram_login: Option<String>,
    pub items: Vec<OrderItem>,
    pub total_cost: i64,
    pub created_at: DateTime<Utc>,
}

pub async fn products(http: &Client, config: &Config) -> Result<Vec<Product>, AppError> {
    let response = request(http, config, Method::GET, "products")
        .query(&[("select", "*")])
        .send()
        .await
        .map_err(transport)?;

    read_json(response).await
}

pub async fn insert_product(
    http: &Client,
    config: &Config,
    product: &NewProduct,
) -> Result<(), AppError> {
    let response = request(http, config, Method::POST, "products")
        .header("Prefer", "return=minimal")
        .json(&[product])
        .send()
        .await
        .map_err(transport)?;

    expect_success(response).await
}

pub async fn delete_product(http: &Client, config: &Config, id: i64) -> Result<(), AppError> {
    let response = request(http, config, Method::DELETE, "products")
        .query(&[("id", format!("eq.{id}"))])
        .send()
        .await
        .map_err(transport)?;

    expect_success(response).await
}

pub async fn orders(http: &Client, config: &Config) -> Result<Vec<Order>, AppError> {
    let response = request(http, config, Method::GET, "orders")
        .query(&[("select", "*"), ("order", "created_at.desc")])
        .send()
        .await
        .map_err(transport)?;

    read_json(response).await
}

fn request(http: &Client, config: &Config, method: Method, table: &str) -> RequestBuilder {
    let url = format!("{}/rest/v1/{table}", config.store_url.trim_end_matches('/'));

    http.request(method, url)
        .header("apikey", &config.store_service_key)
        .bearer_auth(&config.store_service_key)
}

fn transport(e: reqwest::Error) -> AppError {
    AppError::Store(e.to_string())
}

async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, AppError> {
    let response = checked(response).await?;

    response.json().await.map_err(transport)
}

async fn expect_success(response: reqwest::Response) -> Result<(), AppError> {
    checked(response).await.map(|_| ())
}

async fn checked(response: reqwest::Response) -> Result<reqwest::Response, AppError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        error!("Store error ({status}): {body}");
        return Err(AppError::Store(format!("status {status}")));
    }

    Ok(response)
}
