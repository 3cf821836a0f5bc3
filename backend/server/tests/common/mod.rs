#![allow(dead_code)]

use serde_json::{json, Value};
use shop::config::Config;
use wiremock::{
    matchers::{method, path},
    Mock, MockServer, ResponseTemplate,
};

pub const TOKEN: &str = "test-token";
pub const SERVICE_KEY: &str = "service-key";

/// All upstreams (token, listing, award, store) point at one mock server,
/// their paths never collide.
pub fn test_config(base: &str) -> Config {
    Config {
        port: 0,
        client_id: "client-id".to_string(),
        client_secret: "client-secret".to_string(),
        auth_base_url: base.to_string(),
        api_base_url: base.to_string(),
        learn_base_url: base.to_string(),
        store_url: base.to_string(),
        store_service_key: SERVICE_KEY.to_string(),
    }
}

pub fn directory_user(user_id: &str, email: &str) -> Value {
    json!({
        "userId": user_id,
        "status": 1,
        "groups": [],
        "departmentId": "d1",
        "roleId": "r1",
        "fields": [
            { "name": "EMAIL", "value": email },
            { "name": "FIRST_NAME", "value": "Имя" },
            { "name": "LAST_NAME", "value": "Фамилия" }
        ]
    })
}

pub async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/v3/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": TOKEN })))
        .mount(server)
        .await;
}

pub async fn mount_user_page(server: &MockServer, users: Vec<Value>) {
    Mock::given(method("POST"))
        .and(path("/api/v2/user/list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "pageNumber": 1,
            "totalUsersNumber": users.len(),
            "userProfiles": users,
        })))
        .mount(server)
        .await;
}
