//! Integration tests for the credential endpoints, driven through the axum
//! router against the in-memory store.

mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::{credentials_path, setup, setup_with_config, AWS_CREDENTIAL, TENANT};
use tenant_config_api::{api::yaml::DeletedEntity, config::ApiServerConfig, domain::CredentialInfo};

#[tokio::test]
async fn write_then_get_returns_same_credential() {
    let app = setup().await;

    let response = app
        .post(&credentials_path(""), "name: db1\ntype: postgres\nvalue:\n  url: \"x\"\n")
        .await;
    assert_eq!(response.status, StatusCode::OK, "{}", response.body);
    assert!(response.body.is_empty());

    let response = app.get(&credentials_path("/db1")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.content_type.as_deref(), Some("application/yaml"));
    let info: CredentialInfo = response.yaml();
    assert_eq!(info.name, "db1");
    assert_eq!(info.credential_type, "postgres");
    assert!(info.created_at.is_some());

    // The value never leaves the backend through the API
    assert!(!response.body.contains("url"));
    assert_eq!(
        app.store.credential_value(&app.tenant_id, "db1").await.as_deref(),
        Some(r#"{"url":"x"}"#)
    );
}

#[tokio::test]
async fn type_change_is_rejected() {
    let app = setup().await;
    app.post(&credentials_path(""), "name: db1\ntype: postgres\nvalue: {url: x}\n").await;

    let response =
        app.post(&credentials_path(""), "name: db1\ntype: mysql\nvalue: {url: y}\n").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.content_type.as_deref(), Some("text/plain; charset=utf-8"));
    assert!(response.body.contains("type cannot be updated (current=postgres, updated=mysql)"));

    let info: CredentialInfo = app.get(&credentials_path("/db1")).await.yaml();
    assert_eq!(info.credential_type, "postgres");
}

#[tokio::test]
async fn list_excludes_values() {
    let app = setup().await;
    let body = format!("{}---\nname: db1\ntype: postgres\nvalue: {{url: x}}\n", AWS_CREDENTIAL);
    assert_eq!(app.post(&credentials_path(""), &body).await.status, StatusCode::OK);

    let response = app.get(&credentials_path("")).await;
    assert_eq!(response.status, StatusCode::OK);
    let list: Vec<CredentialInfo> = response.yaml();
    let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["aws", "db1"]);
    assert!(!response.body.contains("AKIAEXAMPLE"));
}

#[tokio::test]
async fn empty_list_is_a_yaml_sequence() {
    let app = setup().await;
    let response = app.get(&credentials_path("")).await;
    assert_eq!(response.status, StatusCode::OK);
    let list: Vec<CredentialInfo> = response.yaml();
    assert!(list.is_empty());
}

#[tokio::test]
async fn delete_then_get_is_not_found() {
    let app = setup().await;
    app.post(&credentials_path(""), AWS_CREDENTIAL).await;
    let info: CredentialInfo = app.get(&credentials_path("/aws")).await.yaml();

    let response = app.delete(&credentials_path("/aws")).await;
    assert_eq!(response.status, StatusCode::OK);
    let deleted: DeletedEntity = response.yaml();
    assert_eq!(deleted.id, info.id.as_str());

    assert_eq!(app.get(&credentials_path("/aws")).await.status, StatusCode::NOT_FOUND);
    assert_eq!(app.delete(&credentials_path("/aws")).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn batch_with_malformed_document_creates_nothing() {
    let app = setup().await;
    let body = format!("{}---\nname: db1\ntype: postgres\nvalue: x\nextra: field\n", AWS_CREDENTIAL);

    let response = app.post(&credentials_path(""), &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(
        response.body.starts_with("Decoding credential input at index=1 failed"),
        "{}",
        response.body
    );

    let list: Vec<CredentialInfo> = app.get(&credentials_path("")).await.yaml();
    assert!(list.is_empty());
}

#[tokio::test]
async fn batch_with_invalid_value_creates_nothing() {
    let app = setup().await;
    let body = format!("{}---\nname: gcp\ntype: gcp-service-account\nvalue: \"{{not json\"\n", AWS_CREDENTIAL);

    let response = app.post(&credentials_path(""), &body).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.starts_with("Parsing credential input at index=1 failed"));
    assert_eq!(app.get(&credentials_path("/aws")).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn non_finite_number_is_bad_request() {
    let app = setup().await;
    let response =
        app.post(&credentials_path(""), "name: db1\ntype: postgres\nvalue: {ratio: .inf}\n").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.starts_with("Parsing credential input at index=0 failed"), "{}", response.body);
    assert_eq!(app.get(&credentials_path("/db1")).await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn empty_body_is_bad_request() {
    let app = setup().await;
    let response = app.post(&credentials_path(""), "").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body.trim(), "Missing credential YAML data in request body");
}

#[tokio::test]
async fn invalid_name_is_bad_request() {
    let app = setup().await;
    let response = app.post(&credentials_path(""), "name: DB_1\ntype: postgres\nvalue: x\n").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_tenant_is_not_found() {
    let app = setup().await;
    let response = app.get("/api/v1/tenants/ghost/credentials").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert_eq!(response.body.trim(), "Tenant not found: ghost");

    let response = app.post("/api/v1/tenants/ghost/credentials", AWS_CREDENTIAL).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn header_scoped_routes_use_tenant_header() {
    let app = setup().await;

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/credentials")
        .header("X-Scope-OrgID", TENANT)
        .body(Body::from(AWS_CREDENTIAL))
        .unwrap();
    assert_eq!(app.send(request).await.status, StatusCode::OK);

    let request = Request::builder()
        .uri("/api/v1/credentials/aws")
        .header("x-scope-orgid", TENANT)
        .body(Body::empty())
        .unwrap();
    let response = app.send(request).await;
    assert_eq!(response.status, StatusCode::OK);
    let info: CredentialInfo = response.yaml();
    assert_eq!(info.credential_type, "aws-key");

    // Visible through the tenant path as well
    assert_eq!(app.get(&credentials_path("/aws")).await.status, StatusCode::OK);
}

#[tokio::test]
async fn header_scoped_route_without_header_is_bad_request() {
    let app = setup().await;
    let response = app.get("/api/v1/credentials").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert!(response.body.contains("x-scope-orgid"));
}

#[tokio::test]
async fn custom_tenant_header() {
    let config = ApiServerConfig { tenant_header: "X-Tenant".to_string(), ..Default::default() };
    let app = setup_with_config(config).await;

    let request = Request::builder()
        .uri("/api/v1/credentials")
        .header("X-Tenant", TENANT)
        .body(Body::empty())
        .unwrap();
    assert_eq!(app.send(request).await.status, StatusCode::OK);
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let config = ApiServerConfig { max_body_bytes: 1024, ..Default::default() };
    let app = setup_with_config(config).await;

    let body = format!("name: big\ntype: postgres\nvalue: \"{}\"\n", "x".repeat(4096));
    let response = app.post(&credentials_path(""), &body).await;
    assert_eq!(response.status, StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn health_endpoint() {
    let app = setup().await;
    let response = app.get("/health").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("\"status\":\"ok\""));
}
