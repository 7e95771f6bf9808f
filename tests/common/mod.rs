//! Shared harness for the HTTP API integration tests.
#![allow(dead_code)]

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    Router,
};
use tenant_config_api::{
    api::build_router, config::ApiServerConfig, domain::TenantId, storage::InMemoryStore,
    storage::Repositories,
};
use tower::ServiceExt;

pub const TENANT: &str = "acme";

pub const AWS_CREDENTIAL: &str = "\
name: aws
type: aws-key
value:
  AWS_ACCESS_KEY_ID: AKIAEXAMPLE
  AWS_SECRET_ACCESS_KEY: secret
";

pub struct TestApp {
    pub store: InMemoryStore,
    pub tenant_id: TenantId,
    router: Router,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: String,
}

impl TestResponse {
    pub fn yaml<T: serde::de::DeserializeOwned>(&self) -> T {
        serde_yaml::from_str(&self.body).expect("response body should be valid YAML")
    }
}

pub async fn setup() -> TestApp {
    setup_with_config(ApiServerConfig::default()).await
}

pub async fn setup_with_config(config: ApiServerConfig) -> TestApp {
    let store = InMemoryStore::new();
    let tenant_id = store.add_tenant(TENANT).await;
    let router = build_router(Repositories::in_memory(store.clone()), &config)
        .expect("router should build");
    TestApp { store, tenant_id, router }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.expect("router call");
        let status = response.status();
        let content_type = response
            .headers()
            .get("content-type")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("read body");
        TestResponse { status, content_type, body: String::from_utf8_lossy(&bytes).into_owned() }
    }

    pub async fn get(&self, path: &str) -> TestResponse {
        self.send(Request::builder().method(Method::GET).uri(path).body(Body::empty()).unwrap())
            .await
    }

    pub async fn post(&self, path: &str, body: &str) -> TestResponse {
        self.send(
            Request::builder()
                .method(Method::POST)
                .uri(path)
                .header("content-type", "application/yaml")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, path: &str) -> TestResponse {
        self.send(Request::builder().method(Method::DELETE).uri(path).body(Body::empty()).unwrap())
            .await
    }
}

pub fn credentials_path(suffix: &str) -> String {
    format!("/api/v1/tenants/{}/credentials{}", TENANT, suffix)
}

pub fn exporters_path(suffix: &str) -> String {
    format!("/api/v1/tenants/{}/exporters{}", TENANT, suffix)
}
