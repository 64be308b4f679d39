//! HTTP server for the PTC conference.
//!
//! Opens the conference store on a configured datastore backend, checks
//! that the stored configuration is usable, and serves a small JSON API
//! for the registration system and evaluation forms.

pub mod config;
pub mod error;
pub mod handler;
pub mod router;
pub mod server;

pub use config::{DatastoreConfig, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use handler::AppState;
pub use server::PtcServer;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use ptc_datastore::InMemoryDatastore;
    use ptc_store::{Store, StoreOptions};
    use ptc_types::{Class, Configuration};
    use serde_json::Value;
    use tower::util::ServiceExt;

    async fn app() -> axum::Router {
        let store = Store::new(Arc::new(InMemoryDatastore::new()), StoreOptions::default());
        store
            .put_configuration(&Configuration {
                year: 2024,
                month: 3,
                day: 9,
                cookie_key: "k".into(),
                ..Configuration::default()
            })
            .await
            .unwrap();
        store
            .put_classes(&[
                Class {
                    number: 301,
                    start: 3,
                    end: 4,
                    title: "Knots".into(),
                    location: "B".into(),
                    programs: 1,
                    evaluation_codes: vec!["1234".into(), "5678".into()],
                    ..Class::default()
                },
                Class {
                    number: 101,
                    title: "Maps".into(),
                    location: "C".into(),
                    ..Class::default()
                },
            ])
            .await
            .unwrap();
        router::build_router(AppState::new(Arc::new(store)))
    }

    async fn get(app: axum::Router, uri: &str) -> (StatusCode, Value) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn health_endpoint() {
        let (status, body) = get(app().await, "/v1/health").await;
        assert_eq!(status, 200);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn info_endpoint() {
        let (status, body) = get(app().await, "/v1/info").await;
        assert_eq!(status, 200);
        assert_eq!(body["name"], "ptc-server");
    }

    #[tokio::test]
    async fn session_event_for_class() {
        let (status, body) = get(app().await, "/api/sessionEvents/301?nocache").await;
        assert_eq!(status, 200);
        let event = &body["result"];
        assert_eq!(event["title"], "Knots");
        assert_eq!(event["startSession"], 4);
        assert_eq!(event["endSession"], 5);
        assert_eq!(event["startTime"], serde_json::json!([2024, 3, 9, 13, 25]));
        assert_eq!(event["endTime"], serde_json::json!([2024, 3, 9, 15, 35]));
        assert_eq!(event["programs"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn session_event_for_no_class() {
        let (status, body) = get(app().await, "/api/sessionEvents/999").await;
        assert_eq!(status, 200);
        assert_eq!(body["result"]["startTime"], serde_json::json!([2024, 3, 9, 9, 0]));
        assert_eq!(body["result"]["endTime"], serde_json::json!([2024, 3, 9, 16, 45]));
    }

    #[tokio::test]
    async fn session_event_not_found() {
        let (status, body) = get(app().await, "/api/sessionEvents/555").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"], "Class \"555\" not found.");
        let (status, _) = get(app().await, "/api/sessionEvents/abc").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn classes_sorted_by_key() {
        let (status, body) = get(app().await, "/api/classes?sort=-location").await;
        assert_eq!(status, 200);
        let numbers: Vec<i64> = body["result"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["number"].as_i64().unwrap())
            .collect();
        assert_eq!(numbers, vec![101, 301]);
    }

    #[tokio::test]
    async fn eval_code_lookup() {
        let (status, body) = get(app().await, "/api/evalCode/5678").await;
        assert_eq!(status, 200);
        assert_eq!(body["result"]["number"], 301);
        assert_eq!(body["result"]["numberDotPart"], "301.2");
        assert_eq!(body["result"]["session"], 5);

        let (status, _) = get(app().await, "/api/evalCode/0000").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
