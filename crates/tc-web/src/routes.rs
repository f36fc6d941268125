use axum::extract::{Form, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tc_core::{RuleForm, Snapshot};

use crate::controller::RuleController;
use crate::error::ApiError;
use crate::flash::{self, FLASH_HEADER, Flash};
use crate::page;

#[derive(Debug, Deserialize)]
pub struct ImportForm {
    #[serde(rename = "Settings")]
    pub settings: Option<String>,
}

pub fn router(controller: Arc<RuleController>) -> Router {
    Router::new()
        .route("/", get(show_main))
        .route("/import_settings", post(import_settings))
        .route("/remove_all", post(remove_all))
        .route("/add_rule", post(add_rule))
        .route("/metrics", get(metrics))
        .with_state(controller)
}

/// Bind and serve until the process is stopped
pub async fn serve(controller: Arc<RuleController>, addr: SocketAddr) -> anyhow::Result<()> {
    let app = router(controller);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("tcgui listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}

async fn show_main(
    State(ctl): State<Arc<RuleController>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let view = ctl.show_main().await?;
    let flashes = flash::pending(&headers);
    let html = page::render(&view, &flashes).map_err(tc_core::TcError::from)?;

    let mut response = Html(html).into_response();
    if !flashes.is_empty() {
        response
            .headers_mut()
            .insert(header::SET_COOKIE, flash::clear_cookie());
    }
    Ok(response)
}

async fn import_settings(
    State(ctl): State<Arc<RuleController>>,
    headers: HeaderMap,
    Form(form): Form<ImportForm>,
) -> Result<Response, ApiError> {
    let snapshot = ctl.import_settings(form.settings.as_deref()).await?;
    snapshot_response(&snapshot, Flash::Updated, &headers)
}

async fn remove_all(
    State(ctl): State<Arc<RuleController>>,
    headers: HeaderMap,
) -> Result<Response, ApiError> {
    let snapshot = ctl.remove_all().await?;
    snapshot_response(&snapshot, Flash::Cleared, &headers)
}

async fn add_rule(
    State(ctl): State<Arc<RuleController>>,
    headers: HeaderMap,
    Form(form): Form<RuleForm>,
) -> Result<Response, ApiError> {
    let outcome = ctl.add_rule(&form).await?;
    let flash = if outcome.applied {
        Flash::Updated
    } else {
        Flash::Invalid
    };
    snapshot_response(&outcome.snapshot, flash, &headers)
}

async fn metrics(State(ctl): State<Arc<RuleController>>) -> (StatusCode, String) {
    match ctl.metrics().render() {
        Ok(metrics) => (StatusCode::OK, metrics),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("# Error rendering metrics: {}", e),
        ),
    }
}

fn snapshot_response(
    snapshot: &Snapshot,
    flash: Flash,
    headers: &HeaderMap,
) -> Result<Response, ApiError> {
    let body = snapshot.to_pretty_json().map_err(tc_core::TcError::from)?;

    let mut response = (
        [(header::CONTENT_TYPE, HeaderValue::from_static("application/json"))],
        body,
    )
        .into_response();
    let response_headers = response.headers_mut();
    response_headers.insert(FLASH_HEADER, HeaderValue::from_static(flash.message()));
    response_headers.insert(header::SET_COOKIE, flash::push_cookie(headers, flash));
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{FakeBackend, controller};
    use axum::body::Body;
    use axum::http::Request;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    fn app(interfaces: &[&str], fake: FakeBackend) -> Router {
        router(Arc::new(controller(interfaces, fake)))
    }

    fn form_post(uri: &str, body: String) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(body))
            .unwrap()
    }

    fn encode(pairs: &[(&str, &str)]) -> String {
        serde_urlencoded::to_string(pairs).unwrap()
    }

    async fn body_text(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_main_page_renders() {
        let response = app(&["eth0"], FakeBackend::new())
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let html = body_text(response).await;
        assert!(html.contains("<option value=\"eth0\">eth0</option>"));
        assert!(html.contains("selected>mbps"));
    }

    #[tokio::test]
    async fn test_main_page_consumes_flash_cookie() {
        let request = Request::get("/")
            .header(header::COOKIE, "tcgui_flash=cleared")
            .body(Body::empty())
            .unwrap();
        let response = app(&["eth0"], FakeBackend::new())
            .oneshot(request)
            .await
            .unwrap();

        let cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(cookie.to_str().unwrap().contains("Max-Age=0"));
        assert!(body_text(response).await.contains("Successfully cleared settings"));
    }

    #[tokio::test]
    async fn test_import_settings() {
        let fake = FakeBackend::new();
        let payload = json!({"eth0": {"outgoing": {"rate": "10Mbps"}}}).to_string();
        let response = app(&["eth0"], fake.clone())
            .oneshot(form_post(
                "/import_settings",
                encode(&[("Settings", payload.as_str())]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[FLASH_HEADER].to_str().unwrap(),
            "Successfully updated settings"
        );
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({"eth0": {"outgoing": {"rate": "10Mbps"}}}));
        assert_eq!(fake.calls()[0], "tcdel --all eth0");
    }

    #[tokio::test]
    async fn test_import_invalid_json_is_400() {
        let fake = FakeBackend::new();
        let response = app(&["eth0"], fake.clone())
            .oneshot(form_post(
                "/import_settings",
                encode(&[("Settings", "not json")]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(fake.calls().is_empty());
        assert!(fake.last_import_path().is_none());
    }

    #[tokio::test]
    async fn test_import_missing_field_is_400() {
        let response = app(&["eth0"], FakeBackend::new())
            .oneshot(form_post("/import_settings", String::new()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_import_tool_failure_is_400() {
        let fake = FakeBackend::new();
        fake.fail_import(true);
        let response = app(&["eth0"], fake)
            .oneshot(form_post("/import_settings", encode(&[("Settings", "{}")])))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert!(body_text(response).await.contains("fake failure"));
    }

    #[tokio::test]
    async fn test_remove_all_always_ok() {
        let fake = FakeBackend::new();
        fake.fail_delete(true);
        let response = app(&["eth0", "eth1"], fake)
            .oneshot(form_post("/remove_all", String::new()))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[FLASH_HEADER].to_str().unwrap(),
            "Successfully cleared settings"
        );
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({"eth0": {}, "eth1": {}}));
    }

    #[tokio::test]
    async fn test_add_rule_builds_command() {
        let fake = FakeBackend::new();
        let body = encode(&[
            ("Interface", "eth0"),
            ("Direction", ""),
            ("Network", ""),
            ("NetworkType", "source"),
            ("Delay", "50"),
            ("DelayVariance", "10"),
            ("Loss", ""),
            ("Duplicate", ""),
            ("Reorder", ""),
            ("Corrupt", ""),
            ("Rate", "10"),
            ("rate_unit", "mbps"),
        ]);
        let response = app(&["eth0"], fake.clone())
            .oneshot(form_post("/add_rule", body))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert!(fake.calls().contains(
            &"tcset --change eth0 --rate 10mbps --delay 50ms --delay-distro 10ms".to_string()
        ));
        let cookie = response.headers().get(header::SET_COOKIE).unwrap();
        assert!(cookie.to_str().unwrap().starts_with("tcgui_flash=updated"));
    }

    #[tokio::test]
    async fn test_add_rule_failure_flashes_and_returns_200() {
        let fake = FakeBackend::new();
        fake.fail_change(true);
        let response = app(&["eth0"], fake)
            .oneshot(form_post(
                "/add_rule",
                encode(&[("Interface", "eth0"), ("Loss", "abc")]),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers()[FLASH_HEADER].to_str().unwrap(),
            "Invalid settings"
        );
        let body: Value = serde_json::from_str(&body_text(response).await).unwrap();
        assert_eq!(body, json!({"eth0": {}}));
    }

    #[tokio::test]
    async fn test_add_rule_without_interface_is_400() {
        let response = app(&["eth0"], FakeBackend::new())
            .oneshot(form_post("/add_rule", encode(&[("Delay", "10")])))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_snapshot_failure_is_500() {
        let fake = FakeBackend::new();
        fake.fail_show(true);
        let response = app(&["eth0"], fake)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_failed_tcshow_is_500_on_every_post() {
        let fake = FakeBackend::new();
        fake.fail_show_exit(true);
        let router = app(&["eth0"], fake);

        let import = router
            .clone()
            .oneshot(form_post("/import_settings", encode(&[("Settings", "{}")])))
            .await
            .unwrap();
        assert_eq!(import.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let remove = router
            .clone()
            .oneshot(form_post("/remove_all", String::new()))
            .await
            .unwrap();
        assert_eq!(remove.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let add = router
            .oneshot(form_post("/add_rule", encode(&[("Interface", "eth0")])))
            .await
            .unwrap();
        assert_eq!(add.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn test_metrics_endpoint() {
        let router = app(&["eth0"], FakeBackend::new());
        let _ = router
            .clone()
            .oneshot(form_post("/remove_all", String::new()))
            .await
            .unwrap();

        let response = router
            .oneshot(Request::get("/metrics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let text = body_text(response).await;
        assert!(text.lines().any(|line| {
            line.starts_with("tcgui_tool_invocations_total")
                && line.contains("tool=\"tcdel\"")
                && line.contains("outcome=\"ok\"")
                && line.ends_with(" 1")
        }));
        assert!(text.contains("tcgui_interfaces 1"));
    }
}
