//! Axum router: maps URL paths to handlers.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    response::Html,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::{compression::CompressionLayer, cors::CorsLayer};

use crate::data::filter::{PayloadInterval, SiteSelection};
use crate::dispatch::{Control, Output};
use crate::error::ApiError;
use crate::state::{AppState, DashboardInputs, SharedState};
use crate::ui::figures::Figure;
use crate::ui::page::{DashboardLayout, INDEX_HTML};

/// Build the full router over an already-loaded state.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        .route("/", get(index))
        .route("/api/layout", get(api_layout))
        .route("/api/success-pie", get(api_success_pie))
        .route("/api/payload-scatter", get(api_payload_scatter))
        .route("/api/update", post(api_update))
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .with_state(shared)
}

/// Bind the configured address and serve until the process exits.
pub async fn serve(state: AppState) -> Result<()> {
    let addr = state.settings.bind_addr();
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding {addr}"))?;
    log::info!("Dashboard running at http://{addr}");
    axum::serve(listener, app).await.context("serving HTTP")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

async fn api_layout(State(state): State<SharedState>) -> Json<DashboardLayout> {
    Json(DashboardLayout::new(&state))
}

#[derive(Debug, Deserialize)]
struct ChartQuery {
    site: Option<String>,
    lo: Option<f64>,
    hi: Option<f64>,
}

impl ChartQuery {
    /// Fill unspecified values from the page defaults.
    fn inputs(&self, state: &AppState) -> Result<DashboardInputs, ApiError> {
        let initial = state.initial_inputs();
        let site = self
            .site
            .as_deref()
            .map(SiteSelection::parse)
            .unwrap_or(initial.site);
        let lo = self.lo.unwrap_or(initial.payload.lo());
        let hi = self.hi.unwrap_or(initial.payload.hi());
        Ok(DashboardInputs {
            site,
            payload: PayloadInterval::new(lo, hi)?,
        })
    }
}

/// GET /api/success-pie?site=ALL
async fn api_success_pie(
    State(state): State<SharedState>,
    query: Result<Query<ChartQuery>, QueryRejection>,
) -> Result<Json<Figure>, ApiError> {
    let Query(query) = query?;
    render_one(&state, Output::SuccessPieChart, &query)
}

/// GET /api/payload-scatter?site=ALL&lo=0&hi=10000
async fn api_payload_scatter(
    State(state): State<SharedState>,
    query: Result<Query<ChartQuery>, QueryRejection>,
) -> Result<Json<Figure>, ApiError> {
    let Query(query) = query?;
    render_one(&state, Output::PayloadScatterChart, &query)
}

fn render_one(state: &AppState, output: Output, query: &ChartQuery) -> Result<Json<Figure>, ApiError> {
    let inputs = query.inputs(state)?;
    let figure = state
        .dispatcher
        .render(&state.dataset, output, &inputs)
        .ok_or(ApiError::UnboundOutput(output.id()))?;
    Ok(Json(figure))
}

#[derive(Debug, Deserialize)]
struct UpdateRequest {
    /// Control that changed; `None` renders every output.
    changed: Option<String>,
    site: SiteSelection,
    payload: [f64; 2],
}

/// POST /api/update: re-render the outputs bound to the changed control.
async fn api_update(
    State(state): State<SharedState>,
    req: Result<Json<UpdateRequest>, JsonRejection>,
) -> Result<Json<BTreeMap<&'static str, Figure>>, ApiError> {
    let Json(req) = req?;
    let inputs = DashboardInputs {
        site: req.site,
        payload: PayloadInterval::new(req.payload[0], req.payload[1])?,
    };

    let figures = match req.changed.as_deref() {
        Some(id) => {
            let control: Control = id.parse()?;
            state.dispatcher.dispatch(&state.dataset, control, &inputs)
        }
        None => state.dispatcher.render_all(&state.dataset, &inputs),
    };

    Ok(Json(
        figures
            .into_iter()
            .map(|(output, figure)| (output.id(), figure))
            .collect(),
    ))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Settings;
    use crate::data::model::{LaunchDataset, LaunchRecord, Outcome};

    fn router() -> Router {
        let ds = LaunchDataset::from_records(vec![
            LaunchRecord::new("CCAFS LC-40", 0.0, Outcome::Failure, "v1.0"),
            LaunchRecord::new("CCAFS LC-40", 525.0, Outcome::Success, "v1.0"),
            LaunchRecord::new("KSC LC-39A", 2490.0, Outcome::Success, "FT"),
            LaunchRecord::new("KSC LC-39A", 9600.0, Outcome::Failure, "B5"),
        ]);
        build_router(AppState::new(ds, Settings::default()))
    }

    async fn send(request: Request<Body>) -> (StatusCode, Value) {
        let response = router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    async fn get(uri: &str) -> (StatusCode, Value) {
        send(Request::get(uri).body(Body::empty()).unwrap()).await
    }

    async fn post_update(body: Value) -> (StatusCode, Value) {
        send(
            Request::post("/api/update")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    #[tokio::test]
    async fn index_serves_the_page() {
        let response = router()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("SpaceX Launch Records Dashboard"));
    }

    #[tokio::test]
    async fn layout_lists_sites_and_defaults() {
        let (status, body) = get("/api/layout").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["site_options"][0], json!({ "label": "All Sites", "value": "ALL" }));
        assert_eq!(body["site_options"].as_array().unwrap().len(), 3);
        assert_eq!(body["default_payload"], json!([0.0, 9600.0]));
        assert_eq!(body["slider"]["step"], json!(1000.0));
    }

    #[tokio::test]
    async fn pie_for_all_sites_counts_successes() {
        let (status, body) = get("/api/success-pie").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"][0]["labels"], json!(["CCAFS LC-40", "KSC LC-39A"]));
        assert_eq!(body["data"][0]["values"], json!([1, 1]));
        assert_eq!(body["layout"]["title"]["text"], "Total Success Launches by Site");
    }

    #[tokio::test]
    async fn scatter_filters_by_site_and_range() {
        let (status, body) = get("/api/payload-scatter?site=KSC%20LC-39A&lo=0&hi=5000").await;
        assert_eq!(status, StatusCode::OK);
        let traces = body["data"].as_array().unwrap();
        assert_eq!(traces.len(), 1);
        assert_eq!(traces[0]["name"], "FT");
        assert_eq!(traces[0]["x"], json!([2490.0]));
        assert_eq!(
            body["layout"]["title"]["text"],
            "Correlation between Payload and Success by KSC LC-39A"
        );
    }

    #[tokio::test]
    async fn inverted_range_is_rejected() {
        let (status, body) = get("/api/payload-scatter?lo=5000&hi=1000").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().contains("invalid payload interval"));
    }

    #[tokio::test]
    async fn update_renders_bound_outputs() {
        let (status, body) = post_update(json!({
            "changed": "payload-slider",
            "site": "ALL",
            "payload": [0, 1000]
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        let obj = body.as_object().unwrap();
        assert_eq!(obj.keys().collect::<Vec<_>>(), ["success-payload-scatter-chart"]);

        let (status, body) = post_update(json!({
            "changed": null,
            "site": "CCAFS LC-40",
            "payload": [0, 10000]
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success-pie-chart"]["data"][0]["values"], json!([1, 1]));
        assert_eq!(
            body["success-pie-chart"]["data"][0]["labels"],
            json!(["Success", "Failure"])
        );
    }

    #[tokio::test]
    async fn update_with_empty_match_is_not_an_error() {
        let (status, body) = post_update(json!({
            "changed": "site-dropdown",
            "site": "VAFB SLC-4E",
            "payload": [0, 0]
        }))
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success-pie-chart"]["data"], json!([]));
        assert_eq!(body["success-payload-scatter-chart"]["data"], json!([]));
    }

    #[tokio::test]
    async fn update_rejects_unknown_control() {
        let (status, body) = post_update(json!({
            "changed": "booster-dropdown",
            "site": "ALL",
            "payload": [0, 1000]
        }))
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "unknown control 'booster-dropdown'");
    }

    #[tokio::test]
    async fn malformed_query_gets_a_json_error() {
        let (status, body) = get("/api/payload-scatter?lo=abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("malformed request"));

        let (status, body) = get("/api/success-pie?hi=ten").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn malformed_update_body_gets_a_json_error() {
        let (status, body) = post_update(json!({ "site": "ALL", "payload": [0] })).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].as_str().unwrap().starts_with("malformed request"));
    }
}
