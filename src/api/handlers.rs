//! REST API handlers for the control tower dashboard
//!
//! These handlers use the shared DashboardService.

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::service::{DashboardService, DatasetInfo, MapView, RegionList, Summary};
use crate::advisory::AdvisoryResponse;
use crate::aggregator::{ChartSeries, Kpis};
use crate::risk::RiskReport;

// ============================================================================
// Request / Response Types
// ============================================================================

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn bad_request(message: impl Into<String>) -> ApiError {
    (
        StatusCode::BAD_REQUEST,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// `?regions=A,B` selection; absent or empty selects every row
#[derive(Deserialize, Default)]
pub struct RegionQuery {
    pub regions: Option<String>,
}

impl RegionQuery {
    pub fn selection(&self) -> Vec<String> {
        self.regions
            .as_deref()
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Deserialize)]
pub struct AskRequest {
    pub query: String,
    #[serde(default)]
    pub regions: Vec<String>,
}

#[derive(Deserialize)]
pub struct RiskRequest {
    #[serde(default)]
    pub regions: Vec<String>,
}

// ============================================================================
// Handlers
// ============================================================================

pub type AppState = Arc<DashboardService>;

/// GET /api/v1/health
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// GET /api/v1/dataset
pub async fn get_dataset(State(service): State<AppState>) -> Json<DatasetInfo> {
    Json(service.dataset_info().await)
}

/// POST /api/v1/dataset (body: CSV text)
pub async fn upload_dataset(
    State(service): State<AppState>,
    body: Bytes,
) -> Result<Json<DatasetInfo>, ApiError> {
    // Raw bytes: exports are often ISO-8859-1, which the table loader decodes
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(bad_request("Uploaded dataset is empty"));
    }
    match service.replace_dataset(&body).await {
        Ok(info) => Ok(Json(info)),
        Err(e) => Err(bad_request(format!("{:#}", e))),
    }
}

/// GET /api/v1/regions
pub async fn get_regions(State(service): State<AppState>) -> Json<RegionList> {
    Json(service.regions().await)
}

/// GET /api/v1/kpis
pub async fn get_kpis(
    State(service): State<AppState>,
    Query(params): Query<RegionQuery>,
) -> Json<Kpis> {
    Json(service.kpis(&params.selection()).await)
}

/// GET /api/v1/summary
pub async fn get_summary(
    State(service): State<AppState>,
    Query(params): Query<RegionQuery>,
) -> Json<Summary> {
    Json(service.summary(&params.selection()).await)
}

/// GET /api/v1/charts
pub async fn get_charts(
    State(service): State<AppState>,
    Query(params): Query<RegionQuery>,
) -> Json<ChartSeries> {
    Json(service.charts(&params.selection()).await)
}

/// GET /api/v1/map
pub async fn get_map(
    State(service): State<AppState>,
    Query(params): Query<RegionQuery>,
) -> Json<MapView> {
    Json(service.flow_map(&params.selection()).await)
}

/// POST /api/v1/ask
pub async fn ask(
    State(service): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Result<Json<AdvisoryResponse>, ApiError> {
    if request.query.trim().is_empty() {
        return Err(bad_request("Query must not be empty"));
    }
    Ok(Json(service.ask(&request.query, &request.regions).await))
}

/// POST /api/v1/risk
pub async fn run_risk_model(
    State(service): State<AppState>,
    request: Option<Json<RiskRequest>>,
) -> Json<RiskReport> {
    let regions = request.map(|Json(r)| r.regions).unwrap_or_default();
    Json(service.risk(&regions).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::router;
    use crate::config::AdvisoryConfig;
    use crate::table::ShipmentTable;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    const CSV: &str = "\
Order Id,Order Region,Delivery Status,Sales,Latitude,Longitude,Product Name
1,Canada,Late delivery,100.5,45.5,-73.5,Cleats
2,Oceania,Shipping on time,20,-33.8,151.2,Gloves
3,Canada,Advance shipping,30,43.6,-79.3,Cleats
";

    fn app() -> axum::Router {
        let table = ShipmentTable::from_reader(CSV.as_bytes()).unwrap();
        let service = DashboardService::new(table, AdvisoryConfig::default()).unwrap();
        router(Arc::new(service))
    }

    async fn send(app: axum::Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    fn get(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[test]
    fn test_region_query() {
        let q = RegionQuery {
            regions: Some("Canada, Oceania,,".to_string()),
        };
        assert_eq!(q.selection(), vec!["Canada", "Oceania"]);
        assert!(RegionQuery::default().selection().is_empty());
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), get("/api/v1/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_summary_with_selection() {
        let (status, body) = send(app(), get("/api/v1/summary?regions=Canada")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["digest"]["total_count"], 2);
        assert_eq!(body["digest"]["late_count"], 1);
        assert_eq!(body["digest"]["mean_shipping_days"], Value::Null);
    }

    #[tokio::test]
    async fn test_map() {
        let (_, body) = send(app(), get("/api/v1/map")).await;
        assert_eq!(body["renderable"], true);
        let arcs = body["map"]["arcs"].as_array().unwrap();
        assert_eq!(arcs.len(), 3);
        assert_eq!(arcs[0]["color"], serde_json::json!([255, 0, 0, 150]));
        assert_eq!(arcs[1]["product_name"], "Gloves");
    }

    #[tokio::test]
    async fn test_ask_fallback() {
        let query = serde_json::json!({"query": "What is our total revenue?"});
        let request = post_json("/api/v1/ask", query);
        let (status, body) = send(app(), request).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["source"], "fallback");
        assert!(body["text"].as_str().unwrap().contains("$150.50"));
    }

    #[tokio::test]
    async fn test_ask_empty_query_rejected() {
        let request = post_json("/api/v1/ask", serde_json::json!({"query": "  "}));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn test_upload_then_kpis() {
        let app = app();
        let upload = Request::post("/api/v1/dataset")
            .header("content-type", "text/csv")
            .body(Body::from("Order Region,Sales\nCaribbean,5\nCaribbean,7\n"))
            .unwrap();
        let (status, body) = send(app.clone(), upload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"], 2);

        let (_, kpis) = send(app.clone(), get("/api/v1/kpis")).await;
        assert_eq!(kpis["total_revenue"], 12.0);
        assert_eq!(kpis["late_orders"], 0);

        let (_, map) = send(app, get("/api/v1/map")).await;
        assert_eq!(map["renderable"], false);
    }

    #[tokio::test]
    async fn test_upload_latin1() {
        let app = app();
        let csv: &[u8] = b"Order Region,Product Name,Sales\nSouth America,C\xE1mara,10\n";
        let upload = Request::post("/api/v1/dataset")
            .header("content-type", "text/csv")
            .body(Body::from(csv))
            .unwrap();
        let (status, body) = send(app.clone(), upload).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["rows"], 1);

        let (_, regions) = send(app, get("/api/v1/regions")).await;
        assert_eq!(regions["regions"], serde_json::json!(["South America"]));
    }

    #[tokio::test]
    async fn test_upload_blank_rejected() {
        let upload = Request::post("/api/v1/dataset").body(Body::from(" \n\n")).unwrap();
        let (status, body) = send(app(), upload).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Uploaded dataset is empty");
    }

    #[tokio::test]
    async fn test_risk_without_body() {
        let request = Request::post("/api/v1/risk").body(Body::empty()).unwrap();
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["accuracy"], 87.5);
    }
}
