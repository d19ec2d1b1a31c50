//! Test helpers: event builders and an in-process fake ActivityWatch server

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};

use crate::chart::ChartConfig;
use crate::models::Event;
use crate::params::{ChartParams, RawParams};
use crate::pipeline::{build_outcome, FetchedEvents, Outcome};
use crate::settings::ResolvedSettings;

pub fn event(ts: &str, duration: f64, data: Value) -> Event {
    serde_json::from_value(json!({
        "timestamp": ts,
        "duration": duration,
        "data": data,
    }))
    .unwrap()
}

pub fn sample_params() -> ChartParams {
    RawParams {
        hostname: Some("laptop".to_string()),
        start: Some("2024-05-01T00:00:00Z".to_string()),
        end: Some("2024-05-02T00:00:00Z".to_string()),
    }
    .resolve()
    .unwrap()
}

/// Two blocks: "Write" (1h planned, 10m uncategorized + 20m Work) and
/// "Review" (20m planned, no activity)
pub fn sample_chart() -> ChartConfig {
    let events = FetchedEvents {
        markers: vec![
            event(
                "2024-05-01T10:00:00Z",
                3600.0,
                json!({"block": "Write", "planned_duration": 60}),
            ),
            event(
                "2024-05-01T11:00:00Z",
                1800.0,
                json!({"block": "Review", "planned_duration": 20}),
            ),
        ],
        window: vec![
            event("2024-05-01T10:00:00Z", 1200.0, json!({"$category": ["Work"]})),
            event("2024-05-01T10:30:00Z", 600.0, json!({"app": "x"})),
        ],
        afk: vec![],
    };
    match build_outcome(&events, &ResolvedSettings::default()) {
        Outcome::Chart(chart) => chart,
        other => panic!("expected a chart, got {:?}", other),
    }
}

/// Canned responses served by the fake server
#[derive(Clone)]
pub struct FakeData {
    pub classes: Value,
    pub theme: Value,
    pub nextblock: Value,
    pub window: Value,
    pub afk: Value,
    pub fail_settings: bool,
    pub fail_queries: bool,
}

impl Default for FakeData {
    fn default() -> Self {
        FakeData {
            classes: json!([]),
            theme: json!("light"),
            nextblock: json!([]),
            window: json!([]),
            afk: json!([]),
            fail_settings: false,
            fail_queries: false,
        }
    }
}

struct FakeState {
    data: FakeData,
    queries: Mutex<Vec<Value>>,
}

pub struct FakeServer {
    pub url: String,
    state: Arc<FakeState>,
}

impl FakeServer {
    /// Bodies of every query request received so far
    pub fn query_requests(&self) -> Vec<Value> {
        self.state.queries.lock().unwrap().clone()
    }
}

pub async fn spawn_fake_server(data: FakeData) -> FakeServer {
    let state = Arc::new(FakeState {
        data,
        queries: Mutex::new(Vec::new()),
    });

    let app = Router::new()
        .route("/api/0/settings/:key", get(get_setting))
        .route("/api/0/query/", post(run_query))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeServer {
        url: format!("http://{}", addr),
        state,
    }
}

async fn get_setting(State(state): State<Arc<FakeState>>, Path(key): Path<String>) -> Response {
    if state.data.fail_settings {
        return (StatusCode::INTERNAL_SERVER_ERROR, "settings unavailable").into_response();
    }
    match key.as_str() {
        "classes" => Json(state.data.classes.clone()).into_response(),
        "theme" => Json(state.data.theme.clone()).into_response(),
        _ => (StatusCode::NOT_FOUND, "no such setting").into_response(),
    }
}

async fn run_query(State(state): State<Arc<FakeState>>, Json(body): Json<Value>) -> Response {
    state.queries.lock().unwrap().push(body.clone());

    if state.data.fail_queries {
        return (StatusCode::INTERNAL_SERVER_ERROR, "query failed").into_response();
    }

    let script = body["query"]
        .as_array()
        .map(|lines| {
            lines
                .iter()
                .filter_map(Value::as_str)
                .collect::<Vec<_>>()
                .join("\n")
        })
        .unwrap_or_default();

    let events = if script.contains("aw-watcher-nextblock_") {
        state.data.nextblock.clone()
    } else if script.contains("aw-watcher-afk_") {
        state.data.afk.clone()
    } else if script.contains("aw-watcher-window_") {
        state.data.window.clone()
    } else {
        return (StatusCode::BAD_REQUEST, "unknown bucket").into_response();
    };

    Json(json!([events])).into_response()
}
