// Shared by multiple test binaries; each uses a subset of the helpers.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use frontline_stats::api::CrconClient;
use frontline_stats::server;

/// Canned CRCON upstream. Hit counters record how often each endpoint is
/// called; the failure toggles switch individual endpoints into an HTTP or
/// a logical failure mode mid-test.
#[derive(Default)]
pub struct StubCrcon {
    pub gamestate_hits: AtomicUsize,
    pub stats_hits: AtomicUsize,
    pub team_view_hits: AtomicUsize,

    /// Answer get_gamestate with HTTP 503
    pub gamestate_http_error: AtomicBool,

    /// Answer get_live_game_stats with a failed:true envelope under HTTP 200
    pub stats_logical_error: AtomicBool,

    /// Last Authorization header seen on get_gamestate
    pub gamestate_auth: Mutex<Option<String>>,
}

/// Stub upstream plus the real proxy wired to it, on ephemeral ports.
/// Returns the stub handle for toggling failures and the proxy base URL.
pub async fn spawn_stack() -> (Arc<StubCrcon>, String) {
    let stub = Arc::new(StubCrcon::default());
    let upstream_url = spawn_stub_crcon(Arc::clone(&stub)).await;
    let proxy_url = spawn_proxy(&upstream_url).await;
    (stub, proxy_url)
}

/// Bind the stub upstream and return its base URL
pub async fn spawn_stub_crcon(stub: Arc<StubCrcon>) -> String {
    let app = Router::new()
        .route(
            "/api/get_gamestate",
            get(stub_gamestate).post(stub_gamestate),
        )
        .route("/api/get_live_game_stats", get(stub_live_game_stats))
        .route("/api/get_team_view", get(stub_team_view))
        .with_state(stub);

    spawn(app).await
}

/// Spin up the real aggregation proxy against the given upstream
pub async fn spawn_proxy(upstream_url: &str) -> String {
    let crcon = Arc::new(
        CrconClient::new(upstream_url, "test-token", Duration::from_secs(2), false)
            .expect("client builds"),
    );
    spawn(server::router(crcon)).await
}

async fn spawn(app: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind ephemeral port");
    let addr = listener.local_addr().expect("local addr");

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });

    format!("http://{}", addr)
}

async fn stub_gamestate(State(stub): State<Arc<StubCrcon>>, headers: HeaderMap) -> Response {
    stub.gamestate_hits.fetch_add(1, Ordering::SeqCst);
    *stub.gamestate_auth.lock().unwrap() = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);

    if stub.gamestate_http_error.load(Ordering::SeqCst) {
        return (StatusCode::SERVICE_UNAVAILABLE, "upstream down").into_response();
    }

    envelope(json!({
        "allied_score": 2,
        "axis_score": 1,
        "time_remaining": "0:42:17",
        "current_map": { "name": "foy_warfare", "pretty_name": "Foy" },
        "num_allied_players": 2,
        "num_axis_players": 1
    }))
    .into_response()
}

async fn stub_live_game_stats(State(stub): State<Arc<StubCrcon>>) -> Response {
    stub.stats_hits.fetch_add(1, Ordering::SeqCst);

    if stub.stats_logical_error.load(Ordering::SeqCst) {
        return Json(json!({ "result": null, "failed": true, "error": "no game running" }))
            .into_response();
    }

    envelope(json!({
        "stats": [
            player_stat("Tommy", "1", 7, 3),
            player_stat("Jack", "2", 2, 5),
            player_stat("Fritz", "3", 10, 1),
        ]
    }))
    .into_response()
}

async fn stub_team_view(State(stub): State<Arc<StubCrcon>>) -> Response {
    stub.team_view_hits.fetch_add(1, Ordering::SeqCst);

    envelope(json!({
        "allies": {
            "commander": null,
            "squads": {
                "able": {
                    "type": "infantry",
                    "players": [
                        { "name": "Tommy", "player_id": "1", "role": "officer", "level": 87 },
                        { "name": "Jack", "player_id": "2", "role": "rifleman", "level": 12 }
                    ]
                }
            },
            "unassigned": []
        },
        "axis": {
            "commander": null,
            "squads": {},
            "unassigned": [
                { "name": "Fritz", "player_id": "3", "role": "antitank", "level": 145 }
            ]
        }
    }))
    .into_response()
}

fn envelope(result: Value) -> Json<Value> {
    Json(json!({ "result": result, "failed": false, "error": null }))
}

/// A stat line that satisfies every required counter
pub fn player_stat(name: &str, id: &str, kills: u32, deaths: u32) -> Value {
    let ratio = if deaths == 0 {
        kills as f64
    } else {
        kills as f64 / deaths as f64
    };

    json!({
        "player": name,
        "player_id": id,
        "kills": kills,
        "deaths": deaths,
        "combat": kills * 12,
        "offense": 60,
        "defense": 40,
        "support": 25,
        "kills_streak": kills.min(4),
        "deaths_streak": 2,
        "kill_death_ratio": ratio,
        "time_seconds": 1800,
        "longest_life_secs": 420,
        "weapons": { "M1 GARAND": kills },
        "death_by": {},
        "most_killed": {}
    })
}
