use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::{debug, warn};

use crate::api::UpstreamError;
use crate::models::AggregatedSnapshot;

use super::AppState;

/// The aggregation handler. Fans out to the three upstream endpoints
/// concurrently, waits for all of them to settle, and either assembles a
/// complete snapshot or reports every failure at once. Partial results are
/// discarded: a dashboard showing empty stats is worse than a dashboard
/// showing a clear connection error.
pub async fn live_stats(State(state): State<AppState>) -> Response {
    let (gamestate, stats, team_view) = tokio::join!(
        state.crcon.get_gamestate(),
        state.crcon.get_live_game_stats(),
        state.crcon.get_team_view(),
    );

    let response = match (gamestate, stats, team_view) {
        (Ok(gamestate), Ok(stats), Ok(team_view)) => {
            let snapshot = AggregatedSnapshot::new(gamestate, stats, team_view);
            debug!(
                "Snapshot assembled: {} players, map {}",
                snapshot.stats.len(),
                snapshot.gamestate.current_map.name()
            );
            (StatusCode::OK, Json(snapshot)).into_response()
        }
        (gamestate, stats, team_view) => {
            let errors: Vec<UpstreamError> = gamestate
                .err()
                .into_iter()
                .chain(stats.err())
                .chain(team_view.err())
                .collect();

            let (error, details) = failure_summary(&errors);
            warn!("Aggregation failed: {}", details);

            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({
                    "failed": true,
                    "error": error,
                    "details": details,
                })),
            )
                .into_response()
        }
    };

    with_no_store(response)
}

/// One human-readable summary naming every failing endpoint, plus the raw
/// messages for diagnostics.
fn failure_summary(errors: &[UpstreamError]) -> (String, String) {
    let names: Vec<String> = errors.iter().map(|e| e.endpoint().to_string()).collect();
    let details: Vec<String> = errors.iter().map(|e| e.to_string()).collect();

    (
        format!("Game server fetch failed for: {}", names.join(", ")),
        details.join("; "),
    )
}

/// Live game data has sub-minute relevance; every response forbids caching
/// so each client request triggers a fresh upstream round-trip.
fn with_no_store(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::CACHE_CONTROL,
        HeaderValue::from_static("no-store, no-cache, must-revalidate"),
    );
    headers.insert(header::PRAGMA, HeaderValue::from_static("no-cache"));
    headers.insert(header::EXPIRES, HeaderValue::from_static("0"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Endpoint;

    #[test]
    fn failure_summary_names_every_failing_endpoint() {
        let errors = vec![
            UpstreamError::Http {
                endpoint: Endpoint::Gamestate,
                status: 503,
            },
            UpstreamError::Logical {
                endpoint: Endpoint::TeamView,
                message: "no game running".to_string(),
            },
        ];

        let (error, details) = failure_summary(&errors);
        assert!(error.contains("Gamestate"));
        assert!(error.contains("Team View"));
        assert!(details.contains("HTTP 503"));
        assert!(details.contains("no game running"));
    }
}
