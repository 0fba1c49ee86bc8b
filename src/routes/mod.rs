use axum::Router;

use crate::state::SharedState;

/// `/register` and `/login`.
pub mod auth;
/// Swagger UI and the OpenAPI document.
pub mod docs;
/// Extractors that reject with JSON error bodies.
pub mod extract;
/// `/games` routes.
pub mod game;
/// `/health`.
pub mod health;
/// Caller identity from the `X-User-Id` header.
pub mod identity;
/// `/leaderboard`.
pub mod leaderboard;
/// `/users/{id}/games`.
pub mod users;

/// Compose all route trees, wiring in shared state and documentation routes.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(auth::router())
        .merge(game::router())
        .merge(leaderboard::router())
        .merge(users::router());

    let docs_router = docs::router(state.clone());

    api_router.merge(docs_router).with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode},
    };
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use super::*;
    use crate::{config::AppConfig, dao::game_store::memory::InMemoryGameStore, state::AppState};

    async fn app() -> Router {
        let state =
            AppState::with_store(AppConfig::default(), Arc::new(InMemoryGameStore::new())).await;
        router(state)
    }

    async fn call(
        app: &Router,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header("X-User-Id", user);
        }
        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string())),
            None => request.body(Body::empty()),
        }
        .unwrap();

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    async fn signup(app: &Router, username: &str) -> String {
        let credentials = json!({"username": username, "password": "pw"});
        let (status, _) = call(app, "POST", "/register", None, Some(credentials.clone())).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, body) = call(app, "POST", "/login", None, Some(credentials)).await;
        assert_eq!(status, StatusCode::OK);
        body["user_id"].as_str().unwrap().to_owned()
    }

    #[tokio::test]
    async fn full_game_over_http() {
        let app = app().await;
        let alice = signup(&app, "alice").await;
        let bob = signup(&app, "bob").await;

        let (status, body) = call(
            &app,
            "POST",
            "/games/start",
            Some(&alice),
            Some(json!({"opponent_username": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        let game_id = body["game_id"].as_str().unwrap().to_owned();
        let move_uri = format!("/games/{game_id}/move");

        let (status, body) = call(
            &app,
            "POST",
            &move_uri,
            Some(&bob),
            Some(json!({"row": 0, "col": 0, "symbol": "O"})),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["message"], "forbidden: not your turn");

        for (user, row, col, symbol) in [
            (&alice, 0, 0, "X"),
            (&bob, 1, 0, "O"),
            (&alice, 0, 1, "X"),
            (&bob, 1, 1, "O"),
        ] {
            let (status, _) = call(
                &app,
                "POST",
                &move_uri,
                Some(user),
                Some(json!({"row": row, "col": col, "symbol": symbol})),
            )
            .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = call(
            &app,
            "POST",
            &move_uri,
            Some(&alice),
            Some(json!({"row": 3, "col": 0, "symbol": "X"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("out of bounds"));

        let (status, body) = call(
            &app,
            "POST",
            &move_uri,
            Some(&alice),
            Some(json!({"row": 0, "col": 2, "symbol": "X"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "finished");
        assert_eq!(body["outcome"]["kind"], "won");

        let (_, state) = call(&app, "GET", &format!("/games/{game_id}"), None, None).await;
        assert_eq!(state["winner"], alice.as_str());
        assert_eq!(state["board"][0], json!(["X", "X", "X"]));

        let (_, board) = call(&app, "GET", "/leaderboard", None, None).await;
        assert_eq!(board[0]["username"], "alice");
        assert_eq!(board[0]["win_count"], 1);
        assert_eq!(board[1]["loss_count"], 1);

        let (_, history) = call(&app, "GET", &format!("/users/{bob}/games"), None, None).await;
        assert_eq!(history[0]["result"], "loss");
        assert_eq!(history[0]["opponent"], alice.as_str());
    }

    #[tokio::test]
    async fn identity_and_lookup_errors() {
        let app = app().await;
        let alice = signup(&app, "alice").await;

        let (status, _) = call(
            &app,
            "POST",
            "/games/start",
            None,
            Some(json!({"opponent_username": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = call(
            &app,
            "POST",
            "/games/start",
            Some(&alice),
            Some(json!({"opponent_username": "bob"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = call(
            &app,
            "POST",
            "/games/start",
            Some(&alice),
            Some(json!({"opponent_username": "alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = call(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({"username": "alice", "password": "again"})),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn malformed_input_is_a_json_bad_request() {
        let app = app().await;
        let alice = signup(&app, "alice").await;
        signup(&app, "bob").await;

        let (_, body) = call(
            &app,
            "POST",
            "/games/start",
            Some(&alice),
            Some(json!({"opponent_username": "bob"})),
        )
        .await;
        let move_uri = format!("/games/{}/move", body["game_id"].as_str().unwrap());

        let (status, body) = call(
            &app,
            "POST",
            &move_uri,
            Some(&alice),
            Some(json!({"row": 0, "col": 0, "symbol": "Z"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, body) = call(
            &app,
            "POST",
            &move_uri,
            Some(&alice),
            Some(json!({"row": "zero", "col": 0, "symbol": "X"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, body) = call(
            &app,
            "POST",
            "/register",
            None,
            Some(json!({"username": " padded", "password": "pw"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("username"));

        let (status, body) = call(
            &app,
            "POST",
            "/login",
            None,
            Some(json!({"username": "alice"})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, body) = call(&app, "GET", "/leaderboard?limit=0", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (status, body) = call(&app, "GET", "/leaderboard?limit=many", None, None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].is_string());

        let (_, game) = call(&app, "GET", &move_uri.replace("/move", ""), None, None).await;
        assert_eq!(game["moves"], json!([]));
    }

    #[tokio::test]
    async fn degraded_backend_answers_503() {
        let app = router(AppState::new(AppConfig::default()));
        let (status, body) = call(&app, "GET", "/leaderboard", None, None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body["message"].is_string());

        let (status, body) = call(&app, "GET", "/health", None, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "degraded");
    }
}
