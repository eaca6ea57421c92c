//! RSVP and score routes end to end

use std::sync::Mutex;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{Value, json};
use wedding_arcade::api::{
    Api, Database, DbError, NewRsvp, NewScore, RsvpRow, ScoreRow, router,
};

const NOW: i64 = 1_781_956_800_250;

fn server(api: Api) -> TestServer {
    TestServer::new(router(api)).unwrap()
}

fn mock() -> TestServer {
    server(Api::mock().with_clock(|| NOW))
}

fn rsvp_body() -> Value {
    json!({
        "name": "  Ana Lima ",
        "email": "Ana@Example.COM",
        "attending": true,
        "guest_count": 2,
        "dietary_restrictions": "",
        "potluck_dish": " lemon bars ",
        "message": "See you there!"
    })
}

/// Tables kept in process for the duration of one test
#[derive(Default)]
struct Tables {
    rsvps: Mutex<Vec<RsvpRow>>,
    scores: Mutex<Vec<ScoreRow>>,
    next_id: AtomicI64,
}

impl Tables {
    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::SeqCst) as u64 + 1
    }
}

#[async_trait]
impl Database for Tables {
    async fn insert_rsvp(&self, rsvp: NewRsvp, created_at: String) -> Result<RsvpRow, DbError> {
        let row = RsvpRow {
            id: self.next_id(),
            rsvp,
            created_at,
        };
        self.rsvps.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn list_rsvps(&self) -> Result<Vec<RsvpRow>, DbError> {
        let mut rows = self.rsvps.lock().unwrap().clone();
        rows.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(rows)
    }

    async fn insert_score(&self, score: NewScore, created_at: String) -> Result<ScoreRow, DbError> {
        let row = ScoreRow {
            id: self.next_id(),
            player_name: score.player_name,
            score: score.score,
            game: score.game,
            created_at,
        };
        self.scores.lock().unwrap().push(row.clone());
        Ok(row)
    }

    async fn top_scores(&self, game: Option<&str>, limit: usize) -> Result<Vec<ScoreRow>, DbError> {
        let mut rows: Vec<ScoreRow> = self
            .scores
            .lock()
            .unwrap()
            .iter()
            .filter(|r| game.is_none_or(|g| r.game == g))
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows.truncate(limit);
        Ok(rows)
    }
}

/// A database whose every query fails
struct Unreachable;

#[async_trait]
impl Database for Unreachable {
    async fn insert_rsvp(&self, _: NewRsvp, _: String) -> Result<RsvpRow, DbError> {
        Err(DbError::Query("relation \"rsvps\" does not exist".into()))
    }

    async fn list_rsvps(&self) -> Result<Vec<RsvpRow>, DbError> {
        Err(DbError::Connection("timeout".into()))
    }

    async fn insert_score(&self, _: NewScore, _: String) -> Result<ScoreRow, DbError> {
        Err(DbError::Connection("timeout".into()))
    }

    async fn top_scores(&self, _: Option<&str>, _: usize) -> Result<Vec<ScoreRow>, DbError> {
        Err(DbError::Connection("timeout".into()))
    }
}

#[tokio::test]
async fn test_mock_rsvp_echoes_normalized_row() {
    let response = mock().post("/api/rsvp").json(&rsvp_body()).await;

    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["mock"], true);
    let data = &body["data"];
    assert_eq!(data["name"], "Ana Lima");
    assert_eq!(data["email"], "ana@example.com");
    assert_eq!(data["guest_count"], 2);
    assert_eq!(data["dietary_restrictions"], Value::Null);
    assert_eq!(data["potluck_dish"], "lemon bars");
    assert_eq!(data["created_at"], "2026-06-20T12:00:00.250Z");
}

#[tokio::test]
async fn test_invalid_rsvp_is_rejected() {
    let server = mock();
    let response = server
        .post("/api/rsvp")
        .json(&json!({ "name": "Ana", "attending": false }))
        .await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
    let body: Value = response.json();
    assert!(body["error"].as_str().is_some_and(|e| e.contains("email")));

    let garbage = server
        .post("/api/rsvp")
        .content_type("application/json")
        .text("{not json")
        .await;
    assert_eq!(garbage.status_code(), StatusCode::BAD_REQUEST);
    assert_eq!(garbage.json::<Value>()["error"], "Request body must be valid JSON");

    // Wrong field types are a bad body too, not an unprocessable entity
    let mistyped = server
        .post("/api/rsvp")
        .json(&json!({ "name": "Ana", "email": "a@b.c", "attending": "yes" }))
        .await;
    assert_eq!(mistyped.status_code(), StatusCode::BAD_REQUEST);

    let empty = server.post("/api/rsvp").await;
    assert_eq!(empty.status_code(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_routes_and_methods() {
    let server = mock();
    let missing = server.get("/api/guests").await;
    assert_eq!(missing.status_code(), StatusCode::NOT_FOUND);
    assert!(missing.json::<Value>()["error"].is_string());

    let wrong = server.delete("/api/scores").await;
    assert_eq!(wrong.status_code(), StatusCode::METHOD_NOT_ALLOWED);
    assert!(wrong.json::<Value>()["error"].is_string());
}

#[tokio::test]
async fn test_mock_leaderboard_respects_query() {
    let response = mock().get("/api/scores?game=dogRun&limit=2").await;
    assert_eq!(response.status_code(), StatusCode::OK);
    let body: Value = response.json();
    assert_eq!(body["mock"], true);
    let rows: Vec<ScoreRow> = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.game == "dogRun"));
    assert!(rows[0].score >= rows[1].score);
}

#[tokio::test]
async fn test_query_parameters_are_percent_decoded() {
    let server = mock();
    let plain = server.get("/api/scores?game=dogRun").await.json::<Value>();
    let encoded = server.get("/api/scores?game=dog%52un").await.json::<Value>();
    assert_eq!(plain["data"], encoded["data"]);
    assert!(!encoded["data"].as_array().is_some_and(|rows| rows.is_empty()));

    let spaced = server
        .get("/api/scores")
        .add_query_param("game", "aisleWalk")
        .add_query_param("limit", "1")
        .await
        .json::<Value>();
    assert_eq!(spaced["data"][0]["player_name"], "The Bride");
}

#[tokio::test]
async fn test_database_round_trip() {
    let clock = std::sync::Arc::new(AtomicI64::new(NOW));
    let ticks = clock.clone();
    let server = server(
        Api::with_database(Tables::default())
            .with_clock(move || ticks.fetch_add(1_000, Ordering::SeqCst)),
    );

    for (name, score) in [("Ana", 300), ("Ben", 900), ("Cy", 900), ("Di", 120)] {
        let body = json!({ "player_name": name, "score": score, "game": "eggCatch" });
        let response = server.post("/api/scores").json(&body).await;
        assert_eq!(response.status_code(), StatusCode::OK);
        assert_eq!(response.json::<Value>()["mock"], false);
    }
    let other = json!({ "player_name": "Ed", "score": 5000, "game": "dogRun" });
    server.post("/api/scores").json(&other).await;

    let body: Value = server.get("/api/scores?game=eggCatch&limit=3").await.json();
    let rows: Vec<ScoreRow> = serde_json::from_value(body["data"].clone()).unwrap();
    let names: Vec<&str> = rows.iter().map(|r| r.player_name.as_str()).collect();
    // Ties keep submission order
    assert_eq!(names, vec!["Ben", "Cy", "Ana"]);

    server.post("/api/rsvp").json(&rsvp_body()).await;
    let later = json!({ "name": "Bo", "email": "bo@example.com", "attending": false });
    server.post("/api/rsvp").json(&later).await;
    let body: Value = server.get("/api/rsvp").await.json();
    assert_eq!(body["mock"], false);
    let rows: Vec<RsvpRow> = serde_json::from_value(body["data"].clone()).unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].rsvp.name, "Bo");
    assert_eq!(rows[0].rsvp.guest_count, 0);
}

#[tokio::test]
async fn test_database_failure_is_a_generic_500() {
    let server = server(Api::with_database(Unreachable));
    let response = server.post("/api/rsvp").json(&rsvp_body()).await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = response.json();
    let message = body["error"].as_str().unwrap_or_default();
    assert!(!message.is_empty());
    assert!(!message.contains("rsvps"));

    let response = server.get("/api/scores").await;
    assert_eq!(response.status_code(), StatusCode::INTERNAL_SERVER_ERROR);

    // Validation still runs before the database is touched
    let response = server.post("/api/rsvp").json(&json!({})).await;
    assert_eq!(response.status_code(), StatusCode::BAD_REQUEST);
}
