//! RSVP and score API
//!
//! `routes::router` serves `/api/rsvp` and `/api/scores` over axum. Without a
//! configured database every route answers from mock data with `mock: true`
//! instead of failing; a configured database that cannot be reached refuses
//! to start.

pub mod db;
pub mod pg;
pub mod routes;
pub mod rsvp;
pub mod scores;

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::json;
use time::OffsetDateTime;
use time::format_description::FormatItem;
use time::macros::format_description;

pub use db::{Database, DbError};
pub use pg::PgDatabase;
pub use routes::router;
pub use rsvp::{NewRsvp, RsvpForm, RsvpRow};
pub use scores::{NewScore, ScoreForm, ScoreParams, ScoreQuery, ScoreRow};

/// Environment variable holding the connection string
pub const DATABASE_URL_VAR: &str = "DATABASE_URL";

/// Environment variable capping the pool size
pub const MAX_CONNECTIONS_VAR: &str = "DATABASE_MAX_CONNECTIONS";

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Fixed-width UTC stamps so rows sort lexicographically by time
const TIMESTAMP_FORMAT: &[FormatItem<'static>] =
    format_description!("[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z");

const GENERIC_ERROR: &str = "Something went wrong. Please try again.";

#[derive(thiserror::Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("invalid request body: {0}")]
    BadBody(String),

    #[error("no route for {0}")]
    NotFound(String),

    #[error("method {method} not allowed on {path}")]
    MethodNotAllowed { method: String, path: String },

    #[error(transparent)]
    Database(#[from] DbError),
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::BadBody(err.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadBody(rejection.body_text())
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) | ApiError::BadBody(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::MethodNotAllowed { .. } => StatusCode::METHOD_NOT_ALLOWED,
            ApiError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message safe to show the guest; server faults stay generic
    pub fn public_message(&self) -> String {
        match self {
            ApiError::Database(_) => GENERIC_ERROR.to_string(),
            ApiError::BadBody(_) => "Request body must be valid JSON".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Database(cause) => log::error!("API request failed: {}", cause),
            other => log::debug!("API request rejected: {}", other),
        }
        (self.status(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Success body: the payload plus whether it came from mock data
#[derive(Debug, Serialize)]
pub struct Envelope<T> {
    pub data: T,
    pub mock: bool,
}

/// Handler configuration, read from the environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: DEFAULT_MAX_CONNECTIONS,
        }
    }
}

impl ApiConfig {
    /// Read `DATABASE_URL`; absent or blank means mock mode
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let database_url = lookup(DATABASE_URL_VAR)
            .map(|url| url.trim().to_string())
            .filter(|url| !url.is_empty());
        let max_connections = lookup(MAX_CONNECTIONS_VAR)
            .and_then(|n| n.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        Self {
            database_url,
            max_connections,
        }
    }

    pub fn is_mock(&self) -> bool {
        self.database_url.is_none()
    }
}

/// Format a unix timestamp (ms) as a UTC `created_at` stamp
pub fn format_timestamp(now_ms: i64) -> String {
    let nanos = now_ms as i128 * 1_000_000;
    OffsetDateTime::from_unix_timestamp_nanos(nanos)
        .ok()
        .and_then(|dt| dt.format(&TIMESTAMP_FORMAT).ok())
        .unwrap_or_else(|| "1970-01-01T00:00:00.000Z".to_string())
}

/// Millisecond wall clock used to stamp new rows
pub type Clock = Arc<dyn Fn() -> i64 + Send + Sync>;

fn system_clock() -> Clock {
    Arc::new(|| {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    })
}

/// The handlers' shared state; mock mode when no database is attached
pub struct Api {
    db: Option<Box<dyn Database>>,
    clock: Clock,
}

impl Api {
    pub fn mock() -> Self {
        Self {
            db: None,
            clock: system_clock(),
        }
    }

    pub fn with_database(db: impl Database + 'static) -> Self {
        Self {
            db: Some(Box::new(db)),
            clock: system_clock(),
        }
    }

    /// Replace the wall clock (tests pin it)
    pub fn with_clock(mut self, clock: impl Fn() -> i64 + Send + Sync + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Mock mode when unconfigured, otherwise connect to Postgres and make
    /// sure the tables exist. A configured but unreachable database is an
    /// error, never a silent fallback.
    pub async fn connect(config: &ApiConfig) -> Result<Self, DbError> {
        match config.database_url.as_deref() {
            None => {
                log::info!("{} not set, serving mock data", DATABASE_URL_VAR);
                Ok(Self::mock())
            }
            Some(url) => {
                let db = PgDatabase::connect(url, config.max_connections).await?;
                db.ensure_schema().await?;
                Ok(Self::with_database(db))
            }
        }
    }

    pub fn is_mock(&self) -> bool {
        self.db.is_none()
    }

    fn now_ms(&self) -> i64 {
        (self.clock)()
    }

    pub async fn create_rsvp(&self, form: RsvpForm) -> Result<Envelope<RsvpRow>, ApiError> {
        let rsvp = form.validate()?;
        let now_ms = self.now_ms();
        let created_at = format_timestamp(now_ms);
        match self.db.as_deref() {
            Some(db) => {
                let row = db.insert_rsvp(rsvp, created_at).await?;
                log::info!("RSVP {} stored", row.id);
                Ok(Envelope {
                    data: row,
                    mock: false,
                })
            }
            None => Ok(Envelope {
                data: RsvpRow {
                    id: now_ms.max(0) as u64,
                    rsvp,
                    created_at,
                },
                mock: true,
            }),
        }
    }

    pub async fn list_rsvps(&self) -> Result<Envelope<Vec<RsvpRow>>, ApiError> {
        match self.db.as_deref() {
            Some(db) => Ok(Envelope {
                data: db.list_rsvps().await?,
                mock: false,
            }),
            None => Ok(Envelope {
                data: Vec::new(),
                mock: true,
            }),
        }
    }

    pub async fn create_score(&self, form: ScoreForm) -> Result<Envelope<ScoreRow>, ApiError> {
        let score = form.validate()?;
        let now_ms = self.now_ms();
        let created_at = format_timestamp(now_ms);
        match self.db.as_deref() {
            Some(db) => Ok(Envelope {
                data: db.insert_score(score, created_at).await?,
                mock: false,
            }),
            None => Ok(Envelope {
                data: ScoreRow {
                    id: now_ms.max(0) as u64,
                    player_name: score.player_name,
                    score: score.score,
                    game: score.game,
                    created_at,
                },
                mock: true,
            }),
        }
    }

    pub async fn list_scores(&self, query: &ScoreQuery) -> Result<Envelope<Vec<ScoreRow>>, ApiError> {
        match self.db.as_deref() {
            Some(db) => Ok(Envelope {
                data: db.top_scores(query.game.as_deref(), query.limit).await?,
                mock: false,
            }),
            None => Ok(Envelope {
                data: scores::mock_leaderboard(query),
                mock: true,
            }),
        }
    }
}
