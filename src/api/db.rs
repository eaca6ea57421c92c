//! Database port for the RSVP and score handlers

use async_trait::async_trait;

use super::rsvp::{NewRsvp, RsvpRow};
use super::scores::{NewScore, ScoreRow};

#[derive(thiserror::Error, Debug)]
pub enum DbError {
    #[error("database connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("stored row is out of range: {0}")]
    Decode(String),
}

impl From<sqlx::Error> for DbError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed => DbError::Connection(err.to_string()),
            other => DbError::Query(other.to_string()),
        }
    }
}

/// The two tables the site writes: `rsvps` and `game_scores`
#[async_trait]
pub trait Database: Send + Sync {
    async fn insert_rsvp(&self, rsvp: NewRsvp, created_at: String) -> Result<RsvpRow, DbError>;

    /// All RSVPs, newest first
    async fn list_rsvps(&self) -> Result<Vec<RsvpRow>, DbError>;

    async fn insert_score(&self, score: NewScore, created_at: String) -> Result<ScoreRow, DbError>;

    /// Highest scores first (earlier submissions ahead on ties), optionally
    /// for one game
    async fn top_scores(&self, game: Option<&str>, limit: usize) -> Result<Vec<ScoreRow>, DbError>;
}
