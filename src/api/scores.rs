//! Shared leaderboard submissions (`game_scores` table)

use serde::{Deserialize, Serialize};

use super::ApiError;
use crate::highscores::MAX_NAME_LEN;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// Raw `POST /api/scores` body
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreForm {
    pub player_name: Option<String>,
    pub score: Option<i64>,
    pub game: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewScore {
    pub player_name: String,
    pub score: u64,
    pub game: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRow {
    pub id: u64,
    pub player_name: String,
    pub score: u64,
    pub game: String,
    pub created_at: String,
}

impl ScoreForm {
    pub fn validate(self) -> Result<NewScore, ApiError> {
        let name = self.player_name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(ApiError::Validation("Player name is required".into()));
        }
        let player_name: String = name.chars().take(MAX_NAME_LEN).collect();

        let score = match self.score {
            Some(s) if s >= 0 => s as u64,
            Some(_) => return Err(ApiError::Validation("Score cannot be negative".into())),
            None => return Err(ApiError::Validation("Score is required".into())),
        };

        let game = self.game.as_deref().map(str::trim).unwrap_or_default();
        if game.is_empty() {
            return Err(ApiError::Validation("Game is required".into()));
        }

        Ok(NewScore {
            player_name: player_name.trim_end().to_string(),
            score,
            game: game.to_string(),
        })
    }
}

/// Raw `GET /api/scores?game=&limit=` parameters, already percent-decoded
///
/// `limit` stays text so a malformed value falls back to the default
/// instead of rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScoreParams {
    pub game: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreQuery {
    pub game: Option<String>,
    pub limit: usize,
}

impl From<ScoreParams> for ScoreQuery {
    /// Unparseable limits fall back to the default; the rest clamp to 1..=100
    fn from(params: ScoreParams) -> Self {
        let game = params
            .game
            .map(|g| g.trim().to_string())
            .filter(|g| !g.is_empty());
        let limit = params
            .limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .map(|l| l.clamp(1, MAX_LIMIT as i64) as usize)
            .unwrap_or(DEFAULT_LIMIT);
        Self { game, limit }
    }
}

const MOCK_CREATED_AT: &str = "2026-06-01T12:00:00.000Z";

const MOCK_SCORES: [(&str, u64, &str); 10] = [
    ("Uncle Dave", 2450, "dogRun"),
    ("Maid of Honor", 1980, "dogRun"),
    ("Grandma Rose", 1210, "dogRun"),
    ("Best Man", 860, "eggCatch"),
    ("Flower Girl", 640, "eggCatch"),
    ("Cousin Mia", 410, "eggCatch"),
    ("Ring Bearer", 530, "catSwat"),
    ("Aunt Lou", 380, "catSwat"),
    ("The Groom", 4200, "aisleWalk"),
    ("The Bride", 4350, "aisleWalk"),
];

/// Static leaderboard served when no database is configured
pub fn mock_leaderboard(query: &ScoreQuery) -> Vec<ScoreRow> {
    let mut rows: Vec<ScoreRow> = MOCK_SCORES
        .iter()
        .enumerate()
        .filter(|(_, (_, _, game))| query.game.as_deref().is_none_or(|g| g == *game))
        .map(|(i, (name, score, game))| ScoreRow {
            id: i as u64 + 1,
            player_name: name.to_string(),
            score: *score,
            game: game.to_string(),
            created_at: MOCK_CREATED_AT.to_string(),
        })
        .collect();
    rows.sort_by(|a, b| b.score.cmp(&a.score));
    rows.truncate(query.limit);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(game: Option<&str>, limit: Option<&str>) -> ScoreQuery {
        ScoreQuery::from(ScoreParams {
            game: game.map(str::to_string),
            limit: limit.map(str::to_string),
        })
    }

    #[test]
    fn test_limit_defaults_and_clamps() {
        assert_eq!(query(None, None).limit, DEFAULT_LIMIT);
        assert_eq!(query(None, Some("500")).limit, MAX_LIMIT);
        assert_eq!(query(None, Some("0")).limit, 1);
        assert_eq!(query(None, Some("-3")).limit, 1);
        assert_eq!(query(None, Some("abc")).limit, DEFAULT_LIMIT);
        assert_eq!(query(None, Some(" 25 ")).limit, 25);
    }

    #[test]
    fn test_blank_game_means_all_games() {
        assert_eq!(query(Some("  "), None).game, None);
    }

    #[test]
    fn test_score_validation() {
        let ok = ScoreForm {
            player_name: Some("  Bartholomew Fitzwilliam III ".into()),
            score: Some(120),
            game: Some("dogRun".into()),
        }
        .validate()
        .unwrap();
        assert_eq!(ok.player_name, "Bartholomew Fitzwill");
        assert_eq!(ok.score, 120);

        let negative = ScoreForm {
            player_name: Some("Ana".into()),
            score: Some(-1),
            game: Some("dogRun".into()),
        };
        assert!(matches!(negative.validate(), Err(ApiError::Validation(_))));

        let nameless = ScoreForm {
            player_name: Some(" ".into()),
            score: Some(1),
            game: Some("dogRun".into()),
        };
        assert!(matches!(nameless.validate(), Err(ApiError::Validation(_))));

        let gameless = ScoreForm {
            player_name: Some("Ana".into()),
            score: Some(1),
            game: None,
        };
        assert!(matches!(gameless.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_mock_leaderboard_filters_and_sorts() {
        let rows = mock_leaderboard(&ScoreQuery {
            game: Some("aisleWalk".into()),
            limit: 10,
        });
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].player_name, "The Bride");

        let top = mock_leaderboard(&ScoreQuery {
            game: None,
            limit: 3,
        });
        assert_eq!(top.len(), 3);
        assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
    }
}
