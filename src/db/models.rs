use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::standings::outcome::resolve_outcome;

/// Upstream match identifier. Providers send either a number or a string;
/// it is always carried (and stored) as a string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "RawFixtureId", into = "String")]
pub struct FixtureId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawFixtureId {
    Text(String),
    Number(i64),
}

impl From<RawFixtureId> for FixtureId {
    fn from(raw: RawFixtureId) -> Self {
        match raw {
            RawFixtureId::Text(s) => FixtureId(s),
            RawFixtureId::Number(n) => FixtureId(n.to_string()),
        }
    }
}

impl From<FixtureId> for String {
    fn from(id: FixtureId) -> Self {
        id.0
    }
}

impl From<&str> for FixtureId {
    fn from(s: &str) -> Self {
        FixtureId(s.to_string())
    }
}

impl From<String> for FixtureId {
    fn from(s: String) -> Self {
        FixtureId(s)
    }
}

impl fmt::Display for FixtureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Match state as reported by the fixtures provider.
/// Only `Finished` fixtures count towards the actual table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchStatus {
    Scheduled,
    Timed,
    InPlay,
    Paused,
    Finished,
    Postponed,
    Suspended,
    Cancelled,
    Awarded,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Categorical result of a match, serialised with the usual 1/X/2 notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    #[serde(rename = "1")]
    HomeWin,
    #[serde(rename = "X")]
    Draw,
    #[serde(rename = "2")]
    AwayWin,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ScoreLine {
    #[serde(default)]
    pub home: Option<u32>,
    #[serde(default)]
    pub away: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchScore {
    #[serde(default)]
    pub full_time: ScoreLine,
}

/// One match of a league season, in the provider's JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Fixture {
    pub id: FixtureId,
    /// Matchday number
    pub round: u32,
    #[serde(default)]
    pub home: Option<String>,
    #[serde(default)]
    pub away: Option<String>,
    #[serde(default)]
    pub status: MatchStatus,
    #[serde(default)]
    pub score: MatchScore,
    /// Kickoff timestamp, display only
    #[serde(default)]
    pub utc_date: Option<String>,
}

impl Fixture {
    pub fn home_team(&self) -> Option<&str> {
        team_name(self.home.as_deref())
    }

    pub fn away_team(&self) -> Option<&str> {
        team_name(self.away.as_deref())
    }

    pub fn is_finished(&self) -> bool {
        self.status == MatchStatus::Finished
    }

    /// Full-time score, only when both sides are known.
    pub fn full_time_score(&self) -> Option<(u32, u32)> {
        Some((self.score.full_time.home?, self.score.full_time.away?))
    }

    /// Real result of the match: `None` unless finished with both scores present.
    pub fn actual_outcome(&self) -> Option<Outcome> {
        if !self.is_finished() {
            return None;
        }
        resolve_outcome(self.score.full_time.home, self.score.full_time.away)
    }

    pub fn in_cutoff(&self, cutoff: Option<u32>) -> bool {
        cutoff.map_or(true, |limit| self.round <= limit)
    }
}

fn team_name(name: Option<&str>) -> Option<&str> {
    name.filter(|n| !n.trim().is_empty())
}

/// A user's guess for one fixture. Either a 1/X/2 pick or an exact
/// scoreline (possibly half-entered); never both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PredictionRecord", into = "PredictionRecord")]
pub enum Prediction {
    Outcome(Outcome),
    Score { home: Option<u32>, away: Option<u32> },
}

impl Prediction {
    /// The outcome this prediction stands for, if it is complete enough to have one.
    pub fn predicted_outcome(&self) -> Option<Outcome> {
        match *self {
            Prediction::Outcome(outcome) => Some(outcome),
            Prediction::Score { home, away } => resolve_outcome(home, away),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(
            self,
            Prediction::Score {
                home: None,
                away: None
            }
        )
    }
}

/// Stored shape of a prediction: `{ "outcome": "1"|"X"|"2"|null, "home": n|null, "away": n|null }`.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
struct PredictionRecord {
    #[serde(default)]
    outcome: Option<Outcome>,
    #[serde(default)]
    home: Option<i64>,
    #[serde(default)]
    away: Option<i64>,
}

impl From<PredictionRecord> for Prediction {
    fn from(rec: PredictionRecord) -> Self {
        match rec.outcome {
            Some(outcome) => Prediction::Outcome(outcome),
            None => Prediction::Score {
                home: rec.home.and_then(|v| u32::try_from(v).ok()),
                away: rec.away.and_then(|v| u32::try_from(v).ok()),
            },
        }
    }
}

impl From<Prediction> for PredictionRecord {
    fn from(p: Prediction) -> Self {
        match p {
            Prediction::Outcome(outcome) => PredictionRecord {
                outcome: Some(outcome),
                home: None,
                away: None,
            },
            Prediction::Score { home, away } => PredictionRecord {
                outcome: None,
                home: home.map(i64::from),
                away: away.map(i64::from),
            },
        }
    }
}

/// Predictions of one league season, keyed by fixture.
pub type PredictionBook = HashMap<FixtureId, Prediction>;

/// One line of a league table. Rebuilt on every computation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamTableRow {
    pub team: String,
    pub played: u32,
    pub won: u32,
    pub draw: u32,
    pub lost: u32,
    pub goals_for: u32,
    pub goals_against: u32,
    pub goal_diff: i32,
    pub points: u32,
    /// Points with the user's predictions applied; only set on predicted tables.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub predicted_points: Option<i32>,
}

impl TeamTableRow {
    pub fn new(team: &str) -> Self {
        TeamTableRow {
            team: team.to_string(),
            played: 0,
            won: 0,
            draw: 0,
            lost: 0,
            goals_for: 0,
            goals_against: 0,
            goal_diff: 0,
            points: 0,
            predicted_points: None,
        }
    }
}
