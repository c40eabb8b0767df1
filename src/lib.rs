//! FanMatch page extraction
//!
//! Turns a daily schedule-and-results page from a college basketball ranking
//! service into one typed record per game plus an optional day summary.

pub mod data;
pub mod extract;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use data::{FanMatchScraper, FilePageSource, HttpPageSource, PageSource};
pub use extract::FanMatchParser;

/// Venue type inferred from the separator between the two teams
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameType {
    /// "A at B": team2 hosts
    HomeAway,
    /// "A vs. B": neutral site
    Neutral,
}

impl GameType {
    /// Separator used when rebuilding the matchup string
    pub fn separator(&self) -> &'static str {
        match self {
            GameType::HomeAway => " at ",
            GameType::Neutral => " vs. ",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameType::HomeAway => write!(f, "home-away"),
            GameType::Neutral => write!(f, "neutral"),
        }
    }
}

/// One parsed game row.
///
/// Field order is the public column order. Score fields (`team1Score`,
/// `team2Score`, `overtime`, `winner`, `loser`, `winnerScore`, `loserScore`,
/// `actualMOV`) are either all present or all absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRecord {
    pub team1: Option<String>,
    pub team1_rank: Option<String>,
    pub team2: Option<String>,
    pub team2_rank: Option<String>,
    pub game_type: Option<GameType>,
    pub conference: Option<String>,
    pub predicted_winner: Option<String>,
    pub predicted_loser: Option<String>,
    pub predicted_score: Option<String>,
    #[serde(rename = "predictedMOV")]
    pub predicted_mov: Option<i32>,
    pub win_probability: Option<String>,
    pub predicted_possessions: Option<u32>,
    pub actual_possessions: Option<u32>,
    pub team1_score: Option<u32>,
    pub team2_score: Option<u32>,
    pub overtime: Option<bool>,
    pub winner: Option<String>,
    pub loser: Option<String>,
    pub winner_score: Option<u32>,
    pub loser_score: Option<u32>,
    #[serde(rename = "actualMOV")]
    pub actual_mov: Option<u32>,
    pub thrill_score: Option<f64>,
    pub thrill_score_rank: Option<u32>,
    pub comeback: Option<f64>,
    pub comeback_rank: Option<u32>,
    pub excitement: Option<f64>,
    pub excitement_rank: Option<u32>,
    pub mvp: Option<String>,
    pub tournament: Option<String>,
    pub time: Option<String>,
    pub network: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub arena: Option<String>,
}

impl GameRecord {
    /// Public column names, in output order
    pub const COLUMNS: [&'static str; 34] = [
        "team1",
        "team1Rank",
        "team2",
        "team2Rank",
        "gameType",
        "conference",
        "predictedWinner",
        "predictedLoser",
        "predictedScore",
        "predictedMOV",
        "winProbability",
        "predictedPossessions",
        "actualPossessions",
        "team1Score",
        "team2Score",
        "overtime",
        "winner",
        "loser",
        "winnerScore",
        "loserScore",
        "actualMOV",
        "thrillScore",
        "thrillScoreRank",
        "comeback",
        "comebackRank",
        "excitement",
        "excitementRank",
        "mvp",
        "tournament",
        "time",
        "network",
        "city",
        "state",
        "arena",
    ];

    /// True once both final scores are known
    pub fn is_completed(&self) -> bool {
        self.team1_score.is_some() && self.team2_score.is_some()
    }

    /// Rebuild the "A at B" / "A vs. B" display string
    pub fn matchup(&self) -> String {
        let sep = self.game_type.map(|t| t.separator()).unwrap_or(" ");
        match (&self.team1, &self.team2) {
            (Some(a), Some(b)) => format!("{}{}{}", a, sep, b),
            (Some(a), None) | (None, Some(a)) => a.clone(),
            (None, None) => String::new(),
        }
    }

    /// Display values in `COLUMNS` order; null becomes an empty string
    pub fn to_row(&self) -> Vec<String> {
        fn s<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(|x| x.to_string()).unwrap_or_default()
        }

        vec![
            s(&self.team1),
            s(&self.team1_rank),
            s(&self.team2),
            s(&self.team2_rank),
            s(&self.game_type),
            s(&self.conference),
            s(&self.predicted_winner),
            s(&self.predicted_loser),
            s(&self.predicted_score),
            s(&self.predicted_mov),
            s(&self.win_probability),
            s(&self.predicted_possessions),
            s(&self.actual_possessions),
            s(&self.team1_score),
            s(&self.team2_score),
            s(&self.overtime),
            s(&self.winner),
            s(&self.loser),
            s(&self.winner_score),
            s(&self.loser_score),
            s(&self.actual_mov),
            s(&self.thrill_score),
            s(&self.thrill_score_rank),
            s(&self.comeback),
            s(&self.comeback_rank),
            s(&self.excitement),
            s(&self.excitement_rank),
            s(&self.mvp),
            s(&self.tournament),
            s(&self.time),
            s(&self.network),
            s(&self.city),
            s(&self.state),
            s(&self.arena),
        ]
    }
}

/// Day-level aggregate figures reported beneath the game table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSummary {
    pub points_per_game: Option<f64>,
    pub average_efficiency: Option<f64>,
    pub possessions_per_40: Option<f64>,
    pub mae_total_score: Option<f64>,
    pub bias_total_score: Option<f64>,
    pub mae_margin: Option<f64>,
    pub favorites_record: Option<String>,
    pub favorites_expected_record: Option<String>,
    pub exact_margin: Option<String>,
    pub lines_of_the_night: Vec<String>,
}

impl PageSummary {
    /// True when no figure and no line of the night was found
    pub fn is_empty(&self) -> bool {
        self.points_per_game.is_none()
            && self.average_efficiency.is_none()
            && self.possessions_per_40.is_none()
            && self.mae_total_score.is_none()
            && self.bias_total_score.is_none()
            && self.mae_margin.is_none()
            && self.favorites_record.is_none()
            && self.favorites_expected_record.is_none()
            && self.exact_margin.is_none()
            && self.lines_of_the_night.is_empty()
    }
}

/// Everything extracted from one page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FanMatchPage {
    /// Date the page reports, as `MM-DD`
    pub date: Option<String>,
    /// Date the caller asked for
    pub requested: Option<NaiveDate>,
    pub games: Vec<GameRecord>,
    pub summary: Option<PageSummary>,
}

impl FanMatchPage {
    /// Page with no games and no summary
    pub fn empty(date: Option<String>, requested: Option<NaiveDate>) -> Self {
        FanMatchPage {
            date,
            requested,
            games: Vec::new(),
            summary: None,
        }
    }

    pub fn completed_games(&self) -> impl Iterator<Item = &GameRecord> {
        self.games.iter().filter(|g| g.is_completed())
    }
}

/// Crate-wide errors
#[derive(Debug, Error)]
pub enum FanMatchError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Fetch failed for {url}: {message}")]
    Fetch { url: String, message: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid date {0:?}: expected YYYY-MM-DD")]
    InvalidDate(String),

    #[error("Outcome derivation requested before rows were assembled")]
    NotAssembled,
}

pub type Result<T> = std::result::Result<T, FanMatchError>;

/// Parse a caller date in `YYYY-MM-DD` form
pub fn parse_date_arg(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| FanMatchError::InvalidDate(s.to_string()))
}

/// Application configuration loaded from fanmatch.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub extractor: ExtractorConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub base_url: String,
    pub user_agent: String,
    pub timeout_secs: u64,
    /// Directory for cached HTML pages
    pub cache_dir: Option<String>,
    /// Only serve from cache_dir, never hit the network
    pub offline: bool,
    /// Pre-acquired session cookie sent with every request
    pub session_cookie: Option<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        SourceConfig {
            base_url: "https://kenpom.com/fanmatch.php".to_string(),
            user_agent: "fanmatch/0.1".to_string(),
            timeout_secs: 30,
            cache_dir: None,
            offline: false,
            session_cookie: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub selectors: Selectors,
    /// Rank badge text meaning "not ranked"
    pub not_ranked: String,
    /// Body text markers (case-insensitive) for a day without games
    pub no_games_markers: Vec<String>,
    /// Rows with fewer cells are not game rows
    pub min_cells: usize,
    pub summary: SummaryLabels,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        ExtractorConfig {
            selectors: Selectors::default(),
            not_ranked: "NR".to_string(),
            no_games_markers: vec!["no games".to_string()],
            min_cells: 5,
            summary: SummaryLabels::default(),
        }
    }
}

/// CSS selectors for every element the extractor reads
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    /// Tried in order until one yields a date phrase
    pub date_headers: Vec<String>,
    pub results_table: String,
    pub body_rows: String,
    pub team_link: String,
    pub rank_badge: String,
    pub conference: String,
    pub network: String,
    pub arena: String,
    pub metric_rank_span: String,
    pub metric_rank_block: String,
}

impl Default for Selectors {
    fn default() -> Self {
        Selectors {
            date_headers: vec!["#content-header h2".to_string(), "h2".to_string()],
            results_table: "table#fanmatch-table".to_string(),
            body_rows: "tbody > tr".to_string(),
            team_link: "a[href*=\"team.php\"]".to_string(),
            rank_badge: "span.seed".to_string(),
            conference: "span.conf".to_string(),
            network: "span.tv".to_string(),
            arena: "a span.arena".to_string(),
            metric_rank_span: "span.rank".to_string(),
            metric_rank_block: "div.rank".to_string(),
        }
    }
}

/// Label patterns for the day summary.
///
/// Each figure pattern is a regex whose first capture group is the value;
/// `exact_margin` captures hits and games in groups 1 and 2.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SummaryLabels {
    pub points_per_game: String,
    pub average_efficiency: String,
    pub possessions_per_40: String,
    pub mae_total_score: String,
    pub bias_total_score: String,
    pub mae_margin: String,
    pub favorites_record: String,
    pub favorites_expected_record: String,
    pub exact_margin: String,
    /// Marks the row that opens the lines of the night
    pub lines_header: String,
    /// A line containing any of these (case-insensitive) ends the lines of the night
    pub stop_keywords: Vec<String>,
}

impl Default for SummaryLabels {
    fn default() -> Self {
        const NUM: &str = r"(-?\d+(?:\.\d+)?)";
        SummaryLabels {
            points_per_game: format!(r"(?i)Points per game:\s*{}", NUM),
            average_efficiency: format!(r"(?i)Average efficiency:\s*{}", NUM),
            possessions_per_40: format!(r"(?i)Possessions per 40 minutes:\s*{}", NUM),
            mae_total_score: format!(
                r"(?i)(?:total score[^:•]*:\s*Mean absolute error|Mean absolute error[^:•]*?total score)[^:•]*:\s*{}",
                NUM
            ),
            bias_total_score: format!(r"(?i)\bBias[^:•]*:\s*{}", NUM),
            mae_margin: format!(
                r"(?i)(?:(?:margin|MOV)[^:•]*:\s*Mean absolute error|Mean absolute error[^:•]*?(?:margin|MOV))[^:•]*:\s*{}",
                NUM
            ),
            favorites_record: r"(?i)Record of favorites[^:•]*:\s*(\d+-\d+)".to_string(),
            favorites_expected_record: r"(?i)\(expected:\s*(\d+-\d+)\)".to_string(),
            exact_margin: r"(?i)Exact[^•]*?(\d+)\s+(?:of|/)\s+(\d+)".to_string(),
            lines_header: "the night".to_string(),
            stop_keywords: [
                "points per game:",
                "average efficiency:",
                "possessions per 40",
                "mean absolute error",
                "bias:",
                "record of favorites",
                "exact mov",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            FanMatchError::Config(format!("Failed to read config file {}: {}", path, e))
        })?;
        toml::from_str(&content)
            .map_err(|e| FanMatchError::Config(format!("Failed to parse config: {}", e)))
    }

    pub fn save(&self, path: &str) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| FanMatchError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn completed() -> GameRecord {
        GameRecord {
            team1: Some("Marquette".to_string()),
            team2: Some("Xavier".to_string()),
            game_type: Some(GameType::HomeAway),
            team1_score: Some(84),
            team2_score: Some(82),
            ..Default::default()
        }
    }

    #[test]
    fn test_matchup_separator() {
        let mut game = completed();
        assert_eq!(game.matchup(), "Marquette at Xavier");

        game.game_type = Some(GameType::Neutral);
        assert_eq!(game.matchup(), "Marquette vs. Xavier");

        game.game_type = None;
        assert_eq!(game.matchup(), "Marquette Xavier");
    }

    #[test]
    fn test_row_matches_columns() {
        let game = completed();
        let row = game.to_row();
        assert_eq!(row.len(), GameRecord::COLUMNS.len());
        assert_eq!(row[0], "Marquette");
        assert_eq!(row[4], "home-away");
        assert_eq!(row[13], "84");
        assert_eq!(row[16], "");
    }

    #[test]
    fn test_json_column_names() {
        let value = serde_json::to_value(completed()).unwrap();
        let keys: Vec<&str> = value
            .as_object()
            .unwrap()
            .keys()
            .map(|k| k.as_str())
            .collect();
        for column in GameRecord::COLUMNS {
            assert!(keys.contains(&column), "missing {}", column);
        }
    }

    #[test]
    fn test_parse_date_arg() {
        assert_eq!(
            parse_date_arg("2020-01-29").unwrap(),
            NaiveDate::from_ymd_opt(2020, 1, 29).unwrap()
        );
        assert!(matches!(
            parse_date_arg("01/29/2020"),
            Err(FanMatchError::InvalidDate(_))
        ));
    }

    #[test]
    fn test_config_roundtrip() {
        let config = Config::default();
        let text = toml::to_string_pretty(&config).unwrap();
        let back: Config = toml::from_str(&text).unwrap();
        assert_eq!(back.extractor.min_cells, 5);
        assert_eq!(back.extractor.selectors.rank_badge, "span.seed");
        assert_eq!(back.source.base_url, config.source.base_url);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let config: Config = toml::from_str("[source]\noffline = true\n").unwrap();
        assert!(config.source.offline);
        assert_eq!(config.source.timeout_secs, 30);
        assert_eq!(config.extractor.not_ranked, "NR");
    }
}
