//! Final score and overtime decomposition of the game cell

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::dom::{selector, skeleton, trailing_text};
use super::{Decomposer, PartialRecord};
use crate::{ExtractorConfig, Result};

static RE_TRAILING_SCORE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d{2,3})\b").expect("invalid regex: trailing score"));

static RE_OVERTIME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\((\d*)OT\)").expect("invalid regex: overtime"));

/// Reads the score that trails each team link
pub struct ScoreDecomposer {
    team_link: Selector,
    rank_badge: Selector,
}

impl ScoreDecomposer {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(ScoreDecomposer {
            team_link: selector(&config.selectors.team_link)?,
            rank_badge: selector(&config.selectors.rank_badge)?,
        })
    }
}

impl Decomposer for ScoreDecomposer {
    fn column(&self) -> &'static str {
        "Game"
    }

    fn decompose(&self, cell: ElementRef<'_>, _so_far: &PartialRecord) -> PartialRecord {
        let scores: Vec<u32> = cell
            .select(&self.team_link)
            .take(2)
            .filter_map(trailing_text)
            .filter_map(|text| RE_TRAILING_SCORE.captures(text))
            .filter_map(|caps| caps[1].parse().ok())
            .collect();

        if scores.len() < 2 {
            return PartialRecord::default();
        }

        let skel = skeleton(cell, &self.team_link, &self.rank_badge);
        PartialRecord {
            team1_score: Some(scores[0]),
            team2_score: Some(scores[1]),
            overtime: Some(RE_OVERTIME.is_match(&skel)),
            ..Default::default()
        }
    }
}

/// Winner/loser roles derived from two final scores
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub winner: String,
    pub loser: String,
    pub winner_score: u32,
    pub loser_score: u32,
    pub margin: u32,
}

impl Outcome {
    /// `None` unless both teams and both scores are known and differ
    pub fn derive(
        team1: Option<&str>,
        team2: Option<&str>,
        team1_score: Option<u32>,
        team2_score: Option<u32>,
    ) -> Option<Outcome> {
        let (t1, t2, s1, s2) = (team1?, team2?, team1_score?, team2_score?);
        let (winner, loser, ws, ls) = match s1.cmp(&s2) {
            std::cmp::Ordering::Greater => (t1, t2, s1, s2),
            std::cmp::Ordering::Less => (t2, t1, s2, s1),
            std::cmp::Ordering::Equal => return None,
        };

        Some(Outcome {
            winner: winner.to_string(),
            loser: loser.to_string(),
            winner_score: ws,
            loser_score: ls,
            margin: ws - ls,
        })
    }
}
