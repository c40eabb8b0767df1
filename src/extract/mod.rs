//! Extraction engine
//!
//! Each column of a game row is handled by a [`Decomposer`]: a pure function
//! from one table cell to a [`PartialRecord`]. The row assembler merges the
//! partials, the post-processor turns them into [`crate::GameRecord`]s.

pub mod date;
pub mod dom;
pub mod metric;
pub mod page;
pub mod prediction;
pub mod row;
pub mod schedule;
pub mod score;
pub mod summary;
pub mod teams;

pub use date::DateExtractor;
pub use page::{FanMatchParser, WorkingSet};
pub use row::RowAssembler;
pub use summary::SummaryExtractor;

use scraper::ElementRef;

use crate::GameType;

/// Shared contract for column decomposers
pub trait Decomposer {
    /// Column name, for logging
    fn column(&self) -> &'static str;

    /// Extract what this column knows. `so_far` holds the fields produced by
    /// decomposers that already ran on the same row.
    fn decompose(&self, cell: ElementRef<'_>, so_far: &PartialRecord) -> PartialRecord;
}

/// Per-row working record. Every field is optional; decomposers fill the ones
/// they own and leave the rest `None`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialRecord {
    pub team1: Option<String>,
    pub team1_rank: Option<String>,
    pub team2: Option<String>,
    pub team2_rank: Option<String>,
    pub game_type: Option<GameType>,
    pub conference: Option<String>,
    /// Raw bracketed possession count from the game cell
    pub possessions_raw: Option<f64>,

    pub team1_score: Option<u32>,
    pub team2_score: Option<u32>,
    pub overtime: Option<bool>,

    pub predicted_winner: Option<String>,
    pub predicted_loser: Option<String>,
    pub predicted_score: Option<String>,
    pub predicted_mov: Option<i32>,
    pub win_probability: Option<String>,
    pub predicted_possessions: Option<u32>,

    pub time: Option<String>,
    pub network: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub arena: Option<String>,

    pub thrill_score: Option<f64>,
    pub thrill_score_rank: Option<u32>,
    pub comeback: Option<f64>,
    pub comeback_rank: Option<u32>,
    pub excitement: Option<f64>,
    pub excitement_rank: Option<u32>,

    pub mvp: Option<String>,
    pub tournament: Option<String>,
}

impl PartialRecord {
    /// Fill fields still `None` in `self` from `other`
    pub fn merge(mut self, other: PartialRecord) -> PartialRecord {
        macro_rules! fill {
            ($($field:ident),* $(,)?) => {
                $(
                    if self.$field.is_none() {
                        self.$field = other.$field;
                    }
                )*
            };
        }

        fill!(
            team1,
            team1_rank,
            team2,
            team2_rank,
            game_type,
            conference,
            possessions_raw,
            team1_score,
            team2_score,
            overtime,
            predicted_winner,
            predicted_loser,
            predicted_score,
            predicted_mov,
            win_probability,
            predicted_possessions,
            time,
            network,
            city,
            state,
            arena,
            thrill_score,
            thrill_score_rank,
            comeback,
            comeback_rank,
            excitement,
            excitement_rank,
            mvp,
            tournament,
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_existing() {
        let first = PartialRecord {
            team1: Some("Duke".to_string()),
            ..Default::default()
        };
        let second = PartialRecord {
            team1: Some("Other".to_string()),
            team2: Some("UNC".to_string()),
            ..Default::default()
        };

        let merged = first.merge(second);
        assert_eq!(merged.team1.as_deref(), Some("Duke"));
        assert_eq!(merged.team2.as_deref(), Some("UNC"));
    }
}
