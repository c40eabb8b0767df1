//! Page-level parsing: date check, row assembly, post-processing and summary

use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};
use std::collections::HashSet;

use super::date::{DateCheck, DateExtractor};
use super::dom::selector;
use super::row::RowAssembler;
use super::score::Outcome;
use super::summary::SummaryExtractor;
use super::PartialRecord;
use crate::{ExtractorConfig, FanMatchError, FanMatchPage, GameRecord, Result};

/// Rows of one page between assembly and post-processing
#[derive(Debug, Default)]
pub struct WorkingSet {
    rows: Option<Vec<PartialRecord>>,
}

impl WorkingSet {
    pub fn new() -> Self {
        WorkingSet::default()
    }

    /// Run the assembler over every row; non-game rows are dropped
    pub fn assemble<'a, I>(&mut self, assembler: &RowAssembler, rows: I)
    where
        I: IntoIterator<Item = ElementRef<'a>>,
    {
        let parsed: Vec<PartialRecord> = rows
            .into_iter()
            .filter_map(|row| assembler.assemble(row))
            .collect();
        self.rows = Some(parsed);
    }

    /// Derive outcomes and convert to public records, in row order
    pub fn finish(self) -> Result<Vec<GameRecord>> {
        let rows = self.rows.ok_or(FanMatchError::NotAssembled)?;
        let games: Vec<GameRecord> = rows.into_iter().map(into_game).collect();
        warn_duplicate_ranks(&games);
        Ok(games)
    }
}

fn into_game(rec: PartialRecord) -> GameRecord {
    let outcome = Outcome::derive(
        rec.team1.as_deref(),
        rec.team2.as_deref(),
        rec.team1_score,
        rec.team2_score,
    );

    if outcome.is_none() && (rec.team1_score.is_some() || rec.team2_score.is_some()) {
        log::warn!(
            "Dropping scores {:?}-{:?} for {:?} vs {:?}: no winner",
            rec.team1_score,
            rec.team2_score,
            rec.team1,
            rec.team2
        );
    }

    let mut game = GameRecord {
        team1: rec.team1,
        team1_rank: rec.team1_rank,
        team2: rec.team2,
        team2_rank: rec.team2_rank,
        game_type: rec.game_type,
        conference: rec.conference,
        predicted_winner: rec.predicted_winner,
        predicted_loser: rec.predicted_loser,
        predicted_score: rec.predicted_score,
        predicted_mov: rec.predicted_mov,
        win_probability: rec.win_probability,
        predicted_possessions: rec.predicted_possessions,
        actual_possessions: rec.possessions_raw.map(|p| p.round() as u32),
        thrill_score: rec.thrill_score,
        thrill_score_rank: rec.thrill_score_rank,
        comeback: rec.comeback,
        comeback_rank: rec.comeback_rank,
        excitement: rec.excitement,
        excitement_rank: rec.excitement_rank,
        mvp: rec.mvp,
        tournament: rec.tournament,
        time: rec.time,
        network: rec.network,
        city: rec.city,
        state: rec.state,
        arena: rec.arena,
        ..Default::default()
    };

    if let Some(outcome) = outcome {
        game.team1_score = rec.team1_score;
        game.team2_score = rec.team2_score;
        game.overtime = Some(rec.overtime.unwrap_or(false));
        game.winner = Some(outcome.winner);
        game.loser = Some(outcome.loser);
        game.winner_score = Some(outcome.winner_score);
        game.loser_score = Some(outcome.loser_score);
        game.actual_mov = Some(outcome.margin);
    }

    game
}

fn warn_duplicate_ranks(games: &[GameRecord]) {
    let mut seen = HashSet::new();
    for rank in games
        .iter()
        .filter(|g| g.is_completed())
        .filter_map(|g| g.thrill_score_rank)
    {
        if !seen.insert(rank) {
            log::warn!("Thrill score rank {} appears more than once", rank);
        }
    }
}

/// Parses whole FanMatch pages
pub struct FanMatchParser {
    dates: DateExtractor,
    assembler: RowAssembler,
    summary: SummaryExtractor,
    table: Selector,
    rows: Selector,
    body: Selector,
    no_games_markers: Vec<String>,
}

impl FanMatchParser {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(FanMatchParser {
            dates: DateExtractor::new(&config.selectors)?,
            assembler: RowAssembler::new(config)?,
            summary: SummaryExtractor::new(&config.summary)?,
            table: selector(&config.selectors.results_table)?,
            rows: selector(&config.selectors.body_rows)?,
            body: selector("body")?,
            no_games_markers: config
                .no_games_markers
                .iter()
                .map(|m| m.to_lowercase())
                .collect(),
        })
    }

    /// Parse one page. Data problems give an empty or partial page, never an error.
    pub fn parse(&self, html: &str, requested: Option<NaiveDate>) -> Result<FanMatchPage> {
        let document = Html::parse_document(html);

        let date = match self.dates.check(&document, requested) {
            DateCheck::Valid(date) => Some(date),
            DateCheck::Mismatch { page, requested: wanted } => {
                log::warn!("Page is for {} but {} was requested", page, wanted);
                return Ok(FanMatchPage::empty(Some(page), requested));
            }
            DateCheck::Unparseable if requested.is_some() => {
                log::warn!("No date in page header; cannot confirm requested date");
                return Ok(FanMatchPage::empty(None, requested));
            }
            DateCheck::Unparseable => None,
        };

        if self.has_no_games_marker(&document) {
            log::info!("No games on {}", date.as_deref().unwrap_or("page"));
            return Ok(FanMatchPage::empty(date, requested));
        }

        let table = match document.select(&self.table).next() {
            Some(t) => t,
            None => {
                log::info!("No results table on page");
                return Ok(FanMatchPage::empty(date, requested));
            }
        };

        let mut working = WorkingSet::new();
        working.assemble(&self.assembler, table.select(&self.rows));
        let games = working.finish()?;
        let summary = if games.iter().any(GameRecord::is_completed) {
            self.summary.extract(&document)
        } else {
            None
        };

        log::info!(
            "Parsed {} games ({} completed) for {}",
            games.len(),
            games.iter().filter(|g| g.is_completed()).count(),
            date.as_deref().unwrap_or("undated page")
        );

        Ok(FanMatchPage {
            date,
            requested,
            games,
            summary,
        })
    }

    fn has_no_games_marker(&self, document: &Html) -> bool {
        let text = match document.select(&self.body).next() {
            Some(body) => body.text().collect::<Vec<_>>().join(" ").to_lowercase(),
            None => return false,
        };
        self.no_games_markers.iter().any(|m| text.contains(m))
    }
}
