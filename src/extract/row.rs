//! Row assembly: runs every column decomposer over one game row and merges
//! the partials, then adds the row-level annotations from the game cell.

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::dom::{element_text, first_text, normalize_ws, selector};
use super::metric::{Metric, MetricDecomposer};
use super::prediction::PredictionDecomposer;
use super::schedule::{LocationDecomposer, TimeDecomposer};
use super::score::ScoreDecomposer;
use super::teams::TeamDecomposer;
use super::{Decomposer, PartialRecord};
use crate::{ExtractorConfig, Result};

static RE_TOURNAMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)([A-Za-z]{2,}-T|NCAA)\s*$").expect("invalid regex: tournament")
});

static RE_MVP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"MVP:\s*(.+?)(?:\s+(?:[A-Za-z]{2,}-T|NCAA))?\s*$").expect("invalid regex: mvp")
});

/// Cell index each decomposer reads
const GAME: usize = 0;
const PREDICTION: usize = 1;
const TIME: usize = 2;
const LOCATION: usize = 3;
const THRILL: usize = 4;
const COMEBACK: usize = 5;
const EXCITEMENT: usize = 6;

fn boxed<D: Decomposer + 'static>(decomposer: D) -> Box<dyn Decomposer> {
    Box::new(decomposer)
}

pub struct RowAssembler {
    min_cells: usize,
    columns: Vec<(usize, Box<dyn Decomposer>)>,
    conference: Selector,
}

impl RowAssembler {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let columns: Vec<(usize, Box<dyn Decomposer>)> = vec![
            (GAME, boxed(TeamDecomposer::new(config)?)),
            (GAME, boxed(ScoreDecomposer::new(config)?)),
            (PREDICTION, boxed(PredictionDecomposer)),
            (TIME, boxed(TimeDecomposer::new(config)?)),
            (LOCATION, boxed(LocationDecomposer::new(config)?)),
            (THRILL, boxed(MetricDecomposer::new(Metric::ThrillScore, config)?)),
            (COMEBACK, boxed(MetricDecomposer::new(Metric::Comeback, config)?)),
            (EXCITEMENT, boxed(MetricDecomposer::new(Metric::Excitement, config)?)),
        ];

        Ok(RowAssembler {
            min_cells: config.min_cells,
            columns,
            conference: selector(&config.selectors.conference)?,
        })
    }

    /// Parse one `<tr>`; `None` for rows that are not game rows
    pub fn assemble(&self, row: ElementRef) -> Option<PartialRecord> {
        let cells: Vec<ElementRef> = row
            .children()
            .filter_map(ElementRef::wrap)
            .filter(|el| matches!(el.value().name(), "td" | "th"))
            .collect();

        if cells.len() < self.min_cells {
            log::debug!("Skipping row with {} cells", cells.len());
            return None;
        }

        let mut rec = PartialRecord::default();
        for (index, decomposer) in &self.columns {
            if let Some(cell) = cells.get(*index) {
                let part = decomposer.decompose(*cell, &rec);
                rec = rec.merge(part);
            } else {
                log::debug!("Row has no {} cell", decomposer.column());
            }
        }

        let game = *cells.get(GAME)?;
        rec = rec.merge(self.annotations(game));
        Some(rec)
    }

    /// Conference tag, MVP line and tournament code from the game cell
    fn annotations(&self, cell: ElementRef) -> PartialRecord {
        let conference = first_text(cell, &self.conference);

        // Conference text is left out so it cannot mask a trailing tournament code
        let mut raw = String::new();
        for child in cell.children() {
            if let Some(text) = child.value().as_text() {
                raw.push_str(text);
            } else if let Some(el) = ElementRef::wrap(child) {
                if !self.conference.matches(&el) {
                    raw.push(' ');
                    raw.push_str(&element_text(el));
                    raw.push(' ');
                }
            }
        }
        let text = normalize_ws(&raw);

        let (head, tail) = match text.find("MVP:") {
            Some(pos) => (&text[..pos], Some(&text[pos..])),
            None => (text.as_str(), None),
        };

        let mvp = tail
            .and_then(|t| RE_MVP.captures(t))
            .map(|caps| caps[1].trim().to_string())
            .filter(|m| !m.is_empty());

        let tournament = tail
            .and_then(|t| RE_TOURNAMENT.captures(t))
            .or_else(|| RE_TOURNAMENT.captures(head.trim_end()))
            .map(|caps| caps[1].to_string());

        PartialRecord {
            conference,
            mvp,
            tournament,
            ..Default::default()
        }
    }
}
