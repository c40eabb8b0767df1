//! Value + day-rank cells (thrill score, comeback, excitement)
//!
//! Two markups carry the rank: a span with the rank between "·" marks, or a
//! block holding the bare rank. The value is always the cell's own text.

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::dom::{direct_text, element_text, selector};
use super::{Decomposer, PartialRecord};
use crate::{ExtractorConfig, Result};

static RE_DOTTED_RANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"·\s*(\d+)\s*·").expect("invalid regex: dotted rank"));

static RE_PLAIN_RANK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*(\d+)\s*$").expect("invalid regex: plain rank"));

/// Which pair of record fields a metric column feeds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    ThrillScore,
    Comeback,
    Excitement,
}

impl Metric {
    pub fn label(&self) -> &'static str {
        match self {
            Metric::ThrillScore => "Thrill Score",
            Metric::Comeback => "Comeback",
            Metric::Excitement => "Excitement",
        }
    }

    fn into_record(self, value: Option<f64>, rank: Option<u32>) -> PartialRecord {
        let mut rec = PartialRecord::default();
        match self {
            Metric::ThrillScore => {
                rec.thrill_score = value;
                rec.thrill_score_rank = rank;
            }
            Metric::Comeback => {
                rec.comeback = value;
                rec.comeback_rank = rank;
            }
            Metric::Excitement => {
                rec.excitement = value;
                rec.excitement_rank = rank;
            }
        }
        rec
    }
}

pub struct MetricDecomposer {
    metric: Metric,
    rank_span: Selector,
    rank_block: Selector,
}

impl MetricDecomposer {
    pub fn new(metric: Metric, config: &ExtractorConfig) -> Result<Self> {
        Ok(MetricDecomposer {
            metric,
            rank_span: selector(&config.selectors.metric_rank_span)?,
            rank_block: selector(&config.selectors.metric_rank_block)?,
        })
    }

    /// (value text, rank) from whichever markup the cell uses
    fn split(&self, cell: ElementRef) -> (String, Option<u32>) {
        let dotted = cell
            .select(&self.rank_span)
            .find_map(|span| {
                RE_DOTTED_RANK.captures(&element_text(span))?[1]
                    .parse::<u32>()
                    .ok()
            });
        if let Some(rank) = dotted {
            return (direct_text(cell), Some(rank));
        }

        let plain = cell
            .select(&self.rank_block)
            .find_map(|block| {
                RE_PLAIN_RANK.captures(&element_text(block))?[1]
                    .parse::<u32>()
                    .ok()
            });
        if let Some(rank) = plain {
            return (direct_text(cell), Some(rank));
        }

        (element_text(cell), None)
    }
}

impl Decomposer for MetricDecomposer {
    fn column(&self) -> &'static str {
        self.metric.label()
    }

    fn decompose(&self, cell: ElementRef<'_>, _so_far: &PartialRecord) -> PartialRecord {
        let (text, rank) = self.split(cell);
        if text.is_empty() && rank.is_none() {
            return PartialRecord::default();
        }

        let value = text.parse::<f64>().ok();
        if value.is_none() && !text.is_empty() {
            log::debug!("{}: non-numeric value {:?}", self.metric.label(), text);
        }
        self.metric.into_record(value, rank)
    }
}
