//! Prediction cell: "Marquette 73-72 (51%) [69]"

use regex::Regex;
use scraper::ElementRef;
use std::sync::LazyLock;

use super::dom::element_text;
use super::{Decomposer, PartialRecord};

static RE_WINNER_SCORE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?)\s+(\d{1,3})-(\d{1,3})\b").expect("invalid regex: predicted score")
});

static RE_PROBABILITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\((\d{1,3}(?:\.\d+)?%)\)").expect("invalid regex: win probability")
});

static RE_POSSESSIONS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("invalid regex: predicted possessions"));

#[derive(Debug, Default)]
pub struct PredictionDecomposer;

impl PredictionDecomposer {
    /// Which team the predicted winner names, with the other team if known
    fn resolve<'a>(
        winner: &str,
        team1: Option<&'a str>,
        team2: Option<&'a str>,
    ) -> Option<(&'a str, Option<&'a str>)> {
        let same = |team: &str| team == winner || team.eq_ignore_ascii_case(winner);
        match (team1, team2) {
            (Some(t1), other) if same(t1) => Some((t1, other)),
            (other, Some(t2)) if same(t2) => Some((t2, other)),
            _ => None,
        }
    }
}

impl Decomposer for PredictionDecomposer {
    fn column(&self) -> &'static str {
        "Prediction"
    }

    fn decompose(&self, cell: ElementRef<'_>, so_far: &PartialRecord) -> PartialRecord {
        let text = element_text(cell);
        if text.is_empty() {
            return PartialRecord::default();
        }

        let mut rec = PartialRecord {
            win_probability: RE_PROBABILITY.captures(&text).map(|c| c[1].to_string()),
            predicted_possessions: RE_POSSESSIONS
                .captures(&text)
                .and_then(|c| c[1].parse().ok()),
            ..Default::default()
        };

        if let Some(caps) = RE_WINNER_SCORE.captures(&text) {
            let winner = caps[1].trim();
            let (w, l): (i32, i32) = match (caps[2].parse(), caps[3].parse()) {
                (Ok(w), Ok(l)) => (w, l),
                _ => return rec,
            };
            rec.predicted_score = Some(format!("{}-{}", w, l));
            rec.predicted_mov = Some(w - l);

            match Self::resolve(winner, so_far.team1.as_deref(), so_far.team2.as_deref()) {
                Some((favorite, underdog)) => {
                    rec.predicted_winner = Some(favorite.to_string());
                    rec.predicted_loser = underdog.map(str::to_string);
                }
                None => {
                    log::debug!("Predicted winner {:?} matches neither team", winner);
                }
            }
        } else {
            log::debug!("Unrecognised prediction {:?}", text);
        }

        rec
    }
}
