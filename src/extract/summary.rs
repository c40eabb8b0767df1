//! Day summary beneath the game table
//!
//! Figures are found by label patterns anywhere in the page text. Lines of the
//! night are the table rows following the row that announces them.

use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use super::dom::{element_text, normalize_ws, selector};
use crate::{FanMatchError, PageSummary, Result, SummaryLabels};

pub struct SummaryExtractor {
    points_per_game: Regex,
    average_efficiency: Regex,
    possessions_per_40: Regex,
    mae_total_score: Regex,
    bias_total_score: Regex,
    mae_margin: Regex,
    favorites_record: Regex,
    favorites_expected_record: Regex,
    exact_margin: Regex,
    lines_header: String,
    stop_keywords: Vec<String>,
    body: Selector,
    row: Selector,
}

fn label(name: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| {
        FanMatchError::Config(format!("Invalid summary label {}: {}", name, e))
    })
}

fn number(re: &Regex, text: &str) -> Option<f64> {
    re.captures(text)?.get(1)?.as_str().parse().ok()
}

fn capture(re: &Regex, text: &str) -> Option<String> {
    Some(re.captures(text)?.get(1)?.as_str().to_string())
}

impl SummaryExtractor {
    pub fn new(labels: &SummaryLabels) -> Result<Self> {
        Ok(SummaryExtractor {
            points_per_game: label("points_per_game", &labels.points_per_game)?,
            average_efficiency: label("average_efficiency", &labels.average_efficiency)?,
            possessions_per_40: label("possessions_per_40", &labels.possessions_per_40)?,
            mae_total_score: label("mae_total_score", &labels.mae_total_score)?,
            bias_total_score: label("bias_total_score", &labels.bias_total_score)?,
            mae_margin: label("mae_margin", &labels.mae_margin)?,
            favorites_record: label("favorites_record", &labels.favorites_record)?,
            favorites_expected_record: label(
                "favorites_expected_record",
                &labels.favorites_expected_record,
            )?,
            exact_margin: label("exact_margin", &labels.exact_margin)?,
            lines_header: labels.lines_header.to_lowercase(),
            stop_keywords: labels
                .stop_keywords
                .iter()
                .map(|k| k.to_lowercase())
                .collect(),
            body: selector("body")?,
            row: selector("tr")?,
        })
    }

    /// `None` when the page carries no figure and no line of the night
    pub fn extract(&self, document: &Html) -> Option<PageSummary> {
        let text = self.page_text(document);

        let exact_margin = self.exact_margin.captures(&text).and_then(|caps| {
            let hits = caps.get(1)?.as_str();
            let games = caps.get(2)?.as_str();
            Some(format!("{}/{}", hits, games))
        });

        let summary = PageSummary {
            points_per_game: number(&self.points_per_game, &text),
            average_efficiency: number(&self.average_efficiency, &text),
            possessions_per_40: number(&self.possessions_per_40, &text),
            mae_total_score: number(&self.mae_total_score, &text),
            bias_total_score: number(&self.bias_total_score, &text),
            mae_margin: number(&self.mae_margin, &text),
            favorites_record: capture(&self.favorites_record, &text),
            favorites_expected_record: capture(&self.favorites_expected_record, &text),
            exact_margin,
            lines_of_the_night: self.lines_of_the_night(document),
        };

        if summary.is_empty() {
            None
        } else {
            Some(summary)
        }
    }

    /// Body text with a space between every text node
    fn page_text(&self, document: &Html) -> String {
        let root = document
            .select(&self.body)
            .next()
            .unwrap_or_else(|| document.root_element());
        normalize_ws(&root.text().collect::<Vec<_>>().join(" "))
    }

    fn is_stop(&self, line: &str) -> bool {
        let lower = line.to_lowercase();
        lower.starts_with("note:") || self.stop_keywords.iter().any(|k| lower.contains(k))
    }

    fn lines_of_the_night(&self, document: &Html) -> Vec<String> {
        let mut rows = document.select(&self.row).map(first_cell_text);

        if !rows.any(|t| t.to_lowercase().contains(&self.lines_header)) {
            return Vec::new();
        }

        rows.take_while(|t| !self.is_stop(t))
            .filter(|t| !t.is_empty())
            .collect()
    }
}

fn first_cell_text(row: ElementRef) -> String {
    row.children()
        .filter_map(ElementRef::wrap)
        .find(|el| matches!(el.value().name(), "td" | "th"))
        .map(element_text)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> SummaryExtractor {
        SummaryExtractor::new(&SummaryLabels::default()).unwrap()
    }

    const FOOTER: &str = r#"<html><body><table id="fanmatch-table"><tbody>
        <tr><td colspan="7"><b>Lines of the night</b></td></tr>
        <tr><td colspan="7">1. Max Mahoney, Boston University • 29 pts (11-15 2's, 7-11 FT's) • 10 Rebs</td></tr>
        <tr><td colspan="7">2. Tobias Reed, Somewhere • 31 pts</td></tr>
        <tr><td colspan="7"></td></tr>
        <tr><td colspan="7">Today's stats: Points per game: 71.5 • Average efficiency: 101.9 • Possessions per 40 minutes: 68.7</td></tr>
        <tr><td colspan="7">Predicted total score: Mean absolute error: 15.8 • Bias: -1.6</td></tr>
        <tr><td colspan="7">Predicted MOV: Mean absolute error: 7.8  • Record of favorites: 40-13 (expected: 38-15) • Exact MOV in 1 of 53 games</td></tr>
        </tbody></table></body></html>"#;

    #[test]
    fn test_full_footer() {
        let doc = Html::parse_document(FOOTER);
        let summary = extractor().extract(&doc).unwrap();

        assert_eq!(summary.points_per_game, Some(71.5));
        assert_eq!(summary.average_efficiency, Some(101.9));
        assert_eq!(summary.possessions_per_40, Some(68.7));
        assert_eq!(summary.mae_total_score, Some(15.8));
        assert_eq!(summary.bias_total_score, Some(-1.6));
        assert_eq!(summary.mae_margin, Some(7.8));
        assert_eq!(summary.favorites_record.as_deref(), Some("40-13"));
        assert_eq!(summary.favorites_expected_record.as_deref(), Some("38-15"));
        assert_eq!(summary.exact_margin.as_deref(), Some("1/53"));
        assert_eq!(
            summary.lines_of_the_night,
            vec![
                "1. Max Mahoney, Boston University • 29 pts (11-15 2's, 7-11 FT's) • 10 Rebs",
                "2. Tobias Reed, Somewhere • 31 pts",
            ]
        );
    }

    #[test]
    fn test_partial_summary() {
        let doc = Html::parse_document(
            "<html><body><p>Points per game: 70.2 • Average efficiency: 99.0</p></body></html>",
        );
        let summary = extractor().extract(&doc).unwrap();
        assert_eq!(summary.points_per_game, Some(70.2));
        assert_eq!(summary.mae_margin, None);
        assert_eq!(summary.exact_margin, None);
        assert!(summary.lines_of_the_night.is_empty());
    }

    #[test]
    fn test_note_ends_lines() {
        let doc = Html::parse_document(
            "<html><body><table>\
             <tr><td>Lines of the night</td></tr>\
             <tr><td>1. Someone • 40 pts</td></tr>\
             <tr><td>Note: lines are sorted by game score</td></tr>\
             <tr><td>2. Never reached</td></tr>\
             </table></body></html>",
        );
        let summary = extractor().extract(&doc).unwrap();
        assert_eq!(summary.lines_of_the_night, vec!["1. Someone • 40 pts"]);
    }

    #[test]
    fn test_no_summary() {
        let doc = Html::parse_document("<html><body><p>No games scheduled.</p></body></html>");
        assert_eq!(extractor().extract(&doc), None);
    }

    #[test]
    fn test_reworded_label_from_config() {
        let labels = SummaryLabels {
            favorites_record: r"(?i)Favorites went\s+(\d+-\d+)".to_string(),
            ..Default::default()
        };
        let doc = Html::parse_document("<html><body><p>Favorites went 12-3 today</p></body></html>");
        let summary = SummaryExtractor::new(&labels).unwrap().extract(&doc).unwrap();
        assert_eq!(summary.favorites_record.as_deref(), Some("12-3"));
    }

    #[test]
    fn test_bad_label_is_config_error() {
        let labels = SummaryLabels {
            bias_total_score: "Bias: (".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            SummaryExtractor::new(&labels),
            Err(FanMatchError::Config(_))
        ));
    }
}
