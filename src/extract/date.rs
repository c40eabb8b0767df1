//! Page date extraction and validation
//!
//! The header carries a phrase like "Wednesday, January 29th" without a year,
//! so dates are compared as `MM-DD`.

use chrono::NaiveDate;
use regex::Regex;
use scraper::{Html, Selector};
use std::sync::LazyLock;

use super::dom::{element_text, selector};
use crate::{Result, Selectors};

static RE_ORDINAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)\b").expect("invalid regex: ordinal")
});

static RE_MONTH_DAY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(Jan(?:uary)?|Feb(?:ruary)?|Mar(?:ch)?|Apr(?:il)?|May|June?|July?|Aug(?:ust)?|Sep(?:t(?:ember)?)?|Oct(?:ober)?|Nov(?:ember)?|Dec(?:ember)?)\.?\s+(\d{1,2})\b",
    )
    .expect("invalid regex: month day")
});

/// Outcome of checking the page date against the requested one
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateCheck {
    /// Page date usable; carries the `MM-DD` form
    Valid(String),
    /// Header present but the date differs from the requested one
    Mismatch { page: String, requested: String },
    /// No parseable date phrase in any header
    Unparseable,
}

/// Pulls the date label out of the page header
pub struct DateExtractor {
    headers: Vec<Selector>,
}

impl DateExtractor {
    pub fn new(selectors: &Selectors) -> Result<Self> {
        let headers = selectors
            .date_headers
            .iter()
            .map(|css| selector(css))
            .collect::<Result<Vec<_>>>()?;
        Ok(DateExtractor { headers })
    }

    /// Page date as `MM-DD`, from the first header that carries one
    pub fn extract(&self, document: &Html) -> Option<String> {
        self.headers
            .iter()
            .flat_map(|sel| document.select(sel))
            .find_map(|header| month_day(&element_text(header)))
    }

    /// Compare the page date with the caller's date, if any
    pub fn check(&self, document: &Html, requested: Option<NaiveDate>) -> DateCheck {
        let page = match self.extract(document) {
            Some(p) => p,
            None => return DateCheck::Unparseable,
        };

        match requested {
            Some(date) => {
                let requested = to_month_day(date);
                if requested == page {
                    DateCheck::Valid(page)
                } else {
                    DateCheck::Mismatch { page, requested }
                }
            }
            None => DateCheck::Valid(page),
        }
    }
}

/// Canonical `MM-DD` for a calendar date
pub fn to_month_day(date: NaiveDate) -> String {
    date.format("%m-%d").to_string()
}

/// Find a "<Month> <day>" phrase in free text and normalize it to `MM-DD`
pub fn month_day(text: &str) -> Option<String> {
    let stripped = RE_ORDINAL.replace_all(text, "$1");
    let caps = RE_MONTH_DAY.captures(&stripped)?;
    let month = &caps[1][..3];
    let day: u32 = caps[2].parse().ok()?;

    // Leap year so February 29th parses
    let date = NaiveDate::parse_from_str(&format!("{} {} 2000", month, day), "%b %d %Y").ok()?;
    Some(to_month_day(date))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(header: &str) -> Html {
        Html::parse_document(&format!(
            "<html><body><div id=\"content-header\"><h2>{}</h2></div></body></html>",
            header
        ))
    }

    #[test]
    fn test_month_day_strips_ordinals() {
        assert_eq!(month_day("Wednesday, January 29th").as_deref(), Some("01-29"));
        assert_eq!(month_day("Saturday, March 1st").as_deref(), Some("03-01"));
        assert_eq!(month_day("FanMatch for Nov. 22nd").as_deref(), Some("11-22"));
        assert_eq!(month_day("Thursday, February 29th").as_deref(), Some("02-29"));
    }

    #[test]
    fn test_month_day_rejects_garbage() {
        assert_eq!(month_day("FanMatch"), None);
        assert_eq!(month_day("February 31st"), None);
    }

    #[test]
    fn test_check_matches_requested() {
        let extractor = DateExtractor::new(&Selectors::default()).unwrap();
        let doc = page("FanMatch for Wednesday, January 29th");

        let requested = NaiveDate::from_ymd_opt(2020, 1, 29);
        assert_eq!(
            extractor.check(&doc, requested),
            DateCheck::Valid("01-29".to_string())
        );

        let other = NaiveDate::from_ymd_opt(2020, 1, 30);
        assert_eq!(
            extractor.check(&doc, other),
            DateCheck::Mismatch {
                page: "01-29".to_string(),
                requested: "01-30".to_string()
            }
        );

        assert_eq!(
            extractor.check(&doc, None),
            DateCheck::Valid("01-29".to_string())
        );
    }

    #[test]
    fn test_check_unparseable_header() {
        let extractor = DateExtractor::new(&Selectors::default()).unwrap();
        let doc = page("FanMatch");
        assert_eq!(
            extractor.check(&doc, NaiveDate::from_ymd_opt(2020, 1, 29)),
            DateCheck::Unparseable
        );
    }

    #[test]
    fn test_falls_back_to_any_h2() {
        let extractor = DateExtractor::new(&Selectors::default()).unwrap();
        let doc = Html::parse_document("<html><body><h2>Tuesday, December 24th</h2></body></html>");
        assert_eq!(extractor.extract(&doc).as_deref(), Some("12-24"));
    }
}
