//! Time, network and location cells
//!
//! The time cell is sometimes emitted without closing tags, so text from the
//! next cell can end up inside it. Nested elements are read before cell-wide
//! text for that reason.

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::dom::{direct_text, element_text, first_text, normalize_ws, selector};
use super::{Decomposer, PartialRecord};
use crate::{ExtractorConfig, Result};

static RE_TIME_EXACT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\d{1,2}:\d{2}\s*[ap]\.?m\.?$").expect("invalid regex: exact time")
});

static RE_TIME_LEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2}:\d{2}\s*[ap]\.?m\.?)").expect("invalid regex: leading time")
});

static RE_CITY_STATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.+?),\s*([A-Z]{2})\b").expect("invalid regex: city state")
});

/// Broadcast time and network
pub struct TimeDecomposer {
    link: Selector,
    network: Selector,
}

impl TimeDecomposer {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(TimeDecomposer {
            link: selector("a")?,
            network: selector(&config.selectors.network)?,
        })
    }

    fn time(&self, cell: ElementRef) -> Option<String> {
        let linked = cell
            .select(&self.link)
            .map(element_text)
            .find(|t| RE_TIME_EXACT.is_match(t));
        if linked.is_some() {
            return linked;
        }

        RE_TIME_LEADING
            .captures(&element_text(cell))
            .map(|caps| normalize_ws(&caps[1]))
    }

    fn network(&self, cell: ElementRef) -> Option<String> {
        let span = cell.select(&self.network).next()?;

        [
            first_text(span, &self.link),
            Some(direct_text(span)),
            Some(element_text(span)),
        ]
        .into_iter()
        .flatten()
        .find(|t| !t.is_empty())
        .filter(|t| !t.chars().all(|c| c.is_ascii_digit() || c.is_whitespace()))
    }
}

impl Decomposer for TimeDecomposer {
    fn column(&self) -> &'static str {
        "Time (ET)"
    }

    fn decompose(&self, cell: ElementRef<'_>, _so_far: &PartialRecord) -> PartialRecord {
        PartialRecord {
            time: self.time(cell),
            network: self.network(cell),
            ..Default::default()
        }
    }
}

/// City, state and arena
pub struct LocationDecomposer {
    arena: Selector,
}

impl LocationDecomposer {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        Ok(LocationDecomposer {
            arena: selector(&config.selectors.arena)?,
        })
    }
}

impl Decomposer for LocationDecomposer {
    fn column(&self) -> &'static str {
        "Location"
    }

    fn decompose(&self, cell: ElementRef<'_>, _so_far: &PartialRecord) -> PartialRecord {
        let bare = direct_text(cell);

        let (city, state) = match RE_CITY_STATE.captures(&bare) {
            Some(caps) => (Some(caps[1].trim().to_string()), Some(caps[2].to_string())),
            None if !bare.is_empty() => (Some(bare), None),
            None => (None, None),
        };

        PartialRecord {
            city,
            state,
            arena: first_text(cell, &self.arena),
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::dom::test_support::{cell_doc, row_doc, td};

    fn time_of(inner: &str) -> PartialRecord {
        let decomposer = TimeDecomposer::new(&ExtractorConfig::default()).unwrap();
        let doc = cell_doc(inner);
        let sel = td();
        let cell = doc.select(&sel).next().unwrap();
        decomposer.decompose(cell, &PartialRecord::default())
    }

    fn location_of(inner: &str) -> PartialRecord {
        let decomposer = LocationDecomposer::new(&ExtractorConfig::default()).unwrap();
        let doc = cell_doc(inner);
        let sel = td();
        let cell = doc.select(&sel).next().unwrap();
        decomposer.decompose(cell, &PartialRecord::default())
    }

    #[test]
    fn test_linked_time_and_network() {
        let rec = time_of(
            "<a href=\"box.php?g=1\">9:00 pm</a> <span class=\"tv\"><a href=\"#\">FS1</a></span>",
        );
        assert_eq!(rec.time.as_deref(), Some("9:00 pm"));
        assert_eq!(rec.network.as_deref(), Some("FS1"));
    }

    #[test]
    fn test_plain_time_and_network() {
        let rec = time_of("7:00 pm <span class=\"tv\">ESPN2</span>");
        assert_eq!(rec.time.as_deref(), Some("7:00 pm"));
        assert_eq!(rec.network.as_deref(), Some("ESPN2"));
    }

    #[test]
    fn test_final_game_has_no_time() {
        let rec = time_of("<a href=\"box.php?g=1\">Final</a>");
        assert_eq!(rec.time, None);
        assert_eq!(rec.network, None);
    }

    #[test]
    fn test_numeric_network_discarded() {
        let rec = time_of("8:30 PM <span class=\"tv\">68</span>");
        assert_eq!(rec.time.as_deref(), Some("8:30 PM"));
        assert_eq!(rec.network, None);
    }

    #[test]
    fn test_unclosed_network_span() {
        let doc = row_doc(
            "<td>9:00 pm <span class=\"tv\"><a href=\"#\">ESPNU</a>\
             <td>Cincinnati, OH <a href=\"arena.php\"><span class=\"arena\">Cintas Center</span></a></td>",
        );
        let sel = td();
        let cells: Vec<_> = doc.select(&sel).collect();
        assert_eq!(cells.len(), 2);

        let rec = TimeDecomposer::new(&ExtractorConfig::default())
            .unwrap()
            .decompose(cells[0], &PartialRecord::default());
        assert_eq!(rec.network.as_deref(), Some("ESPNU"));

        let rec = LocationDecomposer::new(&ExtractorConfig::default())
            .unwrap()
            .decompose(cells[1], &PartialRecord::default());
        assert_eq!(rec.city.as_deref(), Some("Cincinnati"));
    }

    #[test]
    fn test_location_with_arena() {
        let rec = location_of(
            "Cincinnati, OH <a href=\"arena.php?a=1\"><span class=\"arena\">Cintas Center</span></a>",
        );
        assert_eq!(rec.city.as_deref(), Some("Cincinnati"));
        assert_eq!(rec.state.as_deref(), Some("OH"));
        assert_eq!(rec.arena.as_deref(), Some("Cintas Center"));
    }

    #[test]
    fn test_location_without_state() {
        let rec = location_of("Paradise Island, Bahamas");
        assert_eq!(rec.city.as_deref(), Some("Paradise Island, Bahamas"));
        assert_eq!(rec.state, None);
        assert_eq!(rec.arena, None);
    }

    #[test]
    fn test_empty_location() {
        assert_eq!(location_of(""), PartialRecord::default());
    }
}
