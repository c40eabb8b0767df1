//! FanMatch scraper: page source + parser

use chrono::NaiveDate;
use std::path::Path;

use super::PageSource;
use crate::extract::FanMatchParser;
use crate::{Config, FanMatchPage, Result};

pub struct FanMatchScraper<S: PageSource> {
    source: S,
    parser: FanMatchParser,
    base_url: String,
}

impl<S: PageSource> FanMatchScraper<S> {
    pub fn new(source: S, config: &Config) -> Result<Self> {
        Ok(FanMatchScraper {
            source,
            parser: FanMatchParser::new(&config.extractor)?,
            base_url: config.source.base_url.clone(),
        })
    }

    /// Page URL for a date; today's page when no date is given
    pub fn url_for(&self, date: Option<NaiveDate>) -> String {
        match date {
            Some(d) => format!("{}?d={}", self.base_url, d.format("%Y-%m-%d")),
            None => self.base_url.clone(),
        }
    }

    /// Fetch and parse the page for a date
    pub fn fetch(&self, date: Option<NaiveDate>) -> Result<FanMatchPage> {
        let url = self.url_for(date);
        log::info!("Fetching FanMatch page {}", url);
        let html = self.source.fetch(&url)?;
        self.parse_html(&html, date)
    }

    pub fn parse_html(&self, html: &str, date: Option<NaiveDate>) -> Result<FanMatchPage> {
        self.parser.parse(html, date)
    }

    /// Parse a saved page (for testing)
    pub fn parse_file<P: AsRef<Path>>(&self, path: P, date: Option<NaiveDate>) -> Result<FanMatchPage> {
        let html = std::fs::read_to_string(path.as_ref())?;
        self.parse_html(&html, date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::FilePageSource;
    use std::cell::RefCell;

    const COMPLETED: &str = include_str!("../extract/testdata/completed.html");

    /// Records requested URLs and serves one page
    struct StubSource {
        html: &'static str,
        requested: RefCell<Vec<String>>,
    }

    impl PageSource for StubSource {
        fn fetch(&self, url: &str) -> Result<String> {
            self.requested.borrow_mut().push(url.to_string());
            Ok(self.html.to_string())
        }
    }

    fn stub() -> StubSource {
        StubSource {
            html: COMPLETED,
            requested: RefCell::new(Vec::new()),
        }
    }

    #[test]
    fn test_url_for_date() {
        let scraper = FanMatchScraper::new(stub(), &Config::default()).unwrap();
        assert_eq!(
            scraper.url_for(NaiveDate::from_ymd_opt(2020, 1, 29)),
            "https://kenpom.com/fanmatch.php?d=2020-01-29"
        );
        assert_eq!(scraper.url_for(None), "https://kenpom.com/fanmatch.php");
    }

    #[test]
    fn test_fetch_parses_source_page() {
        let source = stub();
        let scraper = FanMatchScraper::new(&source, &Config::default()).unwrap();
        let page = scraper.fetch(NaiveDate::from_ymd_opt(2020, 1, 29)).unwrap();

        assert_eq!(page.games.len(), 3);
        assert!(page.summary.is_some());
        assert_eq!(
            source.requested.borrow().as_slice(),
            ["https://kenpom.com/fanmatch.php?d=2020-01-29".to_string()]
        );
    }

    #[test]
    fn test_parse_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("fanmatch_scraper_{}.html", std::process::id()));
        std::fs::write(&path, COMPLETED).unwrap();

        let scraper = FanMatchScraper::new(stub(), &Config::default()).unwrap();
        let page = scraper.parse_file(&path, None).unwrap();
        assert_eq!(page.date.as_deref(), Some("01-29"));
        assert_eq!(page.completed_games().count(), 3);
    }

    #[test]
    fn test_fetch_from_saved_file() {
        let mut path = std::env::temp_dir();
        path.push(format!("fanmatch_file_source_{}.html", std::process::id()));
        std::fs::write(&path, COMPLETED).unwrap();

        let scraper = FanMatchScraper::new(FilePageSource::new(&path), &Config::default()).unwrap();
        let page = scraper.fetch(NaiveDate::from_ymd_opt(2020, 1, 29)).unwrap();
        assert_eq!(page.date.as_deref(), Some("01-29"));
        assert_eq!(page.completed_games().count(), 3);

        let page = scraper.fetch(NaiveDate::from_ymd_opt(2020, 1, 30)).unwrap();
        assert!(page.games.is_empty());
    }
}
