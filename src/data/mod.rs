//! Page acquisition
//!
//! Where FanMatch HTML comes from: the live site (with an optional on-disk
//! cache) or a saved file.

pub mod fanmatch;
pub mod source;

pub use fanmatch::FanMatchScraper;
pub use source::{FilePageSource, HttpPageSource};

use crate::Result;

/// Anything that can hand back the HTML for a URL
pub trait PageSource {
    fn fetch(&self, url: &str) -> Result<String>;
}

impl<S: PageSource + ?Sized> PageSource for &S {
    fn fetch(&self, url: &str) -> Result<String> {
        (**self).fetch(url)
    }
}
