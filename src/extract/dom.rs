//! Text helpers over `scraper` elements
//!
//! Decomposers read direct-child nodes wherever they can, so text that bleeds
//! in from an unclosed sibling never reaches a pattern meant for one cell.

use scraper::{ElementRef, Node, Selector};

use crate::{FanMatchError, Result};

/// Compile a configured selector, reporting bad CSS as a config error
pub fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css)
        .map_err(|e| FanMatchError::Config(format!("Invalid selector {:?}: {:?}", css, e)))
}

/// Collapse runs of whitespace into one space and trim
pub fn normalize_ws(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// All descendant text, whitespace-normalized
pub fn element_text(element: ElementRef) -> String {
    normalize_ws(&element.text().collect::<String>())
}

fn node_text(node: &Node) -> Option<&str> {
    node.as_text().map(|t| &**t)
}

/// Only the element's own text nodes, skipping every child element
pub fn direct_text(element: ElementRef) -> String {
    let raw: Vec<&str> = element
        .children()
        .filter_map(|child| node_text(child.value()))
        .collect();
    normalize_ws(&raw.join(" "))
}

/// Text node immediately after `element`, if there is one
pub fn trailing_text<'a>(element: ElementRef<'a>) -> Option<&'a str> {
    let next = element.next_sibling()?;
    node_text(next.value())
}

/// Text of the first descendant matching `sel`, if non-empty
pub fn first_text(element: ElementRef, sel: &Selector) -> Option<String> {
    element
        .select(sel)
        .map(element_text)
        .find(|t| !t.is_empty())
}

/// Placeholder a team link leaves in a skeleton
pub const TEAM_MARK: char = '\u{1}';

/// Cell text reduced to its structure: team links become `\x01`, rank badges
/// keep their text, other child elements are dropped.
pub fn skeleton(cell: ElementRef, team_link: &Selector, rank_badge: &Selector) -> String {
    let mut out = String::new();
    for child in cell.children() {
        if let Some(text) = node_text(child.value()) {
            out.push_str(text);
        } else if let Some(el) = ElementRef::wrap(child) {
            if team_link.matches(&el) {
                out.push(' ');
                out.push(TEAM_MARK);
                out.push(' ');
            } else if rank_badge.matches(&el) {
                out.push(' ');
                out.push_str(&element_text(el));
                out.push(' ');
            } else if el.value().name() == "br" {
                out.push(' ');
            }
        }
    }
    normalize_ws(&out)
}

#[cfg(test)]
pub(crate) mod test_support {
    use scraper::{Html, Selector};

    /// Parse a single `<tr>` into a full document
    pub fn row_doc(cells: &str) -> Html {
        Html::parse_document(&format!(
            "<html><body><table><tbody><tr>{}</tr></tbody></table></body></html>",
            cells
        ))
    }

    /// Parse one `<td>` body into a full document
    pub fn cell_doc(inner: &str) -> Html {
        row_doc(&format!("<td>{}</td>", inner))
    }

    pub fn td() -> Selector {
        Selector::parse("td").unwrap()
    }
}

#[cfg(test)]
mod tests {
    use super::test_support::*;
    use super::*;

    #[test]
    fn test_direct_text_skips_children() {
        let doc = cell_doc("68.2 <span class=\"rank\">·8·</span>");
        let sel = td();
        let cell = doc.select(&sel).next().unwrap();
        assert_eq!(direct_text(cell), "68.2");
        assert_eq!(element_text(cell), "68.2 ·8·");
    }

    #[test]
    fn test_skeleton_marks_links() {
        let doc = cell_doc(
            "<span class=\"seed\">31</span> <a href=\"team.php?team=Marquette\">Marquette</a> at \
             <span class=\"seed\">59</span> <a href=\"team.php?team=Xavier\">Xavier</a> \
             <span class=\"conf\">BE</span>",
        );
        let sel = td();
        let cell = doc.select(&sel).next().unwrap();
        let link = selector("a[href*=\"team.php\"]").unwrap();
        let badge = selector("span.seed").unwrap();
        assert_eq!(
            skeleton(cell, &link, &badge),
            "31 \u{1} at 59 \u{1}"
        );
    }

    #[test]
    fn test_bad_selector_is_config_error() {
        assert!(matches!(selector("td[["), Err(FanMatchError::Config(_))));
    }
}
