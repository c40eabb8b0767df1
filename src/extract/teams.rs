//! Team, rank and venue decomposition of the game cell

use regex::Regex;
use scraper::{ElementRef, Selector};
use std::sync::LazyLock;

use super::dom::{element_text, selector, skeleton};
use super::{Decomposer, PartialRecord};
use crate::{ExtractorConfig, GameType, Result};

/// "NR Name vs." / "NR Name at": an unlinked first team
static RE_NR_LEADING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:^|\s)NR\s+([^\x01\[\(]+?)\s+(?:vs\.|at)\s").expect("invalid regex: NR leading")
});

/// "vs. NR Name" / "at NR Name": an unlinked second team, before any tournament code
static RE_NR_TRAILING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s(?:vs\.|at)\s+NR\s+([^\x01\[\(]+?)(?:\s*\[|\s*\(|\s+(?:[A-Za-z]{2,}-T|NCAA)\s*$|\s*$)")
        .expect("invalid regex: NR trailing")
});

static RE_POSSESSIONS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\[(\d+(?:\.\d+)?)\]").expect("invalid regex: possessions")
});

/// Splits the game cell into two teams, their ranks and the venue type
pub struct TeamDecomposer {
    links_and_badges: Selector,
    team_link: Selector,
    rank_badge: Selector,
    not_ranked: String,
}

impl TeamDecomposer {
    pub fn new(config: &ExtractorConfig) -> Result<Self> {
        let sel = &config.selectors;
        Ok(TeamDecomposer {
            links_and_badges: selector(&format!("{}, {}", sel.team_link, sel.rank_badge))?,
            team_link: selector(&sel.team_link)?,
            rank_badge: selector(&sel.rank_badge)?,
            not_ranked: config.not_ranked.clone(),
        })
    }

    fn rank(&self, badge: &str) -> Option<String> {
        let badge = badge.trim();
        if badge.is_empty() || badge.eq_ignore_ascii_case(&self.not_ranked) {
            None
        } else {
            Some(badge.to_string())
        }
    }

    /// Linked teams in document order, each with the badge that precedes it
    fn linked_teams(&self, cell: ElementRef) -> Vec<(String, Option<String>)> {
        let mut teams = Vec::new();
        let mut pending_rank: Option<Option<String>> = None;

        for el in cell.select(&self.links_and_badges) {
            if self.team_link.matches(&el) {
                let name = element_text(el);
                if !name.is_empty() {
                    teams.push((name, pending_rank.take().flatten()));
                }
            } else {
                pending_rank = Some(self.rank(&element_text(el)));
            }
        }

        teams
    }
}

/// Venue type from the separator left between the teams
pub fn game_type(skeleton: &str) -> Option<GameType> {
    let head = skeleton.split("MVP:").next().unwrap_or_default();
    let padded = format!(" {} ", head);
    if padded.contains(" vs. ") {
        Some(GameType::Neutral)
    } else if padded.contains(" at ") {
        Some(GameType::HomeAway)
    } else {
        None
    }
}

impl Decomposer for TeamDecomposer {
    fn column(&self) -> &'static str {
        "Game"
    }

    fn decompose(&self, cell: ElementRef<'_>, _so_far: &PartialRecord) -> PartialRecord {
        let skel = skeleton(cell, &self.team_link, &self.rank_badge);
        let mut teams = self.linked_teams(cell);

        if teams.len() < 2 {
            if let Some(caps) = RE_NR_LEADING.captures(&skel) {
                log::debug!("Recovered unlinked team {:?}", &caps[1]);
                teams.insert(0, (caps[1].trim().to_string(), None));
            } else if let Some(caps) = RE_NR_TRAILING.captures(&skel) {
                log::debug!("Recovered unlinked team {:?}", &caps[1]);
                teams.push((caps[1].trim().to_string(), None));
            }
        }

        let mut teams = teams.into_iter();
        let (team1, team1_rank) = teams.next().map_or((None, None), |(n, r)| (Some(n), r));
        let (team2, team2_rank) = teams.next().map_or((None, None), |(n, r)| (Some(n), r));

        let possessions_raw = RE_POSSESSIONS
            .captures(&skel)
            .and_then(|caps| caps[1].parse::<f64>().ok());

        PartialRecord {
            team1,
            team1_rank,
            team2,
            team2_rank,
            game_type: game_type(&skel),
            possessions_raw,
            ..Default::default()
        }
    }
}
