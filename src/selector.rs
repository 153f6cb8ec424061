//! Matchup selection.
//!
//! Opponents are ranked by how close their popularity is to the left card and
//! the difficulty tier picks a slice of that ranking: hard rounds come from
//! the near-equal end, easy rounds from the lopsided end. A shuffle inside the
//! slice keeps a tier from being predictable.
//!
//! Fresh picks (first card, fallbacks) walk a relaxation chain so the game
//! always makes progress even once every name has been shown recently.

use std::cmp::Ordering;
use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::catalog::{Artist, Catalog};
use crate::config::GameConfig;
use crate::difficulty::Difficulty;

/// `max / min` of two popularities. `1.0` means indistinguishable; larger
/// values are easier to call. Zero against non-zero is infinitely easy.
pub fn closeness_ratio(a: u64, b: u64) -> f64 {
    let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
    if hi == 0 {
        1.0
    } else if lo == 0 {
        f64::INFINITY
    } else {
        hi as f64 / lo as f64
    }
}

/// Ties favor the left card.
pub fn left_wins(left: &Artist, right: &Artist) -> bool {
    left.popularity >= right.popularity
}

pub struct MatchSelector<'a> {
    catalog: &'a Catalog,
    config: &'a GameConfig,
}

impl<'a> MatchSelector<'a> {
    pub fn new(catalog: &'a Catalog, config: &'a GameConfig) -> Self {
        Self { catalog, config }
    }

    /// Candidates for facing `left`, closest popularity first (stable on ties).
    pub fn ranked(&self, left: &Artist, excluded: &HashSet<&str>) -> Vec<(&'a Artist, f64)> {
        let mut ranked: Vec<(&Artist, f64)> = self
            .catalog
            .available(excluded, Some(left))
            .into_iter()
            .map(|a| (a, closeness_ratio(a.popularity, left.popularity)))
            .collect();
        ranked.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal));
        ranked
    }

    /// Pick an opponent for `left` whose closeness fits `difficulty`.
    /// Returns `None` when every candidate is excluded.
    pub fn select_opponent(
        &self,
        left: &Artist,
        excluded: &HashSet<&str>,
        difficulty: Difficulty,
        rng: &mut impl Rng,
    ) -> Option<&'a Artist> {
        let ranked = self.ranked(left, excluded);
        if ranked.is_empty() {
            return None;
        }
        let (start, end) = difficulty.window(ranked.len());
        let mut slice: Vec<&Artist> = if start < end {
            ranked[start..end].iter().map(|(a, _)| *a).collect()
        } else {
            ranked.iter().map(|(a, _)| *a).collect()
        };
        slice.shuffle(rng);
        let pick = slice.first().copied();
        if let Some(p) = pick {
            log::debug!(
                "selector: {:?} opponent for '{}' -> '{}' ({} of {} candidates in window)",
                difficulty,
                left.name,
                p.name,
                end.saturating_sub(start),
                ranked.len()
            );
        }
        pick
    }

    /// Pick a card with little regard for matchup quality.
    ///
    /// Exclusion relaxes step by step: the last `memory_limit` used names,
    /// then (below `min_fresh_candidates`) only the last `relaxed_memory`,
    /// then only the cards in `displayed`. `avoid` is excluded at every step.
    pub fn select_initial(
        &self,
        used_names: &[String],
        displayed: &[&str],
        avoid: Option<&Artist>,
        rng: &mut impl Rng,
    ) -> Option<&'a Artist> {
        let shown: HashSet<&str> = displayed.iter().copied().collect();
        let recent = |window: usize| {
            let from = used_names.len().saturating_sub(window);
            used_names[from..]
                .iter()
                .map(String::as_str)
                .collect::<HashSet<&str>>()
        };

        let mut available = self.catalog.available(&recent(self.config.memory_limit), avoid);
        if available.len() < self.config.min_fresh_candidates {
            log::debug!(
                "selector: only {} fresh candidates, relaxing memory to {}",
                available.len(),
                self.config.relaxed_memory
            );
            available = self.catalog.available(&recent(self.config.relaxed_memory), avoid);
        }
        if available.is_empty() {
            log::debug!("selector: history exhausted, excluding only displayed cards");
            available = self.catalog.available(&shown, avoid);
        }
        if available.is_empty() {
            return None;
        }
        available.shuffle(rng);
        available.first().copied()
    }
}
