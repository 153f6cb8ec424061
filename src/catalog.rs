//! Artist catalog: the fixed set of cards a session draws from.
//!
//! The catalog is immutable after loading. All queries are pure and keep the
//! load order, so tiering and filtering are deterministic for a given list.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::CatalogError;

mod sample;

pub use sample::SAMPLE_ARTISTS;

/// One comparable card. Field names on the wire follow the dataset format
/// (`monthly_listeners`, `img`).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(rename = "monthly_listeners")]
    pub popularity: u64,
    #[serde(rename = "img")]
    pub image_ref: String,
}

impl Artist {
    pub fn new(name: impl Into<String>, popularity: u64, image_ref: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            popularity,
            image_ref: image_ref.into(),
        }
    }
}

/// Three popularity bands, most popular first.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Tiers<'a> {
    pub high: Vec<&'a Artist>,
    pub medium: Vec<&'a Artist>,
    pub low: Vec<&'a Artist>,
}

#[derive(Clone, Debug, Default)]
pub struct Catalog {
    artists: Vec<Artist>,
}

impl Catalog {
    /// Build a catalog, dropping later duplicates of an already seen name.
    pub fn new(artists: Vec<Artist>) -> Self {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(artists.len());
        for artist in artists {
            if seen.insert(artist.name.clone()) {
                unique.push(artist);
            } else {
                log::warn!("catalog: dropping duplicate artist '{}'", artist.name);
            }
        }
        Self { artists: unique }
    }

    /// Parse a JSON array of `{name, monthly_listeners, img}` records.
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let artists: Vec<Artist> = serde_json::from_str(json)?;
        Ok(Self::new(artists))
    }

    /// The dataset bundled with the game.
    pub fn sample() -> Self {
        Self::new(
            SAMPLE_ARTISTS
                .iter()
                .map(|&(name, listeners, img)| Artist::new(name, listeners, img))
                .collect(),
        )
    }

    pub fn artists(&self) -> &[Artist] {
        &self.artists
    }

    pub fn len(&self) -> usize {
        self.artists.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artists.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&Artist> {
        self.artists.iter().find(|a| a.name == name)
    }

    /// Split into thirds by popularity (descending, stable), each band
    /// `ceil(N / 3)` long except possibly the last.
    pub fn tiers(&self) -> Tiers<'_> {
        let mut sorted: Vec<&Artist> = self.artists.iter().collect();
        sorted.sort_by(|a, b| b.popularity.cmp(&a.popularity));
        let third = sorted.len().div_ceil(3);
        let first_cut = third.min(sorted.len());
        let second_cut = (third * 2).min(sorted.len());
        Tiers {
            high: sorted[..first_cut].to_vec(),
            medium: sorted[first_cut..second_cut].to_vec(),
            low: sorted[second_cut..].to_vec(),
        }
    }

    /// Artists whose name is neither in `excluded` nor equal to `exclude`'s.
    pub fn available<'a>(
        &'a self,
        excluded: &HashSet<&str>,
        exclude: Option<&Artist>,
    ) -> Vec<&'a Artist> {
        self.artists
            .iter()
            .filter(|a| !excluded.contains(a.name.as_str()))
            .filter(|a| exclude.is_none_or(|e| e.name != a.name))
            .collect()
    }
}

/// Group digits in thousands with `.` (es-AR style): `1234567` -> `1.234.567`.
pub fn format_listeners(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out
}
