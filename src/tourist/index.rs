//! Display indexes.
//!
//! Pins and photos are addressed by stable UUIDs in the store, but users pick
//! them by position: `1` is the oldest pin, and within a pin `1` is the first
//! photo of the current batch. Indexes are recomputed on every listing, so they
//! shift after deletions.

use crate::model::{Photo, Pin};
use std::str::FromStr;

/// A 1-based position in a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayIndex(pub usize);

impl std::fmt::Display for DisplayIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

impl FromStr for DisplayIndex {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().parse::<usize>() {
            Ok(0) => Err("Indexes start at 1".to_string()),
            Ok(n) => Ok(DisplayIndex(n)),
            Err(_) => Err(format!("Invalid index format: {}", s)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DisplayPin {
    pub pin: Pin,
    pub index: DisplayIndex,
    pub photo_count: usize,
}

#[derive(Debug, Clone)]
pub struct DisplayPhoto {
    pub photo: Photo,
    pub index: DisplayIndex,
}

/// Assigns display indexes to pins, oldest first.
///
/// Ties on `created_at` keep store order.
pub fn index_pins(mut pins: Vec<(Pin, usize)>) -> Vec<DisplayPin> {
    pins.sort_by(|a, b| a.0.created_at.cmp(&b.0.created_at));
    pins.into_iter()
        .enumerate()
        .map(|(i, (pin, photo_count))| DisplayPin {
            pin,
            index: DisplayIndex(i + 1),
            photo_count,
        })
        .collect()
}

/// Assigns display indexes to photos in the order the store returned them.
pub fn index_photos(photos: Vec<Photo>) -> Vec<DisplayPhoto> {
    photos
        .into_iter()
        .enumerate()
        .map(|(i, photo)| DisplayPhoto {
            photo,
            index: DisplayIndex(i + 1),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn parses_positive_indexes() {
        assert_eq!(DisplayIndex::from_str("3"), Ok(DisplayIndex(3)));
        assert!(DisplayIndex::from_str("0").is_err());
        assert!(DisplayIndex::from_str("p1").is_err());
    }

    #[test]
    fn display_honors_width() {
        assert_eq!(format!("{:>3}.", DisplayIndex(7)), "  7.");
        assert_eq!(format!("{:>3}.", DisplayIndex(12)), " 12.");
        assert_eq!(DisplayIndex(4).to_string(), "4");
    }

    #[test]
    fn pins_are_indexed_oldest_first() {
        let mut newer = Pin::new(1.0, 1.0).unwrap();
        let older = Pin::new(2.0, 2.0).unwrap();
        newer.created_at = older.created_at + Duration::seconds(5);

        let indexed = index_pins(vec![(newer.clone(), 0), (older.clone(), 4)]);
        assert_eq!(indexed[0].pin, older);
        assert_eq!(indexed[0].index, DisplayIndex(1));
        assert_eq!(indexed[0].photo_count, 4);
        assert_eq!(indexed[1].pin, newer);
        assert_eq!(indexed[1].index, DisplayIndex(2));
    }
}
