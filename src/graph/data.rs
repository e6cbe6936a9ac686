//! src/graph/data.rs
//!
//! Raw dataset parsing and the ordered point series shared by the initial
//! and user-drawn data.

use std::collections::BTreeMap;
use std::collections::btree_map;

/// Round `value` to `decimals` decimal places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Result of parsing a flat `x1,y1,x2,y2,...` dataset.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedData {
    /// Valid pairs in input order.
    pub pairs: Vec<(f64, f64)>,
    /// Number of pairs dropped because a coordinate was not a finite number.
    pub skipped: usize,
}

/// Parse a comma-separated flat sequence of alternating x/y values.
///
/// A pair containing a non-numeric or non-finite token is logged and
/// skipped; the rest of the input is still ingested.
pub fn parse_pairs(raw: &str) -> ParsedData {
    let tokens: Vec<&str> = raw
        .split(',')
        .map(str::trim)
        .collect::<Vec<_>>();
    // a single trailing comma is not a value
    let tokens = match tokens.split_last() {
        Some((last, rest)) if last.is_empty() => rest,
        _ => tokens.as_slice(),
    };

    let mut parsed = ParsedData::default();
    for (i, chunk) in tokens.chunks(2).enumerate() {
        let [xs, ys] = chunk else {
            tracing::warn!(pair = i, token = chunk[0], "dangling x value without y, skipped");
            parsed.skipped += 1;
            continue;
        };
        match (parse_finite(xs), parse_finite(ys)) {
            (Some(x), Some(y)) => parsed.pairs.push((x, y)),
            _ => {
                tracing::warn!(pair = i, x = *xs, y = *ys, "provided data is not a number, skipped");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}

fn parse_finite(token: &str) -> Option<f64> {
    token.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Points keyed by pixel column, iterated in column order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Series {
    points: BTreeMap<i64, f64>,
}

impl Series {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the point at `x`.
    pub fn insert(&mut self, x: i64, y: f64) {
        self.points.insert(x, y);
    }

    pub fn get(&self, x: i64) -> Option<f64> {
        self.points.get(&x).copied()
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (i64, f64)> + '_ {
        self.points.iter().map(|(&x, &y)| (x, y))
    }

    pub fn keys(&self) -> btree_map::Keys<'_, i64, f64> {
        self.points.keys()
    }

    pub fn first(&self) -> Option<(i64, f64)> {
        self.points.first_key_value().map(|(&x, &y)| (x, y))
    }

    pub fn last(&self) -> Option<(i64, f64)> {
        self.points.last_key_value().map(|(&x, &y)| (x, y))
    }

    /// Last point strictly before column `limit`.
    pub fn last_before(&self, limit: f64) -> Option<(i64, f64)> {
        self.iter().rev().find(|&(x, _)| (x as f64) < limit)
    }

    /// Last key within `radius` of `x` (inclusive).
    pub fn last_key_near(&self, x: f64, radius: f64) -> Option<i64> {
        let lo = (x - radius).ceil() as i64;
        let hi = (x + radius).floor() as i64;
        if lo > hi {
            return None;
        }
        self.points.range(lo..=hi).next_back().map(|(&k, _)| k)
    }
}

impl FromIterator<(i64, f64)> for Series {
    fn from_iter<I: IntoIterator<Item = (i64, f64)>>(iter: I) -> Self {
        Self {
            points: iter.into_iter().collect(),
        }
    }
}
