//! src/graph/demo.rs
//!
//! Random demo dataset used when no data is supplied on the command line.

use rand::Rng;

use super::data::round_to;

pub const FIRST_YEAR: i32 = 1980;
pub const LAST_YEAR: i32 = 2020;

/// A random walk of percentages, one point per year, as a flat
/// `x1,y1,x2,y2,...` string.
pub fn random_dataset() -> String {
    random_dataset_with(&mut rand::rng(), FIRST_YEAR..=LAST_YEAR)
}

pub fn random_dataset_with<R: Rng + ?Sized>(
    rng: &mut R,
    years: std::ops::RangeInclusive<i32>,
) -> String {
    let mut value: f64 = rng.random_range(10.0..40.0);
    let mut out = Vec::new();
    for year in years {
        out.push(format!("{},{}", year, round_to(value, 1)));
        value = (value + rng.random_range(-4.0..4.5)).clamp(0.0, 100.0);
    }
    out.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::data::parse_pairs;

    #[test]
    fn one_point_per_year_within_percent_range() {
        let raw = random_dataset();
        let parsed = parse_pairs(&raw);
        assert_eq!(parsed.skipped, 0);
        assert_eq!(parsed.pairs.len(), (LAST_YEAR - FIRST_YEAR + 1) as usize);
        assert_eq!(parsed.pairs[0].0, FIRST_YEAR as f64);
        assert!(parsed.pairs.iter().all(|&(_, y)| (0.0..=100.0).contains(&y)));
    }
}
