//! src/graph/transform.rs
//!
//! Coordinate normalizer: derives the data-space bounds, the pixel ratios
//! and the snap grid from the initial dataset, then re-expresses that
//! dataset as a series keyed by snapped pixel column.

use std::collections::BTreeMap;

use super::config::ScaleMode;
use super::data::{Series, round_to};
use super::error::{GraphError, Result};
use super::surface::SurfaceSize;

/// Fraction of each drawable extent left empty as an inset.
const INSET: f64 = 0.1;

/// Data-space to pixel-space mapping derived from the initial dataset.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub low_x: f64,
    pub high_x: f64,
    pub low_y: f64,
    pub high_y: f64,
    pub x_range: f64,
    pub y_range: f64,
    /// Drawable width after the inset.
    pub x_space: f64,
    /// Drawable height after the inset.
    pub y_space: f64,
    pub x_ratio: f64,
    pub y_ratio: f64,
    /// Single scale of the binding axis.
    pub uniform_ratio: f64,
    /// Snap grid step in pixel columns, always at least 1.
    pub x_diff: i64,
    /// Smallest positive row rise between consecutive points.
    pub y_diff: f64,
}

impl Transform {
    pub fn data_x_to_column(&self, x: f64) -> f64 {
        (x - self.low_x) * self.x_ratio
    }

    pub fn data_y_to_row(&self, y: f64) -> f64 {
        (y - self.low_y) * self.y_ratio
    }

    pub fn column_to_data_x(&self, column: f64) -> f64 {
        column / self.x_ratio + self.low_x
    }

    pub fn row_to_data_y(&self, row: f64) -> f64 {
        row / self.y_ratio + self.low_y
    }

    /// Round a pixel column onto the snap grid.
    pub fn snap_column(&self, column: f64) -> i64 {
        (column / self.x_diff as f64).round() as i64 * self.x_diff
    }

    /// Largest column the initial data can occupy.
    pub fn max_column(&self) -> i64 {
        (self.x_range * self.x_ratio).ceil() as i64
    }
}

/// Output of [`normalize`].
#[derive(Clone, Debug, PartialEq)]
pub struct Normalized {
    pub transform: Transform,
    pub series: Series,
}

/// Fit `pairs` onto a surface of `size` with the given axis margins.
pub fn normalize(
    pairs: &[(f64, f64)],
    size: SurfaceSize,
    v_base: f64,
    h_base: f64,
    mode: ScaleMode,
) -> Result<Normalized> {
    if pairs.is_empty() {
        return Err(GraphError::EmptySeries);
    }

    // order by x; for repeated x the later pair wins
    let mut ordered: Vec<(f64, f64)> = Vec::with_capacity(pairs.len());
    let mut sorted = pairs.to_vec();
    sorted.sort_by(|a, b| a.0.total_cmp(&b.0));
    for (x, y) in sorted {
        match ordered.last_mut() {
            Some(last) if last.0 == x => last.1 = y,
            _ => ordered.push((x, y)),
        }
    }

    let (mut low_x, mut high_x) = (f64::INFINITY, f64::NEG_INFINITY);
    let (mut low_y, mut high_y) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(x, y) in &ordered {
        low_x = low_x.min(x);
        high_x = high_x.max(x);
        low_y = low_y.min(y);
        high_y = high_y.max(y);
    }

    let x_range = high_x - low_x;
    if x_range <= 0.0 {
        return Err(GraphError::DegenerateXRange);
    }
    let mut y_range = high_y - low_y;
    if y_range <= 0.0 {
        tracing::warn!(low_y, "flat y range, clamping span to 1.0");
        y_range = 1.0;
    }

    let x_space = size.width - v_base;
    let y_space = size.height - h_base;
    if x_space <= 0.0 || y_space <= 0.0 {
        return Err(GraphError::InvalidSurface {
            width: size.width,
            height: size.height,
        });
    }

    // binding axis: the one whose required scale is smaller
    let (max_space, max_dist) = if y_space / x_space > y_range / x_range {
        (x_space, x_range)
    } else {
        (y_space, y_range)
    };
    let uniform_ratio = max_space * (1.0 - 2.0 * INSET) / max_dist;

    let x_space = x_space * (1.0 - INSET);
    let y_space = y_space * (1.0 - INSET);
    let (x_ratio, y_ratio) = match mode {
        ScaleMode::Stretch => (x_space / x_range, y_space / y_range),
        ScaleMode::Uniform => (uniform_ratio, uniform_ratio),
    };

    let mut columns: BTreeMap<i64, f64> = BTreeMap::new();
    let mut x_diff: Option<i64> = None;
    let mut y_diff: Option<f64> = None;
    let (mut last_x, mut last_y) = (0i64, 0.0f64);
    for &(x, y) in &ordered {
        let col = ((x - low_x) * x_ratio).round() as i64;
        let row = (y - low_y) * y_ratio;
        columns.insert(col, row);

        let dx = col - last_x;
        if dx > 0 && x_diff.is_none_or(|d| d > dx) {
            x_diff = Some(dx);
        }
        let dy = row - last_y;
        if dy > 0.0 && y_diff.is_none_or(|d| d > dy) {
            y_diff = Some(dy);
        }
        last_x = col;
        last_y = row;
    }

    let Some(x_diff) = x_diff else {
        // every point rounded onto the same column
        return Err(GraphError::DegenerateXRange);
    };
    let y_diff = round_to(y_diff.unwrap_or(1.0), 4);

    let transform = Transform {
        low_x,
        high_x,
        low_y,
        high_y,
        x_range,
        y_range,
        x_space,
        y_space,
        x_ratio,
        y_ratio,
        uniform_ratio,
        x_diff,
        y_diff,
    };

    let series = snap_keys(columns, &transform).into_iter().collect();

    tracing::debug!(
        points = ordered.len(),
        x_ratio,
        y_ratio,
        x_diff,
        y_diff,
        "normalized initial series"
    );

    Ok(Normalized { transform, series })
}

/// Snap every column onto the grid. Only the last key can land past
/// `max_column()`; it is pulled back one step and any key it now meets is
/// pushed left in turn, so no point is lost and every key stays in bounds.
fn snap_keys(columns: BTreeMap<i64, f64>, transform: &Transform) -> Vec<(i64, f64)> {
    let step = transform.x_diff;
    let max_col = transform.max_column();
    let mut keys: Vec<(i64, f64)> = columns
        .into_iter()
        .map(|(col, row)| (transform.snap_column(col as f64), row))
        .collect();

    if let Some(last) = keys.last_mut() {
        if last.0 > max_col {
            last.0 -= step;
        }
    }
    for i in (1..keys.len()).rev() {
        if keys[i - 1].0 >= keys[i].0 {
            tracing::debug!(from = keys[i - 1].0, to = keys[i].0 - step, "shifting crowded key left");
            keys[i - 1].0 = keys[i].0 - step;
        }
    }
    keys
}
