//! src/graph/engine.rs
//!
//! The graph engine: owns the normalized initial series, the user-drawn
//! series, the reveal state and the hover state, and exposes the operations
//! the frame loop and input handlers call.
//!
//! # Coordinate spaces
//!
//! * **data space**: raw dataset values.
//! * **graph space**: pixels with the origin at the axis corner and y up.
//!   Series keys, reveal limits and the hide threshold all live here.
//! * **surface space**: pixels with the origin top-left and y down.
//!
//! The hide threshold is *configured* in data space and *stored* in graph
//! space as `(hide_after - low_x) * x_ratio`.

use std::time::Duration;

use super::config::GraphConfig;
use super::data::{Series, parse_pairs};
use super::error::Result;
use super::explanation::Explanation;
use super::reveal::{RevealPhase, RevealState, RevealTargets};
use super::surface::{Point, Surface, SurfaceSize};
use super::transform::{Transform, normalize};

pub struct Graph {
    pub(super) config: GraphConfig,
    pub(super) size: SurfaceSize,
    pub(super) transform: Transform,
    pub(super) initial: Series,
    pub(super) user: Series,
    pub(super) reveal: RevealState,
    pub(super) initial_hide_after: Option<f64>,
    /// Where the user series attaches: the last initial point before the
    /// hide threshold.
    pub(super) anchor: (f64, f64),
    pub(super) active_point: Option<i64>,
    pub(super) active_initial_point: Option<i64>,
    pub(super) explanation: Explanation,
}

impl Graph {
    /// Build an engine for a surface of `size` from a flat
    /// `x1,y1,x2,y2,...` dataset. Invalid pairs are logged and skipped.
    pub fn new(size: SurfaceSize, mut config: GraphConfig, raw: &str) -> Result<Self> {
        if size.width < config.narrow_width {
            tracing::debug!(width = size.width, "narrow surface, dropping left margin");
            config.v_base = 0.0;
        }

        let parsed = parse_pairs(raw);
        if parsed.skipped > 0 {
            tracing::warn!(skipped = parsed.skipped, "ignored invalid dataset pairs");
        }
        let normalized = normalize(
            &parsed.pairs,
            size,
            config.v_base,
            config.h_base,
            config.scale_mode,
        )?;
        let transform = normalized.transform;
        let initial = normalized.series;

        let hide_after = config.hide_after.map(|h| transform.data_x_to_column(h));
        let anchor = match hide_after {
            Some(h) => initial.last_before(h),
            None => initial.last(),
        }
        .map(|(x, y)| (x as f64, y))
        .unwrap_or((0.0, 0.0));
        let origin = initial.first().map(|(x, _)| x as f64).unwrap_or(0.0);

        tracing::info!(
            points = initial.len(),
            x_diff = transform.x_diff,
            hide_after = ?hide_after,
            "graph initialized"
        );

        Ok(Self {
            config,
            size,
            transform,
            initial,
            user: Series::new(),
            reveal: RevealState::new(origin, hide_after),
            initial_hide_after: hide_after,
            anchor,
            active_point: None,
            active_initial_point: None,
            explanation: Explanation::default(),
        })
    }

    pub fn with_explanation(mut self, explanation: Explanation) -> Self {
        self.explanation = explanation;
        self
    }

    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    pub fn size(&self) -> SurfaceSize {
        self.size
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn initial_series(&self) -> &Series {
        &self.initial
    }

    pub fn user_series(&self) -> &Series {
        &self.user
    }

    pub fn reveal_state(&self) -> RevealState {
        self.reveal
    }

    /// Hide threshold in graph pixels; `None` once the graph is revealed.
    pub fn hide_after(&self) -> Option<f64> {
        self.reveal.hide_after
    }

    pub fn active_point(&self) -> Option<i64> {
        self.active_point
    }

    pub fn active_initial_point(&self) -> Option<i64> {
        self.active_initial_point
    }

    pub fn anchor(&self) -> (f64, f64) {
        self.anchor
    }

    pub fn explanation(&self) -> &Explanation {
        &self.explanation
    }

    /// Width of the plotting area in graph pixels.
    pub fn drawable_width(&self) -> f64 {
        self.size.width - self.config.v_base
    }

    pub fn drawable_height(&self) -> f64 {
        self.size.height - self.config.h_base
    }

    pub fn phase(&self) -> RevealPhase {
        self.reveal.phase(self.drawable_width())
    }

    /// Store a user point at graph coordinates `(x, y)`.
    ///
    /// `x` snaps to the nearest grid column and `y` to the nearest pixel; an
    /// existing point in that column is replaced. Returns the column.
    pub fn add_point(&mut self, x: f64, y: f64) -> i64 {
        let key = self.transform.snap_column(x);
        self.user.insert(key, y.round());
        self.active_point = Some(key);
        tracing::debug!(key, y = y.round(), "user point added");
        key
    }

    /// Add a user point given in data space, applying the same rules as a
    /// pointer press. Returns `None` when hiding is off or the point falls
    /// inside the visible region.
    pub fn add_data_point(&mut self, data_x: f64, data_y: f64) -> Option<i64> {
        let x = self.transform.data_x_to_column(data_x);
        let y = self.transform.data_y_to_row(data_y);
        self.place_point(x, y)
    }

    fn place_point(&mut self, x: f64, y: f64) -> Option<i64> {
        let threshold = self.reveal.hide_after?;
        let in_bounds = (0.0..=self.drawable_width()).contains(&x)
            && (0.0..=self.drawable_height()).contains(&y);
        if in_bounds && x > threshold {
            Some(self.add_point(x, y))
        } else {
            None
        }
    }

    /// Convert a surface position into graph space, or `None` when it falls
    /// outside the plotting area.
    pub fn to_graph_space(&self, p: Point) -> Option<Point> {
        let x = p.x - self.config.v_base;
        let y = self.size.height - p.y - self.config.h_base;
        let inside = (0.0..=self.drawable_width()).contains(&x)
            && (0.0..=self.drawable_height()).contains(&y);
        inside.then_some(Point::new(x, y))
    }

    /// Pointer pressed (or dragged with the button held) at a surface
    /// position. Adds a point past the hide threshold.
    pub fn press(&mut self, p: Point) -> Option<i64> {
        self.reveal.hide_after?;
        let g = self.to_graph_space(p)?;
        self.place_point(g.x, g.y)
    }

    /// Pointer moved to a surface position: pick the points under it.
    pub fn hover(&mut self, p: Point) {
        let spacing = self.config.spacing.max(1.0);
        let x = ((p.x - self.config.v_base) / spacing).round() * spacing;
        let radius = self.config.hover_radius;
        self.active_initial_point = self.initial.last_key_near(x, radius);
        self.active_point = self.user.last_key_near(x, radius);
    }

    /// Pointer left the surface.
    pub fn leave(&mut self) {
        self.active_point = None;
        self.active_initial_point = None;
    }

    /// Clear the user series and restart the reveal from the beginning.
    pub fn reset_graph(&mut self) {
        self.user.clear();
        let origin = self.initial.first().map(|(x, _)| x as f64).unwrap_or(0.0);
        self.reveal = RevealState::new(origin, self.initial_hide_after);
        self.active_point = None;
        self.active_initial_point = None;
        self.explanation.collapse();
        tracing::info!("graph reset");
    }

    /// Stop hiding the initial series and open the explanation.
    pub fn reveal_graph(&mut self) {
        self.reveal.reveal(self.transform.x_diff as f64);
        self.active_point = None;
        self.active_initial_point = None;
        self.explanation.expand();
        tracing::info!("graph revealed");
    }

    /// Render the current frame, then advance the animation by `elapsed`.
    pub fn draw(&mut self, surface: &mut dyn Surface, elapsed: Duration) {
        self.render(surface);
        self.advance(elapsed);
    }

    fn targets(&self) -> RevealTargets {
        let initial_end = self
            .initial
            .iter()
            .filter(|&(x, _)| self.reveal.shows_initial(x as f64))
            .map(|(x, _)| x as f64)
            .next_back()
            .unwrap_or(0.0);
        let user_end = self
            .user
            .last()
            .map(|(x, _)| x as f64)
            .unwrap_or(self.anchor.0);
        RevealTargets {
            initial_end,
            user_end,
            anchor_x: self.anchor.0,
            x_diff: self.transform.x_diff as f64,
            full_width: self.drawable_width(),
        }
    }

    /// Advance the reveal limits by the time since the previous frame.
    pub fn advance(&mut self, elapsed: Duration) {
        let duration_ms = self.config.reveal_duration.as_secs_f64() * 1_000.0;
        let speed = if duration_ms > 0.0 {
            self.transform.x_space / duration_ms
        } else {
            f64::INFINITY
        };
        let step = elapsed.as_secs_f64() * 1_000.0 * speed;
        let targets = self.targets();
        self.reveal.advance(step, &targets);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::display_list::DisplayList;

    const SIZE: SurfaceSize = SurfaceSize::new(1000.0, 500.0);

    fn scenario(hide_after: Option<f64>) -> Graph {
        let config = GraphConfig::new(100.0, 45.0, 10.0, hide_after);
        Graph::new(SIZE, config, "0,0,10,50,20,10").expect("graph")
    }

    #[test]
    fn scenario_normalization_and_point_snap() {
        let mut g = scenario(Some(15.0));
        let t = *g.transform();
        assert_eq!((t.low_x, t.high_x, t.low_y, t.high_y), (0.0, 20.0, 0.0, 50.0));
        assert_eq!(g.initial_series().len(), 3);
        let d = t.x_diff;
        assert_eq!(d, 405);

        let key = g.add_point(205.0, 33.0);
        assert_eq!(key, (205.0 / d as f64).round() as i64 * d);
        assert_eq!(g.user_series().get(key), Some(33.0));
        assert_eq!(g.active_point(), Some(key));
    }

    #[test]
    fn repeated_add_point_keeps_one_entry() {
        let mut g = scenario(Some(15.0));
        let a = g.add_point(600.0, 12.4);
        let b = g.add_point(600.0, 12.4);
        assert_eq!(a, b);
        assert_eq!(g.user_series().len(), 1);
        // a nearby x in the same grid column replaces the point
        g.add_point(420.0, 80.0);
        assert_eq!(g.user_series().len(), 1);
        assert_eq!(g.user_series().get(405), Some(80.0));
    }

    #[test]
    fn hide_threshold_is_converted_to_pixels() {
        let g = scenario(Some(15.0));
        assert_eq!(g.hide_after(), Some(15.0 * 40.5));
        assert_eq!(g.anchor().0, 405.0);
    }

    #[test]
    fn press_respects_threshold_and_bounds() {
        let mut g = scenario(Some(15.0));
        // graph x = 300 is left of the threshold (607.5)
        assert_eq!(g.press(Point::new(400.0, 200.0)), None);
        // graph x = 800, y = 500 - 200 - 45 = 255
        assert_eq!(g.press(Point::new(900.0, 200.0)), Some(810));
        assert_eq!(g.user_series().get(810), Some(255.0));
        // inside the left margin
        assert_eq!(g.press(Point::new(50.0, 200.0)), None);

        g.reveal_graph();
        assert_eq!(g.press(Point::new(900.0, 100.0)), None);
        assert_eq!(g.add_data_point(19.0, 10.0), None);
    }

    #[test]
    fn data_point_is_converted_before_snapping() {
        let mut g = scenario(Some(15.0));
        assert_eq!(g.add_data_point(19.0, 10.0), Some(810));
        assert_eq!(g.user_series().get(810), Some((10.0f64 * 8.19).round()));
        assert_eq!(g.add_data_point(5.0, 10.0), None);
    }

    #[test]
    fn hover_picks_nearest_points_and_leave_clears() {
        let mut g = scenario(Some(15.0));
        g.add_point(810.0, 40.0);
        g.hover(Point::new(100.0 + 403.0, 10.0));
        assert_eq!(g.active_initial_point(), Some(405));
        assert_eq!(g.active_point(), None);
        g.hover(Point::new(100.0 + 812.0, 10.0));
        assert_eq!(g.active_initial_point(), Some(810));
        assert_eq!(g.active_point(), Some(810));
        g.leave();
        assert_eq!((g.active_point(), g.active_initial_point()), (None, None));
    }

    #[test]
    fn reset_restores_post_init_state() {
        let mut g = scenario(Some(15.0));
        let fresh = g.reveal_state();
        let mut surface = DisplayList::new(SIZE);
        for _ in 0..10 {
            g.draw(&mut surface, Duration::from_millis(250));
        }
        g.add_point(810.0, 100.0);
        g.reveal_graph();
        g.draw(&mut surface, Duration::from_millis(500));
        assert_ne!(g.reveal_state(), fresh);

        g.reset_graph();
        assert_eq!(g.reveal_state(), fresh);
        assert!(g.user_series().is_empty());
        assert_eq!(g.active_point(), None);
        assert!(!g.explanation().is_expanded());
    }

    #[test]
    fn reveal_disables_hiding_and_opens_explanation() {
        let mut g = scenario(Some(15.0));
        g.reveal_graph();
        assert_eq!(g.hide_after(), None);
        assert!(g.explanation().is_expanded());
        assert_eq!(g.phase(), RevealPhase::Revealing);
        for _ in 0..40 {
            g.advance(Duration::from_millis(250));
        }
        assert_eq!(g.phase(), RevealPhase::Revealed);
        assert_eq!(g.reveal_state().rect_limit, g.drawable_width());
        assert_eq!(g.reveal_state().x_limit_initial, 810.0);
    }

    #[test]
    fn reveal_sweeps_full_width_in_configured_time() {
        let mut g = scenario(None);
        // 810 px drawable over 4000 ms
        g.advance(Duration::from_millis(1_000));
        assert!((g.reveal_state().x_limit_initial - 202.5).abs() < 1e-9);
        g.advance(Duration::from_millis(4_000));
        assert_eq!(g.reveal_state().x_limit_initial, 810.0);
    }

    #[test]
    fn narrow_surface_drops_left_margin() {
        let g = Graph::new(
            SurfaceSize::new(400.0, 400.0),
            GraphConfig::new(100.0, 45.0, 10.0, None),
            "0,0,10,50,20,10",
        )
        .expect("graph");
        assert_eq!(g.config().v_base, 0.0);
        assert_eq!(g.drawable_width(), 400.0);
    }

    #[test]
    fn invalid_pairs_do_not_abort_ingestion() {
        let g = Graph::new(
            SIZE,
            GraphConfig::new(100.0, 45.0, 10.0, None),
            "0,0,x,5,10,50,20,10",
        )
        .expect("graph");
        assert_eq!(g.initial_series().len(), 3);
    }
}
