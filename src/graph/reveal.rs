//! src/graph/reveal.rs
//!
//! Progressive-reveal state machine: how far each series is drawn and where
//! the "not yet revealed" overlay starts.

/// Where the reveal animation stands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RevealPhase {
    /// Part of the initial series is held back behind the overlay.
    Hidden,
    /// Hiding is disabled and the overlay is still retracting.
    Revealing,
    /// The overlay has left the drawable area.
    Revealed,
}

impl RevealPhase {
    pub fn name(&self) -> &'static str {
        match self {
            RevealPhase::Hidden => "hidden",
            RevealPhase::Revealing => "revealing",
            RevealPhase::Revealed => "revealed",
        }
    }
}

/// Per-frame destinations for the reveal limits, all in graph pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealTargets {
    /// Last initial column currently allowed to show.
    pub initial_end: f64,
    /// Last user column, or the anchor column while the user series is empty.
    pub user_end: f64,
    /// Column where the user series attaches to the initial one.
    pub anchor_x: f64,
    pub x_diff: f64,
    /// Drawable width; the overlay is gone once it gets here.
    pub full_width: f64,
}

/// Reveal limits. Every limit only moves forward during [`advance`].
///
/// [`advance`]: RevealState::advance
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RevealState {
    pub x_limit_initial: f64,
    pub x_limit: f64,
    pub rect_limit: f64,
    /// Pixel column beyond which the initial series is hidden; `None`
    /// reveals everything.
    pub hide_after: Option<f64>,
}

impl RevealState {
    /// All limits at `origin`, hiding from `hide_after`.
    pub fn new(origin: f64, hide_after: Option<f64>) -> Self {
        Self {
            x_limit_initial: origin,
            x_limit: origin,
            rect_limit: origin,
            hide_after,
        }
    }

    pub fn is_hidden(&self) -> bool {
        self.hide_after.is_some()
    }

    /// True when column `x` of the initial series may be shown.
    pub fn shows_initial(&self, x: f64) -> bool {
        self.hide_after.is_none_or(|h| x < h)
    }

    pub fn phase(&self, full_width: f64) -> RevealPhase {
        match self.hide_after {
            Some(_) => RevealPhase::Hidden,
            None if self.rect_limit >= full_width => RevealPhase::Revealed,
            None => RevealPhase::Revealing,
        }
    }

    /// Move every limit forward by `step` pixels toward its target.
    pub fn advance(&mut self, step: f64, targets: &RevealTargets) {
        let step = step.max(0.0);

        if self.x_limit_initial < targets.initial_end {
            self.x_limit_initial = (self.x_limit_initial + step).min(targets.initial_end);
        }
        if self.x_limit < targets.user_end {
            self.x_limit = (self.x_limit + step).min(targets.user_end);
        }

        match self.hide_after {
            Some(_) => {
                if self.rect_limit < self.x_limit_initial + targets.x_diff {
                    // stop one pixel short of the next grid column
                    let cap = targets.anchor_x + targets.x_diff - 1.0;
                    self.rect_limit = self.rect_limit.max((self.rect_limit + step).min(cap));
                }
            }
            None => {
                if self.rect_limit < targets.full_width {
                    self.rect_limit = (self.rect_limit + step).min(targets.full_width);
                }
            }
        }
    }

    /// Disable hiding and pull the overlay back one grid step.
    pub fn reveal(&mut self, x_diff: f64) {
        self.hide_after = None;
        self.rect_limit = (self.rect_limit - x_diff).max(0.0);
    }
}

/// Clip segment `from -> to` at column `limit`.
///
/// Segments entirely before the limit are returned unchanged; segments
/// crossing it end exactly at the limit with y interpolated along the line;
/// segments starting at or after it are dropped.
pub fn clip_segment(from: (f64, f64), to: (f64, f64), limit: f64) -> Option<((f64, f64), (f64, f64))> {
    if to.0 <= limit {
        Some((from, to))
    } else if from.0 < limit {
        let slope = (to.1 - from.1) / (to.0 - from.0);
        let y = (limit - from.0) * slope + from.1;
        Some((from, (limit, y)))
    } else {
        None
    }
}
