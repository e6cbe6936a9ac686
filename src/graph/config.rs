//! src/graph/config.rs
//!
//! Layout, timing and color parameters for the graph engine.

use std::time::Duration;

use super::surface::Rgba;

/// How data units map onto pixels.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ScaleMode {
    /// Each axis fills its own drawable extent.
    #[default]
    Stretch,
    /// Both axes share the scale of the binding axis, preserving the data
    /// aspect ratio.
    Uniform,
}

/// Colors used by the frame renderer.
#[derive(Clone, Debug, PartialEq)]
pub struct Theme {
    pub background: Rgba,
    pub axis: Rgba,
    pub grid: Rgba,
    pub text: Rgba,
    pub label_background: Rgba,
    pub initial_point: Rgba,
    pub initial_line: Rgba,
    pub user_point: Rgba,
    pub user_line: Rgba,
    pub overlay: Rgba,
    pub highlight: Rgba,
}

impl Theme {
    /// Dark ink on a white page.
    pub fn light() -> Self {
        Self {
            background: Rgba::WHITE,
            axis: Rgba::rgb(80, 107, 138),
            grid: Rgba::rgb(0, 69, 98),
            text: Rgba::BLACK,
            label_background: Rgba::WHITE,
            initial_point: Rgba::BLACK,
            initial_line: Rgba::rgb(0, 69, 98),
            user_point: Rgba::rgba(0, 0, 0, 0.25),
            user_line: Rgba::BLACK,
            overlay: Rgba::rgba(50, 50, 50, 0.1),
            highlight: Rgba::GREEN,
        }
    }

    /// Light ink for dark terminals.
    pub fn dark() -> Self {
        Self {
            background: Rgba::rgb(16, 18, 24),
            axis: Rgba::rgb(126, 163, 205),
            grid: Rgba::rgb(52, 78, 96),
            text: Rgba::rgb(230, 230, 230),
            label_background: Rgba::rgb(16, 18, 24),
            initial_point: Rgba::rgb(240, 240, 240),
            initial_line: Rgba::rgb(95, 175, 215),
            user_point: Rgba::rgba(255, 255, 255, 0.5),
            user_line: Rgba::rgb(255, 200, 90),
            overlay: Rgba::rgba(120, 120, 120, 0.25),
            highlight: Rgba::rgb(90, 220, 120),
        }
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

#[derive(Clone, Debug)]
pub struct GraphConfig {
    /// Left margin reserved for the y legend and labels (pixels).
    pub v_base: f64,

    /// Bottom margin reserved for x labels (pixels).
    pub h_base: f64,

    /// Horizontal grid spacing and hover snapping step (pixels).
    pub spacing: f64,

    /// Data-space x after which the initial series starts hidden.
    /// `None` shows everything from the start.
    pub hide_after: Option<f64>,

    /// Surfaces narrower than this drop the left margin.
    pub narrow_width: f64,

    /// Time for the reveal to sweep the full drawable width.
    pub reveal_duration: Duration,

    /// Hover distance (pixels) within which a point becomes active.
    pub hover_radius: f64,

    pub scale_mode: ScaleMode,

    /// Rotated title drawn in the left margin.
    pub y_legend: String,

    /// Appended to y values in labels.
    pub y_suffix: String,

    pub theme: Theme,
}

impl GraphConfig {
    /// Create a config with the given margins, grid spacing and threshold.
    pub fn new(v_base: f64, h_base: f64, spacing: f64, hide_after: Option<f64>) -> Self {
        Self {
            v_base,
            h_base,
            spacing,
            hide_after,
            ..Self::default()
        }
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_scale_mode(mut self, mode: ScaleMode) -> Self {
        self.scale_mode = mode;
        self
    }

    pub fn with_legend(mut self, legend: impl Into<String>) -> Self {
        self.y_legend = legend.into();
        self
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            v_base: 100.0,
            h_base: 45.0,
            spacing: 10.0,
            hide_after: Some(2000.5),
            narrow_width: 650.0,
            reveal_duration: Duration::from_millis(4_000),
            hover_radius: 9.0,
            scale_mode: ScaleMode::Stretch,
            y_legend: "Y Axis Legend".to_string(),
            y_suffix: "%".to_string(),
            theme: Theme::default(),
        }
    }
}
