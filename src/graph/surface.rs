//! src/graph/surface.rs
//!
//! Drawing-surface seam: geometry, colors, fonts, the closed set of shapes,
//! and the `Surface` trait the engine draws through.
//!
//! Surface coordinates have their origin at the top-left corner with y
//! growing downwards. Graph space (origin at the axis corner, y up) is
//! converted by the engine before anything reaches a surface.
//!
//! The engine itself only emits circles, lines, rectangles and text; arcs,
//! scaling and `clear_rect` are there for other drawing clients.

use std::f64::consts::TAU;

/// A position in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Axis-aligned rectangle in surface pixels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// True when `other` lies entirely inside `self` (edges inclusive).
    pub fn contains_rect(&self, other: &Rect) -> bool {
        other.x >= self.x
            && other.y >= self.y
            && other.right() <= self.right()
            && other.bottom() <= self.bottom()
    }

    /// Smallest rectangle containing both points.
    pub fn spanning(a: Point, b: Point) -> Self {
        let x = a.x.min(b.x);
        let y = a.y.min(b.y);
        Self::new(x, y, (a.x - b.x).abs(), (a.y - b.y).abs())
    }
}

/// Pixel dimensions of a surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SurfaceSize {
    pub width: f64,
    pub height: f64,
}

impl SurfaceSize {
    pub const fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.width, self.height)
    }
}

/// Straight-alpha RGBA color.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const BLACK: Rgba = Rgba::rgb(0, 0, 0);
    pub const WHITE: Rgba = Rgba::rgb(255, 255, 255);
    pub const GREEN: Rgba = Rgba::rgb(0, 128, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: f64) -> Self {
        Self { r, g, b, a }
    }

    /// Composite this color over an opaque `background`.
    pub fn over(self, background: Rgba) -> Rgba {
        let a = self.a.clamp(0.0, 1.0);
        let mix = |fg: u8, bg: u8| (fg as f64 * a + bg as f64 * (1.0 - a)).round() as u8;
        Rgba::rgb(
            mix(self.r, background.r),
            mix(self.g, background.g),
            mix(self.b, background.b),
        )
    }
}

/// Font selection for text commands.
#[derive(Clone, Debug, PartialEq)]
pub struct Font {
    pub family: &'static str,
    pub size: f64,
}

impl Font {
    pub const fn new(family: &'static str, size: f64) -> Self {
        Self { family, size }
    }
}

/// Stroke color and width.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Stroke {
    pub color: Rgba,
    pub width: f64,
}

impl Stroke {
    pub const fn new(color: Rgba, width: f64) -> Self {
        Self { color, width }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LineCap {
    #[default]
    Butt,
    Round,
    Square,
}

/// Circular arc from `start_angle` to `end_angle` (radians).
#[derive(Clone, Debug, PartialEq)]
pub struct Arc {
    pub center: Point,
    pub radius: f64,
    pub start_angle: f64,
    pub end_angle: f64,
    pub counter_clockwise: bool,
    pub stroke: Option<Stroke>,
    pub fill: Option<Rgba>,
}

impl Arc {
    /// Signed sweep in radians, following the drawing direction.
    pub fn sweep(&self) -> f64 {
        let raw = self.end_angle - self.start_angle;
        if self.counter_clockwise {
            -(-raw).rem_euclid(TAU)
        } else if raw >= TAU {
            TAU
        } else {
            raw.rem_euclid(TAU)
        }
    }

    /// Point on the arc at `t` in `[0, 1]` along the sweep.
    pub fn point_at(&self, t: f64) -> Point {
        let angle = self.start_angle + self.sweep() * t;
        Point::new(
            self.center.x + self.radius * angle.cos(),
            self.center.y + self.radius * angle.sin(),
        )
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Circle {
    pub center: Point,
    pub radius: f64,
    pub stroke: Option<Stroke>,
    pub fill: Option<Rgba>,
}

impl Circle {
    pub fn filled(center: Point, radius: f64, color: Rgba) -> Self {
        Self {
            center,
            radius,
            stroke: None,
            fill: Some(color),
        }
    }

    /// One-pixel black dot.
    pub fn dot(center: Point) -> Self {
        Self::filled(center, 1.0, Rgba::BLACK)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    pub from: Point,
    pub to: Point,
    pub stroke: Stroke,
    pub cap: LineCap,
    /// `[on, off]` dash lengths in pixels; `None` is solid.
    pub dash: Option<[f64; 2]>,
}

impl Line {
    pub fn new(from: Point, to: Point, stroke: Stroke) -> Self {
        Self {
            from,
            to,
            stroke,
            cap: LineCap::Butt,
            dash: None,
        }
    }

    pub fn cap(mut self, cap: LineCap) -> Self {
        self.cap = cap;
        self
    }

    pub fn dashed(mut self, dash: Option<[f64; 2]>) -> Self {
        self.dash = dash;
        self
    }

    pub fn length(&self) -> f64 {
        (self.to.x - self.from.x).hypot(self.to.y - self.from.y)
    }

    /// Visible sub-segments after applying the dash pattern.
    pub fn segments(&self) -> Vec<(Point, Point)> {
        let Some([on, off]) = self.dash else {
            return vec![(self.from, self.to)];
        };
        let len = self.length();
        if on <= 0.0 || len == 0.0 {
            return vec![(self.from, self.to)];
        }
        let lerp = |d: f64| {
            let t = d / len;
            Point::new(
                self.from.x + (self.to.x - self.from.x) * t,
                self.from.y + (self.to.y - self.from.y) * t,
            )
        };
        let mut out = Vec::new();
        let mut d = 0.0;
        while d < len {
            let end = (d + on).min(len);
            out.push((lerp(d), lerp(end)));
            d = end + off.max(0.0);
        }
        out
    }
}

/// The closed set of drawable primitives.
#[derive(Clone, Debug, PartialEq)]
pub enum Shape {
    Arc(Arc),
    Circle(Circle),
    Line(Line),
}

impl Shape {
    /// Bounding box in the coordinates the shape was built in.
    pub fn bounds(&self) -> Rect {
        match self {
            Shape::Arc(a) => Rect::new(
                a.center.x - a.radius,
                a.center.y - a.radius,
                a.radius * 2.0,
                a.radius * 2.0,
            ),
            Shape::Circle(c) => Rect::new(
                c.center.x - c.radius,
                c.center.y - c.radius,
                c.radius * 2.0,
                c.radius * 2.0,
            ),
            Shape::Line(l) => Rect::spanning(l.from, l.to),
        }
    }
}

impl From<Arc> for Shape {
    fn from(a: Arc) -> Self {
        Shape::Arc(a)
    }
}

impl From<Circle> for Shape {
    fn from(c: Circle) -> Self {
        Shape::Circle(c)
    }
}

impl From<Line> for Shape {
    fn from(l: Line) -> Self {
        Shape::Line(l)
    }
}

/// A 2D drawing target.
///
/// Mirrors the small subset of an immediate-mode canvas the engine needs.
/// Transform operations affect every later draw call until the matching
/// `restore`.
pub trait Surface {
    fn size(&self) -> SurfaceSize;

    fn draw_shape(&mut self, shape: &Shape);

    fn fill_rect(&mut self, rect: Rect, color: Rgba);

    /// Erase a region.
    fn clear_rect(&mut self, rect: Rect);

    /// Draw `text` with its left end of the baseline at `origin`.
    fn fill_text(&mut self, text: &str, origin: Point, font: &Font, color: Rgba);

    fn measure_text(&self, text: &str, font: &Font) -> f64;

    fn save(&mut self);

    fn restore(&mut self);

    fn translate(&mut self, dx: f64, dy: f64);

    fn rotate(&mut self, radians: f64);

    fn scale(&mut self, sx: f64, sy: f64);

    /// Erase the whole surface.
    fn clear(&mut self) {
        let bounds = self.size().bounds();
        self.clear_rect(bounds);
    }
}
