//! src/graph/display_list.rs
//!
//! Recording `Surface`: every draw call is resolved through the current
//! transform and stored as a `DrawCommand` in surface pixels. A frontend then
//! replays the list (the terminal canvas does this each frame).

use super::surface::{Arc, Circle, Font, Line, Point, Rect, Rgba, Shape, Stroke, Surface, SurfaceSize};

/// 2D affine transform, row-major `[[a, c, tx], [b, d, ty]]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Affine {
    a: f64,
    b: f64,
    c: f64,
    d: f64,
    tx: f64,
    ty: f64,
}

impl Default for Affine {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Affine {
    pub const IDENTITY: Affine = Affine {
        a: 1.0,
        b: 0.0,
        c: 0.0,
        d: 1.0,
        tx: 0.0,
        ty: 0.0,
    };

    /// `self * other`: `other` is applied first.
    fn then_local(self, other: Affine) -> Affine {
        Affine {
            a: self.a * other.a + self.c * other.b,
            b: self.b * other.a + self.d * other.b,
            c: self.a * other.c + self.c * other.d,
            d: self.b * other.c + self.d * other.d,
            tx: self.a * other.tx + self.c * other.ty + self.tx,
            ty: self.b * other.tx + self.d * other.ty + self.ty,
        }
    }

    pub fn apply(&self, p: Point) -> Point {
        Point::new(
            self.a * p.x + self.c * p.y + self.tx,
            self.b * p.x + self.d * p.y + self.ty,
        )
    }

    /// Rotation carried by the transform, in radians.
    pub fn angle(&self) -> f64 {
        self.b.atan2(self.a)
    }

    /// Average scale factor, used for radii and stroke widths.
    pub fn average_scale(&self) -> f64 {
        let sx = self.a.hypot(self.b);
        let sy = self.c.hypot(self.d);
        (sx + sy) / 2.0
    }
}

/// How `measure_text` estimates widths.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum TextMetrics {
    /// Width per glyph as a fraction of the font size.
    Proportional(f64),
    /// Every glyph occupies a fixed number of pixels (terminal cells).
    Monospace(f64),
}

impl Default for TextMetrics {
    fn default() -> Self {
        TextMetrics::Proportional(0.55)
    }
}

/// A recorded draw call, already in surface pixels.
#[derive(Clone, Debug, PartialEq)]
pub enum DrawCommand {
    Shape(Shape),
    FillRect {
        rect: Rect,
        color: Rgba,
    },
    Text {
        text: String,
        origin: Point,
        /// Rotation in radians around `origin`.
        angle: f64,
        width: f64,
        font: Font,
        color: Rgba,
    },
}

impl DrawCommand {
    /// Pixel bounds used for region clearing.
    pub fn bounds(&self) -> Rect {
        match self {
            DrawCommand::Shape(s) => s.bounds(),
            DrawCommand::FillRect { rect, .. } => *rect,
            DrawCommand::Text {
                origin,
                angle,
                width,
                font,
                ..
            } => {
                let end = Point::new(
                    origin.x + width * angle.cos(),
                    origin.y + width * angle.sin(),
                );
                let r = Rect::spanning(*origin, end);
                Rect::new(r.x, r.y - font.size, r.width, r.height + font.size)
            }
        }
    }
}

/// Retained frame: the commands of the current frame plus the canvas state
/// stack used while recording.
#[derive(Clone, Debug)]
pub struct DisplayList {
    size: SurfaceSize,
    commands: Vec<DrawCommand>,
    current: Affine,
    stack: Vec<Affine>,
    metrics: TextMetrics,
}

impl DisplayList {
    pub fn new(size: SurfaceSize) -> Self {
        Self {
            size,
            commands: Vec::new(),
            current: Affine::IDENTITY,
            stack: Vec::new(),
            metrics: TextMetrics::default(),
        }
    }

    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn set_metrics(&mut self, metrics: TextMetrics) {
        self.metrics = metrics;
    }

    pub fn transform(&self) -> Affine {
        self.current
    }

    fn push_local(&mut self, op: Affine) {
        self.current = self.current.then_local(op);
    }

    fn map_stroke(&self, stroke: Option<Stroke>) -> Option<Stroke> {
        let k = self.current.average_scale();
        stroke.map(|s| Stroke::new(s.color, s.width * k))
    }

    fn map_shape(&self, shape: &Shape) -> Shape {
        let t = &self.current;
        let k = t.average_scale();
        match shape {
            Shape::Arc(a) => {
                let rot = t.angle();
                Shape::Arc(Arc {
                    center: t.apply(a.center),
                    radius: a.radius * k,
                    start_angle: a.start_angle + rot,
                    end_angle: a.end_angle + rot,
                    counter_clockwise: a.counter_clockwise,
                    stroke: self.map_stroke(a.stroke),
                    fill: a.fill,
                })
            }
            Shape::Circle(c) => Shape::Circle(Circle {
                center: t.apply(c.center),
                radius: c.radius * k,
                stroke: self.map_stroke(c.stroke),
                fill: c.fill,
            }),
            Shape::Line(l) => Shape::Line(Line {
                from: t.apply(l.from),
                to: t.apply(l.to),
                stroke: Stroke::new(l.stroke.color, l.stroke.width * k),
                cap: l.cap,
                dash: l.dash.map(|[on, off]| [on * k, off * k]),
            }),
        }
    }
}

impl Surface for DisplayList {
    fn size(&self) -> SurfaceSize {
        self.size
    }

    fn draw_shape(&mut self, shape: &Shape) {
        let mapped = self.map_shape(shape);
        self.commands.push(DrawCommand::Shape(mapped));
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        let a = self.current.apply(Point::new(rect.x, rect.y));
        let b = self
            .current
            .apply(Point::new(rect.right(), rect.bottom()));
        self.commands.push(DrawCommand::FillRect {
            rect: Rect::spanning(a, b),
            color,
        });
    }

    /// Drops every recorded command lying wholly inside the (transformed)
    /// region.
    fn clear_rect(&mut self, rect: Rect) {
        let a = self.current.apply(Point::new(rect.x, rect.y));
        let b = self
            .current
            .apply(Point::new(rect.right(), rect.bottom()));
        let region = Rect::spanning(a, b);
        self.commands.retain(|c| !region.contains_rect(&c.bounds()));
    }

    fn fill_text(&mut self, text: &str, origin: Point, font: &Font, color: Rgba) {
        let width = self.measure_text(text, font) * self.current.average_scale();
        self.commands.push(DrawCommand::Text {
            text: text.to_string(),
            origin: self.current.apply(origin),
            angle: self.current.angle(),
            width,
            font: font.clone(),
            color,
        });
    }

    fn measure_text(&self, text: &str, font: &Font) -> f64 {
        let glyphs = text.chars().count() as f64;
        match self.metrics {
            TextMetrics::Proportional(ratio) => glyphs * font.size * ratio,
            TextMetrics::Monospace(cell) => glyphs * cell,
        }
    }

    fn save(&mut self) {
        self.stack.push(self.current);
    }

    fn restore(&mut self) {
        if let Some(t) = self.stack.pop() {
            self.current = t;
        }
    }

    fn translate(&mut self, dx: f64, dy: f64) {
        self.push_local(Affine {
            tx: dx,
            ty: dy,
            ..Affine::IDENTITY
        });
    }

    fn rotate(&mut self, radians: f64) {
        let (sin, cos) = radians.sin_cos();
        self.push_local(Affine {
            a: cos,
            b: sin,
            c: -sin,
            d: cos,
            tx: 0.0,
            ty: 0.0,
        });
    }

    fn scale(&mut self, sx: f64, sy: f64) {
        self.push_local(Affine {
            a: sx,
            d: sy,
            ..Affine::IDENTITY
        });
    }

    /// A full clear also resets the transform stack so each frame starts
    /// from the identity.
    fn clear(&mut self) {
        self.commands.clear();
        self.stack.clear();
        self.current = Affine::IDENTITY;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn near(a: Point, b: Point) -> bool {
        (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
    }

    #[test]
    fn translate_then_rotate_maps_like_a_canvas() {
        let mut dl = DisplayList::new(SurfaceSize::new(100.0, 100.0));
        dl.translate(10.0, 50.0);
        dl.rotate(-FRAC_PI_2);
        let p = dl.transform().apply(Point::new(5.0, 0.0));
        // five pixels along the rotated x axis points up the screen
        assert!(near(p, Point::new(10.0, 45.0)));
    }

    #[test]
    fn restore_pops_back_to_saved_transform() {
        let mut dl = DisplayList::new(SurfaceSize::new(100.0, 100.0));
        dl.save();
        dl.translate(3.0, 4.0);
        dl.scale(2.0, 2.0);
        dl.restore();
        assert_eq!(dl.transform(), Affine::IDENTITY);
        // unbalanced restore is ignored
        dl.restore();
        assert_eq!(dl.transform(), Affine::IDENTITY);
    }

    #[test]
    fn rotated_text_records_angle_and_origin() {
        let mut dl = DisplayList::new(SurfaceSize::new(200.0, 100.0));
        let font = Font::new("Oswald", 18.0);
        dl.save();
        dl.translate(25.0, 80.0);
        dl.rotate(-FRAC_PI_2);
        dl.fill_text("Legend", Point::new(0.0, 0.0), &font, Rgba::BLACK);
        dl.restore();
        match &dl.commands()[0] {
            DrawCommand::Text { origin, angle, .. } => {
                assert!(near(*origin, Point::new(25.0, 80.0)));
                assert!((angle + FRAC_PI_2).abs() < 1e-9);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn clear_rect_drops_only_contained_commands() {
        let mut dl = DisplayList::new(SurfaceSize::new(100.0, 100.0));
        dl.draw_shape(&Circle::dot(Point::new(10.0, 10.0)).into());
        dl.draw_shape(&Circle::dot(Point::new(80.0, 80.0)).into());
        dl.clear_rect(Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(dl.commands().len(), 1);
        dl.clear();
        assert!(dl.is_empty());
    }

    #[test]
    fn monospace_metrics_count_cells() {
        let mut dl = DisplayList::new(SurfaceSize::new(100.0, 100.0));
        dl.set_metrics(TextMetrics::Monospace(8.0));
        assert_eq!(dl.measure_text("abcd", &Font::new("Arial", 14.0)), 32.0);
    }

    #[test]
    fn scaled_line_scales_stroke_and_dash() {
        let mut dl = DisplayList::new(SurfaceSize::new(100.0, 100.0));
        dl.scale(2.0, 2.0);
        let line = Line::new(
            Point::new(1.0, 1.0),
            Point::new(2.0, 1.0),
            Stroke::new(Rgba::BLACK, 1.0),
        )
        .dashed(Some([2.0, 2.0]));
        dl.draw_shape(&line.into());
        match &dl.commands()[0] {
            DrawCommand::Shape(Shape::Line(l)) => {
                assert!(near(l.to, Point::new(4.0, 2.0)));
                assert_eq!(l.stroke.width, 2.0);
                assert_eq!(l.dash, Some([4.0, 4.0]));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
