//! src/panels/graph.rs
//!
//! Graph panel: replays the frame recorded by the engine onto a braille
//! canvas.
//!
//! The recorded frame is in surface pixels with y pointing down; the canvas
//! uses the same extent with y pointing up, so every point is flipped on the
//! way out. Sub-dot detail (line widths, 2 px dashes) is widened to what a
//! braille dot can show.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::Span,
    widgets::{
        Block, Borders,
        canvas::{Canvas, Circle as CanvasCircle, Context, Line as CanvasLine, Points},
    },
};

use crate::graph::display_list::{DisplayList, DrawCommand};
use crate::graph::shared::SharedGraph;
use crate::graph::surface::{Point, Rect as SurfaceRect, Rgba, Shape, Surface, SurfaceSize};

/// Steps used to approximate an arc.
const ARC_STEPS: usize = 24;

/// Blend `c` over the panel background into a terminal color.
fn color(c: Rgba, background: Rgba) -> Color {
    let o = c.over(background);
    Color::Rgb(o.r, o.g, o.b)
}

/// Surface pixels covered by one terminal cell of a canvas of `canvas` cells.
pub fn cell_size(size: SurfaceSize, canvas: Rect) -> (f64, f64) {
    (
        size.width / canvas.width.max(1) as f64,
        size.height / canvas.height.max(1) as f64,
    )
}

/// Map the terminal cell at `(column, row)` to the surface pixel under its
/// centre, or `None` when the cell is outside the canvas.
pub fn cell_to_surface(canvas: Rect, size: SurfaceSize, column: u16, row: u16) -> Option<Point> {
    let inside = column >= canvas.x
        && column < canvas.x + canvas.width
        && row >= canvas.y
        && row < canvas.y + canvas.height;
    if !inside {
        return None;
    }
    let (cw, ch) = cell_size(size, canvas);
    Some(Point::new(
        (column - canvas.x) as f64 * cw + cw / 2.0,
        (row - canvas.y) as f64 * ch + ch / 2.0,
    ))
}

/// Replays one recorded frame.
struct Replay<'a> {
    frame: &'a DisplayList,
    background: Rgba,
    /// Pixels per terminal cell.
    cell: (f64, f64),
}

impl Replay<'_> {
    fn flip(&self, p: Point) -> (f64, f64) {
        (p.x, self.frame.size().height - p.y)
    }

    /// Pixels per braille dot.
    fn dot(&self) -> (f64, f64) {
        (self.cell.0 / 2.0, self.cell.1 / 4.0)
    }

    fn line(&self, ctx: &mut Context<'_>, a: Point, b: Point, c: Color) {
        let (x1, y1) = self.flip(a);
        let (x2, y2) = self.flip(b);
        ctx.draw(&CanvasLine {
            x1,
            y1,
            x2,
            y2,
            color: c,
        });
    }

    fn fill_disc(&self, ctx: &mut Context<'_>, center: Point, radius: f64, c: Color) {
        let step = self.dot().1.max(0.5);
        let mut dy = -radius;
        while dy <= radius {
            let half = (radius * radius - dy * dy).max(0.0).sqrt();
            self.line(
                ctx,
                Point::new(center.x - half, center.y + dy),
                Point::new(center.x + half, center.y + dy),
                c,
            );
            dy += step;
        }
    }

    /// Translucent fills become a sparse dot pattern so the shapes under
    /// them stay visible.
    fn shade(&self, ctx: &mut Context<'_>, rect: SurfaceRect, c: Color) {
        let (dx, dy) = self.dot();
        let (sx, sy) = ((dx * 2.0).max(1.0), (dy * 2.0).max(1.0));
        let mut coords = Vec::new();
        let mut y = rect.y + dy / 2.0;
        while y < rect.bottom() {
            let mut x = rect.x + dx / 2.0;
            while x < rect.right() {
                coords.push(self.flip(Point::new(x, y)));
                x += sx;
            }
            y += sy;
        }
        ctx.draw(&Points {
            coords: &coords,
            color: c,
        });
    }

    fn text(&self, ctx: &mut Context<'_>, text: &str, origin: Point, angle: f64, c: Color) {
        let style = Style::default().fg(c);
        if angle.abs() < 1e-3 {
            // baseline origin; the glyph row sits just above it
            let (x, y) = self.flip(Point::new(origin.x, origin.y - self.cell.1 / 2.0));
            ctx.print(x, y, Span::styled(text.to_string(), style));
            return;
        }
        let step = self.cell.1;
        for (i, ch) in text.chars().enumerate() {
            let d = i as f64 * step;
            let p = Point::new(origin.x + d * angle.cos(), origin.y + d * angle.sin());
            let (x, y) = self.flip(p);
            ctx.print(x, y, Span::styled(ch.to_string(), style));
        }
    }

    fn paint(&self, ctx: &mut Context<'_>, command: &DrawCommand) {
        let bg = self.background;
        match command {
            DrawCommand::Shape(Shape::Line(l)) => {
                let dot = self.dot().0;
                let line = match l.dash {
                    Some([on, off]) => l.clone().dashed(Some([on.max(dot), off.max(dot)])),
                    None => l.clone(),
                };
                let c = color(l.stroke.color, bg);
                for (a, b) in line.segments() {
                    self.line(ctx, a, b, c);
                }
            }
            DrawCommand::Shape(Shape::Circle(circle)) => {
                if let Some(fill) = circle.fill {
                    self.fill_disc(ctx, circle.center, circle.radius, color(fill, bg));
                }
                if let Some(stroke) = circle.stroke {
                    let (x, y) = self.flip(circle.center);
                    ctx.draw(&CanvasCircle {
                        x,
                        y,
                        radius: circle.radius,
                        color: color(stroke.color, bg),
                    });
                }
            }
            DrawCommand::Shape(Shape::Arc(arc)) => {
                let Some(c) = arc.stroke.map(|s| s.color).or(arc.fill) else {
                    return;
                };
                let c = color(c, bg);
                let mut prev = arc.point_at(0.0);
                for i in 1..=ARC_STEPS {
                    let next = arc.point_at(i as f64 / ARC_STEPS as f64);
                    self.line(ctx, prev, next, c);
                    prev = next;
                }
            }
            DrawCommand::FillRect { rect, color: c } => {
                // opaque boxes only back labels, and printed text already
                // owns its cells
                if c.a < 1.0 {
                    self.shade(ctx, *rect, color(*c, bg));
                }
            }
            DrawCommand::Text {
                text,
                origin,
                angle,
                color: c,
                ..
            } => self.text(ctx, text, *origin, *angle, color(*c, bg)),
        }
    }
}

/// Canvas panel for one shared graph.
pub struct GraphPanel {
    pub shared: SharedGraph,
    frame: DisplayList,
}

impl GraphPanel {
    /// `frame` is the most recent frame recorded by the scheduler.
    pub fn new(shared: SharedGraph, frame: DisplayList) -> Self {
        Self { shared, frame }
    }

    fn block(title: String) -> Block<'static> {
        Block::default().title(title).borders(Borders::ALL)
    }

    /// Cells available to the canvas once the border is drawn.
    pub fn canvas_area(area: Rect) -> Rect {
        Self::block(String::new()).inner(area)
    }
}

impl crate::ui::Panel for GraphPanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let Ok(g) = self.shared.read() else {
            tracing::error!("graph lock poisoned, skipping canvas");
            return;
        };
        let theme = &g.graph.config().theme;
        let background = theme.background;
        let size = self.frame.size();
        let title = format!("{} [{}]", g.name, g.graph.phase().name());
        let replay = Replay {
            frame: &self.frame,
            background,
            cell: cell_size(size, Self::canvas_area(area)),
        };

        let canvas = Canvas::default()
            .block(
                Self::block(title).title_style(Style::default().add_modifier(Modifier::BOLD)),
            )
            .background_color(color(background, background))
            .marker(Marker::Braille)
            .x_bounds([0.0, size.width])
            .y_bounds([0.0, size.height])
            .paint(|ctx| {
                for command in self.frame.commands() {
                    replay.paint(ctx, command);
                }
            });
        f.render_widget(canvas, area);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cells_map_to_their_centre_pixel() {
        let canvas = Rect::new(1, 1, 100, 25);
        let size = SurfaceSize::new(1000.0, 500.0);
        assert_eq!(cell_to_surface(canvas, size, 1, 1), Some(Point::new(5.0, 10.0)));
        assert_eq!(
            cell_to_surface(canvas, size, 100, 25),
            Some(Point::new(995.0, 490.0))
        );
        assert_eq!(cell_to_surface(canvas, size, 0, 5), None);
        assert_eq!(cell_to_surface(canvas, size, 101, 5), None);
        assert_eq!(cell_to_surface(canvas, size, 5, 26), None);
    }

    #[test]
    fn canvas_area_excludes_border() {
        let inner = GraphPanel::canvas_area(Rect::new(0, 0, 40, 10));
        assert_eq!(inner, Rect::new(1, 1, 38, 8));
    }

    #[test]
    fn translucent_colors_blend_into_background() {
        let bg = Rgba::rgb(0, 0, 0);
        assert_eq!(color(Rgba::rgba(200, 100, 50, 0.5), bg), Color::Rgb(100, 50, 25));
        assert_eq!(color(Rgba::WHITE, bg), Color::Rgb(255, 255, 255));
    }
}
