//! src/graph/render.rs
//!
//! Frame renderer: composes axes, grid, labels, both series, the overlay
//! and the annotations onto a `Surface`. Rendering reads engine state only;
//! the animation is advanced separately by `Graph::advance`.

use std::f64::consts::FRAC_PI_2;

use super::data::round_to;
use super::engine::Graph;
use super::reveal::clip_segment;
use super::surface::{Circle, Font, Line, LineCap, Point, Rect, Rgba, Stroke, Surface};

const AXIS_FONT: Font = Font::new("Arial", 14.0);
const LABEL_FONT: Font = Font::new("Oswald", 14.0);
const LEGEND_FONT: Font = Font::new("Oswald", 18.0);
const PROMPT_FONT: Font = Font::new("Oswald", 17.0);

const GRID_WIDTH: f64 = 0.2;
const INITIAL_LINE_WIDTH: f64 = 5.0;
const USER_LINE_WIDTH: f64 = 1.0;
const USER_DASH: [f64; 2] = [2.0, 2.0];

/// A text annotation anchored in graph space.
struct Label<'a> {
    text: String,
    x: f64,
    y: f64,
    font: &'a Font,
    color: Rgba,
    /// Opaque box behind the text so grid lines do not cross it.
    background: bool,
    /// Nudge the text away from the anchor vertically.
    offset: bool,
}

impl<'a> Label<'a> {
    fn plain(text: String, x: f64, y: f64, font: &'a Font, color: Rgba) -> Self {
        Self {
            text,
            x,
            y,
            font,
            color,
            background: false,
            offset: false,
        }
    }

    fn boxed(mut self) -> Self {
        self.background = true;
        self
    }

    fn offset(mut self) -> Self {
        self.offset = true;
        self
    }
}

/// Left edge for text of `width` centred on `center`, pushed inward so it
/// stays within `[0, surface_width]`.
fn clamp_left(center: f64, width: f64, surface_width: f64) -> f64 {
    let left = center - width / 2.0;
    left.min(surface_width - width).max(0.0)
}

impl Graph {
    /// Draw the whole scene for the current state.
    pub fn render(&self, surface: &mut dyn Surface) {
        self.draw_axes(surface);
        self.draw_grid(surface);
        let ending = self.draw_initial_series(surface);
        self.draw_user_series(surface);
        self.draw_overlay(surface);
        self.draw_active_labels(surface);
        self.draw_prompt(surface);
        if self.config.v_base == 0.0 {
            self.draw_endpoints(surface, ending);
        }
    }

    fn to_surface(&self, x: f64, y: f64) -> Point {
        Point::new(
            x + self.config.v_base,
            self.size.height - y - self.config.h_base,
        )
    }

    fn draw_line(
        &self,
        surface: &mut dyn Surface,
        from: (f64, f64),
        to: (f64, f64),
        color: Rgba,
        width: f64,
        dash: Option<[f64; 2]>,
    ) {
        let line = Line::new(
            self.to_surface(from.0, from.1),
            self.to_surface(to.0, to.1),
            Stroke::new(color, width),
        )
        .cap(LineCap::Round)
        .dashed(dash);
        surface.draw_shape(&line.into());
    }

    fn draw_point(&self, surface: &mut dyn Surface, x: f64, y: f64, color: Rgba, radius: Option<f64>) {
        let radius = if self.config.v_base > 0.0 {
            10.0
        } else {
            radius.unwrap_or(2.0)
        };
        let circle = Circle::filled(self.to_surface(x, y), radius, color);
        surface.draw_shape(&circle.into());
    }

    fn draw_label(&self, surface: &mut dyn Surface, label: &Label<'_>) {
        let size = label.font.size;
        let width = surface.measure_text(&label.text, label.font);
        let offset = if label.offset {
            let shift = self.transform.y_diff * 5.0;
            if label.y + self.config.h_base > self.size.height / 2.0 {
                shift
            } else {
                -shift
            }
        } else {
            0.0
        };

        let left = clamp_left(label.x + self.config.v_base, width, self.size.width);
        let baseline = (self.size.height - (label.y + self.config.h_base) + offset)
            .clamp(size, self.size.height);

        if label.background {
            surface.fill_rect(
                Rect::new(left, baseline - size, width, size + 5.0),
                self.config.theme.label_background,
            );
        }
        surface.fill_text(&label.text, Point::new(left, baseline), label.font, label.color);
    }

    fn draw_axes(&self, surface: &mut dyn Surface) {
        let axis = self.config.theme.axis;
        self.draw_line(surface, (0.0, 0.0), (0.0, self.drawable_height()), axis, 0.9, None);
        self.draw_line(surface, (0.0, 0.0), (self.drawable_width(), 0.0), axis, 0.9, None);
    }

    fn draw_grid(&self, surface: &mut dyn Surface) {
        let theme = &self.config.theme;
        let t = &self.transform;
        let spacing = self.config.spacing.max(1.0);
        let x_diff = t.x_diff as f64;
        let has_legend = self.config.v_base > 0.0;
        let x_label_every = if has_legend { 2 } else { 4 };
        let label_y = -self.config.h_base / 1.5;

        if has_legend {
            let legend = &self.config.y_legend;
            let width = surface.measure_text(legend, &LEGEND_FONT);
            surface.save();
            surface.translate(self.config.v_base / 4.0, self.size.height / 2.0 + width / 2.0);
            surface.rotate(-FRAC_PI_2);
            surface.fill_text(legend, Point::new(0.0, 0.0), &LEGEND_FONT, theme.text);
            surface.restore();
        }

        self.draw_label(
            surface,
            &Label::plain(format!("{}", t.low_x), 0.0, label_y, &AXIS_FONT, theme.text),
        );

        let rows = self.drawable_height() / spacing;
        let mut i = 1u32;
        while (i as f64) < rows {
            let y = i as f64 * spacing;
            if i % 2 == 0 {
                self.draw_line(surface, (0.0, y), (self.drawable_width(), y), theme.grid, GRID_WIDTH, None);
            }
            if i % 4 == 0 && has_legend {
                let value = round_to(t.row_to_data_y(y), 2);
                let text = format!("{}{}", value, self.config.y_suffix);
                let x = -self.config.v_base / 2.8;
                self.draw_label(surface, &Label::plain(text, x, y, &AXIS_FONT, theme.text));
            }
            i += 1;
        }

        let columns = self.drawable_width() / x_diff;
        let mut i = 1u32;
        while (i as f64) < columns {
            let x = i as f64 * x_diff;
            if i % 2 == 0 {
                self.draw_line(surface, (x, 0.0), (x, self.drawable_height()), theme.grid, GRID_WIDTH, None);
            }
            if i % x_label_every == 0 {
                let text = format!("{}", t.column_to_data_x(x).round());
                self.draw_label(surface, &Label::plain(text, x, label_y, &AXIS_FONT, theme.text));
            }
            i += 1;
        }
    }

    /// Returns the last drawn endpoint of the initial series.
    fn draw_initial_series(&self, surface: &mut dyn Surface) -> (f64, f64) {
        let theme = &self.config.theme;
        let limit = self.reveal.x_limit_initial;
        let visible: Vec<(f64, f64)> = self
            .initial
            .iter()
            .filter(|&(x, _)| self.reveal.shows_initial(x as f64))
            .map(|(x, y)| (x as f64, y))
            .collect();

        for &(x, y) in &visible {
            if x <= limit {
                self.draw_point(surface, x, y, theme.initial_point, None);
            }
        }

        let mut ending = (0.0, 0.0);
        for pair in visible.windows(2) {
            if let Some((from, to)) = clip_segment(pair[0], pair[1], limit) {
                self.draw_line(surface, from, to, theme.initial_line, INITIAL_LINE_WIDTH, None);
                ending = to;
            }
        }
        ending
    }

    fn draw_user_series(&self, surface: &mut dyn Surface) {
        if self.user.is_empty() {
            return;
        }
        let theme = &self.config.theme;
        for (x, y) in self.user.iter() {
            self.draw_point(surface, x as f64, y, theme.user_point, None);
        }
        let mut previous = self.anchor;
        for (x, y) in self.user.iter() {
            let current = (x as f64, y);
            if let Some((from, to)) = clip_segment(previous, current, self.reveal.x_limit) {
                self.draw_line(surface, from, to, theme.user_line, USER_LINE_WIDTH, Some(USER_DASH));
            }
            previous = current;
        }
    }

    fn draw_overlay(&self, surface: &mut dyn Surface) {
        let left = self.config.v_base + self.reveal.rect_limit;
        if left < self.size.width {
            surface.fill_rect(
                Rect::new(left, 0.0, self.size.width - left, self.drawable_height()),
                self.config.theme.overlay,
            );
        }
    }

    fn data_text(&self, x: i64, y: f64) -> String {
        let t = &self.transform;
        format!(
            "{}, {}{}",
            t.column_to_data_x(x as f64).round(),
            round_to(t.row_to_data_y(y), 2),
            self.config.y_suffix
        )
    }

    fn draw_active_labels(&self, surface: &mut dyn Surface) {
        let text = self.config.theme.text;
        if let Some((x, y)) = self
            .active_point
            .and_then(|x| self.user.get(x).map(|y| (x, y)))
        {
            let label = Label::plain(self.data_text(x, y), x as f64, y, &LABEL_FONT, text).boxed();
            self.draw_label(surface, &label);
        }

        if let Some((x, y)) = self
            .active_initial_point
            .filter(|&x| self.reveal.shows_initial(x as f64))
            .and_then(|x| self.initial.get(x).map(|y| (x, y)))
        {
            let label = Label::plain(self.data_text(x, y), x as f64, y, &LABEL_FONT, text)
                .boxed()
                .offset();
            self.draw_label(surface, &label);
        }
    }

    fn draw_prompt(&self, surface: &mut dyn Surface) {
        let hiding = self.reveal.hide_after.is_some_and(|h| h > 0.0);
        if !self.user.is_empty() || !hiding {
            return;
        }
        let text = self.config.theme.text;
        let x = self.drawable_width() / 2.0 + self.reveal.rect_limit / 2.0;
        let y = self.drawable_height() / 2.0;
        let gap = PROMPT_FONT.size / 1.3;
        self.draw_label(
            surface,
            &Label::plain("Click or tap".to_string(), x, y + gap, &PROMPT_FONT, text),
        );
        self.draw_label(
            surface,
            &Label::plain("to complete the graph.".to_string(), x, y - gap, &PROMPT_FONT, text),
        );
    }

    /// Narrow layout has no y labels, so the first and last drawn values are
    /// marked directly.
    fn draw_endpoints(&self, surface: &mut dyn Surface, ending: (f64, f64)) {
        let theme = &self.config.theme;
        let t = &self.transform;
        if let Some((x, y)) = self.initial.first() {
            let x = x as f64;
            self.draw_point(surface, x, y, theme.highlight, Some(7.0));
            let text = format!("{}{}", round_to(t.row_to_data_y(y), 2), self.config.y_suffix);
            let label = Label::plain(text, x, y, &LABEL_FONT, theme.text).boxed().offset();
            self.draw_label(surface, &label);
        }

        let (x, y) = ending;
        self.draw_point(surface, x, y, theme.highlight, Some(7.0));
        let text = format!("{}{}", round_to(t.row_to_data_y(y), 1), self.config.y_suffix);
        let label = Label::plain(text, x, y + 4.0 * t.y_diff, &LABEL_FONT, theme.text).boxed();
        self.draw_label(surface, &label);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::graph::config::GraphConfig;
    use crate::graph::display_list::{DisplayList, DrawCommand};
    use crate::graph::surface::{Shape, SurfaceSize};

    const SIZE: SurfaceSize = SurfaceSize::new(1000.0, 500.0);
    const DATA: &str = "0,0,2,10,4,20,6,15,8,30,10,25,12,40,14,35,16,45,18,50,20,10";

    fn graph(hide_after: Option<f64>) -> Graph {
        Graph::new(SIZE, GraphConfig::new(100.0, 45.0, 10.0, hide_after), DATA).expect("graph")
    }

    fn frame(g: &mut Graph, ms: u64) -> DisplayList {
        let mut dl = DisplayList::new(SIZE);
        g.draw(&mut dl, Duration::from_millis(ms));
        dl
    }

    fn circles(dl: &DisplayList, color: Rgba) -> Vec<Point> {
        dl.commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Shape(Shape::Circle(c)) if c.fill == Some(color) => Some(c.center),
                _ => None,
            })
            .collect()
    }

    fn texts(dl: &DisplayList) -> Vec<(String, f64, f64)> {
        dl.commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Text {
                    text,
                    origin,
                    width,
                    ..
                } => Some((text.clone(), origin.x, *width)),
                _ => None,
            })
            .collect()
    }

    fn overlay(dl: &DisplayList, color: Rgba) -> Option<Rect> {
        dl.commands().iter().find_map(|c| match c {
            DrawCommand::FillRect { rect, color: c } if *c == color => Some(*rect),
            _ => None,
        })
    }

    #[test]
    fn hidden_points_are_never_drawn() {
        let mut g = graph(Some(11.0));
        let threshold = g.hide_after().expect("hidden") + 100.0;
        let black = g.config().theme.initial_point;
        for _ in 0..30 {
            let dl = frame(&mut g, 250);
            assert!(circles(&dl, black).iter().all(|p| p.x < threshold));
        }
        g.reveal_graph();
        for _ in 0..30 {
            frame(&mut g, 250);
        }
        let dl = frame(&mut g, 0);
        assert_eq!(circles(&dl, black).len(), g.initial_series().len());
    }

    #[test]
    fn partially_revealed_segment_ends_at_limit() {
        let mut g = graph(None);
        frame(&mut g, 1_000);
        let limit = g.reveal_state().x_limit_initial;
        let dl = frame(&mut g, 0);
        let color = g.config().theme.initial_line;
        let rightmost = dl
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Shape(Shape::Line(l)) if l.stroke.color == color && l.stroke.width == 5.0 => {
                    Some(l.to.x)
                }
                _ => None,
            })
            .fold(f64::MIN, f64::max);
        assert!((rightmost - (limit + 100.0)).abs() < 1e-9);
    }

    #[test]
    fn overlay_follows_rect_limit_and_disappears_when_revealed() {
        let mut g = graph(Some(11.0));
        let color = g.config().theme.overlay;
        let dl = frame(&mut g, 500);
        let rect = overlay(&dl, color).expect("overlay");
        assert_eq!(rect.x, 100.0);
        assert_eq!(rect.right(), 1000.0);

        g.reveal_graph();
        for _ in 0..40 {
            frame(&mut g, 250);
        }
        let dl = frame(&mut g, 0);
        assert!(overlay(&dl, color).is_none());
    }

    #[test]
    fn prompt_shows_until_first_point() {
        let mut g = graph(Some(11.0));
        let dl = frame(&mut g, 16);
        assert!(texts(&dl).iter().any(|(t, ..)| t == "Click or tap"));

        g.add_point(850.0, 100.0);
        let dl = frame(&mut g, 16);
        assert!(!texts(&dl).iter().any(|(t, ..)| t == "Click or tap"));
    }

    #[test]
    fn user_series_is_dashed_from_anchor() {
        let mut g = graph(Some(11.0));
        g.add_point(850.0, 100.0);
        for _ in 0..40 {
            frame(&mut g, 250);
        }
        let dl = frame(&mut g, 0);
        let dashed: Vec<&Line> = dl
            .commands()
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Shape(Shape::Line(l)) if l.dash.is_some() => Some(l),
                _ => None,
            })
            .collect();
        assert_eq!(dashed.len(), 1);
        let (ax, ay) = g.anchor();
        assert_eq!(dashed[0].from, Point::new(ax + 100.0, 500.0 - ay - 45.0));
    }

    #[test]
    fn active_label_stays_inside_surface() {
        let mut g = graph(Some(11.0));
        let key = g.add_point(890.0, 200.0);
        let dl = frame(&mut g, 0);
        let expected = g.data_text(key, 200.0);
        let (_, left, width) = texts(&dl)
            .into_iter()
            .find(|(t, ..)| *t == expected)
            .expect("active label");
        assert!(left >= 0.0);
        assert!(left + width <= 1000.0);
    }

    #[test]
    fn clamp_left_pushes_inward() {
        assert_eq!(clamp_left(500.0, 100.0, 1000.0), 450.0);
        assert_eq!(clamp_left(990.0, 100.0, 1000.0), 900.0);
        assert_eq!(clamp_left(10.0, 100.0, 1000.0), 0.0);
    }

    #[test]
    fn narrow_layout_marks_endpoints() {
        let mut g = Graph::new(
            SurfaceSize::new(500.0, 400.0),
            GraphConfig::new(100.0, 45.0, 10.0, None),
            DATA,
        )
        .expect("graph");
        let green = g.config().theme.highlight;
        let dl = frame(&mut g, 16);
        assert_eq!(circles(&dl, green).len(), 2);
        // no rotated legend without a left margin
        assert!(!texts(&dl).iter().any(|(t, ..)| t == "Y Axis Legend"));
    }

    #[test]
    fn wide_layout_draws_legend() {
        let mut g = graph(None);
        let dl = frame(&mut g, 16);
        assert!(texts(&dl).iter().any(|(t, ..)| t == "Y Axis Legend"));
    }
}
