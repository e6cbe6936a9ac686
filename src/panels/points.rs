//! src/panels/points.rs
//!
//! Points panel: the user-drawn points in data space, newest column last.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::graph::data::round_to;
use crate::graph::shared::SharedGraph;

/// Shows the tail of the user series that fits the panel.
pub struct PointsPanel {
    pub shared: SharedGraph,
}

impl PointsPanel {
    pub fn new(shared: SharedGraph) -> Self {
        Self { shared }
    }
}

impl crate::ui::Panel for PointsPanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let Ok(g) = self.shared.read() else {
            return;
        };
        let graph = &g.graph;
        let t = graph.transform();
        let suffix = &graph.config().y_suffix;
        let height = area.height.saturating_sub(2) as usize;
        let total = graph.user_series().len();
        let active = graph.active_point();

        let lines: Vec<Line> = graph
            .user_series()
            .iter()
            .skip(total.saturating_sub(height))
            .map(|(x, y)| {
                let style = if Some(x) == active {
                    Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
                } else {
                    Style::default().fg(Color::Cyan)
                };
                Line::from(vec![
                    Span::styled("x: ", Style::default().fg(Color::Yellow)),
                    Span::styled(format!("{:>6}", t.column_to_data_x(x as f64).round()), style),
                    Span::raw(", "),
                    Span::styled("y: ", Style::default().fg(Color::Yellow)),
                    Span::styled(
                        format!("{}{}", round_to(t.row_to_data_y(y), 2), suffix),
                        style,
                    ),
                ])
            })
            .collect();

        let title = format!("Your points ({total})");
        let block = Block::default().title(title).borders(Borders::ALL);
        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}
