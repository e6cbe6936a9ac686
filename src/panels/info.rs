//! src/panels/info.rs
//!
//! Graph info panel: reveal phase, animation limits and hover state.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::graph::RevealPhase;
use crate::graph::shared::SharedGraph;

/// Read-only info panel; `paused` is shown in the title.
pub struct InfoPanel {
    pub shared: SharedGraph,
    pub paused: bool,
}

impl InfoPanel {
    pub fn new(shared: SharedGraph, paused: bool) -> Self {
        Self { shared, paused }
    }
}

fn phase_style(phase: RevealPhase) -> Style {
    match phase {
        RevealPhase::Hidden => Style::default().fg(Color::Yellow),
        RevealPhase::Revealing => Style::default().fg(Color::Cyan),
        RevealPhase::Revealed => Style::default().fg(Color::Green),
    }
    .add_modifier(Modifier::BOLD)
}

fn key_text(key: Option<i64>) -> String {
    key.map_or_else(|| "-".to_string(), |k| k.to_string())
}

impl crate::ui::Panel for InfoPanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let Ok(g) = self.shared.read() else {
            return;
        };
        let graph = &g.graph;
        let phase = graph.phase();
        let r = graph.reveal_state();
        let t = graph.transform();
        let hide = r
            .hide_after
            .map_or_else(|| "off".to_string(), |h| format!("{h:.1}px"));

        let lines = vec![
            Line::from(vec![
                Span::raw("phase="),
                Span::styled(phase.name(), phase_style(phase)),
                Span::raw(format!("  hide_after={hide}")),
            ]),
            Line::from(Span::raw(format!(
                "initial={:.1}  user={:.1}  overlay={:.1}",
                r.x_limit_initial, r.x_limit, r.rect_limit
            ))),
            Line::from(Span::raw(format!(
                "grid={}px  x=[{}, {}]  y=[{}, {}]",
                t.x_diff, t.low_x, t.high_x, t.low_y, t.high_y
            ))),
            Line::from(Span::raw(format!(
                "hover: initial={}  user={}  hovering={}",
                key_text(graph.active_initial_point()),
                key_text(graph.active_point()),
                g.view.hovering
            ))),
        ];

        let title = if self.paused { "Info (paused)" } else { "Info" };
        let mut block = Block::default().title(title).borders(Borders::ALL);
        if self.paused {
            block = block.style(Style::default().fg(Color::Yellow));
        }
        f.render_widget(Paragraph::new(lines).block(block), area);
    }
}
