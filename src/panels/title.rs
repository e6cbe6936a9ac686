//! src/panels/title.rs
//!
//! Header panel: graph name plus a one-line hint for the current phase.

use ratatui::{
    Frame,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};

use crate::graph::RevealPhase;

pub struct TitlePanel {
    pub title: String,
    pub phase: RevealPhase,
}

impl TitlePanel {
    pub fn new(title: &str, phase: RevealPhase) -> Self {
        Self {
            title: title.to_string(),
            phase,
        }
    }

    fn hint(&self) -> &'static str {
        match self.phase {
            RevealPhase::Hidden => "draw the rest of the line in the shaded area, then press v",
            RevealPhase::Revealing => "revealing...",
            RevealPhase::Revealed => "press r to try again",
        }
    }
}

impl crate::ui::Panel for TitlePanel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        let line = Line::from(vec![
            Span::styled(
                self.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(self.hint(), Style::default().fg(Color::DarkGray)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        f.render_widget(p, area);
    }
}
