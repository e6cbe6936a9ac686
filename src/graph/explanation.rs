//! src/graph/explanation.rs
//!
//! Disclosure state of the explanation shown once the graph is revealed.

#[derive(Clone, Debug, PartialEq)]
pub struct Explanation {
    text: String,
    expanded: bool,
}

impl Explanation {
    /// A collapsed explanation with the given body.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            expanded: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    /// Rows the explanation needs for `width` columns; zero while collapsed.
    pub fn height(&self, width: u16) -> u16 {
        if !self.expanded {
            return 0;
        }
        let width = width.max(1) as usize;
        let rows: usize = self
            .text
            .lines()
            .map(|l| l.chars().count().div_ceil(width).max(1))
            .sum();
        rows.min(u16::MAX as usize) as u16
    }

    pub fn expand(&mut self) {
        self.expanded = true;
    }

    pub fn collapse(&mut self) {
        self.expanded = false;
    }
}

impl Default for Explanation {
    fn default() -> Self {
        Self::new(
            "The shaded region held the rest of the data. Compare your dashed guess \
             with the actual series as it is drawn in.",
        )
    }
}
