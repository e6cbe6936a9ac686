//! src/ui/node.rs
//!
//! Recursive layout Node + Panel trait used across the UI. Leaves can carry
//! a name so input handlers can find where a panel was placed.

use std::collections::HashMap;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};

/// Panel trait: any renderable surface implements this.
pub trait Panel {
    fn draw(&self, f: &mut Frame<'_>, area: Rect);
}

/// Node tree used to compose the UI each frame.
pub enum Node {
    Group {
        direction: Direction,
        constraints: Vec<Constraint>,
        children: Vec<Node>,
    },
    Leaf {
        name: Option<&'static str>,
        panel: Box<dyn Panel>,
    },
}

/// Where each named leaf landed in the last layout.
pub type HitMap = HashMap<&'static str, Rect>;

impl Node {
    fn split(direction: Direction, constraints: &[Constraint], area: Rect) -> std::rc::Rc<[Rect]> {
        Layout::default()
            .direction(direction)
            .constraints(constraints.to_vec())
            .split(area)
    }

    /// Draw the node into the given area.
    pub fn draw(&self, f: &mut Frame<'_>, area: Rect) {
        match self {
            Node::Group {
                direction,
                constraints,
                children,
            } => {
                let chunks = Self::split(*direction, constraints, area);
                for (child, chunk) in children.iter().zip(chunks.iter()) {
                    child.draw(f, *chunk);
                }
            }
            Node::Leaf { panel, .. } => {
                panel.draw(f, area);
            }
        }
    }

    /// Lay the tree out over `area` without drawing and collect the named
    /// leaves.
    pub fn hit_map(&self, area: Rect) -> HitMap {
        let mut map = HitMap::new();
        self.collect(area, &mut map);
        map
    }

    fn collect(&self, area: Rect, map: &mut HitMap) {
        match self {
            Node::Group {
                direction,
                constraints,
                children,
            } => {
                let chunks = Self::split(*direction, constraints, area);
                for (child, chunk) in children.iter().zip(chunks.iter()) {
                    child.collect(*chunk, map);
                }
            }
            Node::Leaf {
                name: Some(name), ..
            } => {
                map.insert(*name, area);
            }
            Node::Leaf { name: None, .. } => {}
        }
    }
}

/// Helper: create a group node.
pub fn group(direction: Direction, constraints: Vec<Constraint>, children: Vec<Node>) -> Node {
    Node::Group {
        direction,
        constraints,
        children,
    }
}

/// Helper: create a leaf node.
pub fn leaf(panel: Box<dyn Panel>) -> Node {
    Node::Leaf { name: None, panel }
}

/// Helper: create a leaf whose area is reported by [`Node::hit_map`].
pub fn named(name: &'static str, panel: Box<dyn Panel>) -> Node {
    Node::Leaf {
        name: Some(name),
        panel,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Blank;

    impl Panel for Blank {
        fn draw(&self, _f: &mut Frame<'_>, _area: Rect) {}
    }

    #[test]
    fn hit_map_reports_named_leaves() {
        let root = group(
            Direction::Vertical,
            vec![Constraint::Length(3), Constraint::Min(0)],
            vec![
                leaf(Box::new(Blank)),
                group(
                    Direction::Horizontal,
                    vec![Constraint::Percentage(75), Constraint::Percentage(25)],
                    vec![named("graph", Box::new(Blank)), named("side", Box::new(Blank))],
                ),
            ],
        );
        let map = root.hit_map(Rect::new(0, 0, 100, 23));
        assert_eq!(map.len(), 2);
        assert_eq!(map["graph"], Rect::new(0, 3, 75, 20));
        assert_eq!(map["side"], Rect::new(75, 3, 25, 20));
    }
}
