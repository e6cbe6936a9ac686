//! src/app.rs
//!
//! Interactive reveal graph.
//!
//! # Top-Level Application (`app.rs`)
//!
//! Builds the graph engine from the dataset, registers it with the frame
//! scheduler, starts the remote control thread, and runs the UI main loop.
//!
//! ## Overview
//! The application:
//! - Shows the first part of a dataset and hides the rest behind a shaded
//!   overlay.
//! - Lets the user sketch their guess for the hidden part with the mouse.
//! - Reveals the real series on request and animates it in.
//! - Spawns a TCP control server that accepts line-based ASCII commands.
//!
//! # Keyboard and Mouse
//!
//! - **Left click / drag** in the shaded area: add a point (snapped to the
//!   grid; one point per grid column).
//! - **Mouse move**: show the values under the pointer.
//! - **v**: reveal the hidden part.
//! - **r**: clear your points and replay the intro.
//! - **p**: pause or resume the animation.
//! - **q** / **Esc**: quit and restore terminal state.
//!
//! # Remote TCP Protocol (ASCII, Line-Based)
//!
//! **Default bind address:** `127.0.0.1:4000` (`--remote`, `--no-remote`).
//! One reply line per command (`OK ...` or `ERR <msg>`).
//!
//! - `reset`, `reveal`, `pause`, `resume`
//! - `add <x> <y>`: add a point in data space. Replies `OK <column>`, or
//!   `ERR visible_region`, `ERR out_of_bounds`, `ERR revealed`.
//! - `status`: phase and reveal limits.
//! - `quit`: replies `OK bye` and closes the connection.
//!
//! ```text
//! $ nc 127.0.0.1 4000
//! reveal
//! OK
//! pause
//! OK
//! ```
//!
//! Client threads only queue commands; this loop applies them between
//! frames so the engine has a single writer.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Receiver};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use color_eyre::eyre::{Result, WrapErr};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use ratatui::layout::{Constraint, Direction, Rect};
use ratatui::style::{Color, Style};

use crate::Args;
use crate::graph::demo::random_dataset;
use crate::graph::explanation::Explanation;
use crate::graph::scheduler::FrameClock;
use crate::graph::shared::{GraphShared, SharedGraph};
use crate::graph::{
    DisplayList, FrameScheduler, Graph, GraphConfig, ScaleMode, Surface, SurfaceSize, TextMetrics, Theme,
};
use crate::net::{Request, remote_server};
use crate::panels::graph::{cell_size, cell_to_surface};
use crate::panels::{GraphPanel, InfoPanel, ParagraphPanel, PointsPanel, TitlePanel};
use crate::ui::{HitMap, Node, Panel, group, leaf, named};

const GRAPH_AREA: &str = "graph";

/// Dataset text from `--data`, `--data-file`, or a random demo series.
fn load_dataset(data: Option<&str>, file: Option<&Path>) -> Result<String> {
    if let Some(raw) = data {
        return Ok(raw.to_string());
    }
    if let Some(path) = file {
        let raw = fs::read_to_string(path)
            .wrap_err_with(|| format!("cannot read dataset {}", path.display()))?;
        tracing::info!(path = %path.display(), "dataset loaded");
        return Ok(raw.trim().to_string());
    }
    tracing::info!("no dataset given, using a random demo series");
    Ok(random_dataset())
}

fn graph_config(args: &Args) -> GraphConfig {
    let hide_after = (!args.no_hide).then_some(args.hide_after);
    let theme = if args.light {
        Theme::light()
    } else {
        Theme::dark()
    };
    let mode = if args.uniform {
        ScaleMode::Uniform
    } else {
        ScaleMode::Stretch
    };
    GraphConfig::new(args.v_base, args.h_base, args.spacing, hide_after)
        .with_theme(theme)
        .with_scale_mode(mode)
        .with_legend(&args.legend)
}

/// Terminal-side state: the shared graph, its scheduler, and the remote
/// command queue.
struct App {
    shared: SharedGraph,
    scheduler: FrameScheduler<SharedGraph, DisplayList>,
    queue: Receiver<Request>,
    /// Areas of the named panels from the last drawn frame.
    hit: HitMap,
    running: bool,
}

impl App {
    fn new(graph: Graph, queue: Receiver<Request>) -> Self {
        let size = graph.size();
        let shared: SharedGraph = Arc::new(RwLock::new(GraphShared::new(graph, "Reveal graph")));

        let mut scheduler = FrameScheduler::new();
        scheduler.attach(DisplayList::new(size));
        scheduler.add(
            shared.clone(),
            Box::new(|shared: &mut SharedGraph, clock: &FrameClock, surface: &mut dyn Surface| {
                match shared.write() {
                    Ok(mut g) => g.graph.draw(surface, clock.elapsed()),
                    Err(_) => tracing::error!("graph lock poisoned, skipping frame"),
                }
            }),
        );

        Self {
            shared,
            scheduler,
            queue,
            hit: HitMap::new(),
            running: true,
        }
    }

    fn surface_size(&self) -> Option<SurfaceSize> {
        self.scheduler.surface().map(|s| s.size())
    }

    /// Cells of the canvas inside the graph panel, from the last layout.
    fn canvas(&self) -> Option<Rect> {
        self.hit.get(GRAPH_AREA).map(|a| GraphPanel::canvas_area(*a))
    }

    /// Label widths follow the terminal cell width so clamping is exact.
    fn sync_metrics(&mut self) {
        let (Some(canvas), Some(size)) = (self.canvas(), self.surface_size()) else {
            return;
        };
        let (cell_width, _) = cell_size(size, canvas);
        if let Some(surface) = self.scheduler.surface_mut() {
            surface.set_metrics(TextMetrics::Monospace(cell_width));
        }
    }

    /// Apply queued remote commands in arrival order.
    fn drain_remote(&mut self) {
        while let Ok(req) = self.queue.try_recv() {
            let reply = match self.shared.write() {
                Ok(mut g) => req.command.apply(&mut g.graph, &mut self.scheduler),
                Err(_) => "ERR unavailable".to_string(),
            };
            let _ = req.reply.send(reply);
        }
    }

    fn toggle_pause(&mut self) {
        if self.scheduler.is_paused() {
            self.scheduler.resume();
        } else {
            self.scheduler.pause();
        }
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('p') => self.toggle_pause(),
            KeyCode::Char('r') => {
                if let Ok(mut g) = self.shared.write() {
                    g.graph.reset_graph();
                }
            }
            KeyCode::Char('v') => {
                if let Ok(mut g) = self.shared.write() {
                    g.graph.reveal_graph();
                }
            }
            _ => {}
        }
    }

    fn handle_mouse(&mut self, ev: MouseEvent) {
        let point = match (self.canvas(), self.surface_size()) {
            (Some(canvas), Some(size)) => cell_to_surface(canvas, size, ev.column, ev.row),
            _ => None,
        };
        let Ok(mut g) = self.shared.write() else {
            return;
        };

        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) => g.view.pointer_down = true,
            MouseEventKind::Up(MouseButton::Left) => g.view.pointer_down = false,
            _ => {}
        }

        let Some(p) = point else {
            if g.view.hovering {
                g.view.hovering = false;
                g.graph.leave();
            }
            return;
        };

        g.view.hovering = true;
        match ev.kind {
            MouseEventKind::Down(MouseButton::Left) | MouseEventKind::Drag(MouseButton::Left) => {
                if let Some(key) = g.graph.press(p) {
                    tracing::debug!(key, "point added from pointer");
                }
                g.graph.hover(p);
            }
            MouseEventKind::Moved => g.graph.hover(p),
            _ => {}
        }
    }

    fn handle_event(&mut self, ev: Event) {
        match ev {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            _ => {}
        }
    }

    /// Build this frame's panel tree. `width` is the terminal width, used to
    /// size the explanation row.
    fn layout(&self, width: u16) -> Node {
        let frame = self
            .scheduler
            .surface()
            .cloned()
            .unwrap_or_else(|| DisplayList::new(SurfaceSize::new(1.0, 1.0)));
        let (phase, explanation, explanation_height) = match self.shared.read() {
            Ok(g) => {
                let e = g.graph.explanation();
                let rows = e.height(width.saturating_sub(2));
                let height = if rows > 0 { rows + 2 } else { 0 };
                (g.graph.phase(), ParagraphPanel::explanation(e), height)
            }
            Err(_) => (crate::graph::RevealPhase::Hidden, ParagraphPanel::new("", ""), 0),
        };
        let paused = self.scheduler.is_paused();

        let side = group(
            Direction::Vertical,
            vec![Constraint::Min(0), Constraint::Length(6)],
            vec![
                leaf(Box::new(PointsPanel::new(self.shared.clone())) as Box<dyn Panel>),
                leaf(Box::new(InfoPanel::new(self.shared.clone(), paused)) as Box<dyn Panel>),
            ],
        );
        let body = group(
            Direction::Horizontal,
            vec![Constraint::Percentage(75), Constraint::Percentage(25)],
            vec![
                named(
                    GRAPH_AREA,
                    Box::new(GraphPanel::new(self.shared.clone(), frame)) as Box<dyn Panel>,
                ),
                side,
            ],
        );

        group(
            Direction::Vertical,
            vec![
                Constraint::Length(3),
                Constraint::Min(0),
                Constraint::Length(explanation_height),
                Constraint::Length(3),
            ],
            vec![
                leaf(Box::new(TitlePanel::new("Draw your guess", phase)) as Box<dyn Panel>),
                body,
                leaf(Box::new(explanation) as Box<dyn Panel>),
                leaf(Box::new(
                    ParagraphPanel::new(
                        "Click/drag=Add point  V=Reveal  R=Reset  P=Pause  Q=Quit",
                        "Controls",
                    )
                    .style(Style::default().fg(Color::Gray)),
                ) as Box<dyn Panel>),
            ],
        )
    }
}

pub fn run(args: Args) -> Result<()> {
    let raw = load_dataset(args.data.as_deref(), args.data_file.as_deref())?;
    let size = SurfaceSize::new(args.width, args.height);
    let mut graph = Graph::new(size, graph_config(&args), &raw).wrap_err("cannot build graph from dataset")?;
    if let Some(text) = &args.explanation {
        graph = graph.with_explanation(Explanation::new(text.as_str()));
    }

    let (tx, rx) = mpsc::channel::<Request>();
    let mut app = App::new(graph, rx);

    // Remote control thread
    if !args.no_remote {
        let addr = args.remote.clone();
        thread::spawn(move || {
            if let Err(e) = remote_server(&addr, tx) {
                tracing::error!(%addr, error = %e, "remote control unavailable");
            }
        });
    }

    // UI setup
    let mut terminal = ratatui::init();
    crossterm::execute!(io::stdout(), EnableMouseCapture)?;
    let frame_time = Duration::from_millis(args.frame_ms.max(1));

    let res = (|| -> Result<()> {
        while app.running {
            let frame_start = Instant::now();

            app.drain_remote();
            app.sync_metrics();
            app.scheduler.tick(frame_start);

            let size = terminal.size()?;
            let area = Rect::new(0, 0, size.width, size.height);
            let root = app.layout(size.width);
            app.hit = root.hit_map(area);
            terminal.draw(|f| root.draw(f, f.area()))?;

            while event::poll(Duration::from_millis(0))? {
                app.handle_event(event::read()?);
            }

            let elapsed = frame_start.elapsed();
            if elapsed < frame_time {
                thread::sleep(frame_time - elapsed);
            }
        }
        Ok(())
    })();

    let _ = crossterm::execute!(io::stdout(), DisableMouseCapture);
    ratatui::restore();
    res
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::time::Duration;

    use clap::Parser;
    use crossterm::event::KeyModifiers;

    use super::*;
    use crate::net::Command;

    fn app() -> (App, mpsc::Sender<Request>) {
        let graph = Graph::new(
            SurfaceSize::new(1000.0, 500.0),
            GraphConfig::new(100.0, 45.0, 10.0, Some(15.0)),
            "0,0,10,50,20,10",
        )
        .expect("graph");
        let (tx, rx) = mpsc::channel();
        (App::new(graph, rx), tx)
    }

    fn key(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::NONE)
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> MouseEvent {
        MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        }
    }

    #[test]
    fn dataset_sources_in_priority_order() {
        let mut file = tempfile::NamedTempFile::new().expect("tempfile");
        writeln!(file, "1990,4,2000,8").expect("write");

        assert_eq!(
            load_dataset(Some("0,0,1,1"), Some(file.path())).expect("inline"),
            "0,0,1,1"
        );
        assert_eq!(
            load_dataset(None, Some(file.path())).expect("file"),
            "1990,4,2000,8"
        );
        assert!(load_dataset(None, Some(Path::new("/definitely/missing.csv"))).is_err());
        assert!(!load_dataset(None, None).expect("demo").is_empty());
    }

    #[test]
    fn args_map_onto_graph_config() {
        let args = Args::try_parse_from(["reveal-graph", "--no-hide", "--uniform", "--legend", "Rate"])
            .expect("args");
        let config = graph_config(&args);
        assert_eq!(config.hide_after, None);
        assert_eq!(config.scale_mode, ScaleMode::Uniform);
        assert_eq!(config.y_legend, "Rate");

        let args = Args::try_parse_from(["reveal-graph", "--hide-after", "-3.5"]).expect("args");
        assert_eq!(graph_config(&args).hide_after, Some(-3.5));
    }

    #[test]
    fn keys_drive_the_engine_and_scheduler() {
        let (mut app, _tx) = app();
        app.handle_key(key('v'));
        assert_eq!(app.shared.read().expect("lock").graph.hide_after(), None);

        app.handle_key(key('p'));
        assert!(app.scheduler.is_paused());
        app.handle_key(key('p'));
        assert!(!app.scheduler.is_paused());

        app.handle_key(key('r'));
        assert!(app.shared.read().expect("lock").graph.hide_after().is_some());

        app.handle_key(key('q'));
        assert!(!app.running);
    }

    #[test]
    fn remote_commands_are_applied_between_frames() {
        let (mut app, tx) = app();
        let (reply_tx, reply_rx) = mpsc::channel();
        tx.send(Request {
            command: Command::Add { x: 19.0, y: 10.0 },
            reply: reply_tx.clone(),
        })
        .expect("send");
        tx.send(Request {
            command: Command::Pause,
            reply: reply_tx,
        })
        .expect("send");

        app.drain_remote();
        assert_eq!(reply_rx.recv_timeout(Duration::from_secs(1)).as_deref(), Ok("OK 810"));
        assert_eq!(reply_rx.recv_timeout(Duration::from_secs(1)).as_deref(), Ok("OK"));
        assert!(app.scheduler.is_paused());
    }

    #[test]
    fn mouse_on_canvas_adds_and_hovers() {
        let (mut app, _tx) = app();
        // 100 x 25 canvas cells once the border is removed
        app.hit.insert(GRAPH_AREA, Rect::new(0, 0, 102, 27));

        // column 91 -> x = 905, row 11 -> y = 210: graph (805, 245)
        app.handle_mouse(mouse(MouseEventKind::Down(MouseButton::Left), 91, 11));
        {
            let g = app.shared.read().expect("lock");
            assert!(g.view.pointer_down);
            assert_eq!(g.graph.user_series().get(810), Some(245.0));
        }

        // left of the threshold: hover only
        app.handle_mouse(mouse(MouseEventKind::Moved, 41, 11));
        assert_eq!(app.shared.read().expect("lock").graph.user_series().len(), 1);

        app.handle_mouse(mouse(MouseEventKind::Moved, 0, 0));
        let g = app.shared.read().expect("lock");
        assert!(!g.view.hovering);
        assert_eq!(g.graph.active_point(), None);
    }

    #[test]
    fn frames_are_recorded_by_the_scheduler() {
        let (mut app, _tx) = app();
        app.scheduler.tick(Instant::now());
        assert!(!app.scheduler.surface().expect("surface").is_empty());
        let root = app.layout(120);
        let hit = root.hit_map(Rect::new(0, 0, 120, 40));
        assert!(hit.contains_key(GRAPH_AREA));
    }
}
