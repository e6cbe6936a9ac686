//! src/net/command.rs
//!
//! Remote command grammar and how each command is applied to the engine.

use std::str::FromStr;

use thiserror::Error;

use crate::graph::engine::Graph;
use crate::graph::scheduler::FrameScheduler;
use crate::graph::surface::Surface;

/// One line of the remote protocol.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Command {
    Reset,
    Reveal,
    /// Add a user point given in data space.
    Add {
        x: f64,
        y: f64,
    },
    Pause,
    Resume,
    Status,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum CommandError {
    #[error("empty")]
    Empty,
    #[error("unknown {0}")]
    Unknown(String),
    #[error("usage: {0}")]
    Usage(&'static str),
    #[error("number {0}")]
    Number(String),
}

fn number(token: &str) -> Result<f64, CommandError> {
    token
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| CommandError::Number(token.to_string()))
}

impl FromStr for Command {
    type Err = CommandError;

    /// Whitespace-split, case-insensitive command words.
    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        let Some(head) = parts.first() else {
            return Err(CommandError::Empty);
        };
        let args = &parts[1..];

        let simple = |cmd: Command, usage: &'static str| {
            if args.is_empty() {
                Ok(cmd)
            } else {
                Err(CommandError::Usage(usage))
            }
        };

        match head.to_lowercase().as_str() {
            "reset" => simple(Command::Reset, "reset"),
            "reveal" => simple(Command::Reveal, "reveal"),
            "pause" => simple(Command::Pause, "pause"),
            "resume" => simple(Command::Resume, "resume"),
            "status" => simple(Command::Status, "status"),
            "quit" => simple(Command::Quit, "quit"),
            "add" => match args {
                [x, y] => Ok(Command::Add {
                    x: number(x)?,
                    y: number(y)?,
                }),
                _ => Err(CommandError::Usage("add <x> <y>")),
            },
            _ => Err(CommandError::Unknown(parts.join(" "))),
        }
    }
}

impl Command {
    /// Apply the command on the terminal thread and build the reply line
    /// (without the trailing newline).
    pub fn apply<T, S: Surface>(&self, graph: &mut Graph, scheduler: &mut FrameScheduler<T, S>) -> String {
        match *self {
            Command::Reset => {
                graph.reset_graph();
                "OK".to_string()
            }
            Command::Reveal => {
                graph.reveal_graph();
                "OK".to_string()
            }
            Command::Add { x, y } => {
                let Some(threshold) = graph.hide_after() else {
                    return "ERR revealed".to_string();
                };
                match graph.add_data_point(x, y) {
                    Some(key) => format!("OK {key}"),
                    None if graph.transform().data_x_to_column(x) <= threshold => {
                        "ERR visible_region".to_string()
                    }
                    None => "ERR out_of_bounds".to_string(),
                }
            }
            Command::Pause => {
                scheduler.pause();
                "OK".to_string()
            }
            Command::Resume => {
                scheduler.resume();
                "OK".to_string()
            }
            Command::Status => {
                let r = graph.reveal_state();
                format!(
                    "OK phase={} x_limit_initial={:.1} x_limit={:.1} rect_limit={:.1} points={} paused={}",
                    graph.phase().name(),
                    r.x_limit_initial,
                    r.x_limit,
                    r.rect_limit,
                    graph.user_series().len(),
                    scheduler.is_paused()
                )
            }
            Command::Quit => "OK bye".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::config::GraphConfig;
    use crate::graph::display_list::DisplayList;
    use crate::graph::surface::SurfaceSize;

    #[test]
    fn parses_commands_case_insensitively() {
        assert_eq!("RESET".parse::<Command>(), Ok(Command::Reset));
        assert_eq!(" reveal ".parse::<Command>(), Ok(Command::Reveal));
        assert_eq!(
            "add 2010 12.5".parse::<Command>(),
            Ok(Command::Add { x: 2010.0, y: 12.5 })
        );
        assert_eq!("Status".parse::<Command>(), Ok(Command::Status));
    }

    #[test]
    fn rejects_malformed_lines() {
        assert_eq!("".parse::<Command>(), Err(CommandError::Empty));
        assert_eq!(
            "add 1".parse::<Command>(),
            Err(CommandError::Usage("add <x> <y>"))
        );
        assert_eq!(
            "add 1 nan".parse::<Command>(),
            Err(CommandError::Number("nan".into()))
        );
        assert_eq!("pause now".parse::<Command>(), Err(CommandError::Usage("pause")));
        assert_eq!(
            "jump 3".parse::<Command>().map_err(|e| e.to_string()),
            Err("unknown jump 3".to_string())
        );
    }

    #[test]
    fn apply_reports_add_outcomes() {
        let size = SurfaceSize::new(1000.0, 500.0);
        let mut graph = Graph::new(
            size,
            GraphConfig::new(100.0, 45.0, 10.0, Some(15.0)),
            "0,0,10,50,20,10",
        )
        .expect("graph");
        let mut scheduler: FrameScheduler<(), DisplayList> = FrameScheduler::new();

        assert_eq!(Command::Add { x: 19.0, y: 10.0 }.apply(&mut graph, &mut scheduler), "OK 810");
        assert_eq!(
            Command::Add { x: 5.0, y: 10.0 }.apply(&mut graph, &mut scheduler),
            "ERR visible_region"
        );
        assert_eq!(
            Command::Add { x: 19.0, y: 500.0 }.apply(&mut graph, &mut scheduler),
            "ERR out_of_bounds"
        );

        Command::Pause.apply(&mut graph, &mut scheduler);
        let status = Command::Status.apply(&mut graph, &mut scheduler);
        assert!(status.starts_with("OK phase=hidden"), "{status}");
        assert!(status.ends_with("points=1 paused=true"), "{status}");

        Command::Reveal.apply(&mut graph, &mut scheduler);
        assert_eq!(
            Command::Add { x: 19.0, y: 10.0 }.apply(&mut graph, &mut scheduler),
            "ERR revealed"
        );
    }
}
