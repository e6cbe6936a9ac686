//! src/net.rs
//!
//! Remote control: command grammar and the TCP server feeding the
//! terminal thread.

pub mod command;
pub mod remote;

pub use command::Command;
pub use remote::{Request, remote_server};
