//! The HTTP side: per-connection receive state, the URL registry, and
//! the accept loop (§3, §4.7–§4.10).

mod config;
mod connection;
mod html;
mod listener;
mod registry;

pub use self::config::Config;
pub use self::html::{DefaultStatusPage, StatusPage};
pub use self::listener::ListenServer;
pub use self::registry::{OnClientJoined, OnReceive};
