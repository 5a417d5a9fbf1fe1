//! Client-side synchronization core for the agent workbench.
//!
//! The crate keeps a local view of remote state (chat transcript, workspace
//! file tree, persisted user settings) consistent with a backend that pushes
//! events at any time. Presentation layers read [`state::AppState`] and issue
//! operations through [`session::Session`].

pub mod config;
pub mod error;
pub mod logging;
pub mod model;
pub mod remote;
pub mod session;
pub mod settings;
pub mod state;
pub mod store;
pub mod transport;
pub mod workspace;

pub use self::error::{ClientError, ClientResult};
