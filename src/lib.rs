pub mod api;
pub mod config;
pub mod error;
pub mod graph;
pub mod ids;
pub mod layout;
pub mod loader;
pub mod prompt;
pub mod session;

pub use error::{EditorError, EditorResult};
