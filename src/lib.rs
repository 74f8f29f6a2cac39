pub mod api;
pub mod config;
pub mod editor;
pub mod error;
pub mod maa;
pub mod reconcile;
pub mod rounds;
pub mod schema;
pub mod siming;

pub use error::{CopilotError, Issue, Result};
