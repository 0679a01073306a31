//! Interactive flight dashboard
//!
//! Terminal user interface using Ratatui.

mod app;
mod backend;
mod board;
mod help;
mod log_pane;
mod search;
mod sidebar;
mod ui;

pub use app::run;
pub use log_pane::LogBuffer;
