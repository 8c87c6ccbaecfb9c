pub mod animation;
pub mod app;
pub mod clock;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod session;
pub mod tracker;
pub mod ui;
pub mod state;

pub use app::router;
pub use config::{resolve_bind_addr, resolve_port, resolve_session_capacity};
pub use session::Sessions;
pub use state::AppState;
