pub mod api;
pub mod api_doc;
pub mod server;
pub mod state;

pub use server::{build_state, router, run_server, ServerError};
pub use state::AppState;
