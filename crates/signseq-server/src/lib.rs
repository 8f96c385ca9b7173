pub mod handlers;

pub use handlers::{AppState, Sequencer, router};
