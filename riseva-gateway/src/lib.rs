pub mod prompt;
pub mod providers;
pub mod server;
pub mod state;

pub use prompt::{MATERIAL_CHAR_BUDGET, compile_system_prompt};
pub use providers::{OpenAiClient, ProviderError};
pub use server::{HISTORY_WINDOW, bound_history, create_router, relay_events};
pub use state::AppState;
