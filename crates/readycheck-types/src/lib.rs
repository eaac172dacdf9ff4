/// Shared types, traits, and errors for ready checks.
///
/// This crate is the foundation the other readycheck crates depend on.
/// It contains:
/// - **Trait contracts** (`traits`) between the wait-loop and the chat platform
/// - **Shared data types** (`reactions`): ids, reaction events, outcomes
/// - **Error types** (`errors`) for unified error handling
/// - **Config types** (`config`) and the directory loader (`config_loader`)
pub mod config;
pub mod config_loader;
pub mod errors;
pub mod reactions;
pub mod traits;

// Re-export commonly used types at the crate root for convenience.
pub use config::{ReadyCheckConfig, TimeoutMode, ValidationConfig};
pub use errors::ReadyCheckError;
pub use reactions::*;
pub use traits::*;
