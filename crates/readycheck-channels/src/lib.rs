/// Reaction-driven confirmation for the readycheck framework.
///
/// - **Confirmation**: the ready check wait-loop (accept / cancel / timeout)
/// - **Manager**: reaction hub that routes platform reactions to ready checks
///   and affordance requests back to the platform
pub mod confirmation;
pub mod manager;

pub use confirmation::{run_validation, ReadyCheck};
pub use manager::{ReactionHub, ReactionListener};
