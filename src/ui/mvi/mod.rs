//! Model-View-Intent primitives for the list screens.
//!
//! ```text
//! Intent ──→ Reducer ──→ State ──→ View
//!    ↑                              │
//!    └──────── effects (HTTP) ──────┘
//! ```
//!
//! Reducers are pure. Anything asynchronous happens in a presenter, which
//! turns the outcome back into an intent.

mod intent;
mod reducer;
mod state;

pub use intent::Intent;
pub use reducer::Reducer;
pub use state::UiState;
