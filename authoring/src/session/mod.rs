//! The authoring session: form state, the reducer that owns its rules, and
//! the store that runs it.
//!
//! # Architecture
//!
//! ```text
//! host page ── action ──▶ AuthoringForm (Store)
//!                              │ reduce (serialized)
//!                              ▼
//!                        AuthoringReducer ── effects ──▶ AuthProvider / EventApi / ImageStorage
//!                              ▲                                   │
//!                              └────────── completion action ──────┘
//! ```

pub mod access;
pub mod actions;
pub mod environment;
pub mod reducer;
pub mod store;
#[cfg(test)]
mod tests;
pub mod types;

pub use access::{AccessError, AuthoringSession};
pub use actions::AuthoringAction;
pub use environment::AuthoringEnvironment;
pub use reducer::AuthoringReducer;
pub use store::AuthoringForm;
pub use types::{
    AuthoringState, BatchId, BusyFlags, FormMode, GalleryBatch, Notice, NoticeLevel, Route,
    SubmissionFailure, SubmissionPhase,
};
