// SPDX-License-Identifier: GPL-3.0-only

//! Application state and message handling
//!
//! # Architecture
//!
//! - `state`: UI state types (AppModel, Message, UiState, ViewState)
//! - `update`: Message handling, the only code that changes the state
//! - `runtime`: Message loop that runs capture tasks and notifies subscribers
//!
//! Renderers (see [`crate::terminal`]) only read [`ViewState`] snapshots and
//! send [`Message`]s.

mod runtime;
mod state;
mod update;

pub use runtime::AppRuntime;
pub use state::{AppModel, Message, Task, UiState, ViewState};
