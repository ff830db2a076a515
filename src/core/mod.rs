//! # Core Application Logic
//!
//! This module contains the editor's business logic.
//! It knows nothing about any specific UI technology.
//!
//! ```text
//!                    ┌─────────────────────────┐
//!                    │         CORE            │
//!                    │  (this module)          │
//!                    │                         │
//!                    │  • EditorState          │
//!                    │  • Action (events)      │
//!                    │  • update() (reducer)   │
//!                    │                         │
//!                    │  No I/O. No UI. Pure.   │
//!                    └───────────┬─────────────┘
//!                                │ Effect::SpawnCompletion
//!                    ┌───────────┴─────────────┐
//!                    ▼                         ▼
//!             ┌────────────┐            ┌────────────┐
//!             │    TUI     │            │ inference  │
//!             │  Adapter   │ ─────────► │ (reqwest)  │
//!             │ (ratatui)  │            │            │
//!             └────────────┘            └────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`state`]: The `EditorState` struct, all application state in one place
//! - [`action`]: The `Action` enum and the `update()` reducer
//! - [`conversation`]: Conversations, parts, and normalization
//! - [`history`]: Undo/redo snapshots
//! - [`config`]: Config file and override resolution

pub mod action;
pub mod config;
pub mod conversation;
pub mod history;
pub mod state;
