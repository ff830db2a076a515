//! # TUI Components
//!
//! Every piece of the terminal interface.
//!
//! ## Two kinds of component
//!
//! ### Stateless (props only)
//!
//! Built each frame from the data they display:
//! - `TitleBar`: model, provider, status, undo/redo availability
//! - `ConversationCard`: one conversation's header, transcript tail, and status
//!
//! ### Stateful (persistent state + transient wrapper)
//!
//! The state struct lives in `TuiState` and implements `EventHandler`. A thin
//! wrapper borrows it for the frame and implements `Component`:
//! - `ConversationListState` / `ConversationList`
//! - `ApiKeyDialogState` / `ApiKeyDialog`
//! - `ParametersDialogState` / `ParametersDialog`
//!
//! `TextEditor` is both at once: it owns its buffer and cursor and renders itself.
//!
//! ## Props-based data flow
//!
//! Components never reach into `EditorState` on their own. The caller copies
//! or borrows what a component needs into its fields:
//!
//! ```rust,ignore
//! // Good: dependencies are explicit
//! let mut bar = TitleBar { model_name: state.parameters().model.clone(), .. };
//!
//! // Bad: hidden dependency on global state
//! title_bar.render(frame, area); // reads EditorState itself
//! ```
//!
//! ## Module Structure
//!
//! ```text
//! components/
//! ├── mod.rs                (this file)
//! ├── title_bar.rs          (top status line)
//! ├── conversation_card.rs  (single conversation)
//! ├── conversation_list.rs  (scrollable card column)
//! ├── api_key_dialog.rs     (masked key overlay)
//! ├── parameters_dialog.rs  (sampling parameter overlay)
//! └── text_editor/          (multi-line text field)
//! ```

use ratatui::layout::{Constraint, Layout, Rect};

pub mod api_key_dialog;
pub mod conversation_card;
pub mod conversation_list;
pub mod parameters_dialog;
pub mod text_editor;
mod title_bar;

pub use api_key_dialog::{ApiKeyDialog, ApiKeyDialogEvent, ApiKeyDialogState};
pub use conversation_card::ConversationCard;
pub use conversation_list::{ConversationList, ConversationListState};
pub use parameters_dialog::{ParametersDialog, ParametersDialogEvent, ParametersDialogState};
pub use text_editor::{TextEditor, TextEditorEvent};
pub use title_bar::TitleBar;

/// A rectangle centered in `outer`, sized as a percentage of it.
pub(crate) fn centered_rect(percent_x: u16, percent_y: u16, outer: Rect) -> Rect {
    let [_, center_v, _] = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .areas(outer);
    let [_, center, _] = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .areas(center_v);
    center
}
