use ratatui::Frame;
use ratatui::layout::Rect;

use super::event::TuiEvent;

/// A piece of the screen that draws itself.
///
/// Data the component displays arrives as props (plain struct fields set by
/// the caller before each draw). Presentation-only state such as cursor or
/// scroll positions lives inside the component.
///
/// `render` takes `&mut self` so layout caches and scroll offsets can be
/// updated during the draw, the same way ratatui's `StatefulWidget` works.
pub trait Component {
    fn render(&mut self, frame: &mut Frame, area: Rect);
}

/// A component that consumes terminal events.
pub trait EventHandler {
    /// What the component reports back to its owner.
    type Event;

    /// Handle a low-level `TuiEvent`. `None` means the event was ignored or
    /// produced nothing the owner needs to know about.
    fn handle_event(&mut self, event: &TuiEvent) -> Option<Self::Event>;
}
