//! LayoutStateMachine: which device layout (orientation) is active.
//!
//! One state per layout of the skin; `next` and `prev` wrap around the list.
//! The machine only tracks the index.  Re-applying a layout (window reset,
//! D-pad rotation, trackball, brightness, framebuffer invalidate) is done by
//! the dispatcher, which owns the collaborators.

use skin_core::{LayoutList, Rotation, SkinLayout};
use tracing::debug;

/// Direction of a layout change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LayoutStep {
    Next,
    Prev,
}

#[derive(Debug, Clone)]
pub struct LayoutStateMachine {
    layouts: LayoutList,
    current: usize,
}

impl LayoutStateMachine {
    /// Starts at the layout named `initial`, or at the first one if the name
    /// is absent or unknown.
    pub fn new(layouts: LayoutList, initial: Option<&str>) -> Self {
        let current = layouts.select(initial);
        if let Some(name) = initial {
            if layouts.get(current).name != name {
                debug!(requested = name, "unknown initial orientation, using first layout");
            }
        }
        Self { layouts, current }
    }

    pub fn current(&self) -> &SkinLayout {
        self.layouts.get(self.current)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn layouts(&self) -> &LayoutList {
        &self.layouts
    }

    /// Rotation applied to arrow keys and trackball motion in the current layout.
    pub fn dpad_rotation(&self) -> Rotation {
        self.current().dpad_rotation
    }

    /// Moves one step and returns the new current layout.
    pub fn step(&mut self, step: LayoutStep) -> &SkinLayout {
        self.current = match step {
            LayoutStep::Next => self.layouts.next_index(self.current),
            LayoutStep::Prev => self.layouts.prev_index(self.current),
        };
        let layout = self.layouts.get(self.current);
        debug!(layout = %layout.name, ?step, "applying new layout");
        layout
    }

    pub fn next(&mut self) -> &SkinLayout {
        self.step(LayoutStep::Next)
    }

    pub fn prev(&mut self) -> &SkinLayout {
        self.step(LayoutStep::Prev)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skin_core::DisplayRect;

    fn layout(name: &str, turns: i32) -> SkinLayout {
        SkinLayout {
            name: name.to_string(),
            rotation: Rotation::from_quarter_turns(turns),
            dpad_rotation: Rotation::from_quarter_turns(turns),
            width: 320,
            height: 480,
            display: DisplayRect {
                x: 0,
                y: 0,
                width: 320,
                height: 480,
                rotation: Rotation::Deg0,
            },
        }
    }

    fn three() -> LayoutList {
        LayoutList::new(vec![layout("portrait", 0), layout("landscape", 1), layout("reverse", 2)])
            .unwrap()
    }

    #[test]
    fn test_initial_layout_selected_by_name() {
        let machine = LayoutStateMachine::new(three(), Some("landscape"));
        assert_eq!(machine.current().name, "landscape");
        assert_eq!(machine.dpad_rotation(), Rotation::Deg90);
    }

    #[test]
    fn test_unknown_initial_name_falls_back_to_first() {
        let machine = LayoutStateMachine::new(three(), Some("sideways"));
        assert_eq!(machine.current_index(), 0);
    }

    #[test]
    fn test_next_from_last_wraps_to_first() {
        // Arrange
        let mut machine = LayoutStateMachine::new(three(), Some("reverse"));

        // Act
        let name = machine.next().name.clone();

        // Assert
        assert_eq!(name, "portrait");
    }

    #[test]
    fn test_prev_from_first_wraps_to_last() {
        // Arrange
        let mut machine = LayoutStateMachine::new(three(), None);

        // Act
        let name = machine.prev().name.clone();

        // Assert
        assert_eq!(name, "reverse");
        assert_eq!(machine.dpad_rotation(), Rotation::Deg180);
    }

    #[test]
    fn test_next_then_prev_returns_to_start() {
        let mut machine = LayoutStateMachine::new(three(), Some("landscape"));
        machine.next();
        machine.prev();
        assert_eq!(machine.current().name, "landscape");
    }

    #[test]
    fn test_single_layout_cycles_to_itself() {
        let list = LayoutList::new(vec![layout("only", 0)]).unwrap();
        let mut machine = LayoutStateMachine::new(list, None);
        assert_eq!(machine.next().name, "only");
        assert_eq!(machine.prev().name, "only");
    }
}
