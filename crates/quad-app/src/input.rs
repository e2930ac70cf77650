// ---------------------------------------------------------------------------
// Key — windowing-library-independent key representation
// ---------------------------------------------------------------------------

/// A keyboard key, independent of any windowing library.
///
/// `main.rs` maps `winit::keyboard::PhysicalKey` → `Key`; everything else
/// in the input pipeline works purely with this enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    F,
    Space,
    Q,
    Escape,
}

// ---------------------------------------------------------------------------
// InputAction — what the app does in response to input
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    /// Switch between stretching and letterboxing the image.
    ToggleFit,
    /// Switch between the image and the `uv` debug view.
    ToggleView,
    Quit,
}

// ---------------------------------------------------------------------------
// InputState
// ---------------------------------------------------------------------------

pub struct InputState {
    has_image: bool,
}

impl InputState {
    pub fn new(has_image: bool) -> Self {
        Self { has_image }
    }

    /// Translate a `Key` press into an `InputAction`, if the key is mapped.
    /// Image-only actions are dropped when no image is loaded.
    pub fn on_key(&self, key: Key) -> Option<InputAction> {
        match key {
            Key::F if self.has_image => Some(InputAction::ToggleFit),
            Key::Space if self.has_image => Some(InputAction::ToggleView),
            Key::F | Key::Space => None,
            Key::Q | Key::Escape => Some(InputAction::Quit),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn q_and_escape_quit() {
        for has_image in [false, true] {
            let input = InputState::new(has_image);
            assert_eq!(input.on_key(Key::Q), Some(InputAction::Quit));
            assert_eq!(input.on_key(Key::Escape), Some(InputAction::Quit));
        }
    }

    #[test]
    fn f_toggles_fit_with_image() {
        assert_eq!(InputState::new(true).on_key(Key::F), Some(InputAction::ToggleFit));
    }

    #[test]
    fn space_toggles_view_with_image() {
        assert_eq!(InputState::new(true).on_key(Key::Space), Some(InputAction::ToggleView));
    }

    #[test]
    fn image_keys_ignored_without_image() {
        let input = InputState::new(false);
        assert_eq!(input.on_key(Key::F), None);
        assert_eq!(input.on_key(Key::Space), None);
    }
}
