use std::collections::HashSet;

pub use winit::keyboard::KeyCode;

/// Keyboard state as seen by the host between two polls.
///
/// The host feeds it the key events coming from `winit`; `just_pressed`
/// answers "did this key go down since the previous poll", which is the
/// edge the frame loop exits on.
#[derive(Debug, Default)]
pub struct InputState {
    keys_down: HashSet<KeyCode>,
    just_pressed: HashSet<KeyCode>,
}

impl InputState {
    pub fn new() -> Self {
        Default::default()
    }

    /// Called by the event handler when a keyboard event arrives.  OS key
    /// repeats of a held key do not count as new presses.
    pub fn update_key(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            if self.keys_down.insert(key) {
                self.just_pressed.insert(key);
            }
        } else {
            self.keys_down.remove(&key);
        }
    }

    pub fn is_key_pressed(&self, key: KeyCode) -> bool {
        self.keys_down.contains(&key)
    }

    pub fn just_pressed(&self, key: KeyCode) -> bool {
        self.just_pressed.contains(&key)
    }

    /// Forgets this poll's edges.  Call before processing the next batch of
    /// events.
    pub fn begin_poll(&mut self) {
        self.just_pressed.clear();
    }

    /// Drops all held keys, e.g. when the window loses focus and release
    /// events will not arrive.
    pub fn clear(&mut self) {
        self.keys_down.clear();
        self.just_pressed.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_tracking() {
        let mut state = InputState::new();
        assert!(!state.is_key_pressed(KeyCode::Escape));
        state.update_key(KeyCode::Escape, true);
        assert!(state.is_key_pressed(KeyCode::Escape));
        state.update_key(KeyCode::Escape, false);
        assert!(!state.is_key_pressed(KeyCode::Escape));
    }

    #[test]
    fn press_is_an_edge_for_one_poll() {
        let mut state = InputState::new();
        state.update_key(KeyCode::Escape, true);
        assert!(state.just_pressed(KeyCode::Escape));

        state.begin_poll();
        // still held, repeat events do not re-trigger
        state.update_key(KeyCode::Escape, true);
        assert!(!state.just_pressed(KeyCode::Escape));
        assert!(state.is_key_pressed(KeyCode::Escape));

        state.begin_poll();
        state.update_key(KeyCode::Escape, false);
        state.update_key(KeyCode::Escape, true);
        assert!(state.just_pressed(KeyCode::Escape));
    }

    #[test]
    fn press_and_release_within_one_poll_still_counts() {
        let mut state = InputState::new();
        state.update_key(KeyCode::Escape, true);
        state.update_key(KeyCode::Escape, false);
        assert!(state.just_pressed(KeyCode::Escape));
        assert!(!state.is_key_pressed(KeyCode::Escape));
    }
}
