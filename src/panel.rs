//! Front panel state read by the display and audio collaborators.

use crate::error::ScpiError;

/// Longest user text the display can show.
pub const TEXT_CAPACITY: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub struct FrontPanel {
    beeper_enabled: bool,
    pending_beeps: u8,
    /// 0.0 (dark) to 1.0 (full).
    brightness: f32,
    text: heapless::String<TEXT_CAPACITY>,
}

impl Default for FrontPanel {
    fn default() -> Self {
        Self {
            beeper_enabled: true,
            pending_beeps: 0,
            brightness: 1.0,
            text: heapless::String::new(),
        }
    }
}

impl FrontPanel {
    pub fn beeper_enabled(&self) -> bool {
        self.beeper_enabled
    }

    /// Disabling the beeper drops beeps not yet played.
    pub fn set_beeper_enabled(&mut self, enabled: bool) {
        self.beeper_enabled = enabled;
        if !enabled {
            self.pending_beeps = 0;
        }
    }

    /// Queue one beep. Ignored while the beeper is disabled.
    pub fn beep(&mut self) {
        if self.beeper_enabled {
            self.pending_beeps = self.pending_beeps.saturating_add(1);
        }
    }

    /// Called by the audio collaborator, true when a beep should be played.
    pub fn take_beep(&mut self) -> bool {
        if self.pending_beeps > 0 {
            self.pending_beeps -= 1;
            true
        } else {
            false
        }
    }

    pub fn brightness(&self) -> f32 {
        self.brightness
    }

    /// Brightness, already validated by the caller.
    pub fn set_brightness(&mut self, brightness: f32) {
        self.brightness = brightness;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the user text. Text longer than [`TEXT_CAPACITY`] bytes is refused
    /// and the previous text stays.
    pub fn set_text(&mut self, text: &str) -> Result<(), ScpiError> {
        self.text =
            heapless::String::try_from(text).map_err(|_| ScpiError::CharacterDataTooLong)?;
        Ok(())
    }

    pub fn clear_text(&mut self) {
        self.text.clear();
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn beeps_only_when_enabled() {
        let mut panel = FrontPanel::default();
        panel.beep();
        panel.beep();
        assert!(panel.take_beep());
        assert!(panel.take_beep());
        assert!(!panel.take_beep());

        panel.set_beeper_enabled(false);
        panel.beep();
        assert!(!panel.take_beep());
    }

    #[test]
    fn disabling_drops_pending_beeps() {
        let mut panel = FrontPanel::default();
        panel.beep();
        panel.set_beeper_enabled(false);
        panel.set_beeper_enabled(true);
        assert!(!panel.take_beep());
    }

    #[test]
    fn text_capacity() {
        let mut panel = FrontPanel::default();
        assert!(panel.set_text("HELLO").is_ok());
        assert_eq!(panel.text(), "HELLO");

        let long = "0123456789012345678901234567890123";
        assert_eq!(panel.set_text(long), Err(ScpiError::CharacterDataTooLong));
        assert_eq!(panel.text(), "HELLO");

        panel.clear_text();
        assert_eq!(panel.text(), "");
    }

    #[test]
    fn reset_restores_defaults() {
        let mut panel = FrontPanel::default();
        panel.set_beeper_enabled(false);
        panel.set_brightness(0.2);
        panel.set_text("X").unwrap();
        panel.reset();
        assert_eq!(panel, FrontPanel::default());
        assert!(panel.beeper_enabled());
        assert_eq!(panel.brightness(), 1.0);
    }
}
