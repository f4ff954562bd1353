//! Keyboard firmware command frames.
//!
//! Every fixed byte layout the firmware accepts lives in this module. All
//! commands travel as a single 8-byte control payload:
//!
//! ```text
//! Byte  Purpose
//! 0     Command marker, always 0x08 (0x12 for the persist command)
//! 1     Write marker, 0x02; 0x01 switches the lights off
//! 2     Effect code
//! 3     Speed, 0x01 (fastest) to 0x0a (slowest)
//! 4     Brightness, one of 0x08, 0x16, 0x24, 0x32
//! 5     Color code, 0x01-0x07 named colors, 0x08 rainbow, 0x00 none
//! 6     Secondary-effect flag, required by some effects
//! 7     Persist flag, 0x01 to keep settings across power cycles
//! ```

/// Frame length dictated by the firmware; never anything else.
pub const FRAME_LEN: usize = 8;

/// Rainbow / "no specific color" sentinel.
pub const COLOR_RAINBOW: u8 = 0x08;

/// "No color" sentinel used by effects that ignore the color byte.
pub const COLOR_NONE: u8 = 0x00;

/// One 8-byte firmware command.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct CommandFrame([u8; FRAME_LEN]);

impl CommandFrame {
    /// Frame switching the backlight off.
    pub const OFF: CommandFrame = CommandFrame([0x08, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);

    /// Style write frame. Codes must already be validated; this only lays
    /// out the bytes.
    pub fn style(effect: u8, speed: u8, brightness: u8, color: u8, secondary: u8, persist: u8) -> Self {
        CommandFrame([0x08, 0x02, effect, speed, brightness, color, secondary, persist])
    }

    /// Brightness-only write.
    pub fn brightness(brightness: u8) -> Self {
        CommandFrame([0x08, 0x02, 0x33, 0x00, brightness, 0x00, 0x00, 0x00])
    }

    /// Ask the firmware to keep (or not keep) the uploaded color table
    /// across power cycles. Sent before every color-table upload.
    pub fn persist(save: bool) -> Self {
        CommandFrame([0x12, 0x00, 0x00, 0x08, save as u8, 0x00, 0x00, 0x00])
    }

    /// Raw payload for the transport.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}
