//! Style token resolution.
//!
//! A style token is an effect name with an optional single-letter color
//! suffix, e.g. `rippler` for a red ripple. Matching is case-sensitive and
//! exact; anything else is rejected before a frame is built.

use crate::error::{Error, Result};
use crate::frame::{self, CommandFrame};

/// Backlight animation effect.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Effect {
    Breathing,
    Wave,
    Random,
    Reactive,
    Rainbow,
    Ripple,
    ReactiveRipple,
    Marquee,
    Fireworks,
    Raindrop,
    Aurora,
    ReactiveAurora,
}

impl Effect {
    /// Every known effect.
    pub const ALL: [Effect; 12] = [
        Effect::Breathing,
        Effect::Wave,
        Effect::Random,
        Effect::Reactive,
        Effect::Rainbow,
        Effect::Ripple,
        Effect::ReactiveRipple,
        Effect::Marquee,
        Effect::Fireworks,
        Effect::Raindrop,
        Effect::Aurora,
        Effect::ReactiveAurora,
    ];

    /// Token spelling accepted on the command line.
    pub fn token(self) -> &'static str {
        match self {
            Effect::Breathing => "breathing",
            Effect::Wave => "wave",
            Effect::Random => "random",
            Effect::Reactive => "reactive",
            Effect::Rainbow => "rainbow",
            Effect::Ripple => "ripple",
            Effect::ReactiveRipple => "reactiveripple",
            Effect::Marquee => "marquee",
            Effect::Fireworks => "fireworks",
            Effect::Raindrop => "raindrop",
            Effect::Aurora => "aurora",
            Effect::ReactiveAurora => "reactiveaurora",
        }
    }

    /// Firmware effect code. Random/reactive and aurora/reactiveaurora share
    /// a code; the firmware does not distinguish them.
    pub fn code(self) -> u8 {
        match self {
            Effect::Breathing => 0x02,
            Effect::Wave => 0x03,
            Effect::Random | Effect::Reactive => 0x04,
            Effect::Rainbow => 0x05,
            Effect::Ripple => 0x06,
            Effect::ReactiveRipple => 0x07,
            Effect::Marquee => 0x09,
            Effect::Raindrop => 0x0a,
            Effect::Aurora | Effect::ReactiveAurora => 0x0e,
            Effect::Fireworks => 0x11,
        }
    }
}

/// Single-letter color code accepted as a style suffix.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ColorLetter {
    Red,
    Orange,
    Yellow,
    Green,
    Blue,
    Teal,
    Purple,
}

impl ColorLetter {
    fn from_char(letter: char) -> Option<Self> {
        match letter {
            'r' => Some(ColorLetter::Red),
            'o' => Some(ColorLetter::Orange),
            'y' => Some(ColorLetter::Yellow),
            'g' => Some(ColorLetter::Green),
            'b' => Some(ColorLetter::Blue),
            't' => Some(ColorLetter::Teal),
            'p' => Some(ColorLetter::Purple),
            _ => None,
        }
    }

    /// Firmware color code.
    pub fn code(self) -> u8 {
        match self {
            ColorLetter::Red => 0x01,
            ColorLetter::Orange => 0x02,
            ColorLetter::Yellow => 0x03,
            ColorLetter::Green => 0x04,
            ColorLetter::Blue => 0x05,
            ColorLetter::Teal => 0x06,
            ColorLetter::Purple => 0x07,
        }
    }
}

/// Brightness ordinal, 1 (minimum) to 4 (maximum).
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct BrightnessLevel(u8);

impl BrightnessLevel {
    pub const MAX: BrightnessLevel = BrightnessLevel(4);

    pub fn new(level: u8) -> Result<Self> {
        match level {
            1..=4 => Ok(BrightnessLevel(level)),
            _ => Err(Error::InvalidBrightness(level)),
        }
    }

    /// Firmware brightness byte.
    pub fn byte(self) -> u8 {
        match self.0 {
            1 => 0x08,
            2 => 0x16,
            3 => 0x24,
            _ => 0x32,
        }
    }
}

impl Default for BrightnessLevel {
    fn default() -> Self {
        BrightnessLevel(3)
    }
}

/// Speed ordinal, 1 (fastest) to 10 (slowest), stored verbatim in the frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct SpeedLevel(u8);

impl SpeedLevel {
    pub fn new(speed: u8) -> Result<Self> {
        match speed {
            1..=10 => Ok(SpeedLevel(speed)),
            _ => Err(Error::InvalidSpeed(speed)),
        }
    }

    /// Firmware speed byte.
    pub fn byte(self) -> u8 {
        self.0
    }
}

impl Default for SpeedLevel {
    fn default() -> Self {
        SpeedLevel(5)
    }
}

/// Resolve a style token into a ready-to-send command frame.
pub fn resolve_style(token: &str, brightness: BrightnessLevel, speed: SpeedLevel) -> Result<CommandFrame> {
    let (effect, color) =
        parse_token(token).ok_or_else(|| Error::UnknownStyle(token.to_owned()))?;

    let mut color_code = color.map(ColorLetter::code).unwrap_or(frame::COLOR_RAINBOW);
    let mut secondary = 0x00;

    // Per-effect overrides; applied after the base lookup.
    match effect {
        // Rainbow cycles through colors on its own.
        Effect::Rainbow => color_code = frame::COLOR_NONE,
        // Marquee only renders with the rainbow sentinel.
        Effect::Marquee => color_code = frame::COLOR_RAINBOW,
        Effect::Wave => {
            color_code = frame::COLOR_NONE;
            secondary = 0x01;
        },
        // These need the secondary flag but keep their color.
        Effect::Reactive | Effect::ReactiveAurora | Effect::Fireworks => secondary = 0x01,
        _ => (),
    }

    Ok(CommandFrame::style(effect.code(), speed.byte(), brightness.byte(), color_code, secondary, 0x00))
}

/// Split a token into effect and optional color letter. Effect names are
/// tried in turn so that short names (`reactive`) do not shadow longer ones
/// (`reactiveripple`); a suffix that is not exactly one known color letter
/// fails the whole token.
fn parse_token(token: &str) -> Option<(Effect, Option<ColorLetter>)> {
    for effect in Effect::ALL {
        let rest = match token.strip_prefix(effect.token()) {
            Some(rest) => rest,
            None => continue,
        };

        if rest.is_empty() {
            return Some((effect, None));
        }

        let mut chars = rest.chars();
        if let (Some(letter), None) = (chars.next(), chars.next()) {
            if let Some(color) = ColorLetter::from_char(letter) {
                return Some((effect, Some(color)));
            }
        }
    }

    None
}
