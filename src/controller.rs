//! Keyboard control center.
//!
//! Owns the per-device command sequencing state. The firmware only accepts a
//! color-table upload after it has seen a brightness write, so the color
//! operations establish the maximum brightness first when none was applied
//! during this run. All other operations are a single transfer.

use bytes::Bytes;
use log::debug;

use crate::colors;
use crate::device::CommandSink;
use crate::error::Result;
use crate::frame::CommandFrame;
use crate::style::{self, BrightnessLevel, SpeedLevel};

/// Bulk writes per color-table upload, one per matrix row.
const MATRIX_WRITES: usize = colors::MATRIX_ROWS;

/// High-level lighting operations over one keyboard.
pub struct ControlCenter<S> {
    keyboard: S,
    last_brightness: Option<BrightnessLevel>,
}

impl<S: CommandSink> ControlCenter<S> {
    pub fn new(keyboard: S) -> Self {
        Self { keyboard, last_brightness: None }
    }

    /// Switch the backlight off.
    pub fn disable(&self) -> Result<()> {
        debug!("disable backlight");
        self.keyboard.write_control(&CommandFrame::OFF)
    }

    /// Apply an animation style. Brightness and speed are parameters of the
    /// style frame itself and do not touch the stored brightness.
    pub fn set_style(
        &self,
        token: &str,
        brightness: BrightnessLevel,
        speed: SpeedLevel,
    ) -> Result<()> {
        let frame = style::resolve_style(token, brightness, speed)?;
        debug!("style '{token}'");
        self.keyboard.write_control(&frame)
    }

    /// Set the backlight brightness; `None` means maximum. The level is
    /// recorded only once the firmware has acknowledged the write.
    pub fn set_brightness(&mut self, level: Option<BrightnessLevel>) -> Result<()> {
        let level = level.unwrap_or(BrightnessLevel::MAX);
        self.keyboard.write_control(&CommandFrame::brightness(level.byte()))?;
        self.last_brightness = Some(level);
        Ok(())
    }

    /// One color for the whole board.
    pub fn set_mono_color(&mut self, name: &str) -> Result<()> {
        debug!("mono color '{name}'");
        let vector = colors::mono_vector(name)?;
        self.upload_matrix(vector)
    }

    /// Alternating horizontal stripes.
    pub fn set_horizontal_alt(&mut self, name_a: &str, name_b: &str) -> Result<()> {
        debug!("horizontal stripes '{name_a}'/'{name_b}'");
        let vector = colors::horizontal_alt_vector(name_a, name_b)?;
        self.upload_matrix(vector)
    }

    /// Alternating vertical stripes.
    pub fn set_vertical_alt(&mut self, name_a: &str, name_b: &str) -> Result<()> {
        debug!("vertical stripes '{name_a}'/'{name_b}'");
        let vector = colors::vertical_alt_vector(name_a, name_b)?;
        self.upload_matrix(vector)
    }

    /// Common tail of the color-table operations: establish brightness if
    /// this run has not set one, ask the firmware to persist, then upload
    /// the matrix.
    fn upload_matrix(&mut self, vector: Bytes) -> Result<()> {
        if self.last_brightness.is_none() {
            self.set_brightness(None)?;
        }

        self.keyboard.write_control(&CommandFrame::persist(true))?;
        self.keyboard.write_bulk(&vector, MATRIX_WRITES)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;
    use crate::frame::FRAME_LEN;

    #[derive(Debug, PartialEq, Eq)]
    enum Write {
        Control([u8; FRAME_LEN]),
        Bulk { len: usize, repeat: usize },
    }

    /// Records every transfer instead of touching USB.
    #[derive(Default)]
    struct RecordingSink {
        writes: RefCell<Vec<Write>>,
    }

    impl RecordingSink {
        fn writes(&self) -> std::cell::Ref<'_, Vec<Write>> {
            self.writes.borrow()
        }
    }

    impl CommandSink for &RecordingSink {
        fn write_control(&self, frame: &CommandFrame) -> Result<()> {
            let mut bytes = [0; FRAME_LEN];
            bytes.copy_from_slice(frame.as_bytes());
            self.writes.borrow_mut().push(Write::Control(bytes));
            Ok(())
        }

        fn write_bulk(&self, payload: &[u8], repeat: usize) -> Result<()> {
            self.writes.borrow_mut().push(Write::Bulk { len: payload.len(), repeat });
            Ok(())
        }
    }

    const BRIGHTNESS_MAX: [u8; FRAME_LEN] = [0x08, 0x02, 0x33, 0x00, 0x32, 0x00, 0x00, 0x00];
    const PERSIST: [u8; FRAME_LEN] = [0x12, 0x00, 0x00, 0x08, 0x01, 0x00, 0x00, 0x00];

    #[test]
    fn color_upload_bootstraps_brightness_first() {
        let sink = RecordingSink::default();
        let mut control = ControlCenter::new(&sink);

        control.set_mono_color("red").unwrap();

        assert_eq!(
            *sink.writes(),
            [
                Write::Control(BRIGHTNESS_MAX),
                Write::Control(PERSIST),
                Write::Bulk { len: colors::VECTOR_LEN, repeat: 8 },
            ]
        );
    }

    #[test]
    fn explicit_brightness_is_not_repeated_by_color_uploads() {
        let sink = RecordingSink::default();
        let mut control = ControlCenter::new(&sink);

        control.set_brightness(Some(BrightnessLevel::new(2).unwrap())).unwrap();
        control.set_horizontal_alt("red", "blue").unwrap();

        assert_eq!(
            *sink.writes(),
            [
                Write::Control([0x08, 0x02, 0x33, 0x00, 0x16, 0x00, 0x00, 0x00]),
                Write::Control(PERSIST),
                Write::Bulk { len: colors::VECTOR_LEN, repeat: 8 },
            ]
        );
    }

    #[test]
    fn bootstrap_happens_once_across_uploads() {
        let sink = RecordingSink::default();
        let mut control = ControlCenter::new(&sink);

        control.set_mono_color("red").unwrap();
        control.set_vertical_alt("gold", "navy").unwrap();

        let brightness_writes = sink
            .writes()
            .iter()
            .filter(|write| matches!(write, Write::Control(frame) if frame[2] == 0x33))
            .count();
        assert_eq!(brightness_writes, 1);
    }

    #[test]
    fn brightness_default_is_maximum() {
        let sink = RecordingSink::default();
        let mut control = ControlCenter::new(&sink);

        control.set_brightness(None).unwrap();

        assert_eq!(*sink.writes(), [Write::Control(BRIGHTNESS_MAX)]);
    }

    #[test]
    fn disable_sends_the_power_off_frame_only() {
        let sink = RecordingSink::default();
        let control = ControlCenter::new(&sink);

        control.disable().unwrap();

        assert_eq!(
            *sink.writes(),
            [Write::Control([0x08, 0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00])]
        );
    }

    #[test]
    fn disable_does_not_establish_brightness() {
        let sink = RecordingSink::default();
        let mut control = ControlCenter::new(&sink);

        control.disable().unwrap();
        control.set_mono_color("teal").unwrap();

        // The upload still has to bootstrap.
        assert_eq!(sink.writes()[1], Write::Control(BRIGHTNESS_MAX));
    }

    #[test]
    fn style_does_not_establish_brightness() {
        let sink = RecordingSink::default();
        let mut control = ControlCenter::new(&sink);

        control
            .set_style("rippler", BrightnessLevel::default(), SpeedLevel::default())
            .unwrap();
        control.set_mono_color("teal").unwrap();

        assert_eq!(
            sink.writes()[0],
            Write::Control([0x08, 0x02, 0x06, 0x05, 0x24, 0x01, 0x00, 0x00])
        );
        assert_eq!(sink.writes()[1], Write::Control(BRIGHTNESS_MAX));
    }

    #[test]
    fn unknown_color_sends_nothing() {
        let sink = RecordingSink::default();
        let mut control = ControlCenter::new(&sink);

        assert!(control.set_mono_color("chartreuse").is_err());
        assert!(control.set_horizontal_alt("chartreuse", "red").is_err());
        assert!(control.set_vertical_alt("red", "chartreuse").is_err());
        assert!(sink.writes().is_empty());
    }

    #[test]
    fn unknown_style_sends_nothing() {
        let sink = RecordingSink::default();
        let control = ControlCenter::new(&sink);

        assert!(control
            .set_style("ripplez", BrightnessLevel::default(), SpeedLevel::default())
            .is_err());
        assert!(sink.writes().is_empty());
    }
}
