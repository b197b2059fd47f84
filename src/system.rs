//! Page, sound, backlight and reset helpers built on the VAR accessors.
//!
//! Each helper is a thin wrapper that lays a typed value over one of the
//! [`VarRegister`]s. Multi-byte registers are read and written in wire order
//! with [`Dgus::get_var8`] / [`Dgus::set_var8`], so field `n` of a struct is
//! byte `n` on the wire.

use embedded_hal::delay::DelayNs;

use crate::driver::{Dgus, FrameHandler};
use crate::error::DgusError;
use crate::reg::{HARD_RESET_MAGIC, PIC_SET_PAGE_BASE, SOFT_RESET_MAGIC, VarRegister};
use crate::timer::Clock;
use crate::transport::Transport;

/// Standby delay written with [`Dgus::set_brightness`], in the register's
/// native units.
const DIM_WAIT: u16 = 1000;

/// Contents of [`VarRegister::MusicPlaySet`].
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct MusicSettings {
    /// WAV file to start.
    pub start_id: u8,
    /// Number of consecutive files (segments) to play.
    pub section_id: u8,
    /// `0x00..=0x80`.
    pub volume: u8,
    /// Playback state as reported by the display.
    pub play_mode: u8,
}

impl MusicSettings {
    fn to_bytes(self) -> [u8; 4] {
        [self.start_id, self.section_id, self.volume, self.play_mode]
    }

    fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            start_id: bytes[0],
            section_id: bytes[1],
            volume: bytes[2],
            play_mode: bytes[3],
        }
    }
}

/// Contents of [`VarRegister::LedConfig`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct LedConfig {
    /// Backlight while in use, `0..=100`.
    pub running: u8,
    /// Backlight in standby, `0..=100`.
    pub idle: u8,
    /// Time without touch before dimming, in 5 ms units.
    pub dim_wait: u16,
}

impl LedConfig {
    fn to_bytes(self) -> [u8; 4] {
        let [hi, lo] = self.dim_wait.to_be_bytes();
        [self.running, self.idle, hi, lo]
    }

    fn from_bytes(bytes: [u8; 4]) -> Self {
        Self {
            running: bytes[0],
            idle: bytes[1],
            dim_wait: u16::from_be_bytes([bytes[2], bytes[3]]),
        }
    }
}

/// Screen rotation.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum Orientation {
    /// 0°
    Deg0,
    /// 90°
    Deg90,
    /// 180°
    Deg180,
    /// 270°
    Deg270,
}

impl From<u8> for Orientation {
    /// Uses the low two bits.
    fn from(bits: u8) -> Self {
        match bits & 0b11 {
            0 => Orientation::Deg0,
            1 => Orientation::Deg90,
            2 => Orientation::Deg180,
            _ => Orientation::Deg270,
        }
    }
}

/// Decoded [`VarRegister::SystemConfig`].
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct SystemConfig {
    /// `0x5A` when the register is being written, `0` when read.
    pub read_write_mode: u8,
    /// Touch panel sensitivity.
    pub touch_sensitivity: u8,
    /// Touch mode: regular, raw or paint.
    pub touch_mode: u8,
    /// Serial CRC enabled.
    pub crc_enabled: bool,
    /// Buzzer enabled.
    pub music_enabled: bool,
    /// `22_*.bin` configuration loaded at boot.
    pub load_22_bin: bool,
    /// Controls upload their VARs on touch.
    pub var_auto_upload: bool,
    /// Touch click sound enabled.
    pub touch_audio: bool,
    /// Backlight dims in standby.
    pub backlight_standby: bool,
    /// Screen rotation.
    pub orientation: Orientation,
}

impl SystemConfig {
    fn from_bytes(bytes: [u8; 4]) -> Self {
        let flags = bytes[3];
        let bit = |n: u8| flags & (1 << n) != 0;
        Self {
            read_write_mode: bytes[0],
            touch_sensitivity: bytes[1],
            touch_mode: bytes[2],
            crc_enabled: bit(0),
            music_enabled: bit(1),
            load_22_bin: bit(2),
            var_auto_upload: bit(3),
            touch_audio: bit(4),
            backlight_standby: bit(5),
            orientation: Orientation::from(flags >> 6),
        }
    }
}

/// How much of the display to restart.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub enum ResetKind {
    /// The T5L core only.
    Soft,
    /// The core and every on-board peripheral.
    Hard,
}

impl ResetKind {
    /// The magic word that triggers this reset.
    pub const fn magic(self) -> u32 {
        match self {
            ResetKind::Soft => SOFT_RESET_MAGIC,
            ResetKind::Hard => HARD_RESET_MAGIC,
        }
    }
}

impl<T, C, D, H, const TX: usize, const RX: usize> Dgus<T, C, D, H, TX, RX>
where
    T: Transport,
    C: Clock,
    D: DelayNs,
    H: FrameHandler,
{
    /// Switches to page `page`.
    pub fn set_page(&mut self, page: u16) -> Result<(), DgusError<T::Error>> {
        self.set_var(VarRegister::PicSetPage.addr(), PIC_SET_PAGE_BASE + u32::from(page))
    }

    /// The page currently shown.
    pub fn page(&mut self) -> Result<u16, DgusError<T::Error>> {
        let mut page = [0u16; 1];
        self.get_var(VarRegister::PicPage.addr(), &mut page)?;
        Ok(page[0])
    }

    /// Shows icon `index` on the icon control bound to `addr`.
    pub fn set_icon(&mut self, addr: u16, index: u16) -> Result<(), DgusError<T::Error>> {
        self.set_var(addr, u32::from(index))
    }

    /// Starts playback.
    pub fn play_sound(&mut self, music: MusicSettings) -> Result<(), DgusError<T::Error>> {
        self.set_var8(VarRegister::MusicPlaySet.addr(), &music.to_bytes())
    }

    /// The music register.
    pub fn music(&mut self) -> Result<MusicSettings, DgusError<T::Error>> {
        let mut bytes = [0u8; 4];
        self.get_var8(VarRegister::MusicPlaySet.addr(), &mut bytes)?;
        Ok(MusicSettings::from_bytes(bytes))
    }

    /// The playback volume.
    pub fn volume(&mut self) -> Result<u8, DgusError<T::Error>> {
        Ok(self.music()?.volume)
    }

    /// Sets the playback volume.
    ///
    /// Volume and play mode share a word, so the word is read first and the
    /// play mode written back unchanged.
    pub fn set_volume(&mut self, volume: u8) -> Result<(), DgusError<T::Error>> {
        let addr = VarRegister::MusicPlaySet.addr() + 1;
        let mut word = [0u8; 2];
        self.get_var8(addr, &mut word)?;
        word[0] = volume;
        self.set_var8(addr, &word)
    }

    /// The backlight register.
    pub fn led_config(&mut self) -> Result<LedConfig, DgusError<T::Error>> {
        let mut bytes = [0u8; 4];
        self.get_var8(VarRegister::LedConfig.addr(), &mut bytes)?;
        Ok(LedConfig::from_bytes(bytes))
    }

    /// Writes the backlight register.
    pub fn set_led_config(&mut self, config: LedConfig) -> Result<(), DgusError<T::Error>> {
        self.set_var8(VarRegister::LedConfig.addr(), &config.to_bytes())
    }

    /// The standby backlight level, `0..=100`.
    ///
    /// [`set_brightness`](Dgus::set_brightness) writes the same level to both
    /// fields, so this only differs from the running level after
    /// [`set_led_config`](Dgus::set_led_config). Read
    /// [`LedConfig::running`] for the other one.
    pub fn brightness(&mut self) -> Result<u8, DgusError<T::Error>> {
        Ok(self.led_config()?.idle)
    }

    /// Sets both running and standby backlight to `level` (`0..=100`).
    pub fn set_brightness(&mut self, level: u8) -> Result<(), DgusError<T::Error>> {
        self.set_led_config(LedConfig {
            running: level,
            idle: level,
            dim_wait: DIM_WAIT,
        })
    }

    /// Reads and decodes the system configuration register.
    pub fn system_config(&mut self) -> Result<SystemConfig, DgusError<T::Error>> {
        let mut bytes = [0u8; 4];
        self.get_var8(VarRegister::SystemConfig.addr(), &mut bytes)?;
        Ok(SystemConfig::from_bytes(bytes))
    }

    /// Restarts the display.
    ///
    /// The display may go down before acknowledging, in which case this
    /// returns [`DgusError::Timeout`] even though the reset happened.
    pub fn system_reset(&mut self, kind: ResetKind) -> Result<(), DgusError<T::Error>> {
        self.set_var8(VarRegister::SystemReset.addr(), &kind.magic().to_be_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::DgusConfig;
    use crate::testutil::{MockSerial, SimClock, ack, frame};

    fn lcd(serial: MockSerial) -> Dgus<MockSerial, SimClock, SimClock> {
        let clock = SimClock::default();
        Dgus::new(DgusConfig::default(), clock.clone(), clock).with_transport(serial)
    }

    fn written(lcd: &mut Dgus<MockSerial, SimClock, SimClock>) -> Vec<u8> {
        lcd.transport_mut().map(|s| s.written.clone()).unwrap_or_default()
    }

    #[test]
    fn test_set_page() {
        let mut serial = MockSerial::new();
        serial.reply_with(&ack());
        let mut lcd = lcd(serial);
        lcd.set_page(3).unwrap();
        assert_eq!(written(&mut lcd), frame(0x82, &[0x00, 0x84, 0x5A, 0x01, 0x00, 0x03]));
    }

    #[test]
    fn test_page() {
        let mut serial = MockSerial::new();
        serial.reply_with(&frame(0x83, &[0x00, 0x14, 0x01, 0x00, 0x02]));
        let mut lcd = lcd(serial);
        assert_eq!(lcd.page(), Ok(2));
        assert_eq!(written(&mut lcd), frame(0x83, &[0x00, 0x14, 0x01]));
    }

    #[test]
    fn test_set_icon() {
        let mut serial = MockSerial::new();
        serial.reply_with(&ack());
        let mut lcd = lcd(serial);
        lcd.set_icon(0x5100, 4).unwrap();
        assert_eq!(written(&mut lcd), frame(0x82, &[0x51, 0x00, 0x00, 0x04]));
    }

    #[test]
    fn test_play_sound() {
        let mut serial = MockSerial::new();
        serial.reply_with(&ack());
        let mut lcd = lcd(serial);
        lcd.play_sound(MusicSettings {
            start_id: 1,
            section_id: 1,
            volume: 0x40,
            play_mode: 0,
        })
        .unwrap();
        assert_eq!(written(&mut lcd), frame(0x82, &[0x00, 0xA0, 0x01, 0x01, 0x40, 0x00]));
    }

    #[test]
    fn test_volume_round_trip_keeps_play_mode() {
        let mut serial = MockSerial::new();
        serial.reply_with(&frame(0x83, &[0x00, 0xA1, 0x01, 0x40, 0x02]));
        serial.reply_with(&ack());
        serial.reply_with(&frame(0x83, &[0x00, 0xA0, 0x02, 0x01, 0x01, 0x20, 0x02]));
        let mut lcd = lcd(serial);

        lcd.set_volume(0x20).unwrap();
        assert_eq!(lcd.volume(), Ok(0x20));

        let mut expected = frame(0x83, &[0x00, 0xA1, 0x01]);
        expected.extend(frame(0x82, &[0x00, 0xA1, 0x20, 0x02]));
        expected.extend(frame(0x83, &[0x00, 0xA0, 0x02]));
        assert_eq!(written(&mut lcd), expected);
    }

    #[test]
    fn test_brightness() {
        let mut serial = MockSerial::new();
        serial.reply_with(&ack());
        serial.reply_with(&frame(0x83, &[0x00, 0x82, 0x02, 0x32, 0x32, 0x03, 0xE8]));
        let mut lcd = lcd(serial);

        lcd.set_brightness(50).unwrap();
        assert_eq!(lcd.brightness(), Ok(50));

        let mut expected = frame(0x82, &[0x00, 0x82, 0x32, 0x32, 0x03, 0xE8]);
        expected.extend(frame(0x83, &[0x00, 0x82, 0x02]));
        assert_eq!(written(&mut lcd), expected);
    }

    #[test]
    fn test_brightness_reports_standby_level() {
        let mut serial = MockSerial::new();
        serial.reply_with(&frame(0x83, &[0x00, 0x82, 0x02, 0x32, 0x64, 0x03, 0xE8]));
        serial.reply_with(&frame(0x83, &[0x00, 0x82, 0x02, 0x32, 0x64, 0x03, 0xE8]));
        let mut lcd = lcd(serial);

        assert_eq!(lcd.brightness(), Ok(0x64));
        assert_eq!(lcd.led_config().map(|c| c.running), Ok(0x32));
    }

    #[test]
    fn test_led_config_layout() {
        let config = LedConfig {
            running: 100,
            idle: 10,
            dim_wait: 0x0102,
        };
        assert_eq!(config.to_bytes(), [100, 10, 0x01, 0x02]);
        assert_eq!(LedConfig::from_bytes(config.to_bytes()), config);
    }

    #[test]
    fn test_system_config_bits() {
        let mut serial = MockSerial::new();
        // Flags 0b1010_1001: crc, auto upload, standby, 180°.
        serial.reply_with(&frame(0x83, &[0x00, 0x80, 0x02, 0x00, 0x05, 0x01, 0xA9]));
        let mut lcd = lcd(serial);

        let config = lcd.system_config().unwrap();
        assert_eq!(config.read_write_mode, 0x00);
        assert_eq!(config.touch_sensitivity, 0x05);
        assert_eq!(config.touch_mode, 0x01);
        assert!(config.crc_enabled);
        assert!(!config.music_enabled);
        assert!(!config.load_22_bin);
        assert!(config.var_auto_upload);
        assert!(!config.touch_audio);
        assert!(config.backlight_standby);
        assert_eq!(config.orientation, Orientation::Deg180);
    }

    #[test]
    fn test_system_reset_magic() {
        let mut serial = MockSerial::new();
        serial.reply_with(&ack());
        serial.reply_with(&ack());
        let mut lcd = lcd(serial);

        lcd.system_reset(ResetKind::Soft).unwrap();
        lcd.system_reset(ResetKind::Hard).unwrap();
        let mut expected = frame(0x82, &[0x00, 0x04, 0x55, 0xAA, 0x5A, 0xA5]);
        expected.extend(frame(0x82, &[0x00, 0x04, 0x55, 0xAA, 0x5A, 0x5A]));
        assert_eq!(written(&mut lcd), expected);
    }
}
