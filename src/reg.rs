//! Well-known addresses in the display's system VAR space.
//!
//! The first 0x1000 words of VAR memory are reserved by the T5L firmware for
//! status and control. Only the registers the helpers in
//! [`system`](crate::system) and [`curve`](crate::curve) touch are named
//! here, plus the reserved blocks, so that user VPs can be checked against
//! them.

/// System VAR addresses (word addressed).
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u16)]
pub enum VarRegister {
    /// Unique device ID, 4 words.
    DeviceId = 0x00,
    /// Write a reset magic here to restart the display.
    SystemReset = 0x04,
    /// OS update command.
    OsUpdateCmd = 0x06,
    /// NOR flash read/write command.
    NorFlashRwCmd = 0x08,
    /// GUI and OS firmware versions.
    Version = 0x0F,
    /// Real-time clock, 4 words.
    Rtc = 0x10,
    /// The page currently shown.
    PicPage = 0x14,
    /// GUI status.
    GuiStatus = 0x15,
    /// Touch panel status, 4 words.
    TpStatus = 0x16,
    /// Supply voltage.
    Vcc = 0x30,
    /// Current backlight level.
    Led = 0x31,
    /// ADC channels 0 and 1.
    Adc01 = 0x32,
    /// Name of the configuration folder on the SD card, 4 words.
    FolderName = 0x7C,
    /// System configuration flags, 2 words.
    SystemConfig = 0x80,
    /// Backlight brightness and standby timer, 2 words.
    LedConfig = 0x82,
    /// Write `0x5A01_0000 + page` here to switch pages.
    PicSetPage = 0x84,
    /// PWM0 configuration.
    Pwm0Set = 0x86,
    /// PWM0 output.
    Pwm0Out = 0x92,
    /// RTC set command.
    RtcSet = 0x9C,
    /// Music playback control, 2 words.
    MusicPlaySet = 0xA0,
    /// JPEG download command.
    JpegDownload = 0xA6,
    /// NAND flash read/write command.
    NandFlashRwCmd = 0xAA,
    /// Touch control switch.
    TouchControl = 0xB0,
    /// Simulated touch command.
    SimTouchControl = 0xD4,
    /// Pointer overlay control.
    PointerOverlay = 0xD8,
    /// CRC memory check.
    CrcMemoryCheck = 0xE0,
    /// Music streaming control.
    MusicStreaming = 0xF0,
    /// Painting interface.
    PaintingInterface = 0xF4,
    /// DCS bus data block.
    DcsBusData = 0x100,
    /// Real-time curve buffer.
    Curve = 0x300,
}

impl VarRegister {
    /// The word address.
    pub const fn addr(self) -> u16 {
        self as u16
    }
}

impl From<VarRegister> for u16 {
    fn from(reg: VarRegister) -> Self {
        reg.addr()
    }
}

/// Added to a page number written to [`VarRegister::PicSetPage`].
pub const PIC_SET_PAGE_BASE: u32 = 0x5A01_0000;

/// Restarts the T5L core.
pub const SOFT_RESET_MAGIC: u32 = 0x55AA_5AA5;

/// Restarts the T5L core and every on-board peripheral.
pub const HARD_RESET_MAGIC: u32 = 0x55AA_5A5A;

/// VAR address the curve buffer write command goes to.
pub const CURVE_WRITE_ADDR: u16 = 0x0310;

/// Marker that arms a curve buffer write.
pub const CURVE_WRITE_MARKER: u16 = 0x5AA5;

/// First address outside the system VAR space.
pub const USER_VAR_START: u16 = 0x1000;

/// Whether `addr` falls in the system VAR space rather than user memory.
pub const fn is_system_var(addr: u16) -> bool {
    addr < USER_VAR_START
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_addresses() {
        assert_eq!(VarRegister::PicPage.addr(), 0x14);
        assert_eq!(u16::from(VarRegister::MusicPlaySet), 0xA0);
        assert_eq!(VarRegister::Curve.addr(), 0x300);
        assert!(is_system_var(CURVE_WRITE_ADDR));
        assert!(!is_system_var(0x5000));
    }
}
