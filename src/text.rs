//! Text display controls.
//!
//! A text control renders the bytes stored at its VP. The display does not
//! stop at a terminator, so shorter text must be padded over whatever was
//! there before ([`Dgus::set_text_padded`]).
//!
//! With an SP (description pointer) configured for the control, its layout
//! can also be changed at runtime. The SP block is 13 words:
//!
//! | Word | Field                              |
//! |------|------------------------------------|
//! | 0    | VP                                 |
//! | 1-2  | position x, y                      |
//! | 3    | colour                             |
//! | 4-7  | bounding box x0, y0, x1, y1        |
//! | 8    | text length                        |
//! | 9    | font 0 id, font 1 id               |
//! | 10   | font x dots, font y dots           |
//! | 11   | encode mode, horizontal distance   |
//! | 12   | vertical distance, reserved        |

use embedded_hal::delay::DelayNs;

use crate::command::Command;
use crate::driver::{Dgus, FrameHandler};
use crate::error::DgusError;
use crate::timer::Clock;
use crate::transport::Transport;

const SP_VP: u16 = 0;
const SP_POSITION: u16 = 1;
const SP_COLOUR: u16 = 3;
const SP_BOUNDS: u16 = 4;
const SP_TEXT_LEN: u16 = 8;
const SP_FONTS: u16 = 9;
const SP_FONT_DOTS: u16 = 10;
const SP_ENCODING: u16 = 11;

/// Top-left corner of a control, in pixels.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Position {
    /// Column.
    pub x: u16,
    /// Row.
    pub y: u16,
}

/// The box text is clipped to, in pixels.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct Bounds {
    /// Left.
    pub x_top: u16,
    /// Top.
    pub y_top: u16,
    /// Right.
    pub x_bottom: u16,
    /// Bottom.
    pub y_bottom: u16,
}

/// Character encoding and spacing.
#[derive(PartialEq, Eq, Clone, Copy, Default, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
pub struct TextEncoding {
    /// Encoding selector (`0x02` is GBK).
    pub mode: u8,
    /// Pixels between characters.
    pub horizontal_distance: u8,
    /// Pixels between lines.
    pub vertical_distance: u8,
}

fn pack(hi: u8, lo: u8) -> u16 {
    u16::from_be_bytes([hi, lo])
}

impl<T, C, D, H, const TX: usize, const RX: usize> Dgus<T, C, D, H, TX, RX>
where
    T: Transport,
    C: Clock,
    D: DelayNs,
    H: FrameHandler,
{
    /// Writes `text` to the VP at `addr` as-is.
    pub fn set_text(&mut self, addr: u16, text: &str) -> Result<(), DgusError<T::Error>> {
        self.set_var8(addr, text.as_bytes())
    }

    /// Writes `text` to the VP at `addr`, padded with spaces to `field_len`
    /// bytes so nothing of a longer previous text is left on screen.
    ///
    /// Text longer than the field is cut at `field_len` bytes.
    pub fn set_text_padded(
        &mut self,
        addr: u16,
        text: &str,
        field_len: usize,
    ) -> Result<(), DgusError<T::Error>> {
        let text = &text.as_bytes()[..text.len().min(field_len)];
        let p = self.packet();
        p.append_words16(&[addr])?;
        p.append_bytes(text)?;
        for _ in text.len()..field_len {
            p.append_bytes(b" ")?;
        }
        self.send(Command::VariableWrite)
    }

    /// Reads up to `buf.len()` bytes of text from the VP at `addr`.
    ///
    /// Returns the length up to the first `0x00` or `0xFF` byte.
    pub fn get_text(&mut self, addr: u16, buf: &mut [u8]) -> Result<usize, DgusError<T::Error>> {
        self.get_var8(addr, buf)?;
        Ok(buf.iter().position(|&b| b == 0x00 || b == 0xFF).unwrap_or(buf.len()))
    }

    fn sp_word(&mut self, sp: u16, offset: u16) -> Result<u16, DgusError<T::Error>> {
        let mut word = [0u16; 1];
        self.get_var(sp.wrapping_add(offset), &mut word)?;
        Ok(word[0])
    }

    /// VP the control at `sp` displays.
    pub fn text_vp(&mut self, sp: u16) -> Result<u16, DgusError<T::Error>> {
        self.sp_word(sp, SP_VP)
    }

    /// Points the control at `sp` to another VP.
    pub fn set_text_vp(&mut self, sp: u16, vp: u16) -> Result<(), DgusError<T::Error>> {
        self.set_var16(sp.wrapping_add(SP_VP), &[vp])
    }

    /// Position of the control at `sp`.
    pub fn text_position(&mut self, sp: u16) -> Result<Position, DgusError<T::Error>> {
        let mut words = [0u16; 2];
        self.get_var(sp.wrapping_add(SP_POSITION), &mut words)?;
        Ok(Position {
            x: words[0],
            y: words[1],
        })
    }

    /// Moves the control at `sp`.
    pub fn set_text_position(&mut self, sp: u16, pos: Position) -> Result<(), DgusError<T::Error>> {
        self.set_var16(sp.wrapping_add(SP_POSITION), &[pos.x, pos.y])
    }

    /// Text colour (RGB565) of the control at `sp`.
    pub fn text_colour(&mut self, sp: u16) -> Result<u16, DgusError<T::Error>> {
        self.sp_word(sp, SP_COLOUR)
    }

    /// Sets the text colour (RGB565) of the control at `sp`.
    pub fn set_text_colour(&mut self, sp: u16, colour: u16) -> Result<(), DgusError<T::Error>> {
        self.set_var16(sp.wrapping_add(SP_COLOUR), &[colour])
    }

    /// Bounding box of the control at `sp`.
    pub fn text_bounds(&mut self, sp: u16) -> Result<Bounds, DgusError<T::Error>> {
        let mut w = [0u16; 4];
        self.get_var(sp.wrapping_add(SP_BOUNDS), &mut w)?;
        Ok(Bounds {
            x_top: w[0],
            y_top: w[1],
            x_bottom: w[2],
            y_bottom: w[3],
        })
    }

    /// Sets the bounding box of the control at `sp`.
    pub fn set_text_bounds(&mut self, sp: u16, b: Bounds) -> Result<(), DgusError<T::Error>> {
        self.set_var16(
            sp.wrapping_add(SP_BOUNDS),
            &[b.x_top, b.y_top, b.x_bottom, b.y_bottom],
        )
    }

    /// Maximum text length of the control at `sp`, in bytes.
    pub fn text_len(&mut self, sp: u16) -> Result<u16, DgusError<T::Error>> {
        self.sp_word(sp, SP_TEXT_LEN)
    }

    /// Sets the maximum text length of the control at `sp`.
    pub fn set_text_len(&mut self, sp: u16, len: u16) -> Result<(), DgusError<T::Error>> {
        self.set_var16(sp.wrapping_add(SP_TEXT_LEN), &[len])
    }

    /// Font library ids of the control at `sp`.
    pub fn text_fonts(&mut self, sp: u16) -> Result<(u8, u8), DgusError<T::Error>> {
        let [font0, font1] = self.sp_word(sp, SP_FONTS)?.to_be_bytes();
        Ok((font0, font1))
    }

    /// Sets the font library ids of the control at `sp`.
    pub fn set_text_fonts(&mut self, sp: u16, font0: u8, font1: u8) -> Result<(), DgusError<T::Error>> {
        self.set_var16(sp.wrapping_add(SP_FONTS), &[pack(font0, font1)])
    }

    /// Character cell size of the control at `sp`, in dots.
    pub fn text_font_dots(&mut self, sp: u16) -> Result<(u8, u8), DgusError<T::Error>> {
        let [x, y] = self.sp_word(sp, SP_FONT_DOTS)?.to_be_bytes();
        Ok((x, y))
    }

    /// Sets the character cell size of the control at `sp`.
    pub fn set_text_font_dots(&mut self, sp: u16, x: u8, y: u8) -> Result<(), DgusError<T::Error>> {
        self.set_var16(sp.wrapping_add(SP_FONT_DOTS), &[pack(x, y)])
    }

    /// Encoding and spacing of the control at `sp`.
    pub fn text_encoding(&mut self, sp: u16) -> Result<TextEncoding, DgusError<T::Error>> {
        let mut words = [0u16; 2];
        self.get_var(sp.wrapping_add(SP_ENCODING), &mut words)?;
        let [mode, horizontal_distance] = words[0].to_be_bytes();
        let [vertical_distance, _] = words[1].to_be_bytes();
        Ok(TextEncoding {
            mode,
            horizontal_distance,
            vertical_distance,
        })
    }

    /// Sets encoding and spacing of the control at `sp`.
    pub fn set_text_encoding(&mut self, sp: u16, enc: TextEncoding) -> Result<(), DgusError<T::Error>> {
        self.set_var16(
            sp.wrapping_add(SP_ENCODING),
            &[pack(enc.mode, enc.horizontal_distance), pack(enc.vertical_distance, 0)],
        )
    }
}
