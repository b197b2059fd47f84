//! DGUS command bytes.

/// Command byte carried in the frame header.
///
/// REG commands address the byte-wide configuration registers, VAR commands
/// the word-addressed variable memory.
#[derive(PartialEq, Eq, Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt-0-3", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    /// Write to a control register.
    RegisterWrite = 0x80,
    /// Read from a control register.
    RegisterRead = 0x81,
    /// Write words to VAR memory.
    VariableWrite = 0x82,
    /// Read words from VAR memory.
    VariableRead = 0x83,
    /// Write to the curve buffer.
    CurveWrite = 0x84,
}

impl Command {
    /// The raw command byte.
    pub const fn code(self) -> u8 {
        self as u8
    }

    /// Whether the command asks the display for data.
    ///
    /// Read commands are never acknowledged with `OK`; the reply frame is the
    /// answer.
    pub const fn is_read(self) -> bool {
        matches!(self, Command::RegisterRead | Command::VariableRead)
    }

    /// Whether an `OK` frame carrying this command counts as an acknowledgement.
    pub const fn acknowledges(self) -> bool {
        matches!(self, Command::RegisterWrite | Command::VariableWrite)
    }
}

impl TryFrom<u8> for Command {
    type Error = u8;

    /// Maps a raw byte to a [`Command`], handing the byte back if it is unknown.
    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x80 => Ok(Command::RegisterWrite),
            0x81 => Ok(Command::RegisterRead),
            0x82 => Ok(Command::VariableWrite),
            0x83 => Ok(Command::VariableRead),
            0x84 => Ok(Command::CurveWrite),
            other => Err(other),
        }
    }
}

impl From<Command> for u8 {
    fn from(command: Command) -> Self {
        command.code()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_are_contiguous() {
        let all = [
            Command::RegisterWrite,
            Command::RegisterRead,
            Command::VariableWrite,
            Command::VariableRead,
            Command::CurveWrite,
        ];
        for (i, cmd) in all.iter().enumerate() {
            assert_eq!(cmd.code(), 0x80 + i as u8);
            assert_eq!(Command::try_from(cmd.code()), Ok(*cmd));
        }
        assert_eq!(Command::try_from(0x85), Err(0x85));
        assert_eq!(Command::try_from(0x7F), Err(0x7F));
    }

    #[test]
    fn test_read_and_ack_classes() {
        assert!(Command::VariableRead.is_read());
        assert!(Command::RegisterRead.is_read());
        assert!(!Command::VariableWrite.is_read());
        assert!(!Command::CurveWrite.is_read());

        assert!(Command::VariableWrite.acknowledges());
        assert!(Command::RegisterWrite.acknowledges());
        assert!(!Command::CurveWrite.acknowledges());
        assert!(!Command::VariableRead.acknowledges());
    }
}
