//! Trigger codec
//!
//! Converts between the compact textual trigger encoding and the
//! requirement model. Requirements can also be rendered as pseudocode.
//!
//! # Example
//!
//! ```text
//! R:0xH001234=7_0xH001235>=d0xH001235.10.S0x 002000=1
//! ```
//!
//! is a core group with a reset condition and a hit-counted comparison,
//! plus one alternate group reading a 16-bit value.

mod error;
mod parser;
mod render;
mod serializer;

pub use error::ParseError;
pub use parser::{TriggerParser, ALT_SEPARATOR, REQUIREMENT_SEPARATOR, VALUE_SEPARATOR};
pub use render::{
    render_group, render_notes, render_operand, render_requirement, CodeNotes, NumberFormat,
    RenderOptions,
};
pub use serializer::{
    serialize_group, serialize_operand, serialize_requirement, serialize_trigger, serialize_value,
};

use crate::requirements::{FieldSize, Requirement, Trigger};

/// Size codes: (size, float prefix, code character)
///
/// Integer sizes follow `0x`, float sizes follow `f`. `Word` has no code
/// character of its own; it serializes as a space.
const SIZE_CODES: [(FieldSize, bool, char); 24] = [
    (FieldSize::Bit0, false, 'M'),
    (FieldSize::Bit1, false, 'N'),
    (FieldSize::Bit2, false, 'O'),
    (FieldSize::Bit3, false, 'P'),
    (FieldSize::Bit4, false, 'Q'),
    (FieldSize::Bit5, false, 'R'),
    (FieldSize::Bit6, false, 'S'),
    (FieldSize::Bit7, false, 'T'),
    (FieldSize::LowNibble, false, 'L'),
    (FieldSize::HighNibble, false, 'U'),
    (FieldSize::Byte, false, 'H'),
    (FieldSize::Word, false, ' '),
    (FieldSize::TByte, false, 'W'),
    (FieldSize::DWord, false, 'X'),
    (FieldSize::WordBigEndian, false, 'I'),
    (FieldSize::TByteBigEndian, false, 'J'),
    (FieldSize::DWordBigEndian, false, 'G'),
    (FieldSize::BitCount, false, 'K'),
    (FieldSize::Float, true, 'F'),
    (FieldSize::FloatBigEndian, true, 'B'),
    (FieldSize::Double32, true, 'H'),
    (FieldSize::Double32BigEndian, true, 'I'),
    (FieldSize::Mbf32, true, 'M'),
    (FieldSize::Mbf32LittleEndian, true, 'L'),
];

fn size_from_code(float: bool, code: char) -> Option<FieldSize> {
    SIZE_CODES
        .iter()
        .find(|(_, is_float, c)| *is_float == float && *c == code)
        .map(|(size, _, _)| *size)
}

fn size_code(size: FieldSize) -> (bool, char) {
    SIZE_CODES
        .iter()
        .find(|(s, _, _)| *s == size)
        .map(|(_, is_float, c)| (*is_float, *c))
        .unwrap_or((false, 'H'))
}

/// Parse an achievement trigger (`S` between groups)
pub fn parse_trigger(text: &str) -> Result<Trigger, ParseError> {
    TriggerParser::new(text).parse_trigger()
}

/// Parse a leaderboard value (`$` between groups)
pub fn parse_value(text: &str) -> Result<Trigger, ParseError> {
    TriggerParser::new(text).value_mode().parse_trigger()
}

/// Parse exactly one requirement
pub fn parse_requirement(text: &str) -> Result<Requirement, ParseError> {
    TriggerParser::new(text).parse_single()
}
