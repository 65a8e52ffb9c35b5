//! Operand definitions: constants and memory references

use serde::{Deserialize, Serialize};

/// Width and interpretation of a memory read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FieldSize {
    Bit0,
    Bit1,
    Bit2,
    Bit3,
    Bit4,
    Bit5,
    Bit6,
    Bit7,
    LowNibble,
    HighNibble,
    Byte,
    Word,
    TByte,
    DWord,
    WordBigEndian,
    TByteBigEndian,
    DWordBigEndian,
    BitCount,
    Float,
    FloatBigEndian,
    Double32,
    Double32BigEndian,
    Mbf32,
    Mbf32LittleEndian,
}

impl FieldSize {
    /// Number of bytes touched by a read of this size
    pub fn byte_width(&self) -> usize {
        match self {
            FieldSize::Bit0
            | FieldSize::Bit1
            | FieldSize::Bit2
            | FieldSize::Bit3
            | FieldSize::Bit4
            | FieldSize::Bit5
            | FieldSize::Bit6
            | FieldSize::Bit7
            | FieldSize::LowNibble
            | FieldSize::HighNibble
            | FieldSize::Byte
            | FieldSize::BitCount => 1,
            FieldSize::Word | FieldSize::WordBigEndian => 2,
            FieldSize::TByte | FieldSize::TByteBigEndian => 3,
            FieldSize::DWord
            | FieldSize::DWordBigEndian
            | FieldSize::Float
            | FieldSize::FloatBigEndian
            | FieldSize::Double32
            | FieldSize::Double32BigEndian
            | FieldSize::Mbf32
            | FieldSize::Mbf32LittleEndian => 4,
        }
    }

    /// Whether the read is interpreted as a floating point value
    pub fn is_float(&self) -> bool {
        matches!(
            self,
            FieldSize::Float
                | FieldSize::FloatBigEndian
                | FieldSize::Double32
                | FieldSize::Double32BigEndian
                | FieldSize::Mbf32
                | FieldSize::Mbf32LittleEndian
        )
    }

    /// Function name used by the pseudocode renderer
    pub fn function_name(&self) -> &'static str {
        match self {
            FieldSize::Bit0 => "bit0",
            FieldSize::Bit1 => "bit1",
            FieldSize::Bit2 => "bit2",
            FieldSize::Bit3 => "bit3",
            FieldSize::Bit4 => "bit4",
            FieldSize::Bit5 => "bit5",
            FieldSize::Bit6 => "bit6",
            FieldSize::Bit7 => "bit7",
            FieldSize::LowNibble => "low4",
            FieldSize::HighNibble => "high4",
            FieldSize::Byte => "byte",
            FieldSize::Word => "word",
            FieldSize::TByte => "tbyte",
            FieldSize::DWord => "dword",
            FieldSize::WordBigEndian => "word_be",
            FieldSize::TByteBigEndian => "tbyte_be",
            FieldSize::DWordBigEndian => "dword_be",
            FieldSize::BitCount => "bitcount",
            FieldSize::Float => "float",
            FieldSize::FloatBigEndian => "float_be",
            FieldSize::Double32 => "double32",
            FieldSize::Double32BigEndian => "double32_be",
            FieldSize::Mbf32 => "mbf32",
            FieldSize::Mbf32LittleEndian => "mbf32_le",
        }
    }
}

/// How the value at an address is sampled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FieldModifier {
    /// Value this frame
    #[default]
    Current,
    /// Value last frame
    Delta,
    /// Last value that differed from the current one
    Prior,
    /// Binary coded decimal decode of the current value
    Bcd,
    /// Bitwise inversion of the current value
    Invert,
}

/// One side of a condition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operand {
    /// Constant value
    Value(u32),

    /// Read from the emulated memory space
    Memory {
        address: u32,
        size: FieldSize,
        #[serde(default)]
        modifier: FieldModifier,
    },
}

impl Operand {
    /// Current-frame memory reference
    pub fn memory(address: u32, size: FieldSize) -> Self {
        Operand::Memory {
            address,
            size,
            modifier: FieldModifier::Current,
        }
    }

    /// Memory reference with an explicit modifier
    pub fn with_modifier(address: u32, size: FieldSize, modifier: FieldModifier) -> Self {
        Operand::Memory {
            address,
            size,
            modifier,
        }
    }

    /// Address of a memory operand
    pub fn address(&self) -> Option<u32> {
        match self {
            Operand::Memory { address, .. } => Some(*address),
            Operand::Value(_) => None,
        }
    }

    /// Constant of a value operand
    pub fn value(&self) -> Option<u32> {
        match self {
            Operand::Value(v) => Some(*v),
            Operand::Memory { .. } => None,
        }
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Operand::Memory { .. })
    }
}
