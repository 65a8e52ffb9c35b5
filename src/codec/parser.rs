//! Trigger text parser

use super::{size_from_code, ParseError};
use crate::requirements::{
    FieldModifier, FieldSize, Operand, Operator, Requirement, RequirementFlag, RequirementGroup,
    Trigger,
};

/// Separates alternate groups in achievement triggers
pub const ALT_SEPARATOR: char = 'S';
/// Separates alternate groups in leaderboard values
pub const VALUE_SEPARATOR: char = '$';
/// Separates requirements within a group
pub const REQUIREMENT_SEPARATOR: char = '_';

/// Parser over a single trigger string
///
/// Positions in errors are relative to the origin passed to
/// [`TriggerParser::with_origin`], so a trigger embedded in a larger file
/// reports file coordinates.
pub struct TriggerParser {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    group_separator: char,
}

impl TriggerParser {
    pub fn new(source: &str) -> Self {
        Self::with_origin(source, 1, 1)
    }

    /// Parser whose first character sits at `line`/`column`
    pub fn with_origin(source: &str, line: usize, column: usize) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line,
            column,
            group_separator: ALT_SEPARATOR,
        }
    }

    /// Use `$` between groups, as leaderboard values do
    pub fn value_mode(mut self) -> Self {
        self.group_separator = VALUE_SEPARATOR;
        self
    }

    /// Parse the complete input as a trigger
    pub fn parse_trigger(&mut self) -> Result<Trigger, ParseError> {
        let mut groups = Vec::new();

        loop {
            groups.push(self.parse_group()?);

            if self.match_char(self.group_separator) {
                continue;
            }

            match self.peek() {
                None => break,
                Some(c) => return Err(self.error(format!("Unexpected character '{}'", c))),
            }
        }

        let mut groups = groups.into_iter();
        let core = groups.next().unwrap_or_default();
        Ok(Trigger::new(core, groups.collect()))
    }

    /// Parse the complete input as one requirement
    pub fn parse_single(&mut self) -> Result<Requirement, ParseError> {
        let requirement = self.parse_requirement()?;
        match self.peek() {
            None => Ok(requirement),
            Some(c) => Err(self.error(format!("Unexpected character '{}'", c))),
        }
    }

    fn parse_group(&mut self) -> Result<RequirementGroup, ParseError> {
        let mut group = RequirementGroup::default();

        if self.is_at_end() || self.peek() == Some(self.group_separator) {
            return Ok(group);
        }

        loop {
            group.push(self.parse_requirement()?);
            if !self.match_char(REQUIREMENT_SEPARATOR) {
                break;
            }
        }

        Ok(group)
    }

    fn parse_requirement(&mut self) -> Result<Requirement, ParseError> {
        let flag = self.parse_flag()?;
        let left = self.parse_operand()?;

        let (operator, right) = match self.parse_operator()? {
            Some(op) => (Some(op), Some(self.parse_operand()?)),
            None => (None, None),
        };

        if operator.is_none() && !flag.allows_bare_operand() {
            return Err(match self.peek() {
                None => self.error("Expected comparison operator, found end of input"),
                Some(c) => self.error(format!("Expected comparison operator, found '{}'", c)),
            });
        }

        let hit_target = self.parse_hit_suffix()?;

        Ok(Requirement {
            flag,
            left,
            operator,
            right,
            hit_target,
        })
    }

    fn parse_flag(&mut self) -> Result<RequirementFlag, ParseError> {
        match (self.peek(), self.peek_at(1)) {
            (Some(c), Some(':')) if c.is_ascii_alphabetic() => {
                let flag = RequirementFlag::from_prefix(c)
                    .ok_or_else(|| self.error(format!("Unknown flag '{}'", c)))?;
                self.pos += 2;
                Ok(flag)
            }
            _ => Ok(RequirementFlag::None),
        }
    }

    fn parse_operand(&mut self) -> Result<Operand, ParseError> {
        let modifier = match self.peek() {
            Some('d') => FieldModifier::Delta,
            Some('p') => FieldModifier::Prior,
            Some('b') => FieldModifier::Bcd,
            Some('~') => FieldModifier::Invert,
            _ => FieldModifier::Current,
        };
        if modifier != FieldModifier::Current {
            self.pos += 1;
        }

        let float_size = match (self.peek(), self.peek_at(1)) {
            (Some('f'), Some(code)) => size_from_code(true, code),
            _ => None,
        };
        if let Some(size) = float_size {
            self.pos += 2;
            let address = self.parse_hex("Expected hex address")?;
            return Ok(Operand::with_modifier(address, size, modifier));
        }

        match (self.peek(), self.peek_at(1)) {
            (Some('0'), Some('x' | 'X')) => {
                self.pos += 2;
                let size = self.parse_memory_size()?;
                let address = self.parse_hex("Expected hex address")?;
                Ok(Operand::with_modifier(address, size, modifier))
            }
            _ if modifier != FieldModifier::Current => {
                Err(self.error("Expected memory reference after modifier"))
            }
            (Some('h' | 'H'), _) => {
                self.pos += 1;
                Ok(Operand::Value(self.parse_hex("Expected hex digits")?))
            }
            (Some(c), _) if c.is_ascii_digit() => {
                Ok(Operand::Value(self.parse_decimal("Expected value")?))
            }
            (Some(c), _) => Err(self.error(format!("Unexpected character '{}'", c))),
            (None, _) => Err(self.error("Unexpected end of input")),
        }
    }

    fn parse_memory_size(&mut self) -> Result<FieldSize, ParseError> {
        match self.peek() {
            Some(' ') => {
                self.pos += 1;
                Ok(FieldSize::Word)
            }
            Some(c) if c.is_ascii_hexdigit() => Ok(FieldSize::Word),
            Some(c) => {
                let size = size_from_code(false, c.to_ascii_uppercase())
                    .ok_or_else(|| self.error(format!("Unknown size '{}'", c)))?;
                self.pos += 1;
                Ok(size)
            }
            None => Err(self.error("Unexpected end of input")),
        }
    }

    fn parse_operator(&mut self) -> Result<Option<Operator>, ParseError> {
        let op = match self.peek() {
            Some('=') => {
                self.pos += 1;
                self.match_char('=');
                Operator::Equal
            }
            Some('!') => {
                self.pos += 1;
                if !self.match_char('=') {
                    return Err(self.error("Expected '=' after '!'"));
                }
                Operator::NotEqual
            }
            Some('<') => {
                self.pos += 1;
                if self.match_char('=') {
                    Operator::LessThanOrEqual
                } else {
                    Operator::LessThan
                }
            }
            Some('>') => {
                self.pos += 1;
                if self.match_char('=') {
                    Operator::GreaterThanOrEqual
                } else {
                    Operator::GreaterThan
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(op))
    }

    fn parse_hit_suffix(&mut self) -> Result<u32, ParseError> {
        let close = if self.match_char('.') {
            '.'
        } else if self.match_char('(') {
            ')'
        } else {
            return Ok(0);
        };

        let hits = self.parse_decimal("Expected hit count")?;
        if !self.match_char(close) {
            return Err(self.error("Truncated hit count"));
        }
        Ok(hits)
    }

    fn parse_hex(&mut self, expected: &str) -> Result<u32, ParseError> {
        self.parse_number(16, expected)
    }

    fn parse_decimal(&mut self, expected: &str) -> Result<u32, ParseError> {
        self.parse_number(10, expected)
    }

    fn parse_number(&mut self, radix: u32, expected: &str) -> Result<u32, ParseError> {
        let start = self.pos;
        let mut value: u64 = 0;

        while let Some(digit) = self.peek().and_then(|c| c.to_digit(radix)) {
            value = value * u64::from(radix) + u64::from(digit);
            if value > u64::from(u32::MAX) {
                return Err(self.error_at(start, "Number out of range"));
            }
            self.pos += 1;
        }

        if self.pos == start {
            return Err(self.error(expected));
        }

        // bounded by the check above
        Ok(value as u32)
    }

    // Helper methods

    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn match_char(&mut self, expected: char) -> bool {
        if self.peek() == Some(expected) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn is_at_end(&self) -> bool {
        self.pos >= self.chars.len()
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        self.error_at(self.pos, message)
    }

    fn error_at(&self, pos: usize, message: impl Into<String>) -> ParseError {
        ParseError::new(message, self.line, self.column + pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> Result<Trigger, ParseError> {
        TriggerParser::new(text).parse_trigger()
    }

    #[test]
    fn test_parse_simple_comparison() {
        let trigger = parse("0xH1234=7").unwrap();
        assert!(trigger.alternates.is_empty());
        assert_eq!(
            trigger.core.requirements,
            vec![Requirement::compare(
                Operand::memory(0x1234, FieldSize::Byte),
                Operator::Equal,
                Operand::Value(7),
            )]
        );
    }

    #[test]
    fn test_parse_sizes() {
        let cases = [
            ("0xM1=1", FieldSize::Bit0),
            ("0xT1=1", FieldSize::Bit7),
            ("0xL1=1", FieldSize::LowNibble),
            ("0xU1=1", FieldSize::HighNibble),
            ("0x 1=1", FieldSize::Word),
            ("0x1=1", FieldSize::Word),
            ("0xW1=1", FieldSize::TByte),
            ("0xX1=1", FieldSize::DWord),
            ("0xI1=1", FieldSize::WordBigEndian),
            ("0xJ1=1", FieldSize::TByteBigEndian),
            ("0xG1=1", FieldSize::DWordBigEndian),
            ("0xK1=1", FieldSize::BitCount),
            ("fF1=1", FieldSize::Float),
            ("fB1=1", FieldSize::FloatBigEndian),
            ("fH1=1", FieldSize::Double32),
            ("fI1=1", FieldSize::Double32BigEndian),
            ("fM1=1", FieldSize::Mbf32),
            ("fL1=1", FieldSize::Mbf32LittleEndian),
        ];

        for (text, size) in cases {
            let trigger = parse(text).unwrap();
            assert_eq!(
                trigger.core.requirements[0].left,
                Operand::memory(1, size),
                "size for {}",
                text
            );
        }
    }

    #[test]
    fn test_parse_modifiers() {
        let trigger = parse("d0xH10>p0xH10_b0xH11=~0xH12").unwrap();
        let reqs = &trigger.core.requirements;
        assert_eq!(
            reqs[0].left,
            Operand::with_modifier(0x10, FieldSize::Byte, FieldModifier::Delta)
        );
        assert_eq!(
            reqs[0].right,
            Some(Operand::with_modifier(0x10, FieldSize::Byte, FieldModifier::Prior))
        );
        assert_eq!(reqs[0].operator, Some(Operator::GreaterThan));
        assert_eq!(
            reqs[1].left,
            Operand::with_modifier(0x11, FieldSize::Byte, FieldModifier::Bcd)
        );
        assert_eq!(
            reqs[1].right,
            Some(Operand::with_modifier(0x12, FieldSize::Byte, FieldModifier::Invert))
        );
    }

    #[test]
    fn test_parse_flags_and_hits() {
        let trigger = parse("R:0xH1234=7_P:0xH1235!=0.10._A:0xH1236_0xH1237>=h1F(3)").unwrap();
        let reqs = &trigger.core.requirements;
        assert_eq!(reqs.len(), 4);
        assert_eq!(reqs[0].flag, RequirementFlag::ResetIf);
        assert_eq!(reqs[1].flag, RequirementFlag::PauseIf);
        assert_eq!(reqs[1].hit_target, 10);
        assert_eq!(reqs[2].flag, RequirementFlag::AddSource);
        assert!(reqs[2].operator.is_none());
        assert_eq!(reqs[3].right, Some(Operand::Value(0x1F)));
        assert_eq!(reqs[3].hit_target, 3);
    }

    #[test]
    fn test_parse_alternates() {
        let trigger = parse("0xH1=1S0xH2=2_0xH3=3S0xH4=4").unwrap();
        assert_eq!(trigger.core.len(), 1);
        assert_eq!(trigger.alternates.len(), 2);
        assert_eq!(trigger.alternates[0].len(), 2);
    }

    #[test]
    fn test_parse_empty_core() {
        let trigger = parse("S0xH2=2").unwrap();
        assert!(trigger.core.is_empty());
        assert_eq!(trigger.alternates.len(), 1);

        let empty = parse("").unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_parse_value_mode() {
        let mut parser = TriggerParser::new("M:0xH1$M:0xH2").value_mode();
        let value = parser.parse_trigger().unwrap();
        assert_eq!(value.alternates.len(), 1);
        assert_eq!(value.core.requirements[0].flag, RequirementFlag::Measured);
    }

    #[test]
    fn test_unknown_flag() {
        let err = parse("0xH1=1_X:0xH2=2").unwrap_err();
        assert_eq!(err.message, "Unknown flag 'X'");
        assert_eq!(err.column, 8);
    }

    #[test]
    fn test_malformed_hex() {
        let err = parse("0xHZZ=1").unwrap_err();
        assert_eq!(err.message, "Expected hex address");
        assert_eq!(err.column, 4);
    }

    #[test]
    fn test_truncated_hit_count() {
        let err = parse("0xH1=1.5").unwrap_err();
        assert_eq!(err.message, "Truncated hit count");

        let err = parse("0xH1=1.").unwrap_err();
        assert_eq!(err.message, "Expected hit count");
    }

    #[test]
    fn test_truncated_input() {
        let err = parse("0xH1234=").unwrap_err();
        assert_eq!(err.message, "Unexpected end of input");
        assert_eq!(err.column, 9);

        assert!(parse("0xH1=1_").is_err());
    }

    #[test]
    fn test_missing_operator() {
        let err = parse("0xH1234").unwrap_err();
        assert!(err.message.starts_with("Expected comparison operator"));
    }

    #[test]
    fn test_origin_offsets_positions() {
        let err = TriggerParser::with_origin("0xQQ1=1", 3, 10)
            .parse_trigger()
            .unwrap_err();
        assert_eq!(err.line, 3);
        assert_eq!(err.column, 13);
    }

    #[test]
    fn test_address_out_of_range() {
        let err = parse("0xH123456789=1").unwrap_err();
        assert_eq!(err.message, "Number out of range");
    }
}
