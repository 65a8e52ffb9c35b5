//! A single condition line and its flag/operator vocabulary

use super::Operand;
use serde::{Deserialize, Serialize};

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Operator {
    Equal,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl Operator {
    /// Compare two values using this operator
    pub fn compare<T: PartialOrd>(&self, a: &T, b: &T) -> bool {
        match self {
            Operator::Equal => a == b,
            Operator::NotEqual => a != b,
            Operator::LessThan => a < b,
            Operator::LessThanOrEqual => a <= b,
            Operator::GreaterThan => a > b,
            Operator::GreaterThanOrEqual => a >= b,
        }
    }

    /// Token used by the compact encoding
    pub fn code(&self) -> &'static str {
        match self {
            Operator::Equal => "=",
            Operator::NotEqual => "!=",
            Operator::LessThan => "<",
            Operator::LessThanOrEqual => "<=",
            Operator::GreaterThan => ">",
            Operator::GreaterThanOrEqual => ">=",
        }
    }

    /// Token used by the pseudocode renderer
    pub fn symbol(&self) -> &'static str {
        match self {
            Operator::Equal => "==",
            other => other.code(),
        }
    }
}

/// Behavior tag attached to a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RequirementFlag {
    #[default]
    None,
    ResetIf,
    PauseIf,
    AddSource,
    SubSource,
    AddHits,
    SubHits,
    AndNext,
    OrNext,
    Measured,
    MeasuredPercent,
    MeasuredIf,
    Trigger,
    Remember,
}

impl RequirementFlag {
    /// All flags, in prefix-table order
    pub const ALL: [RequirementFlag; 14] = [
        RequirementFlag::None,
        RequirementFlag::ResetIf,
        RequirementFlag::PauseIf,
        RequirementFlag::AddSource,
        RequirementFlag::SubSource,
        RequirementFlag::AddHits,
        RequirementFlag::SubHits,
        RequirementFlag::AndNext,
        RequirementFlag::OrNext,
        RequirementFlag::Measured,
        RequirementFlag::MeasuredPercent,
        RequirementFlag::MeasuredIf,
        RequirementFlag::Trigger,
        RequirementFlag::Remember,
    ];

    /// Prefix letter, `None` for standalone requirements
    pub fn prefix(&self) -> Option<char> {
        match self {
            RequirementFlag::None => None,
            RequirementFlag::ResetIf => Some('R'),
            RequirementFlag::PauseIf => Some('P'),
            RequirementFlag::AddSource => Some('A'),
            RequirementFlag::SubSource => Some('B'),
            RequirementFlag::AddHits => Some('C'),
            RequirementFlag::SubHits => Some('D'),
            RequirementFlag::AndNext => Some('N'),
            RequirementFlag::OrNext => Some('O'),
            RequirementFlag::Measured => Some('M'),
            RequirementFlag::MeasuredPercent => Some('G'),
            RequirementFlag::MeasuredIf => Some('Q'),
            RequirementFlag::Trigger => Some('T'),
            RequirementFlag::Remember => Some('K'),
        }
    }

    /// Parse a prefix letter
    pub fn from_prefix(c: char) -> Option<Self> {
        Self::ALL.iter().copied().find(|f| f.prefix() == Some(c))
    }

    /// Flags that may stand without a comparison
    pub fn allows_bare_operand(&self) -> bool {
        matches!(
            self,
            RequirementFlag::AddSource
                | RequirementFlag::SubSource
                | RequirementFlag::Measured
                | RequirementFlag::MeasuredPercent
                | RequirementFlag::Remember
        )
    }
}

/// One condition line
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(default)]
    pub flag: RequirementFlag,
    pub left: Operand,
    /// Present iff `right` is present
    #[serde(default)]
    pub operator: Option<Operator>,
    #[serde(default)]
    pub right: Option<Operand>,
    /// 0 means no hit count is tracked
    #[serde(default)]
    pub hit_target: u32,
}

impl Requirement {
    /// Standalone comparison
    pub fn compare(left: Operand, operator: Operator, right: Operand) -> Self {
        Self {
            flag: RequirementFlag::None,
            left,
            operator: Some(operator),
            right: Some(right),
            hit_target: 0,
        }
    }

    /// Requirement without a comparison (AddSource, Measured, ...)
    pub fn bare(flag: RequirementFlag, left: Operand) -> Self {
        Self {
            flag,
            left,
            operator: None,
            right: None,
            hit_target: 0,
        }
    }

    /// Set the flag
    pub fn with_flag(mut self, flag: RequirementFlag) -> Self {
        self.flag = flag;
        self
    }

    /// Set the hit target
    pub fn with_hits(mut self, hit_target: u32) -> Self {
        self.hit_target = hit_target;
        self
    }

    /// Address used to align requirements across versions
    pub fn primary_address(&self) -> Option<u32> {
        self.left
            .address()
            .or_else(|| self.right.and_then(|r| r.address()))
    }

    /// Every memory address read by this requirement, left first
    pub fn addresses(&self) -> Vec<u32> {
        let mut addresses = Vec::with_capacity(2);
        if let Some(address) = self.left.address() {
            addresses.push(address);
        }
        if let Some(address) = self.right.and_then(|r| r.address()) {
            if !addresses.contains(&address) {
                addresses.push(address);
            }
        }
        addresses
    }

    /// Truth of a constant-vs-constant comparison
    pub fn constant_truth(&self) -> Option<bool> {
        let (Operand::Value(l), Some(op), Some(Operand::Value(r))) =
            (self.left, self.operator, self.right)
        else {
            return None;
        };
        Some(op.compare(&l, &r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::requirements::FieldSize;

    #[test]
    fn test_prefix_table_is_bijective() {
        for flag in RequirementFlag::ALL {
            match flag.prefix() {
                Some(c) => assert_eq!(RequirementFlag::from_prefix(c), Some(flag)),
                None => assert_eq!(flag, RequirementFlag::None),
            }
        }
        assert_eq!(RequirementFlag::from_prefix('X'), None);
    }

    #[test]
    fn test_primary_address_prefers_left() {
        let req = Requirement::compare(
            Operand::memory(0x10, FieldSize::Byte),
            Operator::Equal,
            Operand::memory(0x20, FieldSize::Byte),
        );
        assert_eq!(req.primary_address(), Some(0x10));
        assert_eq!(req.addresses(), vec![0x10, 0x20]);

        let req = Requirement::compare(
            Operand::Value(3),
            Operator::LessThan,
            Operand::memory(0x20, FieldSize::Word),
        );
        assert_eq!(req.primary_address(), Some(0x20));
    }

    #[test]
    fn test_constant_truth() {
        let always = Requirement::compare(Operand::Value(1), Operator::Equal, Operand::Value(1));
        let never = Requirement::compare(Operand::Value(0), Operator::Equal, Operand::Value(1));
        assert_eq!(always.constant_truth(), Some(true));
        assert_eq!(never.constant_truth(), Some(false));

        let mem = Requirement::compare(
            Operand::memory(1, FieldSize::Byte),
            Operator::Equal,
            Operand::Value(1),
        );
        assert_eq!(mem.constant_truth(), None);
    }

    #[test]
    fn test_operator_symbols() {
        assert_eq!(Operator::Equal.code(), "=");
        assert_eq!(Operator::Equal.symbol(), "==");
        assert_eq!(Operator::GreaterThanOrEqual.symbol(), ">=");
        assert!(Operator::LessThanOrEqual.compare(&3, &3));
    }
}
