//! Canonical trigger serialization

use super::parser::{ALT_SEPARATOR, REQUIREMENT_SEPARATOR, VALUE_SEPARATOR};
use super::size_code;
use crate::requirements::{FieldModifier, Operand, Requirement, RequirementGroup, Trigger};

/// Canonical operand text: decimal constants, six-digit lower-case addresses
pub fn serialize_operand(operand: &Operand) -> String {
    match operand {
        Operand::Value(value) => value.to_string(),
        Operand::Memory {
            address,
            size,
            modifier,
        } => {
            let prefix = match modifier {
                FieldModifier::Current => "",
                FieldModifier::Delta => "d",
                FieldModifier::Prior => "p",
                FieldModifier::Bcd => "b",
                FieldModifier::Invert => "~",
            };
            let (float, code) = size_code(*size);
            let base = if float { "f" } else { "0x" };
            format!("{}{}{}{:06x}", prefix, base, code, address)
        }
    }
}

pub fn serialize_requirement(requirement: &Requirement) -> String {
    let mut out = String::new();

    if let Some(prefix) = requirement.flag.prefix() {
        out.push(prefix);
        out.push(':');
    }

    out.push_str(&serialize_operand(&requirement.left));

    if let (Some(op), Some(right)) = (requirement.operator, requirement.right) {
        out.push_str(op.code());
        out.push_str(&serialize_operand(&right));
    }

    if requirement.hit_target > 0 {
        out.push_str(&format!(".{}.", requirement.hit_target));
    }

    out
}

pub fn serialize_group(group: &RequirementGroup) -> String {
    group
        .iter()
        .map(serialize_requirement)
        .collect::<Vec<_>>()
        .join(&REQUIREMENT_SEPARATOR.to_string())
}

/// Serialize an achievement trigger
pub fn serialize_trigger(trigger: &Trigger) -> String {
    serialize_groups(trigger, ALT_SEPARATOR)
}

/// Serialize a leaderboard value
pub fn serialize_value(value: &Trigger) -> String {
    serialize_groups(value, VALUE_SEPARATOR)
}

fn serialize_groups(trigger: &Trigger, separator: char) -> String {
    let mut out = serialize_group(&trigger.core);
    for alt in &trigger.alternates {
        out.push(separator);
        out.push_str(&serialize_group(alt));
    }
    out
}
