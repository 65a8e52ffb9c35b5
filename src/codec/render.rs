//! Pseudocode rendering of requirements

use crate::requirements::{FieldModifier, Operand, Requirement, RequirementFlag, RequirementGroup};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// How constants are displayed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NumberFormat {
    #[default]
    Decimal,
    Hexadecimal,
}

/// Presentation settings passed to every render call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub number_format: NumberFormat,
}

/// Lookup of code notes by address
pub trait CodeNotes {
    fn note(&self, address: u32) -> Option<&str>;
}

impl CodeNotes for HashMap<u32, String> {
    fn note(&self, address: u32) -> Option<&str> {
        self.get(&address).map(|s| s.as_str())
    }
}

impl CodeNotes for BTreeMap<u32, String> {
    fn note(&self, address: u32) -> Option<&str> {
        self.get(&address).map(|s| s.as_str())
    }
}

pub fn render_operand(operand: &Operand, options: &RenderOptions) -> String {
    match operand {
        Operand::Value(value) => match options.number_format {
            NumberFormat::Decimal => value.to_string(),
            NumberFormat::Hexadecimal => format!("0x{:02X}", value),
        },
        Operand::Memory {
            address,
            size,
            modifier,
        } => {
            let read = format!("{}(0x{:06x})", size.function_name(), address);
            match modifier {
                FieldModifier::Current => read,
                FieldModifier::Delta => format!("prev({})", read),
                FieldModifier::Prior => format!("prior({})", read),
                FieldModifier::Bcd => format!("bcd({})", read),
                FieldModifier::Invert => format!("~{}", read),
            }
        }
    }
}

/// Render one requirement on its own
///
/// AddSource and SubSource render as a trailing `operand + ` fragment that
/// the caller joins with the next requirement; see [`render_group`].
pub fn render_requirement(requirement: &Requirement, options: &RenderOptions) -> String {
    render_with_accumulator(requirement, "", options)
}

/// Render a group, folding AddSource/SubSource chains into the requirement
/// that consumes them
pub fn render_group(group: &RequirementGroup, options: &RenderOptions) -> Vec<String> {
    let mut lines = Vec::with_capacity(group.len());
    let mut accumulator = String::new();

    for requirement in group {
        match requirement.flag {
            RequirementFlag::AddSource | RequirementFlag::SubSource => {
                accumulator.push_str(&render_requirement(requirement, options));
            }
            _ => {
                lines.push(render_with_accumulator(requirement, &accumulator, options));
                accumulator.clear();
            }
        }
    }

    if !accumulator.is_empty() {
        lines.push(accumulator.trim_end().to_string());
    }

    lines
}

/// Code notes for the addresses read by `requirement`, one line each
pub fn render_notes(requirement: &Requirement, notes: &dyn CodeNotes) -> Option<String> {
    let lines: Vec<String> = requirement
        .addresses()
        .into_iter()
        .filter_map(|address| {
            let note = notes.note(address)?;
            let first_line = note.lines().next().unwrap_or("").trim();
            Some(format!("0x{:06x}: {}", address, first_line))
        })
        .collect();

    if lines.is_empty() {
        None
    } else {
        Some(lines.join("\n"))
    }
}

fn render_with_accumulator(
    requirement: &Requirement,
    accumulator: &str,
    options: &RenderOptions,
) -> String {
    let left = render_operand(&requirement.left, options);

    match requirement.flag {
        RequirementFlag::AddSource => return format!("{} + ", left),
        RequirementFlag::SubSource => return format!("-{} + ", left),
        _ => {}
    }

    let condition = render_condition(requirement, accumulator, &left, options);
    let condition = match requirement.hit_target {
        0 => condition,
        1 => format!("once({})", condition),
        n => format!("repeated({}, {})", n, condition),
    };

    match requirement.flag {
        RequirementFlag::None => condition,
        RequirementFlag::ResetIf => format!("never({})", condition),
        RequirementFlag::PauseIf => format!("unless({})", condition),
        RequirementFlag::AddHits => format!("AddHits {}", condition),
        RequirementFlag::SubHits => format!("SubHits {}", condition),
        RequirementFlag::AndNext => format!("AndNext {}", condition),
        RequirementFlag::OrNext => format!("OrNext {}", condition),
        RequirementFlag::Measured => format!("measured({})", condition),
        RequirementFlag::MeasuredPercent => format!("measured({}, format=\"percent\")", condition),
        RequirementFlag::MeasuredIf => format!("measured_if({})", condition),
        RequirementFlag::Trigger => format!("trigger_when({})", condition),
        RequirementFlag::Remember => format!("remember({})", condition),
        // handled above
        RequirementFlag::AddSource | RequirementFlag::SubSource => condition,
    }
}

fn render_condition(
    requirement: &Requirement,
    accumulator: &str,
    left: &str,
    options: &RenderOptions,
) -> String {
    if accumulator.is_empty() {
        if let Some(truth) = requirement.constant_truth() {
            let text = if truth { "always_true()" } else { "always_false()" };
            return text.to_string();
        }
    }

    match (requirement.operator, requirement.right) {
        (Some(op), Some(right)) => format!(
            "{}{} {} {}",
            accumulator,
            left,
            op.symbol(),
            render_operand(&right, options)
        ),
        _ => format!("{}{}", accumulator, left),
    }
}
