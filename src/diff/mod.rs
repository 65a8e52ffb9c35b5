//! Requirement differencing
//!
//! Aligns two requirement groups row by row so they can be shown side by
//! side. Exact matches are paired first, then requirements reading the same
//! address that differ in only a few aspects are paired as modifications.
//! Whatever is left over is reported as added or removed at the position
//! closest to its neighbours.

mod align;
mod normalize;

pub use align::{diff_groups, distance};

use crate::codec::{render_requirement, RenderOptions};
use crate::requirements::{Requirement, RequirementGroup, Trigger};
use serde::{Deserialize, Serialize};

/// Tuning for the keyed pairing pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffOptions {
    /// Largest [`distance`] at which two same-address requirements are still
    /// treated as one edited line
    pub max_distance: usize,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self { max_distance: 2 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RowState {
    Same,
    /// Present only on the right
    Added,
    /// Present only on the left
    Removed,
    Modified,
}

/// One aligned row; at least one side is present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffRow {
    pub left: Option<Requirement>,
    pub right: Option<Requirement>,
    pub state: RowState,
}

impl DiffRow {
    pub fn added(requirement: Requirement) -> Self {
        Self {
            left: None,
            right: Some(requirement),
            state: RowState::Added,
        }
    }

    pub fn removed(requirement: Requirement) -> Self {
        Self {
            left: Some(requirement),
            right: None,
            state: RowState::Removed,
        }
    }

    /// Pseudocode for the left side, empty when absent
    pub fn left_text(&self, options: &RenderOptions) -> String {
        side_text(self.left.as_ref(), options)
    }

    /// Pseudocode for the right side, empty when absent
    pub fn right_text(&self, options: &RenderOptions) -> String {
        side_text(self.right.as_ref(), options)
    }
}

fn side_text(requirement: Option<&Requirement>, options: &RenderOptions) -> String {
    requirement
        .map(|r| render_requirement(r, options))
        .unwrap_or_default()
}

/// Rows for one labelled group ("Core", "Alt 1", ...)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupDiff {
    pub label: String,
    pub rows: Vec<DiffRow>,
}

impl GroupDiff {
    pub fn is_unchanged(&self) -> bool {
        self.rows.iter().all(|row| row.state == RowState::Same)
    }
}

/// Diff the core and every alternate of two triggers
///
/// Alternates are compared by position; an alternate missing on one side
/// diffs against an empty group.
pub fn diff_triggers(left: &Trigger, right: &Trigger, options: &DiffOptions) -> Vec<GroupDiff> {
    let empty = RequirementGroup::default();
    let mut diffs = vec![GroupDiff {
        label: "Core".to_string(),
        rows: diff_groups(&left.core, &right.core, options),
    }];

    let count = left.alternates.len().max(right.alternates.len());
    for index in 0..count {
        let l = left.alternates.get(index).unwrap_or(&empty);
        let r = right.alternates.get(index).unwrap_or(&empty);
        diffs.push(GroupDiff {
            label: format!("Alt {}", index + 1),
            rows: diff_groups(l, r, options),
        });
    }

    diffs
}

/// True when both triggers mean the same thing after normalization
///
/// Requirement order within a group matters here, since combining flags
/// bind to their neighbours.
pub fn triggers_equivalent(left: &Trigger, right: &Trigger) -> bool {
    left.alternates.len() == right.alternates.len()
        && left
            .groups()
            .zip(right.groups())
            .all(|(l, r)| normalize::normalize(l) == normalize::normalize(r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::parse_trigger;

    fn trigger(text: &str) -> Trigger {
        parse_trigger(text).unwrap()
    }

    #[test]
    fn test_modified_removed_added() {
        let rows = diff_groups(
            &trigger("0xH1234=7_0xH1235=6").core,
            &trigger("0xH1234=6_0xH1238=2").core,
            &DiffOptions::default(),
        );
        let options = RenderOptions::default();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].state, RowState::Modified);
        assert_eq!(rows[0].left_text(&options), "byte(0x001234) == 7");
        assert_eq!(rows[0].right_text(&options), "byte(0x001234) == 6");
        assert_eq!(rows[1].state, RowState::Removed);
        assert_eq!(rows[1].left_text(&options), "byte(0x001235) == 6");
        assert_eq!(rows[1].right_text(&options), "");
        assert_eq!(rows[2].state, RowState::Added);
        assert_eq!(rows[2].left_text(&options), "");
        assert_eq!(rows[2].right_text(&options), "byte(0x001238) == 2");
    }

    #[test]
    fn test_or_next_pause_matches_split_pause() {
        let rows = diff_groups(
            &trigger("P:0xH1234=7_P:0xH1235=6").core,
            &trigger("O:0xH1234=7_P:0xH1235=6").core,
            &DiffOptions::default(),
        );
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(|r| r.state == RowState::Same));
    }

    #[test]
    fn test_symmetric_states() {
        let a = trigger("0xH1234=7_0xH1235=6_R:0xH2=0");
        let b = trigger("0xH1234=6_0xH1238=2_R:0xH2=0");
        let options = DiffOptions::default();

        let count = |rows: &[DiffRow], state| rows.iter().filter(|r| r.state == state).count();
        let forward = diff_groups(&a.core, &b.core, &options);
        let backward = diff_groups(&b.core, &a.core, &options);

        assert_eq!(count(&forward, RowState::Added), count(&backward, RowState::Removed));
        assert_eq!(count(&forward, RowState::Removed), count(&backward, RowState::Added));
        assert_eq!(count(&forward, RowState::Modified), count(&backward, RowState::Modified));
        assert_eq!(count(&forward, RowState::Same), count(&backward, RowState::Same));
    }

    #[test]
    fn test_diff_triggers_labels_alternates() {
        let diffs = diff_triggers(
            &trigger("0xH1=1S0xH2=2"),
            &trigger("0xH1=1S0xH2=2S0xH3=3"),
            &DiffOptions::default(),
        );
        let labels: Vec<&str> = diffs.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Core", "Alt 1", "Alt 2"]);
        assert!(diffs[0].is_unchanged());
        assert!(diffs[1].is_unchanged());
        assert_eq!(diffs[2].rows[0].state, RowState::Added);
    }

    #[test]
    fn test_triggers_equivalent() {
        assert!(triggers_equivalent(
            &trigger("0xH1234=7_P:0xH1=1_P:0xH2=2"),
            &trigger("0xH1234=7_O:0xH1=1_P:0xH2=2"),
        ));
        assert!(triggers_equivalent(
            &trigger("0xH1234==h07"),
            &trigger("0xH001234=7"),
        ));
        assert!(!triggers_equivalent(
            &trigger("0xH1234=7"),
            &trigger("0xH1234=7S0xH1=1"),
        ));
        assert!(!triggers_equivalent(
            &trigger("A:0xH1_0xH2=2_0xH3=3"),
            &trigger("0xH2=2_A:0xH1_0xH3=3"),
        ));
    }
}
