//! Row alignment between two requirement groups

use super::normalize::normalize;
use super::{DiffOptions, DiffRow, RowState};
use crate::requirements::{Requirement, RequirementGroup};

/// Number of differing aspects among flag, left operand, operator, right
/// operand and hit target
pub fn distance(a: &Requirement, b: &Requirement) -> usize {
    [
        a.flag != b.flag,
        a.left != b.left,
        a.operator != b.operator,
        a.right != b.right,
        a.hit_target != b.hit_target,
    ]
    .iter()
    .filter(|differs| **differs)
    .count()
}

/// Align `left` ("this") against `right` ("other")
///
/// Left-only rows are [`RowState::Removed`], right-only rows are
/// [`RowState::Added`]. Every item of both sides appears in exactly one row.
pub fn diff_groups(
    left: &RequirementGroup,
    right: &RequirementGroup,
    options: &DiffOptions,
) -> Vec<DiffRow> {
    let left_norm = normalize(left);
    let right_norm = normalize(right);

    let mut pairing: Vec<Option<usize>> = vec![None; left_norm.len()];
    let mut consumed = vec![false; right_norm.len()];

    // exact matches
    for (i, requirement) in left_norm.iter().enumerate() {
        let found = (0..right_norm.len()).find(|&j| !consumed[j] && right_norm[j] == *requirement);
        if let Some(j) = found {
            pairing[i] = Some(j);
            consumed[j] = true;
        }
    }

    // same address, close enough to be the same line edited
    for (i, requirement) in left_norm.iter().enumerate() {
        if pairing[i].is_some() {
            continue;
        }

        let key = requirement.primary_address();
        let found = (0..right_norm.len()).find(|&j| {
            !consumed[j]
                && right_norm[j].primary_address() == key
                && distance(requirement, &right_norm[j]) <= options.max_distance
        });

        if let Some(j) = found {
            pairing[i] = Some(j);
            consumed[j] = true;
        } else {
            log::trace!("No pairing for left requirement {} (key {:?})", i, key);
        }
    }

    let rows: Vec<DiffRow> = left
        .iter()
        .enumerate()
        .map(|(i, requirement)| match pairing[i] {
            Some(j) => DiffRow {
                left: Some(requirement.clone()),
                right: Some(right.requirements[j].clone()),
                state: if left_norm[i] == right_norm[j] {
                    RowState::Same
                } else {
                    RowState::Modified
                },
            },
            None => DiffRow::removed(requirement.clone()),
        })
        .collect();

    // row index of each matched right item; rows are still in left order
    let mut right_row: Vec<Option<usize>> = vec![None; right_norm.len()];
    for (i, paired) in pairing.iter().enumerate() {
        if let Some(j) = paired {
            right_row[*j] = Some(i);
        }
    }

    let mut insertions: Vec<(usize, usize)> = Vec::new();
    for j in (0..right_norm.len()).filter(|&j| !consumed[j]) {
        let anchor = (0..j).rev().find_map(|k| right_row[k]);
        let mut position = anchor.map_or(0, |row| row + 1);
        while position < rows.len() && rows[position].right.is_none() {
            position += 1;
        }
        insertions.push((position, j));
    }
    // crossed pairings leave positions out of order
    insertions.sort_by_key(|(position, _)| *position);

    let mut result = Vec::with_capacity(rows.len() + insertions.len());
    let mut pending = insertions.into_iter().peekable();
    for (index, row) in rows.into_iter().enumerate() {
        while let Some((_, j)) = pending.next_if(|(position, _)| *position <= index) {
            result.push(DiffRow::added(right.requirements[j].clone()));
        }
        result.push(row);
    }
    for (_, j) in pending {
        result.push(DiffRow::added(right.requirements[j].clone()));
    }

    result
}
