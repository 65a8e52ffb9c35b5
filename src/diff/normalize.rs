//! Semantic normalization applied before comparing requirements

use crate::requirements::{Requirement, RequirementFlag, RequirementGroup};

/// Rewrite OrNext chains that end in PauseIf/ResetIf into independent
/// PauseIf/ResetIf requirements
///
/// `O:A_P:B` pauses when A or B is true, which is exactly what `P:A_P:B`
/// does. The rewrite only holds when no requirement in the chain tracks
/// hits.
pub(crate) fn normalize(group: &RequirementGroup) -> Vec<Requirement> {
    let source = &group.requirements;
    let mut normalized = source.clone();

    let mut index = 0;
    while index < source.len() {
        if source[index].flag != RequirementFlag::OrNext {
            index += 1;
            continue;
        }

        let start = index;
        let mut end = index;
        while end < source.len() && source[end].flag == RequirementFlag::OrNext {
            end += 1;
        }

        if let Some(terminal) = source.get(end) {
            let splittable = matches!(
                terminal.flag,
                RequirementFlag::PauseIf | RequirementFlag::ResetIf
            ) && source[start..=end].iter().all(|r| r.hit_target == 0);

            if splittable {
                for requirement in &mut normalized[start..end] {
                    requirement.flag = terminal.flag;
                }
            }
        }

        index = end;
    }

    normalized
}
