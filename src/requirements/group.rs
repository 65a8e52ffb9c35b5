//! Requirement groups and triggers

use super::Requirement;
use serde::{Deserialize, Serialize};

/// Ordered, AND-combined sequence of requirements
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequirementGroup {
    pub requirements: Vec<Requirement>,
}

impl RequirementGroup {
    pub fn new(requirements: Vec<Requirement>) -> Self {
        Self { requirements }
    }

    pub fn len(&self) -> usize {
        self.requirements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.requirements.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Requirement> {
        self.requirements.iter()
    }

    pub fn push(&mut self, requirement: Requirement) {
        self.requirements.push(requirement);
    }
}

impl From<Vec<Requirement>> for RequirementGroup {
    fn from(requirements: Vec<Requirement>) -> Self {
        Self::new(requirements)
    }
}

impl<'a> IntoIterator for &'a RequirementGroup {
    type Item = &'a Requirement;
    type IntoIter = std::slice::Iter<'a, Requirement>;

    fn into_iter(self) -> Self::IntoIter {
        self.requirements.iter()
    }
}

/// Core group plus OR-combined alternate groups
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Trigger {
    pub core: RequirementGroup,
    #[serde(default)]
    pub alternates: Vec<RequirementGroup>,
}

impl Trigger {
    pub fn new(core: RequirementGroup, alternates: Vec<RequirementGroup>) -> Self {
        Self { core, alternates }
    }

    /// Core first, then each alternate
    pub fn groups(&self) -> impl Iterator<Item = &RequirementGroup> {
        std::iter::once(&self.core).chain(self.alternates.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty() && self.alternates.is_empty()
    }

    /// Total number of requirements across all groups
    pub fn requirement_count(&self) -> usize {
        self.groups().map(|g| g.len()).sum()
    }
}
