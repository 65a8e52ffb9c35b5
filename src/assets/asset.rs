//! Achievement and leaderboard definitions

use crate::diff::triggers_equivalent;
use crate::requirements::Trigger;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// First id handed out to assets that only exist locally
pub const FIRST_LOCAL_ID: u32 = 111_000_000;

/// Where an asset snapshot came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    Core,
    Unofficial,
    #[default]
    Local,
}

impl Category {
    /// Category for a published `Flags` value
    pub fn from_flags(flags: u32) -> Option<Self> {
        match flags {
            3 => Some(Category::Core),
            5 => Some(Category::Unofficial),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Core => "Core",
            Category::Unofficial => "Unofficial",
            Category::Local => "Local",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AssetKind {
    Achievement,
    Leaderboard,
}

impl AssetKind {
    /// Lower-case name used in user-facing messages
    pub fn type_name(&self) -> &'static str {
        match self {
            AssetKind::Achievement => "achievement",
            AssetKind::Leaderboard => "leaderboard",
        }
    }
}

/// The four triggers of a leaderboard plus how its value is shown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardSlots {
    pub start: Trigger,
    pub cancel: Trigger,
    pub submit: Trigger,
    pub value: Trigger,
    #[serde(default)]
    pub format: String,
    #[serde(default)]
    pub lower_is_better: bool,
}

impl LeaderboardSlots {
    /// Slots in file order: start, cancel, submit, value
    pub fn triggers(&self) -> [&Trigger; 4] {
        [&self.start, &self.cancel, &self.submit, &self.value]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AssetBody {
    Achievement(Trigger),
    Leaderboard(LeaderboardSlots),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// 0 until an id is assigned
    #[serde(default)]
    pub id: u32,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub points: u32,
    #[serde(default)]
    pub badge_name: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub category: Category,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub created: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    pub modified: Option<DateTime<Utc>>,
    pub body: AssetBody,
}

impl Asset {
    pub fn achievement(title: impl Into<String>, trigger: Trigger) -> Self {
        Self::with_body(title, AssetBody::Achievement(trigger))
    }

    pub fn leaderboard(title: impl Into<String>, slots: LeaderboardSlots) -> Self {
        Self::with_body(title, AssetBody::Leaderboard(slots))
    }

    fn with_body(title: impl Into<String>, body: AssetBody) -> Self {
        Self {
            id: 0,
            title: title.into(),
            description: String::new(),
            points: 0,
            badge_name: String::new(),
            author: String::new(),
            category: Category::Local,
            created: None,
            modified: None,
            body,
        }
    }

    pub fn with_id(mut self, id: u32) -> Self {
        self.id = id;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_points(mut self, points: u32) -> Self {
        self.points = points;
        self
    }

    pub fn with_badge(mut self, badge_name: impl Into<String>) -> Self {
        self.badge_name = badge_name.into();
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn kind(&self) -> AssetKind {
        match self.body {
            AssetBody::Achievement(_) => AssetKind::Achievement,
            AssetBody::Leaderboard(_) => AssetKind::Leaderboard,
        }
    }

    /// True when the id falls in the range reserved for unpublished assets
    pub fn is_local_id(&self, first_local_id: u32) -> bool {
        self.id >= first_local_id
    }

    /// Achievement trigger, if this is an achievement
    pub fn trigger(&self) -> Option<&Trigger> {
        match &self.body {
            AssetBody::Achievement(trigger) => Some(trigger),
            AssetBody::Leaderboard(_) => None,
        }
    }

    /// Compare logic only, ignoring titles and metadata
    pub fn content_equivalent(&self, other: &Asset) -> bool {
        match (&self.body, &other.body) {
            (AssetBody::Achievement(a), AssetBody::Achievement(b)) => triggers_equivalent(a, b),
            (AssetBody::Leaderboard(a), AssetBody::Leaderboard(b)) => {
                a.format == b.format
                    && a.lower_is_better == b.lower_is_better
                    && a
                        .triggers()
                        .iter()
                        .zip(b.triggers().iter())
                        .all(|(x, y)| triggers_equivalent(x, y))
            }
            _ => false,
        }
    }
}
