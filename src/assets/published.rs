//! Read-only published asset snapshot (JSON)

use super::{Asset, AssetKind, Category, LeaderboardSlots};
use crate::codec::{ParseError, TriggerParser};
use crate::error::Result;
use crate::requirements::Trigger;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PublishedFile {
    #[serde(rename = "ID", default)]
    id: u32,
    #[serde(default)]
    title: String,
    #[serde(default)]
    achievements: Vec<serde_json::Value>,
    #[serde(default)]
    leaderboards: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PublishedAchievement {
    #[serde(rename = "ID")]
    id: u32,
    title: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    points: u32,
    #[serde(default)]
    badge_name: String,
    mem_addr: String,
    #[serde(default)]
    author: String,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    created: Option<DateTime<Utc>>,
    #[serde(default, with = "chrono::serde::ts_seconds_option")]
    modified: Option<DateTime<Utc>>,
    flags: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct PublishedLeaderboard {
    #[serde(rename = "ID")]
    id: u32,
    title: String,
    #[serde(default)]
    description: String,
    mem: String,
    #[serde(default)]
    format: String,
    #[serde(default)]
    lower_is_better: Option<Flag>,
}

/// `LowerIsBetter` appears both as a boolean and as 0/1
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Flag {
    Bool(bool),
    Number(i64),
}

impl Flag {
    fn is_set(&self) -> bool {
        match self {
            Flag::Bool(value) => *value,
            Flag::Number(value) => *value != 0,
        }
    }
}

/// Published achievements and leaderboards for one game
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublishedAssets {
    pub game_id: u32,
    pub title: String,
    pub achievements: Vec<Asset>,
    pub leaderboards: Vec<Asset>,
}

impl PublishedAssets {
    /// Parse a published snapshot
    ///
    /// A malformed document is an error. A malformed entry is skipped and
    /// reported; its error line is the 1-based position of the entry within
    /// its array.
    pub fn from_json(text: &str) -> Result<(Self, Vec<ParseError>)> {
        let file: PublishedFile = serde_json::from_str(text)?;
        let mut errors = Vec::new();

        let achievements = collect_entries(file.achievements, "achievement", &mut errors, read_achievement);
        let leaderboards = collect_entries(file.leaderboards, "leaderboard", &mut errors, read_leaderboard);

        log::debug!(
            "Read {} published achievements and {} leaderboards for game {}",
            achievements.len(),
            leaderboards.len(),
            file.id
        );

        Ok((
            Self {
                game_id: file.id,
                title: file.title,
                achievements,
                leaderboards,
            },
            errors,
        ))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<(Self, Vec<ParseError>)> {
        let text = fs::read_to_string(path.as_ref())?;
        Self::from_json(&text)
    }

    pub fn assets_of_kind(&self, kind: AssetKind) -> &[Asset] {
        match kind {
            AssetKind::Achievement => &self.achievements,
            AssetKind::Leaderboard => &self.leaderboards,
        }
    }

    pub fn get(&self, kind: AssetKind, id: u32) -> Option<&Asset> {
        self.assets_of_kind(kind).iter().find(|a| a.id == id)
    }
}

// Helper methods

fn collect_entries<T, F>(
    entries: Vec<serde_json::Value>,
    what: &str,
    errors: &mut Vec<ParseError>,
    convert: F,
) -> Vec<Asset>
where
    T: serde::de::DeserializeOwned,
    F: Fn(T, usize) -> std::result::Result<Asset, ParseError>,
{
    let mut assets = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let position = index + 1;
        let result = serde_json::from_value::<T>(entry)
            .map_err(|e| ParseError::new(format!("Invalid {} entry: {}", what, e), position, 1))
            .and_then(|raw| convert(raw, position));

        match result {
            Ok(asset) => assets.push(asset),
            Err(e) => {
                log::warn!("Skipping published {}: {}", what, e);
                errors.push(e);
            }
        }
    }

    assets
}

fn parse_trigger_at(text: &str, position: usize, context: &str) -> std::result::Result<Trigger, ParseError> {
    TriggerParser::with_origin(text, position, 1)
        .parse_trigger()
        .map_err(|e| ParseError::wrap(format!("Invalid trigger for {}", context), position, 1, e))
}

fn read_achievement(raw: PublishedAchievement, position: usize) -> std::result::Result<Asset, ParseError> {
    let category = Category::from_flags(raw.flags).ok_or_else(|| {
        ParseError::new(
            format!("Unknown flags {} for achievement {}", raw.flags, raw.id),
            position,
            1,
        )
    })?;
    let trigger = parse_trigger_at(&raw.mem_addr, position, &format!("achievement {}", raw.id))?;

    let mut asset = Asset::achievement(raw.title, trigger)
        .with_id(raw.id)
        .with_description(raw.description)
        .with_points(raw.points)
        .with_badge(raw.badge_name)
        .with_category(category);
    asset.author = raw.author;
    asset.created = raw.created;
    asset.modified = raw.modified;
    Ok(asset)
}

fn read_leaderboard(raw: PublishedLeaderboard, position: usize) -> std::result::Result<Asset, ParseError> {
    let context = format!("leaderboard {}", raw.id);
    let part = |tag| mem_part(&raw.mem, tag, &context, position);

    let slots = LeaderboardSlots {
        start: parse_trigger_at(part("STA:")?, position, &context)?,
        cancel: parse_trigger_at(part("CAN:")?, position, &context)?,
        submit: parse_trigger_at(part("SUB:")?, position, &context)?,
        value: TriggerParser::with_origin(part("VAL:")?, position, 1)
            .value_mode()
            .parse_trigger()
            .map_err(|e| ParseError::wrap(format!("Invalid value for {}", context), position, 1, e))?,
        format: raw.format.clone(),
        lower_is_better: raw.lower_is_better.as_ref().is_some_and(Flag::is_set),
    };

    Ok(Asset::leaderboard(raw.title.clone(), slots)
        .with_id(raw.id)
        .with_description(raw.description.clone())
        .with_category(Category::Core))
}

/// Text after `tag` in a `STA:..::CAN:..::SUB:..::VAL:..` string
fn mem_part<'a>(
    mem: &'a str,
    tag: &str,
    context: &str,
    position: usize,
) -> std::result::Result<&'a str, ParseError> {
    mem.split("::")
        .find_map(|segment| segment.strip_prefix(tag))
        .ok_or_else(|| ParseError::new(format!("Missing {} in {}", tag, context), position, 1))
}
