//! Compare-state classification of one asset across its snapshots

use crate::assets::{Asset, AssetKind, Category};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompareState {
    /// Nothing exists for this asset
    None,
    /// Exists locally or published, but the script no longer generates it
    NotGenerated,
    Same,
    LocalDiffers,
    PublishedDiffers,
    PublishedMatchesNotLocal,
    /// Generated, with no local or published counterpart
    GeneratedOnly,
}

/// Snapshots of one asset identity; any of them may be missing
#[derive(Debug, Clone, Copy, Default)]
pub struct AssetSnapshots<'a> {
    pub core: Option<&'a Asset>,
    pub unofficial: Option<&'a Asset>,
    pub local: Option<&'a Asset>,
    pub generated: Option<&'a Asset>,
}

impl<'a> AssetSnapshots<'a> {
    /// Core snapshot, else unofficial, with its label
    pub fn published(&self) -> Option<(&'a Asset, &'static str)> {
        self.core
            .map(|asset| (asset, Category::Core.label()))
            .or_else(|| self.unofficial.map(|asset| (asset, Category::Unofficial.label())))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompareResult {
    pub state: CompareState,
    /// Empty when there is nothing to report
    pub message: String,
    pub can_update: bool,
    pub trigger_source: String,
}

impl CompareResult {
    fn new(state: CompareState, message: impl Into<String>, can_update: bool, source: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
            can_update,
            trigger_source: source.into(),
        }
    }

    /// Whether the generated asset should be written to the local file
    pub fn needs_local_write(&self) -> bool {
        match self.state {
            CompareState::LocalDiffers | CompareState::GeneratedOnly => true,
            CompareState::PublishedDiffers => self.can_update,
            _ => false,
        }
    }
}

/// Classify an asset from whichever snapshots exist
pub fn classify(snapshots: &AssetSnapshots<'_>, kind: AssetKind) -> CompareResult {
    let Some(generated) = snapshots.generated else {
        let source = [
            (snapshots.core, Category::Core),
            (snapshots.unofficial, Category::Unofficial),
            (snapshots.local, Category::Local),
        ]
        .into_iter()
        .find_map(|(asset, category)| asset.map(|_| category.label()));

        return match source {
            Some(label) => CompareResult::new(
                CompareState::NotGenerated,
                "",
                false,
                format!("{} (Not Generated)", label),
            ),
            None => CompareResult::new(CompareState::None, "", false, ""),
        };
    };

    let published = snapshots.published();
    let published_same = published.map(|(asset, label)| (asset.content_equivalent(generated), label));
    let published_differs = |label: &str| format!("{} differs from generated", label);

    match snapshots.local {
        Some(local) if local.content_equivalent(generated) => match published_same {
            Some((true, label)) => CompareResult::new(
                CompareState::Same,
                "",
                false,
                format!("Generated (Same as {} and Local)", label),
            ),
            Some((false, label)) => CompareResult::new(
                CompareState::PublishedDiffers,
                published_differs(label),
                false,
                "Generated (Same as Local)",
            ),
            None => CompareResult::new(CompareState::Same, "", false, "Generated (Same as Local)"),
        },
        Some(_) => {
            let source = match published_same {
                Some((true, label)) => format!("Generated (Same as {})", label),
                _ => "Generated".to_string(),
            };
            CompareResult::new(
                CompareState::LocalDiffers,
                "Local differs from generated",
                true,
                source,
            )
        }
        None => {
            let missing = format!("Local {} does not exist", kind.type_name());
            match published_same {
                Some((true, label)) => CompareResult::new(
                    CompareState::PublishedMatchesNotLocal,
                    missing,
                    true,
                    format!("Generated (Same as {}, Not in Local)", label),
                ),
                Some((false, label)) => CompareResult::new(
                    CompareState::PublishedDiffers,
                    published_differs(label),
                    true,
                    "Generated (Not in Local)",
                ),
                None => CompareResult::new(
                    CompareState::GeneratedOnly,
                    missing,
                    true,
                    "Generated (Not in Local)",
                ),
            }
        }
    }
}
