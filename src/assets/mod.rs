//! Assets and their persisted forms
//!
//! - [`Asset`]: an achievement or leaderboard definition
//! - [`LocalAssetFile`]: the editable local asset file
//! - [`PublishedAssets`]: the read-only published snapshot
//! - [`Reconciler`]: assigns ids to freshly generated assets

mod asset;
mod local_file;
mod published;
mod reconciler;

pub use asset::{Asset, AssetBody, AssetKind, Category, LeaderboardSlots, FIRST_LOCAL_ID};
pub use local_file::{LocalAssetFile, DEFAULT_VERSION};
pub use published::PublishedAssets;
pub use reconciler::{find_merge_candidate, MergeMatch, Reconciler};
