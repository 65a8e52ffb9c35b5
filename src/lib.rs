//! cheevo-core
//!
//! Core logic for authoring memory-based achievements and leaderboards.
//!
//! - [`codec`]: the compact trigger encoding and its pseudocode form
//! - [`diff`]: align two requirement groups row by row
//! - [`compare`]: classify an asset against its local and published copies
//! - [`assets`]: asset definitions and where they are stored
//! - [`merge`]: fold a script's generated assets into the local file
//!
//! ```no_run
//! use cheevo_core::{merge_generated, CoreConfig, LocalAssetFile, MergeRequest, PublishedAssets};
//!
//! # fn main() -> cheevo_core::Result<()> {
//! let config = CoreConfig::load("core.toml")?;
//! let (mut local, _) = LocalAssetFile::load("1234-User.txt", 1234)?;
//! let (published, _) = PublishedAssets::load("1234.json")?;
//!
//! let request = MergeRequest {
//!     game_id: 1234,
//!     title: "Sample Game".to_string(),
//!     author: "me".to_string(),
//!     generated: Vec::new(),
//! };
//! for report in merge_generated(&request, &mut local, &published, &config) {
//!     println!("{} {}: {}", report.id, report.title, report.result.trigger_source);
//! }
//! local.save("1234-User.txt")?;
//! # Ok(())
//! # }
//! ```

pub mod assets;
pub mod codec;
pub mod compare;
pub mod config;
pub mod diff;
pub mod error;
pub mod merge;
pub mod requirements;

// Re-export commonly used types
pub use assets::{
    find_merge_candidate, Asset, AssetBody, AssetKind, Category, LeaderboardSlots, LocalAssetFile,
    MergeMatch, PublishedAssets, Reconciler, FIRST_LOCAL_ID,
};
pub use codec::{parse_requirement, parse_trigger, parse_value, serialize_trigger, serialize_value, ParseError};
pub use compare::{classify, AssetSnapshots, CompareResult, CompareState};
pub use config::CoreConfig;
pub use diff::{diff_groups, diff_triggers, triggers_equivalent, DiffOptions, DiffRow, GroupDiff, RowState};
pub use error::{Error, Result};
pub use merge::{merge_generated, AssetReport, MergeRequest};
pub use requirements::{
    FieldModifier, FieldSize, Operand, Operator, Requirement, RequirementFlag, RequirementGroup,
    Trigger,
};
