//! Merging generated assets into the local asset file

use crate::assets::{Asset, AssetKind, Category, LocalAssetFile, PublishedAssets, Reconciler};
use crate::compare::{classify, AssetSnapshots, CompareResult};
use crate::config::CoreConfig;
use serde::{Deserialize, Serialize};

/// Output of a script run for one game
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeRequest {
    pub game_id: u32,
    pub title: String,
    /// Recorded on every record written to the local file
    pub author: String,
    pub generated: Vec<Asset>,
}

/// Classification of one asset after the merge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetReport {
    pub id: u32,
    pub title: String,
    pub kind: AssetKind,
    pub result: CompareResult,
}

/// Reconcile `request.generated` against the local and published assets,
/// then write every asset that needs it into `local`
///
/// Reports cover each generated asset in order, followed by published and
/// local assets the script no longer generates.
pub fn merge_generated(
    request: &MergeRequest,
    local: &mut LocalAssetFile,
    published: &PublishedAssets,
    config: &CoreConfig,
) -> Vec<AssetReport> {
    let mut reconciler = Reconciler::new(config.first_local_id);
    // ids are shared between kinds within one file
    reconciler.reserve(
        local
            .assets()
            .chain(published.achievements.iter())
            .chain(published.leaderboards.iter())
            .chain(request.generated.iter())
            .map(|asset| asset.id),
    );
    let mut reports = Vec::new();
    let mut orphans = Vec::new();
    let mut written = 0;

    for kind in [AssetKind::Achievement, AssetKind::Leaderboard] {
        let mut generated: Vec<Asset> = request
            .generated
            .iter()
            .filter(|asset| asset.kind() == kind)
            .cloned()
            .collect();
        let local_assets = local.assets_of_kind(kind);
        let published_assets = published.assets_of_kind(kind);

        let matches = reconciler.reconcile(&mut generated, &local_assets, published_assets);

        let mut local_seen = vec![false; local_assets.len()];
        let mut published_seen = vec![false; published_assets.len()];
        let mut to_write = Vec::new();

        for found in &matches {
            let asset = &generated[found.generated];
            let published_match = found.published.map(|j| {
                published_seen[j] = true;
                &published_assets[j]
            });
            let local_match = found.local.map(|j| {
                local_seen[j] = true;
                &local_assets[j]
            });

            let snapshots = AssetSnapshots {
                core: published_match.filter(|a| a.category == Category::Core),
                unofficial: published_match.filter(|a| a.category == Category::Unofficial),
                local: local_match,
                generated: Some(asset),
            };
            let result = classify(&snapshots, kind);
            log::debug!("{} {} '{}': {:?}", kind.type_name(), asset.id, asset.title, result.state);

            if result.needs_local_write() {
                to_write.push(asset.clone());
            }
            reports.push(AssetReport {
                id: asset.id,
                title: asset.title.clone(),
                kind,
                result,
            });
        }

        for (j, asset) in published_assets.iter().enumerate() {
            if published_seen[j] {
                continue;
            }
            let local_match = local_assets
                .iter()
                .enumerate()
                .find(|(k, candidate)| !local_seen[*k] && candidate.id == asset.id)
                .map(|(k, candidate)| {
                    local_seen[k] = true;
                    candidate
                });
            let snapshots = AssetSnapshots {
                core: Some(asset).filter(|a| a.category == Category::Core),
                unofficial: Some(asset).filter(|a| a.category == Category::Unofficial),
                local: local_match,
                generated: None,
            };
            orphans.push(report(asset, kind, &snapshots));
        }

        for (k, asset) in local_assets.iter().enumerate() {
            if !local_seen[k] {
                let snapshots = AssetSnapshots {
                    local: Some(asset),
                    ..Default::default()
                };
                orphans.push(report(asset, kind, &snapshots));
            }
        }

        for asset in &to_write {
            local.upsert(asset, &request.author);
        }
        written += to_write.len();
    }

    if local.title().is_empty() {
        local.set_title(request.title.clone());
    }

    log::info!(
        "Merged {} generated assets for game {}: {} written, {} not generated",
        request.generated.len(),
        request.game_id,
        written,
        orphans.len()
    );

    reports.extend(orphans);
    reports
}

fn report(asset: &Asset, kind: AssetKind, snapshots: &AssetSnapshots<'_>) -> AssetReport {
    AssetReport {
        id: asset.id,
        title: asset.title.clone(),
        kind,
        result: classify(snapshots, kind),
    }
}
