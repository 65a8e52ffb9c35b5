//! Matching generated assets to local and published counterparts

use super::{Asset, AssetKind, Category};

/// Counterparts found for one generated asset
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeMatch {
    /// Index into the generated slice
    pub generated: usize,
    pub local: Option<usize>,
    pub published: Option<usize>,
}

/// Assigns ids to generated assets
///
/// Matching tries ids first, then local titles, then published logic.
/// Anything still unmatched gets a fresh local id. Each existing asset is
/// matched at most once per call, and allocated ids are never handed out
/// twice by the same reconciler.
#[derive(Debug, Clone)]
pub struct Reconciler {
    first_local_id: u32,
    next_local_id: u32,
}

impl Reconciler {
    pub fn new(first_local_id: u32) -> Self {
        Self {
            first_local_id,
            next_local_id: first_local_id,
        }
    }

    pub fn first_local_id(&self) -> u32 {
        self.first_local_id
    }

    /// Id the next allocation would use, ignoring assets not yet seen
    pub fn next_local_id(&self) -> u32 {
        self.next_local_id
    }

    /// Mark `ids` as in use so allocation skips past them
    ///
    /// Ids below the local range are ignored.
    pub fn reserve(&mut self, ids: impl IntoIterator<Item = u32>) {
        let highest = ids.into_iter().filter(|id| *id >= self.first_local_id).max();
        if let Some(highest) = highest {
            self.next_local_id = self.next_local_id.max(highest.saturating_add(1));
        }
    }

    /// Resolve ids for `generated` in place
    ///
    /// Returns one match per generated asset, in order. Local assets with no
    /// generated counterpart are left alone.
    pub fn reconcile(
        &mut self,
        generated: &mut [Asset],
        local: &[Asset],
        published: &[Asset],
    ) -> Vec<MergeMatch> {
        let mut matches: Vec<MergeMatch> = (0..generated.len())
            .map(|index| MergeMatch {
                generated: index,
                local: None,
                published: None,
            })
            .collect();
        let mut local_used = vec![false; local.len()];
        let mut published_used = vec![false; published.len()];

        // Phase 1: id
        for (index, asset) in generated.iter().enumerate() {
            if asset.id == 0 {
                continue;
            }
            matches[index].local = claim_by_id(local, &mut local_used, asset.kind(), asset.id);
            matches[index].published =
                claim_by_id(published, &mut published_used, asset.kind(), asset.id);
        }

        // Phase 2: title
        for (index, asset) in generated.iter_mut().enumerate() {
            if asset.id != 0 {
                continue;
            }
            let Some(found) = title_candidate(local, &local_used, asset, self.first_local_id) else {
                continue;
            };

            local_used[found] = true;
            asset.id = local[found].id;
            matches[index].local = Some(found);
            log::debug!("Matched '{}' to local {} by title", asset.title, asset.id);

            if asset.id != 0 {
                matches[index].published =
                    claim_by_id(published, &mut published_used, asset.kind(), asset.id);
            }
        }

        // Phase 3: logic
        for (index, asset) in generated.iter_mut().enumerate() {
            if asset.id != 0 {
                continue;
            }
            let found = [Category::Core, Category::Unofficial]
                .into_iter()
                .find_map(|category| {
                    (0..published.len()).find(|&j| {
                        !published_used[j]
                            && published[j].category == category
                            && published[j].kind() == asset.kind()
                            && published[j].content_equivalent(asset)
                    })
                });
            let Some(found) = found else {
                continue;
            };

            published_used[found] = true;
            asset.id = published[found].id;
            matches[index].published = Some(found);
            log::debug!(
                "Matched '{}' to published {} by logic",
                asset.title,
                asset.id
            );

            if matches[index].local.is_none() {
                matches[index].local = claim_by_id(local, &mut local_used, asset.kind(), asset.id);
            }
        }

        // Phase 4: allocation
        self.reserve(
            local
                .iter()
                .chain(published.iter())
                .chain(generated.iter())
                .map(|asset| asset.id),
        );

        for asset in generated.iter_mut() {
            if asset.id != 0 {
                continue;
            }
            asset.id = self.next_local_id;
            self.next_local_id = self.next_local_id.saturating_add(1);
            log::debug!("Allocated local id {} for '{}'", asset.id, asset.title);
        }

        matches
    }
}

/// Find the existing asset `incoming` would merge with, by id then by title
pub fn find_merge_candidate(existing: &[Asset], incoming: &Asset, first_local_id: u32) -> Option<usize> {
    let unused = vec![false; existing.len()];

    if incoming.id != 0 {
        if let Some(found) = existing
            .iter()
            .position(|asset| asset.kind() == incoming.kind() && asset.id == incoming.id)
        {
            return Some(found);
        }
    }

    title_candidate(existing, &unused, incoming, first_local_id)
}

fn claim_by_id(pool: &[Asset], used: &mut [bool], kind: AssetKind, id: u32) -> Option<usize> {
    let found = (0..pool.len()).find(|&j| !used[j] && pool[j].kind() == kind && pool[j].id == id)?;
    used[found] = true;
    Some(found)
}

/// Unused same-kind asset with a matching title, preferring local ids
fn title_candidate(pool: &[Asset], used: &[bool], incoming: &Asset, first_local_id: u32) -> Option<usize> {
    let title = incoming.title.to_lowercase();
    let candidates: Vec<usize> = pool
        .iter()
        .enumerate()
        .filter(|(j, asset)| {
            !used[*j] && asset.kind() == incoming.kind() && asset.title.to_lowercase() == title
        })
        .map(|(j, _)| j)
        .collect();

    candidates
        .iter()
        .copied()
        .find(|j| pool[*j].is_local_id(first_local_id))
        .or_else(|| candidates.first().copied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{LeaderboardSlots, FIRST_LOCAL_ID};
    use crate::codec::parse_trigger;

    fn achievement(id: u32, title: &str, text: &str) -> Asset {
        Asset::achievement(title, parse_trigger(text).unwrap()).with_id(id)
    }

    #[test]
    fn test_allocates_after_highest_local_id() {
        let local = vec![
            achievement(111_000_004, "Other", "0xH2=2"),
            achievement(111_000_005, "A Test4", "0xH1=1"),
        ];
        let mut generated = vec![achievement(0, "Test3", "0xH3=3")];

        let mut reconciler = Reconciler::new(FIRST_LOCAL_ID);
        let matches = reconciler.reconcile(&mut generated, &local, &[]);

        assert_eq!(generated[0].id, 111_000_006);
        assert_eq!(matches[0].local, None);
        assert_eq!(reconciler.next_local_id(), 111_000_007);
    }

    #[test]
    fn test_id_match() {
        let local = vec![achievement(7, "Old name", "0xH1=1")];
        let published = vec![achievement(7, "Old name", "0xH1=1").with_category(Category::Core)];
        let mut generated = vec![achievement(7, "New name", "0xH1=2")];

        let matches = Reconciler::new(FIRST_LOCAL_ID).reconcile(&mut generated, &local, &published);
        assert_eq!(matches[0].local, Some(0));
        assert_eq!(matches[0].published, Some(0));
        assert_eq!(generated[0].id, 7);
    }

    #[test]
    fn test_title_match_prefers_local_id_range() {
        let local = vec![
            achievement(42, "Collect Coins", "0xH1=1"),
            achievement(111_000_001, "collect coins", "0xH1=1"),
        ];
        let mut generated = vec![achievement(0, "COLLECT COINS", "0xH1=5")];

        let matches = Reconciler::new(FIRST_LOCAL_ID).reconcile(&mut generated, &local, &[]);
        assert_eq!(matches[0].local, Some(1));
        assert_eq!(generated[0].id, 111_000_001);
    }

    #[test]
    fn test_title_match_consumes_candidate() {
        let local = vec![achievement(42, "Same", "0xH1=1")];
        let mut generated = vec![
            achievement(0, "Same", "0xH1=1"),
            achievement(0, "Same", "0xH1=2"),
        ];

        let matches = Reconciler::new(FIRST_LOCAL_ID).reconcile(&mut generated, &local, &[]);
        assert_eq!(matches[0].local, Some(0));
        assert_eq!(generated[0].id, 42);
        assert_eq!(matches[1].local, None);
        assert_eq!(generated[1].id, FIRST_LOCAL_ID);
    }

    #[test]
    fn test_structural_match_prefers_core() {
        let published = vec![
            achievement(900, "Unofficial one", "0xH1=1").with_category(Category::Unofficial),
            achievement(800, "Core one", "0xH000001=1").with_category(Category::Core),
        ];
        let local = vec![achievement(800, "Core one", "0xH1=1")];
        let mut generated = vec![achievement(0, "Renamed", "0xH1=1")];

        let matches = Reconciler::new(FIRST_LOCAL_ID).reconcile(&mut generated, &local, &published);
        assert_eq!(generated[0].id, 800);
        assert_eq!(matches[0].published, Some(1));
        assert_eq!(matches[0].local, Some(0));
    }

    #[test]
    fn test_kinds_never_cross_match() {
        let local = vec![Asset::leaderboard("Score", LeaderboardSlots::default()).with_id(5)];
        let mut generated = vec![achievement(5, "Score", "0xH1=1")];

        let matches = Reconciler::new(FIRST_LOCAL_ID).reconcile(&mut generated, &local, &[]);
        assert_eq!(matches[0].local, None);
    }

    #[test]
    fn test_ids_are_not_reused_across_calls() {
        let mut reconciler = Reconciler::new(FIRST_LOCAL_ID);

        let mut first = vec![achievement(0, "One", "0xH1=1")];
        reconciler.reconcile(&mut first, &[], &[]);
        let mut second = vec![achievement(0, "Two", "0xH2=2")];
        reconciler.reconcile(&mut second, &[], &[]);

        assert_eq!(first[0].id, FIRST_LOCAL_ID);
        assert_eq!(second[0].id, FIRST_LOCAL_ID + 1);
    }

    #[test]
    fn test_reserved_ids_are_skipped() {
        let mut reconciler = Reconciler::new(FIRST_LOCAL_ID);
        reconciler.reserve([5, FIRST_LOCAL_ID + 2]);
        assert_eq!(reconciler.next_local_id(), FIRST_LOCAL_ID + 3);

        reconciler.reserve([FIRST_LOCAL_ID]);
        assert_eq!(reconciler.next_local_id(), FIRST_LOCAL_ID + 3);

        let mut generated = vec![achievement(0, "One", "0xH1=1")];
        reconciler.reconcile(&mut generated, &[], &[]);
        assert_eq!(generated[0].id, FIRST_LOCAL_ID + 3);
    }

    #[test]
    fn test_find_merge_candidate() {
        let existing = vec![
            achievement(10, "Alpha", "0xH1=1"),
            achievement(111_000_003, "beta", "0xH2=2"),
        ];

        let by_id = achievement(10, "Whatever", "0xH9=9");
        assert_eq!(find_merge_candidate(&existing, &by_id, FIRST_LOCAL_ID), Some(0));

        let by_title = achievement(0, "BETA", "0xH9=9");
        assert_eq!(find_merge_candidate(&existing, &by_title, FIRST_LOCAL_ID), Some(1));

        let unknown = achievement(0, "Gamma", "0xH9=9");
        assert_eq!(find_merge_candidate(&existing, &unknown, FIRST_LOCAL_ID), None);
    }
}
