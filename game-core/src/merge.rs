//! Reconciliation of two independently evolved snapshots.
//!
//! Counters are monotonic and merge with `max`. The current streak is a
//! fact about the latest game and is taken from whichever side played
//! most recently. History is a union keyed by entry id.

use std::cmp::Ordering;
use std::collections::HashMap;

use game_types::{HistoryEntry, Settings, Snapshot, Statistics};
use tracing::debug;

use crate::history::{backfill_legacy, retain_most_recent};

pub struct MergeEngine;

impl MergeEngine {
    /// Merge `remote` into `local`.
    ///
    /// `now` is the merge time in epoch milliseconds; it only becomes
    /// visible as the timestamp of legacy entries that arrive without one.
    pub fn merge(local: &Snapshot, remote: &Snapshot, now: i64) -> Snapshot {
        let stats = Self::merge_statistics(
            &local.stats,
            &remote.stats,
            local.last_played_at(),
            remote.last_played_at(),
        );
        let history = Self::merge_history(&local.history, &remote.history, now);

        let mut used_words = local.used_words.clone();
        used_words.extend(remote.used_words.iter().cloned());

        let settings = Self::merge_settings(&local.settings, &remote.settings);

        debug!(
            "Merged snapshots: {} history entries, {} used words",
            history.len(),
            used_words.len()
        );

        Snapshot {
            stats,
            history,
            used_words,
            settings,
        }
    }

    pub fn merge_statistics(
        local: &Statistics,
        remote: &Statistics,
        local_last_played: Option<i64>,
        remote_last_played: Option<i64>,
    ) -> Statistics {
        let mut guess_distribution = local.guess_distribution;
        for (merged, theirs) in guess_distribution.iter_mut().zip(remote.guess_distribution) {
            *merged = (*merged).max(theirs);
        }

        // Never max(): a stale high streak must not outlive a newer loss.
        let current_streak = match (local_last_played, remote_last_played) {
            (Some(ours), Some(theirs)) if theirs > ours => remote.current_streak,
            (None, Some(_)) => remote.current_streak,
            _ => local.current_streak,
        };

        Statistics {
            played: local.played.max(remote.played),
            wins: local.wins.max(remote.wins),
            current_streak,
            max_streak: local.max_streak.max(remote.max_streak),
            guess_distribution,
            ai_words: local.ai_words.max(remote.ai_words),
            list_words: local.list_words.max(remote.list_words),
        }
    }

    pub fn merge_history(
        local: &[HistoryEntry],
        remote: &[HistoryEntry],
        now: i64,
    ) -> Vec<HistoryEntry> {
        let mut merged: Vec<HistoryEntry> = Vec::with_capacity(local.len() + remote.len());
        let mut index_by_id: HashMap<String, usize> = HashMap::new();
        let mut legacy = Vec::new();

        for entry in local.iter().chain(remote) {
            let Some(id) = entry.id.clone().filter(|_| entry.timestamp.is_some()) else {
                legacy.push(entry.clone());
                continue;
            };

            match index_by_id.get(&id) {
                Some(&existing) => {
                    if Self::replaces(&merged[existing], entry) {
                        merged[existing] = entry.clone();
                    }
                }
                None => {
                    index_by_id.insert(id, merged.len());
                    merged.push(entry.clone());
                }
            }
        }

        // Legacy entries are never deduplicated; each gets a fresh identity.
        for mut entry in legacy {
            backfill_legacy(&mut entry, now);
            merged.push(entry);
        }

        retain_most_recent(&mut merged);
        merged
    }

    /// Whether `incoming` (the later copy in merge order, i.e. remote)
    /// replaces the `kept` copy of the same entry.
    ///
    /// The newer timestamp wins. A rating attached after the fact does not
    /// move the timestamp, so on a tie the rated copy wins; with both or
    /// neither rated, remote wins.
    fn replaces(kept: &HistoryEntry, incoming: &HistoryEntry) -> bool {
        match incoming.timestamp.cmp(&kept.timestamp) {
            Ordering::Greater => true,
            Ordering::Less => false,
            Ordering::Equal => incoming.understanding.is_some() || kept.understanding.is_none(),
        }
    }

    /// Local wins when set, otherwise remote. A field unset on both sides
    /// stays unset and resolves to its default when read. Only the fields
    /// of `Settings` exist here, so credentials can never pass through.
    pub fn merge_settings(local: &Settings, remote: &Settings) -> Settings {
        Settings {
            ai_enabled: local.ai_enabled.or(remote.ai_enabled),
            show_reasoning: local.show_reasoning.or(remote.show_reasoning),
            tier2_focus: local.tier2_focus.or(remote.tier2_focus),
            extended_info: local.extended_info.or(remote.extended_info),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use game_types::{LOSS_RESULT, MAX_HISTORY_SIZE, WordSource};
    use std::collections::BTreeSet;

    fn entry(id: &str, word: &str, result: i8, timestamp: i64) -> HistoryEntry {
        HistoryEntry {
            id: Some(id.to_string()),
            word: word.to_string(),
            result,
            source: WordSource::List,
            timestamp: Some(timestamp),
            understanding: None,
        }
    }

    fn full_settings() -> Settings {
        Settings {
            ai_enabled: Some(true),
            show_reasoning: Some(false),
            tier2_focus: Some(true),
            extended_info: Some(false),
        }
    }

    fn sample_snapshot() -> Snapshot {
        Snapshot {
            stats: Statistics {
                played: 3,
                wins: 2,
                current_streak: 1,
                max_streak: 2,
                guess_distribution: [0, 1, 1, 0, 0, 0],
                ai_words: 1,
                list_words: 2,
            },
            history: vec![
                entry("a", "CRANE", 2, 100),
                entry("b", "SLATE", LOSS_RESULT, 200),
                entry("c", "PLANT", 3, 300),
            ],
            used_words: ["CRANE", "SLATE", "PLANT"].iter().map(|w| w.to_string()).collect(),
            settings: full_settings(),
        }
    }

    #[test]
    fn test_merge_with_self_is_identity() {
        let snapshot = sample_snapshot();
        assert_eq!(MergeEngine::merge(&snapshot, &snapshot, 9_999), snapshot);
    }

    #[test]
    fn test_empty_remote_passes_local_through() {
        let local = sample_snapshot();
        assert_eq!(MergeEngine::merge(&local, &Snapshot::default(), 9_999), local);
    }

    #[test]
    fn test_empty_local_adopts_remote() {
        let mut remote = sample_snapshot();
        remote.history.push(HistoryEntry {
            id: None,
            word: "OLDIE".to_string(),
            result: 6,
            source: WordSource::List,
            timestamp: None,
            understanding: None,
        });

        let merged = MergeEngine::merge(&Snapshot::default(), &remote, 9_999);

        assert_eq!(merged.stats, remote.stats);
        assert_eq!(merged.used_words, remote.used_words);
        assert_eq!(merged.settings, remote.settings);
        assert_eq!(merged.history.len(), 4);
        let backfilled = merged.history.last().unwrap();
        assert_eq!(backfilled.word, "OLDIE");
        assert_eq!(backfilled.timestamp, Some(9_999));
        assert!(backfilled.id.is_some());
    }

    #[test]
    fn test_counters_take_max_per_field() {
        let local = Statistics {
            played: 10,
            wins: 4,
            current_streak: 0,
            max_streak: 3,
            guess_distribution: [1, 0, 2, 1, 0, 0],
            ai_words: 7,
            list_words: 3,
        };
        let remote = Statistics {
            played: 8,
            wins: 6,
            current_streak: 2,
            max_streak: 5,
            guess_distribution: [0, 3, 1, 1, 1, 0],
            ai_words: 2,
            list_words: 6,
        };

        let merged = MergeEngine::merge_statistics(&local, &remote, None, None);
        assert_eq!(merged.played, 10);
        assert_eq!(merged.wins, 6);
        assert_eq!(merged.max_streak, 5);
        assert_eq!(merged.guess_distribution, [1, 3, 2, 1, 1, 0]);
        assert_eq!(merged.ai_words, 7);
        assert_eq!(merged.list_words, 6);
        // Neither side has history: local wins.
        assert_eq!(merged.current_streak, 0);
    }

    #[test]
    fn test_streak_follows_most_recent_game() {
        let local = Statistics {
            current_streak: 0,
            ..Statistics::default()
        };
        let remote = Statistics {
            current_streak: 5,
            max_streak: 5,
            ..Statistics::default()
        };

        let merged = MergeEngine::merge_statistics(&local, &remote, Some(1_000), Some(500));
        assert_eq!(merged.current_streak, 0);

        let merged = MergeEngine::merge_statistics(&local, &remote, Some(500), Some(1_000));
        assert_eq!(merged.current_streak, 5);

        let merged = MergeEngine::merge_statistics(&local, &remote, None, Some(1));
        assert_eq!(merged.current_streak, 5);

        let merged = MergeEngine::merge_statistics(&local, &remote, Some(1), None);
        assert_eq!(merged.current_streak, 0);
    }

    #[test]
    fn test_streak_via_full_merge() {
        let mut local = Snapshot::default();
        local.stats.current_streak = 0;
        local.history.push(entry("x", "LOSER", LOSS_RESULT, 1_000));

        let mut remote = Snapshot::default();
        remote.stats.current_streak = 5;
        remote.history.push(entry("y", "WINNER", 2, 500));

        let merged = MergeEngine::merge(&local, &remote, 2_000);
        assert_eq!(merged.stats.current_streak, 0);
        assert_eq!(merged.history.len(), 2);
    }

    #[test]
    fn test_history_union_respects_cap() {
        let local: Vec<_> = (0..15).map(|i| entry(&format!("l{i}"), "LOCAL", 3, i * 2)).collect();
        let remote: Vec<_> = (0..10)
            .map(|i| entry(&format!("r{i}"), "REMOT", 3, i * 2 + 1))
            .collect();

        let merged = MergeEngine::merge_history(&local, &remote, 0);

        assert_eq!(merged.len(), MAX_HISTORY_SIZE);
        let timestamps: Vec<i64> = merged.iter().filter_map(|e| e.timestamp).collect();
        assert!(timestamps.windows(2).all(|w| w[0] <= w[1]));
        // The five oldest (0, 1, 2, 3, 4) are gone.
        assert_eq!(timestamps[0], 5);
    }

    #[test]
    fn test_same_id_keeps_newer_copy() {
        let mut rated = entry("shared", "CRANE", 3, 200);
        rated.understanding = Some(8);

        let merged = MergeEngine::merge_history(&[entry("shared", "CRANE", 3, 100)], &[rated.clone()], 0);
        assert_eq!(merged, vec![rated.clone()]);

        let merged = MergeEngine::merge_history(&[rated.clone()], &[entry("shared", "CRANE", 3, 100)], 0);
        assert_eq!(merged, vec![rated]);
    }

    #[test]
    fn test_same_id_tie_keeps_remote() {
        let local = entry("same", "LOCAL", 3, 100);
        let mut remote = entry("same", "LOCAL", 3, 100);
        remote.understanding = Some(2);

        let merged = MergeEngine::merge_history(&[local], &[remote.clone()], 0);
        assert_eq!(merged, vec![remote]);
    }

    #[test]
    fn test_same_id_tie_keeps_rated_copy() {
        let mut local = entry("same", "CRANE", 3, 100);
        local.understanding = Some(7);
        let remote = entry("same", "CRANE", 3, 100);

        let merged = MergeEngine::merge_history(&[local.clone()], &[remote.clone()], 0);
        assert_eq!(merged, vec![local.clone()]);

        // Same outcome on the device pulling the rating from elsewhere.
        let merged = MergeEngine::merge_history(&[remote], &[local.clone()], 0);
        assert_eq!(merged, vec![local]);
    }

    #[test]
    fn test_same_id_newer_unrated_copy_wins() {
        let mut local = entry("same", "CRANE", 3, 100);
        local.understanding = Some(7);
        let remote = entry("same", "CRANE", 3, 200);

        let merged = MergeEngine::merge_history(&[local], &[remote.clone()], 0);
        assert_eq!(merged, vec![remote]);
    }

    #[test]
    fn test_legacy_entries_never_deduplicated() {
        let legacy = HistoryEntry {
            id: None,
            word: "TWICE".to_string(),
            result: 4,
            source: WordSource::List,
            timestamp: None,
            understanding: None,
        };

        let merged = MergeEngine::merge_history(&[legacy.clone()], &[legacy], 777);
        assert_eq!(merged.len(), 2);
        assert_ne!(merged[0].id, merged[1].id);
        assert!(merged.iter().all(|e| e.timestamp == Some(777)));
    }

    #[test]
    fn test_used_words_union() {
        let mut local = Snapshot::default();
        local.used_words = ["CRANE", "SLATE"].iter().map(|w| w.to_string()).collect();
        let mut remote = Snapshot::default();
        remote.used_words = ["SLATE", "PLANT"].iter().map(|w| w.to_string()).collect();

        let merged = MergeEngine::merge(&local, &remote, 0);
        let expected: BTreeSet<String> =
            ["CRANE", "PLANT", "SLATE"].iter().map(|w| w.to_string()).collect();
        assert_eq!(merged.used_words, expected);
    }

    #[test]
    fn test_settings_precedence() {
        let local = Settings {
            ai_enabled: Some(false),
            show_reasoning: None,
            tier2_focus: None,
            extended_info: None,
        };
        let remote = Settings {
            ai_enabled: Some(true),
            show_reasoning: Some(false),
            tier2_focus: None,
            extended_info: None,
        };

        let merged = MergeEngine::merge_settings(&local, &remote);
        assert_eq!(merged.ai_enabled, Some(false));
        assert_eq!(merged.show_reasoning, Some(false));
        assert_eq!(merged.tier2_focus, None);
        assert_eq!(merged.extended_info, None);
        assert!(!merged.resolve().tier2_focus);
    }

    #[test]
    fn test_unset_settings_pass_through_unchanged() {
        let local = Settings {
            ai_enabled: Some(true),
            ..Settings::default()
        };

        let merged = MergeEngine::merge_settings(&local, &Settings::default());
        assert_eq!(merged, local);
    }

    #[test]
    fn test_api_key_never_survives_merge() {
        let remote: Snapshot = serde_json::from_str(
            r#"{"settings":{"aiEnabled":true,"apiKey":"sk-remote"},"stats":{},"history":[],"usedWords":[]}"#,
        )
        .unwrap();

        let merged = MergeEngine::merge(&Snapshot::default(), &remote, 0);
        let json = serde_json::to_string(&merged).unwrap();
        assert!(!json.contains("apiKey"));
        assert!(!json.contains("sk-remote"));
        assert_eq!(merged.settings.ai_enabled, Some(true));
    }

    #[test]
    fn test_merge_is_symmetric_for_counters() {
        let a = sample_snapshot();
        let mut b = sample_snapshot();
        b.stats.played = 7;
        b.stats.guess_distribution = [2, 0, 0, 0, 0, 1];
        b.history.push(entry("d", "QUERY", 4, 400));

        let ab = MergeEngine::merge(&a, &b, 0);
        let ba = MergeEngine::merge(&b, &a, 0);
        assert_eq!(ab.stats.played, ba.stats.played);
        assert_eq!(ab.stats.guess_distribution, ba.stats.guess_distribution);
        assert_eq!(ab.history, ba.history);
        assert_eq!(ab.used_words, ba.used_words);
    }
}
