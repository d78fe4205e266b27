//! All-time score reconciliation.
//!
//! Points are recorded twice per user: `user_analytics.points_earned` and `profiles.points`.
//! The two are not kept in lockstep, so they are treated as competing estimates of the same
//! total and the larger one wins. A user missing from one side counts as 0 there.

use std::collections::HashMap;

use super::{Board, Standing};
use crate::db::prelude::{AnalyticsPoints, ProfilePoints, UserId};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct LedgerEntry {
    score: i64,
    scans: i64,
}

#[derive(Debug, Clone, Default)]
pub struct ScoreLedger {
    entries: HashMap<UserId, LedgerEntry>,
}

impl ScoreLedger {
    /// Seeds the ledger from analytics rows, then folds in profile points with a take-max policy.
    /// Scan counts only ever come from analytics.
    pub fn merge<A, P>(analytics: A, profiles: P) -> Self
    where
        A: IntoIterator<Item = AnalyticsPoints>,
        P: IntoIterator<Item = ProfilePoints>,
    {
        let mut entries: HashMap<UserId, LedgerEntry> = analytics
            .into_iter()
            .map(|row| {
                (
                    row.user_id,
                    LedgerEntry {
                        score: row.points_earned,
                        scans: row.total_scans,
                    },
                )
            })
            .collect();

        for row in profiles {
            let entry = entries.entry(row.user_id).or_default();
            entry.score = entry.score.max(row.points);
        }

        Self { entries }
    }

    pub fn score_of(&self, user_id: UserId) -> i64 {
        self.entries.get(&user_id).map_or(0, |e| e.score)
    }

    /// Distinct users present in either source.
    pub fn total_users(&self) -> usize {
        self.entries.len()
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.entries
            .iter()
            .map(|(user_id, entry)| Standing {
                user_id: *user_id,
                score: entry.score,
                scans: entry.scans,
            })
            .collect()
    }

    pub fn board(&self, requester: UserId, limit: usize) -> Board {
        Board::build(
            self.standings(),
            self.score_of(requester),
            limit,
            Some(self.total_users() as i64),
        )
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::LEADERBOARD_SIZE;

    fn analytics(id: i64, points: i64, scans: i64) -> AnalyticsPoints {
        AnalyticsPoints {
            user_id: UserId(id),
            points_earned: points,
            total_scans: scans,
        }
    }

    fn profile(id: i64, points: i64) -> ProfilePoints {
        ProfilePoints {
            user_id: UserId(id),
            points,
        }
    }

    const A: i64 = 1;
    const B: i64 = 2;
    const C: i64 = 3;

    #[test]
    fn test_take_max_across_sources() {
        let ledger = ScoreLedger::merge(
            vec![analytics(A, 100, 7), analytics(B, 50, 2)],
            vec![profile(A, 80), profile(B, 120), profile(C, 10)],
        );

        assert_eq!(ledger.score_of(UserId(A)), 100);
        assert_eq!(ledger.score_of(UserId(B)), 120);
        assert_eq!(ledger.score_of(UserId(C)), 10);
        assert_eq!(ledger.score_of(UserId(99)), 0);
        assert_eq!(ledger.total_users(), 3);
    }

    #[test]
    fn test_all_time_board_order() {
        let ledger = ScoreLedger::merge(
            vec![analytics(A, 100, 7), analytics(B, 50, 2)],
            vec![profile(A, 80), profile(B, 120), profile(C, 10)],
        );

        let board = ledger.board(UserId(C), LEADERBOARD_SIZE);
        let order: Vec<(i64, i64)> = board
            .top
            .iter()
            .map(|r| (r.standing.user_id.0, r.standing.score))
            .collect();

        assert_eq!(order, vec![(B, 120), (A, 100), (C, 10)]);
        assert_eq!(board.current_user_rank, 3);
        assert_eq!(board.total_users, Some(3));
    }

    #[test]
    fn test_profile_only_user_has_no_scans() {
        let ledger = ScoreLedger::merge(vec![analytics(A, 5, 4)], vec![profile(C, 40)]);
        let board = ledger.board(UserId(A), LEADERBOARD_SIZE);

        let top = board.top[0].standing;
        assert_eq!((top.user_id, top.score, top.scans), (UserId(C), 40, 0));
        assert_eq!(board.top[1].standing.scans, 4);
        assert_eq!(board.current_user_rank, 2);
    }

    #[test]
    fn test_missing_side_counts_as_zero() {
        for (a, p) in [(0, 0), (0, 30), (30, 0), (15, 15), (7, 3), (3, 7)] {
            let ledger = ScoreLedger::merge(vec![analytics(A, a, 0)], vec![profile(A, p)]);
            assert_eq!(ledger.score_of(UserId(A)), a.max(p));
        }

        let analytics_only = ScoreLedger::merge(vec![analytics(A, 12, 1)], vec![]);
        assert_eq!(analytics_only.score_of(UserId(A)), 12);
    }

    #[test]
    fn test_unknown_requester_ranks_below_every_positive_score() {
        let ledger = ScoreLedger::merge(
            vec![analytics(A, 10, 1), analytics(B, 0, 0)],
            vec![profile(C, 20)],
        );

        let board = ledger.board(UserId(404), LEADERBOARD_SIZE);
        assert_eq!(board.current_user_rank, 3);
        assert_eq!(board.total_users, Some(3));
    }

    #[test]
    fn test_equal_top_scores_share_rank_one() {
        let ledger = ScoreLedger::merge(vec![analytics(A, 60, 0)], vec![profile(B, 60)]);
        let board = ledger.board(UserId(B), LEADERBOARD_SIZE);

        assert!(board.top.iter().all(|r| r.rank == 1));
        assert_eq!(board.current_user_rank, 1);
    }
}
