//! Weekly/monthly boards built from per-user disposal sums inside the window.

use super::{Board, Standing, competition_rank};
use crate::db::prelude::{PeriodTotal, UserId};

/// Users without a positive windowed sum are left off the board entirely. The requester is
/// still ranked against every windowed sum, with 0 when they have no events in the window.
pub fn period_board(totals: Vec<PeriodTotal>, requester: UserId, limit: usize) -> Board {
    let requester_score = totals
        .iter()
        .find(|t| t.user_id == requester)
        .map_or(0, |t| t.points);
    let current_user_rank = competition_rank(requester_score, totals.iter().map(|t| t.points));

    let standings = totals
        .into_iter()
        .filter(|t| t.points > 0)
        .map(|t| Standing {
            user_id: t.user_id,
            score: t.points,
            scans: t.scans,
        })
        .collect();

    Board {
        current_user_rank,
        ..Board::build(standings, requester_score, limit, None)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::constants::LEADERBOARD_SIZE;

    fn total(id: i64, points: i64, scans: i64) -> PeriodTotal {
        PeriodTotal {
            user_id: UserId(id),
            points,
            scans,
        }
    }

    #[test]
    fn test_weekly_window_board() {
        // A: two 10-point disposals, B: one 5-point disposal, C only disposed outside the window
        let board = period_board(vec![total(1, 20, 2), total(2, 5, 1)], UserId(3), LEADERBOARD_SIZE);

        let order: Vec<(i64, i64, i64)> = board
            .top
            .iter()
            .map(|r| (r.standing.user_id.0, r.standing.score, r.standing.scans))
            .collect();

        assert_eq!(order, vec![(1, 20, 2), (2, 5, 1)]);
        assert_eq!(board.current_user_rank, 3);
        assert_eq!(board.total_users, None);
    }

    #[test]
    fn test_zero_sum_users_are_dropped() {
        let board = period_board(
            vec![total(1, 0, 3), total(2, 15, 1), total(3, 0, 1)],
            UserId(1),
            LEADERBOARD_SIZE,
        );

        assert_eq!(board.top.len(), 1);
        assert_eq!(board.top[0].standing.user_id, UserId(2));
        assert_eq!(board.current_user_rank, 2);
    }

    #[test]
    fn test_requester_in_window() {
        let board = period_board(
            vec![total(1, 30, 3), total(2, 30, 2), total(3, 10, 1)],
            UserId(2),
            LEADERBOARD_SIZE,
        );

        assert_eq!(board.current_user_rank, 1);
        assert_eq!(board.top[2].rank, 3);
    }

    #[test]
    fn test_negative_sum_ranks_below_zero_sums() {
        let board = period_board(
            vec![total(1, -5, 1), total(2, 0, 1), total(3, 0, 2), total(4, 12, 1)],
            UserId(1),
            LEADERBOARD_SIZE,
        );

        assert_eq!(board.top.len(), 1);
        assert_eq!(board.current_user_rank, 4);
    }

    #[test]
    fn test_empty_window() {
        let board = period_board(Vec::new(), UserId(1), LEADERBOARD_SIZE);
        assert!(board.top.is_empty());
        assert_eq!(board.current_user_rank, 1);
    }
}
