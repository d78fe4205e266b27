//! Leaderboard ranking.
//!
//! Scores come from two places: the all-time board merges the analytics and profile point
//! totals ([`reconcile`]), while the weekly/monthly boards sum raw disposal events inside a
//! window ([`window`]). Both end up as a list of [`Standing`]s that [`Board::build`] ranks with
//! competition ranking: a user's rank is one more than the number of users with a strictly
//! greater score, so tied users share a rank.

use std::collections::HashMap;
use std::str::FromStr;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::constants;
use crate::db::prelude::{Identity, UserId};

pub mod reconcile;
pub mod window;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    #[default]
    All,
    Week,
    Month,
}

impl Period {
    pub fn window(self) -> Option<Duration> {
        match self {
            Period::All => None,
            Period::Week => Some(Duration::days(constants::WEEK_WINDOW_DAYS)),
            Period::Month => Some(Duration::days(constants::MONTH_WINDOW_DAYS)),
        }
    }

    /// Earliest event timestamp that still counts toward this period.
    pub fn since(self, now: NaiveDateTime) -> Option<NaiveDateTime> {
        self.window().map(|window| now - window)
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "all" => Ok(Period::All),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            other => Err(format!(
                "invalid period '{other}', expected one of: all, week, month"
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Standing {
    pub user_id: UserId,
    pub score: i64,
    pub scans: i64,
}

/// Highest score first. Equal scores fall back to ascending user id so the output is stable;
/// the product has no preferred tie-break.
pub fn sort_standings(standings: &mut [Standing]) {
    standings.sort_by(|a, b| b.score.cmp(&a.score).then(a.user_id.cmp(&b.user_id)));
}

pub fn competition_rank<I>(score: i64, scores: I) -> i64
where
    I: IntoIterator<Item = i64>,
{
    1 + scores.into_iter().filter(|other| *other > score).count() as i64
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankedStanding {
    pub rank: i64,
    pub standing: Standing,
}

/// A ranked, truncated leaderboard plus the requester's own position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pub top: Vec<RankedStanding>,
    pub current_user_rank: i64,
    pub total_users: Option<i64>,
}

impl Board {
    pub fn build(
        mut standings: Vec<Standing>,
        requester_score: i64,
        limit: usize,
        total_users: Option<i64>,
    ) -> Self {
        let current_user_rank = competition_rank(requester_score, standings.iter().map(|s| s.score));

        sort_standings(&mut standings);
        let mut top: Vec<RankedStanding> = Vec::with_capacity(limit.min(standings.len()));
        for (idx, standing) in standings.into_iter().take(limit).enumerate() {
            let rank = match top.last() {
                Some(prev) if prev.standing.score == standing.score => prev.rank,
                _ => idx as i64 + 1,
            };
            top.push(RankedStanding { rank, standing });
        }

        Self {
            top,
            current_user_rank,
            total_users,
        }
    }

    pub fn user_ids(&self) -> Vec<UserId> {
        self.top.iter().map(|r| r.standing.user_id).collect()
    }

    pub fn into_response(
        self,
        requester: UserId,
        identities: &HashMap<UserId, Identity>,
    ) -> LeaderboardResponse {
        let leaderboard = self
            .top
            .into_iter()
            .map(|ranked| {
                let user_id = ranked.standing.user_id;
                let identity = identities
                    .get(&user_id)
                    .cloned()
                    .unwrap_or_else(|| Identity::unknown(user_id));

                LeaderboardEntry {
                    rank: ranked.rank,
                    user_name: identity.display_name(),
                    avatar_url: identity.avatar_url,
                    recycling_score: ranked.standing.score,
                    total_scans: ranked.standing.scans,
                    is_current_user: user_id == requester,
                }
            })
            .collect();

        LeaderboardResponse {
            leaderboard,
            current_user_rank: self.current_user_rank,
            total_users: self.total_users,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: i64,
    pub user_name: String,
    pub avatar_url: Option<String>,
    pub recycling_score: i64,
    pub total_scans: i64,
    pub is_current_user: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardResponse {
    pub leaderboard: Vec<LeaderboardEntry>,
    pub current_user_rank: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<i64>,
}

#[cfg(test)]
mod test {
    use super::*;

    fn standing(id: i64, score: i64) -> Standing {
        Standing {
            user_id: UserId(id),
            score,
            scans: 0,
        }
    }

    #[test]
    fn test_period_windows() {
        let now = NaiveDateTime::parse_from_str("2025-03-31 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap();

        assert_eq!(Period::All.since(now), None);
        assert_eq!(
            Period::Week.since(now).unwrap().to_string(),
            "2025-03-24 12:00:00"
        );
        assert_eq!(
            Period::Month.since(now).unwrap().to_string(),
            "2025-03-01 12:00:00"
        );
    }

    #[test]
    fn test_period_query_names() {
        assert_eq!(serde_json::from_str::<Period>(r#""week""#).unwrap(), Period::Week);
        assert!(serde_json::from_str::<Period>(r#""year""#).is_err());
        assert_eq!(Period::default(), Period::All);
        assert_eq!("month".parse::<Period>(), Ok(Period::Month));
        assert!("Week".parse::<Period>().is_err());
    }

    #[test]
    fn test_competition_rank() {
        let scores = [120, 100, 100, 10];
        assert_eq!(competition_rank(120, scores), 1);
        assert_eq!(competition_rank(100, scores), 2);
        assert_eq!(competition_rank(10, scores), 4);
        assert_eq!(competition_rank(0, scores), 5);
        assert_eq!(competition_rank(0, []), 1);
    }

    #[test]
    fn test_board_ties_share_rank() {
        let board = Board::build(
            vec![standing(3, 50), standing(1, 90), standing(2, 90), standing(4, 10)],
            90,
            10,
            None,
        );

        let ranks: Vec<(i64, i64)> = board
            .top
            .iter()
            .map(|r| (r.standing.user_id.0, r.rank))
            .collect();

        assert_eq!(ranks, vec![(1, 1), (2, 1), (3, 3), (4, 4)]);
        assert_eq!(board.current_user_rank, 1);
    }

    #[test]
    fn test_board_truncates_but_ranks_over_everyone() {
        let standings = (1..=15).map(|id| standing(id, 100 - id)).collect();
        let board = Board::build(standings, 0, constants::LEADERBOARD_SIZE, Some(15));

        assert_eq!(board.top.len(), 10);
        assert_eq!(board.top[9].rank, 10);
        assert_eq!(board.current_user_rank, 16);
        assert_eq!(board.total_users, Some(15));
    }

    #[test]
    fn test_response_marks_requester_and_falls_back_to_anonymous() {
        let board = Board::build(vec![standing(1, 20), standing(2, 5)], 5, 10, None);

        let mut identities = HashMap::new();
        identities.insert(
            UserId(1),
            Identity {
                user_id: UserId(1),
                profile_name: Some(String::from("Robin")),
                avatar_url: Some(String::from("https://img/robin.png")),
                user_name: None,
                email: None,
            },
        );

        let response = board.into_response(UserId(2), &identities);
        assert_eq!(response.leaderboard[0].user_name, "Robin");
        assert_eq!(
            response.leaderboard[0].avatar_url.as_deref(),
            Some("https://img/robin.png")
        );
        assert!(!response.leaderboard[0].is_current_user);
        assert_eq!(response.leaderboard[1].user_name, "Anonymous");
        assert!(response.leaderboard[1].avatar_url.is_none());
        assert!(response.leaderboard[1].is_current_user);
        assert_eq!(response.current_user_rank, 2);

        let json = serde_json::to_value(&response).unwrap();
        assert!(json.get("total_users").is_none());
    }
}
