const SCAN_BADGES: &[(i64, &str)] = &[
    (1, "First Scan"),
    (10, "Eco Beginner"),
    (50, "Waste Detective"),
    (100, "Eco Champion"),
];

const RECYCLING_BADGES: &[(f64, &str)] = &[(100.0, "Recycling Hero"), (500.0, "Green Guardian")];

const FEEDBACK_BADGES: &[(i64, &str)] = &[(1, "Community Contributor"), (5, "Feedback Champion")];

/// Badges earned from scan count, recycling score and feedback count, in display order.
pub fn achievements(total_scans: i64, recycling_score: f64, feedback_count: i64) -> Vec<String> {
    let scans = SCAN_BADGES
        .iter()
        .filter(|(min, _)| total_scans >= *min)
        .map(|(_, badge)| badge);

    let recycling = RECYCLING_BADGES
        .iter()
        .filter(|(min, _)| recycling_score >= *min)
        .map(|(_, badge)| badge);

    let feedback = FEEDBACK_BADGES
        .iter()
        .filter(|(min, _)| feedback_count >= *min)
        .map(|(_, badge)| badge);

    scans
        .chain(recycling)
        .chain(feedback)
        .map(|badge| badge.to_string())
        .collect()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_no_badges() {
        assert!(achievements(0, 0.0, 0).is_empty());
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        assert_eq!(
            achievements(10, 100.0, 1),
            vec![
                "First Scan",
                "Eco Beginner",
                "Recycling Hero",
                "Community Contributor"
            ]
        );
    }

    #[test]
    fn test_everything() {
        let all = achievements(250, 900.0, 12);
        assert_eq!(all.len(), 8);
        assert_eq!(all.last().map(String::as_str), Some("Feedback Champion"));
    }
}
