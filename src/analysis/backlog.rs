use crate::models::story::{Story, SprintTally};
use regex::Regex;

/// Tallies points left and mean progress for one sprint's backlog.
///
/// Only stories of `story_type` with a status are considered. Stories whose
/// status matches `status_exclude` still count towards progress but not
/// towards the points left.
pub fn count_points_left(
    stories: &[Story],
    sprint: &str,
    status_exclude: &Regex,
    story_type: &str,
) -> SprintTally {
    let considered: Vec<&Story> = stories
        .iter()
        .filter(|story| story.sprint == sprint && story.story_type == story_type)
        .filter(|story| story.status.as_deref().is_some_and(|s| !s.is_empty()))
        .collect();

    let points_left: f64 = considered
        .iter()
        .filter(|story| {
            story
                .status
                .as_deref()
                .is_some_and(|status| !status_exclude.is_match(status))
        })
        .filter_map(|story| story.estimate)
        .sum();

    let story_count = considered.len();
    let progress = if story_count == 0 {
        0.0
    } else {
        considered.iter().filter_map(|story| story.progress).sum::<f64>() / story_count as f64
    };

    SprintTally {
        points_left,
        progress,
        story_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn story(id: &str, status: Option<&str>, story_type: &str, estimate: Option<f64>, progress: Option<f64>) -> Story {
        Story {
            id: id.to_string(),
            name: format!("Story {id}"),
            sprint: "12".to_string(),
            status: status.map(str::to_string),
            story_type: story_type.to_string(),
            estimate,
            progress,
        }
    }

    #[test]
    fn excludes_finished_statuses_from_points_but_not_progress() {
        let stories = vec![
            story("a", Some("In progress"), "Story", Some(5.0), Some(0.5)),
            story("b", Some("Done"), "Story", Some(3.0), Some(1.0)),
            story("c", Some("Todo"), "Story", None, None),
        ];
        let exclude = Regex::new("Done|Closed").unwrap();

        let tally = count_points_left(&stories, "12", &exclude, "Story");
        assert_eq!(tally.points_left, 5.0);
        assert_eq!(tally.story_count, 3);
        assert!((tally.progress - 0.5).abs() < 1e-9);
    }

    #[test]
    fn ignores_other_sprints_types_and_missing_status() {
        let mut other_sprint = story("d", Some("Todo"), "Story", Some(8.0), Some(0.0));
        other_sprint.sprint = "11".to_string();
        let stories = vec![
            other_sprint,
            story("e", Some("Todo"), "Bug", Some(2.0), Some(0.0)),
            story("f", None, "Story", Some(2.0), Some(0.0)),
            story("g", Some(""), "Story", Some(2.0), Some(0.0)),
            story("h", Some("Todo"), "Story", Some(1.0), Some(0.25)),
        ];
        let exclude = Regex::new("Done").unwrap();

        let tally = count_points_left(&stories, "12", &exclude, "Story");
        assert_eq!(tally.points_left, 1.0);
        assert_eq!(tally.story_count, 1);
        assert_eq!(tally.progress, 0.25);
    }

    #[test]
    fn empty_backlog_has_zero_progress() {
        let exclude = Regex::new("Done").unwrap();
        let tally = count_points_left(&[], "12", &exclude, "Story");
        assert_eq!(tally.points_left, 0.0);
        assert_eq!(tally.progress, 0.0);
    }
}
