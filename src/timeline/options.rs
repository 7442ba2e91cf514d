//! Display options for the time-step selection list.

use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt::Write as _;

use super::ReconciledTimeline;
use crate::source::{DataSourceKey, SourceCategory};
use crate::types::Timestamp;

/// Tag order in option labels.
const TAG_ORDER: [&str; 4] = ["O", "R", "G", "E"];

/// Unique for any two distinct instants.
const FALLBACK_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.9f";

fn cfg_date_format() -> String {
    if crate::config::is_initialized() {
        crate::config::get().timeline.date_format.clone()
    } else {
        crate::config::defaults::DEFAULT_DATE_FORMAT.to_string()
    }
}

fn cfg_time_format() -> String {
    if crate::config::is_initialized() {
        crate::config::get().timeline.time_format.clone()
    } else {
        crate::config::defaults::DEFAULT_TIME_FORMAT.to_string()
    }
}

fn cfg_tag_separator() -> String {
    if crate::config::is_initialized() {
        crate::config::get().timeline.tag_separator.clone()
    } else {
        crate::config::defaults::DEFAULT_TAG_SEPARATOR.to_string()
    }
}

/// One entry of the time-step selection list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimeStepOption {
    pub label: String,
    pub time_step: Timestamp,
    pub tags: Vec<&'static str>,
}

fn labels_distinct(time_steps: &BTreeSet<Timestamp>, format: &str) -> bool {
    time_steps
        .iter()
        .map(|t| format_time_step(t, format))
        .collect::<BTreeSet<String>>()
        .len()
        == time_steps.len()
}

/// Coarsest strftime format that still tells every time step apart.
///
/// Date only when that renders every step differently, then date plus time
/// of day at minute, second, millisecond or nanosecond resolution.
pub fn create_time_format_string(time_steps: &[Timestamp]) -> String {
    time_format_for(time_steps, &cfg_date_format(), &cfg_time_format())
}

/// As [`create_time_format_string`] with explicit date and time formats.
///
/// Candidates are compared on their rendered labels, so a date format
/// coarser than a day still yields unique labels. When no candidate built
/// from the given formats separates the steps, a full ISO date-time is used.
pub fn time_format_for(time_steps: &[Timestamp], date_format: &str, time_format: &str) -> String {
    let unique: BTreeSet<Timestamp> = time_steps.iter().copied().collect();
    let date_time = format!("{date_format} {time_format}");

    [
        date_format.to_string(),
        date_time.clone(),
        format!("{date_time}:%S"),
        format!("{date_time}:%S%.3f"),
        format!("{date_time}:%S%.9f"),
    ]
    .into_iter()
    .find(|format| labels_distinct(&unique, format))
    .unwrap_or_else(|| FALLBACK_FORMAT.to_string())
}

/// Format a time step, falling back to RFC 3339 on an invalid format string.
pub fn format_time_step(time_step: &Timestamp, format: &str) -> String {
    let mut text = String::new();
    if write!(text, "{}", time_step.format(format)).is_err() {
        return time_step.to_rfc3339();
    }
    text
}

/// Short tags for the source kinds present, in O, R, G, E order.
pub fn source_tags(sources: &BTreeSet<DataSourceKey>) -> Vec<&'static str> {
    let present: BTreeSet<&'static str> = sources
        .iter()
        .filter_map(DataSourceKey::category)
        .map(SourceCategory::tag)
        .collect();
    TAG_ORDER.into_iter().filter(|tag| present.contains(tag)).collect()
}

/// Build the selection list, one option per timeline entry in time order.
pub fn time_step_options(timeline: &ReconciledTimeline) -> Vec<TimeStepOption> {
    let time_steps: Vec<Timestamp> = timeline.time_steps().collect();
    let format = create_time_format_string(&time_steps);
    let separator = cfg_tag_separator();

    timeline
        .iter()
        .map(|(time_step, sources)| {
            let tags = source_tags(sources);
            let label = format!(
                "{} \t[{}]",
                format_time_step(time_step, &format),
                tags.join(&separator)
            );
            TimeStepOption {
                label,
                time_step: *time_step,
                tags,
            }
        })
        .collect()
}

/// Map selected option labels back to their time steps.
///
/// Labels that match no option are ignored.
pub fn resolve_selection<S: AsRef<str>>(
    options: &[TimeStepOption],
    selected_labels: &[S],
) -> BTreeSet<Timestamp> {
    selected_labels
        .iter()
        .filter_map(|label| options.iter().find(|o| o.label == label.as_ref()))
        .map(|o| o.time_step)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ts(d: u32, h: u32, m: u32, s: u32) -> Timestamp {
        Utc.with_ymd_and_hms(2021, 3, d, h, m, s).single().expect("valid time")
    }

    #[test]
    fn test_distinct_days_use_date_only() {
        let format = create_time_format_string(&[ts(1, 0, 0, 0), ts(2, 12, 0, 0)]);
        assert_eq!(format, "%d.%b %Y");
    }

    #[test]
    fn test_same_day_adds_time_of_day() {
        let format = create_time_format_string(&[ts(1, 8, 0, 0), ts(1, 9, 30, 0)]);
        assert_eq!(format, "%d.%b %Y %H:%M");
        let format = create_time_format_string(&[ts(1, 8, 0, 1), ts(1, 8, 0, 2)]);
        assert_eq!(format, "%d.%b %Y %H:%M:%S");
    }

    #[test]
    fn test_coarse_date_format_still_unique() {
        let steps = [ts(1, 0, 0, 0), ts(20, 0, 0, 0)];
        let format = time_format_for(&steps, "%Y", "%H:%M");
        assert_eq!(format, "%Y-%m-%d %H:%M:%S%.9f");

        let labels: BTreeSet<String> = steps.iter().map(|t| format_time_step(t, &format)).collect();
        assert_eq!(labels.len(), 2);
    }

    #[test]
    fn test_coarse_date_format_uses_time_when_it_separates() {
        let format = time_format_for(&[ts(1, 8, 0, 0), ts(20, 9, 0, 0)], "%Y", "%H:%M");
        assert_eq!(format, "%Y %H:%M");
    }

    #[test]
    fn test_empty_and_single() {
        assert_eq!(create_time_format_string(&[]), "%d.%b %Y");
        assert_eq!(create_time_format_string(&[ts(5, 1, 2, 3)]), "%d.%b %Y");
    }

    #[test]
    fn test_format_time_step() {
        assert_eq!(format_time_step(&ts(15, 0, 0, 0), "%d.%b %Y"), "15.Mar 2021");
    }

    #[test]
    fn test_invalid_format_falls_back() {
        let text = format_time_step(&ts(15, 0, 0, 0), "%Q");
        assert!(text.starts_with("2021-03-15T00:00:00"));
    }
}
