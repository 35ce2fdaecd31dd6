use std::fmt::Write;

use chrono::NaiveDate;

use crate::models::{DiaryEntry, RiskCalculationResult, RiskLevel};
use crate::risk;

#[derive(Debug, Clone)]
pub struct EmotionSummary {
    pub emotion: String,
    pub count: usize,
    pub severity_total: i32,
}

/// Alert copy for each risk level, keyed off the closed level enumeration.
/// `none` produces no alert.
pub fn notification_message(risk_level: RiskLevel) -> &'static str {
    match risk_level {
        RiskLevel::High => {
            "A serious warning sign was detected in your recent emotional pattern. \
             We recommend reaching out to a professional."
        }
        RiskLevel::Medium => {
            "Negative emotions have persisted recently. Take a moment to check in \
             with yourself, and consider talking to a counselor."
        }
        RiskLevel::Low => {
            "Negative emotions have come up repeatedly. Try to set aside some time \
             to look after yourself."
        }
        RiskLevel::None => "",
    }
}

pub fn summarize_emotions(entries: &[DiaryEntry]) -> Vec<EmotionSummary> {
    let mut map: std::collections::HashMap<String, (usize, i32)> =
        std::collections::HashMap::new();

    for entry in entries {
        let slot = map.entry(entry.emotion.clone()).or_insert((0, 0));
        slot.0 += 1;
        slot.1 += risk::emotion_score(&entry.emotion);
    }

    let mut summaries: Vec<EmotionSummary> = map
        .into_iter()
        .map(|(emotion, (count, severity_total))| EmotionSummary {
            emotion,
            count,
            severity_total,
        })
        .collect();

    summaries.sort_by(|a, b| b.count.cmp(&a.count).then(a.emotion.cmp(&b.emotion)));
    summaries
}

pub fn build_report(
    email: &str,
    monitoring_period: i64,
    cutoff: NaiveDate,
    entries: &[DiaryEntry],
    result: &RiskCalculationResult,
) -> String {
    let summaries = summarize_emotions(entries);

    let mut output = String::new();

    let _ = writeln!(output, "# Emotion Diary Risk Report");
    let _ = writeln!(
        output,
        "Generated for {} ({}-day window since {})",
        email, monitoring_period, cutoff
    );
    let _ = writeln!(output);
    let _ = writeln!(output, "## Emotion Mix");

    if summaries.is_empty() {
        let _ = writeln!(output, "No diary entries recorded in this window.");
    } else {
        for summary in summaries.iter() {
            let _ = writeln!(
                output,
                "- {}: {} entries (severity {})",
                summary.emotion, summary.count, summary.severity_total
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Risk Assessment");
    let _ = writeln!(output, "- Level: {}", result.risk_level.as_str());
    let _ = writeln!(output, "- Consecutive score: {}", result.consecutive_score);
    let _ = writeln!(output, "- Score in period: {}", result.score_in_period);

    if !result.reasons.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "### Why");
        for reason in result.reasons.iter() {
            let _ = writeln!(output, "- {reason}");
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Recent Entries");

    if entries.is_empty() {
        let _ = writeln!(output, "No diary entries recorded in this window.");
    } else {
        for entry in entries.iter().take(5) {
            let _ = writeln!(
                output,
                "- {} ({}): {}",
                entry.entry_date, entry.emotion, entry.note
            );
        }
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RiskDetectionSettings;
    use chrono::{Duration, Utc};

    fn entries(labels: &[&str]) -> Vec<DiaryEntry> {
        let today = Utc::now().date_naive();
        labels
            .iter()
            .enumerate()
            .map(|(days_ago, label)| DiaryEntry {
                entry_date: today - Duration::days(days_ago as i64),
                emotion: label.to_string(),
                note: format!("note {days_ago}"),
            })
            .collect()
    }

    #[test]
    fn only_none_level_has_no_message() {
        assert!(notification_message(RiskLevel::None).is_empty());
        assert!(!notification_message(RiskLevel::Low).is_empty());
        assert!(!notification_message(RiskLevel::Medium).is_empty());
        assert!(!notification_message(RiskLevel::High).is_empty());
    }

    #[test]
    fn summary_counts_and_weighs_each_label() {
        let diary = entries(&["sadness", "happy", "sadness", "anxiety"]);
        let summaries = summarize_emotions(&diary);

        let sadness = summaries
            .iter()
            .find(|summary| summary.emotion == "sadness")
            .unwrap();
        assert_eq!(sadness.count, 2);
        assert_eq!(sadness.severity_total, 4);

        let happy = summaries
            .iter()
            .find(|summary| summary.emotion == "happy")
            .unwrap();
        assert_eq!(happy.severity_total, 0);
    }

    #[test]
    fn report_includes_assessment_and_reasons() {
        let settings = RiskDetectionSettings::default();
        let diary = entries(&["sadness", "sadness", "sadness"]);
        let result = risk::calculate_risk_signals(&diary, &settings);
        let cutoff = risk::cutoff_date(settings.monitoring_period);

        let report = build_report(
            "mina.park@example.com",
            settings.monitoring_period,
            cutoff,
            &diary,
            &result,
        );

        assert!(report.contains("# Emotion Diary Risk Report"));
        assert!(report.contains("Level: high"));
        assert!(report.contains("Consecutive score: 6"));
        assert!(report.contains("### Why"));
        assert!(report.contains("sadness: 3 entries"));
    }

    #[test]
    fn empty_window_report_says_so() {
        let settings = RiskDetectionSettings::default();
        let result = risk::calculate_risk_signals(&[], &settings);
        let cutoff = risk::cutoff_date(settings.monitoring_period);

        let report = build_report(
            "juno.kim@example.com",
            settings.monitoring_period,
            cutoff,
            &[],
            &result,
        );

        assert!(report.contains("No diary entries recorded in this window."));
        assert!(report.contains("Level: none"));
        assert!(!report.contains("### Why"));
    }
}
