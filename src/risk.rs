use chrono::{Duration, NaiveDate, Utc};

use crate::models::{
    DiaryEntry, Emotion, RiskCalculationResult, RiskDetectionSettings, RiskLevel,
};

/// Severity weight of a single emotion label.
/// High-severity negatives (sadness, anger) weigh 2, moderate negatives
/// (anxiety, disgust) weigh 1, everything else 0. Unrecognized labels are
/// silently neutral.
pub fn emotion_score(label: &str) -> i32 {
    match Emotion::from_label(label) {
        Some(Emotion::Sadness) | Some(Emotion::Anger) => 2,
        Some(Emotion::Anxiety) | Some(Emotion::Disgust) => 1,
        _ => 0,
    }
}

/// Severity sum of the unbroken negative run counted back from the most
/// recent entry. The first zero-score entry ends the streak and is not
/// included; entries beyond it are not examined.
pub fn consecutive_score(entries: &[DiaryEntry]) -> i32 {
    let mut total = 0;

    for entry in entries {
        let score = emotion_score(&entry.emotion);
        if score == 0 {
            break;
        }
        total += score;
    }

    total
}

/// Severity sum over every entry in the monitoring window, contiguous or not.
pub fn score_in_period(entries: &[DiaryEntry]) -> i32 {
    entries
        .iter()
        .map(|entry| emotion_score(&entry.emotion))
        .sum()
}

/// Priority cascade over the two scores. A level is assigned when either of
/// its thresholds is reached; higher levels are checked first and
/// short-circuit the rest. Threshold ordering across levels is applied as
/// stored, without validation.
pub fn determine_risk_level(
    consecutive: i32,
    in_period: i32,
    settings: &RiskDetectionSettings,
) -> RiskLevel {
    if consecutive >= settings.high.consecutive_score
        || in_period >= settings.high.score_in_period
    {
        return RiskLevel::High;
    }

    if consecutive >= settings.medium.consecutive_score
        || in_period >= settings.medium.score_in_period
    {
        return RiskLevel::Medium;
    }

    if consecutive >= settings.low.consecutive_score
        || in_period >= settings.low.score_in_period
    {
        return RiskLevel::Low;
    }

    RiskLevel::None
}

/// Human-readable justification for a non-`none` level. Each of the two
/// criteria is re-checked independently against the determined level's
/// thresholds, so one or both messages may appear.
pub fn risk_reasons(
    consecutive: i32,
    in_period: i32,
    level: RiskLevel,
    settings: &RiskDetectionSettings,
) -> Vec<String> {
    let thresholds = match level {
        RiskLevel::None => return Vec::new(),
        RiskLevel::Low => &settings.low,
        RiskLevel::Medium => &settings.medium,
        RiskLevel::High => &settings.high,
    };

    let mut reasons = Vec::new();

    if consecutive >= thresholds.consecutive_score {
        reasons.push(format!(
            "Negative emotions were recorded on consecutive recent days (score {consecutive})"
        ));
    }

    if in_period >= thresholds.score_in_period {
        reasons.push(format!(
            "Negative emotions recurred over the last {} days (score {in_period})",
            settings.monitoring_period
        ));
    }

    reasons
}

/// Full evaluation pass: both scores, the cascade, and the reasons list.
/// Pure over its inputs; safe to call repeatedly from any context.
pub fn calculate_risk_signals(
    entries: &[DiaryEntry],
    settings: &RiskDetectionSettings,
) -> RiskCalculationResult {
    let consecutive = consecutive_score(entries);
    let in_period = score_in_period(entries);
    let risk_level = determine_risk_level(consecutive, in_period, settings);
    let reasons = risk_reasons(consecutive, in_period, risk_level, settings);

    RiskCalculationResult {
        consecutive_score: consecutive,
        score_in_period: in_period,
        risk_level,
        reasons,
    }
}

/// First calendar day inside the monitoring window. The window counts
/// today as day one, so a 14-day period reaches back 13 days.
pub fn cutoff_date(monitoring_period: i64) -> NaiveDate {
    Utc::now().date_naive() - Duration::days(monitoring_period.max(1) - 1)
}
