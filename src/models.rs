use anyhow::bail;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Closed set of emotion labels the diary tagger can attach to an entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emotion {
    Happy,
    Neutral,
    Surprise,
    Sadness,
    Anger,
    Anxiety,
    Disgust,
}

impl Emotion {
    /// Labels outside the closed set map to `None`; callers treat that as
    /// weight zero rather than an error.
    pub fn from_label(label: &str) -> Option<Emotion> {
        match label {
            "happy" => Some(Emotion::Happy),
            "neutral" => Some(Emotion::Neutral),
            "surprise" => Some(Emotion::Surprise),
            "sadness" => Some(Emotion::Sadness),
            "anger" => Some(Emotion::Anger),
            "anxiety" => Some(Emotion::Anxiety),
            "disgust" => Some(Emotion::Disgust),
            _ => None,
        }
    }

}

/// One diary day as consumed by the evaluator. Entries are always handled
/// newest-first and already bounded to the monitoring window.
#[derive(Debug, Clone)]
pub struct DiaryEntry {
    pub entry_date: NaiveDate,
    pub emotion: String,
    pub note: String,
}

/// Risk levels ordered from least to most severe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    None,
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::None => "none",
            RiskLevel::Low => "low",
            RiskLevel::Medium => "medium",
            RiskLevel::High => "high",
        }
    }
}

/// Threshold pair for one risk level. Either criterion being met is enough
/// to assign the level.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelThresholds {
    pub consecutive_score: i32,
    pub score_in_period: i32,
}

/// Administrator-tunable detection thresholds plus the monitoring window.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskDetectionSettings {
    pub monitoring_period: i64,
    pub high: LevelThresholds,
    pub medium: LevelThresholds,
    pub low: LevelThresholds,
}

impl Default for RiskDetectionSettings {
    fn default() -> Self {
        RiskDetectionSettings {
            monitoring_period: 14,
            high: LevelThresholds {
                consecutive_score: 5,
                score_in_period: 8,
            },
            medium: LevelThresholds {
                consecutive_score: 3,
                score_in_period: 5,
            },
            low: LevelThresholds {
                consecutive_score: 2,
                score_in_period: 3,
            },
        }
    }
}

impl RiskDetectionSettings {
    /// Range checks applied once when an administrator saves settings.
    /// Cross-level ordering (high >= medium >= low) is deliberately not
    /// enforced; the cascade applies whatever values are stored.
    pub fn validate(&self) -> anyhow::Result<()> {
        if !(1..=365).contains(&self.monitoring_period) {
            bail!("monitoring period must be between 1 and 365 days");
        }
        for (name, level) in [
            ("high", &self.high),
            ("medium", &self.medium),
            ("low", &self.low),
        ] {
            if !(1..=100).contains(&level.consecutive_score) {
                bail!("{name} consecutive score threshold must be between 1 and 100");
            }
            if !(1..=200).contains(&level.score_in_period) {
                bail!("{name} score-in-period threshold must be between 1 and 200");
            }
        }
        Ok(())
    }
}

/// Outcome of one evaluator run. Constructed fresh per call and never
/// persisted by the evaluator itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RiskCalculationResult {
    pub consecutive_score: i32,
    pub score_in_period: i32,
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
}

/// Wire envelope handed to the calling layer. `urgent_counseling_phones`
/// is filled from the counseling-resource directory only at `high`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RiskAnalysis {
    pub risk_level: RiskLevel,
    pub reasons: Vec<String>,
    pub analysis: AnalysisDetail,
    pub urgent_counseling_phones: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisDetail {
    pub monitoring_period: i64,
    pub consecutive_score: i32,
    pub score_in_period: i32,
}

/// Counseling contact record; urgent ones surface in high-risk alerts.
#[derive(Debug, Clone)]
pub struct CounselingResource {
    pub name: String,
    pub phone: String,
    pub is_urgent: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_known_label_parses_to_its_variant() {
        assert_eq!(Emotion::from_label("happy"), Some(Emotion::Happy));
        assert_eq!(Emotion::from_label("neutral"), Some(Emotion::Neutral));
        assert_eq!(Emotion::from_label("surprise"), Some(Emotion::Surprise));
        assert_eq!(Emotion::from_label("sadness"), Some(Emotion::Sadness));
        assert_eq!(Emotion::from_label("anger"), Some(Emotion::Anger));
        assert_eq!(Emotion::from_label("anxiety"), Some(Emotion::Anxiety));
        assert_eq!(Emotion::from_label("disgust"), Some(Emotion::Disgust));
    }

    #[test]
    fn unknown_labels_are_rejected() {
        assert!(Emotion::from_label("ecstatic").is_none());
        assert!(Emotion::from_label("").is_none());
        assert!(Emotion::from_label("Sadness").is_none());
    }

    #[test]
    fn default_settings_match_legacy_values() {
        let settings = RiskDetectionSettings::default();
        assert_eq!(settings.monitoring_period, 14);
        assert_eq!(settings.high.consecutive_score, 5);
        assert_eq!(settings.high.score_in_period, 8);
        assert_eq!(settings.medium.consecutive_score, 3);
        assert_eq!(settings.medium.score_in_period, 5);
        assert_eq!(settings.low.consecutive_score, 2);
        assert_eq!(settings.low.score_in_period, 3);
    }

    #[test]
    fn risk_levels_order_by_severity() {
        assert!(RiskLevel::None < RiskLevel::Low);
        assert!(RiskLevel::Low < RiskLevel::Medium);
        assert!(RiskLevel::Medium < RiskLevel::High);
    }

    #[test]
    fn validation_rejects_out_of_range_values() {
        let mut settings = RiskDetectionSettings::default();
        assert!(settings.validate().is_ok());

        settings.monitoring_period = 0;
        assert!(settings.validate().is_err());

        settings.monitoring_period = 14;
        settings.low.consecutive_score = 101;
        assert!(settings.validate().is_err());

        settings.low.consecutive_score = 2;
        settings.medium.score_in_period = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn analysis_envelope_serializes_in_camel_case() {
        let analysis = RiskAnalysis {
            risk_level: RiskLevel::High,
            reasons: vec!["streak".to_string()],
            analysis: AnalysisDetail {
                monitoring_period: 14,
                consecutive_score: 10,
                score_in_period: 10,
            },
            urgent_counseling_phones: vec!["1393".to_string()],
        };

        let json = serde_json::to_value(&analysis).unwrap();
        assert_eq!(json["riskLevel"], "high");
        assert_eq!(json["analysis"]["monitoringPeriod"], 14);
        assert_eq!(json["analysis"]["consecutiveScore"], 10);
        assert_eq!(json["urgentCounselingPhones"][0], "1393");
    }
}
