use std::fmt;

use serde::{Deserialize, Deserializer};

use crate::answers::{
    AgeBand, DifficultySleeping, LateNightUsage, MorningTiredness, PhoneLocation, SleepQuality,
    BEDTIME_SCREEN_HOURS, DAILY_USAGE_HOURS, SLEEP_HOURS, SOCIAL_MEDIA_HOURS,
};
use crate::error::DashboardResult;

pub trait UserRecord {
    fn cluster(&self) -> u8;
    fn set_cluster(&mut self, cluster: u8);
    fn sleep_hours(&self) -> f64;
    fn social_media_hours(&self) -> f64;
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TeenRecord {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Daily_Usage_Hours")]
    pub daily_usage_hours: f64,
    #[serde(rename = "Time_on_Social_Media")]
    pub social_media_hours: f64,
    #[serde(rename = "Sleep_Hours")]
    pub sleep_hours: f64,
    #[serde(rename = "Screen_Time_Before_Bed")]
    pub screen_before_bed: f64,
    #[serde(skip)]
    pub cluster: u8,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SocialRecord {
    #[serde(rename = "Age")]
    pub age: f64,
    #[serde(rename = "Screen.Time(hrs)")]
    pub screen_time_hours: f64,
    #[serde(rename = "Social Media Usage (hrs)")]
    pub social_media_hours: f64,
    #[serde(rename = "Sleep Duration")]
    pub sleep_hours: f64,
    #[serde(rename = "Exercise Time (hrs)", default)]
    pub exercise_hours: Option<f64>,
    #[serde(skip)]
    pub cluster: u8,
}

impl UserRecord for TeenRecord {
    fn cluster(&self) -> u8 {
        self.cluster
    }

    fn set_cluster(&mut self, cluster: u8) {
        self.cluster = cluster;
    }

    fn sleep_hours(&self) -> f64 {
        self.sleep_hours
    }

    fn social_media_hours(&self) -> f64 {
        self.social_media_hours
    }
}

impl UserRecord for SocialRecord {
    fn cluster(&self) -> u8 {
        self.cluster
    }

    fn set_cluster(&mut self, cluster: u8) {
        self.cluster = cluster;
    }

    fn sleep_hours(&self) -> f64 {
        self.sleep_hours
    }

    fn social_media_hours(&self) -> f64 {
        self.social_media_hours
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ClusterLabel {
    pub cluster: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecommendationEntry {
    pub key: String,
    pub track: Option<DatasetTrack>,
    pub recommendations: Vec<String>,
    pub sleep_tips: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PerformanceRecord {
    #[serde(rename = "Algorithm")]
    pub algorithm: String,
    #[serde(rename = "Dataset")]
    pub dataset: String,
    #[serde(rename = "Silhouette_Score")]
    pub silhouette_score: f64,
    #[serde(rename = "Davies_Bouldin_Score")]
    pub davies_bouldin_score: f64,
    #[serde(rename = "Best_Model", deserialize_with = "flag")]
    pub best_model: bool,
}

impl PerformanceRecord {
    pub fn track(&self) -> Option<DatasetTrack> {
        DatasetTrack::from_label(&self.dataset)
    }
}

// pandas writes booleans as True/False
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Ok(true),
        "false" | "0" | "no" | "n" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected a boolean flag, got {other:?}"
        ))),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetTrack {
    Teen,
    SocialMedia,
}

impl DatasetTrack {
    pub fn label(self) -> &'static str {
        match self {
            DatasetTrack::Teen => "Teen",
            DatasetTrack::SocialMedia => "Social Media",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        match label.trim().to_lowercase().as_str() {
            "teen" | "teen_dataset" => Some(DatasetTrack::Teen),
            "social media" | "social" | "social_dataset" => Some(DatasetTrack::SocialMedia),
            _ => None,
        }
    }

    pub fn for_age(age: AgeBand) -> Self {
        if age.is_teen() {
            DatasetTrack::Teen
        } else {
            DatasetTrack::SocialMedia
        }
    }

    pub fn analysis_model(self) -> &'static str {
        match self {
            DatasetTrack::Teen => "K-Means Clustering",
            DatasetTrack::SocialMedia => "Hierarchical Clustering",
        }
    }

    pub fn cluster_names(self) -> [&'static str; 2] {
        match self {
            DatasetTrack::Teen => ["Balanced Usage Group", "Higher Usage Group"],
            DatasetTrack::SocialMedia => ["Regular Users", "High-Risk Users"],
        }
    }
}

impl fmt::Display for DatasetTrack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    VeryHigh,
}

impl RiskLevel {
    pub fn label(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low Risk",
            RiskLevel::Moderate => "Moderate Risk",
            RiskLevel::High => "High Risk",
            RiskLevel::VeryHigh => "Very High Risk",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            RiskLevel::Low => Severity::Success,
            RiskLevel::Moderate => Severity::Warning,
            RiskLevel::High | RiskLevel::VeryHigh => Severity::Danger,
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Warning,
    Danger,
}

impl Severity {
    pub fn marker(self) -> &'static str {
        match self {
            Severity::Success => "[ok]",
            Severity::Warning => "[!]",
            Severity::Danger => "[!!]",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UserGroup {
    BalancedUsage,
    HigherUsage,
    RegularUsers,
    HighRiskUsers,
}

impl UserGroup {
    pub fn label(self) -> &'static str {
        match self {
            UserGroup::BalancedUsage => "Balanced Usage Group",
            UserGroup::HigherUsage => "Higher Usage Group",
            UserGroup::RegularUsers => "Regular Users",
            UserGroup::HighRiskUsers => "High-Risk Users",
        }
    }
}

impl fmt::Display for UserGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentResponse {
    pub age: AgeBand,
    pub daily_usage_hours: u32,
    pub social_media_hours: u32,
    pub sleep_hours: u32,
    pub bedtime_screen_hours: u32,
    pub late_night_usage: LateNightUsage,
    pub sleep_quality: SleepQuality,
    pub phone_location: PhoneLocation,
    pub difficulty_sleeping: DifficultySleeping,
    pub morning_tiredness: MorningTiredness,
}

impl AssessmentResponse {
    pub fn validate(&self) -> DashboardResult<()> {
        DAILY_USAGE_HOURS.check(self.daily_usage_hours)?;
        SOCIAL_MEDIA_HOURS.check(self.social_media_hours)?;
        SLEEP_HOURS.check(self.sleep_hours)?;
        BEDTIME_SCREEN_HOURS.check(self.bedtime_screen_hours)?;
        Ok(())
    }

    pub fn positive_habits(&self) -> Vec<&'static str> {
        let mut habits = Vec::new();
        if self.sleep_hours >= 7 {
            habits.push("Healthy sleep duration");
        }
        if self.bedtime_screen_hours <= 1 {
            habits.push("Limited bedtime screen use");
        }
        if self.daily_usage_hours <= 6 {
            habits.push("Reasonable daily screen time");
        }
        if matches!(
            self.late_night_usage,
            LateNightUsage::Never | LateNightUsage::Rarely
        ) {
            habits.push("Good late-night habits");
        }
        habits
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentResult {
    pub dataset_track: DatasetTrack,
    pub risk_score: u32,
    pub risk_level: RiskLevel,
    pub user_group: UserGroup,
    pub risk_factors: Vec<&'static str>,
    pub response: AssessmentResponse,
}

impl AssessmentResult {
    pub fn severity(&self) -> Severity {
        self.risk_level.severity()
    }

    pub fn analysis_model(&self) -> &'static str {
        self.dataset_track.analysis_model()
    }

    pub fn cluster_insight(&self) -> &'static str {
        match (self.dataset_track, self.risk_level) {
            (DatasetTrack::Teen, RiskLevel::High | RiskLevel::VeryHigh) => {
                "You're in the 50.8% of teens with concerning usage patterns"
            }
            (DatasetTrack::Teen, RiskLevel::Moderate) => {
                "You're in the 50.8% of teens with elevated usage"
            }
            (DatasetTrack::Teen, RiskLevel::Low) => {
                "You're in the 49.2% of teens with balanced habits"
            }
            (DatasetTrack::SocialMedia, RiskLevel::High | RiskLevel::VeryHigh) => {
                "You're in the 0.8% requiring immediate intervention"
            }
            (DatasetTrack::SocialMedia, _) => "You're in the 99.2% with typical usage patterns",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response() -> AssessmentResponse {
        AssessmentResponse {
            age: AgeBand::YoungAdult,
            daily_usage_hours: 5,
            social_media_hours: 2,
            sleep_hours: 8,
            bedtime_screen_hours: 0,
            late_night_usage: LateNightUsage::Rarely,
            sleep_quality: SleepQuality::Good,
            phone_location: PhoneLocation::Outside,
            difficulty_sleeping: DifficultySleeping::Never,
            morning_tiredness: MorningTiredness::UsuallyRefreshed,
        }
    }

    #[test]
    fn validate_rejects_out_of_range_hours() {
        assert!(response().validate().is_ok());

        let mut bad = response();
        bad.daily_usage_hours = 0;
        assert!(bad.validate().is_err());

        let mut bad = response();
        bad.social_media_hours = 13;
        assert!(bad.validate().is_err());
    }

    #[test]
    fn positive_habits_follow_thresholds() {
        assert_eq!(
            response().positive_habits(),
            vec![
                "Healthy sleep duration",
                "Limited bedtime screen use",
                "Reasonable daily screen time",
                "Good late-night habits",
            ]
        );

        let mut late = response();
        late.sleep_hours = 6;
        late.bedtime_screen_hours = 2;
        late.daily_usage_hours = 7;
        late.late_night_usage = LateNightUsage::Sometimes;
        assert!(late.positive_habits().is_empty());
    }

    #[test]
    fn track_labels_round_trip_through_performance_names() {
        assert_eq!(DatasetTrack::from_label("Teen"), Some(DatasetTrack::Teen));
        assert_eq!(
            DatasetTrack::from_label(" social media "),
            Some(DatasetTrack::SocialMedia)
        );
        assert_eq!(DatasetTrack::from_label("adults"), None);
    }

    #[test]
    fn severity_tracks_risk_level() {
        assert_eq!(RiskLevel::Low.severity(), Severity::Success);
        assert_eq!(RiskLevel::Moderate.severity(), Severity::Warning);
        assert_eq!(RiskLevel::VeryHigh.severity(), Severity::Danger);
    }
}
