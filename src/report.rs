use std::fmt::Write;

use chrono::{DateTime, Utc};

use crate::loader::{self, Datasets};
use crate::models::{AssessmentResult, DatasetTrack, RecommendationEntry, RiskLevel, UserRecord};

const EXCELLENT_SILHOUETTE: f64 = 0.7;
const GOOD_SILHOUETTE: f64 = 0.5;

const DEVICE_SCHEDULE: [(&str, &str); 7] = [
    ("7:00 AM", "Morning routine (phone-free first hour)"),
    ("9:00 AM", "Check messages (15 min limit)"),
    ("12:00 PM", "Lunch break phone time (15 min)"),
    ("6:00 PM", "Last social media check of day"),
    ("8:00 PM", "All devices to charging station"),
    ("9:00 PM", "Relaxing activities only"),
    ("10:00 PM", "Bedtime routine begins"),
];

const FOUR_WEEK_PLAN: [(&str, &str); 4] = [
    ("Week 1", "Reduce daily screen time by 30 minutes"),
    ("Week 2", "Stop social media use 1 hour before bed"),
    ("Week 3", "Move phone charging outside bedroom"),
    ("Week 4", "Add 30 minutes more sleep nightly"),
];

const PROGRESS_QUESTIONS: [&str; 5] = [
    "How many nights did you avoid screens 1 hour before bed?",
    "What was your average sleep duration this week?",
    "How many times did you use social media after 10 PM?",
    "How refreshed did you feel in the mornings?",
    "Did you keep your phone outside the bedroom?",
];

const SUCCESS_INDICATORS: [&str; 5] = [
    "Fall asleep faster (within 15-20 minutes)",
    "Feel more refreshed in the morning",
    "Less urge to check phone late at night",
    "Better mood and energy during the day",
    "Improved focus and productivity",
];

const UNIVERSAL_GUIDELINES: [&str; 5] = [
    "Daily screen time: aim for under 6 hours total",
    "Social media: limit to 2-3 hours maximum",
    "Evening cutoff: stop scrolling 2 hours before bed",
    "Phone location: charge outside the bedroom",
    "Morning routine: no phones for the first 30 minutes",
];

const SLEEP_HYGIENE: [&str; 5] = [
    "Sleep duration: 7-9 hours for most adults",
    "Consistency: same bedtime and wake time daily",
    "Environment: cool, dark and quiet bedroom",
    "Pre-sleep: reading, meditation or gentle stretching",
    "Avoid: caffeine, large meals and screens before bed",
];

pub fn silhouette_band(score: f64) -> &'static str {
    if score >= EXCELLENT_SILHOUETTE {
        "excellent"
    } else if score >= GOOD_SILHOUETTE {
        "good"
    } else {
        "weak"
    }
}

fn write_list(output: &mut String, items: impl IntoIterator<Item = impl AsRef<str>>) {
    for item in items {
        let _ = writeln!(output, "- {}", item.as_ref());
    }
}

fn write_numbered(output: &mut String, items: impl IntoIterator<Item = impl AsRef<str>>) {
    for (index, item) in items.into_iter().enumerate() {
        let _ = writeln!(output, "{}. {}", index + 1, item.as_ref());
    }
}

fn write_shared_averages<R: UserRecord>(output: &mut String, records: &[R]) {
    let _ = writeln!(
        output,
        "- Sleep: {:.1} hours",
        loader::mean(records, R::sleep_hours)
    );
    let _ = writeln!(
        output,
        "- Social media: {:.1} hours",
        loader::mean(records, R::social_media_hours)
    );
}

pub fn build_overview(data: &Datasets) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Research Overview");
    let _ = writeln!(output, "- Total users analyzed: {}", data.total_users());
    let _ = writeln!(
        output,
        "- Clustering algorithms tested: {}",
        data.algorithms().len()
    );
    if let Some(best) = data.best_silhouette() {
        let _ = writeln!(
            output,
            "- Best silhouette score: {:.3} ({}, {})",
            best.silhouette_score, best.algorithm, best.dataset
        );
    }

    for track in [DatasetTrack::Teen, DatasetTrack::SocialMedia] {
        let _ = writeln!(output);
        match track {
            DatasetTrack::Teen => {
                let _ = writeln!(output, "## Teen Dataset (Ages 13-18)");
                let _ = writeln!(output, "Total users: {}", data.teen.len());
            }
            DatasetTrack::SocialMedia => {
                let _ = writeln!(output, "## Social Media Dataset (Ages 15-35+)");
                let _ = writeln!(output, "Total users: {}", data.social.len());
            }
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### User Groups");
        for share in data.cluster_shares(track) {
            let _ = writeln!(
                output,
                "- {}: {} users ({:.1}%)",
                share.name, share.count, share.percent
            );
        }

        let _ = writeln!(output);
        let _ = writeln!(output, "### Averages");
        match track {
            DatasetTrack::Teen => {
                write_shared_averages(&mut output, &data.teen);
                let _ = writeln!(
                    output,
                    "- Bedtime screens: {:.1} hours",
                    loader::mean(&data.teen, |r| r.screen_before_bed)
                );
            }
            DatasetTrack::SocialMedia => {
                write_shared_averages(&mut output, &data.social);
                let _ = writeln!(
                    output,
                    "- Screen time: {:.1} hours",
                    loader::mean(&data.social, |r| r.screen_time_hours)
                );
                if let Some(exercise) = data.average_exercise() {
                    let _ = writeln!(output, "- Exercise: {exercise:.1} hours");
                }
            }
        }
    }

    output
}

pub fn build_assessment(result: &AssessmentResult) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "# Assessment Results");
    let _ = writeln!(
        output,
        "{} {} (score {})",
        result.severity().marker(),
        result.risk_level,
        result.risk_score
    );
    let _ = writeln!(output, "- User group: {}", result.user_group);
    let _ = writeln!(output, "- {}", result.cluster_insight());
    let _ = writeln!(
        output,
        "- Compared against: {} dataset ({})",
        result.dataset_track,
        result.analysis_model()
    );

    if !result.risk_factors.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Areas for Improvement");
        write_numbered(&mut output, &result.risk_factors);
    }

    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Open the recommendations view to see your personalized action plan."
    );
    output
}

pub fn build_recommendations(
    result: Option<&AssessmentResult>,
    entry: Option<&RecommendationEntry>,
) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Your Personalized Digital Wellness Plan");
    let _ = writeln!(output);

    let Some(result) = result else {
        let _ = writeln!(
            output,
            "Complete the assessment first to get personalized recommendations."
        );
        let _ = writeln!(output);
        let _ = writeln!(output, "## General Guidelines");
        write_list(&mut output, UNIVERSAL_GUIDELINES);
        let _ = writeln!(output);
        let _ = writeln!(output, "## Sleep Hygiene Basics");
        write_list(&mut output, SLEEP_HYGIENE);
        return output;
    };

    let _ = writeln!(output, "## Summary");
    let _ = writeln!(
        output,
        "- Risk level: {} {}",
        result.severity().marker(),
        result.risk_level
    );
    let _ = writeln!(output, "- Score: {}", result.risk_score);
    let _ = writeln!(output, "- User group: {}", result.user_group);
    let _ = writeln!(output, "- Dataset: {}", result.dataset_track);

    let recommendations: &[String] = entry
        .map(|e| e.recommendations.as_slice())
        .unwrap_or_default();
    let sleep_tips: &[String] = entry.map(|e| e.sleep_tips.as_slice()).unwrap_or_default();

    let _ = writeln!(output);
    match result.risk_level {
        RiskLevel::High | RiskLevel::VeryHigh => {
            let _ = writeln!(output, "## Priority Actions");
            let _ = writeln!(
                output,
                "Your digital habits require urgent attention for your health and wellbeing."
            );
            let _ = writeln!(output);
            write_numbered(&mut output, recommendations.iter().take(3));
            let _ = writeln!(output);
            let _ = writeln!(output, "### Daily Device Schedule");
            for (time, activity) in DEVICE_SCHEDULE {
                let _ = writeln!(output, "- {time}: {activity}");
            }
        }
        RiskLevel::Moderate => {
            let _ = writeln!(output, "## Recommended Adjustments");
            let _ = writeln!(
                output,
                "Your habits need some adjustments to optimize your digital wellness."
            );
            let _ = writeln!(output);
            write_numbered(&mut output, recommendations);
            let _ = writeln!(output);
            let _ = writeln!(output, "### 4-Week Improvement Plan");
            for (week, step) in FOUR_WEEK_PLAN {
                let _ = writeln!(output, "- {week}: {step}");
            }
        }
        RiskLevel::Low => {
            let _ = writeln!(output, "## Keep It Up");
            let _ = writeln!(
                output,
                "You have excellent digital wellness habits. Maintain and enhance them."
            );
            let _ = writeln!(output);
            write_numbered(&mut output, recommendations);
            let habits = result.response.positive_habits();
            if !habits.is_empty() {
                let _ = writeln!(output);
                let _ = writeln!(output, "### Your Positive Habits");
                write_list(&mut output, habits);
            }
        }
    }

    if !sleep_tips.is_empty() {
        let _ = writeln!(output);
        let _ = writeln!(output, "## Sleep Quality Improvement Plan");
        write_list(&mut output, sleep_tips);
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Track Your Progress");
    write_numbered(&mut output, PROGRESS_QUESTIONS);
    let _ = writeln!(output);
    let _ = writeln!(output, "### Signs of Success");
    write_list(&mut output, SUCCESS_INDICATORS);

    output
}

pub fn build_research(data: &Datasets) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# How This Assessment Works");

    for track in [DatasetTrack::Teen, DatasetTrack::SocialMedia] {
        let mut rows: Vec<_> = data
            .performance
            .iter()
            .filter(|record| record.track() == Some(track))
            .collect();
        if rows.is_empty() {
            continue;
        }
        rows.sort_by(|a, b| {
            b.silhouette_score
                .partial_cmp(&a.silhouette_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let _ = writeln!(output);
        let _ = writeln!(output, "## {} Dataset", track);
        let _ = writeln!(
            output,
            "| Algorithm | Silhouette | Davies-Bouldin | Quality | Best |"
        );
        let _ = writeln!(output, "|---|---|---|---|---|");
        for row in rows {
            let _ = writeln!(
                output,
                "| {} | {:.3} | {:.3} | {} | {} |",
                row.algorithm,
                row.silhouette_score,
                row.davies_bouldin_score,
                silhouette_band(row.silhouette_score),
                if row.best_model { "yes" } else { "" }
            );
        }
        if let Some(best) = data.best_model(track) {
            let _ = writeln!(
                output,
                "Selected model: {} (silhouette {:.3})",
                best.algorithm, best.silhouette_score
            );
        }
    }

    let _ = writeln!(output);
    let _ = writeln!(output, "## Dataset Composition");
    let total = data.total_users().max(1) as f64;
    let _ = writeln!(
        output,
        "- Teen dataset (ages 13-18): {} users ({:.1}%)",
        data.teen.len(),
        data.teen.len() as f64 * 100.0 / total
    );
    let _ = writeln!(
        output,
        "- Social media dataset (ages 15-35+): {} users ({:.1}%)",
        data.social.len(),
        data.social.len() as f64 * 100.0 / total
    );
    let _ = writeln!(output);
    let _ = writeln!(
        output,
        "Silhouette scores at or above {EXCELLENT_SILHOUETTE} indicate well separated groups."
    );

    output
}

pub fn build_plan_report(
    result: &AssessmentResult,
    entry: Option<&RecommendationEntry>,
    generated_at: DateTime<Utc>,
) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "# Digital Wellness Report");
    let _ = writeln!(
        output,
        "Generated {}",
        generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(output);
    output.push_str(&build_assessment(result));
    let _ = writeln!(output);
    output.push_str(&build_recommendations(Some(result), entry));
    output
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::answers::{
        AgeBand, DifficultySleeping, LateNightUsage, MorningTiredness, PhoneLocation, SleepQuality,
    };
    use crate::loader::{fixtures, load_datasets};
    use crate::models::AssessmentResponse;
    use crate::{recommend, risk};

    fn teen_response() -> AssessmentResponse {
        AssessmentResponse {
            age: AgeBand::EarlyTeen,
            daily_usage_hours: 4,
            social_media_hours: 2,
            sleep_hours: 8,
            bedtime_screen_hours: 0,
            late_night_usage: LateNightUsage::Never,
            sleep_quality: SleepQuality::Good,
            phone_location: PhoneLocation::Outside,
            difficulty_sleeping: DifficultySleeping::Never,
            morning_tiredness: MorningTiredness::AlwaysEnergetic,
        }
    }

    #[test]
    fn silhouette_bands() {
        assert_eq!(silhouette_band(0.775), "excellent");
        assert_eq!(silhouette_band(0.7), "excellent");
        assert_eq!(silhouette_band(0.623), "good");
        assert_eq!(silhouette_band(0.2), "weak");
    }

    #[test]
    fn overview_lists_groups_and_averages() {
        let dir = fixtures::write_data_dir();
        let data = load_datasets(dir.path()).unwrap();
        let overview = build_overview(&data);

        assert!(overview.contains("- Total users analyzed: 7"));
        assert!(overview.contains("- Clustering algorithms tested: 3"));
        assert!(overview.contains("- Best silhouette score: 0.775 (Hierarchical, Social Media)"));
        assert!(overview.contains("- Balanced Usage Group: 2 users (50.0%)"));
        assert!(overview.contains("- High-Risk Users: 1 users (33.3%)"));
        assert!(overview.contains("- Sleep: 6.8 hours"));
        assert!(overview.contains("- Exercise: 0.8 hours"));
    }

    #[test]
    fn assessment_view_numbers_factors() {
        let result = risk::assess(&AssessmentResponse {
            sleep_hours: 5,
            phone_location: PhoneLocation::NextToBed,
            ..teen_response()
        });
        let expected = "\
# Assessment Results
[!] Moderate Risk (score 5)
- User group: Higher Usage Group
- You're in the 50.8% of teens with elevated usage
- Compared against: Teen dataset (K-Means Clustering)

## Areas for Improvement
1. Insufficient sleep duration
2. Phone too close to bed

Open the recommendations view to see your personalized action plan.
";
        assert_eq!(build_assessment(&result), expected);
    }

    #[test]
    fn low_risk_plan_lists_positive_habits() {
        let dir = fixtures::write_data_dir();
        let data = load_datasets(dir.path()).unwrap();
        let result = risk::assess(&teen_response());
        let entry = recommend::select(&result, &data.recommendations);

        let plan = build_recommendations(Some(&result), entry);
        assert!(plan.contains("## Keep It Up"));
        assert!(plan.contains("1. Keep your current screen limits"));
        assert!(plan.contains("- Good late-night habits"));
        assert!(plan.contains("- Keep a consistent bedtime"));
        assert!(plan.contains("## Track Your Progress"));
    }

    #[test]
    fn high_risk_plan_keeps_top_three_actions() {
        let dir = fixtures::write_data_dir();
        let data = load_datasets(dir.path()).unwrap();
        let result = risk::assess(&AssessmentResponse {
            daily_usage_hours: 10,
            social_media_hours: 6,
            sleep_hours: 5,
            bedtime_screen_hours: 2,
            ..teen_response()
        });
        assert_eq!(result.risk_level, RiskLevel::High);
        let entry = recommend::select(&result, &data.recommendations);

        let plan = build_recommendations(Some(&result), entry);
        assert!(plan.contains("3. Move charging out of the bedroom"));
        assert!(!plan.contains("Schedule offline hobbies"));
        assert!(plan.contains("- 8:00 PM: All devices to charging station"));
    }

    #[test]
    fn moderate_plan_walks_through_four_weeks() {
        let result = risk::assess(&AssessmentResponse {
            sleep_hours: 5,
            phone_location: PhoneLocation::NextToBed,
            ..teen_response()
        });
        assert_eq!(result.risk_level, RiskLevel::Moderate);

        let plan = build_recommendations(Some(&result), None);
        assert!(plan.contains("### 4-Week Improvement Plan"));
        assert!(plan.contains("- Week 1: Reduce daily screen time by 30 minutes"));
        assert!(plan.contains("- Week 2: Stop social media use 1 hour before bed"));
        assert!(plan.contains("- Week 3: Move phone charging outside bedroom"));
        assert!(plan.contains("- Week 4: Add 30 minutes more sleep nightly"));
    }

    #[test]
    fn plan_without_assessment_shows_general_tips() {
        let plan = build_recommendations(None, None);
        assert!(plan.contains("Complete the assessment first"));
        assert!(plan.contains("## Sleep Hygiene Basics"));
        assert!(!plan.contains("## Summary"));
    }

    #[test]
    fn research_view_ranks_algorithms() {
        let dir = fixtures::write_data_dir();
        let data = load_datasets(dir.path()).unwrap();
        let research = build_research(&data);

        assert!(research.contains("| K-Means | 0.745 | 0.512 | excellent | yes |"));
        assert!(research.contains("| DBSCAN | 0.589 | 0.902 | good |  |"));
        assert!(research.contains("Selected model: Hierarchical (silhouette 0.775)"));
        assert!(research.contains("- Teen dataset (ages 13-18): 4 users (57.1%)"));
        let teen = research.find("## Teen Dataset").unwrap();
        let social = research.find("## Social Media Dataset").unwrap();
        assert!(teen < social);
    }

    #[test]
    fn plan_report_is_stamped() {
        let result = risk::assess(&teen_response());
        let at = Utc.with_ymd_and_hms(2026, 2, 3, 9, 30, 0).unwrap();
        let report = build_plan_report(&result, None, at);
        assert!(report.starts_with("# Digital Wellness Report\nGenerated 2026-02-03 09:30 UTC\n"));
        assert!(report.contains("# Assessment Results"));
        assert!(report.contains("# Your Personalized Digital Wellness Plan"));
    }
}
