use crate::answers::PhoneLocation;
use crate::models::{AssessmentResponse, AssessmentResult, DatasetTrack, RiskLevel, UserGroup};

pub const HIGH_RISK_SCORE: u32 = 8;
pub const TEEN_MODERATE_SCORE: u32 = 4;

struct UsageThresholds {
    daily_usage_hours: u32,
    social_media_hours: u32,
    daily_factor: &'static str,
    social_factor: &'static str,
}

fn usage_thresholds(track: DatasetTrack) -> UsageThresholds {
    match track {
        DatasetTrack::Teen => UsageThresholds {
            daily_usage_hours: 6,
            social_media_hours: 3,
            daily_factor: "High daily screen time for teens",
            social_factor: "Excessive social media use for teen age group",
        },
        DatasetTrack::SocialMedia => UsageThresholds {
            daily_usage_hours: 8,
            social_media_hours: 4,
            daily_factor: "High daily screen time for adults",
            social_factor: "Excessive social media use for adult age group",
        },
    }
}

pub fn score_response(response: &AssessmentResponse) -> (u32, Vec<&'static str>) {
    let track = DatasetTrack::for_age(response.age);
    let limits = usage_thresholds(track);
    let mut score = 0;
    let mut factors = Vec::new();

    if response.daily_usage_hours > limits.daily_usage_hours {
        score += 2;
        factors.push(limits.daily_factor);
    }
    if response.social_media_hours > limits.social_media_hours {
        score += 2;
        factors.push(limits.social_factor);
    }

    if response.sleep_hours < 6 {
        score += 3;
        factors.push("Insufficient sleep duration");
    } else if response.sleep_hours < 7 {
        score += 1;
        factors.push("Below optimal sleep duration");
    }

    if response.bedtime_screen_hours > 2 {
        score += 3;
        factors.push("Excessive bedtime screen exposure");
    } else if response.bedtime_screen_hours > 1 {
        score += 1;
        factors.push("Some bedtime screen use");
    }

    let late_night = response.late_night_usage.points();
    score += late_night;
    if late_night > 2 {
        factors.push("Frequent late-night social media use");
    }

    score += response.sleep_quality.points();
    if response.sleep_quality.is_poor() {
        factors.push("Poor sleep quality");
    }

    if response.phone_location == PhoneLocation::NextToBed {
        score += 2;
        factors.push("Phone too close to bed");
    }

    (score, factors)
}

pub fn classify(track: DatasetTrack, score: u32) -> (UserGroup, RiskLevel) {
    match track {
        DatasetTrack::Teen if score >= HIGH_RISK_SCORE => (UserGroup::HigherUsage, RiskLevel::High),
        DatasetTrack::Teen if score >= TEEN_MODERATE_SCORE => {
            (UserGroup::HigherUsage, RiskLevel::Moderate)
        }
        DatasetTrack::Teen => (UserGroup::BalancedUsage, RiskLevel::Low),
        // no low-risk bucket on this track
        DatasetTrack::SocialMedia if score >= HIGH_RISK_SCORE => {
            (UserGroup::HighRiskUsers, RiskLevel::VeryHigh)
        }
        DatasetTrack::SocialMedia => (UserGroup::RegularUsers, RiskLevel::Moderate),
    }
}

pub fn assess(response: &AssessmentResponse) -> AssessmentResult {
    let dataset_track = DatasetTrack::for_age(response.age);
    let (risk_score, risk_factors) = score_response(response);
    let (user_group, risk_level) = classify(dataset_track, risk_score);

    tracing::debug!(
        target: "dashboard::risk",
        track = dataset_track.label(),
        risk_score,
        risk_level = risk_level.label(),
        factors = risk_factors.len(),
        "assessment scored"
    );

    AssessmentResult {
        dataset_track,
        risk_score,
        risk_level,
        user_group,
        risk_factors,
        response: response.clone(),
    }
}
