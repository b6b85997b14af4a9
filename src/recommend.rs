use tracing::debug;

use crate::models::{AssessmentResult, DatasetTrack, RecommendationEntry, RiskLevel, UserGroup};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Segment {
    TeenLow,
    TeenModerate,
    TeenHigh,
    SocialModerate,
    SocialVeryHigh,
}

impl Segment {
    pub const ALL: [Segment; 5] = [
        Segment::TeenLow,
        Segment::TeenModerate,
        Segment::TeenHigh,
        Segment::SocialModerate,
        Segment::SocialVeryHigh,
    ];

    pub fn of(result: &AssessmentResult) -> Self {
        match (result.dataset_track, result.risk_level) {
            (DatasetTrack::Teen, RiskLevel::Low) => Segment::TeenLow,
            (DatasetTrack::Teen, RiskLevel::Moderate) => Segment::TeenModerate,
            (DatasetTrack::Teen, RiskLevel::High | RiskLevel::VeryHigh) => Segment::TeenHigh,
            (DatasetTrack::SocialMedia, RiskLevel::High | RiskLevel::VeryHigh) => {
                Segment::SocialVeryHigh
            }
            (DatasetTrack::SocialMedia, RiskLevel::Low | RiskLevel::Moderate) => {
                Segment::SocialModerate
            }
        }
    }

    pub fn track(self) -> DatasetTrack {
        match self {
            Segment::TeenLow | Segment::TeenModerate | Segment::TeenHigh => DatasetTrack::Teen,
            Segment::SocialModerate | Segment::SocialVeryHigh => DatasetTrack::SocialMedia,
        }
    }

    pub fn user_group(self) -> UserGroup {
        match self {
            Segment::TeenLow => UserGroup::BalancedUsage,
            Segment::TeenModerate | Segment::TeenHigh => UserGroup::HigherUsage,
            Segment::SocialModerate => UserGroup::RegularUsers,
            Segment::SocialVeryHigh => UserGroup::HighRiskUsers,
        }
    }

    pub fn recommendation_key(self) -> &'static str {
        self.user_group().label()
    }
}

/// Exact lookup by segment key. Track-tagged entries must also match the
/// segment's track.
pub fn lookup(segment: Segment, entries: &[RecommendationEntry]) -> Option<&RecommendationEntry> {
    let key = segment.recommendation_key();
    entries.iter().find(|entry| {
        entry.key.trim().eq_ignore_ascii_case(key)
            && entry.track.map_or(true, |track| track == segment.track())
    })
}

/// First entry whose key contains `user_group`, ignoring case.
///
/// With no match this falls back to the last entry for any level containing
/// "High" and to the first entry otherwise. The fallback is a best-effort
/// guess, not a guaranteed match. `None` only for an empty list.
pub fn select_by_group<'a>(
    user_group: &str,
    risk_level: RiskLevel,
    entries: &'a [RecommendationEntry],
) -> Option<&'a RecommendationEntry> {
    let needle = user_group.to_lowercase();
    if let Some(found) = entries
        .iter()
        .find(|entry| entry.key.to_lowercase().contains(&needle))
    {
        return Some(found);
    }

    debug!(
        target: "dashboard::recommend",
        user_group,
        risk_level = risk_level.label(),
        "no recommendation entry matched, using fallback"
    );
    if risk_level.label().contains("High") {
        entries.last()
    } else {
        entries.first()
    }
}

pub fn select<'a>(
    result: &AssessmentResult,
    entries: &'a [RecommendationEntry],
) -> Option<&'a RecommendationEntry> {
    let segment = Segment::of(result);
    lookup(segment, entries)
        .or_else(|| select_by_group(result.user_group.label(), result.risk_level, entries))
}
