use std::fmt;
use std::str::FromStr;

use crate::error::{DashboardError, DashboardResult};

pub trait Choice: Sized + Copy + 'static {
    const QUESTION: &'static str;
    const ALL: &'static [Self];

    fn label(self) -> &'static str;
}

fn normalize(input: &str) -> String {
    input.trim().replace(['\u{2013}', '\u{2014}'], "-").to_lowercase()
}

// Full label, case-insensitive, or a prefix matching exactly one option.
pub fn parse_choice<T: Choice>(input: &str) -> DashboardResult<T> {
    let wanted = normalize(input);
    if wanted.is_empty() {
        return Err(DashboardError::invalid_category(T::QUESTION, input));
    }

    if let Some(exact) = T::ALL
        .iter()
        .copied()
        .find(|option| option.label().to_lowercase() == wanted)
    {
        return Ok(exact);
    }

    let mut prefixed = T::ALL
        .iter()
        .copied()
        .filter(|option| option.label().to_lowercase().starts_with(&wanted));
    match (prefixed.next(), prefixed.next()) {
        (Some(only), None) => Ok(only),
        _ => Err(DashboardError::invalid_category(T::QUESTION, input)),
    }
}

macro_rules! choice_enum {
    ($name:ident, $question:literal, { $($variant:ident => $label:literal),+ $(,)? }) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl Choice for $name {
            const QUESTION: &'static str = $question;
            const ALL: &'static [Self] = &[$($name::$variant),+];

            fn label(self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }
        }

        impl FromStr for $name {
            type Err = DashboardError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_choice(s)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.label())
            }
        }
    };
}

choice_enum!(AgeBand, "age group", {
    EarlyTeen => "13-15 (Early Teen)",
    LateTeen => "16-18 (Late Teen)",
    YoungAdult => "19-22 (Young Adult)",
    Adult => "23-27 (Adult)",
    YoungProfessional => "28-35 (Young Professional)",
    MidCareer => "36-45 (Mid-Career)",
    Mature => "46+ (Mature Adult)",
});

choice_enum!(LateNightUsage, "late-night social media use", {
    Never => "Never",
    Rarely => "Rarely (1-2 times/week)",
    Sometimes => "Sometimes (3-4 times/week)",
    Often => "Often (5-6 times/week)",
    EveryNight => "Every night",
});

choice_enum!(SleepQuality, "sleep quality", {
    VeryPoor => "Very Poor",
    Poor => "Poor",
    Average => "Average",
    Good => "Good",
    Excellent => "Excellent",
});

choice_enum!(PhoneLocation, "phone location", {
    NextToBed => "Yes, next to my bed",
    AcrossRoom => "Yes, but across the room",
    Outside => "No, I charge it outside",
});

choice_enum!(DifficultySleeping, "difficulty falling asleep", {
    Always => "Always",
    Often => "Often",
    Sometimes => "Sometimes",
    Rarely => "Rarely",
    Never => "Never",
});

choice_enum!(MorningTiredness, "morning tiredness", {
    AlwaysExhausted => "Always exhausted",
    UsuallyTired => "Usually tired",
    SometimesTired => "Sometimes tired",
    UsuallyRefreshed => "Usually refreshed",
    AlwaysEnergetic => "Always energetic",
});

impl AgeBand {
    pub fn is_teen(self) -> bool {
        matches!(self, AgeBand::EarlyTeen | AgeBand::LateTeen)
    }
}

impl LateNightUsage {
    pub fn points(self) -> u32 {
        match self {
            LateNightUsage::Never => 0,
            LateNightUsage::Rarely => 1,
            LateNightUsage::Sometimes => 2,
            LateNightUsage::Often => 3,
            LateNightUsage::EveryNight => 4,
        }
    }
}

impl SleepQuality {
    pub fn points(self) -> u32 {
        match self {
            SleepQuality::VeryPoor => 3,
            SleepQuality::Poor => 2,
            SleepQuality::Average => 1,
            SleepQuality::Good | SleepQuality::Excellent => 0,
        }
    }

    pub fn is_poor(self) -> bool {
        matches!(self, SleepQuality::VeryPoor | SleepQuality::Poor)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct HoursRange {
    pub question: &'static str,
    pub min: u32,
    pub max: u32,
    pub default: u32,
}

impl HoursRange {
    pub fn check(self, value: u32) -> DashboardResult<u32> {
        if (self.min..=self.max).contains(&value) {
            Ok(value)
        } else {
            Err(DashboardError::ValueOutOfRange {
                question: self.question,
                value,
                min: self.min,
                max: self.max,
            })
        }
    }

    pub fn parse(self, input: &str) -> DashboardResult<u32> {
        let value = input
            .trim()
            .parse::<u32>()
            .map_err(|_| DashboardError::invalid_category(self.question, input))?;
        self.check(value)
    }
}

pub const DAILY_USAGE_HOURS: HoursRange = HoursRange {
    question: "total daily screen time",
    min: 1,
    max: 16,
    default: 6,
};
pub const SOCIAL_MEDIA_HOURS: HoursRange = HoursRange {
    question: "daily social media time",
    min: 0,
    max: 12,
    default: 3,
};
pub const SLEEP_HOURS: HoursRange = HoursRange {
    question: "average sleep per night",
    min: 3,
    max: 12,
    default: 7,
};
pub const BEDTIME_SCREEN_HOURS: HoursRange = HoursRange {
    question: "screen time before bed",
    min: 0,
    max: 5,
    default: 1,
};
