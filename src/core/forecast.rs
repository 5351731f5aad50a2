use chrono::{DateTime, Duration, Local, Timelike};
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Weather phrases drawn for the synthetic report. Real weather data is
/// intentionally out of scope; see `generate` for the integration seam.
const WEATHER_CONDITIONS: [&str; 5] = [
    "Partly cloudy with light winds",
    "Overcast skies with calm waters",
    "Clear skies with moderate breeze",
    "Light rain with stable pressure",
    "Sunny with gentle winds",
];

const MOON_PHASES: [&str; 8] = [
    "New Moon",
    "Waxing Crescent",
    "First Quarter",
    "Waxing Gibbous",
    "Full Moon",
    "Waning Gibbous",
    "Last Quarter",
    "Waning Crescent",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActivityLevel {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl ActivityLevel {
    pub fn from_score(score: i32) -> Self {
        match score {
            s if s >= 8 => Self::Excellent,
            s if s >= 6 => Self::Good,
            s if s >= 4 => Self::Fair,
            _ => Self::Poor,
        }
    }

    fn recommendations(self) -> &'static str {
        match self {
            Self::Excellent => "Prime fishing conditions! Fish are likely to be very active.",
            Self::Good => "Good fishing expected. Try live bait or lures.",
            Self::Fair => "Moderate fishing conditions. Be patient and try different spots.",
            Self::Poor => "Challenging conditions. Consider waiting for better weather.",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastReport {
    pub location: String,
    pub forecast_date: String,
    /// Weekday name, only set on extended-forecast entries.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day_name: Option<String>,
    pub bite_score: i32,
    pub activity_level: ActivityLevel,
    pub conditions: String,
    pub moon_phase: String,
    pub best_times: Vec<String>,
    pub recommendations: String,
    pub water_temp: String,
    pub barometric_pressure: String,
}

/// Generate a forecast for a location using the local clock and thread rng.
///
/// Latitude and longitude are accepted but unused for now; they are the
/// seam where a real weather or tide integration would plug in.
pub fn generate(location: &str, _latitude: Option<f64>, _longitude: Option<f64>) -> ForecastReport {
    generate_at(location, &mut rand::thread_rng(), Local::now())
}

/// Same as `generate` but with the rng and clock injected so tests can pin
/// both the random draws and the time-of-day adjustment.
pub fn generate_at(location: &str, rng: &mut impl Rng, now: DateTime<Local>) -> ForecastReport {
    let mut score: i32 = rng.gen_range(4..=8);

    // Dawn and dusk bite better; midday heat slows things down.
    let hour = now.hour();
    if (5..=8).contains(&hour) || (17..=20).contains(&hour) {
        score += rng.gen_range(1..=2);
    } else if (11..=15).contains(&hour) {
        score -= rng.gen_range(0..=1);
    }

    let bite_score = score.clamp(1, 10);
    let activity_level = ActivityLevel::from_score(bite_score);

    ForecastReport {
        location: location.to_string(),
        forecast_date: now.format("%Y-%m-%d").to_string(),
        day_name: None,
        bite_score,
        activity_level,
        conditions: WEATHER_CONDITIONS[rng.gen_range(0..WEATHER_CONDITIONS.len())].to_string(),
        moon_phase: MOON_PHASES[rng.gen_range(0..MOON_PHASES.len())].to_string(),
        best_times: best_times(bite_score),
        recommendations: activity_level.recommendations().to_string(),
        water_temp: format!("{}°F", rng.gen_range(45..=75)),
        barometric_pressure: format!("{:.2} inHg", rng.gen_range(29.5..=30.5)),
    }
}

/// Multi-day forecast: one independent roll per day offset. Conditions do
/// not persist from one day to the next; only the date fields differ.
pub fn extended(location: &str, days: u32) -> Vec<ForecastReport> {
    extended_at(location, days, &mut rand::thread_rng(), Local::now())
}

pub fn extended_at(
    location: &str,
    days: u32,
    rng: &mut impl Rng,
    now: DateTime<Local>,
) -> Vec<ForecastReport> {
    (0..days)
        .map(|offset| {
            let date = now + Duration::days(i64::from(offset));
            let mut report = generate_at(location, rng, now);
            report.forecast_date = date.format("%Y-%m-%d").to_string();
            report.day_name = Some(date.format("%A").to_string());
            report
        })
        .collect()
}

fn best_times(bite_score: i32) -> Vec<String> {
    let windows: &[&str] = if bite_score >= 7 {
        &["6:00-8:00 AM", "6:30-8:30 PM"]
    } else if bite_score >= 5 {
        &["Early morning", "Evening"]
    } else {
        &["Dawn", "Dusk"]
    };
    windows.iter().map(|w| w.to_string()).collect()
}
