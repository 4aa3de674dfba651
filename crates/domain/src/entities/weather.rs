//! Weather readings and the weighted rain vote
//!
//! A `ProviderReading` is one upstream source's normalized answer for a
//! coordinate. `aggregate` reduces the readings that succeeded into a
//! single confidence-weighted verdict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Vote weight used when a provider reports no confidence
const DEFAULT_CONFIDENCE: u8 = 100;

/// One provider's normalized weather answer for a coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderReading {
    /// Whether the provider reports rain at the coordinate
    pub is_raining: bool,
    /// Provider-reported confidence in percent (0-100), if any
    pub confidence: Option<u8>,
    /// Free-text condition description
    pub description: String,
    /// Temperature in Celsius, if reported
    pub temperature: Option<f64>,
    /// Relative humidity in percent, if reported
    pub humidity: Option<u8>,
    /// Wind speed in km/h, if reported
    pub wind_speed: Option<f64>,
}

impl ProviderReading {
    /// Base vote weight: reported confidence, or 100 when unspecified
    #[must_use]
    pub fn vote_weight(&self) -> f64 {
        f64::from(self.confidence.unwrap_or(DEFAULT_CONFIDENCE))
    }
}

/// A reading tagged with the provider's standing in the vote
#[derive(Debug, Clone, PartialEq)]
pub struct SourceReading {
    /// The normalized reading
    pub reading: ProviderReading,
    /// Fixed trust multiplier applied to the reading's vote weight
    pub trust: f64,
    /// Preferred source for descriptive and environmental fields
    pub priority: bool,
}

impl SourceReading {
    /// A reading at standard trust with no priority claim
    #[must_use]
    pub fn standard(reading: ProviderReading) -> Self {
        Self {
            reading,
            trust: 1.0,
            priority: false,
        }
    }

    /// Effective vote weight (confidence scaled by trust)
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.reading.vote_weight() * self.trust
    }
}

/// The reduced rain/dry verdict for a coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedWeather {
    /// Verdict: true when the rain-weight sum strictly exceeds half the total
    pub is_raining: bool,
    /// Rain-weight share of the total vote weight, in percent (0-100)
    pub confidence: f64,
    /// Condition description from the designated source
    pub description: String,
    /// Number of providers that answered
    pub sources: usize,
    /// Temperature in Celsius from the designated source
    pub temperature: Option<f64>,
    /// Relative humidity in percent from the designated source
    pub humidity: Option<u8>,
    /// Wind speed in km/h from the designated source
    pub wind_speed: Option<f64>,
    /// When the verdict was computed
    pub observed_at: DateTime<Utc>,
}

/// Reduce successful readings to a single verdict via weighted majority vote
///
/// Each reading votes with `confidence * trust` (confidence defaults to 100
/// when unreported). The verdict is raining iff the rain-weight sum strictly
/// exceeds half the total weight, so an exact tie resolves to not-raining.
/// Confidence is the rain share of the total weight in percent, regardless
/// of which side won.
///
/// Descriptive and environmental fields come from the first priority-flagged
/// source, or the first source when none is flagged. Readings must be passed
/// in provider-configuration order, not completion order.
///
/// Returns `None` when no reading is available.
#[must_use]
pub fn aggregate(sources: &[SourceReading]) -> Option<AggregatedWeather> {
    let first = sources.first()?;

    let total_weight: f64 = sources.iter().map(SourceReading::weight).sum();
    let rain_weight: f64 = sources
        .iter()
        .filter(|s| s.reading.is_raining)
        .map(SourceReading::weight)
        .sum();

    // All-zero confidence degenerates to an uninformative dry verdict
    let confidence = if total_weight > 0.0 {
        rain_weight / total_weight * 100.0
    } else {
        0.0
    };

    let designated = sources.iter().find(|s| s.priority).unwrap_or(first);

    Some(AggregatedWeather {
        is_raining: rain_weight > total_weight / 2.0,
        confidence,
        description: designated.reading.description.clone(),
        sources: sources.len(),
        temperature: designated.reading.temperature,
        humidity: designated.reading.humidity,
        wind_speed: designated.reading.wind_speed,
        observed_at: Utc::now(),
    })
}
