//! Simulated insights for the monitoring page.
//!
//! The live count and anomaly are random picks; the report is static text.
//! None of it is computed from frames or heatmaps.

use rand::Rng;
use serde::Serialize;

/// Legend shown under the interval heatmaps.
pub const HEATMAP_LEGEND: &str = "These heatmaps highlight areas of high and low crowd density using a \
gradient color scale, with red representing high density and blue representing low density.";

/// Bullet items of the AI-driven report as (heading, text).
pub const AI_REPORT: [(&str, &str); 3] = [
    (
        "Peak Density",
        "Observed between 20–30 seconds with a high concentration of people and vehicles.",
    ),
    (
        "Potential Bottlenecks",
        "Identified in Zone B due to the high density of stationary objects.",
    ),
    (
        "Safety Alert",
        "Consider deploying additional resources if crowd density exceeds current levels.",
    ),
];

/// Simulated live crowd count in `1..8`.
pub fn live_crowd_count<R: Rng + ?Sized>(rng: &mut R) -> u32 {
    rng.gen_range(1..8)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Anomaly {
    HighDensityZoneA,
    RapidMovement,
    NoAnomalies,
}

impl Anomaly {
    pub const ALL: [Anomaly; 3] = [
        Anomaly::HighDensityZoneA,
        Anomaly::RapidMovement,
        Anomaly::NoAnomalies,
    ];

    /// Uniform pick over `Anomaly::ALL`.
    pub fn simulate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::ALL[rng.gen_range(0..Self::ALL.len())]
    }

    pub fn label(self) -> &'static str {
        match self {
            Anomaly::HighDensityZoneA => "High Density in Zone A",
            Anomaly::RapidMovement => "Rapid Movement Detected",
            Anomaly::NoAnomalies => "No Anomalies",
        }
    }

    pub fn is_alert(self) -> bool {
        self != Anomaly::NoAnomalies
    }

    /// Text of the warning or success notice.
    pub fn message(self) -> String {
        if self.is_alert() {
            format!("⚠️ Detected Anomaly: {}", self.label())
        } else {
            "✅ No anomalies detected in crowd flow patterns.".to_string()
        }
    }
}
