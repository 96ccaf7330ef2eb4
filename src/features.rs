use std::fmt;

use itertools::Itertools;
use rand::Rng;

use crate::geometry::speed;
use crate::recorder::StrokeRecorder;
use crate::signature::{Point, SignatureData, Stroke};
use crate::util::{mean, std_dev};

/// Where a pressure figure came from. Synthetic values are never shown as measured.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Pressure {
    Unavailable,
    /// average of device-reported pressure, 0..=1
    Measured(f64),
    /// made-up percentage, only when explicitly enabled
    Synthetic(f64),
}

impl fmt::Display for Pressure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pressure::Unavailable => write!(f, "unavailable"),
            Pressure::Measured(p) => write!(f, "{:.1}%", p * 100.0),
            Pressure::Synthetic(p) => write!(f, "{p:.1}% (synthetic)"),
        }
    }
}

/// Kinematic summary of a signature, complete or still being drawn.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FeatureSummary {
    pub started: bool,
    pub duration_secs: f64,
    /// logical units per second
    pub speed: f64,
    /// standard deviation of per-segment speeds, logical units per second
    pub speed_variation: f64,
    pub stroke_order: usize,
    pub pressure: Pressure,
}

impl FeatureSummary {
    /// Summary of a recorder mid-capture: the open stroke counts towards duration,
    /// distance, pressure and speed variation, but not towards the stroke order until
    /// it is closed.
    pub fn from_recorder(recorder: &StrokeRecorder, synthetic_pressure: bool) -> Self {
        let Some(start) = recorder.start_time() else {
            return Self::empty();
        };
        let end = recorder.last_timestamp().unwrap_or(start);
        let strokes = recorder.strokes_including_current().collect::<Vec<_>>();

        Self::compute(
            &strokes,
            start,
            end,
            recorder.total_distance(),
            recorder.stroke_count(),
            synthetic_pressure,
        )
    }

    pub fn from_signature(signature: &SignatureData, synthetic_pressure: bool) -> Self {
        if signature.is_empty() {
            return Self::empty();
        }

        let strokes = signature.strokes.iter().collect::<Vec<_>>();
        Self::compute(
            &strokes,
            signature.start_time,
            signature.end_time,
            signature.total_distance,
            signature.stroke_count,
            synthetic_pressure,
        )
    }

    pub fn empty() -> Self {
        Self {
            started: false,
            duration_secs: 0.0,
            speed: 0.0,
            speed_variation: 0.0,
            stroke_order: 0,
            pressure: Pressure::Unavailable,
        }
    }

    fn compute(
        strokes: &[&Stroke],
        start: u64,
        end: u64,
        total_distance: f64,
        stroke_count: usize,
        synthetic_pressure: bool,
    ) -> Self {
        let duration_secs = end.saturating_sub(start) as f64 / 1000.0;
        let speed = if duration_secs > 0.0 {
            total_distance / duration_secs
        } else {
            0.0
        };

        let segment_speeds = strokes
            .iter()
            .flat_map(|s| s.points.iter().tuple_windows())
            .filter(|(a, b)| b.timestamp > a.timestamp)
            .map(|(a, b)| speed_between(a, b))
            .collect::<Vec<f64>>();
        let speed_variation = std_dev(&segment_speeds).unwrap_or(0.0);

        Self {
            started: true,
            duration_secs,
            speed,
            speed_variation,
            stroke_order: stroke_count,
            pressure: pressure_of(strokes, synthetic_pressure),
        }
    }

    /// Label/value pairs in display order.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        if !self.started {
            return vec![
                ("Stroke speed", "-".to_string()),
                ("Stroke pressure", "-".to_string()),
                ("Stroke order", "0".to_string()),
                ("Duration", "-".to_string()),
                ("Speed variation", "-".to_string()),
            ];
        }

        vec![
            ("Stroke speed", format!("{:.1} px/s", self.speed)),
            ("Stroke pressure", self.pressure.to_string()),
            ("Stroke order", self.stroke_order.to_string()),
            ("Duration", format!("{:.2}s", self.duration_secs)),
            ("Speed variation", format!("{:.1} px/s", self.speed_variation)),
        ]
    }
}

fn speed_between(a: &Point, b: &Point) -> f64 {
    // geometry::speed is per millisecond
    speed(a, b) * 1000.0
}

fn pressure_of(strokes: &[&Stroke], synthetic: bool) -> Pressure {
    let readings = strokes
        .iter()
        .flat_map(|s| s.points.iter())
        .filter_map(|p| p.pressure)
        .collect::<Vec<f64>>();

    if let Some(avg) = mean(&readings) {
        return Pressure::Measured(avg);
    }

    if synthetic {
        let mut rng = rand::thread_rng();
        return Pressure::Synthetic(rng.gen_range(70.0..100.0));
    }

    Pressure::Unavailable
}
