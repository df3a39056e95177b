use itertools::{Itertools, MinMaxResult};
use term_type::time_series::Snapshot;

/// Smallest WPM range shown on the y axis
const MIN_WPM_SPAN: f64 = 10.0;
/// Axis bounds snap outwards to multiples of this
const WPM_STEP: f64 = 5.0;

/// Axis bounds for the results chart.
///
/// The chart has a single y axis, so the error line is drawn scaled onto the
/// WPM range with `max_errors` at the top.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartBounds {
    pub max_secs: f64,
    pub min_wpm: f64,
    pub max_wpm: f64,
    pub max_errors: usize,
}

impl ChartBounds {
    pub fn from_series(series: &[Snapshot]) -> Self {
        let (mut min_wpm, mut max_wpm) = match series.iter().map(|s| s.wpm).minmax() {
            MinMaxResult::NoElements => (0.0, 0.0),
            MinMaxResult::OneElement(wpm) => (wpm, wpm),
            MinMaxResult::MinMax(min, max) => (min, max),
        };

        if max_wpm - min_wpm < MIN_WPM_SPAN {
            let mid = (max_wpm + min_wpm) / 2.0;
            min_wpm = mid - MIN_WPM_SPAN / 2.0;
            max_wpm = mid + MIN_WPM_SPAN / 2.0;
        }
        min_wpm = ((min_wpm / WPM_STEP).floor() * WPM_STEP).max(0.0);
        max_wpm = (max_wpm / WPM_STEP).ceil() * WPM_STEP;

        let max_secs = series
            .last()
            .map(|s| s.elapsed_secs)
            .unwrap_or(1.0)
            .max(1.0);
        let max_errors = series.iter().map(|s| s.errors).max().unwrap_or(0);

        Self {
            max_secs,
            min_wpm,
            max_wpm,
            max_errors,
        }
    }

    pub fn wpm_span(&self) -> f64 {
        self.max_wpm - self.min_wpm
    }

    pub fn has_errors(&self) -> bool {
        self.max_errors > 0
    }

    /// Maps an error count onto the WPM axis
    pub fn scale_errors(&self, errors: usize) -> f64 {
        let ratio = errors as f64 / self.max_errors.max(1) as f64;
        self.min_wpm + ratio * self.wpm_span()
    }
}

pub fn wpm_points(series: &[Snapshot]) -> Vec<(f64, f64)> {
    series.iter().map(Snapshot::wpm_point).collect()
}

pub fn scaled_error_points(series: &[Snapshot], bounds: &ChartBounds) -> Vec<(f64, f64)> {
    series
        .iter()
        .map(|s| (s.elapsed_secs, bounds.scale_errors(s.errors)))
        .collect()
}

/// Format a simple numeric label consistently
pub fn format_label(val: f64) -> String {
    if (val - val.round()).abs() < f64::EPSILON {
        format!("{}", val.round())
    } else {
        format!("{val:.2}")
    }
}
