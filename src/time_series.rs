/// One progress sample taken while a session is running.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Snapshot {
    pub elapsed_secs: f64,
    pub wpm: f64,
    pub errors: usize,
}

impl Snapshot {
    pub fn new(elapsed_secs: f64, wpm: f64, errors: usize) -> Self {
        Self {
            elapsed_secs,
            wpm,
            errors,
        }
    }

    /// (seconds, wpm) pair as consumed by chart datasets
    pub fn wpm_point(&self) -> (f64, f64) {
        (self.elapsed_secs, self.wpm)
    }
}

/// A graph needs at least two samples to draw a line.
pub fn is_graphable(series: &[Snapshot]) -> bool {
    series.len() >= 2
}
