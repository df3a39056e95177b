use std::time::Duration;

/// Characters per word used by the standard WPM formula.
pub const CHARS_PER_WORD: f64 = 5.0;

/// Number of positions where the typed character matches the target.
pub fn correct_count(input: &[char], target: &[char]) -> usize {
    input
        .iter()
        .zip(target.iter())
        .filter(|(typed, expected)| typed == expected)
        .count()
}

/// Number of positions where the typed character differs from the target.
pub fn wrong_count(input: &[char], target: &[char]) -> usize {
    input
        .iter()
        .zip(target.iter())
        .filter(|(typed, expected)| typed != expected)
        .count()
}

pub fn wpm(correct_chars: usize, elapsed: Duration) -> f64 {
    let minutes = elapsed.as_secs_f64() / 60.0;

    match minutes {
        positive if positive > 0.0 => (correct_chars as f64 / CHARS_PER_WORD) / minutes,
        _ => 0.0,
    }
}

/// Percentage of typed characters that were correct. Empty input counts as
/// full accuracy.
pub fn accuracy(correct_chars: usize, typed_chars: usize) -> f64 {
    match typed_chars {
        0 => 100.0,
        total => correct_chars as f64 / total as f64 * 100.0,
    }
}
