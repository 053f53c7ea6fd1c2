use std::time::Duration;

use crate::session::Status;

/// Characters per standardized word
const CHARS_PER_WORD: f64 = 5.0;

/// Words per minute, accuracy percentage and elapsed seconds for a session
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub wpm: u32,
    pub accuracy: u32,
    pub time: f64,
}

impl Default for Stats {
    /// Nothing typed yet counts as perfect accuracy.
    fn default() -> Self {
        Self {
            wpm: 0,
            accuracy: 100,
            time: 0.0,
        }
    }
}

impl Stats {
    /// WPM scaled down by accuracy, as shown on the results card
    pub fn adjusted_wpm(&self) -> u32 {
        self.wpm * self.accuracy / 100
    }
}

/// Core formula shared by the live and final variants.
///
/// `total_chars - mistakes` may go negative when mistakes outnumber the
/// characters counted; wpm is floored at zero and accuracy clamped to
/// `0..=100`. A zero-length interval yields zero wpm instead of dividing.
pub fn compute_stats(start: Duration, end: Duration, mistakes: usize, total_chars: usize) -> Stats {
    let time = end.saturating_sub(start).as_secs_f64();
    let duration_in_minutes = time / 60.0;

    let correct_chars = total_chars as f64 - mistakes as f64;

    let wpm = if duration_in_minutes > 0.0 {
        (correct_chars / CHARS_PER_WORD / duration_in_minutes)
            .max(0.0)
            .round() as u32
    } else {
        0
    };

    let accuracy = if total_chars > 0 {
        (correct_chars / total_chars as f64 * 100.0)
            .round()
            .clamp(0.0, 100.0) as u32
    } else {
        100
    };

    Stats {
        wpm,
        accuracy,
        time,
    }
}

/// Stats for an in-progress session, measured against `now` and the
/// characters typed so far. Defaults are returned before the first
/// keystroke, after completion and while paused or counting down.
pub fn live_stats(
    start: Option<Duration>,
    now: Duration,
    mistakes: usize,
    input_len: usize,
    status: Status,
) -> Stats {
    match (start, status) {
        (None, _)
        | (_, Status::Finished)
        | (_, Status::Paused)
        | (_, Status::ResumeCountdown(_)) => Stats::default(),
        (Some(start), _) => compute_stats(start, now, mistakes, input_len),
    }
}

/// Stats for a completed session: fixed end time, full target length.
pub fn final_stats(start: Duration, end: Duration, mistakes: usize, target_len: usize) -> Stats {
    compute_stats(start, end, mistakes, target_len)
}
