use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::stats::{final_stats, live_stats, Stats};
use crate::timers::{TimerId, TimerKind, Timers};

/// The resume countdown always starts here, whichever way it was entered
pub const COUNTDOWN_FROM: u8 = 3;
pub const COUNTDOWN_STEP: Duration = Duration::from_secs(1);
pub const DEFAULT_TICK_RATE: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum Status {
    /// Words not loaded yet, or loaded but nothing typed
    Idle,
    Running,
    Paused,
    /// Seconds left before typing resumes
    ResumeCountdown(u8),
    Finished,
}

/// External yes/no gate consulted before a reset discards progress
pub trait Confirm {
    fn confirm(&self) -> bool;
}

impl<F: Fn() -> bool> Confirm for F {
    fn confirm(&self) -> bool {
        self()
    }
}

/// What happened to a submitted input value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// Paused, counting down, finished, or no words loaded yet
    Ignored,
    Accepted,
    /// The input reached the target length and the session finished
    Completed,
}

/// Notification emitted by `toggle_pause`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PauseEvent {
    Paused,
    Resuming,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResetOutcome {
    /// State was cleared; words for `generation` must be fetched
    Confirmed { generation: u64 },
    Declined,
}

/// How a single target character should be shown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CharState {
    Correct,
    Incorrect,
    Cursor,
    Pending,
}

/// Everything the rendering layer reads from a session
#[derive(Debug, Clone, PartialEq)]
pub struct SessionView {
    pub words: Vec<String>,
    pub user_input: String,
    pub status: Status,
    pub live_wpm: u32,
    pub live_accuracy: u32,
    pub elapsed_time: f64,
    pub mistake_count: usize,
    pub countdown: Option<u8>,
}

/// A single typing session: target text, input, timing anchors, mistakes
/// and the timers driving live stats and the resume countdown.
#[derive(Debug)]
pub struct Session<C: Clock = SystemClock> {
    clock: C,
    tick_rate: Duration,
    generation: u64,
    words: Vec<String>,
    target: Vec<char>,
    input: String,
    mistakes: usize,
    start_time: Option<Duration>,
    end_time: Option<Duration>,
    paused_at: Option<Duration>,
    paused_total: Duration,
    status: Status,
    live: Stats,
    timers: Timers,
}

impl<C: Clock> Session<C> {
    pub fn new(clock: C) -> Self {
        Self::with_tick_rate(clock, DEFAULT_TICK_RATE)
    }

    pub fn with_tick_rate(clock: C, tick_rate: Duration) -> Self {
        Self {
            clock,
            // a zero period would keep the live tick due forever
            tick_rate: tick_rate.max(Duration::from_millis(1)),
            generation: 0,
            words: Vec::new(),
            target: Vec::new(),
            input: String::new(),
            mistakes: 0,
            start_time: None,
            end_time: None,
            paused_at: None,
            paused_total: Duration::ZERO,
            status: Status::Idle,
            live: Stats::default(),
            timers: Timers::default(),
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn target_text(&self) -> String {
        self.target.iter().collect()
    }

    pub fn target_len(&self) -> usize {
        self.target.len()
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn mistake_count(&self) -> usize {
        self.mistakes
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn start_time(&self) -> Option<Duration> {
        self.start_time
    }

    pub fn end_time(&self) -> Option<Duration> {
        self.end_time
    }

    pub fn live_stats(&self) -> Stats {
        self.live
    }

    pub fn countdown(&self) -> Option<u8> {
        match self.status {
            Status::ResumeCountdown(n) => Some(n),
            _ => None,
        }
    }

    pub fn is_loaded(&self) -> bool {
        !self.target.is_empty()
    }

    pub fn has_finished(&self) -> bool {
        self.status == Status::Finished
    }

    pub fn is_timer_active(&self, kind: TimerKind) -> bool {
        self.timers.is_active(kind)
    }

    /// Install the target words for `generation`. Deliveries for an older
    /// generation, empty lists and second loads are dropped.
    pub fn load_words(&mut self, generation: u64, words: Vec<String>) -> bool {
        if generation != self.generation {
            tracing::debug!(
                generation,
                current = self.generation,
                "dropping words fetched for a previous session"
            );
            return false;
        }
        if words.is_empty() || self.is_loaded() {
            return false;
        }

        self.target = words.join(" ").chars().collect();
        self.words = words;
        tracing::debug!(
            words = self.words.len(),
            chars = self.target.len(),
            "target text loaded"
        );
        true
    }

    /// Replace the input with `value`, the full content of the input field.
    ///
    /// Only the newest character is checked against the target, so a
    /// mistake is counted once when typed and never taken back.
    pub fn submit_input(&mut self, value: &str) -> Submission {
        if matches!(
            self.status,
            Status::Paused | Status::ResumeCountdown(_) | Status::Finished
        ) || !self.is_loaded()
        {
            return Submission::Ignored;
        }

        let now = self.clock.now();
        let len = value.chars().count();

        if self.start_time.is_none() && len == 1 {
            self.start(now);
        }

        if let Some(new_char) = value.chars().last() {
            match self.target.get(len - 1) {
                Some(&expected) if expected != new_char => {
                    self.mistakes += 1;
                    tracing::trace!(index = len - 1, %expected, got = %new_char, "mistake");
                }
                _ => {}
            }
        }

        self.input = value.to_owned();

        if len >= self.target.len() {
            self.finish(now);
            return Submission::Completed;
        }

        self.refresh_live_stats();
        Submission::Accepted
    }

    /// Append one character to the current input
    pub fn type_char(&mut self, c: char) -> Submission {
        let mut value = self.input.clone();
        value.push(c);
        self.submit_input(&value)
    }

    /// Drop the last character of the current input
    pub fn backspace(&mut self) -> Submission {
        let mut value = self.input.clone();
        if value.pop().is_none() {
            return Submission::Ignored;
        }
        self.submit_input(&value)
    }

    /// Running pauses; paused or counting down (re)starts the countdown.
    pub fn toggle_pause(&mut self) -> Option<PauseEvent> {
        let now = self.clock.now();
        match self.status {
            Status::Running => {
                self.status = Status::Paused;
                self.paused_at = Some(now);
                self.timers.cancel(TimerKind::LiveStats);
                self.refresh_live_stats();
                tracing::info!("Game is now paused.");
                Some(PauseEvent::Paused)
            }
            Status::Paused | Status::ResumeCountdown(_) => {
                self.status = Status::ResumeCountdown(COUNTDOWN_FROM);
                self.timers
                    .arm(TimerKind::Countdown, self.generation, now, COUNTDOWN_STEP);
                self.refresh_live_stats();
                tracing::info!("Game is now resumed.");
                Some(PauseEvent::Resuming)
            }
            Status::Idle | Status::Finished => None,
        }
    }

    /// Discard all progress if `confirm` agrees. The caller fetches new
    /// words for the returned generation.
    pub fn reset(&mut self, confirm: &impl Confirm) -> ResetOutcome {
        if !confirm.confirm() {
            tracing::debug!("reset declined");
            return ResetOutcome::Declined;
        }

        self.timers.cancel_all();
        self.generation += 1;
        self.words.clear();
        self.target.clear();
        self.input.clear();
        self.mistakes = 0;
        self.start_time = None;
        self.end_time = None;
        self.paused_at = None;
        self.paused_total = Duration::ZERO;
        self.status = Status::Idle;
        self.live = Stats::default();

        tracing::info!(generation = self.generation, "session reset");
        ResetOutcome::Confirmed {
            generation: self.generation,
        }
    }

    /// Fire every timer that is due. Returns how many fired.
    pub fn poll(&mut self) -> usize {
        let now = self.clock.now();
        let mut fired = 0;
        loop {
            let due = self.timers.due(now);
            if due.is_empty() {
                break;
            }
            for id in due {
                if self.fire(id) {
                    fired += 1;
                }
            }
        }
        fired
    }

    /// Run the timer identified by `id`. Handles from a previous
    /// generation, or for a timer that was cancelled, do nothing.
    pub fn fire(&mut self, id: TimerId) -> bool {
        if id.generation != self.generation || !self.timers.is_armed(id) {
            tracing::trace!(kind = %id.kind, generation = id.generation, "stale timer ignored");
            return false;
        }

        let now = self.clock.now();
        match id.kind {
            TimerKind::LiveStats => {
                self.refresh_live_stats();
                self.timers.reschedule(TimerKind::LiveStats, now);
            }
            TimerKind::Countdown => self.countdown_step(now),
        }
        true
    }

    /// Recompute live stats from the current input and "now"
    pub fn refresh_live_stats(&mut self) -> Stats {
        self.live = live_stats(
            self.anchor(),
            self.clock.now(),
            self.mistakes,
            self.input.chars().count(),
            self.status,
        );
        self.live
    }

    /// Final stats, available once the session has finished
    pub fn results(&self) -> Option<Stats> {
        match (self.status, self.anchor(), self.end_time) {
            (Status::Finished, Some(start), Some(end)) => {
                Some(final_stats(start, end, self.mistakes, self.target.len()))
            }
            _ => None,
        }
    }

    /// Per-character rendering state of the target text
    pub fn char_states(&self) -> Vec<CharState> {
        let typed: Vec<char> = self.input.chars().collect();
        self.target
            .iter()
            .enumerate()
            .map(|(idx, expected)| match typed.get(idx) {
                Some(c) if c == expected => CharState::Correct,
                Some(_) => CharState::Incorrect,
                None if idx == typed.len() => CharState::Cursor,
                None => CharState::Pending,
            })
            .collect()
    }

    pub fn snapshot(&self) -> SessionView {
        SessionView {
            words: self.words.clone(),
            user_input: self.input.clone(),
            status: self.status,
            live_wpm: self.live.wpm,
            live_accuracy: self.live.accuracy,
            elapsed_time: self.live.time,
            mistake_count: self.mistakes,
            countdown: self.countdown(),
        }
    }

    /// Start time shifted by the time spent paused
    fn anchor(&self) -> Option<Duration> {
        self.start_time.map(|start| start + self.paused_total)
    }

    fn start(&mut self, now: Duration) {
        self.start_time = Some(now);
        self.status = Status::Running;
        self.timers
            .arm(TimerKind::LiveStats, self.generation, now, self.tick_rate);
        tracing::debug!("session started");
    }

    fn finish(&mut self, now: Duration) {
        // a paste straight to the end never started the clock
        if self.start_time.is_none() {
            self.start_time = Some(now);
        }
        self.end_time = Some(now);
        self.status = Status::Finished;
        self.timers.cancel_all();
        tracing::info!(mistakes = self.mistakes, "session finished");
    }

    fn countdown_step(&mut self, now: Duration) {
        let Status::ResumeCountdown(n) = self.status else {
            self.timers.cancel(TimerKind::Countdown);
            return;
        };

        match n.saturating_sub(1) {
            0 => self.resume(now),
            next => {
                self.status = Status::ResumeCountdown(next);
                self.timers.advance(TimerKind::Countdown);
            }
        }
    }

    fn resume(&mut self, now: Duration) {
        if let Some(paused_at) = self.paused_at.take() {
            self.paused_total += now.saturating_sub(paused_at);
        }
        self.timers.cancel(TimerKind::Countdown);
        self.status = Status::Running;
        self.timers
            .arm(TimerKind::LiveStats, self.generation, now, self.tick_rate);
        self.refresh_live_stats();
    }
}
