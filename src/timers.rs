use std::time::Duration;

/// Background jobs a session can have scheduled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum_macros::Display)]
pub enum TimerKind {
    /// Periodic live stats refresh, armed only while running
    LiveStats,
    /// One step of the resume countdown
    Countdown,
}

/// Handle to a scheduled timer. Carries the session generation it was
/// armed for so a handle outliving a reset can be recognised as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimerId {
    pub kind: TimerKind,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy)]
struct Armed {
    generation: u64,
    period: Duration,
    next_due: Duration,
}

/// The two timer slots of a session. At most one timer per kind is armed.
#[derive(Debug, Default, Clone)]
pub struct Timers {
    live_stats: Option<Armed>,
    countdown: Option<Armed>,
}

impl Timers {
    fn slot(&self, kind: TimerKind) -> &Option<Armed> {
        match kind {
            TimerKind::LiveStats => &self.live_stats,
            TimerKind::Countdown => &self.countdown,
        }
    }

    fn slot_mut(&mut self, kind: TimerKind) -> &mut Option<Armed> {
        match kind {
            TimerKind::LiveStats => &mut self.live_stats,
            TimerKind::Countdown => &mut self.countdown,
        }
    }

    /// Arm (or re-arm) a timer first firing one `period` after `now`
    pub fn arm(&mut self, kind: TimerKind, generation: u64, now: Duration, period: Duration) -> TimerId {
        *self.slot_mut(kind) = Some(Armed {
            generation,
            period,
            next_due: now + period,
        });
        tracing::trace!(%kind, generation, ?period, "timer armed");
        TimerId { kind, generation }
    }

    pub fn cancel(&mut self, kind: TimerKind) {
        if self.slot_mut(kind).take().is_some() {
            tracing::trace!(%kind, "timer cancelled");
        }
    }

    pub fn cancel_all(&mut self) {
        self.cancel(TimerKind::LiveStats);
        self.cancel(TimerKind::Countdown);
    }

    /// True if `id` refers to the timer currently armed in its slot
    pub fn is_armed(&self, id: TimerId) -> bool {
        matches!(self.slot(id.kind), Some(armed) if armed.generation == id.generation)
    }

    pub fn is_active(&self, kind: TimerKind) -> bool {
        self.slot(kind).is_some()
    }

    /// Push the next due time of a periodic timer one period past `now`
    pub fn reschedule(&mut self, kind: TimerKind, now: Duration) {
        if let Some(armed) = self.slot_mut(kind) {
            armed.next_due = now + armed.period;
        }
    }

    /// Push the next due time one period past the previous due time, so
    /// a late poll catches up instead of drifting
    pub fn advance(&mut self, kind: TimerKind) {
        if let Some(armed) = self.slot_mut(kind) {
            armed.next_due += armed.period;
        }
    }

    /// Timers whose due time has been reached, countdown first
    pub fn due(&self, now: Duration) -> Vec<TimerId> {
        [TimerKind::Countdown, TimerKind::LiveStats]
            .into_iter()
            .filter_map(|kind| match self.slot(kind) {
                Some(armed) if armed.next_due <= now => Some(TimerId {
                    kind,
                    generation: armed.generation,
                }),
                _ => None,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TICK: Duration = Duration::from_millis(100);

    #[test]
    fn armed_timer_becomes_due_after_period() {
        let mut timers = Timers::default();
        let id = timers.arm(TimerKind::LiveStats, 0, Duration::ZERO, TICK);

        assert!(timers.due(Duration::from_millis(99)).is_empty());
        assert_eq!(timers.due(TICK), vec![id]);
    }

    #[test]
    fn reschedule_moves_due_time() {
        let mut timers = Timers::default();
        timers.arm(TimerKind::LiveStats, 0, Duration::ZERO, TICK);
        timers.reschedule(TimerKind::LiveStats, TICK);

        assert!(timers.due(Duration::from_millis(150)).is_empty());
        assert_eq!(timers.due(Duration::from_millis(200)).len(), 1);
    }

    #[test]
    fn advance_keeps_fixed_cadence() {
        let mut timers = Timers::default();
        timers.arm(TimerKind::Countdown, 0, Duration::ZERO, Duration::from_secs(1));

        // polled late, the next step is still due one period after the first
        timers.advance(TimerKind::Countdown);
        assert!(timers.due(Duration::from_millis(1999)).is_empty());
        assert_eq!(timers.due(Duration::from_secs(2)).len(), 1);
    }

    #[test]
    fn cancelled_timer_is_not_armed() {
        let mut timers = Timers::default();
        let id = timers.arm(TimerKind::Countdown, 3, Duration::ZERO, TICK);
        assert!(timers.is_armed(id));

        timers.cancel_all();
        assert!(!timers.is_armed(id));
        assert!(!timers.is_active(TimerKind::Countdown));
        assert!(timers.due(Duration::from_secs(10)).is_empty());
    }

    #[test]
    fn handle_from_older_generation_is_not_armed() {
        let mut timers = Timers::default();
        let old = timers.arm(TimerKind::LiveStats, 1, Duration::ZERO, TICK);
        let new = timers.arm(TimerKind::LiveStats, 2, Duration::ZERO, TICK);

        assert!(!timers.is_armed(old));
        assert!(timers.is_armed(new));
    }

    #[test]
    fn countdown_is_reported_before_live_stats() {
        let mut timers = Timers::default();
        timers.arm(TimerKind::LiveStats, 0, Duration::ZERO, TICK);
        timers.arm(TimerKind::Countdown, 0, Duration::ZERO, TICK);

        let due = timers.due(TICK);
        assert_eq!(due[0].kind, TimerKind::Countdown);
        assert_eq!(due[1].kind, TimerKind::LiveStats);
    }
}
