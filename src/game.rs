use crate::clock::{Clock, SystemClock};
use crate::history::{ResultRecord, ResultsLog};
use crate::session::{
    CharState, Confirm, PauseEvent, ResetOutcome, Session, SessionView, Submission,
};
use crate::stats::Stats;

/// Starts a word fetch for a session generation. Results come back through
/// [`Game::on_words_loaded`], so implementations may be asynchronous.
pub trait WordFetcher {
    fn request(&self, count: usize, generation: u64);
}

/// A session plus the collaborators around it: the word fetcher and the
/// optional results log.
#[derive(Debug)]
pub struct Game<F: WordFetcher, C: Clock = SystemClock> {
    session: Session<C>,
    fetcher: F,
    word_count: usize,
    results_log: Option<ResultsLog>,
}

impl<F: WordFetcher, C: Clock> Game<F, C> {
    /// Wrap `session` and request its first batch of words
    pub fn new(session: Session<C>, fetcher: F, word_count: usize) -> Self {
        fetcher.request(word_count, session.generation());
        Self {
            session,
            fetcher,
            word_count,
            results_log: None,
        }
    }

    pub fn with_results_log(mut self, log: ResultsLog) -> Self {
        self.results_log = Some(log);
        self
    }

    pub fn session(&self) -> &Session<C> {
        &self.session
    }

    pub fn word_count(&self) -> usize {
        self.word_count
    }

    pub fn on_words_loaded(&mut self, generation: u64, words: Vec<String>) -> bool {
        self.session.load_words(generation, words)
    }

    pub fn submit_input(&mut self, value: &str) -> Submission {
        let submission = self.session.submit_input(value);
        self.after_submit(submission)
    }

    pub fn type_char(&mut self, c: char) -> Submission {
        let submission = self.session.type_char(c);
        self.after_submit(submission)
    }

    pub fn backspace(&mut self) -> Submission {
        let submission = self.session.backspace();
        self.after_submit(submission)
    }

    pub fn toggle_pause(&mut self) -> Option<PauseEvent> {
        self.session.toggle_pause()
    }

    /// Reset the session if `confirm` agrees and fetch words for it
    pub fn reset(&mut self, confirm: &impl Confirm) -> ResetOutcome {
        let outcome = self.session.reset(confirm);
        if let ResetOutcome::Confirmed { generation } = outcome {
            self.fetcher.request(self.word_count, generation);
        }
        outcome
    }

    /// Fire due timers
    pub fn tick(&mut self) -> usize {
        self.session.poll()
    }

    pub fn snapshot(&self) -> SessionView {
        self.session.snapshot()
    }

    pub fn results(&self) -> Option<Stats> {
        self.session.results()
    }

    pub fn char_states(&self) -> Vec<CharState> {
        self.session.char_states()
    }

    fn after_submit(&mut self, submission: Submission) -> Submission {
        if submission == Submission::Completed {
            self.record_results();
        }
        submission
    }

    fn record_results(&self) {
        let (Some(log), Some(stats)) = (&self.results_log, self.session.results()) else {
            return;
        };

        let record = ResultRecord::new(
            &stats,
            self.session.words().len(),
            self.session.mistake_count(),
        );
        match log.append(&record) {
            Ok(()) => tracing::debug!(path = %log.path().display(), "results logged"),
            Err(err) => tracing::warn!(error = %err, "could not log results"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::session::Status;
    use assert_matches::assert_matches;
    use std::cell::RefCell;
    use std::time::Duration;
    use tempfile::tempdir;

    #[derive(Default)]
    struct RecordingFetcher {
        requests: RefCell<Vec<(usize, u64)>>,
    }

    impl WordFetcher for &RecordingFetcher {
        fn request(&self, count: usize, generation: u64) {
            self.requests.borrow_mut().push((count, generation));
        }
    }

    fn words(s: &str) -> Vec<String> {
        s.split(' ').map(String::from).collect()
    }

    #[test]
    fn new_game_requests_words() {
        let fetcher = RecordingFetcher::default();
        let game = Game::new(Session::new(ManualClock::new()), &fetcher, 25);

        assert_eq!(*fetcher.requests.borrow(), vec![(25, 0)]);
        assert_eq!(game.snapshot().status, Status::Idle);
    }

    #[test]
    fn confirmed_reset_fetches_for_new_generation() {
        let fetcher = RecordingFetcher::default();
        let mut game = Game::new(Session::new(ManualClock::new()), &fetcher, 10);
        game.on_words_loaded(0, words("one two"));
        game.type_char('x');

        assert_matches!(
            game.reset(&|| true),
            ResetOutcome::Confirmed { generation: 1 }
        );
        assert_eq!(*fetcher.requests.borrow(), vec![(10, 0), (10, 1)]);

        let view = game.snapshot();
        assert_eq!(view.user_input, "");
        assert_eq!(view.mistake_count, 0);
        assert_eq!(view.status, Status::Idle);
    }

    #[test]
    fn declined_reset_does_not_fetch() {
        let fetcher = RecordingFetcher::default();
        let mut game = Game::new(Session::new(ManualClock::new()), &fetcher, 10);
        game.on_words_loaded(0, words("one two"));
        game.type_char('o');

        assert_eq!(game.reset(&|| false), ResetOutcome::Declined);
        assert_eq!(fetcher.requests.borrow().len(), 1);
        assert_eq!(game.snapshot().user_input, "o");
    }

    #[test]
    fn completion_is_logged() {
        let dir = tempdir().unwrap();
        let log = ResultsLog::with_path(dir.path().join("results.csv"));
        let clock = ManualClock::new();
        let fetcher = RecordingFetcher::default();
        let mut game = Game::new(Session::new(clock.clone()), &fetcher, 2)
            .with_results_log(log.clone());
        game.on_words_loaded(0, words("ab cd"));

        game.type_char('a');
        clock.advance(Duration::from_secs(6));
        for c in "b cx".chars() {
            game.type_char(c);
        }

        assert_eq!(game.snapshot().status, Status::Finished);
        let records = log.read_all().unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].words, 2);
        assert_eq!(records[0].mistakes, 1);
        assert_eq!(records[0].accuracy, 80);
        assert_eq!(records[0].wpm, 8);
    }

    #[test]
    fn tick_drives_countdown() {
        let clock = ManualClock::new();
        let fetcher = RecordingFetcher::default();
        let mut game = Game::new(Session::new(clock.clone()), &fetcher, 2);
        game.on_words_loaded(0, words("ab cd"));
        game.type_char('a');
        game.toggle_pause();
        game.toggle_pause();

        clock.advance(Duration::from_secs(3));
        game.tick();
        assert_eq!(game.snapshot().status, Status::Running);
    }
}
