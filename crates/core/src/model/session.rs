use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::model::question::{Question, max_possible_points};

/// Default countdown per question, in seconds.
pub const DEFAULT_SECS_PER_QUESTION: u32 = 30;

/// Lifecycle status of a quiz session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum QuizStatus {
    Loading,
    Error,
    Ready,
    Active,
    Finished,
}

/// Outcome of a single countdown tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The tick did not apply: session not active, or a stale timer epoch.
    Ignored,
    /// One second counted down, time still remaining.
    Counted,
    /// The countdown reached zero and the session finished.
    Expired,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// One quiz run, from `Loading` through `Finished`.
///
/// The session is a single-writer aggregate: every event is a plain
/// read-modify-write, and events that do not apply to the current status are
/// silent no-ops rather than errors, so the machine is total over
/// (status, event) pairs. Each event method returns whether it applied.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizSession {
    questions: Vec<Question>,
    status: QuizStatus,
    current_index: usize,
    selected_option: Option<usize>,
    points: u32,
    highscore: u32,
    seconds_remaining: u32,
    secs_per_question: u32,
    timer_epoch: u64,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

impl QuizSession {
    /// Creates a session in `Loading` with the persisted highscore, if any.
    #[must_use]
    pub fn new(initial_highscore: u32) -> Self {
        Self {
            questions: Vec::new(),
            status: QuizStatus::Loading,
            current_index: 0,
            selected_option: None,
            points: 0,
            highscore: initial_highscore,
            seconds_remaining: 0,
            secs_per_question: DEFAULT_SECS_PER_QUESTION,
            timer_epoch: 0,
            started_at: None,
            finished_at: None,
        }
    }

    /// Overrides the per-question countdown. Clamped to at least one second.
    #[must_use]
    pub fn with_secs_per_question(mut self, secs: u32) -> Self {
        self.secs_per_question = secs.max(1);
        self
    }

    // ─── Events ────────────────────────────────────────────────────────────

    /// `Loading` → `Ready`. An empty question set is treated as a failed
    /// load and lands in `Error` instead.
    pub fn questions_loaded(&mut self, questions: Vec<Question>) -> bool {
        if self.status != QuizStatus::Loading {
            return false;
        }
        if questions.is_empty() {
            self.status = QuizStatus::Error;
            return true;
        }
        self.questions = questions;
        self.status = QuizStatus::Ready;
        true
    }

    /// `Loading` → `Error`. Terminal: there is no retry path.
    pub fn load_failed(&mut self) -> bool {
        if self.status != QuizStatus::Loading {
            return false;
        }
        self.status = QuizStatus::Error;
        true
    }

    /// `Ready` → `Active`: first question, zero points, fresh countdown.
    pub fn start(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != QuizStatus::Ready {
            return false;
        }
        self.status = QuizStatus::Active;
        self.current_index = 0;
        self.selected_option = None;
        self.points = 0;
        self.started_at = Some(now);
        self.finished_at = None;
        self.reset_timer();
        true
    }

    /// Records the answer for the current question.
    ///
    /// Only the first selection per question counts; repeat calls are ignored
    /// until `next_question` advances, so a question can never score twice.
    /// Out-of-range indices are ignored like any other inapplicable event.
    pub fn select_option(&mut self, option: usize) -> bool {
        if self.status != QuizStatus::Active || self.selected_option.is_some() {
            return false;
        }
        let Some(question) = self.questions.get(self.current_index) else {
            return false;
        };
        if option >= question.options().len() {
            return false;
        }

        self.selected_option = Some(option);
        if question.is_correct(option) {
            self.points = self.points.saturating_add(question.points());
        }
        true
    }

    /// Advances past an answered question; finishing after the last one.
    ///
    /// Requires a selection for the current question, otherwise a no-op.
    pub fn next_question(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != QuizStatus::Active || self.selected_option.is_none() {
            return false;
        }
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
            self.selected_option = None;
            self.reset_timer();
        } else {
            self.finish(now);
        }
        true
    }

    /// `Active` → `Finished`, regardless of remaining questions.
    pub fn timer_expired(&mut self, now: DateTime<Utc>) -> bool {
        if self.status != QuizStatus::Active {
            return false;
        }
        self.finish(now);
        true
    }

    /// Counts one second off the current question's clock.
    ///
    /// Applies only while `Active` and when `epoch` matches the epoch the
    /// ticking driver was started under; a driver outliving its session run
    /// can therefore never expire a later question. Reaching zero finishes
    /// the session exactly once.
    pub fn tick(&mut self, epoch: u64, now: DateTime<Utc>) -> TickOutcome {
        if self.status != QuizStatus::Active || epoch != self.timer_epoch {
            return TickOutcome::Ignored;
        }
        self.seconds_remaining = self.seconds_remaining.saturating_sub(1);
        if self.seconds_remaining == 0 {
            self.finish(now);
            TickOutcome::Expired
        } else {
            TickOutcome::Counted
        }
    }

    /// `Finished` → `Ready`. Folds the run's points into the highscore
    /// (never decreasing it), then clears points and position.
    pub fn restart(&mut self) -> bool {
        if self.status != QuizStatus::Finished {
            return false;
        }
        self.highscore = self.highscore.max(self.points);
        self.points = 0;
        self.current_index = 0;
        self.selected_option = None;
        self.seconds_remaining = 0;
        self.started_at = None;
        self.finished_at = None;
        self.status = QuizStatus::Ready;
        true
    }

    /// Seeds the highscore from persisted state. `Loading` only.
    pub fn set_initial_highscore(&mut self, highscore: u32) -> bool {
        if self.status != QuizStatus::Loading {
            return false;
        }
        self.highscore = highscore;
        true
    }

    fn finish(&mut self, now: DateTime<Utc>) {
        self.status = QuizStatus::Finished;
        self.finished_at = Some(now);
        // Invalidate any driver still holding the old epoch.
        self.timer_epoch = self.timer_epoch.wrapping_add(1);
    }

    fn reset_timer(&mut self) {
        self.seconds_remaining = self.secs_per_question;
    }

    // ─── Accessors ─────────────────────────────────────────────────────────

    #[must_use]
    pub fn status(&self) -> QuizStatus {
        self.status
    }

    #[must_use]
    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    #[must_use]
    pub fn num_questions(&self) -> usize {
        self.questions.len()
    }

    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current_index
    }

    #[must_use]
    pub fn selected_option(&self) -> Option<usize> {
        self.selected_option
    }

    #[must_use]
    pub fn points(&self) -> u32 {
        self.points
    }

    #[must_use]
    pub fn highscore(&self) -> u32 {
        self.highscore
    }

    #[must_use]
    pub fn seconds_remaining(&self) -> u32 {
        self.seconds_remaining
    }

    #[must_use]
    pub fn secs_per_question(&self) -> u32 {
        self.secs_per_question
    }

    /// Epoch a countdown driver must capture before ticking.
    #[must_use]
    pub fn timer_epoch(&self) -> u64 {
        self.timer_epoch
    }

    #[must_use]
    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.started_at
    }

    #[must_use]
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }

    /// The question currently on screen. `Some` only while `Active`.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        if self.status == QuizStatus::Active {
            self.questions.get(self.current_index)
        } else {
            None
        }
    }

    /// Number of questions answered so far in this run.
    #[must_use]
    pub fn answered_count(&self) -> usize {
        self.current_index + usize::from(self.selected_option.is_some())
    }

    /// Sum of all question point values. Derived, never stored.
    #[must_use]
    pub fn max_possible_points(&self) -> u32 {
        max_possible_points(&self.questions)
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == QuizStatus::Active
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.status == QuizStatus::Finished
    }
}

impl Default for QuizSession {
    fn default() -> Self {
        Self::new(0)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
