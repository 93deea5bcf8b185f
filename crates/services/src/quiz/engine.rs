use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};

use quiz_core::Clock;
use quiz_core::model::{
    DEFAULT_SECS_PER_QUESTION, Question, QuizSession, ScoreTier, TickOutcome,
};
use storage::repository::{
    HighscoreRepository, QuestionRepository, SessionResultRecord, SessionResultRepository,
};

use crate::error::QuizEngineError;
use crate::quiz::view::QuizSnapshot;

/// Data captured from a finished run before `restart` wipes it.
struct FinishedRun {
    points: u32,
    max_possible_points: u32,
    answered: u32,
    previous_highscore: u32,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
}

/// Orchestrates one quiz session over the repositories.
///
/// All commands funnel through a single mutex around the session aggregate,
/// so they are serialized: no two events are ever applied concurrently, and
/// the countdown driver's ticks interleave with user commands safely.
pub struct QuizEngine {
    clock: Clock,
    questions: Arc<dyn QuestionRepository>,
    highscores: Arc<dyn HighscoreRepository>,
    results: Arc<dyn SessionResultRepository>,
    session: Mutex<QuizSession>,
    secs_per_question: u32,
}

impl QuizEngine {
    #[must_use]
    pub fn new(
        clock: Clock,
        questions: Arc<dyn QuestionRepository>,
        highscores: Arc<dyn HighscoreRepository>,
        results: Arc<dyn SessionResultRepository>,
    ) -> Self {
        Self {
            clock,
            questions,
            highscores,
            results,
            session: Mutex::new(QuizSession::new(0)),
            secs_per_question: DEFAULT_SECS_PER_QUESTION,
        }
    }

    #[must_use]
    pub fn with_secs_per_question(mut self, secs: u32) -> Self {
        self.secs_per_question = secs.max(1);
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, QuizSession>, QuizEngineError> {
        self.session.lock().map_err(|_| QuizEngineError::LockPoisoned)
    }

    /// Fetch the question set and the persisted highscore, landing the
    /// session in `Ready` or `Error`.
    ///
    /// A failed or empty question fetch is not an error to the caller: it is
    /// the `load_failed` outcome, terminal for this session (no retry).
    ///
    /// # Errors
    ///
    /// Returns `QuizEngineError::Storage` only for the highscore read, and
    /// `LockPoisoned` if a previous holder panicked.
    pub async fn load(&self) -> Result<QuizSnapshot, QuizEngineError> {
        let initial_highscore = self.highscores.get_highscore().await?.unwrap_or(0);
        let fetched = self.questions.list_questions().await;

        let mut session = self.lock()?;
        *session =
            QuizSession::new(initial_highscore).with_secs_per_question(self.secs_per_question);
        match fetched {
            Ok(questions) => session.questions_loaded(questions),
            Err(_) => session.load_failed(),
        };
        Ok(QuizSnapshot::of(&session))
    }

    /// Begin the run. No-op unless the session is `Ready`.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a previous holder panicked.
    pub fn start(&self) -> Result<QuizSnapshot, QuizEngineError> {
        let now = self.clock.now();
        let mut session = self.lock()?;
        session.start(now);
        Ok(QuizSnapshot::of(&session))
    }

    /// Answer the current question. First selection per question wins.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a previous holder panicked.
    pub fn select_option(&self, option: usize) -> Result<QuizSnapshot, QuizEngineError> {
        let mut session = self.lock()?;
        session.select_option(option);
        Ok(QuizSnapshot::of(&session))
    }

    /// Advance past an answered question, finishing after the last one.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a previous holder panicked.
    pub fn next_question(&self) -> Result<QuizSnapshot, QuizEngineError> {
        let now = self.clock.now();
        let mut session = self.lock()?;
        session.next_question(now);
        Ok(QuizSnapshot::of(&session))
    }

    /// Force the run to finish, as if the countdown ran out.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a previous holder panicked.
    pub fn timer_expired(&self) -> Result<QuizSnapshot, QuizEngineError> {
        let now = self.clock.now();
        let mut session = self.lock()?;
        session.timer_expired(now);
        Ok(QuizSnapshot::of(&session))
    }

    /// One countdown tick on behalf of a driver started under `epoch`.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a previous holder panicked.
    pub fn tick(&self, epoch: u64) -> Result<TickOutcome, QuizEngineError> {
        let now = self.clock.now();
        let mut session = self.lock()?;
        Ok(session.tick(epoch, now))
    }

    /// Return to `Ready`, folding the finished run into the highscore.
    ///
    /// When the run raised the highscore, the new value is persisted; the
    /// finished run itself is appended to the result history exactly once.
    ///
    /// # Errors
    ///
    /// Returns `QuizEngineError::Storage` if persistence fails (the in-memory
    /// transition has already happened by then), or `LockPoisoned`.
    pub async fn restart(&self) -> Result<QuizSnapshot, QuizEngineError> {
        let (snapshot, finished) = {
            let mut session = self.lock()?;
            let run = session.is_finished().then(|| FinishedRun {
                points: session.points(),
                max_possible_points: session.max_possible_points(),
                answered: session.answered_count() as u32,
                previous_highscore: session.highscore(),
                started_at: session.started_at(),
                finished_at: session.finished_at(),
            });
            session.restart();
            let new_highscore = session.highscore();
            (
                QuizSnapshot::of(&session),
                run.map(|run| (run, new_highscore)),
            )
        };

        if let Some((run, new_highscore)) = finished {
            if new_highscore > run.previous_highscore {
                self.highscores
                    .record_highscore(new_highscore, self.clock.now())
                    .await?;
            }

            let tier = ScoreTier::for_score(run.points, run.max_possible_points);
            let record = SessionResultRecord {
                id: None,
                points: run.points,
                max_possible_points: run.max_possible_points,
                answered: run.answered,
                tier_label: tier.label().to_owned(),
                started_at: run.started_at.unwrap_or_else(|| self.clock.now()),
                finished_at: run.finished_at.unwrap_or_else(|| self.clock.now()),
            };
            self.results.append_result(&record).await?;
        }

        Ok(snapshot)
    }

    /// Current read-only snapshot.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a previous holder panicked.
    pub fn snapshot(&self) -> Result<QuizSnapshot, QuizEngineError> {
        let session = self.lock()?;
        Ok(QuizSnapshot::of(&session))
    }

    /// Full question set for this session. Empty until loaded.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a previous holder panicked.
    pub fn questions(&self) -> Result<Vec<Question>, QuizEngineError> {
        let session = self.lock()?;
        Ok(session.questions().to_vec())
    }

    /// Epoch a countdown driver must capture before it starts ticking.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if a previous holder panicked.
    pub fn timer_epoch(&self) -> Result<u64, QuizEngineError> {
        let session = self.lock()?;
        Ok(session.timer_epoch())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::{Question, QuizStatus};
    use quiz_core::time::fixed_clock;
    use storage::repository::{
        HighscoreRepository, InMemoryRepository, QuestionRepository, SessionResultRepository,
    };

    fn build_question(correct: usize, points: u32) -> Question {
        Question::new(
            format!("worth {points}"),
            vec!["a".into(), "b".into(), "c".into()],
            correct,
            points,
        )
        .unwrap()
    }

    fn engine_with(repo: &InMemoryRepository) -> QuizEngine {
        QuizEngine::new(
            fixed_clock(),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
        )
    }

    #[tokio::test]
    async fn load_reaches_ready_with_persisted_highscore() {
        let repo = InMemoryRepository::new();
        repo.replace_questions(&[build_question(0, 10)]).await.unwrap();
        repo.record_highscore(70, quiz_core::time::fixed_now())
            .await
            .unwrap();

        let engine = engine_with(&repo);
        let snapshot = engine.load().await.unwrap();
        assert_eq!(snapshot.status, QuizStatus::Ready);
        assert_eq!(snapshot.highscore, 70);
        assert_eq!(snapshot.num_questions, 1);
    }

    #[tokio::test]
    async fn empty_store_loads_into_error() {
        let repo = InMemoryRepository::new();
        let engine = engine_with(&repo);

        let snapshot = engine.load().await.unwrap();
        assert_eq!(snapshot.status, QuizStatus::Error);
        // Terminal: start is a no-op.
        assert_eq!(engine.start().unwrap().status, QuizStatus::Error);
    }

    #[tokio::test]
    async fn restart_persists_raised_highscore_and_result_once() {
        let repo = InMemoryRepository::new();
        repo.replace_questions(&[build_question(1, 10), build_question(0, 20)])
            .await
            .unwrap();

        let engine = engine_with(&repo);
        engine.load().await.unwrap();
        engine.start().unwrap();
        engine.select_option(1).unwrap();
        engine.next_question().unwrap();
        engine.select_option(0).unwrap();
        let snapshot = engine.next_question().unwrap();
        assert_eq!(snapshot.status, QuizStatus::Finished);
        assert_eq!(snapshot.points, 30);

        let snapshot = engine.restart().await.unwrap();
        assert_eq!(snapshot.status, QuizStatus::Ready);
        assert_eq!(snapshot.highscore, 30);
        assert_eq!(repo.get_highscore().await.unwrap(), Some(30));

        let results = repo.list_results(10).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].points, 30);
        assert_eq!(results[0].tier_label, "gold");
        assert_eq!(results[0].answered, 2);

        // A second restart outside Finished is a no-op and appends nothing.
        engine.restart().await.unwrap();
        assert_eq!(repo.list_results(10).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn lower_score_leaves_persisted_highscore_alone() {
        let repo = InMemoryRepository::new();
        repo.replace_questions(&[build_question(1, 10), build_question(0, 20)])
            .await
            .unwrap();
        repo.record_highscore(25, quiz_core::time::fixed_now())
            .await
            .unwrap();

        let engine = engine_with(&repo);
        engine.load().await.unwrap();
        engine.start().unwrap();
        engine.select_option(1).unwrap(); // 10 points
        engine.next_question().unwrap();
        engine.select_option(2).unwrap(); // wrong
        engine.next_question().unwrap();
        let snapshot = engine.restart().await.unwrap();

        assert_eq!(snapshot.highscore, 25);
        assert_eq!(repo.get_highscore().await.unwrap(), Some(25));
        // The run still lands in the history.
        assert_eq!(repo.list_results(10).await.unwrap().len(), 1);
    }
}
