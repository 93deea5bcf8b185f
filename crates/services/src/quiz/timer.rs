use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use quiz_core::model::TickOutcome;

use crate::error::QuizEngineError;
use crate::quiz::engine::QuizEngine;

/// Drives the per-question countdown: one tick per period while the session
/// stays active.
pub struct TimerDriver;

/// Handle to a running countdown task. Aborts the task on `stop` or drop, so
/// a torn-down session can never receive a late tick.
pub struct TimerHandle {
    task: JoinHandle<()>,
}

impl TimerDriver {
    /// Spawn the countdown for the session run currently active.
    ///
    /// The task captures the session's timer epoch up front; the session
    /// ignores ticks carrying a stale epoch, so a driver that outlives its
    /// run (finish, restart, new start) goes silent instead of expiring the
    /// next run's question. The task also exits by itself once a tick no
    /// longer counts.
    ///
    /// # Errors
    ///
    /// Returns `LockPoisoned` if the session lock is unusable.
    pub fn spawn(engine: Arc<QuizEngine>, period: Duration) -> Result<TimerHandle, QuizEngineError> {
        let epoch = engine.timer_epoch()?;
        let task = tokio::spawn(async move {
            let mut interval = tokio::time::interval(period);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first interval tick completes immediately; skip it so the
            // countdown starts a full period after spawn.
            interval.tick().await;
            loop {
                interval.tick().await;
                match engine.tick(epoch) {
                    Ok(TickOutcome::Counted) => {}
                    // Expired, stale, or a poisoned lock: nothing left to do.
                    Ok(TickOutcome::Expired | TickOutcome::Ignored) | Err(_) => break,
                }
            }
        });
        Ok(TimerHandle { task })
    }
}

impl TimerHandle {
    /// Stop ticking immediately.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Whether the countdown task has already exited.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::Clock;
    use quiz_core::model::{Question, QuizStatus};
    use storage::repository::{InMemoryRepository, QuestionRepository};

    fn build_question(points: u32) -> Question {
        Question::new(
            format!("worth {points}"),
            vec!["a".into(), "b".into()],
            0,
            points,
        )
        .unwrap()
    }

    async fn active_engine(secs_per_question: u32) -> Arc<QuizEngine> {
        let repo = InMemoryRepository::new();
        repo.replace_questions(&[build_question(10), build_question(20)])
            .await
            .unwrap();
        let engine = Arc::new(
            QuizEngine::new(
                Clock::Default,
                Arc::new(repo.clone()),
                Arc::new(repo.clone()),
                Arc::new(repo),
            )
            .with_secs_per_question(secs_per_question),
        );
        engine.load().await.unwrap();
        engine.start().unwrap();
        engine
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_expires_the_session() {
        let engine = active_engine(3).await;
        let handle = TimerDriver::spawn(Arc::clone(&engine), Duration::from_secs(1)).unwrap();

        tokio::time::sleep(Duration::from_secs(4)).await;

        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.status, QuizStatus::Finished);
        assert!(handle.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn countdown_spans_questions_within_one_run() {
        let engine = active_engine(10).await;
        let _handle = TimerDriver::spawn(Arc::clone(&engine), Duration::from_secs(1)).unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;
        assert_eq!(engine.snapshot().unwrap().seconds_remaining, 7);

        engine.select_option(0).unwrap();
        engine.next_question().unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;

        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.status, QuizStatus::Active);
        assert_eq!(snapshot.current_index, 1);
        assert_eq!(snapshot.seconds_remaining, 8);
    }

    #[tokio::test(start_paused = true)]
    async fn stale_driver_cannot_touch_a_new_run() {
        let engine = active_engine(5).await;
        let stale = TimerDriver::spawn(Arc::clone(&engine), Duration::from_secs(1)).unwrap();

        engine.timer_expired().unwrap();
        engine.restart().await.unwrap();
        engine.start().unwrap();

        tokio::time::sleep(Duration::from_secs(3)).await;

        // The old driver went silent; only a fresh driver counts this run down.
        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.status, QuizStatus::Active);
        assert_eq!(snapshot.seconds_remaining, 5);
        assert!(stale.is_finished());
    }

    #[tokio::test(start_paused = true)]
    async fn dropped_handle_stops_the_countdown() {
        let engine = active_engine(10).await;
        let handle = TimerDriver::spawn(Arc::clone(&engine), Duration::from_secs(1)).unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        drop(handle);
        tokio::time::sleep(Duration::from_secs(5)).await;

        let snapshot = engine.snapshot().unwrap();
        assert_eq!(snapshot.status, QuizStatus::Active);
        assert_eq!(snapshot.seconds_remaining, 8);
    }
}
