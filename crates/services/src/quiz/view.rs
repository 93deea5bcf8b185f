use serde::Serialize;

use quiz_core::model::{QuizSession, QuizStatus, ScoreTier, percentage};

/// The current question as the presentation layer sees it: no correct-answer
/// index, so a renderer cannot leak the solution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QuestionView {
    pub text: String,
    pub options: Vec<String>,
    pub points: u32,
}

/// Read-only snapshot of a quiz session after a command.
///
/// The presentation layer is a pure function of the latest snapshot; it never
/// reaches into the session itself.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuizSnapshot {
    pub status: QuizStatus,
    pub current_index: usize,
    pub selected_option: Option<usize>,
    pub points: u32,
    pub highscore: u32,
    pub seconds_remaining: u32,
    pub num_questions: usize,
    pub max_possible_points: u32,
    /// Progress-bar numerator: answered questions count the current one once
    /// a selection is made.
    pub progress_value: usize,
    pub question: Option<QuestionView>,
}

impl QuizSnapshot {
    #[must_use]
    pub fn of(session: &QuizSession) -> Self {
        let question = session.current_question().map(|q| QuestionView {
            text: q.text().to_owned(),
            options: q.options().to_vec(),
            points: q.points(),
        });

        Self {
            status: session.status(),
            current_index: session.current_index(),
            selected_option: session.selected_option(),
            points: session.points(),
            highscore: session.highscore(),
            seconds_remaining: session.seconds_remaining(),
            num_questions: session.num_questions(),
            max_possible_points: session.max_possible_points(),
            progress_value: session.answered_count(),
            question,
        }
    }

    /// Scoring tier for the finish screen.
    #[must_use]
    pub fn finish_tier(&self) -> ScoreTier {
        ScoreTier::for_score(self.points, self.max_possible_points)
    }

    /// Final score as a percentage of the maximum.
    #[must_use]
    pub fn percent(&self) -> f64 {
        percentage(self.points, self.max_possible_points)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::model::Question;
    use quiz_core::time::fixed_now;

    fn session() -> QuizSession {
        let questions = vec![
            Question::new(
                "Q1",
                vec!["a".into(), "b".into(), "c".into()],
                1,
                10,
            )
            .unwrap(),
            Question::new(
                "Q2",
                vec!["a".into(), "b".into(), "c".into()],
                0,
                20,
            )
            .unwrap(),
        ];
        let mut session = QuizSession::new(50);
        session.questions_loaded(questions);
        session
    }

    #[test]
    fn snapshot_hides_the_correct_answer() {
        let mut s = session();
        s.start(fixed_now());
        let snapshot = QuizSnapshot::of(&s);

        let question = snapshot.question.expect("active question");
        assert_eq!(question.text, "Q1");
        assert_eq!(question.options.len(), 3);
        // QuestionView carries no correct_option field at all; the points
        // value is the only scoring detail exposed.
        assert_eq!(question.points, 10);
    }

    #[test]
    fn progress_counts_the_current_question_once_answered() {
        let mut s = session();
        s.start(fixed_now());
        assert_eq!(QuizSnapshot::of(&s).progress_value, 0);

        s.select_option(1);
        assert_eq!(QuizSnapshot::of(&s).progress_value, 1);

        s.next_question(fixed_now());
        assert_eq!(QuizSnapshot::of(&s).progress_value, 1);
    }

    #[test]
    fn finish_tier_reflects_the_score() {
        let mut s = session();
        s.start(fixed_now());
        s.select_option(1);
        s.next_question(fixed_now());
        s.select_option(0);
        s.next_question(fixed_now());

        let snapshot = QuizSnapshot::of(&s);
        assert_eq!(snapshot.status, QuizStatus::Finished);
        assert_eq!(snapshot.points, 30);
        assert_eq!(snapshot.finish_tier(), ScoreTier::Gold);
        assert!((snapshot.percent() - 100.0).abs() < f64::EPSILON);
    }
}
