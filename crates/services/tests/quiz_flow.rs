use std::sync::Arc;

use quiz_core::model::{Question, QuizStatus};
use quiz_core::time::fixed_clock;
use services::QuizEngine;
use storage::repository::{HighscoreRepository, InMemoryRepository, QuestionRepository};

fn build_question(text: &str, correct: usize, points: u32) -> Question {
    let options = vec![
        "option 0".to_string(),
        "option 1".to_string(),
        "option 2".to_string(),
        "option 3".to_string(),
    ];
    Question::new(text, options, correct, points).unwrap()
}

fn engine(repo: &InMemoryRepository) -> QuizEngine {
    QuizEngine::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
        Arc::new(repo.clone()),
    )
}

#[tokio::test]
async fn scoring_run_counts_only_exact_matches() {
    let repo = InMemoryRepository::new();
    repo.replace_questions(&[build_question("Q1", 1, 10), build_question("Q2", 0, 20)])
        .await
        .unwrap();

    let engine = engine(&repo);
    assert_eq!(engine.load().await.unwrap().status, QuizStatus::Ready);

    engine.start().unwrap();
    let snapshot = engine.select_option(1).unwrap(); // correct
    assert_eq!(snapshot.points, 10);

    engine.next_question().unwrap();
    let snapshot = engine.select_option(2).unwrap(); // wrong, correct is 0
    assert_eq!(snapshot.points, 10);

    let snapshot = engine.next_question().unwrap();
    assert_eq!(snapshot.status, QuizStatus::Finished);
    assert_eq!(snapshot.points, 10);
    assert_eq!(snapshot.max_possible_points, 30);
}

#[tokio::test]
async fn timer_expiry_before_start_changes_nothing() {
    let repo = InMemoryRepository::new();
    repo.replace_questions(&[build_question("Q1", 0, 10)])
        .await
        .unwrap();

    let engine = engine(&repo);
    engine.load().await.unwrap();

    let snapshot = engine.timer_expired().unwrap();
    assert_eq!(snapshot.status, QuizStatus::Ready);
}

#[tokio::test]
async fn restart_resets_the_run_but_keeps_the_highscore() {
    let repo = InMemoryRepository::new();
    repo.replace_questions(&[build_question("Q1", 1, 10), build_question("Q2", 0, 20)])
        .await
        .unwrap();
    repo.record_highscore(5, quiz_core::time::fixed_now())
        .await
        .unwrap();

    let engine = engine(&repo);
    engine.load().await.unwrap();
    engine.start().unwrap();
    engine.select_option(1).unwrap();
    engine.next_question().unwrap();
    engine.select_option(2).unwrap();
    engine.next_question().unwrap();

    let snapshot = engine.restart().await.unwrap();
    assert_eq!(snapshot.status, QuizStatus::Ready);
    assert_eq!(snapshot.points, 0);
    assert_eq!(snapshot.current_index, 0);
    // max(previous highscore 5, this run's 10)
    assert_eq!(snapshot.highscore, 10);
    assert_eq!(repo.get_highscore().await.unwrap(), Some(10));
}

#[tokio::test]
async fn highscore_survives_across_engine_instances() {
    let repo = InMemoryRepository::new();
    repo.replace_questions(&[build_question("Q1", 0, 40)])
        .await
        .unwrap();

    {
        let engine = engine(&repo);
        engine.load().await.unwrap();
        engine.start().unwrap();
        engine.select_option(0).unwrap();
        engine.next_question().unwrap();
        engine.restart().await.unwrap();
    }

    // A fresh engine (new process, same store) sees the recorded best.
    let engine = engine(&repo);
    let snapshot = engine.load().await.unwrap();
    assert_eq!(snapshot.highscore, 40);
}
