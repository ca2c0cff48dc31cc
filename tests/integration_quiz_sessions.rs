use std::collections::{HashMap, HashSet};

use assert_matches::assert_matches;
use kviz::result::{FileResultStore, ResultStore};
use kviz::session::QUIZ_LENGTH;
use kviz::{
    Answer, AnswerSpec, Difficulty, Question, QuestionBank, QuizError, QuizSession,
    SessionState, User,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

fn perfect_answer(question: &Question) -> Answer {
    match question.spec() {
        AnswerSpec::SingleChoice { correct_index, .. } => Answer::Single(*correct_index),
        AnswerSpec::MultipleChoice {
            correct_indices, ..
        } => Answer::Multiple(correct_indices.clone()),
        AnswerSpec::FreeText { accepted_answers } => {
            // authored answers are stored normalized; shout one back with padding
            let accepted = accepted_answers.iter().next().unwrap();
            Answer::Text(format!("  {}  ", accepted.to_uppercase()))
        }
        AnswerSpec::Matching { pairs } => Answer::Matching(
            pairs
                .iter()
                .map(|p| (p.left.clone(), p.right.clone()))
                .collect(),
        ),
    }
}

fn student() -> User {
    User::new("Ada", "KN-21")
}

#[test]
fn every_tier_draws_ten_distinct_questions_from_its_pool() {
    let bank = QuestionBank::builtin().unwrap();
    for difficulty in Difficulty::ALL {
        let pool_ids: HashSet<&str> = bank.pool(difficulty).iter().map(|q| q.id()).collect();
        let mut session = QuizSession::new();
        session
            .start(
                &bank,
                student(),
                &difficulty.to_string(),
                &mut StdRng::seed_from_u64(99),
            )
            .unwrap();

        let drawn: Vec<&str> = session.drawn_questions().iter().map(|q| q.id()).collect();
        assert_eq!(drawn.len(), QUIZ_LENGTH);
        assert_eq!(drawn.iter().collect::<HashSet<_>>().len(), QUIZ_LENGTH);
        assert!(drawn.iter().all(|id| pool_ids.contains(id)));
    }
}

#[test]
fn perfect_answers_earn_max_score_on_every_tier() {
    let bank = QuestionBank::builtin().unwrap();
    for (difficulty, per_question) in [
        (Difficulty::Easy, 1),
        (Difficulty::Medium, 2),
        (Difficulty::Hard, 3),
    ] {
        let mut session = QuizSession::new();
        session
            .start(
                &bank,
                student(),
                &difficulty.to_string(),
                &mut StdRng::seed_from_u64(5),
            )
            .unwrap();

        while session.state() == SessionState::InProgress {
            let question = session.current_question().unwrap().clone();
            let awarded = session.submit_answer(&perfect_answer(&question)).unwrap();
            assert_eq!(awarded, question.points(), "question {}", question.id());
        }

        let result = session.result().unwrap();
        assert_eq!(result.max_score, (per_question * QUIZ_LENGTH) as u64);
        assert_eq!(result.score, result.max_score);
        assert_eq!(result.percent(), 100);
    }
}

#[test]
fn contract_violations_are_reported() {
    let bank = QuestionBank::builtin().unwrap();
    let mut session = QuizSession::new();

    assert_matches!(session.current_question(), Err(QuizError::SessionNotActive));
    assert_matches!(
        session.start(&bank, student(), "legendary", &mut StdRng::seed_from_u64(1)),
        Err(QuizError::UnknownDifficulty(_))
    );

    session
        .start(&bank, student(), "hard", &mut StdRng::seed_from_u64(1))
        .unwrap();
    for _ in 0..QUIZ_LENGTH - 1 {
        session.submit_answer(&Answer::Blank).unwrap();
        assert_matches!(session.result(), Err(QuizError::SessionNotFinished));
    }
    session.submit_answer(&Answer::Blank).unwrap();

    assert_eq!(session.state(), SessionState::Finished);
    let frozen = session.result().unwrap().clone();
    assert_matches!(
        session.submit_answer(&Answer::Blank),
        Err(QuizError::SessionNotActive)
    );
    assert_eq!(session.result().unwrap(), &frozen);
}

#[test]
fn drawn_order_shows_no_positional_bias() {
    // four questions, all drawn; each one should open the quiz a quarter of the time
    let pool: Vec<Question> = (0..4)
        .map(|i| Question::free_text(format!("q{i}"), "p", 1, ["x"]).unwrap())
        .collect();
    let bank = QuestionBank::from_pools(HashMap::from([(Difficulty::Easy, pool)])).unwrap();

    let mut rng = StdRng::seed_from_u64(31337);
    let trials = 24_000;
    let mut first: HashMap<String, u32> = HashMap::new();
    let mut orders: HashMap<Vec<String>, u32> = HashMap::new();
    for _ in 0..trials {
        let mut session = QuizSession::new();
        session.start(&bank, student(), "easy", &mut rng).unwrap();
        let order: Vec<String> = session
            .drawn_questions()
            .iter()
            .map(|q| q.id().to_string())
            .collect();
        *first.entry(order[0].clone()).or_insert(0) += 1;
        *orders.entry(order).or_insert(0) += 1;
    }

    assert_eq!(orders.len(), 24, "every permutation of four should appear");
    for (id, count) in first {
        let share = count as f64 / trials as f64;
        assert!((share - 0.25).abs() < 0.02, "{id} opened {share:.3} of quizzes");
    }
    for (order, count) in orders {
        let expected = trials as f64 / 24.0;
        assert!(
            (count as f64 - expected).abs() / expected < 0.15,
            "{order:?} seen {count} times"
        );
    }
}

#[test]
fn finished_result_survives_a_file_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = FileResultStore::with_path(dir.path().join("last_result.json"));
    let bank = QuestionBank::builtin().unwrap();

    let mut session = QuizSession::new();
    session
        .start(&bank, student(), "easy", &mut StdRng::seed_from_u64(8))
        .unwrap();
    while session.state() == SessionState::InProgress {
        session.submit_answer(&Answer::Blank).unwrap();
    }
    store.save(session.result().unwrap()).unwrap();

    let loaded = store.load().unwrap();
    assert_eq!(&loaded, session.result().unwrap());
    assert_eq!(loaded.name, "Ada");
}
