use std::collections::BTreeSet;

use chrono::Duration;
use quiz_core::model::{
    Answer, AnswerEvent, AnswerId, Question, QuestionId, Quiz, QuizId, QuizSession, SessionId,
    UserSettingsDraft,
};
use quiz_core::time::fixed_now;
use storage::repository::{
    AnswerLogRepository, InMemoryRepository, QuizRepository, SessionRepository, StorageError,
    UserSettingsRepository,
};
use storage::sqlite::SqliteRepository;

async fn connect(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn build_quiz() -> Quiz {
    let capitals = Question::new(
        QuestionId::new("capital"),
        1,
        "Capital of France?",
        vec![
            Answer::new(AnswerId::new("lyon"), 1, "Lyon", false),
            Answer::new(AnswerId::new("paris"), 0, "Paris", true),
        ],
    )
    .with_explanation("Paris has been the capital since 987.");
    let primes = Question::new(
        QuestionId::new("primes"),
        0,
        "Pick the primes",
        vec![
            Answer::new(AnswerId::new("two"), 0, "2", true),
            Answer::new(AnswerId::new("three"), 1, "3", true),
            Answer::new(AnswerId::new("four"), 2, "4", false).with_image("four.png"),
        ],
    );
    Quiz::new(QuizId::new("geo"), "Mixed", vec![capitals, primes])
}

#[tokio::test]
async fn quiz_round_trips_with_ordering_and_optional_fields() {
    let repo = connect("memdb_quiz_roundtrip").await;
    let quiz = build_quiz();
    repo.upsert_quiz(&quiz).await.unwrap();

    let fetched = repo.get_quiz(&quiz.id).await.unwrap();
    assert_eq!(fetched, quiz);
    assert_eq!(fetched.questions[0].id, QuestionId::new("primes"));
    assert!(fetched.questions[0].multiple);
    assert_eq!(fetched.questions[1].answers[0].id, AnswerId::new("paris"));

    let mut edited = quiz.clone();
    edited.questions.pop();
    edited.title = "Primes only".into();
    repo.upsert_quiz(&edited).await.unwrap();
    assert_eq!(repo.get_quiz(&quiz.id).await.unwrap(), edited);

    assert!(matches!(
        repo.get_quiz(&QuizId::new("missing")).await,
        Err(StorageError::NotFound)
    ));
    assert_eq!(repo.list_quizzes(10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn session_and_log_survive_reload_in_insertion_order() {
    let repo = connect("memdb_session_log").await;
    let quiz = build_quiz();
    repo.upsert_quiz(&quiz).await.unwrap();

    let mut session = QuizSession::start(SessionId::new("s1"), quiz.id.clone(), fixed_now());
    session.set_current(Some(QuestionId::new("capital")));
    session.add_study_time(Duration::seconds(42));
    repo.upsert_session(&session).await.unwrap();

    let capital = quiz.question(&QuestionId::new("capital")).unwrap();
    // Later timestamp appended first: the log keeps insertion order.
    let late = AnswerEvent::record(
        capital,
        BTreeSet::from([AnswerId::new("paris")]),
        fixed_now() + Duration::seconds(20),
    );
    let early = AnswerEvent::record(
        capital,
        BTreeSet::from([AnswerId::new("lyon")]),
        fixed_now() + Duration::seconds(10),
    );
    repo.append_event(session.id(), &late).await.unwrap();
    repo.append_event(session.id(), &early).await.unwrap();

    let loaded = repo.get_session(session.id()).await.unwrap();
    assert_eq!(loaded.events(), &[late.clone(), early.clone()]);
    assert_eq!(loaded.study_time(), Duration::seconds(42));
    assert_eq!(loaded.current_question(), Some(&QuestionId::new("capital")));
    assert!(late.was_correct());
    assert!(!early.was_correct());

    let active = repo
        .active_session_for_quiz(&quiz.id)
        .await
        .unwrap()
        .expect("active session");
    assert_eq!(active.id(), session.id());

    assert!(matches!(
        repo.append_event(session.id(), &late).await,
        Err(StorageError::Conflict)
    ));
}

#[tokio::test]
async fn finished_and_cleared_sessions() {
    let repo = connect("memdb_finish_clear").await;
    let quiz = build_quiz();
    repo.upsert_quiz(&quiz).await.unwrap();

    let mut session = QuizSession::start(SessionId::new("s1"), quiz.id.clone(), fixed_now());
    repo.upsert_session(&session).await.unwrap();
    let primes = quiz.question(&QuestionId::new("primes")).unwrap();
    let event = AnswerEvent::record(primes, BTreeSet::new(), fixed_now());
    repo.append_event(session.id(), &event).await.unwrap();

    repo.clear_log(session.id()).await.unwrap();
    assert!(repo.load_log(session.id()).await.unwrap().is_empty());

    session.finish(fixed_now() + Duration::minutes(5)).unwrap();
    repo.upsert_session(&session).await.unwrap();
    assert!(repo.active_session_for_quiz(&quiz.id).await.unwrap().is_none());

    let loaded = repo.get_session(session.id()).await.unwrap();
    assert!(!loaded.is_active());
    assert_eq!(loaded.ended_at(), Some(fixed_now() + Duration::minutes(5)));
}

#[tokio::test]
async fn writes_against_unknown_parents_are_not_found() {
    let repo = connect("memdb_unknown_parents").await;

    let orphan = QuizSession::start(SessionId::new("s1"), QuizId::new("nope"), fixed_now());
    assert!(matches!(
        repo.upsert_session(&orphan).await,
        Err(StorageError::NotFound)
    ));

    let missing = SessionId::new("missing");
    assert!(matches!(
        repo.load_log(&missing).await,
        Err(StorageError::NotFound)
    ));
    let event = AnswerEvent::record(&build_quiz().questions[0], BTreeSet::new(), fixed_now());
    assert!(matches!(
        repo.append_event(&missing, &event).await,
        Err(StorageError::NotFound)
    ));
}

#[tokio::test]
async fn settings_are_a_single_row() {
    let repo = connect("memdb_settings").await;
    assert!(repo.get_settings().await.unwrap().is_none());

    let settings = UserSettingsDraft {
        sync_progress: false,
        initial_reoccurrences: 3,
        wrong_answer_reoccurrences: 2,
    }
    .validate()
    .unwrap();
    repo.save_settings(&settings).await.unwrap();
    repo.save_settings(&settings).await.unwrap();

    assert_eq!(repo.get_settings().await.unwrap(), Some(settings));
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM user_settings")
        .fetch_one(repo.pool())
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn tied_positions_keep_the_same_order_as_in_memory() {
    let repo = connect("memdb_tied_positions").await;
    let memory = InMemoryRepository::new();
    let answers = |prefix: &str| {
        vec![
            Answer::new(AnswerId::new(format!("{prefix}-z")), 0, "Z", true),
            Answer::new(AnswerId::new(format!("{prefix}-a")), 0, "A", false),
        ]
    };
    let quiz = Quiz::new(
        QuizId::new("ties"),
        "Ties",
        vec![
            Question::new(QuestionId::new("zeta"), 0, "Zeta", answers("zeta")),
            Question::new(QuestionId::new("alpha"), 0, "Alpha", answers("alpha")),
        ],
    );
    repo.upsert_quiz(&quiz).await.unwrap();
    memory.upsert_quiz(&quiz).await.unwrap();

    let from_sqlite = repo.get_quiz(&quiz.id).await.unwrap();
    let from_memory = memory.get_quiz(&quiz.id).await.unwrap();
    assert_eq!(from_sqlite, from_memory);
    assert_eq!(from_sqlite.questions[0].id, QuestionId::new("zeta"));
    assert_eq!(from_sqlite.questions[0].answers[0].id, AnswerId::new("zeta-z"));
}
