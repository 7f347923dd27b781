mod common;

use quiz_importer::source::{list_bank_files, InMemorySource};
use quiz_importer::{ChapterId, InMemoryQuizStore, JsonFileSource, QuestionSource, SourceError};

use common::{chapter_questions, init_tracing, planner, temp_dir, write_bank};

#[test]
fn test_load_json_bank() {
    init_tracing();
    let dir = temp_dir();
    let records = chapter_questions(4, 3);
    let path = write_bank(&dir, "bank.json", &records);

    let loaded = JsonFileSource::new(&path).load().unwrap();

    assert_eq!(loaded, records);
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_load_accepts_alternate_field_names() {
    let dir = temp_dir();
    let path = dir.join("legacy.json");
    std::fs::write(
        &path,
        r#"[
            {
                "chapter_no": 3,
                "question_text": "What is 2 + 2?",
                "options": "3, 4, 5",
                "correct_answer": 2,
                "CHAPTER_TITLE": "Arithmetic"
            },
            {
                "chapter_id": "Appendix A",
                "text": "Pick the vowel",
                "options": "[\"b\", \"a\"]",
                "answerIndex": 2,
                "topic": "Letters"
            }
        ]"#,
    )
    .unwrap();

    let loaded = JsonFileSource::new(&path).load().unwrap();

    assert_eq!(loaded.len(), 2);
    assert_eq!(loaded[0].chapter_id, ChapterId::Number(3));
    assert_eq!(loaded[0].options, vec!["3", "4", "5"]);
    assert_eq!(loaded[0].correct_option_index, 2);
    assert_eq!(loaded[0].chapter_title.as_deref(), Some("Arithmetic"));
    assert_eq!(loaded[1].chapter_id, ChapterId::Text("Appendix A".to_string()));
    assert_eq!(loaded[1].options, vec!["b", "a"]);
    assert_eq!(loaded[1].topic.as_deref(), Some("Letters"));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_missing_field_is_parse_error() {
    let dir = temp_dir();
    let path = dir.join("broken.json");
    std::fs::write(&path, r#"[{"chapter_id": 1, "text": "No options"}]"#).unwrap();

    let err = JsonFileSource::new(&path).load().unwrap_err();

    assert!(matches!(err, SourceError::Parse { .. }));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_empty_bank_is_rejected() {
    let dir = temp_dir();
    let path = write_bank(&dir, "empty.json", &[]);

    let err = JsonFileSource::new(&path).load().unwrap_err();

    assert!(matches!(err, SourceError::Empty(p) if p == path));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_missing_file_is_not_found() {
    let dir = temp_dir();
    let path = dir.join("nope.json");

    let err = JsonFileSource::new(&path).load().unwrap_err();

    assert!(matches!(err, SourceError::NotFound(_)));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_in_memory_source_returns_records() {
    let records = chapter_questions(1, 2);
    let loaded = InMemorySource::new(records.clone()).load().unwrap();
    assert_eq!(loaded, records);
}

#[test]
fn test_list_bank_files_sorted_json_only() {
    let dir = temp_dir();
    write_bank(&dir, "b.json", &chapter_questions(2, 1));
    write_bank(&dir, "a.json", &chapter_questions(1, 1));
    std::fs::write(dir.join("notes.txt"), "ignored").unwrap();
    std::fs::create_dir(dir.join("nested.json")).unwrap();

    let files = list_bank_files(&dir).unwrap();

    let names: Vec<_> = files
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["a.json", "b.json"]);
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_list_bank_files_requires_directory() {
    let dir = temp_dir();
    let file = write_bank(&dir, "bank.json", &chapter_questions(1, 1));

    assert!(matches!(
        list_bank_files(&file),
        Err(SourceError::NotADirectory(_))
    ));
    assert!(matches!(
        list_bank_files(&dir.join("missing")),
        Err(SourceError::NotADirectory(_))
    ));
    std::fs::remove_dir_all(dir).ok();
}

#[test]
fn test_sample_bank_plans_one_quiz_per_chapter() {
    init_tracing();
    let records = InMemorySource::sample().load().unwrap();
    let planner = planner(|s| {
        s.questions_per_quiz = 2;
        s.quizzes_per_chapter = 1;
        s.use_chapter_prefix = true;
    });
    let mut store = InMemoryQuizStore::new();

    let result = planner.import(&records, &mut store);

    assert_eq!(result.counts(), (3, 6));
    assert_eq!(
        store.titles(),
        vec![
            "01 Introduction to Testing - Quiz 1",
            "02 Advanced Testing - Quiz 1",
            "10 Expert Testing - Quiz 1",
        ]
    );
}
