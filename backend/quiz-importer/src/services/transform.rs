use crate::models::{
    ChapterId, FrontendQuestion, OptionDocument, QuestionDocument, QuestionRecord, QuizDocument,
    QuizPlan,
};
use crate::utils::time::now_bson;

/// Bank answers are 1-based; stored options carry 1-based positions.
pub fn record_to_question(record: &QuestionRecord, position: usize, topic: &str) -> QuestionDocument {
    let options = record
        .options
        .iter()
        .enumerate()
        .map(|(i, text)| OptionDocument {
            text: text.clone(),
            position: i + 1,
            is_correct: i + 1 == record.correct_option_index,
        })
        .collect();

    QuestionDocument {
        text: record.text.clone(),
        position,
        chapter_no: record.chapter_id.to_string(),
        topic: (!topic.is_empty()).then(|| topic.to_string()),
        tag: record.tag.clone(),
        options,
    }
}

pub fn plan_to_document(plan: &QuizPlan, import_run_id: &str) -> QuizDocument {
    let questions = plan
        .questions
        .iter()
        .enumerate()
        .map(|(i, record)| record_to_question(record, i + 1, &plan.topic_name))
        .collect();

    QuizDocument {
        id: None,
        title: plan.title.clone(),
        topic: (!plan.topic_name.is_empty()).then(|| plan.topic_name.clone()),
        system_categories: plan.system_category.iter().cloned().collect(),
        chapter_id: plan.chapter_id.clone(),
        import_run_id: import_run_id.to_string(),
        created_at: now_bson(),
        questions,
    }
}

/// The widget expects a 0-based `answerIndex`.
pub fn document_to_frontend(quiz: &QuizDocument) -> Vec<FrontendQuestion> {
    quiz.questions
        .iter()
        .map(|question| FrontendQuestion {
            text: question.text.clone(),
            options: question.options.iter().map(|o| o.text.clone()).collect(),
            answer_index: question
                .options
                .iter()
                .position(|o| o.is_correct)
                .unwrap_or(0),
        })
        .collect()
}

pub fn frontend_to_records(
    questions: &[FrontendQuestion],
    chapter_id: &ChapterId,
) -> Vec<QuestionRecord> {
    questions
        .iter()
        .map(|q| {
            QuestionRecord::new(
                chapter_id.clone(),
                q.text.clone(),
                q.options.clone(),
                q.answer_index + 1,
            )
        })
        .collect()
}
