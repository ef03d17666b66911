use penang::application::ports::ExtractorError;
use penang::domain::QuestionType;
use penang::infrastructure::llm::parse_question_payload;

const PLAIN_ARRAY: &str = r#"[
    {"question": "Solve $x^2 = 4$", "type": "calculation", "difficulty": "TH"},
    {"question": "Prove that $\\sqrt{2}$ is irrational", "type": "essay", "difficulty": "VDC"}
]"#;

#[test]
fn given_plain_json_array_when_parsing_then_questions_extracted() {
    let questions = parse_question_payload(PLAIN_ARRAY).unwrap();
    assert_eq!(questions.len(), 2);
    assert_eq!(questions[0].kind, QuestionType::Calculation);
    assert_eq!(questions[1].kind, QuestionType::Essay);
}

#[test]
fn given_fenced_code_block_when_parsing_then_questions_extracted() {
    let response = format!("Here are the questions:\n```json\n{}\n```\nDone.", PLAIN_ARRAY);
    let questions = parse_question_payload(&response).unwrap();
    assert_eq!(questions.len(), 2);
}

#[test]
fn given_object_with_questions_key_when_parsing_then_questions_extracted() {
    let response = format!(r#"{{"questions": {}}}"#, PLAIN_ARRAY);
    let questions = parse_question_payload(&response).unwrap();
    assert_eq!(questions.len(), 2);
}

#[test]
fn given_array_buried_in_prose_when_parsing_then_questions_extracted() {
    let response = format!("The document contains: {} as requested.", PLAIN_ARRAY);
    let questions = parse_question_payload(&response).unwrap();
    assert_eq!(questions.len(), 2);
}

#[test]
fn given_any_input_when_parsed_then_questions_renumbered_in_order() {
    let response = r#"[
        {"question": "a", "type": "essay", "order": 99},
        {"question": "b", "type": "essay", "order": 1}
    ]"#;
    let questions = parse_question_payload(response).unwrap();
    assert_eq!(questions[0].order, 1);
    assert_eq!(questions[1].order, 2);
}

#[test]
fn given_empty_completion_when_parsing_then_invalid_response() {
    assert!(matches!(
        parse_question_payload("   "),
        Err(ExtractorError::InvalidResponse(_))
    ));
}

#[test]
fn given_prose_without_questions_when_parsing_then_invalid_response() {
    assert!(matches!(
        parse_question_payload("I could not find any questions in this document."),
        Err(ExtractorError::InvalidResponse(_))
    ));
}

#[test]
fn given_unknown_question_type_when_parsing_then_invalid_response() {
    let response = r#"[{"question": "?", "type": "riddle"}]"#;
    assert!(parse_question_payload(response).is_err());
}

#[test]
fn given_empty_array_when_parsing_then_ok_and_empty() {
    let questions = parse_question_payload("[]").unwrap();
    assert!(questions.is_empty());
}

#[test]
fn given_brackets_inside_strings_when_searching_array_then_not_confused() {
    let response = r#"Note: "[not json]" precedes the actual data:
[{"question": "Evaluate $f([0, 1])$", "type": "calculation"}]"#;
    let questions = parse_question_payload(response).unwrap();
    assert_eq!(questions.len(), 1);
}
