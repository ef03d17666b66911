use penang::domain::JobEvent;
use penang::infrastructure::llm::sample_questions;

#[test]
fn given_events_when_naming_then_matches_wire_protocol() {
    let progress = JobEvent::Progress {
        percent: 40,
        message: "Analyzing document".to_string(),
    };
    let complete = JobEvent::Complete {
        questions: sample_questions(1),
    };
    let failed = JobEvent::Failed {
        message: "boom".to_string(),
    };

    assert_eq!(progress.name(), "progress");
    assert_eq!(complete.name(), "complete");
    assert_eq!(failed.name(), "error_event");

    assert!(!progress.is_terminal());
    assert!(complete.is_terminal());
    assert!(failed.is_terminal());
}

#[test]
fn given_progress_event_when_serializing_then_payload_is_flat() {
    let event = JobEvent::Progress {
        percent: 5,
        message: "Starting".to_string(),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["percent"], 5);
    assert_eq!(json["message"], "Starting");
}

#[test]
fn given_complete_event_when_serializing_then_payload_carries_questions() {
    let event = JobEvent::Complete {
        questions: sample_questions(2),
    };
    let json = serde_json::to_value(&event).unwrap();
    assert_eq!(json["questions"].as_array().unwrap().len(), 2);
}
