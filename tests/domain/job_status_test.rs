use std::str::FromStr;

use penang::domain::JobStatus;

#[test]
fn given_all_statuses_when_round_tripping_strings_then_values_survive() {
    for status in [
        JobStatus::Pending,
        JobStatus::Processing,
        JobStatus::Completed,
        JobStatus::Failed,
    ] {
        assert_eq!(JobStatus::from_str(status.as_str()).unwrap(), status);
    }
}

#[test]
fn given_unknown_string_when_parsing_then_returns_error() {
    assert!(JobStatus::from_str("queued").is_err());
    assert!(JobStatus::from_str("PENDING").is_err());
    assert!(JobStatus::from_str("").is_err());
}

#[test]
fn given_statuses_when_checking_terminal_then_only_completed_and_failed_are() {
    assert!(!JobStatus::Pending.is_terminal());
    assert!(!JobStatus::Processing.is_terminal());
    assert!(JobStatus::Completed.is_terminal());
    assert!(JobStatus::Failed.is_terminal());
}
