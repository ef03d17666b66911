use penang::domain::{Job, JobStatus, OwnerId};

#[test]
fn given_new_job_then_pending_with_no_result_or_error() {
    let owner = OwnerId::new();
    let job = Job::new(owner, "exam.pdf".to_string());

    assert_eq!(job.status, JobStatus::Pending);
    assert_eq!(job.progress_percent, 0);
    assert_eq!(job.owner, owner);
    assert!(job.result.is_none());
    assert!(job.error_message.is_none());
    assert_eq!(job.created_at, job.updated_at);
}

#[test]
fn given_new_jobs_then_ids_are_unique() {
    let owner = OwnerId::new();
    let a = Job::new(owner, "a.pdf".to_string());
    let b = Job::new(owner, "b.pdf".to_string());
    assert_ne!(a.id, b.id);
}
