use penang::application::ports::JobRepository;
use penang::domain::{Job, JobId, JobStatus, OwnerId};
use penang::infrastructure::llm::sample_questions;
use penang::infrastructure::persistence::MemoryJobRepository;

fn new_job(owner: OwnerId) -> Job {
    Job::new(owner, "exam.pdf".to_string())
}

#[tokio::test]
async fn given_created_job_when_fetching_then_round_trips() {
    let repo = MemoryJobRepository::new();
    let owner = OwnerId::new();
    let job = new_job(owner);

    repo.create(&job).await.unwrap();
    let fetched = repo.get(job.id).await.unwrap().unwrap();

    assert_eq!(fetched.id, job.id);
    assert_eq!(fetched.status, JobStatus::Pending);
}

#[tokio::test]
async fn given_duplicate_id_when_creating_then_constraint_violation() {
    let repo = MemoryJobRepository::new();
    let job = new_job(OwnerId::new());

    repo.create(&job).await.unwrap();
    assert!(repo.create(&job).await.is_err());
}

#[tokio::test]
async fn given_foreign_owner_when_fetching_then_invisible() {
    let repo = MemoryJobRepository::new();
    let owner = OwnerId::new();
    let job = new_job(owner);
    repo.create(&job).await.unwrap();

    assert!(repo.get_for_owner(job.id, owner).await.unwrap().is_some());
    assert!(
        repo.get_for_owner(job.id, OwnerId::new())
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn given_out_of_order_progress_updates_then_percent_never_decreases() {
    let repo = MemoryJobRepository::new();
    let job = new_job(OwnerId::new());
    repo.create(&job).await.unwrap();
    repo.mark_processing(job.id).await.unwrap();

    repo.update_progress(job.id, 50, "halfway").await.unwrap();
    repo.update_progress(job.id, 30, "stale update").await.unwrap();

    let fetched = repo.get(job.id).await.unwrap().unwrap();
    assert_eq!(fetched.progress_percent, 50);
    assert_eq!(fetched.progress_message.as_deref(), Some("stale update"));
}

#[tokio::test]
async fn given_completed_job_then_result_set_and_progress_full() {
    let repo = MemoryJobRepository::new();
    let job = new_job(OwnerId::new());
    repo.create(&job).await.unwrap();
    repo.mark_processing(job.id).await.unwrap();

    repo.complete(job.id, &sample_questions(3)).await.unwrap();

    let fetched = repo.get(job.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, JobStatus::Completed);
    assert_eq!(fetched.progress_percent, 100);
    assert_eq!(fetched.result.unwrap().len(), 3);
    assert!(fetched.error_message.is_none());
}

#[tokio::test]
async fn given_failed_job_then_error_set_and_no_result() {
    let repo = MemoryJobRepository::new();
    let job = new_job(OwnerId::new());
    repo.create(&job).await.unwrap();
    repo.mark_processing(job.id).await.unwrap();

    repo.fail(job.id, "extraction blew up").await.unwrap();

    let fetched = repo.get(job.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, JobStatus::Failed);
    assert_eq!(fetched.error_message.as_deref(), Some("extraction blew up"));
    assert!(fetched.result.is_none());
}

#[tokio::test]
async fn given_terminal_job_then_further_writes_are_ignored() {
    let repo = MemoryJobRepository::new();
    let job = new_job(OwnerId::new());
    repo.create(&job).await.unwrap();
    repo.mark_processing(job.id).await.unwrap();
    repo.complete(job.id, &sample_questions(2)).await.unwrap();

    repo.fail(job.id, "too late").await.unwrap();
    repo.update_progress(job.id, 10, "too late").await.unwrap();

    let fetched = repo.get(job.id).await.unwrap().unwrap();
    assert_eq!(fetched.status, JobStatus::Completed);
    assert_eq!(fetched.progress_percent, 100);
    assert!(fetched.error_message.is_none());
    assert_eq!(fetched.result.unwrap().len(), 2);
}

#[tokio::test]
async fn given_many_jobs_when_listing_then_newest_first_and_paged() {
    let repo = MemoryJobRepository::new();
    let owner = OwnerId::new();

    for i in 0..5i64 {
        let mut job = new_job(owner);
        job.filename = format!("exam-{i}.pdf");
        job.created_at = job.created_at + chrono::Duration::seconds(i);
        repo.create(&job).await.unwrap();
    }

    let page = repo.list_for_owner(owner, 1, 2).await.unwrap();
    assert_eq!(page.total, 5);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].filename, "exam-4.pdf");

    let page = repo.list_for_owner(owner, 3, 2).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].filename, "exam-0.pdf");
}

#[tokio::test]
async fn given_foreign_owner_when_deleting_then_nothing_happens() {
    let repo = MemoryJobRepository::new();
    let owner = OwnerId::new();
    let job = new_job(owner);
    repo.create(&job).await.unwrap();

    assert!(!repo.delete(job.id, OwnerId::new()).await.unwrap());
    assert!(repo.get(job.id).await.unwrap().is_some());

    assert!(repo.delete(job.id, owner).await.unwrap());
    assert!(repo.get(job.id).await.unwrap().is_none());
}
