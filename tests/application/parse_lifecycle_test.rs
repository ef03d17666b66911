use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;

use penang::application::ports::{
    ExtractOptions, JobRepository, ProgressNotifier, QuestionExtractor,
};
use penang::application::services::{ParseService, ParseWorker, SubmitError};
use penang::domain::{Job, JobEvent, JobId, JobStatus, OwnerId};
use penang::infrastructure::llm::{
    GatedExtractor, MockExtractor, MockFailingExtractor, sample_questions,
};
use penang::infrastructure::notify::ChannelNotifier;
use penang::infrastructure::persistence::MemoryJobRepository;

const TEST_MAX_UPLOAD: u64 = 10 * 1024 * 1024;

struct Stack {
    service: ParseService,
    repository: Arc<dyn JobRepository>,
    notifier: Arc<dyn ProgressNotifier>,
}

fn spawn_stack(extractor: Arc<dyn QuestionExtractor>, extraction_timeout: Duration) -> Stack {
    let repository: Arc<dyn JobRepository> = Arc::new(MemoryJobRepository::new());
    let notifier: Arc<dyn ProgressNotifier> = Arc::new(ChannelNotifier::new());

    let (sender, receiver) = tokio::sync::mpsc::channel(16);
    let worker = ParseWorker::new(
        receiver,
        extractor,
        Arc::clone(&repository),
        Arc::clone(&notifier),
        extraction_timeout,
    );
    tokio::spawn(worker.run());

    let service = ParseService::new(
        Arc::clone(&repository),
        Arc::clone(&notifier),
        sender,
        TEST_MAX_UPLOAD,
    );

    Stack {
        service,
        repository,
        notifier,
    }
}

async fn wait_for_terminal(repository: &Arc<dyn JobRepository>, id: JobId, owner: OwnerId) -> Job {
    for _ in 0..200 {
        let job = repository
            .get_for_owner(id, owner)
            .await
            .unwrap()
            .expect("job exists");
        if job.status.is_terminal() {
            return job;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("job never reached a terminal state");
}

async fn collect_events(
    notifier: &Arc<dyn ProgressNotifier>,
    id: JobId,
) -> Vec<JobEvent> {
    let mut subscription = notifier.subscribe(id).expect("live channel");
    let mut events = Vec::new();
    while let Some(event) = subscription.events.next().await {
        events.push(event);
    }
    events
}

#[tokio::test]
async fn given_slow_extraction_when_submitting_then_job_id_returns_first() {
    let (extractor, gate) = GatedExtractor::new(sample_questions(2));
    let stack = spawn_stack(Arc::new(extractor), Duration::from_secs(5));
    let owner = OwnerId::new();

    let job_id = stack
        .service
        .submit(
            "exam.txt".to_string(),
            b"content".to_vec(),
            owner,
            ExtractOptions::default(),
        )
        .await
        .unwrap();

    // Extraction is still blocked on the gate, yet the id is already usable.
    let job = stack.service.get_status(job_id, owner).await.unwrap();
    assert!(!job.status.is_terminal());

    gate.notify_one();
    let job = wait_for_terminal(&stack.repository, job_id, owner).await;
    assert_eq!(job.status, JobStatus::Completed);
}

#[tokio::test]
async fn given_successful_job_then_exactly_one_terminal_event_and_it_is_last() {
    let (extractor, gate) = GatedExtractor::new(sample_questions(3));
    let stack = spawn_stack(Arc::new(extractor), Duration::from_secs(5));
    let owner = OwnerId::new();

    let job_id = stack
        .service
        .submit(
            "exam.txt".to_string(),
            b"content".to_vec(),
            owner,
            ExtractOptions::default(),
        )
        .await
        .unwrap();

    let events_task = {
        let notifier = Arc::clone(&stack.notifier);
        tokio::spawn(async move { collect_events(&notifier, job_id).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    gate.notify_one();

    let events = events_task.await.unwrap();
    let terminal_count = events.iter().filter(|e| e.is_terminal()).count();
    assert_eq!(terminal_count, 1);
    assert!(events.last().unwrap().is_terminal());
    assert!(matches!(events.last().unwrap(), JobEvent::Complete { .. }));
}

#[tokio::test]
async fn given_progress_events_then_percent_is_non_decreasing() {
    let (extractor, gate) = GatedExtractor::new(sample_questions(1));
    let stack = spawn_stack(Arc::new(extractor), Duration::from_secs(5));
    let owner = OwnerId::new();

    let job_id = stack
        .service
        .submit(
            "exam.txt".to_string(),
            b"content".to_vec(),
            owner,
            ExtractOptions::default(),
        )
        .await
        .unwrap();

    let events_task = {
        let notifier = Arc::clone(&stack.notifier);
        tokio::spawn(async move { collect_events(&notifier, job_id).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    gate.notify_one();

    let events = events_task.await.unwrap();
    let percents: Vec<u8> = events
        .iter()
        .filter_map(|e| match e {
            JobEvent::Progress { percent, .. } => Some(*percent),
            _ => None,
        })
        .collect();
    assert!(percents.windows(2).all(|w| w[0] <= w[1]), "{:?}", percents);
}

#[tokio::test]
async fn given_two_subscribers_then_both_observe_the_same_terminal_outcome() {
    let (extractor, gate) = GatedExtractor::new(sample_questions(4));
    let stack = spawn_stack(Arc::new(extractor), Duration::from_secs(5));
    let owner = OwnerId::new();

    let job_id = stack
        .service
        .submit(
            "exam.txt".to_string(),
            b"content".to_vec(),
            owner,
            ExtractOptions::default(),
        )
        .await
        .unwrap();

    let first = {
        let notifier = Arc::clone(&stack.notifier);
        tokio::spawn(async move { collect_events(&notifier, job_id).await })
    };
    let second = {
        let notifier = Arc::clone(&stack.notifier);
        tokio::spawn(async move { collect_events(&notifier, job_id).await })
    };
    tokio::time::sleep(Duration::from_millis(20)).await;
    gate.notify_one();

    let first_terminal = first.await.unwrap().pop().unwrap();
    let second_terminal = second.await.unwrap().pop().unwrap();

    match (first_terminal, second_terminal) {
        (JobEvent::Complete { questions: a }, JobEvent::Complete { questions: b }) => {
            assert_eq!(a, b);
            assert_eq!(a.len(), 4);
        }
        other => panic!("expected identical Complete events, got {:?}", other),
    }
}

#[tokio::test]
async fn given_failing_extraction_then_job_fails_with_message_and_no_result() {
    let stack = spawn_stack(
        Arc::new(MockFailingExtractor::new("quota exceeded")),
        Duration::from_secs(5),
    );
    let owner = OwnerId::new();

    let job_id = stack
        .service
        .submit(
            "exam.txt".to_string(),
            b"content".to_vec(),
            owner,
            ExtractOptions::default(),
        )
        .await
        .unwrap();

    let job = wait_for_terminal(&stack.repository, job_id, owner).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.unwrap().contains("quota exceeded"));
    assert!(job.result.is_none());
}

#[tokio::test]
async fn given_empty_question_list_then_job_fails() {
    let stack = spawn_stack(
        Arc::new(MockExtractor::with_questions(vec![])),
        Duration::from_secs(5),
    );
    let owner = OwnerId::new();

    let job_id = stack
        .service
        .submit(
            "exam.txt".to_string(),
            b"content".to_vec(),
            owner,
            ExtractOptions::default(),
        )
        .await
        .unwrap();

    let job = wait_for_terminal(&stack.repository, job_id, owner).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.unwrap().contains("No questions"));
}

#[tokio::test]
async fn given_extraction_exceeding_timeout_then_job_fails_with_timeout_message() {
    let (extractor, _gate) = GatedExtractor::new(sample_questions(1));
    let stack = spawn_stack(Arc::new(extractor), Duration::from_millis(50));
    let owner = OwnerId::new();

    let job_id = stack
        .service
        .submit(
            "exam.txt".to_string(),
            b"content".to_vec(),
            owner,
            ExtractOptions::default(),
        )
        .await
        .unwrap();

    let job = wait_for_terminal(&stack.repository, job_id, owner).await;
    assert_eq!(job.status, JobStatus::Failed);
    assert!(job.error_message.unwrap().contains("timed out"));
}

#[tokio::test]
async fn given_completed_job_then_result_present_and_progress_full() {
    let stack = spawn_stack(
        Arc::new(MockExtractor::with_questions(sample_questions(10))),
        Duration::from_secs(5),
    );
    let owner = OwnerId::new();

    let job_id = stack
        .service
        .submit(
            "exam.txt".to_string(),
            b"ten questions".to_vec(),
            owner,
            ExtractOptions::default(),
        )
        .await
        .unwrap();

    let job = wait_for_terminal(&stack.repository, job_id, owner).await;
    assert_eq!(job.status, JobStatus::Completed);
    assert_eq!(job.progress_percent, 100);
    assert_eq!(job.result.unwrap().len(), 10);
    assert!(job.error_message.is_none());
}

#[tokio::test]
async fn given_invalid_uploads_when_submitting_then_rejected_without_job() {
    let stack = spawn_stack(
        Arc::new(MockExtractor::with_questions(sample_questions(1))),
        Duration::from_secs(5),
    );
    let owner = OwnerId::new();

    let empty = stack
        .service
        .submit(
            "exam.txt".to_string(),
            Vec::new(),
            owner,
            ExtractOptions::default(),
        )
        .await;
    assert!(matches!(empty, Err(SubmitError::EmptyFile)));

    let oversized = stack
        .service
        .submit(
            "exam.txt".to_string(),
            vec![b'x'; (TEST_MAX_UPLOAD + 1) as usize],
            owner,
            ExtractOptions::default(),
        )
        .await;
    assert!(matches!(oversized, Err(SubmitError::FileTooLarge { .. })));

    let unsupported = stack
        .service
        .submit(
            "exam.exe".to_string(),
            b"MZ".to_vec(),
            owner,
            ExtractOptions::default(),
        )
        .await;
    assert!(matches!(unsupported, Err(SubmitError::UnsupportedType(_))));

    // No job rows were created for any rejected upload.
    let page = stack.repository.list_for_owner(owner, 1, 10).await.unwrap();
    assert_eq!(page.total, 0);
}

#[tokio::test]
async fn given_closed_queue_when_submitting_then_queue_error_and_job_closed_out() {
    let repository: Arc<dyn JobRepository> = Arc::new(MemoryJobRepository::new());
    let notifier: Arc<dyn ProgressNotifier> = Arc::new(ChannelNotifier::new());
    let (sender, receiver) = tokio::sync::mpsc::channel(1);
    drop(receiver);

    let service = ParseService::new(
        Arc::clone(&repository),
        Arc::clone(&notifier),
        sender,
        TEST_MAX_UPLOAD,
    );
    let owner = OwnerId::new();

    let result = service
        .submit(
            "exam.txt".to_string(),
            b"content".to_vec(),
            owner,
            ExtractOptions::default(),
        )
        .await;
    assert!(matches!(result, Err(SubmitError::QueueClosed)));

    // The orphaned row was closed out rather than left pending forever.
    let page = repository.list_for_owner(owner, 1, 10).await.unwrap();
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].status, JobStatus::Failed);
}
