mod job_event_test;
mod job_status_test;
mod job_test;
