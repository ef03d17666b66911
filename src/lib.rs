//! Exam parsing service: document uploads, LLM-backed question extraction,
//! and live job progress over SSE with a polling fallback.

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;
