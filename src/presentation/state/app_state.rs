use std::sync::Arc;

use crate::application::ports::{Authenticator, JobRepository, ProgressNotifier};
use crate::application::services::ParseService;
use crate::presentation::config::Settings;

#[derive(Clone)]
pub struct AppState {
    pub parse_service: Arc<ParseService>,
    pub job_repository: Arc<dyn JobRepository>,
    pub notifier: Arc<dyn ProgressNotifier>,
    pub authenticator: Arc<dyn Authenticator>,
    pub settings: Settings,
}
