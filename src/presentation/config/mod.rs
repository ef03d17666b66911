mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    AuthSettings, DatabaseSettings, LlmSettings, LoggingSettings, ServerSettings, Settings,
    StreamSettings, UploadSettings,
};
