use crate::core::{
    config::Config,
    directory::{Directory, Secrets},
    services::{broadcast::BroadcastDispatcher, transcription::WhisperClient},
    timer::{Expiry, InactivityTimer},
    workflow::PublishWorkflow,
};
use crate::errors::MyError;
use tokio::sync::{Mutex, mpsc};

/// Everything the handlers share. Lives behind an `Arc` in the dispatcher's
/// dependency map.
pub struct AppState {
    pub config: Config,
    pub directory: Mutex<Directory>,
    pub timer: InactivityTimer,
    pub workflow: PublishWorkflow,
    pub broadcaster: BroadcastDispatcher,
    pub whisper: Option<WhisperClient>,
}

impl AppState {
    pub fn new(config: Config) -> Result<(Self, mpsc::UnboundedReceiver<Expiry>), MyError> {
        let directory = Directory::new(Secrets {
            admin: config.get_admin_password().to_string(),
            superadmin: config.get_superadmin_password().to_string(),
        });
        let (timer, expiries) = InactivityTimer::new(config.get_publish_timeout());
        let json = config.get_json_config();
        let workflow = PublishWorkflow::new(json.get_footer());
        let broadcaster = BroadcastDispatcher::new(json.get_broadcast_fan_out());
        let whisper = match config.get_openai_api_key() {
            Some(key) => Some(WhisperClient::new(key, json)?),
            None => None,
        };

        let state = Self {
            config,
            directory: Mutex::new(directory),
            timer,
            workflow,
            broadcaster,
            whisper,
        };
        Ok((state, expiries))
    }
}
