mod email;
mod scheduling;

pub use email::{EmailBody, EmailMessage, HttpEmailTransport, IEmailTransport, LogEmailTransport};
pub use scheduling::{
    AppointmentPage, HttpSchedulingService, ISchedulingService, NoopSchedulingService,
};

use crate::config::Config;
use std::sync::Arc;

/// Collaborators reached over the network
#[derive(Clone)]
pub struct Services {
    pub email: Arc<dyn IEmailTransport>,
    pub scheduling: Arc<dyn ISchedulingService>,
}

impl Services {
    pub fn from_config(config: &Config) -> Self {
        let email: Arc<dyn IEmailTransport> = match &config.email_api {
            Some(email_api) => Arc::new(HttpEmailTransport::new(email_api.clone())),
            None => Arc::new(LogEmailTransport {}),
        };
        let scheduling: Arc<dyn ISchedulingService> = match &config.scheduling_api {
            Some(scheduling_api) => Arc::new(HttpSchedulingService::new(
                scheduling_api.clone(),
                config.sync_timeout,
            )),
            None => Arc::new(NoopSchedulingService {}),
        };
        Self { email, scheduling }
    }

    pub fn create_inmemory() -> Self {
        Self {
            email: Arc::new(LogEmailTransport {}),
            scheduling: Arc::new(NoopSchedulingService {}),
        }
    }
}
