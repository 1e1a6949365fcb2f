use autoforward_core::job::{ExecutorConfig, JobSupervisor};
use autoforward_core::platform::ChannelClient;
use autoforward_core::wizard::SetupWizard;
use std::sync::Arc;

/// Shared state for the relay bot, injected into every handler.
pub struct RelayContext {
    /// Open setup conversations, one per user
    pub wizard: SetupWizard,
    /// Owner of the single job slot
    pub supervisor: JobSupervisor,
    /// Platform client handed to every job
    pub client: Arc<dyn ChannelClient>,
}

impl RelayContext {
    /// Create a context with no open sessions and an idle supervisor.
    #[must_use]
    pub fn new(client: Arc<dyn ChannelClient>, config: ExecutorConfig) -> Self {
        Self {
            wizard: SetupWizard::new(),
            supervisor: JobSupervisor::new(config),
            client,
        }
    }
}
