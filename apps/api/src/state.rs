use std::sync::Arc;
use std::time::Duration;

use crate::auth::{IdentityVerifier, TokenService};
use crate::config::Config;
use crate::llm_client::TextGenerator;
use crate::storage::ObjectStore;
use crate::store::JobBoardStore;
use crate::users::webhooks::WebhookVerifier;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn JobBoardStore>,
    /// Destination for company logos and user resumes.
    pub objects: Arc<dyn ObjectStore>,
    pub ai: Arc<dyn TextGenerator>,
    pub tokens: TokenService,
    /// Verifies user sessions issued by the external identity provider.
    pub identity: Arc<dyn IdentityVerifier>,
    pub webhooks: WebhookVerifier,
    pub config: Config,
}

impl AppState {
    pub fn ai_timeout(&self) -> Duration {
        Duration::from_secs(self.config.ai_timeout_secs)
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.config.upload_timeout_secs)
    }
}

#[cfg(test)]
pub mod testing {
    use std::sync::Arc;

    use super::AppState;
    use crate::ai::testing::StubGenerator;
    use crate::auth::user::testing::StaticIdentityVerifier;
    use crate::auth::TokenService;
    use crate::config::Config;
    use crate::storage::memory::MemoryObjectStore;
    use crate::store::MemoryStore;
    use crate::users::webhooks::WebhookVerifier;

    /// State wired to in-memory doubles, with handles kept for assertions.
    pub struct TestState {
        pub state: AppState,
        pub store: Arc<MemoryStore>,
        pub objects: Arc<MemoryObjectStore>,
        pub ai: Arc<StubGenerator>,
    }

    pub fn test_state(ai: StubGenerator, identity: StaticIdentityVerifier) -> TestState {
        let config = Config::for_tests();
        let store = Arc::new(MemoryStore::new());
        let objects = Arc::new(MemoryObjectStore::default());
        let ai = Arc::new(ai);
        let state = AppState {
            store: store.clone(),
            objects: objects.clone(),
            ai: ai.clone(),
            tokens: TokenService::new(&config.jwt_secret),
            identity: Arc::new(identity),
            webhooks: WebhookVerifier::new(&config.identity_webhook_secret)
                .expect("test webhook secret is valid base64"),
            config,
        };
        TestState {
            state,
            store,
            objects,
            ai,
        }
    }
}
