// ── SDK session configuration ──
//
// Builds the shared `SdkConfig` both AWS clients are constructed from.
// Credential resolution is delegated entirely to the default provider
// chain (env, profile, IMDS, SSO).

use aws_config::BehaviorVersion;
use aws_types::SdkConfig;
use aws_types::region::Region;

use crate::cloudwatch::CloudWatchClient;
use crate::fsx::FsxClient;

/// Region and optional named profile used to build SDK clients.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub region: String,
    pub profile: Option<String>,
}

impl SessionConfig {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            profile: None,
        }
    }

    pub fn with_profile(mut self, profile: Option<String>) -> Self {
        self.profile = profile;
        self
    }
}

/// Load the shared SDK configuration for `session`.
pub async fn load_sdk_config(session: &SessionConfig) -> SdkConfig {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(session.region.clone()));
    if let Some(profile) = &session.profile {
        loader = loader.profile_name(profile);
    }
    loader.load().await
}

/// Build both backend clients from one session.
pub async fn connect(session: &SessionConfig) -> (FsxClient, CloudWatchClient) {
    let config = load_sdk_config(session).await;
    tracing::debug!(region = %session.region, profile = ?session.profile, "aws session loaded");
    (FsxClient::new(&config), CloudWatchClient::new(&config))
}
