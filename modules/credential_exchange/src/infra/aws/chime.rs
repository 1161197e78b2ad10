use async_trait::async_trait;
use aws_sdk_chimesdkidentity::error::DisplayErrorContext;
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::contract::model::{DirectoryEntryHandle, User};
use crate::domain::error::DomainError;
use crate::domain::ports::DirectoryProvisioner;

/// `CreateAppInstanceUser` adapter. The directory treats a repeated id as a
/// no-op and returns the existing user's ARN.
pub struct ChimeDirectoryProvisioner {
    client: aws_sdk_chimesdkidentity::Client,
    app_instance_arn: String,
}

impl ChimeDirectoryProvisioner {
    pub fn new(client: aws_sdk_chimesdkidentity::Client, app_instance_arn: impl Into<String>) -> Self {
        Self {
            client,
            app_instance_arn: app_instance_arn.into(),
        }
    }
}

#[async_trait]
impl DirectoryProvisioner for ChimeDirectoryProvisioner {
    #[instrument(
        name = "credential_exchange.chime.create_app_instance_user",
        skip_all,
        fields(app_instance_arn = %self.app_instance_arn, user_uuid = %user.uuid)
    )]
    async fn ensure_entry(&self, user: &User) -> Result<DirectoryEntryHandle, DomainError> {
        // The directory requires a name.
        let name = user.display_name.as_deref().unwrap_or(&user.uuid);

        let output = self
            .client
            .create_app_instance_user()
            .app_instance_arn(&self.app_instance_arn)
            .app_instance_user_id(&user.uuid)
            .client_request_token(Uuid::new_v4().to_string())
            .name(name)
            .send()
            .await
            .map_err(|e| {
                warn!(error = %DisplayErrorContext(&e), "CreateAppInstanceUser failed");
                DomainError::provisioning("CreateAppInstanceUser failed")
            })?;

        let arn = output
            .app_instance_user_arn()
            .filter(|arn| !arn.is_empty())
            .ok_or_else(|| DomainError::provisioning("CreateAppInstanceUser returned no ARN"))?;
        debug!(entry = %arn, "Directory entry ensured");
        Ok(DirectoryEntryHandle::new(arn))
    }
}
