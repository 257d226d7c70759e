use anyhow::Result;
use clap::Args;

use crate::{
    aws::sts::{self, StsService},
    constants::{SETTING_STS_ENDPOINT, SETTING_STS_VERSION},
    initializer::InvocationContext,
    settings::SettingsProvider,
};

#[derive(Debug, Clone, Args)]
pub struct WhoamiCommand {}

impl WhoamiCommand {
    pub async fn execute(
        self,
        context: &InvocationContext,
        settings: &impl SettingsProvider,
    ) -> Result<()> {
        let service = StsService {
            endpoint: settings.get(SETTING_STS_ENDPOINT),
            version: settings.get(SETTING_STS_VERSION),
        };

        let identity = sts::caller_identity(
            context.effective_credentials(),
            context.region(),
            &service,
        )
        .await?;

        println!("Account: {}", identity.account);
        println!("Arn:     {}", identity.arn);
        println!("UserId:  {}", identity.user_id);
        Ok(())
    }
}
