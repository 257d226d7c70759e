use clap::Args;
use tracing::{debug, info};

use crate::{
    aws::{
        Credentials,
        sts::{AssumeRoleRequest, StsService, TokenExchange},
    },
    constants::{
        DEFAULT_ASSUMED_ROLE_SESSION_NAME, SETTING_DEFAULT_REGION, SETTING_STS_ENDPOINT,
        SETTING_STS_VERSION,
    },
    error::InitError,
    settings::SettingsProvider,
};

/// Options shared by every command that talks to AWS
#[derive(Debug, Clone, Default, Args)]
pub struct InvocationOptions {
    #[arg(
        long,
        global = true,
        help = "Region to which the client is configured to send requests"
    )]
    pub region: Option<String>,

    #[arg(long = "awsAccessKeyId", global = true, help = "AWS access key")]
    pub aws_access_key_id: Option<String>,

    #[arg(long = "awsSecretAccessKey", global = true, help = "AWS secret key")]
    pub aws_secret_access_key: Option<String>,

    /// Any occurrence enables role assumption, whatever value follows it
    #[arg(
        long = "assumeRole",
        global = true,
        num_args = 0..=1,
        default_missing_value = "",
        help = "Enable assume role"
    )]
    pub assume_role: Option<String>,

    #[arg(
        long = "assumedRoleArn",
        global = true,
        help = "The Amazon Resource Name (ARN) of the role to assume"
    )]
    pub assumed_role_arn: Option<String>,

    #[arg(
        long = "assumedRoleExternalId",
        global = true,
        help = "A unique identifier used by third parties when assuming roles in their customers' accounts"
    )]
    pub assumed_role_external_id: Option<String>,
}

/// Region and credentials available to a command once initialization succeeds
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvocationContext {
    region: String,
    base_credentials: Credentials,
    assumed_role_credentials: Option<Credentials>,
}

impl InvocationContext {
    pub fn region(&self) -> &str {
        &self.region
    }

    pub fn base_credentials(&self) -> &Credentials {
        &self.base_credentials
    }

    pub fn assumed_role_credentials(&self) -> Option<&Credentials> {
        self.assumed_role_credentials.as_ref()
    }

    /// Assumed role credentials when present, base credentials otherwise
    pub fn effective_credentials(&self) -> &Credentials {
        self.assumed_role_credentials
            .as_ref()
            .unwrap_or(&self.base_credentials)
    }
}

/// `--region` wins; an empty value counts as not given.
pub fn resolve_region(options: &InvocationOptions, settings: &impl SettingsProvider) -> String {
    match options.region.as_deref().filter(|r| !r.is_empty()) {
        Some(region) => {
            debug!("Using region from --region: {}", region);
            region.to_string()
        }
        None => {
            let region = settings.get(SETTING_DEFAULT_REGION).unwrap_or_default();
            debug!("Using default region from settings: {}", region);
            region
        }
    }
}

/// Empty keys are accepted here and left for AWS to reject.
pub fn build_base_credentials(options: &InvocationOptions) -> Credentials {
    Credentials::new(
        options.aws_access_key_id.clone().unwrap_or_default(),
        options.aws_secret_access_key.clone().unwrap_or_default(),
    )
}

pub async fn maybe_assume_role(
    options: &InvocationOptions,
    settings: &impl SettingsProvider,
    region: &str,
    base_credentials: &Credentials,
    exchange: &impl TokenExchange,
) -> Result<Option<Credentials>, InitError> {
    if options.assume_role.is_none() {
        debug!("--assumeRole not given, skipping role assumption");
        return Ok(None);
    }

    let role_arn = options
        .assumed_role_arn
        .as_deref()
        .filter(|arn| !arn.is_empty())
        .ok_or(InitError::Validation {
            option: "assumedRoleArn",
        })?;

    let request = AssumeRoleRequest {
        role_arn: role_arn.to_string(),
        session_name: DEFAULT_ASSUMED_ROLE_SESSION_NAME.to_string(),
        external_id: options.assumed_role_external_id.clone(),
    };

    let service = StsService {
        endpoint: settings.get(SETTING_STS_ENDPOINT),
        version: settings.get(SETTING_STS_VERSION),
    };

    info!("Assuming role: {}", request.role_arn);
    let credentials = exchange
        .assume_role(base_credentials, region, &service, &request)
        .await?;

    Ok(Some(credentials))
}

/// Resolve region, base credentials and, when requested, assumed role
/// credentials. Nothing is returned unless every step succeeds.
pub async fn initialize(
    options: &InvocationOptions,
    settings: &impl SettingsProvider,
    exchange: &impl TokenExchange,
) -> Result<InvocationContext, InitError> {
    let region = resolve_region(options, settings);
    let base_credentials = build_base_credentials(options);
    let assumed_role_credentials =
        maybe_assume_role(options, settings, &region, &base_credentials, exchange).await?;

    Ok(InvocationContext {
        region,
        base_credentials,
        assumed_role_credentials,
    })
}
