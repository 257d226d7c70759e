use std::future::Future;

use anyhow::{Context, Result};
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::{
    Client as StsClient,
    config::{Config as StsConfig, Credentials as SdkCredentials},
    error::DisplayErrorContext,
};
use aws_smithy_types::date_time::Format;
use tracing::{debug, info};

use super::Credentials;
use crate::{constants::STS_API_VERSION, error::TokenExchangeError};

/// Endpoint and API version of the STS service, as read from settings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StsService {
    pub endpoint: Option<String>,
    pub version: Option<String>,
}

/// A single AssumeRole call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssumeRoleRequest {
    pub role_arn: String,
    pub session_name: String,
    pub external_id: Option<String>,
}

/// Identity reported by GetCallerIdentity
#[derive(Debug, Clone)]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
    pub user_id: String,
}

/// Exchanges base credentials for temporary role credentials.
pub trait TokenExchange {
    fn assume_role(
        &self,
        base: &Credentials,
        region: &str,
        service: &StsService,
        request: &AssumeRoleRequest,
    ) -> impl Future<Output = Result<Credentials, TokenExchangeError>> + Send;
}

/// [`TokenExchange`] backed by the AWS SDK STS client
#[derive(Debug, Clone, Copy, Default)]
pub struct StsTokenExchange;

impl TokenExchange for StsTokenExchange {
    async fn assume_role(
        &self,
        base: &Credentials,
        region: &str,
        service: &StsService,
        request: &AssumeRoleRequest,
    ) -> Result<Credentials, TokenExchangeError> {
        check_version(service)?;

        info!("Calling AWS STS AssumeRole");
        debug!("Role ARN: {}", request.role_arn);
        debug!("Session name: {}", request.session_name);
        debug!("External ID provided: {}", request.external_id.is_some());

        let client = build_client(base, region, service);

        let response = client
            .assume_role()
            .role_arn(&request.role_arn)
            .role_session_name(&request.session_name)
            .set_external_id(request.external_id.clone())
            .send()
            .await
            .map_err(|e| TokenExchangeError::Request(DisplayErrorContext(&e).to_string()))?;

        let sts_creds = response
            .credentials()
            .ok_or(TokenExchangeError::MissingCredentials)?;

        debug!(
            "Assumed role credentials expire at: {}",
            sts_creds
                .expiration()
                .fmt(Format::DateTime)
                .unwrap_or_else(|_| "unknown".to_string())
        );

        info!("Successfully assumed role");
        Ok(Credentials::with_session_token(
            sts_creds.access_key_id(),
            sts_creds.secret_access_key(),
            sts_creds.session_token(),
        ))
    }
}

/// Look up the identity behind the given credentials
pub async fn caller_identity(
    credentials: &Credentials,
    region: &str,
    service: &StsService,
) -> Result<CallerIdentity> {
    check_version(service)?;

    info!("Calling AWS STS GetCallerIdentity");
    let client = build_client(credentials, region, service);

    let response = client
        .get_caller_identity()
        .send()
        .await
        .map_err(|e| anyhow::anyhow!("{}", DisplayErrorContext(&e)))
        .context("Failed to get caller identity")?;

    Ok(CallerIdentity {
        account: response.account().unwrap_or_default().to_string(),
        arn: response.arn().unwrap_or_default().to_string(),
        user_id: response.user_id().unwrap_or_default().to_string(),
    })
}

/// The SDK only speaks one STS API version, so anything else is rejected
/// before a request is built.
fn check_version(service: &StsService) -> Result<(), TokenExchangeError> {
    match service.version.as_deref() {
        None | Some("") | Some("latest") | Some(STS_API_VERSION) => Ok(()),
        Some(other) => Err(TokenExchangeError::UnsupportedVersion(other.to_string())),
    }
}

fn build_client(credentials: &Credentials, region: &str, service: &StsService) -> StsClient {
    debug!("Region: {}", region);

    let mut builder = StsConfig::builder()
        .behavior_version(BehaviorVersion::latest())
        .region(Region::new(region.to_string()))
        .credentials_provider(SdkCredentials::from(credentials));

    // Empty endpoint falls back to SDK endpoint resolution
    if let Some(endpoint) = service.endpoint.as_deref().filter(|e| !e.is_empty()) {
        debug!("STS endpoint: {}", endpoint);
        builder = builder.endpoint_url(endpoint);
    }

    StsClient::from_conf(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service(version: Option<&str>) -> StsService {
        StsService {
            endpoint: None,
            version: version.map(String::from),
        }
    }

    #[test]
    fn test_check_version_accepts_known_versions() {
        assert!(check_version(&service(None)).is_ok());
        assert!(check_version(&service(Some(""))).is_ok());
        assert!(check_version(&service(Some("latest"))).is_ok());
        assert!(check_version(&service(Some("2011-06-15"))).is_ok());
    }

    #[test]
    fn test_check_version_rejects_unknown_version() {
        let err = check_version(&service(Some("2020-01-01"))).unwrap_err();
        assert_eq!(
            err,
            TokenExchangeError::UnsupportedVersion("2020-01-01".to_string())
        );
    }

    #[tokio::test]
    async fn test_unsupported_version_fails_before_request() {
        let base = Credentials::new("AKIAEXAMPLE", "secret");
        let request = AssumeRoleRequest {
            role_arn: "arn:aws:iam::123456789012:role/Foo".to_string(),
            session_name: "aws-utility".to_string(),
            external_id: None,
        };

        let result = StsTokenExchange
            .assume_role(&base, "us-east-1", &service(Some("1999-01-01")), &request)
            .await;

        assert!(matches!(
            result,
            Err(TokenExchangeError::UnsupportedVersion(_))
        ));
    }
}
