//! AWS adapters: STS for scoped credentials, Chime SDK Identity for the
//! user directory.
//!
//! Both clients are built with retries disabled; a failed call fails the
//! exchange.

mod chime;
mod sts;

pub use chime::ChimeDirectoryProvisioner;
pub use sts::{StsCredentialIssuer, StsIssuerConfig};

use aws_config::{retry::RetryConfig, BehaviorVersion, Region, SdkConfig};

/// Load the shared SDK configuration from the default provider chain.
pub async fn load_sdk_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest())
        .retry_config(RetryConfig::disabled());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_owned()));
    }
    loader.load().await
}

/// STS client from shared config, optionally pointed at another endpoint.
pub fn sts_client(sdk: &SdkConfig, endpoint_url: Option<&str>) -> aws_sdk_sts::Client {
    let mut builder = aws_sdk_sts::config::Builder::from(sdk)
        .retry_config(aws_sdk_sts::config::retry::RetryConfig::disabled());
    if let Some(url) = endpoint_url {
        builder = builder.endpoint_url(url);
    }
    aws_sdk_sts::Client::from_conf(builder.build())
}

/// Chime SDK Identity client from shared config, optionally pointed at another endpoint.
pub fn chime_client(sdk: &SdkConfig, endpoint_url: Option<&str>) -> aws_sdk_chimesdkidentity::Client {
    let mut builder = aws_sdk_chimesdkidentity::config::Builder::from(sdk)
        .retry_config(aws_sdk_chimesdkidentity::config::retry::RetryConfig::disabled());
    if let Some(url) = endpoint_url {
        builder = builder.endpoint_url(url);
    }
    aws_sdk_chimesdkidentity::Client::from_conf(builder.build())
}
