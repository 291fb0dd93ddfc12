//! Shared AWS SDK configuration loading.

use aws_config::{BehaviorVersion, Region, SdkConfig};

/// Loads the shared SDK configuration, preferring the configured region over the default
/// provider chain.
pub(crate) async fn sdk_config(region: Option<&str>) -> SdkConfig {
    let mut loader = aws_config::defaults(BehaviorVersion::latest());
    if let Some(region) = region {
        loader = loader.region(Region::new(region.to_string()));
    }
    loader.load().await
}
