//! Geolocation service.
//!
//! Resolves an approximate visitor position through a pluggable
//! [`Locator`] with a bounded wait. Every failure mode has a distinct
//! classification so clients can explain what happened, and flows that
//! can proceed without a fix fall back to the configured default
//! center.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use pulso_common::config::{GeolocationConfig, MapConfig};
use pulso_common::{AppError, AppResult};

/// A geographic position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Single-shot position lookup. No request payload; the implementation
/// decides what "here" means.
#[async_trait]
pub trait Locator: Send + Sync {
    /// Resolve the current position or fail with a classified error.
    async fn locate(&self) -> AppResult<Position>;
}

/// Locator that approximates the position from the server's public IP.
pub struct IpLookupLocator {
    http_client: reqwest::Client,
    url: String,
}

impl IpLookupLocator {
    /// Create a locator against an ip-api.com style endpoint.
    #[must_use]
    pub fn new(url: String) -> Self {
        Self {
            http_client: reqwest::Client::new(),
            url,
        }
    }
}

#[async_trait]
impl Locator for IpLookupLocator {
    async fn locate(&self) -> AppResult<Position> {
        let response = self
            .http_client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::GeolocationUnavailable(format!("lookup failed: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AppError::GeolocationDenied);
        }
        if !status.is_success() {
            return Err(AppError::GeolocationUnavailable(format!(
                "lookup returned {status}"
            )));
        }

        #[derive(Deserialize)]
        struct IpApiResponse {
            status: String,
            #[serde(default)]
            message: Option<String>,
            #[serde(default)]
            lat: Option<f64>,
            #[serde(default)]
            lon: Option<f64>,
        }

        let body: IpApiResponse = response
            .json()
            .await
            .map_err(|e| AppError::GeolocationUnavailable(format!("invalid response: {e}")))?;

        if body.status != "success" {
            return Err(AppError::GeolocationUnavailable(
                body.message.unwrap_or_else(|| "no position".to_string()),
            ));
        }

        match (body.lat, body.lon) {
            (Some(latitude), Some(longitude)) => Ok(Position {
                latitude,
                longitude,
            }),
            _ => Err(AppError::GeolocationUnavailable(
                "response carried no coordinates".to_string(),
            )),
        }
    }
}

/// Outcome of trying to center on the visitor.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Resolved {
    pub position: Position,
    /// Whether `position` is the visitor's, as opposed to the fallback.
    pub located: bool,
    /// Explanation when the fallback was used.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

/// Geolocation service wrapping a locator with a bounded wait.
#[derive(Clone)]
pub struct GeolocationService {
    locator: Arc<dyn Locator>,
    timeout: Duration,
    default_center: Position,
}

impl GeolocationService {
    /// Create a new geolocation service.
    #[must_use]
    pub fn new(locator: Arc<dyn Locator>, geo: &GeolocationConfig, map: &MapConfig) -> Self {
        Self {
            locator,
            timeout: Duration::from_secs(geo.timeout_seconds),
            default_center: Position {
                latitude: map.default_latitude,
                longitude: map.default_longitude,
            },
        }
    }

    /// The center used when the visitor cannot be located.
    #[must_use]
    pub const fn default_center(&self) -> Position {
        self.default_center
    }

    /// Resolve the visitor's position, waiting at most the configured
    /// timeout. A timeout is reported as its own error class.
    pub async fn locate(&self) -> AppResult<Position> {
        match tokio::time::timeout(self.timeout, self.locator.locate()).await {
            Ok(result) => result,
            Err(_) => Err(AppError::GeolocationTimeout),
        }
    }

    /// Resolve the visitor's position, falling back to the default
    /// center on any failure. The outcome says which happened.
    pub async fn resolve_or_default(&self) -> Resolved {
        match self.locate().await {
            Ok(position) => Resolved {
                position,
                located: true,
                notice: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Geolocation failed, using default center");
                Resolved {
                    position: self.default_center,
                    located: false,
                    notice: Some(Self::fallback_notice(&e)),
                }
            }
        }
    }

    fn fallback_notice(error: &AppError) -> String {
        match error {
            AppError::GeolocationDenied => {
                "Location permission denied. Showing the default area.".to_string()
            }
            AppError::GeolocationTimeout => {
                "Locating you took too long. Showing the default area.".to_string()
            }
            _ => "Could not determine your location. Showing the default area.".to_string(),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    struct FixedLocator(Position);

    #[async_trait]
    impl Locator for FixedLocator {
        async fn locate(&self) -> AppResult<Position> {
            Ok(self.0)
        }
    }

    struct FailingLocator(fn() -> AppError);

    #[async_trait]
    impl Locator for FailingLocator {
        async fn locate(&self) -> AppResult<Position> {
            Err((self.0)())
        }
    }

    struct StalledLocator;

    #[async_trait]
    impl Locator for StalledLocator {
        async fn locate(&self) -> AppResult<Position> {
            tokio::time::sleep(Duration::from_secs(3600)).await;
            Ok(Position {
                latitude: 0.0,
                longitude: 0.0,
            })
        }
    }

    fn service(locator: Arc<dyn Locator>) -> GeolocationService {
        let geo = GeolocationConfig {
            provider_url: "http://ip-api.example/json".to_string(),
            timeout_seconds: 10,
        };
        GeolocationService::new(locator, &geo, &MapConfig::default())
    }

    fn service_with_timeout(locator: Arc<dyn Locator>, millis: u64) -> GeolocationService {
        let mut svc = service(locator);
        svc.timeout = Duration::from_millis(millis);
        svc
    }

    #[tokio::test]
    async fn test_locate_passes_position_through() {
        let svc = service(Arc::new(FixedLocator(Position {
            latitude: -18.01,
            longitude: -70.25,
        })));

        let position = svc.locate().await.unwrap();
        assert!((position.latitude - -18.01).abs() < f64::EPSILON);
    }

    #[tokio::test]
    async fn test_timeout_is_classified() {
        let svc = service_with_timeout(Arc::new(StalledLocator), 20);

        let err = svc.locate().await.unwrap_err();
        assert_eq!(err.error_code(), "GEOLOCATION_TIMEOUT");
    }

    #[tokio::test]
    async fn test_timeout_falls_back_like_a_failure() {
        let svc = service_with_timeout(Arc::new(StalledLocator), 20);

        let resolved = svc.resolve_or_default().await;

        assert!(!resolved.located);
        assert_eq!(resolved.position, svc.default_center());
        assert!(resolved.notice.unwrap().contains("took too long"));
    }

    #[tokio::test]
    async fn test_denied_gets_its_own_notice() {
        let svc = service(Arc::new(FailingLocator(|| AppError::GeolocationDenied)));

        let resolved = svc.resolve_or_default().await;

        assert!(!resolved.located);
        assert!(resolved.notice.unwrap().contains("permission denied"));
    }

    #[tokio::test]
    async fn test_unavailable_uses_generic_notice() {
        let svc = service(Arc::new(FailingLocator(|| {
            AppError::GeolocationUnavailable("gps off".to_string())
        })));

        let resolved = svc.resolve_or_default().await;

        assert!(resolved.notice.unwrap().contains("Could not determine"));
    }
}
