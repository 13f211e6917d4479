// Copyright 2024 Dmitry Tantsur <dtantsur@protonmail.com>
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! JSON structures and protocol bits for version discovery.

#![allow(missing_docs)]

use log::{debug, trace, warn};
use reqwest::{Method, Url};
use serde::Deserialize;

use super::client::AuthenticatedClient;
use super::common::{empty_as_default, Link};
use super::services::ServiceType;
use super::url;
use super::{ApiVersion, Error, ErrorKind};

/// A version of an API as reported by the discovery document.
#[derive(Clone, Debug, Deserialize)]
pub struct Version {
    pub id: ApiVersion,
    pub links: Vec<Link>,
    #[serde(deserialize_with = "empty_as_default", default)]
    pub status: Option<String>,
    #[serde(deserialize_with = "empty_as_default", default)]
    pub version: Option<ApiVersion>,
    #[serde(deserialize_with = "empty_as_default", default)]
    pub min_version: Option<ApiVersion>,
}

/// A root of version discovery: either one version or a list of them.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum Root {
    MultipleVersions { versions: Vec<Version> },
    OneVersion { version: Version },
}

/// Information about an API endpoint.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceInfo {
    /// Root endpoint.
    pub root_url: Url,
    /// Major API version.
    pub major_version: Option<ApiVersion>,
    /// Current API version (if supported).
    pub current_version: Option<ApiVersion>,
    /// Minimum API version (if supported).
    pub minimum_version: Option<ApiVersion>,
}

impl Version {
    pub fn is_stable(&self) -> bool {
        if let Some(ref status) = self.status {
            let upper = status.to_uppercase();
            upper == "STABLE" || upper == "CURRENT" || upper == "SUPPORTED"
        } else {
            true
        }
    }

    pub fn into_service_info(self) -> Result<ServiceInfo, Error> {
        let endpoint = match self.links.into_iter().find(|x| x.rel == "self") {
            Some(link) => link.href,
            None => {
                return Err(Error::new(
                    ErrorKind::InvalidResponse,
                    "Invalid version - missing self link",
                ));
            }
        };

        Ok(ServiceInfo {
            root_url: endpoint,
            major_version: Some(self.id),
            current_version: self.version,
            minimum_version: self.min_version,
        })
    }
}

impl Root {
    /// Fetch a version discovery root from the URL.
    pub async fn fetch(
        catalog_type: &'static str,
        endpoint: Url,
        client: &AuthenticatedClient,
    ) -> Result<Root, Error> {
        debug!("Fetching {} service info from {}", catalog_type, endpoint);
        client
            .request(Method::GET, endpoint)
            .fetch_json::<Root>()
            .await
    }

    /// Extract `ServiceInfo` from a version discovery root.
    pub fn into_service_info<Srv: ServiceType>(self, service: &Srv) -> Result<ServiceInfo, Error> {
        trace!(
            "Available major versions for {} service: {:?}",
            service.catalog_type(),
            self
        );

        match self {
            Root::OneVersion { version: ver } => {
                if service.major_version_supported(ver.id) {
                    if !ver.is_stable() {
                        warn!(
                            "Using version {:?} of {} API that is not marked as stable",
                            ver,
                            service.catalog_type()
                        );
                    }

                    ver.into_service_info()
                } else {
                    Err(Error::new(
                        ErrorKind::EndpointNotFound,
                        "Major version not supported",
                    ))
                }
            }
            Root::MultipleVersions { versions: mut vers } => {
                vers.sort_unstable_by_key(|x| x.id);
                match vers
                    .into_iter()
                    .rfind(|x| x.is_stable() && service.major_version_supported(x.id))
                {
                    Some(ver) => ver.into_service_info(),
                    None => Err(Error::new_endpoint_not_found(service.catalog_type())),
                }
            }
        }
    }
}

impl ServiceInfo {
    /// Whether this service supports the given API version.
    ///
    /// Defaults to false if cannot be determined.
    #[inline]
    pub fn supports_api_version(&self, version: ApiVersion) -> bool {
        match (self.minimum_version, self.current_version) {
            (Some(min), Some(max)) => min <= version && max >= version,
            (None, Some(current)) => current == version,
            (Some(min), None) => version >= min,
            _ => false,
        }
    }

    /// Generic code to extract a `ServiceInfo` from a URL.
    pub async fn fetch<Srv: ServiceType>(
        service: Srv,
        endpoint: Url,
        client: &AuthenticatedClient,
    ) -> Result<ServiceInfo, Error> {
        if !service.version_discovery_supported() {
            debug!(
                "Service {} does not support version discovery, using {}",
                service.catalog_type(),
                endpoint
            );
            return Ok(ServiceInfo {
                root_url: endpoint,
                major_version: None,
                current_version: None,
                minimum_version: None,
            });
        }

        // Some services return http links even when accessed via https.
        let secure = endpoint.scheme() == "https";
        let catalog_type = service.catalog_type();

        let root = match Root::fetch(catalog_type, endpoint.clone(), client).await {
            Ok(root) => root,
            Err(e) if e.kind() == ErrorKind::ResourceNotFound => {
                if url::is_root(&endpoint) {
                    return Err(Error::new_endpoint_not_found(catalog_type));
                }
                debug!("Got HTTP 404 from {}, trying parent endpoint", endpoint);
                Root::fetch(catalog_type, url::pop(endpoint, true), client).await?
            }
            Err(e) => return Err(e),
        };

        let mut info = root.into_service_info(&service)?;
        if secure && info.root_url.scheme() == "http" {
            // Url::set_scheme only fails on incompatible schemes.
            info.root_url.set_scheme("https").expect("set https scheme");
        }

        debug!("Received {:?} for {} service", info, catalog_type);
        Ok(info)
    }
}

#[cfg(test)]
pub(crate) mod test {
    use reqwest::Url;

    use super::super::services::ServiceType;
    use super::super::{ApiVersion, ErrorKind};
    use super::{Root, ServiceInfo, Version};
    use crate::common::Link;

    fn version(id: ApiVersion, url: &str, status: Option<&str>) -> Version {
        Version {
            id,
            links: vec![
                Link {
                    href: Url::parse("https://example.com/docs").unwrap(),
                    rel: "other".to_string(),
                },
                Link {
                    href: Url::parse(url).unwrap(),
                    rel: "self".to_string(),
                },
            ],
            status: status.map(Into::into),
            version: None,
            min_version: None,
        }
    }

    #[test]
    fn test_version_stable_statuses() {
        for status in &["CURRENT", "Stable", "supported"] {
            let ver = version(ApiVersion(2, 0), "https://example.com/v2", Some(status));
            assert!(ver.is_stable());
        }
        let no_status = version(ApiVersion(2, 0), "https://example.com/v2", None);
        assert!(no_status.is_stable());
        let deprecated = version(
            ApiVersion(2, 0),
            "https://example.com/v2",
            Some("DEPRECATED"),
        );
        assert!(!deprecated.is_stable());
    }

    #[test]
    fn test_version_into_service_info() {
        let mut ver = version(ApiVersion(2, 0), "https://example.com/v2", None);
        ver.version = Some(ApiVersion(2, 2));
        let info = ver.into_service_info().unwrap();
        assert_eq!(info.root_url.as_str(), "https://example.com/v2");
        assert_eq!(info.major_version, Some(ApiVersion(2, 0)));
        assert_eq!(info.current_version, Some(ApiVersion(2, 2)));
        assert_eq!(info.minimum_version, None);
    }

    #[test]
    fn test_version_into_service_info_no_self_link() {
        let mut ver = version(ApiVersion(2, 0), "https://example.com/v2", None);
        let _ = ver.links.pop();
        let err = ver.into_service_info().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    struct ServiceWithDiscovery;

    impl ServiceType for ServiceWithDiscovery {
        fn catalog_type(&self) -> &'static str {
            "test-service-with-discovery"
        }

        fn major_version_supported(&self, version: ApiVersion) -> bool {
            version.0 == 1 && version.1 > 0
        }
    }

    #[test]
    fn test_root_into_service_info_one_version() {
        let root = Root::OneVersion {
            version: version(ApiVersion(1, 2), "https://example.com/v1.2", Some("STABLE")),
        };

        let info = root.into_service_info(&ServiceWithDiscovery).unwrap();
        assert_eq!(info.root_url.as_str(), "https://example.com/v1.2");
        assert_eq!(info.major_version, Some(ApiVersion(1, 2)));
    }

    #[test]
    fn test_root_into_service_info_one_version_unsupported() {
        let root = Root::OneVersion {
            version: version(ApiVersion(1, 0), "https://example.com/v1.0", Some("STABLE")),
        };

        let err = root.into_service_info(&ServiceWithDiscovery).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
    }

    #[test]
    fn test_root_into_service_info_versions() {
        let root = Root::MultipleVersions {
            versions: vec![
                version(ApiVersion(1, 0), "https://example.com/1.0", Some("STABLE")),
                version(ApiVersion(1, 1), "https://example.com/1.1", Some("STABLE")),
                version(ApiVersion(1, 2), "https://example.com/1.2", Some("STABLE")),
                version(ApiVersion(2, 0), "https://example.com/2.0", Some("STABLE")),
            ],
        };

        let info = root.into_service_info(&ServiceWithDiscovery).unwrap();
        assert_eq!(info.root_url.as_str(), "https://example.com/1.2");
        assert_eq!(info.major_version, Some(ApiVersion(1, 2)));
    }

    #[test]
    fn test_root_into_service_info_versions_unsupported() {
        let root = Root::MultipleVersions {
            versions: vec![
                version(ApiVersion(1, 0), "https://example.com/1.0", Some("STABLE")),
                version(ApiVersion(2, 0), "https://example.com/2.0", Some("STABLE")),
            ],
        };

        let err = root.into_service_info(&ServiceWithDiscovery).err().unwrap();
        assert_eq!(err.kind(), ErrorKind::EndpointNotFound);
    }

    #[test]
    fn test_supports_api_version() {
        let info = ServiceInfo {
            root_url: Url::parse("https://example.com/v2").unwrap(),
            major_version: Some(ApiVersion(2, 0)),
            current_version: Some(ApiVersion(2, 42)),
            minimum_version: Some(ApiVersion(2, 1)),
        };
        assert!(info.supports_api_version(ApiVersion(2, 1)));
        assert!(info.supports_api_version(ApiVersion(2, 30)));
        assert!(info.supports_api_version(ApiVersion(2, 42)));
        assert!(!info.supports_api_version(ApiVersion(2, 43)));
        assert!(!info.supports_api_version(ApiVersion(2, 0)));
    }

    #[test]
    fn test_supports_api_version_unknown() {
        let info = ServiceInfo {
            root_url: Url::parse("https://example.com/v2").unwrap(),
            major_version: None,
            current_version: None,
            minimum_version: None,
        };
        assert!(!info.supports_api_version(ApiVersion(2, 1)));
    }
}
