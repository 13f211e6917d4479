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

//! A client for the Content Delivery service API.

#[cfg(feature = "stream")]
use futures::Stream;
use reqwest::header::LOCATION;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};

#[cfg(feature = "stream")]
use super::client::{Page, PaginatedCollection};
use super::common::{next_from_links, ExtraProperties, Link};
use super::services::CDN;
use super::session::Session;
use super::{Error, ErrorKind};

crate::extensible_enum! {
    #[doc = "Possible statuses of a CDN service."]
    pub enum ServiceStatus: Other {
        #[doc = "The service is being provisioned."]
        CreateInProgress = "create_in_progress",
        #[doc = "The service is ready."]
        Deployed = "deployed",
        #[doc = "An update is being rolled out."]
        UpdateInProgress = "update_in_progress",
        #[doc = "The service is being removed."]
        DeleteInProgress = "delete_in_progress",
        #[doc = "The last operation failed."]
        Failed = "failed"
    }
}

/// A CDN provider flavor.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Flavor {
    /// Unique ID.
    pub id: String,
    /// Providers backing this flavor.
    #[serde(default)]
    pub providers: Vec<Provider>,
    /// Links to the flavor itself.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// A provider of a flavor.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Provider {
    /// Provider name.
    pub provider: String,
    /// Links to the provider.
    #[serde(default)]
    pub links: Vec<Link>,
}

/// An origin server of a CDN service.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Origin {
    /// Host name or IP address of the origin.
    pub origin: String,
    /// Port to fetch the content from.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Whether to use TLS when fetching.
    #[serde(default)]
    pub ssl: bool,
}

fn default_port() -> u16 {
    80
}

/// A domain a CDN service responds on.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Domain {
    /// The domain name.
    pub domain: String,
    /// Protocol to serve (e.g. `http`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
}

/// A caching rule of a CDN service.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CachingRule {
    /// Rule name.
    pub name: String,
    /// Time to live in seconds.
    pub ttl: u32,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// A CDN service: content of one or more origins served via a provider.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CdnService {
    /// Unique ID.
    pub id: String,
    /// Service name.
    pub name: String,
    /// Domains to respond on.
    #[serde(default)]
    pub domains: Vec<Domain>,
    /// Origins to fetch the content from.
    #[serde(default)]
    pub origins: Vec<Origin>,
    /// Caching rules.
    #[serde(default)]
    pub caching: Vec<CachingRule>,
    /// ID of the flavor in use.
    #[serde(default)]
    pub flavor_id: Option<String>,
    /// Current status.
    #[serde(default)]
    pub status: Option<ServiceStatus>,
    /// Links to the service itself and its access URLs.
    #[serde(default)]
    pub links: Vec<Link>,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// Parameters for creating a CDN service.
#[derive(Clone, Debug, Serialize)]
pub struct CdnServiceParams {
    /// Service name.
    pub name: String,
    /// Domains to respond on.
    pub domains: Vec<Domain>,
    /// Origins to fetch the content from.
    pub origins: Vec<Origin>,
    /// ID of the flavor to use.
    pub flavor_id: String,
    /// Caching rules.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub caching: Vec<CachingRule>,
    /// Extension properties to pass through.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

#[derive(Debug, Deserialize)]
struct FlavorsRoot {
    flavors: Vec<Flavor>,
    #[serde(default)]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct ServicesRoot {
    services: Vec<CdnService>,
    #[serde(default)]
    links: Vec<Link>,
}

#[cfg(feature = "stream")]
impl PaginatedCollection for FlavorsRoot {
    type Item = Flavor;
    fn into_page(self) -> Page<Flavor> {
        Page {
            next: next_from_links(&self.links),
            items: self.flavors,
        }
    }
}

#[cfg(feature = "stream")]
impl PaginatedCollection for ServicesRoot {
    type Item = CdnService;
    fn into_page(self) -> Page<CdnService> {
        Page {
            next: next_from_links(&self.links),
            items: self.services,
        }
    }
}

fn verify_ping_status(status: StatusCode) -> Result<(), Error> {
    if status == StatusCode::NO_CONTENT {
        Ok(())
    } else {
        Err(Error::new(
            ErrorKind::InvalidResponse,
            format!("Expected HTTP 204 from a ping, got {}", status),
        )
        .with_status(status))
    }
}

/// A client for the Content Delivery service.
#[derive(Debug, Clone)]
pub struct CdnApi {
    session: Session,
}

impl CdnApi {
    /// Create a client from an existing session.
    pub fn new(session: &Session) -> CdnApi {
        CdnApi {
            session: session.clone(),
        }
    }

    /// Check that the service is alive.
    ///
    /// A healthy deployment responds with HTTP 204.
    pub async fn ping(&self) -> Result<(), Error> {
        let response = self.session.get(CDN, &["ping"]).await?.send().await?;
        verify_ping_status(response.status())
    }

    /// Fetch the home document describing the API.
    pub async fn get_home_document(&self) -> Result<serde_json::Value, Error> {
        self.session
            .get(CDN, crate::client::NO_PATH)
            .await?
            .fetch_json()
            .await
    }

    /// List available flavors.
    #[cfg(feature = "stream")]
    pub async fn list_flavors(&self) -> Result<impl Stream<Item = Result<Flavor, Error>>, Error> {
        Ok(self
            .session
            .get(CDN, &["flavors"])
            .await?
            .fetch_paginated::<FlavorsRoot>())
    }

    /// Get one flavor by its ID.
    pub async fn get_flavor<S: AsRef<str>>(&self, id: S) -> Result<Flavor, Error> {
        self.session
            .get(CDN, &["flavors", id.as_ref()])
            .await?
            .fetch_json()
            .await
    }

    /// List CDN services of the current project.
    #[cfg(feature = "stream")]
    pub async fn list_services(
        &self,
    ) -> Result<impl Stream<Item = Result<CdnService, Error>>, Error> {
        Ok(self
            .session
            .get(CDN, &["services"])
            .await?
            .fetch_paginated::<ServicesRoot>())
    }

    /// Get one CDN service by its ID.
    pub async fn get_service<S: AsRef<str>>(&self, id: S) -> Result<CdnService, Error> {
        self.session
            .get(CDN, &["services", id.as_ref()])
            .await?
            .fetch_json()
            .await
    }

    /// Create a CDN service.
    ///
    /// Creation is asynchronous: the service comes back with the
    /// `create_in_progress` status. The URL of the new service is returned.
    pub async fn create_service(&self, params: &CdnServiceParams) -> Result<Url, Error> {
        let response = self
            .session
            .post(CDN, &["services"])
            .await?
            .json(params)
            .send()
            .await?;
        let location = response.headers().get(LOCATION).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidResponse,
                "Missing Location header in the creation response",
            )
        })?;
        let location = location.to_str().map_err(|_| {
            Error::new(
                ErrorKind::InvalidResponse,
                "Malformed Location header in the creation response",
            )
        })?;
        Url::parse(location).map_err(Error::from)
    }

    /// Delete a CDN service.
    pub async fn delete_service<S: AsRef<str>>(&self, id: S) -> Result<(), Error> {
        let _ = self
            .session
            .delete(CDN, &["services", id.as_ref()])
            .await?
            .send()
            .await?;
        Ok(())
    }

    /// Purge a cached asset of a service, or all assets with `None`.
    pub async fn delete_cached_asset<S: AsRef<str>>(
        &self,
        service_id: S,
        url: Option<&str>,
    ) -> Result<(), Error> {
        let request = self
            .session
            .delete(CDN, &["services", service_id.as_ref(), "assets"])
            .await?;
        let request = match url {
            Some(url) => request.query(&[("url", url)]),
            None => request.query(&[("all", "true")]),
        };
        let _ = request.send().await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use reqwest::StatusCode;

    use super::{verify_ping_status, CdnService, Flavor, ServiceStatus};

    #[test]
    fn test_verify_ping_status() {
        verify_ping_status(StatusCode::NO_CONTENT).unwrap();
        let err = verify_ping_status(StatusCode::OK).err().unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_flavor_deserialization() {
        let flavor: Flavor = serde_json::from_str(
            r#"{
                "id": "cdn",
                "providers": [
                    {
                        "provider": "akamai",
                        "links": [{"href": "https://provider.local", "rel": "provider_url"}]
                    }
                ],
                "links": [{"href": "https://cloud.local/v1.0/flavors/cdn", "rel": "self"}]
            }"#,
        )
        .unwrap();
        assert_eq!(flavor.providers[0].provider, "akamai");
    }

    #[test]
    fn test_service_deserialization() {
        let service: CdnService = serde_json::from_str(
            r#"{
                "id": "abcd",
                "name": "mywebsite",
                "domains": [{"domain": "www.mywebsite.com"}],
                "origins": [{"origin": "mywebsite.com", "port": 443, "ssl": true}],
                "caching": [{"name": "default", "ttl": 3600}],
                "flavor_id": "cdn",
                "status": "deployed"
            }"#,
        )
        .unwrap();
        assert_eq!(service.status, Some(ServiceStatus::Deployed));
        assert!(service.origins[0].ssl);
        assert_eq!(service.caching[0].ttl, 3600);
    }

    #[test]
    fn test_service_unknown_status() {
        let service: CdnService = serde_json::from_str(
            r#"{"id": "abcd", "name": "x", "status": "archived"}"#,
        )
        .unwrap();
        assert_eq!(service.status, Some(ServiceStatus::Other("archived".into())));
    }

    #[cfg(feature = "stream")]
    #[test]
    fn test_services_root_into_page() {
        use crate::client::PaginatedCollection;

        let root: super::ServicesRoot = serde_json::from_str(
            r#"{
                "services": [{"id": "abcd", "name": "x"}],
                "links": [
                    {"href": "https://cloud.local/v1.0/services?marker=abcd", "rel": "next"}
                ]
            }"#,
        )
        .unwrap();
        let page = root.into_page();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.next.unwrap().query(), Some("marker=abcd"));
    }
}
