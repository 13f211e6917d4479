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

//! A client for the Identity service API.
//!
//! Not to be confused with the [identity](../identity/index.html) module,
//! which implements authentication against the same service.

#[cfg(feature = "stream")]
use futures::Stream;
use serde::{Deserialize, Serialize};

#[cfg(feature = "stream")]
use super::client::{Page, PaginatedCollection};
use super::common::{ExtraProperties, PageLinks};
use super::services::IDENTITY;
use super::session::Session;
use super::Error;

/// A service record from the Identity catalog.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Service {
    /// Unique ID.
    pub id: String,
    /// Service type (e.g. `network`).
    #[serde(rename = "type")]
    pub service_type: String,
    /// Human-readable name.
    #[serde(default)]
    pub name: Option<String>,
    /// Whether the service is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// A region known to the Identity service.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Region {
    /// Unique ID (also serves as the region name).
    pub id: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// ID of the parent region (if any).
    #[serde(default)]
    pub parent_region_id: Option<String>,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// A project (tenant).
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Project {
    /// Unique ID.
    pub id: String,
    /// Project name, unique within the domain.
    pub name: String,
    /// ID of the owning domain.
    #[serde(default)]
    pub domain_id: Option<String>,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Whether the project is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Deserialize)]
struct ServicesRoot {
    services: Vec<Service>,
    #[serde(default)]
    links: PageLinks,
}

#[derive(Debug, Deserialize)]
struct ServiceRoot {
    service: Service,
}

#[derive(Debug, Deserialize)]
struct RegionsRoot {
    regions: Vec<Region>,
    #[serde(default)]
    links: PageLinks,
}

#[derive(Debug, Deserialize)]
struct RegionRoot {
    region: Region,
}

#[derive(Debug, Deserialize)]
struct ProjectsRoot {
    projects: Vec<Project>,
    #[serde(default)]
    links: PageLinks,
}

#[cfg(feature = "stream")]
impl PaginatedCollection for ServicesRoot {
    type Item = Service;
    fn into_page(self) -> Page<Service> {
        Page {
            next: self.links.next,
            items: self.services,
        }
    }
}

#[cfg(feature = "stream")]
impl PaginatedCollection for RegionsRoot {
    type Item = Region;
    fn into_page(self) -> Page<Region> {
        Page {
            next: self.links.next,
            items: self.regions,
        }
    }
}

#[cfg(feature = "stream")]
impl PaginatedCollection for ProjectsRoot {
    type Item = Project;
    fn into_page(self) -> Page<Project> {
        Page {
            next: self.links.next,
            items: self.projects,
        }
    }
}

/// A client for the Identity service.
///
/// ```rust,no_run
/// # async fn example() -> Result<(), osclients::Error> {
/// use futures::pin_mut;
/// use futures::stream::TryStreamExt;
///
/// let session = osclients::Session::from_env().await?;
/// let identity = osclients::identityapi::IdentityApi::new(&session);
/// let services = identity.list_services().await?;
/// pin_mut!(services);
/// while let Some(svc) = services.try_next().await? {
///     println!("{} is a {} service", svc.id, svc.service_type);
/// }
/// # Ok(()) }
/// # #[tokio::main]
/// # async fn main() { example().await.unwrap(); }
/// ```
#[derive(Debug, Clone)]
pub struct IdentityApi {
    session: Session,
}

impl IdentityApi {
    /// Create a client from an existing session.
    pub fn new(session: &Session) -> IdentityApi {
        IdentityApi {
            session: session.clone(),
        }
    }

    /// List all services in the catalog.
    #[cfg(feature = "stream")]
    pub async fn list_services(
        &self,
    ) -> Result<impl Stream<Item = Result<Service, Error>>, Error> {
        Ok(self
            .session
            .get(IDENTITY, &["services"])
            .await?
            .fetch_paginated::<ServicesRoot>())
    }

    /// Get one service by its ID.
    pub async fn get_service<S: AsRef<str>>(&self, id: S) -> Result<Service, Error> {
        let root: ServiceRoot = self
            .session
            .get(IDENTITY, &["services", id.as_ref()])
            .await?
            .fetch_json()
            .await?;
        Ok(root.service)
    }

    /// List all regions.
    #[cfg(feature = "stream")]
    pub async fn list_regions(&self) -> Result<impl Stream<Item = Result<Region, Error>>, Error> {
        Ok(self
            .session
            .get(IDENTITY, &["regions"])
            .await?
            .fetch_paginated::<RegionsRoot>())
    }

    /// Get one region by its ID.
    pub async fn get_region<S: AsRef<str>>(&self, id: S) -> Result<Region, Error> {
        let root: RegionRoot = self
            .session
            .get(IDENTITY, &["regions", id.as_ref()])
            .await?
            .fetch_json()
            .await?;
        Ok(root.region)
    }

    /// List projects visible to the current user.
    #[cfg(feature = "stream")]
    pub async fn list_projects(&self) -> Result<impl Stream<Item = Result<Project, Error>>, Error> {
        Ok(self
            .session
            .get(IDENTITY, &["projects"])
            .await?
            .fetch_paginated::<ProjectsRoot>())
    }
}

#[cfg(test)]
mod test {
    use super::{ProjectsRoot, Region, Service, ServicesRoot};

    #[test]
    fn test_service_with_extras() {
        let svc: Service = serde_json::from_str(
            r#"{
                "id": "abcd",
                "type": "network",
                "name": "neutron",
                "links": {"self": "https://cloud.local/v3/services/abcd"}
            }"#,
        )
        .unwrap();
        assert_eq!(svc.service_type, "network");
        assert!(svc.enabled);
        assert!(svc.extra.contains_key("links"));
        // unknown keys survive re-serialization
        let value = serde_json::to_value(&svc).unwrap();
        assert!(value.get("links").is_some());
    }

    #[test]
    fn test_region_minimal() {
        let region: Region = serde_json::from_str(r#"{"id": "RegionOne"}"#).unwrap();
        assert_eq!(region.id, "RegionOne");
        assert!(region.description.is_none());
        assert!(region.parent_region_id.is_none());
    }

    #[cfg(feature = "stream")]
    #[test]
    fn test_services_root_into_page() {
        use crate::client::PaginatedCollection;

        let root: ServicesRoot = serde_json::from_str(
            r#"{
                "services": [{"id": "abcd", "type": "network"}],
                "links": {"next": "https://cloud.local/v3/services?page=2", "self": null}
            }"#,
        )
        .unwrap();
        let page = root.into_page();
        assert_eq!(page.items.len(), 1);
        assert_eq!(
            page.next.unwrap().as_str(),
            "https://cloud.local/v3/services?page=2"
        );
    }

    #[cfg(feature = "stream")]
    #[test]
    fn test_projects_root_last_page() {
        use crate::client::PaginatedCollection;

        let root: ProjectsRoot = serde_json::from_str(
            r#"{"projects": [{"id": "1234", "name": "demo"}], "links": {"next": null}}"#,
        )
        .unwrap();
        let page = root.into_page();
        assert_eq!(page.items[0].name, "demo");
        assert!(page.next.is_none());
    }

    #[test]
    fn test_services_root_without_links() {
        let root: ServicesRoot = serde_json::from_str(r#"{"services": []}"#).unwrap();
        assert!(root.services.is_empty());
        assert!(root.links.next.is_none());
    }
}
