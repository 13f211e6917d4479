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

//! Per-service cache of discovered version information.

use std::collections::HashMap;

use log::debug;
use reqwest::Url;
use tokio::sync::RwLock;

use crate::client::AuthenticatedClient;
use crate::protocol::ServiceInfo;
use crate::services::ServiceType;
use crate::{EndpointFilters, Error, ErrorKind};

/// A lazily populated map from catalog types to their [ServiceInfo].
///
/// Population happens at most once per service; the filters and overrides
/// decide which endpoint the discovery runs against.
#[derive(Debug)]
pub struct EndpointCache {
    info: RwLock<HashMap<&'static str, ServiceInfo>>,
    pub filters: EndpointFilters,
    pub overrides: HashMap<String, Url>,
}

impl Clone for EndpointCache {
    /// Clone the filters and overrides, starting over with discovery.
    fn clone(&self) -> EndpointCache {
        EndpointCache {
            info: RwLock::new(HashMap::new()),
            filters: self.filters.clone(),
            overrides: self.overrides.clone(),
        }
    }
}

impl EndpointCache {
    /// Create a new empty cache.
    #[inline]
    pub fn new() -> Self {
        EndpointCache {
            info: RwLock::new(HashMap::new()),
            filters: EndpointFilters::default(),
            overrides: HashMap::new(),
        }
    }

    #[cfg(test)]
    pub fn new_with(service_type: &'static str, service_info: ServiceInfo) -> Self {
        let mut cache = EndpointCache::new();
        let _ = cache.info.get_mut().insert(service_type, service_info);
        cache
    }

    /// Forget everything discovered so far.
    #[inline]
    pub fn clear(&mut self) -> &mut Self {
        self.info = RwLock::new(HashMap::new());
        self
    }

    /// Pick the endpoint to run discovery against.
    async fn discovery_endpoint(
        &self,
        client: &AuthenticatedClient,
        catalog_type: &str,
    ) -> Result<Url, Error> {
        let endpoint = match self.overrides.get(catalog_type) {
            Some(chosen) => chosen.clone(),
            None => client.get_endpoint(catalog_type, &self.filters).await?,
        };
        if endpoint.cannot_be_a_base() || !endpoint.has_host() {
            return Err(Error::new(
                ErrorKind::InvalidResponse,
                format!(
                    "Invalid URL {} received for service {}",
                    endpoint, catalog_type
                ),
            ));
        }
        Ok(endpoint)
    }

    /// Apply `filter` to the service information, discovering it first if needed.
    pub async fn with_service_info<Srv, F, T>(
        &self,
        client: &AuthenticatedClient,
        service: Srv,
        filter: F,
    ) -> Result<T, Error>
    where
        Srv: ServiceType + Send,
        F: FnOnce(&ServiceInfo) -> T + Send,
        T: Send,
    {
        let catalog_type = service.catalog_type();
        if let Some(info) = self.info.read().await.get(catalog_type) {
            return Ok(filter(info));
        }

        debug!("Running version discovery for service {}", catalog_type);

        let mut lock = self.info.write().await;
        // The entry may have appeared while we were waiting for the write
        // lock.
        if let Some(info) = lock.get(catalog_type) {
            return Ok(filter(info));
        }

        let endpoint = self.discovery_endpoint(client, catalog_type).await?;
        let info = ServiceInfo::fetch(service, endpoint, client).await?;
        let value = filter(&info);
        let _ = lock.insert(catalog_type, info);
        Ok(value)
    }
}

#[cfg(test)]
mod test {
    use reqwest::Url;

    use crate::client::AuthenticatedClient;
    use crate::protocol::ServiceInfo;
    use crate::services::{IDENTITY, NETWORK};
    use crate::ErrorKind;

    use super::EndpointCache;

    #[tokio::test]
    async fn test_cached_info_wins() {
        let client = AuthenticatedClient::new_noauth("http://localhost").await;
        let sinfo = ServiceInfo {
            root_url: Url::parse("http://network.local").unwrap(),
            major_version: None,
            current_version: None,
            minimum_version: None,
        };
        let cache = EndpointCache::new_with("network", sinfo);
        let url = cache
            .with_service_info(&client, NETWORK, |s| s.root_url.clone())
            .await
            .unwrap();
        assert_eq!(url.as_str(), "http://network.local/");
    }

    #[tokio::test]
    async fn test_invalid_url() {
        let client = AuthenticatedClient::new_noauth("unix:/run/foo.socket").await;
        let cache = EndpointCache::new();
        let err = cache
            .with_service_info(&client, NETWORK, |s| s.clone())
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[tokio::test]
    async fn test_invalid_override() {
        let client = AuthenticatedClient::new_noauth("http://localhost").await;
        let mut cache = EndpointCache::new();
        let _ = cache.overrides.insert(
            "identity".into(),
            Url::parse("mailto:root@cloud.local").unwrap(),
        );
        let err = cache
            .with_service_info(&client, IDENTITY, |s| s.clone())
            .await
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidResponse);
    }

    #[test]
    fn test_clone_keeps_overrides() {
        let mut cache = EndpointCache::new();
        let _ = cache.overrides.insert(
            "identity".into(),
            Url::parse("http://localhost/identity").unwrap(),
        );
        let copy = cache.clone();
        assert!(copy.overrides.contains_key("identity"));
    }
}
