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

//! Session structure definition.

use std::sync::Arc;

use log::trace;
use reqwest::{Client, Method, Url};

use super::cache::EndpointCache;
use super::client::{AuthenticatedClient, RequestBuilder};
use super::config;
use super::services::ServiceType;
use super::url;
use super::{ApiVersion, AuthType, EndpointFilters, Error};

/// An OpenStack API session.
///
/// The session object serves as a wrapper around an HTTP(s) client, handling
/// authentication, accessing the service catalog and token refresh.
///
/// The session object also owns the endpoint interface and region to use.
///
/// # Note
///
/// All clones of one session share the same authentication and endpoint
/// cache. Use [with_auth_type](#method.with_auth_type) to detach a session.
#[derive(Debug, Clone)]
pub struct Session {
    client: AuthenticatedClient,
    cache: Arc<EndpointCache>,
}

impl From<AuthenticatedClient> for Session {
    fn from(value: AuthenticatedClient) -> Session {
        Session {
            client: value,
            cache: Arc::new(EndpointCache::new()),
        }
    }
}

impl Session {
    /// Create a new session with a given authentication plugin.
    ///
    /// The resulting session will use the default endpoint interface
    /// (usually, public).
    pub fn new<Auth: AuthType + 'static>(auth_type: Auth) -> Session {
        Session::new_with_client(Client::new(), auth_type)
    }

    /// Create a new session with a given authentication plugin and an HTTP client.
    pub fn new_with_client<Auth: AuthType + 'static>(client: Client, auth_type: Auth) -> Session {
        Session {
            client: AuthenticatedClient::new_internal(client, Arc::new(auth_type)),
            cache: Arc::new(EndpointCache::new()),
        }
    }

    /// Create a session from environment variables.
    ///
    /// Uses the standard `OS_*` variables. Supports both authenticating
    /// against a Keystone and using `OS_AUTH_TYPE=none` with a fixed
    /// endpoint. The credentials are verified immediately.
    pub async fn from_env() -> Result<Session, Error> {
        let mut session = config::from_env()?;
        session.refresh().await?;
        Ok(session)
    }

    /// Create a session from the `clouds.yaml` configuration file.
    ///
    /// The credentials are verified immediately.
    pub async fn from_config<S: AsRef<str>>(cloud_name: S) -> Result<Session, Error> {
        let mut session = config::from_config(cloud_name.as_ref())?;
        session.refresh().await?;
        Ok(session)
    }

    /// Get a reference to the authentication type in use.
    #[inline]
    pub fn auth_type(&self) -> &dyn AuthType {
        self.client.auth_type()
    }

    /// Get a reference to the authenticated client in use.
    #[inline]
    pub fn client(&self) -> &AuthenticatedClient {
        &self.client
    }

    /// Endpoint filters for the service catalog.
    #[inline]
    pub fn endpoint_filters(&self) -> &EndpointFilters {
        &self.cache.filters
    }

    /// Modify endpoint filters.
    ///
    /// This call clears the cached service information for this `Session`.
    /// It does not, however, affect clones of this `Session`.
    #[inline]
    pub fn endpoint_filters_mut(&mut self) -> &mut EndpointFilters {
        let cache = Arc::make_mut(&mut self.cache);
        &mut cache.clear().filters
    }

    /// Update the authentication and purges cached endpoint information.
    ///
    /// # Warning
    ///
    /// Authentication will also be updated for clones of this `Session`,
    /// since they share the same authentication object.
    #[inline]
    pub async fn refresh(&mut self) -> Result<(), Error> {
        self.reset_cache();
        self.client.refresh().await
    }

    #[inline]
    fn reset_cache(&mut self) {
        let _ = Arc::make_mut(&mut self.cache).clear();
    }

    /// Set a new authentication for this `Session`.
    ///
    /// This call clears the cached service information for this `Session`.
    /// It does not, however, affect clones of this `Session`.
    #[inline]
    pub fn set_auth_type<Auth: AuthType + 'static>(&mut self, auth_type: Auth) {
        self.reset_cache();
        self.client.set_auth_type(auth_type);
    }

    /// Set a new endpoint override for the given service.
    ///
    /// This call clears the cached service information for this `Session`.
    /// It does not, however, affect clones of this `Session`.
    pub fn set_endpoint_override<S: Into<String>>(&mut self, service_type: S, url: Url) {
        let cache = Arc::make_mut(&mut self.cache);
        let _ = cache.clear().overrides.insert(service_type.into(), url);
    }

    /// Convert this session into one using the given authentication.
    #[inline]
    pub fn with_auth_type<Auth: AuthType + 'static>(mut self, auth_type: Auth) -> Session {
        self.set_auth_type(auth_type);
        self
    }

    /// Convert this session into one using the given endpoint filters.
    #[inline]
    pub fn with_endpoint_filters(mut self, filters: EndpointFilters) -> Session {
        *self.endpoint_filters_mut() = filters;
        self
    }

    /// Get minimum/maximum API (micro)version information.
    ///
    /// Returns `None` if the range cannot be determined, which usually means
    /// that microversioning is not supported.
    ///
    /// ```rust,no_run
    /// # async fn example() -> Result<(), osclients::Error> {
    /// let session = osclients::Session::from_env().await?;
    /// let maybe_versions = session
    ///     .get_api_versions(osclients::services::NETWORK)
    ///     .await?;
    /// if let Some((min, max)) = maybe_versions {
    ///     println!("The network service supports versions {} to {}", min, max);
    /// } else {
    ///     println!("The network service does not support microversioning");
    /// }
    /// # Ok(()) }
    /// # #[tokio::main]
    /// # async fn main() { example().await.unwrap(); }
    /// ```
    pub async fn get_api_versions<Srv: ServiceType + Send>(
        &self,
        service: Srv,
    ) -> Result<Option<(ApiVersion, ApiVersion)>, Error> {
        let min_max = self
            .cache
            .with_service_info(&self.client, service, |info| {
                (info.minimum_version, info.current_version)
            })
            .await?;
        Ok(match min_max {
            (Some(min), Some(max)) => Some((min, max)),
            _ => None,
        })
    }

    /// Construct an endpoint from the path for the given service.
    ///
    /// You won't need to use this call most of the time, since all request
    /// calls can fetch the endpoint automatically.
    pub async fn get_endpoint<Srv, I>(&self, service: Srv, path: I) -> Result<Url, Error>
    where
        Srv: ServiceType + Send,
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: Send,
    {
        let endpoint = self
            .cache
            .with_service_info(&self.client, service, |info| info.root_url.clone())
            .await?;
        Ok(url::extend(endpoint, path))
    }

    /// Get the currently used major version from the given service.
    ///
    /// Can return `None` if the service does not support version discovery.
    pub async fn get_major_version<Srv: ServiceType + Send>(
        &self,
        service: Srv,
    ) -> Result<Option<ApiVersion>, Error> {
        self.cache
            .with_service_info(&self.client, service, |info| info.major_version)
            .await
    }

    /// Pick the highest API version supported by the service.
    ///
    /// Returns `None` if none of the requested versions are available.
    ///
    /// ```rust,no_run
    /// # async fn example() -> Result<(), osclients::Error> {
    /// let session = osclients::Session::from_env().await?;
    /// let candidates = vec![osclients::ApiVersion(2, 2), osclients::ApiVersion(2, 42)];
    /// let maybe_version = session
    ///     .pick_api_version(osclients::services::NETWORK, candidates)
    ///     .await?;
    /// let mut request = session
    ///     .get(osclients::services::NETWORK, &["v2.0", "networks"])
    ///     .await?;
    /// if let Some(version) = maybe_version {
    ///     println!("Using version {}", version);
    ///     request.set_api_version(version);
    /// } else {
    ///     println!("Using the base version");
    /// }
    /// let response = request.send().await?;
    /// # Ok(()) }
    /// # #[tokio::main]
    /// # async fn main() { example().await.unwrap(); }
    /// ```
    pub async fn pick_api_version<Srv, I>(
        &self,
        service: Srv,
        versions: I,
    ) -> Result<Option<ApiVersion>, Error>
    where
        Srv: ServiceType + Send,
        I: IntoIterator<Item = ApiVersion>,
        I::IntoIter: Send,
    {
        let vers = versions.into_iter();
        if vers.size_hint().1 == Some(0) {
            return Ok(None);
        }
        self.cache
            .with_service_info(&self.client, service, |info| {
                vers.filter(|item| info.supports_api_version(*item)).max()
            })
            .await
    }

    /// Check if the service supports the API version.
    pub async fn supports_api_version<Srv: ServiceType + Send>(
        &self,
        service: Srv,
        version: ApiVersion,
    ) -> Result<bool, Error> {
        self.cache
            .with_service_info(&self.client, service, |info| {
                info.supports_api_version(version)
            })
            .await
    }

    /// Start an HTTP request to the given service.
    ///
    /// The `service` argument is an object implementing the
    /// [ServiceType](services/trait.ServiceType.html) trait. Some known
    /// service types are available in the [services](services/index.html)
    /// module.
    ///
    /// The `path` argument is a URL path without the service endpoint
    /// (e.g. `&["servers", "1234"]`).
    ///
    /// The result is a [RequestBuilder](client/struct.RequestBuilder.html)
    /// that can be customized further.
    ///
    /// ```rust,no_run
    /// # async fn example() -> Result<(), osclients::Error> {
    /// use reqwest::Method;
    ///
    /// let session = osclients::Session::from_env().await?;
    /// let response = session
    ///     .request(osclients::services::NETWORK, Method::HEAD, &["v2.0", "networks"])
    ///     .await?
    ///     .send()
    ///     .await?;
    /// println!("Response: {:?}", response);
    /// # Ok(()) }
    /// # #[tokio::main]
    /// # async fn main() { example().await.unwrap(); }
    /// ```
    ///
    /// This is the most generic call. You may prefer to use the more specific
    /// `get`, `post`, `put` or `delete` calls instead.
    pub async fn request<Srv, I>(
        &self,
        service: Srv,
        method: Method,
        path: I,
    ) -> Result<RequestBuilder<Srv>, Error>
    where
        Srv: ServiceType + Send + Clone,
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: Send,
    {
        let url = self.get_endpoint(service.clone(), path).await?;
        trace!(
            "Sending HTTP {} request to {} for {}",
            method,
            url,
            service.catalog_type()
        );
        Ok(self.client.request_service(service, method, url))
    }

    /// Start a GET request.
    ///
    /// See [request](#method.request) for an explanation of the parameters.
    #[inline]
    pub async fn get<Srv, I>(&self, service: Srv, path: I) -> Result<RequestBuilder<Srv>, Error>
    where
        Srv: ServiceType + Send + Clone,
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: Send,
    {
        self.request(service, Method::GET, path).await
    }

    /// Start a POST request.
    ///
    /// See [request](#method.request) for an explanation of the parameters.
    #[inline]
    pub async fn post<Srv, I>(&self, service: Srv, path: I) -> Result<RequestBuilder<Srv>, Error>
    where
        Srv: ServiceType + Send + Clone,
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: Send,
    {
        self.request(service, Method::POST, path).await
    }

    /// Start a PUT request.
    ///
    /// See [request](#method.request) for an explanation of the parameters.
    #[inline]
    pub async fn put<Srv, I>(&self, service: Srv, path: I) -> Result<RequestBuilder<Srv>, Error>
    where
        Srv: ServiceType + Send + Clone,
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: Send,
    {
        self.request(service, Method::PUT, path).await
    }

    /// Start a HEAD request.
    ///
    /// See [request](#method.request) for an explanation of the parameters.
    #[inline]
    pub async fn head<Srv, I>(&self, service: Srv, path: I) -> Result<RequestBuilder<Srv>, Error>
    where
        Srv: ServiceType + Send + Clone,
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: Send,
    {
        self.request(service, Method::HEAD, path).await
    }

    /// Start a DELETE request.
    ///
    /// See [request](#method.request) for an explanation of the parameters.
    #[inline]
    pub async fn delete<Srv, I>(&self, service: Srv, path: I) -> Result<RequestBuilder<Srv>, Error>
    where
        Srv: ServiceType + Send + Clone,
        I: IntoIterator,
        I::Item: AsRef<str>,
        I::IntoIter: Send,
    {
        self.request(service, Method::DELETE, path).await
    }
}

#[cfg(test)]
pub(crate) mod test {
    use std::sync::Arc;

    use reqwest::Url;

    use super::super::cache::EndpointCache;
    use super::super::client::AuthenticatedClient;
    use super::super::protocol::ServiceInfo;
    use super::super::services::{GenericService, VersionSelector};
    use super::super::ApiVersion;
    use super::Session;

    pub const URL: &str = "http://127.0.0.1:5000/";

    pub const URL_WITH_SUFFIX: &str = "http://127.0.0.1:5000/v2/servers";

    pub async fn new_simple_session(url: &str) -> Session {
        let service_info = ServiceInfo {
            root_url: Url::parse(url).unwrap(),
            major_version: None,
            minimum_version: None,
            current_version: None,
        };
        new_session(url, service_info).await
    }

    pub async fn new_session(url: &str, service_info: ServiceInfo) -> Session {
        Session {
            client: AuthenticatedClient::new_noauth(url).await,
            cache: Arc::new(EndpointCache::new_with("fake", service_info)),
        }
    }

    const FAKE: GenericService = GenericService::new("fake", VersionSelector::Any);

    #[tokio::test]
    async fn test_get_endpoint() {
        let s = new_simple_session(URL).await;
        let ep = s.get_endpoint(FAKE, &[""]).await.unwrap();
        assert_eq!(&ep.to_string(), URL);
    }

    #[tokio::test]
    async fn test_get_endpoint_slice() {
        let s = new_simple_session(URL).await;
        let ep = s.get_endpoint(FAKE, &["v2", "servers"]).await.unwrap();
        assert_eq!(&ep.to_string(), URL_WITH_SUFFIX);
    }

    #[tokio::test]
    async fn test_get_endpoint_vec() {
        let s = new_simple_session(URL).await;
        let ep = s
            .get_endpoint(FAKE, vec!["v2".to_string(), "servers".to_string()])
            .await
            .unwrap();
        assert_eq!(&ep.to_string(), URL_WITH_SUFFIX);
    }

    #[tokio::test]
    async fn test_get_major_version_absent() {
        let s = new_simple_session(URL).await;
        let res = s.get_major_version(FAKE).await.unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn test_get_major_version_present() {
        let service_info = ServiceInfo {
            root_url: Url::parse(URL).unwrap(),
            major_version: Some(ApiVersion(2, 0)),
            minimum_version: None,
            current_version: None,
        };
        let s = new_session(URL, service_info).await;
        let res = s.get_major_version(FAKE).await.unwrap();
        assert_eq!(res, Some(ApiVersion(2, 0)));
    }

    fn fake_service_info() -> ServiceInfo {
        ServiceInfo {
            root_url: Url::parse(URL).unwrap(),
            major_version: Some(ApiVersion(2, 0)),
            minimum_version: Some(ApiVersion(2, 1)),
            current_version: Some(ApiVersion(2, 42)),
        }
    }

    #[tokio::test]
    async fn test_pick_api_version_empty() {
        let s = new_session(URL, fake_service_info()).await;
        let res = s.pick_api_version(FAKE, None).await.unwrap();
        assert!(res.is_none());
        let res = s.pick_api_version(FAKE, Vec::new()).await.unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn test_pick_api_version() {
        let s = new_session(URL, fake_service_info()).await;
        let choice = vec![
            ApiVersion(2, 0),
            ApiVersion(2, 2),
            ApiVersion(2, 4),
            ApiVersion(2, 99),
        ];
        let res = s.pick_api_version(FAKE, choice).await.unwrap();
        assert_eq!(res, Some(ApiVersion(2, 4)));
    }

    #[tokio::test]
    async fn test_pick_api_version_option() {
        let s = new_session(URL, fake_service_info()).await;
        let res = s
            .pick_api_version(FAKE, Some(ApiVersion(2, 4)))
            .await
            .unwrap();
        assert_eq!(res, Some(ApiVersion(2, 4)));
    }

    #[tokio::test]
    async fn test_pick_api_version_impossible() {
        let s = new_session(URL, fake_service_info()).await;
        let choice = vec![ApiVersion(2, 0), ApiVersion(2, 99)];
        let res = s.pick_api_version(FAKE, choice).await.unwrap();
        assert!(res.is_none());
    }

    #[tokio::test]
    async fn test_supports_api_version() {
        let s = new_session(URL, fake_service_info()).await;
        assert!(s.supports_api_version(FAKE, ApiVersion(2, 4)).await.unwrap());
        assert!(!s.supports_api_version(FAKE, ApiVersion(2, 99)).await.unwrap());
    }

    #[tokio::test]
    async fn test_get_api_versions() {
        let s = new_session(URL, fake_service_info()).await;
        let (min, max) = s.get_api_versions(FAKE).await.unwrap().unwrap();
        assert_eq!(min, ApiVersion(2, 1));
        assert_eq!(max, ApiVersion(2, 42));
    }
}
