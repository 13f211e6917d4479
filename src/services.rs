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

//! OpenStack service types.

use http::header::{HeaderName, HeaderValue};

use super::ApiVersion;

/// Trait representing a service type.
pub trait ServiceType {
    /// Service type to look for in the catalog.
    fn catalog_type(&self) -> &'static str;

    /// Check whether this service type is compatible with the given major version.
    fn major_version_supported(&self, _version: ApiVersion) -> bool {
        true
    }

    /// Whether this service supports version discovery at all.
    fn version_discovery_supported(&self) -> bool {
        true
    }
}

/// Trait representing a service that supports API version pinning.
pub trait VersionedService: ServiceType {
    /// Get the header to set the API version on a request.
    fn get_version_header(&self, version: ApiVersion) -> (HeaderName, HeaderValue);
}

/// A major version selector.
#[derive(Copy, Clone, Debug)]
pub enum VersionSelector {
    /// Match the major component.
    Major(u16),
    /// Match any version.
    Any,
}

/// A generic service.
#[derive(Copy, Clone, Debug)]
pub struct GenericService {
    catalog_type: &'static str,
    major_version: VersionSelector,
}

impl GenericService {
    /// Create a new generic service.
    pub const fn new(catalog_type: &'static str, major_version: VersionSelector) -> GenericService {
        GenericService {
            catalog_type,
            major_version,
        }
    }
}

impl ServiceType for GenericService {
    fn catalog_type(&self) -> &'static str {
        self.catalog_type
    }

    fn major_version_supported(&self, version: ApiVersion) -> bool {
        match self.major_version {
            VersionSelector::Major(required) => version.0 == required,
            VersionSelector::Any => true,
        }
    }
}

impl VersionedService for GenericService {
    fn get_version_header(&self, version: ApiVersion) -> (HeaderName, HeaderValue) {
        // The standard microversion header shared by modern services.
        (
            HeaderName::from_static("openstack-api-version"),
            format!("{} {}", self.catalog_type, version)
                .parse()
                .expect("catalog types are valid in headers"),
        )
    }
}

/// The Object Storage service.
///
/// Unlike the other services, Swift exposes no version discovery document:
/// the catalog URL already points into an account.
#[derive(Copy, Clone, Debug)]
pub struct ObjectStorageService {
    __use_new: (),
}

impl ObjectStorageService {
    /// Create an Object Storage service type.
    pub const fn new() -> ObjectStorageService {
        ObjectStorageService { __use_new: () }
    }
}

impl Default for ObjectStorageService {
    fn default() -> ObjectStorageService {
        ObjectStorageService::new()
    }
}

impl ServiceType for ObjectStorageService {
    fn catalog_type(&self) -> &'static str {
        "object-store"
    }

    fn version_discovery_supported(&self) -> bool {
        false
    }
}

/// Identity service.
pub const IDENTITY: GenericService = GenericService::new("identity", VersionSelector::Major(3));

/// Networking service.
pub const NETWORK: GenericService = GenericService::new("network", VersionSelector::Major(2));

/// Content Delivery service.
pub const CDN: GenericService = GenericService::new("cdn", VersionSelector::Major(1));

/// Object Storage service.
pub const OBJECT_STORAGE: ObjectStorageService = ObjectStorageService::new();

#[cfg(test)]
mod test {
    use super::{ServiceType, VersionedService, CDN, NETWORK, OBJECT_STORAGE};
    use crate::ApiVersion;

    #[test]
    fn test_catalog_types() {
        assert_eq!(NETWORK.catalog_type(), "network");
        assert_eq!(OBJECT_STORAGE.catalog_type(), "object-store");
    }

    #[test]
    fn test_major_version_supported() {
        assert!(NETWORK.major_version_supported(ApiVersion(2, 0)));
        assert!(!NETWORK.major_version_supported(ApiVersion(1, 0)));
        assert!(CDN.major_version_supported(ApiVersion(1, 0)));
    }

    #[test]
    fn test_version_discovery() {
        assert!(NETWORK.version_discovery_supported());
        assert!(!OBJECT_STORAGE.version_discovery_supported());
    }

    #[test]
    fn test_version_header() {
        let (name, value) = NETWORK.get_version_header(ApiVersion(2, 42));
        assert_eq!(name.as_str(), "openstack-api-version");
        assert_eq!(value.to_str().unwrap(), "network 2.42");
    }
}
