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

//! Endpoint filters for looking up endpoints.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FromIterator;
use std::ops::Deref;
use std::str::FromStr;

use serde::{Deserialize, Deserializer};

use super::identity::protocol::Endpoint;
use super::{Error, ErrorKind};

/// Interface type: public, internal or admin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InterfaceType {
    /// Public interface (used by default).
    #[default]
    Public,
    /// Internal interface.
    Internal,
    /// Administrator interface.
    Admin,
}

impl fmt::Display for InterfaceType {
    fn fmt(&self, f: &mut fmt::Formatter) -> Result<(), fmt::Error> {
        f.write_str(match self {
            InterfaceType::Public => "public",
            InterfaceType::Internal => "internal",
            InterfaceType::Admin => "admin",
        })
    }
}

impl FromStr for InterfaceType {
    type Err = Error;

    fn from_str(value: &str) -> Result<InterfaceType, Error> {
        match value {
            "public" | "publicURL" => Ok(InterfaceType::Public),
            "internal" | "internalURL" => Ok(InterfaceType::Internal),
            "admin" | "adminURL" => Ok(InterfaceType::Admin),
            other => Err(Error::new(
                ErrorKind::InvalidInput,
                format!("Unknown interface type: {}", other),
            )),
        }
    }
}

impl<'de> Deserialize<'de> for InterfaceType {
    fn deserialize<D>(deserializer: D) -> Result<InterfaceType, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value: String = Deserialize::deserialize(deserializer)?;
        InterfaceType::from_str(&value).map_err(serde::de::Error::custom)
    }
}

/// A list of acceptable interface types in the priority order.
///
/// There are only three interface types, so this is a small fixed-size
/// collection that ignores duplicates on insertion.
#[derive(Clone, Copy, Eq)]
pub struct ValidInterfaces {
    items: [InterfaceType; 3],
    len: u8,
}

impl fmt::Debug for ValidInterfaces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ValidInterfaces ")?;
        f.debug_list().entries(&self[..]).finish()
    }
}

impl Default for ValidInterfaces {
    /// Defaults to only "public".
    fn default() -> ValidInterfaces {
        ValidInterfaces::one(InterfaceType::Public)
    }
}

impl Deref for ValidInterfaces {
    type Target = [InterfaceType];

    fn deref(&self) -> &Self::Target {
        &self.items[..self.len as usize]
    }
}

impl AsRef<[InterfaceType]> for ValidInterfaces {
    fn as_ref(&self) -> &[InterfaceType] {
        self
    }
}

impl PartialEq for ValidInterfaces {
    fn eq(&self, other: &ValidInterfaces) -> bool {
        self.len == other.len && self[..] == other[..]
    }
}

impl Hash for ValidInterfaces {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.len.hash(state);
        self[..].hash(state);
    }
}

impl From<InterfaceType> for ValidInterfaces {
    fn from(value: InterfaceType) -> ValidInterfaces {
        ValidInterfaces::one(value)
    }
}

impl FromIterator<InterfaceType> for ValidInterfaces {
    /// Create from an iterator of interface types.
    ///
    /// Any duplicates are ignored.
    fn from_iter<T: IntoIterator<Item = InterfaceType>>(iter: T) -> Self {
        let mut result = ValidInterfaces::empty();
        for item in iter {
            let _ = result.push(item);
        }
        result
    }
}

impl ValidInterfaces {
    /// One valid interface.
    #[inline]
    pub fn one(item: InterfaceType) -> ValidInterfaces {
        ValidInterfaces {
            items: [item; 3],
            len: 1,
        }
    }

    /// Add an item to the end.
    ///
    /// Returns `true` if the item was added, `false` on duplicate.
    #[inline]
    pub fn push(&mut self, item: InterfaceType) -> bool {
        if self.contains(&item) {
            false
        } else {
            self.items[self.len as usize] = item;
            self.len += 1;
            true
        }
    }

    /// Position of the interface in the priority list.
    #[inline]
    pub(crate) fn find(&self, interface: InterfaceType) -> Option<usize> {
        self.iter().position(|x| *x == interface)
    }

    #[inline]
    fn empty() -> ValidInterfaces {
        ValidInterfaces {
            items: [InterfaceType::Public; 3],
            len: 0,
        }
    }
}

/// Endpoint filters for looking up endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub struct EndpointFilters {
    /// Acceptable endpoint interfaces in the priority order.
    pub interfaces: ValidInterfaces,
    /// Cloud region.
    pub region: Option<String>,
}

impl EndpointFilters {
    /// Create filters with interfaces and region.
    ///
    /// Hint: use `Default` to create empty filters (and with_* methods to
    /// populate them).
    pub fn new<I, S>(interfaces: I, region: S) -> EndpointFilters
    where
        I: IntoIterator<Item = InterfaceType>,
        S: Into<String>,
    {
        EndpointFilters {
            interfaces: interfaces.into_iter().collect(),
            region: Some(region.into()),
        }
    }

    /// Check whether the given endpoint matches the filters.
    pub fn check(&self, endpoint: &Endpoint) -> bool {
        if self.interfaces.find(endpoint.interface).is_none() {
            return false;
        }

        match self.region {
            Some(ref region) => endpoint.region == *region,
            None => true,
        }
    }

    /// Set one or more valid interfaces.
    pub fn set_interfaces<T: Into<ValidInterfaces>>(&mut self, value: T) {
        self.interfaces = value.into();
    }

    /// Set a region.
    pub fn set_region<T: Into<String>>(&mut self, value: T) {
        self.region = Some(value.into());
    }

    /// Add one or more valid interfaces, returning self.
    pub fn with_interfaces<T: Into<ValidInterfaces>>(mut self, value: T) -> EndpointFilters {
        self.set_interfaces(value);
        self
    }

    /// Add a region, returning self.
    pub fn with_region<T: Into<String>>(mut self, value: T) -> EndpointFilters {
        self.set_region(value);
        self
    }

    /// Merge defaults for any unset fields.
    pub(crate) fn with_defaults(&self, defaults: &EndpointFilters) -> EndpointFilters {
        EndpointFilters {
            interfaces: if self.interfaces.is_empty() {
                defaults.interfaces
            } else {
                self.interfaces
            },
            region: self.region.clone().or_else(|| defaults.region.clone()),
        }
    }
}

#[cfg(test)]
pub mod test {
    use std::str::FromStr;

    use super::super::identity::protocol::Endpoint;
    use super::{EndpointFilters, InterfaceType, ValidInterfaces};

    fn endpoint(interface: InterfaceType, region: &str) -> Endpoint {
        Endpoint {
            interface,
            region: region.to_string(),
            url: "https://cloud.local/service".parse().unwrap(),
        }
    }

    #[test]
    fn test_interface_type_from_str() {
        assert_eq!(
            InterfaceType::from_str("public").unwrap(),
            InterfaceType::Public
        );
        assert_eq!(
            InterfaceType::from_str("internalURL").unwrap(),
            InterfaceType::Internal
        );
        assert!(InterfaceType::from_str("wat").is_err());
    }

    #[test]
    fn test_valid_interfaces_push() {
        let mut valid = ValidInterfaces::default();
        assert!(!valid.push(InterfaceType::Public));
        assert!(valid.push(InterfaceType::Internal));
        assert_eq!(&*valid, &[InterfaceType::Public, InterfaceType::Internal]);
        assert_eq!(valid.find(InterfaceType::Internal), Some(1));
        assert_eq!(valid.find(InterfaceType::Admin), None);
    }

    #[test]
    fn test_check_interface() {
        let filters = EndpointFilters::default();
        assert!(filters.check(&endpoint(InterfaceType::Public, "r1")));
        assert!(!filters.check(&endpoint(InterfaceType::Internal, "r1")));
    }

    #[test]
    fn test_check_region() {
        let filters = EndpointFilters::default().with_region("r2");
        assert!(filters.check(&endpoint(InterfaceType::Public, "r2")));
        assert!(!filters.check(&endpoint(InterfaceType::Public, "r1")));
    }

    #[test]
    fn test_with_defaults() {
        let defaults = EndpointFilters::new([InterfaceType::Internal], "r1");
        let merged = EndpointFilters::default().with_defaults(&defaults);
        // the default interface list is non-empty, so it wins over defaults
        assert_eq!(&*merged.interfaces, &[InterfaceType::Public]);
        assert_eq!(merged.region.unwrap(), "r1");
    }
}
