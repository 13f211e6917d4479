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

//! API version implementation.

use std::fmt;
use std::str::FromStr;

use reqwest::header::HeaderValue;
use serde::de::{Error as DeserError, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Error, ErrorKind};

/// An API version as a pair of (major, minor).
///
/// OpenStack services use this format both for major versions (e.g. `v2.1`)
/// and for microversions (e.g. `2.42`).
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Eq, Ord, Hash)]
pub struct ApiVersion(pub u16, pub u16);

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.0, self.1)
    }
}

impl From<(u16, u16)> for ApiVersion {
    fn from(value: (u16, u16)) -> ApiVersion {
        ApiVersion(value.0, value.1)
    }
}

impl From<ApiVersion> for HeaderValue {
    fn from(value: ApiVersion) -> HeaderValue {
        // cannot fail: the string only contains digits and a dot
        value.to_string().parse().unwrap()
    }
}

fn parse_component(component: &str, value: &str) -> Result<u16, Error> {
    component.parse().map_err(|_| {
        Error::new(
            ErrorKind::InvalidResponse,
            format!("Version component is not a number in {}", value),
        )
    })
}

impl FromStr for ApiVersion {
    type Err = Error;

    fn from_str(s: &str) -> Result<ApiVersion, Error> {
        let stripped = s.strip_prefix('v').unwrap_or(s);
        let parts: Vec<&str> = stripped.split('.').collect();

        if parts.is_empty() || parts.len() > 2 {
            return Err(Error::new(
                ErrorKind::InvalidResponse,
                format!("Invalid API version: expected X.Y or X, got {}", s),
            ));
        }

        let major = parse_component(parts[0], s)?;
        let minor = if parts.len() == 2 {
            parse_component(parts[1], s)?
        } else {
            0
        };

        Ok(ApiVersion(major, minor))
    }
}

impl Serialize for ApiVersion {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

struct ApiVersionVisitor;

impl<'de> Visitor<'de> for ApiVersionVisitor {
    type Value = ApiVersion;

    fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
        formatter.write_str("a string in format X.Y or X")
    }

    fn visit_str<E>(self, value: &str) -> Result<ApiVersion, E>
    where
        E: DeserError,
    {
        ApiVersion::from_str(value).map_err(DeserError::custom)
    }
}

impl<'de> Deserialize<'de> for ApiVersion {
    fn deserialize<D>(deserializer: D) -> Result<ApiVersion, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_str(ApiVersionVisitor)
    }
}

#[cfg(test)]
pub mod test {
    use std::str::FromStr;

    use super::ApiVersion;

    #[test]
    fn test_display() {
        assert_eq!(ApiVersion(2, 27).to_string(), "2.27");
    }

    #[test]
    fn test_from_str() {
        assert_eq!(ApiVersion::from_str("2.27").unwrap(), ApiVersion(2, 27));
        assert_eq!(ApiVersion::from_str("v2.27").unwrap(), ApiVersion(2, 27));
        assert_eq!(ApiVersion::from_str("2").unwrap(), ApiVersion(2, 0));
        assert_eq!(ApiVersion::from_str("v3").unwrap(), ApiVersion(3, 0));
    }

    #[test]
    fn test_from_str_failure() {
        for s in &["foo", "2.bar", "bar.2", "1.2.3", ""] {
            assert!(ApiVersion::from_str(s).is_err());
        }
    }

    #[test]
    fn test_ordering() {
        assert!(ApiVersion(2, 1) < ApiVersion(2, 10));
        assert!(ApiVersion(2, 10) < ApiVersion(3, 0));
    }

    #[test]
    fn test_serde_round_trip() {
        let ser = serde_json::to_string(&ApiVersion(2, 42)).unwrap();
        assert_eq!(&ser, "\"2.42\"");
        let back: ApiVersion = serde_json::from_str(&ser).unwrap();
        assert_eq!(back, ApiVersion(2, 42));
    }

    #[test]
    fn test_deserialize_with_v() {
        let ver: ApiVersion = serde_json::from_str("\"v2.1\"").unwrap();
        assert_eq!(ver, ApiVersion(2, 1));
    }
}
