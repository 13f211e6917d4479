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

//! Reusable JSON structures shared between services.

use std::collections::HashMap;

use reqwest::Url;
use serde::de::{DeserializeOwned, Error as DeserError};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// A link to a resource.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub struct Link {
    /// Resource URL.
    pub href: Url,
    /// Relationship between the referencing and the referenced object.
    pub rel: String,
}

/// A reference to an ID and name.
///
/// Often returned by listing APIs when invoked without requesting details.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct IdAndName {
    /// Resource ID.
    pub id: String,
    /// Resource name.
    pub name: String,
}

/// A reference to a resource by either its ID or name.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum IdOrName {
    /// Resource ID.
    #[serde(rename = "id")]
    Id(String),
    /// Resource name.
    #[serde(rename = "name")]
    Name(String),
}

impl IdOrName {
    /// Create an ID reference.
    #[inline]
    pub fn from_id<S: Into<String>>(id: S) -> IdOrName {
        IdOrName::Id(id.into())
    }

    /// Create a name reference.
    #[inline]
    pub fn from_name<S: Into<String>>(name: S) -> IdOrName {
        IdOrName::Name(name.into())
    }
}

/// Additional properties of a resource that are not covered by typed fields.
///
/// Use with `#[serde(flatten)]` to keep unknown keys returned by vendor
/// extensions instead of silently dropping them:
///
/// ```rust
/// use osclients::common::ExtraProperties;
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Deserialize, Serialize)]
/// pub struct Widget {
///     pub id: String,
///     #[serde(flatten)]
///     pub extra: ExtraProperties,
/// }
/// ```
pub type ExtraProperties = HashMap<String, Value>;

/// Pagination links in the object form used by the Identity service.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct PageLinks {
    /// URL of the next page (if any).
    #[serde(default)]
    pub next: Option<Url>,
    /// URL of the previous page (if any).
    #[serde(default)]
    pub previous: Option<Url>,
    /// URL of this page.
    #[serde(default, rename = "self")]
    pub current: Option<Url>,
}

/// Extract the URL of the next page from a `links` array.
///
/// Networking and Content Delivery services represent pagination as a list
/// of links with `rel` set to `next`.
pub fn next_from_links(links: &[Link]) -> Option<Url> {
    links
        .iter()
        .find(|link| link.rel == "next")
        .map(|link| link.href.clone())
}

/// Deserialize a value where an empty string stands for the default.
///
/// Some discovery documents return `""` instead of omitting a field.
pub fn empty_as_default<'de, D, T>(des: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(des)?;
    match value {
        Value::String(ref s) if s.is_empty() => Ok(T::default()),
        _ => serde_json::from_value(value).map_err(D::Error::custom),
    }
}

#[cfg(test)]
pub(crate) mod test {
    use serde::{Deserialize, Serialize};

    use super::{empty_as_default, next_from_links, IdOrName, Link, PageLinks};

    pub fn compare<T: Serialize>(sample: &str, value: T) {
        let converted: serde_json::Value = serde_json::from_str(sample).unwrap();
        let result = serde_json::to_value(value).unwrap();
        assert_eq!(result, converted);
    }

    #[test]
    fn test_id_or_name_serialization() {
        compare(r#"{"id": "42"}"#, IdOrName::from_id("42"));
        compare(r#"{"name": "main"}"#, IdOrName::from_name("main"));
    }

    #[test]
    fn test_next_from_links() {
        let links: Vec<Link> = serde_json::from_str(
            r#"[
                {"href": "https://cloud.local/v2.0/networks?marker=abcd", "rel": "next"},
                {"href": "https://cloud.local/v2.0/networks", "rel": "self"}
            ]"#,
        )
        .unwrap();
        let next = next_from_links(&links).unwrap();
        assert_eq!(next.query(), Some("marker=abcd"));
    }

    #[test]
    fn test_next_from_links_absent() {
        let links: Vec<Link> = serde_json::from_str(
            r#"[{"href": "https://cloud.local/v2.0/networks", "rel": "self"}]"#,
        )
        .unwrap();
        assert!(next_from_links(&links).is_none());
    }

    #[test]
    fn test_page_links_with_nulls() {
        let links: PageLinks = serde_json::from_str(
            r#"{"next": null, "previous": null, "self": "https://cloud.local/v3/projects"}"#,
        )
        .unwrap();
        assert!(links.next.is_none());
        assert!(links.current.is_some());
    }

    #[derive(Debug, Deserialize)]
    struct EmptyAsDefault {
        #[serde(deserialize_with = "empty_as_default")]
        number: u8,
        #[serde(deserialize_with = "empty_as_default")]
        string: Option<String>,
    }

    #[test]
    fn test_empty_as_default() {
        let r: EmptyAsDefault =
            serde_json::from_str(r#"{"number": 42, "string": "value"}"#).unwrap();
        assert_eq!(r.number, 42);
        assert_eq!(r.string.unwrap(), "value");

        let r: EmptyAsDefault = serde_json::from_str(r#"{"number": "", "string": ""}"#).unwrap();
        assert_eq!(r.number, 0);
        assert!(r.string.is_none());
    }
}
