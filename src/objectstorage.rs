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

//! A client for the Object Storage service API.

use std::collections::HashMap;

use bytes::Bytes;
use chrono::NaiveDateTime;
#[cfg(feature = "stream")]
use futures::{Stream, TryStreamExt};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Body;
use serde::{Deserialize, Serialize};

use super::client::NO_PATH;
use super::services::OBJECT_STORAGE;
use super::session::Session;
use super::Error;
#[cfg(feature = "stream")]
use super::stream::paginated_by_marker;

const META_CONTAINER_PREFIX: &str = "x-container-meta-";
const META_OBJECT_PREFIX: &str = "x-object-meta-";
const COPY_FROM: &str = "x-copy-from";

/// A container in the account.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Container {
    /// Container name.
    pub name: String,
    /// Number of objects in the container.
    #[serde(default)]
    pub count: u64,
    /// Total size of the objects in bytes.
    #[serde(default)]
    pub bytes: u64,
}

/// An object in a container.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Object {
    /// Object name.
    pub name: String,
    /// Size in bytes.
    #[serde(default)]
    pub bytes: u64,
    /// MD5 checksum of the content.
    #[serde(default)]
    pub hash: Option<String>,
    /// MIME type of the content.
    #[serde(default)]
    pub content_type: Option<String>,
    /// When the object was last changed.
    ///
    /// The service reports wall-clock time without a timezone.
    #[serde(default)]
    pub last_modified: Option<NaiveDateTime>,
}

/// Metadata of a container, extracted from response headers.
#[derive(Clone, Debug, Default)]
pub struct ContainerMetadata {
    /// Number of objects in the container.
    pub object_count: Option<u64>,
    /// Total size of the objects in bytes.
    pub bytes_used: Option<u64>,
    /// Custom metadata (`X-Container-Meta-*` with the prefix stripped).
    pub metadata: HashMap<String, String>,
}

/// Metadata of an object, extracted from response headers.
#[derive(Clone, Debug, Default)]
pub struct ObjectMetadata {
    /// Size in bytes.
    pub content_length: Option<u64>,
    /// MIME type of the content.
    pub content_type: Option<String>,
    /// MD5 checksum of the content.
    pub etag: Option<String>,
    /// Custom metadata (`X-Object-Meta-*` with the prefix stripped).
    pub metadata: HashMap<String, String>,
}

/// Query filters for container and object listings.
#[derive(Clone, Debug, Default, Serialize)]
pub struct ListQuery {
    /// Only items starting with the prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prefix: Option<String>,
    /// Roll up items under the delimiter character.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delimiter: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

fn meta_from_headers(headers: &HeaderMap, prefix: &str) -> HashMap<String, String> {
    headers
        .iter()
        .filter_map(|(name, value)| {
            let key = name.as_str().strip_prefix(prefix)?;
            let value = value.to_str().ok()?;
            Some((key.to_string(), value.to_string()))
        })
        .collect()
}

fn header_as_u64(headers: &HeaderMap, name: &str) -> Option<u64> {
    headers.get(name)?.to_str().ok()?.parse().ok()
}

fn header_as_string(headers: &HeaderMap, name: &str) -> Option<String> {
    Some(headers.get(name)?.to_str().ok()?.to_string())
}

impl ContainerMetadata {
    fn from_headers(headers: &HeaderMap) -> ContainerMetadata {
        ContainerMetadata {
            object_count: header_as_u64(headers, "x-container-object-count"),
            bytes_used: header_as_u64(headers, "x-container-bytes-used"),
            metadata: meta_from_headers(headers, META_CONTAINER_PREFIX),
        }
    }
}

impl ObjectMetadata {
    fn from_headers(headers: &HeaderMap) -> ObjectMetadata {
        ObjectMetadata {
            content_length: header_as_u64(headers, "content-length"),
            content_type: header_as_string(headers, "content-type"),
            etag: header_as_string(headers, "etag"),
            metadata: meta_from_headers(headers, META_OBJECT_PREFIX),
        }
    }
}

fn meta_headers(prefix: &str, metadata: &HashMap<String, String>) -> Result<HeaderMap, Error> {
    let mut result = HeaderMap::with_capacity(metadata.len());
    for (key, value) in metadata {
        let name =
            HeaderName::try_from(format!("{}{}", prefix, key)).map_err(http::Error::from)?;
        let value = HeaderValue::try_from(value.as_str()).map_err(http::Error::from)?;
        let _ = result.insert(name, value);
    }
    Ok(result)
}

/// A client for the Object Storage service.
///
/// ```rust,no_run
/// # async fn example() -> Result<(), osclients::Error> {
/// use futures::pin_mut;
/// use futures::stream::TryStreamExt;
/// use osclients::objectstorage::{ListQuery, ObjectStorageApi};
///
/// let session = osclients::Session::from_env().await?;
/// let store = ObjectStorageApi::new(&session);
/// let containers = store.list_containers(&ListQuery::default()).await?;
/// pin_mut!(containers);
/// while let Some(container) = containers.try_next().await? {
///     println!("{} has {} object(s)", container.name, container.count);
/// }
/// # Ok(()) }
/// # #[tokio::main]
/// # async fn main() { example().await.unwrap(); }
/// ```
#[derive(Debug, Clone)]
pub struct ObjectStorageApi {
    session: Session,
}

impl ObjectStorageApi {
    /// Create a client from an existing session.
    pub fn new(session: &Session) -> ObjectStorageApi {
        ObjectStorageApi {
            session: session.clone(),
        }
    }

    /// List containers in the account.
    ///
    /// Large accounts are paginated with a `marker` derived from the last
    /// container name of the previous page.
    #[cfg(feature = "stream")]
    pub async fn list_containers(
        &self,
        query: &ListQuery,
    ) -> Result<impl Stream<Item = Result<Container, Error>>, Error> {
        let builder = self
            .session
            .get(OBJECT_STORAGE, NO_PATH)
            .await?
            .query(&[("format", "json")])
            .query(query);
        Ok(paginated_by_marker(builder, |last: &Container| {
            last.name.clone()
        }))
    }

    /// Create a container.
    ///
    /// Custom metadata is set via `X-Container-Meta-*` headers. Creating an
    /// existing container succeeds and updates its metadata.
    pub async fn create_container<S: AsRef<str>>(
        &self,
        name: S,
        metadata: &HashMap<String, String>,
    ) -> Result<(), Error> {
        let _ = self
            .session
            .put(OBJECT_STORAGE, &[name.as_ref()])
            .await?
            .headers(meta_headers(META_CONTAINER_PREFIX, metadata)?)
            .send()
            .await?;
        Ok(())
    }

    /// Delete an empty container.
    pub async fn delete_container<S: AsRef<str>>(&self, name: S) -> Result<(), Error> {
        let _ = self
            .session
            .delete(OBJECT_STORAGE, &[name.as_ref()])
            .await?
            .send()
            .await?;
        Ok(())
    }

    /// Fetch metadata of a container.
    pub async fn get_container_metadata<S: AsRef<str>>(
        &self,
        name: S,
    ) -> Result<ContainerMetadata, Error> {
        let response = self
            .session
            .head(OBJECT_STORAGE, &[name.as_ref()])
            .await?
            .send()
            .await?;
        Ok(ContainerMetadata::from_headers(response.headers()))
    }

    /// List objects in a container.
    #[cfg(feature = "stream")]
    pub async fn list_objects<S: AsRef<str>>(
        &self,
        container: S,
        query: &ListQuery,
    ) -> Result<impl Stream<Item = Result<Object, Error>>, Error> {
        let builder = self
            .session
            .get(OBJECT_STORAGE, &[container.as_ref()])
            .await?
            .query(&[("format", "json")])
            .query(query);
        Ok(paginated_by_marker(builder, |last: &Object| {
            last.name.clone()
        }))
    }

    /// Download an object as a stream of chunks.
    ///
    /// The content is not buffered in memory, which makes this call suitable
    /// for large objects.
    #[cfg(feature = "stream")]
    pub async fn get_object<S1, S2>(
        &self,
        container: S1,
        object: S2,
    ) -> Result<impl Stream<Item = Result<Bytes, Error>>, Error>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let response = self
            .session
            .get(OBJECT_STORAGE, &[container.as_ref(), object.as_ref()])
            .await?
            .send()
            .await?;
        Ok(response.bytes_stream().map_err(Error::from))
    }

    /// Download a whole object into memory.
    pub async fn fetch_object<S1, S2>(&self, container: S1, object: S2) -> Result<Bytes, Error>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        self.session
            .get(OBJECT_STORAGE, &[container.as_ref(), object.as_ref()])
            .await?
            .send()
            .await?
            .bytes()
            .await
            .map_err(Error::from)
    }

    /// Upload an object.
    pub async fn put_object<S1, S2, B>(
        &self,
        container: S1,
        object: S2,
        body: B,
        metadata: &HashMap<String, String>,
    ) -> Result<(), Error>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
        B: Into<Body>,
    {
        let _ = self
            .session
            .put(OBJECT_STORAGE, &[container.as_ref(), object.as_ref()])
            .await?
            .headers(meta_headers(META_OBJECT_PREFIX, metadata)?)
            .body(body)
            .send()
            .await?;
        Ok(())
    }

    /// Copy an object on the server side.
    pub async fn copy_object<S1, S2, S3, S4>(
        &self,
        src_container: S1,
        src_object: S2,
        dst_container: S3,
        dst_object: S4,
    ) -> Result<(), Error>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
        S3: AsRef<str>,
        S4: AsRef<str>,
    {
        let source = format!("/{}/{}", src_container.as_ref(), src_object.as_ref());
        let _ = self
            .session
            .put(OBJECT_STORAGE, &[dst_container.as_ref(), dst_object.as_ref()])
            .await?
            .header(COPY_FROM, source)
            .send()
            .await?;
        Ok(())
    }

    /// Delete an object.
    pub async fn delete_object<S1, S2>(&self, container: S1, object: S2) -> Result<(), Error>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let _ = self
            .session
            .delete(OBJECT_STORAGE, &[container.as_ref(), object.as_ref()])
            .await?
            .send()
            .await?;
        Ok(())
    }

    /// Fetch metadata of an object without downloading it.
    pub async fn get_object_metadata<S1, S2>(
        &self,
        container: S1,
        object: S2,
    ) -> Result<ObjectMetadata, Error>
    where
        S1: AsRef<str>,
        S2: AsRef<str>,
    {
        let response = self
            .session
            .head(OBJECT_STORAGE, &[container.as_ref(), object.as_ref()])
            .await?
            .send()
            .await?;
        Ok(ObjectMetadata::from_headers(response.headers()))
    }
}

#[cfg(test)]
mod test {
    use maplit::hashmap;
    use reqwest::header::HeaderMap;

    use super::{
        meta_headers, ContainerMetadata, ListQuery, Object, ObjectMetadata, META_CONTAINER_PREFIX,
    };

    #[test]
    fn test_object_deserialization() {
        let obj: Object = serde_json::from_str(
            r#"{
                "name": "photos/cat.jpg",
                "bytes": 14580,
                "hash": "451e372e48e0f6b1114fa0724aa79fa1",
                "content_type": "image/jpeg",
                "last_modified": "2014-01-15T16:41:49.390270"
            }"#,
        )
        .unwrap();
        assert_eq!(obj.name, "photos/cat.jpg");
        assert_eq!(obj.bytes, 14580);
        assert!(obj.last_modified.is_some());
    }

    #[test]
    fn test_container_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("x-container-object-count", "42".parse().unwrap());
        let _ = headers.insert("x-container-bytes-used", "123456".parse().unwrap());
        let _ = headers.insert("x-container-meta-book", "MobyDick".parse().unwrap());
        let meta = ContainerMetadata::from_headers(&headers);
        assert_eq!(meta.object_count, Some(42));
        assert_eq!(meta.bytes_used, Some(123456));
        assert_eq!(meta.metadata["book"], "MobyDick");
    }

    #[test]
    fn test_object_metadata_from_headers() {
        let mut headers = HeaderMap::new();
        let _ = headers.insert("content-length", "14580".parse().unwrap());
        let _ = headers.insert("content-type", "image/jpeg".parse().unwrap());
        let _ = headers.insert("etag", "451e372e48e0f6b1114fa0724aa79fa1".parse().unwrap());
        let _ = headers.insert("x-object-meta-fluffy", "very".parse().unwrap());
        let meta = ObjectMetadata::from_headers(&headers);
        assert_eq!(meta.content_length, Some(14580));
        assert_eq!(meta.content_type.unwrap(), "image/jpeg");
        assert_eq!(meta.metadata["fluffy"], "very");
    }

    #[test]
    fn test_meta_headers() {
        let metadata = hashmap! {
            "book".to_string() => "MobyDick".to_string(),
        };
        let headers = meta_headers(META_CONTAINER_PREFIX, &metadata).unwrap();
        assert_eq!(headers.get("x-container-meta-book").unwrap(), "MobyDick");
    }

    #[test]
    fn test_list_query_serialization() {
        let query = ListQuery {
            prefix: Some("photos/".into()),
            delimiter: Some("/".into()),
            limit: None,
        };
        let encoded = serde_urlencoded::to_string(&query).unwrap();
        assert_eq!(encoded, "prefix=photos%2F&delimiter=%2F");
    }
}
