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

//! A stream of resources.

use async_stream::try_stream;
use futures::stream::Stream;
use reqwest::{Method, Url};
use serde::de::DeserializeOwned;

use super::client::RequestBuilder;
use super::{Error, ErrorKind};

/// One page of a paginated collection.
#[derive(Debug)]
pub struct Page<T> {
    /// Items on this page.
    pub items: Vec<T>,
    /// Link to the next page (if any).
    pub next: Option<Url>,
}

/// A deserialized body of a collection listing.
///
/// OpenStack services return collections as a JSON object with the items
/// under one key and the continuation links under another. Implementing
/// this trait for the root object makes it usable with
/// [fetch_paginated](crate::client::RequestBuilder::fetch_paginated).
pub trait PaginatedCollection: DeserializeOwned {
    /// Type of one item of the collection.
    type Item;

    /// Split the body into items and a link to the next page.
    fn into_page(self) -> Page<Self::Item>;
}

/// Creates a stream that follows the `next` links of a collection.
///
/// The initial request comes from the builder. Subsequent requests use the
/// URLs the server returns verbatim, but keep the headers of the original
/// request, so that an API version pin covers the whole collection.
pub(crate) fn paginated<S, C>(builder: RequestBuilder<S>) -> impl Stream<Item = Result<C::Item, Error>>
where
    C: PaginatedCollection + Send,
    C::Item: Send,
{
    try_stream! {
        let client = builder.client().clone();
        let headers = builder.prepared_headers()?;
        let mut page = builder.fetch_json::<C>().await?.into_page();
        loop {
            let next = page.next.take();
            for item in page.items {
                yield item;
            }
            match next {
                Some(url) => {
                    page = client
                        .request(Method::GET, url)
                        .headers(headers.clone())
                        .fetch_json::<C>()
                        .await?
                        .into_page();
                }
                None => break,
            }
        }
    }
}

/// Creates a stream over a marker-paginated listing.
///
/// The Object Storage service has no continuation links: each page is a
/// plain JSON array, and the next one is requested with `marker` set to a
/// value derived from the last item. An empty page ends the iteration.
pub(crate) fn paginated_by_marker<S, T, F>(
    builder: RequestBuilder<S>,
    to_marker: F,
) -> impl Stream<Item = Result<T, Error>>
where
    S: Clone,
    T: DeserializeOwned + Send,
    F: Fn(&T) -> String,
{
    try_stream! {
        let mut marker: Option<String> = None;
        loop {
            let request = builder.try_clone().ok_or_else(|| {
                Error::new(
                    ErrorKind::InvalidInput,
                    "Cannot paginate a request with a streaming body",
                )
            })?;
            let request = match marker.take() {
                Some(value) => request.query(&[("marker", value)]),
                None => request,
            };
            let items: Vec<T> = request.fetch_json().await?;
            match items.last() {
                Some(last) => marker = Some(to_marker(last)),
                None => break,
            }
            for item in items {
                yield item;
            }
        }
    }
}
