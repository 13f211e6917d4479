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

//! Low-level code to work with the service catalog.

use log::debug;
use reqwest::Url;

use super::identity::protocol::CatalogRecord;
use super::{EndpointFilters, Error};

/// Find an endpoint URL in the service catalog.
///
/// When several endpoints match the filters, the first one in the interface
/// priority order wins.
pub fn find_endpoint(
    catalog: &[CatalogRecord],
    service_type: &str,
    filters: &EndpointFilters,
) -> Result<Url, Error> {
    let svc = catalog
        .iter()
        .find(|x| x.service_type == *service_type)
        .ok_or_else(|| Error::new_endpoint_not_found(service_type))?;

    let endp = svc
        .endpoints
        .iter()
        .filter(|x| filters.check(x))
        .min_by_key(|x| {
            filters
                .interfaces
                .find(x.interface)
                .expect("checked endpoint has a known interface")
        })
        .ok_or_else(|| Error::new_endpoint_not_found(service_type))?;

    debug!("Received {:?} for {}", endp, service_type);
    Ok(endp.url.clone())
}
