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

//! Asynchronous clients for OpenStack cloud service APIs.
//!
//! The crate is built around a [Session](struct.Session.html) that owns
//! authentication, the service catalog and endpoint discovery. On top of it,
//! thin typed clients cover the Identity, Networking, Content Delivery and
//! Object Storage services. All HTTP requests of all clients go through the
//! same pipeline: the endpoint is looked up in the catalog, the token is
//! injected, the JSON body is encoded, and the response status is validated
//! and mapped to an [Error](struct.Error.html) before any payload is
//! decoded.
//!
//! Start with creating a `Session`, either from one of the authentication
//! types or from the ambient configuration:
//!
//! ```rust,no_run
//! # async fn example() -> Result<(), osclients::Error> {
//! use futures::pin_mut;
//! use futures::stream::TryStreamExt;
//! use osclients::network::{NetworkApi, NetworkListQuery};
//!
//! let session = osclients::Session::from_env().await?;
//! let api = NetworkApi::new(&session);
//! let networks = api.list_networks(&NetworkListQuery::default()).await?;
//! pin_mut!(networks);
//! while let Some(net) = networks.try_next().await? {
//!     println!("ID = {}, Name = {}", net.id, net.name);
//! }
//! # Ok(()) }
//! # #[tokio::main]
//! # async fn main() { example().await.unwrap(); }
//! ```
//!
//! # Features
//!
//! - `stream` (default): streaming over paginated listings and object
//!   content.
//! - `native-tls` (default) or `rustls`: the TLS implementation to use.

#![crate_name = "osclients"]
#![crate_type = "lib"]
// NOTE: we do not use generic deny(warnings) to avoid breakages with new
// versions of the compiler. Add more warnings here as you discover them.
#![deny(
    improper_ctypes,
    missing_debug_implementations,
    missing_docs,
    non_shorthand_field_patterns,
    no_mangle_generic_items,
    overflowing_literals,
    path_statements,
    patterns_in_fns_without_body,
    trivial_casts,
    trivial_numeric_casts,
    unconditional_recursion,
    unnameable_test_items,
    unsafe_code,
    unused_allocation,
    unused_comparisons,
    unused_doc_comments,
    unused_extern_crates,
    unused_import_braces,
    unused_parens,
    unused_qualifications,
    unused_results,
    while_true
)]
#![allow(
    clippy::new_ret_no_self,
    clippy::should_implement_trait,
    clippy::wrong_self_convention
)]

mod apiversion;
mod auth;
mod basic;
mod cache;
mod catalog;
pub mod cdn;
pub mod client;
pub mod common;
mod config;
mod endpointfilters;
mod error;
pub mod identity;
pub mod identityapi;
mod macros;
pub mod network;
pub mod objectstorage;
mod protocol;
pub mod services;
mod session;
#[cfg(feature = "stream")]
mod stream;
mod url;

pub use crate::apiversion::ApiVersion;
pub use crate::auth::{AuthType, NoAuth};
pub use crate::basic::BasicAuth;
pub use crate::config::{from_config, from_env};
pub use crate::endpointfilters::{EndpointFilters, InterfaceType, ValidInterfaces};
pub use crate::error::{Error, ErrorKind};
pub use crate::session::Session;
