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

//! The layer-3 extension: routers and floating IPs.

#[cfg(feature = "stream")]
use futures::Stream;
use serde::{Deserialize, Serialize};

#[cfg(feature = "stream")]
use crate::client::{Page, PaginatedCollection};
use crate::common::{next_from_links, ExtraProperties, Link};
use crate::services::NETWORK;
use crate::Error;

use super::{default_true, NetworkApi};

crate::extensible_enum! {
    #[doc = "Possible router statuses."]
    pub enum RouterStatus: Other {
        #[doc = "The router is up."]
        Active = "ACTIVE",
        #[doc = "The router is administratively down."]
        Down = "DOWN",
        #[doc = "The router is broken."]
        Error = "ERROR"
    }
}

crate::extensible_enum! {
    #[doc = "Possible floating IP statuses."]
    pub enum FloatingIpStatus: Other {
        #[doc = "The floating IP is associated and routed."]
        Active = "ACTIVE",
        #[doc = "The floating IP is not associated."]
        Down = "DOWN",
        #[doc = "The floating IP is broken."]
        Error = "ERROR"
    }
}

/// An external gateway of a router.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ExternalGatewayInfo {
    /// ID of the external network.
    pub network_id: String,
    /// Whether SNAT is enabled on the gateway.
    #[serde(default = "default_true")]
    pub enable_snat: bool,
}

/// A virtual router.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Router {
    /// Unique ID.
    pub id: String,
    /// Router name (not necessarily unique).
    #[serde(default)]
    pub name: String,
    /// Administrative state.
    #[serde(default = "default_true")]
    pub admin_state_up: bool,
    /// Current status.
    #[serde(default)]
    pub status: Option<RouterStatus>,
    /// External gateway (if any).
    #[serde(default)]
    pub external_gateway_info: Option<ExternalGatewayInfo>,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// A floating IP address.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FloatingIp {
    /// Unique ID.
    pub id: String,
    /// The address itself.
    pub floating_ip_address: String,
    /// ID of the external network the address comes from.
    pub floating_network_id: String,
    /// Internal address the floating IP forwards to (if associated).
    #[serde(default)]
    pub fixed_ip_address: Option<String>,
    /// ID of the port the floating IP is associated with (if any).
    #[serde(default)]
    pub port_id: Option<String>,
    /// ID of the router handling the association (if any).
    #[serde(default)]
    pub router_id: Option<String>,
    /// Current status.
    #[serde(default)]
    pub status: Option<FloatingIpStatus>,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// Parameters for creating or updating a router.
#[derive(Clone, Debug, Default, Serialize)]
pub struct RouterParams {
    /// Router name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// External gateway configuration.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_gateway_info: Option<ExternalGatewayInfo>,
    /// Extension properties to pass through.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// Parameters for creating a floating IP.
#[derive(Clone, Debug, Serialize)]
pub struct FloatingIpParams {
    /// ID of the external network to allocate the address from.
    pub floating_network_id: String,
    /// Port to associate the new address with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_id: Option<String>,
    /// Internal address to forward to (requires `port_id`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_ip_address: Option<String>,
    /// Extension properties to pass through.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// A reference to a router interface: either by subnet or by port.
#[derive(Clone, Debug, Serialize)]
pub enum InterfaceRef {
    /// Attach/detach via a subnet.
    #[serde(rename = "subnet_id")]
    Subnet(String),
    /// Attach/detach via a port.
    #[serde(rename = "port_id")]
    Port(String),
}

/// A router interface as reported after attaching or detaching.
#[derive(Clone, Debug, Deserialize)]
pub struct RouterInterface {
    /// ID of the router.
    pub id: String,
    /// ID of the involved subnet.
    #[serde(default)]
    pub subnet_id: Option<String>,
    /// ID of the involved port.
    #[serde(default)]
    pub port_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RoutersRoot {
    routers: Vec<Router>,
    #[serde(default)]
    routers_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct RouterRoot {
    router: Router,
}

#[derive(Debug, Serialize)]
struct RouterParamsRoot<'a> {
    router: &'a RouterParams,
}

#[derive(Debug, Deserialize)]
struct FloatingIpsRoot {
    floatingips: Vec<FloatingIp>,
    #[serde(default)]
    floatingips_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct FloatingIpRoot {
    floatingip: FloatingIp,
}

#[derive(Debug, Serialize)]
struct FloatingIpParamsRoot<'a> {
    floatingip: &'a FloatingIpParams,
}

#[derive(Debug, Serialize)]
struct FloatingIpAssociation<'a> {
    port_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct FloatingIpAssociationRoot<'a> {
    floatingip: FloatingIpAssociation<'a>,
}

#[cfg(feature = "stream")]
impl PaginatedCollection for RoutersRoot {
    type Item = Router;
    fn into_page(self) -> Page<Router> {
        Page {
            next: next_from_links(&self.routers_links),
            items: self.routers,
        }
    }
}

#[cfg(feature = "stream")]
impl PaginatedCollection for FloatingIpsRoot {
    type Item = FloatingIp;
    fn into_page(self) -> Page<FloatingIp> {
        Page {
            next: next_from_links(&self.floatingips_links),
            items: self.floatingips,
        }
    }
}

impl NetworkApi {
    /// List all routers.
    #[cfg(feature = "stream")]
    pub async fn list_routers(&self) -> Result<impl Stream<Item = Result<Router, Error>>, Error> {
        Ok(self
            .session
            .get(NETWORK, &["routers"])
            .await?
            .fetch_paginated::<RoutersRoot>())
    }

    /// Get one router by its ID.
    pub async fn get_router<S: AsRef<str>>(&self, id: S) -> Result<Router, Error> {
        let root: RouterRoot = self
            .session
            .get(NETWORK, &["routers", id.as_ref()])
            .await?
            .fetch_json()
            .await?;
        Ok(root.router)
    }

    /// Create a router.
    pub async fn create_router(&self, params: &RouterParams) -> Result<Router, Error> {
        let root: RouterRoot = self
            .session
            .post(NETWORK, &["routers"])
            .await?
            .json(&RouterParamsRoot { router: params })
            .fetch_json()
            .await?;
        Ok(root.router)
    }

    /// Update a router.
    pub async fn update_router<S: AsRef<str>>(
        &self,
        id: S,
        params: &RouterParams,
    ) -> Result<Router, Error> {
        let root: RouterRoot = self
            .session
            .put(NETWORK, &["routers", id.as_ref()])
            .await?
            .json(&RouterParamsRoot { router: params })
            .fetch_json()
            .await?;
        Ok(root.router)
    }

    /// Delete a router.
    pub async fn delete_router<S: AsRef<str>>(&self, id: S) -> Result<(), Error> {
        let _ = self
            .session
            .delete(NETWORK, &["routers", id.as_ref()])
            .await?
            .send()
            .await?;
        Ok(())
    }

    /// Attach an interface to a router.
    pub async fn add_router_interface<S: AsRef<str>>(
        &self,
        id: S,
        interface: &InterfaceRef,
    ) -> Result<RouterInterface, Error> {
        self.session
            .put(NETWORK, &["routers", id.as_ref(), "add_router_interface"])
            .await?
            .json(interface)
            .fetch_json()
            .await
    }

    /// Detach an interface from a router.
    pub async fn remove_router_interface<S: AsRef<str>>(
        &self,
        id: S,
        interface: &InterfaceRef,
    ) -> Result<RouterInterface, Error> {
        self.session
            .put(
                NETWORK,
                &["routers", id.as_ref(), "remove_router_interface"],
            )
            .await?
            .json(interface)
            .fetch_json()
            .await
    }

    /// List all floating IPs.
    #[cfg(feature = "stream")]
    pub async fn list_floating_ips(
        &self,
    ) -> Result<impl Stream<Item = Result<FloatingIp, Error>>, Error> {
        Ok(self
            .session
            .get(NETWORK, &["floatingips"])
            .await?
            .fetch_paginated::<FloatingIpsRoot>())
    }

    /// Get one floating IP by its ID.
    pub async fn get_floating_ip<S: AsRef<str>>(&self, id: S) -> Result<FloatingIp, Error> {
        let root: FloatingIpRoot = self
            .session
            .get(NETWORK, &["floatingips", id.as_ref()])
            .await?
            .fetch_json()
            .await?;
        Ok(root.floatingip)
    }

    /// Allocate a floating IP.
    pub async fn create_floating_ip(&self, params: &FloatingIpParams) -> Result<FloatingIp, Error> {
        let root: FloatingIpRoot = self
            .session
            .post(NETWORK, &["floatingips"])
            .await?
            .json(&FloatingIpParamsRoot { floatingip: params })
            .fetch_json()
            .await?;
        Ok(root.floatingip)
    }

    /// Associate a floating IP with a port, or disassociate it with `None`.
    pub async fn associate_floating_ip<S: AsRef<str>>(
        &self,
        id: S,
        port_id: Option<&str>,
    ) -> Result<FloatingIp, Error> {
        let root: FloatingIpRoot = self
            .session
            .put(NETWORK, &["floatingips", id.as_ref()])
            .await?
            .json(&FloatingIpAssociationRoot {
                floatingip: FloatingIpAssociation { port_id },
            })
            .fetch_json()
            .await?;
        Ok(root.floatingip)
    }

    /// Release a floating IP.
    pub async fn delete_floating_ip<S: AsRef<str>>(&self, id: S) -> Result<(), Error> {
        let _ = self
            .session
            .delete(NETWORK, &["floatingips", id.as_ref()])
            .await?
            .send()
            .await?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use crate::common::test::compare;

    use super::{
        FloatingIp, FloatingIpAssociation, FloatingIpAssociationRoot, FloatingIpStatus,
        InterfaceRef, Router, RouterStatus,
    };

    #[test]
    fn test_router_deserialization() {
        let router: Router = serde_json::from_str(
            r#"{
                "id": "abcd",
                "name": "main",
                "status": "ACTIVE",
                "external_gateway_info": {"network_id": "ext"}
            }"#,
        )
        .unwrap();
        assert_eq!(router.status, Some(RouterStatus::Active));
        let gw = router.external_gateway_info.unwrap();
        assert_eq!(gw.network_id, "ext");
        assert!(gw.enable_snat);
    }

    #[test]
    fn test_floating_ip_unassociated() {
        let fip: FloatingIp = serde_json::from_str(
            r#"{
                "id": "abcd",
                "floating_ip_address": "203.0.113.10",
                "floating_network_id": "ext",
                "status": "DOWN"
            }"#,
        )
        .unwrap();
        assert!(fip.port_id.is_none());
        assert_eq!(fip.status, Some(FloatingIpStatus::Down));
    }

    #[test]
    fn test_interface_ref_serialization() {
        compare(
            r#"{"subnet_id": "abcd"}"#,
            InterfaceRef::Subnet("abcd".into()),
        );
        compare(r#"{"port_id": "efgh"}"#, InterfaceRef::Port("efgh".into()));
    }

    #[test]
    fn test_association_serialization() {
        compare(
            r#"{"floatingip": {"port_id": "abcd"}}"#,
            FloatingIpAssociationRoot {
                floatingip: FloatingIpAssociation {
                    port_id: Some("abcd"),
                },
            },
        );
        compare(
            r#"{"floatingip": {"port_id": null}}"#,
            FloatingIpAssociationRoot {
                floatingip: FloatingIpAssociation { port_id: None },
            },
        );
    }
}
