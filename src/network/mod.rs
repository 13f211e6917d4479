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

//! A client for the Networking service API.
//!
//! Covers the core resources (networks, subnets and ports) here, with the
//! `layer3` and `secgroups` extensions in their own modules.

pub mod layer3;
pub mod secgroups;

#[cfg(feature = "stream")]
use futures::Stream;
use serde::{Deserialize, Serialize};

#[cfg(feature = "stream")]
use super::client::{Page, PaginatedCollection};
use super::common::{next_from_links, ExtraProperties, Link};
use super::services::NETWORK;
use super::session::Session;
use super::Error;

pub use layer3::{
    ExternalGatewayInfo, FloatingIp, FloatingIpParams, FloatingIpStatus, InterfaceRef, Router,
    RouterInterface, RouterParams, RouterStatus,
};
pub use secgroups::{
    Direction, EtherType, SecurityGroup, SecurityGroupParams, SecurityGroupRule,
    SecurityGroupRuleParams,
};

crate::extensible_enum! {
    #[doc = "Possible network statuses."]
    pub enum NetworkStatus: Other {
        #[doc = "The network is up."]
        Active = "ACTIVE",
        #[doc = "The network is administratively down."]
        Down = "DOWN",
        #[doc = "The network is being set up."]
        Building = "BUILD",
        #[doc = "The network is broken."]
        Error = "ERROR"
    }
}

/// An IP address assigned to a port.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct FixedIp {
    /// The address itself.
    pub ip_address: String,
    /// ID of the subnet the address comes from.
    pub subnet_id: String,
}

/// An allocation pool of a subnet.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AllocationPool {
    /// First address of the pool.
    pub start: String,
    /// Last address of the pool.
    pub end: String,
}

/// A virtual network.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Network {
    /// Unique ID.
    pub id: String,
    /// Network name (not necessarily unique).
    #[serde(default)]
    pub name: String,
    /// Administrative state.
    #[serde(default = "default_true")]
    pub admin_state_up: bool,
    /// Whether the network is shared between projects.
    #[serde(default)]
    pub shared: bool,
    /// Current status.
    #[serde(default)]
    pub status: Option<NetworkStatus>,
    /// IDs of the subnets on this network.
    #[serde(default)]
    pub subnets: Vec<String>,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// A subnet of a network.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Subnet {
    /// Unique ID.
    pub id: String,
    /// ID of the network this subnet belongs to.
    pub network_id: String,
    /// Address range in the CIDR notation.
    pub cidr: String,
    /// IP version: 4 or 6.
    pub ip_version: u8,
    /// Subnet name (not necessarily unique).
    #[serde(default)]
    pub name: String,
    /// Gateway address (if any).
    #[serde(default)]
    pub gateway_ip: Option<String>,
    /// Whether DHCP is enabled.
    #[serde(default)]
    pub enable_dhcp: bool,
    /// Ranges the addresses are allocated from.
    #[serde(default)]
    pub allocation_pools: Vec<AllocationPool>,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// A port on a network.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Port {
    /// Unique ID.
    pub id: String,
    /// ID of the network this port belongs to.
    pub network_id: String,
    /// Port name (not necessarily unique).
    #[serde(default)]
    pub name: String,
    /// MAC address.
    #[serde(default)]
    pub mac_address: Option<String>,
    /// Administrative state.
    #[serde(default = "default_true")]
    pub admin_state_up: bool,
    /// Current status.
    #[serde(default)]
    pub status: Option<NetworkStatus>,
    /// ID of the device using this port (if any).
    #[serde(default)]
    pub device_id: Option<String>,
    /// Kind of the device using this port (if any).
    #[serde(default)]
    pub device_owner: Option<String>,
    /// IP addresses assigned to the port.
    #[serde(default)]
    pub fixed_ips: Vec<FixedIp>,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

pub(crate) fn default_true() -> bool {
    true
}

/// Parameters for creating or updating a network.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NetworkParams {
    /// Network name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// Whether to share the network between projects.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    /// Extension properties to pass through.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// Parameters for creating a subnet.
#[derive(Clone, Debug, Serialize)]
pub struct SubnetParams {
    /// ID of the network to create the subnet on.
    pub network_id: String,
    /// Address range in the CIDR notation.
    pub cidr: String,
    /// IP version: 4 or 6.
    pub ip_version: u8,
    /// Subnet name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Gateway address.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gateway_ip: Option<String>,
    /// Whether to enable DHCP.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_dhcp: Option<bool>,
    /// Extension properties to pass through.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// Parameters for creating or updating a port.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PortParams {
    /// ID of the network to create the port on (required on creation).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    /// Port name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Administrative state.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_state_up: Option<bool>,
    /// ID of the device using this port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Kind of the device using this port.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_owner: Option<String>,
    /// Requested IP addresses.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fixed_ips: Vec<FixedIp>,
    /// Extension properties to pass through.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// Query filters for network listings.
#[derive(Clone, Debug, Default, Serialize)]
pub struct NetworkListQuery {
    /// Filter by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filter by status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NetworkStatus>,
    /// Filter by the shared flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shared: Option<bool>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Query filters for subnet listings.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SubnetListQuery {
    /// Filter by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filter by the owning network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

/// Query filters for port listings.
#[derive(Clone, Debug, Default, Serialize)]
pub struct PortListQuery {
    /// Filter by name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Filter by the owning network.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub network_id: Option<String>,
    /// Filter by the attached device.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub device_id: Option<String>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

#[derive(Debug, Deserialize)]
struct NetworksRoot {
    networks: Vec<Network>,
    #[serde(default)]
    networks_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct NetworkRoot {
    network: Network,
}

#[derive(Debug, Serialize)]
struct NetworkParamsRoot<'a> {
    network: &'a NetworkParams,
}

#[derive(Debug, Deserialize)]
struct SubnetsRoot {
    subnets: Vec<Subnet>,
    #[serde(default)]
    subnets_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct SubnetRoot {
    subnet: Subnet,
}

#[derive(Debug, Serialize)]
struct SubnetParamsRoot<'a> {
    subnet: &'a SubnetParams,
}

#[derive(Debug, Deserialize)]
struct PortsRoot {
    ports: Vec<Port>,
    #[serde(default)]
    ports_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct PortRoot {
    port: Port,
}

#[derive(Debug, Serialize)]
struct PortParamsRoot<'a> {
    port: &'a PortParams,
}

#[cfg(feature = "stream")]
impl PaginatedCollection for NetworksRoot {
    type Item = Network;
    fn into_page(self) -> Page<Network> {
        Page {
            next: next_from_links(&self.networks_links),
            items: self.networks,
        }
    }
}

#[cfg(feature = "stream")]
impl PaginatedCollection for SubnetsRoot {
    type Item = Subnet;
    fn into_page(self) -> Page<Subnet> {
        Page {
            next: next_from_links(&self.subnets_links),
            items: self.subnets,
        }
    }
}

#[cfg(feature = "stream")]
impl PaginatedCollection for PortsRoot {
    type Item = Port;
    fn into_page(self) -> Page<Port> {
        Page {
            next: next_from_links(&self.ports_links),
            items: self.ports,
        }
    }
}

/// A client for the Networking service.
///
/// ```rust,no_run
/// # async fn example() -> Result<(), osclients::Error> {
/// use futures::pin_mut;
/// use futures::stream::TryStreamExt;
/// use osclients::network::{NetworkApi, NetworkListQuery};
///
/// let session = osclients::Session::from_env().await?;
/// let api = NetworkApi::new(&session);
/// let networks = api.list_networks(&NetworkListQuery::default()).await?;
/// pin_mut!(networks);
/// while let Some(net) = networks.try_next().await? {
///     println!("ID = {}, Name = {}", net.id, net.name);
/// }
/// # Ok(()) }
/// # #[tokio::main]
/// # async fn main() { example().await.unwrap(); }
/// ```
#[derive(Debug, Clone)]
pub struct NetworkApi {
    pub(crate) session: Session,
}

impl NetworkApi {
    /// Create a client from an existing session.
    pub fn new(session: &Session) -> NetworkApi {
        NetworkApi {
            session: session.clone(),
        }
    }

    /// List networks matching the query.
    ///
    /// The returned stream fetches new pages transparently while it is
    /// iterated.
    #[cfg(feature = "stream")]
    pub async fn list_networks(
        &self,
        query: &NetworkListQuery,
    ) -> Result<impl Stream<Item = Result<Network, Error>>, Error> {
        Ok(self
            .session
            .get(NETWORK, &["networks"])
            .await?
            .query(query)
            .fetch_paginated::<NetworksRoot>())
    }

    /// Get one network by its ID.
    pub async fn get_network<S: AsRef<str>>(&self, id: S) -> Result<Network, Error> {
        let root: NetworkRoot = self
            .session
            .get(NETWORK, &["networks", id.as_ref()])
            .await?
            .fetch_json()
            .await?;
        Ok(root.network)
    }

    /// Create a network.
    pub async fn create_network(&self, params: &NetworkParams) -> Result<Network, Error> {
        let root: NetworkRoot = self
            .session
            .post(NETWORK, &["networks"])
            .await?
            .json(&NetworkParamsRoot { network: params })
            .fetch_json()
            .await?;
        Ok(root.network)
    }

    /// Update a network.
    pub async fn update_network<S: AsRef<str>>(
        &self,
        id: S,
        params: &NetworkParams,
    ) -> Result<Network, Error> {
        let root: NetworkRoot = self
            .session
            .put(NETWORK, &["networks", id.as_ref()])
            .await?
            .json(&NetworkParamsRoot { network: params })
            .fetch_json()
            .await?;
        Ok(root.network)
    }

    /// Delete a network.
    pub async fn delete_network<S: AsRef<str>>(&self, id: S) -> Result<(), Error> {
        let _ = self
            .session
            .delete(NETWORK, &["networks", id.as_ref()])
            .await?
            .send()
            .await?;
        Ok(())
    }

    /// List subnets matching the query.
    #[cfg(feature = "stream")]
    pub async fn list_subnets(
        &self,
        query: &SubnetListQuery,
    ) -> Result<impl Stream<Item = Result<Subnet, Error>>, Error> {
        Ok(self
            .session
            .get(NETWORK, &["subnets"])
            .await?
            .query(query)
            .fetch_paginated::<SubnetsRoot>())
    }

    /// Get one subnet by its ID.
    pub async fn get_subnet<S: AsRef<str>>(&self, id: S) -> Result<Subnet, Error> {
        let root: SubnetRoot = self
            .session
            .get(NETWORK, &["subnets", id.as_ref()])
            .await?
            .fetch_json()
            .await?;
        Ok(root.subnet)
    }

    /// Create a subnet.
    pub async fn create_subnet(&self, params: &SubnetParams) -> Result<Subnet, Error> {
        let root: SubnetRoot = self
            .session
            .post(NETWORK, &["subnets"])
            .await?
            .json(&SubnetParamsRoot { subnet: params })
            .fetch_json()
            .await?;
        Ok(root.subnet)
    }

    /// Delete a subnet.
    pub async fn delete_subnet<S: AsRef<str>>(&self, id: S) -> Result<(), Error> {
        let _ = self
            .session
            .delete(NETWORK, &["subnets", id.as_ref()])
            .await?
            .send()
            .await?;
        Ok(())
    }

    /// List ports matching the query.
    #[cfg(feature = "stream")]
    pub async fn list_ports(
        &self,
        query: &PortListQuery,
    ) -> Result<impl Stream<Item = Result<Port, Error>>, Error> {
        Ok(self
            .session
            .get(NETWORK, &["ports"])
            .await?
            .query(query)
            .fetch_paginated::<PortsRoot>())
    }

    /// Get one port by its ID.
    pub async fn get_port<S: AsRef<str>>(&self, id: S) -> Result<Port, Error> {
        let root: PortRoot = self
            .session
            .get(NETWORK, &["ports", id.as_ref()])
            .await?
            .fetch_json()
            .await?;
        Ok(root.port)
    }

    /// Create a port.
    pub async fn create_port(&self, params: &PortParams) -> Result<Port, Error> {
        let root: PortRoot = self
            .session
            .post(NETWORK, &["ports"])
            .await?
            .json(&PortParamsRoot { port: params })
            .fetch_json()
            .await?;
        Ok(root.port)
    }

    /// Update a port.
    pub async fn update_port<S: AsRef<str>>(
        &self,
        id: S,
        params: &PortParams,
    ) -> Result<Port, Error> {
        let root: PortRoot = self
            .session
            .put(NETWORK, &["ports", id.as_ref()])
            .await?
            .json(&PortParamsRoot { port: params })
            .fetch_json()
            .await?;
        Ok(root.port)
    }

    /// Delete a port.
    pub async fn delete_port<S: AsRef<str>>(&self, id: S) -> Result<(), Error> {
        let _ = self
            .session
            .delete(NETWORK, &["ports", id.as_ref()])
            .await?
            .send()
            .await?;
        Ok(())
    }
}
