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

//! The security groups extension.

#[cfg(feature = "stream")]
use futures::Stream;
use serde::{Deserialize, Serialize};

#[cfg(feature = "stream")]
use crate::client::{Page, PaginatedCollection};
use crate::common::{next_from_links, ExtraProperties, Link};
use crate::services::NETWORK;
use crate::Error;

use super::NetworkApi;

crate::extensible_enum! {
    #[doc = "Direction of a security group rule."]
    pub enum Direction: Other {
        #[doc = "Incoming traffic."]
        Ingress = "ingress",
        #[doc = "Outgoing traffic."]
        Egress = "egress"
    }
}

crate::extensible_enum! {
    #[doc = "Ethernet type of a security group rule."]
    pub enum EtherType: Other {
        #[doc = "IP version 4."]
        IPv4 = "IPv4",
        #[doc = "IP version 6."]
        IPv6 = "IPv6"
    }
}

/// A rule of a security group.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SecurityGroupRule {
    /// Unique ID.
    pub id: String,
    /// ID of the group the rule belongs to.
    pub security_group_id: String,
    /// Traffic direction.
    pub direction: Direction,
    /// Ethernet type.
    #[serde(default)]
    pub ethertype: Option<EtherType>,
    /// IP protocol (e.g. `tcp`), or `None` for all protocols.
    #[serde(default)]
    pub protocol: Option<String>,
    /// First port of the affected range.
    #[serde(default)]
    pub port_range_min: Option<u16>,
    /// Last port of the affected range.
    #[serde(default)]
    pub port_range_max: Option<u16>,
    /// Remote address range the rule applies to.
    #[serde(default)]
    pub remote_ip_prefix: Option<String>,
    /// Remote group the rule applies to.
    #[serde(default)]
    pub remote_group_id: Option<String>,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// A security group.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct SecurityGroup {
    /// Unique ID.
    pub id: String,
    /// Group name (not necessarily unique).
    #[serde(default)]
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// Rules of this group.
    #[serde(default)]
    pub security_group_rules: Vec<SecurityGroupRule>,
    /// Properties not covered by the fields above.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// Parameters for creating a security group.
#[derive(Clone, Debug, Default, Serialize)]
pub struct SecurityGroupParams {
    /// Group name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Free-form description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Extension properties to pass through.
    #[serde(flatten)]
    pub extra: ExtraProperties,
}

/// Parameters for creating a security group rule.
#[derive(Clone, Debug, Serialize)]
pub struct SecurityGroupRuleParams {
    /// ID of the group to add the rule to.
    pub security_group_id: String,
    /// Traffic direction.
    pub direction: Direction,
    /// Ethernet type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ethertype: Option<EtherType>,
    /// IP protocol (e.g. `tcp`), or `None` for all protocols.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub protocol: Option<String>,
    /// First port of the affected range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range_min: Option<u16>,
    /// Last port of the affected range.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port_range_max: Option<u16>,
    /// Remote address range the rule applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_ip_prefix: Option<String>,
    /// Remote group the rule applies to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_group_id: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SecurityGroupsRoot {
    security_groups: Vec<SecurityGroup>,
    #[serde(default)]
    security_groups_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct SecurityGroupRoot {
    security_group: SecurityGroup,
}

#[derive(Debug, Serialize)]
struct SecurityGroupParamsRoot<'a> {
    security_group: &'a SecurityGroupParams,
}

#[derive(Debug, Deserialize)]
struct SecurityGroupRulesRoot {
    security_group_rules: Vec<SecurityGroupRule>,
    #[serde(default)]
    security_group_rules_links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct SecurityGroupRuleRoot {
    security_group_rule: SecurityGroupRule,
}

#[derive(Debug, Serialize)]
struct SecurityGroupRuleParamsRoot<'a> {
    security_group_rule: &'a SecurityGroupRuleParams,
}

#[cfg(feature = "stream")]
impl PaginatedCollection for SecurityGroupsRoot {
    type Item = SecurityGroup;
    fn into_page(self) -> Page<SecurityGroup> {
        Page {
            next: next_from_links(&self.security_groups_links),
            items: self.security_groups,
        }
    }
}

#[cfg(feature = "stream")]
impl PaginatedCollection for SecurityGroupRulesRoot {
    type Item = SecurityGroupRule;
    fn into_page(self) -> Page<SecurityGroupRule> {
        Page {
            next: next_from_links(&self.security_group_rules_links),
            items: self.security_group_rules,
        }
    }
}

impl NetworkApi {
    /// List all security groups.
    #[cfg(feature = "stream")]
    pub async fn list_security_groups(
        &self,
    ) -> Result<impl Stream<Item = Result<SecurityGroup, Error>>, Error> {
        Ok(self
            .session
            .get(NETWORK, &["security-groups"])
            .await?
            .fetch_paginated::<SecurityGroupsRoot>())
    }

    /// Get one security group by its ID.
    pub async fn get_security_group<S: AsRef<str>>(&self, id: S) -> Result<SecurityGroup, Error> {
        let root: SecurityGroupRoot = self
            .session
            .get(NETWORK, &["security-groups", id.as_ref()])
            .await?
            .fetch_json()
            .await?;
        Ok(root.security_group)
    }

    /// Create a security group.
    pub async fn create_security_group(
        &self,
        params: &SecurityGroupParams,
    ) -> Result<SecurityGroup, Error> {
        let root: SecurityGroupRoot = self
            .session
            .post(NETWORK, &["security-groups"])
            .await?
            .json(&SecurityGroupParamsRoot {
                security_group: params,
            })
            .fetch_json()
            .await?;
        Ok(root.security_group)
    }

    /// Delete a security group.
    pub async fn delete_security_group<S: AsRef<str>>(&self, id: S) -> Result<(), Error> {
        let _ = self
            .session
            .delete(NETWORK, &["security-groups", id.as_ref()])
            .await?
            .send()
            .await?;
        Ok(())
    }

    /// List all security group rules.
    #[cfg(feature = "stream")]
    pub async fn list_security_group_rules(
        &self,
    ) -> Result<impl Stream<Item = Result<SecurityGroupRule, Error>>, Error> {
        Ok(self
            .session
            .get(NETWORK, &["security-group-rules"])
            .await?
            .fetch_paginated::<SecurityGroupRulesRoot>())
    }

    /// Add a rule to a security group.
    pub async fn create_security_group_rule(
        &self,
        params: &SecurityGroupRuleParams,
    ) -> Result<SecurityGroupRule, Error> {
        let root: SecurityGroupRuleRoot = self
            .session
            .post(NETWORK, &["security-group-rules"])
            .await?
            .json(&SecurityGroupRuleParamsRoot {
                security_group_rule: params,
            })
            .fetch_json()
            .await?;
        Ok(root.security_group_rule)
    }

    /// Delete a security group rule.
    pub async fn delete_security_group_rule<S: AsRef<str>>(&self, id: S) -> Result<(), Error> {
        let _ = self
            .session
            .delete(NETWORK, &["security-group-rules", id.as_ref()])
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
        Direction, EtherType, SecurityGroup, SecurityGroupRuleParams, SecurityGroupRuleParamsRoot,
    };

    #[test]
    fn test_security_group_deserialization() {
        let group: SecurityGroup = serde_json::from_str(
            r#"{
                "id": "abcd",
                "name": "default",
                "security_group_rules": [
                    {
                        "id": "efgh",
                        "security_group_id": "abcd",
                        "direction": "ingress",
                        "ethertype": "IPv4",
                        "protocol": "tcp",
                        "port_range_min": 22,
                        "port_range_max": 22
                    }
                ]
            }"#,
        )
        .unwrap();
        let rule = &group.security_group_rules[0];
        assert_eq!(rule.direction, Direction::Ingress);
        assert_eq!(rule.ethertype, Some(EtherType::IPv4));
        assert_eq!(rule.port_range_min, Some(22));
    }

    #[test]
    fn test_rule_params_serialization() {
        let params = SecurityGroupRuleParams {
            security_group_id: "abcd".into(),
            direction: Direction::Egress,
            ethertype: Some(EtherType::IPv6),
            protocol: None,
            port_range_min: None,
            port_range_max: None,
            remote_ip_prefix: None,
            remote_group_id: None,
        };
        compare(
            r#"{
                "security_group_rule": {
                    "security_group_id": "abcd",
                    "direction": "egress",
                    "ethertype": "IPv6"
                }
            }"#,
            SecurityGroupRuleParamsRoot {
                security_group_rule: &params,
            },
        );
    }

    #[test]
    fn test_unknown_direction_preserved() {
        let rule: super::SecurityGroupRule = serde_json::from_str(
            r#"{"id": "x", "security_group_id": "y", "direction": "sideways"}"#,
        )
        .unwrap();
        assert_eq!(rule.direction, Direction::Other("sideways".to_string()));
    }
}
