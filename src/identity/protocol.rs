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

//! JSON structures of the Identity V3 token API.

#![allow(missing_docs)]

use chrono::{DateTime, FixedOffset};
use reqwest::Url;
use serde::ser::SerializeStruct;
use serde::{Deserialize, Serialize, Serializer};

use crate::common::{IdAndName, IdOrName};
use crate::endpointfilters::InterfaceType;

/// A user with a password.
#[derive(Clone, Debug, Serialize)]
pub struct UserAndPassword {
    #[serde(flatten)]
    pub user: IdOrName,
    pub password: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<IdOrName>,
}

/// Authentication method.
#[derive(Clone, Debug)]
pub enum Identity {
    /// Authentication with a user and a password.
    Password(UserAndPassword),
    /// Authentication with an existing token.
    Token(String),
}

impl Identity {
    fn method(&self) -> &'static str {
        match self {
            Identity::Password(..) => "password",
            Identity::Token(..) => "token",
        }
    }
}

impl Serialize for Identity {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        #[derive(Serialize)]
        struct TokenBody<'a> {
            id: &'a str,
        }

        let mut inner = serializer.serialize_struct("Identity", 2)?;
        inner.serialize_field("methods", &[self.method()])?;
        match self {
            Identity::Password(ref user) => {
                #[derive(Serialize)]
                struct PasswordBody<'a> {
                    user: &'a UserAndPassword,
                }
                inner.serialize_field("password", &PasswordBody { user })?;
            }
            Identity::Token(ref value) => {
                inner.serialize_field("token", &TokenBody { id: value })?;
            }
        }
        inner.end()
    }
}

/// A project scope.
#[derive(Clone, Debug, Serialize)]
pub struct Project {
    #[serde(flatten)]
    pub project: IdOrName,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub domain: Option<IdOrName>,
}

/// A scope of a token.
#[derive(Clone, Debug, Serialize)]
pub enum Scope {
    #[serde(rename = "project")]
    Project(Project),
}

/// An authentication request.
#[derive(Clone, Debug, Serialize)]
pub struct Auth {
    pub identity: Identity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<Scope>,
}

/// The root of an authentication request.
#[derive(Clone, Debug, Serialize)]
pub struct AuthRoot {
    pub auth: Auth,
}

/// A service catalog endpoint.
#[derive(Clone, Debug, Deserialize)]
pub struct Endpoint {
    pub interface: InterfaceType,
    #[serde(default)]
    pub region: String,
    pub url: Url,
}

/// A record of one service in the catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct CatalogRecord {
    #[serde(rename = "type")]
    pub service_type: String,
    pub endpoints: Vec<Endpoint>,
}

/// A token with its catalog.
#[derive(Clone, Debug, Deserialize)]
pub struct Token {
    #[serde(default)]
    pub roles: Vec<IdAndName>,
    pub expires_at: DateTime<FixedOffset>,
    #[serde(default)]
    pub catalog: Vec<CatalogRecord>,
}

/// The root of a token response.
#[derive(Clone, Debug, Deserialize)]
pub struct TokenRoot {
    pub token: Token,
}

#[cfg(test)]
pub mod test {
    use crate::common::test::compare;
    use crate::common::IdOrName;

    use super::{Auth, AuthRoot, Identity, Project, Scope, TokenRoot, UserAndPassword};

    #[test]
    fn test_password_auth_body() {
        let body = AuthRoot {
            auth: Auth {
                identity: Identity::Password(UserAndPassword {
                    user: IdOrName::from_name("admin"),
                    password: "pa$$w0rd".to_string(),
                    domain: Some(IdOrName::from_name("Default")),
                }),
                scope: Some(Scope::Project(Project {
                    project: IdOrName::from_name("project1"),
                    domain: Some(IdOrName::from_id("default")),
                })),
            },
        };
        compare(
            r#"{
                "auth": {
                    "identity": {
                        "methods": ["password"],
                        "password": {
                            "user": {
                                "name": "admin",
                                "password": "pa$$w0rd",
                                "domain": {"name": "Default"}
                            }
                        }
                    },
                    "scope": {
                        "project": {
                            "name": "project1",
                            "domain": {"id": "default"}
                        }
                    }
                }
            }"#,
            body,
        );
    }

    #[test]
    fn test_token_auth_body() {
        let body = AuthRoot {
            auth: Auth {
                identity: Identity::Token("abcdef".to_string()),
                scope: None,
            },
        };
        compare(
            r#"{
                "auth": {
                    "identity": {
                        "methods": ["token"],
                        "token": {"id": "abcdef"}
                    }
                }
            }"#,
            body,
        );
    }

    const TOKEN_RESPONSE: &str = r#"{
        "token": {
            "expires_at": "2024-03-01T12:34:56.000000Z",
            "roles": [{"id": "1", "name": "member"}],
            "catalog": [
                {
                    "type": "network",
                    "name": "neutron",
                    "endpoints": [
                        {
                            "id": "2",
                            "interface": "public",
                            "region": "RegionOne",
                            "url": "https://cloud.local/network"
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_token_parse() {
        let root: TokenRoot = serde_json::from_str(TOKEN_RESPONSE).unwrap();
        assert_eq!(root.token.roles[0].name, "member");
        assert_eq!(root.token.catalog[0].service_type, "network");
        assert_eq!(
            root.token.catalog[0].endpoints[0].url.as_str(),
            "https://cloud.local/network"
        );
    }
}
