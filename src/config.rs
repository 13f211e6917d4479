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

//! Support for cloud configuration files and environment variables.

use std::collections::HashMap;
use std::env;
use std::fs::File;
use std::path::PathBuf;

use log::debug;
use serde::Deserialize;

use super::common::IdOrName;
use super::identity::{Password, Scope, Token};
use super::session::Session;
use super::{BasicAuth, Error, ErrorKind, InterfaceType, NoAuth};

#[derive(Debug, Deserialize)]
struct Auth {
    auth_url: Option<String>,
    endpoint: Option<String>,
    password: Option<String>,
    project_id: Option<String>,
    project_name: Option<String>,
    project_domain_id: Option<String>,
    project_domain_name: Option<String>,
    token: Option<String>,
    username: Option<String>,
    user_domain_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Cloud {
    auth: Option<Auth>,
    auth_type: Option<String>,
    interface: Option<InterfaceType>,
    region_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Clouds {
    clouds: HashMap<String, Cloud>,
}

#[inline]
fn invalid_config<S: Into<String>>(message: S) -> Error {
    Error::new(ErrorKind::InvalidConfig, message)
}

fn find_config() -> Option<PathBuf> {
    let current = PathBuf::from("./clouds.yaml");
    if current.is_file() {
        return Some(current);
    }

    if let Some(mut user) = dirs::config_dir() {
        user.push("openstack");
        user.push("clouds.yaml");
        if user.is_file() {
            return Some(user);
        }
    }

    let global = PathBuf::from("/etc/openstack/clouds.yaml");
    if global.is_file() {
        return Some(global);
    }

    None
}

impl Auth {
    fn project_scope(&self) -> Option<Scope> {
        let project = match (&self.project_id, &self.project_name) {
            (Some(id), _) => IdOrName::from_id(id.clone()),
            (None, Some(name)) => IdOrName::from_name(name.clone()),
            (None, None) => return None,
        };
        let domain = match (&self.project_domain_id, &self.project_domain_name) {
            (Some(id), _) => Some(IdOrName::from_id(id.clone())),
            (None, Some(name)) => Some(IdOrName::from_name(name.clone())),
            (None, None) => None,
        };
        Some(Scope::Project { project, domain })
    }

    fn require<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, Error> {
        value
            .as_deref()
            .ok_or_else(|| invalid_config(format!("Missing {} in the cloud configuration", name)))
    }
}

impl Cloud {
    fn create_session(self) -> Result<Session, Error> {
        let auth = self
            .auth
            .ok_or_else(|| invalid_config("Missing authentication information"))?;

        let auth_type = self.auth_type.as_deref().unwrap_or("password");
        let mut session = match auth_type {
            "password" | "v3password" => {
                let auth_url = Auth::require(&auth.auth_url, "auth_url")?;
                let username = Auth::require(&auth.username, "username")?;
                let password = Auth::require(&auth.password, "password")?;
                let user_domain = auth.user_domain_name.as_deref().unwrap_or("Default");
                let mut id = Password::new(auth_url, username, password, user_domain)?;
                if let Some(scope) = auth.project_scope() {
                    id.set_scope(scope);
                }
                Session::new(id)
            }
            "token" | "v3token" => {
                let auth_url = Auth::require(&auth.auth_url, "auth_url")?;
                let token = Auth::require(&auth.token, "token")?;
                let mut id = Token::new(auth_url, token)?;
                if let Some(scope) = auth.project_scope() {
                    id.set_scope(scope);
                }
                Session::new(id)
            }
            "none" => {
                let endpoint = Auth::require(&auth.endpoint, "endpoint")?;
                Session::new(NoAuth::new(endpoint)?)
            }
            "http_basic" => {
                let endpoint = Auth::require(&auth.endpoint, "endpoint")?;
                let username = Auth::require(&auth.username, "username")?;
                let password = Auth::require(&auth.password, "password")?;
                Session::new(BasicAuth::new(endpoint, username, password)?)
            }
            other => {
                return Err(invalid_config(format!(
                    "Unsupported authentication type: {}",
                    other
                )));
            }
        };

        if let Some(interface) = self.interface {
            session.endpoint_filters_mut().set_interfaces(interface);
        }
        if let Some(region) = self.region_name {
            session.endpoint_filters_mut().set_region(region);
        }

        Ok(session)
    }
}

/// Create a session from the `clouds.yaml` configuration file.
pub fn from_config(cloud_name: &str) -> Result<Session, Error> {
    let path = find_config().ok_or_else(|| invalid_config("clouds.yaml was not found"))?;
    debug!("Using cloud {} from {:?}", cloud_name, path);

    let file = File::open(&path)
        .map_err(|e| invalid_config(format!("Cannot read {}: {}", path.display(), e)))?;
    let mut clouds: Clouds = serde_yaml::from_reader(file)
        .map_err(|e| invalid_config(format!("Cannot parse {}: {}", path.display(), e)))?;

    let cloud = clouds
        .clouds
        .remove(cloud_name)
        .ok_or_else(|| invalid_config(format!("No such cloud: {}", cloud_name)))?;
    cloud.create_session()
}

#[inline]
fn get_env(name: &str) -> Option<String> {
    env::var(name).ok().filter(|s| !s.is_empty())
}

fn require_env(name: &str) -> Result<String, Error> {
    get_env(name).ok_or_else(|| invalid_config(format!("Missing environment variable: {}", name)))
}

/// Create a session from environment variables.
pub fn from_env() -> Result<Session, Error> {
    if let Some(cloud_name) = get_env("OS_CLOUD") {
        return from_config(&cloud_name);
    }

    let auth_type = get_env("OS_AUTH_TYPE");
    let mut session = match auth_type.as_deref() {
        Some("none") => {
            let endpoint = require_env("OS_ENDPOINT")?;
            Session::new(NoAuth::new(endpoint)?)
        }
        Some("http_basic") => {
            let endpoint = require_env("OS_ENDPOINT")?;
            let username = require_env("OS_USERNAME")?;
            let password = require_env("OS_PASSWORD")?;
            Session::new(BasicAuth::new(endpoint, username, password)?)
        }
        Some("token") | Some("v3token") => {
            let auth_url = require_env("OS_AUTH_URL")?;
            let token = require_env("OS_TOKEN")?;
            let mut id = Token::new(auth_url, token)?;
            set_scope_from_env(&mut |scope| id.set_scope(scope));
            Session::new(id)
        }
        Some("password") | Some("v3password") | None => {
            let auth_url = require_env("OS_AUTH_URL")?;
            let username = require_env("OS_USERNAME")?;
            let password = require_env("OS_PASSWORD")?;
            let user_domain = get_env("OS_USER_DOMAIN_NAME").unwrap_or_else(|| "Default".into());
            let mut id = Password::new(auth_url, username, password, user_domain)?;
            set_scope_from_env(&mut |scope| id.set_scope(scope));
            Session::new(id)
        }
        Some(other) => {
            return Err(invalid_config(format!(
                "Unsupported OS_AUTH_TYPE: {}",
                other
            )));
        }
    };

    if let Some(interface) = get_env("OS_INTERFACE") {
        let interface: InterfaceType = interface.parse()?;
        session.endpoint_filters_mut().set_interfaces(interface);
    }
    if let Some(region) = get_env("OS_REGION_NAME") {
        session.endpoint_filters_mut().set_region(region);
    }

    Ok(session)
}

fn set_scope_from_env(set_scope: &mut dyn FnMut(Scope)) {
    let project = match (get_env("OS_PROJECT_ID"), get_env("OS_PROJECT_NAME")) {
        (Some(id), _) => IdOrName::from_id(id),
        (None, Some(name)) => IdOrName::from_name(name),
        (None, None) => return,
    };
    let domain = match (
        get_env("OS_PROJECT_DOMAIN_ID"),
        get_env("OS_PROJECT_DOMAIN_NAME"),
    ) {
        (Some(id), _) => Some(IdOrName::from_id(id)),
        (None, Some(name)) => Some(IdOrName::from_name(name)),
        (None, None) => None,
    };
    set_scope(Scope::Project { project, domain });
}

#[cfg(test)]
mod test {
    use super::{Clouds, InterfaceType};

    #[test]
    fn test_parse_clouds_yaml() {
        let yaml = r#"
clouds:
  cloud1:
    auth:
      auth_url: https://cloud.local/identity
      username: admin
      password: secret
      project_name: project1
      user_domain_name: Default
      project_domain_name: Default
    region_name: RegionOne
    interface: internal
"#;
        let clouds: Clouds = serde_yaml::from_str(yaml).unwrap();
        let cloud = &clouds.clouds["cloud1"];
        let auth = cloud.auth.as_ref().unwrap();
        assert_eq!(auth.username.as_deref(), Some("admin"));
        assert_eq!(cloud.region_name.as_deref(), Some("RegionOne"));
        assert_eq!(cloud.interface, Some(InterfaceType::Internal));
    }

    #[test]
    fn test_create_session() {
        let yaml = r#"
clouds:
  cloud1:
    auth:
      auth_url: https://cloud.local/identity
      username: admin
      password: secret
      project_name: project1
"#;
        let mut clouds: Clouds = serde_yaml::from_str(yaml).unwrap();
        let cloud = clouds.clouds.remove("cloud1").unwrap();
        let _ = cloud.create_session().unwrap();
    }

    #[test]
    fn test_create_session_http_basic() {
        let yaml = r#"
clouds:
  cloud1:
    auth_type: http_basic
    auth:
      endpoint: https://cloud.local/baremetal
      username: admin
      password: secret
"#;
        let mut clouds: Clouds = serde_yaml::from_str(yaml).unwrap();
        let cloud = clouds.clouds.remove("cloud1").unwrap();
        let session = cloud.create_session().unwrap();
        let auth = format!("{:?}", session.auth_type());
        assert!(auth.starts_with("BasicAuth"), "unexpected auth: {}", auth);
    }

    #[test]
    fn test_create_session_http_basic_missing_password() {
        let yaml = r#"
clouds:
  cloud1:
    auth_type: http_basic
    auth:
      endpoint: https://cloud.local/baremetal
      username: admin
"#;
        let mut clouds: Clouds = serde_yaml::from_str(yaml).unwrap();
        let cloud = clouds.clouds.remove("cloud1").unwrap();
        let err = cloud.create_session().err().unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidConfig);
    }

    #[test]
    fn test_create_session_none() {
        let yaml = r#"
clouds:
  cloud1:
    auth_type: none
    auth:
      endpoint: https://cloud.local/baremetal
"#;
        let mut clouds: Clouds = serde_yaml::from_str(yaml).unwrap();
        let cloud = clouds.clouds.remove("cloud1").unwrap();
        let session = cloud.create_session().unwrap();
        let auth = format!("{:?}", session.auth_type());
        assert!(auth.starts_with("NoAuth"), "unexpected auth: {}", auth);
    }

    #[test]
    fn test_create_session_missing_auth_url() {
        let yaml = r#"
clouds:
  cloud1:
    auth:
      username: admin
      password: secret
"#;
        let mut clouds: Clouds = serde_yaml::from_str(yaml).unwrap();
        let cloud = clouds.clouds.remove("cloud1").unwrap();
        let err = cloud.create_session().err().unwrap();
        assert_eq!(err.kind(), crate::ErrorKind::InvalidConfig);
    }
}
