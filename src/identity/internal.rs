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

//! Internal implementation of the identity authentication.

use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Deref;

use chrono::{Duration, Local};
use log::{debug, error, trace};
use reqwest::{Client, Response, Url};
use tokio::sync::RwLock;

use super::protocol::{self, AuthRoot};
use super::{IdOrName, Scope};
use crate::client::check;
use crate::{catalog, EndpointFilters, Error, ErrorKind};

const MISSING_SUBJECT_HEADER: &str = "Missing X-Subject-Token header";
const INVALID_SUBJECT_HEADER: &str = "Invalid X-Subject-Token header";
// Refresh the token if it expires in 10 minutes or less.
const TOKEN_MIN_VALIDITY: i64 = 10;

/// Plain authentication token without additional details.
#[derive(Clone)]
pub(crate) struct Token {
    value: String,
    body: protocol::Token,
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let mut hasher = DefaultHasher::new();
        self.value.hash(&mut hasher);
        write!(
            f,
            "Token {{ value: hash({}), expires_at: {} }}",
            hasher.finish(),
            self.body.expires_at
        )
    }
}

/// Internal identity authentication object.
#[derive(Debug)]
pub(crate) struct Internal {
    auth_url: Url,
    body: AuthRoot,
    token_endpoint: String,
    cached_token: RwLock<Option<Token>>,
    pub filters: EndpointFilters,
}

impl Internal {
    /// Create a new implementation.
    pub fn new(mut auth_url: Url, body: AuthRoot) -> Result<Internal, Error> {
        let _ = auth_url
            .path_segments_mut()
            .map_err(|_| Error::new(ErrorKind::InvalidConfig, "Invalid auth_url: wrong schema?"))?
            .pop_if_empty();

        let token_endpoint = if auth_url.as_str().ends_with("/v3") {
            format!("{}/auth/tokens", auth_url)
        } else {
            format!("{}/v3/auth/tokens", auth_url)
        };

        Ok(Internal {
            auth_url,
            body,
            token_endpoint,
            cached_token: RwLock::new(None),
            filters: EndpointFilters::default(),
        })
    }

    /// Access to the auth URL.
    #[inline]
    pub fn auth_url(&self) -> &Url {
        &self.auth_url
    }

    /// Get the authentication token string.
    pub async fn get_token(&self, client: &Client) -> Result<String, Error> {
        self.refresh(client, false).await?;
        let guard = self.cached_token.read().await;
        // refresh unconditionally populates the token
        Ok(guard.as_ref().expect("no token after refresh").value.clone())
    }

    /// Get a URL for the requested service from the catalog.
    pub async fn get_endpoint(
        &self,
        client: &Client,
        service_type: &str,
        filters: &EndpointFilters,
    ) -> Result<Url, Error> {
        let real_filters = filters.with_defaults(&self.filters);
        debug!(
            "Requesting a catalog endpoint for service '{}', filters {:?}",
            service_type, real_filters
        );
        self.refresh(client, false).await?;
        let guard = self.cached_token.read().await;
        let token = guard.as_ref().expect("no token after refresh");
        catalog::find_endpoint(&token.body.catalog, service_type, &real_filters)
    }

    /// Add a scope to the authentication.
    pub fn set_scope(&mut self, scope: Scope) {
        self.body.auth.scope = Some(match scope {
            Scope::Project { project, domain } => {
                protocol::Scope::Project(protocol::Project { project, domain })
            }
        });
    }

    /// User name or ID.
    #[inline]
    pub fn user(&self) -> Option<&IdOrName> {
        match self.body.auth.identity {
            protocol::Identity::Password(ref pw) => Some(&pw.user),
            _ => None,
        }
    }

    /// Project name or ID (if project scoped).
    #[inline]
    pub fn project(&self) -> Option<&IdOrName> {
        match self.body.auth.scope {
            Some(protocol::Scope::Project(ref prj)) => Some(&prj.project),
            _ => None,
        }
    }

    /// Refresh the token (if needed or forced).
    pub async fn refresh(&self, client: &Client, force: bool) -> Result<(), Error> {
        // This is executed on every request, so start with a read lock. We
        // expect to hit this branch most of the time.
        if !force && token_alive(&self.cached_token.read().await) {
            return Ok(());
        }

        let mut lock = self.cached_token.write().await;
        // Another thread may have updated the token while we were waiting
        // for the write lock.
        if !force && token_alive(&lock) {
            return Ok(());
        }

        let resp = client
            .post(&self.token_endpoint)
            .json(&self.body)
            .send()
            .await?;
        *lock = Some(token_from_response(check(resp).await?).await?);
        Ok(())
    }

    #[cfg(test)]
    pub fn token_endpoint(&self) -> &str {
        &self.token_endpoint
    }
}

impl Clone for Internal {
    fn clone(&self) -> Internal {
        Internal {
            auth_url: self.auth_url.clone(),
            body: self.body.clone(),
            token_endpoint: self.token_endpoint.clone(),
            cached_token: RwLock::new(None),
            filters: self.filters.clone(),
        }
    }
}

#[inline]
fn token_alive(token: &impl Deref<Target = Option<Token>>) -> bool {
    if let Some(value) = token.deref() {
        let validity_time_left = value.body.expires_at.signed_duration_since(Local::now());
        trace!("Token is valid for {:?}", validity_time_left);
        validity_time_left > Duration::minutes(TOKEN_MIN_VALIDITY)
    } else {
        false
    }
}

async fn token_from_response(resp: Response) -> Result<Token, Error> {
    let value = match resp.headers().get("x-subject-token") {
        Some(hdr) => match hdr.to_str() {
            Ok(s) => Ok(s.to_string()),
            Err(e) => {
                error!(
                    "Invalid X-Subject-Token {:?} received from {}: {}",
                    hdr,
                    resp.url(),
                    e
                );
                Err(Error::new(
                    ErrorKind::InvalidResponse,
                    INVALID_SUBJECT_HEADER,
                ))
            }
        },
        None => {
            error!("No X-Subject-Token header received from {}", resp.url());
            Err(Error::new(
                ErrorKind::InvalidResponse,
                MISSING_SUBJECT_HEADER,
            ))
        }
    }?;

    let root = resp.json::<protocol::TokenRoot>().await?;
    debug!("Received a token expiring at {}", root.token.expires_at);
    trace!("Received catalog: {:?}", root.token.catalog);
    Ok(Token {
        value,
        body: root.token,
    })
}

#[cfg(test)]
mod test {
    use chrono::{DateTime, Duration, FixedOffset, Local};

    use super::super::protocol;
    use super::{token_alive, Token};

    fn token_expiring_in(validity: Duration) -> Token {
        Token {
            value: "abcdef".to_string(),
            body: protocol::Token {
                roles: Vec::new(),
                expires_at: DateTime::<FixedOffset>::from(Local::now() + validity),
                catalog: Vec::new(),
            },
        }
    }

    #[test]
    fn test_token_alive() {
        let token = Box::new(Some(token_expiring_in(Duration::minutes(15))));
        assert!(token_alive(&token));
    }

    #[test]
    fn test_token_close_to_expiry_is_dead() {
        let token = Box::new(Some(token_expiring_in(Duration::minutes(5))));
        assert!(!token_alive(&token));
    }

    #[test]
    fn test_token_expired_is_dead() {
        let token = Box::new(Some(token_expiring_in(Duration::minutes(-5))));
        assert!(!token_alive(&token));
    }

    #[test]
    fn test_no_token_is_dead() {
        let token: Box<Option<Token>> = Box::new(None);
        assert!(!token_alive(&token));
    }
}
