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

//! Error and result implementations.

use std::error;
use std::fmt;

use reqwest::StatusCode;

/// Kind of an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum ErrorKind {
    /// Authentication failure.
    ///
    /// Maps to HTTP 401.
    AuthenticationFailed,

    /// Access denied.
    ///
    /// Maps to HTTP 403.
    AccessDenied,

    /// Requested resource was not found.
    ///
    /// Maps to HTTP 404 and 410.
    ResourceNotFound,

    /// Requested service endpoint was not found in the catalog.
    EndpointNotFound,

    /// Invalid value passed to one of parameters.
    ///
    /// May be a result of HTTP 400.
    InvalidInput,

    /// Invalid configuration.
    InvalidConfig,

    /// Unsupported or incompatible API version.
    ///
    /// May be a result of HTTP 406.
    IncompatibleApiVersion,

    /// Conflict in the request.
    ///
    /// Maps to HTTP 409.
    Conflict,

    /// The service does not support the requested operation.
    ///
    /// Maps to HTTP 405 and 501.
    OperationNotSupported,

    /// The service responded with an internal error.
    ///
    /// Maps to HTTP 5xx codes other than 501.
    InternalServerError,

    /// Response received from the server is malformed.
    InvalidResponse,

    /// Failure at the protocol level (DNS, connection, timeout, etc).
    ProtocolError,

    /// The request failed for a reason not covered by other kinds.
    OperationFailed,
}

impl ErrorKind {
    /// Short description of the error kind.
    pub fn description(&self) -> &'static str {
        match self {
            ErrorKind::AuthenticationFailed => "Failed to authenticate",
            ErrorKind::AccessDenied => "Access to the resource is denied",
            ErrorKind::ResourceNotFound => "Requested resource was not found",
            ErrorKind::EndpointNotFound => "Requested endpoint was not found",
            ErrorKind::InvalidInput => "Input value(s) are invalid or missing",
            ErrorKind::InvalidConfig => "Configuration is invalid",
            ErrorKind::IncompatibleApiVersion => "Incompatible or unsupported API version",
            ErrorKind::Conflict => "Request cannot be fulfilled due to a conflict",
            ErrorKind::OperationNotSupported => "Operation is not supported",
            ErrorKind::InternalServerError => "Internal server error or bad gateway",
            ErrorKind::InvalidResponse => "Received invalid response",
            ErrorKind::ProtocolError => "Error when accessing the server",
            ErrorKind::OperationFailed => "Operation has failed",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.description())
    }
}

impl From<StatusCode> for ErrorKind {
    fn from(value: StatusCode) -> ErrorKind {
        match value {
            StatusCode::UNAUTHORIZED => ErrorKind::AuthenticationFailed,
            StatusCode::FORBIDDEN => ErrorKind::AccessDenied,
            StatusCode::NOT_FOUND | StatusCode::GONE => ErrorKind::ResourceNotFound,
            StatusCode::NOT_ACCEPTABLE => ErrorKind::IncompatibleApiVersion,
            StatusCode::CONFLICT => ErrorKind::Conflict,
            StatusCode::METHOD_NOT_ALLOWED | StatusCode::NOT_IMPLEMENTED => {
                ErrorKind::OperationNotSupported
            }
            StatusCode::BAD_REQUEST => ErrorKind::InvalidInput,
            c if c.is_server_error() => ErrorKind::InternalServerError,
            _ => ErrorKind::OperationFailed,
        }
    }
}

/// Error from an OpenStack call.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
    message: String,
    status: Option<StatusCode>,
}

impl Error {
    /// Create a new error of the provided kind.
    #[inline]
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Error {
        Error {
            kind,
            message: message.into(),
            status: None,
        }
    }

    /// Add an HTTP status code to the error.
    #[inline]
    pub fn with_status(mut self, status: StatusCode) -> Error {
        self.status = Some(status);
        self
    }

    /// Error kind.
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// HTTP status code, if one was received.
    #[inline]
    pub fn status(&self) -> Option<StatusCode> {
        self.status
    }

    pub(crate) fn new_endpoint_not_found<D: fmt::Display>(service_type: D) -> Error {
        Error::new(
            ErrorKind::EndpointNotFound,
            format!("Endpoint for service {} was not found", service_type),
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)
    }
}

impl error::Error for Error {}

impl From<reqwest::Error> for Error {
    fn from(value: reqwest::Error) -> Error {
        let kind = if value.is_timeout() || value.is_connect() || value.is_request() {
            ErrorKind::ProtocolError
        } else if value.is_decode() {
            ErrorKind::InvalidResponse
        } else if let Some(status) = value.status() {
            status.into()
        } else {
            ErrorKind::OperationFailed
        };

        let mut result = Error::new(kind, value.to_string());
        if let Some(status) = value.status() {
            result = result.with_status(status);
        }
        result
    }
}

impl From<http::Error> for Error {
    fn from(value: http::Error) -> Error {
        Error::new(ErrorKind::InvalidInput, value.to_string())
    }
}

impl From<url::ParseError> for Error {
    fn from(value: url::ParseError) -> Error {
        Error::new(
            ErrorKind::InvalidInput,
            format!("Error parsing URL: {}", value),
        )
    }
}

#[cfg(test)]
pub mod test {
    use reqwest::StatusCode;

    use super::{Error, ErrorKind};

    #[test]
    fn test_error_display() {
        let err = Error::new(ErrorKind::InvalidInput, "boom");
        assert_eq!(
            err.to_string(),
            "Input value(s) are invalid or missing: boom"
        );
    }

    #[test]
    fn test_kind_from_status() {
        assert_eq!(
            ErrorKind::from(StatusCode::UNAUTHORIZED),
            ErrorKind::AuthenticationFailed
        );
        assert_eq!(
            ErrorKind::from(StatusCode::NOT_FOUND),
            ErrorKind::ResourceNotFound
        );
        assert_eq!(ErrorKind::from(StatusCode::CONFLICT), ErrorKind::Conflict);
        assert_eq!(
            ErrorKind::from(StatusCode::BAD_GATEWAY),
            ErrorKind::InternalServerError
        );
        assert_eq!(
            ErrorKind::from(StatusCode::IM_A_TEAPOT),
            ErrorKind::OperationFailed
        );
    }

    #[test]
    fn test_with_status() {
        let err =
            Error::new(ErrorKind::Conflict, "duplicate name").with_status(StatusCode::CONFLICT);
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(err.status(), Some(StatusCode::CONFLICT));
    }
}
