// Copyright (c) 2025 ADBC Drivers Contributors
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

//! Error types for the Databricks tools core.
//!
//! Every fallible operation in the crate returns [`Result`]. The tool entry
//! points in [`crate::tools`] are the only place errors are turned into
//! user-visible text.

use crate::types::sea::StatementState;
use std::time::Duration;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by the credential, transport, statement and metadata layers.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or contradictory configuration (credentials, host, warehouse).
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The OAuth token endpoint rejected the request or returned no token.
    #[error("failed to obtain OAuth token from {endpoint}{}: {body}", status_suffix(.status))]
    Authentication {
        endpoint: String,
        status: Option<u16>,
        body: String,
    },

    /// Network-level failure before a response was received.
    #[error("transport error: {0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("HTTP {status} - {body}")]
    Http { status: u16, body: String },

    /// A 2xx response body was not the expected JSON.
    #[error("failed to parse JSON response: {0}")]
    Decode(String),

    /// A statement reached a non-success terminal state.
    #[error("{code} - {message}")]
    Query {
        state: StatementState,
        code: String,
        message: String,
    },

    /// The statement did not reach a terminal state within the caller budget.
    #[error("statement {statement_id} did not finish within {elapsed:?}")]
    Timeout {
        statement_id: String,
        elapsed: Duration,
    },

    /// The caller abandoned the statement.
    #[error("statement {0} was cancelled by the caller")]
    Cancelled(String),

    /// A single item of a batch could not be fetched.
    #[error("could not fetch {item}: {source}")]
    PartialFetch {
        item: String,
        #[source]
        source: Box<Error>,
    },
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

impl Error {
    /// Wrap an error as the failure of one item inside a batch.
    pub fn partial(item: impl Into<String>, source: Error) -> Self {
        Error::PartialFetch {
            item: item.into(),
            source: Box::new(source),
        }
    }

    /// Whether this error reports an HTTP 404 from the remote API.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Http { status, .. } => *status == 404,
            Error::PartialFetch { source, .. } => source.is_not_found(),
            _ => false,
        }
    }
}

impl From<reqwest::Error> for Error {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            Error::Decode(e.to_string())
        } else {
            Error::Transport(e.to_string())
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Decode(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authentication_error_message() {
        let err = Error::Authentication {
            endpoint: "https://login.example.com/token".to_string(),
            status: Some(401),
            body: "invalid_client".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to obtain OAuth token from https://login.example.com/token (HTTP 401): invalid_client"
        );

        let err = Error::Authentication {
            endpoint: "https://login.example.com/token".to_string(),
            status: None,
            body: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "failed to obtain OAuth token from https://login.example.com/token: connection refused"
        );
    }

    #[test]
    fn test_query_error_message() {
        let err = Error::Query {
            state: StatementState::Failed,
            code: "BAD_REQUEST".to_string(),
            message: "Table not found".to_string(),
        };
        assert_eq!(err.to_string(), "BAD_REQUEST - Table not found");
    }

    #[test]
    fn test_partial_fetch_wraps_source() {
        let err = Error::partial(
            "lineage for main.sales.orders",
            Error::Http {
                status: 404,
                body: "not found".to_string(),
            },
        );
        assert!(err.is_not_found());
        assert_eq!(
            err.to_string(),
            "could not fetch lineage for main.sales.orders: HTTP 404 - not found"
        );
    }
}
