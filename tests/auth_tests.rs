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

//! Credential store tests against a mock OAuth token endpoint.

use chrono::{DateTime, Duration, TimeZone, Utc};
use databricks_mcp::auth::{Clock, CredentialStore, Credentials};
use databricks_mcp::Error;
use serde_json::json;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Clock that only moves when told to.
#[derive(Debug)]
struct ManualClock {
    now: Mutex<DateTime<Utc>>,
}

impl ManualClock {
    fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self {
            now: Mutex::new(now),
        })
    }

    fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap()
    }
}

fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
}

fn client_credentials(server: &MockServer) -> Credentials {
    Credentials::ClientCredentials {
        client_id: "client-1".to_string(),
        client_secret: "secret-1".to_string(),
        token_url: format!("{}/oidc/v1/token", server.uri()),
        scope: Some("all-apis".to_string()),
    }
}

#[tokio::test]
async fn test_token_is_cached_until_expiry_margin() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oidc/v1/token"))
        .and(body_string_contains("grant_type=client_credentials"))
        .and(body_string_contains("scope=all-apis"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "t1", "expires_in": 3600})),
        )
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oidc/v1/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "t2", "expires_in": "3600"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let t = start_time();
    let clock = ManualClock::at(t);
    let store = CredentialStore::with_clock(client_credentials(&server), clock.clone()).unwrap();
    assert_eq!(store.kind(), "oauth-client-credentials");

    assert_eq!(store.resolve().await.unwrap().authorization, "Bearer t1");

    // Valid until T+3590 (expires_in minus the 10s margin).
    clock.set(t + Duration::seconds(3589));
    assert_eq!(store.resolve().await.unwrap().authorization, "Bearer t1");

    clock.set(t + Duration::seconds(3591));
    assert_eq!(store.resolve().await.unwrap().authorization, "Bearer t2");
    assert_eq!(store.resolve().await.unwrap().authorization, "Bearer t2");
}

#[tokio::test]
async fn test_concurrent_resolves_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oidc/v1/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "shared", "expires_in": 3600}))
                .set_delay(std::time::Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let store =
        CredentialStore::with_clock(client_credentials(&server), ManualClock::at(start_time()))
            .unwrap();

    let handles: Vec<_> = (0..8)
        .map(|_| {
            let store = store.clone();
            tokio::spawn(async move { store.resolve().await })
        })
        .collect();

    for handle in handles {
        let headers = handle.await.unwrap().unwrap();
        assert_eq!(headers.authorization, "Bearer shared");
    }
}

#[tokio::test]
async fn test_token_without_expiry_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oidc/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "forever"})))
        .expect(1)
        .mount(&server)
        .await;

    let t = start_time();
    let clock = ManualClock::at(t);
    let store = CredentialStore::with_clock(client_credentials(&server), clock.clone()).unwrap();

    assert_eq!(store.resolve().await.unwrap().authorization, "Bearer forever");
    clock.set(t + Duration::days(30));
    assert_eq!(store.resolve().await.unwrap().authorization, "Bearer forever");
}

#[tokio::test]
async fn test_unrepresentable_expiry_is_kept_without_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oidc/v1/token"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"access_token": "huge", "expires_in": 1e13})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let t = start_time();
    let clock = ManualClock::at(t);
    let store = CredentialStore::with_clock(client_credentials(&server), clock.clone()).unwrap();

    assert_eq!(store.resolve().await.unwrap().authorization, "Bearer huge");
    clock.set(t + Duration::days(3650));
    assert_eq!(store.resolve().await.unwrap().authorization, "Bearer huge");
}

#[tokio::test]
async fn test_rejected_credentials() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oidc/v1/token"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid_client"))
        .mount(&server)
        .await;

    let store =
        CredentialStore::with_clock(client_credentials(&server), ManualClock::at(start_time()))
            .unwrap();

    match store.resolve().await.unwrap_err() {
        Error::Authentication {
            endpoint,
            status,
            body,
        } => {
            assert!(endpoint.ends_with("/oidc/v1/token"));
            assert_eq!(status, Some(401));
            assert_eq!(body, "invalid_client");
        }
        other => panic!("expected authentication error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_access_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oidc/v1/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token_type": "Bearer"})))
        .mount(&server)
        .await;

    let store =
        CredentialStore::with_clock(client_credentials(&server), ManualClock::at(start_time()))
            .unwrap();

    let err = store.resolve().await.unwrap_err();
    assert!(matches!(err, Error::Authentication { status: Some(200), .. }));
}

#[tokio::test]
async fn test_personal_token_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let store = CredentialStore::with_clock(
        Credentials::PersonalToken {
            token: "dapi-123".to_string(),
        },
        ManualClock::at(start_time()),
    )
    .unwrap();

    assert_eq!(store.kind(), "personal-access-token");
    assert_eq!(store.resolve().await.unwrap().authorization, "Bearer dapi-123");
}
