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

//! Personal access token authentication.

use crate::auth::AuthProvider;
use crate::error::Result;
use async_trait::async_trait;

/// Static bearer token. No network calls, no expiry.
#[derive(Clone)]
pub struct PersonalAccessToken {
    header: String,
}

impl std::fmt::Debug for PersonalAccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersonalAccessToken")
            .field("token", &"***")
            .finish()
    }
}

impl PersonalAccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            header: format!("Bearer {}", token.into()),
        }
    }
}

#[async_trait]
impl AuthProvider for PersonalAccessToken {
    async fn get_auth_header(&self) -> Result<String> {
        Ok(self.header.clone())
    }
}
