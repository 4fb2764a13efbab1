// Licensed to the Apache Software Foundation (ASF) under one
// or more contributor license agreements.  See the NOTICE file
// distributed with this work for additional information
// regarding copyright ownership.  The ASF licenses this file
// to you under the Apache License, Version 2.0 (the
// "License"); you may not use this file except in compliance
// with the License.  You may obtain a copy of the License at
//
//   http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing,
// software distributed under the License is distributed on an
// "AS IS" BASIS, WITHOUT WARRANTIES OR CONDITIONS OF ANY
// KIND, either express or implied.  See the License for the
// specific language governing permissions and limitations
// under the License.

use std::fmt::{Debug, Formatter};

use jdsign_core::utils::Redact;
use jdsign_core::Context;

use crate::constants::*;
use crate::Credential;

/// Config for jdcloud services.
#[derive(Clone, Default)]
pub struct Config {
    /// Region like `cn-north-1`.
    pub region: Option<String>,
    /// Access key id.
    pub access_key_id: Option<String>,
    /// Secret access key.
    pub secret_access_key: Option<String>,
}

impl Debug for Config {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("region", &self.region)
            .field("access_key_id", &Redact::from(&self.access_key_id))
            .field("secret_access_key", &Redact::from(&self.secret_access_key))
            .finish()
    }
}

impl Config {
    /// Load config from environment variables.
    ///
    /// Values already set are kept.
    pub fn from_env(mut self, ctx: &Context) -> Self {
        if let Some(v) = ctx.env_var(JDCLOUD_REGION) {
            self.region.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(JDCLOUD_ACCESS_KEY_ID) {
            self.access_key_id.get_or_insert(v);
        }
        if let Some(v) = ctx.env_var(JDCLOUD_SECRET_ACCESS_KEY) {
            self.secret_access_key.get_or_insert(v);
        }

        self
    }

    /// Build the credential if both keys are present.
    pub fn credential(&self) -> Option<Credential> {
        match (&self.access_key_id, &self.secret_access_key) {
            (Some(ak), Some(sk)) => Some(Credential::new(ak, sk)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use jdsign_core::StaticEnv;

    fn ctx() -> Context {
        Context::new().with_env(StaticEnv {
            envs: HashMap::from([
                (JDCLOUD_REGION.to_string(), "cn-north-1".to_string()),
                (JDCLOUD_ACCESS_KEY_ID.to_string(), "env_ak".to_string()),
                (JDCLOUD_SECRET_ACCESS_KEY.to_string(), "env_sk".to_string()),
            ]),
        })
    }

    #[test]
    fn test_from_env() {
        let cfg = Config::default().from_env(&ctx());

        assert_eq!(cfg.region.as_deref(), Some("cn-north-1"));
        assert_eq!(cfg.credential(), Some(Credential::new("env_ak", "env_sk")));
    }

    #[test]
    fn test_from_env_keeps_explicit_values() {
        let cfg = Config {
            region: Some("cn-east-2".to_string()),
            access_key_id: Some("ak".to_string()),
            ..Default::default()
        }
        .from_env(&ctx());

        assert_eq!(cfg.region.as_deref(), Some("cn-east-2"));
        assert_eq!(cfg.credential(), Some(Credential::new("ak", "env_sk")));
    }

    #[test]
    fn test_credential_requires_both_keys() {
        let cfg = Config {
            access_key_id: Some("ak".to_string()),
            ..Default::default()
        };

        assert_eq!(cfg.credential(), None);
    }

    #[test]
    fn test_debug_redacts_secret() {
        let cfg = Config {
            secret_access_key: Some("secret_access_key_value".to_string()),
            ..Default::default()
        }
        .from_env(&Context::new());

        assert!(!format!("{cfg:?}").contains("secret_access_key_value"));
    }
}
