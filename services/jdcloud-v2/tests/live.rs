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

use std::env;

use anyhow::Result;
use http::StatusCode;
use jdsign_core::{Context, OsEnv};
use jdsign_jdcloud_v2::{Config, Credential, RequestSigner};
use log::{debug, warn};
use reqwest::Client;

fn init_signing_test() -> Option<(RequestSigner, Credential, String)> {
    let _ = env_logger::builder().is_test(true).try_init();
    let _ = dotenv::dotenv();

    if env::var("JDSIGN_JDCLOUD_V2_TEST").ok().as_deref() != Some("on") {
        return None;
    }

    let ctx = Context::new().with_env(OsEnv);
    let config = Config::default().from_env(&ctx);
    let cred = config
        .credential()
        .expect("JDCLOUD_ACCESS_KEY_ID and JDCLOUD_SECRET_ACCESS_KEY must be set");
    let service = env::var("JDSIGN_JDCLOUD_V2_SERVICE").unwrap_or_else(|_| "vm".to_string());
    let signer = RequestSigner::from_config(&service, &config).expect("JDCLOUD_REGION must be set");
    let url = env::var("JDSIGN_JDCLOUD_V2_URL").expect("JDSIGN_JDCLOUD_V2_URL must be set");

    Some((signer, cred, url))
}

async fn send(req: http::Request<Vec<u8>>) -> Result<(StatusCode, String)> {
    let req = reqwest::Request::try_from(req)?;
    let resp = Client::new().execute(req).await?;

    let status = resp.status();
    let text = resp.text().await?;
    debug!("got response: {status} {text}");
    Ok((status, text))
}

#[tokio::test]
async fn test_list_instances() -> Result<()> {
    let Some((signer, cred, url)) = init_signing_test() else {
        warn!("JDSIGN_JDCLOUD_V2_TEST is not set, skipped");
        return Ok(());
    };

    let mut req = http::Request::get(format!(
        "{url}/v1/regions/{}/instances?pageSize=10&pageNumber=1",
        signer.region()
    ))
    .header("content-type", "application/json")
    .header("user-agent", "jdsign-jdcloud-v2")
    .body(Vec::new())?;
    signer.sign_http(&mut req, &cred)?;

    let (status, _) = send(req).await?;
    assert_eq!(StatusCode::OK, status);
    Ok(())
}

#[tokio::test]
async fn test_list_instances_with_invalid_secret() -> Result<()> {
    let Some((signer, cred, url)) = init_signing_test() else {
        warn!("JDSIGN_JDCLOUD_V2_TEST is not set, skipped");
        return Ok(());
    };
    let cred = Credential::new(cred.access_key_id(), "invalid_secret_access_key");

    let mut req = http::Request::get(format!(
        "{url}/v1/regions/{}/instances",
        signer.region()
    ))
    .body(Vec::new())?;
    signer.sign_http(&mut req, &cred)?;

    let (status, _) = send(req).await?;
    assert_ne!(StatusCode::OK, status);
    Ok(())
}
