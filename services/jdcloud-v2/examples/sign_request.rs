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

use anyhow::Result;
use http::Method;
use jdsign_core::{Context, OsEnv, Request};
use jdsign_jdcloud_v2::{Config, Credential, RequestSigner};

fn main() -> Result<()> {
    let _ = env_logger::builder().try_init();

    // Credentials come from JDCLOUD_* env vars, with placeholders as fallback.
    let config = Config {
        region: Some("cn-north-1".to_string()),
        ..Default::default()
    }
    .from_env(&Context::new().with_env(OsEnv));
    let cred = config
        .credential()
        .unwrap_or_else(|| Credential::new("access_key_id", "secret_access_key"));
    let signer = RequestSigner::from_config("vm", &config)?;

    let mut get = Request::new(
        "https://vm.jdcloud-api.com/v1/regions/cn-north-1/instances?pageSize=10&pageNumber=1",
        Method::GET,
    );
    get.set_header("content-type", "application/json");
    get.set_header("user-agent", "JdcloudSdkRust/0.1.0");
    signer.sign(&mut get, &cred)?;
    print_request(&get)?;

    let mut post = Request::new(
        "https://vm.jdcloud-api.com/v1/regions/cn-north-1/instances/i-example:stop",
        Method::POST,
    );
    post.set_header("content-type", "application/json");
    post.set_body_bytes(r#"{"instanceId":"i-example"}"#);
    signer.sign(&mut post, &cred)?;
    print_request(&post)?;

    Ok(())
}

fn print_request(req: &Request) -> Result<()> {
    println!("{} {}", req.method(), req.uri_string(true)?);
    for (k, v) in req.headers() {
        println!("{k}: {v}");
    }
    println!();
    Ok(())
}
