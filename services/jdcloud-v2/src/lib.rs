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

//! JD Cloud JDCLOUD2-HMAC-SHA256 signer.
//!
//! ## Example
//!
//! ```
//! use jdsign_core::Request;
//! use jdsign_jdcloud_v2::{Credential, RequestSigner};
//!
//! let signer = RequestSigner::new("vm", "cn-north-1");
//! let cred = Credential::new("access_key_id", "secret_access_key");
//!
//! let mut req = Request::new(
//!     "https://vm.jdcloud-api.com/v1/regions/cn-north-1/instances",
//!     http::Method::GET,
//! );
//! signer.sign(&mut req, &cred).expect("sign must succeed");
//!
//! assert!(req.header("authorization").unwrap().starts_with("JDCLOUD2-HMAC-SHA256 "));
//! ```

mod constants;
pub use constants::{X_JDCLOUD_DATE, X_JDCLOUD_NONCE};

mod config;
pub use config::Config;
mod credential;
pub use credential::Credential;
mod sign_request;
pub use sign_request::canonicalize_headers;
pub use sign_request::RequestSigner;
