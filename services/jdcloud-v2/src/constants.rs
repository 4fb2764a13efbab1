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

// Headers used in jdcloud services.
pub const X_JDCLOUD_DATE: &str = "x-jdcloud-date";
pub const X_JDCLOUD_NONCE: &str = "x-jdcloud-nonce";

/// Headers that never take part in signing.
pub const UNSIGNED_HEADERS: &[&str] = &["authorization", "user-agent"];

// Signing literals.
pub const JDCLOUD2_HMAC_SHA256: &str = "JDCLOUD2-HMAC-SHA256";
pub const JDCLOUD2_REQUEST: &str = "jdcloud2_request";
pub const JDCLOUD2_KEY_PREFIX: &str = "JDCLOUD2";

// Env values used in jdcloud services.
pub const JDCLOUD_ACCESS_KEY_ID: &str = "JDCLOUD_ACCESS_KEY_ID";
pub const JDCLOUD_SECRET_ACCESS_KEY: &str = "JDCLOUD_SECRET_ACCESS_KEY";
pub const JDCLOUD_REGION: &str = "JDCLOUD_REGION";
