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

use std::collections::BTreeMap;
use std::io::{Seek, SeekFrom};

use log::{debug, error};
use rand::RngCore;

use jdsign_core::hash::{
    hex_hmac_sha256, hex_sha256, hex_sha256_reader, hmac_sha256, EMPTY_STRING_SHA256,
};
use jdsign_core::time::{format_date, format_iso8601, now, DateTime};
use jdsign_core::{Body, Error, Request, Result};

use crate::constants::*;
use crate::{Config, Credential};

/// RequestSigner that implements JDCLOUD2-HMAC-SHA256.
///
/// The signer holds no per-request state, one instance can sign any number
/// of requests, also from multiple threads.
#[derive(Debug, Clone)]
pub struct RequestSigner {
    service: String,
    region: String,

    time: Option<DateTime>,
    nonce: Option<String>,
}

impl RequestSigner {
    /// Create a new signer for `service` in `region`.
    pub fn new(service: &str, region: &str) -> Self {
        Self {
            service: service.into(),
            region: region.into(),

            time: None,
            nonce: None,
        }
    }

    /// Create a new signer for `service` with the region taken from config.
    pub fn from_config(service: &str, config: &Config) -> Result<Self> {
        let Some(region) = config.region.as_deref().filter(|v| !v.is_empty()) else {
            error!("region is not set in config");
            return Err(Error::config_invalid("region is required to build signer"));
        };

        Ok(Self::new(service, region))
    }

    /// Specify the signing time.
    ///
    /// # Note
    ///
    /// We should always take current time to sign requests.
    /// Only use this function for testing.
    pub fn with_time(mut self, time: DateTime) -> Self {
        self.time = Some(time);
        self
    }

    /// Specify the nonce.
    ///
    /// # Note
    ///
    /// A fresh nonce is generated for every request by default, reusing one
    /// makes requests replayable. Only use this function for testing.
    pub fn with_nonce(mut self, nonce: impl Into<String>) -> Self {
        self.nonce = Some(nonce.into());
        self
    }

    /// Service name used in the credential scope.
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Region used in the credential scope.
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Sign the request in place.
    ///
    /// On success `x-jdcloud-date`, `x-jdcloud-nonce` and `authorization`
    /// are set. The query string is rewritten into its canonical order.
    ///
    /// Anonymous credentials are rejected before the request is touched.
    /// Headers set before a later failure are left on the request.
    pub fn sign(&self, req: &mut Request, cred: &Credential) -> Result<()> {
        if !cred.is_valid() {
            error!("refuse to sign request with anonymous credential");
            return Err(Error::credential_invalid(
                "access key id and secret access key must not be empty",
            ));
        }

        let payload_hash = payload_hash(req)?;

        let now = self.time.unwrap_or_else(now);
        let nonce = self.nonce.clone().unwrap_or_else(generate_nonce);
        req.set_header(X_JDCLOUD_DATE, &format_iso8601(now));
        req.set_header(X_JDCLOUD_NONCE, &nonce);

        let headers = canonicalize_headers(req.headers());
        let (canonical_headers, signed_headers) = signed_headers(&headers);
        debug!("calculated canonical headers: {canonical_headers}");
        debug!("calculated signed headers: {signed_headers}");

        req.canonicalize();
        let creq =
            canonical_request_string(req, &canonical_headers, &signed_headers, &payload_hash);
        debug!("calculated canonical request: {creq}");

        // Scope: "20090213/<region>/<service>/jdcloud2_request"
        let scope = format!(
            "{}/{}/{}/{}",
            format_date(now),
            self.region,
            self.service,
            JDCLOUD2_REQUEST
        );
        debug!("calculated scope: {scope}");

        // StringToSign:
        //
        // JDCLOUD2-HMAC-SHA256
        // 20090213T233130Z
        // 20090213/<region>/<service>/jdcloud2_request
        // <hashed_canonical_request>
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            JDCLOUD2_HMAC_SHA256,
            format_iso8601(now),
            scope,
            hex_sha256(creq.as_bytes())
        );
        debug!("calculated string to sign: {string_to_sign}");

        let signing_key = generate_signing_key(
            cred.secret_access_key(),
            now,
            &self.region,
            &self.service,
        )
        .inspect_err(|e| error!("derive signing key failed: {e}"))?;
        let signature = hex_hmac_sha256(&signing_key, string_to_sign.as_bytes())
            .inspect_err(|e| error!("calculate signature failed: {e}"))?;

        let authorization = format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            JDCLOUD2_HMAC_SHA256,
            cred.access_key_id(),
            scope,
            signed_headers,
            signature
        );
        req.set_authorization(&authorization);
        debug!("calculated authorization for {}", cred.access_key_id());

        Ok(())
    }

    /// Sign an [`http::Request`] in place.
    ///
    /// The request is converted with [`Request::from_parts`], signed, and
    /// applied back, so the uri carries the canonical query afterwards.
    pub fn sign_http<B: AsRef<[u8]>>(
        &self,
        req: &mut http::Request<B>,
        cred: &Credential,
    ) -> Result<()> {
        let parts = http_parts(req);
        let mut signing = Request::from_parts(&parts)?;

        let body = req.body().as_ref();
        if !body.is_empty() {
            signing.set_body_bytes(body.to_vec());
        }

        self.sign(&mut signing, cred)?;

        let mut parts = parts;
        signing.apply(&mut parts)?;
        *req.method_mut() = parts.method;
        *req.uri_mut() = parts.uri;
        *req.headers_mut() = parts.headers;

        Ok(())
    }
}

/// Snapshot the head of a request without consuming its body.
fn http_parts<B>(req: &http::Request<B>) -> http::request::Parts {
    let (mut parts, _) = http::Request::new(()).into_parts();
    parts.method = req.method().clone();
    parts.uri = req.uri().clone();
    parts.version = req.version();
    parts.headers = req.headers().clone();
    parts
}

/// Hash the whole body, or use the empty string digest without one.
///
/// The body is read from its start and rewound afterwards.
fn payload_hash(req: &mut Request) -> Result<String> {
    let Some(body) = req.body_mut() else {
        debug!("using empty string sha256 because payload is empty");
        return Ok(EMPTY_STRING_SHA256.to_string());
    };

    hash_body(body).inspect_err(|e| error!("unable to hash request body: {e}"))
}

fn hash_body(mut body: &mut dyn Body) -> Result<String> {
    body.seek(SeekFrom::Start(0))
        .map_err(|e| Error::payload_hash("rewind request body failed").with_source(e))?;
    let hash = hex_sha256_reader(&mut body);
    body.seek(SeekFrom::Start(0))
        .map_err(|e| Error::payload_hash("rewind request body failed").with_source(e))?;

    hash
}

/// Canonicalize header values for signing.
///
/// Name and value are trimmed, multi-line values are folded into one line
/// joined by `,` and runs of spaces collapse into one.
pub fn canonicalize_headers(headers: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    headers
        .iter()
        .map(|(k, v)| (k.trim().to_string(), canonicalize_header_value(v)))
        .collect()
}

fn canonicalize_header_value(value: &str) -> String {
    let value = value.trim();
    let folded = if value.contains('\n') {
        value
            .split('\n')
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(",")
    } else {
        value.to_string()
    };

    let mut s = String::with_capacity(folded.len());
    for c in folded.chars() {
        if c == ' ' && s.ends_with(' ') {
            continue;
        }
        s.push(c);
    }
    s
}

/// Build the canonical headers block and the signed headers list.
fn signed_headers(headers: &BTreeMap<String, String>) -> (String, String) {
    let mut canonical = String::with_capacity(256);
    let mut names = Vec::with_capacity(headers.len());
    for (k, v) in headers
        .iter()
        .filter(|(k, _)| !UNSIGNED_HEADERS.contains(&k.as_str()))
    {
        canonical.push_str(k);
        canonical.push(':');
        canonical.push_str(v);
        canonical.push('\n');
        names.push(k.as_str());
    }

    (canonical, names.join(";"))
}

fn canonical_request_string(
    req: &Request,
    canonical_headers: &str,
    signed_headers: &str,
    payload_hash: &str,
) -> String {
    let mut f = String::with_capacity(256);

    // Insert method
    f.push_str(req.method().as_str());
    f.push('\n');
    // Insert encoded path
    f.push_str(&req.uri().url_encoded_path());
    f.push('\n');
    // Insert query
    let query = req.query_string();
    if query.len() > 1 {
        f.push_str(&query[1..]);
        if !query.contains('=') {
            f.push('=');
        }
    }
    f.push('\n');
    // Insert signed headers, the block already ends with a newline.
    f.push_str(canonical_headers);
    f.push('\n');
    f.push_str(signed_headers);
    f.push('\n');
    f.push_str(payload_hash);

    f
}

fn generate_signing_key(
    secret: &str,
    time: DateTime,
    region: &str,
    service: &str,
) -> Result<Vec<u8>> {
    // Sign secret
    let secret = format!("{JDCLOUD2_KEY_PREFIX}{secret}");
    // Sign date
    let sign_date = hmac_sha256(secret.as_bytes(), format_date(time).as_bytes())?;
    // Sign region
    let sign_region = hmac_sha256(&sign_date, region.as_bytes())?;
    // Sign service
    let sign_service = hmac_sha256(&sign_region, service.as_bytes())?;
    // Sign request
    hmac_sha256(&sign_service, JDCLOUD2_REQUEST.as_bytes())
}

/// 16 random bytes in lowercase hex.
fn generate_nonce() -> String {
    let mut bytes = [0u8; 16];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}
