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
use std::fmt::{Debug, Formatter};
use std::io::{Cursor, Read, Seek};

use bytes::Bytes;
use http::header::{HeaderName, AUTHORIZATION, HOST};
use http::request::Parts;
use http::{HeaderValue, Method};

use crate::uri::{url_decode, Uri};
use crate::{Error, Result};

/// Body is a readable and seekable payload.
///
/// The signer reads it from the start for hashing and rewinds it
/// afterwards. To share one stream between a request and its sender, wrap
/// it in a handle that implements `Read + Seek` itself.
pub trait Body: Read + Seek + Send {}

impl<T: Read + Seek + Send> Body for T {}

/// Request to be signed.
///
/// Header names are stored lower-cased and values trimmed, iteration is in
/// ascending name order.
pub struct Request {
    method: Method,
    uri: Uri,
    headers: BTreeMap<String, String>,
    body: Option<Box<dyn Body>>,
}

impl Debug for Request {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.method)
            .field("uri", &self.uri)
            .field("headers", &self.headers)
            .field("body", &self.body.as_ref().map(|_| "<body>"))
            .finish()
    }
}

impl Request {
    /// Create a new request, the `host` header is populated from `uri`.
    ///
    /// `host` is the authority alone on the scheme's default port, and
    /// `authority:port` otherwise.
    pub fn new(uri: impl Into<Uri>, method: Method) -> Self {
        let uri = uri.into();
        let host = if uri.is_default_port() {
            uri.authority().to_string()
        } else {
            format!("{}:{}", uri.authority(), uri.port())
        };

        let mut req = Self {
            method,
            uri,
            headers: BTreeMap::new(),
            body: None,
        };
        req.set_header(HOST.as_str(), &host);
        req
    }

    /// Build a request from http::request::Parts.
    ///
    /// The wire path is percent decoded, repeated header values are trimmed
    /// and joined with `,`.
    pub fn from_parts(parts: &Parts) -> Result<Self> {
        if parts.uri.authority().is_none() {
            return Err(Error::request_invalid(
                "request without authority is invalid for signing",
            ));
        }

        let mut uri = Uri::parse(&parts.uri.to_string());
        let path = url_decode(uri.path());
        uri.set_path(path);

        let mut req = Request::new(uri, parts.method.clone());
        for name in parts.headers.keys() {
            let values = parts
                .headers
                .get_all(name)
                .iter()
                .map(|v| v.to_str().map(str::trim))
                .collect::<std::result::Result<Vec<_>, _>>()?;
            req.set_header(name.as_str(), &values.join(","));
        }

        Ok(req)
    }

    /// Apply the request back to http::request::Parts.
    ///
    /// All headers are written back, `authorization` is marked sensitive.
    /// The uri is replaced by [`Request::uri_string`].
    pub fn apply(&self, parts: &mut Parts) -> Result<()> {
        for (k, v) in &self.headers {
            let mut value = HeaderValue::from_str(v)?;
            if k == AUTHORIZATION.as_str() {
                value.set_sensitive(true);
            }
            parts
                .headers
                .insert(HeaderName::from_bytes(k.as_bytes())?, value);
        }

        parts.method = self.method.clone();
        parts.uri = self.uri_string(true)?.parse()?;

        Ok(())
    }

    /// HTTP method.
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Uri of this request.
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    /// Uri of this request with mutation access.
    pub fn uri_mut(&mut self) -> &mut Uri {
        &mut self.uri
    }

    /// Serialize the uri, see [`Uri::to_uri_string`].
    pub fn uri_string(&self, include_query: bool) -> Result<String> {
        self.uri.to_uri_string(include_query)
    }

    /// Raw query string of the uri.
    pub fn query_string(&self) -> &str {
        self.uri.query_string()
    }

    /// All headers in ascending name order.
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Get header value by name, the lookup is case-insensitive.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&header_key(name))
            .map(String::as_str)
    }

    /// Returns true if the header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.headers.contains_key(&header_key(name))
    }

    /// Set a header, the name is trimmed and lower-cased, the value trimmed.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers
            .insert(header_key(name), value.trim().to_string());
    }

    /// Remove a header, returns the old value if any.
    pub fn remove_header(&mut self, name: &str) -> Option<String> {
        self.headers.remove(&header_key(name))
    }

    /// Set the `authorization` header.
    pub fn set_authorization(&mut self, value: &str) {
        self.set_header(AUTHORIZATION.as_str(), value)
    }

    /// Sum of all header name and value lengths in bytes.
    pub fn size(&self) -> usize {
        self.headers.iter().map(|(k, v)| k.len() + v.len()).sum()
    }

    /// Set the body stream.
    pub fn set_body(&mut self, body: impl Body + 'static) {
        self.body = Some(Box::new(body));
    }

    /// Set an in-memory body.
    pub fn set_body_bytes(&mut self, body: impl Into<Bytes>) {
        self.set_body(Cursor::new(body.into()))
    }

    /// Returns true if the request carries a body.
    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Body stream with mutation access.
    pub fn body_mut(&mut self) -> Option<&mut (dyn Body + 'static)> {
        self.body.as_deref_mut()
    }

    /// Take the body out of the request.
    pub fn take_body(&mut self) -> Option<Box<dyn Body>> {
        self.body.take()
    }

    /// Normalize the request for signing.
    ///
    /// The query string is rewritten into its canonical form in place, see
    /// [`Uri::canonicalize_query_string`].
    pub fn canonicalize(&mut self) {
        self.uri.canonicalize_query_string()
    }
}

fn header_key(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}
