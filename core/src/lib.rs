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

//! Core components for signing API requests.
//!
//! This crate provides the service independent pieces that signers are
//! built from.
//!
//! ## Overview
//!
//! - **Uri**: the subset of URI structure that signing needs, with the
//!   canonical query string and the two path encodings.
//! - **Request**: method, uri, normalized headers and an optional body
//!   stream, convertible from and to [`http::request::Parts`].
//! - **Context**: a container for the environment used while loading config.
//!
//! ## Example
//!
//! ```
//! use jdsign_core::{Request, Uri};
//!
//! let mut req = Request::new("http://example.com/?b=2&a=1", http::Method::GET);
//! req.set_header("Content-Type", " application/json ");
//! req.canonicalize();
//!
//! assert_eq!(req.query_string(), "?a=1&b=2");
//! assert_eq!(req.header("host"), Some("example.com"));
//! assert_eq!(Uri::url_encode_path("/a b/"), "/a%20b/");
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod uri;
pub mod utils;

mod context;
pub use context::Context;
mod env;
pub use env::{Env, NoopEnv, OsEnv, StaticEnv};
mod error;
pub use error::{Error, ErrorKind, Result};
mod request;
pub use request::{Body, Request};
pub use uri::{Scheme, Uri};
