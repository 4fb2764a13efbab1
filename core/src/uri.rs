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

//! The subset of URI structure that request signing needs.

use std::fmt;
use std::fmt::Write;

use log::debug;
use percent_encoding::percent_decode_str;
use percent_encoding::utf8_percent_encode;
use percent_encoding::AsciiSet;
use percent_encoding::NON_ALPHANUMERIC;

use crate::{Error, Result};

const SEPARATOR: &str = "://";

/// Default port of [`Scheme::Http`].
pub const HTTP_DEFAULT_PORT: u16 = 80;
/// Default port of [`Scheme::Https`].
pub const HTTPS_DEFAULT_PORT: u16 = 443;

/// Everything except alphanumerics and `-_.~` is escaped.
const URL_ENCODE_SET: AsciiSet = NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// [`URL_ENCODE_SET`] that also keeps `$&,/:;=@` as is.
///
/// This is not strict RFC 3986: servers expect these reserved characters
/// unescaped in path segments.
const RFC3986_PATH_ENCODE_SET: AsciiSet = URL_ENCODE_SET
    .remove(b'$')
    .remove(b'&')
    .remove(b',')
    .remove(b'/')
    .remove(b':')
    .remove(b';')
    .remove(b'=')
    .remove(b'@');

/// Percent encode `s` with the general unsafe-character rule.
pub fn url_encode(s: &str) -> String {
    utf8_percent_encode(s, &URL_ENCODE_SET).to_string()
}

/// Percent decode `s`, invalid utf-8 is replaced lossily.
pub fn url_decode(s: &str) -> String {
    percent_decode_str(s).decode_utf8_lossy().into_owned()
}

/// Scheme of a request URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Scheme {
    /// `http`
    #[default]
    Http,
    /// `https`
    Https,
}

impl Scheme {
    /// Parse scheme from its name.
    ///
    /// Anything other than `http` (after trimming and case folding) is
    /// treated as `https`.
    pub fn from_name(name: &str) -> Self {
        if name.trim().eq_ignore_ascii_case("http") {
            Scheme::Http
        } else {
            Scheme::Https
        }
    }

    /// The port used when the URI doesn't carry one.
    pub fn default_port(self) -> u16 {
        match self {
            Scheme::Http => HTTP_DEFAULT_PORT,
            Scheme::Https => HTTPS_DEFAULT_PORT,
        }
    }

    /// Lowercase name of this scheme.
    pub fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Uri keeps the parts of a request target that take part in signing.
///
/// - `path` is stored decoded and always starts with `/`.
/// - `query_string` is either empty or starts with `?`.
/// - `port` follows the scheme's default unless set explicitly or parsed.
///
/// Two URIs are equal when scheme, authority, path and query string are
/// equal. The port is not compared.
#[derive(Debug, Clone, Eq)]
pub struct Uri {
    scheme: Scheme,
    authority: String,
    port: u16,
    path: String,
    query_string: String,
}

impl Default for Uri {
    fn default() -> Self {
        Self {
            scheme: Scheme::Http,
            authority: String::new(),
            port: HTTP_DEFAULT_PORT,
            path: "/".to_string(),
            query_string: String::new(),
        }
    }
}

impl PartialEq for Uri {
    fn eq(&self, other: &Self) -> bool {
        self.scheme == other.scheme
            && self.authority == other.authority
            && self.path == other.path
            && self.query_string == other.query_string
    }
}

impl From<&str> for Uri {
    fn from(value: &str) -> Self {
        Uri::parse(value)
    }
}

impl Uri {
    /// Create an empty uri: `http`, port 80, path `/`, no authority.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse `scheme://authority[:port][/path][?query]`.
    ///
    /// Parsing never fails, missing parts keep their defaults.
    pub fn parse(uri: &str) -> Self {
        let mut u = Uri::default();

        let rest = match uri.find(SEPARATOR) {
            Some(pos) => {
                u.set_scheme(Scheme::from_name(&uri[..pos]));
                &uri[pos + SEPARATOR.len()..]
            }
            None => uri,
        };

        let authority_end = rest.find([':', '/', '?']).unwrap_or(rest.len());
        u.authority = rest[..authority_end].to_string();

        // The port only counts if `:` comes before any `/` or `?`.
        if let Some(after) = rest[authority_end..].strip_prefix(':') {
            let digits_end = after
                .find(|c: char| !c.is_ascii_digit())
                .unwrap_or(after.len());
            match after[..digits_end].parse::<u16>() {
                Ok(port) => u.port = port,
                Err(e) => debug!("ignore invalid port in {uri}: {e}"),
            }
        }

        let query_start = rest.find('?');
        let before_query = &rest[..query_start.unwrap_or(rest.len())];
        if let Some(path_start) = before_query.find('/') {
            u.path = before_query[path_start..].to_string();
        }
        if let Some(query_start) = query_start {
            u.query_string = rest[query_start..].to_string();
        }

        u
    }

    /// Scheme of this uri.
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Set the scheme.
    ///
    /// A port equal to the other scheme's default (or zero) follows the
    /// switch, an explicit port is kept.
    pub fn set_scheme(&mut self, scheme: Scheme) {
        let other = match scheme {
            Scheme::Http => Scheme::Https,
            Scheme::Https => Scheme::Http,
        };
        if self.port == other.default_port() || self.port == 0 {
            self.port = scheme.default_port();
        }
        self.scheme = scheme;
    }

    /// Host part without port.
    pub fn authority(&self) -> &str {
        &self.authority
    }

    /// Set the authority.
    pub fn set_authority(&mut self, authority: impl Into<String>) {
        self.authority = authority.into();
    }

    /// Port of this uri.
    pub fn port(&self) -> u16 {
        self.port
    }

    /// Set the port.
    pub fn set_port(&mut self, port: u16) {
        self.port = port;
    }

    /// Returns true if port is the scheme's default port.
    pub fn is_default_port(&self) -> bool {
        self.port == self.scheme.default_port()
    }

    /// Decoded path, always starts with `/`.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Set the decoded path, a leading `/` is added when missing.
    pub fn set_path(&mut self, path: impl Into<String>) {
        let path = path.into();
        self.path = if path.starts_with('/') {
            path
        } else {
            format!("/{path}")
        };
    }

    /// Path encoded with [`Uri::url_encode_path`].
    pub fn url_encoded_path(&self) -> String {
        Self::url_encode_path(&self.path)
    }

    /// Raw query string, either empty or starting with `?`.
    pub fn query_string(&self) -> &str {
        &self.query_string
    }

    /// Replace the query string, a leading `?` is added when missing.
    pub fn set_query_string(&mut self, query: &str) {
        self.query_string.clear();

        if query.is_empty() {
            return;
        }
        if !query.starts_with('?') {
            self.query_string.push('?');
        }
        self.query_string.push_str(query);
    }

    /// Query string without the leading `?`.
    pub fn form_parameters(&self) -> &str {
        self.query_string.strip_prefix('?').unwrap_or("")
    }

    /// Append `key=value` to the query string, both url encoded.
    pub fn add_query_parameter(&mut self, key: &str, value: &str) {
        self.query_string
            .push(if self.query_string.is_empty() { '?' } else { '&' });
        self.query_string.push_str(&url_encode(key));
        self.query_string.push('=');
        self.query_string.push_str(&url_encode(value));
    }

    /// Append all pairs via [`Uri::add_query_parameter`].
    pub fn add_query_parameters<K, V>(&mut self, pairs: impl IntoIterator<Item = (K, V)>)
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        for (k, v) in pairs {
            self.add_query_parameter(k.as_ref(), v.as_ref());
        }
    }

    /// Split the query string into `(key, value)` pairs sorted by key, then
    /// by value.
    ///
    /// The value is everything after the first `=`. A pair without `=` is
    /// taken as a key with an empty value, empty pairs are skipped.
    pub fn query_parameters(&self, decode: bool) -> Vec<(String, String)> {
        let mut params = self
            .form_parameters()
            .split('&')
            .filter(|pair| !pair.is_empty())
            .map(|pair| {
                let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
                if decode {
                    (url_decode(k), url_decode(v))
                } else {
                    (k.to_string(), v.to_string())
                }
            })
            .collect::<Vec<_>>();
        params.sort();

        params
    }

    /// Canonical form of the query string: `?k1=v1&k2=v2` sorted by
    /// `(key, value)`.
    ///
    /// A query string without any `=` is returned untouched.
    pub fn canonical_query_string(&self) -> String {
        if !self.query_string.contains('=') {
            return self.query_string.clone();
        }

        let mut s = String::with_capacity(self.query_string.len() + 1);
        for (idx, (k, v)) in self.query_parameters(false).into_iter().enumerate() {
            s.push(if idx == 0 { '?' } else { '&' });
            s.push_str(&k);
            s.push('=');
            s.push_str(&v);
        }

        s
    }

    /// Rewrite the query string into [`Uri::canonical_query_string`].
    ///
    /// The original parameter order is lost.
    pub fn canonicalize_query_string(&mut self) {
        self.query_string = self.canonical_query_string();
    }

    /// Serialize into `scheme://authority[:port][path][?query]`.
    ///
    /// The port only shows up when it's not the scheme's default, the path
    /// is encoded with [`Uri::url_encode_path_rfc3986`] and omitted when it's
    /// `/`.
    pub fn to_uri_string(&self, include_query: bool) -> Result<String> {
        if self.authority.is_empty() {
            return Err(Error::request_invalid(
                "uri without authority can't be serialized",
            ));
        }

        let mut s = String::with_capacity(64);
        write!(s, "{}{}{}", self.scheme, SEPARATOR, self.authority)?;
        if !self.is_default_port() {
            write!(s, ":{}", self.port)?;
        }
        if self.path != "/" {
            s.push_str(&Self::url_encode_path_rfc3986(&self.path));
        }
        if include_query {
            s.push_str(&self.query_string);
        }

        Ok(s)
    }

    /// Encode every `/` delimited segment of `path` with the general
    /// unsafe-character rule. A trailing `/` is kept, empty segments are
    /// dropped.
    ///
    /// This is the encoding used inside the canonical request.
    pub fn url_encode_path(path: &str) -> String {
        encode_path(path, &URL_ENCODE_SET)
    }

    /// Like [`Uri::url_encode_path`] but keeps `$&,/:;=@` unescaped.
    ///
    /// This is the encoding used on the wire.
    pub fn url_encode_path_rfc3986(path: &str) -> String {
        encode_path(path, &RFC3986_PATH_ENCODE_SET)
    }
}

fn encode_path(path: &str, set: &'static AsciiSet) -> String {
    if path.is_empty() {
        return String::new();
    }

    let mut s = String::with_capacity(path.len());
    for segment in path.split('/').filter(|v| !v.is_empty()) {
        s.push('/');
        s.extend(utf8_percent_encode(segment, set));
    }
    if path.ends_with('/') {
        s.push('/');
    }

    s
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    #[test_case("http://example.com", Scheme::Http, "example.com", 80, "/", ""; "http without path")]
    #[test_case("https://example.com/", Scheme::Https, "example.com", 443, "/", ""; "https root")]
    #[test_case("example.com/a/b", Scheme::Http, "example.com", 80, "/a/b", ""; "no scheme defaults to http")]
    #[test_case("ftp://example.com/a", Scheme::Https, "example.com", 443, "/a", ""; "unknown scheme becomes https")]
    #[test_case(" HTTP ://example.com", Scheme::Http, "example.com", 80, "/", ""; "scheme is trimmed and case folded")]
    #[test_case("http://example.com:8080/a?x=1", Scheme::Http, "example.com", 8080, "/a", "?x=1"; "explicit port")]
    #[test_case("https://example.com:80", Scheme::Https, "example.com", 80, "/", ""; "port overrides scheme default")]
    #[test_case("http://example.com?a=b", Scheme::Http, "example.com", 80, "/", "?a=b"; "query without path")]
    #[test_case("http://example.com/a:b", Scheme::Http, "example.com", 80, "/a:b", ""; "colon after slash is not a port")]
    #[test_case("http://example.com?x=a:1", Scheme::Http, "example.com", 80, "/", "?x=a:1"; "colon after question mark is not a port")]
    #[test_case("http://example.com:/a", Scheme::Http, "example.com", 80, "/a", ""; "empty port keeps default")]
    #[test_case("http://example.com/a/b?c=d?e", Scheme::Http, "example.com", 80, "/a/b", "?c=d?e"; "query starts at first question mark")]
    fn test_parse(
        input: &str,
        scheme: Scheme,
        authority: &str,
        port: u16,
        path: &str,
        query: &str,
    ) {
        let u = Uri::parse(input);

        assert_eq!(u.scheme(), scheme);
        assert_eq!(u.authority(), authority);
        assert_eq!(u.port(), port);
        assert_eq!(u.path(), path);
        assert_eq!(u.query_string(), query);
    }

    #[test_case("?a=&b=", "?a=&b="; "already sorted")]
    #[test_case("?b=&a=", "?a=&b="; "sorted by key")]
    #[test_case("?a=1&a=2", "?a=1&a=2"; "duplicate keys already sorted")]
    #[test_case("?a=2&a=1", "?a=1&a=2"; "duplicate keys sorted by value")]
    #[test_case("?b=1&a=3&a=1&a=2", "?a=1&a=2&a=3&b=1"; "many duplicate keys")]
    #[test_case("?a=1&a=1", "?a=1&a=1"; "equal pairs are kept")]
    #[test_case("?a=b=c", "?a=b=c"; "value keeps later equal signs")]
    #[test_case("?a&b", "?a&b"; "no equal sign is passthrough")]
    #[test_case("?b&a=1", "?a=1&b="; "pair without equal sign gets empty value")]
    #[test_case("", ""; "empty")]
    #[test_case("?", "?"; "only question mark")]
    fn test_canonicalize_query_string(input: &str, expected: &str) {
        let mut u = Uri::new();
        u.set_query_string(input);
        u.canonicalize_query_string();

        assert_eq!(u.query_string(), expected);
    }

    #[test]
    fn test_canonical_query_string_is_order_independent() {
        let pairs = ["a=1", "b=", "c=3", "a=0"];
        let expected = "?a=0&a=1&b=&c=3";

        for rotate in 0..pairs.len() {
            let mut ps = pairs.to_vec();
            ps.rotate_left(rotate);
            let u = Uri::parse(&format!("http://example.com/?{}", ps.join("&")));

            assert_eq!(u.canonical_query_string(), expected);
        }
    }

    #[test]
    fn test_query_parameters_decode() {
        let u = Uri::parse("http://example.com/?b=%2Fx&a%20b=c");

        assert_eq!(
            u.query_parameters(false),
            vec![
                ("a%20b".to_string(), "c".to_string()),
                ("b".to_string(), "%2Fx".to_string()),
            ]
        );
        assert_eq!(
            u.query_parameters(true),
            vec![
                ("a b".to_string(), "c".to_string()),
                ("b".to_string(), "/x".to_string()),
            ]
        );
    }

    #[test_case("/", "/", "/"; "root")]
    #[test_case("/a/b", "/a/b", "/a/b"; "plain")]
    #[test_case("/a/b/", "/a/b/", "/a/b/"; "trailing slash")]
    #[test_case("/a//b", "/a/b", "/a/b"; "empty segment dropped")]
    #[test_case("/hello world", "/hello%20world", "/hello%20world"; "space")]
    #[test_case("/a=b,c;d", "/a%3Db%2Cc%3Bd", "/a=b,c;d"; "reserved characters")]
    #[test_case("/$&:@", "/%24%26%3A%40", "/$&:@"; "more reserved characters")]
    #[test_case("/-_.~", "/-_.~", "/-_.~"; "unreserved characters")]
    #[test_case("/中", "/%E4%B8%AD", "/%E4%B8%AD"; "non ascii")]
    #[test_case("", "", ""; "empty")]
    fn test_url_encode_path(path: &str, legacy: &str, rfc3986: &str) {
        assert_eq!(Uri::url_encode_path(path), legacy);
        assert_eq!(Uri::url_encode_path_rfc3986(path), rfc3986);
    }

    #[test_case("http://example.com/", true, "http://example.com"; "root path omitted")]
    #[test_case("https://example.com:443/a b?x=1", true, "https://example.com/a%20b?x=1"; "default port omitted")]
    #[test_case("http://example.com:8080/a=b?x=1", false, "http://example.com:8080/a=b"; "custom port and no query")]
    fn test_to_uri_string(input: &str, include_query: bool, expected: &str) {
        let u = Uri::parse(input);

        assert_eq!(u.to_uri_string(include_query).unwrap(), expected);
    }

    #[test]
    fn test_to_uri_string_requires_authority() {
        let u = Uri::parse("/only/a/path");

        let err = u.to_uri_string(true).expect_err("empty authority must fail");
        assert_eq!(err.kind(), crate::ErrorKind::RequestInvalid);
    }

    #[test]
    fn test_set_scheme_moves_default_port() {
        let mut u = Uri::parse("http://example.com");
        u.set_scheme(Scheme::Https);
        assert_eq!(u.port(), 443);
        u.set_scheme(Scheme::Http);
        assert_eq!(u.port(), 80);

        u.set_port(8080);
        u.set_scheme(Scheme::Https);
        assert_eq!(u.port(), 8080);
    }

    #[test]
    fn test_setters() {
        let mut u = Uri::new();
        u.set_authority("example.com");
        u.set_path("a/b");
        assert_eq!(u.path(), "/a/b");

        u.set_query_string("x=1");
        assert_eq!(u.query_string(), "?x=1");
        assert_eq!(u.form_parameters(), "x=1");

        u.add_query_parameter("a b", "c/d");
        u.add_query_parameters([("e", "f")]);
        assert_eq!(u.query_string(), "?x=1&a%20b=c%2Fd&e=f");

        u.set_query_string("");
        assert_eq!(u.query_string(), "");
        u.add_query_parameter("k", "v");
        assert_eq!(u.query_string(), "?k=v");
    }

    #[test]
    fn test_equality_ignores_port() {
        let mut a = Uri::parse("http://example.com/a?x=1");
        let b = Uri::parse("http://example.com/a?x=1");
        a.set_port(8080);
        assert_eq!(a, b);

        assert_ne!(a, Uri::parse("https://example.com/a?x=1"));
        assert_ne!(a, Uri::parse("http://example.com/b?x=1"));
        assert_ne!(a, Uri::parse("http://example.com/a?x=2"));
        assert_ne!(a, Uri::parse("http://example.org/a?x=1"));
    }
}
