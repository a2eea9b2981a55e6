//! Decomposition of URI references into their components, reference resolution against a base URI
//! as described in RFC 3986 section 5, and syntax-based normalization.
//!
//! Components are stored in a canonical percent-encoded form: escapes for unreserved characters are
//! decoded, remaining escapes use uppercase hex digits, and characters that are not allowed in a
//! component are escaped. Serializing with `Display` and reparsing is therefore lossless.

use std::fmt;
use std::str::FromStr;
use std::borrow::Cow;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use url::Url;
use crate::{DashMpdError, parse_error};


// unreserved = ALPHA / DIGIT / "-" / "." / "_" / "~"
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

// sub-delims = "!" / "$" / "&" / "'" / "(" / ")" / "*" / "+" / "," / ";" / "="
const SUB_DELIMS: &AsciiSet = &UNRESERVED
    .remove(b'!')
    .remove(b'$')
    .remove(b'&')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')')
    .remove(b'*')
    .remove(b'+')
    .remove(b',')
    .remove(b';')
    .remove(b'=');

const USERINFO: &AsciiSet = &SUB_DELIMS.remove(b':');
const HOST: &AsciiSet = SUB_DELIMS;
const PATH_SEGMENT: &AsciiSet = &SUB_DELIMS.remove(b':').remove(b'@');
const QUERY: &AsciiSet = &PATH_SEGMENT.remove(b'/').remove(b'?');
const FRAGMENT: &AsciiSet = QUERY;


/// Returns the port implied by a scheme when the authority does not specify one.
pub fn default_port(scheme: &str) -> Option<u16> {
    if scheme.eq_ignore_ascii_case("http") {
        Some(80)
    } else if scheme.eq_ignore_ascii_case("https") {
        Some(443)
    } else {
        None
    }
}

fn is_unreserved(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'.' | b'_' | b'~')
}

// Bring a component into canonical percent-encoded form.
fn canonical(s: &str, allowed: &'static AsciiSet) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(pos) = rest.find('%') {
        out.extend(utf8_percent_encode(&rest[..pos], allowed));
        let tail = &rest[pos + 1..];
        let escaped = tail.get(..2)
            .filter(|h| h.bytes().all(|b| b.is_ascii_hexdigit()))
            .and_then(|h| u8::from_str_radix(h, 16).ok());
        match escaped {
            Some(b) if is_unreserved(b) => {
                out.push(char::from(b));
                rest = &tail[2..];
            },
            Some(b) => {
                out.push_str(&format!("%{b:02X}"));
                rest = &tail[2..];
            },
            None => {
                out.push_str("%25");
                rest = tail;
            },
        }
    }
    out.extend(utf8_percent_encode(rest, allowed));
    out
}

fn is_scheme(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() => (),
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

// Lowercase everything except the hex digits of percent escapes, which stay uppercase.
fn lowercase_host(host: &str) -> String {
    let mut out = String::with_capacity(host.len());
    let mut escape = 0;
    for c in host.chars() {
        if escape > 0 {
            out.push(c);
            escape -= 1;
        } else if c == '%' {
            out.push(c);
            escape = 2;
        } else {
            out.push(c.to_ascii_lowercase());
        }
    }
    out
}

/// Remove "." and ".." segments from a path.
///
/// A ".." segment pops the previous output segment, and is dropped if there is nothing left to pop.
/// Empty segments are dropped except in first position (which marks an absolute path) and in last
/// position (a trailing slash). A final "." or ".." leaves a trailing slash, so that "/a/b/.."
/// becomes "/a/".
///
/// A rootless path stays rootless: "a/../b" becomes "b" and "a/.." becomes the empty path, where
/// the literal algorithm of RFC 3986 §5.2.4 would give "/b" and "/". Rootless paths only arise
/// from a relative base, which is later joined onto the manifest URL, and a leading "/" would make
/// that join discard the manifest's directory.
pub fn remove_dot_segments(path: &[String]) -> Vec<String> {
    let absolute = path.len() > 1 && path[0].is_empty();
    let root = usize::from(absolute);
    let mut out: Vec<String> = Vec::with_capacity(path.len());
    if absolute {
        out.push(String::new());
    }
    let last = path.len().saturating_sub(1);
    for (i, segment) in path.iter().enumerate().skip(root) {
        match segment.as_str() {
            "." | "" => (),
            ".." => {
                if out.len() > root {
                    out.pop();
                }
            },
            _ => out.push(segment.clone()),
        }
        if i == last && matches!(segment.as_str(), "." | ".." | "") {
            out.push(String::new());
        }
    }
    if out.len() == 1 && out[0].is_empty() {
        out.clear();
    }
    out
}


/// A URI reference split into its components.
///
/// The authority is present iff `host()` returns `Some` (possibly an empty host, as in
/// `file:///tmp/x`). The path is kept as a sequence of segments: an absolute path starts with an
/// empty segment and a trailing slash produces a final empty segment.
#[derive(Debug, Clone, Default)]
pub struct UriComponents {
    scheme: Option<String>,
    userinfo: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    path: Vec<String>,
    query: Option<String>,
    fragment: Option<String>,
}

impl UriComponents {
    /// Parse a URI or relative reference.
    pub fn parse(s: &str) -> Result<UriComponents, DashMpdError> {
        let s = s.trim();
        if let Some(c) = s.chars().find(|c| c.is_control()) {
            return Err(DashMpdError::Parsing(format!("unexpected character {c:?} in URI {s:?}")));
        }
        let mut uri = UriComponents::default();
        let mut rest = s;
        if let Some(idx) = rest.find(':') {
            if is_scheme(&rest[..idx]) {
                uri.scheme = Some(rest[..idx].to_string());
                rest = &rest[idx + 1..];
            }
        }
        if let Some(idx) = rest.find('#') {
            uri.fragment = Some(canonical(&rest[idx + 1..], FRAGMENT));
            rest = &rest[..idx];
        }
        if let Some(idx) = rest.find('?') {
            uri.query = Some(canonical(&rest[idx + 1..], QUERY));
            rest = &rest[..idx];
        }
        if let Some(after) = rest.strip_prefix("//") {
            let end = after.find('/').unwrap_or(after.len());
            uri.parse_authority(&after[..end])?;
            rest = &after[end..];
        }
        if !rest.is_empty() {
            uri.path = rest.split('/')
                .map(|segment| canonical(segment, PATH_SEGMENT))
                .collect();
        }
        Ok(uri)
    }

    fn parse_authority(&mut self, authority: &str) -> Result<(), DashMpdError> {
        let hostport = match authority.rfind('@') {
            Some(idx) => {
                self.userinfo = Some(canonical(&authority[..idx], USERINFO));
                &authority[idx + 1..]
            },
            None => authority,
        };
        let port = if hostport.starts_with('[') {
            let close = hostport.find(']')
                .ok_or_else(|| DashMpdError::Parsing(format!("unterminated IP literal in {authority:?}")))?;
            self.host = Some(hostport[..=close].to_string());
            let after = &hostport[close + 1..];
            if after.is_empty() {
                None
            } else if let Some(p) = after.strip_prefix(':') {
                Some(p)
            } else {
                return Err(DashMpdError::Parsing(format!("unexpected text {after:?} after IP literal")));
            }
        } else {
            match hostport.rfind(':') {
                Some(idx) => {
                    self.host = Some(canonical(&hostport[..idx], HOST));
                    Some(&hostport[idx + 1..])
                },
                None => {
                    self.host = Some(canonical(hostport, HOST));
                    None
                },
            }
        };
        self.port = match port {
            None | Some("") => None,
            Some(p) if p.bytes().all(|b| b.is_ascii_digit()) => Some(
                p.parse::<u16>().map_err(|e| parse_error("parsing URI port", e))?),
            Some(p) => return Err(DashMpdError::Parsing(format!("non-numeric port {p:?}"))),
        };
        Ok(())
    }

    pub fn scheme(&self) -> Option<&str> {
        self.scheme.as_deref()
    }

    pub fn userinfo(&self) -> Option<&str> {
        self.userinfo.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    /// The port declared in the authority, or the default port for the scheme.
    pub fn port(&self) -> Option<u16> {
        self.port.or_else(|| self.scheme.as_deref().and_then(default_port))
    }

    /// The port exactly as declared in the authority.
    pub fn explicit_port(&self) -> Option<u16> {
        self.port
    }

    /// The path segments, in canonical percent-encoded form.
    pub fn path_segments(&self) -> &[String] {
        &self.path
    }

    /// The path, in canonical percent-encoded form.
    pub fn path(&self) -> String {
        self.path.join("/")
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn fragment(&self) -> Option<&str> {
        self.fragment.as_deref()
    }

    pub fn decoded_query(&self) -> Option<Cow<'_, str>> {
        self.query.as_deref().map(|q| percent_decode_str(q).decode_utf8_lossy())
    }

    pub fn decoded_fragment(&self) -> Option<Cow<'_, str>> {
        self.fragment.as_deref().map(|f| percent_decode_str(f).decode_utf8_lossy())
    }

    pub fn decoded_path_segments(&self) -> Vec<Cow<'_, str>> {
        self.path.iter()
            .map(|s| percent_decode_str(s).decode_utf8_lossy())
            .collect()
    }

    /// Whether this is an absolute URI (it has a scheme).
    pub fn is_absolute(&self) -> bool {
        self.scheme.is_some()
    }

    pub fn has_authority(&self) -> bool {
        self.host.is_some()
    }

    fn has_absolute_path(&self) -> bool {
        self.path.len() > 1 && self.path[0].is_empty()
    }

    // RFC 3986 section 5.2.3
    fn merge_paths(&self, reference: &[String]) -> Vec<String> {
        if self.has_authority() && self.path.is_empty() {
            let mut merged = vec![String::new()];
            merged.extend(reference.iter().cloned());
            merged
        } else {
            let keep = self.path.len().saturating_sub(1);
            let mut merged: Vec<String> = self.path[..keep].to_vec();
            merged.extend(reference.iter().cloned());
            merged
        }
    }

    /// Resolve `reference` against this URI as a base, following RFC 3986 section 5.2.2.
    pub fn resolve(&self, reference: &UriComponents) -> UriComponents {
        let mut target = UriComponents::default();
        if reference.scheme.is_some() {
            target.scheme = reference.scheme.clone();
            target.userinfo = reference.userinfo.clone();
            target.host = reference.host.clone();
            target.port = reference.port;
            target.path = remove_dot_segments(&reference.path);
            target.query = reference.query.clone();
        } else {
            if reference.has_authority() {
                target.userinfo = reference.userinfo.clone();
                target.host = reference.host.clone();
                target.port = reference.port;
                target.path = remove_dot_segments(&reference.path);
                target.query = reference.query.clone();
            } else {
                if reference.path.is_empty() {
                    target.path = self.path.clone();
                    target.query = reference.query.clone().or_else(|| self.query.clone());
                } else {
                    if reference.has_absolute_path() {
                        target.path = remove_dot_segments(&reference.path);
                    } else {
                        target.path = remove_dot_segments(&self.merge_paths(&reference.path));
                    }
                    target.query = reference.query.clone();
                }
                target.userinfo = self.userinfo.clone();
                target.host = self.host.clone();
                target.port = self.port;
            }
            target.scheme = self.scheme.clone();
        }
        target.fragment = reference.fragment.clone();
        target
    }

    /// Parse `reference` and resolve it against this URI.
    pub fn join(&self, reference: &str) -> Result<UriComponents, DashMpdError> {
        let reference = UriComponents::parse(reference)?;
        Ok(self.resolve(&reference))
    }

    /// Syntax-based normalization: lowercase scheme and host, and remove dot segments.
    pub fn normalize(&self) -> UriComponents {
        UriComponents {
            scheme: self.scheme.as_ref().map(|s| s.to_ascii_lowercase()),
            host: self.host.as_deref().map(lowercase_host),
            path: remove_dot_segments(&self.path),
            ..self.clone()
        }
    }

    /// Convert to a `url::Url`, for interoperability with HTTP client libraries.
    pub fn to_url(&self) -> Result<Url, DashMpdError> {
        Url::parse(&self.to_string())
            .map_err(|e| parse_error("converting URI to Url", e))
    }
}

impl FromStr for UriComponents {
    type Err = DashMpdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        UriComponents::parse(s)
    }
}

impl TryFrom<&Url> for UriComponents {
    type Error = DashMpdError;

    fn try_from(url: &Url) -> Result<Self, Self::Error> {
        UriComponents::parse(url.as_str())
    }
}

impl fmt::Display for UriComponents {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(scheme) = &self.scheme {
            write!(f, "{scheme}:")?;
        }
        if let Some(host) = &self.host {
            f.write_str("//")?;
            if let Some(userinfo) = &self.userinfo {
                write!(f, "{userinfo}@")?;
            }
            f.write_str(host)?;
            if let Some(port) = self.port {
                write!(f, ":{port}")?;
            }
            if !self.path.is_empty() && !self.path[0].is_empty() {
                f.write_str("/")?;
            }
        } else if self.path.len() > 2 && self.path[0].is_empty() && self.path[1].is_empty() {
            // "//x" without an authority would read back as an authority
            f.write_str("/.")?;
        }
        f.write_str(&self.path.join("/"))?;
        if let Some(query) = &self.query {
            write!(f, "?{query}")?;
        }
        if let Some(fragment) = &self.fragment {
            write!(f, "#{fragment}")?;
        }
        Ok(())
    }
}

fn eq_ignore_case(a: Option<&str>, b: Option<&str>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a.eq_ignore_ascii_case(b),
        (None, None) => true,
        _ => false,
    }
}

impl PartialEq for UriComponents {
    fn eq(&self, other: &Self) -> bool {
        eq_ignore_case(self.scheme(), other.scheme()) &&
            eq_ignore_case(self.host(), other.host()) &&
            self.userinfo == other.userinfo &&
            self.port() == other.port() &&
            remove_dot_segments(&self.path) == remove_dot_segments(&other.path) &&
            self.query == other.query &&
            self.fragment == other.fragment
    }
}

impl Eq for UriComponents {}
