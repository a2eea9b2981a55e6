//! Expansion of `SegmentTemplate` URL patterns.
//!
//! Identifiers are delimited by `$` characters: `$RepresentationID$`, `$Number$`, `$Bandwidth$`,
//! `$Time$` and `$SubNumber$`. All but `RepresentationID` accept a zero-padded width format tag
//! such as `$Number%05d$` (at most two digits wide), and `$$` stands for a literal `$`.
//!
//! Expansion is lenient. An identifier whose variable is missing is left verbatim in the output, as
//! is an unrecognized identifier, and a trailing `$` without a closing partner leaves the remainder
//! of the pattern untouched. Use [`check_template`] to reject malformed patterns.

use lazy_static::lazy_static;
use regex::Regex;
use crate::DashMpdError;


lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^(?P<name>[A-Za-z]+)(?:%0(?P<width>\d{1,2})d)?$").unwrap();
}


/// The values available for substitution into a template, for one segment request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    representation_id: Option<String>,
    number: Option<u64>,
    bandwidth: Option<u64>,
    time: Option<u64>,
    sub_number: Option<u64>,
}

impl Variables {
    pub fn new(
        representation_id: Option<&str>,
        number: Option<u64>,
        bandwidth: Option<u64>,
        time: Option<u64>,
        sub_number: Option<u64>) -> Variables
    {
        Variables {
            representation_id: representation_id.map(String::from),
            number,
            bandwidth,
            time,
            sub_number,
        }
    }

    pub fn with_representation_id(mut self, id: impl Into<String>) -> Variables {
        self.representation_id = Some(id.into());
        self
    }

    /// The zero-based segment number (the stream's `@startNumber` is added at expansion time).
    pub fn with_number(mut self, number: u64) -> Variables {
        self.number = Some(number);
        self
    }

    pub fn with_bandwidth(mut self, bandwidth: u64) -> Variables {
        self.bandwidth = Some(bandwidth);
        self
    }

    /// The segment's presentation time, in timescale units.
    pub fn with_time(mut self, time: u64) -> Variables {
        self.time = Some(time);
        self
    }

    pub fn with_sub_number(mut self, sub_number: u64) -> Variables {
        self.sub_number = Some(sub_number);
        self
    }

    pub fn representation_id(&self) -> Option<&str> {
        self.representation_id.as_deref()
    }

    pub fn number(&self) -> Option<u64> {
        self.number
    }

    pub fn bandwidth(&self) -> Option<u64> {
        self.bandwidth
    }

    pub fn time(&self) -> Option<u64> {
        self.time
    }

    pub fn sub_number(&self) -> Option<u64> {
        self.sub_number
    }
}


/// One piece of an expanded template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token<'a> {
    /// Text copied from the pattern.
    Literal(&'a str),
    /// An identifier replaced by its value.
    Expanded(String),
    /// Pattern text left as-is because it could not be substituted.
    Unresolved(&'a str),
}

impl Token<'_> {
    pub fn as_str(&self) -> &str {
        match self {
            Token::Literal(s) | Token::Unresolved(s) => *s,
            Token::Expanded(s) => s.as_str(),
        }
    }
}

enum Substitution {
    Value(String),
    Missing,
    Unknown,
}

fn substitute(name: &str, vars: &Variables, start_number: Option<u64>) -> Substitution {
    let Some(caps) = IDENTIFIER.captures(name) else {
        return Substitution::Unknown;
    };
    let width = match caps.name("width").map(|w| w.as_str().parse::<usize>()) {
        None => None,
        Some(Ok(w)) => Some(w),
        Some(Err(_)) => return Substitution::Unknown,
    };
    let value = match &caps["name"] {
        "RepresentationID" => {
            if width.is_some() {
                return Substitution::Unknown;
            }
            return match vars.representation_id() {
                Some(id) => Substitution::Value(id.to_string()),
                None => Substitution::Missing,
            };
        },
        "Number" => vars.number.map(|n| n.saturating_add(start_number.unwrap_or(0))),
        "Bandwidth" => vars.bandwidth,
        "Time" => vars.time,
        "SubNumber" => vars.sub_number,
        _ => return Substitution::Unknown,
    };
    match value {
        Some(v) => Substitution::Value(format!("{v:0width$}", width = width.unwrap_or(1))),
        None => Substitution::Missing,
    }
}

/// Split `pattern` into literal text, substituted identifiers and unresolved identifiers.
///
/// `start_number` is added to the zero-based `number` variable; pass `None` to substitute the
/// number unchanged.
pub fn tokenize<'a>(pattern: &'a str, vars: &Variables, start_number: Option<u64>) -> Vec<Token<'a>> {
    let mut tokens = Vec::new();
    let mut rest = pattern;
    while !rest.is_empty() {
        let Some(open) = rest.find('$') else {
            tokens.push(Token::Literal(rest));
            break;
        };
        if open > 0 {
            tokens.push(Token::Literal(&rest[..open]));
        }
        let after = &rest[open + 1..];
        let Some(close) = after.find('$') else {
            tokens.push(Token::Unresolved(&rest[open..]));
            break;
        };
        let name = &after[..close];
        if name.is_empty() {
            tokens.push(Token::Literal(&rest[open..open + 1]));
            rest = &after[close + 1..];
            continue;
        }
        match substitute(name, vars, start_number) {
            Substitution::Value(v) => {
                tokens.push(Token::Expanded(v));
                rest = &after[close + 1..];
            },
            Substitution::Missing => {
                tokens.push(Token::Unresolved(&rest[open..open + close + 2]));
                rest = &after[close + 1..];
            },
            // The closing '$' may be the opening delimiter of a following identifier.
            Substitution::Unknown => {
                tokens.push(Token::Unresolved(&rest[open..open + close + 1]));
                rest = &after[close..];
            },
        }
    }
    tokens
}

/// Expand the identifiers in `pattern` with the values in `vars`.
pub fn expand(pattern: &str, vars: &Variables, start_number: Option<u64>) -> String {
    tokenize(pattern, vars, start_number)
        .iter()
        .map(Token::as_str)
        .collect()
}

/// Check that `pattern` only contains well-formed identifiers known to the DASH template syntax.
pub fn check_template(pattern: &str) -> Result<(), DashMpdError> {
    let mut rest = pattern;
    while let Some(open) = rest.find('$') {
        let after = &rest[open + 1..];
        let close = after.find('$')
            .ok_or_else(|| DashMpdError::Parsing(format!("unterminated $ in template {pattern:?}")))?;
        let name = &after[..close];
        if !name.is_empty() {
            let known = IDENTIFIER.captures(name).is_some_and(|caps| {
                match &caps["name"] {
                    "RepresentationID" => caps.name("width").is_none(),
                    "Number" | "Bandwidth" | "Time" | "SubNumber" => true,
                    _ => false,
                }
            });
            if !known {
                return Err(DashMpdError::Parsing(format!("invalid identifier ${name}$ in template {pattern:?}")));
            }
        }
        rest = &after[close + 1..];
    }
    Ok(())
}
