//! The BaseURL cascade: computes the list of base URLs in effect at each node of the manifest.
//!
//! A node that declares no `BaseURL` element inherits the list of its parent. Declared BaseURLs
//! that are absolute are used as-is; relative ones are resolved against the first base URL of the
//! parent only, not against every parent base URL. The root of the cascade is the URL from which
//! the manifest was retrieved, when it is known.

use std::fmt;
use std::time::Duration;
use tracing::debug;
use crate::{BaseURL, DashMpdError};
use crate::manifest::{Manifest, Node};
use crate::uri::UriComponents;


/// How much earlier than their nominal availability time segments can be requested.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub enum AvailabilityTimeOffset {
    #[default]
    Unset,
    /// An offset in seconds.
    Value(f64),
    /// All segments are available from MPD@availabilityStartTime onwards.
    AllAvailableAtStart,
}

impl AvailabilityTimeOffset {
    /// Interpret an `@availabilityTimeOffset` attribute, where NaN and INF mean that all segments
    /// are available at the start.
    pub fn from_attribute(value: Option<f64>) -> AvailabilityTimeOffset {
        match value {
            None => AvailabilityTimeOffset::Unset,
            Some(v) if v.is_nan() || v == f64::INFINITY => AvailabilityTimeOffset::AllAvailableAtStart,
            Some(v) if v.is_finite() => AvailabilityTimeOffset::Value(v),
            Some(_) => AvailabilityTimeOffset::Unset,
        }
    }

    pub fn to_attribute(self) -> Option<f64> {
        match self {
            AvailabilityTimeOffset::Unset => None,
            AvailabilityTimeOffset::Value(v) => Some(v),
            AvailabilityTimeOffset::AllAvailableAtStart => Some(f64::INFINITY),
        }
    }

    pub fn is_set(self) -> bool {
        !matches!(self, AvailabilityTimeOffset::Unset)
    }

    /// This offset if it is set, otherwise `other`.
    pub fn or(self, other: AvailabilityTimeOffset) -> AvailabilityTimeOffset {
        if self.is_set() { self } else { other }
    }

    /// The cumulative effect of offsets declared at different levels.
    pub fn combine(self, other: AvailabilityTimeOffset) -> AvailabilityTimeOffset {
        use AvailabilityTimeOffset::*;
        match (self, other) {
            (AllAvailableAtStart, _) | (_, AllAvailableAtStart) => AllAvailableAtStart,
            (Value(a), Value(b)) => Value(a + b),
            (Value(a), Unset) | (Unset, Value(a)) => Value(a),
            (Unset, Unset) => Unset,
        }
    }
}

impl BaseURL {
    pub fn availability_time_offset(&self) -> AvailabilityTimeOffset {
        AvailabilityTimeOffset::from_attribute(self.availabilityTimeOffset)
    }
}


/// A BaseURL after resolution against its ancestors, with its override attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedBaseURL {
    pub url: UriComponents,
    pub service_location: Option<String>,
    pub byte_range: Option<String>,
    pub availability_time_offset: AvailabilityTimeOffset,
    pub availability_time_complete: Option<bool>,
    pub time_shift_buffer_depth: Option<Duration>,
    pub range_access: Option<bool>,
}

impl ResolvedBaseURL {
    pub fn new(url: UriComponents) -> ResolvedBaseURL {
        ResolvedBaseURL {
            url,
            service_location: None,
            byte_range: None,
            availability_time_offset: AvailabilityTimeOffset::Unset,
            availability_time_complete: None,
            time_shift_buffer_depth: None,
            range_access: None,
        }
    }

    fn from_element(url: UriComponents, element: &BaseURL) -> ResolvedBaseURL {
        ResolvedBaseURL {
            url,
            service_location: element.serviceLocation.clone(),
            byte_range: element.byteRange.clone(),
            availability_time_offset: element.availability_time_offset(),
            availability_time_complete: element.availabilityTimeComplete,
            time_shift_buffer_depth: element.timeShiftBufferDepth,
            range_access: element.rangeAccess,
        }
    }

    // Timing overrides of the base a relative BaseURL was resolved against remain in effect.
    fn inherit(mut self, parent: &ResolvedBaseURL) -> ResolvedBaseURL {
        self.availability_time_offset = self.availability_time_offset.or(parent.availability_time_offset);
        self.availability_time_complete = self.availability_time_complete.or(parent.availability_time_complete);
        self.time_shift_buffer_depth = self.time_shift_buffer_depth.or(parent.time_shift_buffer_depth);
        self
    }

    /// Resolve a relative reference, such as a segment URL, against this base.
    pub fn join(&self, reference: &str) -> Result<UriComponents, DashMpdError> {
        self.url.join(reference)
    }
}

impl fmt::Display for ResolvedBaseURL {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.url)
    }
}


/// Compute the base URLs of a node declaring `declared`, given the effective base URLs of its
/// parent.
pub fn resolve_base_urls(parent: &[ResolvedBaseURL], declared: &[BaseURL]) -> Result<Vec<ResolvedBaseURL>, DashMpdError> {
    if declared.is_empty() {
        return Ok(parent.to_vec());
    }
    declared.iter()
        .map(|bu| {
            let reference = UriComponents::parse(&bu.base)?;
            if reference.is_absolute() {
                return Ok(ResolvedBaseURL::from_element(reference, bu));
            }
            match parent.first() {
                Some(base) => {
                    let url = base.url.resolve(&reference);
                    Ok(ResolvedBaseURL::from_element(url, bu).inherit(base))
                },
                None => {
                    debug!(base = %bu.base, "no parent URL to resolve relative BaseURL against");
                    Ok(ResolvedBaseURL::from_element(reference, bu))
                },
            }
        })
        .collect()
}

impl Manifest {
    fn declared_base_urls(&self, node: Node) -> Result<&[BaseURL], DashMpdError> {
        let declared = match node {
            Node::Mpd => Some(self.mpd().base_url.as_slice()),
            Node::Period(p) => self.period(p).map(|p| p.BaseURL.as_slice()),
            Node::AdaptationSet(p, a) => self.adaptation_set(p, a).map(|a| a.BaseURL.as_slice()),
            Node::Representation(p, a, r) => self.representation(p, a, r).map(|r| r.BaseURL.as_slice()),
        };
        declared.ok_or_else(|| DashMpdError::Range(format!("no manifest element at {node:?}")))
    }

    /// The base URLs in effect at `node`, in declaration order.
    pub fn effective_base_urls(&self, node: Node) -> Result<Vec<ResolvedBaseURL>, DashMpdError> {
        let declared = self.declared_base_urls(node)?;
        let parent = match node.parent() {
            Some(parent) => self.effective_base_urls(parent)?,
            None => self.mpd_url()
                .map(|u| vec![ResolvedBaseURL::new(u.clone())])
                .unwrap_or_default(),
        };
        resolve_base_urls(&parent, declared)
    }
}
