//! A Rust library for computing segment addresses and segment availability times from a DASH MPD
//! manifest, as used by streaming clients to decide which URL to request for a media segment and
//! when that request can succeed.
//!
//! [DASH](https://en.wikipedia.org/wiki/Dynamic_Adaptive_Streaming_over_HTTP) (dynamic adaptive
//! streaming over HTTP), also called MPEG-DASH, is a technology used for media streaming over the
//! web. The Media Presentation Description (MPD) is an XML manifest describing the resources
//! forming a streaming service. This crate provides a serde-based parser and serializer for the
//! subset of the MPD format (ISO/IEC 23009-1) that determines segment addressing, and on top of it:
//!
//! - RFC 3986 URI reference resolution ([`uri`]), used to resolve the cascade of `BaseURL`
//!   elements from the manifest retrieval URL down to each Representation ([`base_url`]);
//! - expansion of `SegmentTemplate` URL patterns ([`template`]);
//! - calculation of the effective start and duration of each Period, including Periods that omit
//!   them ([`timing`]);
//! - segment availability windows for static and live presentations ([`availability`]), for the
//!   Representations a client has selected ([`selection`]).
//!
//! The crate does no network I/O: fetching manifests and segments is left to the caller.
//!
//! ## Example
//!
//! ```rust,no_run
//! use dash_mpd_addressing::Manifest;
//!
//! # fn main() -> Result<(), dash_mpd_addressing::DashMpdError> {
//! let xml = std::fs::read_to_string("manifest.mpd").unwrap();
//! let mut manifest = Manifest::from_xml(&xml)?
//!     .with_mpd_url("https://cdn.example.com/live/manifest.mpd")?;
//! manifest.select_all_representations();
//! for segment in manifest.selected_segment_availability(chrono::Utc::now())? {
//!     println!("{segment}");
//! }
//! # Ok(())
//! # }
//! ```
//
// Reference libdash library: https://github.com/bitmovin/libdash
// Reference dash.js library: https://github.com/Dash-Industry-Forum/dash.js
// DASH-IF implementation guidelines on timing: https://dashif.org/Guidelines-TimingModel/


#![allow(non_snake_case)]

pub mod uri;
pub mod base_url;
pub mod template;
pub mod manifest;
pub mod timing;
pub mod clock;
pub mod availability;
pub mod selection;
pub mod values;

use serde::{Serialize, Serializer, Deserialize};
use serde::de;
use serde_with::skip_serializing_none;
use lazy_static::lazy_static;
use regex::Regex;
use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use chrono::DateTime;

pub use uri::UriComponents;
pub use base_url::{AvailabilityTimeOffset, ResolvedBaseURL};
pub use template::Variables;
pub use manifest::{Manifest, Node, PeriodKey};
pub use timing::PeriodTiming;
pub use clock::{ClockSynchronizer, DirectClock, SystemClock};
pub use availability::{GoverningAddressing, SegmentAvailability};
pub use selection::RepresentationRef;
pub use values::{FrameRate, Ratio, SapType};


/// Type representing an xs:dateTime, as per <https://www.w3.org/TR/xmlschema-2/#dateTime>
// Something like 2021-06-03T13:00:00Z
pub type XsDatetime = DateTime<chrono::offset::Utc>;


#[derive(thiserror::Error, Debug)]
pub enum DashMpdError {
    #[error("parse error {0}")]
    Parsing(String),
    #[error("invalid Duration: {0}")]
    InvalidDuration(String),
    /// The requested change would leave the manifest in a state forbidden by the MPD schema.
    #[error("invalid manifest structure: {0}")]
    InvalidStructure(String),
    #[error("value out of range: {0}")]
    Range(String),
    #[error("unknown error {0}")]
    Other(String),
}

pub(crate) fn parse_error(why: &str, e: impl std::error::Error) -> DashMpdError {
    DashMpdError::Parsing(format!("{why}: {e:#?}"))
}


lazy_static! {
    static ref XS_DURATION: Regex = Regex::new(concat!(r"^(?P<sign>[+-])?P",
                                                       r"(?:(?P<years>\d+)Y)?",
                                                       r"(?:(?P<months>\d+)M)?",
                                                       r"(?:(?P<weeks>\d+)W)?",
                                                       r"(?:(?P<days>\d+)D)?",
                                                       r"(?:(?P<hastime>T)", // time part must begin with a T
                                                       r"(?:(?P<hours>\d+)H)?",
                                                       r"(?:(?P<minutes>\d+)M)?",
                                                       r"(?:(?P<seconds>\d+)(?:(?P<nanoseconds>[.,]\d+)?)S)?",
                                                       r")?$")).unwrap();
}

// Parse an XML duration string, as per https://www.w3.org/TR/xmlschema-2/#duration
//
// The lexical representation for duration is the ISO 8601 extended format PnYn MnDTnH nMnS, where
// nY represents the number of years, nM the number of months, nD the number of days, 'T' is the
// date/time separator, nH the number of hours, nM the number of minutes and nS the number of
// seconds. The number of seconds can include decimal digits to arbitrary precision.
//
// Examples: "PT0H0M30.030S", "PT1.2S", PT1004199059S, PT130S
//
// We can't represent negative durations (leading "-" character) with a std::time::Duration. Years
// count as 365 days and months as 30 days. Only the seconds may have a fractional part.
pub fn parse_xs_duration(s: &str) -> Result<Duration, DashMpdError> {
    let Some(m) = XS_DURATION.captures(s) else {
        return Err(DashMpdError::InvalidDuration(format!("couldn't parse XS duration {s:?}")));
    };
    if m.name("hastime").is_none() &&
        m.name("years").is_none() &&
        m.name("months").is_none() &&
        m.name("weeks").is_none() &&
        m.name("days").is_none() {
            return Err(DashMpdError::InvalidDuration(String::from("empty")));
        }
    if m.name("hastime").is_some() &&
        m.name("hours").is_none() &&
        m.name("minutes").is_none() &&
        m.name("seconds").is_none() {
            return Err(DashMpdError::InvalidDuration(format!("no time component after T in {s:?}")));
        }
    if m.name("sign").is_some_and(|s| s.as_str() == "-") {
        return Err(DashMpdError::InvalidDuration(String::from("can't represent negative durations")));
    }
    let component = |name: &str, unit: u64| -> Result<u64, DashMpdError> {
        match m.name(name) {
            Some(v) => v.as_str().parse::<u64>()
                .ok()
                .and_then(|n| n.checked_mul(unit))
                .ok_or_else(|| DashMpdError::InvalidDuration(format!("{name} overflow in {s:?}"))),
            None => Ok(0),
        }
    };
    let mut nsecs: u32 = 0;
    if let Some(ns) = m.name("nanoseconds") {
        let mut digits = &ns.as_str()[1..]; // drop initial "."
        if digits.len() > 9 {
            digits = &digits[..9];
        }
        let padded = format!("{digits:0<9}");
        nsecs = padded.parse::<u32>()
            .map_err(|e| DashMpdError::InvalidDuration(e.to_string()))?;
    }
    let units = [("seconds", 1), ("minutes", 60), ("hours", 60 * 60),
                 ("days", 60 * 60 * 24), ("weeks", 60 * 60 * 24 * 7),
                 ("months", 60 * 60 * 24 * 30), ("years", 60 * 60 * 24 * 365)];
    let mut secs: u64 = 0;
    for (name, unit) in units {
        secs = secs.checked_add(component(name, unit)?)
            .ok_or_else(|| DashMpdError::InvalidDuration(format!("overflow in {s:?}")))?;
    }
    Ok(Duration::new(secs, nsecs))
}

// Deserialize an optional XML duration string to an Option<Duration>. This is a little trickier
// than deserializing a required field with serde.
fn deserialize_xs_duration<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
where
    D: de::Deserializer<'de>,
{
    match <Option<String>>::deserialize(deserializer) {
        Ok(Some(xs)) => parse_xs_duration(&xs)
            .map(Some)
            .map_err(de::Error::custom),
        Ok(None) => Ok(None),
        // the field isn't present, return an Ok(None)
        Err(_) => Ok(None),
    }
}

fn serialize_xs_duration<S>(oxs: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    // this is a very simple-minded way of converting to an ISO 8601 duration
    if let Some(xs) = oxs {
        let secs = xs.as_secs();
        let ms = xs.subsec_millis();
        serializer.serialize_str(&format!("PT{secs}.{ms:03}S"))
    } else {
        // in fact this won't be called because of the #[skip_serializing_none] annotation
        serializer.serialize_none()
    }
}


// The MPD format is documented by ISO using an XML Schema at
// https://standards.iso.org/ittf/PubliclyAvailableStandards/MPEG-DASH_schema_files/DASH-MPD-edition2.xsd
//
// We are using the quick_xml + serde crates to deserialize the XML content to Rust structs, and the
// reverse serialization process of programmatically generating XML from Rust structs. Attributes
// are named with an "@" prefix and text content with "$text", as quick-xml expects. Serde ignores
// unknown fields when deserializing, so only the elements and attributes that matter for segment
// addressing and timing are mapped here.

/// Describes a sequence of contiguous Segments with identical duration.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct S {
    /// presentation time of the first segment in the sequence, in timescale units
    #[serde(rename = "@t")]
    pub t: Option<u64>,
    /// the duration (shall not exceed the value of MPD@maxSegmentDuration)
    #[serde(rename = "@d")]
    pub d: u64,
    /// the repeat count (number of contiguous Segments with identical MPD duration minus one),
    /// defaulting to zero if not present. A value of -1 repeats until the end of the Period.
    #[serde(rename = "@r")]
    pub r: Option<i64>,
}

/// Contains a sequence of `S` elements, each of which describes a sequence of contiguous segments of
/// identical duration.
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SegmentTimeline {
    #[serde(rename = "S")]
    pub segments: Vec<S>,
}

/// The initialization segment for a sequence of media segments.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct Initialization {
    #[serde(rename = "@sourceURL")]
    pub sourceURL: Option<String>,
    #[serde(rename = "@range")]
    pub range: Option<String>,
}

/// Allows template-based `SegmentURL` construction. Specifies various substitution rules using
/// dynamic values such as `$Time$` and `$Number$` that map to a sequence of Segments.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SegmentTemplate {
    #[serde(rename = "@initialization")]
    pub initialization: Option<String>,
    #[serde(rename = "@media")]
    pub media: Option<String>,
    #[serde(rename = "@index")]
    pub index: Option<String>,
    pub SegmentTimeline: Option<SegmentTimeline>,
    #[serde(rename = "@startNumber")]
    pub startNumber: Option<u64>,
    // note: ISO/IEC 23009-1 says this is an unsigned int, not an xs:duration. In practice, some manifests
    // use a floating point value.
    #[serde(rename = "@duration")]
    pub duration: Option<f64>,
    #[serde(rename = "@timescale")]
    pub timescale: Option<u64>,
    #[serde(rename = "@presentationTimeOffset")]
    pub presentationTimeOffset: Option<u64>,
    /// Seconds by which segments become available earlier than their nominal availability time.
    /// "INF" means that all segments are available from the start of the Period.
    #[serde(rename = "@availabilityTimeOffset")]
    pub availabilityTimeOffset: Option<f64>,
    #[serde(rename = "@availabilityTimeComplete")]
    pub availabilityTimeComplete: Option<bool>,
    #[serde(rename = "@bitstreamSwitching")]
    pub bitstreamSwitching: Option<bool>,
}

/// A URI string that specifies one or more common locations for Segments and other resources.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct BaseURL {
    #[serde(rename = "$text")]
    pub base: String,
    /// Elements with the same `@serviceLocation` value are likely to have their URLs resolve to
    /// services at a common network location, for example the same CDN.
    #[serde(rename = "@serviceLocation")]
    pub serviceLocation: Option<String>,
    #[serde(rename = "@byteRange")]
    pub byteRange: Option<String>,
    /// NaN (or INF) means that all segments are available at the MPD@availabilityStartTime.
    #[serde(rename = "@availabilityTimeOffset")]
    pub availabilityTimeOffset: Option<f64>,
    #[serde(rename = "@availabilityTimeComplete")]
    pub availabilityTimeComplete: Option<bool>,
    #[serde(rename = "@timeShiftBufferDepth")]
    #[serde(deserialize_with = "deserialize_xs_duration", default)]
    #[serde(serialize_with = "serialize_xs_duration")]
    pub timeShiftBufferDepth: Option<Duration>,
    #[serde(rename = "@rangeAccess")]
    pub rangeAccess: Option<bool>,
}

/// Specifies some common information concerning media segments.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SegmentBase {
    #[serde(rename = "Initialization")]
    pub initialization: Option<Initialization>,
    #[serde(rename = "@timescale")]
    pub timescale: Option<u64>,
    #[serde(rename = "@presentationTimeOffset")]
    pub presentationTimeOffset: Option<u64>,
    #[serde(rename = "@indexRange")]
    pub indexRange: Option<String>,
    #[serde(rename = "@indexRangeExact")]
    pub indexRangeExact: Option<bool>,
    #[serde(rename = "@availabilityTimeOffset")]
    pub availabilityTimeOffset: Option<f64>,
    #[serde(rename = "@availabilityTimeComplete")]
    pub availabilityTimeComplete: Option<bool>,
}

/// The URL of a media segment.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct SegmentURL {
    #[serde(rename = "@media")]
    pub media: Option<String>, // actually an URI
    #[serde(rename = "@mediaRange")]
    pub mediaRange: Option<String>,
    #[serde(rename = "@index")]
    pub index: Option<String>, // actually an URI
    #[serde(rename = "@indexRange")]
    pub indexRange: Option<String>,
}

/// Contains a sequence of SegmentURL elements.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct SegmentList {
    // note: ISO/IEC 23009-1 says this is an unsigned int, not an xs:duration
    #[serde(rename = "@duration")]
    pub duration: Option<u64>,
    #[serde(rename = "@timescale")]
    pub timescale: Option<u64>,
    #[serde(rename = "@startNumber")]
    pub startNumber: Option<u64>,
    #[serde(rename = "@presentationTimeOffset")]
    pub presentationTimeOffset: Option<u64>,
    #[serde(rename = "@availabilityTimeOffset")]
    pub availabilityTimeOffset: Option<f64>,
    /// A "remote resource", following the XML Linking Language (XLink) specification.
    #[serde(rename = "@xlink:href")]
    pub href: Option<String>,
    #[serde(rename = "@xlink:actuate")]
    pub actuate: Option<String>,
    pub Initialization: Option<Initialization>,
    pub SegmentTimeline: Option<SegmentTimeline>,
    #[serde(rename = "SegmentURL")]
    pub segment_urls: Vec<SegmentURL>,
}

/// A representation describes a version of the content, using a specific encoding and bitrate.
/// Streams often have multiple representations with different bitrates, to allow the client to
/// select that most suitable to its network conditions.
///
/// Two Representations compare equal when they have the same `@id`.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Representation {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "@mimeType")]
    pub mimeType: Option<String>,
    /// An RFC6381 string, <https://tools.ietf.org/html/rfc6381>
    #[serde(rename = "@codecs")]
    pub codecs: Option<String>,
    #[serde(rename = "@contentType")]
    pub contentType: Option<String>,
    #[serde(rename = "@frameRate")]
    pub frameRate: Option<String>, // can be something like "15/2"
    #[serde(rename = "@sar")]
    pub sar: Option<String>,
    #[serde(rename = "@bandwidth")]
    pub bandwidth: Option<u64>,
    #[serde(rename = "@qualityRanking")]
    pub qualityRanking: Option<u64>,
    #[serde(rename = "@dependencyId")]
    pub dependencyId: Option<String>,
    #[serde(rename = "@audioSamplingRate")]
    pub audioSamplingRate: Option<u64>,
    #[serde(rename = "@width")]
    pub width: Option<u64>,
    #[serde(rename = "@height")]
    pub height: Option<u64>,
    #[serde(rename = "@startWithSAP")]
    pub startWithSAP: Option<u64>,
    pub BaseURL: Vec<BaseURL>,
    pub SegmentBase: Option<SegmentBase>,
    pub SegmentList: Option<SegmentList>,
    pub SegmentTemplate: Option<SegmentTemplate>,
}

impl PartialEq for Representation {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

/// Contains a set of Representations. For example, if multiple language streams are available for
/// the audio content, each one can be in its own AdaptationSet.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct AdaptationSet {
    #[serde(rename = "@id")]
    pub id: Option<i64>,
    #[serde(rename = "@group")]
    pub group: Option<i64>,
    // eg "audio", "video", "text"
    #[serde(rename = "@contentType")]
    pub contentType: Option<String>,
    /// Content language, in RFC 5646 format
    #[serde(rename = "@lang")]
    pub lang: Option<String>,
    #[serde(rename = "@par")]
    pub par: Option<String>,
    // eg "video/mp4"
    #[serde(rename = "@mimeType")]
    pub mimeType: Option<String>,
    #[serde(rename = "@codecs")]
    pub codecs: Option<String>,
    #[serde(rename = "@frameRate")]
    pub frameRate: Option<String>,
    #[serde(rename = "@segmentAlignment")]
    pub segmentAlignment: Option<bool>,
    #[serde(rename = "@startWithSAP")]
    pub startWithSAP: Option<u64>,
    pub BaseURL: Vec<BaseURL>,
    pub SegmentBase: Option<SegmentBase>,
    pub SegmentList: Option<SegmentList>,
    pub SegmentTemplate: Option<SegmentTemplate>,
    #[serde(rename = "Representation")]
    pub representations: Vec<Representation>,
    /// Ids of the Representations selected by the client (see the [`selection`] module). Not part
    /// of the XML document.
    #[serde(skip)]
    pub selected: BTreeSet<String>,
}

/// Describes a chunk of the content with a start time and a duration. Content can be split up into
/// multiple periods (such as chapters, advertising segments).
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct Period {
    #[serde(rename = "@id")]
    pub id: Option<String>,
    #[serde(rename = "@start")]
    #[serde(deserialize_with = "deserialize_xs_duration", default)]
    #[serde(serialize_with = "serialize_xs_duration")]
    pub start: Option<Duration>,
    // note: ISO/IEC 23009-1 says that this is an xs:duration, not an unsigned int as for other "duration" fields
    #[serde(rename = "@duration")]
    #[serde(deserialize_with = "deserialize_xs_duration", default)]
    #[serde(serialize_with = "serialize_xs_duration")]
    pub duration: Option<Duration>,
    #[serde(rename = "@bitstreamSwitching")]
    pub bitstreamSwitching: Option<bool>,
    pub BaseURL: Vec<BaseURL>,
    pub SegmentBase: Option<SegmentBase>,
    pub SegmentList: Option<SegmentList>,
    pub SegmentTemplate: Option<SegmentTemplate>,
    #[serde(rename = "AdaptationSet")]
    pub adaptations: Vec<AdaptationSet>,
}

#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct UTCTiming {
    // prefixed with urn:mpeg:dash:utc, one of http-xsdate:2014, http-iso:2014,
    // http-ntp:2014, ntp:2014, http-head:2014, direct:2014
    #[serde(rename = "@schemeIdUri")]
    pub schemeIdUri: Option<String>,
    #[serde(rename = "@value")]
    pub value: Option<String>,
}

/// The root node of a parsed DASH MPD manifest.
#[skip_serializing_none]
#[derive(Debug, Default, Serialize, Deserialize, Clone)]
#[serde(default)]
pub struct MPD {
    /// The Presentation Type, either "static" or "dynamic" (a live stream for which segments become
    /// available over time).
    #[serde(rename = "@type")]
    pub mpdtype: Option<String>,
    #[serde(rename = "@xmlns")]
    pub xmlns: Option<String>,
    /// Comma-separated list of the profile URIs this manifest conforms to.
    #[serde(rename = "@profiles")]
    pub profiles: Option<String>,
    /// Prescribes how many seconds of buffer a client should keep to avoid stalling when streaming
    /// under ideal network conditions with bandwidth matching the @bandwidth attribute.
    #[serde(rename = "@minBufferTime")]
    #[serde(deserialize_with = "deserialize_xs_duration", default)]
    #[serde(serialize_with = "serialize_xs_duration")]
    pub minBufferTime: Option<Duration>,
    #[serde(rename = "@minimumUpdatePeriod")]
    #[serde(deserialize_with = "deserialize_xs_duration", default)]
    #[serde(serialize_with = "serialize_xs_duration")]
    pub minimumUpdatePeriod: Option<Duration>,
    #[serde(rename = "@timeShiftBufferDepth")]
    #[serde(deserialize_with = "deserialize_xs_duration", default)]
    #[serde(serialize_with = "serialize_xs_duration")]
    pub timeShiftBufferDepth: Option<Duration>,
    #[serde(rename = "@mediaPresentationDuration")]
    #[serde(deserialize_with = "deserialize_xs_duration", default)]
    #[serde(serialize_with = "serialize_xs_duration")]
    pub mediaPresentationDuration: Option<Duration>,
    #[serde(rename = "@maxSegmentDuration")]
    #[serde(deserialize_with = "deserialize_xs_duration", default)]
    #[serde(serialize_with = "serialize_xs_duration")]
    pub maxSegmentDuration: Option<Duration>,
    /// A suggested delay of the presentation compared to the Live edge.
    #[serde(rename = "@suggestedPresentationDelay")]
    #[serde(deserialize_with = "deserialize_xs_duration", default)]
    #[serde(serialize_with = "serialize_xs_duration")]
    pub suggestedPresentationDelay: Option<Duration>,
    #[serde(rename = "@publishTime")]
    pub publishTime: Option<XsDatetime>,
    #[serde(rename = "@availabilityStartTime")]
    pub availabilityStartTime: Option<XsDatetime>,
    #[serde(rename = "@availabilityEndTime")]
    pub availabilityEndTime: Option<XsDatetime>,
    #[serde(rename = "Period", default)]
    pub periods: Vec<Period>,
    /// There may be several BaseURLs, for redundancy (for example multiple CDNs)
    #[serde(rename = "BaseURL")]
    pub base_url: Vec<BaseURL>,
    pub UTCTiming: Vec<UTCTiming>,
}

impl fmt::Display for MPD {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let xml = quick_xml::se::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&xml)
    }
}


/// Parse an MPD manifest, provided as an XML string, returning an `MPD` node.
pub fn parse(xml: &str) -> Result<MPD, DashMpdError> {
    #[cfg(feature = "warn_ignored_elements")]
    {
        let xd = &mut quick_xml::de::Deserializer::from_str(xml);
        let _: Result<MPD, _> = serde_ignored::deserialize(xd, |path| {
            tracing::warn!("Unhandled XML element or attribute {path}");
        });
    }
    let xd = &mut quick_xml::de::Deserializer::from_str(xml);
    let mpd: MPD = serde_path_to_error::deserialize(xd)
        .map_err(|e| DashMpdError::Parsing(e.to_string()))?;
    Ok(mpd)
}
