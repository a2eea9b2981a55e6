//! Segment URLs and availability windows.
//!
//! The addressing of a Representation's segments is governed by the first `SegmentTemplate`,
//! `SegmentList` or `SegmentBase` element found walking up from the Representation to its
//! AdaptationSet and then its Period. Attributes missing on the governing element are inherited
//! from elements of the same kind higher up. Segment URLs are resolved against the base URLs in
//! effect where the governing element was declared.
//
// DASH-IF timing model: https://dashif.org/Guidelines-TimingModel/
// The availability start time of segment i in a live presentation is
//   MPD@availabilityStartTime + Period start + (segment end time) - availabilityTimeOffset

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;
use chrono::TimeDelta;
use tracing::{debug, trace, warn};
use crate::{DashMpdError, SegmentBase, SegmentList, SegmentTemplate, SegmentTimeline, XsDatetime};
use crate::base_url::{AvailabilityTimeOffset, ResolvedBaseURL};
use crate::manifest::{Manifest, Node};
use crate::template::{expand, Variables};
use crate::timing::to_delta;
use crate::uri::UriComponents;


// Guards against expanding absurdly long SegmentTimelines.
const MAX_TIMELINE_SEGMENTS: usize = 1_000_000;


/// When and where a segment can be retrieved.
///
/// Ordered by availability start, then availability end (no end sorts first), then segment
/// duration, then URL.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SegmentAvailability {
    pub availability_start: XsDatetime,
    pub availability_end: Option<XsDatetime>,
    pub segment_duration: Duration,
    pub segment_url: String,
}

impl SegmentAvailability {
    pub fn new(
        availability_start: XsDatetime,
        availability_end: Option<XsDatetime>,
        segment_duration: Duration,
        segment_url: impl Into<String>) -> SegmentAvailability
    {
        SegmentAvailability {
            availability_start,
            availability_end,
            segment_duration,
            segment_url: segment_url.into(),
        }
    }

    pub fn is_available_at(&self, time: XsDatetime) -> bool {
        time >= self.availability_start &&
            self.availability_end.map_or(true, |end| time < end)
    }
}

impl fmt::Display for SegmentAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} available from {}", self.segment_url, self.availability_start)?;
        if let Some(end) = self.availability_end {
            write!(f, " until {end}")?;
        }
        write!(f, " (duration {:.3}s)", self.segment_duration.as_secs_f64())
    }
}


/// The element that governs segment addressing for a Representation, with the attributes it
/// inherits from elements of the same kind higher in the manifest, and the node that declares it.
#[derive(Debug, Clone)]
pub enum GoverningAddressing {
    Template { template: SegmentTemplate, owner: Node },
    List { list: SegmentList, owner: Node },
    Base { base: SegmentBase, owner: Node },
    None,
}

impl GoverningAddressing {
    pub fn owner(&self) -> Option<Node> {
        match self {
            GoverningAddressing::Template { owner, .. } |
            GoverningAddressing::List { owner, .. } |
            GoverningAddressing::Base { owner, .. } => Some(*owner),
            GoverningAddressing::None => None,
        }
    }
}

impl SegmentTemplate {
    fn inherit_from(&mut self, parent: &SegmentTemplate) {
        self.initialization = self.initialization.take().or_else(|| parent.initialization.clone());
        self.media = self.media.take().or_else(|| parent.media.clone());
        self.index = self.index.take().or_else(|| parent.index.clone());
        self.SegmentTimeline = self.SegmentTimeline.take().or_else(|| parent.SegmentTimeline.clone());
        self.startNumber = self.startNumber.or(parent.startNumber);
        self.duration = self.duration.or(parent.duration);
        self.timescale = self.timescale.or(parent.timescale);
        self.presentationTimeOffset = self.presentationTimeOffset.or(parent.presentationTimeOffset);
        self.availabilityTimeOffset = self.availabilityTimeOffset.or(parent.availabilityTimeOffset);
        self.availabilityTimeComplete = self.availabilityTimeComplete.or(parent.availabilityTimeComplete);
    }

    /// Expand the `@media` pattern. `vars` holds a zero-based segment number, to which
    /// `@startNumber` (default 1) is added.
    pub fn expand_media(&self, vars: &Variables) -> Option<String> {
        let pattern = self.media.as_deref()?;
        Some(expand(pattern, vars, Some(self.startNumber.unwrap_or(1))))
    }

    pub fn expand_initialization(&self, vars: &Variables) -> Option<String> {
        let pattern = self.initialization.as_deref()?;
        Some(expand(pattern, vars, Some(self.startNumber.unwrap_or(1))))
    }
}

impl SegmentList {
    fn inherit_from(&mut self, parent: &SegmentList) {
        self.duration = self.duration.or(parent.duration);
        self.timescale = self.timescale.or(parent.timescale);
        self.startNumber = self.startNumber.or(parent.startNumber);
        self.presentationTimeOffset = self.presentationTimeOffset.or(parent.presentationTimeOffset);
        self.availabilityTimeOffset = self.availabilityTimeOffset.or(parent.availabilityTimeOffset);
        self.Initialization = self.Initialization.take().or_else(|| parent.Initialization.clone());
        self.SegmentTimeline = self.SegmentTimeline.take().or_else(|| parent.SegmentTimeline.clone());
        if self.segment_urls.is_empty() {
            self.segment_urls = parent.segment_urls.clone();
        }
    }
}

impl SegmentBase {
    fn inherit_from(&mut self, parent: &SegmentBase) {
        self.initialization = self.initialization.take().or_else(|| parent.initialization.clone());
        self.timescale = self.timescale.or(parent.timescale);
        self.presentationTimeOffset = self.presentationTimeOffset.or(parent.presentationTimeOffset);
        self.indexRange = self.indexRange.take().or_else(|| parent.indexRange.clone());
        self.indexRangeExact = self.indexRangeExact.or(parent.indexRangeExact);
        self.availabilityTimeOffset = self.availabilityTimeOffset.or(parent.availabilityTimeOffset);
        self.availabilityTimeComplete = self.availabilityTimeComplete.or(parent.availabilityTimeComplete);
    }
}


fn ticks_to_duration(ticks: u64, timescale: u64) -> Duration {
    let ts = timescale.max(1);
    let nanos = u128::from(ticks % ts) * 1_000_000_000 / u128::from(ts);
    Duration::from_secs(ticks / ts) + Duration::from_nanos(nanos as u64)
}

fn duration_to_ticks(d: Duration, timescale: u64) -> u64 {
    let ticks = d.as_nanos() * u128::from(timescale.max(1)) / 1_000_000_000;
    u64::try_from(ticks).unwrap_or(u64::MAX)
}

fn secs_to_delta(secs: f64) -> TimeDelta {
    TimeDelta::nanoseconds((secs * 1e9) as i64)
}

fn shift(t: XsDatetime, delta: TimeDelta) -> XsDatetime {
    t.checked_add_signed(delta).unwrap_or(t)
}

// Number of whole segments of length `segment` needed to reach `elapsed`, rounding up.
fn segments_elapsed(elapsed: Duration, segment: Duration) -> u64 {
    let count = elapsed.as_nanos().div_ceil(segment.as_nanos().max(1));
    u64::try_from(count).unwrap_or(u64::MAX)
}

/// Expand a SegmentTimeline into (start time, duration) pairs in timescale units. A repeat count
/// of -1 repeats until the start of the next S element, or the end of the Period.
pub fn expand_timeline(
    timeline: &SegmentTimeline,
    presentation_time_offset: u64,
    timescale: u64,
    period_duration: Option<Duration>) -> Vec<(u64, u64)>
{
    let period_end = period_duration
        .map(|d| presentation_time_offset.saturating_add(duration_to_ticks(d, timescale)));
    let mut segments = Vec::new();
    let mut next_time = 0;
    for (i, s) in timeline.segments.iter().enumerate() {
        if s.d == 0 {
            warn!("ignoring SegmentTimeline entry with zero duration");
            continue;
        }
        let mut t = s.t.unwrap_or(next_time);
        let repeats = match s.r {
            None => 0,
            Some(r) if r >= 0 => r as u64,
            Some(_) => {
                let end = timeline.segments.get(i + 1)
                    .and_then(|next| next.t)
                    .or(period_end);
                match end {
                    Some(end) if end > t => (end - t).div_ceil(s.d) - 1,
                    _ => 0,
                }
            },
        };
        for _ in 0..=repeats {
            if segments.len() >= MAX_TIMELINE_SEGMENTS {
                warn!("truncating SegmentTimeline at {MAX_TIMELINE_SEGMENTS} segments");
                return segments;
            }
            segments.push((t, s.d));
            t = t.saturating_add(s.d);
        }
        next_time = t;
    }
    segments
}


// Timing attributes shared by SegmentTemplate and SegmentList addressing.
#[derive(Debug)]
struct Layout {
    timescale: u64,
    presentation_time_offset: u64,
    duration_ticks: Option<f64>,
    timeline: Option<Vec<(u64, u64)>>,
    list_length: Option<usize>,
    availability_time_offset: AvailabilityTimeOffset,
}

// Where a segment sits in the Period: its zero-based number, its time in timescale units and its
// duration.
#[derive(Debug, Default)]
struct Located {
    number: Option<u64>,
    time: Option<u64>,
    duration: Duration,
}

impl Layout {
    fn from_template(template: &SegmentTemplate, period_duration: Option<Duration>) -> Layout {
        let timescale = template.timescale.unwrap_or(1).max(1);
        let presentation_time_offset = template.presentationTimeOffset.unwrap_or(0);
        Layout {
            timescale,
            presentation_time_offset,
            duration_ticks: template.duration.filter(|d| d.is_finite() && *d > 0.0),
            timeline: template.SegmentTimeline.as_ref()
                .map(|tl| expand_timeline(tl, presentation_time_offset, timescale, period_duration)),
            list_length: None,
            availability_time_offset: AvailabilityTimeOffset::from_attribute(template.availabilityTimeOffset),
        }
    }

    fn from_list(list: &SegmentList, period_duration: Option<Duration>) -> Layout {
        let timescale = list.timescale.unwrap_or(1).max(1);
        let presentation_time_offset = list.presentationTimeOffset.unwrap_or(0);
        Layout {
            timescale,
            presentation_time_offset,
            duration_ticks: list.duration.filter(|d| *d > 0).map(|d| d as f64),
            timeline: list.SegmentTimeline.as_ref()
                .map(|tl| expand_timeline(tl, presentation_time_offset, timescale, period_duration)),
            list_length: Some(list.segment_urls.len()),
            availability_time_offset: AvailabilityTimeOffset::from_attribute(list.availabilityTimeOffset),
        }
    }

    fn segment_duration(&self) -> Option<Duration> {
        let ticks = self.duration_ticks?;
        Duration::try_from_secs_f64(ticks / self.timescale as f64).ok()
    }

    fn locate(&self, vars: &Variables) -> Located {
        if let Some(timeline) = &self.timeline {
            let idx = match (vars.number(), vars.time()) {
                (Some(n), _) => usize::try_from(n).ok().filter(|i| *i < timeline.len()),
                (None, Some(t)) => timeline.iter().position(|(st, d)| t >= *st && t < st.saturating_add(*d)),
                (None, None) => None,
            };
            return match idx {
                Some(i) => Located {
                    number: Some(i as u64),
                    time: Some(timeline[i].0),
                    duration: ticks_to_duration(timeline[i].1, self.timescale),
                },
                None => Located { number: vars.number(), time: vars.time(), duration: Duration::ZERO },
            };
        }
        let duration = self.segment_duration().unwrap_or_default();
        match (vars.number(), vars.time(), self.duration_ticks) {
            (Some(n), time, Some(d)) => Located {
                number: Some(n),
                time: time.or_else(|| Some(self.presentation_time_offset.saturating_add((n as f64 * d).round() as u64))),
                duration,
            },
            (None, Some(t), Some(d)) => Located {
                number: Some((t.saturating_sub(self.presentation_time_offset) as f64 / d).floor() as u64),
                time: Some(t),
                duration,
            },
            (number, time, _) => Located { number, time, duration },
        }
    }

    // Offset of a segment from the start of the Period.
    fn offset(&self, located: &Located) -> Duration {
        if let Some(t) = located.time {
            return ticks_to_duration(t.saturating_sub(self.presentation_time_offset), self.timescale);
        }
        match (located.number, self.segment_duration()) {
            (Some(n), Some(d)) => Duration::try_from_secs_f64(d.as_secs_f64() * n as f64).unwrap_or_default(),
            _ => Duration::ZERO,
        }
    }

    // The first segment starting at or after `elapsed` into the Period.
    fn next_segment(&self, elapsed: Duration, period_duration: Option<Duration>) -> Option<Variables> {
        if let Some(timeline) = &self.timeline {
            let target = self.presentation_time_offset
                .saturating_add(duration_to_ticks(elapsed, self.timescale));
            let idx = timeline.iter().position(|(t, _)| *t >= target)?;
            return Some(Variables::default()
                        .with_number(idx as u64)
                        .with_time(timeline[idx].0));
        }
        let idx = match self.segment_duration().filter(|d| !d.is_zero()) {
            Some(d) => {
                let idx = segments_elapsed(elapsed, d);
                let offset = self.offset(&Located { number: Some(idx), ..Default::default() });
                if period_duration.is_some_and(|pd| offset >= pd) {
                    return None;
                }
                idx
            },
            None if elapsed.is_zero() => 0,
            None => return None,
        };
        if self.list_length.is_some_and(|len| idx >= len as u64) {
            return None;
        }
        Some(Variables::default().with_number(idx))
    }
}


fn resolve_reference(bases: &[ResolvedBaseURL], reference: &str) -> Result<String, DashMpdError> {
    let parsed = UriComponents::parse(reference)?;
    if parsed.is_absolute() {
        return Ok(parsed.to_string());
    }
    Ok(match bases.first() {
        Some(base) => base.url.resolve(&parsed).to_string(),
        None => parsed.to_string(),
    })
}

fn first_base_url(bases: &[ResolvedBaseURL]) -> String {
    bases.first()
        .map(|b| b.url.to_string())
        .unwrap_or_default()
}

impl Manifest {
    /// The element governing segment addressing for the Representation at `rep`.
    pub fn governing_addressing(&self, rep: Node) -> Result<GoverningAddressing, DashMpdError> {
        self.representation_at(rep)?;
        let chain: Vec<Node> = rep.ancestry()
            .take_while(|n| *n != Node::Mpd)
            .collect();
        for (i, node) in chain.iter().enumerate() {
            let higher = &chain[i + 1..];
            if let Some(template) = self.segment_template(*node) {
                let mut merged = template.clone();
                for st in higher.iter().filter_map(|n| self.segment_template(*n)) {
                    merged.inherit_from(st);
                }
                return Ok(GoverningAddressing::Template { template: merged, owner: *node });
            }
            if let Some(list) = self.segment_list(*node) {
                let mut merged = list.clone();
                for sl in higher.iter().filter_map(|n| self.segment_list(*n)) {
                    merged.inherit_from(sl);
                }
                return Ok(GoverningAddressing::List { list: merged, owner: *node });
            }
            if let Some(base) = self.segment_base(*node) {
                let mut merged = base.clone();
                for sb in higher.iter().filter_map(|n| self.segment_base(*n)) {
                    merged.inherit_from(sb);
                }
                return Ok(GoverningAddressing::Base { base: merged, owner: *node });
            }
        }
        Ok(GoverningAddressing::None)
    }

    fn segment_template(&self, node: Node) -> Option<&SegmentTemplate> {
        match node {
            Node::Mpd => None,
            Node::Period(p) => self.period(p)?.SegmentTemplate.as_ref(),
            Node::AdaptationSet(p, a) => self.adaptation_set(p, a)?.SegmentTemplate.as_ref(),
            Node::Representation(p, a, r) => self.representation(p, a, r)?.SegmentTemplate.as_ref(),
        }
    }

    fn segment_list(&self, node: Node) -> Option<&SegmentList> {
        match node {
            Node::Mpd => None,
            Node::Period(p) => self.period(p)?.SegmentList.as_ref(),
            Node::AdaptationSet(p, a) => self.adaptation_set(p, a)?.SegmentList.as_ref(),
            Node::Representation(p, a, r) => self.representation(p, a, r)?.SegmentList.as_ref(),
        }
    }

    fn segment_base(&self, node: Node) -> Option<&SegmentBase> {
        match node {
            Node::Mpd => None,
            Node::Period(p) => self.period(p)?.SegmentBase.as_ref(),
            Node::AdaptationSet(p, a) => self.adaptation_set(p, a)?.SegmentBase.as_ref(),
            Node::Representation(p, a, r) => self.representation(p, a, r)?.SegmentBase.as_ref(),
        }
    }

    // Availability for a Representation without any segment addressing information.
    fn degenerate_availability(&self, rep: Node) -> SegmentAvailability {
        debug!(?rep, "no SegmentTemplate, SegmentList or SegmentBase governs this Representation");
        SegmentAvailability::new(self.now(), self.mpd().availabilityEndTime, Duration::ZERO, "")
    }

    fn representation_period_start(&self, rep: Node) -> Duration {
        let start = rep.period().and_then(|key| self.calc_start(key));
        start.unwrap_or_else(|| {
            debug!(?rep, "Period start unresolved, assuming zero");
            Duration::ZERO
        })
    }

    /// The URL and availability window of the media segment of the Representation at `rep`
    /// designated by `vars`.
    ///
    /// `vars` normally carries a zero-based segment number or a segment time; the Representation's
    /// id and bandwidth are filled in when absent. Identifiers that cannot be substituted are left
    /// in the URL as-is.
    pub fn media_availability(&self, rep: Node, vars: &Variables) -> Result<SegmentAvailability, DashMpdError> {
        let representation = self.representation_at(rep)?;
        let governing = self.governing_addressing(rep)?;
        let Some(owner) = governing.owner() else {
            return Ok(self.degenerate_availability(rep));
        };
        let bases = self.effective_base_urls(owner)?;
        let period_duration = rep.period().and_then(|key| self.calc_duration(key));
        let mut vars = vars.clone();
        if vars.representation_id().is_none() {
            if let Some(id) = &representation.id {
                vars = vars.with_representation_id(id.clone());
            }
        }
        if vars.bandwidth().is_none() {
            if let Some(bw) = representation.bandwidth {
                vars = vars.with_bandwidth(bw);
            }
        }
        let (url, offset, duration, element_offset) = match &governing {
            GoverningAddressing::Template { template, .. } => {
                let layout = Layout::from_template(template, period_duration);
                let located = layout.locate(&vars);
                if vars.number().is_none() {
                    if let Some(n) = located.number {
                        vars = vars.with_number(n);
                    }
                }
                if vars.time().is_none() {
                    if let Some(t) = located.time {
                        vars = vars.with_time(t);
                    }
                }
                let url = match template.expand_media(&vars) {
                    Some(reference) => resolve_reference(&bases, &reference)?,
                    None => {
                        debug!(?owner, "SegmentTemplate without @media");
                        String::new()
                    },
                };
                (url, layout.offset(&located), located.duration, layout.availability_time_offset)
            },
            GoverningAddressing::List { list, .. } => {
                let layout = Layout::from_list(list, period_duration);
                let mut located = layout.locate(&vars);
                let number = *located.number.get_or_insert(0);
                let segment = usize::try_from(number).ok()
                    .and_then(|i| list.segment_urls.get(i))
                    .ok_or_else(|| DashMpdError::Range(
                        format!("segment {number} out of range for SegmentList of {} segments",
                                list.segment_urls.len())))?;
                let url = match &segment.media {
                    Some(media) => resolve_reference(&bases, media)?,
                    None => first_base_url(&bases),
                };
                (url, layout.offset(&located), located.duration, layout.availability_time_offset)
            },
            GoverningAddressing::Base { base, .. } => {
                (first_base_url(&bases),
                 Duration::ZERO,
                 period_duration.unwrap_or_default(),
                 AvailabilityTimeOffset::from_attribute(base.availabilityTimeOffset))
            },
            GoverningAddressing::None => return Ok(self.degenerate_availability(rep)),
        };
        let base_offset = bases.first()
            .map(|b| b.availability_time_offset)
            .unwrap_or_default();
        let origin = self.presentation_origin();
        let availability_start = match base_offset.combine(element_offset) {
            AvailabilityTimeOffset::AllAvailableAtStart => origin,
            ato => {
                let period_start = self.representation_period_start(rep);
                let mut start = shift(shift(origin, to_delta(period_start)), to_delta(offset));
                if let AvailabilityTimeOffset::Value(secs) = ato {
                    start = shift(start, -secs_to_delta(secs));
                }
                // a live segment is complete once the encoder has produced all of it
                if self.is_live() && !duration.is_zero() {
                    start = shift(start, to_delta(duration));
                }
                start
            },
        };
        trace!(%url, %availability_start, "media segment availability");
        Ok(SegmentAvailability::new(availability_start, self.mpd().availabilityEndTime, duration, url))
    }

    /// The URL and availability window of the initialization segment of the Representation at
    /// `rep`. The URL is empty when there is no separate initialization segment.
    pub fn init_availability(&self, rep: Node) -> Result<SegmentAvailability, DashMpdError> {
        let representation = self.representation_at(rep)?;
        let governing = self.governing_addressing(rep)?;
        let Some(owner) = governing.owner() else {
            return Ok(self.degenerate_availability(rep));
        };
        let bases = self.effective_base_urls(owner)?;
        let mut vars = Variables::default();
        if let Some(id) = &representation.id {
            vars = vars.with_representation_id(id.clone());
        }
        if let Some(bw) = representation.bandwidth {
            vars = vars.with_bandwidth(bw);
        }
        let url = match &governing {
            GoverningAddressing::Template { template, .. } => template.expand_initialization(&vars)
                .map(|reference| resolve_reference(&bases, &reference))
                .transpose()?,
            GoverningAddressing::List { list, .. } => list.Initialization.as_ref()
                .and_then(|init| init.sourceURL.as_deref())
                .map(|reference| resolve_reference(&bases, reference))
                .transpose()?,
            GoverningAddressing::Base { base, .. } => match base.initialization.as_ref().and_then(|i| i.sourceURL.as_deref()) {
                Some(reference) => Some(resolve_reference(&bases, reference)?),
                // the initialization data is at the start of the single media file
                None => Some(first_base_url(&bases)),
            },
            GoverningAddressing::None => None,
        };
        let start = shift(self.presentation_origin(), to_delta(self.representation_period_start(rep)));
        Ok(SegmentAvailability::new(start, self.mpd().availabilityEndTime, Duration::ZERO, url.unwrap_or_default()))
    }

    /// The zero-based number (and time, for a SegmentTimeline) of the first segment of the
    /// Representation at `rep` that starts at or after `presentation_time`, or `None` if the
    /// Period has no such segment.
    pub fn next_segment_variables(&self, rep: Node, presentation_time: XsDatetime) -> Result<Option<Variables>, DashMpdError> {
        let governing = self.governing_addressing(rep)?;
        let key = rep.period();
        let period_duration = key.and_then(|k| self.calc_duration(k));
        let elapsed = if self.is_live() {
            let period_start = key.and_then(|k| self.period_presentation_start(k))
                .unwrap_or_else(|| self.presentation_origin());
            (presentation_time - period_start).to_std().unwrap_or_default()
        } else {
            Duration::ZERO
        };
        Ok(match &governing {
            GoverningAddressing::Template { template, .. } =>
                Layout::from_template(template, period_duration).next_segment(elapsed, period_duration),
            GoverningAddressing::List { list, .. } =>
                Layout::from_list(list, period_duration).next_segment(elapsed, period_duration),
            GoverningAddressing::Base { .. } => elapsed.is_zero().then(Variables::default),
            GoverningAddressing::None => Some(Variables::default()),
        })
    }

    // The Period that selected queries at `presentation_time` start from.
    fn query_period(&self, presentation_time: XsDatetime) -> Option<usize> {
        let first = self.period_keys().first().copied()?;
        let key = if !self.is_live() || presentation_time < self.presentation_origin() {
            first
        } else {
            self.period_for(presentation_time)?
        };
        self.period_index(key)
    }

    /// For each selected Representation, the next media segment at or after `query_time` (a
    /// time on the local clock). If the Period in progress at `query_time` has no such segment,
    /// the following Periods are tried in turn.
    pub fn selected_segment_availability(&self, query_time: XsDatetime) -> Result<Vec<SegmentAvailability>, DashMpdError> {
        let time = self.system_time_to_presentation_time(query_time);
        let Some(first) = self.query_period(time) else {
            debug!(%time, "no Period in progress");
            return Ok(Vec::new());
        };
        for &key in &self.period_keys()[first..] {
            let mut results = Vec::new();
            for rep in self.selected_in_period(key) {
                if let Some(vars) = self.next_segment_variables(rep, time)? {
                    results.push(self.media_availability(rep, &vars)?);
                }
            }
            if !results.is_empty() {
                return Ok(results);
            }
            debug!(period = ?key, "no selected segments in Period, trying the next one");
        }
        Ok(Vec::new())
    }

    /// The distinct initialization segments of the selected Representations of the Period in
    /// progress now.
    pub fn selected_initialization_segments(&self) -> Result<Vec<SegmentAvailability>, DashMpdError> {
        self.selected_initialization_segments_at(chrono::Utc::now())
    }

    pub fn selected_initialization_segments_at(&self, query_time: XsDatetime) -> Result<Vec<SegmentAvailability>, DashMpdError> {
        let time = self.system_time_to_presentation_time(query_time);
        let Some(idx) = self.query_period(time) else {
            return Ok(Vec::new());
        };
        let key = self.period_keys()[idx];
        let mut segments = BTreeSet::new();
        for rep in self.selected_in_period(key) {
            let init = self.init_availability(rep)?;
            if !init.segment_url.is_empty() {
                segments.insert(init);
            }
        }
        Ok(segments.into_iter().collect())
    }
}
