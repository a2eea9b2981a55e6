//! Synchronisation of the local clock with the time source of a live presentation.
//!
//! Availability times in a dynamic manifest are expressed on the clock of the packager, which the
//! manifest can advertise through `UTCTiming` elements. A [`ClockSynchronizer`] turns these
//! elements into an offset between the local clock and the reference clock. The offset is computed
//! the first time a [`Manifest`] needs it and cached until [`Manifest::invalidate_clock_offset`] is
//! called (typically after a manifest refresh).

use std::fmt;
use std::sync::OnceLock;
use chrono::{DateTime, TimeDelta, Utc};
use tracing::{debug, info, warn};
use crate::{UTCTiming, XsDatetime};
use crate::manifest::Manifest;


pub const UTC_DIRECT_SCHEME: &str = "urn:mpeg:dash:utc:direct:2014";

/// Computes how far the local clock is behind the reference clock described by `UTCTiming`
/// elements. A positive offset means that the reference clock is ahead.
pub trait ClockSynchronizer: fmt::Debug + Send + Sync {
    fn synchronise(&self, timing: &[UTCTiming]) -> TimeDelta;
}

/// Trusts the local clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl ClockSynchronizer for SystemClock {
    fn synchronise(&self, _timing: &[UTCTiming]) -> TimeDelta {
        TimeDelta::zero()
    }
}

/// Uses the time embedded in the manifest with the `urn:mpeg:dash:utc:direct:2014` scheme. Other
/// schemes need a network request and are ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct DirectClock;

fn parse_xs_datetime(value: &str) -> Option<XsDatetime> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .ok()
        .or_else(|| {
            // xs:dateTime without a timezone is taken as UTC
            chrono::NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
                .ok()
                .map(|naive| naive.and_utc())
        })
}

impl ClockSynchronizer for DirectClock {
    fn synchronise(&self, timing: &[UTCTiming]) -> TimeDelta {
        for t in timing {
            let scheme = t.schemeIdUri.as_deref().unwrap_or("");
            if scheme != UTC_DIRECT_SCHEME {
                debug!(scheme, "skipping unsupported UTCTiming scheme");
                continue;
            }
            let Some(value) = t.value.as_deref() else {
                warn!(scheme, "missing value for UTCTiming");
                continue;
            };
            match parse_xs_datetime(value.trim()) {
                Some(remote) => {
                    let offset = remote - Utc::now();
                    info!(offset_milliseconds = offset.num_milliseconds(), "clock synchronised to {remote}");
                    return offset;
                },
                None => warn!(value, "unable to parse direct UTCTiming value"),
            }
        }
        warn!("no usable UTCTiming element, using the local clock");
        TimeDelta::zero()
    }
}

impl Manifest {
    /// How far the local clock is behind the clock of the presentation.
    pub fn clock_offset(&self) -> TimeDelta {
        *self.clock_offset.get_or_init(|| {
            let offset = self.clock().synchronise(&self.mpd().UTCTiming);
            debug!(offset_milliseconds = offset.num_milliseconds(), "computed clock offset");
            offset
        })
    }

    /// Forget the cached clock offset, so that the next query synchronises again.
    pub fn invalidate_clock_offset(&mut self) {
        self.clock_offset = OnceLock::new();
    }

    /// The current time on the presentation's clock.
    pub fn now(&self) -> XsDatetime {
        self.system_time_to_presentation_time(Utc::now())
    }

    pub fn system_time_to_presentation_time(&self, t: XsDatetime) -> XsDatetime {
        t.checked_add_signed(self.clock_offset()).unwrap_or(t)
    }

    pub fn presentation_time_to_system_time(&self, t: XsDatetime) -> XsDatetime {
        t.checked_sub_signed(self.clock_offset()).unwrap_or(t)
    }
}
