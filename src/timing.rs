//! Effective start and duration of each Period.
//!
//! A Period may omit its `@start` and `@duration` attributes. The start of the first Period then
//! defaults to zero and the start of a later Period to the end of its predecessor. A missing
//! duration runs until the declared start of the following Period, or for the last Period until
//! the end of the presentation (MPD@mediaPresentationDuration). When none of these is known the
//! value is unresolved, which is normal for the last Period of a live presentation.
//!
//! Timings for all Periods are computed in a single pass and cached in a side table that is
//! discarded whenever the manifest's generation counter moves on.

use std::collections::HashMap;
use std::time::Duration;
use chrono::TimeDelta;
use tracing::{debug, warn};
use crate::{Period, XsDatetime};
use crate::manifest::{Manifest, PeriodKey};


/// The effective timing of a Period, relative to the start of the presentation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PeriodTiming {
    pub start: Option<Duration>,
    pub duration: Option<Duration>,
}

impl PeriodTiming {
    pub fn end(&self) -> Option<Duration> {
        self.start?.checked_add(self.duration?)
    }
}

#[derive(Debug, Default)]
pub(crate) struct TimingCache {
    generation: Option<u64>,
    timings: HashMap<PeriodKey, PeriodTiming>,
}

// chrono works with signed deltas; durations too large to represent saturate.
pub(crate) fn to_delta(d: Duration) -> TimeDelta {
    TimeDelta::from_std(d).unwrap_or(TimeDelta::MAX)
}

/// Compute the effective timing of a sequence of sibling Periods.
pub fn compute_period_timings(periods: &[Period], presentation_duration: Option<Duration>) -> Vec<PeriodTiming> {
    let mut timings: Vec<PeriodTiming> = Vec::with_capacity(periods.len());
    for (i, period) in periods.iter().enumerate() {
        let start = match period.start {
            Some(s) => Some(s),
            None if i == 0 => Some(Duration::ZERO),
            None => timings[i - 1].end(),
        };
        let duration = match (period.duration, periods.get(i + 1)) {
            (Some(d), _) => Some(d),
            (None, Some(next)) => match (next.start, start) {
                (Some(next_start), Some(start)) => {
                    let gap = next_start.checked_sub(start);
                    if gap.is_none() {
                        warn!(period = ?period.id, ?start, ?next_start, "Period starts after its successor");
                    }
                    gap
                },
                _ => None,
            },
            (None, None) => match (presentation_duration, start) {
                (Some(total), Some(start)) => total.checked_sub(start),
                _ => None,
            },
        };
        if start.is_none() {
            debug!(period = ?period.id, "unable to resolve Period start");
        }
        timings.push(PeriodTiming { start, duration });
    }
    timings
}

impl Manifest {
    /// The effective timing of a Period, or `None` for an unknown handle.
    pub fn period_timing(&self, key: PeriodKey) -> Option<PeriodTiming> {
        let mut cache = self.timing_cache();
        if cache.generation != Some(self.generation()) {
            let computed = compute_period_timings(&self.mpd().periods, self.mpd().mediaPresentationDuration);
            cache.timings = self.period_keys().iter().copied().zip(computed).collect();
            cache.generation = Some(self.generation());
            debug!(generation = self.generation(), periods = cache.timings.len(), "computed Period timings");
        }
        cache.timings.get(&key).copied()
    }

    /// The start of a Period relative to the start of the presentation.
    pub fn calc_start(&self, key: PeriodKey) -> Option<Duration> {
        self.period_timing(key)?.start
    }

    pub fn calc_duration(&self, key: PeriodKey) -> Option<Duration> {
        self.period_timing(key)?.duration
    }

    /// The anchor of the presentation timeline: MPD@availabilityStartTime, or the epoch for a
    /// manifest that does not declare one.
    pub fn presentation_origin(&self) -> XsDatetime {
        self.mpd().availabilityStartTime.unwrap_or(XsDatetime::UNIX_EPOCH)
    }

    /// The wall-clock time at which a Period starts.
    pub fn period_presentation_start(&self, key: PeriodKey) -> Option<XsDatetime> {
        let start = self.calc_start(key)?;
        self.presentation_origin().checked_add_signed(to_delta(start))
    }

    /// The Period whose wall-clock interval contains `time`.
    pub fn period_for(&self, time: XsDatetime) -> Option<PeriodKey> {
        for &key in self.period_keys() {
            let Some(start) = self.period_presentation_start(key) else {
                continue;
            };
            if time < start {
                return None;
            }
            match self.calc_duration(key) {
                None => return Some(key),
                Some(d) => {
                    if start.checked_add_signed(to_delta(d)).map_or(true, |end| time < end) {
                        return Some(key);
                    }
                },
            }
        }
        None
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn period(start: Option<u64>, duration: Option<u64>) -> Period {
        Period {
            start: start.map(Duration::from_secs),
            duration: duration.map(Duration::from_secs),
            ..Default::default()
        }
    }

    #[test]
    fn test_start_from_predecessor() {
        let periods = vec![period(None, Some(30)), period(None, Some(20)), period(None, None)];
        let timings = compute_period_timings(&periods, Some(Duration::from_secs(60)));
        assert_eq!(timings[0].start, Some(Duration::ZERO));
        assert_eq!(timings[1].start, Some(Duration::from_secs(30)));
        assert_eq!(timings[2].start, Some(Duration::from_secs(50)));
        assert_eq!(timings[2].duration, Some(Duration::from_secs(10)));
    }

    #[test]
    fn test_unresolved_propagates() {
        let periods = vec![period(Some(0), None), period(None, None), period(None, Some(5))];
        let timings = compute_period_timings(&periods, None);
        assert_eq!(timings[0].duration, None);
        assert_eq!(timings[1].start, None);
        assert_eq!(timings[2].start, None);
        assert_eq!(timings[2].duration, Some(Duration::from_secs(5)));
    }

    #[test]
    fn test_overlapping_successor() {
        let periods = vec![period(Some(20), None), period(Some(10), None)];
        let timings = compute_period_timings(&periods, None);
        assert_eq!(timings[0].duration, None);
    }
}
