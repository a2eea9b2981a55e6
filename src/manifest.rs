//! The `Manifest` owns a parsed `MPD` together with the state needed to answer timing and
//! addressing queries: stable handles for its Periods, a generation counter bumped by every
//! structural mutation, the Period timing cache, the manifest retrieval URL and the clock used to
//! interpret live timing.
//!
//! Periods are addressed by a [`PeriodKey`], which stays valid when other Periods are inserted or
//! removed and is preserved by `Clone`. AdaptationSets and Representations are addressed by their
//! position within their parent, through the [`Node`] enum.

use std::sync::{Arc, Mutex, OnceLock, PoisonError, MutexGuard};
use std::time::Duration;
use chrono::TimeDelta;
use tracing::{debug, trace};
use crate::{AdaptationSet, DashMpdError, MPD, Period, Representation, XsDatetime, parse};
use crate::uri::UriComponents;
use crate::timing::TimingCache;
use crate::clock::{ClockSynchronizer, SystemClock};


/// Profiles identifying a manifest intended for live streaming.
pub const LIVE_PROFILES: [&str; 2] = [
    "urn:mpeg:dash:profile:isoff-live:2011",
    "urn:dvb:dash:profile:dvb-dash:isoff-ext-live:2014",
];


/// A stable handle on a Period of a [`Manifest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PeriodKey(u64);

/// A node of the manifest tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Node {
    Mpd,
    Period(PeriodKey),
    /// An AdaptationSet, by index within its Period.
    AdaptationSet(PeriodKey, usize),
    /// A Representation, by index of its AdaptationSet and index within that AdaptationSet.
    Representation(PeriodKey, usize, usize),
}

impl Node {
    pub fn parent(&self) -> Option<Node> {
        match *self {
            Node::Mpd => None,
            Node::Period(_) => Some(Node::Mpd),
            Node::AdaptationSet(p, _) => Some(Node::Period(p)),
            Node::Representation(p, a, _) => Some(Node::AdaptationSet(p, a)),
        }
    }

    pub fn period(&self) -> Option<PeriodKey> {
        match *self {
            Node::Mpd => None,
            Node::Period(p) | Node::AdaptationSet(p, _) | Node::Representation(p, _, _) => Some(p),
        }
    }

    /// This node followed by its ancestors, up to the MPD.
    pub fn ancestry(&self) -> impl Iterator<Item = Node> {
        std::iter::successors(Some(*self), Node::parent)
    }
}


#[derive(Debug)]
pub struct Manifest {
    mpd: MPD,
    // parallel to mpd.periods
    keys: Vec<PeriodKey>,
    next_key: u64,
    generation: u64,
    timing: Mutex<TimingCache>,
    mpd_url: Option<UriComponents>,
    clock: Arc<dyn ClockSynchronizer>,
    pub(crate) clock_offset: OnceLock<TimeDelta>,
}

impl Manifest {
    pub fn new(mpd: MPD) -> Manifest {
        let count = mpd.periods.len() as u64;
        Manifest {
            mpd,
            keys: (0..count).map(PeriodKey).collect(),
            next_key: count,
            generation: 0,
            timing: Mutex::new(TimingCache::default()),
            mpd_url: None,
            clock: Arc::new(SystemClock),
            clock_offset: OnceLock::new(),
        }
    }

    /// Parse an MPD manifest from its XML form.
    pub fn from_xml(xml: &str) -> Result<Manifest, DashMpdError> {
        parse(xml).map(Manifest::new)
    }

    /// Set the URL from which the manifest was retrieved, the root of the BaseURL cascade.
    pub fn with_mpd_url(mut self, url: &str) -> Result<Manifest, DashMpdError> {
        let parsed = UriComponents::parse(url)?;
        if !parsed.is_absolute() {
            return Err(DashMpdError::Parsing(format!("manifest URL {url} is not absolute")));
        }
        self.mpd_url = Some(parsed);
        Ok(self)
    }

    /// Use `clock` to synchronise with the UTCTiming sources declared in the manifest.
    pub fn with_clock(mut self, clock: Arc<dyn ClockSynchronizer>) -> Manifest {
        self.clock = clock;
        self.clock_offset = OnceLock::new();
        self
    }

    pub fn mpd(&self) -> &MPD {
        &self.mpd
    }

    pub fn into_mpd(self) -> MPD {
        self.mpd
    }

    pub fn mpd_url(&self) -> Option<&UriComponents> {
        self.mpd_url.as_ref()
    }

    pub(crate) fn clock(&self) -> &dyn ClockSynchronizer {
        self.clock.as_ref()
    }

    /// Incremented by every mutation that can change Period timing.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    fn bump_generation(&mut self) {
        self.generation += 1;
        trace!(generation = self.generation, "manifest changed");
    }

    pub(crate) fn timing_cache(&self) -> MutexGuard<'_, TimingCache> {
        self.timing.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn fresh_key(&mut self) -> PeriodKey {
        let key = PeriodKey(self.next_key);
        self.next_key += 1;
        key
    }

    fn rekey(&mut self) {
        let count = self.mpd.periods.len();
        let keys: Vec<PeriodKey> = (0..count).map(|_| self.fresh_key()).collect();
        self.keys = keys;
        debug!(periods = count, "period handles reassigned");
    }

    // Selections made before Representations were removed through a mutable borrow.
    fn prune_selections(&mut self) {
        self.mpd.periods.iter_mut()
            .flat_map(|p| p.adaptations.iter_mut())
            .for_each(AdaptationSet::prune_selection);
    }

    /// Apply arbitrary changes to the underlying MPD. If the number of Periods changes, all
    /// existing `PeriodKey`s are invalidated.
    pub fn update<F: FnOnce(&mut MPD)>(&mut self, f: F) {
        let count = self.mpd.periods.len();
        self.prune_selections();
        f(&mut self.mpd);
        if self.mpd.periods.len() != count {
            self.rekey();
        }
        self.prune_selections();
        self.bump_generation();
    }

    pub fn set_media_presentation_duration(&mut self, duration: Option<Duration>) {
        self.mpd.mediaPresentationDuration = duration;
        self.bump_generation();
    }

    // Periods

    /// Handles of the Periods, in document order.
    pub fn period_keys(&self) -> &[PeriodKey] {
        &self.keys
    }

    pub fn period_index(&self, key: PeriodKey) -> Option<usize> {
        self.keys.iter().position(|k| *k == key)
    }

    pub fn period(&self, key: PeriodKey) -> Option<&Period> {
        self.period_index(key).map(|i| &self.mpd.periods[i])
    }

    /// Mutable access to a Period. Timing caches are invalidated.
    pub fn period_mut(&mut self, key: PeriodKey) -> Option<&mut Period> {
        let idx = self.period_index(key)?;
        self.bump_generation();
        let period = &mut self.mpd.periods[idx];
        period.adaptations.iter_mut().for_each(AdaptationSet::prune_selection);
        Some(period)
    }

    pub fn periods(&self) -> impl Iterator<Item = (PeriodKey, &Period)> {
        self.keys.iter().copied().zip(self.mpd.periods.iter())
    }

    pub fn period_by_id(&self, id: &str) -> Option<PeriodKey> {
        self.periods()
            .find(|(_, p)| p.id.as_deref() == Some(id))
            .map(|(k, _)| k)
    }

    pub fn previous_period(&self, key: PeriodKey) -> Option<PeriodKey> {
        let idx = self.period_index(key)?;
        idx.checked_sub(1).map(|i| self.keys[i])
    }

    pub fn next_period(&self, key: PeriodKey) -> Option<PeriodKey> {
        let idx = self.period_index(key)?;
        self.keys.get(idx + 1).copied()
    }

    fn unknown_period(key: PeriodKey) -> DashMpdError {
        DashMpdError::Range(format!("no Period with handle {key:?}"))
    }

    pub fn set_period_start(&mut self, key: PeriodKey, start: Option<Duration>) -> Result<(), DashMpdError> {
        let period = self.period_mut(key).ok_or_else(|| Manifest::unknown_period(key))?;
        period.start = start;
        Ok(())
    }

    pub fn set_period_duration(&mut self, key: PeriodKey, duration: Option<Duration>) -> Result<(), DashMpdError> {
        let period = self.period_mut(key).ok_or_else(|| Manifest::unknown_period(key))?;
        period.duration = duration;
        Ok(())
    }

    /// Add a Period. A Period that declares its start is inserted before the first Period whose
    /// declared start is later; other Periods are appended.
    pub fn add_period(&mut self, period: Period) -> PeriodKey {
        let idx = match period.start {
            Some(start) => self.mpd.periods.iter()
                .position(|p| p.start.is_some_and(|s| s > start))
                .unwrap_or(self.mpd.periods.len()),
            None => self.mpd.periods.len(),
        };
        let key = self.fresh_key();
        self.mpd.periods.insert(idx, period);
        self.keys.insert(idx, key);
        self.bump_generation();
        key
    }

    /// Remove a Period. Removing the only Period of the manifest is rejected.
    pub fn remove_period(&mut self, key: PeriodKey) -> Result<Period, DashMpdError> {
        let idx = self.period_index(key).ok_or_else(|| Manifest::unknown_period(key))?;
        if self.mpd.periods.len() == 1 {
            return Err(DashMpdError::InvalidStructure(
                String::from("removing the only Period would make the MPD invalid")));
        }
        self.keys.remove(idx);
        let removed = self.mpd.periods.remove(idx);
        self.bump_generation();
        Ok(removed)
    }

    pub fn remove_period_by_id(&mut self, id: &str) -> Result<Period, DashMpdError> {
        let key = self.period_by_id(id)
            .ok_or_else(|| DashMpdError::Range(format!("no Period with id {id}")))?;
        self.remove_period(key)
    }

    // AdaptationSets and Representations

    pub fn adaptation_set(&self, key: PeriodKey, adaptation: usize) -> Option<&AdaptationSet> {
        self.period(key)?.adaptations.get(adaptation)
    }

    /// Mutable access to an AdaptationSet. Selected ids of Representations removed through an
    /// earlier borrow are forgotten first.
    pub fn adaptation_set_mut(&mut self, key: PeriodKey, adaptation: usize) -> Option<&mut AdaptationSet> {
        let idx = self.period_index(key)?;
        let aset = self.mpd.periods[idx].adaptations.get_mut(adaptation)?;
        aset.prune_selection();
        Some(aset)
    }

    pub fn representation(&self, key: PeriodKey, adaptation: usize, representation: usize) -> Option<&Representation> {
        self.adaptation_set(key, adaptation)?.representations.get(representation)
    }

    /// The Representation designated by a `Node::Representation`.
    pub fn representation_at(&self, node: Node) -> Result<&Representation, DashMpdError> {
        match node {
            Node::Representation(p, a, r) => self.representation(p, a, r)
                .ok_or_else(|| DashMpdError::Range(format!("no Representation at {node:?}"))),
            _ => Err(DashMpdError::Range(format!("{node:?} is not a Representation"))),
        }
    }

    /// Whether `node` designates an element of this manifest.
    pub fn contains(&self, node: Node) -> bool {
        match node {
            Node::Mpd => true,
            Node::Period(p) => self.period(p).is_some(),
            Node::AdaptationSet(p, a) => self.adaptation_set(p, a).is_some(),
            Node::Representation(p, a, r) => self.representation(p, a, r).is_some(),
        }
    }

    /// Append a Representation to an AdaptationSet, returning its index.
    pub fn add_representation(&mut self, key: PeriodKey, adaptation: usize, rep: Representation) -> Result<usize, DashMpdError> {
        let aset = self.adaptation_set_mut(key, adaptation)
            .ok_or_else(|| DashMpdError::Range(format!("no AdaptationSet {adaptation} in Period {key:?}")))?;
        aset.representations.push(rep);
        Ok(aset.representations.len() - 1)
    }

    /// Remove the Representation with identifier `id` from an AdaptationSet, and from the set of
    /// selected Representations.
    pub fn remove_representation(&mut self, key: PeriodKey, adaptation: usize, id: &str) -> Result<Representation, DashMpdError> {
        let aset = self.adaptation_set_mut(key, adaptation)
            .ok_or_else(|| DashMpdError::Range(format!("no AdaptationSet {adaptation} in Period {key:?}")))?;
        let pos = aset.representations.iter()
            .position(|r| r.id.as_deref() == Some(id))
            .ok_or_else(|| DashMpdError::Range(format!("no Representation with id {id}")))?;
        aset.selected.remove(id);
        Ok(aset.representations.remove(pos))
    }

    // Profiles and presentation type

    /// The profile URIs declared by the manifest.
    pub fn profiles(&self) -> Vec<String> {
        self.mpd.profiles.as_deref()
            .unwrap_or("")
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(String::from)
            .collect()
    }

    pub fn has_profile(&self, profile: &str) -> bool {
        self.profiles().iter().any(|p| p == profile)
    }

    pub fn add_profile(&mut self, profile: &str) {
        let mut profiles = self.profiles();
        if !profiles.iter().any(|p| p == profile) {
            profiles.push(profile.to_string());
            self.mpd.profiles = Some(profiles.join(","));
            self.bump_generation();
        }
    }

    /// Remove a declared profile. The manifest must keep at least one profile.
    pub fn remove_profile(&mut self, profile: &str) -> Result<(), DashMpdError> {
        let mut profiles = self.profiles();
        let Some(pos) = profiles.iter().position(|p| p == profile) else {
            return Ok(());
        };
        if profiles.len() == 1 {
            return Err(DashMpdError::InvalidStructure(
                String::from("removing the only profile would make the MPD invalid")));
        }
        profiles.remove(pos);
        self.mpd.profiles = Some(profiles.join(","));
        self.bump_generation();
        Ok(())
    }

    pub fn is_dynamic(&self) -> bool {
        self.mpd.mpdtype.as_deref() == Some("dynamic")
    }

    /// Whether this is a live presentation: a dynamic manifest with an availabilityStartTime that
    /// declares one of the live profiles.
    pub fn is_live(&self) -> bool {
        self.is_dynamic() &&
            self.mpd.availabilityStartTime.is_some() &&
            self.profiles().iter().any(|p| LIVE_PROFILES.contains(&p.as_str()))
    }

    /// The time after which a dynamic manifest should be fetched again.
    pub fn manifest_expiry(&self) -> Option<XsDatetime> {
        if !self.is_dynamic() {
            return None;
        }
        let published = self.mpd.publishTime?;
        let update = TimeDelta::from_std(self.mpd.minimumUpdatePeriod?).ok()?;
        published.checked_add_signed(update)
    }
}

impl Clone for Manifest {
    fn clone(&self) -> Self {
        Manifest {
            mpd: self.mpd.clone(),
            keys: self.keys.clone(),
            next_key: self.next_key,
            generation: self.generation,
            timing: Mutex::new(TimingCache::default()),
            mpd_url: self.mpd_url.clone(),
            clock: Arc::clone(&self.clock),
            clock_offset: self.clock_offset.clone(),
        }
    }
}

impl From<MPD> for Manifest {
    fn from(mpd: MPD) -> Self {
        Manifest::new(mpd)
    }
}
