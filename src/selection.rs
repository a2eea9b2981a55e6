//! The set of Representations a client has chosen to play.
//!
//! Each AdaptationSet records the identifiers of its selected Representations. A Representation
//! without an `@id` cannot be selected. Removing a Representation from the manifest also removes it
//! from the selection, whichever way it is removed: the ids of vanished Representations are pruned
//! by every mutating access to the manifest.

use std::hash::{Hash, Hasher};
use tracing::{debug, warn};
use crate::{AdaptationSet, DashMpdError, Representation};
use crate::manifest::{Manifest, Node, PeriodKey};


impl AdaptationSet {
    /// Add the Representation with identifier `id` to the selection. Returns false if this
    /// AdaptationSet contains no such Representation.
    pub fn select(&mut self, id: &str) -> bool {
        if !self.representations.iter().any(|r| r.id.as_deref() == Some(id)) {
            return false;
        }
        self.selected.insert(id.to_string());
        true
    }

    /// Make the Representation with identifier `id` the only one selected in this AdaptationSet.
    pub fn select_exclusive(&mut self, id: &str) -> bool {
        if !self.representations.iter().any(|r| r.id.as_deref() == Some(id)) {
            return false;
        }
        self.selected.clear();
        self.selected.insert(id.to_string());
        true
    }

    pub fn deselect(&mut self, id: &str) -> bool {
        self.selected.remove(id)
    }

    pub fn select_all(&mut self) {
        self.selected = self.representations.iter()
            .filter_map(|r| r.id.clone())
            .collect();
    }

    pub fn deselect_all(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, rep: &Representation) -> bool {
        rep.id.as_ref().is_some_and(|id| self.selected.contains(id))
    }

    /// Forget selected ids that no longer name a Representation of this AdaptationSet.
    pub fn prune_selection(&mut self) {
        let representations = &self.representations;
        self.selected.retain(|id| representations.iter().any(|r| r.id.as_deref() == Some(id.as_str())));
    }

    /// The selected Representations, in document order.
    pub fn selected(&self) -> impl Iterator<Item = &Representation> {
        self.representations.iter().filter(|r| self.is_selected(r))
    }
}


/// A selected Representation, with its position in the manifest.
///
/// Two references are equal when they designate the Representation with the same identifier in
/// the same AdaptationSet of the same Period.
#[derive(Debug, Clone, Copy)]
pub struct RepresentationRef<'a> {
    pub period: PeriodKey,
    pub adaptation: usize,
    pub index: usize,
    pub representation: &'a Representation,
}

impl RepresentationRef<'_> {
    pub fn node(&self) -> Node {
        Node::Representation(self.period, self.adaptation, self.index)
    }
}

impl PartialEq for RepresentationRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.period == other.period &&
            self.adaptation == other.adaptation &&
            self.representation.id == other.representation.id
    }
}

impl Eq for RepresentationRef<'_> {}

impl Hash for RepresentationRef<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.period.hash(state);
        self.adaptation.hash(state);
        self.representation.id.hash(state);
    }
}


impl Manifest {
    // Selection state does not affect timing, so it is modified without bumping the generation.
    fn for_each_adaptation_set<F: FnMut(&mut AdaptationSet)>(&mut self, key: PeriodKey, mut f: F) {
        let count = self.period(key).map_or(0, |p| p.adaptations.len());
        for a in 0..count {
            if let Some(aset) = self.adaptation_set_mut(key, a) {
                f(aset);
            }
        }
    }

    fn representation_id(&self, node: Node) -> Result<String, DashMpdError> {
        let rep = self.representation_at(node)?;
        rep.id.clone()
            .ok_or_else(|| DashMpdError::InvalidStructure(format!("Representation at {node:?} has no id")))
    }

    /// Select the Representation at `node`, in addition to those already selected.
    pub fn select_representation(&mut self, node: Node) -> Result<(), DashMpdError> {
        let id = self.representation_id(node)?;
        if let Node::Representation(p, a, _) = node {
            if let Some(aset) = self.adaptation_set_mut(p, a) {
                aset.select(&id);
            }
        }
        Ok(())
    }

    /// Select the Representation at `node`, deselecting the other Representations of its
    /// AdaptationSet.
    pub fn select_exclusive(&mut self, node: Node) -> Result<(), DashMpdError> {
        let id = self.representation_id(node)?;
        if let Node::Representation(p, a, _) = node {
            if let Some(aset) = self.adaptation_set_mut(p, a) {
                aset.select_exclusive(&id);
            }
        }
        Ok(())
    }

    pub fn deselect_representation(&mut self, node: Node) -> Result<(), DashMpdError> {
        let id = self.representation_id(node)?;
        if let Node::Representation(p, a, _) = node {
            if let Some(aset) = self.adaptation_set_mut(p, a) {
                aset.deselect(&id);
            }
        }
        Ok(())
    }

    pub fn select_all_in_period(&mut self, key: PeriodKey) {
        self.for_each_adaptation_set(key, AdaptationSet::select_all);
    }

    pub fn deselect_all_in_period(&mut self, key: PeriodKey) {
        self.for_each_adaptation_set(key, AdaptationSet::deselect_all);
    }

    /// Select every Representation that has an identifier, in every Period.
    pub fn select_all_representations(&mut self) {
        let keys = self.period_keys().to_vec();
        for key in keys {
            self.select_all_in_period(key);
        }
        let unselectable = self.periods()
            .flat_map(|(_, p)| p.adaptations.iter())
            .flat_map(|a| a.representations.iter())
            .filter(|r| r.id.is_none())
            .count();
        if unselectable > 0 {
            warn!(count = unselectable, "ignoring Representations without an id");
        }
    }

    pub fn deselect_all_representations(&mut self) {
        let keys = self.period_keys().to_vec();
        for key in keys {
            self.deselect_all_in_period(key);
        }
    }

    /// The selected Representations of every Period, in document order.
    pub fn selected_representations(&self) -> Vec<RepresentationRef<'_>> {
        let mut selected = Vec::new();
        for (key, period) in self.periods() {
            for (a, aset) in period.adaptations.iter().enumerate() {
                for (r, rep) in aset.representations.iter().enumerate() {
                    if aset.is_selected(rep) {
                        selected.push(RepresentationRef { period: key, adaptation: a, index: r, representation: rep });
                    }
                }
            }
        }
        debug!(count = selected.len(), "selected Representations");
        selected
    }

    pub(crate) fn selected_in_period(&self, key: PeriodKey) -> Vec<Node> {
        self.selected_representations().into_iter()
            .filter(|r| r.period == key)
            .map(|r| r.node())
            .collect()
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    fn rep(id: Option<&str>) -> Representation {
        Representation { id: id.map(String::from), ..Default::default() }
    }

    #[test]
    fn test_adaptation_set_selection() {
        let mut aset = AdaptationSet {
            representations: vec![rep(Some("a")), rep(Some("b")), rep(None)],
            ..Default::default()
        };
        assert!(aset.select("a"));
        assert!(!aset.select("zz"));
        assert_eq!(aset.selected().count(), 1);
        aset.select_all();
        assert_eq!(aset.selected().count(), 2);
        assert!(aset.select_exclusive("b"));
        let ids: Vec<_> = aset.selected().filter_map(|r| r.id.as_deref()).collect();
        assert_eq!(ids, ["b"]);
        assert!(aset.deselect("b"));
        assert!(!aset.deselect("b"));
        assert_eq!(aset.selected().count(), 0);
    }
}
