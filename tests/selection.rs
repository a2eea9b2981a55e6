// Tests for the selection of Representations
//
// To run this test while enabling printing to stdout/stderr
//
//    cargo test --test selection -- --show-output


pub mod common;
use std::collections::HashSet;
use std::time::Duration;
use pretty_assertions::assert_eq;
use dash_mpd_addressing::{AdaptationSet, DashMpdError, Manifest, MPD, Node, Representation, SegmentTemplate};
use common::{representation, setup_logging, templated_period};


fn two_period_manifest() -> Manifest {
    let mut p1 = templated_period("p1", Some(Duration::ZERO), SegmentTemplate::default(),
                                  vec![representation("v1", 1000), representation("v2", 2000)]);
    p1.adaptations.push(AdaptationSet {
        contentType: Some(String::from("audio")),
        lang: Some(String::from("en")),
        representations: vec![representation("a1", 128)],
        ..Default::default()
    });
    let p2 = templated_period("p2", Some(Duration::from_secs(60)), SegmentTemplate::default(),
                              vec![representation("v1", 1000)]);
    Manifest::new(MPD { periods: vec![p1, p2], ..Default::default() })
}

fn selected_ids(manifest: &Manifest) -> Vec<String> {
    manifest.selected_representations().iter()
        .filter_map(|r| r.representation.id.clone())
        .collect()
}

#[test]
fn test_select_all() {
    setup_logging();
    let mut manifest = two_period_manifest();
    assert!(manifest.selected_representations().is_empty());
    manifest.select_all_representations();
    assert_eq!(selected_ids(&manifest), ["v1", "v2", "a1", "v1"]);
    manifest.deselect_all_representations();
    assert!(selected_ids(&manifest).is_empty());
}

#[test]
fn test_select_per_period() {
    setup_logging();
    let mut manifest = two_period_manifest();
    let keys = manifest.period_keys().to_vec();
    manifest.select_all_in_period(keys[1]);
    assert_eq!(selected_ids(&manifest), ["v1"]);
    assert_eq!(manifest.selected_representations()[0].period, keys[1]);
    manifest.select_all_in_period(keys[0]);
    manifest.deselect_all_in_period(keys[1]);
    assert_eq!(selected_ids(&manifest), ["v1", "v2", "a1"]);
}

#[test]
fn test_select_exclusive() {
    setup_logging();
    let mut manifest = two_period_manifest();
    let p1 = manifest.period_keys()[0];
    manifest.select_all_representations();
    manifest.select_exclusive(Node::Representation(p1, 0, 1)).unwrap();
    // only the AdaptationSet of the chosen Representation is affected
    assert_eq!(selected_ids(&manifest), ["v2", "a1", "v1"]);
    manifest.deselect_representation(Node::Representation(p1, 1, 0)).unwrap();
    assert_eq!(selected_ids(&manifest), ["v2", "v1"]);
    manifest.select_representation(Node::Representation(p1, 0, 0)).unwrap();
    assert_eq!(selected_ids(&manifest), ["v1", "v2", "v1"]);
}

#[test]
fn test_selection_errors() {
    let mut manifest = two_period_manifest();
    let p1 = manifest.period_keys()[0];
    assert!(matches!(manifest.select_representation(Node::Representation(p1, 0, 7)),
                     Err(DashMpdError::Range(_))));
    assert!(manifest.select_representation(Node::AdaptationSet(p1, 0)).is_err());
    manifest.add_representation(p1, 0, Representation::default()).unwrap();
    assert!(matches!(manifest.select_representation(Node::Representation(p1, 0, 2)),
                     Err(DashMpdError::InvalidStructure(_))));
    // Representations without an id are skipped
    manifest.select_all_representations();
    assert_eq!(manifest.selected_representations().len(), 4);
}

#[test]
fn test_removed_representation_leaves_selection() {
    setup_logging();
    let mut manifest = two_period_manifest();
    let p1 = manifest.period_keys()[0];
    manifest.select_all_representations();
    let removed = manifest.remove_representation(p1, 0, "v1").unwrap();
    assert_eq!(removed.id.as_deref(), Some("v1"));
    assert!(!manifest.adaptation_set(p1, 0).unwrap().selected.contains("v1"));
    assert_eq!(selected_ids(&manifest), ["v2", "a1", "v1"]);
    assert!(manifest.remove_representation(p1, 0, "v1").is_err());
}

#[test]
fn test_representation_removed_by_edit_is_not_reselected() {
    setup_logging();
    let mut manifest = two_period_manifest();
    let p1 = manifest.period_keys()[0];
    manifest.select_all_representations();
    manifest.update(|mpd| { mpd.periods[0].adaptations[0].representations.remove(0); });
    assert!(!manifest.adaptation_set(p1, 0).unwrap().selected.contains("v1"));
    manifest.add_representation(p1, 0, representation("v1", 1500)).unwrap();
    assert_eq!(selected_ids(&manifest), ["v2", "a1", "v1"]);

    // the same through a mutable borrow of the AdaptationSet
    manifest.adaptation_set_mut(p1, 0).unwrap().representations.retain(|r| r.id.as_deref() != Some("v2"));
    manifest.adaptation_set_mut(p1, 0).unwrap().representations.push(representation("v2", 2500));
    assert_eq!(selected_ids(&manifest), ["a1", "v1"]);

    // and through a mutable borrow of the Period
    manifest.period_mut(p1).unwrap().adaptations[1].representations.clear();
    manifest.add_representation(p1, 1, representation("a1", 96)).unwrap();
    assert_eq!(selected_ids(&manifest), ["v1"]);
}

#[test]
fn test_references_compare_by_position_and_id() {
    let mut manifest = two_period_manifest();
    manifest.select_all_representations();
    let refs = manifest.selected_representations();
    let unique: HashSet<_> = refs.iter().collect();
    // "v1" appears in both Periods, which makes two distinct references
    assert_eq!(unique.len(), 4);
    assert_ne!(refs[0], refs[3]);
    assert_eq!(refs[0], manifest.selected_representations()[0]);
    assert_eq!(refs[2].node(), Node::Representation(manifest.period_keys()[0], 1, 0));
}
