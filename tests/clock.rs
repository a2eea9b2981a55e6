// Tests for synchronisation with the clock of a live presentation
//
// To run this test while enabling printing to stdout/stderr
//
//    RUST_LOG=debug cargo test --test clock -- --show-output


pub mod common;
use std::sync::Arc;
use std::time::Duration;
use chrono::{TimeDelta, Utc};
use anyhow::{Context, Result};
use dash_mpd_addressing::{DirectClock, Manifest, MPD, SegmentTemplate, UTCTiming};
use dash_mpd_addressing::clock::UTC_DIRECT_SCHEME;
use common::{representation, setup_logging, templated_period};


fn close_to(a: TimeDelta, b: TimeDelta) -> bool {
    (a - b).num_milliseconds().abs() < 5_000
}

fn live_mpd(remote_clock: chrono::DateTime<Utc>) -> MPD {
    let template = SegmentTemplate {
        media: Some(String::from("$RepresentationID$/$Number$.m4s")),
        duration: Some(2.0),
        ..Default::default()
    };
    MPD {
        mpdtype: Some(String::from("dynamic")),
        profiles: Some(String::from("urn:mpeg:dash:profile:isoff-live:2011")),
        availabilityStartTime: Some(remote_clock - TimeDelta::minutes(10)),
        UTCTiming: vec![UTCTiming {
            schemeIdUri: Some(String::from(UTC_DIRECT_SCHEME)),
            value: Some(remote_clock.to_rfc3339()),
        }],
        periods: vec![templated_period("0", Some(Duration::ZERO), template, vec![representation("v1", 1000)])],
        ..Default::default()
    }
}

#[test]
fn test_direct_clock_offset() -> Result<()> {
    setup_logging();
    let remote = Utc::now() + TimeDelta::hours(2);
    let mut manifest = Manifest::new(live_mpd(remote))
        .with_clock(Arc::new(DirectClock));
    assert!(close_to(manifest.clock_offset(), TimeDelta::hours(2)));
    assert!(close_to(manifest.now() - Utc::now(), TimeDelta::hours(2)));

    let t = Utc::now();
    let presentation = manifest.system_time_to_presentation_time(t);
    assert_eq!(manifest.presentation_time_to_system_time(presentation), t);

    // the offset is cached until invalidated
    manifest.update(|mpd| mpd.UTCTiming.clear());
    assert!(close_to(manifest.clock_offset(), TimeDelta::hours(2)));
    manifest.invalidate_clock_offset();
    assert_eq!(manifest.clock_offset(), TimeDelta::zero());
    Ok(())
}

#[test]
fn test_default_clock_ignores_utc_timing() -> Result<()> {
    setup_logging();
    let manifest = Manifest::new(live_mpd(Utc::now() + TimeDelta::hours(2)));
    assert_eq!(manifest.clock_offset(), TimeDelta::zero());
    Ok(())
}

#[test]
fn test_segment_query_uses_presentation_clock() -> Result<()> {
    setup_logging();
    let remote = Utc::now() + TimeDelta::hours(2);
    let mut manifest = Manifest::new(live_mpd(remote))
        .with_clock(Arc::new(DirectClock))
        .with_mpd_url("https://live.example.com/channel/manifest.mpd")?;
    manifest.select_all_representations();
    // ten minutes into the presentation on its own clock, although the local clock is two hours
    // behind the start of the presentation
    let segments = manifest.selected_segment_availability(Utc::now())?;
    let seg = segments.first().context("no segment for the selected Representation")?;
    let number: u64 = seg.segment_url
        .trim_start_matches("https://live.example.com/channel/v1/")
        .trim_end_matches(".m4s")
        .parse()?;
    assert!((300..=305).contains(&number), "unexpected segment number {number}");
    Ok(())
}
