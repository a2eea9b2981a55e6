// Tests for segment URL and availability calculations
//
// To run this test while enabling printing to stdout/stderr
//
//    RUST_LOG=debug cargo test --test availability -- --show-output


pub mod common;
use std::time::Duration;
use chrono::{TimeDelta, TimeZone, Utc};
use pretty_assertions::assert_eq;
use dash_mpd_addressing::{BaseURL, DashMpdError, Initialization, Manifest, MPD, Node, Period,
                          SegmentAvailability, SegmentBase, SegmentList, SegmentTemplate,
                          SegmentTimeline, SegmentURL, Variables, S, XsDatetime};
use common::{representation, setup_logging, templated_period};


const LIVE_PROFILE: &str = "urn:mpeg:dash:profile:isoff-live:2011";

fn ast() -> XsDatetime {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn numbered_template() -> SegmentTemplate {
    SegmentTemplate {
        media: Some(String::from("$RepresentationID$/seg-$Number$.m4s")),
        initialization: Some(String::from("$RepresentationID$/init.mp4")),
        duration: Some(4.0),
        timescale: Some(1),
        startNumber: Some(1),
        ..Default::default()
    }
}

fn live_manifest(template: SegmentTemplate) -> Manifest {
    let mpd = MPD {
        mpdtype: Some(String::from("dynamic")),
        profiles: Some(String::from(LIVE_PROFILE)),
        availabilityStartTime: Some(ast()),
        periods: vec![templated_period("live", Some(Duration::ZERO), template,
                                       vec![representation("v1", 2_000_000)])],
        ..Default::default()
    };
    Manifest::new(mpd)
        .with_mpd_url("https://cdn.example.com/live/manifest.mpd").unwrap()
}

fn static_manifest(period: Period) -> Manifest {
    let mpd = MPD {
        mpdtype: Some(String::from("static")),
        mediaPresentationDuration: Some(Duration::from_secs(30)),
        periods: vec![period],
        ..Default::default()
    };
    Manifest::new(mpd)
        .with_mpd_url("https://cdn.example.com/vod/manifest.mpd").unwrap()
}

fn first_rep(manifest: &Manifest) -> Node {
    Node::Representation(manifest.period_keys()[0], 0, 0)
}


#[test]
fn test_ordering_and_display() {
    let t = ast();
    let mut segments = vec![
        SegmentAvailability::new(t, None, Duration::from_secs(2), "b.m4s"),
        SegmentAvailability::new(t, None, Duration::from_secs(2), "a.m4s"),
        SegmentAvailability::new(t - TimeDelta::seconds(2), None, Duration::from_secs(2), "z.m4s"),
    ];
    segments.sort();
    let urls: Vec<_> = segments.iter().map(|s| s.segment_url.as_str()).collect();
    assert_eq!(urls, ["z.m4s", "a.m4s", "b.m4s"]);
    let ended = SegmentAvailability::new(t, Some(t + TimeDelta::hours(1)), Duration::from_secs(2), "e.m4s");
    assert!(ended.is_available_at(t + TimeDelta::minutes(59)));
    assert!(!ended.is_available_at(t + TimeDelta::hours(1)));
    assert!(!ended.is_available_at(t - TimeDelta::seconds(1)));
    assert!(ended.to_string().starts_with("e.m4s available from 2024-06-01 12:00:00"));
}

#[test]
fn test_static_end_to_end() {
    setup_logging();
    let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="static" minBufferTime="PT3.84S"
     mediaPresentationDuration="PT30S" profiles="urn:mpeg:dash:profile:isoff-on-demand:2011">
  <Period id="p0">
    <AdaptationSet mimeType="video/mp4" contentType="video">
      <SegmentTemplate media="$RepresentationID$/$Number$.m4s" duration="4" timescale="1"/>
      <Representation id="v1" bandwidth="500000" width="640" height="360"/>
      <Representation id="v2" bandwidth="1000000" width="1280" height="720"/>
    </AdaptationSet>
  </Period>
</MPD>"#;
    let mut manifest = Manifest::from_xml(xml).unwrap();
    assert_eq!(manifest.mpd().minBufferTime, Some(Duration::from_millis(3840)));
    manifest.select_all_representations();
    let segments = manifest.selected_segment_availability(Utc::now()).unwrap();
    assert_eq!(segments.len(), 2);
    assert!(segments[0].segment_url.contains("v1"));
    assert!(segments[1].segment_url.contains("v2"));
    assert_eq!(segments[0].segment_url, "v1/1.m4s");
    assert_eq!(segments[0].availability_start, XsDatetime::UNIX_EPOCH);
    assert_eq!(segments[0].segment_duration, Duration::from_secs(4));
    assert_eq!(segments[0].availability_end, None);

    let manifest = manifest.with_mpd_url("https://cdn.example.com/vod/manifest.mpd").unwrap();
    let segments = manifest.selected_segment_availability(Utc::now()).unwrap();
    assert_eq!(segments[1].segment_url, "https://cdn.example.com/vod/v2/1.m4s");
}

#[test]
fn test_nothing_selected() {
    setup_logging();
    let manifest = static_manifest(templated_period("p0", None, numbered_template(),
                                                    vec![representation("v1", 1000)]));
    assert!(manifest.selected_segment_availability(Utc::now()).unwrap().is_empty());
    assert!(manifest.selected_initialization_segments().unwrap().is_empty());
}

#[test]
fn test_live_next_segment() {
    setup_logging();
    let mut manifest = live_manifest(numbered_template());
    assert!(manifest.is_live());
    manifest.select_all_representations();
    let segments = manifest.selected_segment_availability(ast() + TimeDelta::seconds(10)).unwrap();
    assert_eq!(segments.len(), 1);
    let seg = &segments[0];
    // 10s into the Period the next segment starts at 12s; it is complete 4s later
    assert_eq!(seg.segment_url, "https://cdn.example.com/live/v1/seg-4.m4s");
    assert_eq!(seg.availability_start, ast() + TimeDelta::seconds(16));
    assert_eq!(seg.segment_duration, Duration::from_secs(4));

    // before the start of the presentation, the first segment of the first Period
    let segments = manifest.selected_segment_availability(ast() - TimeDelta::hours(1)).unwrap();
    assert_eq!(segments[0].segment_url, "https://cdn.example.com/live/v1/seg-1.m4s");
    assert_eq!(segments[0].availability_start, ast() + TimeDelta::seconds(4));
}

#[test]
fn test_availability_time_offset() {
    setup_logging();
    let template = SegmentTemplate { availabilityTimeOffset: Some(2.5), ..numbered_template() };
    let manifest = live_manifest(template);
    let rep = first_rep(&manifest);
    let seg = manifest.media_availability(rep, &Variables::default().with_number(3)).unwrap();
    assert_eq!(seg.availability_start, ast() + TimeDelta::milliseconds(13_500));

    // an infinite offset makes every segment available at the start of the presentation
    let mut manifest = live_manifest(numbered_template());
    manifest.update(|mpd| mpd.base_url = vec![BaseURL {
        base: String::from("https://edge.example.com/live/"),
        availabilityTimeOffset: Some(f64::INFINITY),
        ..Default::default()
    }]);
    let seg = manifest.media_availability(rep, &Variables::default().with_number(300)).unwrap();
    assert_eq!(seg.availability_start, ast());
    assert_eq!(seg.segment_url, "https://edge.example.com/live/v1/seg-301.m4s");
}

#[test]
fn test_urls_resolved_where_addressing_is_declared() {
    setup_logging();
    let mut rep = representation("v1", 1000);
    rep.BaseURL = vec![BaseURL { base: String::from("rep1/"), ..Default::default() }];
    let manifest = static_manifest(templated_period("p0", None, numbered_template(), vec![rep.clone()]));
    let seg = manifest.media_availability(first_rep(&manifest), &Variables::default().with_number(0)).unwrap();
    assert_eq!(seg.segment_url, "https://cdn.example.com/vod/v1/seg-1.m4s");

    rep.SegmentTemplate = Some(numbered_template());
    let manifest = static_manifest(templated_period("p0", None, numbered_template(), vec![rep]));
    let seg = manifest.media_availability(first_rep(&manifest), &Variables::default().with_number(0)).unwrap();
    assert_eq!(seg.segment_url, "https://cdn.example.com/vod/rep1/v1/seg-1.m4s");
}

#[test]
fn test_template_attributes_inherited() {
    setup_logging();
    let outer = SegmentTemplate {
        timescale: Some(1000),
        duration: Some(4000.0),
        startNumber: Some(10),
        ..Default::default()
    };
    let mut rep = representation("v1", 1000);
    rep.SegmentTemplate = Some(SegmentTemplate {
        media: Some(String::from("$RepresentationID$-$Number$.m4s")),
        ..Default::default()
    });
    let manifest = static_manifest(templated_period("p0", Some(Duration::from_secs(2)), outer, vec![rep]));
    let seg = manifest.media_availability(first_rep(&manifest), &Variables::default().with_number(2)).unwrap();
    assert_eq!(seg.segment_url, "https://cdn.example.com/vod/v1-12.m4s");
    assert_eq!(seg.segment_duration, Duration::from_secs(4));
    assert_eq!(seg.availability_start, XsDatetime::UNIX_EPOCH + TimeDelta::seconds(10));
}

#[test]
fn test_segment_timeline() {
    setup_logging();
    let template = SegmentTemplate {
        media: Some(String::from("$RepresentationID$/$Time$.m4s")),
        timescale: Some(1000),
        SegmentTimeline: Some(SegmentTimeline {
            segments: vec![
                S { t: Some(0), d: 2000, r: Some(2) },
                S { t: None, d: 4000, r: None },
            ],
        }),
        ..Default::default()
    };
    let manifest = static_manifest(templated_period("p0", None, template.clone(), vec![representation("v1", 1000)]));
    let seg = manifest.media_availability(first_rep(&manifest), &Variables::default().with_number(3)).unwrap();
    assert_eq!(seg.segment_url, "https://cdn.example.com/vod/v1/6000.m4s");
    assert_eq!(seg.segment_duration, Duration::from_secs(4));
    assert_eq!(seg.availability_start, XsDatetime::UNIX_EPOCH + TimeDelta::seconds(6));

    let mut manifest = live_manifest(template);
    manifest.select_all_representations();
    let segments = manifest.selected_segment_availability(ast() + TimeDelta::seconds(5)).unwrap();
    assert_eq!(segments[0].segment_url, "https://cdn.example.com/live/v1/6000.m4s");
    assert_eq!(segments[0].availability_start, ast() + TimeDelta::seconds(10));
    // past the end of the timeline
    assert!(manifest.selected_segment_availability(ast() + TimeDelta::seconds(11)).unwrap().is_empty());
}

#[test]
fn test_segment_list() {
    setup_logging();
    let mut rep = representation("v1", 1000);
    rep.SegmentList = Some(SegmentList {
        duration: Some(2),
        timescale: Some(1),
        Initialization: Some(Initialization { sourceURL: Some(String::from("init.mp4")), range: None }),
        segment_urls: ["a.m4s", "b.m4s", "c.m4s"].iter()
            .map(|m| SegmentURL { media: Some(m.to_string()), ..Default::default() })
            .collect(),
        ..Default::default()
    });
    let period = Period { id: Some(String::from("p0")), ..Default::default() };
    let mut manifest = static_manifest(period);
    manifest.update(|mpd| mpd.periods[0].adaptations = vec![Default::default()]);
    let key = manifest.period_keys()[0];
    manifest.add_representation(key, 0, rep).unwrap();
    let node = first_rep(&manifest);

    let seg = manifest.media_availability(node, &Variables::default().with_number(1)).unwrap();
    assert_eq!(seg.segment_url, "https://cdn.example.com/vod/b.m4s");
    assert_eq!(seg.availability_start, XsDatetime::UNIX_EPOCH + TimeDelta::seconds(2));
    assert!(matches!(manifest.media_availability(node, &Variables::default().with_number(5)),
                     Err(DashMpdError::Range(_))));

    let init = manifest.init_availability(node).unwrap();
    assert_eq!(init.segment_url, "https://cdn.example.com/vod/init.mp4");
    assert_eq!(init.segment_duration, Duration::ZERO);
}

#[test]
fn test_segment_base() {
    setup_logging();
    let mut rep = representation("v1", 1000);
    rep.BaseURL = vec![BaseURL { base: String::from("video-720.mp4"), ..Default::default() }];
    rep.SegmentBase = Some(SegmentBase {
        initialization: Some(Initialization { sourceURL: None, range: Some(String::from("0-999")) }),
        indexRange: Some(String::from("1000-1999")),
        ..Default::default()
    });
    let mut period = templated_period("p0", None, SegmentTemplate::default(), vec![rep]);
    period.adaptations[0].SegmentTemplate = None;
    let manifest = static_manifest(period);
    let node = first_rep(&manifest);
    let seg = manifest.media_availability(node, &Variables::default()).unwrap();
    assert_eq!(seg.segment_url, "https://cdn.example.com/vod/video-720.mp4");
    assert_eq!(seg.segment_duration, Duration::from_secs(30));
    let init = manifest.init_availability(node).unwrap();
    assert_eq!(init.segment_url, "https://cdn.example.com/vod/video-720.mp4");
}

#[test]
fn test_no_addressing_information() {
    setup_logging();
    let mut period = templated_period("p0", None, SegmentTemplate::default(), vec![representation("v1", 1000)]);
    period.adaptations[0].SegmentTemplate = None;
    let manifest = static_manifest(period);
    let seg = manifest.media_availability(first_rep(&manifest), &Variables::default()).unwrap();
    assert_eq!(seg.segment_url, "");
    assert_eq!(seg.segment_duration, Duration::ZERO);
    assert!(manifest.media_availability(Node::Period(manifest.period_keys()[0]), &Variables::default()).is_err());
}

#[test]
fn test_fallback_to_next_period() {
    setup_logging();
    let mpd = MPD {
        mpdtype: Some(String::from("static")),
        periods: vec![
            templated_period("p1", Some(Duration::ZERO), numbered_template(), vec![representation("a1", 1000)]),
            templated_period("p2", Some(Duration::from_secs(30)), numbered_template(), vec![representation("b1", 1000)]),
        ],
        ..Default::default()
    };
    let mut manifest = Manifest::new(mpd);
    let p2 = manifest.period_keys()[1];
    manifest.select_representation(Node::Representation(p2, 0, 0)).unwrap();
    let segments = manifest.selected_segment_availability(Utc::now()).unwrap();
    assert_eq!(segments.len(), 1);
    assert_eq!(segments[0].segment_url, "b1/seg-1.m4s");
    assert_eq!(segments[0].availability_start, XsDatetime::UNIX_EPOCH + TimeDelta::seconds(30));
}

#[test]
fn test_initialization_segments() {
    setup_logging();
    let reps = vec![representation("v1", 1000), representation("v2", 2000)];
    let mut manifest = live_manifest(numbered_template());
    let key = manifest.period_keys()[0];
    manifest.add_representation(key, 0, reps[1].clone()).unwrap();
    manifest.select_all_representations();
    let inits = manifest.selected_initialization_segments_at(ast() + TimeDelta::seconds(60)).unwrap();
    let urls: Vec<_> = inits.iter().map(|s| s.segment_url.as_str()).collect();
    assert_eq!(urls, ["https://cdn.example.com/live/v1/init.mp4", "https://cdn.example.com/live/v2/init.mp4"]);
    assert!(inits.iter().all(|s| s.availability_start == ast()));

    // identical initialization segments are only listed once
    let shared = SegmentTemplate { initialization: Some(String::from("init.mp4")), ..numbered_template() };
    let mut manifest = static_manifest(templated_period("p0", None, shared, reps));
    manifest.select_all_representations();
    let inits = manifest.selected_initialization_segments().unwrap();
    assert_eq!(inits.len(), 1);
    assert_eq!(inits[0].segment_url, "https://cdn.example.com/vod/init.mp4");
}
