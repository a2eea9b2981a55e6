/// Shared code for our test harness.


use std::sync::Once;
use std::time::Duration;
use lazy_static::lazy_static;
use dash_mpd_addressing::{AdaptationSet, Period, Representation, SegmentTemplate};


lazy_static! {
    static ref TRACING_INIT: Once = Once::new();
}

pub fn setup_logging() {
    use tracing_subscriber::{EnvFilter, fmt, fmt::time::LocalTime, prelude::*};
    use time::macros::format_description;

    TRACING_INIT.call_once(|| {
        let timer = LocalTime::new(format_description!("[hour]:[minute]:[second]"));
        let fmt_layer = fmt::layer()
            .compact()
            .with_timer(timer)
            .with_target(false);
        let filter_layer = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new("info"))
            .expect("initializing logging");
        tracing_subscriber::registry()
            .with(filter_layer)
            .with(fmt_layer)
            .init();
    });
}

#[allow(dead_code)]
pub fn representation(id: &str, bandwidth: u64) -> Representation {
    Representation {
        id: Some(id.to_string()),
        bandwidth: Some(bandwidth),
        mimeType: Some(String::from("video/mp4")),
        ..Default::default()
    }
}

// A Period with a single video AdaptationSet whose Representations share a SegmentTemplate.
#[allow(dead_code)]
pub fn templated_period(id: &str, start: Option<Duration>, template: SegmentTemplate, reps: Vec<Representation>) -> Period {
    let adaptation = AdaptationSet {
        contentType: Some(String::from("video")),
        SegmentTemplate: Some(template),
        representations: reps,
        ..Default::default()
    };
    Period {
        id: Some(id.to_string()),
        start,
        adaptations: vec![adaptation],
        ..Default::default()
    }
}
