//! Parsing from many threads through one shared parser

use cotkit_cot::{CotParser, ParserConfig};
use std::thread;

fn message(i: usize) -> String {
    format!(
        r#"<event type="a-f-G" uid="UNIT-{i}"><point lat="{lat}" lon="{lon}"/><detail><contact callsign="CS-{i}"/>{children}<remarks>note {i}</remarks></detail></event>"#,
        lat = i as f64 / 100.0,
        lon = -(i as f64) / 100.0,
        children = "<track/>".repeat(i % 5),
    )
}

#[test]
fn test_pool_recycles_sequentially() {
    let parser = CotParser::new(ParserConfig {
        pool_capacity: 3,
        ..ParserConfig::default()
    });

    let contexts: Vec<_> = (0..8).map(|_| parser.pool().acquire()).collect();
    for context in contexts {
        parser.pool().release(context);
    }
    assert_eq!(parser.pool().available(), 3);

    for i in 0..8 {
        let event = parser.try_parse(&message(i)).unwrap();
        assert_eq!(event.uid, format!("UNIT-{i}"));
    }
    assert_eq!(parser.pool().available(), 1);
}

#[test]
fn test_concurrent_parses_do_not_share_state() {
    let parser = CotParser::new(ParserConfig {
        pool_capacity: 4,
        ..ParserConfig::default()
    });

    thread::scope(|scope| {
        for worker in 0..8 {
            let parser = &parser;
            scope.spawn(move || {
                for round in 0..50 {
                    let i = worker * 1000 + round;
                    let event = parser.try_parse(&message(i)).unwrap();

                    assert_eq!(event.uid, format!("UNIT-{i}"));
                    assert_eq!(event.point.lat, i as f64 / 100.0);

                    let detail = event.detail.as_ref().unwrap();
                    assert_eq!(detail.children().len(), 2 + i % 5);
                    assert_eq!(
                        detail.first_child("contact").unwrap().attribute("callsign"),
                        Some(format!("CS-{i}").as_str())
                    );
                    assert_eq!(
                        detail.first_child("remarks").unwrap().inner_text(),
                        Some(format!("note {i}").as_str())
                    );

                    // Interleave rejected messages so failed contexts get recycled too
                    let rejected = parser.parse(r#"<event type="a-f-G"><detail><x>"#);
                    assert!(rejected.uid.is_empty());
                    assert!(rejected.detail.is_none());
                }
            });
        }
    });

    assert!(parser.pool().available() <= 4);
}
