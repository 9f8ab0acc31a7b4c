// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

#![allow(clippy::missing_panics_doc)] // Tests/examples panic on failure
#![allow(clippy::float_cmp)] // Test assertions with constants
#![allow(clippy::cast_possible_wrap)] // Test conversions

//! Per-thread object cap. The cap is process-wide, so this binary holds a
//! single test.

use dds_connector::{
    max_objects_per_thread, set_max_objects_per_thread, Connector, ConnectorOptions, Error,
    DEFAULT_MAX_OBJECTS_PER_THREAD,
};

const CONFIG: &str = r#"str://
types:
  Reading:
    members:
      - { name: temp, type: float64 }
qos_profiles:
  Queue:
    history: { kind: KEEP_ALL }
participants:
  "Limits::P":
    domain_id: 0
    writers:
      - { name: W, topic: LimitsTopic, type: Reading, qos_profile: Queue }
    readers:
      - { name: R, topic: LimitsTopic, type: Reading, qos_profile: Queue }
"#;

#[test]
fn test_object_cap_per_thread() {
    assert_eq!(max_objects_per_thread(), DEFAULT_MAX_OBJECTS_PER_THREAD);
    assert!(matches!(
        set_max_objects_per_thread(0),
        Err(Error::InvalidArgument(_))
    ));
    assert_eq!(max_objects_per_thread(), DEFAULT_MAX_OBJECTS_PER_THREAD);

    let connector = Connector::new("Limits::P", CONFIG, ConnectorOptions::default())
        .expect("connector");
    let input = connector.get_input("R").expect("input");
    for t in [1.0, 2.0, 3.0] {
        connector.set_number("W", "temp", t).expect("temp");
        connector.write("W", None).expect("write");
    }
    input.take().expect("take");

    set_max_objects_per_thread(2).expect("cap");
    let first = input.native_sample(0).expect("first");
    let second = input.native_sample(1).expect("second");

    // Both slots are held: every further operation on this thread fails.
    assert!(matches!(
        input.native_sample(2),
        Err(Error::ResourceExhausted(_))
    ));
    assert!(matches!(
        input.get_number(0, "temp"),
        Err(Error::ResourceExhausted(_))
    ));
    assert!(matches!(
        connector.write("W", None),
        Err(Error::ResourceExhausted(_))
    ));

    // Other threads have their own budget.
    std::thread::scope(|s| {
        s.spawn(|| {
            let input = connector.get_input("R").expect("input");
            assert_eq!(input.get_number(2, "temp").expect("temp"), 3.0);
        });
    });

    drop(second);
    assert_eq!(input.get_number(1, "temp").expect("temp"), 2.0);
    assert_eq!(first.to_json()["temp"], 1.0);
    drop(first);

    set_max_objects_per_thread(DEFAULT_MAX_OBJECTS_PER_THREAD as i64).expect("restore");
}
