//! Address space dispatch tests

use std::sync::Arc;

use oscwire_core::{Bundle, Error, MatchKind, Message, TimeTag, TypeTag};
use oscwire_router::{AddressSpace, Method};
use parking_lot::Mutex;

/// Journal of handler invocations: (label, match kind, enclosing timetag)
type Journal = Arc<Mutex<Vec<(String, MatchKind, Option<TimeTag>)>>>;

fn recording_method(address: &str, label: &str, journal: &Journal) -> Arc<Method> {
    let journal = journal.clone();
    let label = label.to_string();
    Arc::new(Method::new(address, move |_, kind, time_tag| {
        journal.lock().push((label.clone(), kind, time_tag));
    }))
}

#[test]
fn test_bundle_fans_out_in_registration_order() {
    let space = AddressSpace::new();
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let mut methods = Vec::new();
    for i in 0..6 {
        let method = recording_method(&format!("/cue/{i}"), &format!("m{i}"), &journal);
        space.register(&method).unwrap();
        methods.push(method);
    }

    let time_tag = TimeTag::new(5000, 123);
    let mut bundle = Bundle::new(time_tag);
    for i in 0..6 {
        bundle = bundle.element(Message::new(format!("/cue/{i}")));
    }
    space.dispatch(&bundle.into());

    let seen = journal.lock();
    assert_eq!(seen.len(), 6);
    for (i, (label, kind, tag)) in seen.iter().enumerate() {
        assert_eq!(label, &format!("m{i}"));
        assert_eq!(*kind, MatchKind::Full);
        assert_eq!(*tag, Some(time_tag));
    }
}

#[test]
fn test_bare_message_has_no_timetag() {
    let space = AddressSpace::new();
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let method = recording_method("/solo", "solo", &journal);
    space.register(&method).unwrap();

    space.dispatch(&Message::new("/solo").into());

    let seen = journal.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].2, None);
}

#[test]
fn test_nested_bundle_propagates_inner_timetag() {
    let space = AddressSpace::new();
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let method = recording_method("/deep", "deep", &journal);
    space.register(&method).unwrap();

    let outer_tag = TimeTag::new(100, 0);
    let inner_tag = TimeTag::new(200, 0);
    let bundle = Bundle::new(outer_tag)
        .element(Bundle::new(inner_tag).element(Message::new("/deep")));
    space.dispatch(&bundle.into());

    let seen = journal.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].2, Some(inner_tag));
}

#[test]
fn test_pattern_fans_out_to_all_matches() {
    let space = AddressSpace::new();
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let gain1 = recording_method("/ch/1/gain", "g1", &journal);
    let gain2 = recording_method("/ch/2/gain", "g2", &journal);
    let pan = recording_method("/ch/1/pan", "pan", &journal);
    for m in [&gain1, &gain2, &pan] {
        space.register(m).unwrap();
    }

    space.dispatch(&Message::new("/ch/*/gain").into());

    let seen = journal.lock();
    let labels: Vec<&str> = seen.iter().map(|(l, _, _)| l.as_str()).collect();
    assert_eq!(labels, vec!["g1", "g2"]);
}

#[test]
fn test_container_match_is_delivered_as_such() {
    let space = AddressSpace::new();
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let method = recording_method("/mixer/main/gain", "gain", &journal);
    space.register(&method).unwrap();

    space.dispatch(&Message::new("/mixer/main").into());

    let seen = journal.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, MatchKind::Container);
}

#[test]
fn test_required_arguments_filter_delivery() {
    let space = AddressSpace::new();
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let journal_clone = journal.clone();
    let method = Arc::new(
        Method::new("/level", move |_, kind, tag| {
            journal_clone.lock().push(("level".to_string(), kind, tag));
        })
        .with_required_args(vec![
            TypeTag::AnyNumber,
            TypeTag::optional(TypeTag::AnyBoolean),
        ]),
    );
    space.register(&method).unwrap();

    space.dispatch(&Message::new("/level").arg(0.8f32).into());
    space.dispatch(&Message::new("/level").arg(4).arg(true).into());
    space.dispatch(&Message::new("/level").arg("loud").into());
    space.dispatch(&Message::new("/level").into());

    assert_eq!(journal.lock().len(), 2);
}

#[test]
fn test_register_rejects_pattern_addresses() {
    let space = AddressSpace::new();

    for bad in ["/a/*/b", "/a?", "/a[0-9]", "/a{x,y}", "/a b", "/a,b", "no-slash"] {
        let method = Arc::new(Method::new(bad, |_, _, _| {}));
        let err = space.register(&method).unwrap_err();
        assert!(matches!(err, Error::InvalidAddress(_)), "accepted {bad:?}");
    }
    assert!(space.is_empty());
}

#[test]
fn test_deregister_compares_identity_not_address() {
    let space = AddressSpace::new();
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let first = recording_method("/dup", "first", &journal);
    let second = recording_method("/dup", "second", &journal);
    space.register(&first).unwrap();
    space.register(&second).unwrap();

    space.deregister(&first);
    space.dispatch(&Message::new("/dup").into());

    let seen = journal.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].0, "second");

    // deregistering again is a no-op
    space.deregister(&first);
    assert_eq!(space.len(), 1);
}

#[test]
fn test_deregister_all() {
    let space = AddressSpace::new();
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let a = recording_method("/a", "a", &journal);
    let b = recording_method("/b", "b", &journal);
    space.register(&a).unwrap();
    space.register(&b).unwrap();

    space.deregister_all();
    space.dispatch(&Message::new("/a").into());
    space.dispatch(&Message::new("/b").into());

    assert!(space.is_empty());
    assert!(journal.lock().is_empty());
}

#[test]
fn test_duplicate_registration_delivers_twice() {
    let space = AddressSpace::new();
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let method = recording_method("/twice", "twice", &journal);
    space.register(&method).unwrap();
    space.register(&method).unwrap();

    space.dispatch(&Message::new("/twice").into());
    assert_eq!(journal.lock().len(), 2);
}

#[test]
fn test_decoded_packet_end_to_end() {
    use oscwire_core::codec;

    let space = AddressSpace::new();
    let journal: Journal = Arc::new(Mutex::new(Vec::new()));

    let method = recording_method("/e2e/target", "e2e", &journal);
    space.register(&method).unwrap();

    let time_tag = TimeTag::new(9000, 1);
    let wire = codec::encode(
        &Bundle::new(time_tag)
            .element(Message::new("/e2e/*").arg(1).arg("go"))
            .into(),
    )
    .unwrap();

    space.dispatch(&codec::decode(&wire).unwrap());

    let seen = journal.lock();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].1, MatchKind::Full);
    assert_eq!(seen[0].2, Some(time_tag));
}
