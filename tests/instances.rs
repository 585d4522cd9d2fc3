mod common;

use std::time::Duration;

use ndi_dyn::{
    Error, Finder, FinderOptions, Receiver, ReceiverBandwidth, ReceiverOptions, Router, Sender,
    SenderOptions, Source,
};

#[test]
fn test_every_instance_kind_is_created_and_destroyed_once() {
    let _serial = common::setup();
    let ndi = common::load();

    {
        let _finder = Finder::new(&ndi, &FinderOptions::default()).unwrap();
        let _sender = Sender::new(&ndi, &SenderOptions::builder("instances").build()).unwrap();
        let _receiver = Receiver::new(
            &ndi,
            &ReceiverOptions::builder(Source::new(common::source_name("instances"))).build(),
        )
        .unwrap();
        let _router = Router::new(&ndi, "instances-router", None).unwrap();
    }

    for (create, destroy) in [
        ("find_create", "find_destroy"),
        ("send_create", "send_destroy"),
        ("recv_create", "recv_destroy"),
        ("routing_create", "routing_destroy"),
    ] {
        assert_eq!(common::count(create), 1, "{create}");
        assert_eq!(common::count(destroy), 1, "{destroy}");
    }
}

#[test]
fn test_empty_strings_are_accepted() {
    let _serial = common::setup();
    let ndi = common::load();

    let options = FinderOptions::builder().groups("").extra_ips("").build();
    let finder = Finder::new(&ndi, &options).unwrap();
    assert!(finder.current_sources().unwrap().is_empty());

    let sender = Sender::new(&ndi, &SenderOptions::builder("").groups("").build());
    assert!(sender.is_ok());
    let router = Router::new(&ndi, "", Some(""));
    assert!(router.is_ok());
}

#[test]
fn test_null_handles_become_creation_errors() {
    let _serial = common::setup();
    let ndi = common::load();
    common::with_state(|s| s.fail_create = true);

    assert!(matches!(
        Finder::new(&ndi, &FinderOptions::default()),
        Err(Error::CreationFailed(_))
    ));
    assert!(matches!(
        Sender::new(&ndi, &SenderOptions::builder("nope").build()),
        Err(Error::CreationFailed(_))
    ));
    assert!(matches!(
        Receiver::new(&ndi, &ReceiverOptions::builder(Source::new("X (nope)")).build()),
        Err(Error::CreationFailed(_))
    ));

    // A failed create must not be followed by a destroy.
    assert_eq!(common::count("find_destroy"), 0);
    assert_eq!(common::count("send_destroy"), 0);
    assert_eq!(common::count("recv_destroy"), 0);
}

#[test]
fn test_names_with_nul_bytes_are_rejected_before_the_runtime_sees_them() {
    let _serial = common::setup();
    let ndi = common::load();

    assert!(matches!(
        Sender::new(&ndi, &SenderOptions::builder("bad\0name").build()),
        Err(Error::InvalidCString(_))
    ));
    assert!(matches!(
        Router::new(&ndi, "bad\0router", None),
        Err(Error::InvalidCString(_))
    ));
    assert_eq!(common::count("send_create"), 0);
    assert_eq!(common::count("routing_create"), 0);
}

#[test]
fn test_finder_lists_announced_senders() {
    let _serial = common::setup();
    let ndi = common::load();

    let finder = Finder::new(&ndi, &FinderOptions::default()).unwrap();
    assert!(!finder.wait_for_sources(Duration::ZERO));

    let _a = Sender::new(&ndi, &SenderOptions::builder("alpha").build()).unwrap();
    let _b = Sender::new(&ndi, &SenderOptions::builder("beta").build()).unwrap();
    assert!(finder.wait_for_sources(Duration::from_millis(100)));

    let sources = finder.sources(Duration::from_millis(100)).unwrap();
    let names: Vec<&str> = sources.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, ["FAKE-HOST (alpha)", "FAKE-HOST (beta)"]);
    assert!(sources.iter().all(|s| s.matches_host(common::FAKE_HOST)));
    assert!(sources.iter().all(|s| s.matches_host("127.0.0.1")));
    assert_eq!(sources[0].address.port(), Some(5961));
}

#[test]
fn test_unnamed_source_does_not_hide_the_others() {
    let _serial = common::setup();
    let ndi = common::load();

    let finder = Finder::new(&ndi, &FinderOptions::default()).unwrap();
    let _sender = Sender::new(&ndi, &SenderOptions::builder("named").build()).unwrap();
    common::with_state(|s| s.unnamed_sources = 1);

    let sources = finder.current_sources().unwrap();
    assert_eq!(sources.len(), 2);
    assert_eq!(sources[0].name, common::source_name("named"));
    assert_eq!(sources[1].name, "");
    assert_eq!(sources[1].host(), None);
}

#[test]
fn test_router_switches_and_clears() {
    let _serial = common::setup();
    let ndi = common::load();

    let router = Router::new(&ndi, "program", Some("Public")).unwrap();
    assert!(router.change(&Source::new("STUDIO (Camera 2)")).unwrap());
    assert_eq!(
        common::with_state(|s| s.routes.values().next().cloned().flatten()),
        Some("STUDIO (Camera 2)".to_string())
    );

    assert!(router.clear());
    assert_eq!(
        common::with_state(|s| s.routes.values().next().cloned().flatten()),
        None
    );
}

#[test]
fn test_receiver_options_are_passed_through() {
    let _serial = common::setup();
    let ndi = common::load();

    let options = ReceiverOptions::builder(Source::new(common::source_name("meta")))
        .bandwidth(ReceiverBandwidth::MetadataOnly)
        .build();
    let receiver = Receiver::new(&ndi, &options).unwrap();
    assert_eq!(receiver.source().name, "FAKE-HOST (meta)");
    assert_eq!(receiver.connections(Duration::ZERO), 0);
}

#[test]
fn test_handles_can_move_between_threads() {
    let _serial = common::setup();
    let ndi = common::load();

    let sender = Sender::new(&ndi, &SenderOptions::builder("moved").build()).unwrap();
    let name = std::thread::spawn(move || sender.name().to_owned())
        .join()
        .unwrap();
    assert_eq!(name, "moved");
    assert_eq!(common::count("send_destroy"), 1);
}
