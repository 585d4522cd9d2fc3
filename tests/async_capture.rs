#![cfg(feature = "tokio")]

mod common;

use std::time::Duration;

use ndi_dyn::{
    tokio::{AsyncFinder, AsyncReceiver},
    Finder, FinderOptions, MetadataFrame, Receiver, ReceiverOptions, Sender, SenderOptions,
    Source, VideoFrame,
};

#[tokio::test]
async fn test_async_capture_returns_owned_frames() {
    let _serial = common::setup();
    let ndi = common::load();

    let sender = Sender::new(&ndi, &SenderOptions::builder("tokio").build()).unwrap();
    let finder = AsyncFinder::new(Finder::new(&ndi, &FinderOptions::default()).unwrap());
    assert!(finder.wait_for_sources(Duration::from_millis(100)).await.unwrap());
    let source = finder
        .sources(Duration::from_millis(100))
        .await
        .unwrap()
        .into_iter()
        .find(|s| s.name == common::source_name("tokio"))
        .expect("sender is announced");

    let receiver = AsyncReceiver::new(
        Receiver::new(&ndi, &ReceiverOptions::builder(source).build()).unwrap(),
    );

    let frame = VideoFrame::builder().resolution(320, 240).build().unwrap();
    sender.send_video(&frame).unwrap();
    sender
        .send_metadata(&MetadataFrame::with_data("<async/>", 0))
        .unwrap();

    let video = receiver
        .capture_video(Duration::from_millis(100))
        .await
        .unwrap()
        .expect("a video frame");
    assert_eq!((video.width, video.height), (320, 240));
    assert_eq!(common::count("recv_free_video"), 1);

    let metadata = receiver
        .capture_metadata(Duration::from_millis(100))
        .await
        .unwrap()
        .expect("metadata");
    assert_eq!(metadata.data, "<async/>");

    assert!(receiver
        .capture_audio(Duration::from_millis(5))
        .await
        .unwrap()
        .is_none());
    assert_eq!(receiver.connections(Duration::ZERO).await.unwrap(), 1);
}

#[tokio::test]
async fn test_clones_share_one_receiver() {
    let _serial = common::setup();
    let ndi = common::load();

    let receiver = AsyncReceiver::new(
        Receiver::new(
            &ndi,
            &ReceiverOptions::builder(Source::new("NOWHERE (nothing)")).build(),
        )
        .unwrap(),
    );
    let clone = receiver.clone();

    let name = clone
        .with_receiver(|rx| Ok(rx.source().name.clone()))
        .await
        .unwrap();
    assert_eq!(name, "NOWHERE (nothing)");

    drop(receiver);
    assert_eq!(common::count("recv_destroy"), 0);
    drop(clone);
    assert_eq!(common::count("recv_destroy"), 1);
}
