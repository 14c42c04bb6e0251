use crate::fakes::{MemoryChat, Sent, png_images};
use nanobanana::error::DeliveryError;
use nanobanana::transport::channels::{ChannelConnection, DeliveryEngine};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::Duration;

fn engine(chat: &Arc<MemoryChat>) -> DeliveryEngine {
    let connection = Arc::new(ChannelConnection::with_client(chat.clone()));
    DeliveryEngine::new(connection, "@nano_banana")
}

#[tokio::test]
async fn eleven_images_are_refused_before_any_channel_call() {
    let chat = Arc::new(MemoryChat::new());

    let err = engine(&chat)
        .deliver(&png_images(11), "prompt", None)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        DeliveryError::TooManyImages {
            count: 11,
            limit: 10
        }
    ));
    assert_eq!(chat.connects.load(Ordering::SeqCst), 0);
    assert!(chat.sent().is_empty());
}

#[tokio::test]
async fn ten_images_form_one_album() {
    let chat = Arc::new(MemoryChat::new());

    let report = engine(&chat)
        .deliver(&png_images(10), "prompt", None)
        .await
        .unwrap();

    assert_eq!(report.image_count, 10);
    let sent = chat.sent();
    assert_eq!(sent.iter().filter(|s| matches!(s, Sent::Upload(_))).count(), 10);
    assert!(sent.contains(&Sent::Album(10)));
}

#[tokio::test]
async fn no_images_sends_marked_caption() {
    let chat = Arc::new(MemoryChat::new());

    let report = engine(&chat)
        .deliver(&[], "leather\u{0007} coat", Some("header"))
        .await
        .unwrap();

    assert_eq!(report.image_count, 0);
    let texts = chat.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].ends_with("\n(no images)"));
    assert!(!texts[0].contains('\u{0007}'));
    assert!(!chat.sent().iter().any(|s| matches!(s, Sent::Album(_))));
}

#[tokio::test(start_paused = true)]
async fn flood_wait_is_honored_once() {
    let chat = Arc::new(MemoryChat::rate_limited_once(3));
    let start = tokio::time::Instant::now();

    let report = engine(&chat)
        .deliver(&png_images(2), "prompt", None)
        .await
        .unwrap();

    assert!(start.elapsed() >= Duration::from_secs(3));
    assert!(start.elapsed() < Duration::from_secs(30));
    assert_eq!(report.chunk_count, 1);
    assert_eq!(chat.texts().len(), 1);
}

#[tokio::test]
async fn the_connection_is_reused_across_deliveries() {
    let chat = Arc::new(MemoryChat::new());
    let engine = engine(&chat);

    engine.deliver(&png_images(1), "one", None).await.unwrap();
    engine.deliver(&png_images(1), "two", None).await.unwrap();

    assert_eq!(chat.connects.load(Ordering::SeqCst), 1);
    assert_eq!(chat.texts().len(), 2);
}
