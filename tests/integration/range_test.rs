//! Byte-range downloads.

use std::sync::atomic::Ordering;

use revstore_core::error::ErrorKind;
use revstore_core::types::ResolvedRange;
use revstore_service::{DownloadRequest, LoggingListener};
use revstore_storage::transfer::{BufferDestination, MultipartDestination};

use crate::helpers::{Backend, TestNode, content};

#[tokio::test]
async fn test_every_slice_matches_source() {
    for backend in Backend::ALL {
        let node = TestNode::start(backend, 5).await;
        let original = content(23);
        let file_id = node.create_with(&original, 4).await;
        let revision = node.revision(&file_id).await;

        for offset in 0..=original.len() {
            for count in 0..=(original.len() - offset) {
                let mut sink = BufferDestination::new();
                let summary = node
                    .services
                    .lifecycle
                    .download_file(&revision, &mut sink, offset as u64, count as u64)
                    .await
                    .unwrap();
                assert_eq!(summary.bytes, count as u64);
                assert_eq!(
                    sink.to_vec(),
                    &original[offset..offset + count],
                    "{backend:?} [{offset}, +{count})"
                );

                if count > 0 {
                    let spec = format!("bytes={}-{}", offset, offset + count - 1);
                    let (outcome, sink) = node.download(file_id.as_str(), Some(&spec)).await;
                    outcome.unwrap();
                    assert_eq!(sink.to_vec(), &original[offset..offset + count]);
                }
            }
        }
        node.shutdown().await;
    }
}

#[tokio::test]
async fn test_two_ranges_in_request_order() {
    for backend in Backend::ALL {
        let node = TestNode::start(backend, 64).await;
        let original = content(20);
        let file_id = node.create_with(&original, 20).await;

        let (outcome, sink) = node.download(file_id.as_str(), Some("bytes=0-4,10-14")).await;
        let summary = outcome.unwrap();

        let parts = sink.parts();
        assert_eq!(parts.len(), 2, "{backend:?}");
        assert_eq!(parts[0].to_vec(), &original[0..5]);
        assert_eq!(parts[1].to_vec(), &original[10..15]);
        assert_eq!(
            summary.ranges,
            vec![ResolvedRange::new(0, 5), ResolvedRange::new(10, 5)]
        );
        assert_eq!(summary.bytes, 10);
        node.shutdown().await;
    }
}

#[tokio::test]
async fn test_ranges_read_one_handle_at_a_time() {
    for backend in Backend::ALL {
        let node = TestNode::start(backend, 4).await;
        let original = content(20);
        let file_id = node.create_with(&original, 20).await;

        let (outcome, sink) = node
            .download(file_id.as_str(), Some("bytes=10-14,0-4,-3"))
            .await;
        outcome.unwrap();
        assert_eq!(sink.parts().len(), 3);

        let readers = node.storage.readers();
        assert_eq!(readers.opened.load(Ordering::SeqCst), 3, "{backend:?}");
        assert_eq!(readers.peak.load(Ordering::SeqCst), 1, "{backend:?}");
        assert_eq!(readers.open.load(Ordering::SeqCst), 0, "{backend:?}");
        node.shutdown().await;
    }
}

#[tokio::test]
async fn test_malformed_spec_never_touches_storage() {
    for backend in Backend::ALL {
        let node = TestNode::start(backend, 8).await;
        let file_id = node.create_with(&content(20), 8).await;

        for spec in ["bytes=abc", "bytes=", "items=0-1", "bytes=5-2", "bytes=-"] {
            let before = node.storage.calls();
            let (outcome, sink) = node.download(file_id.as_str(), Some(spec)).await;

            assert_eq!(
                outcome.unwrap_err().kind,
                ErrorKind::UnsatisfiableRange,
                "{backend:?} {spec}"
            );
            assert_eq!(node.storage.calls(), before, "{spec} reached storage");
            assert!(sink.is_empty());
            assert!(sink.is_disposed());
        }
        node.shutdown().await;
    }
}

#[tokio::test]
async fn test_malformed_spec_wins_over_unknown_file() {
    let node = TestNode::start(Backend::Memory, 8).await;
    let (outcome, _) = node.download("no-such-file", Some("bytes=abc")).await;
    assert_eq!(outcome.unwrap_err().kind, ErrorKind::UnsatisfiableRange);

    let (outcome, _) = node.download("no-such-file", Some("bytes=0-1")).await;
    assert_eq!(outcome.unwrap_err().kind, ErrorKind::FileNotFound);

    let (outcome, _) = node.download("  ", None).await;
    assert_eq!(outcome.unwrap_err().kind, ErrorKind::UnspecifiedIdentifier);
}

#[tokio::test]
async fn test_unsatisfiable_ranges_are_dropped() {
    let node = TestNode::start(Backend::Memory, 8).await;
    let original = content(20);
    let file_id = node.create_with(&original, 8).await;

    let (outcome, sink) = node
        .download(file_id.as_str(), Some("bytes=50-60,18-99"))
        .await;
    let summary = outcome.unwrap();
    assert_eq!(summary.ranges, vec![ResolvedRange::new(18, 2)]);
    assert_eq!(sink.to_vec(), &original[18..]);

    let (outcome, _) = node.download(file_id.as_str(), Some("bytes=20-,-0")).await;
    assert_eq!(outcome.unwrap_err().kind, ErrorKind::UnsatisfiableRange);
}

#[tokio::test]
async fn test_multipart_framing_through_service() {
    let node = TestNode::start(Backend::Local, 4).await;
    let file_id = node.create_with(b"abcdefghijklmnopqrst", 6).await;

    let mut framed =
        MultipartDestination::with_boundary(BufferDestination::new(), "text/plain", "SEP");
    node.services
        .download
        .download_file(
            DownloadRequest {
                file_id: file_id.as_str(),
                range: Some("bytes=0-4,-3"),
                destination: &mut framed,
            },
            &mut LoggingListener,
        )
        .await
        .unwrap();

    let body = String::from_utf8(framed.into_inner().to_vec()).unwrap();
    assert_eq!(
        body,
        "--SEP\r\nContent-Type: text/plain\r\nContent-Range: bytes 0-4/20\r\n\r\nabcde\
         \r\n--SEP\r\nContent-Type: text/plain\r\nContent-Range: bytes 17-19/20\r\n\r\nrst\
         \r\n--SEP--\r\n"
    );
}
