//! File lifecycle through the management, upload and download services.

use revstore_core::error::ErrorKind;
use revstore_core::traits::StorageProvider;
use revstore_entity::revision::FileState;
use revstore_service::LoggingListener;
use revstore_storage::transfer::BytesSource;

use crate::helpers::{Backend, TestNode, TrackedSource, content};

#[tokio::test]
async fn test_second_upload_is_rejected() {
    for backend in Backend::ALL {
        let node = TestNode::start(backend, 8).await;
        let original = content(12);
        let file_id = node.create_with(&original, 5).await;
        let first = node.revision(&file_id).await;
        assert_eq!(first.state, FileState::Uploaded);
        assert_eq!(first.total_length, 12);

        let (source, disposals) = TrackedSource::new(content(30), 5);
        let err = node
            .services
            .upload
            .upload_file_content(file_id.as_str(), 30, Box::new(source), &mut LoggingListener)
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::AlreadyUploaded, "{backend:?}");
        assert_eq!(disposals.load(std::sync::atomic::Ordering::SeqCst), 1);

        let after = node.revision(&file_id).await;
        assert_eq!(after.state, FileState::Uploaded);
        assert_eq!(after.total_length, 12);
        let (outcome, sink) = node.download(file_id.as_str(), None).await;
        outcome.unwrap();
        assert_eq!(sink.to_vec(), original);
        node.shutdown().await;
    }
}

#[tokio::test]
async fn test_download_before_upload_has_no_storage_access() {
    for backend in Backend::ALL {
        let node = TestNode::start(backend, 8).await;
        let file_id = node.create("empty.bin").await;

        for range in [None, Some("bytes=0-4")] {
            let before = node.storage.calls();
            let (outcome, sink) = node.download(file_id.as_str(), range).await;
            assert_eq!(outcome.unwrap_err().kind, ErrorKind::NotUploaded, "{backend:?}");
            assert_eq!(node.storage.calls(), before);
            assert!(sink.is_empty());
        }
        node.shutdown().await;
    }
}

#[tokio::test]
async fn test_dispose_then_everything_fails() {
    for backend in Backend::ALL {
        let node = TestNode::start(backend, 8).await;
        let file_id = node.create_with(&content(10), 4).await;

        node.services
            .management
            .dispose_file(file_id.as_str())
            .await
            .unwrap();
        let revision = node.revision(&file_id).await;
        assert_eq!(revision.state, FileState::Disposed);
        assert!(!node.storage.exists(file_id.as_str()).await.unwrap());

        let (outcome, _) = node.download(file_id.as_str(), None).await;
        assert_eq!(outcome.unwrap_err().kind, ErrorKind::Disposed);

        let err = node
            .services
            .upload
            .upload_file_content(
                file_id.as_str(),
                1,
                Box::new(BytesSource::new(vec![1u8], 1)),
                &mut LoggingListener,
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Disposed);

        // Idempotent by default.
        node.services
            .management
            .dispose_file(file_id.as_str())
            .await
            .unwrap();
        node.shutdown().await;
    }
}

#[tokio::test]
async fn test_dispose_new_file() {
    let node = TestNode::start(Backend::Local, 8).await;
    let file_id = node.create("never-filled").await;
    assert!(node.storage.exists(file_id.as_str()).await.unwrap());

    node.services
        .management
        .dispose_file(file_id.as_str())
        .await
        .unwrap();
    assert_eq!(node.revision(&file_id).await.state, FileState::Disposed);
    assert!(!node.storage.exists(file_id.as_str()).await.unwrap());
}

#[tokio::test]
async fn test_unknown_and_blank_ids() {
    let node = TestNode::start(Backend::Memory, 8).await;
    let management = &node.services.management;

    assert!(management.get_file_descriptor("missing").await.unwrap().is_none());
    assert_eq!(
        management.dispose_file("missing").await.unwrap_err().kind,
        ErrorKind::FileNotFound
    );
    assert_eq!(
        management.get_file_descriptor("").await.unwrap_err().kind,
        ErrorKind::UnspecifiedIdentifier
    );
}

#[tokio::test]
async fn test_created_ids_are_unique() {
    let node = TestNode::start(Backend::Local, 8).await;
    let mut ids = Vec::new();
    for _ in 0..50 {
        ids.push(node.create("same-name").await);
    }
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 50);
    assert!(ids.iter().all(|id| id.as_str().starts_with("it-")));
}
