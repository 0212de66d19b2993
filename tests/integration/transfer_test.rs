//! Upload and download round trips through the transfer engine.

use std::sync::atomic::Ordering;

use revstore_core::error::{AppError, ErrorKind};
use revstore_core::traits::StorageProvider;
use revstore_entity::revision::{FileDescriptor, FileState};
use revstore_service::UploadListener;

use crate::helpers::{Backend, TestNode, TrackedSource, content};

const SIZES: [usize; 7] = [0, 1, 2, 7, 64, 1000, 4097];
const BUFFERS: [usize; 5] = [1, 3, 7, 64, 4096];

#[tokio::test]
async fn test_round_trip_any_size_any_buffer() {
    for backend in Backend::ALL {
        for buffer in BUFFERS {
            let node = TestNode::start(backend, buffer).await;
            assert_eq!(node.config.transfer.buffer_size_bytes, buffer);

            for n in SIZES {
                let original = content(n);
                let file_id = node.create_with(&original, buffer).await;

                let (outcome, sink) = node.download(file_id.as_str(), None).await;
                let summary = outcome.unwrap();
                assert_eq!(sink.to_vec(), original, "{backend:?} n={n} b={buffer}");
                assert_eq!(summary.bytes, n as u64);

                let chunks: Vec<_> = sink.parts().iter().flat_map(|p| &p.chunks).collect();
                assert!(chunks.iter().all(|c| !c.is_empty() && c.len() <= buffer));
                if backend != Backend::Local {
                    assert_eq!(summary.chunks, n.div_ceil(buffer) as u64);
                }
            }
            node.shutdown().await;
        }
    }
}

#[tokio::test]
async fn test_uploaded_descriptor_reports_length() {
    for backend in Backend::ALL {
        let node = TestNode::start(backend, 16).await;
        let file_id = node.create_with(&content(100), 9).await;

        let descriptor = node
            .services
            .management
            .get_file_descriptor(file_id.as_str())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(descriptor.state, FileState::Uploaded);
        assert_eq!(descriptor.total_length, Some(100));
        assert_eq!(descriptor.file_name, "content.bin");
        node.shutdown().await;
    }
}

#[derive(Default)]
struct UploadRecorder {
    uploads: usize,
    errors: Vec<ErrorKind>,
}

impl UploadListener for UploadRecorder {
    fn on_upload(&mut self, _descriptor: &FileDescriptor) {
        self.uploads += 1;
    }

    fn on_error(&mut self, error: &AppError) {
        self.errors.push(error.kind);
    }
}

#[tokio::test]
async fn test_write_failure_mid_transfer() {
    for backend in Backend::ALL {
        let node = TestNode::start(backend, 4).await;
        let file_id = node.create("broken.bin").await;
        node.storage.break_writes();

        let (source, source_disposals) = TrackedSource::new(content(40), 4);
        let mut listener = UploadRecorder::default();
        let err = node
            .services
            .upload
            .upload_file_content(file_id.as_str(), 40, Box::new(source), &mut listener)
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::DataTransfer, "{backend:?}");
        assert_eq!(source_disposals.load(Ordering::SeqCst), 1);
        assert_eq!(node.storage.writer_disposals(), 1);
        assert_eq!(listener.uploads, 0);
        assert_eq!(listener.errors, vec![ErrorKind::DataTransfer]);

        let revision = node.revision(&file_id).await;
        assert_eq!(revision.state, FileState::New);
        assert_eq!(revision.total_length, 0);
        node.shutdown().await;
    }
}

#[tokio::test]
async fn test_upload_on_stopped_pool_releases_endpoints() {
    let node = TestNode::start(Backend::Pooled, 8).await;
    let file_id = node.create("stopped.bin").await;
    node.stop_workers().await;

    let (source, source_disposals) = TrackedSource::new(content(16), 8);
    let mut listener = UploadRecorder::default();
    let err = node
        .services
        .upload
        .upload_file_content(file_id.as_str(), 16, Box::new(source), &mut listener)
        .await
        .unwrap_err();

    assert_eq!(err.kind, ErrorKind::Internal);
    assert!(!err.is_fatal());
    assert_eq!(source_disposals.load(Ordering::SeqCst), 1);
    assert_eq!(node.storage.writer_disposals(), 1);
    assert_eq!(listener.errors, vec![ErrorKind::Internal]);
    assert_eq!(node.revision(&file_id).await.state, FileState::New);
}

#[tokio::test]
async fn test_overlong_upload_stops_before_storage_fills() {
    for backend in Backend::ALL {
        let node = TestNode::start(backend, 4).await;
        let file_id = node.create("overlong.bin").await;

        let (source, source_disposals) = TrackedSource::new(content(4096), 1);
        let err = node
            .services
            .upload
            .upload_file_content(file_id.as_str(), 2, Box::new(source), &mut UploadRecorder::default())
            .await
            .unwrap_err();

        assert_eq!(err.kind, ErrorKind::DataTransfer, "{backend:?}");
        assert_eq!(source_disposals.load(Ordering::SeqCst), 1);
        assert_eq!(node.storage.length(file_id.as_str()).await.unwrap(), 0);
        assert_eq!(node.revision(&file_id).await.state, FileState::New);
        node.shutdown().await;
    }
}

#[tokio::test]
async fn test_retry_after_failed_upload() {
    let node = TestNode::start(Backend::Local, 8).await;
    let file_id = node.create("retry.bin").await;

    let (short, _) = TrackedSource::new(content(10), 8);
    let err = node
        .services
        .upload
        .upload_file_content(file_id.as_str(), 20, Box::new(short), &mut UploadRecorder::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind, ErrorKind::DataTransfer);

    let original = content(20);
    let (full, _) = TrackedSource::new(original.clone(), 8);
    node.services
        .upload
        .upload_file_content(file_id.as_str(), 20, Box::new(full), &mut UploadRecorder::default())
        .await
        .unwrap();

    let (outcome, sink) = node.download(file_id.as_str(), None).await;
    outcome.unwrap();
    assert_eq!(sink.to_vec(), original);
}

#[tokio::test]
async fn test_background_upload_settles_promise() {
    let node = TestNode::start(Backend::Pooled, 32).await;
    let file_id = node.create("bg.bin").await;

    let (source, disposals) = TrackedSource::new(content(300), 32);
    let promise =
        node.services
            .upload
            .upload_in_background(file_id.to_string(), 300, Box::new(source));

    let descriptor = promise.await.unwrap();
    assert_eq!(descriptor.total_length, Some(300));
    assert_eq!(disposals.load(Ordering::SeqCst), 1);
    node.shutdown().await;
}
