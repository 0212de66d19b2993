//! Shared test helpers for integration tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use bytes::Bytes;
use tempfile::TempDir;

use revstore_core::config::storage::StorageBackend;
use revstore_core::config::{AppConfig, DispatchMode};
use revstore_core::error::{AppError, ErrorKind};
use revstore_core::result::AppResult;
use revstore_core::traits::{DestinationPoint, PartInfo, Repository, SourcePoint, StorageProvider};
use revstore_core::types::FileId;
use revstore_database::{JsonRevisionRepository, MemoryRevisionRepository};
use revstore_entity::revision::{FileRevision, RevisionAttributes};
use revstore_service::{
    DownloadRequest, DownloadSummary, LoggingListener, RevisionStore, Services,
};
use revstore_storage::transfer::{
    BufferDestination, BytesSource, InlineScheduler, TransferScheduler,
};
use revstore_storage::{LocalStorageProvider, MemoryStorageProvider};
use revstore_worker::{PooledScheduler, WorkerPool};

/// How a test node stores content and runs transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    /// In-memory blobs and metadata, transfers on the caller's task.
    Memory,
    /// Blobs and JSON metadata in a temporary directory.
    Local,
    /// In-memory blobs, transfers on a worker pool.
    Pooled,
}

impl Backend {
    /// Every backend, for tests that must hold on all of them.
    pub const ALL: [Backend; 3] = [Backend::Memory, Backend::Local, Backend::Pooled];
}

/// A fully wired storage node for one test.
pub struct TestNode {
    /// Services under test.
    pub services: Services,
    /// Storage wrapper that counts and can break calls.
    pub storage: Arc<CountingStorage>,
    /// Direct access to stored revisions.
    pub revisions: RevisionStore,
    /// Configuration the node was built from.
    pub config: AppConfig,
    pool: Option<WorkerPool>,
    _dir: Option<TempDir>,
}

impl TestNode {
    /// Start a node on `backend` reading with `buffer_size`-byte chunks.
    pub async fn start(backend: Backend, buffer_size: usize) -> Self {
        let mut config = AppConfig::default();
        config.node.id = "it".to_string();
        config.transfer.buffer_size_bytes = buffer_size;
        config.storage.provider = match backend {
            Backend::Local => StorageBackend::Local,
            Backend::Memory | Backend::Pooled => StorageBackend::Memory,
        };
        config.transfer.dispatch = match backend {
            Backend::Pooled => DispatchMode::Pooled,
            Backend::Memory | Backend::Local => DispatchMode::Inline,
        };

        let (inner, revisions, dir): (Arc<dyn StorageProvider>, RevisionStore, _) = match backend {
            Backend::Local => {
                let dir = tempfile::tempdir().expect("tempdir");
                let blobs = dir.path().join("blobs");
                let storage = LocalStorageProvider::new(blobs.to_str().expect("utf-8 path"))
                    .await
                    .expect("local storage");
                let revisions = JsonRevisionRepository::open(dir.path().join("meta"))
                    .await
                    .expect("json repository");
                (
                    Arc::new(storage) as Arc<dyn StorageProvider>,
                    Arc::new(revisions) as RevisionStore,
                    Some(dir),
                )
            }
            Backend::Memory | Backend::Pooled => (
                Arc::new(MemoryStorageProvider::new()) as Arc<dyn StorageProvider>,
                Arc::new(MemoryRevisionRepository::new()) as RevisionStore,
                None,
            ),
        };

        let storage = Arc::new(CountingStorage::new(inner));
        let (scheduler, pool): (Arc<dyn TransferScheduler>, Option<WorkerPool>) = match backend {
            Backend::Pooled => {
                let pool = WorkerPool::start(&config.worker);
                (
                    Arc::new(PooledScheduler::new(pool.clone())) as Arc<dyn TransferScheduler>,
                    Some(pool),
                )
            }
            Backend::Memory | Backend::Local => {
                (Arc::new(InlineScheduler::new()) as Arc<dyn TransferScheduler>, None)
            }
        };

        let services = Services::new(
            &config,
            Arc::clone(&revisions),
            Arc::clone(&storage) as Arc<dyn StorageProvider>,
            scheduler,
        );

        Self {
            services,
            storage,
            revisions,
            config,
            pool,
            _dir: dir,
        }
    }

    /// Register a new empty file.
    pub async fn create(&self, name: &str) -> FileId {
        self.services
            .management
            .create_file_revision(RevisionAttributes::named(name))
            .await
            .expect("create file")
    }

    /// Create a file and upload `content` into it in `chunk`-byte pieces.
    pub async fn create_with(&self, content: &[u8], chunk: usize) -> FileId {
        let file_id = self.create("content.bin").await;
        self.services
            .upload
            .upload_file_content(
                file_id.as_str(),
                content.len() as u64,
                Box::new(BytesSource::new(content.to_vec(), chunk)),
                &mut LoggingListener,
            )
            .await
            .expect("upload");
        file_id
    }

    /// Download `range` of a file into a fresh buffer.
    pub async fn download(
        &self,
        file_id: &str,
        range: Option<&str>,
    ) -> (AppResult<DownloadSummary>, BufferDestination) {
        let mut sink = BufferDestination::new();
        let outcome = self
            .services
            .download
            .download_file(
                DownloadRequest {
                    file_id,
                    range,
                    destination: &mut sink,
                },
                &mut LoggingListener,
            )
            .await;
        (outcome, sink)
    }

    /// Load a stored revision.
    pub async fn revision(&self, file_id: &FileId) -> FileRevision {
        self.revisions
            .find_by_id(file_id)
            .await
            .expect("find revision")
            .expect("revision exists")
    }

    /// Stop the worker pool, if any, while keeping the node around.
    pub async fn stop_workers(&self) {
        if let Some(pool) = &self.pool {
            pool.shutdown().await;
        }
    }

    /// Drain the worker pool, if any.
    pub async fn shutdown(self) {
        if let Some(pool) = self.pool {
            pool.shutdown().await;
        }
    }
}

/// Deterministic, non-repeating-looking test content.
pub fn content(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i * 31 % 251) as u8).collect()
}

/// Wraps a provider, counting every call and optionally breaking writes.
#[derive(Debug)]
pub struct CountingStorage {
    inner: Arc<dyn StorageProvider>,
    calls: AtomicUsize,
    break_writes: AtomicBool,
    writer_disposals: Arc<AtomicUsize>,
    readers: Arc<ReaderCounts>,
}

/// Read handles opened through [`CountingStorage`].
#[derive(Debug, Default)]
pub struct ReaderCounts {
    /// Handles opened so far.
    pub opened: AtomicUsize,
    /// Handles open right now.
    pub open: AtomicUsize,
    /// Most handles open at once.
    pub peak: AtomicUsize,
}

impl CountingStorage {
    fn new(inner: Arc<dyn StorageProvider>) -> Self {
        Self {
            inner,
            calls: AtomicUsize::new(0),
            break_writes: AtomicBool::new(false),
            writer_disposals: Arc::new(AtomicUsize::new(0)),
            readers: Arc::new(ReaderCounts::default()),
        }
    }

    /// Read handle bookkeeping.
    pub fn readers(&self) -> &ReaderCounts {
        &self.readers
    }

    /// Storage calls made so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Make every writer opened from now on fail on its second chunk.
    pub fn break_writes(&self) {
        self.break_writes.store(true, Ordering::SeqCst);
    }

    /// How many times writers opened here were disposed.
    pub fn writer_disposals(&self) -> usize {
        self.writer_disposals.load(Ordering::SeqCst)
    }

    fn count(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageProvider for CountingStorage {
    fn provider_type(&self) -> &str {
        self.inner.provider_type()
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.count();
        self.inner.health_check().await
    }

    async fn create(&self, name: &str) -> AppResult<()> {
        self.count();
        self.inner.create(name).await
    }

    async fn truncate(&self, name: &str) -> AppResult<()> {
        self.count();
        self.inner.truncate(name).await
    }

    async fn open_for_read(
        &self,
        name: &str,
        offset: u64,
        limit: u64,
        buffer_size: usize,
    ) -> AppResult<Box<dyn SourcePoint>> {
        self.count();
        let inner = self
            .inner
            .open_for_read(name, offset, limit, buffer_size)
            .await?;
        self.readers.opened.fetch_add(1, Ordering::SeqCst);
        let open = self.readers.open.fetch_add(1, Ordering::SeqCst) + 1;
        self.readers.peak.fetch_max(open, Ordering::SeqCst);
        Ok(Box::new(CountedReader {
            inner,
            readers: Arc::clone(&self.readers),
            closed: false,
        }))
    }

    async fn open_for_write(&self, name: &str) -> AppResult<Box<dyn DestinationPoint>> {
        self.count();
        let inner = self.inner.open_for_write(name).await?;
        Ok(Box::new(CountedWriter {
            inner,
            writes: 0,
            broken: self.break_writes.load(Ordering::SeqCst),
            disposals: Arc::clone(&self.writer_disposals),
        }))
    }

    async fn delete(&self, name: &str) -> AppResult<()> {
        self.count();
        self.inner.delete(name).await
    }

    async fn exists(&self, name: &str) -> AppResult<bool> {
        self.count();
        self.inner.exists(name).await
    }

    async fn length(&self, name: &str) -> AppResult<u64> {
        self.count();
        self.inner.length(name).await
    }
}

struct CountedReader {
    inner: Box<dyn SourcePoint>,
    readers: Arc<ReaderCounts>,
    closed: bool,
}

#[async_trait]
impl SourcePoint for CountedReader {
    async fn read(&mut self) -> AppResult<Option<Bytes>> {
        self.inner.read().await
    }

    async fn dispose(&mut self) -> AppResult<()> {
        if !self.closed {
            self.closed = true;
            self.readers.open.fetch_sub(1, Ordering::SeqCst);
        }
        self.inner.dispose().await
    }
}

struct CountedWriter {
    inner: Box<dyn DestinationPoint>,
    writes: usize,
    broken: bool,
    disposals: Arc<AtomicUsize>,
}

#[async_trait]
impl DestinationPoint for CountedWriter {
    async fn write(&mut self, chunk: Bytes) -> AppResult<()> {
        self.writes += 1;
        if self.broken && self.writes > 1 {
            return Err(AppError::new(ErrorKind::Storage, "Disk unplugged"));
        }
        self.inner.write(chunk).await
    }

    async fn begin_part(&mut self, part: &PartInfo) -> AppResult<()> {
        self.inner.begin_part(part).await
    }

    async fn dispose(&mut self) -> AppResult<()> {
        self.disposals.fetch_add(1, Ordering::SeqCst);
        self.inner.dispose().await
    }
}

/// A source over fixed content that records how often it was disposed.
pub struct TrackedSource {
    inner: BytesSource,
    disposals: Arc<AtomicUsize>,
}

impl TrackedSource {
    /// Source over `content` and the counter of its disposals.
    pub fn new(content: Vec<u8>, chunk: usize) -> (Self, Arc<AtomicUsize>) {
        let disposals = Arc::new(AtomicUsize::new(0));
        let source = Self {
            inner: BytesSource::new(content, chunk),
            disposals: Arc::clone(&disposals),
        };
        (source, disposals)
    }
}

#[async_trait]
impl SourcePoint for TrackedSource {
    async fn read(&mut self) -> AppResult<Option<Bytes>> {
        self.inner.read().await
    }

    async fn dispose(&mut self) -> AppResult<()> {
        self.disposals.fetch_add(1, Ordering::SeqCst);
        self.inner.dispose().await
    }
}
