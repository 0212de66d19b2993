//! Service wiring.

use std::sync::Arc;

use revstore_core::config::AppConfig;
use revstore_core::traits::{IdGenerator, StorageProvider};
use revstore_entity::revision::RevisionRepository;
use revstore_storage::transfer::TransferScheduler;

use crate::file::{DownloadService, ManagementService, UploadService};
use crate::identifier::NodeIdGenerator;
use crate::lifecycle::{LifecycleSettings, RevisionLifecycle};

/// Shared handle to the revision repository.
pub type RevisionStore = Arc<RevisionRepository>;

/// The full set of services of one storage node, sharing one repository,
/// storage provider and scheduler.
#[derive(Debug, Clone)]
pub struct Services {
    /// Lifecycle operations.
    pub lifecycle: Arc<RevisionLifecycle>,
    /// Creation, description and disposal.
    pub management: ManagementService,
    /// Content upload.
    pub upload: UploadService,
    /// Range download.
    pub download: DownloadService,
}

impl Services {
    /// Wire services from configuration and collaborators.
    pub fn new(
        config: &AppConfig,
        revisions: RevisionStore,
        storage: Arc<dyn StorageProvider>,
        scheduler: Arc<dyn TransferScheduler>,
    ) -> Self {
        let ids: Arc<dyn IdGenerator> = Arc::new(NodeIdGenerator::new(config.node.id.clone()));
        Self::with_ids(config, revisions, storage, scheduler, ids)
    }

    /// Wire services with a caller-supplied identifier generator.
    pub fn with_ids(
        config: &AppConfig,
        revisions: RevisionStore,
        storage: Arc<dyn StorageProvider>,
        scheduler: Arc<dyn TransferScheduler>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        let lifecycle = Arc::new(RevisionLifecycle::new(
            storage,
            scheduler,
            LifecycleSettings::from_config(config),
        ));

        Self {
            management: ManagementService::new(
                Arc::clone(&revisions),
                Arc::clone(&lifecycle),
                ids,
            ),
            upload: UploadService::new(Arc::clone(&revisions), Arc::clone(&lifecycle)),
            download: DownloadService::new(revisions, Arc::clone(&lifecycle)),
            lifecycle,
        }
    }
}
