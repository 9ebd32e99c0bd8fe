//! Service container for dependency injection
//!
//! Wires up all services with their dependencies.

use std::sync::Arc;

use crate::application::services::RoadmapService;
use crate::application::ApplicationResult;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, HttpTransport, RealFileSystem, ReqwestTransport};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// HTTP abstraction
    pub transport: Arc<dyn HttpTransport>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> ApplicationResult<Self> {
        let transport = ReqwestTransport::new(settings.request_timeout())?;
        Ok(Self::with_deps(
            settings,
            Arc::new(transport),
            Arc::new(RealFileSystem),
        ))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(
        settings: Settings,
        transport: Arc<dyn HttpTransport>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let settings = Arc::new(settings);

        Self {
            settings,
            transport,
            fs,
        }
    }

    pub fn roadmap_service(&self) -> RoadmapService {
        RoadmapService::new(Arc::clone(&self.settings), Arc::clone(&self.transport))
    }
}
