//! Service container for dependency injection
//!
//! Wires up the restructuring service with settings and filesystem.

use std::sync::Arc;

use crate::application::RestructureService;
use crate::config::Settings;
use crate::infrastructure::traits::{FileSystem, RealFileSystem};

/// Container holding all application services.
pub struct ServiceContainer {
    /// Application settings
    pub settings: Arc<Settings>,

    /// Filesystem abstraction
    pub fs: Arc<dyn FileSystem>,

    restructure: RestructureService,
}

impl ServiceContainer {
    /// Create a new service container with real implementations.
    pub fn new(settings: Settings) -> Self {
        Self::with_deps(settings, Arc::new(RealFileSystem))
    }

    /// Create a service container with custom dependencies (for testing).
    pub fn with_deps(settings: Settings, fs: Arc<dyn FileSystem>) -> Self {
        let settings = Arc::new(settings);
        let restructure = RestructureService::new(Arc::clone(&fs), Arc::clone(&settings));
        Self {
            settings,
            fs,
            restructure,
        }
    }

    pub fn restructure(&self) -> &RestructureService {
        &self.restructure
    }
}
