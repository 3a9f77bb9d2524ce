//! Builder for creating and configuring SequenceEngine instances.

use std::{
    path::{Path, PathBuf},
    sync::Arc,
};

use log::debug;

use super::{
    clock::{Clock, SystemClock},
    SequenceEngine,
};
use crate::{
    db::run_blocking,
    error::{OutreachError, Result},
    generation::{ContentGenerator, TemplateGenerator},
};

/// Builder for creating and configuring SequenceEngine instances.
#[derive(Clone)]
pub struct SequenceEngineBuilder {
    database_path: Option<PathBuf>,
    generator: Option<Arc<dyn ContentGenerator>>,
    clock: Option<Arc<dyn Clock>>,
}

impl SequenceEngineBuilder {
    /// Creates a new builder with default settings.
    pub fn new() -> Self {
        Self {
            database_path: None,
            generator: None,
            clock: None,
        }
    }

    /// Sets a custom database file path.
    ///
    /// If not specified, uses XDG Base Directory specification:
    /// `$XDG_DATA_HOME/outreach/outreach.db` or
    /// `~/.local/share/outreach/outreach.db`
    pub fn with_database_path<P: AsRef<Path>>(mut self, path: Option<P>) -> Self {
        if let Some(path) = path {
            self.database_path = Some(path.as_ref().to_path_buf());
        }
        self
    }

    /// Sets the content generator. Defaults to the offline template
    /// generator.
    pub fn with_generator(mut self, generator: Arc<dyn ContentGenerator>) -> Self {
        self.generator = Some(generator);
        self
    }

    /// Sets the time source. Defaults to the system clock.
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Builds the configured engine instance.
    ///
    /// # Errors
    ///
    /// Returns `OutreachError::FileSystem` if the database path is invalid
    /// Returns `OutreachError::Database` if database initialization fails
    pub async fn build(self) -> Result<SequenceEngine> {
        let db_path = if let Some(path) = self.database_path {
            path
        } else {
            Self::default_database_path()?
        };

        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| OutreachError::FileSystem {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        run_blocking(db_path.clone(), |_db| Ok(())).await?;

        let generator = self
            .generator
            .unwrap_or_else(|| Arc::new(TemplateGenerator::new()));
        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        debug!(
            "Opened outreach database at {} with {} generator",
            db_path.display(),
            generator.name()
        );

        Ok(SequenceEngine::new(db_path, generator, clock))
    }

    /// Returns the default database path following XDG Base Directory
    /// specification.
    fn default_database_path() -> Result<PathBuf> {
        xdg::BaseDirectories::with_prefix("outreach")
            .place_data_file("outreach.db")
            .map_err(|e| OutreachError::XdgDirectory(e.to_string()))
    }
}

impl Default for SequenceEngineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
