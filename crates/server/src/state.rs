use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::RwLock;

use films_processor_core::{Config, FilmCategory, RunCoordinator, RunReport, SanitizedConfig};

/// Shared application state
pub struct AppState {
    config: Config,
    coordinator: Arc<RunCoordinator>,
    runs: RunGuard,
    last_reports: RwLock<HashMap<FilmCategory, RunReport>>,
}

impl AppState {
    pub fn new(config: Config, coordinator: Arc<RunCoordinator>) -> Self {
        Self {
            config,
            coordinator,
            runs: RunGuard::new(),
            last_reports: RwLock::new(HashMap::new()),
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn coordinator(&self) -> Arc<RunCoordinator> {
        Arc::clone(&self.coordinator)
    }

    pub fn runs(&self) -> &RunGuard {
        &self.runs
    }

    pub async fn record_report(&self, report: RunReport) {
        self.last_reports
            .write()
            .await
            .insert(report.category, report);
    }

    pub async fn last_report(&self, category: FilmCategory) -> Option<RunReport> {
        self.last_reports.read().await.get(&category).cloned()
    }
}

/// One in-flight run per category.
pub struct RunGuard {
    flags: HashMap<FilmCategory, Arc<AtomicBool>>,
}

impl RunGuard {
    pub fn new() -> Self {
        Self {
            flags: FilmCategory::ALL
                .iter()
                .map(|c| (*c, Arc::new(AtomicBool::new(false))))
                .collect(),
        }
    }

    /// Claim the category. `None` while another run of it is in progress.
    pub fn try_acquire(&self, category: FilmCategory) -> Option<RunPermit> {
        let flag = self.flags.get(&category)?;
        flag.compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()?;
        Some(RunPermit {
            flag: Arc::clone(flag),
        })
    }

    pub fn is_running(&self, category: FilmCategory) -> bool {
        self.flags
            .get(&category)
            .is_some_and(|f| f.load(Ordering::SeqCst))
    }
}

impl Default for RunGuard {
    fn default() -> Self {
        Self::new()
    }
}

/// Released on drop.
pub struct RunPermit {
    flag: Arc<AtomicBool>,
}

impl Drop for RunPermit {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::SeqCst);
    }
}
