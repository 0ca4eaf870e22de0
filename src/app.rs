// Run orchestration.
// Decides between the cache and a live fetch, prints the records, and refreshes the cache.

use std::io::Write;

use tracing::{debug, info, warn};

use crate::auth;
use crate::cache::{self, PendingCache};
use crate::config::Settings;
use crate::error::{GhlsError, Result};
use crate::github::RepositorySource;
use crate::printer::{FieldPrinter, JsonPrinter, MultiPrinter};
use crate::record::RepoRecord;

/// How a run finished.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `--clean` ran; `removed` is false when there was no cache to delete.
    Cleaned { removed: bool },
    /// Records came from a fresh cache; nothing was fetched or written.
    CacheHit { count: usize },
    /// Records came from GitHub; `persisted` tells whether the cache was replaced.
    Fetched { count: usize, persisted: bool },
}

/// One ghls invocation.
///
/// The flow is cache check, then fetch on any miss, render, and persist.
/// A cache hit renders and stops: no network, no cache write.
pub struct App {
    settings: Settings,
}

impl App {
    pub fn new(settings: Settings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Run to completion, printing records to `out`.
    pub async fn run<S, W>(&self, source: &mut S, mut out: W) -> Result<Outcome>
    where
        S: RepositorySource,
        W: Write,
    {
        if self.settings.clean {
            let removed = cache::remove(&self.settings.cache_path)?;
            info!(path = %self.settings.cache_path.display(), removed, "cache cleaned");
            return Ok(Outcome::Cleaned { removed });
        }

        if let Some(records) = self.cached_records() {
            self.render(&records, &mut out, None)?;
            flush(&mut out);
            return Ok(Outcome::CacheHit {
                count: records.len(),
            });
        }

        let records = self.fetch(source).await?;

        let mut pending = self.open_cache();
        let cache_ok = match self.render(&records, &mut out, pending.as_mut()) {
            Ok(cache_ok) => cache_ok,
            Err(err) => {
                if let Some(Err(cleanup)) = pending.map(PendingCache::discard) {
                    warn!(error = %cleanup, "cannot remove temporary cache file");
                }
                return Err(err);
            }
        };
        flush(&mut out);

        let persisted = self.persist(pending, cache_ok);
        Ok(Outcome::Fetched {
            count: records.len(),
            persisted,
        })
    }

    /// Records from the cache, or `None` when a fetch is needed.
    fn cached_records(&self) -> Option<Vec<RepoRecord>> {
        if !self.settings.use_cache {
            debug!("cache disabled");
            return None;
        }
        if self.settings.refresh {
            debug!("refresh requested, skipping cache");
            return None;
        }

        match cache::load(&self.settings.cache_path) {
            Ok(records) => {
                debug!(count = records.len(), "cache hit");
                Some(records)
            }
            Err(err) if err.is_miss() => {
                debug!(reason = %err, "cache miss");
                None
            }
            Err(err) => {
                warn!(error = %err, "ignoring unusable cache");
                None
            }
        }
    }

    async fn fetch<S: RepositorySource>(&self, source: &mut S) -> Result<Vec<RepoRecord>> {
        let token = auth::resolve_token(
            self.settings.env_token.as_deref(),
            &self.settings.hub_config_path,
        )?;

        let mut records = source.list(self.settings.user.as_deref(), &token).await?;
        records.retain(|record| {
            if !record.is_valid() {
                warn!(name = %record.name, "dropping repository without a full name");
            }
            record.is_valid()
        });

        info!(count = records.len(), user = ?self.settings.user, "fetched repositories");
        Ok(records)
    }

    /// Temp cache file for this run's fetch, if caching is on and the file opens.
    fn open_cache(&self) -> Option<PendingCache> {
        if !self.settings.use_cache {
            return None;
        }
        match PendingCache::create(&self.settings.cache_path) {
            Ok(pending) => Some(pending),
            Err(err) => {
                warn!(path = %self.settings.cache_path.display(), error = %err, "cannot open cache file");
                None
            }
        }
    }

    /// Print every record to `out`, and to `cache` when given.
    ///
    /// Returns whether the cache printer succeeded for every record. Fails
    /// only when every printer failed on the same record.
    fn render<W: Write>(
        &self,
        records: &[RepoRecord],
        out: &mut W,
        cache: Option<&mut PendingCache>,
    ) -> Result<bool> {
        let mut multi = MultiPrinter::new();
        let fields = FieldPrinter::new(out, &self.settings.fields);
        debug!(fields = ?fields.fields(), "printing");
        multi.push(fields);
        let cache_index = cache.map(|cache| multi.push(JsonPrinter::new(cache)));

        let mut cache_ok = true;
        for record in records {
            let failures = multi.dispatch(record);
            if !failures.is_empty() && failures.len() == multi.len() {
                return Err(GhlsError::AllSinksFailed {
                    full_name: record.full_name.clone(),
                });
            }
            for failure in failures {
                warn!(sink = failure.index, repo = %record.full_name, error = %failure.error, "output failed");
                if Some(failure.index) == cache_index {
                    cache_ok = false;
                }
            }
        }

        Ok(cache_ok)
    }

    /// Move the freshly written cache into place. Failures are only logged.
    fn persist(&self, pending: Option<PendingCache>, cache_ok: bool) -> bool {
        let Some(pending) = pending else {
            return false;
        };

        if !cache_ok {
            warn!("cache write incomplete, keeping previous cache");
            if let Err(err) = pending.discard() {
                warn!(error = %err, "cannot remove temporary cache file");
            }
            return false;
        }

        match pending.commit() {
            Ok(()) => true,
            Err(err) => {
                warn!(path = %self.settings.cache_path.display(), error = %err, "cannot write cache");
                false
            }
        }
    }
}

fn flush<W: Write>(out: &mut W) {
    if let Err(err) = out.flush() {
        warn!(error = %err, "cannot flush output");
    }
}
