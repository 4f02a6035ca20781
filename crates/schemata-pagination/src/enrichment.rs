//! Per-record enrichment from the entry-count, workflow-scheme, and
//! system-action sources.
//!
//! Each source is loaded once per page and degrades independently: a failed
//! source becomes [`SourceResult::Unavailable`] and the merge step renders it
//! as a sentinel (entry counts) or an absent attribute (workflow data). Only
//! cancellation aborts enrichment.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use serde_json::Value as JsonValue;
use tokio_util::sync::CancellationToken;
use tracing::{error, trace};

use schemata_core::{
    defaults, ContentType, EntryCount, EntryCountSource, Error, Principal, RecordMap, Result,
    SystemActionMapping, WorkflowRepository, WorkflowScheme,
};

use crate::cancel::run_stage;

/// Outcome of one enrichment source.
#[derive(Debug, Clone, PartialEq)]
pub enum SourceResult<T> {
    Loaded(T),
    Unavailable,
}

impl<T> SourceResult<T> {
    /// Degrade a lookup result, logging the failure.
    ///
    /// Cancellation is returned as an error instead of being degraded.
    pub fn degrade(source: &'static str, result: Result<T>) -> Result<Self> {
        match result {
            Ok(value) => Ok(Self::Loaded(value)),
            Err(Error::Cancelled) => Err(Error::Cancelled),
            Err(e) => {
                error!(
                    subsystem = "pagination",
                    component = "enrichment",
                    source,
                    error = %e,
                    "Enrichment source unavailable, continuing with a degraded page"
                );
                Ok(Self::Unavailable)
            }
        }
    }

    pub fn is_loaded(&self) -> bool {
        matches!(self, Self::Loaded(_))
    }

    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}

/// The three enrichment sources for one page.
#[derive(Debug, Clone, PartialEq)]
pub struct EnrichmentBundle {
    /// Keyed by lower-cased variable.
    pub entry_counts: SourceResult<HashMap<String, i64>>,
    /// Keyed by variable, exactly as stored.
    pub workflow_schemes: SourceResult<HashMap<String, Vec<WorkflowScheme>>>,
    /// Keyed by variable, exactly as stored.
    pub system_action_mappings: SourceResult<HashMap<String, Vec<SystemActionMapping>>>,
}

impl EnrichmentBundle {
    /// Entry count for a record; a missing key counts as zero.
    pub fn entry_count(&self, variable: &str) -> EntryCount {
        match &self.entry_counts {
            SourceResult::Loaded(counts) => {
                EntryCount::Count(counts.get(&variable.to_lowercase()).copied().unwrap_or(0))
            }
            SourceResult::Unavailable => EntryCount::Unavailable,
        }
    }

    /// Annotate projected records in place.
    ///
    /// Never reorders, drops, or fails. Every record gets `nEntries`; workflow
    /// attributes are added only where the source has the record's variable.
    pub fn merge(&self, records: &mut [RecordMap]) {
        for record in records.iter_mut() {
            let variable = record
                .get(defaults::VARIABLE_KEY)
                .and_then(JsonValue::as_str)
                .unwrap_or_default()
                .to_string();

            let n_entries = self.entry_count(&variable);
            record.insert(defaults::N_ENTRIES_KEY.to_string(), n_entries.into());

            if let Some(schemes) = self
                .workflow_schemes
                .loaded()
                .and_then(|m| m.get(&variable))
            {
                insert_json(record, defaults::WORKFLOWS_KEY, schemes);
            }

            if let Some(mappings) = self
                .system_action_mappings
                .loaded()
                .and_then(|m| m.get(&variable))
            {
                insert_json(record, defaults::SYSTEM_ACTION_MAPPINGS_KEY, mappings);
            }

            trace!(
                subsystem = "pagination",
                component = "enrichment",
                variable = %variable,
                n_entries = ?n_entries,
                "Merged enrichment"
            );
        }
    }
}

/// Insert `value` under `key`; a value that fails to serialize leaves the
/// attribute absent.
fn insert_json<T: Serialize>(record: &mut RecordMap, key: &str, value: &T) {
    match serde_json::to_value(value) {
        Ok(json) => {
            record.insert(key.to_string(), json);
        }
        Err(e) => {
            error!(
                subsystem = "pagination",
                component = "enrichment",
                attribute = key,
                error = %e,
                "Failed to serialize enrichment attribute, omitting it"
            );
        }
    }
}

/// Loads enrichment data for a page.
///
/// Entry counts are read with a fixed system credential; workflow data is
/// read as the caller.
#[derive(Clone)]
pub struct Enricher {
    workflows: Arc<dyn WorkflowRepository>,
    entry_counts: Arc<dyn EntryCountSource>,
    system: Principal,
}

impl Enricher {
    pub fn new(
        workflows: Arc<dyn WorkflowRepository>,
        entry_counts: Arc<dyn EntryCountSource>,
        system: Principal,
    ) -> Self {
        Self {
            workflows,
            entry_counts,
            system,
        }
    }

    /// The credential used for the privileged entry-count lookup.
    pub fn system_principal(&self) -> &Principal {
        &self.system
    }

    /// Load all three sources, one batched call each.
    pub async fn load(
        &self,
        content_types: &[ContentType],
        principal: &Principal,
        cancel: &CancellationToken,
    ) -> Result<EnrichmentBundle> {
        let entry_counts = SourceResult::degrade(
            "entry_counts",
            run_stage(
                cancel,
                "entry_counts",
                self.entry_counts.entries_by_content_type(&self.system),
            )
            .await,
        )?;

        let workflow_schemes = SourceResult::degrade(
            "workflow_schemes",
            run_stage(
                cancel,
                "workflow_schemes",
                self.workflows.schemes_by_content_types(content_types),
            )
            .await,
        )?;

        let system_action_mappings = SourceResult::degrade(
            "system_action_mappings",
            run_stage(
                cancel,
                "system_action_mappings",
                self.workflows
                    .system_action_mappings_by_content_types(content_types, principal),
            )
            .await,
        )?;

        Ok(EnrichmentBundle {
            entry_counts,
            workflow_schemes,
            system_action_mappings,
        })
    }

    /// Load the sources and merge them into `records`.
    ///
    /// `records` must be the projection of `content_types`, in the same order.
    pub async fn enrich(
        &self,
        content_types: &[ContentType],
        records: &mut [RecordMap],
        principal: &Principal,
        cancel: &CancellationToken,
    ) -> Result<EnrichmentBundle> {
        let bundle = self.load(content_types, principal, cancel).await?;
        bundle.merge(records);
        Ok(bundle)
    }
}
