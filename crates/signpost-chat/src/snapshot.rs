//! Atomically published conversation data.
//!
//! A [`Snapshot`] pairs a graph with the index built from it. Readers take
//! the current snapshot once per event; a reload builds a complete
//! replacement and swaps it in, so a reader never sees a graph paired with
//! another graph's index.

use std::sync::{Arc, RwLock};

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use signpost_graph::{ConversationDocument, DocumentSource, GraphModel};
use signpost_search::{IndexOptions, Morphology, SearchIndex};

use crate::error::{ChatError, ReloadError};

/// One consistent version of the conversation.
#[derive(Debug)]
pub struct Snapshot {
    pub graph: GraphModel,
    pub index: SearchIndex,
    pub revision: Uuid,
    pub loaded_at: DateTime<Utc>,
}

impl Snapshot {
    pub fn build(
        doc: &ConversationDocument,
        root: &str,
        morphology: Arc<Morphology>,
        options: IndexOptions,
    ) -> Result<Self, ReloadError> {
        let graph = GraphModel::build(doc, root)?;
        let index = SearchIndex::build(&graph, morphology, options);
        Ok(Self {
            graph,
            index,
            revision: Uuid::new_v4(),
            loaded_at: Utc::now(),
        })
    }
}

/// Shared handle to the current snapshot.
#[derive(Debug)]
pub struct SnapshotHandle {
    current: RwLock<Arc<Snapshot>>,
    root: String,
    morphology: Arc<Morphology>,
    options: IndexOptions,
}

impl SnapshotHandle {
    /// Fetch, build and install the first snapshot.
    pub fn load(
        source: &dyn DocumentSource,
        root: impl Into<String>,
        morphology: Arc<Morphology>,
        options: IndexOptions,
    ) -> Result<Self, ReloadError> {
        let root = root.into();
        let doc = source.fetch()?;
        let snapshot = Snapshot::build(&doc, &root, Arc::clone(&morphology), options)?;
        info!(
            source = %source.describe(),
            revision = %snapshot.revision,
            nodes = snapshot.graph.len(),
            "Conversation loaded"
        );
        Ok(Self {
            current: RwLock::new(Arc::new(snapshot)),
            root,
            morphology,
            options,
        })
    }

    /// The snapshot to use for one event.
    pub fn current(&self) -> Result<Arc<Snapshot>, ChatError> {
        self.current
            .read()
            .map(|guard| Arc::clone(&*guard))
            .map_err(|_| ChatError::Snapshot("snapshot lock poisoned".to_string()))
    }

    /// Build a replacement from `source` and publish it.
    ///
    /// On failure the previous snapshot stays installed.
    pub fn reload(&self, source: &dyn DocumentSource) -> Result<Arc<Snapshot>, ReloadError> {
        let built = source.fetch().map_err(ReloadError::from).and_then(|doc| {
            Snapshot::build(&doc, &self.root, Arc::clone(&self.morphology), self.options)
        });

        match built {
            Ok(snapshot) => self.publish(snapshot),
            Err(e) => {
                warn!(
                    source = %source.describe(),
                    error = %e,
                    "Reload failed, keeping previous conversation"
                );
                Err(e)
            }
        }
    }

    /// Install `snapshot` as the current one.
    pub fn publish(&self, snapshot: Snapshot) -> Result<Arc<Snapshot>, ReloadError> {
        let snapshot = Arc::new(snapshot);
        let mut current = self.current.write().map_err(|_| ReloadError::Poisoned)?;
        info!(
            previous = %current.revision,
            revision = %snapshot.revision,
            nodes = snapshot.graph.len(),
            "Conversation published"
        );
        *current = Arc::clone(&snapshot);
        Ok(snapshot)
    }

    pub fn root(&self) -> &str {
        &self.root
    }
}
