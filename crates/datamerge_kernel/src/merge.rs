//! Merge orchestrator
//!
//! Produces one edited copy of every selected root per record.
//!
//! A merge runs in two phases. The first is sequential: for each root and
//! each record, in that order, the root is cloned into the shared parent and
//! placed. The record's `instance` columns are applied to the copy right away,
//! since a swap replaces children that other columns may target. The rest of
//! the record's element names are then resolved inside the swapped copy. This
//! yields the full list of [`PropertyUpdate`]s. The second phase runs the
//! pending updates as one concurrent batch; results come back in submission
//! order so failures are reported in processing order no matter which update
//! finishes first.

use crate::error::{MergeError, MergeResult};
use crate::matcher::find_by_name;
use crate::registry::UpdaterRegistry;
use datamerge_ir::{normalize, MergeOutcome, Property, PropertyUpdate, RawRecord, UpdateResult};
use datamerge_scene::{NodeId, SceneHost};
use datamerge_services::{FontLoader, ImageSource};
use futures_util::future::{self, Either};
use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Space left between neighbouring copies
pub const DEFAULT_GAP: f64 = 20.0;

/// Updates in flight at once
pub const DEFAULT_MAX_CONCURRENT_UPDATES: usize = 16;

/// Merge configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeOptions {
    /// Lay copies out in a row to the right of their root when the parent
    /// does not arrange its children itself
    pub space_between_items: bool,
    /// Horizontal gap between copies
    pub gap: f64,
    /// Upper bound on concurrently running updates
    pub max_concurrent_updates: usize,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            space_between_items: true,
            gap: DEFAULT_GAP,
            max_concurrent_updates: DEFAULT_MAX_CONCURRENT_UPDATES,
        }
    }
}

impl MergeOptions {
    pub fn with_spacing(mut self, space_between_items: bool) -> Self {
        self.space_between_items = space_between_items;
        self
    }

    pub fn with_gap(mut self, gap: f64) -> Self {
        self.gap = gap;
        self
    }

    pub fn with_max_concurrent_updates(mut self, max: usize) -> Self {
        self.max_concurrent_updates = max;
        self
    }
}

/// Copies made in the first phase and the updates they need
///
/// Updates already applied during the first phase carry their result.
#[derive(Debug, Default)]
struct MergePlan {
    copies: Vec<NodeId>,
    updates: Vec<(PropertyUpdate, Option<UpdateResult>)>,
}

/// Runs merges against a host
#[derive(Debug, Clone)]
pub struct MergeEngine {
    registry: UpdaterRegistry,
}

impl MergeEngine {
    pub fn new(images: Arc<dyn ImageSource>, fonts: Arc<dyn FontLoader>) -> Self {
        Self {
            registry: UpdaterRegistry::new(images, fonts),
        }
    }

    pub fn registry(&self) -> &UpdaterRegistry {
        &self.registry
    }

    /// Make one copy of every root per record and apply each record to its copy
    ///
    /// Fails without touching the document when a root id does not resolve or
    /// the roots do not share one parent. Otherwise every copy is kept, even
    /// if some of its edits fail; those failures are in the returned outcome.
    /// The copies become the host's selection.
    pub async fn merge<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        root_ids: &[NodeId],
        records: &[RawRecord],
        options: &MergeOptions,
    ) -> MergeResult<MergeOutcome> {
        let parent = shared_parent(&*host, root_ids)?;
        let plan = self.plan_copies(host, parent, root_ids, records, options).await?;
        log::debug!(
            "Planned {} copies with {} property updates",
            plan.copies.len(),
            plan.updates.len()
        );

        let (updates, settled): (Vec<_>, Vec<_>) = plan.updates.into_iter().unzip();
        let results = {
            let shared = Mutex::new(&mut *host);
            let limit = options.max_concurrent_updates.max(1);
            let pending = updates.iter().zip(settled).map(|(update, settled)| match settled {
                Some(result) => Either::Left(future::ready(result)),
                None => Either::Right(self.registry.apply(&shared, update)),
            });
            stream::iter(pending).buffered(limit).collect::<Vec<_>>().await
        };

        let outcome = MergeOutcome::fold(plan.copies, updates.into_iter().zip(results));
        for failure in &outcome.failures {
            log::warn!("{}", failure);
        }

        host.set_selection(outcome.copies.clone());
        host.focus(&outcome.copies);

        log::info!(
            "Merged {} records into {} copies ({} failed updates)",
            records.len(),
            outcome.copies.len(),
            outcome.failures.len()
        );
        Ok(outcome)
    }

    async fn plan_copies<H: SceneHost + ?Sized>(
        &self,
        host: &mut H,
        parent: NodeId,
        root_ids: &[NodeId],
        records: &[RawRecord],
        options: &MergeOptions,
    ) -> MergeResult<MergePlan> {
        let arranges = host
            .node(parent)
            .map_or(false, |p| p.layout_mode.arranges_children());
        let place = options.space_between_items && !arranges;
        let instance = Property::Instance.name();

        let mut plan = MergePlan::default();
        for &root in root_ids {
            let (root_x, root_y, root_width) = match host.node(root) {
                Some(node) => (node.x(), node.y(), node.width),
                None => return Err(MergeError::invalid_selection(format!("node {} not found", root))),
            };
            let step = root_width + options.gap;

            for (index, record) in records.iter().enumerate() {
                let normalized = normalize(record);

                let copy = host.clone_node(root)?;
                host.append_child(parent, copy)?;
                if place {
                    if let Some(node) = host.node_mut(copy) {
                        node.set_x(root_x + step + index as f64 * step);
                        node.set_y(root_y);
                    }
                }

                // Swaps replace children, so they go before any other lookup
                for (element, properties) in &normalized {
                    let Some(value) = properties.get(instance) else {
                        continue;
                    };
                    for target in find_by_name(&*host, copy, element) {
                        let update = PropertyUpdate::new(target, element.as_str(), instance, value.clone());
                        let result = {
                            let shared = Mutex::new(&mut *host);
                            self.registry.apply(&shared, &update).await
                        };
                        plan.updates.push((update, Some(result)));
                    }
                }

                for (element, properties) in &normalized {
                    for target in find_by_name(&*host, copy, element) {
                        for (property, value) in properties {
                            if property == instance {
                                continue;
                            }
                            let update = PropertyUpdate::new(target, element.as_str(), property, value.clone());
                            plan.updates.push((update, None));
                        }
                    }
                }
                plan.copies.push(copy);
            }
        }
        Ok(plan)
    }
}

/// The one parent every root hangs off
fn shared_parent<H: SceneHost + ?Sized>(host: &H, root_ids: &[NodeId]) -> MergeResult<NodeId> {
    let mut parent = None;
    for id in root_ids {
        if host.node(*id).is_none() {
            return Err(MergeError::invalid_selection(format!("node {} not found", id)));
        }
        let Some(this_parent) = host.parent_of(*id) else {
            return Err(MergeError::invalid_selection(format!("node {} has no parent", id)));
        };
        match parent {
            None => parent = Some(this_parent),
            Some(p) if p == this_parent => {}
            Some(_) => {
                return Err(MergeError::invalid_selection(
                    "selected nodes do not share a parent",
                ))
            }
        }
    }
    parent.ok_or_else(|| MergeError::invalid_selection("nothing selected"))
}
