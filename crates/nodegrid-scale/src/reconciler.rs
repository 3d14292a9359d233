//! Capacity reconciler — diffs a node-group spec against its live template.
//!
//! Pure computation: the caller fetches the current template and submits
//! the result of [`reconcile`] to the stack update mechanism.

use tracing::debug;

use nodegrid_core::{Capacity, NodeGroupSpec};

use crate::error::{BoundsViolation, ReconcileResult};
use crate::template::CapacityFields;

/// Result of reconciling a spec against a template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Live capacity already matches the spec. No update should be issued.
    Unchanged,
    /// The template to submit, differing only in the capacity fields.
    Updated(String),
}

impl ReconcileOutcome {
    pub fn changed(&self) -> bool {
        matches!(self, ReconcileOutcome::Updated(_))
    }

    /// The new template text, or `""` for [`ReconcileOutcome::Unchanged`].
    ///
    /// The empty string is a sentinel, not a template: passing it back to
    /// [`reconcile`] fails with a parse error.
    pub fn template(&self) -> &str {
        match self {
            ReconcileOutcome::Updated(t) => t,
            ReconcileOutcome::Unchanged => "",
        }
    }

    pub fn into_template(self) -> Option<String> {
        match self {
            ReconcileOutcome::Updated(t) => Some(t),
            ReconcileOutcome::Unchanged => None,
        }
    }
}

/// Capacity currently written in a node-group template.
pub fn current_capacity(template: &str) -> ReconcileResult<Capacity> {
    Ok(CapacityFields::locate(template)?.capacity())
}

/// Overlay the spec's explicit settings onto the current capacity.
pub fn effective_capacity(current: Capacity, spec: &NodeGroupSpec) -> Capacity {
    Capacity {
        desired: spec.desired_capacity.resolve(current.desired),
        min: spec.min_size.resolve(current.min),
        max: spec.max_size.resolve(current.max),
    }
}

/// Check that desired capacity sits within `[min, max]`. Max is checked first.
pub fn validate_bounds(c: Capacity) -> Result<(), BoundsViolation> {
    if c.desired > c.max {
        return Err(BoundsViolation::AboveMax {
            desired: c.desired,
            max: c.max,
        });
    }
    if c.desired < c.min {
        return Err(BoundsViolation::BelowMin {
            desired: c.desired,
            min: c.min,
        });
    }
    Ok(())
}

/// Reconcile `spec` against `current_template`.
///
/// Bounds are validated on the effective capacity even when nothing
/// changes. On change, the returned template is `current_template` with
/// only `DesiredCapacity`, `MinSize` and `MaxSize` rewritten.
pub fn reconcile(current_template: &str, spec: &NodeGroupSpec) -> ReconcileResult<ReconcileOutcome> {
    let fields = CapacityFields::locate(current_template)?;
    let current = fields.capacity();
    let target = effective_capacity(current, spec);

    validate_bounds(target)?;

    if target == current {
        debug!(
            nodegroup = %spec.name,
            desired = current.desired,
            min = current.min,
            max = current.max,
            "capacity unchanged"
        );
        return Ok(ReconcileOutcome::Unchanged);
    }

    debug!(
        nodegroup = %spec.name,
        from = %current,
        to = %target,
        "capacity changed"
    );
    Ok(ReconcileOutcome::Updated(fields.splice(current_template, target)))
}
