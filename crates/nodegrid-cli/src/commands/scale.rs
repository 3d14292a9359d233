use anyhow::Context;
use tracing::info;

use nodegrid_core::{NodeGroupSpec, nodegroup_stack_name};
use nodegrid_scale::ReconcileOutcome;

use super::Target;

/// Capacity flags given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ScaleRequest {
    pub name: String,
    pub nodes: Option<u32>,
    pub nodes_min: Option<u32>,
    pub nodes_max: Option<u32>,
}

impl ScaleRequest {
    /// Start from the config's entry for the node group, if any, and apply
    /// the flags on top.
    pub fn to_spec(&self, target: &Target) -> NodeGroupSpec {
        let mut spec = target
            .config
            .as_ref()
            .and_then(|c| c.nodegroup(&self.name))
            .cloned()
            .unwrap_or_else(|| NodeGroupSpec::new(&self.name));

        if let Some(n) = self.nodes {
            spec = spec.with_desired_capacity(n);
        }
        if let Some(n) = self.nodes_min {
            spec = spec.with_min_size(n);
        }
        if let Some(n) = self.nodes_max {
            spec = spec.with_max_size(n);
        }
        spec
    }
}

pub async fn nodegroup(target: &Target, request: ScaleRequest, dry_run: bool) -> anyhow::Result<()> {
    let spec = request.to_spec(target);
    if spec.desired_capacity.is_unset() && spec.min_size.is_unset() && spec.max_size.is_unset() {
        anyhow::bail!("at least one of --nodes, --nodes-min or --nodes-max must be set");
    }

    let provider = target.provider()?;
    let scaler = target.scaler(provider.clone());
    let stack = nodegroup_stack_name(&target.stack_prefix, &target.cluster, &spec.name);

    if dry_run {
        match scaler.scale_template(&target.cluster, &spec).await?.into_template() {
            None => println!("nodegroup {} already at requested capacity", spec.name),
            Some(template) => {
                println!("# stack {stack} (dry run, not applied)");
                print!("{template}");
            }
        }
        return Ok(());
    }

    match scaler.scale(&target.cluster, &spec).await? {
        ReconcileOutcome::Unchanged => {
            println!("nodegroup {} already at requested capacity", spec.name);
        }
        ReconcileOutcome::Updated(_) => {
            provider
                .save()
                .await
                .with_context(|| format!("failed to write inventory {}", target.inventory.display()))?;
            info!(stack = %stack, "inventory updated");
            println!("scaled nodegroup {} (stack {stack})", spec.name);
        }
    }
    Ok(())
}
