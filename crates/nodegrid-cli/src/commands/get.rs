use nodegrid_core::NodeGroupSummary;

use super::Target;
use crate::OutputFormat;

pub async fn nodegroups(target: &Target, name: Option<&str>, output: OutputFormat) -> anyhow::Result<()> {
    let provider = target.provider()?;
    let summaries = target
        .aggregator(provider)
        .list_summaries(&target.cluster, name)
        .await?;

    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&summaries)?),
        OutputFormat::Table => print!("{}", format_table(&summaries)),
    }
    Ok(())
}

const HEADER: [&str; 8] = [
    "CLUSTER",
    "NODEGROUP",
    "STATUS",
    "TYPE",
    "DESIRED",
    "MIN",
    "MAX",
    "AUTOSCALING GROUP",
];

fn row(s: &NodeGroupSummary) -> [String; 8] {
    let (desired, min, max) = match s.capacity {
        Some(c) => (c.desired.to_string(), c.min.to_string(), c.max.to_string()),
        None => ("-".into(), "-".into(), "-".into()),
    };
    [
        s.cluster.clone(),
        s.name.clone(),
        s.status.clone(),
        s.node_group_type.to_string(),
        desired,
        min,
        max,
        s.autoscaling_group_name.clone().unwrap_or_else(|| "-".into()),
    ]
}

/// Render summaries as a left-aligned table.
pub fn format_table(summaries: &[NodeGroupSummary]) -> String {
    if summaries.is_empty() {
        return "No nodegroups found\n".to_string();
    }

    let rows: Vec<[String; 8]> = summaries.iter().map(row).collect();
    let mut widths = HEADER.map(str::len);
    for r in &rows {
        for (w, cell) in widths.iter_mut().zip(r) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: &[&str]| {
        let line = cells
            .iter()
            .zip(widths)
            .map(|(c, w)| format!("{c:<w$}"))
            .collect::<Vec<_>>()
            .join("  ");
        out.push_str(line.trim_end());
        out.push('\n');
    };

    push_line(&HEADER);
    for r in &rows {
        let cells: Vec<&str> = r.iter().map(String::as_str).collect();
        push_line(&cells);
    }
    out
}
