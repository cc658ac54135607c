/*!
`dashboard.rs`

Implements `weapm dashboard`: the overview returned by
`GET /operation/dashboard` (subsystem and cluster counts, per-cluster log
volume against capacity, top subsystems by log volume, recent traffic).

JSON output is the `result` object exactly as the server's field names spell it.
*/

use anyhow::{Context, Result};
use clap::Args;

use crate::cmd::format::{
    Glyph, Role, StyleOptions, Table, box_header, color, human_bytes, human_mb, key_values,
    with_glyph,
};
use crate::cmd::shared::Session;
use crate::model::DashboardResult;

#[derive(Args, Debug, Clone)]
pub struct DashboardArgs {
    /// How many top subsystems to show in the human view
    #[arg(long, default_value_t = 10, value_name = "N")]
    pub top: usize,
}

pub fn execute_dashboard(args: DashboardArgs, session: &Session) -> Result<()> {
    let dashboard = session
        .run(session.client.get_dashboard())
        .context("failed to fetch dashboard")?;
    let target = session.target_label();
    session
        .out
        .emit(&dashboard, |style| render(&dashboard, args.top, &target, style))
}

/// Percentage of capacity used, if capacity is known.
fn usage_percent(used_gb: i64, capacity_gb: i64) -> Option<f64> {
    if capacity_gb <= 0 {
        return None;
    }
    Some(used_gb as f64 * 100.0 / capacity_gb as f64)
}

fn render(d: &DashboardResult, top: usize, target: &str, style: &StyleOptions) -> String {
    let mut out = Vec::new();
    out.push(box_header(
        &with_glyph(Glyph::Chart, "Dashboard", style),
        Some(target),
        style,
    ));
    out.push(key_values(
        &[
            ("subsystems", d.subsystem_count.to_string()),
            ("clusters", d.cluster_num.to_string()),
        ],
        style,
    ));

    if !d.cluster_log_counts.is_empty() {
        let mut t = Table::new(["CLUSTER", "LOG (GB)", "CAPACITY (GB)", "USED"]);
        for c in &d.cluster_log_counts {
            let used = match usage_percent(c.total_log_gb, c.capacity) {
                Some(p) if p >= 90.0 => color(Role::Bad, format!("{p:.1}%"), style),
                Some(p) if p >= 75.0 => color(Role::Warn, format!("{p:.1}%"), style),
                Some(p) => format!("{p:.1}%"),
                None => "-".to_string(),
            };
            t.row([
                c.cluster_name.clone(),
                c.total_log_gb.to_string(),
                c.capacity.to_string(),
                used,
            ]);
        }
        out.push(String::new());
        out.push(color(Role::Title, "Cluster log volume", style));
        out.push(t.render(style));
    }

    if !d.top_subsystems.is_empty() {
        let mut t = Table::new(["#", "SUBSYSTEM", "NAME", "CLUSTER", "LOG", "DEPARTMENT"]);
        for (i, s) in d.top_subsystems.iter().take(top).enumerate() {
            t.row([
                (i + 1).to_string(),
                s.subsys_id.clone(),
                s.subsys_name.clone(),
                s.cluster_name.clone(),
                human_mb(s.total_log_mb),
                s.department.clone(),
            ]);
        }
        out.push(String::new());
        out.push(color(
            Role::Title,
            format!("Top subsystems ({})", t.len()),
            style,
        ));
        out.push(t.render(style));
    }

    if !d.cluster_traffic_data.is_empty() {
        let mut t = Table::new(["CLUSTER", "TRAFFIC", "TIMESTAMP"]);
        for c in &d.cluster_traffic_data {
            t.row([
                c.cluster_name.clone(),
                human_bytes(c.traffic_bytes),
                c.timestamp.clone(),
            ]);
        }
        out.push(String::new());
        out.push(color(Role::Title, "Cluster traffic", style));
        out.push(t.render(style));
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ClusterLogCount, SubsystemLogDetail};

    #[test]
    fn usage_needs_capacity() {
        assert_eq!(usage_percent(50, 200), Some(25.0));
        assert_eq!(usage_percent(50, 0), None);
    }

    #[test]
    fn render_limits_top_subsystems() {
        let d = DashboardResult {
            subsystem_count: 3,
            cluster_num: 1,
            cluster_log_counts: vec![ClusterLogCount {
                cluster_name: "LOG001".into(),
                total_log_gb: 45,
                capacity: 50,
            }],
            top_subsystems: (1..=3)
                .map(|i| SubsystemLogDetail {
                    subsys_id: format!("SYS00{i}"),
                    total_log_mb: 2048,
                    ..Default::default()
                })
                .collect(),
            ..Default::default()
        };
        let text = render(&d, 2, "http://h/", &StyleOptions::plain(120));
        assert!(text.contains("Dashboard"));
        assert!(text.contains("90.0%"));
        assert!(text.contains("Top subsystems (2)"));
        assert!(text.contains("SYS002"));
        assert!(!text.contains("SYS003"));
        assert!(text.contains("2.0 GB"));
        assert!(!text.contains("Cluster traffic"));
    }
}
