/*!
`clusters.rs`

Implements `weapm clusters`:

  weapm clusters                              list all clusters
  weapm clusters -d -n LOG001                 cluster detail (nodes, subsystems, report)
  weapm clusters --subsystems -n LOG001       subsystems managed by a cluster
*/

use anyhow::{Context, Result};
use clap::Args;

use crate::cmd::format::{
    Glyph, Role, StyleOptions, Table, box_header, color, flag, human_bytes, key_values,
    with_glyph,
};
use crate::cmd::shared::Session;
use crate::model::{ClusterDetailResult, LogClusterInfo, LogSubClusterSubSystem};

#[derive(Args, Debug, Clone)]
pub struct ClustersArgs {
    /// Show details for the cluster named by --cluster-name
    #[arg(short = 'd', long, requires = "cluster_name", conflicts_with = "subsystems")]
    pub detail: bool,

    /// List subsystems managed by the cluster named by --cluster-name
    #[arg(long, requires = "cluster_name")]
    pub subsystems: bool,

    /// Cluster name
    #[arg(short = 'n', long = "cluster-name", value_name = "NAME")]
    pub cluster_name: Option<String>,
}

pub fn execute_clusters(args: ClustersArgs, session: &Session) -> Result<()> {
    let target = session.target_label();
    match (args.cluster_name.as_deref(), args.detail, args.subsystems) {
        (Some(name), true, _) => {
            let detail = session
                .run(session.client.get_cluster_detail(name))
                .with_context(|| format!("failed to fetch cluster '{name}'"))?;
            session
                .out
                .emit(&detail, |style| render_detail(&detail, style))
        }
        (Some(name), _, true) => {
            let subs = session
                .run(session.client.get_cluster_subsystems(name))
                .with_context(|| format!("failed to fetch subsystems of cluster '{name}'"))?;
            session
                .out
                .emit(&subs, |style| render_managed(name, &subs, style))
        }
        _ => {
            let clusters = session
                .run(session.client.get_clusters())
                .context("failed to list clusters")?;
            session
                .out
                .emit(&clusters, |style| render_list(&clusters, &target, style))
        }
    }
}

fn render_list(clusters: &[LogClusterInfo], target: &str, style: &StyleOptions) -> String {
    let header = box_header(
        &with_glyph(Glyph::Cluster, format!("Clusters ({})", clusters.len()), style),
        Some(target),
        style,
    );
    if clusters.is_empty() {
        return format!("{header}\n{}", color(Role::Dim, "(none)", style));
    }
    let mut t = Table::new(["NAME", "DEFAULT", "TOPIC", "BUCKETS", "BACKEND", "STORAGE"]);
    for c in clusters {
        t.row([
            c.cluster_name.clone(),
            flag(c.is_default == 1, style),
            c.topic.clone(),
            c.bucket_names.clone(),
            c.backend_domain.clone(),
            c.storage_domain.clone(),
        ]);
    }
    format!(
        "{header}\n{}\n\n{}",
        t.render(style),
        color(
            Role::Dim,
            with_glyph(
                Glyph::Info,
                "Use `weapm clusters -d -n <name>` for nodes and managed subsystems",
                style
            ),
            style
        )
    )
}

fn render_detail(d: &ClusterDetailResult, style: &StyleOptions) -> String {
    let info = &d.cluster_info;
    let mut out = vec![
        box_header(
            &with_glyph(Glyph::Cluster, format!("Cluster {}", info.cluster_name), style),
            None,
            style,
        ),
        key_values(
            &[
                ("default", flag(info.is_default == 1, style)),
                ("topic", info.topic.clone()),
                ("buckets", info.bucket_names.clone()),
                ("backend", info.backend_domain.clone()),
                ("storage", info.storage_domain.clone()),
                ("peak traffic", human_bytes(d.report_data.peak_traffic)),
                ("peak time", d.report_data.peak_time.clone()),
                ("subsystems", d.report_data.total_sub_systems.to_string()),
                ("topic backlog", d.report_data.topic_backlog.to_string()),
            ],
            style,
        ),
    ];

    for group in &d.node_groups {
        let mut t = Table::new(["ADDRESS", "STATUS", "CPU", "MEM", "DEFAULT", "UPDATED"]);
        for n in &group.nodes {
            t.row([
                n.address.clone(),
                n.status.clone(),
                n.cpu_limit.clone(),
                n.mem_limit.clone(),
                flag(n.is_default, style),
                n.update_time.clone(),
            ]);
        }
        out.push(String::new());
        out.push(color(
            Role::Title,
            format!("Nodes: {} ({})", group.role, group.nodes.len()),
            style,
        ));
        out.push(t.render(style));
    }

    if !d.managed_sub_systems.is_empty() {
        out.push(String::new());
        out.push(color(
            Role::Title,
            format!("Managed subsystems ({})", d.managed_sub_systems.len()),
            style,
        ));
        out.push(subsystem_table(&d.managed_sub_systems).render(style));
    }
    out.join("\n")
}

fn render_managed(cluster: &str, subs: &[LogSubClusterSubSystem], style: &StyleOptions) -> String {
    let header = box_header(
        &with_glyph(
            Glyph::Subsystem,
            format!("Subsystems in {cluster} ({})", subs.len()),
            style,
        ),
        None,
        style,
    );
    if subs.is_empty() {
        return format!("{header}\n{}", color(Role::Dim, "(none)", style));
    }
    format!("{header}\n{}", subsystem_table(subs).render(style))
}

fn subsystem_table(subs: &[LogSubClusterSubSystem]) -> Table {
    let mut t = Table::new(["ID", "NAME", "STATUS", "TRAFFIC", "OWNER", "DEPT"]);
    for s in subs {
        t.row([
            s.subsystem_id.clone(),
            s.subsys_name.clone(),
            s.status.clone(),
            s.traffic.to_string(),
            s.subsystem_owner.clone(),
            s.dev_dept.clone(),
        ]);
    }
    t
}
