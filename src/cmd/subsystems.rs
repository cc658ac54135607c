/*!
`subsystems.rs`

Implements `weapm subsystems`, the read side of subsystem management:

  weapm subsystems                        list every subsystem
  weapm subsystems -s --subsys-id SYS0    search by id prefix (limit 20 by default)
  weapm subsystems --check SYS001         does the subsystem exist, and where
  weapm subsystems -d SYS001              full detail (collection, traffic, instances)

Only one of `--search`, `--check` and `--detail` may be given.
*/

use anyhow::{Context, Result};
use clap::Args;

use crate::cmd::format::{
    Glyph, Role, StyleOptions, Table, box_header, color, flag, key_values, truncate_ellipsis,
    with_glyph,
};
use crate::cmd::shared::Session;
use crate::model::{
    DEFAULT_SEARCH_LIMIT, SearchSubsystemsRequest, SubSystem, SubsystemDetailResult,
    SubsystemExistsResult,
};

#[derive(Args, Debug, Clone)]
pub struct SubsystemsArgs {
    /// Search instead of listing everything
    #[arg(short = 's', long, conflicts_with_all = ["check", "detail"])]
    pub search: bool,

    /// Subsystem id filter for --search
    #[arg(long = "subsys-id", value_name = "ID", requires = "search")]
    pub subsys_id: Option<String>,

    /// Maximum results for --search
    #[arg(short = 'l', long, default_value_t = DEFAULT_SEARCH_LIMIT, value_name = "N")]
    pub limit: u32,

    /// Check whether a subsystem exists
    #[arg(long, value_name = "ID", conflicts_with = "detail")]
    pub check: Option<String>,

    /// Show subsystem detail
    #[arg(short = 'd', long, value_name = "ID")]
    pub detail: Option<String>,
}

pub fn execute_subsystems(args: SubsystemsArgs, session: &Session) -> Result<()> {
    if let Some(id) = args.check.as_deref() {
        let exists = session
            .run(session.client.check_subsystem_exists(id))
            .with_context(|| format!("failed to check subsystem '{id}'"))?;
        return session
            .out
            .emit(&exists, |style| render_exists(id, &exists, style));
    }

    if let Some(id) = args.detail.as_deref() {
        let detail = session
            .run(session.client.get_subsystem_detail(id))
            .with_context(|| format!("failed to fetch subsystem '{id}'"))?;
        return session
            .out
            .emit(&detail, |style| render_detail(id, &detail, style));
    }

    let (title, subsystems) = if args.search {
        let req = SearchSubsystemsRequest {
            subsys_id: args.subsys_id.clone(),
            limit: args.limit,
        };
        let found = session
            .run(session.client.search_subsystems(&req))
            .context("subsystem search failed")?;
        let title = match req.subsys_id.as_deref() {
            Some(id) => format!("Search '{id}'"),
            None => "Search".to_string(),
        };
        (title, found)
    } else {
        let all = session
            .run(session.client.get_subsystems())
            .context("failed to list subsystems")?;
        ("Subsystems".to_string(), all)
    };

    let target = session.target_label();
    session
        .out
        .emit(&subsystems, |style| render_list(&title, &subsystems, &target, style))
}

fn render_list(title: &str, subs: &[SubSystem], target: &str, style: &StyleOptions) -> String {
    let header = box_header(
        &with_glyph(Glyph::Subsystem, format!("{title} ({})", subs.len()), style),
        Some(target),
        style,
    );
    if subs.is_empty() {
        return format!("{header}\n{}", color(Role::Dim, "(no subsystems found)", style));
    }
    let mut t = Table::new(["ID", "NAME", "STATE", "LEVEL", "DEPT", "OWNER", "SYSTEM"]);
    for s in subs {
        t.row([
            s.subsys_id.clone(),
            display_name(s),
            s.state.clone(),
            s.important_level.clone(),
            s.dev_dept.clone(),
            s.subsystem_owner.clone(),
            s.system_name.clone(),
        ]);
    }
    format!("{header}\n{}", t.render(style))
}

/// Prefer the localized name, falling back to the short one.
fn display_name(s: &SubSystem) -> String {
    if s.subsys_chtname.trim().is_empty() {
        s.subsys_name.clone()
    } else {
        s.subsys_chtname.clone()
    }
}

fn render_exists(id: &str, r: &SubsystemExistsResult, style: &StyleOptions) -> String {
    if !r.exists {
        return color(
            Role::Warn,
            with_glyph(Glyph::Fail, format!("Subsystem {id} does not exist"), style),
            style,
        );
    }
    let line = color(
        Role::Good,
        with_glyph(Glyph::Ok, format!("Subsystem {id} exists"), style),
        style,
    );
    let details = key_values(
        &[
            ("name", r.subsystem_name.clone()),
            ("cluster", r.cluster_name.clone()),
        ],
        style,
    );
    format!("{line}\n{details}")
}

fn render_detail(id: &str, d: &SubsystemDetailResult, style: &StyleOptions) -> String {
    let info = &d.subsystem_info;
    let mut out = vec![
        box_header(
            &with_glyph(Glyph::Subsystem, format!("Subsystem {id}"), style),
            Some(&display_name(info)),
            style,
        ),
        key_values(
            &[
                ("cluster", d.cluster_name.clone()),
                ("collected", flag(d.collected, style)),
                ("state", info.state.clone()),
                ("level", info.important_level.clone()),
                ("department", info.dev_dept.clone()),
                ("owner", info.subsystem_owner.clone()),
                ("business", info.business_owner.clone()),
                ("system", info.system_name.clone()),
                ("expected traffic", d.expected_traffic.to_string()),
                ("actual traffic", d.actual_traffic.to_string()),
                ("updated", info.subsys_updtime.clone()),
            ],
            style,
        ),
    ];

    if !d.scan_file_whitelist.is_empty() {
        out.push(String::new());
        out.push(color(Role::Title, "Scanned files", style));
        out.extend(d.scan_file_whitelist.iter().map(|f| format!("  {f}")));
    }
    if !d.keyword_filters.is_empty() {
        out.push(String::new());
        out.push(color(Role::Title, "Keyword filters", style));
        out.extend(d.keyword_filters.iter().map(|k| format!("  {k}")));
    }

    let mut t = Table::new(["HOST", "FILES"]);
    for instance in &d.instances {
        for (host, files) in instance {
            let joined = files.join(", ");
            t.row([host.clone(), truncate_ellipsis(&joined, 80)]);
        }
    }
    if !t.is_empty() {
        out.push(String::new());
        out.push(color(Role::Title, format!("Instances ({})", t.len()), style));
        out.push(t.render(style));
    }
    out.join("\n")
}
