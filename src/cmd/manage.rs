/*!
`manage.rs`

Subsystem lifecycle commands (all mutate server state):

  weapm add-subsystem --subsys-id SYS001 --cluster LOG001 --log-import-value a --log-import-files /var/log/x.log --traffic 10
  weapm move-subsystem SYS001 --target-cluster LOG002 --log-import-value a --log-import-files f --traffic 10
  weapm set-status SYS001 disable
  weapm enable-subsystem SYS001
*/

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::cmd::shared::Session;
use crate::model::{AddSubsystemRequest, AdjustClusterParams, SubsystemStatus};

fn require_id(id: &str) -> Result<&str> {
    let id = id.trim();
    if id.is_empty() {
        bail!("subsystem id must not be empty");
    }
    Ok(id)
}

/* ---- add-subsystem ---- */

#[derive(Args, Debug, Clone)]
pub struct AddSubsystemArgs {
    /// Subsystem id
    #[arg(long = "subsys-id", value_name = "ID")]
    pub id: String,

    /// Cluster that will collect the subsystem's logs
    #[arg(long, value_name = "NAME")]
    pub cluster: String,

    #[arg(long = "log-import-value", value_name = "VALUE")]
    pub log_import_value: String,

    /// Log files to import (comma separated)
    #[arg(long = "log-import-files", value_name = "FILES")]
    pub log_import_files: String,

    /// Expected traffic
    #[arg(long, default_value_t = 0)]
    pub traffic: i64,
}

impl AddSubsystemArgs {
    fn to_request(&self) -> Result<AddSubsystemRequest> {
        Ok(AddSubsystemRequest {
            sub_system_id: require_id(&self.id)?.to_string(),
            log_import_value: self.log_import_value.clone(),
            log_import_files: self.log_import_files.clone(),
            traffic: self.traffic,
            cluster: self.cluster.clone(),
        })
    }
}

pub fn execute_add_subsystem(args: AddSubsystemArgs, session: &Session) -> Result<()> {
    let req = args.to_request()?;
    let envelope = session
        .run(session.client.add_subsystem(&req))
        .with_context(|| format!("failed to add subsystem '{}'", req.sub_system_id))?;
    session.out.done(
        &envelope,
        &format!(
            "Added subsystem {} to cluster {}",
            req.sub_system_id, req.cluster
        ),
    )
}

/* ---- move-subsystem ---- */

#[derive(Args, Debug, Clone)]
pub struct MoveSubsystemArgs {
    /// Subsystem id
    #[arg(value_name = "ID")]
    pub id: String,

    /// Cluster to move the subsystem to
    #[arg(long = "target-cluster", value_name = "NAME")]
    pub target_cluster: String,

    #[arg(long = "log-import-value", value_name = "VALUE")]
    pub log_import_value: String,

    #[arg(long = "log-import-files", value_name = "FILES")]
    pub log_import_files: String,

    #[arg(long, default_value_t = 0)]
    pub traffic: i64,
}

impl MoveSubsystemArgs {
    fn params(&self) -> AdjustClusterParams {
        AdjustClusterParams {
            target_cluster_name: self.target_cluster.clone(),
            log_import_value: self.log_import_value.clone(),
            log_import_files: self.log_import_files.clone(),
            traffic: self.traffic,
        }
    }
}

pub fn execute_move_subsystem(args: MoveSubsystemArgs, session: &Session) -> Result<()> {
    let id = require_id(&args.id)?;
    let envelope = session
        .run(session.client.adjust_subsystem_cluster(id, &args.params()))
        .with_context(|| format!("failed to move subsystem '{id}'"))?;
    session.out.done(
        &envelope,
        &format!("Moved subsystem {id} to cluster {}", args.target_cluster),
    )
}

/* ---- set-status / enable-subsystem ---- */

#[derive(Args, Debug, Clone)]
pub struct SetStatusArgs {
    /// Subsystem id
    #[arg(value_name = "ID")]
    pub id: String,

    #[arg(value_enum, value_name = "STATUS")]
    pub status: SubsystemStatus,
}

pub fn execute_set_status(args: SetStatusArgs, session: &Session) -> Result<()> {
    let id = require_id(&args.id)?;
    let envelope = session
        .run(session.client.adjust_subsystem_status(id, args.status))
        .with_context(|| format!("failed to set status of subsystem '{id}'"))?;
    session
        .out
        .done(&envelope, &format!("Subsystem {id} set to {}", args.status))
}

#[derive(Args, Debug, Clone)]
pub struct EnableSubsystemArgs {
    /// Subsystem id
    #[arg(value_name = "ID")]
    pub id: String,
}

pub fn execute_enable_subsystem(args: EnableSubsystemArgs, session: &Session) -> Result<()> {
    let id = require_id(&args.id)?;
    let envelope = session
        .run(session.client.enable_subsystem(id))
        .with_context(|| format!("failed to enable subsystem '{id}'"))?;
    session
        .out
        .done(&envelope, &format!("Subsystem {id} enabled"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct AddCli {
        #[command(flatten)]
        args: AddSubsystemArgs,
    }

    #[derive(Parser, Debug)]
    struct StatusCli {
        #[command(flatten)]
        args: SetStatusArgs,
    }

    #[derive(Parser, Debug)]
    struct MoveCli {
        #[command(flatten)]
        args: MoveSubsystemArgs,
    }

    #[test]
    fn add_subsystem_request_trims_id() {
        let cli = AddCli::try_parse_from([
            "t",
            "--subsys-id",
            " SYS001 ",
            "--cluster",
            "LOG001",
            "--log-import-value",
            "v",
            "--log-import-files",
            "/var/log/app.log",
            "--traffic",
            "12",
        ])
        .unwrap();
        let req = cli.args.to_request().unwrap();
        assert_eq!(req.sub_system_id, "SYS001");
        assert_eq!(req.cluster, "LOG001");
        assert_eq!(req.traffic, 12);
    }

    #[test]
    fn blank_id_is_rejected() {
        assert!(require_id("   ").is_err());
        assert_eq!(require_id(" A ").unwrap(), "A");
    }

    #[test]
    fn status_must_be_known_value() {
        let cli = StatusCli::try_parse_from(["t", "SYS001", "disable"]).unwrap();
        assert_eq!(cli.args.status, SubsystemStatus::Disable);
        assert!(StatusCli::try_parse_from(["t", "SYS001", "paused"]).is_err());
    }

    #[test]
    fn move_defaults_traffic_to_zero() {
        let cli = MoveCli::try_parse_from([
            "t",
            "SYS001",
            "--target-cluster",
            "LOG002",
            "--log-import-value",
            "v",
            "--log-import-files",
            "f",
        ])
        .unwrap();
        let p = cli.args.params();
        assert_eq!(p.target_cluster_name, "LOG002");
        assert_eq!(p.traffic, 0);
    }
}
