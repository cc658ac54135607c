/*!
`nodes.rs`

Cluster node membership:

  weapm add-node -n LOG008 --address 127.0.0.2 --role write
  weapm delete-node --ip 127.0.0.2
*/

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::cmd::shared::Session;
use crate::model::AddClusterNodeRequest;

#[derive(Args, Debug, Clone)]
pub struct AddNodeArgs {
    /// Cluster to add the node to
    #[arg(short = 'n', long = "cluster-name", value_name = "NAME")]
    pub cluster_name: String,

    /// Node address (IP or host)
    #[arg(short = 'a', long, value_name = "ADDR")]
    pub address: String,

    /// Node role, e.g. write or read
    #[arg(short = 'r', long)]
    pub role: String,

    #[arg(long = "cpu-limit", alias = "cpulimit", value_name = "CPU")]
    pub cpu_limit: Option<String>,

    #[arg(long = "mem-limit", alias = "memlimit", value_name = "MEM")]
    pub mem_limit: Option<String>,

    #[arg(long)]
    pub topic: Option<String>,

    #[arg(long = "bucket-names", alias = "bucketnames", value_name = "NAMES")]
    pub bucket_names: Option<String>,

    #[arg(long = "backend-domain", alias = "backenddomain", value_name = "DOMAIN")]
    pub backend_domain: Option<String>,

    #[arg(long = "storage-domain", alias = "storagedomain", value_name = "DOMAIN")]
    pub storage_domain: Option<String>,

    /// Mark the node as the cluster default
    #[arg(long = "default")]
    pub is_default: bool,

    #[arg(long)]
    pub status: Option<String>,
}

impl AddNodeArgs {
    fn to_request(&self) -> AddClusterNodeRequest {
        let mut req = AddClusterNodeRequest::new(self.address.trim(), self.role.trim());
        req.cluster_name = self.cluster_name.clone();
        req.cpu_limit = self.cpu_limit.clone();
        req.mem_limit = self.mem_limit.clone();
        req.topic = self.topic.clone();
        req.bucket_names = self.bucket_names.clone();
        req.backend_domain = self.backend_domain.clone();
        req.storage_domain = self.storage_domain.clone();
        req.is_default = self.is_default.then_some(true);
        req.status = self.status.clone();
        req
    }
}

pub fn execute_add_node(args: AddNodeArgs, session: &Session) -> Result<()> {
    if args.address.trim().is_empty() || args.role.trim().is_empty() {
        bail!("--address and --role must not be empty");
    }
    let req = args.to_request();
    let envelope = session
        .run(session.client.add_cluster_node(&args.cluster_name, &req))
        .with_context(|| {
            format!(
                "failed to add node {} to cluster '{}'",
                req.address, args.cluster_name
            )
        })?;
    session.out.done(
        &envelope,
        &format!(
            "Added {} node {} to cluster {}",
            req.role, req.address, args.cluster_name
        ),
    )
}

#[derive(Args, Debug, Clone)]
pub struct DeleteNodeArgs {
    /// Address of the node to remove
    #[arg(long, value_name = "IP")]
    pub ip: String,
}

pub fn execute_delete_node(args: DeleteNodeArgs, session: &Session) -> Result<()> {
    let ip = args.ip.trim();
    if ip.is_empty() {
        bail!("--ip must not be empty");
    }
    let envelope = session
        .run(session.client.delete_cluster_node(ip))
        .with_context(|| format!("failed to delete node {ip}"))?;
    session.out.done(&envelope, &format!("Deleted node {ip}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct AddCli {
        #[command(flatten)]
        args: AddNodeArgs,
    }

    #[derive(Parser, Debug)]
    struct DeleteCli {
        #[command(flatten)]
        args: DeleteNodeArgs,
    }

    #[test]
    fn add_node_requires_core_fields() {
        assert!(AddCli::try_parse_from(["t", "-n", "LOG008", "-a", "127.0.0.2"]).is_err());
    }

    #[test]
    fn add_node_builds_request() {
        let cli = AddCli::try_parse_from([
            "t", "-n", "LOG008", "-a", " 127.0.0.2 ", "-r", "write", "--cpulimit", "4",
            "--default",
        ])
        .unwrap();
        let req = cli.args.to_request();
        assert_eq!(req.address, "127.0.0.2");
        assert_eq!(req.cluster_name, "LOG008");
        assert_eq!(req.cpu_limit.as_deref(), Some("4"));
        assert_eq!(req.is_default, Some(true));
        assert!(req.mem_limit.is_none());
    }

    #[test]
    fn unset_default_flag_is_omitted() {
        let cli = AddCli::try_parse_from(["t", "-n", "X", "-a", "h", "-r", "read"]).unwrap();
        assert_eq!(cli.args.to_request().is_default, None);
    }

    #[test]
    fn delete_node_takes_ip_flag() {
        let cli = DeleteCli::try_parse_from(["t", "--ip", "127.0.0.2"]).unwrap();
        assert_eq!(cli.args.ip, "127.0.0.2");
        assert!(DeleteCli::try_parse_from(["t"]).is_err());
    }
}
