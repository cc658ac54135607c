use anyhow::Result;
use clap::{Parser, Subcommand};

use weapm::cmd::{
    self, AddNodeArgs, AddSubsystemArgs, ClustersArgs, ConnectionArgs, DashboardArgs,
    DeleteNodeArgs, EnableSubsystemArgs, MoveSubsystemArgs, Session, SetStatusArgs,
    SubsystemsArgs,
};
use weapm::utils;

/// WEAPM CLI - talk to a WEAPM-LOGSERVER instance.
///
/// Command layout:
///   weapm dashboard
///   weapm clusters [-d | --subsystems] [-n NAME]
///   weapm add-node -n NAME -a ADDR -r ROLE [...]
///   weapm delete-node --ip IP
///   weapm subsystems [-s [--subsys-id ID] [-l N] | --check ID | -d ID]
///   weapm add-subsystem --subsys-id ID --cluster NAME --log-import-value V --log-import-files F [--traffic N]
///   weapm move-subsystem ID --target-cluster NAME --log-import-value V --log-import-files F [--traffic N]
///   weapm set-status ID <enable|disable>
///   weapm enable-subsystem ID
///
/// Connection (global flags / env):
///   -c / --config PATH   WEAPM_CONFIG     YAML file (default ./config.yaml)
///   -e / --env NAME      WEAPM_ENV        environment block in the file
///   --base-url URL       WEAPM_BASE_URL   skip the file, use built-in defaults
///   --username/--password/--timeout       override whatever was loaded
///
/// Output:
///   --json          machine-readable output on stdout
///   -v / -vv        more logging on stderr
///   -q / --quiet    errors only
#[derive(Parser, Debug)]
#[command(
    name = "weapm",
    version,
    author,
    about = "WEAPM CLI - client for the WEAPM-LOGSERVER log management API",
    propagate_version = true,
    disable_help_subcommand = true
)]
pub struct Cli {
    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Silence all non-error logging
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    json: bool,

    #[command(flatten)]
    conn: ConnectionArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show the dashboard overview
    Dashboard(DashboardArgs),

    /// List clusters, or show one cluster's detail or subsystems
    Clusters(ClustersArgs),

    /// Add a node to a cluster
    AddNode(AddNodeArgs),

    /// Remove a node from its cluster
    DeleteNode(DeleteNodeArgs),

    /// List, search, check or inspect subsystems
    Subsystems(SubsystemsArgs),

    /// Register a subsystem on a cluster
    AddSubsystem(AddSubsystemArgs),

    /// Move a subsystem to another cluster
    MoveSubsystem(MoveSubsystemArgs),

    /// Enable or disable a subsystem
    SetStatus(SetStatusArgs),

    /// Enable a subsystem
    EnableSubsystem(EnableSubsystemArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = utils::derive_level(cli.verbose, cli.quiet);
    utils::init_logging(level);

    let session = Session::open(&cli.conn, cli.json)?;

    let result = match cli.command {
        Commands::Dashboard(args) => cmd::execute_dashboard(args, &session),
        Commands::Clusters(args) => cmd::execute_clusters(args, &session),
        Commands::AddNode(args) => cmd::execute_add_node(args, &session),
        Commands::DeleteNode(args) => cmd::execute_delete_node(args, &session),
        Commands::Subsystems(args) => cmd::execute_subsystems(args, &session),
        Commands::AddSubsystem(args) => cmd::execute_add_subsystem(args, &session),
        Commands::MoveSubsystem(args) => cmd::execute_move_subsystem(args, &session),
        Commands::SetStatus(args) => cmd::execute_set_status(args, &session),
        Commands::EnableSubsystem(args) => cmd::execute_enable_subsystem(args, &session),
    };
    result.map_err(cmd::with_auth_hint)
}
