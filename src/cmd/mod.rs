/*!
Command dispatcher module.

Each subcommand lives in its own file and exposes an `Args` struct plus
one `execute_*` function returning `anyhow::Result<()>`:

  src/cmd/
    mod.rs          (this file)
    shared.rs       ConnectionArgs, Session, Output
    format.rs       colors, tables, key/value blocks
    dashboard.rs    dashboard
    clusters.rs     clusters [-d | --subsystems] [-n NAME]
    nodes.rs        add-node, delete-node
    subsystems.rs   subsystems [-s | --check ID | -d ID]
    manage.rs       add-subsystem, move-subsystem, set-status, enable-subsystem

Commands never talk to `reqwest` directly: they go through
`Session::client` so retries, logging and error mapping stay in one place.
*/

pub mod clusters;
pub mod dashboard;
pub mod format;
pub mod manage;
pub mod nodes;
pub mod shared;
pub mod subsystems;

pub use clusters::{ClustersArgs, execute_clusters};
pub use dashboard::{DashboardArgs, execute_dashboard};
pub use manage::{
    AddSubsystemArgs, EnableSubsystemArgs, MoveSubsystemArgs, SetStatusArgs,
    execute_add_subsystem, execute_enable_subsystem, execute_move_subsystem, execute_set_status,
};
pub use nodes::{AddNodeArgs, DeleteNodeArgs, execute_add_node, execute_delete_node};
pub use shared::{ConnectionArgs, Output, Session, with_auth_hint};
pub use subsystems::{SubsystemsArgs, execute_subsystems};
