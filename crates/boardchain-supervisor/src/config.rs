use std::path::PathBuf;
use std::time::Duration;

/// Policy for one control-plane node's chain supervisor loop.
#[derive(Debug, Clone)]
pub struct SupervisorConfig {
    /// Executable spawned for every new data node.
    pub data_exec: PathBuf,
    /// Host new data nodes' addresses are derived against.
    pub host: String,
    /// Base port; a new node at spawn counter `n` listens on
    /// `base_port + 3*n`, `+1`, `+2` for control/ingress/service.
    pub base_port: u16,
    /// Desired steady-state chain length.
    pub target_node_count: usize,
    /// Interval between health-check ticks.
    pub tick_interval: Duration,
    /// Pause observed between a node's role RPC and its successor RPC, and
    /// between successive nodes' RPCs, while rewiring the chain.
    pub settle: Duration,
    /// Directory data-node children are told to write logs under.
    pub logs_dir: String,
}

impl SupervisorConfig {
    pub fn derive_addrs(&self, counter: u64) -> (String, String, String) {
        let base = self.base_port as u32 + 3 * (counter as u32 % 20_000);
        (
            format!("{}:{}", self.host, base),
            format!("{}:{}", self.host, base + 1),
            format!("{}:{}", self.host, base + 2),
        )
    }
}
