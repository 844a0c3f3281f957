use std::path::PathBuf;

use boardchain_types::NodeId;

/// Everything needed to spawn one data-node child process. Mirrors the
/// data-node CLI surface: `--id`, `--control-addr`, `--ingress-addr`,
/// `--service-addr`, `--logs`.
#[derive(Debug, Clone)]
pub struct SpawnConfig {
    pub id: NodeId,
    pub exec: PathBuf,
    pub control_addr: String,
    pub ingress_addr: String,
    pub service_addr: String,
    pub subscribe_token: String,
    pub logs: String,
}
