use boardchain_types::NodeId;

/// Mirrors the data-node CLI surface: `--id`, `--control-addr`,
/// `--ingress-addr`, `--service-addr`, `--subscribe-token`, `--logs`.
#[derive(Debug, Clone)]
pub struct NodeConfig {
    pub id: NodeId,
    pub control_addr: String,
    pub ingress_addr: String,
    pub service_addr: String,
    /// Checked against `BoardRequest::Subscribe` callers on the
    /// service-addr listener; assigned by the supervisor at spawn time.
    pub subscribe_token: String,
    pub logs: String,
}
