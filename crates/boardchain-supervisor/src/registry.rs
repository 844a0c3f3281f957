use std::collections::HashMap;

use boardchain_procmgr::DataNodeProcess;
use boardchain_types::NodeId;
use tokio::sync::Mutex;
use tracing::warn;

/// Child-process handles for data nodes this control-plane instance itself
/// spawned. A node started by a different leader (e.g. before this node won
/// an election) has no entry here; `Terminate` on such a node is a no-op,
/// per the spec's "best-effort" framing of removal.
#[derive(Default)]
pub struct ProcessRegistry {
    processes: Mutex<HashMap<NodeId, DataNodeProcess>>,
}

impl ProcessRegistry {
    pub async fn insert(&self, process: DataNodeProcess) {
        self.processes.lock().await.insert(process.descriptor().id, process);
    }

    /// Best-effort: sends SIGINT if we own the child, otherwise does nothing.
    pub async fn terminate(&self, id: NodeId) {
        if let Some(mut process) = self.processes.lock().await.remove(&id) {
            if let Err(err) = process.terminate().await {
                warn!(%id, %err, "failed to terminate data-node process");
            }
        }
    }
}
