use std::process::Stdio;
use std::time::Duration;

use tokio::process::{Child, Command};
use tokio::time::timeout;
use tracing::instrument;

use boardchain_types::NodeDescriptor;
use boardchain_wire::{ControlRequest, ControlResponse, NodeRole};

use crate::config::SpawnConfig;
use crate::error::{ProcMgrError, Result};
use crate::rpc::send_control;

/// A data-node child process plus the descriptor callers advertise for it.
///
/// `Start` returns as soon as the child is forked; the spec notes callers
/// should wait at least 500ms before issuing control RPCs, since the data
/// node needs time to bind its listeners.
pub struct DataNodeProcess {
    descriptor: NodeDescriptor,
    child: Option<Child>,
}

/// Minimum pause a caller should observe between `start` returning and the
/// first control RPC.
pub const POST_SPAWN_SETTLE: Duration = Duration::from_millis(500);

impl DataNodeProcess {
    #[instrument(skip_all, fields(node_id = %spawn.id))]
    pub fn start(spawn: SpawnConfig) -> Result<Self> {
        let child = Command::new(&spawn.exec)
            .arg("--id")
            .arg(spawn.id.get().to_string())
            .arg("--control-addr")
            .arg(&spawn.control_addr)
            .arg("--ingress-addr")
            .arg(&spawn.ingress_addr)
            .arg("--service-addr")
            .arg(&spawn.service_addr)
            .arg("--subscribe-token")
            .arg(&spawn.subscribe_token)
            .arg("--logs")
            .arg(&spawn.logs)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(false)
            .spawn()
            .map_err(|e| ProcMgrError::Spawn(e.to_string()))?;

        let descriptor = NodeDescriptor::new(
            spawn.id,
            spawn.control_addr,
            spawn.ingress_addr,
            spawn.service_addr,
            spawn.subscribe_token,
        );

        Ok(Self { descriptor, child: Some(child) })
    }

    pub fn descriptor(&self) -> &NodeDescriptor {
        &self.descriptor
    }

    /// Whether the child has not (yet) exited. Does not itself constitute a
    /// health check — use [`Self::ping`] for that.
    pub fn is_alive(&mut self) -> bool {
        match &mut self.child {
            Some(child) => matches!(child.try_wait(), Ok(None)),
            None => false,
        }
    }

    #[instrument(skip(self), fields(node_id = %self.descriptor.id))]
    pub async fn ping(&self) -> Result<()> {
        match send_control(&self.descriptor.control_addr, ControlRequest::Ping).await? {
            ControlResponse::Ok => Ok(()),
            ControlResponse::Err(msg) => Err(ProcMgrError::Rejected(msg)),
        }
    }

    #[instrument(skip(self), fields(node_id = %self.descriptor.id))]
    pub async fn switch_role(&self, role: NodeRole) -> Result<()> {
        match send_control(&self.descriptor.control_addr, ControlRequest::SwitchRole(role)).await? {
            ControlResponse::Ok => Ok(()),
            ControlResponse::Err(msg) => Err(ProcMgrError::Rejected(msg)),
        }
    }

    /// Switches this node's successor. An empty `address` disconnects the
    /// current successor.
    #[instrument(skip(self), fields(node_id = %self.descriptor.id))]
    pub async fn switch_successor(&self, address: &str) -> Result<()> {
        match send_control(
            &self.descriptor.control_addr,
            ControlRequest::SwitchSuccessor { address: address.to_string() },
        )
        .await?
        {
            ControlResponse::Ok => Ok(()),
            ControlResponse::Err(msg) => Err(ProcMgrError::Rejected(msg)),
        }
    }

    /// Sends SIGINT and waits up to 5 seconds for a clean exit before
    /// giving up (the child is left to the OS at that point; supervision
    /// loops treat a still-running process as a liveness-check failure on
    /// the next tick).
    #[instrument(skip(self), fields(node_id = %self.descriptor.id))]
    pub async fn terminate(&mut self) -> Result<()> {
        let Some(child) = &self.child else { return Ok(()) };
        if let Some(pid) = child.id() {
            // SAFETY: `pid` is a valid process id obtained from the child
            // handle we still own; sending SIGINT does not touch memory.
            #[allow(unsafe_code)]
            unsafe {
                libc::kill(pid as libc::pid_t, libc::SIGINT);
            }
        }
        if let Some(mut child) = self.child.take() {
            let _ = timeout(Duration::from_secs(5), child.wait()).await;
        }
        Ok(())
    }
}
