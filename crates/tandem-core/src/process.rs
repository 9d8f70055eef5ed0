use anyhow::{Context, Result};
use std::path::Path;
use std::process::{Child, Command, ExitStatus};

/// Handle to one spawned service (backend or frontend).
///
/// The launcher owns exactly one live handle per role. Termination is
/// requested at most once per handle; repeated calls are no-ops.
#[derive(Debug)]
pub struct ServiceProcess {
    name: String,
    child: Child,
    terminated: bool,
}

impl ServiceProcess {
    /// Spawn `command args...` with `dir` as its working directory.
    ///
    /// Stdio is inherited, so the child's output lands in the launcher's
    /// terminal. Fails if the directory does not exist or the command is
    /// not installed.
    pub fn spawn(name: &str, command: &str, args: &[String], dir: &Path) -> Result<Self> {
        let child = Command::new(command)
            .args(args)
            .current_dir(dir)
            .spawn()
            .with_context(|| {
                format!(
                    "failed to start {} (`{}` in {})",
                    name,
                    command,
                    dir.display()
                )
            })?;
        Ok(Self {
            name: name.to_string(),
            child,
            terminated: false,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> u32 {
        self.child.id()
    }

    /// Non-blocking exit check. `Some(status)` once the child has exited.
    pub fn try_wait(&mut self) -> Result<Option<ExitStatus>> {
        self.child
            .try_wait()
            .with_context(|| format!("failed to poll {} process", self.name))
    }

    /// Block until the child exits.
    pub fn wait(&mut self) -> Result<ExitStatus> {
        self.child
            .wait()
            .with_context(|| format!("failed to wait on {} process", self.name))
    }

    /// Request termination and reap the child.
    ///
    /// Only the first call sends the kill; later calls return immediately.
    /// A child that already exited on its own is not an error.
    pub fn terminate(&mut self) -> Result<()> {
        if self.terminated {
            return Ok(());
        }
        self.terminated = true;
        match self.child.kill() {
            Ok(()) => {
                let _ = self.child.wait();
                Ok(())
            }
            // kill() reports InvalidInput when the child has already exited
            Err(e) if e.kind() == std::io::ErrorKind::InvalidInput => Ok(()),
            Err(e) => {
                Err(e).with_context(|| format!("failed to terminate {} process", self.name))
            }
        }
    }

    /// Whether `terminate` has been called on this handle.
    pub fn terminate_requested(&self) -> bool {
        self.terminated
    }
}
