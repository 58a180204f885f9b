//! Host platform: task scheduling, delay and device restart.

use std::time::Duration;

use crate::selftest::{SelfTestError, APP_TAG};

/// Body of a scheduled task. It never hands a value back to the spawner.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// What the device environment provides to the boot loop.
pub trait Platform {
    /// Start `task` in its own execution context and return immediately.
    fn spawn_task(&self, name: &str, stack_size: usize, task: Task) -> Result<(), SelfTestError>;

    fn delay(&self, duration: Duration);

    /// Full reset. Control never comes back.
    fn restart(&self) -> !;
}

/// Runs the device on the host OS: tasks are threads, a restart re-executes
/// the current binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostPlatform;

impl Platform for HostPlatform {
    fn spawn_task(&self, name: &str, stack_size: usize, task: Task) -> Result<(), SelfTestError> {
        std::thread::Builder::new()
            .name(name.to_string())
            .stack_size(stack_size)
            .spawn(task)
            .map(|_| ())
            .map_err(SelfTestError::Scheduling)
    }

    fn delay(&self, duration: Duration) {
        std::thread::sleep(duration);
    }

    fn restart(&self) -> ! {
        tracing::info!(target: APP_TAG, "Restarting...");
        let err = reexec();
        tracing::error!(target: APP_TAG, "restart by re-exec failed: {}", err);
        std::process::exit(1)
    }
}

/// Replace the current process image with a fresh copy of itself. Only
/// returns on failure.
#[cfg(unix)]
fn reexec() -> std::io::Error {
    use std::os::unix::process::CommandExt;

    match std::env::current_exe() {
        Ok(exe) => std::process::Command::new(exe)
            .args(std::env::args_os().skip(1))
            .exec(),
        Err(e) => e,
    }
}

/// Without exec, start a fresh copy and let this process exit.
#[cfg(not(unix))]
fn reexec() -> std::io::Error {
    let spawned = std::env::current_exe().and_then(|exe| {
        std::process::Command::new(exe)
            .args(std::env::args_os().skip(1))
            .spawn()
    });
    match spawned {
        Ok(_) => std::process::exit(0),
        Err(e) => e,
    }
}
