//! Boot loop: run the self-test once, report, wait, restart.

use std::time::Duration;

use crate::config::Config;
use crate::platform::{Platform, Task};
use crate::selftest::{run_self_test, SelfTestError, Verdict, APP_TAG};
use crate::srtp::{NativeEngine, SrtpEngine};

/// Where a boot is in its single pass. `Restart` is terminal; the only way
/// back to `Idle` is a new boot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BootState {
    Idle,
    Running,
    Reported(Verdict),
    Delaying(Verdict),
    Restart(Verdict),
}

pub struct BootLoop<'a, P, E> {
    platform: &'a P,
    engine: &'a E,
    delay: Duration,
    state: BootState,
}

impl<'a, P: Platform, E: SrtpEngine> BootLoop<'a, P, E> {
    pub fn new(platform: &'a P, engine: &'a E, delay: Duration) -> Self {
        Self {
            platform,
            engine,
            delay,
            state: BootState::Idle,
        }
    }

    #[cfg(test)]
    pub fn state(&self) -> BootState {
        self.state
    }

    /// Advance one transition. Stepping in `Restart` does nothing.
    pub fn step(&mut self) -> BootState {
        self.state = match self.state {
            BootState::Idle => BootState::Running,
            BootState::Running => BootState::Reported(run_self_test(self.engine)),
            BootState::Reported(verdict) => {
                tracing::info!(
                    target: APP_TAG,
                    "Complete.  Module will restart in {} seconds.",
                    self.delay.as_secs()
                );
                BootState::Delaying(verdict)
            }
            BootState::Delaying(verdict) => {
                self.platform.delay(self.delay);
                BootState::Restart(verdict)
            }
            BootState::Restart(verdict) => BootState::Restart(verdict),
        };
        self.state
    }

    /// Step until the restart is due and return the verdict.
    pub fn run(&mut self) -> Verdict {
        loop {
            if let BootState::Restart(verdict) = self.step() {
                return verdict;
            }
        }
    }
}

/// Body of the test task. Success or failure, it ends in a restart.
pub fn test_task<P: Platform>(platform: &P, delay: Duration) -> ! {
    let engine = NativeEngine::new();
    let verdict = BootLoop::new(platform, &engine, delay).run();
    tracing::debug!(target: APP_TAG, "restart due after {}", verdict);
    platform.restart()
}

/// Entry point: schedule the test task and return without waiting for it.
pub fn app_main<P>(platform: &P, config: &Config) -> Result<(), SelfTestError>
where
    P: Platform + Clone + Send + 'static,
{
    let task_platform = platform.clone();
    let delay = config.restart_delay();
    let task: Task = Box::new(move || {
        test_task(&task_platform, delay);
    });

    platform
        .spawn_task(&config.task_name, config.task_stack_size, task)
        .map_err(|e| {
            tracing::error!(target: APP_TAG, "task creation failed.");
            e
        })
}
