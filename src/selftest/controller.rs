//! Lifecycle controller: install, init, validate, shutdown, report.

use super::error::SelfTestError;
use super::policy::reference_policy;
use super::vectors::AES_256_REFERENCE;
use super::{log_adapter, validator, APP_TAG};
use crate::srtp::{SrtpEngine, SrtpError};

/// Overall result of one run. There is no partial credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Success,
    Failure,
}

impl Verdict {
    pub fn label(self) -> &'static str {
        match self {
            Verdict::Success => "SUCCESS",
            Verdict::Failure => "FAILURE",
        }
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn lifecycle(step: &'static str) -> impl FnOnce(SrtpError) -> SelfTestError {
    move |source| SelfTestError::Lifecycle { step, source }
}

/// Run the self-test once against `engine` and log exactly one verdict line.
pub fn run_self_test<E: SrtpEngine>(engine: &E) -> Verdict {
    let verdict = match run_pipeline(engine) {
        Ok(()) => Verdict::Success,
        Err(e) => {
            tracing::error!(target: APP_TAG, "{}", e);
            Verdict::Failure
        }
    };
    tracing::info!(target: APP_TAG, "{}", verdict);
    verdict
}

/// Validation is only reached after install and init succeed. Once init has
/// succeeded, shutdown is always attempted and its failure is only logged.
fn run_pipeline<E: SrtpEngine>(engine: &E) -> Result<(), SelfTestError> {
    engine
        .install_log_handler(Some(log_adapter::handler()))
        .map_err(lifecycle("srtp_install_log_handler"))?;
    engine.init().map_err(lifecycle("srtp_init"))?;

    let policy = reference_policy(&AES_256_REFERENCE);
    let result = validator::run(engine, &policy, &AES_256_REFERENCE);

    if let Err(e) = engine.shutdown().map_err(lifecycle("srtp_shutdown")) {
        tracing::error!(target: APP_TAG, "{}", e);
    }

    result
}
