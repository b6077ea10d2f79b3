use std::env;
use std::sync::Arc;

use enact_connector::Context;
use enact_model::PolicyResult;

use crate::PolicyFn;

const ENV_VAR: &str = "ENACT_FREEZE";

/// Builds the freeze policy: on every evaluation (not just at startup — this is the one
/// documented exception to "configuration is captured once, at construction time") it
/// re-reads `ENACT_FREEZE` and fails the run if it is set to `1`, `true`, or `yes`
/// (case-insensitive).
///
/// Exists so an operator can halt every run immediately by setting an environment variable,
/// without restarting the orchestrator process. Not one of the ~26 shipped policy rules (out
/// of scope for this core); this one ships because the core's own error-handling design
/// names `ENACT_FREEZE` as an environment knob the policy layer must support.
pub fn freeze_policy() -> PolicyFn {
    Arc::new(|_ctx: &Context| {
        if is_frozen() {
            PolicyResult::fail("freeze", format!("{ENV_VAR} is set; all runs are blocked until it is cleared"))
        } else {
            PolicyResult::pass("freeze", format!("{ENV_VAR} is not set"))
        }
    })
}

fn is_frozen() -> bool {
    match env::var(ENV_VAR) {
        Ok(v) => matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"),
        Err(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use enact_model::Payload;

    use super::*;

    // ENACT_FREEZE is process-global env state; serialize the two tests that touch it.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn ctx() -> Context {
        Context::new("wf", "a@x.test", Payload::new(), Default::default(), Payload::new())
    }

    #[test]
    fn passes_when_unset() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::remove_var(ENV_VAR);
        let result = freeze_policy()(&ctx());
        assert!(result.passed);
    }

    #[test]
    fn fails_when_set() {
        let _guard = ENV_LOCK.lock().unwrap();
        env::set_var(ENV_VAR, "true");
        let result = freeze_policy()(&ctx());
        assert!(!result.passed);
        env::remove_var(ENV_VAR);
    }
}
