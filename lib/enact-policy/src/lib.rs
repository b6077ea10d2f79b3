//! Evaluates a list of policy predicates against a [`Context`] and computes whether a run
//! passes the gate.
//!
//! A policy is kept as a plain callable, per the design notes: no registration DSL, no
//! trait hierarchy to implement — just a function from `&Context` to a `PolicyResult`.
//! Policies compose as a `Vec`, in the order they are registered, and that registration
//! order is the order they run and the order their results appear in a receipt.

pub mod freeze;

use enact_connector::Context;
use enact_model::PolicyResult;
use log::debug;

/// A policy predicate: `Context -> PolicyResult`. Boxed as `Arc` (not `Box`) so the same
/// policy list can be shared across concurrently running `Run` invocations without cloning
/// the closures.
pub type PolicyFn = std::sync::Arc<dyn Fn(&Context) -> PolicyResult + Send + Sync>;

/// Evaluates every policy in `policies` against `ctx`, in order, and returns one
/// `PolicyResult` per policy.
///
/// Never short-circuits: even once a policy has failed, every subsequent policy still runs,
/// because audits need full visibility into which rules fired and why. A policy that panics
/// is a programming bug in the policy itself and is allowed to propagate — the engine does
/// not catch it and convert it into a synthetic failing result, since doing so would mask a
/// misconfigured policy as a clean BLOCK.
pub fn evaluate(ctx: &Context, policies: &[PolicyFn]) -> Vec<PolicyResult> {
    let results: Vec<PolicyResult> = policies.iter().map(|policy| policy(ctx)).collect();
    debug!("evaluated {} polic{} for workflow '{}'", results.len(), if results.len() == 1 { "y" } else { "ies" }, ctx.workflow);
    results
}

/// True iff every result passed. An empty policy list trivially passes: a client with no
/// policies registered runs workflows unconditionally.
pub fn all_passed(results: &[PolicyResult]) -> bool {
    results.iter().all(|r| r.passed)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use enact_connector::Context;
    use enact_model::Payload;

    use super::*;

    fn ctx() -> Context {
        Context::new("wf", "a@x.test", Payload::new(), Default::default(), Payload::new())
    }

    #[test]
    fn runs_every_policy_even_after_a_failure() {
        let policies: Vec<PolicyFn> = vec![
            Arc::new(|_: &Context| PolicyResult::fail("first", "nope")),
            Arc::new(|_: &Context| PolicyResult::pass("second", "ok")),
            Arc::new(|_: &Context| PolicyResult::pass("third", "ok")),
        ];
        let results = evaluate(&ctx(), &policies);
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].policy, "first");
        assert_eq!(results[1].policy, "second");
        assert_eq!(results[2].policy, "third");
        assert!(!all_passed(&results));
    }

    #[test]
    fn empty_policy_list_trivially_passes() {
        assert!(all_passed(&evaluate(&ctx(), &[])));
    }

    #[test]
    fn all_passing_is_all_passed() {
        let policies: Vec<PolicyFn> = vec![Arc::new(|_: &Context| PolicyResult::pass("a", "ok")), Arc::new(|_: &Context| PolicyResult::pass("b", "ok"))];
        assert!(all_passed(&evaluate(&ctx(), &policies)));
    }
}
