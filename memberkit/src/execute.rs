//! Invocation of resolved members.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

use crate::error::{Fault, MemberError, MemberResult};
use crate::member::Member;
use crate::types::compatible_with_value;
use crate::value::{ensure_present, Value};

/// Invoke `member` on `target` with `args`.
///
/// The target must not be `Nothing`. Arguments are checked against the
/// parameter list first. The member runs regardless of its visibility; a
/// panic in its body is caught. A fault the body reports as
/// `InvocationTarget` is unwrapped one level. Every failure is returned as
/// `MemberError::Execution` carrying the fault.
pub fn invoke(member: &Member, target: &Value, args: &[Value]) -> MemberResult<Value> {
    ensure_present(target, "target")?;

    let fail = |cause: Fault| {
        tracing::trace!(member = %member, cause = %cause, "member execution failed");
        MemberError::Execution {
            member: member.name().to_string(),
            target: target.to_string(),
            args: render_args(args),
            cause,
        }
    };

    check_args(member, args).map_err(fail)?;

    let invoker = member.invoker();
    match panic::catch_unwind(AssertUnwindSafe(|| invoker(target, args))) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(Fault::InvocationTarget(inner))) => Err(fail(*inner)),
        Ok(Err(fault)) => Err(fail(fault)),
        Err(payload) => Err(fail(Fault::Panicked(panic_message(payload.as_ref())))),
    }
}

fn check_args(member: &Member, args: &[Value]) -> Result<(), Fault> {
    if args.len() != member.param_count() {
        return Err(Fault::illegal_argument(format!(
            "{} expects {} argument(s), got {}",
            member.signature(),
            member.param_count(),
            args.len()
        )));
    }
    for (i, (param, arg)) in member.params().iter().zip(args).enumerate() {
        if !compatible_with_value(param, arg) {
            return Err(Fault::illegal_argument(format!(
                "argument {}: expected {}, got {}",
                i + 1,
                param,
                arg.type_name()
            )));
        }
    }
    Ok(())
}

/// Arguments as shown in error messages.
pub(crate) fn render_args(args: &[Value]) -> String {
    args.iter()
        .map(|a| a.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{builtins, TypeInfo};
    use std::sync::Arc;

    fn echo() -> Member {
        Member::new("echo", vec![builtins::string()], |_, args| Ok(args[0].clone()))
    }

    #[test]
    fn test_invoke_returns_member_result() {
        let value = invoke(&echo(), &Value::I64(0), &[Value::from("hi")]).unwrap();
        assert_eq!(value, Value::from("hi"));
    }

    #[test]
    fn test_nothing_target_is_missing_argument() {
        let err = invoke(&echo(), &Value::Nothing, &[Value::from("hi")]).unwrap_err();
        assert_eq!(
            err,
            MemberError::MissingArgument {
                name: "target".to_string()
            }
        );
    }

    #[test]
    fn test_arity_and_type_mismatch_are_illegal_arguments() {
        let err = invoke(&echo(), &Value::I64(0), &[]).unwrap_err();
        assert!(matches!(err.fault(), Some(Fault::IllegalArgument(_))));
        insta::assert_snapshot!(err.to_string(), @"MemberError: error while executing echo() in 0: ArgumentError: echo(String) expects 1 argument(s), got 0");

        let err = invoke(&echo(), &Value::I64(0), &[Value::I64(5)]).unwrap_err();
        assert_eq!(
            err.fault(),
            Some(&Fault::illegal_argument("argument 1: expected String, got Int64"))
        );
    }

    #[test]
    fn test_nothing_argument_fits_any_parameter() {
        let value = invoke(&echo(), &Value::I64(0), &[Value::Nothing]).unwrap();
        assert_eq!(value, Value::Nothing);
    }

    #[test]
    fn test_raised_fault_is_wrapped() {
        let failing = Member::new("fail", vec![], |_, _| Err(Fault::raised("boom")));
        let err = invoke(&failing, &Value::from("target"), &[]).unwrap_err();
        assert_eq!(
            err,
            MemberError::Execution {
                member: "fail".to_string(),
                target: "\"target\"".to_string(),
                args: String::new(),
                cause: Fault::raised("boom"),
            }
        );
    }

    #[test]
    fn test_invocation_target_is_unwrapped_one_level() {
        let delegating = Member::new("delegate", vec![], |_, _| {
            Err(Fault::wrapped(Fault::wrapped(Fault::raised("deep"))))
        });
        let err = invoke(&delegating, &Value::I64(1), &[]).unwrap_err();
        assert_eq!(err.fault(), Some(&Fault::wrapped(Fault::raised("deep"))));
    }

    #[test]
    fn test_panic_is_captured() {
        let panicking = Member::new("explode", vec![], |_, _| panic!("kaboom"));
        let err = invoke(&panicking, &Value::I64(1), &[]).unwrap_err();
        assert_eq!(err.fault(), Some(&Fault::Panicked("kaboom".to_string())));
    }

    #[test]
    fn test_restricted_members_can_still_be_invoked() {
        let owner = TypeInfo::class("Vault").build();
        let member = owner.declare(
            Member::new("open", vec![], |_, _| Ok(Value::Bool(true))).restricted(),
        );
        let target = Value::object(&owner, [("sealed", Value::Bool(true))]);
        assert_eq!(invoke(&member, &target, &[]), Ok(Value::Bool(true)));
        assert!(Arc::strong_count(&member) >= 2);
    }
}
