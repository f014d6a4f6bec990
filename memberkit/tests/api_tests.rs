//! End-to-end tests of the lookup and execute entry points against a small
//! host-described type hierarchy.

use memberkit::prelude::*;
use once_cell::sync::Lazy;
use pretty_assertions::assert_eq;

/// ```text
/// capability-set Named
/// class Animal <: Named
/// class Dog    <: Animal
/// ```
struct Zoo {
    named: TypeRef,
    animal: TypeRef,
    dog: TypeRef,
}

static ZOO: Lazy<Zoo> = Lazy::new(|| {
    let named = TypeInfo::capability_set("Named").build();
    named.declare(Member::new("display_name", vec![], |target, _| {
        Ok(Value::Str(format!("<{}>", field(target, "name")?)))
    }));

    let animal = TypeInfo::class("Animal").implements(&named).build();
    animal.declare(Member::new("name", vec![], |target, _| field(target, "name")));
    animal.declare(Member::new("speak", vec![], |_, _| Ok(Value::from("..."))));
    animal.declare(Member::new("feed", vec![builtins::any()], |_, _| {
        Ok(Value::from("any"))
    }));
    animal.declare(Member::new("feed", vec![builtins::number()], |_, _| {
        Ok(Value::from("number"))
    }));
    animal.declare(Member::new(
        "move_to",
        vec![builtins::prim_i64(), builtins::prim_i64()],
        |_, args| Ok(Value::Tuple(args.to_vec())),
    ));
    animal.declare(Member::new("tired", vec![], |_, _| {
        Err(Fault::wrapped(Fault::raised("needs a nap")))
    }));
    animal.declare(Member::new("explode", vec![], |_, _| panic!("unexpected")));
    animal.declare(Member::new("get_id", vec![], |_, _| Ok(Value::I64(1))));
    animal.declare(Member::new("get_age", vec![], |_, _| Ok(Value::I64(3))));

    let dog = TypeInfo::class("Dog").extends(&animal).build();
    dog.declare(Member::new("speak", vec![], |_, _| Ok(Value::from("woof"))));
    dog.declare(Member::new(
        "fetch",
        vec![builtins::string(), builtins::number()],
        |_, args| Ok(Value::Str(format!("fetched {} from {}", args[0], args[1]))),
    ));

    Zoo { named, animal, dog }
});

fn field(target: &Value, name: &str) -> Result<Value, Fault> {
    target
        .as_object()
        .and_then(|o| o.field(name))
        .ok_or_else(|| Fault::raised(format!("{} has no field {}", target, name)))
}

fn rex() -> Value {
    Value::object(&ZOO.dog, [("name", Value::from("Rex"))])
}

// ==================== execute ====================

#[test]
fn test_execute_prefers_own_member_over_inherited() {
    assert_eq!(execute("speak", &rex()).unwrap(), Value::from("woof"));
    let animal = Value::object(&ZOO.animal, [("name", Value::from("Generic"))]);
    assert_eq!(execute("speak", &animal).unwrap(), Value::from("..."));
}

#[test]
fn test_execute_inherited_and_capability_set_members() {
    assert_eq!(execute("name", &rex()).unwrap(), Value::from("Rex"));
    assert_eq!(
        execute("display_name", &rex()).unwrap(),
        Value::from("<\"Rex\">")
    );
    assert!(validate_member_name("display_name", &ZOO.named).is_ok());
}

#[test]
fn test_execute_with_arg_picks_closest_overload() {
    let dog = rex();
    assert_eq!(
        execute_with_arg("feed", &dog, &Value::I64(3)).unwrap(),
        Value::from("number")
    );
    assert_eq!(
        execute_with_arg("feed", &dog, &Value::F64(0.5)).unwrap(),
        Value::from("number")
    );
    assert_eq!(
        execute_with_arg("feed", &dog, &Value::from("kibble")).unwrap(),
        Value::from("any")
    );
    // unknown argument type: every overload fits, the first declared wins
    assert_eq!(
        execute_with_arg("feed", &dog, &Value::Nothing).unwrap(),
        Value::from("any")
    );
}

#[test]
fn test_primitive_parameters_accept_boxed_arguments() {
    let moved = execute_with_args("move_to", &rex(), &[Value::I64(1), Value::I64(2)]).unwrap();
    assert_eq!(moved, Value::Tuple(vec![Value::I64(1), Value::I64(2)]));
    assert!(execute_if_present_with_args("move_to", &rex(), &[Value::I64(1), Value::from("x")])
        .unwrap()
        .is_none());
}

#[test]
fn test_execute_with_args_matches_every_position() {
    let result = execute_with_args(
        "fetch",
        &rex(),
        &[Value::from("stick"), Value::F64(2.5)],
    )
    .unwrap();
    assert_eq!(result, Value::from("fetched \"stick\" from 2.5"));
}

#[test]
fn test_execute_builtin_members() {
    let hello = Value::from("hello");
    assert_eq!(execute("length", &hello).unwrap(), Value::I64(5));
    assert_eq!(
        execute_with_arg("concat", &hello, &Value::from(" world")).unwrap(),
        Value::from("hello world")
    );
    assert_eq!(
        execute_with_arg("char_at", &hello, &Value::I64(1)).unwrap(),
        Value::Char('e')
    );
    assert_eq!(
        execute_with_arg("plus", &Value::I64(40), &Value::I64(2)).unwrap(),
        Value::I64(42)
    );
    assert_eq!(
        execute_with_arg("compare_to", &Value::I64(1), &Value::I64(2)).unwrap(),
        Value::I32(-1)
    );
    assert_eq!(
        execute("type_of", &Value::I64(1)).unwrap(),
        Value::Type(builtins::int64())
    );
}

// ==================== errors ====================

#[test]
fn test_execute_missing_member_is_an_error() {
    let err = execute_with_arg("fly", &rex(), &Value::I64(10)).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @r#"MemberError: no member matching is_equal(fly) for arguments (10) in Dog(name="Rex")"#);
    assert_eq!(execute_if_present("fly", &rex()), Ok(None));
}

#[test]
fn test_zero_argument_ambiguity() {
    let err = find(Predicate::starts_with("get_"), &ZOO.dog).unwrap_err();
    assert_eq!(
        err,
        MemberError::DuplicateCandidates {
            type_name: "Dog".to_string(),
            predicate: "starts_with(get_)".to_string(),
        }
    );
}

#[test]
fn test_execution_faults_are_wrapped() {
    let tired = execute("tired", &rex()).unwrap_err();
    assert_eq!(tired.fault(), Some(&Fault::raised("needs a nap")));
    insta::assert_snapshot!(tired.to_string(), @r#"MemberError: error while executing tired() in Dog(name="Rex"): needs a nap"#);

    let exploded = execute_if_present("explode", &rex()).unwrap_err();
    assert_eq!(
        exploded.fault(),
        Some(&Fault::Panicked("unexpected".to_string()))
    );
}

#[test]
fn test_nothing_target_is_rejected() {
    assert_eq!(
        find_for("speak", &Value::Nothing).unwrap_err(),
        MemberError::MissingArgument {
            name: "target".to_string()
        }
    );
    assert!(execute("speak", &Value::Nothing).is_err());
}

// ==================== find ====================

#[test]
fn test_find_all_returns_every_match_in_order() {
    let feeds = find_all("feed", &ZOO.dog);
    let signatures: Vec<String> = feeds.iter().map(|m| m.to_string()).collect();
    assert_eq!(signatures, vec!["Animal.feed(Any)", "Animal.feed(Number)"]);
    assert_eq!(find_all_for(Predicate::starts_with("get_"), &rex()).unwrap().len(), 2);
    assert!(find_all("nothing_like_this", &ZOO.dog).is_empty());
}

#[test]
fn test_find_by_type_and_by_instance_agree() {
    let by_type = find_with_arg("feed", &ZOO.dog, Some(&builtins::int32())).unwrap();
    let by_value = find_for_with_arg("feed", &rex(), &Value::I32(7)).unwrap();
    assert_eq!(
        by_type.map(|m| m.signature()),
        by_value.map(|m| m.signature())
    );
}

#[test]
fn test_find_with_custom_predicate() {
    let display = Predicate::from_fn("display-prefix", |m| m.name().starts_with("display"));
    let found = find(display, &ZOO.dog).unwrap();
    assert_eq!(
        found.map(|m| m.to_string()),
        Some("Named.display_name()".to_string())
    );
}

#[test]
fn test_validate_member_name() {
    assert_eq!(validate_member_name("fetch", &ZOO.dog), Ok("fetch"));
    let err = validate_member_name("fetch", &ZOO.animal).unwrap_err();
    insta::assert_snapshot!(err.to_string(), @"MemberError: Animal has no public member named fetch");
}

#[test]
fn test_invoke_resolved_member_directly() {
    let member = find_with_arg("feed", &ZOO.dog, Some(&builtins::float64()))
        .unwrap()
        .unwrap();
    assert_eq!(
        invoke(&member, &rex(), &[Value::F64(1.0)]).unwrap(),
        Value::from("number")
    );
}
