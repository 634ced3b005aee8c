use spinor_params::{Complex64, ParamKey, ParamResolver, ParamValue, SymExpr, Symbol};

fn resolver(pairs: Vec<(ParamKey, ParamValue)>) -> ParamResolver {
    ParamResolver::from(pairs)
}

fn round_trip(r: &ParamResolver) -> ParamResolver {
    let encoded = serde_json::to_string(r).unwrap();
    serde_json::from_str(&encoded).unwrap()
}

#[test]
fn round_trip_primitive_values() {
    let r = resolver(vec![
        ("x".into(), 2.0.into()),
        ("z".into(), Complex64::new(1.0, -0.5).into()),
        ("alias".into(), "x".into()),
    ]);
    assert_eq!(round_trip(&r), r);
}

#[test]
fn round_trip_symbol_keys_and_expression_values() {
    let expr = SymExpr::add(vec![
        SymExpr::mul(vec![SymExpr::int(2), SymExpr::var("y")]),
        SymExpr::func("sin", vec![SymExpr::var("theta")]),
    ]);
    let r = resolver(vec![
        (Symbol::new("theta").into(), 0.25.into()),
        ("formula".into(), expr.into()),
    ]);
    let back = round_trip(&r);
    assert_eq!(back, r);

    // A decoded resolver resolves the same way as the original.
    assert_eq!(
        back.resolve("formula").unwrap(),
        r.resolve("formula").unwrap()
    );
}

#[test]
fn round_trip_preserves_entry_order() {
    let r = resolver(vec![
        ("b".into(), 1.0.into()),
        ("a".into(), 2.0.into()),
    ]);
    let back = round_trip(&r);
    let names: Vec<&str> = back.keys().map(|k| k.name()).collect();
    assert_eq!(names, ["b", "a"]);
}

#[test]
fn encoded_form_carries_type_tag_and_pair_sequence() {
    let r = resolver(vec![("x".into(), 2.0.into())]);
    let v: serde_json::Value = serde_json::to_value(&r).unwrap();
    assert_eq!(v["type"], "ParamResolver");
    assert!(v["param_dict"].is_array());
    assert_eq!(v["param_dict"].as_array().unwrap().len(), 1);
}

#[test]
fn wrong_type_tag_is_rejected() {
    let bad = r#"{"type":"SomethingElse","param_dict":[]}"#;
    assert!(serde_json::from_str::<ParamResolver>(bad).is_err());
}

#[test]
fn empty_resolver_round_trips() {
    let r = ParamResolver::empty();
    assert_eq!(round_trip(&r), r);
}
