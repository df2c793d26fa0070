use provis_domain::{Capability, Provided, ScopeId};

#[derive(Debug, Clone, PartialEq)]
struct Level(u8);

#[test]
fn equal_values_compare_equal_across_allocations() {
    assert_eq!(Provided::new(Level(3)), Provided::new(Level(3)));
    assert_ne!(Provided::new(Level(3)), Provided::new(Level(4)));
}

#[test]
fn different_types_never_compare_equal() {
    assert_ne!(Provided::new(3_u8), Provided::new(Level(3)));
}

#[test]
fn debug_output_is_the_concrete_type() {
    assert_eq!(format!("{:?}", Provided::new(Level(7))), "Level(7)");
}

#[test]
fn instance_downcasts_to_the_concrete_type() {
    let provided = Provided::new(Level(9));
    assert_eq!(provided.downcast_ref::<Level>(), Some(&Level(9)));

    let instance = provided.instance().downcast::<Level>().expect("same type");
    assert_eq!(*instance, Level(9));
}

#[test]
fn capability_serializes_as_plain_name() {
    let cap = Capability::new("logger.formatter");
    assert_eq!(serde_json::to_string(&cap).unwrap(), "\"logger.formatter\"");

    let back: Capability = serde_json::from_str("\"logger.formatter\"").unwrap();
    assert_eq!(back, cap);
    assert_eq!(Capability::owned(String::from("logger.formatter")), cap);
}

#[test]
fn root_scope_is_index_zero() {
    assert!(ScopeId::ROOT.is_root());
    assert!(!ScopeId::new(2).is_root());
    assert_eq!(ScopeId::new(2).to_string(), "scope#2");
}
