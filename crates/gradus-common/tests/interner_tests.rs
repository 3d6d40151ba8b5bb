use super::*;

#[test]
fn test_intern_same_text_shares_allocation() {
    let interner = Interner::new();
    let a = interner.intern("::String");
    let b = interner.intern("::String");

    assert_eq!(a, b);
    assert!(Arc::ptr_eq(&a.0, &b.0));
    assert_eq!(interner.len(), 1);
}

#[test]
fn test_distinct_text_distinct_atoms() {
    let interner = Interner::new();
    let a = interner.intern("to_str");
    let b = interner.intern("to_int");

    assert_ne!(a, b);
    assert_eq!(interner.len(), 2);
}

#[test]
fn test_atom_compares_with_str() {
    let atom = Atom::new("foo");
    assert_eq!(atom, "foo");
    assert_eq!(atom.as_str(), "foo");
    assert_eq!(atom.to_string(), "foo");
}
