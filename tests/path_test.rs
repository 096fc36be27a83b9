use warden::{FieldPath, PathSegment};

#[test]
fn test_root_path() {
    let path = FieldPath::root();
    assert!(path.is_empty());
    assert_eq!(path.to_string(), "");
}

#[test]
fn test_composed_path_display() {
    let path = FieldPath::from_field("order")
        .push_field("lineItems")
        .push_index(0)
        .push_field("sku");
    assert_eq!(path.to_string(), "order.lineItems[0].sku");
    assert_eq!(path.len(), 4);
}

#[test]
fn test_parse_round_trips_display() {
    for raw in ["a", "a.b.c", "items[0].sku", "grid[1][2]"] {
        assert_eq!(FieldPath::parse(raw).unwrap().to_string(), raw);
    }
}

#[test]
fn test_parse_numeric_segment_as_index() {
    let path = FieldPath::parse("items.3").unwrap();
    let segments: Vec<_> = path.segments().collect();
    assert_eq!(
        segments,
        vec![&PathSegment::Field("items".into()), &PathSegment::Index(3)]
    );
}

#[test]
fn test_parse_rejects_malformed() {
    for raw in ["", ".", "a.", "a[", "a[]", "a[-1]", "a[1]b", "a]"] {
        assert!(FieldPath::parse(raw).is_none(), "{:?} should be rejected", raw);
    }
}

#[test]
fn test_path_equality_and_hash() {
    use std::collections::HashSet;

    let a = FieldPath::parse("user.email").unwrap();
    let b = FieldPath::root().push_field("user").push_field("email");
    let set: HashSet<_> = [a.clone(), b].into_iter().collect();
    assert_eq!(set.len(), 1);
    assert_ne!(a, FieldPath::from_field("user"));
}
