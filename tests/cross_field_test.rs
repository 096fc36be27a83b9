use std::collections::BTreeMap;

use warden::constraint::{NotEqualTo, Required};
use warden::{ApiErrorCode, Constrained, TypeDecl, ValidationRegistry, ValidatorEngine};

fn engine_for<T: Constrained>() -> ValidatorEngine {
    let registry = ValidationRegistry::new();
    registry.register::<T>().unwrap();
    ValidatorEngine::new(registry)
}

struct Transfer {
    source: Option<String>,
    target: Option<String>,
    amount: Option<i64>,
}

impl Constrained for Transfer {
    fn declare(decl: &mut TypeDecl<Self>) {
        decl.field("source", |t: &Transfer| &t.source);
        decl.field("target", |t: &Transfer| &t.target)
            .with(NotEqualTo::new("source"));
        decl.field("amount", |t: &Transfer| &t.amount)
            .with(NotEqualTo::new("source"));
    }
}

#[test]
fn test_not_equal_passes_when_dependent_absent() {
    let transfer = Transfer {
        source: None,
        target: Some("acc-1".into()),
        amount: Some(5),
    };
    assert!(engine_for::<Transfer>().validate(&transfer, []).unwrap().is_empty());
}

#[test]
fn test_not_equal_reports_equal_values() {
    let transfer = Transfer {
        source: Some("acc-1".into()),
        target: Some("acc-1".into()),
        amount: None,
    };
    let errors = engine_for::<Transfer>().validate(&transfer, []).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ApiErrorCode::InequalityViolation);
    assert_eq!(errors[0].path.to_string(), "target");
}

#[test]
fn test_not_equal_distinguishes_type_mismatch() {
    let transfer = Transfer {
        source: Some("acc-1".into()),
        target: Some("acc-2".into()),
        amount: Some(5),
    };
    let errors = engine_for::<Transfer>().validate(&transfer, []).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ApiErrorCode::DependencyTypeViolation);
    assert_eq!(errors[0].path.to_string(), "amount");
}

struct Customer {
    email: String,
    billing: Contact,
    shipping: Option<Contact>,
}

struct Contact {
    email: Option<String>,
    phone: Option<String>,
}

impl Constrained for Contact {
    fn declare(decl: &mut TypeDecl<Self>) {
        decl.field("email", |c: &Contact| &c.email)
            .with(NotEqualTo::new("$.email"));
        decl.field("phone", |c: &Contact| &c.phone)
            .rename("phoneNumber")
            .with(Required::if_dependent_null("email"));
    }
}

impl Constrained for Customer {
    fn declare(decl: &mut TypeDecl<Self>) {
        decl.field("email", |c: &Customer| &c.email);
        decl.object("billing", |c: &Customer| &c.billing);
        decl.optional_object("shipping", |c: &Customer| c.shipping.as_ref());
    }
}

struct Order {
    customer: Customer,
    gift_email: Option<String>,
}

impl Constrained for Order {
    fn declare(decl: &mut TypeDecl<Self>) {
        decl.object("customer", |o: &Order| &o.customer);
        decl.field("giftEmail", |o: &Order| &o.gift_email)
            .with(NotEqualTo::new("customer.billing.email"));
    }
}

#[test]
fn test_root_anchored_and_sibling_paths_in_nested_object() {
    let customer = Customer {
        email: "me@example.com".into(),
        billing: Contact {
            email: Some("me@example.com".into()),
            phone: None,
        },
        shipping: Some(Contact {
            email: None,
            phone: None,
        }),
    };
    let errors = engine_for::<Customer>().validate(&customer, []).unwrap();
    let found: Vec<_> = errors
        .iter()
        .map(|e| (e.path.to_string(), e.code))
        .collect();
    assert_eq!(
        found,
        vec![
            ("billing.email".to_string(), ApiErrorCode::InequalityViolation),
            (
                "shipping.phoneNumber".to_string(),
                ApiErrorCode::RequiredViolation
            ),
        ]
    );
}

#[test]
fn test_dotted_path_into_nested_object() {
    let order = Order {
        customer: Customer {
            email: "me@example.com".into(),
            billing: Contact {
                email: Some("billing@example.com".into()),
                phone: None,
            },
            shipping: None,
        },
        gift_email: Some("billing@example.com".into()),
    };
    let errors = engine_for::<Order>().validate(&order, []).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path.to_string(), "giftEmail");
    assert_eq!(errors[0].code, ApiErrorCode::InequalityViolation);
}

struct Settings {
    mode: Option<String>,
    level: Option<u8>,
}

impl Constrained for Settings {
    fn declare(decl: &mut TypeDecl<Self>) {
        decl.field("mode", |s: &Settings| &s.mode);
        decl.field("level", |s: &Settings| &s.level)
            .with(Required::if_dependent_not_null("mode"))
            .with(NotEqualTo::new("no.such.field"));
    }
}

#[test]
fn test_required_if_dependent_not_null() {
    let engine = engine_for::<Settings>();
    let needs_level = Settings {
        mode: Some("manual".into()),
        level: None,
    };
    let errors = engine.validate(&needs_level, []).unwrap();
    assert_eq!(errors[0].code, ApiErrorCode::RequiredViolation);

    let no_mode = Settings {
        mode: None,
        level: None,
    };
    assert!(engine.validate(&no_mode, []).unwrap().is_empty());
}

#[test]
fn test_unresolvable_dependent_path_is_absent_not_error() {
    let settings = Settings {
        mode: None,
        level: Some(3),
    };
    assert!(engine_for::<Settings>().validate(&settings, []).unwrap().is_empty());
}

struct Range {
    low: u64,
    high: u64,
}

impl Constrained for Range {
    fn declare(decl: &mut TypeDecl<Self>) {
        decl.field("low", |r: &Range| &r.low);
        decl.field("high", |r: &Range| &r.high)
            .with(NotEqualTo::new("low"));
    }
}

#[test]
fn test_not_equal_compares_large_unsigned_exactly() {
    let engine = engine_for::<Range>();
    let distinct = Range {
        low: u64::MAX - 1,
        high: u64::MAX,
    };
    assert!(engine.validate(&distinct, []).unwrap().is_empty());

    let same = Range {
        low: u64::MAX,
        high: u64::MAX,
    };
    let errors = engine.validate(&same, []).unwrap();
    assert_eq!(errors[0].code, ApiErrorCode::InequalityViolation);
}

struct Line {
    sku: String,
}

impl Constrained for Line {
    fn declare(decl: &mut TypeDecl<Self>) {
        decl.field("sku", |l: &Line| &l.sku);
    }
}

struct Shipment {
    items: Vec<Line>,
    featured_sku: String,
    attrs: BTreeMap<String, String>,
    accent: Option<String>,
}

impl Constrained for Shipment {
    fn declare(decl: &mut TypeDecl<Self>) {
        decl.objects("items", |s: &Shipment| s.items.as_slice());
        decl.field("featuredSku", |s: &Shipment| &s.featured_sku)
            .with(NotEqualTo::new("items[0].sku"));
        decl.field("attrs", |s: &Shipment| &s.attrs);
        decl.field("accent", |s: &Shipment| &s.accent)
            .with(NotEqualTo::new("attrs.color"));
    }
}

fn shipment(featured: &str, accent: &str) -> Shipment {
    Shipment {
        items: vec![
            Line { sku: "A-1".into() },
            Line { sku: "B-2".into() },
        ],
        featured_sku: featured.into(),
        attrs: [("color".to_string(), "red".to_string())].into_iter().collect(),
        accent: Some(accent.into()),
    }
}

#[test]
fn test_indexed_path_into_list_of_objects() {
    let engine = engine_for::<Shipment>();
    assert!(engine.validate(&shipment("B-2", "blue"), []).unwrap().is_empty());

    let errors = engine.validate(&shipment("A-1", "blue"), []).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path.to_string(), "featuredSku");
    assert_eq!(errors[0].code, ApiErrorCode::InequalityViolation);
}

#[test]
fn test_map_key_path() {
    let engine = engine_for::<Shipment>();
    let errors = engine.validate(&shipment("B-2", "red"), []).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].path.to_string(), "accent");
    assert_eq!(errors[0].code, ApiErrorCode::InequalityViolation);

    let mut missing_key = shipment("B-2", "red");
    missing_key.attrs.clear();
    assert!(engine.validate(&missing_key, []).unwrap().is_empty());
}

struct Ladder {
    rungs: BTreeMap<String, String>,
    top: String,
}

impl Constrained for Ladder {
    fn declare(decl: &mut TypeDecl<Self>) {
        decl.field("rungs", |l: &Ladder| &l.rungs);
        decl.field("top", |l: &Ladder| &l.top)
            .with(NotEqualTo::new("rungs.2"));
    }
}

#[test]
fn test_numeric_segment_matches_map_key() {
    let ladder = Ladder {
        rungs: [("2".to_string(), "oak".to_string())].into_iter().collect(),
        top: "oak".into(),
    };
    let errors = engine_for::<Ladder>().validate(&ladder, []).unwrap();
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].code, ApiErrorCode::InequalityViolation);
}
