//! Tests for the derive macros.
//!
//! - `#[derive(Selectors)]`: a `{field}_selector()` per struct field
//! - `#[derive(Choices)]`: a `{variant}_choice()` per enum variant

use bifocal::optics::{Capability, Params, Risk};
use bifocal::{Choices, Selectors};
use rstest::rstest;

// =============================================================================
// Test Structures for Selectors derive
// =============================================================================

#[derive(Clone, PartialEq, Debug, Selectors)]
struct Point {
    x: i32,
    y: i32,
}

#[derive(Clone, PartialEq, Debug, Selectors)]
struct Address {
    street: String,
    city: String,
}

#[derive(Clone, PartialEq, Debug, Selectors)]
struct Customer {
    name: String,
    address: Address,
    contact: Contact,
}

#[derive(Clone, PartialEq, Debug, Selectors)]
struct Container<T> {
    value: T,
    label: String,
}

// =============================================================================
// Test Enums for Choices derive
// =============================================================================

#[derive(Clone, PartialEq, Debug, Choices)]
enum Contact {
    Unknown,
    Email(String),
    Phone(u16, u32),
    Letter { recipient: String, zip_code: String },
}

#[derive(Clone, PartialEq, Debug, Choices)]
enum Reply<T> {
    Accepted(T),
    Rejected(String),
}

fn customer() -> Customer {
    Customer {
        name: "Mina".to_string(),
        address: Address {
            street: "1 Quay".to_string(),
            city: "Porto".to_string(),
        },
        contact: Contact::Email("mina@example.com".to_string()),
    }
}

// =============================================================================
// Selectors
// =============================================================================

#[test]
fn test_selectors_get_and_set() {
    let point = Point { x: 10, y: 20 };

    assert_eq!(Point::x_selector().get(&point, &Params::EMPTY), 10);
    assert_eq!(Point::y_selector().get(&point, &Params::EMPTY), 20);
    assert_eq!(
        Point::y_selector().set(&point, &Params::EMPTY, 5),
        Point { x: 10, y: 5 }
    );
    assert_eq!(point, Point { x: 10, y: 20 });
}

#[rstest]
#[case(0, 1)]
#[case(-3, -2)]
#[case(41, 42)]
fn test_selector_modify(#[case] x: i32, #[case] expected: i32) {
    let point = Point { x, y: 0 };
    let moved = Point::x_selector().modify(&point, &Params::EMPTY, |x| x + 1);
    assert_eq!(moved, Point { x: expected, y: 0 });
}

#[test]
fn test_derived_selector_shape() {
    let shape = Point::x_selector().shape();
    assert_eq!(shape.capability, Capability::Select);
    assert_eq!(shape.risk, Risk::Single);
}

#[test]
fn test_selectors_compose() {
    let city = Customer::address_selector().compose_selector(&Address::city_selector());

    assert_eq!(city.get(&customer(), &Params::EMPTY), "Porto");
    let moved = city.set(&customer(), &Params::EMPTY, "Braga".to_string());
    assert_eq!(moved.address.city, "Braga");
    assert_eq!(moved.address.street, "1 Quay");
    assert_eq!(moved.name, "Mina");
}

#[test]
fn test_generic_struct_selectors() {
    let container = Container {
        value: 3_u8,
        label: "three".to_string(),
    };
    assert_eq!(Container::<u8>::value_selector().get(&container, &Params::EMPTY), 3);
    assert_eq!(
        Container::<u8>::label_selector()
            .modify(&container, &Params::EMPTY, |label| label.to_uppercase())
            .label,
        "THREE"
    );
}

// =============================================================================
// Choices
// =============================================================================

#[test]
fn test_single_field_choice() {
    let email = Contact::email_choice();
    let contact = Contact::Email("a@b.c".to_string());

    assert_eq!(email.get(&contact, &Params::EMPTY), Some("a@b.c".to_string()));
    assert_eq!(email.get(&Contact::Unknown, &Params::EMPTY), None);
    assert_eq!(
        email.reverse_get(&"x@y.z".to_string(), &Params::EMPTY),
        Contact::Email("x@y.z".to_string())
    );
}

#[test]
fn test_unit_variant_choice() {
    let unknown = Contact::unknown_choice();
    assert_eq!(unknown.get(&Contact::Unknown, &Params::EMPTY), Some(()));
    assert_eq!(
        unknown.get(&Contact::Email(String::new()), &Params::EMPTY),
        None
    );
    assert_eq!(unknown.reverse_get(&(), &Params::EMPTY), Contact::Unknown);
}

#[test]
fn test_tuple_variant_choice() {
    let phone = Contact::phone_choice();
    let contact = Contact::Phone(351, 912_345_678);

    assert_eq!(phone.get(&contact, &Params::EMPTY), Some((351, 912_345_678)));
    assert_eq!(
        phone.modify(&contact, &Params::EMPTY, |(code, number)| (code, number + 1)),
        Contact::Phone(351, 912_345_679)
    );
}

#[test]
fn test_struct_variant_choice_uses_declaration_order() {
    let letter = Contact::letter_choice();
    let contact = Contact::Letter {
        recipient: "Mina".to_string(),
        zip_code: "4000".to_string(),
    };

    assert_eq!(
        letter.get(&contact, &Params::EMPTY),
        Some(("Mina".to_string(), "4000".to_string()))
    );
    assert_eq!(
        letter.reverse_get(&("Rui".to_string(), "1000".to_string()), &Params::EMPTY),
        Contact::Letter {
            recipient: "Rui".to_string(),
            zip_code: "1000".to_string(),
        }
    );
}

#[test]
fn test_choice_writes_only_matching_variant() {
    let email = Contact::email_choice();

    assert_eq!(
        email.set(&Contact::Unknown, &Params::EMPTY, "new".to_string()),
        Contact::Unknown
    );
    assert_eq!(
        email.set(&Contact::Email("old".to_string()), &Params::EMPTY, "new".to_string()),
        Contact::Email("new".to_string())
    );
}

#[test]
fn test_choice_has_maybe_risk() {
    let shape = Contact::phone_choice().shape();
    assert_eq!(shape.capability, Capability::Convert);
    assert_eq!(shape.risk, Risk::Maybe);
}

#[test]
fn test_generic_enum_choices() {
    let accepted = Reply::<i64>::accepted_choice();
    assert_eq!(accepted.get(&Reply::Accepted(7), &Params::EMPTY), Some(7));
    assert_eq!(
        accepted.get(&Reply::Rejected("no".to_string()), &Params::EMPTY),
        None
    );
    assert_eq!(
        Reply::<i64>::rejected_choice().get(&Reply::Rejected("no".to_string()), &Params::EMPTY),
        Some("no".to_string())
    );
}

// =============================================================================
// Selectors and Choices together
// =============================================================================

#[test]
fn test_selector_then_choice() {
    let email = Customer::contact_selector().compose_maybe_converter(&Contact::email_choice());

    assert_eq!(
        email.get(&customer(), &Params::EMPTY),
        Some("mina@example.com".to_string())
    );
    let updated = email.modify(&customer(), &Params::EMPTY, |address| address.replace("example", "mail"));
    assert_eq!(updated.contact, Contact::Email("mina@mail.com".to_string()));

    let by_phone = Customer {
        contact: Contact::Phone(1, 2),
        ..customer()
    };
    assert_eq!(email.get(&by_phone, &Params::EMPTY), None);
    assert_eq!(
        email.modify(&by_phone, &Params::EMPTY, |address| address.to_uppercase()),
        by_phone
    );
}
