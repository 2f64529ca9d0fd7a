//! Derive macros for bifocal optics.
//!
//! # Available Derive Macros
//!
//! - [`Selectors`]: a `Selector` per struct field
//! - [`Choices`]: a `MaybeConverter` per enum variant
//!
//! Both are re-exported by `bifocal` under its default `derive` feature.
//!
//! # Example: Selectors
//!
//! ```rust,ignore
//! use bifocal::Selectors;
//! use bifocal::optics::Params;
//!
//! #[derive(Clone, Debug, PartialEq, Selectors)]
//! struct Point {
//!     x: i32,
//!     y: i32,
//! }
//!
//! // Generated methods:
//! // - Point::x_selector() -> Selector<Point, i32>
//! // - Point::y_selector() -> Selector<Point, i32>
//!
//! let point = Point { x: 10, y: 20 };
//! assert_eq!(Point::x_selector().get(&point, &Params::EMPTY), 10);
//! ```
//!
//! # Example: Choices
//!
//! ```rust,ignore
//! use bifocal::Choices;
//! use bifocal::optics::Params;
//!
//! #[derive(Clone, Debug, PartialEq, Choices)]
//! enum Shape {
//!     Circle(f64),
//!     Rectangle(f64, f64),
//! }
//!
//! // Generated methods:
//! // - Shape::circle_choice() -> MaybeConverter<Shape, f64>
//! // - Shape::rectangle_choice() -> MaybeConverter<Shape, (f64, f64)>
//!
//! let circle = Shape::Circle(5.0);
//! assert_eq!(Shape::circle_choice().get(&circle, &Params::EMPTY), Some(5.0));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

mod choices;
mod selectors;

use proc_macro::TokenStream;

/// Derive macro generating a `Selector` for every named field.
///
/// For each field `foo` of type `T`, generates:
///
/// ```rust,ignore
/// impl StructName {
///     pub fn foo_selector() -> ::bifocal::optics::Selector<StructName, T> { ... }
/// }
/// ```
///
/// The struct and the field types must satisfy `bifocal::Data`
/// (`Clone + PartialEq + Debug + 'static`). Generic structs are supported;
/// the bound is checked per method.
///
/// # Errors
///
/// Tuple structs, unit structs, enums and unions are rejected with a
/// compile error.
#[proc_macro_derive(Selectors)]
pub fn derive_selectors(input: TokenStream) -> TokenStream {
    selectors::derive_selectors_impl(input)
}

/// Derive macro generating a `MaybeConverter` for every enum variant.
///
/// The method for variant `FooBar` is `foo_bar_choice()`. Its focus is:
///
/// - `()` for unit variants
/// - the field type for single-field variants
/// - a tuple of the field types, in declaration order, otherwise
///
/// Reading is absent when the subject holds another variant, and writing
/// through the choice only replaces a subject that already holds this one.
///
/// # Errors
///
/// Structs and unions are rejected with a compile error.
#[proc_macro_derive(Choices)]
pub fn derive_choices(input: TokenStream) -> TokenStream {
    choices::derive_choices_impl(input)
}
