//! Composable, parameterized optics.
//!
//! An optic focuses on a part `B` of a whole `A`. What it can do with that
//! focus depends on its capability, and whether the focus is guaranteed to
//! exist depends on its risk:
//!
//! | kind             | capability | risk   | read          | write             |
//! |------------------|------------|--------|---------------|-------------------|
//! | [`Get`]          | Get        | Single | `B`           | -                 |
//! | [`MaybeGet`]     | Get        | Maybe  | `Option<B>`   | -                 |
//! | [`Selector`]     | Select     | Single | `B`           | replace focus     |
//! | [`MaybeSelector`]| Select     | Maybe  | `Option<B>`   | replace focus     |
//! | [`Converter`]    | Convert    | Single | `B`           | replace subject   |
//! | [`MaybeConverter`]| Convert   | Maybe  | `Option<B>`   | replace subject   |
//!
//! Each composite kind is built from the primitives [`Get`], [`MaybeGet`],
//! [`Set`] and [`Modify`]. Composing two optics with `compose` yields the
//! weaker capability and the riskier risk of the two; see [`Optic`].
//!
//! Every read and write takes a [`Params`] object. Optics declare the names
//! they read as [`RequiredParams`], composition unions them, and
//! `with_params` binds some of them ahead of time.
//!
//! Cross-cutting behavior attaches through [`extension`]s. [`Memoize`] and
//! [`Trace`] are provided.
//!
//! # Example
//!
//! ```
//! use bifocal::optics::{Params, Selector};
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Address { city: String }
//!
//! #[derive(Clone, Debug, PartialEq)]
//! struct Person { name: String, address: Address }
//!
//! let address = Selector::new(
//!     |person: &Person, _: &Params| person.address.clone(),
//!     |person: &Person, _: &Params, address: Address| Person { address, ..person.clone() },
//! );
//! let city = Selector::new(
//!     |address: &Address, _: &Params| address.city.clone(),
//!     |_: &Address, _: &Params, city: String| Address { city },
//! );
//! let person_city = address.compose_selector(&city);
//!
//! let person = Person {
//!     name: "Alice".to_string(),
//!     address: Address { city: "Tokyo".to_string() },
//! };
//! assert_eq!(person_city.get(&person, &Params::EMPTY), "Tokyo");
//!
//! let moved = person_city.set(&person, &Params::EMPTY, "Osaka".to_string());
//! assert_eq!(moved.address.city, "Osaka");
//! assert_eq!(moved.name, "Alice");
//! ```

mod converter;
mod discriminant;
mod error;
pub mod extension;
mod get;
mod maybe_converter;
mod maybe_get;
mod maybe_selector;
mod memoize;
mod merge;
mod modify;
mod node;
mod optic;
mod params;
mod selector;
mod set;
mod trace;
mod update;

// Re-export tags and errors
pub use discriminant::Capability;
pub use discriminant::NodeId;
pub use discriminant::NodeKind;
pub use discriminant::Risk;
pub use discriminant::Shape;
pub use error::OpticError;

// Re-export the parameter model
pub use params::Params;
pub use params::RequiredParams;

// Re-export primitives
pub use get::Get;
pub use maybe_get::MaybeGet;
pub use merge::Merge;
pub use modify::Modify;
pub use set::Set;
pub use update::Update;

// Re-export composite kinds
pub use converter::Converter;
pub use maybe_converter::MaybeConverter;
pub use maybe_selector::MaybeSelector;
pub use optic::Optic;
pub use selector::Selector;

// Re-export extensions
pub use extension::Extension;
pub use extension::ExtensionRef;
pub use extension::Extensions;
pub use memoize::Memoize;
pub use trace::Trace;

// Re-export function aliases
pub use node::ParamsFn;
pub use node::ReadFn;
pub use node::UpdateFn;
pub use node::WriteFn;
