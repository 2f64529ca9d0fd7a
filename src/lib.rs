//! # bifocal
//!
//! Composable, parameterized optics over immutable data.
//!
//! ## Overview
//!
//! An optic focuses on a part of a larger value. This crate provides six
//! kinds of optics, distinguished by what they can do with the focus
//! (read it, read and write it, or convert the whole value) and by whether
//! the focus is guaranteed to exist. Any two optics compose, and the kind
//! of the result is derived from the kinds of the operands:
//!
//! - **Primitives**: [`Get`](optics::Get), [`MaybeGet`](optics::MaybeGet),
//!   [`Set`](optics::Set), [`Modify`](optics::Modify)
//! - **Composites**: [`Selector`](optics::Selector),
//!   [`MaybeSelector`](optics::MaybeSelector), [`Converter`](optics::Converter),
//!   [`MaybeConverter`](optics::MaybeConverter)
//! - **Dispatch**: [`Optic`](optics::Optic)
//! - **Parameters**: [`Params`](optics::Params) threaded through every call
//! - **Extensions**: [`Memoize`](optics::Memoize), [`Trace`](optics::Trace),
//!   or your own [`Extension`](optics::Extension)
//! - **Accessors**: [`prop`](access::prop), [`index_by`](access::index_by),
//!   [`first`](access::first) and friends over [`Value`](value::Value)
//!
//! Writes never mutate: they return a new subject, and a write that changes
//! nothing returns the subject itself.
//!
//! ## Feature Flags
//!
//! - `derive` (default): `#[derive(Selectors)]` and `#[derive(Choices)]`
//! - `arc`: use `Arc` instead of `Rc`, making optics `Send + Sync`
//!
//! ## Example
//!
//! ```rust
//! use bifocal::prelude::*;
//!
//! let document = prop("documents").compose(index_by("id"));
//! let title = document.compose(prop("title"));
//!
//! let state = record! {
//!     "documents" => record! {
//!         "d1" => record! { "title" => "Draft" },
//!     },
//! };
//! let d1 = params! { "id" => "d1" };
//!
//! assert_eq!(title.get(&state, &d1), Some(Value::from("Draft")));
//!
//! let renamed = title.set(&state, &d1, Value::from("Final")).unwrap();
//! assert_eq!(
//!     renamed,
//!     record! { "documents" => record! { "d1" => record! { "title" => "Final" } } }
//! );
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::redundant_closure_for_method_calls)]

/// Prelude module for convenient imports.
///
/// # Usage
///
/// ```rust
/// use bifocal::prelude::*;
/// ```
pub mod prelude {
    pub use crate::access::*;
    pub use crate::optics::*;
    pub use crate::value::Value;
    pub use crate::{Data, params, record, selector};

    #[cfg(feature = "derive")]
    pub use crate::{Choices, Selectors};
}

mod shared;

pub use shared::{Data, ReferenceCounter, Shareable};

pub mod access;
pub mod optics;
pub mod value;

#[cfg(feature = "derive")]
pub use bifocal_derive::{Choices, Selectors};
