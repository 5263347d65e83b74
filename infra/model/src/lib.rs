//! Dynamic value model used to persist and rebuild immutable values.
//!
//! # Core Pieces
//!
//! - **[`Value`] / [`Kind`]**: a closed set of runtime values with a small assignability lattice.
//! - **[`Property`]**: maps Rust field types onto values.
//! - **[`TypedRegistry`]**: multi-valued `(kind, name) -> value` store used as deserialization input.
//! - **[`ConverterRegistry`]**: bridges values whose runtime kind differs from the declared kind.
//! - **[`Contract`]**: the resolved builder protocol of a [`Model`], usually generated by
//!   [`value_model`].
//!
//! # Example
//!
//! ```rust
//! use elim_model::{value_model, Contract, Kind, ModelError, Value};
//!
//! #[value_model]
//! #[derive(Clone, PartialEq)]
//! pub struct Zone {
//!     #[model(copy, default = 8.0)]
//!     radius: f64,
//!     name: String,
//! }
//!
//! # fn main() -> Result<(), ModelError> {
//! let contract = Contract::<Zone>::resolve()?;
//! let names: Vec<_> = contract.property_names().collect();
//! assert_eq!(names, ["radius", "name"]);
//!
//! let zone = Zone::builder().name("spawn".into()).build()?;
//! assert_eq!(zone.radius(), 8.0);
//! assert_eq!(contract.binding("name").map(|b| b.read(&zone)), Some(Value::Text("spawn".into())));
//! assert_eq!(contract.binding("radius").map(|b| b.kind()), Some(Kind::Float));
//! # Ok(())
//! # }
//! ```

mod contract;
mod converter;
mod error;
mod property;
mod registry;
mod value;

pub use contract::{Binding, Contract, ContractDecl, Factory, Getter, Model, Setter, Terminator, mutator_name};
pub use converter::{Converter, ConverterRegistry, MAX_CONVERSION_STEPS, flatten_section};
pub use elim_derive::value_model;
pub use error::{ModelError, ModelErrorExt};
pub use property::Property;
pub use registry::{Entry, RegistryBuilder, TypedRegistry};
pub use value::{Kind, OptionMap, Value};
