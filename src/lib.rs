//! Record types with synthesized behavior.
//!
//! A [`Declaration`] lists named, typed attributes and optional hand-written
//! methods. [`define`] resolves the full field list across the base chain,
//! validates it, and produces a [`RecordType`] with a generated constructor,
//! representation, equality, ordering and hash, chosen by [`RecordOptions`].
//!
//! ```ignore
//! use spooky_records::*;
//!
//! let point = define(
//!     Declaration::new("Point").field("x", "int").field_with("y", "int", 0),
//!     RecordOptions::frozen(),
//! )?;
//! let p = RecordType::instantiate(&point, Args::positional([1]))?;
//! assert_eq!(p.repr(), "Point(x=1, y=0)");
//! ```

pub mod declaration;
pub mod error;
pub mod field;
pub mod options;
pub mod record;
pub mod repr;
pub mod snapshot;
pub mod types;
pub mod value;

pub use declaration::{ClassAttr, Declaration};
pub use error::{ConfigError, RecordError};
pub use field::{Annotation, Field, FieldDefault, FieldSpec, Metadata};
pub use options::RecordOptions;
pub use record::{
    ClassAttribute, FieldDecl, Instance, RecordBuilder, RecordType, RecordTypeRef, WeakInstance, asdict,
    asdict_with, astuple, define, fields, is_record, replace,
};
pub use types::{Args, Comparison};
pub use value::{Value, ValueMap};
