//! # radiocfg
//!
//! Schema-driven bit-level codec between packed radio transmitter
//! structures and an ordered `key: value` text form rendered as YAML.
//!
//! A schema is a static tree of [`schema::Node`]s whose widths concatenate to
//! the packed structure. [`compiled::Layout`] validates a tree against its
//! declared size and flattens it to dotted paths; [`walker`] converts in both
//! directions. The current radio and model layouts live in [`radio`], and the
//! compact grammars for sources, switches and gvar weights in [`refs`].
//!
//! ## Example
//!
//! ```
//! use radiocfg::compiled::Layout;
//! use radiocfg::schema::Node;
//! use radiocfg::text::{self, Entry};
//! use radiocfg::walker;
//!
//! static NODES: [Node; 3] = [
//!     Node::uint("version", 8),
//!     Node::int("trim", 8),
//!     Node::text("name", 4),
//! ];
//!
//! let layout = Layout::compile("demo", &NODES, 6).unwrap();
//! let entries = vec![Entry::scalar("trim", "-3"), Entry::scalar("name", "Cub")];
//! let encoded = walker::encode(&layout, &entries).unwrap();
//! assert!(encoded.issues.is_empty());
//! assert_eq!(encoded.bytes, [0, 0xFD, b'C', b'u', b'b', 0]);
//!
//! let decoded = walker::decode(&layout, &encoded.bytes).unwrap();
//! assert_eq!(text::render(&decoded).unwrap(), "version: 0\ntrim: -3\nname: Cub\n");
//! ```

pub mod bits;
pub mod compiled;
pub mod cursor;
pub mod enums;
pub mod errors;
pub mod radio;
pub mod refs;
pub mod schema;
pub mod text;
pub mod transform;
pub mod walker;
