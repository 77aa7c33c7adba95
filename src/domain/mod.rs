//! Domain layer: scene tree, selections, scales and aggregates
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod aggregate;
pub mod datum;
pub mod document;
pub mod error;
pub mod host;
pub mod markup;
pub mod scale;
pub mod selection;
pub mod selector;

pub use aggregate::{
    extent, max, max_element_with, max_with, min, min_element_with, min_with, Comparable,
};
pub use datum::Datum;
pub use document::{Document, DocumentIterator, DocumentNode, NodeId, NodeKind};
pub use error::{DomainError, DomainResult};
pub use host::{host_ref, HostRef, HostTree, SVG_NAMESPACE};
pub use scale::{scale_band, scale_linear, Scale, ScaleBand, ScaleLinear, MAX_TICKS};
pub use selection::{select, select_node, EnterSelection, Entry, Selection, Value};
pub use selector::Selector;
