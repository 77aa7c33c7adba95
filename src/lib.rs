//! rsviz: data-driven scene graphs.
//!
//! Select nodes of a markup tree, join data to them by index, create nodes
//! for unmatched data and set attributes from the bound values. Linear and
//! band scales map data into pixel space; the chart service and the `rsviz`
//! binary put both together into SVG bar charts.
//!
//! Layers, innermost first: [`domain`] (tree, selections, scales, aggregates),
//! [`application`] (data loading, chart service), [`infrastructure`]
//! (filesystem, wiring) and [`cli`].

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod tree_traits;
pub mod util;

pub use domain::{
    host_ref, max, min, scale_band, scale_linear, select, select_node, Datum, Document,
    DomainError, Selection, Value,
};
