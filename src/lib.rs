//! Convert Cycles-style shading node graphs into LuxCore-style scene
//! properties.
//!
//! A host editor hands over a material's node graph as JSON; `luxbridge`
//! walks it from the output node and flattens it into named material and
//! texture definition blocks. The entry point is [`cycles::convert`]:
//!
//! ```ignore
//! let graph = graph::load_graph_from_path("material.json")?;
//! let mut props = properties::Properties::new();
//! let mut diagnostics = diagnostics::Diagnostics::new();
//! let root = cycles::convert(&graph, &mut props, "mat_4ae31", "Cube", &mut diagnostics);
//! println!("{props}"); // scene.materials.mat_4ae31.type = ...
//! ```
//!
//! Conversion never fails: graphs that resolve to nothing usable degrade
//! to an opaque black fallback material, and unsupported node types are
//! reported through [`diagnostics::Diagnostics`] instead of aborting.

pub mod cycles;
pub mod diagnostics;
pub mod graph;
pub mod properties;
