//! Shading node graph data model, deserialized from the host editor's JSON.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A shading node graph: nodes plus the links wiring their sockets.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct NodeGraph {
    #[serde(default)]
    pub nodes: Vec<ShaderNode>,
    #[serde(default)]
    pub links: Vec<Link>,
}

/// One node of the graph.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ShaderNode {
    /// Stable identity assigned by the host editor.
    pub id: String,
    /// Host type tag, e.g. `"ShaderNodeBsdfPrincipled"`.
    #[serde(rename = "type")]
    pub node_type: String,
    /// Default values of unlinked input sockets, keyed by socket identifier.
    /// Scalars arrive as numbers, colors as RGBA arrays.
    #[serde(default)]
    pub params: HashMap<String, serde_json::Value>,
    /// Image assigned to an image-texture node, if any.
    #[serde(default)]
    pub image: Option<ImageSource>,
    /// Marks the active output node of a graph or group sub-graph.
    #[serde(default, rename = "activeOutput")]
    pub active_output: bool,
    /// Sub-graph of a group node.
    #[serde(default)]
    pub tree: Option<NodeGraph>,
}

/// A link from one node's output socket to another node's input socket.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Link {
    pub from: Endpoint,
    pub to: Endpoint,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Endpoint {
    #[serde(rename = "nodeId")]
    pub node_id: String,
    /// Socket identifier. The host uniquifies duplicate socket names with
    /// numeric suffixes, so a mix node's two shader inputs arrive as
    /// `Shader` and `Shader_001`.
    pub socket: String,
}

/// Image reference carried by an image-texture node.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ImageSource {
    pub filepath: String,
    /// Host colorspace name; `"sRGB"` selects gamma 2.2 at translation time.
    #[serde(default)]
    pub colorspace: String,
}

impl NodeGraph {
    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&ShaderNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    /// The link feeding an input socket, if any. Well-formed graphs have at
    /// most one; the first match wins.
    pub fn incoming_link(&self, node_id: &str, socket: &str) -> Option<&Link> {
        self.links
            .iter()
            .find(|l| l.to.node_id == node_id && l.to.socket == socket)
    }

    /// The active output node of the given type, falling back to the first
    /// node of that type when none carries the active flag.
    pub fn active_output(&self, node_type: &str) -> Option<&ShaderNode> {
        self.nodes
            .iter()
            .find(|n| n.node_type == node_type && n.active_output)
            .or_else(|| self.nodes.iter().find(|n| n.node_type == node_type))
    }
}

/// Read a string param from a node's defaults.
pub fn parse_str<'a>(
    params: &'a HashMap<String, serde_json::Value>,
    key: &str,
) -> Option<&'a str> {
    params.get(key).and_then(|v| v.as_str())
}

/// Load a node graph from a JSON file.
pub fn load_graph_from_path(path: impl AsRef<Path>) -> Result<NodeGraph> {
    let path = path.as_ref();
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read node graph file: {}", path.display()))?;
    load_graph_from_str(&raw).with_context(|| format!("in {}", path.display()))
}

/// Parse a node graph from JSON text.
pub fn load_graph_from_str(raw: &str) -> Result<NodeGraph> {
    let graph = serde_json::from_str(raw).context("failed to parse node graph JSON")?;
    Ok(graph)
}
