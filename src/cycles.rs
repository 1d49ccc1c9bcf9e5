//! Cycles shading node graph to renderer material conversion.
//!
//! The walk starts at the material output node and recurses through linked
//! sockets, emitting one definition block per visited node into the
//! caller's property sink. Conversion never fails: anything unresolvable
//! degrades to an opaque black fallback material and the caller still gets
//! a usable root material name back.

mod materials;
mod textures;

use crate::diagnostics::Diagnostics;
use crate::graph::{NodeGraph, ShaderNode};
use crate::properties::{Definition, Properties, PropertyValue, sanitize_name};

/// Name shared by every black fallback block emitted for a failed mix
/// branch.
pub const BLACK_FALLBACK_NAME: &str = "__BLACK__";

/// Result of resolving a socket.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SocketValue {
    /// Scalar.
    Float(f32),
    /// Color or vector, at most three components.
    Vector([f32; 3]),
    /// Name of a definition block already emitted into the sink.
    Reference(String),
    /// Nothing usable: unlinked socket without a default, unknown node
    /// type, or broken group wiring.
    Unresolved,
}

/// Unresolved values collapse to literal `0` when a param embeds them
/// anyway.
impl From<SocketValue> for PropertyValue {
    fn from(value: SocketValue) -> Self {
        match value {
            SocketValue::Float(v) => PropertyValue::Float(v),
            SocketValue::Vector(v) => PropertyValue::Vec3(v),
            SocketValue::Reference(name) => PropertyValue::Str(name),
            SocketValue::Unresolved => PropertyValue::Float(0.0),
        }
    }
}

/// The group instance whose sub-graph is being walked, with the graph that
/// owns the instance. Threaded explicitly through the recursion: entering a
/// group replaces it, a group-input node consumes it. It reaches one level
/// deep, so the input of a doubly nested group resolves against the
/// outermost context it can see.
#[derive(Clone, Copy)]
pub(crate) struct GroupContext<'a> {
    pub node: &'a ShaderNode,
    pub graph: &'a NodeGraph,
}

/// Convert a material node graph into definition blocks appended to
/// `props`, returning the root material name (always `luxcore_name`).
///
/// Never fails. A missing output node, an unlinked `Surface` socket or a
/// graph that resolves to nothing usable produces an opaque black fallback
/// material under the same name instead. `obj_name` labels warnings in
/// `diagnostics` and may be empty.
///
/// The sink only ever grows: blocks emitted for branches that later get
/// abandoned stay where they are, the renderer ignores unreferenced
/// definitions.
pub fn convert(
    graph: &NodeGraph,
    props: &mut Properties,
    luxcore_name: &str,
    obj_name: &str,
    diagnostics: &mut Diagnostics,
) -> String {
    log::debug!("converting cycles node graph into material {luxcore_name}");

    let Some(output) = graph.active_output("ShaderNodeOutputMaterial") else {
        props.merge(black(luxcore_name));
        return luxcore_name.to_string();
    };
    let Some(link) = graph.incoming_link(&output.id, "Surface") else {
        props.merge(black(luxcore_name));
        return luxcore_name.to_string();
    };
    let Some(first) = graph.node(&link.from.node_id) else {
        props.merge(black(luxcore_name));
        return luxcore_name.to_string();
    };

    let result = node_value(
        graph,
        first,
        &link.from.socket,
        props,
        Some(luxcore_name),
        None,
        diagnostics,
        obj_name,
    );

    // Only a block emitted under the requested name can head the material.
    // A literal plugged straight into Surface falls back like an
    // unresolvable graph does.
    match result {
        SocketValue::Reference(name) if name == luxcore_name => name,
        _ => {
            props.merge(black(luxcore_name));
            luxcore_name.to_string()
        }
    }
}

/// An opaque black matte material, used wherever a conversion has nothing
/// better to offer.
pub fn black(luxcore_name: &str) -> Properties {
    let mut props = Properties::new();
    props.define(Definition::material(luxcore_name, "matte").param("kd", 0.0f32));
    props
}

/// Resolve an input socket: follow its link if present, otherwise coerce
/// the node's stored default.
pub(crate) fn socket_value<'a>(
    graph: &'a NodeGraph,
    node: &'a ShaderNode,
    socket: &str,
    props: &mut Properties,
    group: Option<GroupContext<'a>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    if let Some(link) = graph.incoming_link(&node.id, socket) {
        let Some(from) = graph.node(&link.from.node_id) else {
            return SocketValue::Unresolved;
        };
        return node_value(
            graph,
            from,
            &link.from.socket,
            props,
            None,
            group,
            diagnostics,
            obj_name,
        );
    }
    match node.params.get(socket) {
        Some(value) => default_value(value),
        None => SocketValue::Unresolved,
    }
}

/// Coerce a stored socket default. Colors arrive as RGBA arrays and
/// truncate to RGB; anything unusable is `Unresolved`.
fn default_value(value: &serde_json::Value) -> SocketValue {
    use serde_json::Value;

    match value {
        Value::Number(n) => match n.as_f64() {
            Some(v) => SocketValue::Float(v as f32),
            None => SocketValue::Unresolved,
        },
        Value::Bool(b) => SocketValue::Float(if *b { 1.0 } else { 0.0 }),
        Value::Array(items) => {
            let mut parts = [0.0f32; 3];
            let mut count = 0;
            for item in items.iter().take(3) {
                let Some(v) = item.as_f64() else {
                    return SocketValue::Unresolved;
                };
                parts[count] = v as f32;
                count += 1;
            }
            match count {
                0 => SocketValue::Unresolved,
                1 => SocketValue::Float(parts[0]),
                // Two-component sockets pad with zero.
                _ => SocketValue::Vector(parts),
            }
        }
        _ => SocketValue::Unresolved,
    }
}

/// Translate one node's output socket, emitting its definition block(s)
/// into `props`.
///
/// The block name is `luxcore_name` when the caller pins one (the root
/// material, or a group forwarding its own name), otherwise it derives
/// from the node identity, the output socket and the enclosing group
/// instance. Derived names are deterministic, so a node reached twice
/// through fan-out re-emits under the same name and the sink stays free of
/// duplicates.
#[allow(clippy::too_many_arguments)]
pub(crate) fn node_value<'a>(
    graph: &'a NodeGraph,
    node: &'a ShaderNode,
    output_socket: &str,
    props: &mut Properties,
    luxcore_name: Option<&str>,
    group: Option<GroupContext<'a>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let name = match luxcore_name {
        Some(name) => name.to_string(),
        None => derive_name(node, output_socket, group),
    };

    match node.node_type.as_str() {
        "ShaderNodeBsdfPrincipled" => {
            materials::principled(graph, node, props, &name, group, diagnostics, obj_name)
        }
        "ShaderNodeMixShader" => {
            materials::mix_shader(graph, node, props, &name, group, diagnostics, obj_name)
        }
        "ShaderNodeBsdfDiffuse" => {
            materials::diffuse(graph, node, props, &name, group, diagnostics, obj_name)
        }
        "ShaderNodeBsdfGlossy" => {
            materials::glossy(graph, node, props, &name, group, diagnostics, obj_name)
        }
        "ShaderNodeTexImage" => textures::image_map(node, output_socket, props, &name),
        "ShaderNodeBsdfGlass" => {
            materials::glass(graph, node, props, &name, group, diagnostics, obj_name)
        }
        "ShaderNodeBsdfAnisotropic" => {
            materials::anisotropic(graph, node, props, &name, group, diagnostics, obj_name)
        }
        "ShaderNodeBsdfTranslucent" => {
            materials::translucent(graph, node, props, &name, group, diagnostics, obj_name)
        }
        "ShaderNodeBsdfTransparent" => {
            materials::transparent(graph, node, props, &name, group, diagnostics, obj_name)
        }
        "ShaderNodeGroup" => {
            group_value(graph, node, output_socket, props, &name, diagnostics, obj_name)
        }
        "NodeGroupInput" => {
            group_input_value(output_socket, props, group, diagnostics, obj_name)
        }
        other => {
            diagnostics.warn(
                format!("unknown node type: {other} (node {})", node.id),
                obj_name,
            );
            SocketValue::Unresolved
        }
    }
}

/// Block name for a node translated without an explicit name: node identity
/// plus output socket, plus the group instance when inside a group so two
/// instances of one group never collide.
fn derive_name(node: &ShaderNode, output_socket: &str, group: Option<GroupContext<'_>>) -> String {
    let mut raw = format!("{}{}", node.id, output_socket);
    if let Some(ctx) = group {
        raw.push_str(&ctx.node.id);
    }
    sanitize_name(&raw)
}

/// Step into a group node: translate whatever feeds the sub-graph's active
/// output, forwarding this node's block name and making the instance the
/// new group context. Any broken wiring on the way resolves to nothing.
fn group_value<'a>(
    graph: &'a NodeGraph,
    node: &'a ShaderNode,
    output_socket: &str,
    props: &mut Properties,
    name: &str,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let Some(tree) = node.tree.as_ref() else {
        return SocketValue::Unresolved;
    };
    let Some(group_output) = tree.active_output("NodeGroupOutput") else {
        return SocketValue::Unresolved;
    };
    // The group output node's input sockets mirror the instance's outputs.
    let Some(link) = tree.incoming_link(&group_output.id, output_socket) else {
        return SocketValue::Unresolved;
    };
    let Some(from) = tree.node(&link.from.node_id) else {
        return SocketValue::Unresolved;
    };
    node_value(
        tree,
        from,
        &link.from.socket,
        props,
        Some(name),
        Some(GroupContext { node, graph }),
        diagnostics,
        obj_name,
    )
}

/// A group input node hands the walk back out: the requested output socket
/// resolves as the matching input socket of the enclosing group instance,
/// against the enclosing graph, with the context cleared (one level only).
fn group_input_value(
    output_socket: &str,
    props: &mut Properties,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let Some(ctx) = group else {
        return SocketValue::Unresolved;
    };
    socket_value(
        ctx.graph,
        ctx.node,
        output_socket,
        props,
        None,
        diagnostics,
        obj_name,
    )
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use serde_json::json;

    use super::*;

    fn node(id: &str, node_type: &str) -> ShaderNode {
        ShaderNode {
            id: id.to_string(),
            node_type: node_type.to_string(),
            params: HashMap::new(),
            image: None,
            active_output: false,
            tree: None,
        }
    }

    #[test]
    fn test_default_value_coercions() {
        assert_eq!(default_value(&json!(0.5)), SocketValue::Float(0.5));
        assert_eq!(default_value(&json!(true)), SocketValue::Float(1.0));
        assert_eq!(default_value(&json!(false)), SocketValue::Float(0.0));
        assert_eq!(
            default_value(&json!([0.1, 0.2, 0.3, 1.0])),
            SocketValue::Vector([0.1, 0.2, 0.3])
        );
        assert_eq!(default_value(&json!([0.7])), SocketValue::Float(0.7));
        assert_eq!(
            default_value(&json!([0.5, 1.0])),
            SocketValue::Vector([0.5, 1.0, 0.0])
        );
        assert_eq!(default_value(&json!([])), SocketValue::Unresolved);
        assert_eq!(default_value(&json!("nope")), SocketValue::Unresolved);
        assert_eq!(default_value(&json!(null)), SocketValue::Unresolved);
        assert_eq!(default_value(&json!([0.5, "x"])), SocketValue::Unresolved);
    }

    #[test]
    fn test_unresolved_embeds_as_zero() {
        assert_eq!(
            PropertyValue::from(SocketValue::Unresolved),
            PropertyValue::Float(0.0)
        );
        assert_eq!(
            PropertyValue::from(SocketValue::Reference("tex".to_string())),
            PropertyValue::Str("tex".to_string())
        );
    }

    #[test]
    fn test_derive_name_is_deterministic_and_group_scoped() {
        let n = node("7f.1 node", "ShaderNodeBsdfDiffuse");
        assert_eq!(derive_name(&n, "BSDF", None), "7f__1__nodeBSDF");
        assert_eq!(
            derive_name(&n, "BSDF", None),
            derive_name(&n, "BSDF", None)
        );

        let graph = NodeGraph::default();
        let instance = node("grp1", "ShaderNodeGroup");
        let ctx = GroupContext {
            node: &instance,
            graph: &graph,
        };
        assert_eq!(derive_name(&n, "BSDF", Some(ctx)), "7f__1__nodeBSDFgrp1");
    }

    #[test]
    fn test_black_fallback_block() {
        let props = black("__BLACK__");
        assert_eq!(
            props.to_string(),
            "scene.materials.__BLACK__.type = matte\nscene.materials.__BLACK__.kd = 0\n"
        );
    }

    #[test]
    fn test_socket_value_prefers_link_over_default() {
        let mut diffuse = node("d1", "ShaderNodeBsdfDiffuse");
        diffuse
            .params
            .insert("Color".to_string(), json!([0.9, 0.9, 0.9, 1.0]));
        let mut image = node("i1", "ShaderNodeTexImage");
        image.params.insert("extension".to_string(), json!("REPEAT"));

        let graph: NodeGraph = serde_json::from_value(json!({
            "nodes": [],
            "links": [
                {
                    "from": { "nodeId": "i1", "socket": "Color" },
                    "to": { "nodeId": "d1", "socket": "Color" }
                }
            ]
        }))
        .unwrap();
        let mut graph = graph;
        graph.nodes.push(diffuse);
        graph.nodes.push(image);

        let mut props = Properties::new();
        let mut diagnostics = Diagnostics::new();
        let diffuse = graph.node("d1").unwrap();

        // No image assigned: the link resolves to the magenta placeholder,
        // not to the stored default.
        let value = socket_value(
            &graph,
            diffuse,
            "Color",
            &mut props,
            None,
            &mut diagnostics,
            "",
        );
        assert_eq!(value, SocketValue::Vector([1.0, 0.0, 1.0]));
    }

    #[test]
    fn test_socket_value_with_dangling_link_is_unresolved() {
        let diffuse = node("d1", "ShaderNodeBsdfDiffuse");
        let graph: NodeGraph = serde_json::from_value(json!({
            "nodes": [{ "id": "d1", "type": "ShaderNodeBsdfDiffuse" }],
            "links": [
                {
                    "from": { "nodeId": "gone", "socket": "Color" },
                    "to": { "nodeId": "d1", "socket": "Color" }
                }
            ]
        }))
        .unwrap();

        let mut props = Properties::new();
        let mut diagnostics = Diagnostics::new();
        let value = socket_value(
            &graph,
            &diffuse,
            "Color",
            &mut props,
            None,
            &mut diagnostics,
            "",
        );
        assert_eq!(value, SocketValue::Unresolved);
        assert!(props.is_empty());
    }
}
