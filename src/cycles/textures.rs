//! Texture block emission: image textures plus the implicit helper
//! textures the material rules lean on.

use crate::diagnostics::Diagnostics;
use crate::graph::{NodeGraph, ShaderNode, parse_str};
use crate::properties::{Definition, Properties};

use super::{GroupContext, SocketValue, socket_value};

/// Translate an image texture node.
///
/// Without an assigned image the node contributes the host editor's
/// missing-image magenta as a literal and emits nothing. With an image it
/// emits an `imagemap` block wired to the fixed UV layout the exporter
/// uses (V flipped: editor and renderer disagree on the image origin).
pub(super) fn image_map(
    node: &ShaderNode,
    output_socket: &str,
    props: &mut Properties,
    name: &str,
) -> SocketValue {
    let Some(image) = node.image.as_ref() else {
        return SocketValue::Vector([1.0, 0.0, 1.0]);
    };

    let wrap = match parse_str(&node.params, "extension") {
        Some("EXTEND") => "clamp",
        Some("CLIP") => "black",
        // REPEAT, or whatever a newer host version may add.
        _ => "repeat",
    };
    let channel = if output_socket == "Alpha" { "alpha" } else { "rgb" };
    let gamma = if image.colorspace == "sRGB" { 2.2f32 } else { 1.0f32 };

    props.define(
        Definition::texture(name, "imagemap")
            .param("file", image.filepath.as_str())
            .param("wrap", wrap)
            .param("channel", channel)
            .param("gamma", gamma)
            .param("gain", 1.0f32)
            .param("mapping.type", "uvmapping2d")
            .param("mapping.uvscale", [1.0f32, -1.0])
            .param("mapping.rotation", 0.0f32)
            .param("mapping.uvdelta", [0.0f32, 1.0]),
    );
    SocketValue::Reference(name.to_string())
}

/// Emit the `fresnelcolor` helper texture driving a metal2 material and
/// return its name, `<name>fresnel_helper`.
pub(super) fn fresnel_helper(
    graph: &NodeGraph,
    node: &ShaderNode,
    props: &mut Properties,
    name: &str,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> String {
    let color = socket_value(graph, node, "Color", props, group, diagnostics, obj_name);
    let tex_name = format!("{name}fresnel_helper");
    props.define(Definition::texture(&tex_name, "fresnelcolor").param("kr", color));
    tex_name
}

/// Convert host roughness (perceptual, squared) to the renderer's linear
/// microfacet roughness.
///
/// An unlinked scalar squares in place. A linked socket always gets an
/// implicit `power` texture named `<name>roughness_converter` with
/// exponent 2, its base embedding whatever the link resolved to.
#[allow(clippy::too_many_arguments)]
pub(super) fn squared_roughness_to_linear(
    graph: &NodeGraph,
    node: &ShaderNode,
    socket: &str,
    props: &mut Properties,
    name: &str,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let roughness = socket_value(graph, node, socket, props, group, diagnostics, obj_name);
    if graph.incoming_link(&node.id, socket).is_some() {
        let tex_name = format!("{name}roughness_converter");
        props.define(
            Definition::texture(&tex_name, "power")
                .param("base", roughness)
                .param("exponent", 2.0f32),
        );
        return SocketValue::Reference(tex_name);
    }
    match roughness {
        SocketValue::Float(v) => SocketValue::Float(v * v),
        SocketValue::Vector([x, y, z]) => SocketValue::Vector([x * x, y * y, z * z]),
        // Unresolved squares to the same literal zero it embeds as.
        SocketValue::Unresolved => SocketValue::Float(0.0),
        other => other,
    }
}
