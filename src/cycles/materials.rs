//! Translation rules for the supported BSDF nodes.
//!
//! Param names and their order match the renderer's material blocks. Each
//! rule emits into the caller's sink and returns a reference to the block
//! it emitted.

use crate::diagnostics::Diagnostics;
use crate::graph::{NodeGraph, ShaderNode};
use crate::properties::{Definition, Properties, PropertyValue};

use super::{BLACK_FALLBACK_NAME, GroupContext, SocketValue, black, socket_value, textures};

/// Principled BSDF to `disney`. Roughness passes through unconverted, the
/// Disney parameterization is perceptual on both ends.
pub(super) fn principled(
    graph: &NodeGraph,
    node: &ShaderNode,
    props: &mut Properties,
    name: &str,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let base_color = socket_value(graph, node, "Base Color", props, group, diagnostics, obj_name);
    let metallic = socket_value(graph, node, "Metallic", props, group, diagnostics, obj_name);
    let specular = socket_value(graph, node, "Specular", props, group, diagnostics, obj_name);
    let specular_tint = socket_value(
        graph,
        node,
        "Specular Tint",
        props,
        group,
        diagnostics,
        obj_name,
    );
    let roughness = socket_value(graph, node, "Roughness", props, group, diagnostics, obj_name);
    let anisotropic = socket_value(graph, node, "Anisotropic", props, group, diagnostics, obj_name);
    let sheen = socket_value(graph, node, "Sheen", props, group, diagnostics, obj_name);
    let sheen_tint = socket_value(graph, node, "Sheen Tint", props, group, diagnostics, obj_name);
    let clearcoat = socket_value(graph, node, "Clearcoat", props, group, diagnostics, obj_name);

    props.define(
        Definition::material(name, "disney")
            .param("basecolor", base_color)
            // TODO map the Subsurface socket once scattering distances translate.
            .param("subsurface", 0.0f32)
            .param("metallic", metallic)
            .param("specular", specular)
            .param("speculartint", specular_tint)
            .param("roughness", roughness)
            .param("anisotropic", anisotropic)
            .param("sheen", sheen)
            .param("sheentint", sheen_tint)
            .param("clearcoat", clearcoat),
    );
    SocketValue::Reference(name.to_string())
}

/// Mix shader to `mix`. The two shader inputs arrive as `Shader` and
/// `Shader_001`; a branch that resolves to nothing is replaced by the
/// shared black fallback so the mix always names two usable materials. An
/// unresolvable `Fac` mixes at 0.5.
pub(super) fn mix_shader(
    graph: &NodeGraph,
    node: &ShaderNode,
    props: &mut Properties,
    name: &str,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let amount = match socket_value(graph, node, "Fac", props, group, diagnostics, obj_name) {
        SocketValue::Unresolved => PropertyValue::Float(0.5),
        value => value.into(),
    };

    let branch = |socket: &str,
                  props: &mut Properties,
                  diagnostics: &mut Diagnostics|
     -> PropertyValue {
        match socket_value(graph, node, socket, props, group, diagnostics, obj_name) {
            SocketValue::Reference(material) => PropertyValue::Str(material),
            SocketValue::Unresolved => {
                props.merge(black(BLACK_FALLBACK_NAME));
                PropertyValue::Str(BLACK_FALLBACK_NAME.to_string())
            }
            // A literal plugged into a shader socket embeds as-is.
            value => value.into(),
        }
    };
    let material1 = branch("Shader", props, diagnostics);
    let material2 = branch("Shader_001", props, diagnostics);

    props.define(
        Definition::material(name, "mix")
            .param("material1", material1)
            .param("material2", material2)
            .param("amount", amount),
    );
    SocketValue::Reference(name.to_string())
}

/// Diffuse BSDF to `matte`.
pub(super) fn diffuse(
    graph: &NodeGraph,
    node: &ShaderNode,
    props: &mut Properties,
    name: &str,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let color = socket_value(graph, node, "Color", props, group, diagnostics, obj_name);
    props.define(Definition::material(name, "matte").param("kd", color));
    SocketValue::Reference(name.to_string())
}

/// Glossy BSDF to `metal2` driven by a fresnelcolor helper texture.
pub(super) fn glossy(
    graph: &NodeGraph,
    node: &ShaderNode,
    props: &mut Properties,
    name: &str,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let fresnel = textures::fresnel_helper(graph, node, props, name, group, diagnostics, obj_name);
    let roughness = textures::squared_roughness_to_linear(
        graph,
        node,
        "Roughness",
        props,
        name,
        group,
        diagnostics,
        obj_name,
    );

    props.define(
        Definition::material(name, "metal2")
            .param("fresnel", fresnel)
            .param("uroughness", roughness.clone())
            .param("vroughness", roughness),
    );
    SocketValue::Reference(name.to_string())
}

/// Glass BSDF to `glass`, or `roughglass` once the converted roughness is
/// anything but zero.
pub(super) fn glass(
    graph: &NodeGraph,
    node: &ShaderNode,
    props: &mut Properties,
    name: &str,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let color = socket_value(graph, node, "Color", props, group, diagnostics, obj_name);
    let roughness = textures::squared_roughness_to_linear(
        graph,
        node,
        "Roughness",
        props,
        name,
        group,
        diagnostics,
        obj_name,
    );
    let ior = socket_value(graph, node, "IOR", props, group, diagnostics, obj_name);

    let smooth = roughness == SocketValue::Float(0.0);
    // Cycles exposes a single color input; reflection and transmission
    // share it.
    let mut definition = Definition::material(name, if smooth { "glass" } else { "roughglass" })
        .param("kt", color.clone())
        .param("kr", color)
        .param("interiorior", ior);
    if !smooth {
        definition = definition
            .param("uroughness", roughness.clone())
            .param("vroughness", roughness);
    }
    props.define(definition);
    SocketValue::Reference(name.to_string())
}

/// Anisotropic BSDF to `metal2`, like glossy but with a small fixed
/// roughness on the v axis.
pub(super) fn anisotropic(
    graph: &NodeGraph,
    node: &ShaderNode,
    props: &mut Properties,
    name: &str,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let fresnel = textures::fresnel_helper(graph, node, props, name, group, diagnostics, obj_name);
    let roughness = textures::squared_roughness_to_linear(
        graph,
        node,
        "Roughness",
        props,
        name,
        group,
        diagnostics,
        obj_name,
    );

    // TODO derive vroughness from the Anisotropy and Rotation inputs.
    props.define(
        Definition::material(name, "metal2")
            .param("fresnel", fresnel)
            .param("uroughness", roughness)
            .param("vroughness", 0.05f32),
    );
    SocketValue::Reference(name.to_string())
}

/// Translucent BSDF to `mattetranslucent` with full white transmission.
pub(super) fn translucent(
    graph: &NodeGraph,
    node: &ShaderNode,
    props: &mut Properties,
    name: &str,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let color = socket_value(graph, node, "Color", props, group, diagnostics, obj_name);
    props.define(
        Definition::material(name, "mattetranslucent")
            .param("kt", [1.0f32, 1.0, 1.0])
            .param("kr", color),
    );
    SocketValue::Reference(name.to_string())
}

/// Transparent BSDF to `null`. Pure white means unfiltered transparency,
/// so the param is omitted and the material stays a plain `null`.
pub(super) fn transparent(
    graph: &NodeGraph,
    node: &ShaderNode,
    props: &mut Properties,
    name: &str,
    group: Option<GroupContext<'_>>,
    diagnostics: &mut Diagnostics,
    obj_name: &str,
) -> SocketValue {
    let color = socket_value(graph, node, "Color", props, group, diagnostics, obj_name);
    let mut definition = Definition::material(name, "null");
    if !is_white(&color) {
        definition = definition.param("transparency", color);
    }
    props.define(definition);
    SocketValue::Reference(name.to_string())
}

fn is_white(value: &SocketValue) -> bool {
    match value {
        SocketValue::Float(v) => *v == 1.0,
        SocketValue::Vector(v) => *v == [1.0, 1.0, 1.0],
        _ => false,
    }
}
