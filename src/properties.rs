//! Renderer property sink: flat `key = value` pairs grouped into named
//! material and texture definition blocks.

use std::fmt;

use indexmap::IndexMap;

/// A single property value in the renderer's property language.
#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Float(f32),
    Vec2([f32; 2]),
    Vec3([f32; 3]),
    Str(String),
}

impl From<f32> for PropertyValue {
    fn from(v: f32) -> Self {
        PropertyValue::Float(v)
    }
}

impl From<[f32; 2]> for PropertyValue {
    fn from(v: [f32; 2]) -> Self {
        PropertyValue::Vec2(v)
    }
}

impl From<[f32; 3]> for PropertyValue {
    fn from(v: [f32; 3]) -> Self {
        PropertyValue::Vec3(v)
    }
}

impl From<&str> for PropertyValue {
    fn from(v: &str) -> Self {
        PropertyValue::Str(v.to_owned())
    }
}

impl From<String> for PropertyValue {
    fn from(v: String) -> Self {
        PropertyValue::Str(v)
    }
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyValue::Float(v) => f.write_str(&fmt_float(*v)),
            PropertyValue::Vec2(v) => write!(f, "{} {}", fmt_float(v[0]), fmt_float(v[1])),
            PropertyValue::Vec3(v) => write!(
                f,
                "{} {} {}",
                fmt_float(v[0]),
                fmt_float(v[1]),
                fmt_float(v[2])
            ),
            // Bare tokens parse fine; only whitespace (or nothing) needs quoting.
            PropertyValue::Str(s) if s.is_empty() || s.contains(char::is_whitespace) => {
                write!(f, "\"{s}\"")
            }
            PropertyValue::Str(s) => f.write_str(s),
        }
    }
}

/// Format a float for property output: the shortest decimal that parses
/// back to the same value.
///
/// `2.0` becomes `"2"`, `0.3 * 0.3` becomes `"0.09"`. NaN and infinities
/// render as `"0"` so malformed inputs cannot poison the output text.
pub fn fmt_float(v: f32) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        "0".to_string()
    }
}

/// Make a string safe to use as a definition block name.
///
/// Legal names match `[A-Za-z0-9_]+`. Every run of other characters
/// collapses to `__`; an empty input yields `"_"`.
pub fn sanitize_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_run = false;
    for c in raw.chars() {
        if c.is_ascii_alphanumeric() || c == '_' {
            out.push(c);
            in_run = false;
        } else if !in_run {
            out.push_str("__");
            in_run = true;
        }
    }
    if out.is_empty() {
        out.push('_');
    }
    out
}

/// The two definition categories a conversion emits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    Material,
    Texture,
}

impl BlockKind {
    /// Property prefix the block's params live under.
    pub fn prefix(self) -> &'static str {
        match self {
            BlockKind::Material => "scene.materials.",
            BlockKind::Texture => "scene.textures.",
        }
    }
}

/// One named definition block.
///
/// Params keep insertion order and the block's `type` param always comes
/// first, so the rendered output groups the way renderer scene files do.
#[derive(Debug, Clone)]
pub struct Definition {
    kind: BlockKind,
    name: String,
    params: IndexMap<String, PropertyValue>,
}

impl Definition {
    pub fn material(name: impl Into<String>, material_type: &str) -> Self {
        Self::new(BlockKind::Material, name, material_type)
    }

    pub fn texture(name: impl Into<String>, texture_type: &str) -> Self {
        Self::new(BlockKind::Texture, name, texture_type)
    }

    fn new(kind: BlockKind, name: impl Into<String>, block_type: &str) -> Self {
        let mut params = IndexMap::new();
        params.insert("type".to_string(), PropertyValue::from(block_type));
        Definition {
            kind,
            name: name.into(),
            params,
        }
    }

    /// Append a param. Re-using a key overwrites in place.
    pub fn param(mut self, key: &str, value: impl Into<PropertyValue>) -> Self {
        self.params.insert(key.to_string(), value.into());
        self
    }
}

/// Insertion-ordered set of renderer properties.
///
/// Setting an existing key overwrites the value but keeps the key's
/// original position, which is what makes re-emitting a definition block
/// under the same name idempotent.
#[derive(Debug, Clone, Default)]
pub struct Properties {
    entries: IndexMap<String, PropertyValue>,
}

impl Properties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<PropertyValue>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Expand a definition block into `<prefix><name>.<param>` entries.
    pub fn define(&mut self, definition: Definition) {
        let base = format!("{}{}.", definition.kind.prefix(), definition.name);
        for (key, value) in definition.params {
            self.entries.insert(format!("{base}{key}"), value);
        }
    }

    /// Absorb all entries of `other`, overwriting on key collision.
    pub fn merge(&mut self, other: Properties) {
        for (key, value) in other.entries {
            self.entries.insert(key, value);
        }
    }

    pub fn get(&self, key: &str) -> Option<&PropertyValue> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Unique block names directly under a category such as
    /// `scene.materials`, in first-seen order.
    pub fn sub_names(&self, category: &str) -> Vec<String> {
        let prefix = format!("{category}.");
        let mut names: Vec<String> = Vec::new();
        for key in self.entries.keys() {
            let Some(rest) = key.strip_prefix(&prefix) else {
                continue;
            };
            let name = rest.split('.').next().unwrap_or("");
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }
}

impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (key, value) in &self.entries {
            writeln!(f, "{key} = {value}")?;
        }
        Ok(())
    }
}
