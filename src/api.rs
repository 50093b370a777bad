//! Class API documents.
//!
//! Each `<ClassName>.json` file produced by the qooxdoo API generator is a
//! tree of nodes of the shape
//!
//! ```json
//! { "type": "methods-static", "attributes": { "name": "..." }, "children": [ ... ] }
//! ```
//!
//! The documents are schema-flexible (the generator emits many node types
//! we never look at), so they are kept as a generic tree with a string tag.
//! [`NodeKind`] names the four tags completion cares about; everything else
//! is [`NodeKind::Other`].
use serde::Deserialize;
use serde_json::{Map, Value};

/// The node tags the completion logic recognises.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `methods-static`: container of the class's static methods.
    MethodsStatic,
    /// `constructor`: container holding the constructor `method` node.
    Constructor,
    /// `method`: a single method; its parameters live under `params`.
    Method,
    /// `params`: container of parameter nodes, each with a `name` attribute.
    Params,
    /// Any other tag, or no tag at all.
    Other,
}

impl NodeKind {
    pub fn from_tag(tag: &str) -> Self {
        match tag {
            "methods-static" => NodeKind::MethodsStatic,
            "constructor" => NodeKind::Constructor,
            "method" => NodeKind::Method,
            "params" => NodeKind::Params,
            _ => NodeKind::Other,
        }
    }
}

/// One node of a parsed class document.
///
/// The root of a class document is an `ApiNode` as well.  An empty
/// document (`ApiNode::default()`) has no children and therefore no
/// static methods and no constructor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ApiNode {
    #[serde(rename = "type", default)]
    pub node_type: Option<String>,
    #[serde(default)]
    pub attributes: Map<String, Value>,
    #[serde(default)]
    pub children: Vec<ApiNode>,
}

/// A static method as offered for completion: its name and the names of
/// its parameters in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticMethod {
    pub name: String,
    pub params: Vec<String>,
}

impl ApiNode {
    pub fn kind(&self) -> NodeKind {
        self.node_type
            .as_deref()
            .map(NodeKind::from_tag)
            .unwrap_or(NodeKind::Other)
    }

    /// The `name` attribute, if present and a string.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }

    /// `true` when the document has no children at all (missing or
    /// unparseable class file).
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Direct children carrying the given tag, in document order.
    pub fn children_of_kind(&self, kind: NodeKind) -> impl Iterator<Item = &ApiNode> {
        self.children.iter().filter(move |c| c.kind() == kind)
    }

    /// Enumerate the static methods of a class document.
    ///
    /// Walks every `methods-static` child of the root and collects each
    /// method's name and parameter names.  Methods whose name starts with
    /// `__` are internal and never offered.  Method nodes without a name
    /// attribute are skipped.
    pub fn static_methods(&self) -> Vec<StaticMethod> {
        let mut statics = Vec::new();
        for group in self.children_of_kind(NodeKind::MethodsStatic) {
            for method in &group.children {
                let Some(name) = method.name() else {
                    continue;
                };
                if name.starts_with("__") {
                    continue;
                }
                statics.push(StaticMethod {
                    name: name.to_string(),
                    params: method.method_params(),
                });
            }
        }
        statics
    }

    /// The constructor's `method` node: the first `method` child of the
    /// first `constructor` child of the root.
    pub fn constructor(&self) -> Option<&ApiNode> {
        self.children_of_kind(NodeKind::Constructor)
            .next()?
            .children_of_kind(NodeKind::Method)
            .next()
    }

    /// Parameter names of a method node, in document order.
    ///
    /// Parameter nodes lacking a `name` attribute are skipped.
    pub fn method_params(&self) -> Vec<String> {
        self.children_of_kind(NodeKind::Params)
            .flat_map(|params| params.children.iter())
            .filter_map(|param| param.name())
            .map(str::to_string)
            .collect()
    }
}
