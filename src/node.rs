//! Node maps: named, typed properties exposed by interfaces and cameras
//!
//! A [`Node`] carries availability and readability flags. Both must be checked before the value is used; [`read_string_property`] does this for every lookup so that a missing or unreadable node reads as `None` rather than an error.
//!
//! ```
//! use camenum::node::{self, Node, NodeMap};
//!
//! let mut map = NodeMap::new();
//! map.insert(Node::new(node::DEVICE_VENDOR_NAME, "Acme"));
//! map.insert(Node::new(node::DEVICE_MODEL_NAME, "X1").with_readable(false));
//!
//! assert_eq!(node::read_string_property(&map, node::DEVICE_VENDOR_NAME), Some("Acme".into()));
//! assert_eq!(node::read_string_property(&map, node::DEVICE_MODEL_NAME), None);
//! assert_eq!(node::read_string_property(&map, "DeviceSerialNumber"), None);
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

/// Interface TL node: human readable name of the interface
pub const INTERFACE_DISPLAY_NAME: &str = "InterfaceDisplayName";
/// Interface TL node: transport specific identifier
pub const INTERFACE_ID: &str = "InterfaceID";
/// Interface TL node: transport type, `U3V` or `GEV`
pub const INTERFACE_TYPE: &str = "InterfaceType";
/// Camera TL device node: vendor name
pub const DEVICE_VENDOR_NAME: &str = "DeviceVendorName";
/// Camera TL device node: model name
pub const DEVICE_MODEL_NAME: &str = "DeviceModelName";
/// Camera TL device node: serial number
pub const DEVICE_SERIAL_NUMBER: &str = "DeviceSerialNumber";
/// Camera TL device node: transport specific identifier
pub const DEVICE_ID: &str = "DeviceID";
/// Camera TL device node: transport type
pub const DEVICE_TYPE: &str = "DeviceType";
/// Camera TL device node: USB vendor ID
pub const DEVICE_VENDOR_ID: &str = "DeviceVendorID";
/// Camera TL device node: USB product ID
pub const DEVICE_PRODUCT_ID: &str = "DeviceProductID";

/// Value held by a [`Node`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeValue {
    /// Boolean node
    Boolean(bool),
    /// Integer node
    Integer(i64),
    /// Float node
    Float(f64),
    /// String node
    String(String),
}

impl fmt::Display for NodeValue {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            NodeValue::Boolean(v) => write!(f, "{}", v),
            NodeValue::Integer(v) => write!(f, "{}", v),
            NodeValue::Float(v) => write!(f, "{}", v),
            NodeValue::String(v) => write!(f, "{}", v),
        }
    }
}

impl From<&str> for NodeValue {
    fn from(s: &str) -> Self {
        NodeValue::String(s.to_string())
    }
}

impl From<String> for NodeValue {
    fn from(s: String) -> Self {
        NodeValue::String(s)
    }
}

impl From<i64> for NodeValue {
    fn from(v: i64) -> Self {
        NodeValue::Integer(v)
    }
}

impl From<bool> for NodeValue {
    fn from(v: bool) -> Self {
        NodeValue::Boolean(v)
    }
}

fn default_true() -> bool {
    true
}

/// A named property in a [`NodeMap`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Node {
    /// Node name, such as `DeviceVendorName`
    pub name: String,
    /// Value, `None` when the subsystem could not provide one
    #[serde(default)]
    pub value: Option<NodeValue>,
    /// Node exists in the current state of the device
    #[serde(default = "default_true")]
    pub available: bool,
    /// Node value can be read in the current state of the device
    #[serde(default = "default_true")]
    pub readable: bool,
}

impl Node {
    /// New available and readable node
    pub fn new<V: Into<NodeValue>>(name: &str, value: V) -> Self {
        Node {
            name: name.to_string(),
            value: Some(value.into()),
            available: true,
            readable: true,
        }
    }

    /// Node that is published but has no readable value, such as a string descriptor that could not be fetched
    pub fn unreadable(name: &str) -> Self {
        Node {
            name: name.to_string(),
            value: None,
            available: true,
            readable: false,
        }
    }

    /// Set availability
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Set readability
    pub fn with_readable(mut self, readable: bool) -> Self {
        self.readable = readable;
        self
    }

    /// Node is available
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Node is readable; a node without a value is never readable
    pub fn is_readable(&self) -> bool {
        self.readable && self.value.is_some()
    }

    /// Value as string if the node is available and readable
    pub fn to_value_string(&self) -> Option<String> {
        if self.is_available() && self.is_readable() {
            self.value.as_ref().map(|v| v.to_string())
        } else {
            None
        }
    }
}

/// Ordered collection of [`Node`]s, looked up by name
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeMap {
    nodes: Vec<Node>,
}

impl NodeMap {
    /// Empty node map
    pub fn new() -> Self {
        Default::default()
    }

    /// Insert or replace node with the same name
    pub fn insert(&mut self, node: Node) {
        match self.nodes.iter_mut().find(|n| n.name == node.name) {
            Some(existing) => *existing = node,
            None => self.nodes.push(node),
        }
    }

    /// Builder style [`NodeMap::insert`]
    pub fn with(mut self, node: Node) -> Self {
        self.insert(node);
        self
    }

    /// Look up node by name
    pub fn get_node(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }

    /// Iterate nodes in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.iter()
    }

    /// Number of nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Map has no nodes
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

impl FromIterator<Node> for NodeMap {
    fn from_iter<I: IntoIterator<Item = Node>>(iter: I) -> Self {
        let mut map = NodeMap::new();
        for node in iter {
            map.insert(node);
        }
        map
    }
}

/// Read node `name` from `node_map` as a string
///
/// Returns `None` if the node does not exist, is not available or is not readable. These are normal conditions (camera busy, firmware lacking a field) so there is no error.
pub fn read_string_property(node_map: &NodeMap, name: &str) -> Option<String> {
    let value = node_map.get_node(name).and_then(|n| n.to_value_string());
    log::trace!("Read {}: {:?}", name, value);
    value
}
