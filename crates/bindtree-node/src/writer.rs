//! Streaming event sink for generic trees.

use std::sync::Arc;

use bindtree_schema::QName;

use crate::{AugmentationIdentifier, GenericNode, NodeIdentifierWithPredicates, Scalar, TreeError};

/// Receives "enter node / leaf value / exit node" events.
///
/// Every `start_*` call is balanced by one [`end_node`](Self::end_node).
pub trait NodeStreamWriter {
    fn start_container(&mut self, name: QName) -> Result<(), TreeError>;
    fn start_choice(&mut self, name: QName) -> Result<(), TreeError>;
    fn start_augmentation(&mut self, id: AugmentationIdentifier) -> Result<(), TreeError>;
    fn start_map(&mut self, name: QName, ordered: bool) -> Result<(), TreeError>;
    fn start_map_entry(&mut self, id: NodeIdentifierWithPredicates) -> Result<(), TreeError>;
    fn start_unkeyed_list(&mut self, name: QName) -> Result<(), TreeError>;
    /// Starts an entry of the currently open unkeyed list.
    fn start_unkeyed_list_item(&mut self) -> Result<(), TreeError>;
    fn start_leaf_set(&mut self, name: QName, ordered: bool) -> Result<(), TreeError>;
    /// Adds one value to the currently open leaf set.
    fn leaf_set_entry(&mut self, value: Scalar) -> Result<(), TreeError>;
    fn leaf(&mut self, name: QName, value: Scalar) -> Result<(), TreeError>;
    /// Splices an already-built node in place of its events.
    fn add_child(&mut self, node: Arc<GenericNode>) -> Result<(), TreeError>;
    fn end_node(&mut self) -> Result<(), TreeError>;
}
