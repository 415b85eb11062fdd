use serde::{Deserialize, Serialize};

/// Opaque handle to an element of the external render target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// The visual surface widgets render onto (a DOM, an SVG scene, a test
/// double). Elements are addressed by handle; `role` names an element's part
/// in its parent (`mainDIV`, `mainSVG`, `panel_0`, ...).
pub trait Surface {
    fn root(&self) -> NodeId;

    fn exists(&self, node: NodeId) -> bool;

    fn append(&mut self, parent: NodeId, tag: &str, role: &str) -> NodeId;

    /// Removes every direct child of `parent` carrying `role`, with its subtree.
    fn remove_role(&mut self, parent: NodeId, role: &str);

    /// First direct child of `parent` carrying `role`.
    fn find_role(&self, parent: NodeId, role: &str) -> Option<NodeId>;

    /// Removes all children of `node`.
    fn clear(&mut self, node: NodeId);

    fn set_attr(&mut self, node: NodeId, name: &str, value: &str);

    fn set_style(&mut self, node: NodeId, name: &str, value: &str);

    fn set_text(&mut self, node: NodeId, text: &str);
}
