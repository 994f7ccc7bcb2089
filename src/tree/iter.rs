use std::iter::Iterator;

use super::TreeNode;
use crate::dataset::Float;

/// Iterator over the nodes of a decision tree, starting at the root
pub struct NodeIter<'a, F> {
    nodes: &'a [TreeNode<F>],
    queue: Vec<usize>,
}

impl<'a, F> NodeIter<'a, F> {
    pub(crate) fn new(nodes: &'a [TreeNode<F>]) -> Self {
        let queue = if nodes.is_empty() { vec![] } else { vec![0] };

        NodeIter { nodes, queue }
    }
}

impl<'a, F: Float> Iterator for NodeIter<'a, F> {
    type Item = &'a TreeNode<F>;

    fn next(&mut self) -> Option<Self::Item> {
        self.queue.pop().map(|idx| {
            let node = &self.nodes[idx];
            let (left, right) = node.children();
            self.queue.extend(left.into_iter().chain(right.into_iter()));

            node
        })
    }
}
