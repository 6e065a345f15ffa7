use super::CommandDispatcher;
use crate::command::Source;
use crate::tree::NodeId;

impl<S: Source> CommandDispatcher<S> {
    /// Names of the nodes leading from the root to `target`, or an empty
    /// list if `target` is not reachable through child edges.
    pub fn get_path(&self, target: NodeId) -> Vec<String> {
        let mut path = Vec::new();
        if self.find_path(self.tree.root(), target, &mut path) {
            path.iter()
                .map(|&id| self.tree.node(id).name().to_owned())
                .collect()
        } else {
            Vec::new()
        }
    }

    fn find_path(&self, current: NodeId, target: NodeId, path: &mut Vec<NodeId>) -> bool {
        if current == target {
            return true;
        }
        for child in self.tree.node(current).children() {
            path.push(child);
            if self.find_path(child, target, path) {
                return true;
            }
            path.pop();
        }
        false
    }

    /// Follow child names from the root. An empty path is the root.
    pub fn find_node<I>(&self, path: I) -> Option<NodeId>
    where
        I: IntoIterator,
        I::Item: AsRef<str>,
    {
        let mut node = self.tree.root();
        for name in path {
            node = self.tree.node(node).child(name.as_ref())?;
        }
        Some(node)
    }

    /// Report every pair of sibling nodes where an example input of one is
    /// also accepted by the other.
    ///
    /// `consumer` receives the parent, the node whose examples were tried,
    /// the sibling that accepted them, and the overlapping examples.
    pub fn find_ambiguities<F>(&self, mut consumer: F)
    where
        F: FnMut(NodeId, NodeId, NodeId, &[String]),
    {
        self.find_ambiguities_below(self.tree.root(), &mut consumer);
    }

    fn find_ambiguities_below<F>(&self, parent: NodeId, consumer: &mut F)
    where
        F: FnMut(NodeId, NodeId, NodeId, &[String]),
    {
        let node = self.tree.node(parent);
        for child in node.children() {
            let examples = self.tree.node(child).examples();
            for sibling in node.children() {
                if child == sibling {
                    continue;
                }
                let sibling_node = self.tree.node(sibling);
                let mut matches: Vec<String> = Vec::new();
                for input in &examples {
                    if sibling_node.is_valid_input(input) && !matches.contains(input) {
                        matches.push(input.clone());
                    }
                }
                if !matches.is_empty() {
                    consumer(parent, child, sibling, &matches);
                }
            }
            self.find_ambiguities_below(child, consumer);
        }
    }
}
