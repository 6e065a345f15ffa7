use indexmap::{IndexMap, IndexSet};

use super::CommandDispatcher;
use crate::command::{ARGUMENT_SEPARATOR, Source};
use crate::tree::NodeId;

const USAGE_OPTIONAL_OPEN: &str = "[";
const USAGE_OPTIONAL_CLOSE: &str = "]";
const USAGE_REQUIRED_OPEN: &str = "(";
const USAGE_REQUIRED_CLOSE: &str = ")";
const USAGE_OR: &str = "|";

impl<S: Source> CommandDispatcher<S> {
    /// Every executable path below `node`, one string each, relative to
    /// `node`.
    ///
    /// With `restricted`, subtrees `source` may not use are skipped.
    pub fn get_all_usage(&self, node: NodeId, source: &S, restricted: bool) -> Vec<String> {
        let mut result = Vec::new();
        self.collect_all_usage(node, source, &mut result, "", restricted);
        result
    }

    fn collect_all_usage(
        &self,
        id: NodeId,
        source: &S,
        result: &mut Vec<String>,
        prefix: &str,
        restricted: bool,
    ) {
        let node = self.tree.node(id);
        if restricted && !node.can_use(source) {
            return;
        }
        if node.command().is_some() {
            result.push(prefix.to_owned());
        }
        if let Some(target) = node.redirect() {
            let redirect = self.redirect_usage(target);
            if prefix.is_empty() {
                result.push(format!("{}{ARGUMENT_SEPARATOR}{redirect}", node.usage_text()));
            } else {
                result.push(format!("{prefix}{ARGUMENT_SEPARATOR}{redirect}"));
            }
            return;
        }
        for child_id in node.children() {
            let child = self.tree.node(child_id).usage_text();
            let next = if prefix.is_empty() {
                child
            } else {
                format!("{prefix}{ARGUMENT_SEPARATOR}{child}")
            };
            self.collect_all_usage(child_id, source, result, &next, restricted);
        }
    }

    /// A compact usage line per child of `node`.
    ///
    /// A single continuation is inlined, optional parts (below a node that is
    /// itself executable) are bracketed, and alternatives are listed as
    /// `(a|b)`. With `restricted`, nodes `source` may not use are left out.
    pub fn get_smart_usage(
        &self,
        node: NodeId,
        source: &S,
        restricted: bool,
    ) -> IndexMap<NodeId, String> {
        let parent = self.tree.node(node);
        let optional = parent.command().is_some();
        parent
            .children()
            .filter_map(|child| {
                self.smart_usage(child, source, restricted, optional, false)
                    .map(|usage| (child, usage))
            })
            .collect()
    }

    fn smart_usage(
        &self,
        id: NodeId,
        source: &S,
        restricted: bool,
        optional: bool,
        deep: bool,
    ) -> Option<String> {
        let node = self.tree.node(id);
        if restricted && !node.can_use(source) {
            return None;
        }

        let this = if optional {
            format!("{USAGE_OPTIONAL_OPEN}{}{USAGE_OPTIONAL_CLOSE}", node.usage_text())
        } else {
            node.usage_text()
        };
        if deep {
            return Some(this);
        }

        if let Some(target) = node.redirect() {
            return Some(format!("{this}{ARGUMENT_SEPARATOR}{}", self.redirect_usage(target)));
        }

        let child_optional = node.command().is_some();
        let (open, close) = if child_optional {
            (USAGE_OPTIONAL_OPEN, USAGE_OPTIONAL_CLOSE)
        } else {
            (USAGE_REQUIRED_OPEN, USAGE_REQUIRED_CLOSE)
        };
        let children: Vec<NodeId> = node
            .children()
            .filter(|&child| !restricted || self.tree.node(child).can_use(source))
            .collect();

        match children.as_slice() {
            [] => {}
            [only] => {
                if let Some(usage) =
                    self.smart_usage(*only, source, restricted, child_optional, child_optional)
                {
                    return Some(format!("{this}{ARGUMENT_SEPARATOR}{usage}"));
                }
            }
            many => {
                let distinct: IndexSet<String> = many
                    .iter()
                    .filter_map(|&child| {
                        self.smart_usage(child, source, restricted, child_optional, true)
                    })
                    .collect();
                if distinct.len() == 1 {
                    let usage = distinct.first().map(String::as_str).unwrap_or_default();
                    let usage = if child_optional {
                        format!("{USAGE_OPTIONAL_OPEN}{usage}{USAGE_OPTIONAL_CLOSE}")
                    } else {
                        usage.to_owned()
                    };
                    return Some(format!("{this}{ARGUMENT_SEPARATOR}{usage}"));
                }
                if distinct.len() > 1 {
                    let alternatives: Vec<String> = many
                        .iter()
                        .map(|&child| self.tree.node(child).usage_text())
                        .collect();
                    return Some(format!(
                        "{this}{ARGUMENT_SEPARATOR}{open}{}{close}",
                        alternatives.join(USAGE_OR)
                    ));
                }
            }
        }
        Some(this)
    }

    fn redirect_usage(&self, target: NodeId) -> String {
        if target == self.tree.root() {
            "...".to_owned()
        } else {
            format!("-> {}", self.tree.node(target).usage_text())
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::CommandDispatcher;
    use crate::arguments::integer;
    use crate::tree::{NodeId, argument, literal};

    fn dispatcher() -> CommandDispatcher<u8> {
        let mut dispatcher = CommandDispatcher::new();
        dispatcher
            .register(
                literal("a")
                    .then(literal("1").then(literal("i").executes(|_| Ok(0))))
                    .then(literal("2").executes(|_| Ok(0))),
            )
            .unwrap();
        dispatcher.register(literal("b").then(literal("1").executes(|_| Ok(0)))).unwrap();
        dispatcher.register(literal("c").executes(|_| Ok(0))).unwrap();
        dispatcher
            .register(literal("d").requires(|s: &u8| *s > 0).executes(|_| Ok(0)))
            .unwrap();
        dispatcher
            .register(
                literal("e")
                    .executes(|_| Ok(0))
                    .then(argument("n", integer()).executes(|_| Ok(0))),
            )
            .unwrap();
        dispatcher
            .register(
                literal("f")
                    .then(literal("x").executes(|_| Ok(0)))
                    .then(literal("y").executes(|_| Ok(0))),
            )
            .unwrap();
        dispatcher.register(literal("g").redirect(NodeId::ROOT)).unwrap();
        let b = dispatcher.tree().node(NodeId::ROOT).child("b").unwrap();
        dispatcher.register(literal("h").redirect(b)).unwrap();
        dispatcher
    }

    #[test]
    fn all_usage_lists_every_path() {
        let d = dispatcher();
        let usage = d.get_all_usage(d.root(), &0, true);
        assert_eq!(
            usage,
            vec!["a 1 i", "a 2", "b 1", "c", "e", "e <n>", "f x", "f y", "g ...", "h -> b"]
        );
    }

    #[test]
    fn all_usage_unrestricted_includes_hidden() {
        let d = dispatcher();
        assert!(d.get_all_usage(d.root(), &0, false).contains(&"d".to_owned()));
        assert!(d.get_all_usage(d.root(), &1, true).contains(&"d".to_owned()));
    }

    #[test]
    fn smart_usage_compacts() {
        let d = dispatcher();
        let usage: Vec<String> = d.get_smart_usage(d.root(), &0, true).into_values().collect();
        assert_eq!(
            usage,
            vec!["a (1|2)", "b 1", "c", "e [<n>]", "f (x|y)", "g ...", "h -> b"]
        );
    }

    #[test]
    fn smart_usage_of_subcommand() {
        let d = dispatcher();
        let a = d.tree().node(NodeId::ROOT).child("a").unwrap();
        let usage: Vec<String> = d.get_smart_usage(a, &0, true).into_values().collect();
        assert_eq!(usage, vec!["1 i", "2"]);
    }
}
