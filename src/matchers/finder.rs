//! Running matchers over a tree.

use std::ops::ControlFlow;

use crate::ast::{Descendants, NodeId};

use super::{BindingSet, MatchContext, MatchError, Matcher};

/// One successful evaluation: the anchor node and its captures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub node: NodeId,
    pub bindings: BindingSet,
}

impl Match {
    pub fn get(&self, name: &str) -> Option<NodeId> {
        self.bindings.get(name)
    }
}

/// Lazy pre-order sequence of matches below a root. Clone it to restart.
#[derive(Clone)]
pub struct Matches<'a> {
    cx: MatchContext<'a>,
    matcher: Matcher,
    walk: Descendants<'a>,
}

impl Iterator for Matches<'_> {
    type Item = Result<Match, MatchError>;

    fn next(&mut self) -> Option<Self::Item> {
        for node in self.walk.by_ref() {
            match self.matcher.matches(&self.cx, node) {
                Ok(Some(bindings)) => return Some(Ok(Match { node, bindings })),
                Ok(None) => {}
                Err(e) => return Some(Err(e)),
            }
        }
        None
    }
}

/// Every node in the subtree at `root` (inclusive) that `matcher` accepts,
/// in pre-order, at most one match per node.
pub fn find_all<'a>(cx: &MatchContext<'a>, root: NodeId, matcher: &Matcher) -> Matches<'a> {
    Matches {
        cx: *cx,
        matcher: matcher.clone(),
        walk: cx.unit().descendants(root),
    }
}

/// Collect [`find_all`], stopping at the first error.
pub fn match_all(
    cx: &MatchContext<'_>,
    root: NodeId,
    matcher: &Matcher,
) -> Result<Vec<Match>, MatchError> {
    find_all(cx, root, matcher).collect()
}

/// An ordered table of matchers evaluated together in one traversal.
///
/// Events are delivered in node order, then registration order. The callback
/// returns [`ControlFlow::Break`] to stop delivering events for that key.
pub struct MatchFinder<K> {
    entries: Vec<(Matcher, K)>,
}

impl<K> Default for MatchFinder<K> {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
        }
    }
}

impl<K: PartialEq> MatchFinder<K> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_matcher(&mut self, matcher: Matcher, key: K) {
        self.entries.push((matcher, key));
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn run<F>(&self, cx: &MatchContext<'_>, root: NodeId, mut on_match: F)
    where
        F: FnMut(&K, Result<Match, MatchError>) -> ControlFlow<()>,
    {
        let mut disabled: Vec<&K> = Vec::new();
        for node in cx.unit().descendants(root) {
            for (matcher, key) in &self.entries {
                if disabled.contains(&key) {
                    continue;
                }
                let event = match matcher.matches(cx, node) {
                    Ok(Some(bindings)) => Ok(Match { node, bindings }),
                    Ok(None) => continue,
                    Err(e) => Err(e),
                };
                if on_match(key, event).is_break() {
                    disabled.push(key);
                }
            }
            if self.entries.iter().all(|(_, k)| disabled.contains(&k)) {
                break;
            }
        }
    }
}
