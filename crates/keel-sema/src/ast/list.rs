// ast/list.rs
//
// Right-leaning `List` cons chains.
//
// A list of one item is the item itself; longer lists are `List` nodes whose
// `left` is an item and whose `right` is the rest of the list. An empty list
// is `None`.

use crate::ast::node::{NodeArena, NodeId};
use crate::ast::op::Op;

/// Positioned iteration over a list chain.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListCursor {
    rest: Option<NodeId>,
}

impl ListCursor {
    /// Start iterating `list` and return its first item.
    pub fn first(nodes: &NodeArena, list: Option<NodeId>) -> (ListCursor, Option<NodeId>) {
        let mut cursor = ListCursor { rest: list };
        let item = cursor.next(nodes);
        (cursor, item)
    }

    pub fn next(&mut self, nodes: &NodeArena) -> Option<NodeId> {
        let at = self.rest?;
        let node = nodes.get(at);
        if node.op == Op::List {
            self.rest = node.right;
            node.left
        } else {
            self.rest = None;
            Some(at)
        }
    }

    pub fn is_done(&self) -> bool {
        self.rest.is_none()
    }
}

pub struct ListIter<'a> {
    nodes: &'a NodeArena,
    cursor: ListCursor,
}

impl Iterator for ListIter<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        self.cursor.next(self.nodes)
    }
}

impl NodeArena {
    fn is_cons(&self, n: NodeId) -> bool {
        self.get(n).op == Op::List
    }

    fn cons(&mut self, item: NodeId, rest: NodeId) -> NodeId {
        let pos = self.get(item).pos;
        self.make_node(Op::List, Some(item), Some(rest), pos)
    }

    /// Last cons cell of a chain, if it has more than one item.
    fn last_cons(&self, list: NodeId) -> Option<NodeId> {
        if !self.is_cons(list) {
            return None;
        }
        let mut at = list;
        while let Some(rest) = self.get(at).right.filter(|&r| self.is_cons(r)) {
            at = rest;
        }
        Some(at)
    }

    pub fn list_items(&self, list: Option<NodeId>) -> ListIter<'_> {
        ListIter {
            nodes: self,
            cursor: ListCursor { rest: list },
        }
    }

    pub fn list_count(&self, list: Option<NodeId>) -> usize {
        self.list_items(list).count()
    }

    /// Build a list from items in order.
    ///
    /// The last item becomes the tail of the chain, so a trailing item that
    /// is itself a list is spliced in: `list_from(&[a, l])` is
    /// `list_concat(Some(a), Some(l))`.
    pub fn list_from(&mut self, items: &[NodeId]) -> Option<NodeId> {
        let (&last, init) = items.split_last()?;
        Some(init.iter().rev().fold(last, |rest, &item| self.cons(item, rest)))
    }

    /// Append one item to the end of `list`.
    pub fn list_append(&mut self, list: Option<NodeId>, item: NodeId) -> NodeId {
        let Some(list) = list else {
            return item;
        };
        match self.last_cons(list) {
            None => self.cons(list, item),
            Some(tail) => {
                let Some(last) = self.get(tail).right else {
                    return self.cons(list, item);
                };
                let cell = self.cons(last, item);
                let left = self.get(tail).left;
                self.set_children(tail, left, Some(cell));
                list
            }
        }
    }

    /// Join two lists. `a` is modified in place and returned.
    pub fn list_concat(&mut self, a: Option<NodeId>, b: Option<NodeId>) -> Option<NodeId> {
        let (a, b) = match (a, b) {
            (None, rest) | (rest, None) => return rest,
            (Some(a), Some(b)) => (a, b),
        };
        match self.last_cons(a) {
            None => Some(self.cons(a, b)),
            Some(tail) => {
                let node = self.get(tail);
                let (left, last) = (node.left, node.right);
                let joined = match last {
                    Some(last) => self.cons(last, b),
                    None => b,
                };
                self.set_children(tail, left, Some(joined));
                Some(a)
            }
        }
    }

    /// Items of `list`, expanding items that are themselves lists.
    pub fn list_flatten(&self, list: Option<NodeId>) -> Vec<NodeId> {
        let mut out = Vec::new();
        self.flatten_into(list, &mut out);
        out
    }

    fn flatten_into(&self, list: Option<NodeId>, out: &mut Vec<NodeId>) {
        for item in self.list_items(list) {
            if self.is_cons(item) {
                self.flatten_into(Some(item), out);
            } else {
                out.push(item);
            }
        }
    }

    /// A new list with the items of `list` in reverse order.
    pub fn list_rev(&mut self, list: Option<NodeId>) -> Option<NodeId> {
        let mut items: Vec<NodeId> = self.list_items(list).collect();
        items.reverse();
        self.list_from(&items)
    }
}

#[cfg(test)]
mod tests {
    use keel_identity::Pos;
    use pretty_assertions::assert_eq;

    use super::*;

    fn leaves(nodes: &mut NodeArena, n: i64) -> Vec<NodeId> {
        (0..n).map(|v| nodes.int_const(v, Pos::new(v as u32))).collect()
    }

    #[test]
    fn single_item_is_itself() {
        let mut nodes = NodeArena::new();
        let items = leaves(&mut nodes, 1);
        assert_eq!(nodes.list_from(&items), Some(items[0]));
        assert_eq!(nodes.list_count(Some(items[0])), 1);
        assert_eq!(nodes.list_from(&[]), None);
        assert_eq!(nodes.list_count(None), 0);
    }

    #[test]
    fn trailing_list_item_is_spliced() {
        let mut nodes = NodeArena::new();
        let items = leaves(&mut nodes, 3);
        let tail = nodes.list_from(&items[1..]).unwrap();
        let list = nodes.list_from(&[items[0], tail]);
        assert_eq!(nodes.list_items(list).collect::<Vec<_>>(), items);

        let head = nodes.list_from(&items[..2]).unwrap();
        let list = nodes.list_from(&[head, items[2]]);
        assert_eq!(nodes.list_items(list).collect::<Vec<_>>(), vec![head, items[2]]);
    }

    #[test]
    fn append_keeps_order() {
        let mut nodes = NodeArena::new();
        let items = leaves(&mut nodes, 4);
        let mut list = None;
        for &item in &items {
            list = Some(nodes.list_append(list, item));
        }
        assert_eq!(nodes.list_items(list).collect::<Vec<_>>(), items);
        assert_eq!(nodes.list_count(list), 4);
    }

    #[test]
    fn concat_and_reverse() {
        let mut nodes = NodeArena::new();
        let items = leaves(&mut nodes, 5);
        let a = nodes.list_from(&items[..2]);
        let b = nodes.list_from(&items[2..]);
        let joined = nodes.list_concat(a, b);
        assert_eq!(nodes.list_items(joined).collect::<Vec<_>>(), items);

        let rev = nodes.list_rev(joined);
        let mut expected = items.clone();
        expected.reverse();
        assert_eq!(nodes.list_items(rev).collect::<Vec<_>>(), expected);

        let single = nodes.list_concat(Some(items[0]), Some(items[1]));
        assert_eq!(nodes.list_count(single), 2);
        assert_eq!(nodes.list_concat(None, b), b);
    }

    #[test]
    fn flatten_expands_nested_lists() {
        let mut nodes = NodeArena::new();
        let items = leaves(&mut nodes, 4);
        let inner = nodes.list_from(&items[1..3]).unwrap();
        let outer = nodes.list_from(&[items[0], inner, items[3]]);
        assert_eq!(nodes.list_count(outer), 3);
        assert_eq!(nodes.list_flatten(outer), items);
    }

    #[test]
    fn cursor_walks_positionally() {
        let mut nodes = NodeArena::new();
        let items = leaves(&mut nodes, 3);
        let list = nodes.list_from(&items);
        let (mut cursor, first) = ListCursor::first(&nodes, list);
        assert_eq!(first, Some(items[0]));
        assert_eq!(cursor.next(&nodes), Some(items[1]));
        assert!(!cursor.is_done());
        assert_eq!(cursor.next(&nodes), Some(items[2]));
        assert!(cursor.is_done());
        assert_eq!(cursor.next(&nodes), None);
    }
}
