// ast/node.rs
//
// Syntax-tree nodes and the per-compilation node arena.

use keel_identity::Pos;
use keel_mparith::MpInt;

use crate::arena::{Arena, arena_id};
use crate::ast::op::{Op, Slot};
use crate::constant::Val;
use crate::symbols::SymId;
use crate::types::TypeId;

keel_identity::define_entity_id! {
    /// Handle to a node in the [`NodeArena`].
    pub struct NodeId;
}
arena_id!(NodeId);

/// Ceiling of the evaluation-order metric. Calls always cost this much.
pub const UINF: u8 = 100;

/// How a node's value can be addressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Addable {
    #[default]
    None,
    /// Directly addressable: a global or a stack slot.
    Direct,
    /// Addressable through one indirection.
    Indirect,
}

/// Storage class of a declared name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Class {
    #[default]
    None,
    Extern,
    Auto,
    Param,
    ParamOut,
    /// Parameter passed by reference after escape analysis.
    ParamRef,
    Func,
}

#[derive(Debug, Clone, Default)]
pub struct Node {
    pub op: Op,
    pub left: Option<NodeId>,
    pub right: Option<NodeId>,
    pub ty: Option<TypeId>,
    pub(crate) slots: [Option<NodeId>; 6],

    pub val: Option<Val>,
    pub sym: Option<SymId>,
    pub pos: Pos,

    /// Register need estimate; higher is evaluated first.
    pub ullman: u8,
    pub addable: Addable,
    pub class: Class,
    /// Storage moved to the heap.
    pub heap: bool,
    /// A diagnostic has been reported for this node.
    pub diag: bool,
    /// Declared with `:=`.
    pub colas: bool,
    pub embedded: bool,
    /// Operator of an `x op= y` assignment.
    pub asop: Option<Op>,
    pub funcdepth: u32,
    pub vargen: u32,
}

impl Node {
    pub fn is_name(&self) -> bool {
        matches!(self.op, Op::Name | Op::NoName)
    }

    pub fn is_literal(&self) -> bool {
        self.op == Op::Literal
    }

    /// Neither a name, a literal, a type reference nor a bad node.
    pub fn is_operator(&self) -> bool {
        !self.is_name() && !self.is_literal() && !matches!(self.op, Op::Type | Op::Bad)
    }

    pub fn slot(&self, slot: Slot) -> Option<NodeId> {
        self.slots[slot.index()]
    }

    /// Integer value of an integer literal.
    pub fn int_val(&self) -> Option<&MpInt> {
        match &self.val {
            Some(Val::Int(v)) => Some(v),
            _ => None,
        }
    }
}

/// Iterator over the links of one node.
pub type Children = std::iter::Flatten<std::array::IntoIter<Option<NodeId>, 8>>;

#[derive(Debug, Clone, Default)]
pub struct NodeArena {
    nodes: Arena<NodeId, Node>,
}

impl NodeArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: NodeId) -> &Node {
        self.nodes.get(id)
    }

    pub fn get_mut(&mut self, id: NodeId) -> &mut Node {
        self.nodes.get_mut(id)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn alloc(&mut self, node: Node) -> NodeId {
        self.nodes.alloc(node)
    }

    /// Allocate an operator node and compute its evaluation cost.
    pub fn make_node(
        &mut self,
        op: Op,
        left: Option<NodeId>,
        right: Option<NodeId>,
        pos: Pos,
    ) -> NodeId {
        let id = self.nodes.alloc(Node {
            op,
            left,
            right,
            pos,
            ..Node::default()
        });
        self.ullman_calc(id);
        id
    }

    pub fn make_literal(&mut self, val: Val, ty: TypeId, pos: Pos) -> NodeId {
        self.nodes.alloc(Node {
            op: Op::Literal,
            ty: Some(ty),
            val: Some(val),
            pos,
            ullman: 1,
            addable: Addable::Direct,
            ..Node::default()
        })
    }

    pub fn make_name(&mut self, sym: SymId, pos: Pos) -> NodeId {
        self.nodes.alloc(Node {
            op: Op::Name,
            sym: Some(sym),
            pos,
            ullman: 1,
            ..Node::default()
        })
    }

    /// An error placeholder, already diagnosed.
    pub fn bad(&mut self, pos: Pos) -> NodeId {
        self.nodes.alloc(Node {
            op: Op::Bad,
            ty: Some(TypeId::ERROR),
            pos,
            ullman: 1,
            diag: true,
            ..Node::default()
        })
    }

    /// Untyped integer constant.
    pub fn int_const(&mut self, v: i64, pos: Pos) -> NodeId {
        self.make_literal(Val::Int(MpInt::from_i64(v)), TypeId::IDEAL, pos)
    }

    pub fn bool_const(&mut self, b: bool, pos: Pos) -> NodeId {
        self.make_literal(Val::Bool(b), TypeId::BOOL, pos)
    }

    pub fn nil_const(&mut self, pos: Pos) -> NodeId {
        self.make_literal(Val::Nil, TypeId::NIL, pos)
    }

    /// Attach a control-flow subtree.
    ///
    /// # Panics
    /// If the node's operator has no such slot.
    pub fn set_slot(&mut self, n: NodeId, slot: Slot, child: Option<NodeId>) {
        let node = self.nodes.get_mut(n);
        assert!(
            node.op.allows(slot),
            "{} nodes have no {:?} slot",
            node.op.name(),
            slot
        );
        node.slots[slot.index()] = child;
    }

    pub fn slot(&self, n: NodeId, slot: Slot) -> Option<NodeId> {
        self.nodes.get(n).slot(slot)
    }

    pub fn set_children(&mut self, n: NodeId, left: Option<NodeId>, right: Option<NodeId>) {
        let node = self.nodes.get_mut(n);
        node.left = left;
        node.right = right;
        self.ullman_calc(n);
    }

    /// Recompute the evaluation cost of `n` from its children.
    pub fn ullman_calc(&mut self, n: NodeId) {
        let node = self.nodes.get(n);
        let ullman = if node.op.is_leaf() {
            1
        } else if node.op.is_call() {
            UINF
        } else {
            let cost = |child: Option<NodeId>| child.map_or(1, |c| self.nodes.get(c).ullman);
            let (mut ul, ur) = (cost(node.left), cost(node.right));
            if ul == ur {
                ul = ul.saturating_add(1);
            }
            ul.max(ur).min(UINF)
        };
        self.nodes.get_mut(n).ullman = ullman;
    }

    /// Deep copy of the tree under `n`. Name and type nodes denote
    /// declarations and are shared, not copied.
    pub fn copy_subtree(&mut self, n: NodeId) -> NodeId {
        let node = self.nodes.get(n);
        if matches!(node.op, Op::Name | Op::NoName | Op::Type) {
            return n;
        }
        let mut copy = node.clone();
        copy.left = copy.left.map(|c| self.copy_subtree(c));
        copy.right = copy.right.map(|c| self.copy_subtree(c));
        for slot in Slot::ALL {
            let i = slot.index();
            copy.slots[i] = copy.slots[i].map(|c| self.copy_subtree(c));
        }
        self.nodes.alloc(copy)
    }

    /// Operand and control-flow links of `n`, in order.
    pub fn children(&self, n: NodeId) -> Children {
        let node = self.nodes.get(n);
        let links = [
            node.left,
            node.right,
            node.slots[0],
            node.slots[1],
            node.slots[2],
            node.slots[3],
            node.slots[4],
            node.slots[5],
        ];
        links.into_iter().flatten()
    }
}
