// ast/op.rs
//
// Node operators and the control-flow slots each one may use.

use std::fmt;

/// Every expression, statement and declaration form a node can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Op {
    /// Placeholder for an erroneous construct.
    #[default]
    Bad,

    // Leaves
    Name,
    /// Reference to an undeclared name.
    NoName,
    Type,
    Literal,

    /// Right-leaning cons cell: `left` is the item, `right` the rest.
    List,

    // Declarations
    Dcl,
    DclFunc,
    DclField,
    DclArg,

    // Selectors and indexing
    Dot,
    DotPtr,
    DotMeth,
    DotInter,
    DotType,
    Index,
    Slice,

    // Calls
    Call,
    CallMeth,
    CallInter,
    Conv,
    Composite,
    Key,

    // Unary
    Addr,
    Ind,
    Not,
    Com,
    Plus,
    Minus,
    Recv,

    // Binary, by precedence
    OrOr,
    AndAnd,
    Eq,
    Ne,
    Lt,
    Le,
    Ge,
    Gt,
    Add,
    Sub,
    Or,
    Xor,
    Mul,
    Div,
    Mod,
    Lsh,
    Rsh,
    And,
    AndNot,
    Send,

    // Builtins
    Len,
    Cap,
    New,
    Make,
    Panic,
    Print,

    /// Function literal.
    Func,

    // Statements
    As,
    AsOp,
    Return,
    For,
    If,
    Switch,
    Select,
    Case,
    Range,
    Fall,
    Defer,
    Proc,
    Goto,
    Label,
    Break,
    Continue,
    Empty,
}

/// Control-flow subtrees beyond `left` and `right`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Init,
    Cond,
    Post,
    Body,
    Else,
    Cases,
}

impl Slot {
    pub const ALL: [Slot; 6] = [
        Slot::Init,
        Slot::Cond,
        Slot::Post,
        Slot::Body,
        Slot::Else,
        Slot::Cases,
    ];

    pub(crate) const fn index(self) -> usize {
        self as usize
    }
}

impl Op {
    /// Operator spelling used in diagnostics.
    pub const fn symbol(self) -> &'static str {
        match self {
            Op::Not => "!",
            Op::Com => "^",
            Op::Plus | Op::Add => "+",
            Op::Minus | Op::Sub => "-",
            Op::Recv | Op::Send => "<-",
            Op::Addr | Op::And => "&",
            Op::Ind | Op::Mul => "*",
            Op::OrOr => "||",
            Op::AndAnd => "&&",
            Op::Eq => "==",
            Op::Ne => "!=",
            Op::Lt => "<",
            Op::Le => "<=",
            Op::Ge => ">=",
            Op::Gt => ">",
            Op::Or => "|",
            Op::Xor => "^",
            Op::Div => "/",
            Op::Mod => "%",
            Op::Lsh => "<<",
            Op::Rsh => ">>",
            Op::AndNot => "&^",
            Op::As => "=",
            Op::Len => "len",
            Op::Cap => "cap",
            Op::New => "new",
            Op::Make => "make",
            Op::Panic => "panic",
            Op::Print => "print",
            _ => self.name(),
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            Op::Bad => "BAD",
            Op::Name => "NAME",
            Op::NoName => "NONAME",
            Op::Type => "TYPE",
            Op::Literal => "LITERAL",
            Op::List => "LIST",
            Op::Dcl => "DCL",
            Op::DclFunc => "DCLFUNC",
            Op::DclField => "DCLFIELD",
            Op::DclArg => "DCLARG",
            Op::Dot => "DOT",
            Op::DotPtr => "DOTPTR",
            Op::DotMeth => "DOTMETH",
            Op::DotInter => "DOTINTER",
            Op::DotType => "DOTTYPE",
            Op::Index => "INDEX",
            Op::Slice => "SLICE",
            Op::Call => "CALL",
            Op::CallMeth => "CALLMETH",
            Op::CallInter => "CALLINTER",
            Op::Conv => "CONV",
            Op::Composite => "COMPOSITE",
            Op::Key => "KEY",
            Op::Addr => "ADDR",
            Op::Ind => "IND",
            Op::Not => "NOT",
            Op::Com => "COM",
            Op::Plus => "PLUS",
            Op::Minus => "MINUS",
            Op::Recv => "RECV",
            Op::OrOr => "OROR",
            Op::AndAnd => "ANDAND",
            Op::Eq => "EQ",
            Op::Ne => "NE",
            Op::Lt => "LT",
            Op::Le => "LE",
            Op::Ge => "GE",
            Op::Gt => "GT",
            Op::Add => "ADD",
            Op::Sub => "SUB",
            Op::Or => "OR",
            Op::Xor => "XOR",
            Op::Mul => "MUL",
            Op::Div => "DIV",
            Op::Mod => "MOD",
            Op::Lsh => "LSH",
            Op::Rsh => "RSH",
            Op::And => "AND",
            Op::AndNot => "ANDNOT",
            Op::Send => "SEND",
            Op::Len => "LEN",
            Op::Cap => "CAP",
            Op::New => "NEW",
            Op::Make => "MAKE",
            Op::Panic => "PANIC",
            Op::Print => "PRINT",
            Op::Func => "FUNC",
            Op::As => "AS",
            Op::AsOp => "ASOP",
            Op::Return => "RETURN",
            Op::For => "FOR",
            Op::If => "IF",
            Op::Switch => "SWITCH",
            Op::Select => "SELECT",
            Op::Case => "CASE",
            Op::Range => "RANGE",
            Op::Fall => "FALL",
            Op::Defer => "DEFER",
            Op::Proc => "PROC",
            Op::Goto => "GOTO",
            Op::Label => "LABEL",
            Op::Break => "BREAK",
            Op::Continue => "CONTINUE",
            Op::Empty => "EMPTY",
        }
    }

    /// Leaves carry no operand links.
    pub const fn is_leaf(self) -> bool {
        matches!(self, Op::Name | Op::NoName | Op::Type | Op::Literal | Op::Bad)
    }

    /// Unary operators the constant folder evaluates.
    pub const fn is_unary_arith(self) -> bool {
        matches!(self, Op::Plus | Op::Minus | Op::Com | Op::Not)
    }

    /// Binary operators the constant folder evaluates.
    pub const fn is_binary(self) -> bool {
        matches!(
            self,
            Op::OrOr
                | Op::AndAnd
                | Op::Eq
                | Op::Ne
                | Op::Lt
                | Op::Le
                | Op::Ge
                | Op::Gt
                | Op::Add
                | Op::Sub
                | Op::Or
                | Op::Xor
                | Op::Mul
                | Op::Div
                | Op::Mod
                | Op::Lsh
                | Op::Rsh
                | Op::And
                | Op::AndNot
        )
    }

    pub const fn is_comparison(self) -> bool {
        matches!(self, Op::Eq | Op::Ne | Op::Lt | Op::Le | Op::Ge | Op::Gt)
    }

    pub const fn is_shift(self) -> bool {
        matches!(self, Op::Lsh | Op::Rsh)
    }

    pub const fn is_call(self) -> bool {
        matches!(
            self,
            Op::Call | Op::CallMeth | Op::CallInter | Op::Proc | Op::Defer
        )
    }

    pub const fn is_foldable(self) -> bool {
        self.is_unary_arith() || self.is_binary()
    }

    /// Whether nodes of this operator use control-flow slot `slot`.
    pub const fn allows(self, slot: Slot) -> bool {
        match self {
            Op::For => matches!(slot, Slot::Init | Slot::Cond | Slot::Post | Slot::Body),
            Op::If => matches!(slot, Slot::Init | Slot::Cond | Slot::Body | Slot::Else),
            Op::Switch | Op::Select => matches!(slot, Slot::Init | Slot::Cond | Slot::Cases),
            Op::Case | Op::Range | Op::DclFunc | Op::Func => matches!(slot, Slot::Body),
            _ => false,
        }
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_per_opcode() {
        assert!(Op::For.allows(Slot::Post));
        assert!(!Op::If.allows(Slot::Post));
        assert!(Op::If.allows(Slot::Else));
        assert!(Op::Switch.allows(Slot::Cases));
        assert!(!Op::Add.allows(Slot::Body));
        for slot in Slot::ALL {
            assert!(!Op::Literal.allows(slot));
        }
    }

    #[test]
    fn spelling() {
        assert_eq!(Op::AndNot.to_string(), "&^");
        assert_eq!(Op::Minus.to_string(), "-");
        assert_eq!(Op::For.to_string(), "FOR");
        assert!(Op::Lsh.is_shift());
        assert!(Op::Com.is_foldable());
        assert!(!Op::Call.is_foldable());
    }
}
