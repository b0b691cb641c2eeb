use crate::value::{write_escaped, Constant};
use core::fmt;
use derive_more::Display;

pub mod parse;

///
/// An arithmetic operator.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum Symbol {
    #[display("+")]
    Add,
    #[display("-")]
    Sub,
    #[display("*")]
    Mul,
    #[display("/")]
    Div,
    #[display("%")]
    Mod,
}

impl Symbol {
    ///
    /// Fold order. Each tier is a full pass over a group before the next runs.
    ///
    pub const TIERS: [Self; 5] = [Self::Mod, Self::Div, Self::Mul, Self::Sub, Self::Add];

    #[must_use]
    pub const fn from_char(c: char) -> Option<Self> {
        match c {
            '+' => Some(Self::Add),
            '-' => Some(Self::Sub),
            '*' => Some(Self::Mul),
            '/' => Some(Self::Div),
            '%' => Some(Self::Mod),
            _ => None,
        }
    }
}

///
/// A named placeholder whose value is supplied from outside.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Variable {
    name: String,
    value: Option<Constant>,
}

impl Variable {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn value(&self) -> Option<&Constant> {
        self.value.as_ref()
    }

    #[must_use]
    pub fn is_resolved(&self) -> bool {
        self.value.is_some()
    }

    pub fn set(&mut self, value: impl Into<Constant>) {
        self.value = Some(value.into());
    }

    pub fn clear(&mut self) {
        self.value = None;
    }
}

///
/// One syntactic unit of an expression.
///
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Constant(Constant),
    Group(Group),
    Symbol(Symbol),
    Variable(Variable),
}

///
/// A parenthesized sequence of nodes, operands alternating with symbols.
///
/// The top level of an expression is a group too.
///
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group(Vec<Node>);

impl Group {
    #[must_use]
    pub fn new(nodes: Vec<Node>) -> Self {
        Self(nodes)
    }

    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.0
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, node: Node) {
        self.0.push(node);
    }

    ///
    /// Every variable in this group and its subgroups, depth-first.
    ///
    pub fn collect_variables<'a>(&'a self, out: &mut Vec<&'a Variable>) {
        for node in &self.0 {
            match node {
                Node::Variable(v) => out.push(v),
                Node::Group(g) => g.collect_variables(out),
                Node::Constant(_) | Node::Symbol(_) => {}
            }
        }
    }

    ///
    /// Like [`Group::collect_variables`], with mutable access.
    ///
    pub fn collect_variables_mut<'a>(&'a mut self, out: &mut Vec<&'a mut Variable>) {
        for node in &mut self.0 {
            match node {
                Node::Variable(v) => out.push(v),
                Node::Group(g) => g.collect_variables_mut(out),
                Node::Constant(_) | Node::Symbol(_) => {}
            }
        }
    }
}

//
// Rendering writes source text that parses back to the same tree.
//
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => write!(f, "{}", c.literal()),
            Self::Group(g) => write!(f, "({g})"),
            Self::Symbol(s) => write!(f, " {s} "),
            Self::Variable(v) => write_escaped(f, '{', '}', &v.name, &['{', '}']),
        }
    }
}

impl fmt::Display for Group {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|node| write!(f, "{node}"))
    }
}
