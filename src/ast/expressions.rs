use crate::ast::{BinOp, Token, UnaryOp};
use crate::lexer::Position;

/// A node of the syntax tree: an expression plus where it starts in the source.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub expr: Expr,
    pub pos: Position,
}

impl Node {
    pub fn new(expr: Expr, pos: Position) -> Self {
        Node { expr, pos }
    }
}

/// One step of a path, with the predicate stages written after it.
///
/// # Example
/// ```text
/// orders[status = "open"][0]
/// ```
/// is one step (`orders`) with two stages.
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub node: Node,
    pub stages: Vec<Node>,
}

/// Abstract Syntax Tree node kinds.
///
/// The parse tree produced by the front end is used directly for evaluation,
/// so every construct of the language has exactly one variant here.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    // Literals
    /// Literal floating point number
    Float(f64),

    /// Literal integer
    Integer(i64),

    /// String literal
    String(String),

    /// Boolean literal
    Boolean(bool),

    /// Null literal
    Null,

    // Navigation
    /// Path of two or more steps, or a single step carrying predicates
    ///
    /// # Examples
    /// ```text
    /// customer.address.city
    /// $state.items[price > 10]
    /// ```
    Path(Vec<Step>),

    /// Member name step
    Name(String),

    /// All member values of an object (`*`)
    Wildcard,

    /// All nested values (`**`)
    Descendants,

    // References
    /// Current context (`$`)
    Context,

    /// Root context (`$$`), independent of the current navigation focus
    Root,

    /// Variable or scope reference (`$name`)
    ///
    /// The scopes `$state`, `$event` and `$instance` are variables resolved
    /// through the configured scope resolver.
    Variable(String),

    // Operations
    /// Binary operation
    BinaryOp {
        op: BinOp,
        left: Box<Node>,
        right: Box<Node>,
    },

    /// Unary operation
    UnaryOp { op: UnaryOp, operand: Box<Node> },

    /// Function chaining (`left ~> right`)
    ///
    /// The value of `left` becomes the first argument of `right`.
    Chain { left: Box<Node>, right: Box<Node> },

    /// Function call
    ///
    /// # Example
    /// ```text
    /// $substring($event.name, 0, 3)
    /// ```
    Call { name: String, args: Vec<Node> },

    // Constructors
    /// Object constructor, entries in source order
    ///
    /// # Example
    /// ```text
    /// {"name": $state.name, "total": $sum($state.items.price)}
    /// ```
    Object(Vec<(Node, Node)>),

    /// Array constructor
    Array(Vec<Node>),

    /// Integer range (`from..to`), only valid inside an array constructor
    Range { from: Box<Node>, to: Box<Node> },

    // Control
    /// Conditional (`condition ? then : otherwise`)
    Conditional {
        condition: Box<Node>,
        then: Box<Node>,
        otherwise: Option<Box<Node>>,
    },

    /// Block (`(a; b; c)`), evaluates to its last expression
    Block(Vec<Node>),

    /// Variable binding (`$name := value`)
    Assign { name: String, value: Box<Node> },

    /// Lambda definition (`function($x, $y) { body }`)
    Lambda { params: Vec<String>, body: Box<Node> },

    /// Placeholder left where the parser could not build a node.
    ///
    /// Records the token that caused the problem. Trees containing error
    /// nodes are never handed out by [`Expression::parse`](crate::Expression::parse).
    Error(Token),
}

impl Expr {
    /// True for steps that navigate into the current value rather than
    /// computing a new one.
    pub fn is_navigation(&self) -> bool {
        matches!(self, Expr::Name(_) | Expr::Wildcard | Expr::Descendants)
    }
}
