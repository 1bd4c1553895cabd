use std::fmt;

/// Lexical token produced by the [`Lexer`](crate::lexer::Lexer).
#[derive(Debug, Clone, PartialEq)]
pub enum Token {
    // Literals
    /// Floating point number, or an integer too large for `i64`
    ///
    /// # Examples
    /// ```text
    /// 3.14
    /// 1e3
    /// ```
    Float(f64),

    /// Integer
    ///
    /// # Examples
    /// ```text
    /// 42
    /// 0
    /// ```
    Integer(i64),

    /// String literal in double or single quotes, escapes already resolved
    ///
    /// # Examples
    /// ```text
    /// "hello"
    /// 'it\'s'
    /// ```
    String(String),

    /// `true` / `false`
    Boolean(bool),

    /// `null`
    Null,

    // Names and references
    /// Member name used in path navigation
    ///
    /// Plain identifiers or backtick-quoted names.
    ///
    /// # Examples
    /// ```text
    /// orders
    /// `first name`
    /// ```
    Name(String),

    /// Variable, scope or function reference (`$name`)
    ///
    /// # Examples
    /// ```text
    /// $state
    /// $uppercase
    /// $x
    /// ```
    Variable(String),

    /// Current context (`$`)
    Dollar,

    /// Root context (`$$`)
    DollarDollar,

    /// `function` keyword introducing a lambda
    Function,

    // Operators
    /// Addition (`+`)
    Plus,

    /// Subtraction or negation (`-`)
    Minus,

    /// Multiplication, or the wildcard step (`*`)
    Star,

    /// Descendant step (`**`)
    StarStar,

    /// Division (`/`)
    Slash,

    /// Modulo (`%`)
    Percent,

    /// String concatenation (`&`)
    Ampersand,

    /// Equality (`=`)
    Eq,

    /// Inequality (`!=`)
    NotEq,

    /// Less than
    Lt,

    /// Less than or equal
    LtEq,

    /// Greater than
    Gt,

    /// Greater than or equal
    GtEq,

    /// Logical AND (word, not symbol)
    And,

    /// Logical OR (word, not symbol)
    Or,

    /// Membership (`in`)
    In,

    /// Function chaining (`~>`)
    ///
    /// # Examples
    /// ```text
    /// $state.name ~> $uppercase
    /// $event.text ~> $substring(0, 3)
    /// ```
    Chain,

    /// Variable binding (`:=`)
    ColonEqual,

    /// Conditional (`?`)
    Question,

    /// Conditional else branch and object entry separator (`:`)
    Colon,

    /// Path step separator (`.`)
    Dot,

    /// Range inside an array constructor (`..`)
    DotDot,

    // Delimiters
    /// Argument and element separator
    Comma,

    /// Block expression separator
    Semicolon,

    /// Left parenthesis for grouping, blocks, calls and parameters
    LParen,

    /// Right parenthesis
    RParen,

    /// Left bracket for predicates and array constructors
    LBracket,

    /// Right bracket
    RBracket,

    /// Left brace for object constructors and lambda bodies
    LBrace,

    /// Right brace
    RBrace,

    /// Text the lexer could not turn into a token
    ///
    /// A diagnostic has already been reported for it.
    Error(String),

    /// End of input
    Eof,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Float(n) => write!(f, "{}", n),
            Token::Integer(n) => write!(f, "{}", n),
            Token::String(s) => write!(f, "\"{}\"", s),
            Token::Boolean(b) => write!(f, "{}", b),
            Token::Null => f.write_str("null"),
            Token::Name(n) => f.write_str(n),
            Token::Variable(n) => write!(f, "${}", n),
            Token::Dollar => f.write_str("$"),
            Token::DollarDollar => f.write_str("$$"),
            Token::Function => f.write_str("function"),
            Token::Plus => f.write_str("+"),
            Token::Minus => f.write_str("-"),
            Token::Star => f.write_str("*"),
            Token::StarStar => f.write_str("**"),
            Token::Slash => f.write_str("/"),
            Token::Percent => f.write_str("%"),
            Token::Ampersand => f.write_str("&"),
            Token::Eq => f.write_str("="),
            Token::NotEq => f.write_str("!="),
            Token::Lt => f.write_str("<"),
            Token::LtEq => f.write_str("<="),
            Token::Gt => f.write_str(">"),
            Token::GtEq => f.write_str(">="),
            Token::And => f.write_str("and"),
            Token::Or => f.write_str("or"),
            Token::In => f.write_str("in"),
            Token::Chain => f.write_str("~>"),
            Token::ColonEqual => f.write_str(":="),
            Token::Question => f.write_str("?"),
            Token::Colon => f.write_str(":"),
            Token::Dot => f.write_str("."),
            Token::DotDot => f.write_str(".."),
            Token::Comma => f.write_str(","),
            Token::Semicolon => f.write_str(";"),
            Token::LParen => f.write_str("("),
            Token::RParen => f.write_str(")"),
            Token::LBracket => f.write_str("["),
            Token::RBracket => f.write_str("]"),
            Token::LBrace => f.write_str("{"),
            Token::RBrace => f.write_str("}"),
            Token::Error(text) => f.write_str(text),
            Token::Eof => f.write_str("<EOF>"),
        }
    }
}
