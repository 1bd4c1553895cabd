//! # Mapping Expressions - Abstract Syntax Tree
//!
//! This module defines the Abstract Syntax Tree (AST) for the mapping expression
//! language, a JSONata-family dialect for reading values out of JSON documents
//! and building new ones.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[expressions]** - Expression nodes (literals, paths, operations, constructors)
//! - **[operators]** - Binary and unary operators
//!
//! ## Quick Start
//!
//! ```text
//! $state.orders[total > 100].{"id": id, "customer": $uppercase(customer)}
//! ```
//!
//! This expression selects the large orders from the `$state` scope and builds
//! one object per order.
//!
//! ## Core Concepts
//!
//! ### Contexts and Scopes
//!
//! - `$$` - the root document given to the evaluation
//! - `$` - the current navigation focus (the root at the top level)
//! - `$state`, `$event`, `$instance` - named scopes resolved from the root
//! - bare names (`orders.total`) navigate from the current focus
//!
//! ### Sequences
//!
//! A path step applied to an array applies to every element. Results are
//! flattened into one sequence: an empty sequence is "no value", a single item
//! is returned as itself and several items become an array.
//!
//! ### No Value vs. Null
//!
//! Navigating to a member that does not exist produces no value at all, which
//! is different from a JSON `null` stored in the document.
//!
//! ## Examples
//!
//! ### Arithmetic and Grouping
//!
//! ```text
//! (1 + 2) * 3
//! ```
//!
//! ### Predicates
//!
//! ```text
//! $event.readings[value > 20][-1]
//! ```
//!
//! ### Function Chaining
//!
//! ```text
//! $state.name ~> $trim ~> $uppercase
//! ```
//!
//! ### Blocks and Lambdas
//!
//! ```text
//! ($double := function($x) { $x * 2 }; $double($event.count))
//! ```
pub mod tokens;
pub mod expressions;
pub mod operators;

pub use tokens::Token;
pub use expressions::{Expr, Node, Step};
pub use operators::{BinOp, UnaryOp};
