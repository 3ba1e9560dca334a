//! Rust source IR for code generation.
//!
//! This module defines the Rust syntax the generator can emit:
//! - RsType: Types (paths, Vec, Option, Box, maps, Result)
//! - RsExpr: Expressions (identifiers, literals, calls, method calls)
//! - RsStmt: Statements in a method body
//! - RsItem / RsTrait / RsImpl / RsFn: Module-level declarations

/// Rust type representation
#[derive(Debug, Clone, PartialEq)]
pub enum RsType {
    /// Named or primitive type: String, i64, Project, chrono::NaiveDate
    Path(String),
    /// Vec<T>
    Vec(Box<RsType>),
    /// Option<T>
    Option(Box<RsType>),
    /// Box<T>
    Boxed(Box<RsType>),
    /// std::collections::HashMap<String, T>
    Map(Box<RsType>),
    /// Result<T, Error>
    Result(Box<RsType>),
    /// ()
    Unit,
    /// &self receiver marker
    SelfRef,
}

impl RsType {
    /// A path type.
    pub fn path(name: impl Into<String>) -> Self {
        RsType::Path(name.into())
    }

    /// `Vec<inner>`
    pub fn vec(inner: RsType) -> Self {
        RsType::Vec(Box::new(inner))
    }

    /// `Option<inner>`
    pub fn option(inner: RsType) -> Self {
        RsType::Option(Box::new(inner))
    }

    /// Whether this is an `Option`.
    pub fn is_option(&self) -> bool {
        matches!(self, RsType::Option(_))
    }
}

/// Rust expression
#[derive(Debug, Clone, PartialEq)]
pub enum RsExpr {
    /// Identifier or path: foo, Self::new
    Ident(String),
    /// String literal: "foo"
    Str(String),
    /// Raw string literal: r#"{"a":1}"#
    RawStr(String),
    /// Integer literal: 42
    Int(i64),
    /// Float literal: 1.0
    Float(f64),
    /// Boolean literal: true
    Bool(bool),
    /// Function call: foo(a, b)
    Call {
        /// Function path.
        callee: String,
        /// Arguments in order.
        args: Vec<RsExpr>,
    },
    /// Method call: recv.method(a, b)
    MethodCall {
        /// Expression the method is called on.
        receiver: Box<RsExpr>,
        /// Method name, possibly with a turbofish.
        method: String,
        /// Arguments in order.
        args: Vec<RsExpr>,
    },
    /// Borrow: &expr
    Ref(Box<RsExpr>),
    /// Dereference: *expr
    Deref(Box<RsExpr>),
    /// Tuple: (a, b)
    Tuple(Vec<RsExpr>),
    /// Macro invocation: vec![a], assert_eq!(a, b)
    Macro {
        /// Macro name without `!`.
        name: String,
        /// Comma-separated arguments.
        args: Vec<RsExpr>,
    },
    /// Inline conditional: if cond { a } else { b }
    IfElse {
        /// Condition.
        cond: Box<RsExpr>,
        /// Value when the condition holds.
        then_expr: Box<RsExpr>,
        /// Value otherwise.
        else_expr: Box<RsExpr>,
    },
    /// Closure: |e| body
    Closure {
        /// Single parameter name.
        param: String,
        /// Body expression.
        body: Box<RsExpr>,
    },
    /// Struct literal: Name { a: x, b: y }
    StructLit {
        /// Struct path.
        name: String,
        /// Field initializers in order.
        fields: Vec<(String, RsExpr)>,
    },
    /// Slice reference literal: &[a, b]
    SliceRef(Vec<RsExpr>),
    /// Raw code that doesn't fit the AST
    Raw(String),
}

impl RsExpr {
    /// An identifier or path.
    pub fn ident(name: impl Into<String>) -> Self {
        RsExpr::Ident(name.into())
    }

    /// A string literal.
    pub fn str(value: impl Into<String>) -> Self {
        RsExpr::Str(value.into())
    }

    /// A function call.
    pub fn call(callee: impl Into<String>, args: Vec<RsExpr>) -> Self {
        RsExpr::Call {
            callee: callee.into(),
            args,
        }
    }

    /// `self.method(args)` on this expression.
    pub fn method(self, method: impl Into<String>, args: Vec<RsExpr>) -> Self {
        RsExpr::MethodCall {
            receiver: Box::new(self),
            method: method.into(),
            args,
        }
    }

    /// `&self`
    pub fn borrow(self) -> Self {
        RsExpr::Ref(Box::new(self))
    }

    /// `*self`
    pub fn deref(self) -> Self {
        RsExpr::Deref(Box::new(self))
    }

    /// A macro invocation.
    pub fn macro_call(name: impl Into<String>, args: Vec<RsExpr>) -> Self {
        RsExpr::Macro {
            name: name.into(),
            args,
        }
    }
}

/// Statement in a function body
#[derive(Debug, Clone, PartialEq)]
pub enum RsStmt {
    /// let [mut] name[: ty] = init;
    Let {
        /// Binding name.
        name: String,
        /// Whether the binding is `mut`.
        mutable: bool,
        /// Explicit type annotation.
        ty: Option<RsType>,
        /// Initializer.
        init: RsExpr,
    },
    /// Expression statement: expr;
    Expr(RsExpr),
    /// Trailing expression without a semicolon
    Tail(RsExpr),
    /// if cond { ... }
    If {
        /// Condition.
        cond: RsExpr,
        /// Statements run when it holds.
        body: Vec<RsStmt>,
    },
    /// if let pattern = expr { ... }
    IfLet {
        /// Pattern text, e.g. `Some(value)`.
        pattern: String,
        /// Scrutinee.
        expr: RsExpr,
        /// Statements run on a match.
        body: Vec<RsStmt>,
    },
}

/// Function parameter
#[derive(Debug, Clone, PartialEq)]
pub struct RsParam {
    /// Parameter name.
    pub name: String,
    /// Parameter type.
    pub ty: RsType,
}

/// Function or method definition
#[derive(Debug, Clone, PartialEq)]
pub struct RsFn {
    /// Function name.
    pub name: String,
    /// Doc comment lines; an empty line renders as a bare `///`.
    pub doc: Vec<String>,
    /// Outer attributes without `#[...]`, e.g. "test"
    pub attrs: Vec<String>,
    /// Whether the function is `pub`.
    pub is_pub: bool,
    /// Takes `&self` as its first parameter
    pub receiver: bool,
    /// Parameters after the receiver.
    pub params: Vec<RsParam>,
    /// Return type; `Unit` omits the arrow.
    pub ret: RsType,
    /// Body statements; empty means a signature-only declaration.
    pub body: Vec<RsStmt>,
}

/// Struct field
#[derive(Debug, Clone, PartialEq)]
pub struct RsField {
    /// Rust field name.
    pub name: String,
    /// Field type.
    pub ty: RsType,
    /// Doc comment.
    pub doc: Option<String>,
    /// `#[serde(...)]` arguments, e.g. `rename = "createdAt"`
    pub serde: Vec<String>,
}

/// Module-level item
#[derive(Debug, Clone, PartialEq)]
pub enum RsItem {
    /// pub type Name = Ty;
    TypeAlias {
        /// Alias name.
        name: String,
        /// Aliased type.
        ty: RsType,
        /// Doc comment.
        doc: Option<String>,
    },
    /// Serde-derived struct
    Struct {
        /// Struct name.
        name: String,
        /// Doc comment.
        doc: Option<String>,
        /// Fields in order.
        fields: Vec<RsField>,
    },
    /// Transparent `Cow<'static, str>` newtype with `as_str` and `From<&'static str>`
    StringNewtype {
        /// Newtype name.
        name: String,
        /// Doc comment.
        doc: Option<String>,
    },
    /// pub const Name: Ty = value;
    Const {
        /// Constant name.
        name: String,
        /// Constant type.
        ty: RsType,
        /// Constant value.
        value: RsExpr,
    },
}

/// Trait with signature-only methods
#[derive(Debug, Clone, PartialEq)]
pub struct RsTrait {
    /// Trait name.
    pub name: String,
    /// Doc comment.
    pub doc: Option<String>,
    /// Method declarations.
    pub methods: Vec<RsFn>,
}

/// impl [Trait for] Target { ... }
#[derive(Debug, Clone, PartialEq)]
pub struct RsImpl {
    /// Implemented trait, if any.
    pub trait_name: Option<String>,
    /// Implementing type.
    pub target: String,
    /// Method definitions.
    pub methods: Vec<RsFn>,
}

/// Top-level declaration of a module
#[derive(Debug, Clone, PartialEq)]
pub enum RsDecl {
    /// Type, alias or constant.
    Item(RsItem),
    /// Trait declaration.
    Trait(RsTrait),
    /// Impl block.
    Impl(RsImpl),
    /// Free function.
    Fn(RsFn),
}

/// Complete Rust source file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RsModule {
    /// Inner doc comment lines (`//!`)
    pub doc: Vec<String>,
    /// Inner attributes without `#![...]`
    pub inner_attrs: Vec<String>,
    /// `use` paths without `use` and `;`
    pub uses: Vec<String>,
    /// Declarations in order.
    pub decls: Vec<RsDecl>,
}
