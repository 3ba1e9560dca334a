//! Rust code emission via the Emit trait.
//!
//! This module provides a trait-based approach to converting Rust IR nodes
//! to source text. Each IR type implements `Emit` for clean, composable
//! code generation. Indentation is four spaces per level.

use super::types::{
    RsDecl, RsExpr, RsField, RsFn, RsImpl, RsItem, RsModule, RsStmt, RsTrait, RsType,
};
use super::utils::{escape_rust_string, raw_string_literal};

/// Trait for emitting Rust code from IR nodes.
pub trait Emit {
    /// Convert the IR node to its Rust source representation.
    fn emit(&self) -> String;
}

const INDENT: &str = "    ";

fn push_doc(output: &mut String, prefix: &str, doc: &str) {
    if doc.trim().is_empty() {
        output.push_str(&format!("{prefix}///\n"));
        return;
    }
    for line in doc.trim().lines() {
        let line = line.trim_end();
        if line.is_empty() {
            output.push_str(&format!("{prefix}///\n"));
        } else {
            output.push_str(&format!("{prefix}/// {line}\n"));
        }
    }
}

fn join(exprs: &[RsExpr]) -> String {
    exprs.iter().map(Emit::emit).collect::<Vec<_>>().join(", ")
}

// =============================================================================
// Types
// =============================================================================

impl Emit for RsType {
    fn emit(&self) -> String {
        match self {
            RsType::Path(name) => name.clone(),
            RsType::Vec(inner) => format!("Vec<{}>", inner.emit()),
            RsType::Option(inner) => format!("Option<{}>", inner.emit()),
            RsType::Boxed(inner) => format!("Box<{}>", inner.emit()),
            RsType::Map(inner) => format!("std::collections::HashMap<String, {}>", inner.emit()),
            RsType::Result(inner) => format!("Result<{}, Error>", inner.emit()),
            RsType::Unit => "()".to_string(),
            RsType::SelfRef => "&self".to_string(),
        }
    }
}

// =============================================================================
// Expressions
// =============================================================================

impl Emit for RsExpr {
    fn emit(&self) -> String {
        match self {
            RsExpr::Ident(name) => name.clone(),
            RsExpr::Str(value) => format!("\"{}\"", escape_rust_string(value)),
            RsExpr::RawStr(value) => raw_string_literal(value),
            RsExpr::Int(n) => n.to_string(),
            RsExpr::Float(f) => emit_float(*f),
            RsExpr::Bool(b) => b.to_string(),
            RsExpr::Call { callee, args } => format!("{callee}({})", join(args)),
            RsExpr::MethodCall {
                receiver,
                method,
                args,
            } => {
                let recv = receiver.emit();
                if needs_parens(receiver) {
                    format!("({recv}).{method}({})", join(args))
                } else {
                    format!("{recv}.{method}({})", join(args))
                }
            }
            RsExpr::Ref(inner) => format!("&{}", inner.emit()),
            RsExpr::Deref(inner) => format!("*{}", inner.emit()),
            RsExpr::Tuple(items) => format!("({})", join(items)),
            RsExpr::Macro { name, args } if name == "vec" => format!("vec![{}]", join(args)),
            RsExpr::Macro { name, args } => format!("{name}!({})", join(args)),
            RsExpr::IfElse {
                cond,
                then_expr,
                else_expr,
            } => format!(
                "if {} {{ {} }} else {{ {} }}",
                cond.emit(),
                then_expr.emit(),
                else_expr.emit()
            ),
            RsExpr::Closure { param, body } => format!("|{param}| {}", body.emit()),
            RsExpr::StructLit { name, fields } => {
                let parts: Vec<_> = fields
                    .iter()
                    .map(|(field, value)| format!("{field}: {}", value.emit()))
                    .collect();
                format!("{name} {{ {} }}", parts.join(", "))
            }
            RsExpr::SliceRef(items) => {
                if items.is_empty() {
                    "&[]".to_string()
                } else {
                    let mut output = "&[\n".to_string();
                    for item in items {
                        output.push_str(&format!("{INDENT}{},\n", item.emit()));
                    }
                    output.push(']');
                    output
                }
            }
            RsExpr::Raw(code) => code.clone(),
        }
    }
}

fn needs_parens(expr: &RsExpr) -> bool {
    matches!(
        expr,
        RsExpr::Ref(_) | RsExpr::Deref(_) | RsExpr::IfElse { .. } | RsExpr::Closure { .. }
    )
}

fn emit_float(f: f64) -> String {
    if f.is_nan() {
        return "f64::NAN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "f64::INFINITY" } else { "f64::NEG_INFINITY" }.to_string();
    }
    let text = f.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{text}.0")
    }
}

// =============================================================================
// Statements
// =============================================================================

impl Emit for RsStmt {
    fn emit(&self) -> String {
        self.emit_indented(2)
    }
}

impl RsStmt {
    /// Emit with specified indentation level (4 spaces per level)
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        match self {
            RsStmt::Let {
                name,
                mutable,
                ty,
                init,
            } => {
                let mut_str = if *mutable { "mut " } else { "" };
                let ty_str = ty.as_ref().map(|t| format!(": {}", t.emit())).unwrap_or_default();
                format!("{prefix}let {mut_str}{name}{ty_str} = {};\n", init.emit())
            }
            RsStmt::Expr(expr) => format!("{prefix}{};\n", expr.emit()),
            RsStmt::Tail(expr) => format!("{prefix}{}\n", expr.emit()),
            RsStmt::If { cond, body } => {
                let mut output = format!("{prefix}if {} {{\n", cond.emit());
                for stmt in body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
            RsStmt::IfLet {
                pattern,
                expr,
                body,
            } => {
                let mut output = format!("{prefix}if let {pattern} = {} {{\n", expr.emit());
                for stmt in body {
                    output.push_str(&stmt.emit_indented(indent + 1));
                }
                output.push_str(&format!("{prefix}}}\n"));
                output
            }
        }
    }
}

// =============================================================================
// Functions
// =============================================================================

impl RsFn {
    /// `fn name(&self, a: T) -> R` without a body.
    pub fn signature(&self) -> String {
        let mut params: Vec<String> = Vec::with_capacity(self.params.len() + 1);
        if self.receiver {
            params.push(RsType::SelfRef.emit());
        }
        params.extend(
            self.params
                .iter()
                .map(|p| format!("{}: {}", p.name, p.ty.emit())),
        );
        let ret = match &self.ret {
            RsType::Unit => String::new(),
            other => format!(" -> {}", other.emit()),
        };
        let vis = if self.is_pub { "pub " } else { "" };
        format!("{vis}fn {}({}){ret}", self.name, params.join(", "))
    }

    fn emit_header(&self, prefix: &str) -> String {
        let mut output = String::new();
        for line in &self.doc {
            push_doc(&mut output, prefix, line);
        }
        for attr in &self.attrs {
            output.push_str(&format!("{prefix}#[{attr}]\n"));
        }
        output
    }

    /// Emit the full definition at the given indentation level.
    pub fn emit_indented(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        let mut output = self.emit_header(&prefix);
        output.push_str(&format!("{prefix}{} {{\n", self.signature()));
        for stmt in &self.body {
            output.push_str(&stmt.emit_indented(indent + 1));
        }
        output.push_str(&format!("{prefix}}}\n"));
        output
    }

    /// Emit a trait method declaration at the given indentation level.
    pub fn emit_declaration(&self, indent: usize) -> String {
        let prefix = INDENT.repeat(indent);
        let mut output = self.emit_header(&prefix);
        output.push_str(&format!("{prefix}{};\n", self.signature()));
        output
    }
}

impl Emit for RsFn {
    fn emit(&self) -> String {
        self.emit_indented(0)
    }
}

// =============================================================================
// Items
// =============================================================================

impl Emit for RsField {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(doc) = &self.doc {
            push_doc(&mut output, INDENT, doc);
        }
        if !self.serde.is_empty() {
            output.push_str(&format!("{INDENT}#[serde({})]\n", self.serde.join(", ")));
        }
        output.push_str(&format!("{INDENT}pub {}: {},\n", self.name, self.ty.emit()));
        output
    }
}

impl Emit for RsItem {
    fn emit(&self) -> String {
        let mut output = String::new();
        match self {
            RsItem::TypeAlias { name, ty, doc } => {
                if let Some(doc) = doc {
                    push_doc(&mut output, "", doc);
                }
                output.push_str(&format!("pub type {name} = {};\n", ty.emit()));
            }
            RsItem::Struct { name, doc, fields } => {
                if let Some(doc) = doc {
                    push_doc(&mut output, "", doc);
                }
                output.push_str(
                    "#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]\n",
                );
                output.push_str("#[serde(default)]\n");
                output.push_str(&format!("pub struct {name} {{\n"));
                for field in fields {
                    output.push_str(&field.emit());
                }
                output.push_str("}\n");
            }
            RsItem::StringNewtype { name, doc } => {
                if let Some(doc) = doc {
                    push_doc(&mut output, "", doc);
                }
                output.push_str(
                    "#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]\n",
                );
                output.push_str("#[serde(transparent)]\n");
                output.push_str(&format!(
                    "pub struct {name}(pub std::borrow::Cow<'static, str>);\n\n"
                ));
                output.push_str(&format!("impl {name} {{\n"));
                output.push_str(&format!("{INDENT}pub fn as_str(&self) -> &str {{\n"));
                output.push_str(&format!("{INDENT}{INDENT}&self.0\n"));
                output.push_str(&format!("{INDENT}}}\n"));
                output.push_str("}\n\n");
                output.push_str(&format!("impl From<&'static str> for {name} {{\n"));
                output.push_str(&format!("{INDENT}fn from(value: &'static str) -> Self {{\n"));
                output.push_str(&format!(
                    "{INDENT}{INDENT}Self(std::borrow::Cow::Borrowed(value))\n"
                ));
                output.push_str(&format!("{INDENT}}}\n"));
                output.push_str("}\n");
            }
            RsItem::Const { name, ty, value } => {
                output.push_str(&format!("pub const {name}: {} = {};\n", ty.emit(), value.emit()));
            }
        }
        output
    }
}

impl Emit for RsTrait {
    fn emit(&self) -> String {
        let mut output = String::new();
        if let Some(doc) = &self.doc {
            push_doc(&mut output, "", doc);
        }
        output.push_str(&format!("pub trait {} {{\n", self.name));
        let methods: Vec<_> = self.methods.iter().map(|m| m.emit_declaration(1)).collect();
        output.push_str(&methods.join("\n"));
        output.push_str("}\n");
        output
    }
}

impl Emit for RsImpl {
    fn emit(&self) -> String {
        let mut output = match &self.trait_name {
            Some(trait_name) => format!("impl {trait_name} for {} {{\n", self.target),
            None => format!("impl {} {{\n", self.target),
        };
        let methods: Vec<_> = self.methods.iter().map(|m| m.emit_indented(1)).collect();
        output.push_str(&methods.join("\n"));
        output.push_str("}\n");
        output
    }
}

impl Emit for RsDecl {
    fn emit(&self) -> String {
        match self {
            RsDecl::Item(item) => item.emit(),
            RsDecl::Trait(t) => t.emit(),
            RsDecl::Impl(i) => i.emit(),
            RsDecl::Fn(f) => f.emit(),
        }
    }
}

// =============================================================================
// Module
// =============================================================================

impl Emit for RsModule {
    fn emit(&self) -> String {
        let mut output = String::new();

        for line in &self.doc {
            output.push_str(&format!("//! {line}\n").replace("//! \n", "//!\n"));
        }
        if !self.doc.is_empty() {
            output.push('\n');
        }

        for attr in &self.inner_attrs {
            output.push_str(&format!("#![{attr}]\n"));
        }
        if !self.inner_attrs.is_empty() {
            output.push('\n');
        }

        for path in &self.uses {
            output.push_str(&format!("use {path};\n"));
        }
        if !self.uses.is_empty() {
            output.push('\n');
        }

        let decls: Vec<_> = self.decls.iter().map(Emit::emit).collect();
        output.push_str(&decls.join("\n"));
        output
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::openapi::ir::types::RsParam;

    #[test]
    fn test_emit_types() {
        assert_eq!(RsType::path("String").emit(), "String");
        assert_eq!(RsType::vec(RsType::path("i64")).emit(), "Vec<i64>");
        assert_eq!(
            RsType::option(RsType::Boxed(Box::new(RsType::path("Node")))).emit(),
            "Option<Box<Node>>"
        );
        assert_eq!(
            RsType::Map(Box::new(RsType::path("serde_json::Value"))).emit(),
            "std::collections::HashMap<String, serde_json::Value>"
        );
        assert_eq!(
            RsType::Result(Box::new(RsType::Unit)).emit(),
            "Result<(), Error>"
        );
    }

    #[test]
    fn test_emit_literals() {
        assert_eq!(RsExpr::str("say \"hi\"").emit(), "\"say \\\"hi\\\"\"");
        assert_eq!(RsExpr::Int(-3).emit(), "-3");
        assert_eq!(RsExpr::Float(1.0).emit(), "1.0");
        assert_eq!(RsExpr::Float(0.25).emit(), "0.25");
        assert_eq!(RsExpr::Bool(true).emit(), "true");
        assert_eq!(RsExpr::RawStr("{}".into()).emit(), "r#\"{}\"#");
    }

    #[test]
    fn test_emit_method_call_parenthesizes() {
        let bool_str = RsExpr::IfElse {
            cond: Box::new(RsExpr::ident("v")),
            then_expr: Box::new(RsExpr::str("true")),
            else_expr: Box::new(RsExpr::str("false")),
        };
        assert_eq!(
            bool_str.clone().emit(),
            "if v { \"true\" } else { \"false\" }"
        );
        assert_eq!(
            bool_str.method("to_string", vec![]).emit(),
            "(if v { \"true\" } else { \"false\" }).to_string()"
        );
        assert_eq!(
            RsExpr::ident("limit").method("to_string", vec![]).emit(),
            "limit.to_string()"
        );
    }

    #[test]
    fn test_emit_macros_and_closures() {
        assert_eq!(
            RsExpr::macro_call("vec", vec![RsExpr::Int(1)]).emit(),
            "vec![1]"
        );
        assert_eq!(
            RsExpr::macro_call("assert_eq", vec![RsExpr::ident("a"), RsExpr::ident("b")]).emit(),
            "assert_eq!(a, b)"
        );
        let closure = RsExpr::Closure {
            param: "e".into(),
            body: Box::new(RsExpr::ident("e").method("to_string", vec![])),
        };
        assert_eq!(closure.emit(), "|e| e.to_string()");
    }

    #[test]
    fn test_emit_statements() {
        let stmt = RsStmt::Let {
            name: "query".into(),
            mutable: true,
            ty: Some(RsType::vec(RsType::path("(&str, String)"))),
            init: RsExpr::call("Vec::new", vec![]),
        };
        assert_eq!(
            stmt.emit_indented(0),
            "let mut query: Vec<(&str, String)> = Vec::new();\n"
        );

        let guard = RsStmt::IfLet {
            pattern: "Some(v)".into(),
            expr: RsExpr::ident("limit"),
            body: vec![RsStmt::Expr(RsExpr::ident("query").method(
                "push",
                vec![RsExpr::Tuple(vec![
                    RsExpr::str("limit"),
                    RsExpr::ident("v").method("to_string", vec![]),
                ])],
            ))],
        };
        assert_eq!(
            guard.emit_indented(1),
            "    if let Some(v) = limit {\n        query.push((\"limit\", v.to_string()));\n    }\n"
        );
    }

    #[test]
    fn test_emit_function_and_declaration() {
        let func = RsFn {
            name: "get_project".into(),
            doc: vec!["Fetch one project.".into()],
            attrs: vec![],
            is_pub: false,
            receiver: true,
            params: vec![RsParam {
                name: "project_id".into(),
                ty: RsType::path("String"),
            }],
            ret: RsType::Result(Box::new(RsType::path("Project"))),
            body: vec![RsStmt::Tail(RsExpr::Raw("todo_body()".into()))],
        };
        assert_eq!(
            func.signature(),
            "fn get_project(&self, project_id: String) -> Result<Project, Error>"
        );
        assert_eq!(
            func.emit_declaration(1),
            "    /// Fetch one project.\n    fn get_project(&self, project_id: String) -> Result<Project, Error>;\n"
        );
        assert_eq!(
            func.emit_indented(0),
            "/// Fetch one project.\nfn get_project(&self, project_id: String) -> Result<Project, Error> {\n    todo_body()\n}\n"
        );
    }

    #[test]
    fn test_emit_struct() {
        let item = RsItem::Struct {
            name: "Project".into(),
            doc: Some("A project.".into()),
            fields: vec![
                RsField {
                    name: "created_at".into(),
                    ty: RsType::option(RsType::path("chrono::DateTime<chrono::Utc>")),
                    doc: None,
                    serde: vec![
                        "rename = \"createdAt\"".into(),
                        "default, skip_serializing_if = \"Option::is_none\"".into(),
                    ],
                },
                RsField {
                    name: "id".into(),
                    ty: RsType::path("String"),
                    doc: Some("Identifier.".into()),
                    serde: vec![],
                },
            ],
        };
        let expected = "/// A project.\n\
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]\n\
#[serde(default)]\n\
pub struct Project {\n\
\x20   #[serde(rename = \"createdAt\", default, skip_serializing_if = \"Option::is_none\")]\n\
\x20   pub created_at: Option<chrono::DateTime<chrono::Utc>>,\n\
\x20   /// Identifier.\n\
\x20   pub id: String,\n\
}\n";
        assert_eq!(item.emit(), expected);
    }

    #[test]
    fn test_emit_alias_and_const() {
        let alias = RsItem::TypeAlias {
            name: "ProjectID".into(),
            ty: RsType::path("String"),
            doc: Some("Project identifier.\n\nOpaque.".into()),
        };
        assert_eq!(
            alias.emit(),
            "/// Project identifier.\n///\n/// Opaque.\npub type ProjectID = String;\n"
        );
        let constant = RsItem::Const {
            name: "CodeOne".into(),
            ty: RsType::path("Code"),
            value: RsExpr::Int(1),
        };
        assert_eq!(constant.emit(), "pub const CodeOne: Code = 1;\n");
    }

    #[test]
    fn test_emit_string_newtype() {
        let item = RsItem::StringNewtype {
            name: "EndpointState".into(),
            doc: None,
        };
        let code = item.emit();
        println!("{code}");
        assert!(code.contains("#[serde(transparent)]\npub struct EndpointState(pub std::borrow::Cow<'static, str>);"));
        assert!(code.contains("pub fn as_str(&self) -> &str {"));
        assert!(code.contains("impl From<&'static str> for EndpointState {"));
    }

    #[test]
    fn test_emit_slice_ref() {
        let expr = RsExpr::SliceRef(vec![RsExpr::StructLit {
            name: "Fixture".into(),
            fields: vec![
                ("route".into(), RsExpr::str("/projects")),
                ("status".into(), RsExpr::Int(200)),
            ],
        }]);
        assert_eq!(
            expr.emit(),
            "&[\n    Fixture { route: \"/projects\", status: 200 },\n]"
        );
        assert_eq!(RsExpr::SliceRef(vec![]).emit(), "&[]");
    }

    #[test]
    fn test_emit_module() {
        let module = RsModule {
            doc: vec!["Generated.".into(), String::new()],
            inner_attrs: vec!["allow(non_upper_case_globals)".into()],
            uses: vec!["crate::error::Error".into()],
            decls: vec![RsDecl::Item(RsItem::TypeAlias {
                name: "A".into(),
                ty: RsType::Unit,
                doc: None,
            })],
        };
        assert_eq!(
            module.emit(),
            "//! Generated.\n//!\n\n#![allow(non_upper_case_globals)]\n\nuse crate::error::Error;\n\npub type A = ();\n"
        );
    }
}
