//! Language-neutral expression tree.
//!
//! The metadata extractor never pattern-matches `syn` expressions
//! directly. Instead, every configuration-procedure body is lowered once
//! into [`ExprNode`] — a small tree of call nodes, literals, and opaque
//! groups — and all vocabulary matching happens over that. The lowering
//! in this module is the only place in the crate that understands `syn`'s
//! expression variants; everything downstream works with node kind,
//! callee name, and argument list.
//!
//! Lowering is purely syntactic. Calls inside `if`/`match` arms, behind
//! `let` bindings, `?`/`.await`, or references are all reachable by the
//! walk; no control-flow reachability analysis is attempted.

use crate::location::SrcSpan;
use std::path::Path;

/// One node of the neutral expression tree.
///
/// Nodes are value types: equality and hashing cover callee names,
/// payloads, and spans, which is what makes lowered trees usable as cache
/// fingerprint material.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ExprNode {
    /// `receiver.method::<T, …>(args…)`. The span points at the method
    /// name itself, which is what diagnostics underline.
    MethodCall {
        receiver: Box<ExprNode>,
        method: String,
        type_args: Vec<String>,
        args: Vec<ExprNode>,
        span: SrcSpan,
    },
    /// `callee(args…)` with a path callee.
    Call {
        callee: String,
        args: Vec<ExprNode>,
        span: SrcSpan,
    },
    /// A string literal argument.
    StrLit { value: String, span: SrcSpan },
    /// A bare path or identifier, e.g. a handler reference.
    Ident { name: String, span: SrcSpan },
    /// Any other construct; `children` holds lowered sub-expressions in
    /// source order. A leaf `Group` with no children is an opaque node.
    Group { children: Vec<ExprNode>, span: SrcSpan },
}

impl ExprNode {
    /// The source region this node is anchored to.
    pub fn span(&self) -> &SrcSpan {
        match self {
            ExprNode::MethodCall { span, .. }
            | ExprNode::Call { span, .. }
            | ExprNode::StrLit { span, .. }
            | ExprNode::Ident { span, .. }
            | ExprNode::Group { span, .. } => span,
        }
    }

    /// Depth-first pre-order walk over every node in the tree, receivers
    /// and arguments included.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a ExprNode)) {
        f(self);
        match self {
            ExprNode::MethodCall { receiver, args, .. } => {
                receiver.walk(f);
                for arg in args {
                    arg.walk(f);
                }
            }
            ExprNode::Call { args, .. } => {
                for arg in args {
                    arg.walk(f);
                }
            }
            ExprNode::Group { children, .. } => {
                for child in children {
                    child.walk(f);
                }
            }
            ExprNode::StrLit { .. } | ExprNode::Ident { .. } => {}
        }
    }

    /// The node's string-literal payload, if it is one.
    pub fn as_str_lit(&self) -> Option<&str> {
        match self {
            ExprNode::StrLit { value, .. } => Some(value.as_str()),
            _ => None,
        }
    }
}

/// Lowers a procedure body into a single root node.
pub fn lower_body(file: &Path, block: &syn::Block) -> ExprNode {
    ExprNode::Group {
        children: lower_stmts(file, &block.stmts),
        span: SrcSpan::of(file, block),
    }
}

fn lower_stmts(file: &Path, stmts: &[syn::Stmt]) -> Vec<ExprNode> {
    let mut nodes = Vec::new();
    for stmt in stmts {
        match stmt {
            syn::Stmt::Local(local) => {
                if let Some(init) = &local.init {
                    nodes.push(lower_expr(file, &init.expr));
                    if let Some((_, else_branch)) = &init.diverge {
                        nodes.push(lower_expr(file, else_branch));
                    }
                }
            }
            syn::Stmt::Expr(expr, _) => nodes.push(lower_expr(file, expr)),
            // Nested items and statement macros are opaque to extraction.
            syn::Stmt::Item(_) | syn::Stmt::Macro(_) => {}
        }
    }
    nodes
}

/// Lowers one `syn` expression. Wrappers that add no structure of their
/// own (`(…)`, `&…`, `….await`, `…?`, casts) are lowered transparently so
/// a chained call keeps its shape through them.
pub fn lower_expr(file: &Path, expr: &syn::Expr) -> ExprNode {
    use syn::Expr;

    match expr {
        Expr::MethodCall(m) => ExprNode::MethodCall {
            receiver: Box::new(lower_expr(file, &m.receiver)),
            method: m.method.to_string(),
            type_args: m
                .turbofish
                .as_ref()
                .map(|t| {
                    t.args
                        .iter()
                        .filter_map(|arg| match arg {
                            syn::GenericArgument::Type(ty) => Some(type_key(ty)),
                            _ => None,
                        })
                        .collect()
                })
                .unwrap_or_default(),
            args: m.args.iter().map(|a| lower_expr(file, a)).collect(),
            span: SrcSpan::of(file, &m.method),
        },
        Expr::Call(c) => {
            let (callee, span) = match c.func.as_ref() {
                Expr::Path(p) => (path_text(&p.path), SrcSpan::of(file, &p.path)),
                other => ("<expr>".to_string(), SrcSpan::of(file, other)),
            };
            ExprNode::Call {
                callee,
                args: c.args.iter().map(|a| lower_expr(file, a)).collect(),
                span,
            }
        }
        Expr::Lit(l) => match &l.lit {
            syn::Lit::Str(s) => ExprNode::StrLit {
                value: s.value(),
                span: SrcSpan::of(file, l),
            },
            _ => opaque(file, expr),
        },
        Expr::Path(p) => ExprNode::Ident {
            name: path_text(&p.path),
            span: SrcSpan::of(file, p),
        },

        // Transparent wrappers.
        Expr::Paren(e) => lower_expr(file, &e.expr),
        Expr::Group(e) => lower_expr(file, &e.expr),
        Expr::Reference(e) => lower_expr(file, &e.expr),
        Expr::Await(e) => lower_expr(file, &e.base),
        Expr::Try(e) => lower_expr(file, &e.expr),
        Expr::Cast(e) => lower_expr(file, &e.expr),
        Expr::Unary(e) => lower_expr(file, &e.expr),

        // Structured containers: keep children reachable.
        Expr::Block(e) => ExprNode::Group {
            children: lower_stmts(file, &e.block.stmts),
            span: SrcSpan::of(file, e),
        },
        Expr::Async(e) => ExprNode::Group {
            children: lower_stmts(file, &e.block.stmts),
            span: SrcSpan::of(file, e),
        },
        Expr::Unsafe(e) => ExprNode::Group {
            children: lower_stmts(file, &e.block.stmts),
            span: SrcSpan::of(file, e),
        },
        Expr::If(e) => {
            let mut children = vec![lower_expr(file, &e.cond)];
            children.extend(lower_stmts(file, &e.then_branch.stmts));
            if let Some((_, else_branch)) = &e.else_branch {
                children.push(lower_expr(file, else_branch));
            }
            ExprNode::Group {
                children,
                span: SrcSpan::of(file, e),
            }
        }
        Expr::Match(e) => {
            let mut children = vec![lower_expr(file, &e.expr)];
            children.extend(e.arms.iter().map(|arm| lower_expr(file, &arm.body)));
            ExprNode::Group {
                children,
                span: SrcSpan::of(file, e),
            }
        }
        Expr::Closure(e) => ExprNode::Group {
            children: vec![lower_expr(file, &e.body)],
            span: SrcSpan::of(file, e),
        },
        Expr::Assign(e) => ExprNode::Group {
            children: vec![lower_expr(file, &e.left), lower_expr(file, &e.right)],
            span: SrcSpan::of(file, e),
        },
        Expr::Binary(e) => ExprNode::Group {
            children: vec![lower_expr(file, &e.left), lower_expr(file, &e.right)],
            span: SrcSpan::of(file, e),
        },
        Expr::Field(e) => ExprNode::Group {
            children: vec![lower_expr(file, &e.base)],
            span: SrcSpan::of(file, e),
        },
        Expr::Index(e) => ExprNode::Group {
            children: vec![lower_expr(file, &e.expr), lower_expr(file, &e.index)],
            span: SrcSpan::of(file, e),
        },
        Expr::Tuple(e) => ExprNode::Group {
            children: e.elems.iter().map(|el| lower_expr(file, el)).collect(),
            span: SrcSpan::of(file, e),
        },
        Expr::Array(e) => ExprNode::Group {
            children: e.elems.iter().map(|el| lower_expr(file, el)).collect(),
            span: SrcSpan::of(file, e),
        },
        Expr::Struct(e) => ExprNode::Group {
            children: e
                .fields
                .iter()
                .map(|field| lower_expr(file, &field.expr))
                .collect(),
            span: SrcSpan::of(file, e),
        },
        Expr::Return(e) => ExprNode::Group {
            children: e
                .expr
                .as_ref()
                .map(|inner| vec![lower_expr(file, inner)])
                .unwrap_or_default(),
            span: SrcSpan::of(file, e),
        },
        Expr::Break(e) => ExprNode::Group {
            children: e
                .expr
                .as_ref()
                .map(|inner| vec![lower_expr(file, inner)])
                .unwrap_or_default(),
            span: SrcSpan::of(file, e),
        },
        Expr::Let(e) => ExprNode::Group {
            children: vec![lower_expr(file, &e.expr)],
            span: SrcSpan::of(file, e),
        },
        Expr::ForLoop(e) => {
            let mut children = vec![lower_expr(file, &e.expr)];
            children.extend(lower_stmts(file, &e.body.stmts));
            ExprNode::Group {
                children,
                span: SrcSpan::of(file, e),
            }
        }
        Expr::While(e) => {
            let mut children = vec![lower_expr(file, &e.cond)];
            children.extend(lower_stmts(file, &e.body.stmts));
            ExprNode::Group {
                children,
                span: SrcSpan::of(file, e),
            }
        }
        Expr::Loop(e) => ExprNode::Group {
            children: lower_stmts(file, &e.body.stmts),
            span: SrcSpan::of(file, e),
        },
        Expr::Range(e) => {
            let mut children = Vec::new();
            if let Some(start) = &e.start {
                children.push(lower_expr(file, start));
            }
            if let Some(end) = &e.end {
                children.push(lower_expr(file, end));
            }
            ExprNode::Group {
                children,
                span: SrcSpan::of(file, e),
            }
        }

        // Macros, verbatim tokens, and anything else are opaque leaves.
        _ => opaque(file, expr),
    }
}

fn opaque(file: &Path, expr: &syn::Expr) -> ExprNode {
    ExprNode::Group {
        children: Vec::new(),
        span: SrcSpan::of(file, expr),
    }
}

/// Renders a path as written, segments joined with `::`, keeping any
/// generic arguments on the final segment.
pub fn path_text(path: &syn::Path) -> String {
    let mut out = String::new();
    for (i, segment) in path.segments.iter().enumerate() {
        if i > 0 {
            out.push_str("::");
        }
        out.push_str(&segment.ident.to_string());
        if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
            out.push('<');
            let mut first = true;
            for arg in &args.args {
                if let syn::GenericArgument::Type(ty) = arg {
                    if !first {
                        out.push_str(", ");
                    }
                    out.push_str(&type_key(ty));
                    first = false;
                }
            }
            out.push('>');
        }
    }
    out
}

/// Canonical comparison key for a written type: the terminal path segment
/// with generic arguments rendered recursively. `users::CreateUser` and
/// `CreateUser` share the key `CreateUser`; `Paged<User>` keys as
/// `Paged<User>`. The unit type keys as `()`, which the pipeline treats
/// as "no type".
pub fn type_key(ty: &syn::Type) -> String {
    match ty {
        syn::Type::Path(p) => {
            let segment = match p.path.segments.last() {
                Some(s) => s,
                None => return "_".to_string(),
            };
            let mut out = segment.ident.to_string();
            if let syn::PathArguments::AngleBracketed(args) = &segment.arguments {
                out.push('<');
                let mut first = true;
                for arg in &args.args {
                    if let syn::GenericArgument::Type(inner) = arg {
                        if !first {
                            out.push_str(", ");
                        }
                        out.push_str(&type_key(inner));
                        first = false;
                    }
                }
                out.push('>');
            }
            out
        }
        syn::Type::Reference(r) => type_key(&r.elem),
        syn::Type::Paren(p) => type_key(&p.elem),
        syn::Type::Tuple(t) if t.elems.is_empty() => "()".to_string(),
        _ => "_".to_string(),
    }
}
