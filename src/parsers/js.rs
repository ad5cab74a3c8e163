//! JS/TS parsing and lowering.
//!
//! Files are parsed with swc in TSX mode, which accepts plain JS, JSX, TS
//! and TSX alike. The swc AST is then lowered into the extraction node
//! tree: statements and expressions that can carry translation calls or
//! annotated literals are mapped to their node kinds, everything else
//! becomes an `Other` node whose children are still visited.
//!
//! Leading comments are resolved through the swc comment map at each
//! node's start position; when several comments precede a node the
//! closest one wins.

use anyhow::{Result, anyhow};
use swc_common::comments::{Comments, SingleThreadedComments};
use swc_common::{BytePos, FileName, SourceMap, Span, Spanned};
use swc_ecma_ast::{
    ArrowExpr, BlockStmt, BlockStmtOrExpr, Callee, Class, ClassMember, Decl, DefaultDecl, Expr,
    JSXAttrOrSpread, JSXAttrValue, JSXElement, JSXElementChild, JSXExpr, JSXFragment, Lit,
    MemberProp, Module, ModuleDecl, ModuleItem, ObjectLit, OptChainBase, Prop, PropName,
    PropOrSpread, Stmt, VarDecl,
};
use swc_ecma_parser::{Parser, StringInput, Syntax, TsSyntax};

use crate::syntax::{ArrayEntry, Node};

/// Parse a source file and lower it to extraction nodes.
pub fn parse_source(code: String, file_path: &str) -> Result<Vec<Node>> {
    let source_map = SourceMap::default();
    let source_file = source_map.new_source_file(FileName::Real(file_path.into()).into(), code);

    let syntax = Syntax::Typescript(TsSyntax {
        tsx: true,
        ..Default::default()
    });
    let comments = SingleThreadedComments::default();
    let mut parser = Parser::new(syntax, StringInput::from(&*source_file), Some(&comments));
    let module = parser
        .parse_module()
        .map_err(|e| anyhow!("failed to parse {file_path}: {:?}", e))?;

    let lowerer = Lowerer {
        source_map: &source_map,
        comments: &comments,
    };
    Ok(lowerer.lower_module(&module))
}

struct Lowerer<'a> {
    source_map: &'a SourceMap,
    comments: &'a SingleThreadedComments,
}

impl Lowerer<'_> {
    fn lower_module(&self, module: &Module) -> Vec<Node> {
        module
            .body
            .iter()
            .map(|item| match item {
                ModuleItem::Stmt(stmt) => self.lower_stmt(stmt),
                ModuleItem::ModuleDecl(decl) => self.lower_module_decl(decl),
            })
            .collect()
    }

    fn lower_module_decl(&self, decl: &ModuleDecl) -> Node {
        match decl {
            // The comment above `export const ...` attaches to the export
            // keyword, so the export span is the comment anchor.
            ModuleDecl::ExportDecl(export) => self.lower_decl(&export.decl, export.span),
            ModuleDecl::ExportDefaultExpr(export) => {
                let inner = self.lower_expr(&export.expr);
                self.finish(Node::expr(inner, self.line(export.span)), export.span)
            }
            ModuleDecl::ExportDefaultDecl(export) => {
                let children = match &export.decl {
                    DefaultDecl::Fn(f) => self.lower_fn_body(f.function.body.as_ref()),
                    DefaultDecl::Class(c) => self.lower_class_body(&c.class),
                    DefaultDecl::TsInterfaceDecl(_) => Vec::new(),
                };
                self.finish(
                    Node::other("export declaration", children, self.line(export.span)),
                    export.span,
                )
            }
            _ => self.finish(
                Node::other("module declaration", Vec::new(), self.line(decl.span())),
                decl.span(),
            ),
        }
    }

    fn lower_stmt(&self, stmt: &Stmt) -> Node {
        match stmt {
            Stmt::Expr(expr_stmt) => {
                let inner = self.lower_expr(&expr_stmt.expr);
                self.finish(Node::expr(inner, self.line(expr_stmt.span)), expr_stmt.span)
            }
            Stmt::Decl(decl) => self.lower_decl(decl, decl.span()),
            Stmt::Return(ret) => match &ret.arg {
                Some(arg) => {
                    let inner = self.lower_expr(arg);
                    self.finish(Node::expr(inner, self.line(ret.span)), ret.span)
                }
                None => self.finish(
                    Node::other("return statement", Vec::new(), self.line(ret.span)),
                    ret.span,
                ),
            },
            Stmt::Throw(throw) => {
                let inner = self.lower_expr(&throw.arg);
                self.finish(Node::expr(inner, self.line(throw.span)), throw.span)
            }
            Stmt::Block(block) => self.other_with_stmts("block statement", &block.stmts, block.span),
            Stmt::If(if_stmt) => {
                let mut children = vec![self.lower_expr(&if_stmt.test)];
                children.push(self.lower_stmt(&if_stmt.cons));
                if let Some(alt) = &if_stmt.alt {
                    children.push(self.lower_stmt(alt));
                }
                self.finish(
                    Node::other("if statement", children, self.line(if_stmt.span)),
                    if_stmt.span,
                )
            }
            Stmt::Switch(switch) => {
                let mut children = vec![self.lower_expr(&switch.discriminant)];
                for case in &switch.cases {
                    children.extend(case.cons.iter().map(|s| self.lower_stmt(s)));
                }
                self.finish(
                    Node::other("switch statement", children, self.line(switch.span)),
                    switch.span,
                )
            }
            Stmt::Try(try_stmt) => {
                let mut children = self.lower_block(&try_stmt.block);
                if let Some(handler) = &try_stmt.handler {
                    children.extend(self.lower_block(&handler.body));
                }
                if let Some(finalizer) = &try_stmt.finalizer {
                    children.extend(self.lower_block(finalizer));
                }
                self.finish(
                    Node::other("try statement", children, self.line(try_stmt.span)),
                    try_stmt.span,
                )
            }
            Stmt::While(w) => self.loop_node(&w.body, w.span),
            Stmt::DoWhile(w) => self.loop_node(&w.body, w.span),
            Stmt::For(f) => self.loop_node(&f.body, f.span),
            Stmt::ForIn(f) => self.loop_node(&f.body, f.span),
            Stmt::ForOf(f) => self.loop_node(&f.body, f.span),
            _ => self.finish(
                Node::other("statement", Vec::new(), self.line(stmt.span())),
                stmt.span(),
            ),
        }
    }

    fn lower_decl(&self, decl: &Decl, comment_span: Span) -> Node {
        match decl {
            Decl::Var(var) => self.lower_var_decl(var, comment_span),
            Decl::Fn(f) => self.finish(
                Node::other(
                    "function declaration",
                    self.lower_fn_body(f.function.body.as_ref()),
                    self.line(comment_span),
                ),
                comment_span,
            ),
            Decl::Class(c) => self.finish(
                Node::other(
                    "class declaration",
                    self.lower_class_body(&c.class),
                    self.line(comment_span),
                ),
                comment_span,
            ),
            _ => self.finish(
                Node::other("declaration", Vec::new(), self.line(comment_span)),
                comment_span,
            ),
        }
    }

    /// A single-declarator `const x = init` becomes a value wrapper around
    /// the initializer, with the declaration's own comment, so a directive
    /// above the declaration reaches the literal at depth 1.
    fn lower_var_decl(&self, var: &VarDecl, comment_span: Span) -> Node {
        if let [decl] = var.decls.as_slice()
            && let Some(init) = &decl.init
        {
            let inner = self.lower_expr(init);
            return self.finish(Node::value(inner, self.line(comment_span)), comment_span);
        }

        let children = var
            .decls
            .iter()
            .filter_map(|decl| {
                let init = decl.init.as_ref()?;
                let inner = self.lower_expr(init);
                Some(self.finish(Node::value(inner, self.line(decl.span)), decl.span))
            })
            .collect();
        self.finish(
            Node::other("variable declaration", children, self.line(comment_span)),
            comment_span,
        )
    }

    fn lower_expr(&self, expr: &Expr) -> Node {
        let span = expr.span();
        match expr {
            Expr::Lit(Lit::Str(s)) => {
                let value = s.value.as_str().unwrap_or_default();
                self.finish(Node::string(value, self.line(s.span)), s.span)
            }
            Expr::Lit(Lit::Null(n)) => self.finish(Node::null(self.line(n.span)), n.span),
            Expr::Lit(Lit::Num(_)) => self.plain_other("number literal", span),
            Expr::Lit(Lit::Bool(_)) => self.plain_other("boolean literal", span),
            Expr::Lit(_) => self.plain_other("literal", span),
            Expr::Tpl(tpl) => {
                let children = tpl.exprs.iter().map(|e| self.lower_expr(e)).collect();
                self.finish(
                    Node::other("template literal", children, self.line(span)),
                    span,
                )
            }
            Expr::Array(array) => {
                let entries = array
                    .elems
                    .iter()
                    .flatten()
                    .map(|elem| ArrayEntry::new(None, self.lower_expr(&elem.expr)))
                    .collect();
                self.finish(Node::array(entries, self.line(span)), span)
            }
            Expr::Object(object) => self.lower_object(object),
            Expr::Call(call) => {
                let args: Vec<Node> = call.args.iter().map(|a| self.lower_expr(&a.expr)).collect();
                match &call.callee {
                    Callee::Expr(callee) => self.lower_call(callee, args, span),
                    _ => self.finish(
                        Node::other("call expression", args, self.line(span)),
                        span,
                    ),
                }
            }
            Expr::OptChain(chain) => match &*chain.base {
                OptChainBase::Call(call) => {
                    let args = call.args.iter().map(|a| self.lower_expr(&a.expr)).collect();
                    self.lower_call(&call.callee, args, span)
                }
                OptChainBase::Member(member) => {
                    let children = vec![self.lower_expr(&member.obj)];
                    self.finish(
                        Node::other("member expression", children, self.line(span)),
                        span,
                    )
                }
            },
            Expr::New(new) => {
                let children = new
                    .args
                    .iter()
                    .flatten()
                    .map(|a| self.lower_expr(&a.expr))
                    .collect();
                self.finish(
                    Node::other("new expression", children, self.line(span)),
                    span,
                )
            }
            Expr::Paren(paren) => {
                let inner = self.lower_expr(&paren.expr);
                self.finish(Node::expr(inner, self.line(paren.span)), paren.span)
            }
            Expr::Await(await_expr) => {
                let inner = self.lower_expr(&await_expr.arg);
                self.finish(Node::expr(inner, self.line(span)), span)
            }
            Expr::Ident(_) => self.plain_other("identifier", span),
            Expr::Member(member) => {
                let children = vec![self.lower_expr(&member.obj)];
                self.finish(
                    Node::other("member expression", children, self.line(span)),
                    span,
                )
            }
            Expr::Bin(bin) => {
                let children = vec![self.lower_expr(&bin.left), self.lower_expr(&bin.right)];
                self.finish(
                    Node::other("binary expression", children, self.line(span)),
                    span,
                )
            }
            Expr::Cond(cond) => {
                let children = vec![
                    self.lower_expr(&cond.test),
                    self.lower_expr(&cond.cons),
                    self.lower_expr(&cond.alt),
                ];
                self.finish(
                    Node::other("conditional expression", children, self.line(span)),
                    span,
                )
            }
            Expr::Assign(assign) => {
                let children = vec![self.lower_expr(&assign.right)];
                self.finish(
                    Node::other("assignment expression", children, self.line(span)),
                    span,
                )
            }
            Expr::Unary(unary) => {
                let children = vec![self.lower_expr(&unary.arg)];
                self.finish(
                    Node::other("unary expression", children, self.line(span)),
                    span,
                )
            }
            Expr::Seq(seq) => {
                let children = seq.exprs.iter().map(|e| self.lower_expr(e)).collect();
                self.finish(
                    Node::other("sequence expression", children, self.line(span)),
                    span,
                )
            }
            Expr::Arrow(arrow) => self.lower_arrow(arrow),
            Expr::Fn(f) => self.finish(
                Node::other(
                    "function expression",
                    self.lower_fn_body(f.function.body.as_ref()),
                    self.line(span),
                ),
                span,
            ),
            Expr::Class(c) => self.finish(
                Node::other(
                    "class expression",
                    self.lower_class_body(&c.class),
                    self.line(span),
                ),
                span,
            ),
            Expr::JSXElement(element) => self.lower_jsx_element(element),
            Expr::JSXFragment(fragment) => self.lower_jsx_fragment(fragment),
            Expr::TsAs(as_expr) => self.lower_expr(&as_expr.expr),
            Expr::TsConstAssertion(assertion) => self.lower_expr(&assertion.expr),
            Expr::TsNonNull(non_null) => self.lower_expr(&non_null.expr),
            _ => self.plain_other("expression", span),
        }
    }

    fn lower_call(&self, callee: &Expr, args: Vec<Node>, span: Span) -> Node {
        match callee {
            Expr::Ident(ident) => self.finish(
                Node::call(ident.sym.to_string(), args, self.line(span)),
                span,
            ),
            Expr::Member(member) => match &member.prop {
                MemberProp::Ident(prop) => {
                    let node = Node::call(prop.sym.to_string(), args, self.line(span))
                        .with_receiver(self.lower_expr(&member.obj));
                    self.finish(node, span)
                }
                _ => self.finish(
                    Node::other("call expression", args, self.line(span)),
                    span,
                ),
            },
            _ => self.finish(
                Node::other("call expression", args, self.line(span)),
                span,
            ),
        }
    }

    fn lower_object(&self, object: &ObjectLit) -> Node {
        let mut entries = Vec::new();
        for prop in &object.props {
            match prop {
                PropOrSpread::Prop(prop) => match &**prop {
                    Prop::KeyValue(kv) => {
                        let key_span = prop_name_span(&kv.key);
                        let key = self.lower_prop_name(&kv.key);
                        let mut entry = ArrayEntry::new(key, self.lower_expr(&kv.value));
                        if let Some(comment) = self.comment_at(key_span.lo) {
                            entry = entry.with_comment(comment);
                        }
                        entries.push(entry);
                    }
                    Prop::Shorthand(ident) => {
                        let key = Node::string(ident.sym.to_string(), self.line(ident.span));
                        let value = self.plain_other("identifier", ident.span);
                        let mut entry = ArrayEntry::new(Some(key), value);
                        if let Some(comment) = self.comment_at(ident.span.lo) {
                            entry = entry.with_comment(comment);
                        }
                        entries.push(entry);
                    }
                    Prop::Method(method) => {
                        let key_span = prop_name_span(&method.key);
                        let key = self.lower_prop_name(&method.key);
                        let value = self.finish(
                            Node::other(
                                "method property",
                                self.lower_fn_body(method.function.body.as_ref()),
                                self.line(key_span),
                            ),
                            key_span,
                        );
                        entries.push(ArrayEntry::new(key, value));
                    }
                    _ => {}
                },
                PropOrSpread::Spread(spread) => {
                    entries.push(ArrayEntry::new(None, self.lower_expr(&spread.expr)));
                }
            }
        }
        self.finish(Node::array(entries, self.line(object.span)), object.span)
    }

    fn lower_prop_name(&self, name: &PropName) -> Option<Node> {
        match name {
            PropName::Ident(ident) => {
                let mut node = Node::string(ident.sym.to_string(), self.line(ident.span));
                if let Some(comment) = self.comment_at(ident.span.lo) {
                    node = node.with_comment(comment);
                }
                Some(node)
            }
            PropName::Str(s) => {
                let value = s.value.as_str().unwrap_or_default();
                let mut node = Node::string(value, self.line(s.span));
                if let Some(comment) = self.comment_at(s.span.lo) {
                    node = node.with_comment(comment);
                }
                Some(node)
            }
            PropName::Num(n) => Some(Node::string(n.value.to_string(), self.line(n.span))),
            _ => None,
        }
    }

    fn lower_arrow(&self, arrow: &ArrowExpr) -> Node {
        let children = match &*arrow.body {
            BlockStmtOrExpr::BlockStmt(block) => self.lower_block(block),
            BlockStmtOrExpr::Expr(expr) => vec![self.lower_expr(expr)],
        };
        self.finish(
            Node::other("arrow function", children, self.line(arrow.span)),
            arrow.span,
        )
    }

    fn lower_jsx_element(&self, element: &JSXElement) -> Node {
        let mut children = Vec::new();
        for attr in &element.opening.attrs {
            if let JSXAttrOrSpread::JSXAttr(attr) = attr
                && let Some(JSXAttrValue::JSXExprContainer(container)) = &attr.value
                && let JSXExpr::Expr(expr) = &container.expr
            {
                children.push(self.lower_expr(expr));
            }
        }
        children.extend(self.lower_jsx_children(&element.children));
        self.finish(
            Node::other("jsx element", children, self.line(element.span)),
            element.span,
        )
    }

    fn lower_jsx_fragment(&self, fragment: &JSXFragment) -> Node {
        let children = self.lower_jsx_children(&fragment.children);
        self.finish(
            Node::other("jsx fragment", children, self.line(fragment.span)),
            fragment.span,
        )
    }

    fn lower_jsx_children(&self, children: &[JSXElementChild]) -> Vec<Node> {
        let mut nodes = Vec::new();
        for child in children {
            match child {
                JSXElementChild::JSXExprContainer(container) => {
                    if let JSXExpr::Expr(expr) = &container.expr {
                        nodes.push(self.lower_expr(expr));
                    }
                }
                JSXElementChild::JSXElement(element) => {
                    nodes.push(self.lower_jsx_element(element));
                }
                JSXElementChild::JSXFragment(fragment) => {
                    nodes.push(self.lower_jsx_fragment(fragment));
                }
                _ => {}
            }
        }
        nodes
    }

    fn lower_class_body(&self, class: &Class) -> Vec<Node> {
        let mut children = Vec::new();
        for member in &class.body {
            match member {
                ClassMember::Method(method) => {
                    children.extend(self.lower_fn_body(method.function.body.as_ref()));
                }
                ClassMember::PrivateMethod(method) => {
                    children.extend(self.lower_fn_body(method.function.body.as_ref()));
                }
                ClassMember::Constructor(ctor) => {
                    if let Some(body) = &ctor.body {
                        children.extend(self.lower_block(body));
                    }
                }
                ClassMember::ClassProp(prop) => {
                    if let Some(value) = &prop.value {
                        let inner = self.lower_expr(value);
                        children.push(
                            self.finish(Node::value(inner, self.line(prop.span)), prop.span),
                        );
                    }
                }
                _ => {}
            }
        }
        children
    }

    fn lower_fn_body(&self, body: Option<&BlockStmt>) -> Vec<Node> {
        body.map(|block| self.lower_block(block)).unwrap_or_default()
    }

    fn lower_block(&self, block: &BlockStmt) -> Vec<Node> {
        block.stmts.iter().map(|stmt| self.lower_stmt(stmt)).collect()
    }

    fn loop_node(&self, body: &Stmt, span: Span) -> Node {
        let children = vec![self.lower_stmt(body)];
        self.finish(
            Node::other("loop statement", children, self.line(span)),
            span,
        )
    }

    fn other_with_stmts(&self, construct: &str, stmts: &[Stmt], span: Span) -> Node {
        let children = stmts.iter().map(|stmt| self.lower_stmt(stmt)).collect();
        self.finish(Node::other(construct, children, self.line(span)), span)
    }

    fn plain_other(&self, construct: &str, span: Span) -> Node {
        self.finish(Node::other(construct, Vec::new(), self.line(span)), span)
    }

    fn line(&self, span: Span) -> u32 {
        self.source_map.lookup_char_pos(span.lo).line as u32
    }

    fn finish(&self, mut node: Node, span: Span) -> Node {
        let loc = self.source_map.lookup_char_pos(span.lo);
        node = node.with_column((loc.col_display + 1) as u32);
        if let Some(comment) = self.comment_at(span.lo) {
            node = node.with_comment(comment);
        }
        node
    }

    fn comment_at(&self, pos: BytePos) -> Option<String> {
        let comments = self.comments.get_leading(pos)?;
        comments.last().map(|c| c.text.trim().to_string())
    }
}

fn prop_name_span(name: &PropName) -> Span {
    match name {
        PropName::Ident(ident) => ident.span,
        PropName::Str(s) => s.span,
        PropName::Num(n) => n.span,
        PropName::BigInt(b) => b.span,
        PropName::Computed(computed) => computed.span,
    }
}
