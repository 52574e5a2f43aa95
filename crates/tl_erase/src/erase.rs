//! The erasure walk: spans of type-only syntax become deletions.

use swc_common::{BytePos, Span, Spanned};
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};
use tl_common::edit::expand_ws_left;
use tl_common::{edit::delete_list_items, Dialect, EditSet, Result};
use tracing::debug;

use crate::classify::{classify, ErasureAction, NodeKind};

/// Erase all static-type syntax from `source`, returning untyped text.
///
/// Fails fast with a `ParseError` on structurally invalid input; no
/// partial output is produced.
pub fn erase_source(source: &str, filename: &str, dialect: Dialect) -> Result<String> {
    let parsed = tl_parse::parse_module(source, filename, dialect)?;
    let mut walker = EraseWalker {
        src: source,
        base: parsed.base_pos(),
        edits: EditSet::new(),
    };
    parsed.module.visit_with(&mut walker);
    if walker.edits.is_empty() {
        return Ok(source.to_string());
    }
    debug!(file = filename, "applying erasure edits");
    Ok(walker.edits.apply(source))
}

/// Member modifiers that carry no runtime meaning. `static`, `async`,
/// `get`, and `set` are runtime syntax and must survive.
const TYPE_MODIFIERS: [&str; 7] = [
    "declare",
    "abstract",
    "public",
    "private",
    "protected",
    "readonly",
    "override",
];

struct EraseWalker<'a> {
    src: &'a str,
    base: BytePos,
    edits: EditSet,
}

impl EraseWalker<'_> {
    fn off(&self, pos: BytePos) -> usize {
        (pos.0 - self.base.0) as usize
    }

    fn delete_node(&mut self, kind: NodeKind, span: Span) {
        if classify(kind) != ErasureAction::Delete {
            return;
        }
        let lo = expand_ws_left(self.src, self.off(span.lo));
        self.edits.delete(lo, self.off(span.hi));
    }

    fn delete_stmt_node(&mut self, kind: NodeKind, span: Span) {
        if classify(kind) != ErasureAction::Delete {
            return;
        }
        self.edits
            .delete_stmt(self.src, self.off(span.lo), self.off(span.hi));
    }

    /// Discard the wrapper syntax around a surviving child expression.
    fn replace_with_inner(&mut self, kind: NodeKind, outer: Span, inner: Span) {
        if classify(kind) != ErasureAction::ReplaceWithInner {
            return;
        }
        self.edits.delete(self.off(outer.lo), self.off(inner.lo));
        self.edits.delete(self.off(inner.hi), self.off(outer.hi));
    }

    /// Delete a single `?` or `!` marker trailing the given position.
    fn delete_marker(&mut self, from: BytePos, marker: u8) {
        let bytes = self.src.as_bytes();
        let mut p = self.off(from);
        while p < bytes.len() && (bytes[p] == b' ' || bytes[p] == b'\t') {
            p += 1;
        }
        if p < bytes.len() && bytes[p] == marker {
            self.edits.delete(p, p + 1);
        }
    }

    fn after_decorators(&self, lo: BytePos, decorators: &[Decorator]) -> usize {
        let start = self.off(lo);
        decorators
            .last()
            .map(|d| self.off(d.span.hi))
            .unwrap_or(start)
            .max(start)
    }

    /// Delete type-only modifier keywords in `start..end` (the region
    /// between a member's start and its key). Comment ranges are skipped,
    /// so a modifier word inside a comment is left alone.
    fn strip_modifiers(&mut self, start: usize, end: usize) {
        let bytes = self.src.as_bytes();
        let mut i = start;
        while i < end {
            if self.src[i..].starts_with("/*") {
                i = self.src[i..end].find("*/").map(|p| i + p + 2).unwrap_or(end);
                continue;
            }
            if self.src[i..].starts_with("//") {
                i = self.src[i..end].find('\n').map(|p| i + p + 1).unwrap_or(end);
                continue;
            }
            if !bytes[i].is_ascii_alphabetic() {
                i += 1;
                continue;
            }
            let word_start = i;
            while i < end && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'_') {
                i += 1;
            }
            if TYPE_MODIFIERS.contains(&&self.src[word_start..i]) {
                let mut e = i;
                while e < end && (bytes[e] == b' ' || bytes[e] == b'\t') {
                    e += 1;
                }
                self.edits.delete(word_start, e);
            }
        }
    }

    fn strip_abstract_keyword(&mut self, class: &Class) {
        let lo = self.off(class.span.lo);
        if self.src[lo..].starts_with("abstract") {
            let bytes = self.src.as_bytes();
            let mut e = lo + "abstract".len();
            while e < bytes.len() && (bytes[e] == b' ' || bytes[e] == b'\t') {
                e += 1;
            }
            self.edits.delete(lo, e);
        } else if let Some(pos) = self.src[..lo].rfind("abstract") {
            // Span starts at `class`; the keyword sits just before it.
            if self.src[pos + "abstract".len()..lo].trim().is_empty() {
                self.edits.delete(pos, lo);
            }
        }
    }

    fn delete_implements(&mut self, class: &Class) {
        let first = self.off(class.implements.first().unwrap().span.lo);
        let last = self.off(class.implements.last().unwrap().span.hi);
        if let Some(pos) = self.src[..first].rfind("implements") {
            self.edits.delete(expand_ws_left(self.src, pos), last);
        }
    }

    /// A leading `this`-parameter is type-only; drop it together with the
    /// separator joining it to the next parameter.
    fn delete_this_param(&mut self, params: &[Param]) {
        let Some(first) = params.first() else { return };
        let Pat::Ident(binding) = &first.pat else {
            return;
        };
        if binding.id.sym.as_ref() != "this" {
            return;
        }
        let end = params
            .get(1)
            .map(|p| self.off(p.span.lo))
            .unwrap_or_else(|| self.off(first.span.hi));
        self.edits.delete(self.off(first.span.lo), end);
    }

    fn try_delete_decl(&mut self, decl: &Decl, span: Span) -> bool {
        let kind = match decl {
            Decl::TsInterface(_) => NodeKind::InterfaceDecl,
            Decl::TsTypeAlias(_) => NodeKind::TypeAliasDecl,
            Decl::TsModule(m) if m.declare || m.global => NodeKind::AmbientDecl,
            Decl::TsEnum(e) if e.declare => NodeKind::AmbientDecl,
            Decl::Fn(f) if f.declare => NodeKind::AmbientDecl,
            Decl::Fn(f) if f.function.body.is_none() => NodeKind::OverloadSignature,
            Decl::Class(c) if c.declare => NodeKind::AmbientDecl,
            Decl::Var(v) if v.declare => NodeKind::AmbientDecl,
            _ => return false,
        };
        self.delete_stmt_node(kind, span);
        true
    }
}

impl Visit for EraseWalker<'_> {
    fn visit_ts_type_ann(&mut self, n: &TsTypeAnn) {
        // The span starts at the `:`; the whole subtree goes with it.
        self.delete_node(NodeKind::TypeAnnotation, n.span);
    }

    fn visit_ts_type_param_decl(&mut self, n: &TsTypeParamDecl) {
        self.delete_node(NodeKind::TypeParams, n.span);
    }

    fn visit_ts_type_param_instantiation(&mut self, n: &TsTypeParamInstantiation) {
        self.delete_node(NodeKind::TypeArgs, n.span);
    }

    fn visit_ts_as_expr(&mut self, n: &TsAsExpr) {
        self.replace_with_inner(NodeKind::AsExpr, n.span, n.expr.span());
        n.expr.visit_with(self);
    }

    fn visit_ts_const_assertion(&mut self, n: &TsConstAssertion) {
        self.replace_with_inner(NodeKind::AsExpr, n.span, n.expr.span());
        n.expr.visit_with(self);
    }

    fn visit_ts_satisfies_expr(&mut self, n: &TsSatisfiesExpr) {
        self.replace_with_inner(NodeKind::SatisfiesExpr, n.span, n.expr.span());
        n.expr.visit_with(self);
    }

    fn visit_ts_type_assertion(&mut self, n: &TsTypeAssertion) {
        self.replace_with_inner(NodeKind::AngleAssertion, n.span, n.expr.span());
        n.expr.visit_with(self);
    }

    fn visit_ts_non_null_expr(&mut self, n: &TsNonNullExpr) {
        self.replace_with_inner(NodeKind::NonNullExpr, n.span, n.expr.span());
        n.expr.visit_with(self);
    }

    fn visit_paren_expr(&mut self, n: &ParenExpr) {
        // A paren that exists only to wrap an erased assertion goes with
        // it, provided the surviving expression needs no grouping.
        if let Some(inner) = assertion_inner(&n.expr) {
            if is_simple_expr(inner) {
                self.edits.delete(self.off(n.span.lo), self.off(inner.span().lo));
                self.edits.delete(self.off(inner.span().hi), self.off(n.span.hi));
            }
        }
        n.visit_children_with(self);
    }

    fn visit_module_item(&mut self, n: &ModuleItem) {
        if let ModuleItem::ModuleDecl(decl) = n {
            match decl {
                ModuleDecl::ExportDecl(export) => {
                    if self.try_delete_decl(&export.decl, n.span()) {
                        return;
                    }
                }
                ModuleDecl::ExportDefaultDecl(export) => {
                    if matches!(export.decl, DefaultDecl::TsInterfaceDecl(_)) {
                        self.delete_stmt_node(NodeKind::InterfaceDecl, n.span());
                        return;
                    }
                }
                ModuleDecl::TsNamespaceExport(_) => {
                    self.delete_stmt_node(NodeKind::NamespaceExport, n.span());
                    return;
                }
                ModuleDecl::TsImportEquals(import) if import.is_type_only => {
                    self.delete_stmt_node(NodeKind::TypeOnlyImport, n.span());
                    return;
                }
                _ => {}
            }
        }
        n.visit_children_with(self);
    }

    fn visit_stmt(&mut self, n: &Stmt) {
        if let Stmt::Decl(decl) = n {
            if self.try_delete_decl(decl, n.span()) {
                return;
            }
        }
        n.visit_children_with(self);
    }

    fn visit_import_decl(&mut self, n: &ImportDecl) {
        if n.type_only {
            self.delete_stmt_node(NodeKind::TypeOnlyImport, n.span);
            return;
        }
        let all_type_only = !n.specifiers.is_empty()
            && n.specifiers.iter().all(|s| match s {
                ImportSpecifier::Named(named) => named.is_type_only,
                _ => false,
            });
        if all_type_only {
            self.delete_stmt_node(NodeKind::TypeOnlyImport, n.span);
            return;
        }
        let items: Vec<(usize, usize, bool)> = n
            .specifiers
            .iter()
            .filter_map(|s| match s {
                ImportSpecifier::Named(named) => Some((
                    self.off(named.span.lo),
                    self.off(named.span.hi),
                    !named.is_type_only,
                )),
                _ => None,
            })
            .collect();
        if !items.is_empty() && items.iter().all(|it| !it.2) {
            // Every named specifier is type-only but a default or
            // namespace binding keeps the statement alive; the braced
            // group goes as a whole.
            let anchor = n.specifiers.iter().find_map(|s| match s {
                ImportSpecifier::Default(d) => Some(self.off(d.span.hi)),
                ImportSpecifier::Namespace(ns) => Some(self.off(ns.span.hi)),
                ImportSpecifier::Named(_) => None,
            });
            if let Some(anchor) = anchor {
                let src_lo = self.off(n.src.span.lo);
                if let Some(p) = self.src[anchor..src_lo].rfind('}') {
                    self.edits.delete(anchor, anchor + p + 1);
                }
            }
            return;
        }
        if items.iter().any(|it| !it.2) {
            delete_list_items(&mut self.edits, &items);
        }
    }

    fn visit_named_export(&mut self, n: &NamedExport) {
        if n.type_only {
            self.delete_stmt_node(NodeKind::TypeOnlyExport, n.span);
            return;
        }
        let items: Vec<(usize, usize, bool)> = n
            .specifiers
            .iter()
            .map(|s| {
                let keep = match s {
                    ExportSpecifier::Named(named) => !named.is_type_only,
                    _ => true,
                };
                let span = s.span();
                (self.off(span.lo), self.off(span.hi), keep)
            })
            .collect();
        if !items.is_empty() && items.iter().all(|it| !it.2) {
            self.delete_stmt_node(NodeKind::TypeOnlyExport, n.span);
            return;
        }
        if items.iter().any(|it| !it.2) {
            delete_list_items(&mut self.edits, &items);
        }
    }

    fn visit_class(&mut self, n: &Class) {
        if n.is_abstract {
            self.strip_abstract_keyword(n);
        }
        if !n.implements.is_empty() {
            self.delete_implements(n);
        }
        n.visit_children_with(self);
    }

    fn visit_class_member(&mut self, n: &ClassMember) {
        match n {
            ClassMember::Method(m) => {
                if m.is_abstract {
                    self.delete_stmt_node(NodeKind::AbstractMember, m.span);
                    return;
                }
                if m.function.body.is_none() {
                    self.delete_stmt_node(NodeKind::OverloadSignature, m.span);
                    return;
                }
                let start = self.after_decorators(m.span.lo, &m.function.decorators);
                self.strip_modifiers(start, self.off(m.key.span().lo));
                if m.is_optional {
                    self.delete_marker(m.key.span().hi, b'?');
                }
                n.visit_children_with(self);
            }
            ClassMember::PrivateMethod(m) => {
                if m.is_abstract || m.function.body.is_none() {
                    self.delete_stmt_node(NodeKind::AbstractMember, m.span);
                    return;
                }
                let start = self.after_decorators(m.span.lo, &m.function.decorators);
                self.strip_modifiers(start, self.off(m.key.span().lo));
                n.visit_children_with(self);
            }
            ClassMember::ClassProp(p) => {
                if p.declare {
                    self.delete_stmt_node(NodeKind::AmbientDecl, p.span);
                    return;
                }
                if p.is_abstract {
                    self.delete_stmt_node(NodeKind::AbstractMember, p.span);
                    return;
                }
                let start = self.after_decorators(p.span.lo, &p.decorators);
                self.strip_modifiers(start, self.off(p.key.span().lo));
                if p.is_optional {
                    self.delete_marker(p.key.span().hi, b'?');
                }
                if p.definite {
                    self.delete_marker(p.key.span().hi, b'!');
                }
                n.visit_children_with(self);
            }
            ClassMember::PrivateProp(p) => {
                let start = self.after_decorators(p.span.lo, &p.decorators);
                self.strip_modifiers(start, self.off(p.key.span().lo));
                if p.is_optional {
                    self.delete_marker(p.key.span().hi, b'?');
                }
                if p.definite {
                    self.delete_marker(p.key.span().hi, b'!');
                }
                n.visit_children_with(self);
            }
            ClassMember::Constructor(c) => {
                self.strip_modifiers(self.off(c.span.lo), self.off(c.key.span().lo));
                n.visit_children_with(self);
            }
            ClassMember::TsIndexSignature(s) => {
                self.delete_stmt_node(NodeKind::IndexSignature, s.span);
            }
            _ => n.visit_children_with(self),
        }
    }

    fn visit_ts_param_prop(&mut self, n: &TsParamProp) {
        // Parameter-property modifiers are erased; the parameter itself
        // survives as a plain binding.
        let start = self.after_decorators(n.span.lo, &n.decorators);
        let param_lo = match &n.param {
            TsParamPropParam::Ident(binding) => binding.id.span.lo,
            TsParamPropParam::Assign(assign) => assign.span.lo,
        };
        self.edits.delete(start, self.off(param_lo));
        n.visit_children_with(self);
    }

    fn visit_function(&mut self, n: &Function) {
        self.delete_this_param(&n.params);
        n.visit_children_with(self);
    }

    fn visit_binding_ident(&mut self, n: &BindingIdent) {
        if n.id.optional {
            self.delete_marker(n.id.span.hi, b'?');
        }
        n.visit_children_with(self);
    }

    fn visit_var_declarator(&mut self, n: &VarDeclarator) {
        if n.definite {
            if let Pat::Ident(binding) = &n.name {
                self.delete_marker(binding.id.span.hi, b'!');
            }
        }
        n.visit_children_with(self);
    }
}

/// Peel assertion wrappers off an expression, returning the innermost
/// surviving expression when at least one wrapper was present.
fn assertion_inner(expr: &Expr) -> Option<&Expr> {
    let mut cur = expr;
    let mut unwrapped = false;
    loop {
        cur = match cur {
            Expr::TsAs(e) => &e.expr,
            Expr::TsConstAssertion(e) => &e.expr,
            Expr::TsSatisfies(e) => &e.expr,
            Expr::TsNonNull(e) => &e.expr,
            Expr::TsTypeAssertion(e) => &e.expr,
            _ => break,
        };
        unwrapped = true;
    }
    unwrapped.then_some(cur)
}

/// Expressions that never need grouping parentheses.
fn is_simple_expr(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Ident(_) | Expr::Member(_) | Expr::Call(_) | Expr::Lit(_)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn erase_ts(src: &str) -> String {
        erase_source(src, "test.ts", Dialect::ts()).unwrap()
    }

    fn erase_tsx(src: &str) -> String {
        erase_source(src, "test.tsx", Dialect::tsx()).unwrap()
    }

    #[test]
    fn interface_and_annotations() {
        let src = "interface U{name:string} function f(u:U):string{return u.name}";
        assert_eq!(erase_ts(src), "function f(u){return u.name}");
    }

    #[test]
    fn assertion_wrappers() {
        let src = "const x = (y as string).length; const z = w!;";
        assert_eq!(erase_ts(src), "const x = y.length; const z = w;");
    }

    #[test]
    fn satisfies_and_const_assertions() {
        assert_eq!(
            erase_ts("const a = {} satisfies Config;"),
            "const a = {};"
        );
        assert_eq!(erase_ts("const b = [1] as const;"), "const b = [1];");
    }

    #[test]
    fn angle_assertion() {
        assert_eq!(erase_ts("const s = <any>window;"), "const s = window;");
    }

    #[test]
    fn generic_params_and_args() {
        let src = "function id<T>(v: T): T {\n  return v;\n}\nconst n = id<number>(1);\n";
        assert_eq!(
            erase_ts(src),
            "function id(v) {\n  return v;\n}\nconst n = id(1);\n"
        );
    }

    #[test]
    fn type_alias_line_disappears() {
        let src = "type A = string;\nconst a = 1;\n";
        assert_eq!(erase_ts(src), "const a = 1;\n");
    }

    #[test]
    fn type_only_import_removed() {
        let src = "import type { A } from \"./a\";\nimport { B } from \"./b\";\nexport const b = B;\n";
        assert_eq!(
            erase_ts(src),
            "import { B } from \"./b\";\nexport const b = B;\n"
        );
    }

    #[test]
    fn inline_type_specifier_removed() {
        let src = "import { type A, B } from \"./m\";\nexport const b = B;\n";
        assert_eq!(erase_ts(src), "import { B } from \"./m\";\nexport const b = B;\n");
    }

    #[test]
    fn import_with_only_type_specifiers_is_elided() {
        let src = "import { type A } from \"./m\";\nconst x = 1;\n";
        assert_eq!(erase_ts(src), "const x = 1;\n");
    }

    #[test]
    fn type_only_group_next_to_default_is_dropped() {
        let src = "import D, { type A } from \"./m\";\nexport const d = D;\n";
        assert_eq!(erase_ts(src), "import D from \"./m\";\nexport const d = D;\n");
    }

    #[test]
    fn export_type_removed() {
        let src = "export type { A } from \"./a\";\nexport const b = 1;\n";
        assert_eq!(erase_ts(src), "export const b = 1;\n");
    }

    #[test]
    fn optional_and_definite_markers() {
        assert_eq!(
            erase_ts("function f(x?: number) {}"),
            "function f(x) {}"
        );
        assert_eq!(erase_ts("let y!: string;"), "let y;");
    }

    #[test]
    fn class_modifiers_stripped() {
        let src = "class C {\n  private readonly count: number = 0;\n  constructor(private name: string) {}\n}\n";
        assert_eq!(
            erase_ts(src),
            "class C {\n  count = 0;\n  constructor(name) {}\n}\n"
        );
    }

    #[test]
    fn modifier_words_in_comments_survive() {
        let src = "class C {\n  static /* a public method */ m() {}\n}\n";
        assert_eq!(erase_ts(src), src);
    }

    #[test]
    fn modifier_before_commented_key_is_still_stripped() {
        let src = "class C {\n  private /* readonly by convention */ x = 1;\n}\n";
        assert_eq!(
            erase_ts(src),
            "class C {\n  /* readonly by convention */ x = 1;\n}\n"
        );
    }

    #[test]
    fn abstract_class_members_removed() {
        let src = "abstract class Shape {\n  abstract area(): number;\n\n  describe(): string {\n    return \"shape\";\n  }\n}\n";
        assert_eq!(
            erase_ts(src),
            "class Shape {\n\n  describe() {\n    return \"shape\";\n  }\n}\n"
        );
    }

    #[test]
    fn implements_clause_removed() {
        let src = "class C implements A, B {\n  run() {}\n}\n";
        assert_eq!(erase_ts(src), "class C {\n  run() {}\n}\n");
    }

    #[test]
    fn this_param_removed() {
        let src = "function listen(this: Window, ev: string) {\n  return ev;\n}\n";
        assert_eq!(erase_ts(src), "function listen(ev) {\n  return ev;\n}\n");
    }

    #[test]
    fn overload_signatures_removed() {
        let src = "function f(a: string): void;\nfunction f(a: any) {}\n";
        assert_eq!(erase_ts(src), "function f(a) {}\n");
    }

    #[test]
    fn declare_statements_removed() {
        let src = "declare const g: number;\nconst h = 1;\n";
        assert_eq!(erase_ts(src), "const h = 1;\n");
    }

    #[test]
    fn markup_content_passes_through() {
        let src = "const el = <div id={x}>{y}</div>;\n";
        assert_eq!(erase_tsx(src), src);
    }

    #[test]
    fn conservative_on_untyped_input() {
        let src = "// comment\nexport function add(a, b) {\n  return a + b;\n}\n";
        assert_eq!(erase_ts(src), src);
    }

    #[test]
    fn idempotent() {
        let src = "interface I { x: number }\nexport const v = (w as any)!;\n";
        let once = erase_ts(src);
        assert_eq!(erase_ts(&once), once);
    }

    #[test]
    fn invalid_input_fails_fast() {
        assert!(erase_source("const = ;", "bad.ts", Dialect::ts()).is_err());
    }
}
