//! Usage collection: one walk over an erased module building two sets of
//! referenced names.

use rustc_hash::FxHashSet;
use swc_ecma_ast::*;
use swc_ecma_visit::{Visit, VisitWith};

/// Names referenced by a module, split by position.
///
/// `plain` holds ordinary identifier references; `markup` holds names
/// used in markup tag position (`<Button/>` records `Button`, and for a
/// member tag like `<Ui.Button/>` the root `Ui`). The two are kept apart
/// because the implicit markup default binding is judged against `plain`
/// alone.
#[derive(Debug, Default)]
pub struct UsageSets {
    pub plain: FxHashSet<String>,
    pub markup: FxHashSet<String>,
}

impl UsageSets {
    pub fn contains(&self, name: &str) -> bool {
        self.plain.contains(name) || self.markup.contains(name)
    }
}

/// Collect identifier usage from a module in a single walk.
pub fn collect_usage(module: &Module) -> UsageSets {
    let mut collector = UsageCollector {
        sets: UsageSets::default(),
    };
    module.visit_with(&mut collector);
    collector.sets
}

struct UsageCollector {
    sets: UsageSets,
}

impl Visit for UsageCollector {
    /// Import declarations are skipped entirely: a specifier's local name
    /// is not a use of itself.
    fn visit_import_decl(&mut self, _n: &ImportDecl) {}

    fn visit_ident(&mut self, n: &Ident) {
        self.sets.plain.insert(n.sym.to_string());
    }

    /// Tag names go into the markup set and are not walked further, so
    /// they never leak into `plain`.
    fn visit_jsx_element_name(&mut self, n: &JSXElementName) {
        match n {
            JSXElementName::Ident(ident) => {
                self.sets.markup.insert(ident.sym.to_string());
            }
            JSXElementName::JSXMemberExpr(member) => {
                self.sets.markup.insert(jsx_root(&member.obj).sym.to_string());
            }
            JSXElementName::JSXNamespacedName(ns) => {
                self.sets.markup.insert(ns.ns.sym.to_string());
            }
        }
    }
}

fn jsx_root(mut obj: &JSXObject) -> &Ident {
    loop {
        match obj {
            JSXObject::Ident(ident) => return ident,
            JSXObject::JSXMemberExpr(member) => obj = &member.obj,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tl_common::Dialect;

    fn usage_of(src: &str, dialect: Dialect) -> UsageSets {
        let parsed = tl_parse::parse_module(src, "test.tsx", dialect).unwrap();
        collect_usage(&parsed.module)
    }

    #[test]
    fn import_specifiers_are_not_uses() {
        let sets = usage_of("import { a, b } from \"m\";\nconsole.log(a);", Dialect::ts());
        assert!(sets.plain.contains("a"));
        assert!(!sets.plain.contains("b"));
    }

    #[test]
    fn member_property_names_are_not_uses() {
        let sets = usage_of("const n = obj.field;", Dialect::ts());
        assert!(sets.plain.contains("obj"));
        assert!(!sets.plain.contains("field"));
    }

    #[test]
    fn tag_names_land_in_the_markup_set() {
        let sets = usage_of("const el = <Button kind=\"flat\"/>;", Dialect::tsx());
        assert!(sets.markup.contains("Button"));
        assert!(!sets.plain.contains("Button"));
        assert!(!sets.plain.contains("kind"));
    }

    #[test]
    fn member_tags_record_their_root() {
        let sets = usage_of("const el = <Ui.Button.Small/>;", Dialect::tsx());
        assert!(sets.markup.contains("Ui"));
        assert!(!sets.markup.contains("Button"));
    }
}
