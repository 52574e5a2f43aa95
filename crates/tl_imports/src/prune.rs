//! Reconciling import declarations against the usage sets.

use swc_common::BytePos;
use swc_ecma_ast::*;
use tl_common::edit::delete_list_items;
use tl_common::{normalize_blank_lines, Dialect, EditSet, Result};
use tracing::debug;

use crate::usage::{collect_usage, UsageSets};

/// Knobs for the liveness reconciliation.
#[derive(Debug, Clone)]
pub struct PruneConfig {
    /// The default/namespace binding that exists solely to make markup
    /// tag syntax valid. Under the markup dialect, other names appearing
    /// in tag position never keep it; only a reference to the binding
    /// itself does. Observed on one markup ecosystem only, hence
    /// pluggable rather than hard-coded.
    pub implicit_markup_default: Option<String>,
}

impl Default for PruneConfig {
    fn default() -> Self {
        Self {
            implicit_markup_default: Some("React".to_string()),
        }
    }
}

/// Remove import bindings that the (erased) module never references.
///
/// Re-parses the text, collects usage in one walk, then rewrites each
/// import declaration down to its surviving specifiers, deleting the
/// whole statement when none survive. Side-effect-only imports are
/// untouched. Finishes with the cosmetic blank-line normalization.
pub fn prune_unused_imports(
    source: &str,
    filename: &str,
    dialect: Dialect,
    config: &PruneConfig,
) -> Result<String> {
    let parsed = tl_parse::parse_module(source, filename, dialect)?;
    let usage = collect_usage(&parsed.module);

    let mut pruner = Pruner {
        src: source,
        base: parsed.base_pos(),
        usage: &usage,
        dialect,
        config,
        edits: EditSet::new(),
    };
    for item in &parsed.module.body {
        if let ModuleItem::ModuleDecl(ModuleDecl::Import(import)) = item {
            pruner.prune_import(import);
        }
    }

    let pruned = if pruner.edits.is_empty() {
        source.to_string()
    } else {
        pruner.edits.apply(source)
    };
    Ok(normalize_blank_lines(&pruned))
}

struct Pruner<'a> {
    src: &'a str,
    base: BytePos,
    usage: &'a UsageSets,
    dialect: Dialect,
    config: &'a PruneConfig,
    edits: EditSet,
}

impl Pruner<'_> {
    fn off(&self, pos: BytePos) -> usize {
        (pos.0 - self.base.0) as usize
    }

    fn is_live(&self, spec: &ImportSpecifier) -> bool {
        let local = match spec {
            ImportSpecifier::Named(s) => &s.local,
            ImportSpecifier::Default(s) => &s.local,
            ImportSpecifier::Namespace(s) => &s.local,
        };
        let name = local.sym.as_ref();

        if self.dialect.markup && !matches!(spec, ImportSpecifier::Named(_)) {
            if let Some(implicit) = &self.config.implicit_markup_default {
                if implicit == name {
                    // Other tags never keep this binding alive. A
                    // reference to the binding itself does, plain or in
                    // tag position (`<React.Fragment/>`).
                    return self.usage.plain.contains(name)
                        || self.usage.markup.contains(name);
                }
            }
        }
        self.usage.contains(name)
    }

    fn prune_import(&mut self, import: &ImportDecl) {
        // A specifier list of length zero is a side-effect import; the
        // statement's presence is itself the effect.
        if import.specifiers.is_empty() {
            return;
        }

        let live: Vec<bool> = import.specifiers.iter().map(|s| self.is_live(s)).collect();
        if live.iter().all(|l| !l) {
            debug!(src = ?import.src.value, "dropping entire import");
            self.edits
                .delete_stmt(self.src, self.off(import.span.lo), self.off(import.span.hi));
            return;
        }
        if live.iter().all(|l| *l) {
            return;
        }

        let mut default_spec: Option<(&ImportDefaultSpecifier, bool)> = None;
        let mut star_spec: Option<(&ImportStarAsSpecifier, bool)> = None;
        let mut named: Vec<(usize, usize, bool)> = Vec::new();
        for (spec, &keep) in import.specifiers.iter().zip(&live) {
            match spec {
                ImportSpecifier::Default(s) => default_spec = Some((s, keep)),
                ImportSpecifier::Namespace(s) => star_spec = Some((s, keep)),
                ImportSpecifier::Named(s) => {
                    named.push((self.off(s.span.lo), self.off(s.span.hi), keep))
                }
            }
        }

        let src_lo = self.off(import.src.span.lo);

        if let Some((default, false)) = default_spec {
            // Drop the default binding up to the start of what follows:
            // the named group's brace or the namespace specifier.
            let from = self.off(default.span.lo);
            let after = self.off(default.span.hi);
            let boundary = self.src[after..src_lo]
                .find('{')
                .map(|p| after + p)
                .or_else(|| star_spec.map(|(s, _)| self.off(s.span.lo)))
                .unwrap_or(after);
            self.edits.delete(from, boundary);
        }

        let group_dead = !named.is_empty() && named.iter().all(|it| !it.2);
        if group_dead {
            // The braces go with the group; eat back to the surviving
            // default binding.
            let anchor = default_spec
                .map(|(s, _)| self.off(s.span.hi))
                .unwrap_or_else(|| named[0].0);
            let end = self.src[anchor..src_lo]
                .rfind('}')
                .map(|p| anchor + p + 1)
                .unwrap_or(named.last().unwrap().1);
            self.edits.delete(anchor, end);
        } else if named.iter().any(|it| !it.2) {
            delete_list_items(&mut self.edits, &named);
        }

        if let Some((star, false)) = star_spec {
            let anchor = default_spec
                .map(|(s, _)| self.off(s.span.hi))
                .unwrap_or_else(|| self.off(star.span.lo));
            self.edits.delete(anchor, self.off(star.span.hi));
        }
    }
}
