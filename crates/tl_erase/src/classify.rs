//! Maps syntax-node kinds to erasure actions.
//!
//! The classification is a pure function of the node kind. Anything the
//! walker does not recognise never reaches `classify` and is preserved
//! as-is, so the eraser is conservative by construction.

/// What the transformer does with a recognised node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErasureAction {
    /// Remove the node and its whole subtree.
    Delete,
    /// Substitute the node with its surviving child expression; the
    /// wrapper syntax around the child is discarded.
    ReplaceWithInner,
    /// Leave the node untouched.
    Keep,
}

/// The node kinds the eraser can act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    /// `: T` on a binding, parameter, or return position.
    TypeAnnotation,
    InterfaceDecl,
    TypeAliasDecl,
    /// `<T, U>` on a declaration.
    TypeParams,
    /// `<T, U>` on a call, `new`, or tagged template.
    TypeArgs,
    /// `x as T`.
    AsExpr,
    /// `x satisfies T`.
    SatisfiesExpr,
    /// `<T>x` (legacy assertion form, non-markup dialect only).
    AngleAssertion,
    /// `x!`.
    NonNullExpr,
    /// `import type ...` or an import whose bindings are all type-only.
    TypeOnlyImport,
    /// `export type ...` or an export whose bindings are all type-only.
    TypeOnlyExport,
    /// `declare ...` statements and ambient modules.
    AmbientDecl,
    /// A function or method overload signature (no body).
    OverloadSignature,
    /// An `abstract` class member.
    AbstractMember,
    /// A class index signature (`[key: string]: T`).
    IndexSignature,
    /// `export as namespace X`.
    NamespaceExport,
    /// Anything else: runtime code, unrecognised syntax extensions.
    Other,
}

/// Decide the erasure action for a node kind. Total and side-effect free.
pub fn classify(kind: NodeKind) -> ErasureAction {
    use NodeKind::*;
    match kind {
        TypeAnnotation | InterfaceDecl | TypeAliasDecl | TypeParams | TypeArgs
        | TypeOnlyImport | TypeOnlyExport | AmbientDecl | OverloadSignature
        | AbstractMember | IndexSignature | NamespaceExport => ErasureAction::Delete,
        AsExpr | SatisfiesExpr | AngleAssertion | NonNullExpr => ErasureAction::ReplaceWithInner,
        Other => ErasureAction::Keep,
    }
}
