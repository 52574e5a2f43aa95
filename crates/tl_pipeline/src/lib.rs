//! The end-to-end transform pipeline.
//!
//! Plain scripts run erasure and then, unless disabled, import pruning
//! on the erased text. Container documents go through the adapter:
//! extract the script section, transform it, splice it back. A container
//! whose section never declared the typed dialect is skipped, and the
//! caller can tell that apart from a transform that happened to produce
//! identical text.

use tl_common::{Dialect, Result, SourceKind};
use tl_container::{ContainerAdapter, SfcAdapter};
use tl_imports::PruneConfig;
use tracing::debug;

/// Pipeline configuration.
#[derive(Debug, Clone, Default)]
pub struct Options {
    /// Skip the import-pruning stage, keeping every import intact.
    pub keep_imports: bool,
    /// Transform container script sections even without a dialect marker.
    pub force: bool,
    pub prune: PruneConfig,
}

/// What the pipeline did with the input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Erasure ran. The text may still equal the input.
    Processed,
    /// Nothing ran; the input is passed through verbatim.
    Skipped,
}

#[derive(Debug)]
pub struct Output {
    pub text: String,
    pub outcome: Outcome,
}

/// Transform one source file according to its kind.
pub fn process(source: &str, filename: &str, kind: SourceKind, options: &Options) -> Result<Output> {
    match kind {
        SourceKind::Script(dialect) => {
            let text = transform_script(source, filename, dialect, options)?;
            Ok(Output {
                text,
                outcome: Outcome::Processed,
            })
        }
        SourceKind::Container => process_container(source, filename, &SfcAdapter, options),
    }
}

/// Erase, then prune imports on the erased text.
pub fn transform_script(
    source: &str,
    filename: &str,
    dialect: Dialect,
    options: &Options,
) -> Result<String> {
    let erased = tl_erase::erase_source(source, filename, dialect)?;
    if options.keep_imports {
        return Ok(erased);
    }
    tl_imports::prune_unused_imports(&erased, filename, dialect, &options.prune)
}

/// Transform the script section of a container document.
pub fn process_container(
    doc: &str,
    filename: &str,
    adapter: &dyn ContainerAdapter,
    options: &Options,
) -> Result<Output> {
    let (section, declared) = adapter.extract_section(doc);
    let Some(section) = section else {
        debug!(filename, "no script section, passing through");
        return Ok(skipped(doc));
    };
    if !declared && !options.force {
        debug!(filename, "script section not typed, passing through");
        return Ok(skipped(doc));
    }

    let dialect = adapter.section_dialect(&section)?;
    let erased = tl_erase::erase_source(section.text(doc), filename, dialect)?;

    // Markup sections can reference script bindings the section itself
    // never mentions, so liveness cannot be judged from the script text
    // alone and pruning stays off.
    let new_text = if options.keep_imports || adapter.has_markup_sections(doc) {
        erased
    } else {
        let pruned = tl_imports::prune_unused_imports(&erased, filename, dialect, &options.prune)?;
        // The newline after the open tag belongs to the document
        // skeleton, not the script.
        if erased.starts_with('\n') && !pruned.starts_with('\n') {
            format!("\n{pruned}")
        } else {
            pruned
        }
    };

    Ok(Output {
        text: adapter.splice(doc, &section, &new_text),
        outcome: Outcome::Processed,
    })
}

fn skipped(doc: &str) -> Output {
    Output {
        text: doc.to_string(),
        outcome: Outcome::Skipped,
    }
}
