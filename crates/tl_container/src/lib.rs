//! Container adapter for multi-section documents.
//!
//! A container interleaves one script section with markup and style
//! sections under a single text body. The adapter locates the script
//! section, reports whether its open tag declares the typed dialect,
//! and splices transformed text back while leaving every byte outside
//! the section untouched.

use tl_common::{Dialect, Error, Result};
use tracing::debug;

/// The script section of a container document.
///
/// `start..end` is the half-open byte range of the section's inner text.
/// `open_tag` is the literal opening tag (including `<` and `>`), kept
/// so the splice can rewrite the dialect marker attribute; it always
/// ends exactly at `start`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub start: usize,
    pub end: usize,
    pub open_tag: String,
}

impl Section {
    pub fn text<'a>(&self, doc: &'a str) -> &'a str {
        &doc[self.start..self.end]
    }
}

/// Contract between the pipeline and a concrete container format.
pub trait ContainerAdapter {
    /// Locate the script section. The boolean reports whether the open
    /// tag declares the typed dialect; a document without a script
    /// section yields `(None, false)`.
    fn extract_section(&self, doc: &str) -> (Option<Section>, bool);

    /// The dialect the section's content parses under.
    fn section_dialect(&self, section: &Section) -> Result<Dialect>;

    /// Whether the document carries markup sections whose structure may
    /// reference names not visible from the script alone.
    fn has_markup_sections(&self, doc: &str) -> bool;

    /// Replace the section's inner text and drop the typed-dialect
    /// marker from the open tag.
    fn splice(&self, doc: &str, section: &Section, new_text: &str) -> String;
}

/// Adapter for single-file-component documents built around a `<script>`
/// tag with a `lang` attribute as the dialect marker.
#[derive(Debug, Default)]
pub struct SfcAdapter;

const TYPED_LANGS: &[&str] = &["ts", "typescript", "tsx"];

impl ContainerAdapter for SfcAdapter {
    fn extract_section(&self, doc: &str) -> (Option<Section>, bool) {
        let Some((tag_start, tag_end)) = find_open_tag(doc, "<script") else {
            return (None, false);
        };
        let open_tag = &doc[tag_start..tag_end];
        let end = doc[tag_end..]
            .find("</script")
            .map(|p| tag_end + p)
            .unwrap_or(doc.len());

        let declared = lang_attr(open_tag)
            .map(|(_, value)| TYPED_LANGS.contains(&value))
            .unwrap_or(false);
        debug!(tag = open_tag, declared, "located script section");

        let section = Section {
            start: tag_end,
            end,
            open_tag: open_tag.to_string(),
        };
        (Some(section), declared)
    }

    fn section_dialect(&self, section: &Section) -> Result<Dialect> {
        match lang_attr(&section.open_tag) {
            None => Ok(Dialect::ts()),
            Some((_, "ts")) | Some((_, "typescript")) => Ok(Dialect::ts()),
            Some((_, "tsx")) => Ok(Dialect::tsx()),
            Some((_, other)) => Err(Error::UnsupportedDialect(other.to_string())),
        }
    }

    fn has_markup_sections(&self, doc: &str) -> bool {
        find_open_tag(doc, "<template").is_some()
    }

    fn splice(&self, doc: &str, section: &Section, new_text: &str) -> String {
        let new_tag = rewrite_open_tag(&section.open_tag);
        let tag_start = section.start - section.open_tag.len();

        let mut out = String::with_capacity(doc.len());
        out.push_str(&doc[..tag_start]);
        out.push_str(&new_tag);
        out.push_str(new_text);
        out.push_str(&doc[section.end..]);
        out
    }
}

/// Drop `lang="ts"` / `lang="typescript"` from the tag; rewrite
/// `lang="tsx"` to `lang="jsx"`. Anything else is left alone.
fn rewrite_open_tag(open_tag: &str) -> String {
    let Some((range, value)) = lang_attr(open_tag) else {
        return open_tag.to_string();
    };
    match value {
        "ts" | "typescript" => {
            // The attribute goes together with the whitespace before it.
            let mut attr_start = range.start;
            let bytes = open_tag.as_bytes();
            while attr_start > 0 && bytes[attr_start - 1].is_ascii_whitespace() {
                attr_start -= 1;
            }
            format!("{}{}", &open_tag[..attr_start], &open_tag[range.end..])
        }
        "tsx" => {
            let value_start = range.end - 1 - value.len();
            format!(
                "{}jsx{}",
                &open_tag[..value_start],
                &open_tag[value_start + value.len()..]
            )
        }
        _ => open_tag.to_string(),
    }
}

/// Find the `lang` attribute in an opening tag. Returns the byte range
/// of the whole attribute (`lang="..."`) and the attribute value.
fn lang_attr(open_tag: &str) -> Option<(std::ops::Range<usize>, &str)> {
    let bytes = open_tag.as_bytes();
    let mut i = 0;
    while let Some(p) = open_tag[i..].find("lang") {
        let start = i + p;
        i = start + 4;
        // Must be a standalone attribute name.
        let before_ok = start > 0 && bytes[start - 1].is_ascii_whitespace();
        if !before_ok {
            continue;
        }
        let mut j = start + 4;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= bytes.len() || bytes[j] != b'=' {
            continue;
        }
        j += 1;
        while j < bytes.len() && bytes[j].is_ascii_whitespace() {
            j += 1;
        }
        if j >= bytes.len() || (bytes[j] != b'"' && bytes[j] != b'\'') {
            continue;
        }
        let quote = bytes[j];
        let value_start = j + 1;
        let value_end = open_tag[value_start..]
            .find(quote as char)
            .map(|p| value_start + p)?;
        return Some((start..value_end + 1, &open_tag[value_start..value_end]));
    }
    None
}

/// Scan for the first occurrence of `tag` outside HTML comments,
/// returning the byte range of the full opening tag up to and including
/// its `>`. Quoted attribute values may contain `>`.
fn find_open_tag(doc: &str, tag: &str) -> Option<(usize, usize)> {
    let bytes = doc.as_bytes();
    let mut i = 0;
    while i < doc.len() {
        if doc[i..].starts_with("<!--") {
            i = doc[i + 4..].find("-->").map(|p| i + 4 + p + 3)?;
            continue;
        }
        if doc[i..].starts_with(tag) {
            let after = i + tag.len();
            let boundary = bytes
                .get(after)
                .map(|&b| b.is_ascii_whitespace() || b == b'>' || b == b'/')
                .unwrap_or(false);
            if boundary {
                let end = tag_end(doc, after)?;
                return Some((i, end));
            }
        }
        i += 1;
    }
    None
}

fn tag_end(doc: &str, from: usize) -> Option<usize> {
    let bytes = doc.as_bytes();
    let mut i = from;
    let mut quote: Option<u8> = None;
    while i < bytes.len() {
        match (quote, bytes[i]) {
            (Some(q), b) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(bytes[i]),
            (None, b'>') => return Some(i + 1),
            (None, _) => {}
        }
        i += 1;
    }
    None
}
