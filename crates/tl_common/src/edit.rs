//! Byte-range edits against an immutable source string.
//!
//! Passes record deletions while walking the tree and apply them in one
//! batch afterwards, so no pass ever mutates the tree it is visiting and
//! every untouched byte of the input survives verbatim.

/// A half-open byte range scheduled for deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edit {
    pub start: usize,
    pub end: usize,
}

/// An unordered batch of deletions. Overlapping and nested ranges are
/// merged when the batch is applied.
#[derive(Debug, Default)]
pub struct EditSet {
    edits: Vec<Edit>,
}

impl EditSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    /// Schedule `start..end` for deletion. Empty ranges are ignored.
    pub fn delete(&mut self, start: usize, end: usize) {
        if start < end {
            self.edits.push(Edit { start, end });
        }
    }

    /// Schedule a statement-level deletion: the range is widened to absorb
    /// surrounding inline whitespace, a dangling `;`, and at most one
    /// trailing newline, so a statement on its own line disappears with
    /// the line.
    pub fn delete_stmt(&mut self, src: &str, start: usize, end: usize) {
        let (s, e) = expand_stmt(src, start, end);
        self.delete(s, e);
    }

    /// Apply all recorded deletions to `src` and return the edited text.
    pub fn apply(mut self, src: &str) -> String {
        self.edits.sort_by_key(|e| (e.start, e.end));

        let mut merged: Vec<Edit> = Vec::with_capacity(self.edits.len());
        for edit in self.edits {
            match merged.last_mut() {
                Some(last) if edit.start <= last.end => {
                    last.end = last.end.max(edit.end);
                }
                _ => merged.push(edit),
            }
        }

        let mut out = String::with_capacity(src.len());
        let mut pos = 0;
        for edit in merged {
            out.push_str(&src[pos..edit.start]);
            pos = edit.end;
        }
        out.push_str(&src[pos..]);
        out
    }
}

/// Extend `start` backwards over spaces and tabs on the same line.
pub fn expand_ws_left(src: &str, start: usize) -> usize {
    let bytes = src.as_bytes();
    let mut s = start;
    while s > 0 && (bytes[s - 1] == b' ' || bytes[s - 1] == b'\t') {
        s -= 1;
    }
    s
}

/// Widen a statement span: leading inline whitespace, trailing inline
/// whitespace, an optional dangling `;`, and at most one newline.
pub fn expand_stmt(src: &str, start: usize, end: usize) -> (usize, usize) {
    let bytes = src.as_bytes();
    let s = expand_ws_left(src, start);

    let mut e = end;
    while e < bytes.len() && (bytes[e] == b' ' || bytes[e] == b'\t') {
        e += 1;
    }
    if e < bytes.len() && bytes[e] == b';' {
        e += 1;
        while e < bytes.len() && (bytes[e] == b' ' || bytes[e] == b'\t') {
            e += 1;
        }
    }
    if e < bytes.len() && bytes[e] == b'\r' {
        e += 1;
    }
    if e < bytes.len() && bytes[e] == b'\n' {
        e += 1;
    }
    (s, e)
}

/// Delete dropped items from a comma-separated list while keeping the
/// surrounding delimiters intact.
///
/// `items` is `(start, end, keep)` per list element in source order. A
/// dropped item is deleted together with the separator that joins it to
/// its nearest kept neighbour. The caller must handle the all-dropped
/// case itself (usually by deleting the whole enclosing construct).
pub fn delete_list_items(edits: &mut EditSet, items: &[(usize, usize, bool)]) {
    for (i, &(start, end, keep)) in items.iter().enumerate() {
        if keep {
            continue;
        }
        if let Some(&(next_start, _, _)) = items[i + 1..].iter().find(|it| it.2) {
            edits.delete(start, next_start);
        } else if let Some(&(_, prev_end, _)) = items[..i].iter().rev().find(|it| it.2) {
            edits.delete(prev_end, end);
        }
    }
}

/// Cosmetic normalization applied after import pruning: collapse runs of
/// three or more blank lines to a single blank line, and strip blank
/// lines at the very start of the file.
pub fn normalize_blank_lines(src: &str) -> String {
    let mut out = String::with_capacity(src.len());
    let mut run: Vec<&str> = Vec::new();
    let mut at_start = true;

    for line in src.split_inclusive('\n') {
        let is_blank = line.ends_with('\n') && line.trim().is_empty();
        if is_blank {
            run.push(line);
            continue;
        }
        flush_blank_run(&mut out, &run, at_start);
        run.clear();
        at_start = false;
        out.push_str(line);
    }
    flush_blank_run(&mut out, &run, at_start);
    out
}

fn flush_blank_run(out: &mut String, run: &[&str], at_start: bool) {
    if run.is_empty() || at_start {
        return;
    }
    if run.len() >= 3 {
        out.push('\n');
    } else {
        for line in run {
            out.push_str(line);
        }
    }
}
