//! Parsing front-end.
//!
//! Wraps the SWC TypeScript parser behind the pipeline's `Dialect` type
//! and reports failures as typed `ParseError`s with source locations.

use swc_common::{
    comments::SingleThreadedComments, sync::Lrc, BytePos, FileName, SourceFile, SourceMap, Spanned,
};
use swc_ecma_ast::{EsVersion, Module};
use swc_ecma_parser::{Syntax, TsSyntax};
use tl_common::{Dialect, Error, Result};

/// Result of parsing one source string.
///
/// The tree, comments, and maps live only for the duration of a single
/// processing call; nothing here is shared across files.
pub struct ParseResult {
    pub module: Module,
    pub comments: SingleThreadedComments,
    pub source_map: Lrc<SourceMap>,
    pub source_file: Lrc<SourceFile>,
}

impl ParseResult {
    /// Base position of the parsed file, for converting node spans to
    /// byte offsets into the original string.
    pub fn base_pos(&self) -> BytePos {
        self.source_file.start_pos
    }
}

/// Parse a TypeScript source string. The markup (TSX) extension is
/// enabled according to the dialect.
pub fn parse_module(source: &str, filename: &str, dialect: Dialect) -> Result<ParseResult> {
    let source_map: Lrc<SourceMap> = Default::default();
    let source_file = source_map.new_source_file(
        Lrc::new(FileName::Custom(filename.to_string())),
        source.to_string(),
    );

    let comments = SingleThreadedComments::default();

    let syntax = Syntax::Typescript(TsSyntax {
        tsx: dialect.markup,
        decorators: true,
        ..Default::default()
    });

    let module = swc_ecma_parser::parse_file_as_module(
        &source_file,
        syntax,
        EsVersion::latest(),
        Some(&comments),
        &mut vec![],
    )
    .map_err(|e| {
        let loc = source_map.lookup_char_pos(e.span().lo);
        Error::Parse {
            file: filename.to_string(),
            line: loc.line,
            col: loc.col_display,
            message: e.into_kind().msg().to_string(),
        }
    })?;

    Ok(ParseResult {
        module,
        comments,
        source_map,
        source_file,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_typed_source() {
        let parsed = parse_module("const x: number = 1;", "test.ts", Dialect::ts()).unwrap();
        assert_eq!(parsed.module.body.len(), 1);
    }

    #[test]
    fn markup_dialect_accepts_tags() {
        let src = r#"const el = <div id="a">x</div>;"#;
        assert!(parse_module(src, "test.tsx", Dialect::tsx()).is_ok());
        assert!(parse_module(src, "test.ts", Dialect::ts()).is_err());
    }

    #[test]
    fn parse_error_carries_location() {
        let err = match parse_module("const = ;", "bad.ts", Dialect::ts()) {
            Err(err) => err,
            Ok(_) => panic!("expected parse error"),
        };
        match err {
            Error::Parse { file, line, .. } => {
                assert_eq!(file, "bad.ts");
                assert_eq!(line, 1);
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }
}
