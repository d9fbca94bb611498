//! Text program loader.
//!
//! A program file holds one 8-bit binary literal per line. Anything after a
//! `#` is a comment; blank lines are skipped. Parsed bytes load into memory
//! sequentially from address 0.

use std::path::Path;

use crate::error::LoadError;

pub fn parse(source: &str) -> Result<Vec<u8>, LoadError> {
    let mut bytes = Vec::new();
    for (number, line) in source.lines().enumerate() {
        let code = line.find('#').map_or(line, |i| &line[..i]).trim();
        if code.is_empty() {
            continue;
        }
        let byte = u8::from_str_radix(code, 2).map_err(|_| LoadError::InvalidLiteral {
            line: number + 1,
            text: code.to_string(),
        })?;
        bytes.push(byte);
    }
    Ok(bytes)
}

pub fn read(path: &Path) -> Result<Vec<u8>, LoadError> {
    let source = std::fs::read_to_string(path)?;
    parse(&source)
}

#[cfg(test)]
mod tests {
    use super::{parse, read};
    use crate::error::LoadError;

    #[test]
    fn test_parse_skips_comments_and_blanks() {
        let source = "# print8.ls8\n\n10000010 # LDI R0,8\n00000000\n00001000\n\n00000001\n";
        assert_eq!(
            parse(source).unwrap(),
            vec![0b10000010, 0b00000000, 0b00001000, 0b00000001]
        );
    }

    #[test]
    fn test_parse_rejects_bad_literal() {
        let err = parse("10000010\nnot-binary\n").unwrap_err();
        match err {
            LoadError::InvalidLiteral { line, text } => {
                assert_eq!(line, 2);
                assert_eq!(text, "not-binary");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_parse_rejects_wide_literal() {
        assert!(matches!(
            parse("100000001\n"),
            Err(LoadError::InvalidLiteral { line: 1, .. })
        ));
    }

    #[test]
    fn test_read_missing_file() {
        let err = read(std::path::Path::new("/nonexistent/program.ls8")).unwrap_err();
        assert!(matches!(err, LoadError::Io(_)));
    }
}
