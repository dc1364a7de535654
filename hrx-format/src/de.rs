//! Parsing of HRX text into an [`Archive`].

use crate::archive::{Archive, Position};
use crate::entry::{DirectoryEntry, Entry, FileEntry};
use crate::error::{ArchiveError, ParseError, ParseErrorKind};
use crate::path::{is_path_char, scan_path, IntoHrxPathError};

struct Parser<'a> {
    text: &'a str,
    file: Option<&'a str>,
    pos: usize,
    boundary: String,
    /// `boundary` preceded by a newline, for finding boundaries at line start.
    line_boundary: String,
}

pub(crate) fn parse(text: &str, file: Option<&str>) -> Result<Archive, ParseError> {
    if text.is_empty() {
        return Ok(Archive::new());
    }

    let mut parser = Parser::new(text, file)?;
    let mut archive = Archive::empty(parser.boundary.len() - 2);
    tracing::trace!("parse: boundary {}", parser.boundary);

    loop {
        parser.expect_boundary()?;

        let mut comment = None;
        if parser.eat('\n') {
            // A comment body ends with its own newline, even when empty.
            if parser.at_boundary() {
                return Err(parser.error(ParseErrorKind::ExpectedNewline));
            }
            match parser.find_line_boundary() {
                Some(end) => {
                    comment = Some(&text[parser.pos..end]);
                    parser.pos = end + 1;
                    parser.expect_boundary()?;
                }
                None => {
                    archive.set_last_comment(Some(parser.rest()));
                    break;
                }
            }
        }

        if !parser.eat(' ') {
            return Err(parser.error(ParseErrorKind::ExpectedSpace));
        }

        let path_start = parser.pos;
        let path = parser.path()?;

        if !parser.eat('\n') {
            return Err(match parser.peek() {
                Some(c) if !is_path_char(c) => parser.error(ParseErrorKind::InvalidCharacter(c)),
                _ => parser.error(ParseErrorKind::ExpectedNewline),
            });
        }

        let entry: Entry = if path.ends_with('/') {
            if !parser.at_end() && !parser.at_boundary() {
                return Err(parser.error(ParseErrorKind::ExpectedBoundary));
            }
            DirectoryEntry::new_unchecked(path, comment).into()
        } else {
            let end = parser.content_end();
            let content = &text[parser.pos..end];
            parser.pos = end;
            FileEntry::new_unchecked(path, content, comment).into()
        };

        tracing::trace!("parse: entry {}", path);
        archive.add(entry, Position::End).map_err(|err| {
            let duplicate = match err {
                ArchiveError::DefinedTwice(duplicate) => duplicate,
                _ => path.to_string(),
            };
            parser.error_at(path_start, ParseErrorKind::DefinedTwice(duplicate))
        })?;

        if parser.at_end() {
            break;
        }
    }

    Ok(archive)
}

impl<'a> Parser<'a> {
    /// Reads the first boundary to learn the width used by the whole
    /// document. The position is left at the start so the main loop can
    /// consume it like any other boundary.
    fn new(text: &'a str, file: Option<&'a str>) -> Result<Self, ParseError> {
        let width = match text.strip_prefix('<') {
            Some(rest) => rest.bytes().take_while(|b| *b == b'=').count(),
            None => 0,
        };
        if width == 0 || text.as_bytes().get(width + 1) != Some(&b'>') {
            return Err(ParseError::at(
                text,
                0,
                file,
                ParseErrorKind::ExpectedBoundary,
            ));
        }

        let boundary = format!("<{}>", "=".repeat(width));
        Ok(Parser {
            text,
            file,
            pos: 0,
            line_boundary: format!("\n{}", boundary),
            boundary,
        })
    }

    #[inline(always)]
    fn rest(&self) -> &'a str {
        &self.text[self.pos..]
    }

    #[inline(always)]
    fn at_end(&self) -> bool {
        self.pos == self.text.len()
    }

    #[inline(always)]
    fn at_boundary(&self) -> bool {
        self.rest().starts_with(&self.boundary)
    }

    #[inline(always)]
    fn peek(&self) -> Option<char> {
        self.rest().chars().next()
    }

    fn eat(&mut self, c: char) -> bool {
        if self.peek() == Some(c) {
            self.pos += c.len_utf8();
            true
        } else {
            false
        }
    }

    fn expect_boundary(&mut self) -> Result<(), ParseError> {
        if !self.at_boundary() {
            return Err(self.error(ParseErrorKind::ExpectedBoundary));
        }
        self.pos += self.boundary.len();
        Ok(())
    }

    /// Offset of the newline that precedes the next boundary, searching
    /// from the current position.
    fn find_line_boundary(&self) -> Option<usize> {
        self.rest()
            .find(&self.line_boundary)
            .map(|i| self.pos + i)
    }

    /// Where the current file's content stops: at the next boundary that
    /// starts a line, or at the end of input. A newline right before the
    /// boundary belongs to the content.
    fn content_end(&self) -> usize {
        if self.at_boundary() {
            return self.pos;
        }
        match self.find_line_boundary() {
            Some(newline) => newline + 1,
            None => self.text.len(),
        }
    }

    fn path(&mut self) -> Result<&'a str, ParseError> {
        let start = self.pos;
        let len = scan_path(self.rest()).map_err(|err| {
            let offset = self.rest()
                .char_indices()
                .nth(err.column() - 1)
                .map(|(i, _)| start + i)
                .unwrap_or(self.text.len());
            let kind = match err {
                IntoHrxPathError::EmptyPath | IntoHrxPathError::LeadingSeparator => {
                    ParseErrorKind::ExpectedPath
                }
                IntoHrxPathError::InvalidCharacter { column: 1, .. } => {
                    ParseErrorKind::ExpectedPath
                }
                IntoHrxPathError::InvalidCharacter { character, .. } => {
                    ParseErrorKind::InvalidCharacter(character)
                }
                IntoHrxPathError::ReservedComponent { component, .. } => {
                    ParseErrorKind::InvalidPathComponent(component)
                }
                IntoHrxPathError::EmptyComponent { .. } | IntoHrxPathError::TrailingSeparator => {
                    ParseErrorKind::InvalidPathComponent(String::new())
                }
            };
            self.error_at(offset, kind)
        })?;

        self.pos += len;
        Ok(&self.text[start..self.pos])
    }

    #[inline(always)]
    fn error(&self, kind: ParseErrorKind) -> ParseError {
        self.error_at(self.pos, kind)
    }

    fn error_at(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::at(self.text, offset, self.file, kind)
    }
}
