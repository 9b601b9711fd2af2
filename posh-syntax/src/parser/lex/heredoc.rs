// This file is part of posh, a POSIX command language interpreter.
// Copyright (C) 2024 the posh authors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

//! Here-document content parsing
//!
//! The body of a here-document is read separately from the `<<` operator:
//! the parser calls [`Lexer::here_doc_content`] after it has consumed the
//! newline token terminating the command line that contains the operator.

use super::core::Lexer;
use crate::parser::core::{Error, ErrorCause, Result, SyntaxError};
use crate::syntax::HereDoc;
use crate::syntax::Text;
use crate::syntax::TextUnit::Literal;

/// Set of characters that a backslash escapes in a here-document body
fn is_escapable_in_here_doc(c: char) -> bool {
    matches!(c, '$' | '`' | '\\')
}

impl Lexer<'_> {
    /// Reads characters up to (but not including) the next newline,
    /// returning them as a plain string.
    fn raw_line(&mut self) -> Result<String> {
        let mut line = String::new();
        while let Some(sc) = self.consume_char_if(|c| c != '\n')? {
            line.push(sc.value);
        }
        Ok(line)
    }

    /// Reads the content of a here-document.
    ///
    /// Whole lines are accepted until a line (after leading tabs are
    /// stripped, for `<<-`) equals the delimiter exactly. If the
    /// delimiter contains any quoting, the content is literal; otherwise
    /// `$`, backquotes and backslashes retain their special meaning.
    ///
    /// The content is stored into `here_doc.content`. This function must
    /// be called exactly once per here-document.
    pub fn here_doc_content(&mut self, here_doc: &HereDoc) -> Result<()> {
        let (delimiter, literal) = here_doc.delimiter.unquote();

        let mut content = Vec::new();
        loop {
            if here_doc.remove_tabs {
                while self.consume_char_if(|c| c == '\t')?.is_some() {}
            }

            let line_start = self.index();
            let line = self.raw_line()?;
            let newline = self.peek_char()? == Some('\n');

            if line == delimiter {
                if newline {
                    self.consume_char();
                }
                break;
            }

            if !newline && line.is_empty() {
                // End of input without seeing the delimiter
                return Err(Error {
                    cause: ErrorCause::Syntax(SyntaxError::UnclosedHereDocContent {
                        delimiter,
                    }),
                    location: here_doc.delimiter.location,
                });
            }

            if literal {
                content.extend(line.chars().map(Literal));
                if newline {
                    self.consume_char();
                    content.push(Literal('\n'));
                }
            } else {
                self.rewind(line_start);
                let text = self.text(|c| c == '\n', is_escapable_in_here_doc, false)?;
                content.extend(text.0);
                // An expansion may have consumed lines of its own, so the
                // newline must be re-examined rather than reusing the flag
                // computed above.
                if self.peek_char()? == Some('\n') {
                    self.consume_char();
                    content.push(Literal('\n'));
                }
            }
        }

        here_doc
            .content
            .set(Text(content))
            .expect("here-document content must be filled only once");
        Ok(())
    }
}
