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

//! Abstract syntax tree for globbing patterns
//!
//! This module parses a sequence of [`PatternChar`]s into an [`Ast`] and
//! converts the AST into a regular expression string accepted by the
//! `regex` crate.

use crate::Config;
use crate::Error;
use crate::PatternChar;
use regex_syntax::ast::ClassAsciiKind;

/// Bracket expression component
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketAtom {
    /// Literal character
    Char(char),
    /// Collating symbol (`[.x.]`)
    CollatingSymbol(String),
    /// Equivalence class (`[=x=]`)
    EquivalenceClass(String),
    /// Character class (`[:digit:]`)
    CharClass(ClassAsciiKind),
}

/// Bracket expression component, either a single atom or a range
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum BracketItem {
    /// Atom
    Atom(BracketAtom),
    /// Character range
    Range(char, char),
}

/// Bracket expression
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Bracket {
    /// Whether there is an initial `!`
    ///
    /// When the bracket expression starts with an `!`, the set of matching
    /// characters is inverted.
    pub complement: bool,

    /// Content of the bracket expression
    pub items: Vec<BracketItem>,
}

/// Pattern component
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Atom {
    /// Literal character
    Char(char),
    /// Pattern that matches a single character (`?`)
    AnyChar,
    /// Pattern that matches any string (`*`)
    AnyString,
    /// Bracket expression
    Bracket(Bracket),
}

/// Abstract syntax tree for a whole pattern
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Ast {
    /// Content of the pattern
    pub atoms: Vec<Atom>,
}

/// Parses a bracket atom starting at `chars[i]`.
///
/// Handles the `[:class:]`, `[.symbol.]` and `[=equiv=]` forms as well as
/// single characters. Returns the atom and the index just past it.
fn parse_bracket_atom(chars: &[PatternChar], i: usize) -> Result<Option<(BracketAtom, usize)>, Error> {
    use PatternChar::Normal;

    let Some(&first) = chars.get(i) else {
        return Ok(None);
    };

    if let Normal('[') = first {
        if let Some(&Normal(kind @ (':' | '.' | '='))) = chars.get(i + 1) {
            // Scan for the matching ":]", ".]" or "=]" terminator.
            let mut j = i + 2;
            let mut value = String::new();
            while let Some(&c) = chars.get(j) {
                if c == Normal(kind) && chars.get(j + 1) == Some(&Normal(']')) {
                    let atom = match kind {
                        ':' => match ClassAsciiKind::from_name(&value) {
                            Some(class) => BracketAtom::CharClass(class),
                            None => return Err(Error::UndefinedCharClass(value)),
                        },
                        '.' => BracketAtom::CollatingSymbol(value),
                        _ => BracketAtom::EquivalenceClass(value),
                    };
                    return Ok(Some((atom, j + 2)));
                }
                value.push(c.char_value());
                j += 1;
            }
            // No terminator; fall through to a literal `[`.
        }
    }

    Ok(Some((BracketAtom::Char(first.char_value()), i + 1)))
}

/// Parses a bracket expression starting just after the opening `[`.
///
/// Returns `Ok(None)` if the bracket expression is not terminated, in
/// which case the caller treats the `[` as a literal character.
fn parse_bracket(chars: &[PatternChar], start: usize) -> Result<Option<(Bracket, usize)>, Error> {
    use PatternChar::Normal;

    let mut i = start;
    let complement = if chars.get(i) == Some(&Normal('!')) {
        i += 1;
        true
    } else {
        false
    };

    let mut items = Vec::new();
    loop {
        if chars.get(i) == Some(&Normal(']')) && !items.is_empty() {
            return Ok(Some((Bracket { complement, items }, i + 1)));
        }

        let Some((atom, next)) = parse_bracket_atom(chars, i)? else {
            return Ok(None);
        };
        i = next;

        // A `-` between two single characters forms a range unless it is
        // the last character before the closing `]`.
        if let BracketAtom::Char(low) = atom {
            if chars.get(i) == Some(&Normal('-')) && chars.get(i + 1) != Some(&Normal(']')) {
                if let Some((BracketAtom::Char(high), next)) = parse_bracket_atom(chars, i + 1)? {
                    if low <= high {
                        items.push(BracketItem::Range(low, high));
                        i = next;
                        continue;
                    }
                }
            }
        }

        items.push(BracketItem::Atom(atom));
    }
}

impl Ast {
    /// Parses a pattern.
    pub fn new<I>(pattern: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = PatternChar>,
    {
        use PatternChar::Normal;

        let chars: Vec<PatternChar> = pattern.into_iter().collect();
        let mut atoms = Vec::new();
        let mut i = 0;
        while let Some(&c) = chars.get(i) {
            match c {
                Normal('?') => {
                    atoms.push(Atom::AnyChar);
                    i += 1;
                }
                Normal('*') => {
                    // Adjacent asterisks are equivalent to one.
                    if atoms.last() != Some(&Atom::AnyString) {
                        atoms.push(Atom::AnyString);
                    }
                    i += 1;
                }
                Normal('[') => match parse_bracket(&chars, i + 1)? {
                    Some((bracket, next)) => {
                        atoms.push(Atom::Bracket(bracket));
                        i = next;
                    }
                    None => {
                        atoms.push(Atom::Char('['));
                        i += 1;
                    }
                },
                c => {
                    atoms.push(Atom::Char(c.char_value()));
                    i += 1;
                }
            }
        }
        Ok(Ast { atoms })
    }

    /// Returns the pattern as a literal string if it contains no
    /// metacharacters.
    #[must_use]
    pub fn to_literal(&self) -> Option<String> {
        self.atoms
            .iter()
            .map(|atom| match atom {
                Atom::Char(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

/// Appends a literal character to a regular expression string.
fn push_literal(out: &mut String, c: char) {
    if regex_syntax::is_meta_character(c) {
        out.push('\\');
    }
    out.push(c);
}

/// Appends a character as a member of a bracket class.
fn push_class_member(out: &mut String, c: char) {
    if matches!(c, '[' | ']' | '^' | '&' | '-' | '\\' | '~') {
        out.push('\\');
    }
    out.push(c);
}

fn push_bracket_atom(out: &mut String, atom: &BracketAtom) {
    match atom {
        BracketAtom::Char(c) => push_class_member(out, *c),
        // Locale-specific collation is not supported; the symbol matches
        // the character sequence spelled in the pattern.
        BracketAtom::CollatingSymbol(s) | BracketAtom::EquivalenceClass(s) => {
            for c in s.chars() {
                push_class_member(out, c);
            }
        }
        BracketAtom::CharClass(class) => {
            out.push_str("[:");
            out.push_str(class_name(class));
            out.push_str(":]");
        }
    }
}

fn class_name(class: &ClassAsciiKind) -> &'static str {
    use ClassAsciiKind::*;
    match class {
        Alnum => "alnum",
        Alpha => "alpha",
        Ascii => "ascii",
        Blank => "blank",
        Cntrl => "cntrl",
        Digit => "digit",
        Graph => "graph",
        Lower => "lower",
        Print => "print",
        Punct => "punct",
        Space => "space",
        Upper => "upper",
        Word => "word",
        Xdigit => "xdigit",
    }
}

fn push_bracket(out: &mut String, bracket: &Bracket, guard_period: bool) {
    let mut class = String::new();
    for item in &bracket.items {
        match item {
            BracketItem::Atom(atom) => push_bracket_atom(&mut class, atom),
            BracketItem::Range(low, high) => {
                push_class_member(&mut class, *low);
                class.push('-');
                push_class_member(&mut class, *high);
            }
        }
    }

    if bracket.complement {
        out.push_str("[^");
        out.push_str(&class);
        if guard_period {
            out.push_str("\\.");
        }
        out.push(']');
    } else if guard_period {
        // An initial period must be matched explicitly, so intersect the
        // class with the set of non-period characters.
        out.push_str("[[");
        out.push_str(&class);
        out.push_str("]&&[^\\.]]");
    } else {
        out.push('[');
        out.push_str(&class);
        out.push(']');
    }
}

/// Converts the AST to a regular expression string.
///
/// The result is anchored at both ends and matches the whole subject
/// string, with `.` matching newlines as well since file and variable
/// contents may contain them.
pub fn to_regex(ast: &Ast, config: Config) -> String {
    let mut out = String::from("(?s)^");
    for (i, atom) in ast.atoms.iter().enumerate() {
        let guard_period = i == 0 && config.literal_period;
        match atom {
            Atom::Char(c) => push_literal(&mut out, *c),
            Atom::AnyChar => out.push_str(if guard_period { "[^\\.]" } else { "." }),
            Atom::AnyString => out.push_str(if guard_period { "(?:[^\\.].*)?" } else { ".*" }),
            Atom::Bracket(bracket) => push_bracket(&mut out, bracket, guard_period),
        }
    }
    out.push('$');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::with_escape;
    use crate::without_escape;

    #[test]
    fn literal_characters() {
        let ast = Ast::new(without_escape("abc")).unwrap();
        assert_eq!(
            ast.atoms,
            [Atom::Char('a'), Atom::Char('b'), Atom::Char('c')]
        );
        assert_eq!(ast.to_literal(), Some("abc".to_string()));
    }

    #[test]
    fn escaped_metacharacters_are_literal() {
        let ast = Ast::new(with_escape(r"\*\?")).unwrap();
        assert_eq!(ast.atoms, [Atom::Char('*'), Atom::Char('?')]);
    }

    #[test]
    fn wildcards() {
        let ast = Ast::new(without_escape("a*b?")).unwrap();
        assert_eq!(
            ast.atoms,
            [
                Atom::Char('a'),
                Atom::AnyString,
                Atom::Char('b'),
                Atom::AnyChar,
            ]
        );
        assert_eq!(ast.to_literal(), None);
    }

    #[test]
    fn simple_bracket() {
        let ast = Ast::new(without_escape("[abc]")).unwrap();
        assert_eq!(
            ast.atoms,
            [Atom::Bracket(Bracket {
                complement: false,
                items: vec![
                    BracketItem::Atom(BracketAtom::Char('a')),
                    BracketItem::Atom(BracketAtom::Char('b')),
                    BracketItem::Atom(BracketAtom::Char('c')),
                ],
            })]
        );
    }

    #[test]
    fn complement_bracket_with_leading_close_bracket() {
        let ast = Ast::new(without_escape("[!]x]")).unwrap();
        assert_eq!(
            ast.atoms,
            [Atom::Bracket(Bracket {
                complement: true,
                items: vec![
                    BracketItem::Atom(BracketAtom::Char(']')),
                    BracketItem::Atom(BracketAtom::Char('x')),
                ],
            })]
        );
    }

    #[test]
    fn bracket_range() {
        let ast = Ast::new(without_escape("[0-9-]")).unwrap();
        assert_eq!(
            ast.atoms,
            [Atom::Bracket(Bracket {
                complement: false,
                items: vec![
                    BracketItem::Range('0', '9'),
                    BracketItem::Atom(BracketAtom::Char('-')),
                ],
            })]
        );
    }

    #[test]
    fn character_class() {
        let ast = Ast::new(without_escape("[[:digit:]]")).unwrap();
        assert_eq!(
            ast.atoms,
            [Atom::Bracket(Bracket {
                complement: false,
                items: vec![BracketItem::Atom(BracketAtom::CharClass(
                    ClassAsciiKind::Digit
                ))],
            })]
        );
    }

    #[test]
    fn undefined_character_class() {
        let e = Ast::new(without_escape("[[:bogus:]]")).unwrap_err();
        assert_eq!(e, Error::UndefinedCharClass("bogus".to_string()));
    }

    #[test]
    fn unclosed_bracket_is_literal() {
        let ast = Ast::new(without_escape("a[b")).unwrap();
        assert_eq!(
            ast.atoms,
            [Atom::Char('a'), Atom::Char('['), Atom::Char('b')]
        );
    }

    #[test]
    fn quoted_bracket_does_not_open_expression() {
        let ast = Ast::new(with_escape(r"\[a]")).unwrap();
        assert_eq!(
            ast.atoms,
            [Atom::Char('['), Atom::Char('a'), Atom::Char(']')]
        );
    }
}
