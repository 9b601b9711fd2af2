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

//! Shell command language syntax
//!
//! This module contains types that represent abstract syntax trees (ASTs)
//! of the shell language.
//!
//! The AST type that represents a whole script is [`List`], a vector of
//! [`Item`]s. An `Item` is a possibly asynchronous [`AndOrList`], which is
//! a sequence of conditionally executed [`Pipeline`]s. A `Pipeline` is a
//! sequence of [`Command`]s separated by `|`.
//!
//! Tokens that make up commands may contain quotations and expansions. A
//! [`Word`], a sequence of [`WordUnit`]s, represents such a token. Parts
//! where single- and double-quotes are not recognized (like heredoc
//! contents) are represented as [`Text`], a sequence of [`TextUnit`]s.
//!
//! Most AST types implement [`Display`](std::fmt::Display), which
//! re-serializes the tree to single-line canonical source code with
//! here-document contents omitted, and common ones implement
//! [`FromStr`](std::str::FromStr) for convenient construction in tests.

use crate::parser::lex::Keyword;
use crate::parser::lex::Operator;
use crate::source::Location;
use std::cell::OnceCell;
#[cfg(unix)]
use std::os::unix::io::RawFd;
use std::rc::Rc;

#[cfg(not(unix))]
type RawFd = i32;

/// Special parameter
///
/// Each special parameter is a single character with a special meaning in
/// the shell language. For example, `@` represents all positional
/// parameters.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SpecialParam {
    /// `@` (all positional parameters)
    At,
    /// `*` (all positional parameters)
    Asterisk,
    /// `#` (number of positional parameters)
    Number,
    /// `?` (exit status of the last command)
    Question,
    /// `-` (active shell options)
    Hyphen,
    /// `$` (process ID of the shell)
    Dollar,
    /// `!` (process ID of the last asynchronous command)
    Exclamation,
    /// `0` (name of the shell or shell script)
    Zero,
}

impl SpecialParam {
    /// Returns the special parameter for the given character, if any.
    #[must_use]
    pub fn from_char(c: char) -> Option<SpecialParam> {
        use SpecialParam::*;
        match c {
            '@' => Some(At),
            '*' => Some(Asterisk),
            '#' => Some(Number),
            '?' => Some(Question),
            '-' => Some(Hyphen),
            '$' => Some(Dollar),
            '!' => Some(Exclamation),
            '0' => Some(Zero),
            _ => None,
        }
    }
}

/// Type of a parameter
///
/// This enum distinguishes named, special and positional parameters. It
/// does not include the actual parameter name; the name is stored in a
/// separate field of the AST node that contains this value.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ParamType {
    /// Named parameter (variable)
    Variable,
    /// Special parameter
    Special(SpecialParam),
    /// Positional parameter
    ///
    /// Positional parameters are indexed starting from 1. An index too
    /// large to fit in a `usize` is stored as `usize::MAX`, which is
    /// guaranteed to spot a non-existent parameter.
    Positional(usize),
}

/// Parameter that appears in a parameter expansion
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Param {
    /// Literal representation of the parameter name as it appears in the
    /// source code, e.g. `foo`, `@`, `#`, `0`, `12`
    pub id: String,
    /// Precomputed type of the parameter
    ///
    /// Must be consistent with the `id` field; the parser ensures this
    /// invariant when it constructs a `Param` value.
    pub r#type: ParamType,
}

impl Param {
    /// Constructs a `Param` for a named parameter.
    #[must_use]
    pub fn variable<I: Into<String>>(id: I) -> Param {
        Param {
            id: id.into(),
            r#type: ParamType::Variable,
        }
    }

    /// Constructs a `Param` from a parameter name, computing its type.
    ///
    /// Returns `None` if the name is not a valid parameter name.
    #[must_use]
    pub fn from_id(id: &str) -> Option<Param> {
        let mut chars = id.chars();
        let first = chars.next()?;

        if first.is_ascii_digit() {
            // All-digit names are positional parameters, including `0`
            // which is the special parameter for the shell name.
            if !id.chars().all(|c| c.is_ascii_digit()) {
                return None;
            }
            if id == "0" {
                return Some(Param {
                    id: id.to_string(),
                    r#type: ParamType::Special(SpecialParam::Zero),
                });
            }
            let index = id.parse().unwrap_or(usize::MAX);
            return Some(Param {
                id: id.to_string(),
                r#type: ParamType::Positional(index),
            });
        }

        if chars.as_str().is_empty() {
            if let Some(special) = SpecialParam::from_char(first) {
                return Some(Param {
                    id: id.to_string(),
                    r#type: ParamType::Special(special),
                });
            }
        }

        if (first == '_' || first.is_ascii_alphabetic())
            && id.chars().all(|c| c == '_' || c.is_ascii_alphanumeric())
        {
            return Some(Param::variable(id));
        }

        None
    }
}

/// Flag that specifies how the value is substituted in a [switch](Switch)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchType {
    /// Alter an existing value, if any. (`+`)
    Alter,
    /// Substitute a missing value with a default. (`-`)
    Default,
    /// Assign a default to the variable if the value is missing. (`=`)
    Assign,
    /// Error out if the value is missing. (`?`)
    Error,
}

/// Condition that triggers a [switch](Switch)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SwitchCondition {
    /// Without a colon, the switch is triggered if the parameter is unset.
    Unset,
    /// With a colon, the switch is triggered if the parameter is unset or
    /// empty.
    UnsetOrEmpty,
}

/// Parameter expansion modifier that conditionally substitutes the value
///
/// Examples of switches include `+foo`, `:-bar` and `:=baz`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Switch {
    /// How the value is substituted
    pub r#type: SwitchType,
    /// Condition that determines whether the value is substituted
    pub condition: SwitchCondition,
    /// Word that substitutes the parameter value
    pub word: Word,
}

/// Flag that specifies which side of the value is removed in a [trim](Trim)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimSide {
    /// Beginning of the value (`#`)
    Prefix,
    /// End of the value (`%`)
    Suffix,
}

/// Flag that specifies the matching strategy in a [trim](Trim)
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TrimLength {
    /// Match as few characters as possible.
    Shortest,
    /// Match as many characters as possible.
    Longest,
}

/// Parameter expansion modifier that removes a prefix or suffix
///
/// Examples of trims include `#foo`, `##bar` and `%%baz*`.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Trim {
    /// Which side of the value is removed
    pub side: TrimSide,
    /// How long the pattern should match
    pub length: TrimLength,
    /// Pattern matched against the expanded value
    pub pattern: Word,
}

/// Attribute that modifies a parameter expansion
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Modifier {
    /// No modifier
    None,
    /// `#` prefix (`${#foo}`)
    Length,
    /// `+`, `-`, `=` or `?` suffix, optionally with `:` (`${foo:-bar}`)
    Switch(Switch),
    /// `#`, `##`, `%` or `%%` suffix (`${foo%bar}`)
    Trim(Trim),
}

/// Parameter expansion enclosed in braces
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct BracedParam {
    /// Parameter to be expanded
    pub param: Param,
    /// Modifier
    pub modifier: Modifier,
    /// Position of this parameter expansion in the source code
    pub location: Location,
}

/// Element of [`TextUnit::Backquote`]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BackquoteUnit {
    /// Literal single character
    Literal(char),
    /// Backslash-escaped single character
    Backslashed(char),
}

/// Element of a [`Text`], i.e., something that can be expanded
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum TextUnit {
    /// Literal single character
    Literal(char),
    /// Backslash-escaped single character
    Backslashed(char),
    /// Parameter expansion that is not enclosed in braces
    RawParam {
        /// Parameter to be expanded
        param: Param,
        /// Position of this parameter expansion in the source code
        location: Location,
    },
    /// Parameter expansion that is enclosed in braces
    BracedParam(BracedParam),
    /// Command substitution of the form `$(...)`
    CommandSubst {
        /// Command string that will be parsed and executed when the
        /// command substitution is expanded
        ///
        /// This value is reference-counted so that the whole string does
        /// not have to be cloned when it is passed to a subshell.
        content: Rc<str>,
        /// Position of this command substitution in the source code
        location: Location,
    },
    /// Command substitution of the form `` `...` ``
    Backquote {
        /// Command string that will be parsed and executed when the
        /// command substitution is expanded
        content: Vec<BackquoteUnit>,
        /// Position of this command substitution in the source code
        location: Location,
    },
    /// Arithmetic expansion
    Arith {
        /// Expression that is to be evaluated
        content: Text,
        /// Position of this arithmetic expansion in the source code
        location: Location,
    },
}

pub use TextUnit::*;

/// String that may contain some expansions
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Text(pub Vec<TextUnit>);

impl Text {
    /// Creates a text consisting of literal characters only.
    #[must_use]
    pub fn from_literal_chars<I: IntoIterator<Item = char>>(chars: I) -> Text {
        Text(chars.into_iter().map(Literal).collect())
    }

    /// Returns the text as a string if it contains no expansions.
    #[must_use]
    pub fn to_string_if_literal(&self) -> Option<String> {
        self.0
            .iter()
            .map(|unit| match unit {
                Literal(c) => Some(*c),
                _ => None,
            })
            .collect()
    }
}

/// Element of a [`Word`], i.e., text with quotes and tilde expansion
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum WordUnit {
    /// Unquoted [`TextUnit`] as a word unit
    Unquoted(TextUnit),
    /// String surrounded with a pair of single quotations
    SingleQuote(String),
    /// Text surrounded with a pair of double quotations
    DoubleQuote(Text),
    /// Tilde expansion
    ///
    /// The `String` value does not contain the initial tilde.
    Tilde(String),
}

pub use WordUnit::*;

/// Token that may involve expansions and quotes
///
/// A word is a sequence of [word unit](WordUnit)s. It depends on context
/// whether an empty word is valid or not.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Word {
    /// Word units that constitute the word
    pub units: Vec<WordUnit>,
    /// Position of the word in the source code
    pub location: Location,
}

impl Word {
    /// Returns the word as a string if it consists solely of unquoted
    /// literal characters.
    #[must_use]
    pub fn to_string_if_literal(&self) -> Option<String> {
        self.units
            .iter()
            .map(|unit| match unit {
                Unquoted(Literal(c)) => Some(*c),
                _ => None,
            })
            .collect()
    }

    /// Removes quotes from the word, returning the resulting string and
    /// whether any part of the word was quoted.
    ///
    /// Expansions are rendered in their literal spelling; this function
    /// is meant for words that must not be expanded, like here-document
    /// delimiters.
    #[must_use]
    pub fn unquote(&self) -> (String, bool) {
        let mut result = String::new();
        let mut quoted = false;
        for unit in &self.units {
            match unit {
                Unquoted(Literal(c)) => result.push(*c),
                Unquoted(Backslashed(c)) => {
                    result.push(*c);
                    quoted = true;
                }
                Unquoted(unit) => result.push_str(&unit.to_string()),
                SingleQuote(s) => {
                    result.push_str(s);
                    quoted = true;
                }
                DoubleQuote(Text(units)) => {
                    for unit in units {
                        match unit {
                            Literal(c) | Backslashed(c) => result.push(*c),
                            unit => result.push_str(&unit.to_string()),
                        }
                    }
                    quoted = true;
                }
                Tilde(name) => {
                    result.push('~');
                    result.push_str(name);
                }
            }
        }
        (result, quoted)
    }
}

/// Assignment word
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Assign {
    /// Name of the variable to assign to
    ///
    /// In the valid assignment syntax, the name is non-empty.
    pub name: String,
    /// Value assigned to the variable
    pub value: Word,
    /// Location of the whole assignment word
    pub location: Location,
}

/// Returns whether the string is a valid variable name.
#[must_use]
pub fn is_name(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {
            chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        }
        _ => false,
    }
}

/// Fallible conversion from a word to an assignment
///
/// The conversion succeeds if the word starts with unquoted literal
/// characters forming a valid name followed by an unquoted `=`. The
/// original word is returned intact on failure.
impl TryFrom<Word> for Assign {
    type Error = Word;
    fn try_from(word: Word) -> Result<Assign, Word> {
        let mut name = String::new();
        for (index, unit) in word.units.iter().enumerate() {
            match unit {
                Unquoted(Literal('=')) if !name.is_empty() => {
                    if !is_name(&name) {
                        return Err(word);
                    }
                    let mut value = Word {
                        units: word.units[index + 1..].to_vec(),
                        location: word.location,
                    };
                    value.location.advance(index as u64 + 1);
                    return Ok(Assign {
                        name,
                        value,
                        location: word.location,
                    });
                }
                Unquoted(Literal(c)) => name.push(*c),
                _ => return Err(word),
            }
        }
        Err(word)
    }
}

/// File descriptor
///
/// This is the `newtype` pattern applied to [`RawFd`].
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct Fd(pub RawFd);

impl Fd {
    /// File descriptor for the standard input
    pub const STDIN: Fd = Fd(0);
    /// File descriptor for the standard output
    pub const STDOUT: Fd = Fd(1);
    /// File descriptor for the standard error
    pub const STDERR: Fd = Fd(2);
}

impl std::fmt::Display for Fd {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Redirection operators
///
/// This enum defines the redirection operator types except here-documents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RedirOp {
    /// `<` (open a file for input)
    FileIn,
    /// `<>` (open a file for input and output)
    FileInOut,
    /// `>` (open a file for output; truncate or fail if existing)
    FileOut,
    /// `>>` (open a file for output; append if existing)
    FileAppend,
    /// `>|` (open a file for output; always truncate if existing)
    FileClobber,
    /// `<&` (copy or close a file descriptor for input)
    FdIn,
    /// `>&` (copy or close a file descriptor for output)
    FdOut,
}

impl TryFrom<Operator> for RedirOp {
    type Error = ();
    fn try_from(op: Operator) -> Result<RedirOp, ()> {
        use Operator::*;
        match op {
            Less => Ok(RedirOp::FileIn),
            LessGreater => Ok(RedirOp::FileInOut),
            Greater => Ok(RedirOp::FileOut),
            GreaterGreater => Ok(RedirOp::FileAppend),
            GreaterBar => Ok(RedirOp::FileClobber),
            LessAnd => Ok(RedirOp::FdIn),
            GreaterAnd => Ok(RedirOp::FdOut),
            _ => Err(()),
        }
    }
}

/// Here-document
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HereDoc {
    /// Token that marks the end of the content of the here-document
    pub delimiter: Word,

    /// Whether leading tab characters should be removed from each content
    /// line
    ///
    /// This value is `true` for the `<<-` operator and `false` for `<<`.
    pub remove_tabs: bool,

    /// Content of the here-document
    ///
    /// The content ends with a newline unless it is empty. If the
    /// delimiter is quoted, the content is all literal.
    ///
    /// The here-doc content is parsed separately from the here-doc
    /// operator: the operator is parsed first with an empty cell, and the
    /// content is filled in after the newline terminating the command
    /// line. When accessing the parsed content, you can safely unwrap the
    /// cell.
    pub content: OnceCell<Text>,
}

/// Part of a redirection that defines the nature of the resulting file
/// descriptor
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum RedirBody {
    /// Normal redirection
    Normal { operator: RedirOp, operand: Word },
    /// Here-document
    HereDoc(Rc<HereDoc>),
}

impl RedirBody {
    /// Returns the operand word of the redirection.
    pub fn operand(&self) -> &Word {
        match self {
            RedirBody::Normal { operand, .. } => operand,
            RedirBody::HereDoc(here_doc) => &here_doc.delimiter,
        }
    }
}

/// Redirection
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Redir {
    /// File descriptor that is modified by this redirection
    pub fd: Option<Fd>,
    /// Nature of the resulting file descriptor
    pub body: RedirBody,
}

impl Redir {
    /// Computes the file descriptor that is modified by this redirection.
    ///
    /// If `self.fd` is `Some(_)`, the value is returned intact. Otherwise,
    /// the default file descriptor is selected depending on the type of
    /// `self.body`.
    #[must_use]
    pub fn fd_or_default(&self) -> Fd {
        use RedirOp::*;
        self.fd.unwrap_or(match self.body {
            RedirBody::Normal { operator, .. } => match operator {
                FileIn | FileInOut | FdIn => Fd::STDIN,
                FileOut | FileAppend | FileClobber | FdOut => Fd::STDOUT,
            },
            RedirBody::HereDoc { .. } => Fd::STDIN,
        })
    }
}

/// Command that involves assignments, redirections, and word expansions
///
/// In the shell language syntax, a valid simple command must contain at
/// least one of assignments, redirections, and words. The parser does not
/// produce a completely empty simple command.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SimpleCommand {
    /// Assignments
    pub assigns: Vec<Assign>,
    /// Command name and arguments
    pub words: Vec<Word>,
    /// Redirections
    pub redirs: Rc<Vec<Redir>>,
}

impl SimpleCommand {
    /// Returns true if the simple command does not contain any
    /// assignments, words, or redirections.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.assigns.is_empty() && self.words.is_empty() && self.redirs.is_empty()
    }

    /// Tests whether the first word of the simple command is a keyword.
    #[must_use]
    pub fn first_word_is_keyword(&self) -> bool {
        let Some(word) = self.words.first() else {
            return false;
        };
        let Some(literal) = word.to_string_if_literal() else {
            return false;
        };
        literal.parse::<Keyword>().is_ok()
    }
}

/// `elif-then` clause
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ElifThen {
    pub condition: List,
    pub body: List,
}

/// Branch item of a `case` compound command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CaseItem {
    /// Array of patterns that are matched against the main word of the
    /// case compound command to decide if the body of this item should be
    /// executed
    ///
    /// A syntactically valid case item has at least one pattern.
    pub patterns: Vec<Word>,
    /// Commands that are executed if any of the patterns matched
    pub body: List,
}

/// Command that contains other commands
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CompoundCommand {
    /// List as a command, surrounded with `{ }`
    Grouping(List),
    /// Command for executing commands in a subshell
    Subshell { body: Rc<List>, location: Location },
    /// For loop
    For {
        name: Word,
        /// Words iterated over; `None` means the positional parameters
        values: Option<Vec<Word>>,
        body: List,
    },
    /// While loop
    While { condition: List, body: List },
    /// Until loop
    Until { condition: List, body: List },
    /// If conditional construct
    If {
        condition: List,
        body: List,
        elifs: Vec<ElifThen>,
        r#else: Option<List>,
    },
    /// Case conditional construct
    Case { subject: Word, items: Vec<CaseItem> },
}

/// Compound command with redirections
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FullCompoundCommand {
    /// The main part
    pub command: CompoundCommand,
    /// Redirections
    pub redirs: Vec<Redir>,
}

/// Function definition command
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct FunctionDefinition {
    /// Whether the command starts with the `function` reserved word
    pub has_keyword: bool,
    /// Function name
    pub name: Word,
    /// Function body
    ///
    /// The body is `Rc`-shared with the function table entry created when
    /// the definition is executed.
    pub body: Rc<FullCompoundCommand>,
}

/// Element of a pipe sequence
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Command {
    /// Simple command
    Simple(SimpleCommand),
    /// Compound command
    Compound(FullCompoundCommand),
    /// Function definition command
    Function(FunctionDefinition),
}

/// Commands separated by `|`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Pipeline {
    /// Elements of the pipeline
    ///
    /// A valid pipeline has at least one command. The commands are
    /// contained in `Rc` so pipeline stages can be passed to child
    /// processes without cloning the tree.
    pub commands: Vec<Rc<Command>>,
    /// Whether the pipeline begins with a `!`
    pub negation: bool,
}

/// Condition that decides if a [`Pipeline`] in an [and-or list](AndOrList)
/// should be executed
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AndOr {
    /// `&&`
    AndThen,
    /// `||`
    OrElse,
}

/// Pipelines separated by `&&` and `||`
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct AndOrList {
    pub first: Pipeline,
    pub rest: Vec<(AndOr, Pipeline)>,
}

/// Element of a [`List`]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Item {
    /// Main part of this item
    ///
    /// The and-or list is contained in `Rc` so asynchronous commands can
    /// be passed to child processes without cloning.
    pub and_or: Rc<AndOrList>,
    /// Location of the `&` operator for this item, if any
    pub async_flag: Option<Location>,
}

/// Sequence of [and-or lists](AndOrList) separated by `;` or `&`
///
/// It depends on context whether an empty list is a valid syntax.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct List(pub Vec<Item>);

/// Implementations of [`std::fmt::Display`] for the syntax types
mod impl_display;
