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

//! Word expansion
//!
//! Expansion turns a [`Word`] from the abstract syntax tree into zero or
//! more [`Field`]s. The stages are applied in the POSIX order, fused
//! over [attributed characters](attr):
//!
//! 1. The _initial expansion_ performs tilde expansion, parameter
//!    expansion, command substitution and arithmetic expansion, yielding
//!    attributed characters that remember their origin and quotation.
//! 2. [Field splitting](split) breaks unquoted expansion results on the
//!    characters of `$IFS`.
//! 3. [Pathname expansion](glob) matches fields containing unquoted
//!    metacharacters against the file system.
//! 4. Quote removal strips the quoting characters.
//!
//! There are two entry points. [`expand_word`] produces exactly one
//! field without splitting or globbing; it is used for assignment
//! values, redirection targets, and `case` subjects. [`expand_words`]
//! runs the full pipeline over command arguments and `for` word lists.

use posh_env::semantics::Field;
use posh_env::system::Errno;
use posh_env::variable::IFS_INITIAL_VALUE;
use posh_env::Env;
use posh_syntax::source::Location;
use posh_syntax::syntax::{Text, Word};
use std::borrow::Cow;
use std::fmt;
use thiserror::Error;

pub mod attr;
pub mod glob;
mod initial;
pub mod split;

mod command_subst;

pub use attr::{AttrChar, AttrField, Origin};
pub(crate) use command_subst::expand_command_substitution;
pub(crate) use initial::expand_word_attr_single;

/// Types of errors that may occur in word expansion
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum ErrorCause {
    /// Reference to an unset parameter with the `Unset` option off
    UnsetParameter {
        /// Name of the parameter
        name: String,
    },
    /// `${name:?message}` on an unset or null parameter
    VacantParameter {
        /// Name of the parameter
        name: String,
        /// Custom message, if the word was not empty
        message: Option<String>,
    },
    /// `${name:=word}` on a parameter that is not a variable
    NotAssignable {
        /// Name of the parameter
        name: String,
    },
    /// `${name:=word}` on a read-only variable
    AssignReadOnly {
        /// Name of the variable
        name: String,
    },
    /// Error evaluating an arithmetic expansion
    Arith(posh_arith::ErrorCause),
    /// Error setting up a command substitution
    CommandSubstFailed(Errno),
}

impl fmt::Display for ErrorCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use ErrorCause::*;
        match self {
            UnsetParameter { name } => write!(f, "{name}: parameter not set"),
            VacantParameter { name, message } => {
                let message: Cow<str> = match message {
                    Some(message) => message.as_str().into(),
                    None => "parameter null or not set".into(),
                };
                write!(f, "{name}: {message}")
            }
            NotAssignable { name } => write!(f, "{name}: cannot assign to this parameter"),
            AssignReadOnly { name } => write!(f, "{name}: read-only variable"),
            Arith(cause) => write!(f, "arithmetic expansion: {cause}"),
            CommandSubstFailed(errno) => {
                write!(f, "cannot execute command substitution: {errno}")
            }
        }
    }
}

/// Explanation of an expansion failure
#[derive(Clone, Debug, Eq, Error, PartialEq)]
#[error("{cause}")]
pub struct Error {
    /// Cause of the error
    pub cause: ErrorCause,
    /// Location of the expansion that failed
    pub location: Location,
}

/// Result of word expansion
pub type Result<T> = std::result::Result<T, Error>;

/// Returns the active field separator characters.
fn ifs(env: &Env) -> String {
    env.variables
        .get_scalar(posh_env::variable::IFS)
        .unwrap_or(IFS_INITIAL_VALUE)
        .to_string()
}

/// Expands a word to exactly one field.
///
/// Field splitting and pathname expansion are not performed. If the word
/// contains `"$@"`, the positional parameters are joined with spaces.
pub fn expand_word(env: &mut Env, word: &Word) -> Result<Field> {
    let fields = initial::expand_word_attr(env, word)?;
    Ok(join_fields(fields, word.location))
}

/// Expands a word to a plain string.
///
/// Equivalent to [`expand_word`] but returning only the value.
pub fn expand_word_to_string(env: &mut Env, word: &Word) -> Result<String> {
    expand_word(env, word).map(|field| field.value)
}

/// Expands words to fields, with field splitting and pathname expansion.
pub fn expand_words<'a, I>(env: &mut Env, words: I) -> Result<Vec<Field>>
where
    I: IntoIterator<Item = &'a Word>,
{
    let mut result = Vec::new();
    for word in words {
        let attr_fields = initial::expand_word_attr(env, word)?;
        let ifs = ifs(env);
        for attr_field in attr_fields {
            for split_field in split::split(attr_field, &ifs) {
                result.extend(glob::glob(env, split_field));
            }
        }
    }
    Ok(result)
}

/// Expands a text to a string.
///
/// This is used for here-document contents and other contexts where the
/// result is a single string not subject to splitting, globbing, or
/// quote removal.
pub fn expand_text(env: &mut Env, text: &Text) -> Result<String> {
    initial::expand_text_to_string(env, text)
}

fn join_fields(fields: Vec<AttrField>, location: Location) -> Field {
    let mut fields = fields.into_iter();
    let Some(first) = fields.next() else {
        return Field {
            value: String::new(),
            origin: location,
        };
    };
    let mut result = first.remove_quotes();
    for field in fields {
        result.value.push(' ');
        result.value.push_str(&field.remove_quotes().value);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use posh_env::variable::Scope;
    use std::str::FromStr;

    fn word(s: &str) -> Word {
        Word::from_str(s).unwrap()
    }

    #[test]
    fn unquoted_literal_word_is_identity() {
        let mut env = Env::new_virtual();
        let field = expand_word(&mut env, &word("plain-word.txt")).unwrap();
        assert_eq!(field.value, "plain-word.txt");
    }

    #[test]
    fn quote_removal_strips_source_quotes() {
        let mut env = Env::new_virtual();
        assert_eq!(
            expand_word_to_string(&mut env, &word(r#"a'b'"c"\d"#)).unwrap(),
            "abcd"
        );
    }

    #[test]
    fn parameter_expansion_in_word() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new("x", Scope::Global)
            .assign("value")
            .unwrap();
        assert_eq!(
            expand_word_to_string(&mut env, &word("pre-${x}-post")).unwrap(),
            "pre-value-post"
        );
    }

    #[test]
    fn field_splitting_of_expansion_results() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new("x", Scope::Global)
            .assign("a b  c")
            .unwrap();
        let fields = expand_words(&mut env, &[word("$x")]).unwrap();
        let values: Vec<&str> = fields.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, ["a", "b", "c"]);
    }

    #[test]
    fn quoted_expansion_is_not_split() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new("x", Scope::Global)
            .assign("a b")
            .unwrap();
        let fields = expand_words(&mut env, &[word("\"$x\"")]).unwrap();
        let values: Vec<&str> = fields.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, ["a b"]);
    }

    #[test]
    fn literal_words_are_not_split_on_ifs_characters() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new(posh_env::variable::IFS, Scope::Global)
            .assign(":")
            .unwrap();
        let fields = expand_words(&mut env, &[word("a:b")]).unwrap();
        let values: Vec<&str> = fields.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(values, ["a:b"]);
    }

    #[test]
    fn empty_expansion_vanishes_unquoted_but_not_quoted() {
        let mut env = Env::new_virtual();
        let fields = expand_words(&mut env, &[word("$unset_variable")]).unwrap();
        assert_eq!(fields.len(), 0);

        let fields = expand_words(&mut env, &[word("\"\"")]).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].value, "");
    }

    #[test]
    fn arithmetic_expansion() {
        let mut env = Env::new_virtual();
        env.variables
            .get_or_new("n", Scope::Global)
            .assign("6")
            .unwrap();
        assert_eq!(
            expand_word_to_string(&mut env, &word("$((n * 7))")).unwrap(),
            "42"
        );
    }

    #[test]
    fn arithmetic_division_by_zero_is_an_error() {
        let mut env = Env::new_virtual();
        let e = expand_word(&mut env, &word("$((1 / 0))")).unwrap_err();
        assert_eq!(
            e.cause,
            ErrorCause::Arith(posh_arith::ErrorCause::DivisionByZero)
        );
    }
}
