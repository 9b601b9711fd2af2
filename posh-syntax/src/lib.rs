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

//! This crate defines the shell command language syntax and its parser.
//!
//! The language syntax is modeled in the [`syntax`] module as a family of
//! owned sum types. The [`parser`] module lexes and parses source code
//! into that model. Source code is read through the [`input`] module, and
//! the parser substitutes [aliases](alias) it looks up through the
//! [`alias::Glossary`] trait.
//!
//! This crate does not execute anything; command semantics live in the
//! `posh-semantics` crate against the environment defined in `posh-env`.

pub mod alias;
pub mod input;
pub mod parser;
pub mod source;
pub mod syntax;
