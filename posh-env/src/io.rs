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

//! File descriptor basics

#[doc(no_inline)]
pub use posh_syntax::syntax::Fd;

/// Minimum file descriptor the shell uses for internal purposes
///
/// POSIX requires file descriptors 0 through 9 to be freely usable by
/// shell scripts, so the shell saves and duplicates file descriptors at
/// 10 or above when possible.
pub const MIN_INTERNAL_FD: Fd = Fd(10);
