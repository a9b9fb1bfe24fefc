// linkback is an incremental backup tool
// Copyright (C) 2025  Javier Lancha Vázquez <javier.lancha@gmail.com>
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

use std::{fmt::Display, str::FromStr};

use anyhow::{Context, Result};
use dialoguer::{Confirm, Input};

/// Asks for a value, offering `default`. When `auto_confirm` is set the default
/// is returned without touching the terminal.
pub fn ask_value<T>(prompt: &str, default: T, auto_confirm: bool) -> Result<T>
where
    T: Clone + Display + FromStr,
    T::Err: Display + std::fmt::Debug,
{
    if auto_confirm {
        return Ok(default);
    }

    Input::<T>::new()
        .with_prompt(prompt)
        .default(default)
        .interact_text()
        .with_context(|| format!("Failed to read answer to \'{}\'", prompt))
}

/// Asks a yes/no question. When `auto_confirm` is set the default is returned.
pub fn confirm(prompt: &str, default: bool, auto_confirm: bool) -> Result<bool> {
    if auto_confirm {
        return Ok(default);
    }

    Confirm::new()
        .with_prompt(prompt)
        .default(default)
        .interact()
        .with_context(|| format!("Failed to read answer to \'{}\'", prompt))
}
