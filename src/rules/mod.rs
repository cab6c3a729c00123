// SPDX-FileCopyrightText: 2026 pomerge contributors
//
// SPDX-License-Identifier: GPL-3.0-or-later

//! Sanity checks on extracted msgids.

pub mod bullets;
pub mod ellipsis;
pub mod formats;
pub mod plurals;
pub mod quotes;
pub mod rule;
pub mod urls;
