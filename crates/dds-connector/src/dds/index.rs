// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! External index base; storage is always 0-based.

use super::{Error, Result};
use crate::dynamic::MemberPath;

/// Index base applied to every index crossing the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IndexBase {
    #[default]
    Zero,
    One,
}

impl IndexBase {
    pub fn new(one_based: bool) -> Self {
        if one_based {
            IndexBase::One
        } else {
            IndexBase::Zero
        }
    }

    pub fn offset(self) -> usize {
        match self {
            IndexBase::Zero => 0,
            IndexBase::One => 1,
        }
    }

    /// External sample index to storage index, checked against `count`.
    pub fn to_internal(self, index: usize, count: usize) -> Result<usize> {
        index
            .checked_sub(self.offset())
            .filter(|&i| i < count)
            .ok_or_else(|| {
                Error::IndexOutOfRange(format!(
                    "sample index {} (valid: {})",
                    index,
                    self.describe_range(count)
                ))
            })
    }

    pub fn to_external(self, index: usize) -> usize {
        index + self.offset()
    }

    /// Rewrite the element indexes of a member path to storage indexes.
    pub fn translate_path(self, path: MemberPath) -> Result<MemberPath> {
        let offset = self.offset();
        path.map_indices(|i| i.checked_sub(offset)).map_err(|bad| {
            Error::IndexOutOfRange(format!("element index {} with {}-based indexing", bad, offset))
        })
    }

    fn describe_range(self, count: usize) -> String {
        if count == 0 {
            "none".to_string()
        } else {
            format!("{}..={}", self.offset(), count - 1 + self.offset())
        }
    }
}
