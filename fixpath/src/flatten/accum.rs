// Copyright 2025 the Fixpath Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Scaled integers with an explicit remainder.
//!
//! A value is `int + rem / M` where `M = rmask + 1` is a power of two and
//! `0 <= rem <= rmask`. The remainder has at least one free high bit, so a sum of two
//! remainders never wraps before the carry is taken out.

use crate::error::{PathError, Result};
use crate::fixed::Fixed;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Accum {
    pub(crate) int: Fixed,
    pub(crate) rem: u32,
}

impl Accum {
    pub(crate) const fn new(int: Fixed, rem: u32) -> Self {
        Self { int, rem }
    }

    /// Adds `d`, carrying into the integer part.
    pub(crate) fn add(&mut self, d: Self, rmask: u32) -> Result<()> {
        self.rem += d.rem;
        let carry = if self.rem > rmask {
            self.rem &= rmask;
            1
        } else {
            0
        };
        self.int = self
            .int
            .checked_add(d.int)
            .and_then(|v| v.checked_add(carry))
            .ok_or_else(overflow)?;
        Ok(())
    }

    /// Subtracts `d`, borrowing from the integer part. Exactly undoes [`Accum::add`].
    pub(crate) fn sub(&mut self, d: Self, rmask: u32) -> Result<()> {
        let borrow = if self.rem < d.rem {
            self.rem += rmask + 1 - d.rem;
            1
        } else {
            self.rem -= d.rem;
            0
        };
        self.int = self
            .int
            .checked_sub(d.int)
            .and_then(|v| v.checked_sub(borrow))
            .ok_or_else(overflow)?;
        Ok(())
    }
}

fn overflow() -> PathError {
    PathError::internal("forward difference overflow")
}
