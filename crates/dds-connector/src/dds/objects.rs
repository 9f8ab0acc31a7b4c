// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Per-thread cap on concurrently held connector objects.
//!
//! Every entity operation holds one slot for its duration; native sample and
//! instance guards hold theirs until dropped. The cap is process-wide, the
//! count is per thread.

use super::{Error, Result};
use std::cell::Cell;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Default cap.
pub const DEFAULT_MAX_OBJECTS_PER_THREAD: usize = 1024;

static MAX_OBJECTS: AtomicUsize = AtomicUsize::new(DEFAULT_MAX_OBJECTS_PER_THREAD);

thread_local! {
    static IN_USE: Cell<usize> = const { Cell::new(0) };
}

/// Set the per-thread cap. Non-positive values are rejected.
pub fn set_max_objects_per_thread(value: i64) -> Result<()> {
    let max = usize::try_from(value)
        .ok()
        .filter(|&v| v > 0)
        .ok_or_else(|| {
            Error::InvalidArgument(format!("max objects per thread must be positive, got {}", value))
        })?;
    MAX_OBJECTS.store(max, Ordering::Relaxed);
    log::debug!("[Connector] max objects per thread set to {}", max);
    Ok(())
}

pub fn max_objects_per_thread() -> usize {
    MAX_OBJECTS.load(Ordering::Relaxed)
}

/// Slots held by the calling thread.
pub fn objects_in_use() -> usize {
    IN_USE.with(Cell::get)
}

/// One held slot; released on drop. Bound to the acquiring thread.
#[derive(Debug)]
pub struct ObjectSlot {
    _not_send: PhantomData<*const ()>,
}

impl ObjectSlot {
    pub fn acquire() -> Result<Self> {
        IN_USE.with(|used| {
            let current = used.get();
            let max = max_objects_per_thread();
            if current >= max {
                return Err(Error::ResourceExhausted(format!(
                    "thread already holds {} of {} objects",
                    current, max
                )));
            }
            used.set(current + 1);
            Ok(ObjectSlot {
                _not_send: PhantomData,
            })
        })
    }
}

impl Drop for ObjectSlot {
    fn drop(&mut self) {
        IN_USE.with(|used| used.set(used.get().saturating_sub(1)));
    }
}
