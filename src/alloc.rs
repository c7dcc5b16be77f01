//! Heap accounting for peak-memory measurement.
//!
//! Binaries opt in with
//! `#[global_allocator] static GLOBAL: TrackingAllocator = TrackingAllocator;`.
//! Without that, [`is_active`] stays false and [`measure`] reports `None`.

use std::alloc::{GlobalAlloc, Layout, System};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

static CURRENT: AtomicUsize = AtomicUsize::new(0);
static PEAK: AtomicUsize = AtomicUsize::new(0);
static ACTIVE: AtomicBool = AtomicBool::new(false);

/// Forwards to the system allocator and counts live bytes and their high-water mark.
pub struct TrackingAllocator;

fn record_grow(bytes: usize) {
    ACTIVE.store(true, Ordering::Relaxed);
    let now = CURRENT.fetch_add(bytes, Ordering::Relaxed) + bytes;
    PEAK.fetch_max(now, Ordering::Relaxed);
}

fn record_shrink(bytes: usize) {
    CURRENT.fetch_sub(bytes, Ordering::Relaxed);
}

unsafe impl GlobalAlloc for TrackingAllocator {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc(layout);
        if !ptr.is_null() {
            record_grow(layout.size());
        }
        ptr
    }

    unsafe fn alloc_zeroed(&self, layout: Layout) -> *mut u8 {
        let ptr = System.alloc_zeroed(layout);
        if !ptr.is_null() {
            record_grow(layout.size());
        }
        ptr
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout);
        record_shrink(layout.size());
    }

    unsafe fn realloc(&self, ptr: *mut u8, layout: Layout, new_size: usize) -> *mut u8 {
        let new_ptr = System.realloc(ptr, layout, new_size);
        if !new_ptr.is_null() {
            let old_size = layout.size();
            if new_size > old_size {
                record_grow(new_size - old_size);
            } else {
                record_shrink(old_size - new_size);
            }
        }
        new_ptr
    }
}

/// True once a [`TrackingAllocator`] installed as the global allocator has
/// served at least one allocation.
pub fn is_active() -> bool {
    ACTIVE.load(Ordering::Relaxed)
}

pub fn current_bytes() -> usize {
    CURRENT.load(Ordering::Relaxed)
}

pub fn peak_bytes() -> usize {
    PEAK.load(Ordering::Relaxed)
}

/// Restart the high-water mark from the current live byte count.
pub fn reset_peak() {
    PEAK.store(CURRENT.load(Ordering::Relaxed), Ordering::Relaxed);
}

/// Run `f` and return its result with the peak heap growth above the
/// pre-call baseline. Counters are process-wide, so concurrent allocations
/// from other threads are included.
pub fn measure<R>(f: impl FnOnce() -> R) -> (R, Option<usize>) {
    if !is_active() {
        return (f(), None);
    }
    let baseline = current_bytes();
    reset_peak();
    let out = f();
    let peak = peak_bytes().saturating_sub(baseline);
    (out, Some(peak))
}
