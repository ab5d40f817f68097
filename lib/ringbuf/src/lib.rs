// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Ring buffer for tracing driver events
//!
//! This contains an implementation for a static ring buffer designed to be used
//! to instrument driver code that may be entered from more than one context at
//! once -- for example, a framework polling thread and a deferred interrupt
//! thread.  Each buffer sits behind a [`spin::Mutex`], so recording an entry
//! from two threads at the same time serializes rather than panicking.
//!
//! ## Constraints
//!
//! The type in the ring buffer must implement both `Copy` and `PartialEq`.
//!
//! If you use the variants of the `ringbuf!` macro that leave the name of the
//! data structure implicit, you can only have one per module. (You can lift
//! this constraint by providing a name.)
//!
//! ## Creating a ring buffer
//!
//! Ring buffers are instantiated with the [`ringbuf!`] macro, to which one
//! must provide the type of per-entry payload, the number of entries, and a
//! static initializer.  For example, to define a 16-entry ring buffer with
//! each entry containing a [`core::u32`]:
//!
//! ```ignore
//! ringbuf!(u32, 16, 0);
//! ```
//!
//! Ring buffer entries are generated with [`ringbuf_entry!`] specifying a
//! payload of the appropriate type, e.g.:
//!
//! ```ignore
//! ringbuf_entry!(status);
//! ```
//!
//! You can also provide a name for the ring buffer, to distinguish between them
//! if you have more than one:
//!
//! ```ignore
//! ringbuf!(IRQ_RINGBUF, u32, 16, 0);
//!
//! // ...
//!
//! ringbuf_entry!(IRQ_RINGBUF, status);
//! ```
//!
//! Payloads are usually an `enum` naming the event, with the interesting
//! values carried in its variants.
//!
//! ## Inspecting a ring buffer
//!
//! The buffers are plain statics named after the declaring module, so a
//! debugger can print them directly:
//!
//! ```console
//! (gdb) print drv_avs_tmon::__RINGBUF
//! ```
//!
//! Host code can also take the lock and walk [`Ringbuf::iter`], which yields
//! entries oldest first.

#![cfg_attr(not(test), no_std)]

/// Re-export the lock type so that code generated by the macros is guaranteed
/// to be able to find it.
pub use spin::Mutex;

/// Declares a ringbuffer in the current module or context.
///
/// `ringbuf!(NAME, Type, N, expr)` makes a ringbuffer named `NAME`,
/// containing entries of type `Type`, with room for `N` such entries, all of
/// which are initialized to `expr`.
///
/// The resulting ringbuffer will be static, so `NAME` should be uppercase.
///
/// The actual type of `name` will be `Mutex<Ringbuf<T, N>>`.
///
/// To support the common case of having one quickly-installed ringbuffer per
/// module, if you omit the name, it will default to `__RINGBUF`.
#[cfg(not(feature = "disabled"))]
#[macro_export]
macro_rules! ringbuf {
    ($name:ident, $t:ty, $n:expr, $init:expr) => {
        #[used]
        static $name: $crate::Mutex<$crate::Ringbuf<$t, $n>> =
            $crate::Mutex::new($crate::Ringbuf {
                last: None,
                buffer: [$crate::RingbufEntry {
                    line: 0,
                    generation: 0,
                    count: 0,
                    payload: $init,
                }; $n],
            });
    };
    ($t:ty, $n:expr, $init:expr) => {
        $crate::ringbuf!(__RINGBUF, $t, $n, $init);
    };
}

#[cfg(feature = "disabled")]
#[macro_export]
macro_rules! ringbuf {
    ($name:ident, $t:ty, $n:expr, $init:expr) => {
        #[allow(dead_code)]
        const _: $t = $init;
    };
    ($t:ty, $n:expr, $init:expr) => {
        #[allow(dead_code)]
        const _: $t = $init;
    };
}

/// Inserts data into a named ringbuffer (which should have been declared with
/// the `ringbuf!` macro).
///
/// `ringbuf_entry!(NAME, expr)` will insert `expr` into the ringbuffer called
/// `NAME`.
///
/// If you declared your ringbuffer without a name, you can also use this
/// without a name, and it will default to `__RINGBUF`.
#[cfg(not(feature = "disabled"))]
#[macro_export]
macro_rules! ringbuf_entry {
    ($buf:expr, $payload:expr) => {{
        // Evaluate both buf and payload, without letting them access each
        // other, by evaluating them in a tuple where each cannot
        // accidentally use the other's binding.
        let (p, buf) = ($payload, &$buf);
        // The payload is computed before the lock is taken, so a payload
        // expression that itself records an entry cannot spin on this buffer.
        $crate::Ringbuf::entry(
            &mut *$crate::Mutex::lock(buf),
            line!() as u16,
            p,
        );
    }};
    ($payload:expr) => {
        $crate::ringbuf_entry!(__RINGBUF, $payload);
    };
}

#[cfg(feature = "disabled")]
#[macro_export]
macro_rules! ringbuf_entry {
    ($buf:expr, $payload:expr) => {{
        let _ = &$payload;
    }};
    ($payload:expr) => {{
        let _ = &$payload;
    }};
}

/// Inserts data into a ringbuffer at the root of this crate.
#[cfg(not(feature = "disabled"))]
#[allow(clippy::crate_in_macro_def)]
#[macro_export]
macro_rules! ringbuf_entry_root {
    ($buf:ident, $payload:expr) => {
        $crate::ringbuf_entry!(crate::$buf, $payload);
    };
    ($payload:expr) => {
        $crate::ringbuf_entry!(crate::__RINGBUF, $payload);
    };
}

#[cfg(feature = "disabled")]
#[macro_export]
macro_rules! ringbuf_entry_root {
    ($buf:ident, $payload:expr) => {{
        let _ = &$payload;
    }};
    ($payload:expr) => {{
        let _ = &$payload;
    }};
}

///
/// The structure of a single [`Ringbuf`] entry, carrying a payload of arbitrary
/// type.  When a ring buffer entry is generated with an identical payload to
/// the most recent entry (in terms of both `line` and `payload`), `count` will
/// be incremented rather than generating a new entry.
///
#[derive(Debug, Copy, Clone)]
pub struct RingbufEntry<T: Copy + PartialEq> {
    pub line: u16,
    pub generation: u16,
    pub count: u32,
    pub payload: T,
}

///
/// A ring buffer of parametrized type and size.  In practice, instantiating
/// this directly is strange -- see the [`ringbuf!`] macro.
///
#[derive(Debug)]
pub struct Ringbuf<T: Copy + PartialEq, const N: usize> {
    pub last: Option<usize>,
    pub buffer: [RingbufEntry<T>; N],
}

impl<T: Copy + PartialEq, const N: usize> Ringbuf<T, { N }> {
    pub fn entry(&mut self, line: u16, payload: T) {
        // A fresh buffer has no last entry; treat that as an out-of-range
        // index so the first insertion lands in slot 0 and never bumps the
        // count of a placeholder.
        let last = self.last.unwrap_or(usize::MAX);

        // Reuse the most recent entry if it matches. `get_mut` also covers a
        // corrupted `last`, which simply restarts us at 0 below.
        if let Some(ent) = self.buffer.get_mut(last) {
            if ent.line == line && ent.payload == payload {
                // Only reuse this entry if we don't overflow the
                // count.
                if let Some(new_count) = ent.count.checked_add(1) {
                    ent.count = new_count;
                    return;
                }
            }
        }

        // Not a repeat: advance and wrap. Comparing instead of taking a
        // remainder turns usize::MAX into 0 for the starting condition, and
        // avoids a divide on targets without one.
        let ndx = {
            let last_plus_1 = last.wrapping_add(1);
            if last_plus_1 >= self.buffer.len() {
                0
            } else {
                last_plus_1
            }
        };

        let ent = &mut self.buffer[ndx];
        *ent = RingbufEntry {
            line,
            payload,
            count: 1,
            generation: ent.generation.wrapping_add(1),
        };

        self.last = Some(ndx);
    }

    /// Returns the most recently recorded entry, if anything has been
    /// recorded.
    pub fn last_entry(&self) -> Option<&RingbufEntry<T>> {
        self.last.and_then(|ndx| self.buffer.get(ndx))
    }

    /// Iterates over the recorded entries, oldest first. Slots that have never
    /// been written are skipped.
    pub fn iter(&self) -> impl Iterator<Item = &RingbufEntry<T>> + '_ {
        let start = match self.last {
            Some(last) => last.wrapping_add(1),
            None => N,
        };
        (0..N)
            .map(move |i| (start + i) % N)
            .filter_map(move |ndx| self.buffer.get(ndx))
            .filter(|ent| ent.generation != 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fresh<const N: usize>() -> Ringbuf<u8, N> {
        Ringbuf {
            last: None,
            buffer: [RingbufEntry {
                line: 0,
                generation: 0,
                count: 0,
                payload: 0,
            }; N],
        }
    }

    #[test]
    fn first_entry_lands_in_slot_zero() {
        let mut rb = fresh::<4>();
        rb.entry(10, 0);

        assert_eq!(rb.last, Some(0));
        let ent = rb.last_entry().unwrap();
        assert_eq!((ent.line, ent.count, ent.generation), (10, 1, 1));
    }

    #[test]
    fn repeats_bump_count() {
        let mut rb = fresh::<4>();
        rb.entry(10, 7);
        rb.entry(10, 7);
        rb.entry(10, 7);

        assert_eq!(rb.last, Some(0));
        assert_eq!(rb.last_entry().unwrap().count, 3);

        // Same payload from a different line is a new entry.
        rb.entry(11, 7);
        assert_eq!(rb.last, Some(1));
    }

    #[test]
    fn wraps_and_bumps_generation() {
        let mut rb = fresh::<3>();
        for p in 0..5u8 {
            rb.entry(1, p);
        }

        assert_eq!(rb.last, Some(1));
        let payloads: Vec<u8> = rb.iter().map(|e| e.payload).collect();
        assert_eq!(payloads, [2, 3, 4]);
        assert_eq!(rb.buffer[0].generation, 2);
        assert_eq!(rb.buffer[2].generation, 1);
    }

    #[test]
    fn corrupt_last_restarts_at_zero() {
        let mut rb = fresh::<3>();
        rb.last = Some(99);
        rb.entry(1, 1);
        assert_eq!(rb.last, Some(0));
    }

    #[test]
    fn saturated_count_starts_new_entry() {
        let mut rb = fresh::<2>();
        rb.entry(1, 1);
        rb.buffer[0].count = u32::MAX;
        rb.entry(1, 1);

        assert_eq!(rb.last, Some(1));
        assert_eq!(rb.buffer[0].count, u32::MAX);
        assert_eq!(rb.buffer[1].count, 1);
    }

    #[test]
    fn empty_iter() {
        let rb = fresh::<4>();
        assert_eq!(rb.iter().count(), 0);
        assert!(rb.last_entry().is_none());
    }

    ringbuf!(TEST_RINGBUF, u32, 8, 0);

    #[test]
    fn macro_records_from_threads() {
        let handles: Vec<_> = (0..4u32)
            .map(|t| {
                std::thread::spawn(move || {
                    for i in 0..100u32 {
                        ringbuf_entry!(TEST_RINGBUF, t * 1000 + i);
                    }
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }

        let rb = TEST_RINGBUF.lock();
        assert_eq!(rb.iter().count(), 8);
    }
}
