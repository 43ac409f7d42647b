//! [`TaskBuffer`]: a byte-granular FIFO of serialized tasks (spec.md §4.1).
//!
//! Tasks are stored back-to-back as a fixed-size header immediately
//! followed by the task's payload bytes, wrapping freely across the end
//! of the backing array — a classic circular byte log, grounded in the
//! workspace's general preference for fixed-capacity, const-generic,
//! no-heap buffers (`heapless::Deque`/`Vec<u8, N>` throughout
//! `dot15d4-util`).
//!
//! Three monotonically increasing byte counters track position instead
//! of wrapped indices, which sidesteps the usual ambiguity between an
//! empty and a completely full ring: `write_pos` is the total number of
//! bytes ever pushed, `consume_pos` the total number of bytes ever popped,
//! and `peek_pos` the total number of bytes ever peeked
//! (`consume_pos <= peek_pos <= write_pos` always holds).

use inject_util::log::warn;

use crate::task::{TaskHeader, HEADER_LEN, MAX_TASK_PAYLOAD};

/// Default ring buffer capacity (spec.md §6): 32 KiB.
pub const RING_BUFFER_SIZE: usize = 32 * 1024;

/// Why a [`TaskBuffer::push`] was rejected.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PushError {
    /// Not enough free space for the header plus payload.
    NoSpace,
    /// The payload exceeds [`crate::task::MAX_TASK_PAYLOAD`].
    TooLarge,
}

/// A byte-granular circular FIFO of tasks, of fixed capacity `N`.
pub struct TaskBuffer<const N: usize> {
    data: [u8; N],
    write_pos: usize,
    consume_pos: usize,
    peek_pos: usize,
}

impl<const N: usize> TaskBuffer<N> {
    pub const fn new() -> Self {
        Self {
            data: [0; N],
            write_pos: 0,
            consume_pos: 0,
            peek_pos: 0,
        }
    }

    /// Bytes free for a future push (computed against the consume cursor,
    /// not the peek cursor — peeked-but-not-popped tasks still occupy
    /// their ring space).
    pub fn available(&self) -> usize {
        N - (self.write_pos - self.consume_pos)
    }

    /// Total ring capacity.
    pub fn capacity(&self) -> usize {
        N
    }

    fn write_wrapping(&mut self, pos: usize, bytes: &[u8]) {
        for (i, b) in bytes.iter().enumerate() {
            let idx = (pos + i) % N;
            self.data[idx] = *b;
        }
    }

    fn read_wrapping(&self, pos: usize, out: &mut [u8]) {
        for (i, b) in out.iter_mut().enumerate() {
            let idx = (pos + i) % N;
            *b = self.data[idx];
        }
    }

    /// Pushes a new task's header and payload. Fails (leaving the buffer
    /// byte-for-byte unchanged) when the payload is too large or there is
    /// not enough free space (spec.md §4.1).
    pub fn push(&mut self, header: TaskHeader, payload: &[u8]) -> Result<(), PushError> {
        if payload.len() > MAX_TASK_PAYLOAD {
            return Err(PushError::TooLarge);
        }
        let total = HEADER_LEN + payload.len();
        if total > self.available() {
            return Err(PushError::NoSpace);
        }

        self.write_wrapping(self.write_pos, &header.encode());
        self.write_wrapping(self.write_pos + HEADER_LEN, payload);
        self.write_pos += total;
        Ok(())
    }

    /// Reads the record starting at `pos` into `(header, scratch[..len])`,
    /// without mutating any cursor. Returns `None` on a framing fault and
    /// logs a warning; the caller is responsible for flushing in that
    /// case (spec.md §4.1).
    fn read_record_at(
        &self,
        pos: usize,
        scratch: &mut [u8; MAX_TASK_PAYLOAD],
    ) -> Option<(TaskHeader, usize)> {
        let mut hdr_bytes = [0u8; HEADER_LEN];
        self.read_wrapping(pos, &mut hdr_bytes);
        let header = match TaskHeader::decode(&hdr_bytes) {
            Some(h) => h,
            None => {
                warn!("task buffer framing fault: invalid task kind byte");
                return None;
            }
        };

        let len = header.len as usize;
        if len > MAX_TASK_PAYLOAD || pos + HEADER_LEN + len > self.write_pos {
            warn!("task buffer framing fault: truncated task record");
            return None;
        }

        self.read_wrapping(pos + HEADER_LEN, &mut scratch[..len]);
        Some((header, len))
    }

    /// Copies the next task (relative to the peek cursor) into
    /// `(out_header, scratch)` without advancing the consume cursor.
    /// Advances the peek cursor on success. Returns `None` when the
    /// buffer holds no more unpeeked tasks, or on a framing fault (which
    /// flushes the whole buffer — spec.md §4.1).
    pub fn peek(&mut self, scratch: &mut [u8; MAX_TASK_PAYLOAD]) -> Option<(TaskHeader, usize)> {
        if self.peek_pos >= self.write_pos {
            return None;
        }

        match self.read_record_at(self.peek_pos, scratch) {
            Some((header, len)) => {
                self.peek_pos += HEADER_LEN + len;
                Some((header, len))
            }
            None => {
                self.flush();
                None
            }
        }
    }

    /// Copies the next task (relative to the consume cursor) into
    /// `(out_header, scratch)`, advancing the consume cursor on success.
    /// The peek cursor is brought forward too if it had trailed behind
    /// (it never may, per spec.md §3 invariant 4). Returns `None` when
    /// the buffer is empty, or on a framing fault (which flushes the
    /// whole buffer).
    pub fn pop(&mut self, scratch: &mut [u8; MAX_TASK_PAYLOAD]) -> Option<(TaskHeader, usize)> {
        if self.consume_pos >= self.write_pos {
            return None;
        }

        match self.read_record_at(self.consume_pos, scratch) {
            Some((header, len)) => {
                self.consume_pos += HEADER_LEN + len;
                if self.peek_pos < self.consume_pos {
                    self.peek_pos = self.consume_pos;
                }
                Some((header, len))
            }
            None => {
                self.flush();
                None
            }
        }
    }

    /// Snaps the peek cursor back to the consume cursor.
    pub fn rewind_peek(&mut self) {
        self.peek_pos = self.consume_pos;
    }

    /// Resets both cursors, discarding every queued task.
    pub fn flush(&mut self) {
        self.write_pos = 0;
        self.consume_pos = 0;
        self.peek_pos = 0;
    }
}

impl<const N: usize> Default for TaskBuffer<N> {
    fn default() -> Self {
        Self::new()
    }
}
