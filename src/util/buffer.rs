//! IO buffers
//!
//! Each worker allocates one buffer at startup, sized to the largest buffer
//! size it can sample, and reuses a prefix of it for every write or read
//! call. Direct IO needs the buffer to start on an alignment boundary, which
//! a plain `Vec<u8>` does not guarantee, so that case gets an
//! [`AlignedBuffer`].

use crate::config::IoMode;
use crate::Result;
use std::alloc::{alloc_zeroed, dealloc, Layout};

/// Memory-aligned buffer suitable for O_DIRECT operations
pub struct AlignedBuffer {
    ptr: *mut u8,
    size: usize,
    alignment: usize,
    layout: Layout,
}

impl AlignedBuffer {
    /// Allocate a zeroed buffer of `size` bytes starting on an `alignment`
    /// boundary
    ///
    /// `alignment` must be a power of two and `size` non-zero.
    pub fn new(size: usize, alignment: usize) -> Result<Self> {
        if size == 0 {
            anyhow::bail!("aligned buffer size must be greater than 0");
        }
        let layout = Layout::from_size_align(size, alignment).map_err(|e| {
            anyhow::anyhow!("invalid aligned buffer layout (size={}, alignment={}): {}", size, alignment, e)
        })?;

        // SAFETY: layout has non-zero size
        let ptr = unsafe { alloc_zeroed(layout) };
        if ptr.is_null() {
            anyhow::bail!("failed to allocate {} byte buffer aligned to {}", size, alignment);
        }

        Ok(AlignedBuffer {
            ptr,
            size,
            alignment,
            layout,
        })
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        // SAFETY: ptr is valid for size bytes for the lifetime of self
        unsafe { std::slice::from_raw_parts(self.ptr, self.size) }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        // SAFETY: ptr is valid for size bytes and uniquely borrowed
        unsafe { std::slice::from_raw_parts_mut(self.ptr, self.size) }
    }

    #[inline(always)]
    pub fn alignment(&self) -> usize {
        self.alignment
    }

    /// Verify that the buffer is properly aligned
    #[inline(always)]
    pub fn is_aligned(&self) -> bool {
        (self.ptr as usize) % self.alignment == 0
    }
}

impl Drop for AlignedBuffer {
    fn drop(&mut self) {
        // SAFETY: ptr was allocated with this exact layout
        unsafe {
            dealloc(self.ptr, self.layout);
        }
    }
}

// AlignedBuffer is Send because it owns its memory
unsafe impl Send for AlignedBuffer {}

/// Reusable worker buffer
pub enum IoBuffer {
    Heap(Vec<u8>),
    Aligned(AlignedBuffer),
}

impl IoBuffer {
    /// Allocate a buffer of `size` bytes suited to `mode`
    ///
    /// The buffer starts out holding the sequential pattern
    /// `0x00, 0x01, ..., 0xFF, 0x00, ...`.
    pub fn for_mode(size: usize, mode: IoMode) -> Result<Self> {
        let mut buffer = match mode {
            IoMode::Buffered => IoBuffer::Heap(vec![0u8; size]),
            IoMode::Direct { alignment } => IoBuffer::Aligned(AlignedBuffer::new(size, alignment)?),
        };
        for (i, byte) in buffer.as_mut_slice().iter_mut().enumerate() {
            *byte = (i % 256) as u8;
        }
        Ok(buffer)
    }

    #[inline(always)]
    pub fn len(&self) -> usize {
        self.as_slice().len()
    }

    #[inline(always)]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline(always)]
    pub fn as_slice(&self) -> &[u8] {
        match self {
            IoBuffer::Heap(v) => v.as_slice(),
            IoBuffer::Aligned(b) => b.as_slice(),
        }
    }

    #[inline(always)]
    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        match self {
            IoBuffer::Heap(v) => v.as_mut_slice(),
            IoBuffer::Aligned(b) => b.as_mut_slice(),
        }
    }

    /// Write `chunk` into the head of the buffer so consecutive chunks of a
    /// file never carry identical bytes
    #[inline]
    pub fn stamp_chunk(&mut self, chunk: u64) {
        let stamp = chunk.to_le_bytes();
        let slice = self.as_mut_slice();
        let n = slice.len().min(stamp.len());
        slice[..n].copy_from_slice(&stamp[..n]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_buffer_4k_alignment() {
        let buffer = AlignedBuffer::new(8192, 4096).unwrap();
        assert_eq!(buffer.as_slice().len(), 8192);
        assert_eq!(buffer.alignment(), 4096);
        assert!(buffer.is_aligned());
    }

    #[test]
    fn test_invalid_alignment() {
        assert!(AlignedBuffer::new(4096, 513).is_err());
    }

    #[test]
    fn test_zero_size_rejected() {
        assert!(AlignedBuffer::new(0, 4096).is_err());
    }

    #[test]
    fn test_heap_buffer_sequential_fill() {
        let buffer = IoBuffer::for_mode(512, IoMode::Buffered).unwrap();
        let slice = buffer.as_slice();
        for i in 0..512 {
            assert_eq!(slice[i], (i % 256) as u8);
        }
    }

    #[test]
    fn test_direct_buffer_is_aligned() {
        let buffer = IoBuffer::for_mode(8192, IoMode::Direct { alignment: 4096 }).unwrap();
        match &buffer {
            IoBuffer::Aligned(b) => assert!(b.is_aligned()),
            IoBuffer::Heap(_) => panic!("direct mode must use an aligned buffer"),
        }
        assert_eq!(buffer.as_slice()[300], 300u32 as u8);
    }

    #[test]
    fn test_stamp_chunk_varies_content() {
        let mut buffer = IoBuffer::for_mode(64, IoMode::Buffered).unwrap();
        buffer.stamp_chunk(1);
        let first = buffer.as_slice().to_vec();
        buffer.stamp_chunk(2);
        assert_ne!(first, buffer.as_slice());
        assert_eq!(&buffer.as_slice()[..8], &2u64.to_le_bytes());
        // Tail keeps the sequential pattern
        assert_eq!(buffer.as_slice()[40], 40);
    }

    #[test]
    fn test_stamp_chunk_small_buffer() {
        let mut buffer = IoBuffer::for_mode(3, IoMode::Buffered).unwrap();
        buffer.stamp_chunk(0x0102_0304);
        assert_eq!(buffer.as_slice(), &[0x04, 0x03, 0x02]);
    }
}
