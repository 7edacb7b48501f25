pub use bytes::Buf;

/// A `Buf` that keeps the bytes it has already consumed.
///
/// BPDUs are built back to front: the cursor is advanced past the space the
/// BPDU will occupy and each message view then moves it back over its own
/// header.
pub trait PktBuf: Buf {
    /// Step the read position back by `cnt` consumed bytes.
    fn move_back(&mut self, cnt: usize);
}

/// A writable [`PktBuf`].
pub trait PktBufMut: PktBuf {
    /// Number of consumed bytes in front of the chunk.
    fn chunk_headroom(&self) -> usize;

    /// The current chunk, writable.
    fn chunk_mut(&mut self) -> &mut [u8];
}

impl<T: PktBuf + ?Sized> PktBuf for &mut T {
    #[inline]
    fn move_back(&mut self, cnt: usize) {
        (**self).move_back(cnt)
    }
}

impl<T: PktBufMut + ?Sized> PktBufMut for &mut T {
    #[inline]
    fn chunk_headroom(&self) -> usize {
        (**self).chunk_headroom()
    }

    #[inline]
    fn chunk_mut(&mut self) -> &mut [u8] {
        (**self).chunk_mut()
    }
}
