use bytes::Buf;

use crate::{PktBuf, PktBufMut};

/// A read cursor over a received frame.
#[derive(Debug, Clone, Copy)]
pub struct Cursor<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    /// A cursor at the start of `buf`.
    #[inline]
    pub fn new(buf: &'a [u8]) -> Self {
        Cursor { buf, pos: 0 }
    }

    /// The whole frame, consumed bytes included.
    #[inline]
    pub fn buf(&self) -> &'a [u8] {
        self.buf
    }

    /// Offset of the read position from the start of the frame.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.pos
    }
}

/// A write cursor over the buffer a BPDU is encoded into.
#[derive(Debug)]
pub struct CursorMut<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> CursorMut<'a> {
    /// A cursor at the start of `buf`. Advance it past the space the BPDU
    /// needs before prepending headers.
    #[inline]
    pub fn new(buf: &'a mut [u8]) -> Self {
        CursorMut { buf, pos: 0 }
    }

    /// The whole buffer.
    #[inline]
    pub fn buf(&self) -> &[u8] {
        self.buf
    }

    /// Offset of the write position.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.pos
    }
}

macro_rules! impl_cursor_buf {
    ($cursor:ident) => {
        impl<'a> Buf for $cursor<'a> {
            #[inline]
            fn remaining(&self) -> usize {
                self.buf.len() - self.pos
            }

            #[inline]
            fn chunk(&self) -> &[u8] {
                &self.buf[self.pos..]
            }

            #[inline]
            fn advance(&mut self, cnt: usize) {
                assert!(cnt <= self.remaining());
                self.pos += cnt;
            }
        }

        impl<'a> PktBuf for $cursor<'a> {
            #[inline]
            fn move_back(&mut self, cnt: usize) {
                assert!(cnt <= self.pos);
                self.pos -= cnt;
            }
        }
    };
}

impl_cursor_buf!(Cursor);
impl_cursor_buf!(CursorMut);

impl<'a> PktBufMut for CursorMut<'a> {
    #[inline]
    fn chunk_headroom(&self) -> usize {
        self.pos
    }

    #[inline]
    fn chunk_mut(&mut self) -> &mut [u8] {
        &mut self.buf[self.pos..]
    }
}
