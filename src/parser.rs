//! Binary reading primitives.
//!
//! Every table reader in this crate is written against the [`ByteCursor`] trait,
//! so a font can be parsed either from memory ([`Stream`]) or from any seekable
//! reader ([`IoCursor`]).

use std::io;

use crate::error::ParseError;
use crate::{GlyphId, Tag};


/// A trait for parsing raw binary data.
///
/// This is a low-level trait that should rarely be used directly.
pub trait FromData: Sized {
    /// Stores an object size in raw data.
    ///
    /// `mem::size_of` by default.
    ///
    /// Override when size of `Self` != size of a raw data.
    /// For example, when you are parsing `u16`, but storing it as `u8`.
    /// In this case `size_of::<Self>()` == 1, but `FromData::SIZE` == 2.
    const SIZE: usize = core::mem::size_of::<Self>();

    /// Parses an object from a raw data.
    ///
    /// `data` is always exactly `SIZE` bytes long.
    fn parse(data: &[u8]) -> Self;
}

impl FromData for u8 {
    #[inline]
    fn parse(data: &[u8]) -> Self {
        data[0]
    }
}

impl FromData for i8 {
    #[inline]
    fn parse(data: &[u8]) -> Self {
        data[0] as i8
    }
}

impl FromData for u16 {
    #[inline]
    fn parse(data: &[u8]) -> Self {
        u16::from_be_bytes([data[0], data[1]])
    }
}

impl FromData for i16 {
    #[inline]
    fn parse(data: &[u8]) -> Self {
        i16::from_be_bytes([data[0], data[1]])
    }
}

impl FromData for u32 {
    #[inline]
    fn parse(data: &[u8]) -> Self {
        u32::from_be_bytes([data[0], data[1], data[2], data[3]])
    }
}

impl FromData for i32 {
    #[inline]
    fn parse(data: &[u8]) -> Self {
        i32::from_be_bytes([data[0], data[1], data[2], data[3]])
    }
}

impl FromData for GlyphId {
    const SIZE: usize = 2;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        GlyphId(u16::parse(data))
    }
}

impl FromData for Tag {
    const SIZE: usize = 4;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        Tag(u32::parse(data))
    }
}


/// A common interface for offsets of different sizes.
pub trait Offset {
    /// Converts the offset into `usize`.
    fn to_usize(&self) -> usize;

    /// Checks that the offset is NULL, which means "not present".
    fn is_null(&self) -> bool { self.to_usize() == 0 }
}


/// A 16-bit offset relative to the start of the enclosing structure.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Offset16(pub u16);

impl Offset for Offset16 {
    #[inline]
    fn to_usize(&self) -> usize {
        self.0 as usize
    }
}

impl FromData for Offset16 {
    const SIZE: usize = 2;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        Offset16(u16::parse(data))
    }
}


/// A 32-bit offset relative to the start of the enclosing structure.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Offset32(pub u32);

impl Offset for Offset32 {
    #[inline]
    fn to_usize(&self) -> usize {
        self.0 as usize
    }
}

impl FromData for Offset32 {
    const SIZE: usize = 4;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        Offset32(u32::parse(data))
    }
}


// All `FromData` implementations in this crate fit into this buffer.
const MAX_DATA_SIZE: usize = 8;

/// A seekable, randomly-addressable byte source.
///
/// All multi-byte values are big-endian, as everywhere in OpenType.
/// Seeking past the end is allowed, the next read will fail with [`ParseError::Io`].
pub trait ByteCursor {
    /// Moves the cursor to an absolute offset.
    fn seek(&mut self, offset: usize);

    /// Returns the current absolute offset.
    fn offset(&self) -> usize;

    /// Fills `buf` from the current offset and advances past it.
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ParseError>;

    /// Advances the cursor by `len` bytes.
    #[inline]
    fn skip(&mut self, len: usize) {
        let offset = self.offset().saturating_add(len);
        self.seek(offset);
    }

    /// Reads a single value.
    fn read<T: FromData>(&mut self) -> Result<T, ParseError> {
        let mut buf = [0u8; MAX_DATA_SIZE];
        let offset = self.offset();
        let buf = buf.get_mut(..T::SIZE).ok_or(ParseError::Io {
            offset,
            kind: io::ErrorKind::InvalidInput,
        })?;
        self.read_exact(buf)?;
        Ok(T::parse(buf))
    }

    /// Seeks to `offset` and reads a single value.
    #[inline]
    fn read_at<T: FromData>(&mut self, offset: usize) -> Result<T, ParseError> {
        self.seek(offset);
        self.read()
    }

    /// Reads a `u16`.
    #[inline]
    fn read_u16(&mut self) -> Result<u16, ParseError> {
        self.read()
    }

    /// Reads an `i16`.
    #[inline]
    fn read_i16(&mut self) -> Result<i16, ParseError> {
        self.read()
    }

    /// Reads a `u32`.
    #[inline]
    fn read_u32(&mut self) -> Result<u32, ParseError> {
        self.read()
    }

    /// Reads an `i32`.
    #[inline]
    fn read_i32(&mut self) -> Result<i32, ParseError> {
        self.read()
    }

    /// Reads a [`Tag`].
    #[inline]
    fn read_tag(&mut self) -> Result<Tag, ParseError> {
        self.read()
    }

    /// Reads `len` bytes as an ISO-8859-1 string.
    ///
    /// Every byte maps to the code point of the same value,
    /// so this never fails on the content itself.
    fn read_string(&mut self, len: usize) -> Result<String, ParseError> {
        let mut s = String::with_capacity(len);
        for _ in 0..len {
            let byte: u8 = self.read()?;
            s.push(char::from(byte));
        }

        Ok(s)
    }

    /// Reads `count` consecutive values.
    fn read_array16<T: FromData>(&mut self, count: u16) -> Result<Vec<T>, ParseError> {
        let mut values = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            values.push(self.read()?);
        }

        Ok(values)
    }

    /// Reads a `u16` count followed by that many values.
    #[inline]
    fn read_counted_array16<T: FromData>(&mut self) -> Result<Vec<T>, ParseError> {
        let count = self.read_u16()?;
        self.read_array16(count)
    }
}


/// An in-memory [`ByteCursor`].
#[derive(Clone, Copy, Debug)]
pub struct Stream<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> Stream<'a> {
    /// Creates a new stream at offset 0.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Stream {
            data,
            offset: 0,
        }
    }

    /// Creates a new stream at the specified offset.
    #[inline]
    pub fn new_at(data: &'a [u8], offset: usize) -> Self {
        Stream {
            data,
            offset,
        }
    }

    /// Checks that the stream has no more data to read.
    #[inline]
    pub fn at_end(&self) -> bool {
        self.offset >= self.data.len()
    }

    /// Returns the remaining data.
    #[inline]
    pub fn tail(&self) -> Option<&'a [u8]> {
        self.data.get(self.offset..)
    }
}

impl ByteCursor for Stream<'_> {
    #[inline]
    fn seek(&mut self, offset: usize) {
        self.offset = offset;
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }

    #[inline]
    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ParseError> {
        let eof = ParseError::Io {
            offset: self.offset,
            kind: io::ErrorKind::UnexpectedEof,
        };

        let end = self.offset.checked_add(buf.len()).ok_or_else(|| eof.clone())?;
        let data = self.data.get(self.offset..end).ok_or(eof)?;
        buf.copy_from_slice(data);
        self.offset = end;
        Ok(())
    }
}


/// A [`ByteCursor`] over any seekable reader, like a `std::fs::File`.
///
/// The underlying reader is only repositioned when the logical offset
/// differs from the physical one, so sequential reads do not issue seeks.
#[derive(Debug)]
pub struct IoCursor<R> {
    inner: R,
    offset: usize,
    // Where the inner reader actually is. `None` when unknown.
    position: Option<usize>,
}

impl<R: io::Read + io::Seek> IoCursor<R> {
    /// Wraps a reader. The cursor starts at offset 0.
    pub fn new(inner: R) -> Self {
        IoCursor {
            inner,
            offset: 0,
            position: None,
        }
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.inner
    }

    fn sync(&mut self) -> io::Result<()> {
        if self.position != Some(self.offset) {
            self.inner.seek(io::SeekFrom::Start(self.offset as u64))?;
            self.position = Some(self.offset);
        }

        Ok(())
    }
}

impl<R: io::Read + io::Seek> ByteCursor for IoCursor<R> {
    #[inline]
    fn seek(&mut self, offset: usize) {
        self.offset = offset;
    }

    #[inline]
    fn offset(&self) -> usize {
        self.offset
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<(), ParseError> {
        let offset = self.offset;
        let res = self.sync().and_then(|_| self.inner.read_exact(buf));
        match res {
            Ok(()) => {
                self.offset += buf.len();
                self.position = Some(self.offset);
                Ok(())
            }
            Err(e) => {
                self.position = None;
                Err(ParseError::Io { offset, kind: e.kind() })
            }
        }
    }
}
