/*!
A safe reader for OpenType layout tables.

Walks the Script/Feature/Lookup graph of
[GSUB](https://docs.microsoft.com/en-us/typography/opentype/spec/gsub) and
[GPOS](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos) tables
and interprets a subset of their lookups:

- GSUB: single (1), ligature (4) and extension (7) substitutions.
  The result is a map from the text a composite glyph represents
  to the glyph itself, which is what text extraction and font subsetting need.
- GPOS: single adjustment (1), mark-to-base attachment (4),
  chaining context positioning format 3 (8) and extension (9).

## Safety

- The library must not panic. Any panic considered as a critical bug and should be reported.
- The library forbids the unsafe code.
- Composite glyph resolution is iterative, so malformed fonts cannot overflow the stack.
- Extension lookups can be nested only once.

## Error handling

Malformed data that makes a table unusable is reported via [`ParseError`].
Unsupported, but valid, data (like unknown lookup types, which real fonts have plenty of)
is skipped and reported via a list of [`Warning`]s, so a caller can decide
whether a degraded result is good enough.

When the `logging` feature is enabled, warnings are also forwarded to the `log` crate.

## Example

```no_run
use std::collections::HashMap;
use ttf_layout::{directory, gsub, parser::Stream, GlyphId, Tag};

let data = std::fs::read("font.ttf").unwrap();
let mut s = Stream::new(&data);
let dir = directory::Directory::parse(&mut s, 0).unwrap();
let record = dir.find(Tag::from_bytes(b"GSUB")).unwrap();

let table = gsub::Table::parse(&mut s, record.offset).unwrap();

let mut chars = HashMap::new();
chars.insert(GlyphId(10), 'f');
chars.insert(GlyphId(12), 'i');
let glyphs = table.substitutions.resolve(&chars, &[]).unwrap();
println!("{:?}", glyphs.get("fi"));
```
*/

#![doc(html_root_url = "https://docs.rs/ttf-layout/0.1.0")]

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(missing_copy_implementations)]
#![warn(missing_debug_implementations)]

use core::fmt;

#[cfg(feature = "logging")]
macro_rules! warn {
    ($($arg:tt)+) => (
        log::log!(log::Level::Warn, $($arg)+);
    )
}

#[cfg(not(feature = "logging"))]
macro_rules! warn {
    // Arguments are still type-checked and count as used.
    ($($arg:tt)+) => (
        let _ = format_args!($($arg)+);
    )
}

pub mod directory;
pub mod error;
pub mod ggg;
pub mod gpos;
pub mod gsub;
pub mod layout;
pub mod parser;

pub use error::{ParseError, ResolutionError, StructuralError, Warning};
pub use ggg::Language;
pub use layout::{LayoutTable, SubtableReader};


/// A type-safe wrapper for glyph ID.
#[repr(transparent)]
#[derive(Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Default, Debug, Hash)]
pub struct GlyphId(pub u16);

impl fmt::Display for GlyphId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}


/// A 4-byte OpenType tag, like `GSUB` or `latn`.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Hash)]
pub struct Tag(pub u32);

impl Tag {
    /// Creates a `Tag` from bytes.
    #[inline]
    pub const fn from_bytes(bytes: &[u8; 4]) -> Self {
        Tag(((bytes[0] as u32) << 24) | ((bytes[1] as u32) << 16) |
            ((bytes[2] as u32) << 8) | (bytes[3] as u32))
    }

    /// Returns tag as 4-element byte array.
    #[inline]
    pub const fn to_bytes(self) -> [u8; 4] {
        [
            (self.0 >> 24 & 0xff) as u8,
            (self.0 >> 16 & 0xff) as u8,
            (self.0 >> 8 & 0xff) as u8,
            (self.0 >> 0 & 0xff) as u8,
        ]
    }

    /// Returns tag as a string, replacing non-printable bytes with `?`.
    pub fn to_string_lossy(self) -> String {
        self.to_bytes()
            .iter()
            .map(|&b| if b.is_ascii_graphic() || b == b' ' { b as char } else { '?' })
            .collect()
    }
}

impl fmt::Debug for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Tag({})", self.to_string_lossy())
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
