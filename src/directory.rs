//! A font [table directory](https://docs.microsoft.com/en-us/typography/opentype/spec/otff#organization-of-an-opentype-font)
//! reader.
//!
//! Used to find where the GSUB and GPOS tables start.

use crate::Tag;
use crate::error::ParseError;
use crate::parser::{ByteCursor, Offset, Offset32};

// https://docs.microsoft.com/en-us/typography/opentype/spec/otff#organization-of-an-opentype-font
const SFNT_VERSION_TRUE_TYPE: u32 = 0x00010000;
const SFNT_VERSION_OPEN_TYPE: u32 = 0x4F54544F;
const SFNT_VERSION_APPLE: u32 = 0x74727565; // 'true'
// https://docs.microsoft.com/en-us/typography/opentype/spec/otff#ttc-header
const COLLECTION_MAGIC: u32 = 0x74746366; // 'ttcf'


/// A table record.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TableRecord {
    /// Table tag.
    pub tag: Tag,
    /// Table checksum. Not verified.
    pub checksum: u32,
    /// Absolute offset of the table.
    pub offset: usize,
    /// Table length in bytes.
    pub length: usize,
}


/// A parsed table directory of a single font.
#[derive(Clone, PartialEq, Debug)]
pub struct Directory {
    /// The sfnt version, like `0x00010000` for TrueType outlines.
    pub sfnt_version: u32,
    /// Table records in the file order.
    pub tables: Vec<TableRecord>,
}

impl Directory {
    /// Parses a table directory of a font.
    ///
    /// `index` selects a font inside a TrueType Collection and is ignored otherwise.
    pub fn parse<C: ByteCursor>(s: &mut C, index: u32) -> Result<Self, ParseError> {
        let font_start = match fonts_in_collection(s)? {
            Some(count) => {
                if index >= count {
                    return Err(ParseError::FaceIndexOutOfBounds { index, count });
                }

                // Skip tag (4), majorVersion (2), minorVersion (2) and numFonts (4).
                let offset = 12 + 4 * index as usize;
                s.read_at::<Offset32>(offset)?.to_usize()
            }
            None => 0,
        };

        s.seek(font_start);
        let sfnt_version = s.read_u32()?;
        if !matches!(sfnt_version, SFNT_VERSION_TRUE_TYPE | SFNT_VERSION_OPEN_TYPE | SFNT_VERSION_APPLE) {
            return Err(ParseError::UnknownMagic(sfnt_version));
        }

        let num_tables = s.read_u16()?;
        s.skip(6); // searchRange (u16) + entrySelector (u16) + rangeShift (u16)

        let mut tables = Vec::with_capacity(usize::from(num_tables));
        for _ in 0..num_tables {
            // Table offsets are from the start of the file, even in collections.
            tables.push(TableRecord {
                tag: s.read_tag()?,
                checksum: s.read_u32()?,
                offset: s.read::<Offset32>()?.to_usize(),
                length: s.read_u32()? as usize,
            });
        }

        Ok(Directory {
            sfnt_version,
            tables,
        })
    }

    /// Finds a table record by tag.
    pub fn find(&self, tag: Tag) -> Option<&TableRecord> {
        self.tables.iter().find(|t| t.tag == tag)
    }
}


/// Returns the number of fonts stored in a TrueType font collection.
///
/// Returns `None` if the data is not a TrueType font collection.
pub fn fonts_in_collection<C: ByteCursor>(s: &mut C) -> Result<Option<u32>, ParseError> {
    s.seek(0);
    if s.read_u32()? != COLLECTION_MAGIC {
        return Ok(None);
    }

    s.skip(4); // majorVersion (u16) + minorVersion (u16)
    Ok(Some(s.read_u32()?))
}
