//! Common types for GPOS and GSUB tables.

use crate::{GlyphId, Tag};
use crate::error::ParseError;
use crate::parser::{ByteCursor, FromData, Offset, Offset32};


#[derive(Clone, Copy, Debug)]
struct RangeRecord {
    start_glyph_id: GlyphId,
    end_glyph_id: GlyphId,
    // Not used, ranges are concatenated in record order.
    #[allow(dead_code)]
    start_coverage_index: u16,
}

impl RangeRecord {
    fn range(&self) -> core::ops::RangeInclusive<u16> {
        self.start_glyph_id.0..=self.end_glyph_id.0
    }
}

impl FromData for RangeRecord {
    const SIZE: usize = 6;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        RangeRecord {
            start_glyph_id: GlyphId::parse(&data[0..2]),
            end_glyph_id: GlyphId::parse(&data[2..4]),
            start_coverage_index: u16::parse(&data[4..6]),
        }
    }
}


/// Reads a [Coverage Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#coverage-table)
/// at an absolute `offset`.
///
/// Both formats are decoded into a single list of glyphs.
/// Format 1 glyphs are returned in file order.
/// Format 2 ranges are expanded and concatenated in record order;
/// `startCoverageIndex` is ignored. A range with `start > end` is empty.
pub fn read_coverage<C: ByteCursor>(
    s: &mut C,
    offset: usize,
) -> Result<Vec<GlyphId>, ParseError> {
    s.seek(offset);
    let format = s.read_u16()?;
    match format {
        1 => s.read_counted_array16::<GlyphId>(),
        2 => {
            let records = s.read_counted_array16::<RangeRecord>()?;
            let mut glyphs = Vec::new();
            for record in records {
                glyphs.extend(record.range().map(GlyphId));
            }

            Ok(glyphs)
        }
        _ => Err(ParseError::UnsupportedFormat { context: "coverage", value: format, offset }),
    }
}


/// Reads an Extension subtable header at an absolute `offset`.
///
/// Returns the real lookup type and the absolute offset of the real subtable.
///
/// - <https://docs.microsoft.com/en-us/typography/opentype/spec/gsub#ES>
/// - <https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#lookuptype-9-extension-positioning>
pub fn read_extension<C: ByteCursor>(
    s: &mut C,
    offset: usize,
) -> Result<(u16, usize), ParseError> {
    s.seek(offset);
    let format = s.read_u16()?;
    if format != 1 {
        return Err(ParseError::UnsupportedFormat { context: "extension", value: format, offset });
    }

    let lookup_type = s.read_u16()?;
    let extension_offset: Offset32 = s.read()?;
    let target = offset.checked_add(extension_offset.to_usize()).ok_or(ParseError::Io {
        offset,
        kind: std::io::ErrorKind::InvalidData,
    })?;

    Ok((lookup_type, target))
}


/// A writing system recognized by [`LayoutTable::supported_language`].
///
/// [`LayoutTable::supported_language`]: crate::LayoutTable::supported_language
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
#[allow(missing_docs)]
pub enum Language {
    Arabic,
    Bengali,
    Cyrillic,
    Devanagari,
    Greek,
    Gujarati,
    Gurmukhi,
    Hebrew,
    Kannada,
    Latin,
    Malayalam,
    Oriya,
    Tamil,
    Telugu,
    Thai,
}

impl Language {
    /// Returns the OpenType script tags of this language.
    ///
    /// Indic scripts have two tags: the old one and the "version 2" one.
    pub fn script_tags(self) -> &'static [&'static [u8; 4]] {
        match self {
            Language::Arabic => &[b"arab"],
            Language::Bengali => &[b"beng", b"bng2"],
            Language::Cyrillic => &[b"cyrl"],
            Language::Devanagari => &[b"deva", b"dev2"],
            Language::Greek => &[b"grek"],
            Language::Gujarati => &[b"gujr", b"gjr2"],
            Language::Gurmukhi => &[b"guru", b"gur2"],
            Language::Hebrew => &[b"hebr"],
            Language::Kannada => &[b"knda", b"knd2"],
            Language::Latin => &[b"latn"],
            Language::Malayalam => &[b"mlym", b"mlm2"],
            Language::Oriya => &[b"orya", b"ory2"],
            Language::Tamil => &[b"taml", b"tml2"],
            Language::Telugu => &[b"telu", b"tel2"],
            Language::Thai => &[b"thai"],
        }
    }

    /// Finds a language by a script tag.
    pub fn from_script_tag(tag: Tag) -> Option<Self> {
        const ALL: &[Language] = &[
            Language::Arabic,
            Language::Bengali,
            Language::Cyrillic,
            Language::Devanagari,
            Language::Greek,
            Language::Gujarati,
            Language::Gurmukhi,
            Language::Hebrew,
            Language::Kannada,
            Language::Latin,
            Language::Malayalam,
            Language::Oriya,
            Language::Tamil,
            Language::Telugu,
            Language::Thai,
        ];

        ALL.iter().copied().find(|lang| {
            lang.script_tags().iter().any(|t| Tag::from_bytes(t) == tag)
        })
    }
}
