//! A [Glyph Positioning Table](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos)
//! reader.
//!
//! Interprets single adjustment (1), mark-to-base attachment (4)
//! and chaining context positioning format 3 (8) lookups,
//! directly or through an extension (9) lookup.

use std::collections::BTreeMap;

use crate::{GlyphId, Tag};
use crate::error::{ParseError, StructuralError, Warning};
use crate::ggg::{read_coverage, read_extension};
use crate::layout::{LayoutTable, SubtableReader};
use crate::parser::{ByteCursor, FromData, Offset, Offset16};

/// The GPOS table tag.
pub const TAG: Tag = Tag::from_bytes(b"GPOS");

const SINGLE: u16 = 1;
const MARK_TO_BASE: u16 = 4;
const CHAINED_CONTEXT: u16 = 8;
const EXTENSION: u16 = 9;


/// A [Value Format](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#value-record)
/// bit set.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct ValueFormat(pub u16);

#[allow(missing_docs)]
impl ValueFormat {
    #[inline] pub fn has_x_placement(self) -> bool { self.0 & 0x0001 != 0 }
    #[inline] pub fn has_y_placement(self) -> bool { self.0 & 0x0002 != 0 }
    #[inline] pub fn has_x_advance(self) -> bool { self.0 & 0x0004 != 0 }
    #[inline] pub fn has_y_advance(self) -> bool { self.0 & 0x0008 != 0 }

    /// Number of device/variation table offsets in a record.
    #[inline]
    fn device_count(self) -> usize {
        (self.0 & 0x00F0).count_ones() as usize
    }
}


/// A [Value Record](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#value-record).
///
/// Fields missing from the format are zero. Device tables are skipped.
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
#[allow(missing_docs)]
pub struct ValueRecord {
    pub x_placement: i16,
    pub y_placement: i16,
    pub x_advance: i16,
    pub y_advance: i16,
}

impl ValueRecord {
    fn parse<C: ByteCursor>(s: &mut C, format: ValueFormat) -> Result<Self, ParseError> {
        let mut record = ValueRecord::default();
        if format.has_x_placement() {
            record.x_placement = s.read_i16()?;
        }

        if format.has_y_placement() {
            record.y_placement = s.read_i16()?;
        }

        if format.has_x_advance() {
            record.x_advance = s.read_i16()?;
        }

        if format.has_y_advance() {
            record.y_advance = s.read_i16()?;
        }

        s.skip(format.device_count() * Offset16::SIZE);
        Ok(record)
    }

    /// Returns the `(dx, dy)` placement delta.
    #[inline]
    pub fn placement(&self) -> (i16, i16) {
        (self.x_placement, self.y_placement)
    }
}


/// An [Anchor Table](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#anchor-tables).
///
/// Only format 1 is fully supported. For other formats only the coordinates are read.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[allow(missing_docs)]
pub struct Anchor {
    pub format: u16,
    pub x: i16,
    pub y: i16,
}


/// A [Mark Record](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#mark-array-table).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MarkRecord {
    /// A mark class.
    pub mark_class: u16,
    /// Relative to the Mark Array.
    pub mark_anchor_offset: u16,
}

impl FromData for MarkRecord {
    const SIZE: usize = 4;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        MarkRecord {
            mark_class: u16::parse(&data[0..2]),
            mark_anchor_offset: u16::parse(&data[2..4]),
        }
    }
}


/// A mark glyph attachment point.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct MarkAnchor {
    /// A mark class.
    pub mark_class: u16,
    /// An attachment point.
    pub anchor: Anchor,
}


/// A [Positioning Lookup Record](https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-record).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct PosLookupRecord {
    /// Index into the input glyph sequence.
    pub sequence_index: u16,
    /// Index into the lookup list.
    pub lookup_list_index: u16,
}

impl FromData for PosLookupRecord {
    const SIZE: usize = 4;

    #[inline]
    fn parse(data: &[u8]) -> Self {
        PosLookupRecord {
            sequence_index: u16::parse(&data[0..2]),
            lookup_list_index: u16::parse(&data[2..4]),
        }
    }
}


/// A [Chained Sequence Context Format 3](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#chained-sequence-context-format-3-coverage-based-glyph-contexts)
/// rule.
///
/// Each sequence element is a list of glyphs that match at that position.
#[derive(Clone, PartialEq, Debug)]
pub struct ChainContextRule {
    /// Absolute offset of the subtable.
    pub offset: usize,
    /// Glyphs before the input sequence, in reverse logical order.
    pub backtrack: Vec<Vec<GlyphId>>,
    /// The input sequence.
    pub input: Vec<Vec<GlyphId>>,
    /// Glyphs after the input sequence.
    pub lookahead: Vec<Vec<GlyphId>>,
    /// Lookups to apply to the input sequence.
    pub lookup_records: Vec<PosLookupRecord>,
}


/// A GPOS [`SubtableReader`].
#[derive(Clone, Default, Debug)]
pub struct Positions {
    adjustments: BTreeMap<GlyphId, ValueRecord>,
    mark_anchors: BTreeMap<GlyphId, MarkAnchor>,
    base_anchors: BTreeMap<(u16, GlyphId), Anchor>,
    chain_rules: Vec<ChainContextRule>,
    warnings: Vec<Warning>,
}

impl Positions {
    /// Creates an empty positions set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns single adjustment values per glyph.
    pub fn adjustments(&self) -> &BTreeMap<GlyphId, ValueRecord> {
        &self.adjustments
    }

    /// Returns single adjustment `(dx, dy)` placement deltas per glyph.
    pub fn placements(&self) -> BTreeMap<GlyphId, (i16, i16)> {
        self.adjustments.iter().map(|(&glyph, value)| (glyph, value.placement())).collect()
    }

    /// Returns mark glyph attachment points.
    pub fn mark_anchors(&self) -> &BTreeMap<GlyphId, MarkAnchor> {
        &self.mark_anchors
    }

    /// Returns base glyph attachment points keyed by `(mark class, base glyph)`.
    pub fn base_anchors(&self) -> &BTreeMap<(u16, GlyphId), Anchor> {
        &self.base_anchors
    }

    /// Returns base glyph `(x, y)` attachment points keyed by `(mark class, base glyph)`.
    pub fn attachments(&self) -> BTreeMap<(u16, GlyphId), (i16, i16)> {
        self.base_anchors.iter().map(|(&key, anchor)| (key, (anchor.x, anchor.y))).collect()
    }

    /// Returns chaining context rules in the lookup order.
    pub fn chain_rules(&self) -> &[ChainContextRule] {
        &self.chain_rules
    }

    /// Returns all tolerated problems found so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn unsupported_format(&mut self, lookup_type: u16, format: u16, offset: usize) {
        self.warn(Warning::UnsupportedSubtableFormat { table: TAG, lookup_type, format, offset });
    }

    fn dispatch<C: ByteCursor>(
        &mut self,
        s: &mut C,
        lookup_type: u16,
        offset: usize,
        in_extension: bool,
    ) -> Result<(), ParseError> {
        match lookup_type {
            SINGLE => self.read_single(s, offset),
            MARK_TO_BASE => self.read_mark_to_base(s, offset),
            CHAINED_CONTEXT => self.read_chained_context(s, offset),
            EXTENSION if in_extension => {
                Err(StructuralError::NestedExtension { offset }.into())
            }
            EXTENSION => {
                let (lookup_type, offset) = read_extension(s, offset)?;
                self.dispatch(s, lookup_type, offset, true)
            }
            _ => {
                self.warn(Warning::UnsupportedLookupType { table: TAG, lookup_type, offset });
                Ok(())
            }
        }
    }

    // https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-1-single-adjustment-positioning-subtable
    fn read_single<C: ByteCursor>(&mut self, s: &mut C, offset: usize) -> Result<(), ParseError> {
        s.seek(offset);
        let format = s.read_u16()?;
        match format {
            1 => {
                let coverage_offset: Offset16 = s.read()?;
                let value_format = ValueFormat(s.read_u16()?);
                let value = ValueRecord::parse(s, value_format)?;
                let coverage = read_coverage(s, offset + coverage_offset.to_usize())?;
                for glyph in coverage {
                    self.adjustments.insert(glyph, value);
                }
            }
            2 => {
                let coverage_offset: Offset16 = s.read()?;
                let value_format = ValueFormat(s.read_u16()?);
                let count = s.read_u16()?;
                let mut values = Vec::with_capacity(usize::from(count));
                for _ in 0..count {
                    values.push(ValueRecord::parse(s, value_format)?);
                }

                let coverage = read_coverage(s, offset + coverage_offset.to_usize())?;
                if coverage.len() != values.len() {
                    return Err(StructuralError::ValueCoverageMismatch {
                        offset,
                        expected: count,
                        found: coverage.len(),
                    }.into());
                }

                for (glyph, value) in coverage.into_iter().zip(values) {
                    self.adjustments.insert(glyph, value);
                }
            }
            _ => self.unsupported_format(SINGLE, format, offset),
        }

        Ok(())
    }

    // https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#lookup-type-4-mark-to-base-attachment-positioning-subtable
    fn read_mark_to_base<C: ByteCursor>(&mut self, s: &mut C, offset: usize) -> Result<(), ParseError> {
        s.seek(offset);
        let format = s.read_u16()?;
        if format != 1 {
            self.unsupported_format(MARK_TO_BASE, format, offset);
            return Ok(());
        }

        let mark_coverage_offset: Offset16 = s.read()?;
        let base_coverage_offset: Offset16 = s.read()?;
        let class_count = s.read_u16()?;
        let mark_array = offset + s.read::<Offset16>()?.to_usize();
        let base_array = offset + s.read::<Offset16>()?.to_usize();

        let marks = read_coverage(s, offset + mark_coverage_offset.to_usize())?;
        let bases = read_coverage(s, offset + base_coverage_offset.to_usize())?;

        s.seek(mark_array);
        let mark_records = s.read_counted_array16::<MarkRecord>()?;
        if mark_records.len() != marks.len() {
            return Err(StructuralError::MarkCoverageMismatch {
                offset: mark_array,
                expected: mark_records.len() as u16,
                found: marks.len(),
            }.into());
        }

        s.seek(base_array);
        let base_count = s.read_u16()?;
        if usize::from(base_count) != bases.len() {
            return Err(StructuralError::BaseCoverageMismatch {
                offset: base_array,
                expected: base_count,
                found: bases.len(),
            }.into());
        }

        let mut rows = Vec::with_capacity(usize::from(base_count));
        for _ in 0..base_count {
            rows.push(s.read_array16::<Offset16>(class_count)?);
        }

        for (glyph, record) in marks.into_iter().zip(mark_records) {
            let anchor = self.read_anchor(s, mark_array + usize::from(record.mark_anchor_offset))?;
            self.mark_anchors.insert(glyph, MarkAnchor { mark_class: record.mark_class, anchor });
        }

        // Bases often share anchors, so each distinct one is read once.
        let mut anchors: BTreeMap<u16, Anchor> = BTreeMap::new();
        for anchor_offset in rows.iter().flatten() {
            if anchor_offset.is_null() || anchors.contains_key(&anchor_offset.0) {
                continue;
            }

            let anchor = self.read_anchor(s, base_array + anchor_offset.to_usize())?;
            anchors.insert(anchor_offset.0, anchor);
        }

        for (row, &glyph) in rows.iter().zip(bases.iter()) {
            for (class, anchor_offset) in row.iter().enumerate() {
                if let Some(&anchor) = anchors.get(&anchor_offset.0) {
                    self.base_anchors.insert((class as u16, glyph), anchor);
                }
            }
        }

        Ok(())
    }

    fn read_anchor<C: ByteCursor>(&mut self, s: &mut C, offset: usize) -> Result<Anchor, ParseError> {
        s.seek(offset);
        let format = s.read_u16()?;
        // All formats start with the same coordinates.
        let x = s.read_i16()?;
        let y = s.read_i16()?;
        if format != 1 {
            self.warn(Warning::UnsupportedAnchorFormat { format, offset });
        }

        Ok(Anchor { format, x, y })
    }

    // https://docs.microsoft.com/en-us/typography/opentype/spec/gpos#chained-contexts-positioning-format-3-coverage-based-glyph-contexts
    fn read_chained_context<C: ByteCursor>(&mut self, s: &mut C, offset: usize) -> Result<(), ParseError> {
        s.seek(offset);
        let format = s.read_u16()?;
        if format != 3 {
            self.unsupported_format(CHAINED_CONTEXT, format, offset);
            return Ok(());
        }

        let backtrack_offsets = s.read_counted_array16::<Offset16>()?;
        let input_offsets = s.read_counted_array16::<Offset16>()?;
        let lookahead_offsets = s.read_counted_array16::<Offset16>()?;
        let lookup_records = s.read_counted_array16::<PosLookupRecord>()?;

        let mut read_sequence = |offsets: &[Offset16]| -> Result<Vec<Vec<GlyphId>>, ParseError> {
            offsets.iter().map(|o| read_coverage(s, offset + o.to_usize())).collect()
        };

        let backtrack = read_sequence(&backtrack_offsets)?;
        let input = read_sequence(&input_offsets)?;
        let lookahead = read_sequence(&lookahead_offsets)?;

        self.chain_rules.push(ChainContextRule {
            offset,
            backtrack,
            input,
            lookahead,
            lookup_records,
        });

        Ok(())
    }
}

impl SubtableReader for Positions {
    fn read_subtable<C: ByteCursor>(
        &mut self,
        s: &mut C,
        lookup_type: u16,
        offset: usize,
    ) -> Result<(), ParseError> {
        self.dispatch(s, lookup_type, offset, false)
    }
}


/// A parsed GPOS table.
#[derive(Clone, Debug)]
pub struct Table {
    /// Scripts, features and lookups.
    pub layout: LayoutTable,
    /// Positioning data from all supported lookups.
    pub positions: Positions,
}

impl Table {
    /// Parses a GPOS table at an absolute `offset`.
    ///
    /// Use [`LayoutTable::parse`] with your own [`Positions`]
    /// to keep partial results on error.
    pub fn parse<C: ByteCursor>(s: &mut C, offset: usize) -> Result<Self, ParseError> {
        let mut positions = Positions::new();
        let layout = LayoutTable::parse(s, offset, &mut positions)?;
        Ok(Table { layout, positions })
    }
}
