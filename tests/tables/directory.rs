use std::io::Cursor;

use ttf_layout::{GlyphId, ParseError, Tag};
use ttf_layout::directory::{fonts_in_collection, Directory};
use ttf_layout::{gpos, gsub};
use ttf_layout::parser::{IoCursor, Stream};
use crate::{convert, layout_table, Unit::*};

fn font() -> Vec<u8> {
    convert(&[
        UInt32(0x00010000), // sfnt version
        UInt16(2), // table count
        UInt16(0), // search range
        UInt16(0), // entry selector
        UInt16(0), // range shift
        // Table Record [0]
        Raw(b"GPOS"), // tag
        UInt32(0xAABBCCDD), // checksum
        UInt32(44), // offset
        UInt32(10), // length
        // Table Record [1]
        Raw(b"GSUB"), // tag
        UInt32(1), // checksum
        UInt32(54), // offset
        UInt32(20), // length
    ])
}

fn collection() -> Vec<u8> {
    convert(&[
        Raw(b"ttcf"), // tag
        UInt16(1), // major version
        UInt16(0), // minor version
        UInt32(2), // font count
        UInt32(20), // offset to font [0]
        UInt32(32), // offset to font [1]
        // Font [0]
        Raw(b"OTTO"), // sfnt version
        UInt16(0), // table count
        UInt16(0), // search range
        UInt16(0), // entry selector
        UInt16(0), // range shift
        // Font [1]
        UInt32(0x00010000), // sfnt version
        UInt16(1), // table count
        UInt16(0), // search range
        UInt16(0), // entry selector
        UInt16(0), // range shift
        Raw(b"GSUB"), // tag
        UInt32(0), // checksum
        UInt32(100), // offset
        UInt32(4), // length
    ])
}

// A font with GSUB and GPOS tables placed right after the directory.
fn font_with_tables(gsub: &[u8], gpos: &[u8]) -> Vec<u8> {
    let gsub_offset = 12 + 2 * 16;
    let gpos_offset = gsub_offset + gsub.len() as u32;
    let mut data = convert(&[
        Raw(b"OTTO"), // sfnt version
        UInt16(2), // table count
        UInt16(0), // search range
        UInt16(0), // entry selector
        UInt16(0), // range shift
        // Table Record [0]
        Raw(b"GSUB"), // tag
        UInt32(0), // checksum
        UInt32(gsub_offset), // offset
        UInt32(gsub.len() as u32), // length
        // Table Record [1]
        Raw(b"GPOS"), // tag
        UInt32(0), // checksum
        UInt32(gpos_offset), // offset
        UInt32(gpos.len() as u32), // length
    ]);
    data.extend_from_slice(gsub);
    data.extend_from_slice(gpos);
    data
}

fn single_substitution() -> Vec<u8> {
    convert(&[
        UInt16(1), // format
        UInt16(6), // offset to coverage
        Int16(-3), // delta glyph ID
        // Coverage
        UInt16(1), // format
        UInt16(1), // glyph count
        UInt16(503), // glyph [0]
    ])
}

fn single_adjustment() -> Vec<u8> {
    convert(&[
        UInt16(1), // format
        UInt16(8), // offset to coverage
        UInt16(0x0001), // value format: x placement
        Int16(12), // x placement
        // Coverage
        UInt16(1), // format
        UInt16(1), // glyph count
        UInt16(5), // glyph [0]
    ])
}

#[test]
fn single_font() {
    let data = font();
    let mut s = Stream::new(&data);
    assert_eq!(fonts_in_collection(&mut s), Ok(None));

    let dir = Directory::parse(&mut s, 0).unwrap();
    assert_eq!(dir.sfnt_version, 0x00010000);
    assert_eq!(dir.tables.len(), 2);
    assert_eq!(dir.tables[0].checksum, 0xAABBCCDD);

    let record = dir.find(Tag::from_bytes(b"GSUB")).unwrap();
    assert_eq!(record.offset, 54);
    assert_eq!(record.length, 20);
    assert!(dir.find(Tag::from_bytes(b"kern")).is_none());
}

#[test]
fn collection_fonts() {
    let data = collection();
    let mut s = Stream::new(&data);
    assert_eq!(fonts_in_collection(&mut s), Ok(Some(2)));

    let first = Directory::parse(&mut s, 0).unwrap();
    assert_eq!(first.sfnt_version, u32::from_be_bytes(*b"OTTO"));
    assert!(first.tables.is_empty());

    let second = Directory::parse(&mut s, 1).unwrap();
    assert_eq!(second.sfnt_version, 0x00010000);
    assert_eq!(second.find(Tag::from_bytes(b"GSUB")).map(|t| t.offset), Some(100));
}

#[test]
fn collection_index_out_of_bounds() {
    let data = collection();
    assert_eq!(
        Directory::parse(&mut Stream::new(&data), 2),
        Err(ParseError::FaceIndexOutOfBounds { index: 2, count: 2 })
    );
}

#[test]
fn unknown_magic() {
    let data = convert(&[
        UInt32(0x12345678), // sfnt version
        UInt16(0), // table count
    ]);

    assert_eq!(
        Directory::parse(&mut Stream::new(&data), 0),
        Err(ParseError::UnknownMagic(0x12345678))
    );
}

#[test]
fn truncated_records() {
    let data = font();
    assert!(matches!(
        Directory::parse(&mut Stream::new(&data[..30]), 0),
        Err(ParseError::Io { .. })
    ));
}

#[test]
fn gsub_and_gpos_from_reader() {
    let data = font_with_tables(
        &layout_table(b"latn", &[(1, single_substitution())]),
        &layout_table(b"latn", &[(1, single_adjustment())]),
    );

    let mut cursor = IoCursor::new(Cursor::new(data));
    let dir = Directory::parse(&mut cursor, 0).unwrap();

    let record = dir.find(gsub::TAG).unwrap();
    let table = gsub::Table::parse(&mut cursor, record.offset).unwrap();
    assert_eq!(table.substitutions.raw_map().get(&GlyphId(500)), Some(&vec![GlyphId(503)]));

    let record = dir.find(gpos::TAG).unwrap();
    let table = gpos::Table::parse(&mut cursor, record.offset).unwrap();
    assert_eq!(table.positions.placements()[&GlyphId(5)], (12, 0));
}

#[test]
fn gsub_failure_does_not_affect_gpos() {
    let broken = convert(&[
        UInt16(9), // format
    ]);

    let data = font_with_tables(
        &layout_table(b"latn", &[(4, broken)]),
        &layout_table(b"latn", &[(1, single_adjustment())]),
    );

    let mut s = Stream::new(&data);
    let dir = Directory::parse(&mut s, 0).unwrap();

    let gsub_start = dir.find(gsub::TAG).unwrap().offset;
    assert!(matches!(
        gsub::Table::parse(&mut s, gsub_start),
        Err(ParseError::UnsupportedFormat { context: "ligature substitution", value: 9, .. })
    ));

    let gpos_start = dir.find(gpos::TAG).unwrap().offset;
    let table = gpos::Table::parse(&mut s, gpos_start).unwrap();
    assert_eq!(table.positions.placements()[&GlyphId(5)], (12, 0));
}
