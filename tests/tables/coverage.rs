use ttf_layout::{GlyphId, ParseError};
use ttf_layout::ggg::read_coverage;
use ttf_layout::parser::Stream;
use crate::{convert, Unit::*};

fn glyphs(ids: &[u16]) -> Vec<GlyphId> {
    ids.iter().copied().map(GlyphId).collect()
}

#[test]
fn format1_keeps_file_order() {
    let data = convert(&[
        UInt16(1), // format
        UInt16(4), // glyph count
        UInt16(9), // glyph [0]
        UInt16(3), // glyph [1]
        UInt16(300), // glyph [2]
        UInt16(4), // glyph [3]
    ]);

    let coverage = read_coverage(&mut Stream::new(&data), 0).unwrap();
    assert_eq!(coverage, glyphs(&[9, 3, 300, 4]));
}

#[test]
fn format1_empty() {
    let data = convert(&[
        UInt16(1), // format
        UInt16(0), // glyph count
    ]);

    let coverage = read_coverage(&mut Stream::new(&data), 0).unwrap();
    assert!(coverage.is_empty());
}

#[test]
fn format2_ranges_are_concatenated() {
    let data = convert(&[
        UInt16(2), // format
        UInt16(2), // range count
        // Range [0]
        UInt16(5), // start glyph
        UInt16(7), // end glyph
        UInt16(0), // start coverage index
        // Range [1]
        UInt16(20), // start glyph
        UInt16(21), // end glyph
        UInt16(3), // start coverage index
    ]);

    let coverage = read_coverage(&mut Stream::new(&data), 0).unwrap();
    assert_eq!(coverage, glyphs(&[5, 6, 7, 20, 21]));
}

#[test]
fn format2_start_coverage_index_is_ignored() {
    let data = convert(&[
        UInt16(2), // format
        UInt16(2), // range count
        // Range [0]
        UInt16(50), // start glyph
        UInt16(50), // end glyph
        UInt16(1), // start coverage index
        // Range [1]
        UInt16(10), // start glyph
        UInt16(10), // end glyph
        UInt16(0), // start coverage index
    ]);

    let coverage = read_coverage(&mut Stream::new(&data), 0).unwrap();
    assert_eq!(coverage, glyphs(&[50, 10]));
}

#[test]
fn format2_inverted_range() {
    let data = convert(&[
        UInt16(2), // format
        UInt16(1), // range count
        UInt16(7), // start glyph
        UInt16(5), // end glyph
        UInt16(0), // start coverage index
    ]);

    let coverage = read_coverage(&mut Stream::new(&data), 0).unwrap();
    assert!(coverage.is_empty());
}

#[test]
fn format2_last_glyph() {
    let data = convert(&[
        UInt16(2), // format
        UInt16(1), // range count
        UInt16(65534), // start glyph
        UInt16(65535), // end glyph
        UInt16(0), // start coverage index
    ]);

    let coverage = read_coverage(&mut Stream::new(&data), 0).unwrap();
    assert_eq!(coverage, glyphs(&[65534, 65535]));
}

#[test]
fn absolute_offset() {
    let data = convert(&[
        UInt32(0xFFFFFFFF), // unrelated data
        UInt16(1), // format
        UInt16(1), // glyph count
        UInt16(42), // glyph [0]
    ]);

    let coverage = read_coverage(&mut Stream::new(&data), 4).unwrap();
    assert_eq!(coverage, glyphs(&[42]));
}

#[test]
fn unsupported_format() {
    let data = convert(&[
        UInt16(0), // padding
        UInt16(3), // format
        UInt16(0), // glyph count
    ]);

    assert_eq!(
        read_coverage(&mut Stream::new(&data), 2),
        Err(ParseError::UnsupportedFormat { context: "coverage", value: 3, offset: 2 })
    );
}

#[test]
fn truncated() {
    let data = convert(&[
        UInt16(1), // format
        UInt16(3), // glyph count
        UInt16(1), // glyph [0]
    ]);

    assert!(matches!(
        read_coverage(&mut Stream::new(&data), 0),
        Err(ParseError::Io { offset: 6, .. })
    ));
}
