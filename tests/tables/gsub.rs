use std::collections::HashMap;

use ttf_layout::{GlyphId, LayoutTable, ParseError, ResolutionError, StructuralError, SubtableReader, Warning};
use ttf_layout::gsub::{self, Glyph, Substitutions};
use ttf_layout::parser::Stream;
use crate::{convert, layout_table, Unit::*};

fn single_format1(glyph: u16, delta: i16) -> Vec<u8> {
    convert(&[
        UInt16(1), // format
        UInt16(6), // offset to coverage
        Int16(delta), // delta glyph ID
        // Coverage
        UInt16(1), // format
        UInt16(1), // glyph count
        UInt16(glyph), // glyph [0]
    ])
}

fn ligature(first: u16, ligature: u16, rest: &[u16]) -> Vec<u8> {
    let mut data = convert(&[
        UInt16(1), // format
        UInt16(8), // offset to coverage
        UInt16(1), // ligature set count
        UInt16(14), // offset to ligature set [0]
        // Coverage
        UInt16(1), // format
        UInt16(1), // glyph count
        UInt16(first), // glyph [0]
        // Ligature Set
        UInt16(1), // ligature count
        UInt16(4), // offset to ligature [0]
        // Ligature
        UInt16(ligature), // ligature glyph
        UInt16(rest.len() as u16 + 1), // component count
    ]);

    for &glyph in rest {
        data.extend(convert(&[UInt16(glyph)])); // component
    }

    data
}

fn read(lookup_type: u16, data: &[u8]) -> (Substitutions, Result<(), ParseError>) {
    let mut subs = Substitutions::new();
    let res = subs.read_subtable(&mut Stream::new(data), lookup_type, 0);
    (subs, res)
}

fn chars(pairs: &[(u16, char)]) -> HashMap<GlyphId, char> {
    pairs.iter().map(|&(g, c)| (GlyphId(g), c)).collect()
}

fn components(ids: &[u16]) -> Vec<GlyphId> {
    ids.iter().copied().map(GlyphId).collect()
}

#[test]
fn single_format1_delta() {
    let data = layout_table(b"latn", &[(1, single_format1(503, -3))]);
    let table = gsub::Table::parse(&mut Stream::new(&data), 0).unwrap();
    let subs = &table.substitutions;
    assert_eq!(subs.raw_map().len(), 1);
    assert_eq!(subs.raw_map().get(&GlyphId(500)), Some(&components(&[503])));

    let mut widths = vec![0; 501];
    widths[500] = 610;
    let glyphs = subs.resolve(&chars(&[(503, 'A')]), &widths).unwrap();
    assert_eq!(glyphs.len(), 1);
    assert_eq!(glyphs["A"], Glyph { glyph_id: 500, width: 610, text: "A".to_string() });
}

#[test]
fn single_format1_delta_wraps() {
    let (subs, res) = read(1, &single_format1(65535, 2));
    res.unwrap();
    assert_eq!(subs.raw_map().get(&GlyphId(1)), Some(&components(&[65535])));
}

#[test]
fn single_format2() {
    let data = convert(&[
        UInt16(2), // format
        UInt16(10), // offset to coverage
        UInt16(2), // glyph count
        UInt16(120), // substitute [0]
        UInt16(121), // substitute [1]
        // Coverage
        UInt16(1), // format
        UInt16(2), // glyph count
        UInt16(20), // glyph [0]
        UInt16(21), // glyph [1]
    ]);

    let (subs, res) = read(1, &data);
    res.unwrap();
    assert_eq!(subs.raw_map().get(&GlyphId(120)), Some(&components(&[20])));
    assert_eq!(subs.raw_map().get(&GlyphId(121)), Some(&components(&[21])));
}

#[test]
fn single_format2_coverage_mismatch() {
    let data = convert(&[
        UInt16(2), // format
        UInt16(8), // offset to coverage
        UInt16(1), // glyph count
        UInt16(120), // substitute [0]
        // Coverage
        UInt16(1), // format
        UInt16(2), // glyph count
        UInt16(20), // glyph [0]
        UInt16(21), // glyph [1]
    ]);

    let (_, res) = read(1, &data);
    assert_eq!(res, Err(ParseError::Structural(StructuralError::SubstituteCoverageMismatch {
        offset: 0,
        expected: 1,
        found: 2,
    })));
}

#[test]
fn single_unsupported_format() {
    let data = convert(&[
        UInt16(3), // format
        UInt16(0), // offset to coverage
    ]);

    let (_, res) = read(1, &data);
    assert_eq!(res, Err(ParseError::UnsupportedFormat {
        context: "single substitution",
        value: 3,
        offset: 0,
    }));
}

#[test]
fn ligature_ffi() {
    let data = layout_table(b"latn", &[(4, ligature(10, 700, &[11, 12]))]);
    let table = gsub::Table::parse(&mut Stream::new(&data), 0).unwrap();
    let subs = &table.substitutions;
    assert_eq!(subs.raw_map().get(&GlyphId(700)), Some(&components(&[10, 11, 12])));

    let mut widths = vec![0; 701];
    widths[700] = 1520;
    let glyphs = subs.resolve(&chars(&[(10, 'f'), (11, 'f'), (12, 'i')]), &widths).unwrap();
    assert_eq!(glyphs["ffi"], Glyph { glyph_id: 700, width: 1520, text: "ffi".to_string() });
}

#[test]
fn ligature_set_count_mismatch() {
    let data = convert(&[
        UInt16(1), // format
        UInt16(12), // offset to coverage
        UInt16(3), // ligature set count
        UInt16(0), // offset to ligature set [0]
        UInt16(0), // offset to ligature set [1]
        UInt16(0), // offset to ligature set [2]
        // Coverage
        UInt16(1), // format
        UInt16(2), // glyph count
        UInt16(10), // glyph [0]
        UInt16(11), // glyph [1]
    ]);

    let (subs, res) = read(4, &data);
    assert_eq!(res, Err(ParseError::Structural(StructuralError::LigSetCoverageMismatch {
        offset: 0,
        expected: 3,
        found: 2,
    })));
    assert!(subs.raw_map().is_empty());
}

#[test]
fn failed_lookup_does_not_block_the_next_one() {
    let broken = convert(&[
        UInt16(1), // format
        UInt16(12), // offset to coverage
        UInt16(3), // ligature set count
        UInt16(0), // offset to ligature set [0]
        UInt16(0), // offset to ligature set [1]
        UInt16(0), // offset to ligature set [2]
        // Coverage
        UInt16(1), // format
        UInt16(2), // glyph count
        UInt16(10), // glyph [0]
        UInt16(11), // glyph [1]
    ]);

    let data = layout_table(b"latn", &[(4, broken), (1, single_format1(503, -3))]);
    let mut subs = Substitutions::new();
    let res = LayoutTable::parse(&mut Stream::new(&data), 0, &mut subs);
    assert!(matches!(
        res,
        Err(ParseError::Structural(StructuralError::LigSetCoverageMismatch { expected: 3, found: 2, .. }))
    ));
    assert_eq!(subs.raw_map().get(&GlyphId(500)), Some(&components(&[503])));
}

#[test]
fn ligature_unsupported_format() {
    let data = convert(&[
        UInt16(2), // format
        UInt16(0), // offset to coverage
    ]);

    let (_, res) = read(4, &data);
    assert_eq!(res, Err(ParseError::UnsupportedFormat {
        context: "ligature substitution",
        value: 2,
        offset: 0,
    }));
}

#[test]
fn ligature_without_components() {
    let mut data = ligature(10, 700, &[]);
    // Patch the component count to zero.
    let len = data.len();
    data[len - 1] = 0;

    let (_, res) = read(4, &data);
    assert_eq!(res, Err(ParseError::Structural(StructuralError::EmptyLigature { offset: 18 })));
}

#[test]
fn duplicated_ligature_last_wins() {
    let data = convert(&[
        UInt16(1), // format
        UInt16(8), // offset to coverage
        UInt16(1), // ligature set count
        UInt16(14), // offset to ligature set [0]
        // Coverage
        UInt16(1), // format
        UInt16(1), // glyph count
        UInt16(10), // glyph [0]
        // Ligature Set
        UInt16(2), // ligature count
        UInt16(6), // offset to ligature [0]
        UInt16(12), // offset to ligature [1]
        // Ligature [0]
        UInt16(700), // ligature glyph
        UInt16(2), // component count
        UInt16(11), // component [1]
        // Ligature [1]
        UInt16(700), // ligature glyph
        UInt16(2), // component count
        UInt16(12), // component [1]
    ]);

    let (subs, res) = read(4, &data);
    res.unwrap();
    assert_eq!(subs.raw_map().get(&GlyphId(700)), Some(&components(&[10, 12])));
    assert_eq!(subs.warnings(), &[Warning::DuplicateSubstitution(GlyphId(700))]);
}

#[test]
fn unknown_lookup_type_is_skipped() {
    let unknown = convert(&[
        UInt16(1), // format
        UInt16(0), // whatever
    ]);

    let data = layout_table(b"latn", &[(99, unknown), (1, single_format1(503, -3))]);
    let table = gsub::Table::parse(&mut Stream::new(&data), 0).unwrap();
    assert_eq!(table.layout.lookups.len(), 2);
    assert_eq!(table.substitutions.raw_map().get(&GlyphId(500)), Some(&components(&[503])));

    let warnings = table.substitutions.warnings();
    assert_eq!(warnings.len(), 1);
    assert!(matches!(
        warnings[0],
        Warning::UnsupportedLookupType { table: gsub::TAG, lookup_type: 99, .. }
    ));
}

#[test]
fn extension() {
    let mut data = convert(&[
        UInt16(1), // format
        UInt16(1), // extension lookup type
        UInt32(8), // offset to extension subtable
    ]);
    data.extend(single_format1(503, -3));

    let (subs, res) = read(7, &data);
    res.unwrap();
    assert_eq!(subs.raw_map().get(&GlyphId(500)), Some(&components(&[503])));
}

#[test]
fn nested_extension() {
    let data = convert(&[
        UInt16(1), // format
        UInt16(7), // extension lookup type
        UInt32(8), // offset to extension subtable
        // Extension
        UInt16(1), // format
        UInt16(1), // extension lookup type
        UInt32(8), // offset to extension subtable
    ]);

    let (_, res) = read(7, &data);
    assert_eq!(res, Err(ParseError::Structural(StructuralError::NestedExtension { offset: 8 })));
}

#[test]
fn nested_composite() {
    let data = layout_table(b"latn", &[
        (4, ligature(10, 700, &[800])),
        (1, single_format1(12, 788)),
    ]);
    let table = gsub::Table::parse(&mut Stream::new(&data), 0).unwrap();

    let glyphs = table.substitutions.resolve(&chars(&[(10, 'f'), (12, 'i')]), &[]).unwrap();
    assert_eq!(glyphs.len(), 2);
    assert_eq!(glyphs["fi"], Glyph { glyph_id: 700, width: 0, text: "fi".to_string() });
    assert_eq!(glyphs["i"], Glyph { glyph_id: 800, width: 0, text: "i".to_string() });
}

#[test]
fn self_reference() {
    let (subs, res) = read(4, &ligature(50, 50, &[]));
    res.unwrap();
    assert_eq!(
        subs.resolve(&HashMap::new(), &[]),
        Err(ResolutionError::MissingGlyphMapping(GlyphId(50)))
    );
}

#[test]
fn mapped_glyph_is_not_expanded() {
    let (subs, res) = read(4, &ligature(50, 50, &[]));
    res.unwrap();
    let glyphs = subs.resolve(&chars(&[(50, 'x')]), &[]).unwrap();
    assert_eq!(glyphs["x"].glyph_id, 50);
}

#[test]
fn cycle() {
    let data = convert(&[
        UInt16(2), // format
        UInt16(10), // offset to coverage
        UInt16(2), // glyph count
        UInt16(61), // substitute [0]
        UInt16(60), // substitute [1]
        // Coverage
        UInt16(1), // format
        UInt16(2), // glyph count
        UInt16(60), // glyph [0]
        UInt16(61), // glyph [1]
    ]);

    let (subs, res) = read(1, &data);
    res.unwrap();
    assert_eq!(
        subs.resolve(&HashMap::new(), &[]),
        Err(ResolutionError::MissingGlyphMapping(GlyphId(60)))
    );
}

#[test]
fn missing_mapping() {
    let (subs, res) = read(4, &ligature(10, 700, &[11, 12]));
    res.unwrap();
    let chars = chars(&[(10, 'f')]);
    assert_eq!(
        subs.resolve(&chars, &[]),
        Err(ResolutionError::MissingGlyphMapping(GlyphId(11)))
    );

    let (glyphs, errors) = subs.resolve_lossy(&chars, &[]);
    assert!(glyphs.is_empty());
    assert_eq!(errors, vec![ResolutionError::MissingGlyphMapping(GlyphId(11))]);
}

#[test]
fn same_text_keeps_smallest_glyph() {
    let data = layout_table(b"latn", &[
        (4, ligature(10, 701, &[12])),
        (4, ligature(10, 700, &[12])),
    ]);
    let table = gsub::Table::parse(&mut Stream::new(&data), 0).unwrap();

    let glyphs = table.substitutions.resolve(&chars(&[(10, 'f'), (12, 'i')]), &[]).unwrap();
    assert_eq!(glyphs.len(), 1);
    assert_eq!(glyphs["fi"].glyph_id, 700);
}
