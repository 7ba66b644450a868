//! Errors and warnings.

use std::io;

use crate::{GlyphId, Tag};


/// A fatal table parsing error.
#[derive(Clone, PartialEq, Debug, thiserror::Error)]
pub enum ParseError {
    /// A read went past the end of the byte source.
    #[error("failed to read at offset {offset}: {kind:?}")]
    Io {
        /// Absolute offset of the failed read.
        offset: usize,
        /// The underlying error kind. `UnexpectedEof` for truncated data.
        kind: io::ErrorKind,
    },

    /// A known, but not implemented format variant.
    #[error("unsupported {context} format {value} at offset {offset}")]
    UnsupportedFormat {
        /// What was being parsed, like `coverage`.
        context: &'static str,
        /// The format value found in the font.
        value: u16,
        /// Absolute offset of the structure.
        offset: usize,
    },

    /// An internal consistency check has failed.
    #[error(transparent)]
    Structural(#[from] StructuralError),

    /// Not a TrueType, OpenType or TrueType Collection file.
    #[error("unknown font magic {0:#010X}")]
    UnknownMagic(u32),

    /// A font index is not present in a collection.
    #[error("font index {index} is out of bounds, collection has {count} fonts")]
    FaceIndexOutOfBounds {
        /// Requested index.
        index: u32,
        /// Number of fonts in the collection.
        count: u32,
    },

    /// None of the scripts in a table is recognized.
    #[error("unsupported languages: {scripts:?}")]
    UnsupportedLanguage {
        /// Script tags found in the table.
        scripts: Vec<Tag>,
    },
}


/// A structural inconsistency inside a well-formed looking table.
#[derive(Clone, Copy, PartialEq, Debug, thiserror::Error)]
pub enum StructuralError {
    /// Number of ligature sets doesn't match the coverage size.
    #[error("ligature substitution at offset {offset} has {expected} ligature sets, \
             but coverage has {found} glyphs")]
    LigSetCoverageMismatch {
        /// Absolute offset of the subtable.
        offset: usize,
        /// Ligature sets count.
        expected: u16,
        /// Coverage glyphs count.
        found: usize,
    },

    /// Number of substitute glyphs doesn't match the coverage size.
    #[error("single substitution at offset {offset} has {expected} substitutes, \
             but coverage has {found} glyphs")]
    SubstituteCoverageMismatch {
        /// Absolute offset of the subtable.
        offset: usize,
        /// Substitute glyphs count.
        expected: u16,
        /// Coverage glyphs count.
        found: usize,
    },

    /// Number of value records doesn't match the coverage size.
    #[error("single adjustment at offset {offset} has {expected} value records, \
             but coverage has {found} glyphs")]
    ValueCoverageMismatch {
        /// Absolute offset of the subtable.
        offset: usize,
        /// Value records count.
        expected: u16,
        /// Coverage glyphs count.
        found: usize,
    },

    /// Number of mark records doesn't match the mark coverage size.
    #[error("mark array at offset {offset} has {expected} marks, \
             but coverage has {found} glyphs")]
    MarkCoverageMismatch {
        /// Absolute offset of the mark array.
        offset: usize,
        /// Mark records count.
        expected: u16,
        /// Coverage glyphs count.
        found: usize,
    },

    /// Number of base records doesn't match the base coverage size.
    #[error("base array at offset {offset} has {expected} bases, \
             but coverage has {found} glyphs")]
    BaseCoverageMismatch {
        /// Absolute offset of the base array.
        offset: usize,
        /// Base records count.
        expected: u16,
        /// Coverage glyphs count.
        found: usize,
    },

    /// A ligature with zero components.
    #[error("ligature at offset {offset} has no components")]
    EmptyLigature {
        /// Absolute offset of the ligature table.
        offset: usize,
    },

    /// An extension lookup pointing to another extension lookup.
    #[error("nested extension subtable at offset {offset}")]
    NestedExtension {
        /// Absolute offset of the extension subtable.
        offset: usize,
    },
}


/// A glyph to text resolution error.
#[derive(Clone, Copy, PartialEq, Debug, thiserror::Error)]
pub enum ResolutionError {
    /// A glyph is neither in the character map nor a known composite,
    /// or a composite glyph refers to itself.
    #[error("glyph {0} cannot be mapped to text")]
    MissingGlyphMapping(GlyphId),
}


/// A tolerated problem. Parsing continued, but some data was ignored.
#[derive(Clone, Copy, PartialEq, Debug, thiserror::Error)]
pub enum Warning {
    /// A lookup type this crate doesn't interpret.
    #[error("{table} lookup type {lookup_type} at offset {offset} is not supported")]
    UnsupportedLookupType {
        /// `GSUB` or `GPOS`.
        table: Tag,
        /// The lookup type.
        lookup_type: u16,
        /// Absolute offset of the subtable.
        offset: usize,
    },

    /// A subtable format this crate doesn't interpret.
    #[error("{table} lookup type {lookup_type} format {format} at offset {offset} is not supported")]
    UnsupportedSubtableFormat {
        /// `GSUB` or `GPOS`.
        table: Tag,
        /// The lookup type.
        lookup_type: u16,
        /// The subtable format.
        format: u16,
        /// Absolute offset of the subtable.
        offset: usize,
    },

    /// An anchor table with a format other than 1.
    /// Its coordinates are still used.
    #[error("anchor format {format} at offset {offset} is not supported")]
    UnsupportedAnchorFormat {
        /// The anchor format.
        format: u16,
        /// Absolute offset of the anchor table.
        offset: usize,
    },

    /// A glyph was defined by more than one substitution. The last one wins.
    #[error("glyph {0} has multiple substitution entries")]
    DuplicateSubstitution(GlyphId),
}
