//! A [Glyph Substitution Table](https://docs.microsoft.com/en-us/typography/opentype/spec/gsub)
//! reader.
//!
//! Only single (1) and ligature (4) substitutions are interpreted,
//! directly or through an extension (7) lookup.
//! Together they describe which sequence of glyphs a composite glyph
//! was built from, which lets us map a composite glyph back to text.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::{GlyphId, Tag};
use crate::error::{ParseError, ResolutionError, StructuralError, Warning};
use crate::ggg::{read_coverage, read_extension};
use crate::layout::{LayoutTable, SubtableReader};
use crate::parser::{ByteCursor, Offset, Offset16};

/// The GSUB table tag.
pub const TAG: Tag = Tag::from_bytes(b"GSUB");

const SINGLE: u16 = 1;
const LIGATURE: u16 = 4;
const EXTENSION: u16 = 7;


/// A glyph resolved to the text it represents.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Glyph {
    /// Glyph ID.
    pub glyph_id: i32,
    /// Advance width. Zero when the widths array is too short.
    pub width: i32,
    /// Resolved text.
    pub text: String,
}


// How a single component of a composite glyph expands.
enum Expansion<'a> {
    Leaf(char),
    Composite(&'a [GlyphId]),
}


/// A GSUB [`SubtableReader`].
///
/// Accumulates a composite glyph → components map from all supported lookups.
#[derive(Clone, Default, Debug)]
pub struct Substitutions {
    raw: BTreeMap<GlyphId, Vec<GlyphId>>,
    warnings: Vec<Warning>,
}

impl Substitutions {
    /// Creates an empty substitutions map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the composite glyph → components map.
    ///
    /// Single substitutions have exactly one component.
    pub fn raw_map(&self) -> &BTreeMap<GlyphId, Vec<GlyphId>> {
        &self.raw
    }

    /// Returns all tolerated problems found so far.
    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Resolves every composite glyph into text.
    ///
    /// Components present in `chars` contribute their character,
    /// other components are expanded recursively.
    /// `widths` is indexed by glyph ID.
    ///
    /// The result is keyed by text. When several glyphs resolve to the same text,
    /// the one with the smallest ID is kept.
    pub fn resolve(
        &self,
        chars: &HashMap<GlyphId, char>,
        widths: &[i32],
    ) -> Result<HashMap<String, Glyph>, ResolutionError> {
        let mut glyphs = HashMap::with_capacity(self.raw.len());
        for &glyph_id in self.raw.keys() {
            let text = self.resolve_glyph(glyph_id, chars)?;
            glyphs.entry(text.clone()).or_insert_with(|| make_glyph(glyph_id, widths, text));
        }

        Ok(glyphs)
    }

    /// Like [`resolve`](Self::resolve), but skips glyphs that cannot be resolved
    /// and returns their errors instead of failing.
    pub fn resolve_lossy(
        &self,
        chars: &HashMap<GlyphId, char>,
        widths: &[i32],
    ) -> (HashMap<String, Glyph>, Vec<ResolutionError>) {
        let mut glyphs = HashMap::with_capacity(self.raw.len());
        let mut errors = Vec::new();
        for &glyph_id in self.raw.keys() {
            match self.resolve_glyph(glyph_id, chars) {
                Ok(text) => {
                    glyphs.entry(text.clone()).or_insert_with(|| make_glyph(glyph_id, widths, text));
                }
                Err(e) => errors.push(e),
            }
        }

        (glyphs, errors)
    }

    /// Resolves a single composite glyph into text.
    pub fn resolve_glyph(
        &self,
        glyph_id: GlyphId,
        chars: &HashMap<GlyphId, char>,
    ) -> Result<String, ResolutionError> {
        let root = self.raw.get(&glyph_id)
            .ok_or(ResolutionError::MissingGlyphMapping(glyph_id))?;

        let mut text = String::new();
        // Composite glyphs currently being expanded. Meeting one of them again is a cycle.
        let mut in_progress = HashSet::new();
        in_progress.insert(glyph_id);
        // (composite glyph, its components, the next component index)
        let mut stack: Vec<(GlyphId, &[GlyphId], usize)> = vec![(glyph_id, root.as_slice(), 0)];

        while let Some(frame) = stack.last_mut() {
            let component = match frame.1.get(frame.2) {
                Some(&component) => {
                    frame.2 += 1;
                    component
                }
                None => {
                    let owner = frame.0;
                    in_progress.remove(&owner);
                    stack.pop();
                    continue;
                }
            };

            match self.expand(component, chars) {
                Some(Expansion::Leaf(c)) => text.push(c),
                Some(Expansion::Composite(components)) => {
                    if !in_progress.insert(component) {
                        return Err(ResolutionError::MissingGlyphMapping(component));
                    }

                    stack.push((component, components, 0));
                }
                None => return Err(ResolutionError::MissingGlyphMapping(component)),
            }
        }

        Ok(text)
    }

    fn expand<'a>(&'a self, glyph_id: GlyphId, chars: &HashMap<GlyphId, char>) -> Option<Expansion<'a>> {
        if let Some(&c) = chars.get(&glyph_id) {
            return Some(Expansion::Leaf(c));
        }

        self.raw.get(&glyph_id).map(|components| Expansion::Composite(components.as_slice()))
    }

    fn warn(&mut self, warning: Warning) {
        warn!("{}", warning);
        self.warnings.push(warning);
    }

    fn insert(&mut self, glyph_id: GlyphId, components: Vec<GlyphId>) {
        if self.raw.insert(glyph_id, components).is_some() {
            self.warn(Warning::DuplicateSubstitution(glyph_id));
        }
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
            LIGATURE => self.read_ligature(s, offset),
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

    // https://docs.microsoft.com/en-us/typography/opentype/spec/gsub#lookuptype-1-single-substitution-subtable
    fn read_single<C: ByteCursor>(&mut self, s: &mut C, offset: usize) -> Result<(), ParseError> {
        s.seek(offset);
        let format = s.read_u16()?;
        match format {
            1 => {
                let coverage_offset: Offset16 = s.read()?;
                let delta = s.read_i16()?;
                let coverage = read_coverage(s, offset + coverage_offset.to_usize())?;
                for glyph in coverage {
                    // Addition is modulo 65536.
                    let substitute = GlyphId(glyph.0.wrapping_add(delta as u16));
                    self.insert(substitute, vec![glyph]);
                }
            }
            2 => {
                let coverage_offset: Offset16 = s.read()?;
                let substitutes = s.read_counted_array16::<GlyphId>()?;
                let coverage = read_coverage(s, offset + coverage_offset.to_usize())?;
                if coverage.len() != substitutes.len() {
                    return Err(StructuralError::SubstituteCoverageMismatch {
                        offset,
                        expected: substitutes.len() as u16,
                        found: coverage.len(),
                    }.into());
                }

                for (glyph, substitute) in coverage.into_iter().zip(substitutes) {
                    self.insert(substitute, vec![glyph]);
                }
            }
            _ => {
                return Err(ParseError::UnsupportedFormat {
                    context: "single substitution",
                    value: format,
                    offset,
                });
            }
        }

        Ok(())
    }

    // https://docs.microsoft.com/en-us/typography/opentype/spec/gsub#lookuptype-4-ligature-substitution-subtable
    fn read_ligature<C: ByteCursor>(&mut self, s: &mut C, offset: usize) -> Result<(), ParseError> {
        s.seek(offset);
        let format = s.read_u16()?;
        if format != 1 {
            return Err(ParseError::UnsupportedFormat {
                context: "ligature substitution",
                value: format,
                offset,
            });
        }

        let coverage_offset: Offset16 = s.read()?;
        let set_offsets = s.read_counted_array16::<Offset16>()?;
        let coverage = read_coverage(s, offset + coverage_offset.to_usize())?;
        if coverage.len() != set_offsets.len() {
            return Err(StructuralError::LigSetCoverageMismatch {
                offset,
                expected: set_offsets.len() as u16,
                found: coverage.len(),
            }.into());
        }

        for (first, set_offset) in coverage.into_iter().zip(set_offsets) {
            let set_start = offset + set_offset.to_usize();
            s.seek(set_start);
            let ligature_offsets = s.read_counted_array16::<Offset16>()?;
            for ligature_offset in ligature_offsets {
                let ligature_start = set_start + ligature_offset.to_usize();
                s.seek(ligature_start);
                let ligature: GlyphId = s.read()?;
                let count = s.read_u16()?;
                if count == 0 {
                    return Err(StructuralError::EmptyLigature { offset: ligature_start }.into());
                }

                // The first component is the coverage glyph.
                let mut components = Vec::with_capacity(usize::from(count));
                components.push(first);
                components.extend(s.read_array16::<GlyphId>(count - 1)?);
                self.insert(ligature, components);
            }
        }

        Ok(())
    }
}

impl SubtableReader for Substitutions {
    fn read_subtable<C: ByteCursor>(
        &mut self,
        s: &mut C,
        lookup_type: u16,
        offset: usize,
    ) -> Result<(), ParseError> {
        self.dispatch(s, lookup_type, offset, false)
    }
}


fn make_glyph(glyph_id: GlyphId, widths: &[i32], text: String) -> Glyph {
    Glyph {
        glyph_id: i32::from(glyph_id.0),
        width: widths.get(usize::from(glyph_id.0)).copied().unwrap_or(0),
        text,
    }
}


/// A parsed GSUB table.
#[derive(Clone, Debug)]
pub struct Table {
    /// Scripts, features and lookups.
    pub layout: LayoutTable,
    /// Substitutions from all supported lookups.
    pub substitutions: Substitutions,
}

impl Table {
    /// Parses a GSUB table at an absolute `offset`.
    ///
    /// Use [`LayoutTable::parse`] with your own [`Substitutions`]
    /// to keep partial results on error.
    pub fn parse<C: ByteCursor>(s: &mut C, offset: usize) -> Result<Self, ParseError> {
        let mut substitutions = Substitutions::new();
        let layout = LayoutTable::parse(s, offset, &mut substitutions)?;
        Ok(Table { layout, substitutions })
    }
}
