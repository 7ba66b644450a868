//! The structure shared by GSUB and GPOS tables:
//! a header followed by the Script, Feature and Lookup lists.
//!
//! <https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2>

use crate::{Language, Tag};
use crate::error::ParseError;
use crate::parser::{ByteCursor, Offset, Offset16, Offset32};


/// A lookup subtable interpreter.
///
/// [`LayoutTable::parse`] walks the table structure and calls
/// [`read_subtable`](SubtableReader::read_subtable) for every lookup subtable.
/// GSUB and GPOS provide their own implementations.
pub trait SubtableReader {
    /// Interprets a single lookup subtable.
    ///
    /// `offset` is the absolute offset of the subtable.
    /// Unsupported lookup types should be skipped and reported as warnings.
    /// An error aborts the current lookup, but not the whole walk.
    fn read_subtable<C: ByteCursor>(
        &mut self,
        s: &mut C,
        lookup_type: u16,
        offset: usize,
    ) -> Result<(), ParseError>;
}


/// A GSUB/GPOS table header.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct TableHeader {
    /// Major version in the high 16 bits, minor in the low ones.
    pub version: i32,
    /// Relative to the table start.
    pub script_list_offset: u16,
    /// Relative to the table start.
    pub feature_list_offset: u16,
    /// Relative to the table start.
    pub lookup_list_offset: u16,
    /// Version 1.1 only. Relative to the table start.
    pub feature_variations_offset: Option<u32>,
}

impl TableHeader {
    fn parse<C: ByteCursor>(s: &mut C, table_start: usize) -> Result<Self, ParseError> {
        s.seek(table_start);
        let version = s.read_i32()?;
        let major = (version >> 16) as u16;
        let minor = version as u16;
        if major != 1 {
            return Err(ParseError::UnsupportedFormat {
                context: "layout table version",
                value: major,
                offset: table_start,
            });
        }

        let script_list_offset = s.read_u16()?;
        let feature_list_offset = s.read_u16()?;
        let lookup_list_offset = s.read_u16()?;
        let feature_variations_offset = if minor >= 1 {
            Some(s.read::<Offset32>()?).filter(|o| !o.is_null()).map(|o| o.0)
        } else {
            None
        };

        Ok(TableHeader {
            version,
            script_list_offset,
            feature_list_offset,
            lookup_list_offset,
            feature_variations_offset,
        })
    }
}


/// A [Language System Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#language-system-table).
#[derive(Clone, PartialEq, Debug)]
pub struct LangSys {
    /// `None` for the default language system of a script.
    pub tag: Option<Tag>,
    /// An index into the feature list.
    pub required_feature_index: Option<u16>,
    /// Indices into the feature list.
    pub feature_indices: Vec<u16>,
}

impl LangSys {
    fn parse<C: ByteCursor>(s: &mut C, tag: Option<Tag>, offset: usize) -> Result<Self, ParseError> {
        s.seek(offset);
        s.skip(2); // lookupOrderOffset, reserved
        let required_feature_index = match s.read_u16()? {
            0xFFFF => None,
            n => Some(n),
        };
        let feature_indices = s.read_counted_array16()?;

        Ok(LangSys {
            tag,
            required_feature_index,
            feature_indices,
        })
    }
}


/// A [Script Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#script-table-and-language-system-record).
#[derive(Clone, PartialEq, Debug)]
pub struct Script {
    /// A script tag, like `latn`.
    pub tag: Tag,
    /// Absolute offset of the script table.
    pub offset: usize,
    /// Used when a language has no dedicated system.
    pub default_lang_sys: Option<LangSys>,
    /// Language-specific systems.
    pub lang_systems: Vec<LangSys>,
}

impl Script {
    fn parse<C: ByteCursor>(s: &mut C, tag: Tag, offset: usize) -> Result<Self, ParseError> {
        s.seek(offset);
        let default_offset: Offset16 = s.read()?;
        let count = s.read_u16()?;
        let mut records = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            let lang_tag = s.read_tag()?;
            let lang_offset: Offset16 = s.read()?;
            records.push((lang_tag, lang_offset));
        }

        let default_lang_sys = if default_offset.is_null() {
            None
        } else {
            Some(LangSys::parse(s, None, offset + default_offset.to_usize())?)
        };

        let mut lang_systems = Vec::with_capacity(records.len());
        for (lang_tag, lang_offset) in records {
            if lang_offset.is_null() {
                continue;
            }

            lang_systems.push(LangSys::parse(s, Some(lang_tag), offset + lang_offset.to_usize())?);
        }

        Ok(Script {
            tag,
            offset,
            default_lang_sys,
            lang_systems,
        })
    }
}


/// A [Feature Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#feature-table).
#[derive(Clone, PartialEq, Debug)]
pub struct Feature {
    /// A feature tag, like `liga`.
    pub tag: Tag,
    /// Absolute offset of the feature table.
    pub offset: usize,
    /// Relative to the feature table.
    pub feature_params_offset: Option<u16>,
    /// Indices into the lookup list.
    pub lookup_indices: Vec<u16>,
}

impl Feature {
    fn parse<C: ByteCursor>(s: &mut C, tag: Tag, offset: usize) -> Result<Self, ParseError> {
        s.seek(offset);
        let params: Offset16 = s.read()?;
        let lookup_indices = s.read_counted_array16()?;
        Ok(Feature {
            tag,
            offset,
            feature_params_offset: if params.is_null() { None } else { Some(params.0) },
            lookup_indices,
        })
    }
}


/// [Lookup flags](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#lookupFlags).
#[derive(Clone, Copy, PartialEq, Eq, Default, Debug)]
pub struct LookupFlags(pub u16);

#[allow(missing_docs)]
impl LookupFlags {
    #[inline] pub fn right_to_left(self) -> bool { self.0 & 0x0001 != 0 }
    #[inline] pub fn ignore_base_glyphs(self) -> bool { self.0 & 0x0002 != 0 }
    #[inline] pub fn ignore_ligatures(self) -> bool { self.0 & 0x0004 != 0 }
    #[inline] pub fn ignore_marks(self) -> bool { self.0 & 0x0008 != 0 }
    #[inline] pub fn use_mark_filtering_set(self) -> bool { self.0 & 0x0010 != 0 }
    #[inline] pub fn mark_attachment_type(self) -> u8 { (self.0 >> 8) as u8 }
}


/// A [Lookup Table](https://docs.microsoft.com/en-us/typography/opentype/spec/chapter2#lookup-table).
#[derive(Clone, PartialEq, Debug)]
pub struct Lookup {
    /// A table-specific lookup type.
    pub lookup_type: u16,
    /// Lookup qualifiers.
    pub lookup_flag: LookupFlags,
    /// Set only when `lookup_flag` requests it.
    pub mark_filtering_set: Option<u16>,
    /// Absolute offsets of the subtables. NULL offsets are excluded.
    pub subtable_offsets: Vec<usize>,
}

impl Lookup {
    fn parse<C: ByteCursor>(s: &mut C, offset: usize) -> Result<Self, ParseError> {
        s.seek(offset);
        let lookup_type = s.read_u16()?;
        let lookup_flag = LookupFlags(s.read_u16()?);
        let offsets = s.read_counted_array16::<Offset16>()?;
        let mark_filtering_set = if lookup_flag.use_mark_filtering_set() {
            Some(s.read_u16()?)
        } else {
            None
        };

        let subtable_offsets = offsets.iter()
            .filter(|o| !o.is_null())
            .map(|o| offset + o.to_usize())
            .collect();

        Ok(Lookup {
            lookup_type,
            lookup_flag,
            mark_filtering_set,
            subtable_offsets,
        })
    }
}


/// A parsed GSUB/GPOS table structure.
///
/// The lookup subtables themselves are interpreted by a [`SubtableReader`],
/// this type only stores the graph around them.
#[derive(Clone, PartialEq, Debug)]
pub struct LayoutTable {
    /// The table header.
    pub header: TableHeader,
    /// Scripts in the file order.
    pub scripts: Vec<Script>,
    /// Features in the file order, so `LangSys` indices can be used directly.
    pub features: Vec<Feature>,
    /// Lookups in the file order, so `Feature` indices can be used directly.
    pub lookups: Vec<Lookup>,
}

impl LayoutTable {
    /// Walks a table starting at an absolute `table_start` offset.
    ///
    /// Every lookup subtable is passed to `reader`.
    ///
    /// When a subtable fails, the rest of its lookup is skipped,
    /// but the following lookups are still processed.
    /// The first such error is returned after the walk,
    /// while `reader` keeps everything the successful lookups produced.
    pub fn parse<C, R>(s: &mut C, table_start: usize, reader: &mut R) -> Result<Self, ParseError>
        where C: ByteCursor, R: SubtableReader
    {
        let header = TableHeader::parse(s, table_start)?;
        let scripts = parse_scripts(s, table_start + usize::from(header.script_list_offset))?;
        let features = parse_features(s, table_start + usize::from(header.feature_list_offset))?;

        let lookup_list_start = table_start + usize::from(header.lookup_list_offset);
        s.seek(lookup_list_start);
        let lookup_offsets = s.read_counted_array16::<Offset16>()?;

        let mut lookups = Vec::with_capacity(lookup_offsets.len());
        let mut first_error = None;
        for (index, lookup_offset) in lookup_offsets.iter().enumerate() {
            let res = Lookup::parse(s, lookup_list_start + lookup_offset.to_usize())
                .and_then(|lookup| {
                    for offset in &lookup.subtable_offsets {
                        reader.read_subtable(s, lookup.lookup_type, *offset)?;
                    }

                    Ok(lookup)
                });

            match res {
                Ok(lookup) => lookups.push(lookup),
                Err(e) => {
                    warn!("lookup {} failed: {}", index, e);
                    first_error.get_or_insert(e);
                }
            }
        }

        if let Some(e) = first_error {
            return Err(e);
        }

        Ok(LayoutTable {
            header,
            scripts,
            features,
            lookups,
        })
    }

    /// Returns script tags in the file order.
    pub fn supported_languages(&self) -> impl Iterator<Item = Tag> + '_ {
        self.scripts.iter().map(|script| script.tag)
    }

    /// Returns the first recognized language among the table scripts.
    pub fn supported_language(&self) -> Result<Language, ParseError> {
        self.supported_languages()
            .find_map(Language::from_script_tag)
            .ok_or_else(|| ParseError::UnsupportedLanguage {
                scripts: self.supported_languages().collect(),
            })
    }

    /// Returns lookup indices of all features with the specified tag.
    pub fn feature_lookups(&self, tag: Tag) -> Vec<u16> {
        let mut indices: Vec<u16> = self.features.iter()
            .filter(|f| f.tag == tag)
            .flat_map(|f| f.lookup_indices.iter().copied())
            .collect();
        indices.sort_unstable();
        indices.dedup();
        indices
    }
}


fn parse_scripts<C: ByteCursor>(s: &mut C, list_start: usize) -> Result<Vec<Script>, ParseError> {
    s.seek(list_start);
    let records = parse_records(s)?;

    let mut scripts = Vec::with_capacity(records.len());
    for (tag, offset) in records {
        if offset.is_null() {
            continue;
        }

        scripts.push(Script::parse(s, tag, list_start + offset.to_usize())?);
    }

    Ok(scripts)
}

fn parse_features<C: ByteCursor>(s: &mut C, list_start: usize) -> Result<Vec<Feature>, ParseError> {
    s.seek(list_start);
    let records = parse_records(s)?;

    let mut features = Vec::with_capacity(records.len());
    for (tag, offset) in records {
        // Keep NULL features, since LangSys refers to them by index.
        if offset.is_null() {
            features.push(Feature {
                tag,
                offset: list_start,
                feature_params_offset: None,
                lookup_indices: Vec::new(),
            });
            continue;
        }

        features.push(Feature::parse(s, tag, list_start + offset.to_usize())?);
    }

    Ok(features)
}

// A u16 count followed by (tag, Offset16) pairs.
fn parse_records<C: ByteCursor>(s: &mut C) -> Result<Vec<(Tag, Offset16)>, ParseError> {
    let count = s.read_u16()?;
    let mut records = Vec::with_capacity(usize::from(count));
    for _ in 0..count {
        let tag = s.read_tag()?;
        let offset: Offset16 = s.read()?;
        records.push((tag, offset));
    }

    Ok(records)
}
