//! Tag metadata carried from the inputs to the merged output.
//!
//! Only a small fixed set of text fields is copied. The first input (in merge
//! order) that has any of them supplies the whole set; tags from different
//! inputs are never combined.

use lofty::config::WriteOptions;
use lofty::file::TaggedFileExt;
use lofty::probe::Probe;
use lofty::tag::{ItemKey, Tag, TagExt, TagType};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TagField {
    Title,
    Artist,
    Album,
    AlbumArtist,
    Genre,
    Date,
    TrackNumber,
    Comment,
}

impl TagField {
    pub const ALL: [TagField; 8] = [
        TagField::Title,
        TagField::Artist,
        TagField::Album,
        TagField::AlbumArtist,
        TagField::Genre,
        TagField::Date,
        TagField::TrackNumber,
        TagField::Comment,
    ];

    fn item_key(self) -> ItemKey {
        match self {
            TagField::Title => ItemKey::TrackTitle,
            TagField::Artist => ItemKey::TrackArtist,
            TagField::Album => ItemKey::AlbumTitle,
            TagField::AlbumArtist => ItemKey::AlbumArtist,
            TagField::Genre => ItemKey::Genre,
            TagField::Date => ItemKey::RecordingDate,
            TagField::TrackNumber => ItemKey::TrackNumber,
            TagField::Comment => ItemKey::Comment,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagSet {
    fields: BTreeMap<TagField, String>,
}

impl TagSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field. Blank values are ignored.
    pub fn set(&mut self, field: TagField, value: &str) {
        let value = value.trim();
        if !value.is_empty() {
            self.fields.insert(field, value.to_string());
        }
    }

    pub fn get(&self, field: TagField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    pub fn title(&self) -> Option<&str> {
        self.get(TagField::Title)
    }

    pub fn album(&self) -> Option<&str> {
        self.get(TagField::Album)
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (TagField, &str)> {
        self.fields.iter().map(|(k, v)| (*k, v.as_str()))
    }

    fn from_tag(tag: &Tag) -> Self {
        let mut set = TagSet::new();
        for field in TagField::ALL {
            if let Some(value) = tag.get_string(&field.item_key()) {
                set.set(field, value);
            }
        }
        set
    }

    fn to_tag(&self, tag_type: TagType) -> Tag {
        let mut tag = Tag::new(tag_type);
        for (field, value) in self.iter() {
            tag.insert_text(field.item_key(), value.to_string());
        }
        tag
    }
}

/// Read the tag set of one file.
///
/// The file type is detected from the content, so the extension does not
/// have to match. Uses the primary tag, or else the first tag present.
///
/// # Arguments
///
/// * `path` - The audio file to read
///
/// # Returns
///
/// * `Ok(TagSet)`, empty if the file carries no copyable fields
/// * `Err` with lofty's message if the file cannot be parsed
///
/// # Example
///
/// ```ignore
/// use audio_merger::media::tags::read_tags;
/// use std::path::Path;
///
/// let tags = read_tags(Path::new("intro.mp3"))?;
/// if let Some(title) = tags.title() {
///     println!("{title}");
/// }
/// ```
pub fn read_tags(path: &Path) -> Result<TagSet, String> {
    let tagged_file = Probe::open(path)
        .map_err(|e| e.to_string())?
        .guess_file_type()
        .map_err(|e| e.to_string())?
        .read()
        .map_err(|e| e.to_string())?;

    let tag = tagged_file
        .primary_tag()
        .filter(|t| !TagSet::from_tag(t).is_empty())
        .or_else(|| {
            tagged_file
                .tags()
                .iter()
                .find(|t| !TagSet::from_tag(t).is_empty())
        });

    Ok(tag.map(TagSet::from_tag).unwrap_or_default())
}

/// Write the tag set to `path` as an ID3v2 tag.
pub fn write_tags(path: &Path, tags: &TagSet) -> Result<(), String> {
    tags.to_tag(TagType::Id3v2)
        .save_to_path(path, WriteOptions::default())
        .map_err(|e| e.to_string())
}

/// First non-empty tag set in order. Later sets are ignored entirely.
pub fn first_tagged<I>(candidates: I) -> Option<TagSet>
where
    I: IntoIterator<Item = TagSet>,
{
    candidates.into_iter().find(|t| !t.is_empty())
}
