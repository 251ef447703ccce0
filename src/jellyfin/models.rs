use serde::Deserialize;
use std::fmt;

/// Kind of a top-level library
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LibraryKind {
    Movie,
    Series,
    Other,
}

impl LibraryKind {
    /// `CollectionType` wins when present ("movies", "tvshows"); otherwise the
    /// item `Type` is used ("Movie", "Series").
    fn from_raw(collection_type: Option<&str>, item_type: Option<&str>) -> Self {
        match collection_type.map(str::to_ascii_lowercase).as_deref() {
            Some("movies") => return Self::Movie,
            Some("tvshows") => return Self::Series,
            _ => {}
        }

        match item_type {
            Some("Movie") => Self::Movie,
            Some("Series") => Self::Series,
            _ => Self::Other,
        }
    }
}

impl fmt::Display for LibraryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Movie => write!(f, "movie"),
            Self::Series => write!(f, "series"),
            Self::Other => write!(f, "other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Library {
    pub id: String,
    pub kind: LibraryKind,
    pub name: String,
}

impl Library {
    pub fn new(id: impl Into<String>, kind: LibraryKind) -> Self {
        Self {
            id: id.into(),
            kind,
            name: String::new(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawLibrary {
    id: String,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    collection_type: Option<String>,
    #[serde(default, rename = "Type")]
    item_type: Option<String>,
}

impl From<RawLibrary> for Library {
    fn from(raw: RawLibrary) -> Self {
        Self {
            kind: LibraryKind::from_raw(raw.collection_type.as_deref(), raw.item_type.as_deref()),
            id: raw.id,
            name: raw.name.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum ItemKind {
    Episode,
    Movie,
    #[serde(other)]
    Other,
}

/// Playable entry as reported by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Item {
    pub id: String,

    /// Relative to the media root, or absolute
    #[serde(default)]
    pub path: String,

    #[serde(rename = "Type")]
    pub kind: ItemKind,

    /// Season number, only meaningful for episodes
    #[serde(default)]
    pub parent_index_number: Option<u32>,
}

impl Item {
    pub fn episode(id: impl Into<String>, path: impl Into<String>, season: u32) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            kind: ItemKind::Episode,
            parent_index_number: Some(season),
        }
    }

    pub fn movie(id: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            path: path.into(),
            kind: ItemKind::Movie,
            parent_index_number: None,
        }
    }

    /// Season this item contributes to the watched-season set
    pub fn watched_season(&self) -> Option<u32> {
        match self.kind {
            ItemKind::Episode => self.parent_index_number,
            ItemKind::Movie | ItemKind::Other => None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct RawSeason {
    #[serde(default)]
    index_number: Option<u32>,
}

impl RawSeason {
    pub(crate) const fn number(&self) -> Option<u32> {
        self.index_number
    }
}

/// Jellyfin wraps query results in `{"Items": [...]}`; some endpoints (and
/// proxies) return the bare array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ItemsResponse<T> {
    Wrapped {
        #[serde(rename = "Items")]
        items: Vec<T>,
    },
    Bare(Vec<T>),
}

impl<T> ItemsResponse<T> {
    pub(crate) fn into_items(self) -> Vec<T> {
        match self {
            Self::Wrapped { items } | Self::Bare(items) => items,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SystemInfo {
    #[serde(default)]
    pub server_name: String,
    #[serde(default)]
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_episode() {
        let json = r#"{
            "Id": "ep1",
            "Path": "showA/s01e01.mkv",
            "Type": "Episode",
            "ParentIndexNumber": 1,
            "Name": "Pilot"
        }"#;

        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item, Item::episode("ep1", "showA/s01e01.mkv", 1));
        assert_eq!(item.watched_season(), Some(1));
    }

    #[test]
    fn test_deserialize_movie_without_season() {
        let json = r#"{"Id": "m1", "Path": "/media/Heat/Heat.mkv", "Type": "Movie"}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, ItemKind::Movie);
        assert_eq!(item.parent_index_number, None);
        assert_eq!(item.watched_season(), None);
    }

    #[test]
    fn test_unknown_item_type_is_other() {
        let json = r#"{"Id": "x", "Path": "a/b.mp3", "Type": "Audio", "ParentIndexNumber": 3}"#;
        let item: Item = serde_json::from_str(json).unwrap();
        assert_eq!(item.kind, ItemKind::Other);
        // Only episodes count towards seasons
        assert_eq!(item.watched_season(), None);
    }

    #[test]
    fn test_items_response_wrapped_and_bare() {
        let wrapped = r#"{"Items": [{"Id": "a", "Type": "Movie"}], "TotalRecordCount": 1}"#;
        let bare = r#"[{"Id": "a", "Type": "Movie"}, {"Id": "b", "Type": "Movie"}]"#;

        let wrapped: ItemsResponse<Item> = serde_json::from_str(wrapped).unwrap();
        let bare: ItemsResponse<Item> = serde_json::from_str(bare).unwrap();

        assert_eq!(wrapped.into_items().len(), 1);
        assert_eq!(bare.into_items().len(), 2);
    }

    #[test]
    fn test_library_kind_from_collection_type() {
        let json = r#"[
            {"Id": "l1", "Name": "Movies", "CollectionType": "movies", "Type": "CollectionFolder"},
            {"Id": "l2", "Name": "Shows", "CollectionType": "tvshows", "Type": "CollectionFolder"},
            {"Id": "l3", "Name": "Music", "CollectionType": "music", "Type": "CollectionFolder"}
        ]"#;

        let raw: Vec<RawLibrary> = serde_json::from_str(json).unwrap();
        let libraries: Vec<Library> = raw.into_iter().map(Library::from).collect();

        assert_eq!(libraries[0].kind, LibraryKind::Movie);
        assert_eq!(libraries[0].name, "Movies");
        assert_eq!(libraries[1].kind, LibraryKind::Series);
        assert_eq!(libraries[2].kind, LibraryKind::Other);
    }

    #[test]
    fn test_library_kind_from_item_type() {
        let json = r#"[{"Id": "l1", "Type": "Movie"}, {"Id": "l2", "Type": "Series"}]"#;
        let raw: Vec<RawLibrary> = serde_json::from_str(json).unwrap();
        let libraries: Vec<Library> = raw.into_iter().map(Library::from).collect();

        assert_eq!(libraries[0].kind, LibraryKind::Movie);
        assert_eq!(libraries[1].kind, LibraryKind::Series);
        assert_eq!(libraries[1].name, "");
    }

    #[test]
    fn test_season_without_index_number() {
        let json = r#"[{"IndexNumber": 1}, {"Name": "Specials"}, {"IndexNumber": 2}]"#;
        let seasons: Vec<RawSeason> = serde_json::from_str(json).unwrap();
        let numbers: Vec<u32> = seasons.iter().filter_map(RawSeason::number).collect();
        assert_eq!(numbers, vec![1, 2]);
    }
}
