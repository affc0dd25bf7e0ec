use std::{cmp::Ordering, path::Path};

use anyhow::Context as _;

use crate::foundation::error::{PhotocardError, PhotocardResult};

const BUILTIN_CATALOG: &str = include_str!("../../data/triples_catalog.json");

/// Name shown when no clip is selected.
pub const DEFAULT_SELECTION_NAME: &str = "Cosmo";

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CollectionData {
    pub name: String,
    pub files: Vec<String>,
}

/// On-disk catalog shape.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CatalogData {
    /// Locator prefix, e.g. `videos/tripleS`.
    pub root: String,
    /// Member keys in display priority order.
    #[serde(default)]
    pub member_order: Vec<String>,
    pub collections: Vec<CollectionData>,
}

/// One selectable clip.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct ClipEntry {
    pub display_name: String,
    pub file_name: String,
    pub locator: String,
}

#[derive(Clone, Debug)]
pub struct Catalog {
    data: CatalogData,
}

impl Catalog {
    pub fn new(data: CatalogData) -> PhotocardResult<Self> {
        let mut seen = std::collections::HashSet::new();
        for c in &data.collections {
            if c.name.is_empty() {
                return Err(PhotocardError::validation("collection name must be non-empty"));
            }
            if !seen.insert(c.name.as_str()) {
                return Err(PhotocardError::validation(format!(
                    "duplicate collection '{}'",
                    c.name
                )));
            }
        }
        Ok(Self { data })
    }

    /// The bundled tripleS catalog.
    pub fn builtin() -> PhotocardResult<Self> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_json(text: &str) -> PhotocardResult<Self> {
        let data: CatalogData = serde_json::from_str(text)
            .map_err(|e| PhotocardError::serde(format!("catalog json: {e}")))?;
        Self::new(data)
    }

    pub fn load(path: &Path) -> PhotocardResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read catalog '{}'", path.display()))?;
        Self::from_json(&text)
    }

    pub fn data(&self) -> &CatalogData {
        &self.data
    }

    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.data.collections.iter().map(|c| c.name.as_str())
    }

    pub fn has_collection(&self, name: &str) -> bool {
        self.collection(name).is_some()
    }

    fn collection(&self, name: &str) -> Option<&CollectionData> {
        self.data.collections.iter().find(|c| c.name == name)
    }

    /// Clips of a collection, member-priority first, then alphabetical.
    pub fn clips(&self, collection: &str) -> Option<Vec<ClipEntry>> {
        let c = self.collection(collection)?;
        let mut ranked: Vec<(Option<usize>, ClipEntry)> = c
            .files
            .iter()
            .map(|f| {
                let rank = member_key(f)
                    .and_then(|k| self.data.member_order.iter().position(|m| m == k));
                let entry = ClipEntry {
                    display_name: display_name(f),
                    file_name: f.clone(),
                    locator: locator(&self.data.root, collection, f),
                };
                (rank, entry)
            })
            .collect();
        ranked.sort_by(|(ra, a), (rb, b)| match (ra, rb) {
            (Some(x), Some(y)) => x.cmp(y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => compare_names(&a.display_name, &b.display_name),
        });
        Some(ranked.into_iter().map(|(_, e)| e).collect())
    }

    /// Look a clip up by its display name within a collection.
    pub fn find_clip(&self, collection: &str, display_name: &str) -> Option<ClipEntry> {
        self.clips(collection)?
            .into_iter()
            .find(|e| e.display_name == display_name)
    }
}

/// Member key of a clip file: the second `-` separated segment.
pub fn member_key(file_name: &str) -> Option<&str> {
    file_name.split('-').nth(1).filter(|s| !s.is_empty())
}

/// Member key with its first letter capitalised, or the whole file name when there is none.
pub fn display_name(file_name: &str) -> String {
    let Some(key) = member_key(file_name) else {
        return file_name.to_string();
    };
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => file_name.to_string(),
    }
}

pub fn locator(root: &str, collection: &str, file_name: &str) -> String {
    format!("{}/{collection}/{file_name}", root.trim_end_matches('/'))
}

fn compare_names(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
#[path = "../../tests/unit/catalog/model.rs"]
mod tests;
