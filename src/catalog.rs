//! File catalog: categories of subcategories of files, loaded from YAML
//!
//! ```yaml
//! categories:
//!   - id: sanitary
//!     name: Sanitary regime
//!     subcategories:
//!       - id: indicators
//!         name: Indicators
//!         files:
//!           - id: steam
//!             name: Steam
//!             url: images/indicators/steam.jpg
//! ```
//!
//! Relative file urls are resolved against the directory holding the catalog.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use serde::Deserialize;

use crate::viewer::{Document, DocumentKind};

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },
    #[error("cannot tell the type of file '{id}' ({url}); set `type: image` or `type: document`")]
    UnknownKind { id: String, url: String },
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileEntry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    kind: Option<DocumentKind>,
    pub url: String,
    #[serde(skip)]
    path: PathBuf,
}

impl FileEntry {
    pub fn kind(&self) -> DocumentKind {
        self.kind.unwrap_or(DocumentKind::Image)
    }

    /// Location on disk, resolved against the catalog directory
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn document(&self) -> Document {
        Document::new(self.path.clone(), self.name.clone(), self.kind())
    }

    /// Size on disk, `None` when the file cannot be reached
    pub fn size_bytes(&self) -> Option<u64> {
        fs::metadata(&self.path).ok().map(|m| m.len())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Subcategory {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub files: Vec<FileEntry>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub subcategories: Vec<Subcategory>,
}

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub categories: Vec<Category>,
}

impl Catalog {
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let root = path.parent().unwrap_or_else(|| Path::new("."));
        let catalog = Self::parse(&content, root).map_err(|e| match e {
            CatalogError::Parse { source, .. } => CatalogError::Parse {
                path: path.to_path_buf(),
                source,
            },
            other => other,
        })?;
        debug!(
            "Loaded catalog {path:?}: {} categories, {} files",
            catalog.categories.len(),
            catalog.file_count()
        );
        Ok(catalog)
    }

    /// Parse catalog YAML, resolving relative urls against `root`
    pub fn parse(content: &str, root: &Path) -> Result<Self, CatalogError> {
        let mut catalog: Catalog =
            serde_yaml::from_str(content).map_err(|source| CatalogError::Parse {
                path: PathBuf::new(),
                source,
            })?;

        for file in catalog
            .categories
            .iter_mut()
            .flat_map(|c| c.subcategories.iter_mut())
            .flat_map(|s| s.files.iter_mut())
        {
            if file.kind.is_none() {
                file.kind = Some(DocumentKind::from_extension(&file.url).ok_or_else(|| {
                    CatalogError::UnknownKind {
                        id: file.id.clone(),
                        url: file.url.clone(),
                    }
                })?);
            }
            let url = file.url.strip_prefix("./").unwrap_or(&file.url);
            file.path = root.join(url);
        }
        Ok(catalog)
    }

    pub fn file_count(&self) -> usize {
        self.categories
            .iter()
            .flat_map(|c| &c.subcategories)
            .map(|s| s.files.len())
            .sum()
    }

    /// Files visible under `selection`, in catalog order
    pub fn files(&self, selection: Selection) -> Vec<&FileEntry> {
        let Some(category) = selection.category.and_then(|i| self.categories.get(i)) else {
            return Vec::new();
        };
        match selection.subcategory {
            Some(sub) => category
                .subcategories
                .get(sub)
                .map(|s| s.files.iter().collect())
                .unwrap_or_default(),
            None => category
                .subcategories
                .iter()
                .flat_map(|s| &s.files)
                .collect(),
        }
    }

    /// Trail from home to the selection, e.g. `["Home", "Sanitary", "Indicators"]`
    pub fn breadcrumb(&self, selection: Selection) -> Vec<&str> {
        let mut trail = vec![HOME_LABEL];
        let Some(category) = selection.category.and_then(|i| self.categories.get(i)) else {
            return trail;
        };
        trail.push(&category.name);
        if let Some(sub) = selection.subcategory.and_then(|i| category.subcategories.get(i)) {
            trail.push(&sub.name);
        }
        trail
    }

    /// Selection shown at startup: the first category, if any
    pub fn initial_selection(&self) -> Selection {
        if self.categories.is_empty() {
            warn!("Catalog has no categories");
            Selection::HOME
        } else {
            Selection::category(0)
        }
    }
}

pub const HOME_LABEL: &str = "Home";

/// Current place in the catalog, by index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Selection {
    pub category: Option<usize>,
    pub subcategory: Option<usize>,
}

impl Selection {
    pub const HOME: Self = Self {
        category: None,
        subcategory: None,
    };

    pub fn category(category: usize) -> Self {
        Self {
            category: Some(category),
            subcategory: None,
        }
    }

    pub fn subcategory(category: usize, subcategory: usize) -> Self {
        Self {
            category: Some(category),
            subcategory: Some(subcategory),
        }
    }

    pub fn is_home(&self) -> bool {
        self.category.is_none()
    }
}

/// Human readable size with binary units: "0 Bytes", "1.5 KB", "2.25 MB"
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["Bytes", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 Bytes".to_string();
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    let rounded = (value * 100.0).round() / 100.0;
    // Trim trailing zeros: 1.50 -> 1.5, 2.00 -> 2
    let text = format!("{rounded:.2}");
    let text = text.trim_end_matches('0').trim_end_matches('.');
    format!("{text} {}", UNITS[unit])
}
