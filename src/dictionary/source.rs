use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;

use tracing::{debug, info};

use crate::dictionary::cache::{DiskCache, fetch_url};
use crate::error::LoadError;
use crate::scheme::Scheme;

/// A static resource the split drill is built from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    Chaifen(Scheme),
    AuxCodes(Scheme),
}

impl Resource {
    pub fn file_name(self) -> &'static str {
        match self {
            Resource::Chaifen(Scheme::Basic) => "puji_chaifen.dict.yaml",
            Resource::Chaifen(Scheme::Plus) => "plus_chaifen.dict.yaml",
            Resource::AuxCodes(Scheme::Basic) => "前1500字_普及版辅助码.txt",
            Resource::AuxCodes(Scheme::Plus) => "前1500字_plus辅助码.txt",
        }
    }
}

/// Where dictionary text comes from: a local directory first, then an
/// optional base URL whose downloads are kept in a disk cache.
#[derive(Clone, Debug)]
pub struct DictionarySource {
    dir: PathBuf,
    base_url: Option<String>,
    downloads: Option<DiskCache>,
}

impl DictionarySource {
    pub fn local(dir: PathBuf) -> Self {
        Self {
            dir,
            base_url: None,
            downloads: None,
        }
    }

    pub fn with_base_url(mut self, base_url: &str, downloads: Option<DiskCache>) -> Self {
        let trimmed = base_url.trim().trim_end_matches('/');
        if !trimmed.is_empty() {
            self.base_url = Some(trimmed.to_string());
            self.downloads = downloads;
        }
        self
    }

    pub fn read(&self, resource: Resource) -> Result<String, LoadError> {
        let name = resource.file_name();
        let path = self.dir.join(name);
        match fs::read_to_string(&path) {
            Ok(content) => {
                debug!(path = %path.display(), "read dictionary resource");
                return Ok(content);
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(source) => {
                return Err(LoadError::Read {
                    name: name.to_string(),
                    source,
                });
            }
        }

        if let Some(cached) = self.downloads.as_ref().and_then(|c| c.get(name)) {
            debug!(name, "dictionary resource served from download cache");
            return Ok(cached);
        }

        let Some(base_url) = &self.base_url else {
            return Err(LoadError::Missing {
                name: name.to_string(),
            });
        };

        let url = format!("{base_url}/{name}");
        info!(%url, "downloading dictionary resource");
        let content = fetch_url(&url)?;
        if let Some(cache) = &self.downloads {
            cache.put(name, &content);
        }
        Ok(content)
    }
}
