//! Embedded asset table
//!
//! An [`AssetSource`] over bytes compiled into the binary, typically built
//! from `include_bytes!` entries.

use super::static_files::AssetSource;
use crate::error::AssetError;
use hyper::body::Bytes;
use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct EmbeddedAssets {
    files: HashMap<&'static str, &'static [u8]>,
}

impl EmbeddedAssets {
    pub fn new(entries: &[(&'static str, &'static [u8])]) -> Self {
        Self {
            files: entries.iter().copied().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

impl AssetSource for EmbeddedAssets {
    fn get(&self, path: &str) -> Result<Bytes, AssetError> {
        self.files
            .get(path)
            .copied()
            .map(Bytes::from_static)
            .ok_or(AssetError::NotFound)
    }
}
