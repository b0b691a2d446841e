//! Font loading
//!
//! Text can only be edited once its font is loaded.

use crate::error::{ServiceError, ServiceResult};
use async_trait::async_trait;
use datamerge_scene::FontName;
use parking_lot::RwLock;
use std::collections::HashSet;

/// Makes fonts available for text edits
#[async_trait]
pub trait FontLoader: Send + Sync {
    async fn load(&self, font: &FontName) -> ServiceResult<()>;
}

/// Loader backed by a fixed set of known fonts
#[derive(Debug, Default)]
pub struct StaticFontLoader {
    available: RwLock<HashSet<FontName>>,
    /// Accept every font, known or not
    permissive: bool,
}

impl StaticFontLoader {
    /// Loader that knows no fonts
    pub fn new() -> Self {
        Self::default()
    }

    /// Loader that accepts any font
    pub fn permissive() -> Self {
        Self {
            permissive: true,
            ..Self::default()
        }
    }

    /// Make a font available
    pub fn with_font(self, font: FontName) -> Self {
        self.available.write().insert(font);
        self
    }

    pub fn is_available(&self, font: &FontName) -> bool {
        self.permissive || self.available.read().contains(font)
    }
}

#[async_trait]
impl FontLoader for StaticFontLoader {
    async fn load(&self, font: &FontName) -> ServiceResult<()> {
        if self.is_available(font) {
            log::trace!("Font ready: {}", font);
            Ok(())
        } else {
            Err(ServiceError::FontUnavailable(font.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_loader() {
        let loader = StaticFontLoader::new().with_font(FontName::new("Inter", "Bold"));
        assert!(loader.load(&FontName::new("Inter", "Bold")).await.is_ok());

        let err = loader.load(&FontName::new("Roboto", "Regular")).await.unwrap_err();
        assert_eq!(err.to_string(), "Font not available: Roboto Regular");
    }

    #[tokio::test]
    async fn test_permissive_loader() {
        let loader = StaticFontLoader::permissive();
        assert!(loader.load(&FontName::new("Anything", "Goes")).await.is_ok());
    }
}
