//! Property updater registry
//!
//! Maps a record's property name to its updater and runs it against one
//! element. Every run yields an [`UpdateResult`]; only unknown property names
//! and the fallible external steps (image fetch, font load, component swap)
//! produce failures. Everything else that does not fit is skipped quietly.
//!
//! The host is shared between concurrently running updates, so it is only
//! locked for the synchronous parts of an update and never across an await.

use crate::edit::{self, Edit};
use datamerge_ir::{FailureReason, Property, PropertyKey, PropertyUpdate, UpdateResult};
use datamerge_scene::{FontName, NodeId, SceneHost};
use datamerge_services::{validate_image, FontLoader, ImageSource};
use parking_lot::Mutex;
use std::sync::Arc;
use url::Url;

/// Runs property updates
#[derive(Clone)]
pub struct UpdaterRegistry {
    images: Arc<dyn ImageSource>,
    fonts: Arc<dyn FontLoader>,
}

impl UpdaterRegistry {
    pub fn new(images: Arc<dyn ImageSource>, fonts: Arc<dyn FontLoader>) -> Self {
        Self { images, fonts }
    }

    /// Whether an updater exists for `name`
    pub fn contains(&self, name: &str) -> bool {
        Property::from_name(name).is_some()
    }

    /// Run one update against the shared host
    pub async fn apply<H: SceneHost + ?Sized>(&self, host: &Mutex<&mut H>, update: &PropertyUpdate) -> UpdateResult {
        let property = match &update.property {
            PropertyKey::Known(property) => *property,
            PropertyKey::Unregistered(name) => return Err(FailureReason::UnknownProperty(name.clone())),
        };

        let Some(edit) = Edit::decode(property, &update.value) else {
            log::debug!(
                "Skipping {}.{}: {} value does not fit",
                update.element_name,
                property,
                update.value.type_name()
            );
            return Ok(());
        };

        let deferred = {
            let mut host = host.lock();
            let node = host.node_mut(update.target).ok_or(FailureReason::ElementGone)?;
            if !edit.is_supported_by(&node.capabilities()) {
                log::debug!("Skipping {}.{}: not supported by {:?}", update.element_name, property, node.kind);
                return Ok(());
            }
            edit::apply_local(node, edit)
        };

        match deferred {
            None => Ok(()),
            Some(Edit::Text(characters)) => self.update_text(host, update.target, characters).await,
            Some(Edit::FillImage(url)) => self.update_fill_image(host, update.target, &url).await,
            Some(Edit::Instance(name)) => swap_instance(host, update.target, &name),
            Some(other) => {
                log::error!("Edit {:?} was not applied", other);
                Ok(())
            }
        }
    }

    async fn update_text<H: SceneHost + ?Sized>(
        &self,
        host: &Mutex<&mut H>,
        target: NodeId,
        characters: String,
    ) -> UpdateResult {
        let font: FontName = {
            let host = host.lock();
            let node = host.node(target).ok_or(FailureReason::ElementGone)?;
            node.text.as_ref().map(|t| t.font.clone()).unwrap_or_default()
        };

        self.fonts
            .load(&font)
            .await
            .map_err(|e| FailureReason::FontLoad(e.to_string()))?;

        let mut host = host.lock();
        let node = host.node_mut(target).ok_or(FailureReason::ElementGone)?;
        edit::set_text(node, characters);
        Ok(())
    }

    async fn update_fill_image<H: SceneHost + ?Sized>(
        &self,
        host: &Mutex<&mut H>,
        target: NodeId,
        url: &Url,
    ) -> UpdateResult {
        let bytes = self
            .images
            .fetch(url)
            .await
            .map_err(|e| FailureReason::ImageFetch(e.to_string()))?;
        let format = validate_image(&bytes).map_err(|e| FailureReason::InvalidImage(e.to_string()))?;
        log::debug!("Fetched {:?} image ({} bytes) from {}", format, bytes.len(), url);

        let mut host = host.lock();
        if host.node(target).is_none() {
            return Err(FailureReason::ElementGone);
        }
        let hash = host.create_image(bytes);
        let node = host.node_mut(target).ok_or(FailureReason::ElementGone)?;
        edit::set_fill_image(node, hash);
        Ok(())
    }
}

impl std::fmt::Debug for UpdaterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UpdaterRegistry").finish_non_exhaustive()
    }
}

/// Point an instance at the top-level component called `name`
///
/// An unknown component name leaves the instance as it is.
fn swap_instance<H: SceneHost + ?Sized>(host: &Mutex<&mut H>, target: NodeId, name: &str) -> UpdateResult {
    let mut host = host.lock();
    let Some(component) = host.find_component_by_name(name) else {
        log::debug!("No component named {:?}, instance {} left unchanged", name, target);
        return Ok(());
    };
    if host.node(target).and_then(|n| n.main_component) == Some(component) {
        return Ok(());
    }
    host.swap_component(target, component)
        .map_err(|e| FailureReason::Host(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use datamerge_ir::Value;
    use datamerge_scene::{Document, Node, NodeKind, Paint};
    use datamerge_services::{MemoryImageSource, StaticFontLoader, PIXEL_PNG};

    fn registry(fonts: StaticFontLoader) -> UpdaterRegistry {
        let images = MemoryImageSource::new()
            .with_image("https://img.test/ok.png", PIXEL_PNG.to_vec())
            .with_image("https://img.test/page.html", b"<html></html>".to_vec());
        UpdaterRegistry::new(Arc::new(images), Arc::new(fonts))
    }

    async fn run(registry: &UpdaterRegistry, doc: &mut Document, target: NodeId, property: &str, value: Value) -> UpdateResult {
        let update = PropertyUpdate::new(target, "El", property, value);
        let shared = Mutex::new(doc);
        registry.apply(&shared, &update).await
    }

    #[tokio::test]
    async fn test_unknown_property_fails() {
        let reg = registry(StaticFontLoader::permissive());
        let mut doc = Document::new();
        let rect = doc.insert(doc.root(), Node::new(NodeKind::Rectangle, "El")).unwrap();

        let result = run(&reg, &mut doc, rect, "bogus", Value::Int(1)).await;
        assert_eq!(result, Err(FailureReason::UnknownProperty("bogus".to_string())));
        assert!(reg.contains("fill"));
        assert!(!reg.contains("bogus"));
    }

    #[tokio::test]
    async fn test_bad_values_and_capabilities_are_silent() {
        let reg = registry(StaticFontLoader::permissive());
        let mut doc = Document::new();
        let group = doc.insert(doc.root(), Node::new(NodeKind::Group, "El")).unwrap();

        assert_eq!(run(&reg, &mut doc, group, "x", Value::from("left")).await, Ok(()));
        assert_eq!(run(&reg, &mut doc, group, "fill", Value::from("#ff0000")).await, Ok(()));
        assert!(doc.node(group).unwrap().fills.is_empty());
        assert_eq!(run(&reg, &mut doc, group, "text", Value::from("hi")).await, Ok(()));
    }

    #[tokio::test]
    async fn test_text_waits_for_font() {
        let mut doc = Document::new();
        let text = doc.insert(doc.root(), Node::new(NodeKind::Text, "El")).unwrap();

        let missing = registry(StaticFontLoader::new());
        let result = run(&missing, &mut doc, text, "text", Value::from("Hello")).await;
        assert!(matches!(result, Err(FailureReason::FontLoad(_))));
        assert_eq!(doc.node(text).unwrap().text.as_ref().unwrap().characters, "");

        let loaded = registry(StaticFontLoader::new().with_font(FontName::default()));
        run(&loaded, &mut doc, text, "text", Value::Float(2.5)).await.unwrap();
        assert_eq!(doc.node(text).unwrap().text.as_ref().unwrap().characters, "2.5");
    }

    #[tokio::test]
    async fn test_image_fill() {
        let reg = registry(StaticFontLoader::permissive());
        let mut doc = Document::new();
        let rect = doc
            .insert(
                doc.root(),
                Node::new(NodeKind::Rectangle, "El").with_fills(vec![Paint::solid(datamerge_scene::Rgb::BLACK)]),
            )
            .unwrap();

        run(&reg, &mut doc, rect, "fill", Value::from("https://img.test/ok.png")).await.unwrap();
        let fills = &doc.node(rect).unwrap().fills;
        assert_eq!(fills.len(), 1);
        let Paint::Image(image) = &fills[0] else {
            panic!("expected an image fill");
        };
        assert_eq!(doc.image(&image.image_hash), Some(PIXEL_PNG));

        let missing = run(&reg, &mut doc, rect, "fill", Value::from("https://img.test/nope.png")).await;
        assert!(matches!(missing, Err(FailureReason::ImageFetch(_))));

        let not_image = run(&reg, &mut doc, rect, "fill", Value::from("https://img.test/page.html")).await;
        assert!(matches!(not_image, Err(FailureReason::InvalidImage(_))));
    }

    #[tokio::test]
    async fn test_instance_swap() {
        let reg = registry(StaticFontLoader::permissive());
        let mut doc = Document::new();
        let primary = doc.insert(doc.root(), Node::new(NodeKind::Component, "Primary")).unwrap();
        let secondary = doc.insert(doc.root(), Node::new(NodeKind::Component, "Secondary")).unwrap();
        let instance = doc
            .insert(doc.root(), Node::new(NodeKind::Instance, "El").with_main_component(primary))
            .unwrap();
        let frame = doc.insert(doc.root(), Node::new(NodeKind::Frame, "El")).unwrap();

        run(&reg, &mut doc, instance, "instance", Value::from("Secondary")).await.unwrap();
        assert_eq!(doc.node(instance).unwrap().main_component, Some(secondary));

        run(&reg, &mut doc, instance, "instance", Value::from("Missing")).await.unwrap();
        assert_eq!(doc.node(instance).unwrap().main_component, Some(secondary));

        run(&reg, &mut doc, frame, "instance", Value::from("Primary")).await.unwrap();
        assert_eq!(doc.node(frame).unwrap().main_component, None);
    }

    #[tokio::test]
    async fn test_gone_element_fails() {
        let reg = registry(StaticFontLoader::permissive());
        let mut doc = Document::new();
        let result = run(&reg, &mut doc, NodeId::from_raw(404), "x", Value::Int(1)).await;
        assert_eq!(result, Err(FailureReason::ElementGone));
    }
}
