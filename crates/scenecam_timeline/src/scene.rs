// SPDX-License-Identifier: MIT OR Apache-2.0
//! Scene graph data consumed by the timeline compiler.
//!
//! The catalog is owned by whatever composes the scenes; this crate only reads
//! it. Nodes whose source cannot be resolved are skipped by every consumer.

use crate::error::CatalogError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Natural size used when a source does not report one
pub const DEFAULT_SOURCE_SIZE: f32 = 100.0;

/// Identifier of a source in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SourceId(pub String);

impl SourceId {
    /// Create a source ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw identifier
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SourceId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for SourceId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Identifier of a scene in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SceneId(pub String);

impl SceneId {
    /// Create a scene ID
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for SceneId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for SceneId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Kind of content a source produces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SourceKind {
    /// Webcam or capture card (DirectShow style device)
    VideoCaptureDevice,
    /// Webcam or capture card (AVFoundation style device)
    AvCaptureDevice,
    /// Game or other live application capture
    LiveCapture,
    /// Window capture
    WindowCapture,
    /// Full display capture
    DisplayCapture,
    /// Still image
    Image,
    /// Media file playback
    Media,
    /// Embedded browser
    Browser,
    /// Text overlay
    Text,
    /// Solid color
    Color,
    /// Anything this crate does not know about
    Unknown,
}

impl SourceKind {
    /// Canonical tag used when serializing
    pub fn tag(&self) -> &'static str {
        match self {
            Self::VideoCaptureDevice => "video_capture_device",
            Self::AvCaptureDevice => "av_capture_device",
            Self::LiveCapture => "live_capture",
            Self::WindowCapture => "window_capture",
            Self::DisplayCapture => "display_capture",
            Self::Image => "image",
            Self::Media => "media",
            Self::Browser => "browser",
            Self::Text => "text",
            Self::Color => "color",
            Self::Unknown => "unknown",
        }
    }

    /// Parse a tag, accepting capture-software native ids as aliases.
    ///
    /// Hyphens and underscores are interchangeable.
    pub fn from_tag(tag: &str) -> Self {
        match tag.replace('-', "_").as_str() {
            "video_capture_device" | "dshow_input" => Self::VideoCaptureDevice,
            "av_capture_device" | "macos_avcapture" => Self::AvCaptureDevice,
            "live_capture" | "game_capture" => Self::LiveCapture,
            "window_capture" => Self::WindowCapture,
            "display_capture" | "monitor_capture" => Self::DisplayCapture,
            "image" | "image_source" => Self::Image,
            "media" | "ffmpeg_source" => Self::Media,
            "browser" | "browser_source" => Self::Browser,
            "text" | "text_gdiplus" | "text_ft2_source" => Self::Text,
            "color" | "color_source" => Self::Color,
            _ => Self::Unknown,
        }
    }

    /// Capture devices are focus targets unless overridden
    pub fn is_default_focus_target(&self) -> bool {
        matches!(self, Self::VideoCaptureDevice | Self::AvCaptureDevice)
    }

    /// Live capture content marks a scene as high-motion
    pub fn is_live_capture(&self) -> bool {
        matches!(self, Self::LiveCapture)
    }
}

impl From<String> for SourceKind {
    fn from(tag: String) -> Self {
        Self::from_tag(&tag)
    }
}

impl From<SourceKind> for String {
    fn from(kind: SourceKind) -> Self {
        kind.tag().to_string()
    }
}

/// Natural pixel size of a source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SourceSize {
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

/// A visual element that scene nodes place on the canvas
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Source {
    /// Catalog identifier
    pub id: SourceId,
    /// Content kind
    #[serde(rename = "type")]
    pub kind: SourceKind,
    /// Display name
    #[serde(default)]
    pub name: String,
    /// Natural size, if known
    #[serde(default)]
    pub size: Option<SourceSize>,
}

impl Source {
    /// Create a source without a known size
    pub fn new(id: impl Into<SourceId>, kind: SourceKind, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            kind,
            name: name.into(),
            size: None,
        }
    }

    /// Set the natural size
    pub fn with_size(mut self, size: SourceSize) -> Self {
        self.size = Some(size);
        self
    }

    /// Natural size with zero or missing dimensions replaced by the default
    pub fn natural_size(&self) -> (f32, f32) {
        let size = self.size.unwrap_or(SourceSize {
            width: DEFAULT_SOURCE_SIZE,
            height: DEFAULT_SOURCE_SIZE,
        });
        (
            non_zero_or_default(size.width),
            non_zero_or_default(size.height),
        )
    }
}

fn non_zero_or_default(value: f32) -> f32 {
    if value == 0.0 || !value.is_finite() {
        DEFAULT_SOURCE_SIZE
    } else {
        value
    }
}

/// 2D vector in layout units
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    /// X (right)
    pub x: f32,
    /// Y (down)
    pub y: f32,
}

impl Vec2 {
    /// Create a new vector
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Crop insets in the source's own pixels, removed before scaling
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CropInsets {
    /// Inset from the top edge
    pub top: f32,
    /// Inset from the left edge
    pub left: f32,
    /// Inset from the right edge
    pub right: f32,
    /// Inset from the bottom edge
    pub bottom: f32,
}

/// Placement of a node on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeTransform {
    /// Top-left corner before cropping
    pub position: Vec2,
    /// Per-axis scale
    pub scale: Vec2,
    /// Crop insets
    pub crop: CropInsets,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Vec2::default(),
            scale: Vec2::new(1.0, 1.0),
            crop: CropInsets::default(),
        }
    }
}

/// Output channel a node is composed for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplayChannel {
    /// Landscape output
    #[default]
    Horizontal,
    /// Portrait output
    Vertical,
}

/// Structural role of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    /// Ordinary node showing a source
    #[default]
    Item,
    /// Grouping node, excluded from geometry
    #[serde(alias = "folder")]
    Group,
}

/// A source placed in a scene
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SceneNode {
    /// Source shown by this node
    pub source_id: SourceId,
    /// Layout transform
    #[serde(default)]
    pub transform: NodeTransform,
    /// Whether the node is shown
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Output channel
    #[serde(default)]
    pub display: DisplayChannel,
    /// Structural role
    #[serde(default, rename = "type")]
    pub kind: NodeKind,
}

fn default_visible() -> bool {
    true
}

impl SceneNode {
    /// Create a visible item node for the horizontal channel
    pub fn new(source_id: impl Into<SourceId>) -> Self {
        Self {
            source_id: source_id.into(),
            transform: NodeTransform::default(),
            visible: true,
            display: DisplayChannel::Horizontal,
            kind: NodeKind::Item,
        }
    }

    /// Set the transform
    pub fn with_transform(mut self, transform: NodeTransform) -> Self {
        self.transform = transform;
        self
    }

    /// Set the display channel
    pub fn with_display(mut self, display: DisplayChannel) -> Self {
        self.display = display;
        self
    }

    /// Set the structural kind
    pub fn with_kind(mut self, kind: NodeKind) -> Self {
        self.kind = kind;
        self
    }

    /// Hide the node
    pub fn hidden(mut self) -> Self {
        self.visible = false;
        self
    }

    /// Whether this node takes part in geometry for `display`
    pub fn is_placed_on(&self, display: DisplayChannel) -> bool {
        self.display == display && self.kind != NodeKind::Group
    }
}

/// An ordered list of nodes shown together
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Scene {
    /// Catalog identifier
    pub id: SceneId,
    /// Display name
    pub name: String,
    /// Nodes in stacking order
    #[serde(default)]
    pub nodes: Vec<SceneNode>,
}

impl Scene {
    /// Create an empty scene
    pub fn new(id: impl Into<SceneId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            nodes: Vec::new(),
        }
    }

    /// Append a node
    pub fn with_node(mut self, node: SceneNode) -> Self {
        self.nodes.push(node);
        self
    }

    /// A reference to this scene for a cycle
    pub fn to_ref(&self) -> SceneRef {
        SceneRef {
            id: self.id.clone(),
            name: self.name.clone(),
        }
    }
}

/// Entry in the cycle of scenes to compile
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRef {
    /// Scene to look up in the catalog
    pub id: SceneId,
    /// Name reported in the compiled timeline
    pub name: String,
}

/// Read-only lookup of sources and scenes by ID
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(from = "CatalogData", into = "CatalogData")]
pub struct SceneCatalog {
    sources: IndexMap<SourceId, Source>,
    scenes: IndexMap<SceneId, Scene>,
}

/// On-disk shape of a catalog: plain lists
#[derive(Serialize, Deserialize)]
struct CatalogData {
    #[serde(default)]
    sources: Vec<Source>,
    #[serde(default)]
    scenes: Vec<Scene>,
}

impl From<CatalogData> for SceneCatalog {
    fn from(data: CatalogData) -> Self {
        let mut catalog = SceneCatalog::new();
        for source in data.sources {
            catalog.add_source(source);
        }
        for scene in data.scenes {
            catalog.add_scene(scene);
        }
        catalog
    }
}

impl From<SceneCatalog> for CatalogData {
    fn from(catalog: SceneCatalog) -> Self {
        Self {
            sources: catalog.sources.into_values().collect(),
            scenes: catalog.scenes.into_values().collect(),
        }
    }
}

impl SceneCatalog {
    /// Create an empty catalog
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a source
    pub fn add_source(&mut self, source: Source) {
        self.sources.insert(source.id.clone(), source);
    }

    /// Add or replace a scene
    pub fn add_scene(&mut self, scene: Scene) {
        self.scenes.insert(scene.id.clone(), scene);
    }

    /// Look up a source
    pub fn source(&self, id: &SourceId) -> Option<&Source> {
        self.sources.get(id)
    }

    /// Look up a scene
    pub fn scene(&self, id: &SceneId) -> Option<&Scene> {
        self.scenes.get(id)
    }

    /// Number of scenes
    pub fn scene_count(&self) -> usize {
        self.scenes.len()
    }

    /// Every scene, in catalog order, as a cycle
    pub fn cycle(&self) -> Vec<SceneRef> {
        self.scenes.values().map(Scene::to_ref).collect()
    }

    /// Pair each node with its resolved source, dropping unresolvable ones
    pub fn resolve<'a>(
        &'a self,
        nodes: &'a [SceneNode],
    ) -> impl Iterator<Item = (&'a SceneNode, &'a Source)> + 'a {
        nodes
            .iter()
            .filter_map(move |node| self.source(&node.source_id).map(|source| (node, source)))
    }

    /// Parse a catalog from RON
    pub fn from_ron(s: &str) -> Result<Self, CatalogError> {
        Ok(ron::from_str(s)?)
    }

    /// Parse a catalog from JSON
    pub fn from_json(s: &str) -> Result<Self, CatalogError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a catalog file; `.json` files are JSON, everything else RON
    pub fn load(path: &Path) -> Result<Self, CatalogError> {
        let content = std::fs::read_to_string(path)?;
        let is_json = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("json"));

        let catalog = if is_json {
            Self::from_json(&content)?
        } else {
            Self::from_ron(&content)?
        };

        tracing::debug!(
            path = %path.display(),
            sources = catalog.sources.len(),
            scenes = catalog.scenes.len(),
            "Loaded scene catalog"
        );
        Ok(catalog)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_kind_aliases() {
        assert_eq!(SourceKind::from_tag("dshow_input"), SourceKind::VideoCaptureDevice);
        assert_eq!(SourceKind::from_tag("macos_avcapture"), SourceKind::AvCaptureDevice);
        assert_eq!(SourceKind::from_tag("game_capture"), SourceKind::LiveCapture);
        assert_eq!(SourceKind::from_tag("something_new"), SourceKind::Unknown);
        assert_eq!(SourceKind::from_tag("video-capture-device"), SourceKind::VideoCaptureDevice);
        assert_eq!(SourceKind::from_tag("live-capture"), SourceKind::LiveCapture);
        assert!(SourceKind::AvCaptureDevice.is_default_focus_target());
        assert!(!SourceKind::LiveCapture.is_default_focus_target());
    }

    #[test]
    fn test_hyphenated_kinds_from_json() {
        let cam: Source =
            serde_json::from_str(r#"{ "id": "cam", "type": "video-capture-device" }"#).unwrap();
        assert!(cam.kind.is_default_focus_target());

        let game: Source =
            serde_json::from_str(r#"{ "id": "game", "type": "live-capture" }"#).unwrap();
        assert!(game.kind.is_live_capture());

        // Canonical spelling is written back
        let json = serde_json::to_value(&cam).unwrap();
        assert_eq!(json["type"], "video_capture_device");
    }

    #[test]
    fn test_node_defaults_from_json() {
        let node: SceneNode = serde_json::from_str(r#"{ "source_id": "cam" }"#).unwrap();
        assert!(node.visible);
        assert_eq!(node.display, DisplayChannel::Horizontal);
        assert_eq!(node.kind, NodeKind::Item);
        assert_eq!(node.transform.scale, Vec2::new(1.0, 1.0));

        let folder: SceneNode =
            serde_json::from_str(r#"{ "source_id": "grp", "type": "folder" }"#).unwrap();
        assert_eq!(folder.kind, NodeKind::Group);
        assert!(!folder.is_placed_on(DisplayChannel::Horizontal));
    }

    #[test]
    fn test_catalog_ron_round_trip() {
        let mut catalog = SceneCatalog::new();
        catalog.add_source(Source::new("cam", SourceKind::VideoCaptureDevice, "Webcam"));
        catalog.add_scene(Scene::new("main", "Main").with_node(SceneNode::new("cam")));

        let ron_str =
            ron::ser::to_string_pretty(&catalog, ron::ser::PrettyConfig::default()).unwrap();
        let loaded = SceneCatalog::from_ron(&ron_str).unwrap();

        assert_eq!(loaded.scene_count(), 1);
        let source = loaded.source(&SourceId::new("cam")).unwrap();
        assert_eq!(source.kind, SourceKind::VideoCaptureDevice);
        assert_eq!(loaded.cycle()[0].name, "Main");
    }

    #[test]
    fn test_resolve_skips_missing_sources() {
        let mut catalog = SceneCatalog::new();
        catalog.add_source(Source::new("cam", SourceKind::VideoCaptureDevice, "Webcam"));
        let nodes = vec![SceneNode::new("ghost"), SceneNode::new("cam")];

        let resolved: Vec<_> = catalog.resolve(&nodes).collect();
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].1.name, "Webcam");
    }

    #[test]
    fn test_load_json_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.json");
        std::fs::write(
            &path,
            r#"{
                "sources": [{ "id": "game", "type": "game_capture", "name": "Game Capture" }],
                "scenes": [{ "id": "play", "name": "Gameplay", "nodes": [{ "source_id": "game" }] }]
            }"#,
        )
        .unwrap();

        let catalog = SceneCatalog::load(&path).unwrap();
        assert_eq!(catalog.scene_count(), 1);
        let game = catalog.source(&SourceId::new("game")).unwrap();
        assert_eq!(game.kind, SourceKind::LiveCapture);
    }
}
