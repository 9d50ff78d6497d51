// SPDX-License-Identifier: MIT OR Apache-2.0
//! Focus target classification.

use crate::scene::{SceneCatalog, SceneNode, Source, SourceId};
use indexmap::IndexMap;

/// Name fragment that marks a source as live capture regardless of kind
const LIVE_CAPTURE_NAME: &str = "game capture";

/// A node selected to receive dedicated camera attention
#[derive(Debug, Clone, Copy)]
pub struct FocusTarget<'a> {
    /// Node placing the source
    pub node: &'a SceneNode,
    /// Resolved source
    pub source: &'a Source,
}

/// Whether any resolvable source in `nodes` is live-capture content
pub fn is_high_motion_scene(nodes: &[SceneNode], catalog: &SceneCatalog) -> bool {
    catalog.resolve(nodes).any(|(_, source)| {
        source.kind.is_live_capture() || source.name.to_lowercase().contains(LIVE_CAPTURE_NAME)
    })
}

/// Visible nodes the camera should focus on, in node order.
///
/// An entry in `overrides` for a node's source decides outright; otherwise
/// capture devices are targets and everything else is not.
pub fn find_focus_targets<'a>(
    nodes: &'a [SceneNode],
    catalog: &'a SceneCatalog,
    overrides: &IndexMap<SourceId, bool>,
) -> Vec<FocusTarget<'a>> {
    catalog
        .resolve(nodes)
        .filter(|(node, _)| node.visible)
        .filter(|(node, source)| match overrides.get(&node.source_id) {
            Some(&selected) => selected,
            None => source.kind.is_default_focus_target(),
        })
        .map(|(node, source)| FocusTarget { node, source })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::SourceKind;

    fn catalog() -> SceneCatalog {
        let mut catalog = SceneCatalog::new();
        catalog.add_source(Source::new("srcA", SourceKind::VideoCaptureDevice, "Webcam"));
        catalog.add_source(Source::new("srcB", SourceKind::AvCaptureDevice, "Mac Cam"));
        catalog.add_source(Source::new("logo", SourceKind::Image, "Logo"));
        catalog.add_source(Source::new("game", SourceKind::Unknown, "Game Capture 2"));
        catalog
    }

    #[test]
    fn test_default_device_types_are_targets() {
        let catalog = catalog();
        let nodes = vec![
            SceneNode::new("logo"),
            SceneNode::new("srcB"),
            SceneNode::new("srcA"),
        ];

        let targets = find_focus_targets(&nodes, &catalog, &IndexMap::new());
        let ids: Vec<_> = targets.iter().map(|t| t.source.id.as_str()).collect();
        assert_eq!(ids, ["srcB", "srcA"]);
    }

    #[test]
    fn test_override_excludes_default_target() {
        let catalog = catalog();
        let nodes = vec![SceneNode::new("srcA"), SceneNode::new("srcB")];
        let mut overrides = IndexMap::new();
        overrides.insert(SourceId::new("srcA"), false);

        let targets = find_focus_targets(&nodes, &catalog, &overrides);
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].source.id.as_str(), "srcB");
    }

    #[test]
    fn test_override_includes_other_types() {
        let catalog = catalog();
        let nodes = vec![SceneNode::new("logo")];
        let mut overrides = IndexMap::new();
        overrides.insert(SourceId::new("logo"), true);

        assert_eq!(find_focus_targets(&nodes, &catalog, &overrides).len(), 1);
    }

    #[test]
    fn test_hidden_and_unresolved_nodes_skipped() {
        let catalog = catalog();
        let nodes = vec![SceneNode::new("srcA").hidden(), SceneNode::new("missing")];
        let mut overrides = IndexMap::new();
        overrides.insert(SourceId::new("missing"), true);

        assert!(find_focus_targets(&nodes, &catalog, &overrides).is_empty());
    }

    #[test]
    fn test_high_motion_by_kind_or_name() {
        let mut catalog = catalog();
        catalog.add_source(Source::new("live", SourceKind::LiveCapture, "Console"));

        assert!(is_high_motion_scene(&[SceneNode::new("live")], &catalog));
        assert!(is_high_motion_scene(&[SceneNode::new("game")], &catalog));
        assert!(!is_high_motion_scene(&[SceneNode::new("srcA")], &catalog));
        assert!(!is_high_motion_scene(&[SceneNode::new("missing")], &catalog));
    }
}
