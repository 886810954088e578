//! # Desc 模块
//!
//! 场景描述：用 JSON 声明实体树和挂在实体上的动作。
//!
//! ```json
//! {
//!   "name": "demo",
//!   "root": {
//!     "rect": { "origin": { "x": 0, "y": 0 }, "size": { "width": 320, "height": 240 } },
//!     "children": [
//!       {
//!         "tag": 1,
//!         "sprite": "hero.png",
//!         "actions": [
//!           { "type": "move_by", "duration": 1.0, "by": { "x": 100, "y": 0 }, "timing": "ease_in_out" }
//!         ]
//!       }
//!     ]
//!   }
//! }
//! ```
//!
//! [`SceneDesc::build`] 校验描述并生成实体树；动作在 [`LoadedScene::install`] 时才开始。

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::action::{Action, ActionId, LeafAction};
use crate::color::Color;
use crate::controller::Controller;
use crate::entity::{ContentMode, Entity, EntityRef, Sprite};
use crate::error::{DescError, SraError, SraResult};
use crate::geometry::{Rect, Vector2};
use crate::timing::TimingFunction;

/// 场景描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SceneDesc {
    #[serde(default)]
    pub name: Option<String>,
    pub root: EntityDesc,
}

/// 实体描述，字段默认值与 [`Entity::default`] 一致
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityDesc {
    #[serde(default)]
    pub tag: i32,
    #[serde(default)]
    pub rect: Rect,
    #[serde(default)]
    pub rotation: f32,
    #[serde(default = "default_scale")]
    pub scale: Vector2,
    #[serde(default = "default_anchor")]
    pub anchor: Vector2,
    #[serde(default)]
    pub z_order: i32,
    #[serde(default = "default_opacity")]
    pub opacity: f32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub sprite: Option<Sprite>,
    /// `null` 表示不填充背景
    #[serde(default = "default_background")]
    pub background_color: Option<Color>,
    #[serde(default)]
    pub content_mode: ContentMode,
    #[serde(default)]
    pub data: HashMap<String, serde_json::Value>,
    #[serde(default)]
    pub actions: Vec<ActionDesc>,
    #[serde(default)]
    pub children: Vec<EntityDesc>,
}

fn default_scale() -> Vector2 {
    Vector2::ONE
}

fn default_anchor() -> Vector2 {
    Vector2::new(0.5, 0.5)
}

fn default_opacity() -> f32 {
    1.0
}

fn default_visible() -> bool {
    true
}

fn default_background() -> Option<Color> {
    Some(Color::WHITE)
}

/// 动作描述
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionDesc {
    #[serde(flatten)]
    pub kind: ActionKindDesc,
    /// 仅对叶子动作有效
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<f32>,
    /// 仅对叶子动作有效
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timing: Option<TimingDesc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActionKindDesc {
    Delay { duration: f32 },
    MoveTo { duration: f32, to: Vector2 },
    MoveBy { duration: f32, by: Vector2 },
    /// 弧度
    RotateTo { duration: f32, to: f32 },
    RotateBy { duration: f32, by: f32 },
    ScaleTo { duration: f32, to: Vector2 },
    ScaleBy { duration: f32, by: Vector2 },
    FadeTo { duration: f32, to: f32 },
    FadeBy { duration: f32, by: f32 },
    Sprite { duration: f32, frames: Vec<Sprite> },
    Sequence { actions: Vec<ActionDesc> },
    Group { actions: Vec<ActionDesc> },
    /// `count` 为额外重复次数，负数无限
    Repeat {
        action: Box<ActionDesc>,
        #[serde(default)]
        count: i32,
    },
}

/// 缓动函数描述：预设名或 4 个控制值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimingDesc {
    Named(String),
    Bezier(Vec<f32>),
}

impl TimingDesc {
    pub fn resolve(&self) -> Result<TimingFunction, DescError> {
        match self {
            Self::Named(name) => {
                TimingFunction::preset(name).ok_or_else(|| DescError::UnknownTiming {
                    name: name.clone(),
                })
            }
            Self::Bezier(values) => Ok(TimingFunction::from_control_points(values)?),
        }
    }
}

impl ActionDesc {
    pub fn build(&self) -> Result<Action, DescError> {
        let mut leaf = match &self.kind {
            ActionKindDesc::Delay { duration } => LeafAction::delay(*duration),
            ActionKindDesc::MoveTo { duration, to } => LeafAction::move_to(*duration, *to),
            ActionKindDesc::MoveBy { duration, by } => LeafAction::move_by(*duration, *by),
            ActionKindDesc::RotateTo { duration, to } => LeafAction::rotate_to(*duration, *to),
            ActionKindDesc::RotateBy { duration, by } => LeafAction::rotate_by(*duration, *by),
            ActionKindDesc::ScaleTo { duration, to } => LeafAction::scale_to(*duration, *to),
            ActionKindDesc::ScaleBy { duration, by } => LeafAction::scale_by(*duration, *by),
            ActionKindDesc::FadeTo { duration, to } => LeafAction::fade_to(*duration, *to),
            ActionKindDesc::FadeBy { duration, by } => LeafAction::fade_by(*duration, *by),
            ActionKindDesc::Sprite { duration, frames } => {
                if frames.is_empty() {
                    return Err(DescError::EmptyFrames);
                }
                LeafAction::sprite(*duration, frames.clone())
            }
            ActionKindDesc::Sequence { actions } => {
                self.warn_leaf_options("sequence");
                return Ok(Action::sequence(build_all(actions)?));
            }
            ActionKindDesc::Group { actions } => {
                self.warn_leaf_options("group");
                return Ok(Action::group(build_all(actions)?));
            }
            ActionKindDesc::Repeat { action, count } => {
                self.warn_leaf_options("repeat");
                return Ok(Action::repeat(action.build()?, *count));
            }
        };

        if let Some(rate) = self.rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(DescError::InvalidRate { rate });
            }
            leaf = leaf.with_rate(rate);
        }
        if let Some(timing) = &self.timing {
            leaf = leaf.with_timing_function(timing.resolve()?);
        }
        Ok(leaf.into())
    }

    fn warn_leaf_options(&self, kind: &'static str) {
        if self.rate.is_some() || self.timing.is_some() {
            warn!(kind = kind, "组合动作忽略 rate / timing");
        }
    }

    fn collect_sprites<'a>(&'a self, out: &mut Vec<&'a Sprite>) {
        match &self.kind {
            ActionKindDesc::Sprite { frames, .. } => out.extend(frames),
            ActionKindDesc::Sequence { actions } | ActionKindDesc::Group { actions } => {
                for action in actions {
                    action.collect_sprites(out);
                }
            }
            ActionKindDesc::Repeat { action, .. } => action.collect_sprites(out),
            _ => {}
        }
    }
}

fn build_all(actions: &[ActionDesc]) -> Result<Vec<Action>, DescError> {
    actions.iter().map(ActionDesc::build).collect()
}

/// 构建完成、尚未开始的场景
#[derive(Debug)]
pub struct LoadedScene {
    pub root: EntityRef,
    /// 待开始的动作及其目标（深度优先，声明顺序）
    pub bindings: Vec<(EntityRef, Action)>,
}

impl LoadedScene {
    /// 开始所有动作并把场景压入控制器的场景栈
    pub fn install(self, controller: &mut Controller) -> Vec<ActionId> {
        let ids = self
            .bindings
            .into_iter()
            .map(|(target, action)| controller.run_action(&target, action))
            .collect();
        controller.push_scene(self.root);
        ids
    }
}

impl EntityDesc {
    fn to_entity(&self) -> Entity {
        let mut entity = Entity::with_rect(self.rect);
        entity.tag = self.tag;
        entity.rotation = self.rotation;
        entity.scale = self.scale;
        entity.anchor = self.anchor;
        entity.opacity = self.opacity;
        entity.visible = self.visible;
        entity.sprite = self.sprite.clone();
        entity.background_color = self.background_color;
        entity.content_mode = self.content_mode;
        entity.data = self.data.clone();
        entity
    }

    fn build_into(&self, bindings: &mut Vec<(EntityRef, Action)>) -> Result<EntityRef, DescError> {
        let entity = EntityRef::new(self.to_entity());
        entity.set_z_order(self.z_order);

        for action in &self.actions {
            bindings.push((entity.clone(), action.build()?));
        }
        for child in &self.children {
            let child = child.build_into(bindings)?;
            entity.add_child(&child);
        }
        Ok(entity)
    }

    fn collect_sprites<'a>(&'a self, out: &mut Vec<&'a Sprite>) {
        out.extend(&self.sprite);
        for action in &self.actions {
            action.collect_sprites(out);
        }
        for child in &self.children {
            child.collect_sprites(out);
        }
    }

    /// 子树中的实体数量（含自身）
    pub fn entity_count(&self) -> usize {
        1 + self.children.iter().map(EntityDesc::entity_count).sum::<usize>()
    }
}

impl SceneDesc {
    pub fn from_json_str(json: &str) -> Result<Self, DescError> {
        serde_json::from_str(json).map_err(|e| DescError::Parse {
            message: e.to_string(),
        })
    }

    /// 从文件读取场景描述
    pub fn load(path: impl AsRef<Path>) -> SraResult<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| SraError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(Self::from_json_str(&json)?)
    }

    /// 校验并生成实体树
    pub fn build(&self) -> Result<LoadedScene, DescError> {
        let mut bindings = Vec::new();
        let root = self.root.build_into(&mut bindings)?;
        debug!(
            name = self.name.as_deref().unwrap_or("<unnamed>"),
            entities = self.root.entity_count(),
            actions = bindings.len(),
            "scene built"
        );
        Ok(LoadedScene { root, bindings })
    }

    /// 引用到的所有精灵 key（去重，按首次出现顺序）
    pub fn sprite_references(&self) -> Vec<&Sprite> {
        let mut all = Vec::new();
        self.root.collect_sprites(&mut all);

        let mut unique: Vec<&Sprite> = Vec::with_capacity(all.len());
        for sprite in all {
            if !unique.contains(&sprite) {
                unique.push(sprite);
            }
        }
        unique
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEMO: &str = r#"{
        "name": "demo",
        "root": {
            "rect": { "origin": { "x": 0, "y": 0 }, "size": { "width": 100, "height": 100 } },
            "background_color": null,
            "children": [
                {
                    "tag": 1,
                    "z_order": -1,
                    "sprite": "bg.png",
                    "actions": [
                        { "type": "fade_to", "duration": 2.0, "to": 0.0, "timing": "ease_in" }
                    ]
                },
                {
                    "tag": 2,
                    "background_color": { "r": 255, "g": 0, "b": 0 },
                    "actions": [
                        {
                            "type": "repeat",
                            "count": -1,
                            "action": {
                                "type": "sprite",
                                "duration": 1.0,
                                "frames": ["walk_1.png", "walk_2.png", "bg.png"]
                            }
                        }
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_load_from_file() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../demos/scenes");
        let desc = SceneDesc::load(dir.join("demo.json")).unwrap();
        assert_eq!(desc.name.as_deref(), Some("demo"));

        let err = SceneDesc::load(dir.join("missing.json")).unwrap_err();
        assert!(matches!(err, SraError::Io { .. }));
    }

    #[test]
    fn test_entity_fields_carry_over() {
        let json = r#"{
            "root": {
                "tag": 9,
                "rect": { "origin": { "x": 1, "y": 2 }, "size": { "width": 3, "height": 4 } },
                "rotation": 0.5,
                "scale": { "x": 2, "y": 3 },
                "anchor": { "x": 0, "y": 1 },
                "opacity": 0.5,
                "visible": false,
                "content_mode": "aspect_fit",
                "data": { "hp": 3 }
            }
        }"#;
        let scene = SceneDesc::from_json_str(json).unwrap().build().unwrap();
        let root = scene.root.borrow();

        assert_eq!(root.tag, 9);
        assert_eq!(root.rect, Rect::from_xywh(1.0, 2.0, 3.0, 4.0));
        assert_eq!(root.rotation, 0.5);
        assert_eq!(root.scale, Vector2::new(2.0, 3.0));
        assert_eq!(root.anchor, Vector2::new(0.0, 1.0));
        assert_eq!(root.opacity, 0.5);
        assert!(!root.visible);
        assert_eq!(root.content_mode, ContentMode::AspectFit);
        assert_eq!(root.data["hp"], serde_json::json!(3));
        assert!(root.sprite.is_none());
    }

    #[test]
    fn test_build_demo_scene() {
        let desc = SceneDesc::from_json_str(DEMO).unwrap();
        let scene = desc.build().unwrap();

        let root = scene.root.borrow();
        assert_eq!(root.background_color, None);
        assert_eq!(root.children_count(), 2);
        drop(root);

        let first = scene.root.child_with_tag(1).unwrap();
        assert_eq!(first.z_order(), -1);
        assert_eq!(first.borrow().sprite, Some(Sprite::new("bg.png")));
        assert_eq!(first.borrow().background_color, Some(Color::WHITE));
        let second = scene.root.child_with_tag(2).unwrap();
        assert_eq!(second.borrow().background_color, Some(Color::RED));

        assert_eq!(scene.bindings.len(), 2);
        assert!(scene.bindings[0].0.ptr_eq(&first));
        assert_eq!(scene.bindings[1].1.kind_name(), "repeat");
    }

    #[test]
    fn test_sprite_references_are_unique() {
        let desc = SceneDesc::from_json_str(DEMO).unwrap();
        let keys: Vec<&str> = desc.sprite_references().into_iter().map(Sprite::key).collect();
        assert_eq!(keys, vec!["bg.png", "walk_1.png", "walk_2.png"]);
    }

    #[test]
    fn test_install_starts_actions() {
        let desc = SceneDesc::from_json_str(DEMO).unwrap();
        let mut controller = Controller::default();
        let ids = desc.build().unwrap().install(&mut controller);

        assert_eq!(ids.len(), 2);
        assert_eq!(controller.scene_count(), 1);
        assert_eq!(controller.action_manager().len(), 2);
    }

    #[test]
    fn test_bezier_timing() {
        let json = r#"{ "type": "delay", "duration": 1, "timing": [0.1, 0.2, 0.3, 0.4] }"#;
        let desc: ActionDesc = serde_json::from_str(json).unwrap();
        assert_eq!(desc.timing, Some(TimingDesc::Bezier(vec![0.1, 0.2, 0.3, 0.4])));
        assert!(desc.build().is_ok());

        let json = r#"{ "type": "delay", "duration": 1, "timing": [0.1, 0.2] }"#;
        let desc: ActionDesc = serde_json::from_str(json).unwrap();
        assert!(matches!(desc.build(), Err(DescError::Timing(_))));
    }

    #[test]
    fn test_validation_errors() {
        let cases = [
            (
                r#"{ "type": "delay", "duration": 1, "timing": "bounce" }"#,
                DescError::UnknownTiming {
                    name: "bounce".to_string(),
                },
            ),
            (
                r#"{ "type": "fade_to", "duration": 1, "to": 0, "rate": 0 }"#,
                DescError::InvalidRate { rate: 0.0 },
            ),
            (
                r#"{ "type": "sequence", "actions": [{ "type": "sprite", "duration": 1, "frames": [] }] }"#,
                DescError::EmptyFrames,
            ),
        ];

        for (json, expected) in cases {
            let desc: ActionDesc = serde_json::from_str(json).unwrap();
            assert_eq!(desc.build().unwrap_err(), expected, "{json}");
        }
    }

    #[test]
    fn test_parse_error() {
        let err = SceneDesc::from_json_str(r#"{ "root": { "tag": "x" } }"#).unwrap_err();
        assert!(matches!(err, DescError::Parse { .. }));
    }
}
