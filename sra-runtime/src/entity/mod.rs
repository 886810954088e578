//! # Entity 模块
//!
//! 场景树节点。
//!
//! ## 所有权
//!
//! - 父节点通过 [`EntityRef`]（`Rc`）拥有子节点
//! - 子节点通过 `Weak` 回指父节点，不形成引用环
//! - 一个子节点至多出现在一个父节点的 `children` 中
//!
//! 场景本身就是一个根实体，由 [`Controller`](crate::Controller) 的场景栈持有。

mod render;
mod traverse;

pub use render::{ContentMode, DrawCall, RecordingContext, RenderContext, Sprite};

use std::cell::{Ref, RefCell, RefMut};
use std::collections::HashMap;
use std::fmt;
use std::rc::{Rc, Weak};

use tracing::warn;

use crate::color::Color;
use crate::geometry::{Rect, Vector2};

/// 自定义绘制函数，替代默认绘制流程
pub type DrawHook = Rc<dyn Fn(&Entity, &mut dyn RenderContext)>;

/// 场景树节点
pub struct Entity {
    /// 应用自定义标签
    pub tag: i32,
    /// 父坐标系中的矩形
    pub rect: Rect,
    /// 旋转（弧度），绕锚点
    pub rotation: f32,
    pub scale: Vector2,
    /// 锚点（相对于 size 的比例）
    pub anchor: Vector2,
    pub opacity: f32,
    pub visible: bool,
    pub sprite: Option<Sprite>,
    pub background_color: Option<Color>,
    pub content_mode: ContentMode,
    /// 应用数据
    pub data: HashMap<String, serde_json::Value>,
    z_order: i32,
    draw_hook: Option<DrawHook>,
    children: Vec<EntityRef>,
    parent: Weak<RefCell<Entity>>,
    children_need_sorting: bool,
}

impl Default for Entity {
    fn default() -> Self {
        Self {
            tag: 0,
            rect: Rect::ZERO,
            rotation: 0.0,
            scale: Vector2::ONE,
            anchor: Vector2::new(0.5, 0.5),
            opacity: 1.0,
            visible: true,
            sprite: None,
            background_color: Some(Color::WHITE),
            content_mode: ContentMode::default(),
            data: HashMap::new(),
            z_order: 0,
            draw_hook: None,
            children: Vec::new(),
            parent: Weak::new(),
            children_need_sorting: false,
        }
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("tag", &self.tag)
            .field("rect", &self.rect)
            .field("rotation", &self.rotation)
            .field("scale", &self.scale)
            .field("opacity", &self.opacity)
            .field("z_order", &self.z_order)
            .field("visible", &self.visible)
            .field("sprite", &self.sprite)
            .field("children", &self.children.len())
            .finish_non_exhaustive()
    }
}

impl Entity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rect(rect: Rect) -> Self {
        Self {
            rect,
            ..Self::default()
        }
    }

    pub fn z_order(&self) -> i32 {
        self.z_order
    }

    /// 锚点在父坐标系中的位置
    pub fn position(&self) -> Vector2 {
        Vector2::new(
            self.rect.origin.x + self.rect.size.width * self.anchor.x,
            self.rect.origin.y + self.rect.size.height * self.anchor.y,
        )
    }

    /// 移动 `rect.origin`，使锚点落在 `position`
    pub fn set_position(&mut self, position: Vector2) {
        let offset = self.anchor_offset();
        self.rect.origin = Vector2::new(position.x - offset.x, position.y - offset.y);
    }

    /// 锚点相对于 `rect.origin` 的偏移
    pub fn anchor_offset(&self) -> Vector2 {
        Vector2::new(
            self.rect.size.width * self.anchor.x,
            self.rect.size.height * self.anchor.y,
        )
    }

    pub fn children_count(&self) -> usize {
        self.children.len()
    }

    pub fn set_draw_hook(&mut self, hook: impl Fn(&Entity, &mut dyn RenderContext) + 'static) {
        self.draw_hook = Some(Rc::new(hook));
    }

    pub fn clear_draw_hook(&mut self) {
        self.draw_hook = None;
    }

    pub fn has_draw_hook(&self) -> bool {
        self.draw_hook.is_some()
    }

    /// 绘制自身（坐标系已由遍历变换到 `rect.origin`）
    pub fn draw(&self, ctx: &mut dyn RenderContext) {
        match &self.draw_hook {
            Some(hook) => hook(self, ctx),
            None => self.draw_default(ctx),
        }
    }

    /// 默认绘制：背景色填充 + 精灵
    pub fn draw_default(&self, ctx: &mut dyn RenderContext) {
        let local = Rect::new(Vector2::ZERO, self.rect.size);

        ctx.save();
        ctx.set_global_alpha(self.opacity);
        if let Some(color) = self.background_color {
            ctx.fill_rect(local, color);
        }
        if let Some(sprite) = &self.sprite {
            ctx.draw_sprite(sprite, local, self.content_mode);
        }
        ctx.restore();
    }
}

/// 实体的共享句柄
///
/// 克隆只增加引用计数；相等性用 [`EntityRef::ptr_eq`] 判断。
#[derive(Clone, Default)]
pub struct EntityRef(Rc<RefCell<Entity>>);

impl fmt::Debug for EntityRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0.try_borrow() {
            Ok(entity) => fmt::Debug::fmt(&*entity, f),
            Err(_) => f.write_str("EntityRef(<borrowed>)"),
        }
    }
}

impl From<Entity> for EntityRef {
    fn from(entity: Entity) -> Self {
        Self::new(entity)
    }
}

impl EntityRef {
    pub fn new(entity: Entity) -> Self {
        Self(Rc::new(RefCell::new(entity)))
    }

    /// # Panics
    /// 实体正被可变借用时（例如在自身的绘制函数内修改自身）
    pub fn borrow(&self) -> Ref<'_, Entity> {
        self.0.borrow()
    }

    /// # Panics
    /// 实体正被借用时
    pub fn borrow_mut(&self) -> RefMut<'_, Entity> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &EntityRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn parent(&self) -> Option<EntityRef> {
        self.0.borrow().parent.upgrade().map(EntityRef)
    }

    pub fn is_root(&self) -> bool {
        self.parent().is_none()
    }

    pub fn z_order(&self) -> i32 {
        self.0.borrow().z_order
    }

    /// 修改绘制顺序，并标记父节点需要重新排序
    pub fn set_z_order(&self, z_order: i32) {
        self.0.borrow_mut().z_order = z_order;
        if let Some(parent) = self.parent() {
            parent.0.borrow_mut().children_need_sorting = true;
        }
    }

    /// 添加子节点
    ///
    /// 已在别处挂载的子节点会先被摘下。把祖先挂到后代下面会形成环，调用方需保证不发生。
    pub fn add_child(&self, child: &EntityRef) {
        if self.ptr_eq(child) {
            warn!("忽略把实体添加为自身子节点");
            return;
        }

        child.remove_from_parent();
        child.0.borrow_mut().parent = Rc::downgrade(&self.0);

        let mut entity = self.0.borrow_mut();
        entity.children.push(child.clone());
        entity.children_need_sorting = true;
    }

    /// 从父节点摘下；没有父节点时返回 `false`
    pub fn remove_from_parent(&self) -> bool {
        let Some(parent) = self.parent() else {
            return false;
        };

        {
            let mut parent = parent.0.borrow_mut();
            parent.children.retain(|c| !c.ptr_eq(self));
            parent.children_need_sorting = true;
        }
        self.0.borrow_mut().parent = Weak::new();
        true
    }

    /// 摘下全部子节点
    pub fn detach_all_children(&self) {
        let children = std::mem::take(&mut self.0.borrow_mut().children);
        for child in children {
            child.0.borrow_mut().parent = Weak::new();
        }
    }

    /// 子节点快照（当前顺序）
    pub fn children(&self) -> Vec<EntityRef> {
        self.0.borrow().children.clone()
    }

    /// 第一个 tag 匹配的直接子节点
    pub fn child_with_tag(&self, tag: i32) -> Option<EntityRef> {
        self.0
            .borrow()
            .children
            .iter()
            .find(|c| c.0.borrow().tag == tag)
            .cloned()
    }

    pub fn position(&self) -> Vector2 {
        self.0.borrow().position()
    }

    pub fn set_position(&self, position: Vector2) {
        self.0.borrow_mut().set_position(position);
    }
}
