//! # Traverse 模块
//!
//! 深度优先绘制场景树。
//!
//! 每个节点：压入变换 → 绘制 `z_order < 0` 的子节点 → 绘制自身 → 绘制其余子节点 → 弹出变换。

use super::{Entity, EntityRef, RenderContext};

impl EntityRef {
    /// 绘制以此节点为根的子树
    ///
    /// 不可见或完全透明的节点连同其子树一起跳过。
    pub fn visit(&self, ctx: &mut dyn RenderContext) {
        {
            let entity = self.0.borrow();
            if !entity.visible || entity.opacity <= 0.0 {
                return;
            }
        }

        self.sort_children_if_needed();

        let children = self.children();
        let split = children.partition_point(|c| c.z_order() < 0);
        let (behind, front) = children.split_at(split);

        push_transform(&self.0.borrow(), ctx);

        for child in behind {
            child.visit(ctx);
        }
        self.0.borrow().draw(ctx);
        for child in front {
            child.visit(ctx);
        }

        pop_transform(ctx);
    }

    /// 稳定排序：z_order 相同的子节点保持添加顺序
    fn sort_children_if_needed(&self) {
        let mut entity = self.0.borrow_mut();
        if !entity.children_need_sorting {
            return;
        }
        entity.children.sort_by_key(EntityRef::z_order);
        entity.children_need_sorting = false;
    }
}

/// 切换到节点的局部坐标系
///
/// 有旋转或缩放时绕锚点进行；否则只平移到 `rect.origin`。
fn push_transform(entity: &Entity, ctx: &mut dyn RenderContext) {
    ctx.save();

    let rotate = entity.rotation != 0.0;
    let scale = entity.scale.x != 1.0 || entity.scale.y != 1.0;

    if rotate || scale {
        let position = entity.position();
        let offset = entity.anchor_offset();

        ctx.translate(position.x, position.y);
        if rotate {
            ctx.rotate(entity.rotation);
        }
        if scale {
            ctx.scale(entity.scale.x, entity.scale.y);
        }
        ctx.translate(-offset.x, -offset.y);
    } else {
        ctx.translate(entity.rect.origin.x, entity.rect.origin.y);
    }
}

fn pop_transform(ctx: &mut dyn RenderContext) {
    ctx.restore();
}
