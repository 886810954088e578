//! # 场景播放集成测试
//!
//! Controller → ActionManager / Scheduler → 场景遍历 的完整一帧。
//! 绘制结果通过 RecordingContext 记录并做快照比对。

use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use insta::assert_snapshot;
use sra_runtime::{
    Color, Controller, Entity, EntityRef, LeafAction, RecordingContext, Rect, SceneDesc, Sprite,
    StopReason, TickStatus, Vector2,
};

fn build_scene() -> (EntityRef, EntityRef, EntityRef) {
    let root = EntityRef::new(Entity::with_rect(Rect::from_xywh(0.0, 0.0, 100.0, 100.0)));
    root.borrow_mut().background_color = None;

    let back = EntityRef::new(Entity::with_rect(Rect::from_xywh(10.0, 10.0, 20.0, 20.0)));
    {
        let mut entity = back.borrow_mut();
        entity.tag = 1;
        entity.background_color = Some(Color::RED);
    }
    back.set_z_order(-1);

    let hero = EntityRef::new(Entity::with_rect(Rect::from_xywh(50.0, 50.0, 10.0, 10.0)));
    {
        let mut entity = hero.borrow_mut();
        entity.tag = 2;
        entity.rotation = 0.5;
        entity.sprite = Some(Sprite::new("hero.png"));
        entity.background_color = None;
    }

    // 先添加前景，验证排序把背景提前
    root.add_child(&hero);
    root.add_child(&back);
    (root, back, hero)
}

#[test]
fn test_frame_draw_calls() {
    let (root, _, _) = build_scene();
    let mut controller = Controller::default();
    controller.push_scene(root);

    let mut ctx = RecordingContext::new();
    let status = controller.tick(&mut ctx);
    assert_eq!(status, TickStatus::Rendered { delta: 0.0 });
    assert_eq!(ctx.depth(), 0);

    assert_snapshot!(ctx.lines().join("\n"), @r"
    save
    translate(0, 0)
    save
    translate(10, 10)
    save
    global_alpha(1)
    fill_rect(0, 0, 20, 20, rgb(255, 0, 0))
    restore
    restore
    save
    global_alpha(1)
    restore
    save
    translate(55, 55)
    rotate(0.5)
    translate(-5, -5)
    save
    global_alpha(1)
    draw_sprite(hero.png, 0, 0, 10, 10, scale_to_fill)
    restore
    restore
    restore
    ");
}

#[test]
fn test_actions_and_callbacks_run_before_draw() {
    let (root, back, hero) = build_scene();
    let mut controller = Controller::default();
    controller.push_scene(root);

    controller.run_action(&hero, LeafAction::move_by(1.0, Vector2::new(10.0, 0.0)));
    let ticks = Rc::new(Cell::new(0));
    {
        let ticks = Rc::clone(&ticks);
        controller.scheduler_mut().schedule(&back, move |target, delta| {
            ticks.set(ticks.get() + 1);
            target.borrow_mut().opacity -= delta;
        });
    }

    let mut ctx = RecordingContext::new();
    let t0 = Instant::now();
    controller.tick_at(t0, &mut ctx);
    controller.tick_at(t0 + Duration::from_millis(500), &mut ctx);

    assert_eq!(ticks.get(), 2);
    assert_eq!(back.borrow().opacity, 0.5);
    assert_eq!(hero.borrow().rect.origin, Vector2::new(55.0, 50.0));

    // 本帧绘制使用的是推进后的值
    let lines = ctx.take_calls();
    let last_frame: Vec<String> = lines
        .iter()
        .rev()
        .take(10)
        .rev()
        .map(ToString::to_string)
        .collect();
    assert_eq!(last_frame[1], "translate(60, 55)");
}

#[test]
fn test_hidden_scene_draws_nothing_but_keeps_ticking() {
    let (root, _, hero) = build_scene();
    root.borrow_mut().visible = false;

    let mut controller = Controller::default();
    controller.push_scene(root);
    controller.run_action(&hero, LeafAction::fade_to(0.0, 0.0));

    let mut ctx = RecordingContext::new();
    controller.tick(&mut ctx);
    assert!(ctx.calls().is_empty());
    assert_eq!(hero.borrow().opacity, 0.0);
}

#[test]
fn test_popping_last_scene_stops_run_loop() {
    let mut controller = Controller::default();
    controller.push_scene(EntityRef::new(Entity::new()));
    assert!(controller.run());

    let mut ctx = RecordingContext::new();
    assert!(matches!(controller.tick(&mut ctx), TickStatus::Rendered { .. }));

    controller.pop_scene();
    assert_eq!(
        controller.tick(&mut ctx),
        TickStatus::Stopped(StopReason::NoScene)
    );
    assert!(!controller.is_running());
}

#[test]
fn test_scene_description_playback() {
    let json = r#"{
        "root": {
            "rect": { "origin": { "x": 0, "y": 0 }, "size": { "width": 64, "height": 64 } },
            "background_color": null,
            "children": [
                {
                    "tag": 7,
                    "rect": { "origin": { "x": 0, "y": 0 }, "size": { "width": 8, "height": 8 } },
                    "background_color": null,
                    "actions": [
                        {
                            "type": "sequence",
                            "actions": [
                                { "type": "move_to", "duration": 1, "to": { "x": 32, "y": 0 } },
                                { "type": "sprite", "duration": 1, "frames": ["a.png", "b.png"] }
                            ]
                        }
                    ]
                }
            ]
        }
    }"#;

    let desc = SceneDesc::from_json_str(json).unwrap();
    let mut controller = Controller::default();
    desc.build().unwrap().install(&mut controller);

    let root = controller.top_scene().cloned().unwrap();
    let mover = root.child_with_tag(7).unwrap();

    let mut ctx = RecordingContext::new();
    let t0 = Instant::now();
    for ms in [0, 1000, 1250, 1750] {
        ctx.clear();
        controller.tick_at(t0 + Duration::from_millis(ms), &mut ctx);
    }

    assert_eq!(mover.borrow().rect.origin, Vector2::new(32.0, 0.0));
    assert_eq!(mover.borrow().sprite, Some(Sprite::new("b.png")));
    assert_snapshot!(ctx.lines().join("\n"), @r"
    save
    translate(0, 0)
    save
    global_alpha(1)
    restore
    save
    translate(32, 0)
    save
    global_alpha(1)
    draw_sprite(b.png, 0, 0, 8, 8, scale_to_fill)
    restore
    restore
    restore
    ");
}

#[test]
fn test_bundled_demo_scene_plays_to_completion() {
    let desc = SceneDesc::from_json_str(include_str!("../../demos/scenes/demo.json")).unwrap();
    assert_eq!(desc.root.entity_count(), 3);
    assert_eq!(
        desc.sprite_references(),
        vec![&Sprite::new("hero/idle_0.png"), &Sprite::new("hero/idle_1.png")]
    );

    let mut controller = Controller::default();
    let ids = desc.build().unwrap().install(&mut controller);
    assert_eq!(ids.len(), 3);
    assert!(controller.run());

    // 1. 以 60 fps 推进 5 秒
    let mut ctx = RecordingContext::new();
    let t0 = Instant::now();
    for frame in 0..300u64 {
        ctx.clear();
        controller.tick_at(t0 + Duration::from_micros(16_667 * frame), &mut ctx);
    }

    // 2. 所有动作结束，末值精确
    assert!(controller.action_manager().is_empty());
    let root = controller.top_scene().cloned().unwrap();

    let hero = root.child_with_tag(1).unwrap();
    let hero = hero.borrow();
    assert_eq!(hero.rect.origin, Vector2::new(220.0, 100.0));
    assert_eq!(hero.rotation, std::f32::consts::PI);
    assert_eq!(hero.opacity, 0.25);
    assert_eq!(hero.sprite, Some(Sprite::new("hero/idle_1.png")));

    let block = root.child_with_tag(2).unwrap();
    let block = block.borrow();
    assert_eq!(block.scale, Vector2::new(2.0, 2.0));
    assert_eq!(block.rect.origin, Vector2::new(140.0, 160.0));
}
