//! # sra-host
//!
//! 无头宿主：加载场景描述，以固定帧率驱动 Controller，把绘制指令记录到
//! [`RecordingContext`]（可选打印到 stdout）。
//!
//! ## 用法
//!
//! ```bash
//! cargo run -p host-cli
//! cargo run -p host-cli -- --scene demos/scenes/demo.json --ticks 120 --print-draw-calls
//! cargo run -p host-cli -- --fast --log-level debug
//! ```

mod config;

use std::path::PathBuf;
use std::process::ExitCode;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Context;
use clap::Parser;
use sra_runtime::{Controller, RecordingContext, SceneDesc, TickStatus};
use tracing::{debug, info, warn};

use config::HostConfig;

#[derive(Parser, Debug)]
#[command(name = "sra-host")]
#[command(about = "SRA 无头宿主 - 播放 JSON 场景描述")]
#[command(version)]
struct Cli {
    /// 配置文件
    #[arg(short, long, default_value = "demos/config.json")]
    config: PathBuf,

    /// 场景描述文件（覆盖配置）
    #[arg(short, long)]
    scene: Option<PathBuf>,

    /// 最多运行的帧数（覆盖配置）
    #[arg(short, long)]
    ticks: Option<u32>,

    /// 帧率（覆盖配置）
    #[arg(long)]
    fps: Option<f32>,

    /// 日志级别（覆盖配置）
    #[arg(long)]
    log_level: Option<String>,

    /// 打印每帧的绘制指令
    #[arg(long)]
    print_draw_calls: bool,

    /// 不等待真实时间，按帧间隔推进虚拟时钟
    #[arg(long)]
    fast: bool,
}

impl Cli {
    fn apply_to(&self, config: &mut HostConfig) {
        if let Some(scene) = &self.scene {
            config.scene_path = scene.clone();
        }
        if let Some(ticks) = self.ticks {
            config.ticks = ticks;
        }
        if let Some(fps) = self.fps {
            config.runtime.frame_rate = fps;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        if self.print_draw_calls {
            config.print_draw_calls = true;
        }
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("sra-host error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn real_main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let file_config = HostConfig::read(&cli.config)?;
    let found = file_config.is_some();
    let mut config = file_config.unwrap_or_default();
    cli.apply_to(&mut config);
    config.validate()?;

    init_logging(&config.log_level)?;
    if found {
        info!(path = %cli.config.display(), "配置文件加载成功");
    } else {
        warn!(path = %cli.config.display(), "配置文件不存在，使用默认配置");
    }

    run(&config, cli.fast)
}

fn init_logging(level: &str) -> anyhow::Result<()> {
    let level: tracing::Level = level
        .parse()
        .map_err(|_| anyhow::anyhow!("未知的日志级别: {level}"))?;
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .init();
    Ok(())
}

fn load_scene(config: &HostConfig) -> anyhow::Result<SceneDesc> {
    let path = &config.scene_path;
    let desc = SceneDesc::load(path)
        .with_context(|| format!("加载场景描述失败: {}", path.display()))?;

    for sprite in desc.sprite_references() {
        let file = config.assets_root.join(sprite.key());
        if !file.exists() {
            warn!(sprite = %sprite, path = %file.display(), "精灵文件不存在");
        }
    }
    Ok(desc)
}

/// 启动运行循环；`start_paused` 时保持暂停并返回 `false`
fn start_playback(controller: &mut Controller) -> anyhow::Result<bool> {
    if controller.is_paused() {
        info!("start_paused 已开启，不启动播放");
        return Ok(false);
    }
    if !controller.run() {
        anyhow::bail!("帧率无效，无法启动运行循环: {}", controller.frame_rate());
    }
    Ok(true)
}

fn run(config: &HostConfig, fast: bool) -> anyhow::Result<()> {
    let desc = load_scene(config)?;
    let scene = desc
        .build()
        .with_context(|| format!("场景构建失败: {}", config.scene_path.display()))?;

    let mut controller = Controller::new(config.runtime.clone());
    let ids = scene.install(&mut controller);
    info!(
        scene = desc.name.as_deref().unwrap_or("<unnamed>"),
        actions = ids.len(),
        fps = controller.frame_rate(),
        "场景已加载"
    );

    if !start_playback(&mut controller)? {
        return Ok(());
    }
    let interval = controller
        .run_loop()
        .tick_interval()
        .unwrap_or(Duration::from_millis(16));

    let mut ctx = RecordingContext::new();
    let start = Instant::now();
    let mut frames = 0u32;
    let mut draw_calls = 0usize;

    while frames < config.ticks && controller.is_running() {
        let frame_start = Instant::now();
        let now = if fast { start + interval * frames } else { frame_start };

        match controller.tick_at(now, &mut ctx) {
            TickStatus::Rendered { delta } => {
                frames += 1;
                draw_calls += ctx.calls().len();
                debug!(frame = frames, delta = delta, calls = ctx.calls().len(), "frame");
                if config.print_draw_calls {
                    println!("# frame {frames}");
                    for line in ctx.lines() {
                        println!("{line}");
                    }
                }
                ctx.clear();
            }
            TickStatus::Stopped(reason) => {
                info!(reason = ?reason, "运行循环已停止");
                break;
            }
        }

        // 所有动作结束后弹出场景，下一帧停止运行循环
        if controller.action_manager().is_empty() && controller.scene_count() > 0 {
            info!(frame = frames, "所有动作已完成");
            controller.pop_scene();
        }

        if !fast {
            thread::sleep(interval.saturating_sub(frame_start.elapsed()));
        }
    }

    info!(
        frames = frames,
        draw_calls = draw_calls,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "播放结束"
    );
    Ok(())
}
