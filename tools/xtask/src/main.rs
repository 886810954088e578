//! # xtask - 开发辅助工具
//!
//! 提供本地质量门禁与开发辅助命令。
//!
//! ## 命令
//!
//! - `check-all`: 运行 fmt、clippy、test
//! - `cov-runtime`: 运行 sra-runtime 覆盖率
//! - `cov-workspace`: 运行 workspace 覆盖率
//! - `scene-check`: 检查场景描述文件（格式、动作参数、精灵引用）

use std::path::{Path, PathBuf};
use std::process::{Command, ExitCode};

use sra_runtime::SceneDesc;
use walkdir::WalkDir;

fn run(step: &str, cmd: &mut Command) -> anyhow::Result<()> {
    eprintln!("\n==> {step}");
    let status = cmd.status()?;
    if !status.success() {
        anyhow::bail!("{step} failed with {status}");
    }
    Ok(())
}

fn ensure_cargo_llvm_cov_available() -> anyhow::Result<()> {
    let mut cmd = Command::new("cargo");
    cmd.args(["llvm-cov", "--version"]);
    match cmd.status() {
        Ok(s) if s.success() => Ok(()),
        _ => anyhow::bail!(
            "cargo llvm-cov 不可用。\n\
请先安装：\n\
  - cargo install cargo-llvm-cov\n\
  - rustup component add llvm-tools-preview\n\
然后重试。"
        ),
    }
}

fn main() -> ExitCode {
    if let Err(e) = real_main() {
        eprintln!("xtask error: {e:#}");
        return ExitCode::from(1);
    }
    ExitCode::from(0)
}

fn real_main() -> anyhow::Result<()> {
    let mut args = std::env::args().skip(1);
    let sub = args.next().unwrap_or_else(|| "help".to_string());

    match sub.as_str() {
        "check-all" => {
            let mut fmt = Command::new("cargo");
            fmt.args(["fmt", "--all", "--", "--check"]);
            run("cargo fmt --all -- --check", &mut fmt)?;

            let mut clippy = Command::new("cargo");
            clippy.args(["clippy", "--workspace", "--all-targets"]);
            run("cargo clippy --workspace --all-targets", &mut clippy)?;

            let mut test = Command::new("cargo");
            test.args(["test", "--workspace"]);
            run("cargo test --workspace", &mut test)?;

            scene_check(None)?;
        }
        "cov-runtime" => {
            ensure_cargo_llvm_cov_available()?;

            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "-p", "sra-runtime", "--html"]);
            run("cargo llvm-cov -p sra-runtime --html", &mut cov)?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "cov-workspace" => {
            ensure_cargo_llvm_cov_available()?;

            // 排除 xtask，只统计运行时与宿主
            let mut cov = Command::new("cargo");
            cov.args(["llvm-cov", "--workspace", "--exclude", "xtask", "--html"]);
            run(
                "cargo llvm-cov --workspace --exclude xtask --html",
                &mut cov,
            )?;

            eprintln!("\nCoverage HTML: target/llvm-cov/html/index.html");
        }
        "scene-check" => {
            let path = args.next();
            scene_check(path.as_deref())?;
        }
        "help" | "-h" | "--help" => {
            print_help();
        }
        other => anyhow::bail!("unknown xtask subcommand: {other}"),
    }

    Ok(())
}

fn print_help() {
    eprintln!(
        r#"xtask - 开发辅助工具

USAGE:
  cargo run -p xtask -- <command>

COMMANDS:
  check-all       运行 fmt、clippy、test 门禁检查，并检查场景描述
  cov-runtime     运行 sra-runtime 覆盖率报告
  cov-workspace   运行 workspace 覆盖率报告
  scene-check     检查场景描述文件

SCENE-CHECK:
  cargo run -p xtask -- scene-check [path]

  不带参数：检查 demos/scenes/ 下所有 .json 文件
  带路径参数：检查指定文件或目录

  检查内容：
    - JSON 格式与字段
    - 动作参数（缓动函数、速率、帧序列）
    - 精灵文件是否存在（相对 demos/assets/）
"#
    );
}

//=============================================================================
// scene-check 命令实现
//=============================================================================

/// 场景检查配置
struct SceneCheckConfig {
    /// 场景目录（相对于 workspace root）
    scenes_dir: PathBuf,
    /// 资源根目录（相对于 workspace root）
    assets_root: PathBuf,
}

impl Default for SceneCheckConfig {
    fn default() -> Self {
        Self {
            scenes_dir: PathBuf::from("demos/scenes"),
            assets_root: PathBuf::from("demos/assets"),
        }
    }
}

/// 场景检查结果
#[derive(Default)]
struct SceneCheckResult {
    scenes_checked: usize,
    entities: usize,
    actions: usize,
    errors: Vec<String>,
    missing_sprites: Vec<MissingSprite>,
}

struct MissingSprite {
    scene_id: String,
    path: PathBuf,
}

fn scene_check(path: Option<&str>) -> anyhow::Result<()> {
    let config = SceneCheckConfig::default();

    let files = match path {
        Some(p) => {
            let path = PathBuf::from(p);
            if path.is_file() {
                vec![path]
            } else if path.is_dir() {
                collect_scene_files(&path)
            } else {
                anyhow::bail!("路径不存在: {}", p);
            }
        }
        None => {
            if !config.scenes_dir.exists() {
                anyhow::bail!(
                    "默认场景目录不存在: {}\n请在 workspace 根目录运行，或指定场景路径",
                    config.scenes_dir.display()
                );
            }
            collect_scene_files(&config.scenes_dir)
        }
    };

    if files.is_empty() {
        eprintln!("未找到场景文件（.json）");
        return Ok(());
    }

    eprintln!("==> 检查 {} 个场景文件...\n", files.len());

    let mut result = SceneCheckResult::default();
    for file in &files {
        check_scene_file(file, &config, &mut result);
    }

    print_check_result(&result);

    if !result.errors.is_empty() {
        anyhow::bail!("场景检查发现错误");
    }
    Ok(())
}

fn collect_scene_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    files.sort();
    files
}

fn check_scene_file(file: &Path, config: &SceneCheckConfig, result: &mut SceneCheckResult) {
    let scene_id = file.display().to_string();
    result.scenes_checked += 1;

    let desc = match SceneDesc::load(file) {
        Ok(d) => d,
        Err(e) => {
            result.errors.push(format!("{scene_id}: {e}"));
            return;
        }
    };

    // 构建一次以校验动作参数
    match desc.build() {
        Ok(scene) => {
            result.entities += desc.root.entity_count();
            result.actions += scene.bindings.len();
        }
        Err(e) => {
            result.errors.push(format!("{scene_id}: {e}"));
            return;
        }
    }

    for sprite in desc.sprite_references() {
        let path = config.assets_root.join(sprite.key());
        if !path.exists() {
            result.missing_sprites.push(MissingSprite {
                scene_id: scene_id.clone(),
                path,
            });
        }
    }
}

fn print_check_result(result: &SceneCheckResult) {
    eprintln!("─────────────────────────────────────────────────────");
    eprintln!(
        "检查完成: {} 个场景, {} 个实体, {} 个动作",
        result.scenes_checked, result.entities, result.actions
    );
    eprintln!();

    for error in &result.errors {
        eprintln!("[ERROR] {error}");
    }
    for missing in &result.missing_sprites {
        eprintln!(
            "[WARN] {}: 精灵不存在 {}",
            missing.scene_id,
            missing.path.display()
        );
    }

    let error_count = result.errors.len();
    let warn_count = result.missing_sprites.len();

    eprintln!();
    if error_count > 0 {
        eprintln!("❌ {} 个错误, {} 个警告", error_count, warn_count);
    } else if warn_count > 0 {
        eprintln!("⚠️  0 个错误, {} 个警告", warn_count);
    } else {
        eprintln!("✅ 检查通过，无错误");
    }
}
