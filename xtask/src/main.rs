mod assets;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use mv3_starter::config::ExtensionConfig;
use std::fs;
use std::path::Path;
use std::process::{Command, Stdio};

const CONFIG_PATH: &str = "extension/extension.toml";
const DIST_DIR: &str = "dist";
const EXTENSION_PACKAGE: &str = "mv3-starter-extension";
const WASM_TARGET: &str = "wasm32-unknown-unknown";

#[derive(Parser)]
#[command(name = "xtask")]
#[command(about = "MV3 starter task runner", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the unpacked extension into dist/
    Build {
        /// Optimized build
        #[arg(short, long)]
        release: bool,
    },

    /// Print (or write) the generated manifest.json
    Manifest {
        /// Write to this path instead of stdout
        #[arg(short, long)]
        out: Option<String>,
    },

    /// Run all Rust tests
    Test,

    /// Run clippy linter
    Clippy,

    /// Remove dist/
    Clean,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Build { release } => build(release),
        Commands::Manifest { out } => manifest(out),
        Commands::Test => test(),
        Commands::Clippy => clippy(),
        Commands::Clean => clean(),
    }
}

fn build(release: bool) -> Result<()> {
    let config = ExtensionConfig::load(CONFIG_PATH)?;
    let profile = if release { "release" } else { "debug" };

    println!("🔨 Building UI bundle ({})...", profile);
    cargo_wasm(release, &["--lib"])?;
    bindgen(
        &wasm_artifact(profile, "mv3_starter"),
        "web",
        &format!("{}/pkg", DIST_DIR),
        assets::APP_BUNDLE,
    )?;

    println!("🔨 Building background worker ({})...", profile);
    cargo_wasm(release, &["--bin", "background", "--no-default-features"])?;
    bindgen(
        &wasm_artifact(profile, "background"),
        "no-modules",
        DIST_DIR,
        assets::BACKGROUND_BUNDLE,
    )?;

    println!("📝 Writing manifest and pages...");
    write_file("manifest.json", &manifest_json(&config)?)?;
    write_file(&config.pages.popup, &assets::page_html(&config.extension.name))?;
    write_file(&config.pages.options, &assets::page_html("Options"))?;
    write_file(assets::APP_LOADER, &assets::app_loader())?;
    write_file(assets::SERVICE_WORKER, &assets::service_worker())?;

    println!();
    println!("✅ Extension built in {}/", DIST_DIR);
    println!("   Load it from chrome://extensions (Developer mode → Load unpacked)");

    Ok(())
}

fn manifest(out: Option<String>) -> Result<()> {
    let config = ExtensionConfig::load(CONFIG_PATH)?;
    let json = manifest_json(&config)?;

    match out {
        Some(path) => {
            fs::write(&path, json).with_context(|| format!("Failed to write {}", path))?;
            println!("✅ Wrote {}", path);
        }
        None => println!("{}", json),
    }

    Ok(())
}

fn test() -> Result<()> {
    println!("🧪 Running all tests...");
    run_cmd("cargo", &["test", "--workspace"])?;
    Ok(())
}

fn clippy() -> Result<()> {
    println!("🔍 Running clippy on workspace (warnings as errors)...");
    run_cmd(
        "cargo",
        &[
            "clippy",
            "--workspace",
            "--all-targets",
            "--",
            "-D",
            "warnings",
        ],
    )?;

    println!("🔍 Running clippy on the wasm32 build...");
    run_cmd(
        "cargo",
        &[
            "clippy",
            "-p",
            EXTENSION_PACKAGE,
            "--target",
            WASM_TARGET,
            "--",
            "-D",
            "warnings",
        ],
    )?;
    Ok(())
}

fn clean() -> Result<()> {
    println!("🧹 Removing {}/...", DIST_DIR);
    if Path::new(DIST_DIR).exists() {
        fs::remove_dir_all(DIST_DIR).context("Failed to remove dist directory")?;
    }
    Ok(())
}

fn manifest_json(config: &ExtensionConfig) -> Result<String> {
    serde_json::to_string_pretty(&assets::manifest(config)).context("Failed to encode manifest")
}

fn cargo_wasm(release: bool, extra: &[&str]) -> Result<()> {
    let mut args = vec!["build", "-p", EXTENSION_PACKAGE, "--target", WASM_TARGET];
    if release {
        args.push("--release");
    }
    args.extend_from_slice(extra);
    run_cmd("cargo", &args)
}

fn bindgen(wasm: &str, target: &str, out_dir: &str, out_name: &str) -> Result<()> {
    run_cmd(
        "wasm-bindgen",
        &[
            wasm,
            "--target",
            target,
            "--out-dir",
            out_dir,
            "--out-name",
            out_name,
            "--no-typescript",
        ],
    )
}

fn wasm_artifact(profile: &str, name: &str) -> String {
    format!("target/{}/{}/{}.wasm", WASM_TARGET, profile, name)
}

fn write_file(name: &str, content: &str) -> Result<()> {
    fs::create_dir_all(DIST_DIR).context("Failed to create dist directory")?;
    let path = format!("{}/{}", DIST_DIR, name);
    fs::write(&path, content).with_context(|| format!("Failed to write {}", path))?;
    println!("  ✅ Created {}", path);
    Ok(())
}

// Helper functions
fn run_cmd(program: &str, args: &[&str]) -> Result<()> {
    let status = Command::new(program)
        .args(args)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .status()
        .with_context(|| format!("Failed to run: {} {}", program, args.join(" ")))?;

    if !status.success() {
        anyhow::bail!("Command failed: {} {}", program, args.join(" "));
    }

    Ok(())
}
