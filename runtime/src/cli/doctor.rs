//! Environment readiness check.

use crate::config::{RendererBackend, ServiceConfig};
use crate::renderer::chromium::find_chromium;
use anyhow::Result;
use std::path::{Path, PathBuf};

/// Check that the configured renderer can actually run.
pub async fn run(config: &ServiceConfig) -> Result<()> {
    println!("smart-scraper doctor");
    println!("====================");
    println!();

    println!("OS:   {}", std::env::consts::OS);
    println!("Arch: {}", std::env::consts::ARCH);
    println!("Listen:         {}:{}", config.host, config.port);
    println!("Fetch timeout:  {}ms", config.fetch_timeout.as_millis());
    println!("Render timeout: {}ms", config.render_timeout.as_millis());
    println!("Renderer:       {:?}", config.renderer);
    println!();

    let chromium = find_chromium(config.chromium_path.as_deref());
    match &chromium {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!("[!!] Chromium NOT found. Set SCRAPER_CHROMIUM_PATH or install Chrome."),
    }

    let command = &config.renderer_command;
    let program = resolve_program(&command.program);
    match &program {
        Some(path) => println!(
            "[OK] Renderer command: {} {}",
            path.display(),
            command.args.join(" ")
        ),
        None => println!(
            "[!!] Renderer command not found: {}",
            command.program.display()
        ),
    }

    let uses_builtin = command.args.first().map(String::as_str) == Some("render")
        && std::env::current_exe().ok().as_deref() == Some(command.program.as_path());

    let ready = match config.renderer {
        RendererBackend::Chromium => chromium.is_some() || program.is_some(),
        RendererBackend::Process if uses_builtin => chromium.is_some(),
        RendererBackend::Process => program.is_some(),
    };

    println!();
    if ready {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY (dynamic pages will fail; static pages still work)");
    }

    Ok(())
}

/// Resolve a program the way the OS would when spawning it.
fn resolve_program(program: &Path) -> Option<PathBuf> {
    if program.components().count() > 1 {
        return program.exists().then(|| program.to_path_buf());
    }
    which::which(program).ok()
}
