//! Environment readiness check.

use anyhow::Result;

use crate::portal::chromium::find_chromium;

/// Environment variables a run requires.
const REQUIRED_ENV: [&str; 6] = [
    "ERP_USERNAME",
    "ERP_PASSWORD",
    "BOT_TOKEN",
    "CHAT_ID",
    "GH_TOKEN",
    "GITHUB_REPOSITORY",
];

/// Check credentials and browser availability without running anything.
pub async fn run() -> Result<()> {
    println!("Rollcall Doctor");
    println!("===============");
    println!();

    let os = std::env::consts::OS;
    let arch = std::env::consts::ARCH;
    println!("OS:   {os}");
    println!("Arch: {arch}");
    println!();

    // Credentials — presence only, values are never printed.
    let mut env_ok = true;
    for name in REQUIRED_ENV {
        match std::env::var(name) {
            Ok(v) if !v.trim().is_empty() => println!("[OK] {name} is set"),
            _ => {
                env_ok = false;
                println!("[!!] {name} is NOT set");
            }
        }
    }
    println!();

    // Browser
    let chromium_path = find_chromium();
    match &chromium_path {
        Some(path) => println!("[OK] Chromium found: {}", path.display()),
        None => println!(
            "[!!] Chromium NOT found. Install google-chrome or set ROLLCALL_CHROMIUM_PATH."
        ),
    }

    println!();
    if env_ok && chromium_path.is_some() {
        println!("Status: READY");
    } else {
        println!("Status: NOT READY");
    }

    Ok(())
}
