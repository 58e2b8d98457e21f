use std::{env, path::Path, process::Command, str::from_utf8};

/// Runs a command and returns its trimmed stdout if it succeeded.
fn command_output(program: &str, args: &[&str]) -> Option<String> {
    let output = Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())?;
    from_utf8(&output.stdout)
        .ok()
        .map(|stdout| stdout.trim().to_owned())
}

fn main() {
    let rustc = env::var("RUSTC").unwrap_or_else(|_| "rustc".to_owned());

    let version = Some(())
        .filter(|_| Path::new("../.git").exists())
        .and_then(|_| {
            command_output(
                "git",
                &["describe", "--tags", "--match=v[0-9]*", "--dirty=-d", "--always"],
            )
        })
        .map(|version| version.trim_start_matches('v').to_owned())
        .unwrap_or_else(|| env::var("CARGO_PKG_VERSION").unwrap_or_default());

    let rustc_version =
        command_output(&rustc, &["--version"]).unwrap_or_else(|| "unknown rustc".to_owned());

    println!("cargo:rustc-env=CHAFF_VERSION={}", version);
    println!("cargo:rustc-env=CHAFF_RUSTC_VERSION={}", rustc_version);
    println!(
        "cargo:rustc-env=CHAFF_PROFILE={}",
        env::var("PROFILE").unwrap_or_default()
    );
}
