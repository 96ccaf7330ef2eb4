// Drives the compiled binary through a PTY: start, draw nothing, quit.
//
// Notes:
// - Requires a TTY; uses expectrl which allocates a pseudo terminal.
// - Unix-only and ignored by default.
// - Run manually via: `cargo test --test integration_min_session -- --ignored`.

#![cfg(unix)]

use std::time::Duration;

use expectrl::{spawn, Eof};

#[test]
#[ignore]
fn minimal_session_starts_and_exits() -> Result<(), Box<dyn std::error::Error>> {
    let bin = assert_cmd::cargo::cargo_bin("inkreplay");
    let cmd = format!("{} --speed 2", bin.display());

    let mut p = spawn(cmd)?;

    // let the alternate screen and mouse capture come up
    std::thread::sleep(Duration::from_millis(200));

    // replay with nothing drawn only raises a warning
    p.send("p")?;
    std::thread::sleep(Duration::from_millis(100));

    p.send("\x1b")?; // ESC

    p.expect(Eof)?;
    Ok(())
}
