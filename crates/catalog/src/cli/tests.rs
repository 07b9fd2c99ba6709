use std::ffi::OsString;
use std::fs;

use tracing_subscriber::filter::LevelFilter;

use super::{
    PROGRAM, default_defs_path, default_init_path, parse_args, render_help, run, verbosity_level,
};

fn run_with(args: &[OsString]) -> (i32, String, String) {
    let mut stdout = Vec::new();
    let mut stderr = Vec::new();
    let status = run(args.iter().cloned(), &mut stdout, &mut stderr);
    (
        status,
        String::from_utf8(stdout).unwrap(),
        String::from_utf8(stderr).unwrap(),
    )
}

fn os(values: &[&str]) -> Vec<OsString> {
    values.iter().map(OsString::from).collect()
}

#[test]
fn parse_collects_options_and_files() {
    let parsed = parse_args(os(&[
        PROGRAM, "-L", "net", "-H", "d.rs", "--init", "i.rs", "-vv", "a.cat", "b.cat", "-v",
    ]))
    .unwrap();
    assert_eq!(parsed.lib.as_deref(), Some("net"));
    assert_eq!(parsed.defs.as_deref(), Some(std::path::Path::new("d.rs")));
    assert_eq!(parsed.init.as_deref(), Some(std::path::Path::new("i.rs")));
    assert_eq!(parsed.verbosity, 3);
    assert_eq!(parsed.inputs.len(), 2);
    assert!(!parsed.show_help);
}

#[test]
fn verbosity_maps_to_levels() {
    assert_eq!(verbosity_level(0), LevelFilter::ERROR);
    assert_eq!(verbosity_level(1), LevelFilter::WARN);
    assert_eq!(verbosity_level(2), LevelFilter::INFO);
    assert_eq!(verbosity_level(3), LevelFilter::DEBUG);
    assert_eq!(verbosity_level(9), LevelFilter::DEBUG);
}

#[test]
fn default_output_names_follow_lib() {
    assert_eq!(default_defs_path("net"), std::path::PathBuf::from("net_logdef.rs"));
    assert_eq!(
        default_init_path("net"),
        std::path::PathBuf::from("net_logdef_init.rs")
    );
}

#[test]
fn help_goes_to_stdout() {
    let (status, stdout, stderr) = run_with(&os(&[PROGRAM, "-h"]));
    assert_eq!(status, 0);
    assert!(stdout.contains("--lib"));
    assert!(stdout.contains("--defs"));
    assert!(stderr.is_empty());
    assert_eq!(stdout, render_help());
}

#[test]
fn version_reports_package_version() {
    let (status, stdout, _) = run_with(&os(&[PROGRAM, "--version"]));
    assert_eq!(status, 0);
    assert_eq!(stdout, format!("{PROGRAM} {}\n", env!("CARGO_PKG_VERSION")));
}

#[test]
fn missing_lib_fails() {
    let (status, stdout, stderr) = run_with(&os(&[PROGRAM, "a.cat"]));
    assert_eq!(status, 1);
    assert!(stdout.is_empty());
    assert_eq!(
        stderr,
        "l4cdefgen: --lib cannot be empty. See l4cdefgen --help\n"
    );

    let (status, _, _) = run_with(&os(&[PROGRAM, "--lib", ""]));
    assert_eq!(status, 1);
}

#[test]
fn unknown_option_fails() {
    let (status, _, stderr) = run_with(&os(&[PROGRAM, "--bogus"]));
    assert_eq!(status, 1);
    assert!(stderr.contains("--bogus"));
}

#[test]
fn generates_both_files() {
    let dir = tempfile::tempdir().unwrap();
    let catalog = dir.path().join("net.cat");
    fs::write(&catalog, "NET \"net\"\nLOG_INFO UP \"up {}\"\n").unwrap();
    let defs = dir.path().join("defs.rs");
    let init = dir.path().join("init.rs");

    let mut args = os(&[PROGRAM, "--lib", "net"]);
    args.extend([
        OsString::from("-H"),
        defs.clone().into_os_string(),
        OsString::from("-C"),
        init.clone().into_os_string(),
        catalog.into_os_string(),
        dir.path().join("missing.cat").into_os_string(),
    ]);
    let (status, _, stderr) = run_with(&args);
    assert_eq!(status, 0, "stderr: {stderr}");

    let defs = fs::read_to_string(defs).unwrap();
    assert!(defs.contains("pub const UP_ID: usize = 0;"));
    let init = fs::read_to_string(init).unwrap();
    assert!(init.contains("pub fn net_init_logdef"));
    assert!(init.contains("ctx.register_message(0, ::l4c::Severity::Info, \"NET_UP\")?;"));
}

#[test]
fn unwritable_output_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut args = os(&[PROGRAM, "-L", "x", "-H"]);
    args.push(dir.path().join("no/such/dir/defs.rs").into_os_string());
    args.push(OsString::from("-C"));
    args.push(dir.path().join("init.rs").into_os_string());

    let (status, _, stderr) = run_with(&args);
    assert_eq!(status, 1);
    assert!(stderr.starts_with("l4cdefgen: cannot write "));
}
