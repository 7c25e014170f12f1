//! Runs tests using actual binary, apapted from 'fd' method: https://github.com/sharkdp/fd/blob/master/tests/testenv/mod.rs
#![allow(dead_code)]
use std::env;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::PathBuf;
use std::process;

/// Interfaces and cameras are empty
pub const NO_CAMERAS_DUMP: &str = "./tests/data/no_cameras.json";
/// One USB3 Vision bus with two Acme cameras, second without a readable model
pub const ACME_USB_DUMP: &str = "./tests/data/acme_usb.json";
/// Four interfaces, two of which fault when queried
pub const MIXED_FAULTS_DUMP: &str = "./tests/data/mixed_faults.json";
/// No interfaces but a camera visible globally
pub const CAMERAS_NO_INTERFACES_DUMP: &str = "./tests/data/cameras_no_interfaces.json";
/// Listing interfaces fails
pub const LIST_FAULT_DUMP: &str = "./tests/data/list_fault.json";
/// Output for [`NO_CAMERAS_DUMP`]
pub const NO_CAMERAS_OUTPUT: &str = "./tests/data/no_cameras.txt";
/// Output for [`CAMERAS_NO_INTERFACES_DUMP`]
pub const CAMERAS_NO_INTERFACES_OUTPUT: &str = "./tests/data/cameras_no_interfaces.txt";
/// Output for [`ACME_USB_DUMP`]
pub const ACME_USB_OUTPUT: &str = "./tests/data/acme_usb.txt";
/// Output for [`ACME_USB_DUMP`] with --verbose
pub const ACME_USB_OUTPUT_VERBOSE: &str = "./tests/data/acme_usb_verbose.txt";
/// Output for [`MIXED_FAULTS_DUMP`]
pub const MIXED_FAULTS_OUTPUT: &str = "./tests/data/mixed_faults.txt";
/// Config disabling colour and the exit pause so that output is stable
pub const TEST_CONFIG: &str = "./tests/data/config.json";

pub fn read_dump(file_name: &str) -> BufReader<File> {
    let f = File::open(file_name).expect("Unable to open dump file");
    BufReader::new(f)
}

pub fn read_dump_to_string(file_name: &str) -> String {
    let mut ret = String::new();
    let mut br = read_dump(file_name);
    br.read_to_string(&mut ret)
        .unwrap_or_else(|_| panic!("Failed to read {}", file_name));
    ret
}

/// Exit code as seen by the parent process for `std::process::exit(code)`
pub fn exit_code(code: i32) -> i32 {
    if cfg!(unix) {
        code & 0xff
    } else {
        code
    }
}

/// Environment for the integration tests.
pub struct TestEnv {
    /// Path to the *camenum* executable.
    camenum_exe: PathBuf,
}

/// Find the *camenum* executable.
fn find_camenum_exe() -> PathBuf {
    // Tests exe is in target/debug/deps, the *camenum* exe is in target/debug
    let root = env::current_exe()
        .expect("tests executable")
        .parent()
        .expect("tests executable directory")
        .parent()
        .expect("camenum executable directory")
        .to_path_buf();

    let exe_name = if cfg!(windows) {
        "camenum.exe"
    } else {
        "camenum"
    };

    root.join(exe_name)
}

/// Format an error message for when the output of *camenum* did not match the expected output.
fn format_output_error(args: &[&str], expected: &str, actual: &str) -> String {
    // Generate diff text.
    let diff_text = diff::lines(expected, actual)
        .into_iter()
        .map(|diff| match diff {
            diff::Result::Left(l) => format!("-{}", l),
            diff::Result::Both(l, _) => format!(" {}", l),
            diff::Result::Right(r) => format!("+{}", r),
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        concat!(
            "`camenum {}` did not produce the expected output.\n",
            "Showing diff between expected and actual:\n{}\n"
        ),
        args.join(" "),
        diff_text
    )
}

/// Format an error message for when *camenum* did not exit with the expected code.
fn format_exit_error(args: &[&str], expected: i32, output: &process::Output) -> String {
    format!(
        "`camenum {}` exited with {:?}, expected {}.\nstdout:\n---\n{}---\nstderr:\n---\n{}---",
        args.join(" "),
        output.status.code(),
        expected,
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    )
}

impl TestEnv {
    pub fn new() -> TestEnv {
        TestEnv {
            camenum_exe: find_camenum_exe(),
        }
    }

    /// Get the path of the camenum executable.
    #[cfg_attr(windows, allow(unused))]
    pub fn test_exe(&self) -> &PathBuf {
        &self.camenum_exe
    }

    /// Run *camenum* replaying `dump_file` with the test config and `args`
    pub fn run(&self, dump_file: Option<&str>, args: &[&str]) -> process::Output {
        let mut cmd = process::Command::new(&self.camenum_exe);
        cmd.arg("--config").arg(TEST_CONFIG);
        if let Some(dump) = dump_file {
            cmd.arg("--from-json").arg(dump);
        }
        cmd.args(args);

        cmd.output().expect("camenum output")
    }

    /// Assert *camenum* exits with `code` and return the output
    pub fn assert_exit_and_get_output(
        &self,
        dump_file: Option<&str>,
        args: &[&str],
        code: i32,
    ) -> process::Output {
        let output = self.run(dump_file, args);
        let expected = exit_code(code);
        if output.status.code() != Some(expected) {
            panic!("{}", format_exit_error(args, expected, &output));
        }

        output
    }

    /// Assert that calling *camenum* with the specified arguments exits with `code` and produces exactly the expected output.
    pub fn assert_output(&self, dump_file: Option<&str>, args: &[&str], expected: &str, code: i32) {
        let output = self.assert_exit_and_get_output(dump_file, args, code);
        let actual = String::from_utf8_lossy(&output.stdout).to_string();

        if expected != actual {
            panic!("{}", format_output_error(args, expected, &actual));
        }
    }

    /// Assert that --json output includes `expected`
    pub fn assert_output_json(
        &self,
        dump_file: Option<&str>,
        args: &[&str],
        expected: serde_json::Value,
        code: i32,
    ) {
        let output = self.assert_exit_and_get_output(dump_file, args, code);
        let actual: serde_json::Value =
            serde_json::from_slice(&output.stdout).expect("camenum --json output");

        assert_json_diff::assert_json_include!(actual: actual, expected: expected);
    }

    /// Assert that calling *camenum* with the specified arguments fails and stderr starts with `expected`
    pub fn assert_failure_with_error(
        &self,
        dump_file: Option<&str>,
        args: &[&str],
        expected: &str,
    ) {
        let output = self.run(dump_file, args);
        if output.status.success() {
            panic!("error '{}' did not occur.", expected);
        }
        let actual_err = String::from_utf8_lossy(&output.stderr);
        if !actual_err.trim_start().starts_with(expected) {
            panic!("{}", format_output_error(args, expected, &actual_err));
        }
    }
}
