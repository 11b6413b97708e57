// ---------------------------------------------------------------------------
// End-to-end tests for vterm-vsh
//
// Most tests drive `Shell::execute` directly; the last few spawn the binary
// with `--script` and `--vfs`.
// ---------------------------------------------------------------------------

use std::io::Write;
use std::process::{Command, Stdio};

use vterm_vsh::{CommandOutput, Shell};

fn shell() -> Shell {
    Shell::with_default_tree()
}

fn ok(shell: &mut Shell, line: &str) -> String {
    let out = shell.execute(line);
    assert!(!out.error, "`{line}` failed: {}", out.output);
    out.output
}

fn err(shell: &mut Shell, line: &str) -> String {
    let out = shell.execute(line);
    assert!(out.error, "`{line}` unexpectedly succeeded: {}", out.output);
    out.output
}

// ---------------------------------------------------------------------------
// Navigation
// ---------------------------------------------------------------------------

#[test]
fn ls_cd_pwd() {
    let mut sh = shell();
    assert_eq!(ok(&mut sh, "ls /home/user"), ".\t..\tfile1.txt\tfile2.txt");
    ok(&mut sh, "cd /home/user");
    ok(&mut sh, "cd ..");
    assert_eq!(ok(&mut sh, "pwd"), "/home");
    assert_eq!(ok(&mut sh, "ls"), ".\t..\tuser\tbin");
}

#[test]
fn command_names_are_case_insensitive() {
    let mut sh = shell();
    assert_eq!(ok(&mut sh, "PWD"), "/");
}

#[test]
fn cd_into_file_reports_error() {
    let mut sh = shell();
    assert_eq!(
        err(&mut sh, "cd /home/user/file1.txt"),
        "cd: no such directory: /home/user/file1.txt"
    );
    assert_eq!(ok(&mut sh, "pwd"), "/");
}

#[test]
fn quoted_arguments() {
    let mut sh = shell();
    ok(&mut sh, r#"mkdir "/home/My Documents""#);
    ok(&mut sh, "cd 'home/My Documents'");
    assert_eq!(ok(&mut sh, "pwd"), "/home/My Documents");
    assert_eq!(err(&mut sh, r#"cd "unclosed"#), "vsh: Unclosed quotes in command");
}

// ---------------------------------------------------------------------------
// Files and directories
// ---------------------------------------------------------------------------

#[test]
fn cat_prints_content() {
    let mut sh = shell();
    assert_eq!(ok(&mut sh, "cat /home/user/file1.txt"), "Hello from VFS!");
    assert_eq!(err(&mut sh, "cat /home/user"), "cat: no such file: /home/user");
}

#[test]
fn touch_creates_empty_files() {
    let mut sh = shell();
    ok(&mut sh, "touch /home/bin/a /home/bin/b");
    assert_eq!(ok(&mut sh, "ls /home/bin"), ".\t..\ta\tb");
    assert_eq!(ok(&mut sh, "cat /home/bin/a"), "");
}

#[test]
fn mkdir_parents_flag() {
    let mut sh = shell();
    assert_eq!(err(&mut sh, "mkdir /tmp/a/b"), "mkdir: no such directory: /tmp");
    ok(&mut sh, "mkdir -p /tmp/a/b");
    ok(&mut sh, "cd /tmp/a/b");
    ok(&mut sh, "mkdir --parents /tmp/x/y");
    assert_eq!(ok(&mut sh, "ls /tmp"), ".\t..\ta\tx");
}

#[test]
fn multi_path_commands_continue_past_failures() {
    let mut sh = shell();
    let out = sh.execute("mkdir /home/user /home/new /nope/deep");
    assert!(out.error);
    assert_eq!(
        out.output,
        "mkdir: directory already exists: /home/user\nmkdir: no such directory: /nope"
    );
    assert!(sh.vfs().exists("/home/new").unwrap());
}

#[test]
fn rm_and_rmdir() {
    let mut sh = shell();
    assert_eq!(
        err(&mut sh, "rm /home/user"),
        "rm: directory not empty: /home/user"
    );
    ok(&mut sh, "rm /home/user/file1.txt");
    ok(&mut sh, "rm -r /home/user");
    assert_eq!(
        err(&mut sh, "rmdir /home"),
        "rmdir: directory not empty: /home"
    );
    ok(&mut sh, "rmdir /home/bin");
    assert_eq!(ok(&mut sh, "ls /home"), ".\t..");
}

#[test]
fn rm_refuses_cwd_ancestor() {
    let mut sh = shell();
    ok(&mut sh, "mkdir /home/user/sub");
    ok(&mut sh, "cd /home/user/sub");
    assert_eq!(
        err(&mut sh, "rm -r /home/user"),
        "rm: directory is busy: /home/user"
    );
}

#[test]
fn mv_rename_and_move_many() {
    let mut sh = shell();
    ok(&mut sh, "mv /home/user/file1.txt /home/user/renamed.txt");
    assert_eq!(ok(&mut sh, "ls /home/user"), ".\t..\tfile2.txt\trenamed.txt");

    ok(&mut sh, "cd /home/user");
    ok(&mut sh, "mv file2.txt renamed.txt ../bin");
    assert_eq!(ok(&mut sh, "ls /home/bin"), ".\t..\tfile2.txt\trenamed.txt");
    assert_eq!(ok(&mut sh, "ls"), ".\t..");
}

#[test]
fn mv_many_needs_existing_directory() {
    let mut sh = shell();
    let out = err(&mut sh, "mv /home/user/file1.txt /home/user/file2.txt /home/new");
    assert_eq!(
        out,
        "mv: no such directory: /home/new\nmv: no such directory: /home/new"
    );
}

// ---------------------------------------------------------------------------
// Session control and argument checks
// ---------------------------------------------------------------------------

#[test]
fn unknown_command() {
    let mut sh = shell();
    assert_eq!(err(&mut sh, "chmod 777 /"), "command not found: chmod");
}

#[test]
fn arity_is_checked() {
    let mut sh = shell();
    assert_eq!(err(&mut sh, "cd"), "cd: Too few arguments. Expected at least 1");
    assert_eq!(err(&mut sh, "pwd /"), "pwd: Too many arguments. Expected at most 0");
    assert_eq!(err(&mut sh, "mkdir -p"), "mkdir: Too few arguments. Expected at least 1");
    assert_eq!(err(&mut sh, "mv /a"), "mv: Too few arguments. Expected at least 2");
}

#[test]
fn help_flag_prints_description() {
    let mut sh = shell();
    assert_eq!(ok(&mut sh, "rm --help"), "Remove files or directories (use -r for directories)");
    assert_eq!(ok(&mut sh, "cd -h"), "Change the current working directory");
    assert_eq!(ok(&mut sh, "help mv"), "Move files and directories");
    assert!(ok(&mut sh, "help").lines().any(|l| l.starts_with("rmdir")));
}

#[test]
fn clear_and_exit() {
    let mut sh = shell();
    assert_eq!(
        sh.execute("clear"),
        CommandOutput {
            output: String::new(),
            error: false,
            clear: true
        }
    );
    assert!(sh.is_running());
    assert_eq!(ok(&mut sh, "exit"), "Exiting terminal...");
    assert!(!sh.is_running());
}

#[test]
fn blank_input_does_nothing() {
    let mut sh = shell();
    assert_eq!(sh.execute("   "), CommandOutput::default());
}

// ---------------------------------------------------------------------------
// Binary
// ---------------------------------------------------------------------------

fn run_binary(args: &[&str]) -> String {
    let out = Command::new(env!("CARGO_BIN_EXE_vterm-vsh"))
        .args(args)
        .env_remove("VTERM_VFS")
        .env_remove("VTERM_SCRIPT")
        .env_remove("VTERM_STRICT_PARENT")
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::null())
        .output()
        .expect("failed to run vterm-vsh");
    String::from_utf8(out.stdout).unwrap()
}

fn temp_file(suffix: &str, content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn binary_runs_script_against_document() {
    let doc = temp_file(
        ".json",
        r#"{"vfs": [{"name": "etc", "type": "directory", "children": [
            {"name": "motd", "type": "file", "content": "welcome"}
        ]}]}"#,
    );
    let script = temp_file(".vsh", "cat /etc/motd\nexit\n");
    let stdout = run_binary(&[
        "--vfs",
        doc.path().to_str().unwrap(),
        "--script",
        script.path().to_str().unwrap(),
    ]);
    assert_eq!(stdout, "$ cat /etc/motd\nwelcome\n$ exit\nExiting terminal...\n");
}

#[test]
fn binary_falls_back_to_default_tree() {
    let doc = temp_file(".json", r#"{"nodes": []}"#);
    let script = temp_file(".vsh", "ls /home\nexit\n");
    let stdout = run_binary(&[
        "--vfs",
        doc.path().to_str().unwrap(),
        "--script",
        script.path().to_str().unwrap(),
    ]);
    assert_eq!(stdout, "$ ls /home\n.\t..\tuser\tbin\n$ exit\nExiting terminal...\n");
}
