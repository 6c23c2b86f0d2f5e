use assert_cmd::Command;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[derive(Debug)]
pub struct CliRun {
    pub stdout: String,
    pub stderr: String,
    pub status: std::process::ExitStatus,
}

impl CliRun {
    /// Structured error document printed on stderr.
    pub fn error_json(&self) -> serde_json::Value {
        let start = self
            .stderr
            .rfind("{\n  \"error\"")
            .expect("JSON error on stderr");
        serde_json::from_str(&self.stderr[start..]).expect("valid error JSON")
    }
}

/// Isolated working directory that doubles as `$HOME`.
pub struct Workspace {
    pub temp_dir: TempDir,
    pub root: PathBuf,
}

impl Workspace {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("temp dir");
        let root = temp_dir.path().to_path_buf();
        Self { temp_dir, root }
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.root.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).expect("parent dir");
        }
        fs::write(&path, contents).expect("write file");
        path
    }

    pub fn out_dir(&self) -> PathBuf {
        self.root.join("allure-results")
    }

    /// File names in `dir`, sorted.
    pub fn list(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(dir)
            .expect("read dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Parsed JSON documents in `dir` whose names end with `suffix`.
    pub fn documents(dir: &Path, suffix: &str) -> Vec<serde_json::Value> {
        Self::list(dir)
            .into_iter()
            .filter(|name| name.ends_with(suffix))
            .map(|name| {
                let text = fs::read_to_string(dir.join(name)).expect("read document");
                serde_json::from_str(&text).expect("valid JSON document")
            })
            .collect()
    }
}

pub fn run<I, S>(workspace: &Workspace, args: I) -> CliRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    run_with_env(workspace, args, std::iter::empty::<(String, String)>())
}

pub fn run_with_env<I, S, E, K, V>(workspace: &Workspace, args: I, env_vars: E) -> CliRun
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
    E: IntoIterator<Item = (K, V)>,
    K: AsRef<OsStr>,
    V: AsRef<OsStr>,
{
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("maestro-allure"));
    cmd.current_dir(&workspace.root);
    cmd.env_remove("BROWSERSTACK_USERNAME");
    cmd.env_remove("BROWSERSTACK_ACCESS_KEY");
    for (key, _) in std::env::vars() {
        if key.starts_with("MAESTRO_ALLURE_") {
            cmd.env_remove(key);
        }
    }
    cmd.env("HOME", &workspace.root);
    cmd.env("RUST_LOG", "maestro_allure=debug");
    cmd.args(args);
    cmd.envs(env_vars);

    let output = cmd.output().expect("run maestro-allure");
    CliRun {
        stdout: String::from_utf8_lossy(&output.stdout).to_string(),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        status: output.status,
    }
}
