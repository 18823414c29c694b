use assert_cmd::{cargo::cargo_bin_cmd, Command};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SCORE_RESPONSE: &str =
    r#"{"base_score": 4, "modifier": "strong", "justification": "clean", "strengths": ["tests"]}"#;

/// Get a Command for codejudge
pub fn codejudge() -> Command {
    cargo_bin_cmd!("codejudge")
}

/// A temporary project with a rubric, a judge config and a canned response
pub struct Project {
    dir: TempDir,
}

impl Project {
    pub fn new(response: &str) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let project = Self { dir };
        project.write(
            "codejudge.toml",
            "retries = 2\n\n[llm]\nprogram = \"sh\"\nargs = [\"-c\", \"cat >/dev/null; cat response.json\"]\n",
        );
        project.write(
            "rubrics/code-quality.md",
            "---\nname: code-quality\n---\n# Code quality\n\n5: exemplary\n1: broken\n",
        );
        project.respond(response);
        project
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }

    pub fn join(&self, relative: &str) -> PathBuf {
        self.dir.path().join(relative)
    }

    pub fn write(&self, relative: &str, content: &str) {
        let path = self.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.join(relative)).unwrap()
    }

    /// Replace the canned judge response
    pub fn respond(&self, response: &str) {
        self.write("response.json", response);
    }

    /// Add a generated session with one source file and one test
    pub fn session(&self, relative: &str) {
        self.write(&format!("{}/code/game.py", relative), "print('hi')\n");
        self.write(
            &format!("{}/tests/test_game.py", relative),
            "def test_game():\n    assert True\n",
        );
    }

    /// Write a current-format score artifact directly
    pub fn score(&self, session: &str, rubric: &str, overall: f64) {
        self.write(
            &format!("{}/scores/{}.json", session, rubric),
            &format!(
                r#"{{"rubric": "{}", "scores": {{"overall": {}, "rubric_total": {}, "rubric_max": 5.25}}}}"#,
                rubric, overall, overall
            ),
        );
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = codejudge();
        cmd.current_dir(self.path());
        cmd
    }
}
