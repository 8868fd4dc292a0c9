//! Common test utilities for Marketeer CLI tests
#![allow(dead_code)]

use assert_cmd::Command;
use std::path::PathBuf;
use tempfile::{tempdir, TempDir};

/// Isolated home directory for one test
pub struct TestEnv {
    pub temp_dir: TempDir,
    pub data_dir: PathBuf,
}

impl TestEnv {
    pub fn new() -> anyhow::Result<Self> {
        let temp_dir = tempdir()?;
        let data_dir = temp_dir.path().join(".marketeer");
        Ok(Self { temp_dir, data_dir })
    }

    pub fn data_file(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Command pointed at the temp home with no keys leaking in
    pub fn command(&self) -> Command {
        let mut cmd = Command::new(env!("CARGO_BIN_EXE_marketeer"));
        cmd.env("HOME", self.temp_dir.path());
        cmd.env_remove("QWEN_API_KEY");
        cmd.env_remove("TAVILY_API_KEY");
        cmd.env_remove("RUST_LOG");
        cmd
    }

    /// Write a config whose completion endpoint is never reachable
    pub fn create_config(&self, api_key: &str) -> anyhow::Result<()> {
        std::fs::create_dir_all(&self.data_dir)?;
        let config = format!(
            r#"{{
  "provider": {{
    "api_key": "{}",
    "api_base": "http://127.0.0.1:9",
    "model": "qwen-test"
  }}
}}"#,
            api_key
        );
        std::fs::write(self.data_file("config.json"), config)?;
        Ok(())
    }
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new().expect("Failed to create test environment")
    }
}
