//! Graph source that shells out to madge.
//!
//! madge does the actual import resolution (TypeScript paths, webpack
//! aliases). This source only assembles its command line:
//!
//! ```text
//! npx madge --json --extensions js,jsx,ts,tsx --basedir <project>
//!     --ts-config <nearest tsconfig> [--webpack-config next.config.js]
//!     <existing pages directories...>
//! ```

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info};

use super::{DependencyGraph, GraphError, GraphSource};
use crate::config::NextAffectedConfig;

const TS_CONFIG_NAMES: [&str; 2] = ["tsconfig.json", "tsconfig.base.json"];
const WEBPACK_CONFIG_NAME: &str = "next.config.js";
const SOURCE_EXTENSIONS: &str = "js,jsx,ts,tsx";

/// Find the nearest `tsconfig.json` or `tsconfig.base.json`, walking up from
/// `start` to the filesystem root.
pub fn find_ts_config(start: &Path) -> Result<PathBuf, GraphError> {
    for dir in start.ancestors() {
        for name in TS_CONFIG_NAMES {
            let candidate = dir.join(name);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }
    Err(GraphError::TsConfigNotFound(start.to_path_buf()))
}

/// Graph source running madge as a subprocess.
#[derive(Debug, Clone)]
pub struct MadgeGraphSource {
    program: String,
    prefix_args: Vec<String>,
}

impl Default for MadgeGraphSource {
    fn default() -> Self {
        Self {
            program: "npx".to_string(),
            prefix_args: vec!["--yes".to_string(), "madge".to_string()],
        }
    }
}

impl MadgeGraphSource {
    /// Use the default `npx --yes madge` invocation.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different launcher, e.g. `("pnpm", ["exec", "madge"])` or a
    /// direct path to the madge binary with no prefix.
    pub fn with_command(program: impl Into<String>, prefix_args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            prefix_args,
        }
    }

    /// Pages directories of `config` that exist under `project_dir`.
    pub fn entry_points(project_dir: &Path, config: &NextAffectedConfig) -> Vec<PathBuf> {
        config
            .pages_directories
            .iter()
            .map(|dir| project_dir.join(dir))
            .filter(|entry| entry.exists())
            .collect()
    }

    /// Full argument list for a project.
    pub fn build_args(
        &self,
        project_dir: &Path,
        config: &NextAffectedConfig,
    ) -> Result<Vec<String>, GraphError> {
        let entry_points = Self::entry_points(project_dir, config);
        if entry_points.is_empty() {
            return Err(GraphError::NoEntryPoints(project_dir.to_path_buf()));
        }
        let ts_config = find_ts_config(project_dir)?;

        let mut args = self.prefix_args.clone();
        args.extend([
            "--json".to_string(),
            "--extensions".to_string(),
            SOURCE_EXTENSIONS.to_string(),
            "--basedir".to_string(),
            project_dir.display().to_string(),
            "--ts-config".to_string(),
            ts_config.display().to_string(),
        ]);

        let webpack_config = project_dir.join(WEBPACK_CONFIG_NAME);
        if webpack_config.is_file() {
            args.push("--webpack-config".to_string());
            args.push(webpack_config.display().to_string());
        }

        args.extend(entry_points.iter().map(|p| p.display().to_string()));
        Ok(args)
    }
}

#[async_trait]
impl GraphSource for MadgeGraphSource {
    async fn build_graph(
        &self,
        project_dir: &Path,
        config: &NextAffectedConfig,
    ) -> Result<DependencyGraph, GraphError> {
        let args = self.build_args(project_dir, config)?;
        debug!(program = %self.program, args = ?args, "Running madge");

        let output = Command::new(&self.program)
            .args(&args)
            .current_dir(project_dir)
            .output()
            .await
            .map_err(GraphError::from_builder)?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            return Err(GraphError::Builder(if stderr.is_empty() {
                format!("madge exited with {}", output.status)
            } else {
                stderr
            }));
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let graph = DependencyGraph::from_json_str(&stdout).map_err(|source| GraphError::Parse {
            origin: "madge".to_string(),
            source,
        })?;

        info!(modules = graph.len(), "madge dependency graph built");
        Ok(graph)
    }
}
