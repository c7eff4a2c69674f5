use std::path::Path;

#[async_trait::async_trait]
pub trait CliCommand: Send + Sync {
    /// Runs the command against the project rooted at `project_dir`.
    async fn call(&self, project_dir: &Path) -> anyhow::Result<()>;
}
