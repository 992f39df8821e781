//! Render a JSON payload through a page's templates

use anyhow::{Context, Result};
use console::style;
use hyperx::jrx::{JsonInterceptor, ResponseEvent, TemplateStore, JSON_CONTENT_TYPE};
use hyperx::template::Fragment;
use std::path::PathBuf;

/// Apply a JSON response to a page and print the result
#[derive(Debug, Clone)]
pub struct JsonCommand {
    page: PathBuf,
    target: String,
    data: PathBuf,
}

impl JsonCommand {
    /// Create a new command instance
    pub fn new(page: impl Into<PathBuf>, target: impl Into<String>, data: impl Into<PathBuf>) -> Self {
        Self {
            page: page.into(),
            target: target.into(),
            data: data.into(),
        }
    }

    /// Render and return the updated page markup
    pub async fn render(&self) -> Result<String> {
        let markup = tokio::fs::read_to_string(&self.page)
            .await
            .with_context(|| format!("Failed to read {}", self.page.display()))?;
        let body = tokio::fs::read_to_string(&self.data)
            .await
            .with_context(|| format!("Failed to read {}", self.data.display()))?;

        let mut page = Fragment::parse(&markup);
        let interceptor = JsonInterceptor::new(TemplateStore::new());
        interceptor.page_loaded(&page);
        interceptor.before_request(&page, &self.target);

        let event = ResponseEvent {
            target_id: &self.target,
            content_type: Some(JSON_CONTENT_TYPE),
            body: &body,
        };
        let rendered = interceptor
            .try_after_on_load(&mut page, &event)
            .with_context(|| format!("Failed to render #{}", self.target))?
            .context("Response was not handled")?;

        tracing::debug!(case = ?rendered.case, source = ?rendered.source, "Rendered JSON");
        Ok(page.to_html())
    }

    /// Execute the command
    pub async fn execute(&self) -> Result<()> {
        let html = self.render().await?;
        eprintln!(
            "{} #{}",
            style("Rendered").green().bold(),
            style(&self.target).cyan()
        );
        println!("{html}");
        Ok(())
    }
}
