//! Render a single component

use anyhow::{bail, Context, Result};
use console::style;
use hyperx::components::RenderOutcome;
use std::path::PathBuf;

use crate::Site;

/// Load one component and print its rendered markup
#[derive(Debug, Clone)]
pub struct RenderCommand {
    component: String,
    data: Option<String>,
    data_file: Option<PathBuf>,
}

impl RenderCommand {
    /// Create a new command instance
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            data: None,
            data_file: None,
        }
    }

    /// Inline JSON for the component's data attribute
    #[must_use]
    pub fn with_data(mut self, data: Option<String>) -> Self {
        self.data = data;
        self
    }

    /// File holding JSON for the component's data attribute
    #[must_use]
    pub fn with_data_file(mut self, data_file: Option<PathBuf>) -> Self {
        self.data_file = data_file;
        self
    }

    /// Render and return the markup
    pub async fn render(&self, site: &Site) -> Result<String> {
        let data = match (&self.data, &self.data_file) {
            (Some(inline), _) => Some(inline.clone()),
            (None, Some(file)) => Some(
                tokio::fs::read_to_string(file)
                    .await
                    .with_context(|| format!("Failed to read {}", file.display()))?,
            ),
            (None, None) => None,
        };
        if let Some(raw) = &data {
            serde_json::from_str::<serde_json::Value>(raw).context("Data is not valid JSON")?;
        }

        let state = site.state();
        let tag = state
            .loader()
            .try_load(&self.component)
            .await
            .with_context(|| format!("Failed to load component {}", self.component))?;
        state.binder().define(&tag);

        let attributes: Vec<(&str, &str)> = match data.as_deref() {
            Some(raw) => vec![(state.config().render.data_attribute.as_str(), raw)],
            None => Vec::new(),
        };
        let Some((element, outcome)) = state.binder().mount(&tag, attributes) else {
            bail!("Component {tag} could not be defined");
        };

        match outcome {
            RenderOutcome::Rendered => Ok(element.shadow_html()),
            RenderOutcome::MissingTemplate => bail!("No template registered for {tag}"),
            RenderOutcome::Failed(message) => bail!("Error rendering {tag}: {message}"),
        }
    }

    /// Execute the command
    pub async fn execute(&self, site: &Site) -> Result<()> {
        let markup = self.render(site).await?;
        eprintln!(
            "{} {}",
            style("Rendered").green().bold(),
            style(&self.component).cyan()
        );
        println!("{markup}");
        Ok(())
    }
}
