//! Check that every configured component loads

use anyhow::{bail, Result};
use console::style;
use hyperx::components::LoadReport;

use crate::Site;

/// Load every configured component and report the results
#[derive(Debug, Clone, Copy, Default)]
pub struct CheckCommand;

impl CheckCommand {
    /// Create a new command instance
    pub const fn new() -> Self {
        Self
    }

    /// Load everything and return the report
    pub async fn check(site: &Site) -> Result<LoadReport> {
        let state = site.state();
        Ok(state.loader().load_all().await?)
    }

    /// Execute the command
    pub async fn execute(site: &Site) -> Result<()> {
        println!(
            "{} {}",
            style("Checking").green().bold(),
            style(&site.config().project.components_dir).bold()
        );
        println!();

        let mut report = Self::check(site).await?;
        report.loaded.sort();

        if report.requested == 0 {
            println!("{}", style("No components configured").yellow());
            return Ok(());
        }

        for tag in &report.loaded {
            println!("  {} {}", style("✓").green(), tag);
        }
        for name in &report.failed {
            println!("  {} {}", style("✗").red(), name);
        }
        println!();
        println!(
            "{}/{} components loaded",
            style(report.loaded.len()).bold(),
            report.requested
        );

        if !report.is_complete() {
            bail!("{} component(s) failed to load", report.failed.len());
        }
        Ok(())
    }
}
