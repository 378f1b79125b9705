//! Config command - show or initialize configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{LaminarError, LaminarResult};
use console::style;

/// Execute the config command
pub async fn execute(args: ConfigArgs, config: &Config, manager: &ConfigManager) -> LaminarResult<()> {
    match args.action.unwrap_or(ConfigAction::Show) {
        ConfigAction::Show => show(config),
        ConfigAction::Path => {
            println!("{}", manager.path().display());
            Ok(())
        }
        ConfigAction::Init { force } => init(manager, force).await,
    }
}

fn show(config: &Config) -> LaminarResult<()> {
    let rendered = toml::to_string_pretty(config)?;
    print!("{rendered}");
    Ok(())
}

async fn init(manager: &ConfigManager, force: bool) -> LaminarResult<()> {
    if manager.path().exists() && !force {
        return Err(LaminarError::User(format!(
            "Configuration already exists at {} (use --force to overwrite)",
            manager.path().display()
        )));
    }

    manager.save(&Config::default()).await?;
    println!(
        "{} Wrote default configuration to {}",
        style("✓").green(),
        manager.path().display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn init_refuses_overwrite_without_force() {
        let dir = TempDir::new().unwrap();
        let manager = ConfigManager::with_path(dir.path().join("config.toml"));

        init(&manager, false).await.unwrap();
        let err = init(&manager, false).await.unwrap_err();
        assert!(matches!(err, LaminarError::User(_)));

        init(&manager, true).await.unwrap();
    }

    #[test]
    fn show_renders_all_sections() {
        show(&Config::default()).unwrap();
    }
}
