use crate::config::{Config, DEFAULT_CONFIG_NAME};
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use std::fs;
use std::path::PathBuf;

const EXAMPLE_DOCUMENT: &str = r#"# Welcome

This is an *example* document rendered by **mdtree**.

- Edit the files under this directory
- Run `mdtree compile`

```sh
mdtree tree example.md
```
"#;

#[derive(Debug, Args)]
pub struct InitArgs {
    /// Target format (html, markdown)
    #[arg(short, long, default_value = "html")]
    pub target: String,

    /// Source directory
    #[arg(short, long, default_value = "src")]
    pub src_dir: String,

    /// Force overwrite existing config
    #[arg(short, long)]
    pub force: bool,
}

pub fn init(args: InitArgs, cwd: &str) -> Result<()> {
    if !matches!(args.target.as_str(), "html" | "markdown") {
        return Err(anyhow!("Unknown target: {}", args.target));
    }

    let config_path = PathBuf::from(cwd).join(DEFAULT_CONFIG_NAME);

    if config_path.exists() && !args.force {
        println!(
            "{} {} already exists",
            "⚠️".yellow(),
            DEFAULT_CONFIG_NAME.bright_white()
        );
        println!("Use --force to overwrite");
        return Ok(());
    }

    println!("{}", "📝 Initializing mdtree project...".bright_blue().bold());

    let src_dir = PathBuf::from(cwd).join(&args.src_dir);
    if !src_dir.exists() {
        fs::create_dir_all(&src_dir)?;
        println!("  {} Created {}/", "✓".green(), args.src_dir);
    }

    let example_file = src_dir.join("example.md");
    if !example_file.exists() {
        fs::write(&example_file, EXAMPLE_DOCUMENT)?;
        println!("  {} Created example.md", "✓".green());
    }

    let config = Config {
        src_dir: args.src_dir.clone(),
        target: args.target.clone(),
        ..Config::default()
    };

    let config_json = serde_json::to_string_pretty(&config)?;
    fs::write(&config_path, config_json)?;

    println!("  {} Created {}", "✓".green(), DEFAULT_CONFIG_NAME);
    println!();
    println!("{}", "✅ Project initialized!".green().bold());
    println!();
    println!("Next steps:");
    println!("  1. Edit {}/example.md", args.src_dir);
    println!("  2. Run: mdtree compile");
    println!("  3. Check output in {}/", config.out_dir);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_writes_loadable_config() {
        let dir = std::env::temp_dir().join(format!("mdtree-init-{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        let cwd = dir.display().to_string();

        let args = InitArgs {
            target: "markdown".to_string(),
            src_dir: "docs".to_string(),
            force: false,
        };
        init(args, &cwd).unwrap();

        let config = Config::load(&cwd).unwrap();
        assert_eq!(config.src_dir, "docs");
        assert_eq!(config.target, "markdown");
        assert!(dir.join("docs/example.md").exists());
        fs::remove_dir_all(&dir).unwrap();
    }
}
