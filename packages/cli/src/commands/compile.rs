use crate::config::Config;
use anyhow::{anyhow, Result};
use clap::Args;
use colored::Colorize;
use mdtree_parser::error::pretty;
use mdtree_parser::ParseError;
use mdtree_runtime::{Runtime, RuntimeError, WrapperId};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, Args)]
pub struct CompileArgs {
    /// File or directory to compile (defaults to the configured srcDir)
    pub path: Option<String>,

    /// Target format (html, markdown)
    #[arg(short, long)]
    pub target: Option<String>,

    /// Output to stdout instead of files
    #[arg(long)]
    pub stdout: bool,

    /// Output directory (overrides config)
    #[arg(short, long)]
    pub out_dir: Option<String>,

    /// Strip raw HTML and unsafe link schemes
    #[arg(long)]
    pub safe: bool,

    /// Use typographic quotes and dashes
    #[arg(long)]
    pub smart: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Html,
    Markdown,
}

impl Target {
    fn parse(name: &str) -> Result<Self> {
        match name {
            "html" => Ok(Target::Html),
            "markdown" | "md" => Ok(Target::Markdown),
            other => Err(anyhow!("Unknown target: {}", other)),
        }
    }

    fn extension(self) -> &'static str {
        match self {
            Target::Html => "html",
            Target::Markdown => "md",
        }
    }
}

pub fn compile(args: CompileArgs, cwd: &str) -> Result<()> {
    let mut config = Config::load(cwd)?;
    config.render.safe |= args.safe;
    config.parse.smart |= args.smart;
    let target = Target::parse(args.target.as_deref().unwrap_or(&config.target))?;

    let src_dir = match &args.path {
        Some(path) => PathBuf::from(cwd).join(path),
        None => config.get_src_dir(cwd),
    };
    if !src_dir.exists() {
        return Err(anyhow!("Source directory does not exist: {:?}", src_dir));
    }

    println!("{}", "🔨 Compiling markdown files...".bright_blue().bold());

    let md_files = find_md_files(&src_dir)?;
    if md_files.is_empty() {
        println!("{}", "⚠️  No .md files found".yellow());
        return Ok(());
    }

    println!("Found {} files", md_files.len());

    let out_dir = PathBuf::from(cwd).join(args.out_dir.as_deref().unwrap_or(&config.out_dir));
    let base = if src_dir.is_file() {
        src_dir.parent().map(Path::to_path_buf).unwrap_or_default()
    } else {
        src_dir.clone()
    };

    let mut runtime = Runtime::with_config(config.runtime_config());
    let mut success_count = 0;
    let mut error_count = 0;

    for md_file in &md_files {
        let relative_path = md_file.strip_prefix(&base).unwrap_or(md_file);
        let result = compile_file(&mut runtime, md_file, target).and_then(|output| {
            if args.stdout {
                println!("{}", output);
                return Ok("stdout".to_string());
            }
            let output_file = out_dir.join(relative_path).with_extension(target.extension());
            if let Some(parent) = output_file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&output_file, output)?;
            Ok(output_file.display().to_string())
        });

        match result {
            Ok(output_path) => {
                success_count += 1;
                println!(
                    "  {} {} → {}",
                    "✓".green(),
                    relative_path.display(),
                    output_path
                );
            }
            Err(e) => {
                error_count += 1;
                eprintln!(
                    "  {} {} - {}",
                    "✗".red(),
                    relative_path.display(),
                    e.to_string().red()
                );
            }
        }

        if let Some(stats) = runtime.maybe_collect() {
            tracing::debug!(?stats, "collected between files");
        }
    }

    let stats = runtime.collect();
    tracing::debug!(?stats, collections = runtime.collections(), "final collection");

    println!();
    if error_count == 0 {
        println!(
            "{} Compiled {} files successfully",
            "✅".green(),
            success_count
        );
    } else {
        println!(
            "{} Compiled {} files, {} errors",
            "⚠️".yellow(),
            success_count,
            error_count
        );
    }

    Ok(())
}

pub(crate) fn find_md_files(path: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(path)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file() && path.extension().and_then(|s| s.to_str()) == Some("md") {
            files.push(path.to_path_buf());
        }
    }

    Ok(files)
}

/// Read `file_path` and parse it into `runtime`, with pretty parse errors.
pub(crate) fn load_document(runtime: &mut Runtime, file_path: &Path) -> Result<WrapperId> {
    let bytes = fs::read(file_path)?;
    let file_name = file_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("unknown");

    let source = match std::str::from_utf8(&bytes) {
        Ok(source) => source,
        Err(err) => {
            let error = ParseError::invalid_utf8(err.valid_up_to());
            let lossy = String::from_utf8_lossy(&bytes);
            return Err(anyhow!("\n{}", pretty::format_error(&error, file_name, &lossy)));
        }
    };

    runtime.parse_document(source).map_err(|e| match e {
        RuntimeError::Parse(err) => anyhow!("\n{}", pretty::format_error(&err, file_name, source)),
        other => anyhow!(other),
    })
}

fn compile_file(runtime: &mut Runtime, file_path: &Path, target: Target) -> Result<String> {
    let doc = load_document(runtime, file_path)?;
    let output = match target {
        Target::Html => runtime.render_html(doc)?,
        Target::Markdown => runtime.render_commonmark(doc)?,
    };
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("mdtree-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_target_names() {
        assert_eq!(Target::parse("html").unwrap(), Target::Html);
        assert_eq!(Target::parse("md").unwrap(), Target::Markdown);
        assert!(Target::parse("react").is_err());
    }

    #[test]
    fn test_compile_writes_html() {
        let dir = scratch_dir("compile");
        fs::create_dir_all(dir.join("src/guide")).unwrap();
        fs::write(dir.join("src/index.md"), "# Hello\n").unwrap();
        fs::write(dir.join("src/guide/intro.md"), "- *one*\n- two\n").unwrap();
        fs::write(dir.join("src/notes.txt"), "ignored").unwrap();

        let cwd = dir.display().to_string();
        let args = CompileArgs {
            path: None,
            target: None,
            stdout: false,
            out_dir: None,
            safe: false,
            smart: false,
        };
        compile(args, &cwd).unwrap();

        assert_eq!(
            fs::read_to_string(dir.join("dist/index.html")).unwrap(),
            "<h1>Hello</h1>\n"
        );
        assert_eq!(
            fs::read_to_string(dir.join("dist/guide/intro.html")).unwrap(),
            "<ul>\n<li><em>one</em></li>\n<li>two</li>\n</ul>\n"
        );
        assert!(!dir.join("dist/notes.html").exists());
        fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_load_document_reports_invalid_utf8() {
        let dir = scratch_dir("utf8");
        let file = dir.join("bad.md");
        fs::write(&file, b"ok \xff\n").unwrap();

        let mut runtime = Runtime::new();
        let err = load_document(&mut runtime, &file).unwrap_err();
        assert!(err.to_string().contains("Invalid UTF-8 at byte 3"));
        fs::remove_dir_all(&dir).unwrap();
    }
}
