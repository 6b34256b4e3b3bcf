use crate::commands::compile::load_document;
use crate::config::Config;
use anyhow::Result;
use clap::Args;
use colored::Colorize;
use mdtree_runtime::Runtime;
use mdtree_tree::{ListType, NodeId, Payload, Tree, WalkEvent};
use std::fmt::Write;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct TreeArgs {
    /// Markdown file to inspect
    pub file: String,

    /// Print the tree as JSON
    #[arg(long)]
    pub json: bool,

    /// Run a collection afterwards and print its statistics
    #[arg(long)]
    pub stats: bool,
}

pub fn tree(args: TreeArgs, cwd: &str) -> Result<()> {
    let config = Config::load(cwd)?;
    let mut runtime = Runtime::with_config(config.runtime_config());
    let path = PathBuf::from(cwd).join(&args.file);

    let doc = load_document(&mut runtime, &path)?;
    runtime.root(doc)?;
    let node = runtime.node_of(doc)?;

    if args.json {
        let snapshot = runtime.tree().snapshot(node)?;
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    } else {
        print!("{}", outline(runtime.tree(), node)?);
    }

    if args.stats {
        let size = runtime.tree().subtree_size(node)?;
        runtime.unroot(doc)?;
        let stats = runtime.collect();
        println!();
        println!("{}", "GC".bright_blue().bold());
        println!("  nodes:     {}", size);
        println!("  marked:    {}", stats.marked);
        println!("  swept:     {}", stats.swept);
        println!("  finalized: {}", stats.finalized);
        println!("  freed:     {}", stats.freed_nodes);
    }

    Ok(())
}

/// One line per node, indented by depth.
fn outline(tree: &Tree, root: NodeId) -> Result<String> {
    let mut out = String::new();
    let mut depth = 0usize;
    for event in tree.walk(root) {
        let id = match event {
            WalkEvent::Enter(id) => id,
            WalkEvent::Exit(_) => {
                depth = depth.saturating_sub(1);
                continue;
            }
        };
        let node = tree.node(id)?;
        write!(out, "{}{}", "  ".repeat(depth), node.kind().symbol().bold())?;
        match node.payload() {
            Payload::Literal(text) => write!(out, " {:?}", text)?,
            Payload::CodeBlock { info, literal } => {
                write!(out, " info={:?} {:?}", info, literal)?
            }
            Payload::Header { level } => write!(out, " level={}", level)?,
            Payload::List {
                list_type,
                start,
                tight,
            } => {
                write!(out, " {}", list_type.symbol())?;
                if *list_type == ListType::Ordered {
                    write!(out, " start={}", start)?;
                }
                write!(out, " tight={}", tight)?;
            }
            Payload::Link { url, title } => {
                write!(out, " url={:?}", url)?;
                if !title.is_empty() {
                    write!(out, " title={:?}", title)?;
                }
            }
            Payload::None => {}
        }
        out.push('\n');
        if !node.kind().is_leaf() {
            depth += 1;
        }
    }
    Ok(out)
}
