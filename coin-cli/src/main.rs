//! Coin command-line tool
//!
//! Usage:
//!   coin convert <scene> [-o out] [--binary]   Re-write a scene file
//!   coin dump <scene>                          Print the container tree as JSON
//!   coin traverse <scene> [--json]             Walk the scene and report element state
//!   coin xml <file> [--find path]              Pretty-print or query an XML document

mod walk;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use coin_common::{Severity, StateConfig, clear_warnings};
use coin_fields::{FieldCatalog, FieldContainer, Input, Output, read_scene, write_scene};
use coin_xml::{XmlDocument, XmlPath};
use owo_colors::OwoColorize;
use serde_json::{Map, Value, json};

use walk::SceneWalker;

/// Inspect and convert scene files and XML documents
#[derive(Parser, Debug)]
#[command(name = "coin")]
#[command(author, version, about, long_about = None)]
#[command(after_help = r#"EXAMPLES:
    # Convert an ASCII scene to binary
    coin convert scene.iv -o scene.ivb --binary

    # Show the element state at every leaf, overrides decoupled
    coin traverse scene.iv --separate-override

    # Print the character data of a config value
    coin xml settings.xml --find window/size
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log more (repeat for trace output)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Read a scene file and write it back out
    Convert {
        /// Input scene file
        input: PathBuf,

        /// Output file (stdout when omitted, text only)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the binary format
        #[arg(long)]
        binary: bool,
    },
    /// Print the container tree as JSON
    Dump {
        /// Input scene file
        input: PathBuf,
    },
    /// Walk the scene through a traversal state
    Traverse {
        /// Input scene file
        input: PathBuf,

        /// Keep diffuse-color and transparency overrides independent
        #[arg(long)]
        separate_override: bool,

        /// Print the snapshots as JSON
        #[arg(long)]
        json: bool,
    },
    /// Pretty-print an XML document or look up a path in it
    Xml {
        /// Input XML file
        input: PathBuf,

        /// Path to look up, e.g. `scene/node[1]/name`
        #[arg(long, value_name = "PATH")]
        find: Option<String>,

        /// Drop whitespace-only text before printing
        #[arg(long)]
        strip: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env().filter_level(level).init();

    match cli.command {
        Commands::Convert { input, output, binary } => convert(&input, output.as_deref(), binary),
        Commands::Dump { input } => {
            let scene = load_scene(&input)?;
            let tree: Vec<Value> = scene.roots.iter().map(container_to_json).collect();
            println!("{}", serde_json::to_string_pretty(&tree)?);
            Ok(())
        }
        Commands::Traverse {
            input,
            separate_override,
            json,
        } => traverse(&input, separate_override, json),
        Commands::Xml { input, find, strip } => xml(&input, find.as_deref(), strip),
    }
}

/// Containers read from a scene file, with the format they were read in.
struct Scene {
    roots: Vec<FieldContainer>,
    vrml2: bool,
}

fn load_scene(path: &Path) -> Result<Scene> {
    let mut input = Input::open(path).with_context(|| format!("cannot open {}", path.display()))?;
    let catalog = FieldCatalog::with_builtins();
    let roots = read_scene(&mut input, &catalog).with_context(|| format!("cannot read {}", path.display()));

    let diagnostics = input.diagnostics();
    for diagnostic in diagnostics.iter().filter(|d| d.severity != Severity::Info) {
        eprintln!("{}", diagnostic.yellow());
    }
    Ok(Scene {
        roots: roots?,
        vrml2: input.is_vrml2(),
    })
}

fn convert(input: &Path, output: Option<&Path>, binary: bool) -> Result<()> {
    let scene = load_scene(input)?;
    let mut out = if binary {
        Output::binary()
    } else {
        Output::text().with_vrml2(scene.vrml2)
    };
    write_scene(&scene.roots, &mut out);

    match output {
        Some(path) => {
            std::fs::write(path, out.as_bytes()).with_context(|| format!("cannot write {}", path.display()))?;
            eprintln!("{} {}", "wrote".green(), path.display());
        }
        None if binary => anyhow::bail!("binary output needs --output"),
        None => print!("{}", out.to_text()),
    }
    Ok(())
}

fn container_to_json(container: &FieldContainer) -> Value {
    let mut obj = Map::new();
    let _ = obj.insert("type".to_string(), json!(container.type_name()));
    if let Some(name) = container.def_name() {
        let _ = obj.insert("def".to_string(), json!(name));
    }

    let fields: Map<String, Value> = container
        .fields()
        .filter(|(_, field)| !field.is_default())
        .map(|(name, _)| (name.to_string(), json!(container.get(name))))
        .collect();
    let _ = obj.insert("fields".to_string(), Value::Object(fields));

    if container.is_group() {
        let children: Vec<Value> = container.children().iter().map(container_to_json).collect();
        let _ = obj.insert("children".to_string(), Value::Array(children));
    }
    Value::Object(obj)
}

fn traverse(input: &Path, separate_override: bool, as_json: bool) -> Result<()> {
    let scene = load_scene(input)?;
    let config = if separate_override {
        StateConfig::with_separate_override(true)
    } else {
        StateConfig::from_env()
    };
    clear_warnings();
    let mut walker = SceneWalker::new(config);
    walker.walk_all(&scene.roots);

    if as_json {
        println!("{}", serde_json::to_string_pretty(walker.snapshots())?);
        return Ok(());
    }

    for snap in walker.snapshots() {
        let pad = "  ".repeat(snap.depth);
        let name = snap.def_name.as_deref().map(|n| format!(" {n}")).unwrap_or_default();
        println!("{pad}{}{}", snap.type_name.bold(), name.cyan());
        println!(
            "{pad}  style {} width {} complexity {} light {}",
            snap.draw_style, snap.line_width, snap.complexity, snap.light_model
        );
        println!(
            "{pad}  diffuse {:?} transparency {} at {:?}",
            snap.diffuse, snap.transparency, snap.translation
        );
        if snap.clip_planes > 0 || snap.profiles > 0 {
            println!(
                "{pad}  {} clip planes, {} profiles",
                snap.clip_planes.dimmed(),
                snap.profiles.dimmed()
            );
        }
    }
    Ok(())
}

fn xml(input: &Path, find: Option<&str>, strip: bool) -> Result<()> {
    let mut doc = XmlDocument::read_file(input)?;
    if strip {
        if let Some(root) = doc.root() {
            doc.strip_whitespace(root);
        }
    }

    let Some(find) = find else {
        print!("{}", doc.write_to_buffer());
        return Ok(());
    };

    let path: XmlPath = find.parse()?;
    let Some(root) = doc.root() else {
        anyhow::bail!("{} has no root element", input.display());
    };
    let mut hit = doc.find(root, &path);
    if hit.is_none() {
        eprintln!("{} {find}", "no match for".red());
    }
    while let Some(id) = hit {
        let data = doc.data(id).unwrap_or("");
        println!("{} {}", doc.path(id).green(), data);
        hit = doc.find_next(root, id, &path);
    }
    Ok(())
}
