// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Plotnet-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Plotnet and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use std::error::Error;
use std::fs::File;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use log::{debug, info, warn, LevelFilter};

use plotnet::model::{DiagramDocument, DiagramId, DiagramKind, NodeKind};
use plotnet::scene::{NetworkScene, SceneConfig};
use plotnet::store::{DiagramFolder, FolderGateway, WriteDurability};

const DEFAULT_DIAGRAM_ID: &str = "main";

/// Terminal editor for story diagrams stored in a folder.
#[derive(Parser, Debug)]
#[command(name = "plotnet", author, version, about, long_about = None)]
struct Args {
    /// Diagram folder (defaults to the current directory)
    #[arg(conflicts_with = "demo")]
    dir: Option<PathBuf>,

    /// Diagram to open; defaults to the first stored diagram, or a new `main` diagram
    #[arg(long)]
    diagram: Option<String>,

    /// Node kind placed by a double-click on empty canvas
    #[arg(long, default_value = "event")]
    kind: NodeKind,

    /// Maximum number of undo steps (0 keeps everything)
    #[arg(long, default_value_t = 100)]
    undo_limit: usize,

    /// Fsync every write
    #[arg(long)]
    durable_writes: bool,

    /// Image files handed out, in order, whenever an image item is placed
    #[arg(long = "image", value_name = "FILE")]
    images: Vec<PathBuf>,

    /// Open an in-memory demo network instead of a folder
    #[arg(long)]
    demo: bool,

    /// Log level (off, error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn init_logging(args: &Args) -> Result<(), Box<dyn Error>> {
    let log_level = LevelFilter::from_str(&args.log_level).unwrap_or_else(|_| {
        eprintln!("plotnet: invalid log level '{}', using 'warn'", args.log_level);
        LevelFilter::Warn
    });

    let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
    builder.filter_level(log_level);
    if let Some(path) = &args.log_file {
        builder.target(env_logger::Target::Pipe(Box::new(File::create(path)?)));
    } else if log_level > LevelFilter::Warn {
        eprintln!("plotnet: logging to stderr while the editor is open; consider --log-file");
    }
    builder.init();
    Ok(())
}

fn pick_diagram(folder: &DiagramFolder, requested: Option<&str>) -> Result<DiagramId, Box<dyn Error>> {
    if let Some(id) = requested {
        return Ok(DiagramId::new(id)?);
    }
    let stored = folder.list_documents()?;
    match stored.into_iter().next() {
        Some(id) => Ok(id),
        None => Ok(DiagramId::new(DEFAULT_DIAGRAM_ID)?),
    }
}

fn run(args: Args) -> Result<(), Box<dyn Error>> {
    let config = SceneConfig::default()
        .with_default_kind(args.kind)
        .with_undo_limit(args.undo_limit);

    if args.demo {
        let (gateway, document) = plotnet::tui::demo_gateway();
        let mut scene = NetworkScene::with_config(gateway, config);
        scene.set_diagram(document);
        plotnet::tui::run(scene)?;
        return Ok(());
    }

    let dir = args.dir.unwrap_or_else(|| PathBuf::from("."));
    let durability = if args.durable_writes {
        WriteDurability::Durable
    } else {
        WriteDurability::BestEffort
    };
    let folder = DiagramFolder::new(dir).with_durability(durability);
    let diagram_id = pick_diagram(&folder, args.diagram.as_deref())?;
    info!(root:? = folder.root(), diagram_id = diagram_id.as_str(); "Opening diagram");

    let mut gateway = FolderGateway::new(folder);
    for image in args.images {
        gateway.queue_upload(image);
    }

    let name = diagram_id.as_str().to_owned();
    let mut scene = NetworkScene::with_config(gateway, config);
    scene.set_diagram(DiagramDocument::new(diagram_id, name, DiagramKind::default()));
    let scene = plotnet::tui::run(scene)?;

    if let Some(err) = scene.gateway().last_error() {
        warn!(error:% = err; "Last save failed");
        return Err(format!("last save failed: {err}").into());
    }
    Ok(())
}

fn main() {
    let args = Args::parse();
    if let Err(err) = init_logging(&args) {
        eprintln!("plotnet: cannot open log file: {err}");
        std::process::exit(2);
    }
    debug!(args:?; "Parsed arguments");

    if let Err(err) = run(args) {
        eprintln!("plotnet: {err}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;
    use rstest::rstest;

    use super::{pick_diagram, Args};
    use plotnet::model::{DiagramDocument, DiagramId, DiagramKind, NodeKind};
    use plotnet::store::DiagramFolder;

    #[test]
    fn parses_empty_args() {
        let args = Args::try_parse_from(["plotnet"]).unwrap();
        assert_eq!(args.dir, None);
        assert_eq!(args.kind, NodeKind::Event);
        assert_eq!(args.undo_limit, 100);
        assert!(!args.demo);
        assert_eq!(args.log_level, "warn");
    }

    #[test]
    fn parses_folder_options() {
        let args = Args::try_parse_from([
            "plotnet",
            "stories",
            "--diagram",
            "act-1",
            "--kind",
            "note",
            "--durable-writes",
            "--image",
            "a.png",
            "--image",
            "b.png",
        ])
        .unwrap();
        assert_eq!(args.dir.as_deref(), Some(std::path::Path::new("stories")));
        assert_eq!(args.diagram.as_deref(), Some("act-1"));
        assert_eq!(args.kind, NodeKind::Note);
        assert!(args.durable_writes);
        assert_eq!(args.images.len(), 2);
    }

    #[rstest]
    #[case(&["plotnet", "--kind", "dragon"])]
    #[case(&["plotnet", "stories", "--demo"])]
    #[case(&["plotnet", "--undo-limit", "many"])]
    fn rejects_invalid_args(#[case] argv: &[&str]) {
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn picks_requested_then_first_stored_then_default_diagram() {
        let tmp = tempfile::tempdir().unwrap();
        let folder = DiagramFolder::new(tmp.path());

        assert_eq!(pick_diagram(&folder, None).unwrap().as_str(), "main");
        assert_eq!(pick_diagram(&folder, Some("act-2")).unwrap().as_str(), "act-2");
        assert!(pick_diagram(&folder, Some("a/b")).is_err());

        for id in ["b", "a"] {
            let document =
                DiagramDocument::new(DiagramId::new(id).unwrap(), id, DiagramKind::Mindmap);
            folder.save_document(&document).unwrap();
        }
        assert_eq!(pick_diagram(&folder, None).unwrap().as_str(), "a");
    }
}
