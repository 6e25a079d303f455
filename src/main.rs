#![forbid(unsafe_code)]

use std::process::exit;

use saphyr_composer::{Composer, Document, LiveEvents, Options};
use tracing_subscriber::prelude::*;

/// One line per document: node count, anchors and nodes that need two-step construction.
fn summarize(index: usize, doc: &Document) {
    if doc.is_comment_holder() {
        println!("document {index}: comments only");
        return;
    }
    let anchors = doc.iter().filter(|(_, n)| n.anchor().is_some()).count();
    let two_step = doc.iter().filter(|(_, n)| n.is_two_step()).count();
    println!(
        "document {index}: {} nodes, {anchors} anchors, {two_step} two-step, tree: {}",
        doc.len(),
        doc.is_tree()
    );
}

/// Compose a YAML file and print a summary of each document's graph, then the limit counters.
/// Useful to size `Limits` for your inputs; also works as a YAML validator. Single parameter is
/// the file name. Set `SAPHYR_COMPOSER_LOG` (e.g. `debug`) for composition traces.
fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("SAPHYR_COMPOSER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let path = match std::env::args().nth(1).ok_or(
        "This program composes the given YAML file and reports its node graphs. \
        Expected a path to a YAML file as the first argument",
    ) {
        Ok(path) => path,
        Err(err) => {
            eprintln!("{err}");
            exit(1);
        }
    };

    let content = match std::fs::read_to_string(&path) {
        Ok(content) => content,
        Err(err) => {
            eprintln!("Failed to read {path}: {err}");
            exit(2);
        }
    };

    let mut composer = Composer::with_options(LiveEvents::new(&content), &Options::default());
    for (index, doc) in composer.by_ref().enumerate() {
        match doc {
            Ok(doc) => summarize(index, &doc),
            Err(err) => {
                eprintln!("{path} invalid:\n{err}");
                exit(3);
            }
        }
    }

    match serde_json::to_string_pretty(&composer.report()) {
        Ok(serialized) => println!("Limit report:\n{serialized}"),
        Err(err) => eprintln!("Failed to serialize limit report: {err}"),
    }
}
