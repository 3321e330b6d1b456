// Jackson Coxson
// Replaces a file inside an installed app's data container

use std::path::PathBuf;

use clap::{value_parser, Arg, ArgAction, Command};
use container_replacer::{
    locator::{BUNDLE_CONTAINER_ROOT, DATA_CONTAINER_ROOT},
    session::{DEFAULT_BUNDLE_ID, DEFAULT_FILE_NAME},
    ContainerRoots, ReplacementRequest, ReplacerSession, SinkEvent,
};
use tokio::sync::mpsc::UnboundedReceiver;

#[tokio::main]
async fn main() {
    env_logger::init();

    let matches = Command::new("container_replace")
        .about("Replace a file inside an installed app's data container")
        .arg(
            Arg::new("bundle_id")
                .long("bundle-id")
                .value_name("BUNDLE_ID")
                .default_value(DEFAULT_BUNDLE_ID)
                .help("Bundle identifier of the target app"),
        )
        .arg(
            Arg::new("file_name")
                .long("file-name")
                .value_name("NAME")
                .default_value(DEFAULT_FILE_NAME)
                .help("File to replace under Documents/res/video"),
        )
        .arg(
            Arg::new("bundle_root")
                .long("bundle-root")
                .value_name("DIR")
                .default_value(BUNDLE_CONTAINER_ROOT)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the app bundle containers"),
        )
        .arg(
            Arg::new("data_root")
                .long("data-root")
                .value_name("DIR")
                .default_value(DATA_CONTAINER_ROOT)
                .value_parser(value_parser!(PathBuf))
                .help("Directory holding the app data containers"),
        )
        .arg(
            Arg::new("check")
                .long("check")
                .help("Only check whether the data containers can be read")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("about")
                .long("about")
                .help("Show about information")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("source")
                .index(1)
                .value_name("SOURCE")
                .value_parser(value_parser!(PathBuf))
                .help("The file to copy into the container"),
        )
        .get_matches();

    if matches.get_flag("about") {
        println!("container_replace - replace a file inside an app's sandbox");
        println!("Copyright (c) 2025 Jackson Coxson");
        return;
    }

    // Both have defaults
    let roots = ContainerRoots::new(
        matches
            .get_one::<PathBuf>("bundle_root")
            .cloned()
            .unwrap_or_default(),
        matches
            .get_one::<PathBuf>("data_root")
            .cloned()
            .unwrap_or_default(),
    );
    let (session, events) = ReplacerSession::new(roots);

    if matches.get_flag("check") {
        let accessible = session.check_access();
        drop(session);
        print_transcript(events).await;
        std::process::exit(if accessible { 0 } else { 1 });
    }

    let source = match matches.get_one::<PathBuf>("source") {
        Some(s) => s.clone(),
        None => {
            eprintln!("Invalid arguments! Pass the file to copy in as SOURCE");
            std::process::exit(1);
        }
    };
    let bundle_id = matches
        .get_one::<String>("bundle_id")
        .cloned()
        .unwrap_or_default();
    let file_name = matches
        .get_one::<String>("file_name")
        .cloned()
        .unwrap_or_default();

    let handle = session.spawn(ReplacementRequest::new(bundle_id, file_name, source));
    // The worker holds its own sink, so the transcript ends when it's done
    drop(session);
    let outcome = print_transcript(events).await;

    if let Some(handle) = handle {
        if let Err(e) = handle.await {
            eprintln!("Replacement worker failed: {e}");
            std::process::exit(1);
        }
    }
    std::process::exit(if outcome == Some(true) { 0 } else { 1 });
}

async fn print_transcript(mut events: UnboundedReceiver<SinkEvent>) -> Option<bool> {
    let mut outcome = None;
    while let Some(event) = events.recv().await {
        match event {
            SinkEvent::Entry(entry) => println!("{entry}"),
            SinkEvent::Finished(success) => outcome = Some(success),
        }
    }
    outcome
}
