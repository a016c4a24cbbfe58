//! Dump the contents of a legacy Word document.
//!
//! # Usage
//!
//! Plain text of the main story:
//! ```sh
//! cargo run --example dump_doc -- input.doc
//! ```
//!
//! Sections, paragraphs and runs with their formatting:
//! ```sh
//! cargo run --example dump_doc -- input.doc --mode walk
//! ```
//!
//! Streams of the compound file:
//! ```sh
//! cargo run --example dump_doc -- input.doc --mode streams
//! ```

use clap::{Parser, ValueEnum};
use std::fs::File;
use std::path::PathBuf;
use std::process;
use wordbin::ole::CompoundFile;
use wordbin::ole::doc::HeaderFooterKind;
use wordbin::{Document, Package, ParseOptions, SmallDepotLayout};

/// Print text or structure of a .doc file
#[derive(Parser, Debug)]
#[command(name = "dump_doc", version)]
struct Args {
    /// Input .doc file
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// What to print
    #[arg(long, value_enum, default_value = "text")]
    mode: Mode,

    /// Windows codepage of 8-bit text
    #[arg(long, default_value_t = 1252)]
    codepage: u32,

    /// Fail on broken optional tables instead of skipping them
    #[arg(long)]
    strict: bool,

    /// Do not compute list numbers
    #[arg(long)]
    no_lists: bool,

    /// Append small depot sectors in chain order
    #[arg(long)]
    sequential_depot: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Mode {
    Text,
    Walk,
    Streams,
}

fn main() {
    let args = Args::parse();
    let layout = if args.sequential_depot {
        SmallDepotLayout::Sequential
    } else {
        SmallDepotLayout::Overlay
    };
    let options = ParseOptions::new()
        .with_small_depot_layout(layout)
        .with_codepage(args.codepage)
        .with_strict(args.strict)
        .with_resolve_lists(!args.no_lists);

    if let Err(err) = run(&args, options) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(args: &Args, options: ParseOptions) -> wordbin::Result<()> {
    if let Mode::Streams = args.mode {
        let mut ole = CompoundFile::open_with_options(File::open(&args.input)?, &options)?;
        for name in ole.list_streams() {
            let size = ole.get_stream(&name)?.len();
            println!("{name:<32} {size:>10} bytes");
        }
        return Ok(());
    }

    let document = Package::open_with_options(&args.input, options)?.document()?;
    match args.mode {
        Mode::Text => println!("{}", document.main_text()?.replace('\r', "\n")),
        Mode::Walk => walk(&document)?,
        Mode::Streams => {},
    }
    Ok(())
}

fn walk(document: &Document) -> wordbin::Result<()> {
    let fib = document.fib();
    println!("nfib 0x{:04X}, {} characters of main text", fib.nfib, fib.ccp_text);

    for section in document.sections()? {
        println!(
            "section {} cp [{}, {}) {}x{} twips, {} column(s)",
            section.index,
            section.start,
            section.end,
            section.sep.xa_page,
            section.sep.ya_page,
            section.sep.columns()
        );
        for story in document.header_footers(section.index)? {
            let label = if story.kind.is_header() { "header" } else { "footer" };
            println!("  {label} {:?}: {:?}", story.kind, story.text().trim_end());
        }
        let first_page = document.header_footer(HeaderFooterKind::HeaderFirst, section.index)?;
        if first_page.is_some() && section.sep.title_page {
            println!("  first page has its own header");
        }

        for para in &section.paragraphs {
            if let Some(row) = &para.table_row {
                println!("  table row: {} cell(s)", row.itc_mac);
                continue;
            }
            let style = document.style_sheet().style_name(para.pap.istd).unwrap_or("?");
            println!(
                "  paragraph [{:#x}, {:#x}) style {style:?} jc {}",
                para.start, para.end, para.pap.jc
            );
            if let Some(label) = &para.list_label {
                println!("    label {:?}", label.text);
            }
            for run in &para.runs {
                let font = document.font_name(run.chp.ftc_ascii).unwrap_or("?");
                println!(
                    "    run {font} {}pt{}{} {:?}",
                    run.chp.hps / 2,
                    if run.chp.bold { " bold" } else { "" },
                    if run.chp.italic { " italic" } else { "" },
                    run.text()
                );
            }
        }
    }
    Ok(())
}
