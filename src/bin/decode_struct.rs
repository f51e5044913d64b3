//! Decode one record from a binary file using a text struct definition.
//!
//! Usage:
//!   decode_struct [OPTIONS] DEF_FILE DATA_FILE
//!
//! Options:
//!   --big, -b         Big-endian (default little-endian)
//!   --offset N, -o N  Start reading at byte N
//!   --verbose, -v     Log buffer activity to stderr (repeat for per-field tracing)

use anyhow::{bail, Context};
use std::fs::File;
use std::path::PathBuf;
use structbuf::dump::format_record;
use structbuf::{load_definition, Buffer, Endianness, ReadDefinition};
use tracing::level_filters::LevelFilter;

struct Options {
    endianness: Endianness,
    offset: usize,
    verbosity: u8,
    definition: PathBuf,
    data: PathBuf,
}

fn parse_args() -> anyhow::Result<Options> {
    let mut endianness = Endianness::Little;
    let mut offset = 0usize;
    let mut verbosity = 0u8;
    let mut positional = Vec::new();
    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--big" | "-b" => endianness = Endianness::Big,
            "--offset" | "-o" => {
                let n = args.next().context("--offset needs a value")?;
                offset = n.parse().with_context(|| format!("bad offset '{}'", n))?;
            }
            "--verbose" | "-v" => verbosity = verbosity.saturating_add(1),
            "-vv" => verbosity = verbosity.saturating_add(2),
            s if s.starts_with('-') => bail!("unknown option '{}'", s),
            _ => positional.push(PathBuf::from(arg)),
        }
    }
    if positional.len() != 2 {
        bail!("usage: decode_struct [--big] [--offset N] [-v] DEF_FILE DATA_FILE");
    }
    let data = positional.pop().unwrap_or_default();
    let definition = positional.pop().unwrap_or_default();
    Ok(Options { endianness, offset, verbosity, definition, data })
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => LevelFilter::WARN,
        1 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    };
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let opts = parse_args()?;
    init_logging(opts.verbosity);

    let def = load_definition(&opts.definition)
        .with_context(|| format!("{}: loading definition", opts.definition.display()))?;
    let file = File::open(&opts.data).with_context(|| format!("{}: open", opts.data.display()))?;
    let mut buffer = Buffer::from_reader(file)?.with_endianness(opts.endianness);
    buffer.read_offset = opts.offset;
    tracing::debug!(len = buffer.len(), offset = opts.offset, fields = def.len(), "decoding");

    let record = buffer
        .read_struct(&ReadDefinition::from(def))
        .with_context(|| format!("{}: decode", opts.data.display()))?;
    print!("{}", format_record(&record));
    if buffer.readable() {
        tracing::warn!(
            trailing = buffer.len() - buffer.read_offset,
            offset = buffer.read_offset,
            "trailing bytes after record"
        );
    }
    Ok(())
}
