use std::collections::HashMap;
use std::io::Write;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rayon::prelude::*;

use readmap::align::approx::{Search, Searcher};
use readmap::index::fm::{FMIndexTables, IndexMeta};
use readmap::io::fasta::FastaReader;
use readmap::io::fastq::FastqReader;
use readmap::io::sam::SamWriter;

/// 落盘的预处理结果：参考序列名 -> 该序列的 FM 索引表。
type GenomeTables = HashMap<String, FMIndexTables>;

const INDEX_SUFFIX: &str = ".fmidx";

#[derive(Parser, Debug)]
#[command(
    name = "readmap",
    version,
    about = "FM-index based approximate read mapper",
    arg_required_else_help = true
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Preprocess a reference FASTA into searchable index tables
    Index {
        /// Reference FASTA file
        reference: String,
    },
    /// Map reads (FASTQ) against a preprocessed reference
    Map {
        /// Maximum number of edits per reported hit
        #[arg(short = 'd', long = "dist", default_value_t = 0)]
        dist: u32,
        /// Reference FASTA file (its .fmidx must exist)
        reference: String,
        /// Reads FASTQ file
        reads: String,
        /// Output SAM path (stdout if omitted)
        #[arg(short, long)]
        out: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Index { reference } => run_index(&reference),
        Commands::Map { dist, reference, reads, out } => {
            run_map(&reference, &reads, dist, out.as_deref())
        }
    }
}

fn run_index(reference: &str) -> Result<()> {
    let fh = std::fs::File::open(reference)
        .with_context(|| format!("cannot open reference FASTA '{reference}'"))?;
    let records = FastaReader::new(std::io::BufReader::new(fh)).into_records()?;

    if records.is_empty() {
        bail!("FASTA file '{reference}' contains no sequences");
    }
    if records.iter().all(|r| r.seq.is_empty()) {
        bail!("FASTA file '{reference}' contains only empty sequences");
    }

    let meta = IndexMeta {
        reference_file: Some(reference.to_string()),
        build_args: Some(std::env::args().collect::<Vec<_>>().join(" ")),
        build_timestamp: Some(chrono::Utc::now().to_rfc3339()),
    };

    // 各参考序列相互独立，无共享可变状态，可并行构建
    let tables: GenomeTables = records
        .par_iter()
        .map(|rec| {
            let mut t = FMIndexTables::build(&rec.seq);
            t.set_meta(meta.clone());
            (rec.id.clone(), t)
        })
        .collect();

    let out_path = format!("{reference}{INDEX_SUFFIX}");
    let out = std::fs::File::create(&out_path)
        .with_context(|| format!("cannot create index file '{out_path}'"))?;
    let mut out = std::io::BufWriter::new(out);
    bincode::serialize_into(&mut out, &tables)
        .with_context(|| format!("cannot write index to '{out_path}'"))?;
    out.flush()?;

    println!("reference: {reference}");
    println!("sequences: {}", tables.len());
    println!("index saved: {out_path}");
    Ok(())
}

fn run_map(reference: &str, reads: &str, dist: u32, out_path: Option<&str>) -> Result<()> {
    let index_path = format!("{reference}{INDEX_SUFFIX}");
    let fh = std::fs::File::open(&index_path).with_context(|| {
        format!("cannot open index '{index_path}', did you remember to preprocess?")
    })?;
    let tables: GenomeTables = bincode::deserialize_from(std::io::BufReader::new(fh))
        .with_context(|| format!("cannot decode index file '{index_path}'"))?;

    // 校验后按名字排序，保证输出顺序稳定
    let mut genome: Vec<(String, Searcher)> = Vec::with_capacity(tables.len());
    for (name, t) in tables {
        t.validate()
            .with_context(|| format!("corrupt index tables for sequence '{name}'"))?;
        genome.push((name, Searcher::from_tables(t)));
    }
    genome.sort_by(|a, b| a.0.cmp(&b.0));

    let out: Box<dyn Write> = match out_path {
        Some(p) => Box::new(
            std::fs::File::create(p).with_context(|| format!("cannot create '{p}'"))?,
        ),
        None => Box::new(std::io::stdout()),
    };
    let mut sam = SamWriter::new(std::io::BufWriter::new(out));
    sam.write_header(
        genome
            .iter()
            .map(|(name, s)| (name.as_str(), s.tables().len().saturating_sub(1))),
    )?;

    let fq = std::fs::File::open(reads)
        .with_context(|| format!("cannot open reads FASTQ '{reads}'"))?;
    let reader = FastqReader::new(std::io::BufReader::new(fq));

    let mut io_err = Ok(());
    reader.for_each(|rec| {
        if io_err.is_err() {
            return;
        }
        let mut mapped = false;
        for (name, searcher) in &genome {
            searcher.search(&rec.read, dist, &mut |pos, cigar| {
                mapped = true;
                if io_err.is_ok() {
                    io_err = sam.write_mapped(&rec.name, name, pos, cigar, &rec.read, &rec.qual);
                }
            });
        }
        if !mapped && io_err.is_ok() {
            io_err = sam.write_unmapped(&rec.name, &rec.read, &rec.qual);
        }
    })?;
    io_err?;

    sam.flush()
}
