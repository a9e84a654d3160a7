use std::fs::File;
use std::io::{prelude::*, stdin, stdout, BufWriter};
use std::path::PathBuf;
use std::time::Instant;

use brillseg::Model;
use clap::Parser;

#[derive(Parser, Debug)]
#[command(about = "A program to perform word segmentation.")]
struct Args {
    /// The model file to use when analyzing text
    #[arg(long)]
    model: PathBuf,

    /// Output character-tag pairs (e.g. `我/S 喜/B 欢/E`) instead of words
    #[arg(long)]
    tags: bool,

    /// Reject tags outside the vocabulary of the model's tag scheme
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;
    let scheme = model.scheme();
    eprintln!("# of rules: {}", model.rules().len());
    let tagger = model.into_tagger()?;

    eprintln!("Start tokenization");
    let mut out = BufWriter::new(stdout().lock());
    let mut n_chars = 0;
    let start = Instant::now();
    for line in stdin().lock().lines() {
        let line = line?;
        let ctx = tagger.tag(&line);
        n_chars += ctx.len();
        if args.tags {
            let pairs: Vec<_> = ctx.iter().map(|(c, tag)| format!("{c}/{tag}")).collect();
            writeln!(out, "{}", pairs.join(" "))?;
        } else {
            let words = scheme.untag(&ctx, args.strict)?;
            writeln!(out, "{}", words.join(" "))?;
        }
    }
    out.flush()?;
    let duration = start.elapsed();
    eprintln!("Elapsed: {} [sec]", duration.as_secs_f64());
    eprintln!(
        "Speed: {} [chars/sec]",
        n_chars as f64 / duration.as_secs_f64()
    );

    Ok(())
}
