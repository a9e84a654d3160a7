use std::collections::BTreeSet;
use std::fs::File;
use std::io::{prelude::*, stderr, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use brillseg::{
    Baseline, BaselineTagger, ConstantTagger, MatchDirection, Model, PredicateTemplate, Tag,
    TagScheme, Trainer, UnigramTagger,
};
use clap::Parser;

#[derive(Clone, Debug)]
enum BaselineKind {
    Constant,
    Unigram,
    Dictionary,
}

impl FromStr for BaselineKind {
    type Err = &'static str;
    fn from_str(kind: &str) -> Result<Self, Self::Err> {
        match kind {
            "constant" => Ok(Self::Constant),
            "unigram" => Ok(Self::Unigram),
            "dict" => Ok(Self::Dictionary),
            _ => Err("Could not parse a baseline value"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "A program to train models of Brillseg.")]
struct Args {
    /// A tokenized training corpus (one sentence per line, words separated by whitespace)
    #[arg(long, required = true)]
    tok: Vec<PathBuf>,

    /// A word dictionary file (one word per line) for the `dict` baseline.
    /// Training words are used if no dictionary is given.
    #[arg(long)]
    dict: Vec<PathBuf>,

    /// The file to write the trained model to
    #[arg(long)]
    model: PathBuf,

    /// The tag scheme: {be, bes, bmes, b123mes}
    #[arg(long, default_value = "bes")]
    scheme: String,

    /// The initial tagger: {constant, unigram, dict}
    #[arg(long, default_value = "unigram")]
    baseline: BaselineKind,

    /// Match dictionary words from right to left in the `dict` baseline
    #[arg(long)]
    backward: bool,

    /// The tag assigned by the `constant` baseline (default: the one-character-word tag)
    #[arg(long)]
    constant_tag: Option<String>,

    /// The window of the default rule templates
    #[arg(long, default_value = "2")]
    window: u8,

    /// Training stops once more than this number of rules are learned
    #[arg(long, default_value = "200")]
    max_rules: usize,

    /// The minimum number of errors a rule must fix
    #[arg(long, default_value = "2")]
    min_score: isize,

    /// The time limit of training in seconds
    #[arg(long)]
    time_limit: Option<u64>,

    /// The number of workers for zstd (0 means multithreaded will be disabled)
    #[arg(long, default_value = "0")]
    zstd_workers: u32,
}

fn load_words(path: &Path, words: &mut Vec<String>) -> Result<(), Box<dyn std::error::Error>> {
    eprintln!("Loading {path:?} ...");
    let f = File::open(path)?;
    let f = BufReader::new(f);
    for (i, line) in f.lines().enumerate() {
        if i % 10000 == 0 {
            eprint!("# of sentences: {i}\r");
            stderr().flush()?;
        }
        words.extend(line?.split_whitespace().map(str::to_string));
    }
    eprintln!("# of words: {}", words.len());
    Ok(())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    let scheme: TagScheme = args.scheme.parse()?;

    eprintln!("Loading dataset...");
    let mut train_words = vec![];
    for path in &args.tok {
        load_words(path, &mut train_words)?;
    }
    let gold = scheme.tag(&train_words);
    eprintln!("# of characters: {}", gold.len());

    let baseline = match args.baseline {
        BaselineKind::Constant => {
            let tag = args
                .constant_tag
                .map_or_else(|| scheme.single_tag(), Tag::new);
            Baseline::Constant(ConstantTagger::new(tag))
        }
        BaselineKind::Unigram => Baseline::Unigram(UnigramTagger::new(scheme, &train_words)),
        BaselineKind::Dictionary => {
            let mut dictionary = BTreeSet::new();
            if args.dict.is_empty() {
                dictionary.extend(train_words.iter().cloned());
            }
            for path in &args.dict {
                eprintln!("Loading {path:?} ...");
                let f = BufReader::new(File::open(path)?);
                for line in f.lines() {
                    let line = line?;
                    let word = line.trim();
                    if !word.is_empty() {
                        dictionary.insert(word.to_string());
                    }
                }
            }
            eprintln!("# of dictionary words: {}", dictionary.len());
            let direction = if args.backward {
                MatchDirection::Backward
            } else {
                MatchDirection::Forward
            };
            Baseline::Dictionary {
                words: dictionary.into_iter().collect(),
                direction,
            }
        }
    };
    let initial_tagger = BaselineTagger::new(baseline.clone(), scheme)?;

    let templates = PredicateTemplate::default_set(args.window);
    eprintln!("# of templates: {}", templates.len());

    let mut trainer = Trainer::new(
        &gold,
        &initial_tagger,
        &templates,
        args.max_rules,
        args.min_score,
    )?;
    if let Some(secs) = args.time_limit {
        trainer = trainer.time_limit(Duration::from_secs(secs));
    }
    eprintln!("# of initial errors: {}", trainer.n_errors());

    eprintln!("Start training...");
    trainer.train();
    eprintln!(
        "Finish training: {} rules, {} errors",
        trainer.rules().len(),
        trainer.n_errors()
    );

    let model = Model::new(scheme, baseline, trainer.into_rules());
    let mut f = zstd::Encoder::new(File::create(args.model)?, 19)?;
    f.multithread(args.zstd_workers)?;
    model.write(&mut f)?;
    f.finish()?;

    Ok(())
}
