use std::collections::BTreeSet;
use std::fs::File;
use std::io::{prelude::*, stdin};
use std::path::PathBuf;
use std::str::FromStr;

use brillseg::Model;
use clap::Parser;

#[derive(Clone, Debug)]
enum EvaluationMetric {
    CharBoundaryAccuracy,
    WordAccuracy,
}

impl FromStr for EvaluationMetric {
    type Err = &'static str;
    fn from_str(metric: &str) -> Result<Self, Self::Err> {
        match metric {
            "char" => Ok(Self::CharBoundaryAccuracy),
            "word" => Ok(Self::WordAccuracy),
            _ => Err("Could not parse a metric value"),
        }
    }
}

#[derive(Parser, Debug)]
#[command(about = "A program to evaluate the accuracy of Brillseg.")]
struct Args {
    /// The model file to use when analyzing text
    #[arg(long)]
    model: PathBuf,

    /// Evaluation metric: {char, word}.
    /// char: evaluates each character boundary.
    /// word: evaluates each word span.
    #[arg(long, default_value = "char")]
    metric: EvaluationMetric,
}

/// Returns whether a word boundary exists after each character except the last one.
fn boundaries<S>(words: &[S]) -> Vec<bool>
where
    S: AsRef<str>,
{
    let mut result = vec![];
    for word in words {
        let len = word.as_ref().chars().count();
        if len == 0 {
            continue;
        }
        result.extend((1..len).map(|_| false));
        result.push(true);
    }
    result.pop();
    result
}

/// Returns the character spans of the words.
fn spans<S>(words: &[S]) -> BTreeSet<(usize, usize)>
where
    S: AsRef<str>,
{
    let mut result = BTreeSet::new();
    let mut start = 0;
    for word in words {
        let end = start + word.as_ref().chars().count();
        if end != start {
            result.insert((start, end));
        }
        start = end;
    }
    result
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(File::open(args.model)?)?;
    let model = Model::read(&mut f)?;
    let scheme = model.scheme();
    let tagger = model.into_tagger()?;

    eprintln!("Start tokenization");

    let mut results = vec![];
    for line in stdin().lock().lines() {
        let line = line?;
        let reference: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if reference.is_empty() {
            continue;
        }
        let ctx = tagger.tag(&reference.concat());
        let hypothesis = scheme.untag(&ctx, false)?;
        results.push((reference, hypothesis));
    }

    match args.metric {
        EvaluationMetric::CharBoundaryAccuracy => {
            let mut n_tp = 0;
            let mut n_tn = 0;
            let mut n_fp = 0;
            let mut n_fn = 0;
            for (reference, hypothesis) in results {
                let rs = boundaries(&reference);
                let hs = boundaries(&hypothesis);
                for (r, h) in rs.into_iter().zip(hs) {
                    if r == h {
                        if h {
                            n_tp += 1;
                        } else {
                            n_tn += 1;
                        }
                    } else if h {
                        n_fp += 1;
                    } else {
                        n_fn += 1;
                    }
                }
            }
            let precision = n_tp as f64 / (n_tp + n_fp) as f64;
            let recall = n_tp as f64 / (n_tp + n_fn) as f64;
            let f1 = 2. * precision * recall / (precision + recall);
            println!("Precision: {}", precision);
            println!("Recall: {}", recall);
            println!("F1: {}", f1);
            println!("TP: {}, TN: {}, FP: {}, FN: {}", n_tp, n_tn, n_fp, n_fn);
        }
        EvaluationMetric::WordAccuracy => {
            // A word is correct if both of its ends and no inner boundary match the reference.
            let mut n_sys = 0;
            let mut n_ref = 0;
            let mut n_cor = 0;
            for (reference, hypothesis) in results {
                let rs = spans(&reference);
                let hs = spans(&hypothesis);
                n_cor += rs.intersection(&hs).count();
                n_ref += rs.len();
                n_sys += hs.len();
            }
            let precision = n_cor as f64 / n_sys as f64;
            let recall = n_cor as f64 / n_ref as f64;
            let f1 = 2. * precision * recall / (precision + recall);
            println!("Precision: {}", precision);
            println!("Recall: {}", recall);
            println!("F1: {}", f1);
        }
    }

    Ok(())
}
