use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use brillseg::{Condition, Model, Predicate, Rule, Tag};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Parser, Debug)]
#[command(about = "A program to manipulate trained models.")]
struct Args {
    /// Input path of the model file
    #[arg(long)]
    model_in: PathBuf,

    /// Output path of the model file
    #[arg(long)]
    model_out: Option<PathBuf>,

    /// Output the rules contained in the model.
    #[arg(long)]
    dump_rules: Option<PathBuf>,

    /// Replace the rules if the argument is specified.
    #[arg(long)]
    replace_rules: Option<PathBuf>,
}

/// One predicate of a rule.
///
/// A rule without clauses is written as a single record without `clause`. An empty clause is
/// written as a single record without predicate fields.
#[derive(Debug, PartialEq, Eq, Deserialize, Serialize)]
struct RuleRecordFlatten {
    rule: usize,
    from_tag: String,
    to_tag: String,
    clause: Option<usize>,
    offset: Option<isize>,
    kind: Option<String>,
    value: Option<String>,
    negate: Option<bool>,
}

fn flatten_rules(rules: &[Rule]) -> Vec<RuleRecordFlatten> {
    let mut records = vec![];
    for (i, rule) in rules.iter().enumerate() {
        let record = |clause: Option<usize>, predicate: Option<&Predicate>| RuleRecordFlatten {
            rule: i,
            from_tag: rule.from_tag().to_string(),
            to_tag: rule.to_tag().to_string(),
            clause,
            offset: predicate.map(Predicate::offset),
            kind: predicate.map(|p| p.condition().kind().to_string()),
            value: predicate.map(|p| p.condition().to_string()),
            negate: predicate.map(Predicate::negate),
        };
        if rule.clauses().is_empty() {
            records.push(record(None, None));
        }
        for (j, clause) in rule.clauses().iter().enumerate() {
            if clause.is_empty() {
                records.push(record(Some(j), None));
            }
            for predicate in clause {
                records.push(record(Some(j), Some(predicate)));
            }
        }
    }
    records
}

fn unflatten_rules<I>(records: I) -> Result<Vec<Rule>, Box<dyn std::error::Error>>
where
    I: IntoIterator<Item = RuleRecordFlatten>,
{
    let mut rules: BTreeMap<usize, (String, String, BTreeMap<usize, Vec<Predicate>>)> =
        BTreeMap::new();
    for record in records {
        let (from_tag, to_tag, clauses) = rules
            .entry(record.rule)
            .or_insert_with(|| (record.from_tag.clone(), record.to_tag.clone(), BTreeMap::new()));
        if *from_tag != record.from_tag || *to_tag != record.to_tag {
            return Err(format!("inconsistent tags in rule {}", record.rule).into());
        }
        let Some(clause) = record.clause else {
            continue;
        };
        let predicates = clauses.entry(clause).or_default();
        match (record.offset, record.kind, record.value, record.negate) {
            (Some(offset), Some(kind), Some(value), negate) => {
                let condition = Condition::parse(kind.parse()?, &value)?;
                predicates.push(Predicate::new(offset, condition, negate.unwrap_or(false)));
            }
            (None, None, None, None) => (),
            _ => return Err(format!("incomplete predicate in rule {}", record.rule).into()),
        }
    }
    Ok(rules
        .into_values()
        .map(|(from_tag, to_tag, clauses)| {
            Rule::new(
                Tag::new(from_tag),
                Tag::new(to_tag),
                clauses.into_values().collect(),
            )
        })
        .collect())
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let args = Args::parse();

    eprintln!("Loading model file...");
    let mut f = zstd::Decoder::new(fs::File::open(args.model_in)?)?;
    let mut model = Model::read(&mut f)?;

    if let Some(path) = args.dump_rules {
        eprintln!("Saving rule file...");
        let file = fs::File::create(path)?;
        let mut wtr = csv::Writer::from_writer(file);
        for record in flatten_rules(model.rules()) {
            wtr.serialize(record)?;
        }
        wtr.flush()?;
    }

    if let Some(path) = args.replace_rules {
        eprintln!("Loading rule file...");
        let file = fs::File::open(path)?;
        let mut rdr = csv::Reader::from_reader(file);
        let mut records = vec![];
        for result in rdr.deserialize() {
            let record: RuleRecordFlatten = result?;
            records.push(record);
        }
        let rules = unflatten_rules(records)?;
        eprintln!("# of rules: {}", rules.len());
        model.replace_rules(rules);
    }

    if let Some(path) = args.model_out {
        eprintln!("Saving model file...");
        let mut f = zstd::Encoder::new(fs::File::create(path)?, 19)?;
        model.write(&mut f)?;
        f.finish()?;
    }

    Ok(())
}
