use std::collections::{BTreeMap, BTreeSet};
use std::time::{Duration, Instant};

use hashbrown::{HashMap, HashSet};
use log::{debug, info};

#[cfg(feature = "multithreading")]
use rayon::prelude::*;

use crate::context::{Context, Tag};
use crate::errors::{BrillError, Result};
use crate::initial_tagger::InitialTagger;
use crate::rule::Rule;
use crate::template::Template;

/// Positions of the working context grouped by their current tag.
///
/// Each position belongs to exactly one set: `correct[t]` if its current tag `t` equals the gold
/// tag, `error[t]` otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionIndex {
    correct: BTreeMap<Tag, BTreeSet<usize>>,
    error: BTreeMap<Tag, BTreeSet<usize>>,
}

impl PositionIndex {
    /// Builds the index from current and gold tags of equal length.
    pub fn new(current: &[Tag], gold: &[Tag]) -> Self {
        let mut index = Self::default();
        for (i, (tag, gold_tag)) in current.iter().zip(gold).enumerate() {
            index.insert(i, tag, gold_tag);
        }
        index
    }

    /// Gets the correctly tagged positions currently holding `tag`.
    pub fn correct<'a>(&'a self, tag: &Tag) -> impl Iterator<Item = usize> + 'a {
        self.correct.get(tag).into_iter().flatten().copied()
    }

    /// Gets the wrongly tagged positions currently holding `tag`.
    pub fn error<'a>(&'a self, tag: &Tag) -> impl Iterator<Item = usize> + 'a {
        self.error.get(tag).into_iter().flatten().copied()
    }

    /// Returns the total number of wrongly tagged positions.
    pub fn n_errors(&self) -> usize {
        self.error.values().map(BTreeSet::len).sum()
    }

    fn insert(&mut self, idx: usize, tag: &Tag, gold_tag: &Tag) {
        let sets = if tag == gold_tag {
            &mut self.correct
        } else {
            &mut self.error
        };
        sets.entry(tag.clone()).or_default().insert(idx);
    }

    fn retag(&mut self, idx: usize, old_tag: &Tag, new_tag: &Tag, gold_tag: &Tag) {
        for sets in [&mut self.correct, &mut self.error] {
            if let Some(set) = sets.get_mut(old_tag) {
                set.remove(&idx);
                if set.is_empty() {
                    sets.remove(old_tag);
                }
            }
        }
        self.insert(idx, new_tag, gold_tag);
    }
}

struct Candidate {
    rule: Rule,

    // Error positions the rule retags.
    changes: Vec<usize>,

    // Correct positions the rule would break, found so far.
    damage: Vec<usize>,

    score: isize,

    // Next index into the snapshot of correct positions.
    cursor: usize,
}

enum Walk {
    Exhausted,
    Dropped,
    Overtaken,
}

/// Rule learner.
///
/// Each round instantiates candidate rules at every error position, picks the one with the best
/// net improvement over the working context and commits it.
///
/// # Examples
///
/// ```
/// use brillseg::{ConstantTagger, PredicateKind, PredicateTemplate, Tag, TagScheme, Trainer};
///
/// let gold = TagScheme::BeginEndSingle.tag(["ab", "c", "ab"]);
/// let initial = ConstantTagger::new(Tag::new("S"));
/// let templates = vec![
///     PredicateTemplate::unigram(1, PredicateKind::Character),
///     PredicateTemplate::unigram(-1, PredicateKind::Character),
/// ];
/// let mut trainer = Trainer::new(&gold, &initial, &templates, 10, 1).unwrap();
/// let rules = trainer.train();
/// assert!(!rules.is_empty());
/// assert_eq!(0, trainer.n_errors());
/// ```
pub struct Trainer<'a, T> {
    gold: Vec<Tag>,
    templates: &'a [T],
    context: Context,
    index: PositionIndex,
    rules: Vec<Rule>,
    committed: HashSet<Rule>,
    max_rules: usize,
    min_score: isize,
    time_limit: Option<Duration>,
}

impl<'a, T> Trainer<'a, T>
where
    T: Template,
{
    /// Creates a new trainer.
    ///
    /// # Arguments
    ///
    /// * `gold` - Gold-tagged training data.
    /// * `initial_tagger` - Tagger producing the working context from the gold characters.
    /// * `templates` - Rule templates, tried in order at each error position.
    /// * `max_rules` - Training stops once the rule list is longer than this value, so at most
    ///   `max_rules + 1` rules are learned.
    /// * `min_score` - Minimum net improvement of a committed rule (inclusive). A value of `0` or
    ///   less admits rules that do not reduce, or even increase, the number of errors.
    ///
    /// # Errors
    ///
    /// [`BrillError::InvalidArgument`] is returned if the initial tagger does not return one
    /// tag per character.
    pub fn new<I>(
        gold: &Context,
        initial_tagger: &I,
        templates: &'a [T],
        max_rules: usize,
        min_score: isize,
    ) -> Result<Self>
    where
        I: InitialTagger + ?Sized,
    {
        let context = initial_tagger.tag(gold.chars());
        if context.len() != gold.len() || context.chars() != gold.chars() {
            return Err(BrillError::invalid_argument(
                "initial_tagger",
                format!(
                    "must tag every input character: expected {} characters, got {}",
                    gold.len(),
                    context.len()
                ),
            ));
        }
        let index = PositionIndex::new(context.tags(), gold.tags());
        Ok(Self {
            gold: gold.tags().to_vec(),
            templates,
            context,
            index,
            rules: vec![],
            committed: HashSet::new(),
            max_rules,
            min_score,
            time_limit: None,
        })
    }

    /// Bounds the wall-clock time spent in [`Trainer::train()`].
    ///
    /// The limit is checked between rounds, so a round in progress is always finished.
    pub fn time_limit(mut self, limit: Duration) -> Self {
        self.time_limit = Some(limit);
        self
    }

    /// Runs rounds until no rule reaches `min_score`, the rule budget is spent or the time limit
    /// is exceeded.
    ///
    /// # Returns
    ///
    /// All rules learned so far.
    pub fn train(&mut self) -> &[Rule] {
        let start = Instant::now();
        info!("initial errors: {}", self.n_errors());
        while self.rules.len() <= self.max_rules {
            if let Some(limit) = self.time_limit {
                if start.elapsed() >= limit {
                    info!("time limit exceeded after {} rules", self.rules.len());
                    break;
                }
            }
            if self.step().is_none() {
                break;
            }
        }
        info!(
            "finished: {} rules, {} errors remaining",
            self.rules.len(),
            self.n_errors()
        );
        &self.rules
    }

    /// Runs a single round.
    ///
    /// # Returns
    ///
    /// The committed rule, or `None` if no candidate reaches `min_score`.
    pub fn step(&mut self) -> Option<&Rule> {
        let candidates = self.generate_candidates();
        let n_generated = candidates.len();

        #[cfg(not(feature = "multithreading"))]
        let mut candidates: Vec<_> = candidates
            .into_iter()
            .filter_map(|rule| self.score(rule))
            .collect();
        #[cfg(feature = "multithreading")]
        let mut candidates: Vec<_> = candidates
            .into_par_iter()
            .filter_map(|rule| self.score(rule))
            .collect();

        debug!(
            "round {}: {} candidates, {} above threshold",
            self.rules.len() + 1,
            n_generated,
            candidates.len()
        );

        let winner = self.select(&mut candidates)?;
        self.commit(candidates.swap_remove(winner));
        self.rules.last()
    }

    /// Returns the number of wrongly tagged positions in the working context.
    pub fn n_errors(&self) -> usize {
        self.index.n_errors()
    }

    /// Gets the working context.
    pub const fn context(&self) -> &Context {
        &self.context
    }

    /// Gets the position index of the working context.
    pub const fn index(&self) -> &PositionIndex {
        &self.index
    }

    /// Gets the learned rules in commit order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Consumes the trainer and returns the learned rules.
    pub fn into_rules(self) -> Vec<Rule> {
        self.rules
    }

    /// Instantiates every template at every error position.
    ///
    /// The result contains no duplicates and no committed rules, sorted in canonical order.
    fn generate_candidates(&self) -> Vec<Rule> {
        let mut seen = HashSet::new();
        for (from_tag, positions) in &self.index.error {
            for &idx in positions {
                let to_tag = &self.gold[idx];
                for template in self.templates {
                    if let Some(rule) = template.instantiate(from_tag, to_tag, &self.context, idx) {
                        if !self.committed.contains(&rule) {
                            seen.insert(rule);
                        }
                    }
                }
            }
        }
        let mut candidates: Vec<_> = seen.into_iter().collect();
        candidates.sort_unstable();
        candidates
    }

    /// Counts the errors `rule` fixes, ignoring damage to correct positions.
    fn score(&self, rule: Rule) -> Option<Candidate> {
        let changes: Vec<usize> = self
            .index
            .error(rule.from_tag())
            .filter(|&i| rule.applies(&self.context, i))
            .collect();
        let n_fixed = changes
            .iter()
            .filter(|&&i| self.gold[i] == *rule.to_tag())
            .count();
        let score = isize::try_from(n_fixed).unwrap_or(isize::MAX);
        (score >= self.min_score).then_some(Candidate {
            rule,
            changes,
            damage: vec![],
            score,
            cursor: 0,
        })
    }

    /// Picks the candidate with the best net score.
    ///
    /// Candidates are taken from the highest score bucket, smallest index first. Damage is
    /// discovered lazily: a candidate walks the correct positions of its `from_tag` until it
    /// either reaches the end or falls behind another bucket.
    fn select(&self, candidates: &mut [Candidate]) -> Option<usize> {
        let mut buckets: BTreeMap<isize, BTreeSet<usize>> = BTreeMap::new();
        for (i, candidate) in candidates.iter().enumerate() {
            buckets.entry(candidate.score).or_default().insert(i);
        }
        let mut snapshots: HashMap<Tag, Vec<usize>> = HashMap::new();
        loop {
            let mut entry = buckets.last_entry()?;
            let Some(i) = entry.get_mut().pop_first() else {
                entry.remove();
                continue;
            };
            if entry.get().is_empty() {
                entry.remove();
            }
            let candidate = &mut candidates[i];
            let snapshot = snapshots
                .entry(candidate.rule.from_tag().clone())
                .or_insert_with(|| self.index.correct(candidate.rule.from_tag()).collect());
            match self.walk(candidate, snapshot, &buckets) {
                Walk::Exhausted => return Some(i),
                Walk::Dropped => (),
                Walk::Overtaken => {
                    buckets.entry(candidate.score).or_default().insert(i);
                }
            }
        }
    }

    fn walk(
        &self,
        candidate: &mut Candidate,
        snapshot: &[usize],
        buckets: &BTreeMap<isize, BTreeSet<usize>>,
    ) -> Walk {
        while let Some(&idx) = snapshot.get(candidate.cursor) {
            candidate.cursor += 1;
            if !candidate.rule.applies(&self.context, idx) {
                continue;
            }
            candidate.damage.push(idx);
            candidate.score -= 1;
            if candidate.score < self.min_score {
                return Walk::Dropped;
            }
            if buckets.range(candidate.score + 1..).next().is_some() {
                return Walk::Overtaken;
            }
        }
        Walk::Exhausted
    }

    /// Applies the winning rule to the working context.
    ///
    /// Damaged positions are retagged as well, so the working context stays identical to what
    /// the learned rules produce at runtime.
    fn commit(&mut self, candidate: Candidate) {
        let Candidate {
            rule,
            changes,
            damage,
            score,
            ..
        } = candidate;
        for idx in changes.into_iter().chain(damage) {
            self.index
                .retag(idx, rule.from_tag(), rule.to_tag(), &self.gold[idx]);
            self.context.set_tag(idx, rule.to_tag().clone());
        }
        info!(
            "rule #{}: {} (score: {}, errors: {})",
            self.rules.len() + 1,
            rule,
            score,
            self.index.n_errors()
        );
        self.committed.insert(rule.clone());
        self.rules.push(rule);
    }
}
