use crate::context::{Context, Tag};
use crate::predicate::{Predicate, PredicateKind};
use crate::rule::Rule;

/// Rule template.
///
/// A template describes the shape of rules. Given an error position, it binds the shape to the
/// values found around that position.
pub trait Template: Send + Sync {
    /// Instantiates a rule at `idx`.
    ///
    /// # Arguments
    ///
    /// * `from_tag` - The current tag at `idx`.
    /// * `to_tag` - The tag the rule should produce.
    /// * `ctx` - A tagged context.
    /// * `idx` - A position in `ctx`.
    ///
    /// # Returns
    ///
    /// A rule that applies at `idx`, or `None` if the template cannot be bound there.
    ///
    /// # Panics
    ///
    /// Implementations panic if the tag at `idx` is not `from_tag` or if `from_tag` equals
    /// `to_tag`.
    fn instantiate(&self, from_tag: &Tag, to_tag: &Tag, ctx: &Context, idx: usize)
        -> Option<Rule>;
}

/// Template made of `(offset, kind)` pairs, one clause per inner vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PredicateTemplate {
    clauses: Vec<Vec<(isize, PredicateKind)>>,
}

impl PredicateTemplate {
    /// Creates a new template.
    pub const fn new(clauses: Vec<Vec<(isize, PredicateKind)>>) -> Self {
        Self { clauses }
    }

    /// Creates a template with a single predicate.
    pub fn unigram(offset: isize, kind: PredicateKind) -> Self {
        Self::new(vec![vec![(offset, kind)]])
    }

    /// Creates a template with two single-predicate clauses.
    pub fn bigram(first: (isize, PredicateKind), second: (isize, PredicateKind)) -> Self {
        Self::new(vec![vec![first], vec![second]])
    }

    /// Creates a template with three single-predicate clauses.
    pub fn trigram(
        first: (isize, PredicateKind),
        second: (isize, PredicateKind),
        third: (isize, PredicateKind),
    ) -> Self {
        Self::new(vec![vec![first], vec![second], vec![third]])
    }

    /// Gets the clauses.
    pub fn clauses(&self) -> &[Vec<(isize, PredicateKind)>] {
        &self.clauses
    }

    /// Generates a general-purpose set of templates.
    ///
    /// The set contains tag unigrams at every non-zero offset within `window`, character and
    /// character class unigrams at every offset within `window`, and tag and character bigrams
    /// over adjacent offsets.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::{PredicateKind, PredicateTemplate};
    ///
    /// let templates = PredicateTemplate::default_set(1);
    /// assert!(templates.contains(&PredicateTemplate::unigram(-1, PredicateKind::Tag)));
    /// assert!(!templates.contains(&PredicateTemplate::unigram(0, PredicateKind::Tag)));
    /// ```
    pub fn default_set(window: u8) -> Vec<Self> {
        let window = isize::from(window);
        let mut templates = vec![];
        for offset in -window..=window {
            if offset != 0 {
                templates.push(Self::unigram(offset, PredicateKind::Tag));
            }
            templates.push(Self::unigram(offset, PredicateKind::Character));
            templates.push(Self::unigram(offset, PredicateKind::Class));
        }
        for offset in -window..window {
            let next = offset + 1;
            if offset != 0 && next != 0 {
                templates.push(Self::bigram(
                    (offset, PredicateKind::Tag),
                    (next, PredicateKind::Tag),
                ));
            }
            templates.push(Self::bigram(
                (offset, PredicateKind::Character),
                (next, PredicateKind::Character),
            ));
        }
        templates
    }
}

impl Template for PredicateTemplate {
    fn instantiate(
        &self,
        from_tag: &Tag,
        to_tag: &Tag,
        ctx: &Context,
        idx: usize,
    ) -> Option<Rule> {
        assert_eq!(ctx.tag(idx), from_tag, "`from_tag` must be the tag at `idx`");
        assert_ne!(from_tag, to_tag, "`from_tag` and `to_tag` must differ");
        let mut clauses = Vec::with_capacity(self.clauses.len());
        for clause in &self.clauses {
            let mut predicates = Vec::with_capacity(clause.len());
            for &(offset, kind) in clause {
                let pos = ctx.resolve(idx, offset)?;
                predicates.push(Predicate::new(offset, kind.read(ctx, pos), false));
            }
            clauses.push(predicates);
        }
        Some(Rule::new(from_tag.clone(), to_tag.clone(), clauses))
    }
}
