use std::collections::BTreeSet;

use hashbrown::HashMap;

use crate::context::{Context, Tag};
use crate::initial_tagger::InitialTagger;
use crate::rule::Rule;

/// Applies an initial tagger followed by an ordered rule list.
pub struct Tagger<I> {
    initial_tagger: I,
    rules: Vec<Rule>,
}

impl<I> Tagger<I>
where
    I: InitialTagger,
{
    /// Creates a new tagger.
    ///
    /// # Arguments
    ///
    /// * `initial_tagger` - Tagger producing the first tagging.
    /// * `rules` - Rules applied once each, in order.
    pub const fn new(initial_tagger: I, rules: Vec<Rule>) -> Self {
        Self {
            initial_tagger,
            rules,
        }
    }

    /// Tags a text.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::{Condition, ConstantTagger, Predicate, Rule, Tag, Tagger};
    ///
    /// let rule = Rule::new(
    ///     Tag::new("S"),
    ///     Tag::new("B"),
    ///     vec![vec![Predicate::new(1, Condition::Character('猫'), false)]],
    /// );
    /// let tagger = Tagger::new(ConstantTagger::new(Tag::new("S")), vec![rule]);
    /// let ctx = tagger.tag("小猫咪");
    /// assert_eq!("B", ctx.tag(0).as_str());
    /// assert_eq!("S", ctx.tag(1).as_str());
    /// ```
    pub fn tag(&self, text: &str) -> Context {
        let chars: Vec<char> = text.chars().collect();
        self.tag_chars(&chars)
    }

    /// Tags a character sequence.
    pub fn tag_chars(&self, chars: &[char]) -> Context {
        let mut ctx = self.initial_tagger.tag(chars);
        let mut positions: HashMap<Tag, BTreeSet<usize>> = HashMap::new();
        for (i, tag) in ctx.tags().iter().enumerate() {
            positions.entry(tag.clone()).or_default().insert(i);
        }
        for rule in &self.rules {
            let Some(from_positions) = positions.get_mut(rule.from_tag()) else {
                continue;
            };
            // All positions are decided before any of them is retagged.
            let changes: Vec<usize> = from_positions
                .iter()
                .copied()
                .filter(|&i| rule.applies(&ctx, i))
                .collect();
            if changes.is_empty() {
                continue;
            }
            for i in &changes {
                from_positions.remove(i);
            }
            let to_positions = positions.entry(rule.to_tag().clone()).or_default();
            for i in changes {
                to_positions.insert(i);
                ctx.set_tag(i, rule.to_tag().clone());
            }
        }
        ctx
    }

    /// Gets the rules in application order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Gets the initial tagger.
    pub const fn initial_tagger(&self) -> &I {
        &self.initial_tagger
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::initial_tagger::ConstantTagger;
    use crate::predicate::{Condition, Predicate};

    fn tag_strs(ctx: &Context) -> Vec<&str> {
        ctx.tags().iter().map(|t| t.as_str()).collect()
    }

    fn char_rule(from_tag: &str, to_tag: &str, offset: isize, c: char) -> Rule {
        Rule::new(
            Tag::new(from_tag),
            Tag::new(to_tag),
            vec![vec![Predicate::new(offset, Condition::Character(c), false)]],
        )
    }

    fn tag_rule(from_tag: &str, to_tag: &str, offset: isize, tag: &str) -> Rule {
        Rule::new(
            Tag::new(from_tag),
            Tag::new(to_tag),
            vec![vec![Predicate::new(
                offset,
                Condition::Tag(Tag::new(tag)),
                false,
            )]],
        )
    }

    #[test]
    fn test_tag_without_rules() {
        let tagger = Tagger::new(ConstantTagger::new(Tag::new("S")), vec![]);
        let ctx = tagger.tag("abc");

        assert_eq!(vec!["S", "S", "S"], tag_strs(&ctx));
        assert!(tagger.rules().is_empty());
    }

    #[test]
    fn test_tag_empty() {
        let tagger = Tagger::new(
            ConstantTagger::new(Tag::new("S")),
            vec![tag_rule("S", "B", 1, "S")],
        );

        assert!(tagger.tag("").is_empty());
    }

    #[test]
    fn test_tag_simultaneous() {
        // Every `S` preceded by `S` becomes `B`. The decision for a character must not see the
        // new tag of the previous one.
        let tagger = Tagger::new(
            ConstantTagger::new(Tag::new("S")),
            vec![tag_rule("S", "B", -1, "S")],
        );
        let ctx = tagger.tag("abcd");

        // The first position passes vacuously.
        assert_eq!(vec!["B", "B", "B", "B"], tag_strs(&ctx));
    }

    #[test]
    fn test_tag_deterministic() {
        let tagger = Tagger::new(
            ConstantTagger::new(Tag::new("S")),
            vec![
                char_rule("S", "B", 1, '欢'),
                tag_rule("S", "E", -1, "B"),
                char_rule("E", "S", 0, '我'),
            ],
        );
        let first = tagger.tag("我喜欢吃苹果");
        for _ in 0..10 {
            assert_eq!(first, tagger.tag("我喜欢吃苹果"));
        }
        assert_eq!(vec!["S", "B", "E", "S", "S", "B"], tag_strs(&first));
    }

    #[test]
    fn test_tag_order_sensitive() {
        let r1 = char_rule("S", "B", 1, 'b');
        let r2 = tag_rule("S", "E", -1, "B");

        let tagger = Tagger::new(
            ConstantTagger::new(Tag::new("S")),
            vec![r1.clone(), r2.clone()],
        );
        assert_eq!(vec!["B", "E", "B"], tag_strs(&tagger.tag("abc")));

        let tagger = Tagger::new(ConstantTagger::new(Tag::new("S")), vec![r2, r1]);
        assert_eq!(vec!["E", "S", "B"], tag_strs(&tagger.tag("abc")));
    }
}
