use std::fmt;

use bincode::{Decode, Encode};

use crate::context::{Context, Tag};
use crate::predicate::Predicate;

/// Transformation rule.
///
/// A rule retags a position from `from_tag` to `to_tag` if every clause holds, where a clause
/// holds if at least one of its predicates does.
///
/// Clauses are kept in canonical order, so two rules built from the same predicates in a
/// different order are equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Decode, Encode)]
pub struct Rule {
    from_tag: Tag,
    to_tag: Tag,
    clauses: Vec<Vec<Predicate>>,
}

impl Rule {
    /// Creates a new rule.
    ///
    /// # Arguments
    ///
    /// * `from_tag` - Tag to be replaced.
    /// * `to_tag` - Replacement tag.
    /// * `clauses` - Conjunction of disjunctive clauses.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::{Condition, Predicate, Rule, Tag};
    ///
    /// let p = Predicate::new(-1, Condition::Character('a'), false);
    /// let q = Predicate::new(1, Condition::Character('b'), false);
    /// let r1 = Rule::new(Tag::new("S"), Tag::new("E"), vec![vec![p.clone()], vec![q.clone()]]);
    /// let r2 = Rule::new(Tag::new("S"), Tag::new("E"), vec![vec![q], vec![p]]);
    /// assert_eq!(r1, r2);
    /// ```
    pub fn new(from_tag: Tag, to_tag: Tag, mut clauses: Vec<Vec<Predicate>>) -> Self {
        for clause in &mut clauses {
            clause.sort_unstable();
            clause.dedup();
        }
        clauses.sort_unstable();
        clauses.dedup();
        Self {
            from_tag,
            to_tag,
            clauses,
        }
    }

    /// Gets the tag to be replaced.
    pub const fn from_tag(&self) -> &Tag {
        &self.from_tag
    }

    /// Gets the replacement tag.
    pub const fn to_tag(&self) -> &Tag {
        &self.to_tag
    }

    /// Gets the clauses in canonical order.
    pub fn clauses(&self) -> &[Vec<Predicate>] {
        &self.clauses
    }

    /// Checks whether the rule's condition holds at `idx`.
    ///
    /// The current tag at `idx` is not checked against `from_tag`.
    #[inline]
    pub fn applies(&self, ctx: &Context, idx: usize) -> bool {
        self.clauses
            .iter()
            .all(|clause| clause.iter().any(|p| p.test(ctx, idx)))
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} -> {}", self.from_tag, self.to_tag)?;
        for (i, clause) in self.clauses.iter().enumerate() {
            f.write_str(if i == 0 { " if " } else { " & " })?;
            if clause.len() != 1 {
                f.write_str("(")?;
            }
            for (j, p) in clause.iter().enumerate() {
                if j != 0 {
                    f.write_str(" | ")?;
                }
                write!(f, "{p}")?;
            }
            if clause.len() != 1 {
                f.write_str(")")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::predicate::Condition;

    fn tag_pred(offset: isize, tag: &str) -> Predicate {
        Predicate::new(offset, Condition::Tag(Tag::new(tag)), false)
    }

    fn char_pred(offset: isize, c: char) -> Predicate {
        Predicate::new(offset, Condition::Character(c), false)
    }

    fn context(text: &str, tags: &[&str]) -> Context {
        text.chars().zip(tags.iter().map(|&t| Tag::new(t))).collect()
    }

    #[test]
    fn test_rule_canonical_order() {
        let r1 = Rule::new(
            Tag::new("S"),
            Tag::new("B"),
            vec![
                vec![char_pred(1, 'x'), tag_pred(-1, "S")],
                vec![tag_pred(2, "E")],
            ],
        );
        let r2 = Rule::new(
            Tag::new("S"),
            Tag::new("B"),
            vec![
                vec![tag_pred(2, "E")],
                vec![tag_pred(-1, "S"), char_pred(1, 'x'), tag_pred(-1, "S")],
            ],
        );

        assert_eq!(r1, r2);
        assert_eq!(
            &[vec![tag_pred(-1, "S"), char_pred(1, 'x')], vec![tag_pred(2, "E")]],
            r1.clauses()
        );
    }

    #[test]
    fn test_rule_different_tags() {
        let r1 = Rule::new(Tag::new("S"), Tag::new("B"), vec![vec![tag_pred(1, "E")]]);
        let r2 = Rule::new(Tag::new("S"), Tag::new("E"), vec![vec![tag_pred(1, "E")]]);

        assert_ne!(r1, r2);
    }

    #[test]
    fn test_rule_applies_conjunction() {
        let ctx = context("abcd", &["S", "S", "E", "S"]);
        let rule = Rule::new(
            Tag::new("S"),
            Tag::new("B"),
            vec![vec![char_pred(-1, 'a')], vec![tag_pred(1, "E")]],
        );

        assert!(rule.applies(&ctx, 1));
        assert!(!rule.applies(&ctx, 2));
        assert!(!rule.applies(&ctx, 3));
    }

    #[test]
    fn test_rule_applies_disjunction() {
        let ctx = context("abcd", &["S", "S", "E", "S"]);
        let rule = Rule::new(
            Tag::new("S"),
            Tag::new("B"),
            vec![vec![char_pred(0, 'a'), char_pred(0, 'd')]],
        );

        assert!(rule.applies(&ctx, 0));
        assert!(!rule.applies(&ctx, 1));
        assert!(rule.applies(&ctx, 3));
    }

    #[test]
    fn test_rule_applies_without_clauses() {
        let ctx = context("ab", &["S", "S"]);
        let rule = Rule::new(Tag::new("S"), Tag::new("B"), vec![]);

        assert!(rule.applies(&ctx, 0));
        assert!(rule.applies(&ctx, 1));
    }

    #[test]
    fn test_rule_display() {
        let rule = Rule::new(
            Tag::new("S"),
            Tag::new("B"),
            vec![
                vec![char_pred(1, 'x'), tag_pred(-1, "S")],
                vec![tag_pred(2, "E")],
            ],
        );

        assert_eq!("S -> B if (-1:T:S | +1:C:x) & +2:T:E", rule.to_string());
    }
}
