use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};

use crate::context::{CharacterClass, Context, Tag};
use crate::errors::{BrillError, Result};

/// What a predicate reads from a position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Decode, Encode)]
pub enum PredicateKind {
    /// The current tag.
    Tag,

    /// The literal character.
    Character,

    /// The [`CharacterClass`] of the character.
    Class,
}

impl PredicateKind {
    /// Reads the value of this kind at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    pub fn read(&self, ctx: &Context, idx: usize) -> Condition {
        match self {
            Self::Tag => Condition::Tag(ctx.tag(idx).clone()),
            Self::Character => Condition::Character(ctx.char(idx)),
            Self::Class => Condition::Class(CharacterClass::get_class(ctx.char(idx))),
        }
    }

    const fn as_str(&self) -> &'static str {
        match self {
            Self::Tag => "T",
            Self::Character => "C",
            Self::Class => "K",
        }
    }
}

impl fmt::Display for PredicateKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PredicateKind {
    type Err = BrillError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "T" => Ok(Self::Tag),
            "C" => Ok(Self::Character),
            "K" => Ok(Self::Class),
            _ => Err(BrillError::invalid_argument(
                "kind",
                format!("unknown predicate kind: {s}"),
            )),
        }
    }
}

/// Expected value of a predicate.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Decode, Encode)]
pub enum Condition {
    /// The tag equals the given one.
    Tag(Tag),

    /// The character equals the given one.
    Character(char),

    /// The character belongs to the given class.
    Class(CharacterClass),
}

impl Condition {
    /// Parses a value written in the notation of [`fmt::Display`].
    ///
    /// # Errors
    ///
    /// [`BrillError::InvalidArgument`] is returned if `value` is not valid for `kind`.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::{CharacterClass, Condition, PredicateKind};
    ///
    /// let cond = Condition::parse(PredicateKind::Class, "Date").unwrap();
    /// assert_eq!(Condition::Class(CharacterClass::Date), cond);
    /// assert!(Condition::parse(PredicateKind::Character, "ab").is_err());
    /// ```
    pub fn parse(kind: PredicateKind, value: &str) -> Result<Self> {
        match kind {
            PredicateKind::Tag => {
                if value.is_empty() {
                    return Err(BrillError::invalid_argument("value", "empty tag"));
                }
                Ok(Self::Tag(Tag::new(value)))
            }
            PredicateKind::Character => {
                let mut chars = value.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Self::Character(c)),
                    _ => Err(BrillError::invalid_argument(
                        "value",
                        format!("expected exactly one character: {value:?}"),
                    )),
                }
            }
            PredicateKind::Class => Ok(Self::Class(value.parse()?)),
        }
    }

    /// Gets the kind of the condition.
    pub const fn kind(&self) -> PredicateKind {
        match self {
            Self::Tag(_) => PredicateKind::Tag,
            Self::Character(_) => PredicateKind::Character,
            Self::Class(_) => PredicateKind::Class,
        }
    }

    #[inline(always)]
    fn matches(&self, ctx: &Context, idx: usize) -> bool {
        match self {
            Self::Tag(tag) => ctx.tag(idx) == tag,
            Self::Character(c) => ctx.char(idx) == *c,
            Self::Class(class) => CharacterClass::get_class(ctx.char(idx)) == *class,
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Tag(tag) => fmt::Display::fmt(tag, f),
            Self::Character(c) => fmt::Display::fmt(c, f),
            Self::Class(class) => fmt::Display::fmt(class, f),
        }
    }
}

/// A boolean test at a position relative to an evaluation index.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Decode, Encode)]
pub struct Predicate {
    offset: isize,
    condition: Condition,
    negate: bool,
}

impl Predicate {
    /// Creates a new predicate.
    pub const fn new(offset: isize, condition: Condition, negate: bool) -> Self {
        Self {
            offset,
            condition,
            negate,
        }
    }

    /// Gets the relative offset.
    pub const fn offset(&self) -> isize {
        self.offset
    }

    /// Gets the expected value.
    pub const fn condition(&self) -> &Condition {
        &self.condition
    }

    /// Whether the result is inverted.
    pub const fn negate(&self) -> bool {
        self.negate
    }

    /// Tests the predicate at `idx`.
    ///
    /// A position outside the context passes vacuously before negation is applied, so an
    /// out-of-range negated predicate fails.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::{Condition, Context, Predicate, Tag};
    ///
    /// let ctx = Context::from_chars(&['a', 'b'], &Tag::new("S"));
    /// let p = Predicate::new(-5, Condition::Tag(Tag::new("X")), false);
    /// assert!(p.test(&ctx, 0));
    /// let p = Predicate::new(-5, Condition::Tag(Tag::new("X")), true);
    /// assert!(!p.test(&ctx, 0));
    /// ```
    #[inline(always)]
    pub fn test(&self, ctx: &Context, idx: usize) -> bool {
        let base = ctx
            .resolve(idx, self.offset)
            .map_or(true, |i| self.condition.matches(ctx, i));
        base != self.negate
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.negate {
            f.write_str("!")?;
        }
        write!(
            f,
            "{:+}:{}:{}",
            self.offset,
            self.condition.kind(),
            self.condition
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(text: &str, tags: &[&str]) -> Context {
        text.chars().zip(tags.iter().map(|&t| Tag::new(t))).collect()
    }

    #[test]
    fn test_predicate_out_of_range() {
        let ctx = context("abc", &["B", "E", "E"]);
        let cond = Condition::Tag(Tag::new("X"));

        assert!(Predicate::new(-5, cond.clone(), false).test(&ctx, 0));
        assert!(!Predicate::new(-5, cond.clone(), true).test(&ctx, 0));
        assert!(Predicate::new(1, cond.clone(), false).test(&ctx, 2));
        assert!(!Predicate::new(1, cond, true).test(&ctx, 2));
    }

    #[test]
    fn test_predicate_tag() {
        let ctx = context("abc", &["B", "E", "S"]);
        let p = Predicate::new(-1, Condition::Tag(Tag::new("B")), false);

        assert!(p.test(&ctx, 1));
        assert!(!p.test(&ctx, 2));
    }

    #[test]
    fn test_predicate_character_negated() {
        let ctx = context("abc", &["B", "E", "S"]);
        let p = Predicate::new(1, Condition::Character('c'), true);

        assert!(p.test(&ctx, 0));
        assert!(!p.test(&ctx, 1));
    }

    #[test]
    fn test_predicate_class() {
        let ctx = context("2月x", &["B", "E", "S"]);
        let p = Predicate::new(0, Condition::Class(CharacterClass::Date), false);

        assert!(!p.test(&ctx, 0));
        assert!(p.test(&ctx, 1));
        assert!(!p.test(&ctx, 2));
    }

    #[test]
    fn test_kind_read() {
        let ctx = context("2月", &["B", "E"]);

        assert_eq!(
            Condition::Tag(Tag::new("E")),
            PredicateKind::Tag.read(&ctx, 1)
        );
        assert_eq!(
            Condition::Character('月'),
            PredicateKind::Character.read(&ctx, 1)
        );
        assert_eq!(
            Condition::Class(CharacterClass::Number),
            PredicateKind::Class.read(&ctx, 0)
        );
    }

    #[test]
    fn test_predicate_display() {
        let p = Predicate::new(-1, Condition::Tag(Tag::new("B")), false);
        assert_eq!("-1:T:B", p.to_string());

        let p = Predicate::new(2, Condition::Character('猫'), true);
        assert_eq!("!+2:C:猫", p.to_string());

        let p = Predicate::new(0, Condition::Class(CharacterClass::Letter), false);
        assert_eq!("+0:K:Letter", p.to_string());
    }

    #[test]
    fn test_condition_parse() {
        assert_eq!(
            Condition::Character('a'),
            Condition::parse(PredicateKind::Character, "a").unwrap()
        );
        assert_eq!(
            Condition::Tag(Tag::new("B1")),
            Condition::parse(PredicateKind::Tag, "B1").unwrap()
        );
        assert!(Condition::parse(PredicateKind::Tag, "").is_err());
        assert!(Condition::parse(PredicateKind::Class, "Kanji").is_err());
        assert!("X".parse::<PredicateKind>().is_err());
    }
}
