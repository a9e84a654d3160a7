use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};

use crate::errors::{BrillError, Result};

/// Character-level tag such as `B` or `E`.
///
/// The alphabet is defined by a [`TagScheme`](crate::TagScheme), but any string is accepted so
/// that external taggers may bring their own tags.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Decode, Encode)]
pub struct Tag(String);

impl Tag {
    /// Creates a new tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::Tag;
    ///
    /// let t = Tag::new("B");
    /// assert_eq!("B", t.as_str());
    /// ```
    pub fn new<S>(tag: S) -> Self
    where
        S: Into<String>,
    {
        Self(tag.into())
    }

    /// Gets the tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(tag: &str) -> Self {
        Self::new(tag)
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Character class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Decode, Encode)]
pub enum CharacterClass {
    /// Numeral character. (e.g. 1, ２, 三, 百, %)
    Number,

    /// Character used in dates and times. (e.g. 年, 月, 日)
    Date,

    /// Latin letter. (e.g. a, B, ｃ)
    Letter,

    /// Other character.
    Other,
}

impl CharacterClass {
    /// Gets the class of a given character.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::CharacterClass;
    ///
    /// assert_eq!(CharacterClass::Number, CharacterClass::get_class('五'));
    /// assert_eq!(CharacterClass::Date, CharacterClass::get_class('年'));
    /// assert_eq!(CharacterClass::Letter, CharacterClass::get_class('ｑ'));
    /// assert_eq!(CharacterClass::Other, CharacterClass::get_class('的'));
    /// ```
    pub const fn get_class(c: char) -> Self {
        match c {
            '0'..='9'
            | '０'..='９'
            | '零' | '一' | '二' | '三' | '四' | '五' | '六' | '七' | '八' | '九'
            | '十' | '百' | '千' | '万' | '亿'
            | '壹' | '贰' | '叁' | '肆' | '伍' | '陆' | '柒' | '捌' | '玖' | '拾'
            | '○' | '佰' | '仟'
            | '.' | '%' | '％' => Self::Number,
            '年' | '月' | '日' | '周' | '时' | '分' | '秒' => Self::Date,
            'a'..='z' | 'A'..='Z' | 'ａ'..='ｚ' | 'Ａ'..='Ｚ' => Self::Letter,
            _ => Self::Other,
        }
    }

    /// Gets the name of the class.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Number => "Number",
            Self::Date => "Date",
            Self::Letter => "Letter",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CharacterClass {
    type Err = BrillError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "Number" => Ok(Self::Number),
            "Date" => Ok(Self::Date),
            "Letter" => Ok(Self::Letter),
            "Other" => Ok(Self::Other),
            _ => Err(BrillError::invalid_argument(
                "class",
                format!("unknown character class: {s}"),
            )),
        }
    }
}

/// Sequence of characters paired with tags.
///
/// A context is what both training and tagging operate on. Positions are 0-based character
/// indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Context {
    chars: Vec<char>,
    tags: Vec<Tag>,
}

impl Context {
    /// Creates an empty context.
    pub const fn new() -> Self {
        Self {
            chars: Vec::new(),
            tags: Vec::new(),
        }
    }

    /// Creates an empty context with room for `capacity` characters.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            chars: Vec::with_capacity(capacity),
            tags: Vec::with_capacity(capacity),
        }
    }

    /// Creates a context that assigns the same tag to every character.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::{Context, Tag};
    ///
    /// let ctx = Context::from_chars(&['a', 'b'], &Tag::new("S"));
    /// assert_eq!(2, ctx.len());
    /// assert_eq!("S", ctx.tag(1).as_str());
    /// ```
    pub fn from_chars(chars: &[char], tag: &Tag) -> Self {
        Self {
            chars: chars.to_vec(),
            tags: vec![tag.clone(); chars.len()],
        }
    }

    /// Appends a character-tag pair.
    pub fn push(&mut self, c: char, tag: Tag) {
        self.chars.push(c);
        self.tags.push(tag);
    }

    /// Returns the number of characters.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    /// Returns `true` if the context has no characters.
    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// Gets the character at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    pub fn char(&self, idx: usize) -> char {
        self.chars[idx]
    }

    /// Gets the tag at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    pub fn tag(&self, idx: usize) -> &Tag {
        &self.tags[idx]
    }

    /// Replaces the tag at `idx`.
    ///
    /// # Panics
    ///
    /// Panics if `idx` is out of bounds.
    pub fn set_tag(&mut self, idx: usize, tag: Tag) {
        self.tags[idx] = tag;
    }

    /// Gets a reference to the characters.
    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    /// Gets a reference to the tags.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// Iterates over the character-tag pairs.
    pub fn iter(&self) -> impl Iterator<Item = (char, &Tag)> + '_ {
        self.chars.iter().copied().zip(&self.tags)
    }

    /// Concatenates the characters without tags.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::{Context, Tag};
    ///
    /// let ctx: Context = "你好".chars().map(|c| (c, Tag::new("S"))).collect();
    /// assert_eq!("你好", ctx.to_raw_string());
    /// ```
    pub fn to_raw_string(&self) -> String {
        self.chars.iter().collect()
    }

    /// Resolves `idx + offset`, returning `None` outside the context.
    #[inline(always)]
    pub(crate) fn resolve(&self, idx: usize, offset: isize) -> Option<usize> {
        idx.checked_add_signed(offset).filter(|&i| i < self.chars.len())
    }
}

impl FromIterator<(char, Tag)> for Context {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (char, Tag)>,
    {
        let mut ctx = Self::new();
        ctx.extend(iter);
        ctx
    }
}

impl Extend<(char, Tag)> for Context {
    fn extend<I>(&mut self, iter: I)
    where
        I: IntoIterator<Item = (char, Tag)>,
    {
        for (c, tag) in iter {
            self.push(c, tag);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_character_class() {
        let classes: Vec<_> = "2０二年ａZ的.,"
            .chars()
            .map(CharacterClass::get_class)
            .collect();
        assert_eq!(
            vec![
                CharacterClass::Number,
                CharacterClass::Number,
                CharacterClass::Number,
                CharacterClass::Date,
                CharacterClass::Letter,
                CharacterClass::Letter,
                CharacterClass::Other,
                CharacterClass::Number,
                CharacterClass::Other,
            ],
            classes
        );
    }

    #[test]
    fn test_character_class_from_str() {
        assert_eq!(CharacterClass::Date, "Date".parse().unwrap());
        let e = "Kanji".parse::<CharacterClass>();
        assert_eq!(
            "InvalidArgumentError: class: unknown character class: Kanji",
            &e.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_context_from_iter() {
        let ctx: Context = [('a', Tag::new("B")), ('b', Tag::new("E"))]
            .into_iter()
            .collect();

        assert_eq!(2, ctx.len());
        assert_eq!(&['a', 'b'], ctx.chars());
        assert_eq!(&[Tag::new("B"), Tag::new("E")], ctx.tags());
        assert_eq!(
            vec![('a', &Tag::new("B")), ('b', &Tag::new("E"))],
            ctx.iter().collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_context_set_tag() {
        let mut ctx = Context::from_chars(&['x', 'y', 'z'], &Tag::new("S"));
        ctx.set_tag(1, Tag::new("B"));

        assert_eq!("S", ctx.tag(0).as_str());
        assert_eq!("B", ctx.tag(1).as_str());
        assert_eq!('z', ctx.char(2));
    }

    #[test]
    fn test_context_resolve() {
        let ctx = Context::from_chars(&['x', 'y', 'z'], &Tag::new("S"));

        assert_eq!(Some(0), ctx.resolve(1, -1));
        assert_eq!(Some(2), ctx.resolve(0, 2));
        assert_eq!(None, ctx.resolve(0, -1));
        assert_eq!(None, ctx.resolve(2, 1));
        assert_eq!(None, ctx.resolve(0, -5));
    }

    #[test]
    fn test_context_empty() {
        let ctx = Context::new();

        assert!(ctx.is_empty());
        assert_eq!("", ctx.to_raw_string());
    }
}
