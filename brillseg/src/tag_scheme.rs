use std::fmt;
use std::str::FromStr;

use bincode::{Decode, Encode};

use crate::context::{Context, Tag};
use crate::errors::{BrillError, Result};

/// Tag-encoding scheme that represents word boundaries as character tags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Decode, Encode)]
pub enum TagScheme {
    /// `B` for the first character of a word, `E` for the others.
    BeginEnd,

    /// Like [`TagScheme::BeginEnd`], but one-character words are tagged `S`.
    BeginEndSingle,

    /// `B` and `E` mark the first and the last character, `M` the inner ones, `S` a
    /// one-character word.
    BeginMiddleEndSingle,

    /// Like [`TagScheme::BeginMiddleEndSingle`], but the second and the third characters are
    /// tagged `B1` and `B2`.
    Begin123MiddleEndSingle,
}

impl TagScheme {
    /// Gets the tag vocabulary.
    pub const fn tags(&self) -> &'static [&'static str] {
        match self {
            Self::BeginEnd => &["B", "E"],
            Self::BeginEndSingle => &["B", "E", "S"],
            Self::BeginMiddleEndSingle => &["B", "M", "E", "S"],
            Self::Begin123MiddleEndSingle => &["B", "B1", "B2", "M", "E", "S"],
        }
    }

    /// Tags that start a new word.
    const fn initial_tags(&self) -> &'static [&'static str] {
        match self {
            Self::BeginEnd => &["B"],
            _ => &["B", "S"],
        }
    }

    /// Whether `E` finishes a word.
    const fn closes_with_end(&self) -> bool {
        matches!(
            self,
            Self::BeginMiddleEndSingle | Self::Begin123MiddleEndSingle
        )
    }

    /// Gets the tag of a one-character word.
    pub fn single_tag(&self) -> Tag {
        match self {
            Self::BeginEnd => Tag::new("B"),
            _ => Tag::new("S"),
        }
    }

    /// Tags the characters of a word.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::{Tag, TagScheme};
    ///
    /// let tags = TagScheme::BeginMiddleEndSingle.tag_word("中华人");
    /// assert_eq!(vec![Tag::new("B"), Tag::new("M"), Tag::new("E")], tags);
    /// ```
    pub fn tag_word(&self, word: &str) -> Vec<Tag> {
        let len = word.chars().count();
        let mut result = Vec::with_capacity(len);
        if len == 0 {
            return result;
        }
        if len == 1 {
            result.push(self.single_tag());
            return result;
        }
        match self {
            Self::BeginEnd | Self::BeginEndSingle => {
                result.push(Tag::new("B"));
                result.extend((1..len).map(|_| Tag::new("E")));
            }
            Self::BeginMiddleEndSingle => {
                result.push(Tag::new("B"));
                result.extend((2..len).map(|_| Tag::new("M")));
                result.push(Tag::new("E"));
            }
            Self::Begin123MiddleEndSingle => {
                result.push(Tag::new("B"));
                for i in 1..len - 1 {
                    result.push(Tag::new(match i {
                        1 => "B1",
                        2 => "B2",
                        _ => "M",
                    }));
                }
                result.push(Tag::new("E"));
            }
        }
        result
    }

    /// Converts a sequence of words into a tagged context.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::TagScheme;
    ///
    /// let ctx = TagScheme::BeginEndSingle.tag(["我", "喜欢", "猫"]);
    /// let tags: Vec<_> = ctx.tags().iter().map(|t| t.as_str()).collect();
    /// assert_eq!(vec!["S", "B", "E", "S"], tags);
    /// ```
    pub fn tag<I, S>(&self, words: I) -> Context
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut ctx = Context::new();
        for word in words {
            let word = word.as_ref();
            ctx.extend(word.chars().zip(self.tag_word(word)));
        }
        ctx
    }

    /// Reconstructs words from a tagged context.
    ///
    /// # Arguments
    ///
    /// * `ctx` - A tagged context.
    /// * `strict` - If `true`, a tag outside the vocabulary is an error. Otherwise, the
    ///   character is treated as a one-character word.
    ///
    /// # Errors
    ///
    /// [`BrillError::InvalidTag`] is returned in strict mode if `ctx` contains an unknown tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::TagScheme;
    ///
    /// let scheme = TagScheme::BeginEndSingle;
    /// let ctx = scheme.tag(["我", "喜欢", "猫"]);
    /// assert_eq!(vec!["我", "喜欢", "猫"], scheme.untag(&ctx, true).unwrap());
    /// ```
    pub fn untag(&self, ctx: &Context, strict: bool) -> Result<Vec<String>> {
        let initial_tags = self.initial_tags();
        let tags = self.tags();
        let mut result = vec![];
        let mut word = String::new();
        for (i, (c, tag)) in ctx.iter().enumerate() {
            let tag = tag.as_str();
            if initial_tags.contains(&tag) {
                if !word.is_empty() {
                    result.push(std::mem::take(&mut word));
                }
                word.push(c);
            } else if self.closes_with_end() && tag == "E" {
                word.push(c);
                result.push(std::mem::take(&mut word));
            } else if tags.contains(&tag) {
                word.push(c);
            } else {
                if strict {
                    return Err(BrillError::invalid_tag(tag, i));
                }
                if !word.is_empty() {
                    result.push(std::mem::take(&mut word));
                }
                result.push(c.to_string());
            }
        }
        if !word.is_empty() {
            result.push(word);
        }
        Ok(result)
    }
}

impl fmt::Display for TagScheme {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::BeginEnd => "be",
            Self::BeginEndSingle => "bes",
            Self::BeginMiddleEndSingle => "bmes",
            Self::Begin123MiddleEndSingle => "b123mes",
        })
    }
}

impl FromStr for TagScheme {
    type Err = BrillError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "be" => Ok(Self::BeginEnd),
            "bes" => Ok(Self::BeginEndSingle),
            "bmes" => Ok(Self::BeginMiddleEndSingle),
            "b123mes" => Ok(Self::Begin123MiddleEndSingle),
            _ => Err(BrillError::invalid_argument(
                "scheme",
                format!("unsupported tag scheme: {s}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tag_strs(ctx: &Context) -> Vec<&str> {
        ctx.tags().iter().map(|t| t.as_str()).collect()
    }

    const WORDS: [&str; 8] = ["ABC", "BAC", "A", "B", "IDFSDF", "SDWEOURO", "DD", "WERQ"];

    #[test]
    fn test_tag_be() {
        let ctx = TagScheme::BeginEnd.tag(["ab", "c"]);
        assert_eq!(vec!["B", "E", "B"], tag_strs(&ctx));
        assert_eq!("abc", ctx.to_raw_string());
    }

    #[test]
    fn test_tag_bes() {
        let ctx = TagScheme::BeginEndSingle.tag(["abc", "d"]);
        assert_eq!(vec!["B", "E", "E", "S"], tag_strs(&ctx));
    }

    #[test]
    fn test_tag_bmes() {
        let ctx = TagScheme::BeginMiddleEndSingle.tag(["abcd", "e", "fg"]);
        assert_eq!(vec!["B", "M", "M", "E", "S", "B", "E"], tag_strs(&ctx));
    }

    #[test]
    fn test_tag_b123mes() {
        let ctx = TagScheme::Begin123MiddleEndSingle.tag(["ab", "cde", "fghijk", "l"]);
        assert_eq!(
            vec!["B", "E", "B", "B1", "E", "B", "B1", "B2", "M", "M", "E", "S"],
            tag_strs(&ctx)
        );
    }

    #[test]
    fn test_tag_empty_word() {
        let ctx = TagScheme::BeginEndSingle.tag(["", "a"]);
        assert_eq!(vec!["S"], tag_strs(&ctx));
    }

    #[test]
    fn test_untag_all_schemes() {
        for scheme in [
            TagScheme::BeginEnd,
            TagScheme::BeginEndSingle,
            TagScheme::BeginMiddleEndSingle,
            TagScheme::Begin123MiddleEndSingle,
        ] {
            let ctx = scheme.tag(WORDS);
            assert_eq!(WORDS.to_vec(), scheme.untag(&ctx, true).unwrap());
        }
    }

    #[test]
    fn test_untag_strict_unknown_tag() {
        let ctx: Context = [('a', Tag::new("B")), ('b', Tag::new("X"))]
            .into_iter()
            .collect();
        let result = TagScheme::BeginEndSingle.untag(&ctx, true);

        assert!(result.is_err());
        assert_eq!(
            "InvalidTagError: unknown tag `X` at position 1",
            &result.err().unwrap().to_string()
        );
    }

    #[test]
    fn test_untag_lenient_unknown_tag() {
        let ctx: Context = [
            ('a', Tag::new("B")),
            ('b', Tag::new("M")),
            ('c', Tag::new("?")),
            ('d', Tag::new("M")),
            ('e', Tag::new("E")),
        ]
        .into_iter()
        .collect();
        let words = TagScheme::BeginMiddleEndSingle.untag(&ctx, false).unwrap();

        assert_eq!(vec!["ab", "c", "de"], words);
    }

    #[test]
    fn test_untag_bes_leading_tail() {
        let ctx: Context = [('a', Tag::new("E")), ('b', Tag::new("S"))]
            .into_iter()
            .collect();
        let words = TagScheme::BeginEndSingle.untag(&ctx, true).unwrap();

        assert_eq!(vec!["a", "b"], words);
    }

    #[test]
    fn test_scheme_from_str() {
        assert_eq!(TagScheme::BeginMiddleEndSingle, "bmes".parse().unwrap());
        assert_eq!("b123mes", TagScheme::Begin123MiddleEndSingle.to_string());
        assert!("bio".parse::<TagScheme>().is_err());
    }
}
