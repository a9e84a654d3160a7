use std::collections::{BTreeMap, BTreeSet};

use bincode::{Decode, Encode};
use daachorse::{DoubleArrayAhoCorasick, DoubleArrayAhoCorasickBuilder, MatchKind};
use hashbrown::HashMap;

use crate::context::{Context, Tag};
use crate::errors::{BrillError, Result};
use crate::tag_scheme::TagScheme;

/// Tagger producing the coarse tagging that rules later repair.
///
/// The returned context must have the same length as `chars`.
pub trait InitialTagger {
    /// Tags raw characters.
    fn tag(&self, chars: &[char]) -> Context;
}

impl<F> InitialTagger for F
where
    F: Fn(&[char]) -> Context,
{
    fn tag(&self, chars: &[char]) -> Context {
        self(chars)
    }
}

/// Tagger assigning the same tag to every character.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode)]
pub struct ConstantTagger {
    tag: Tag,
}

impl ConstantTagger {
    /// Creates a new constant tagger.
    pub const fn new(tag: Tag) -> Self {
        Self { tag }
    }
}

impl InitialTagger for ConstantTagger {
    fn tag(&self, chars: &[char]) -> Context {
        Context::from_chars(chars, &self.tag)
    }
}

/// Tagger assigning each character its most frequent tag in the training words.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode)]
pub struct UnigramTagger {
    best: BTreeMap<char, Tag>,
    fallback: Tag,
}

impl UnigramTagger {
    /// Counts character-tag co-occurrences in `words`.
    ///
    /// Ties between equally frequent tags are resolved to the smallest tag. Unknown characters
    /// receive the scheme's one-character-word tag.
    ///
    /// # Examples
    ///
    /// ```
    /// use brillseg::{InitialTagger, TagScheme, UnigramTagger};
    ///
    /// let tagger = UnigramTagger::new(TagScheme::BeginEndSingle, ["ab", "ab", "b"]);
    /// let ctx = tagger.tag(&['a', 'b', 'c']);
    /// let tags: Vec<_> = ctx.tags().iter().map(|t| t.as_str()).collect();
    /// assert_eq!(vec!["B", "E", "S"], tags);
    /// ```
    pub fn new<I, S>(scheme: TagScheme, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut counts: HashMap<char, HashMap<Tag, u32>> = HashMap::new();
        for word in words {
            let word = word.as_ref();
            for (c, tag) in word.chars().zip(scheme.tag_word(word)) {
                *counts.entry(c).or_default().entry(tag).or_insert(0) += 1;
            }
        }
        let best = counts
            .into_iter()
            .filter_map(|(c, tag_counts)| {
                tag_counts
                    .into_iter()
                    .max_by(|(t1, n1), (t2, n2)| n1.cmp(n2).then_with(|| t2.cmp(t1)))
                    .map(|(tag, _)| (c, tag))
            })
            .collect();
        Self {
            best,
            fallback: scheme.single_tag(),
        }
    }

    /// Returns the number of known characters.
    pub fn n_chars(&self) -> usize {
        self.best.len()
    }
}

impl InitialTagger for UnigramTagger {
    fn tag(&self, chars: &[char]) -> Context {
        chars
            .iter()
            .map(|c| (*c, self.best.get(c).unwrap_or(&self.fallback).clone()))
            .collect()
    }
}

/// Scan direction of [`DictionaryTagger`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Decode, Encode)]
pub enum MatchDirection {
    /// Takes the longest words from left to right.
    Forward,

    /// Takes the longest words from right to left.
    Backward,
}

/// Maximum matching tagger.
///
/// The text is split into the longest dictionary words in the scan direction; characters not
/// covered by any word become one-character words.
pub struct DictionaryTagger {
    scheme: TagScheme,
    words: Vec<String>,
    direction: MatchDirection,
    pma: Option<DoubleArrayAhoCorasick<u32>>,
}

impl DictionaryTagger {
    /// Creates a new dictionary tagger.
    ///
    /// Empty and duplicate words are ignored.
    ///
    /// # Errors
    ///
    /// [`BrillError::InvalidArgument`] is returned if the automaton cannot be built.
    pub fn new<I, S>(scheme: TagScheme, words: I, direction: MatchDirection) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let words: Vec<String> = words
            .into_iter()
            .filter(|w| !w.as_ref().is_empty())
            .map(|w| w.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let pma = if words.is_empty() {
            None
        } else {
            // A backward scan is a forward scan over reversed words and reversed text.
            let patterns: Vec<String> = match direction {
                MatchDirection::Forward => words.clone(),
                MatchDirection::Backward => {
                    words.iter().map(|w| w.chars().rev().collect()).collect()
                }
            };
            Some(
                DoubleArrayAhoCorasickBuilder::new()
                    .match_kind(MatchKind::LeftmostLongest)
                    .build(&patterns)
                    .map_err(|e| BrillError::invalid_argument("dictionary", e.to_string()))?,
            )
        };
        Ok(Self {
            scheme,
            words,
            direction,
            pma,
        })
    }

    /// Gets the dictionary words in sorted order.
    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// Gets the scan direction.
    pub const fn direction(&self) -> MatchDirection {
        self.direction
    }

    /// Returns the character spans of the matched words in ascending order.
    fn find_words(&self, chars: &[char]) -> Vec<(usize, usize)> {
        let Some(pma) = &self.pma else {
            return vec![];
        };
        let scanned: Vec<char> = match self.direction {
            MatchDirection::Forward => chars.to_vec(),
            MatchDirection::Backward => chars.iter().rev().copied().collect(),
        };
        let text: String = scanned.iter().collect();
        let mut str_to_char_pos = vec![0; text.len() + 1];
        let mut pos = 0;
        for (i, c) in scanned.iter().enumerate() {
            str_to_char_pos[pos] = i;
            pos += c.len_utf8();
        }
        str_to_char_pos[pos] = scanned.len();

        let spans = pma
            .leftmost_find_iter(&text)
            .map(|m| (str_to_char_pos[m.start()], str_to_char_pos[m.end()]));
        match self.direction {
            MatchDirection::Forward => spans.collect(),
            MatchDirection::Backward => {
                let n = chars.len();
                let mut spans: Vec<_> = spans.map(|(start, end)| (n - end, n - start)).collect();
                spans.reverse();
                spans
            }
        }
    }
}

impl InitialTagger for DictionaryTagger {
    fn tag(&self, chars: &[char]) -> Context {
        let mut ctx = Context::with_capacity(chars.len());
        let mut last = 0;
        for (start, end) in self.find_words(chars) {
            for &c in &chars[last..start] {
                ctx.push(c, self.scheme.single_tag());
            }
            let word: String = chars[start..end].iter().collect();
            ctx.extend(
                chars[start..end]
                    .iter()
                    .copied()
                    .zip(self.scheme.tag_word(&word)),
            );
            last = end;
        }
        for &c in &chars[last..] {
            ctx.push(c, self.scheme.single_tag());
        }
        ctx
    }
}

/// Serializable description of an initial tagger.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode)]
pub enum Baseline {
    /// See [`ConstantTagger`].
    Constant(ConstantTagger),

    /// See [`UnigramTagger`].
    Unigram(UnigramTagger),

    /// See [`DictionaryTagger`].
    Dictionary {
        /// Dictionary words.
        words: Vec<String>,

        /// Scan direction.
        direction: MatchDirection,
    },
}

/// Initial tagger built from a [`Baseline`].
pub enum BaselineTagger {
    /// Built from [`Baseline::Constant`].
    Constant(ConstantTagger),

    /// Built from [`Baseline::Unigram`].
    Unigram(UnigramTagger),

    /// Built from [`Baseline::Dictionary`].
    Dictionary(DictionaryTagger),
}

impl BaselineTagger {
    /// Builds the tagger described by `baseline`.
    ///
    /// # Errors
    ///
    /// See [`DictionaryTagger::new`].
    pub fn new(baseline: Baseline, scheme: TagScheme) -> Result<Self> {
        Ok(match baseline {
            Baseline::Constant(tagger) => Self::Constant(tagger),
            Baseline::Unigram(tagger) => Self::Unigram(tagger),
            Baseline::Dictionary { words, direction } => {
                Self::Dictionary(DictionaryTagger::new(scheme, words, direction)?)
            }
        })
    }
}

impl InitialTagger for BaselineTagger {
    fn tag(&self, chars: &[char]) -> Context {
        match self {
            Self::Constant(tagger) => tagger.tag(chars),
            Self::Unigram(tagger) => tagger.tag(chars),
            Self::Dictionary(tagger) => tagger.tag(chars),
        }
    }
}
