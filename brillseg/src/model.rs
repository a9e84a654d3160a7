use std::io::{Read, Write};

use bincode::{Decode, Encode};

use crate::errors::{BrillError, Result};
use crate::initial_tagger::{Baseline, BaselineTagger};
use crate::predicate::Condition;
use crate::rule::Rule;
use crate::tag_scheme::TagScheme;
use crate::tagger::Tagger;

/// Model data.
///
/// A model bundles everything needed to segment raw text: the tag scheme, the description of
/// the initial tagger and the learned rules in application order.
#[derive(Debug, Clone, PartialEq, Eq, Decode, Encode)]
pub struct Model {
    scheme: TagScheme,
    baseline: Baseline,
    rules: Vec<Rule>,
}

impl Model {
    /// Creates a new model.
    pub const fn new(scheme: TagScheme, baseline: Baseline, rules: Vec<Rule>) -> Self {
        Self {
            scheme,
            baseline,
            rules,
        }
    }

    /// Exports the model data.
    ///
    /// # Arguments
    ///
    /// * `wtr` - Byte-oriented sink object.
    ///
    /// # Errors
    ///
    /// When `wtr` generates an error, it will be returned as is.
    pub fn write<W>(&self, wtr: &mut W) -> Result<()>
    where
        W: Write,
    {
        let config = bincode::config::standard();
        bincode::encode_into_std_write(self, wtr, config)?;
        Ok(())
    }

    /// Creates a model from a reader.
    ///
    /// # Arguments
    ///
    /// * `rdr` - A data source.
    ///
    /// # Returns
    ///
    /// A model data read from `rdr`.
    ///
    /// # Errors
    ///
    /// When `rdr` generates an error, it will be returned as is. [`BrillError::InvalidModel`]
    /// is returned if the data contains an empty tag.
    pub fn read<R>(rdr: &mut R) -> Result<Self>
    where
        R: Read,
    {
        let config = bincode::config::standard();
        let model: Self = bincode::decode_from_std_read(rdr, config)?;
        for (i, rule) in model.rules.iter().enumerate() {
            let has_empty_tag = rule.from_tag().as_str().is_empty()
                || rule.to_tag().as_str().is_empty()
                || rule.clauses().iter().flatten().any(|p| {
                    matches!(p.condition(), Condition::Tag(tag) if tag.as_str().is_empty())
                });
            if has_empty_tag {
                return Err(BrillError::invalid_model(format!(
                    "rule #{} contains an empty tag",
                    i + 1
                )));
            }
        }
        Ok(model)
    }

    /// Gets the tag scheme.
    pub const fn scheme(&self) -> TagScheme {
        self.scheme
    }

    /// Gets the description of the initial tagger.
    pub const fn baseline(&self) -> &Baseline {
        &self.baseline
    }

    /// Gets the rules in application order.
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Replaces the rules.
    ///
    /// # Returns
    ///
    /// The previous rules.
    pub fn replace_rules(&mut self, rules: Vec<Rule>) -> Vec<Rule> {
        std::mem::replace(&mut self.rules, rules)
    }

    /// Builds the runtime tagger.
    ///
    /// # Errors
    ///
    /// See [`BaselineTagger::new`].
    pub fn into_tagger(self) -> Result<Tagger<BaselineTagger>> {
        let initial_tagger = BaselineTagger::new(self.baseline, self.scheme)?;
        Ok(Tagger::new(initial_tagger, self.rules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::context::Tag;
    use crate::initial_tagger::{ConstantTagger, MatchDirection, UnigramTagger};
    use crate::predicate::Predicate;

    fn sample_rules() -> Vec<Rule> {
        vec![
            Rule::new(
                Tag::new("S"),
                Tag::new("B"),
                vec![
                    vec![Predicate::new(1, Condition::Character('欢'), false)],
                    vec![
                        Predicate::new(-1, Condition::Tag(Tag::new("E")), true),
                        Predicate::new(
                            -2,
                            Condition::Class(crate::context::CharacterClass::Date),
                            false,
                        ),
                    ],
                ],
            ),
            Rule::new(
                Tag::new("S"),
                Tag::new("E"),
                vec![vec![Predicate::new(
                    -1,
                    Condition::Tag(Tag::new("B")),
                    false,
                )]],
            ),
        ]
    }

    #[test]
    fn test_write_read() {
        let baseline = Baseline::Unigram(UnigramTagger::new(
            TagScheme::BeginEndSingle,
            ["喜欢", "我"],
        ));
        let model = Model::new(TagScheme::BeginEndSingle, baseline, sample_rules());

        let mut data = vec![];
        model.write(&mut data).unwrap();
        let read = Model::read(&mut data.as_slice()).unwrap();

        assert_eq!(model, read);
        assert_eq!(sample_rules(), read.rules());
    }

    #[test]
    fn test_read_broken() {
        let model = Model::new(
            TagScheme::BeginEnd,
            Baseline::Dictionary {
                words: vec!["ab".to_string()],
                direction: MatchDirection::Forward,
            },
            sample_rules(),
        );
        let mut data = vec![];
        model.write(&mut data).unwrap();
        data.truncate(data.len() - 3);

        assert!(matches!(
            Model::read(&mut data.as_slice()),
            Err(BrillError::DecodeError(_))
        ));
    }

    #[test]
    fn test_read_empty_tag() {
        let rules = vec![Rule::new(Tag::new("S"), Tag::new(""), vec![])];
        let model = Model::new(
            TagScheme::BeginEndSingle,
            Baseline::Constant(ConstantTagger::new(Tag::new("S"))),
            rules,
        );
        let mut data = vec![];
        model.write(&mut data).unwrap();

        assert_eq!(
            "InvalidModelError: rule #1 contains an empty tag",
            &Model::read(&mut data.as_slice()).err().unwrap().to_string()
        );
    }

    #[test]
    fn test_replace_rules() {
        let mut model = Model::new(
            TagScheme::BeginEndSingle,
            Baseline::Constant(ConstantTagger::new(Tag::new("S"))),
            sample_rules(),
        );
        let old = model.replace_rules(vec![]);

        assert_eq!(sample_rules(), old);
        assert!(model.rules().is_empty());
        assert_eq!(TagScheme::BeginEndSingle, model.scheme());
    }

    #[test]
    fn test_into_tagger() {
        let model = Model::new(
            TagScheme::BeginEndSingle,
            Baseline::Constant(ConstantTagger::new(Tag::new("S"))),
            sample_rules(),
        );
        let tagger = model.into_tagger().unwrap();
        let ctx = tagger.tag("我喜欢猫");
        let words = TagScheme::BeginEndSingle.untag(&ctx, true).unwrap();

        assert_eq!(vec!["我", "喜欢", "猫"], words);
    }
}
