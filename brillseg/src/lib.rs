#![cfg_attr(docsrs, feature(doc_cfg))]

//! # Brillseg
//!
//! Brillseg is a transformation-based tagger for word segmentation. It learns an ordered list of
//! correction rules that repair a coarse character-level tagging, and applies that list to new
//! text.
//!
//! ## Examples
//!
//! ```
//! use brillseg::{ConstantTagger, PredicateKind, PredicateTemplate, Tag, TagScheme, Tagger, Trainer};
//!
//! let scheme = TagScheme::BeginEndSingle;
//! let gold = scheme.tag(["This", " ", "is", " ", "a", "test", "."]);
//! let initial = ConstantTagger::new(Tag::new("S"));
//! let templates = vec![
//!     PredicateTemplate::unigram(-1, PredicateKind::Tag),
//!     PredicateTemplate::unigram(1, PredicateKind::Tag),
//!     PredicateTemplate::unigram(-1, PredicateKind::Character),
//!     PredicateTemplate::unigram(1, PredicateKind::Character),
//! ];
//!
//! let mut trainer = Trainer::new(&gold, &initial, &templates, 20, 1).unwrap();
//! let rules = trainer.train().to_vec();
//!
//! let tagger = Tagger::new(initial, rules);
//! let ctx = tagger.tag("This is atest.");
//! let words = scheme.untag(&ctx, true).unwrap();
//! assert_eq!(vec!["This", " ", "is", " ", "a", "test", "."], words);
//! ```
//!
//! Candidate rules are scored in parallel with **crate feature** `multithreading`.

mod context;
mod initial_tagger;
mod model;
mod predicate;
mod rule;
mod tag_scheme;
mod tagger;
mod template;
mod trainer;

pub mod errors;

pub use context::{CharacterClass, Context, Tag};
pub use initial_tagger::{
    Baseline, BaselineTagger, ConstantTagger, DictionaryTagger, InitialTagger, MatchDirection,
    UnigramTagger,
};
pub use model::Model;
pub use predicate::{Condition, Predicate, PredicateKind};
pub use rule::Rule;
pub use tag_scheme::TagScheme;
pub use tagger::Tagger;
pub use template::{PredicateTemplate, Template};
pub use trainer::{PositionIndex, Trainer};
