//! Questionnaire definitions and the typed answers they produce.
//!
//! Every answer is turned into skill-vector contributions by
//! [`Answer::contributions`], the only place that cares about answer shape.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{MatchError, Result};
use crate::skill_vector::SkillVector;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LikertScale {
    pub min: f64,
    pub max: f64,
    pub default: f64,
}

impl LikertScale {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum QuestionKind {
    Open,
    Likert {
        scale: LikertScale,
        skills: SkillVector,
    },
    Mcq {
        options: IndexMap<String, SkillVector>,
    },
    Checkbox {
        options: IndexMap<String, SkillVector>,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(flatten)]
    pub kind: QuestionKind,
}

/// Raw value submitted for one question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawAnswer {
    Number(f64),
    Text(String),
    Selections(Vec<String>),
}

/// Submitted answers keyed by question id.
pub type RawAnswers = IndexMap<String, RawAnswer>;

/// An answer resolved against its question.
#[derive(Debug, Clone, PartialEq)]
pub enum Answer {
    OpenText(String),
    Likert { value: f64, weights: SkillVector },
    SingleChoice { option: String, weights: SkillVector },
    MultiChoice { selections: Vec<(String, SkillVector)> },
}

impl Answer {
    /// Skill-vector contributions for the numeric aggregator.
    ///
    /// Likert answers scale each declared weight by the chosen value, a single
    /// choice contributes its option's weights, and every selection of a
    /// multi-choice contributes separately. Open text contributes nothing.
    pub fn contributions(&self) -> Vec<SkillVector> {
        match self {
            Answer::OpenText(_) => Vec::new(),
            Answer::Likert { value, weights } => vec![weights
                .iter()
                .map(|(skill, weight)| (skill, value * weight))
                .collect()],
            Answer::SingleChoice { weights, .. } => vec![weights.clone()],
            Answer::MultiChoice { selections } => {
                selections.iter().map(|(_, weights)| weights.clone()).collect()
            }
        }
    }
}

/// All answers of one form submission, in question order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submission {
    pub answers: Vec<Answer>,
}

impl Submission {
    /// Non-empty open answers joined with a single space.
    pub fn open_text(&self) -> String {
        self.answers
            .iter()
            .filter_map(|answer| match answer {
                Answer::OpenText(text) if !text.trim().is_empty() => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn contributions(&self) -> Vec<SkillVector> {
        self.answers.iter().flat_map(Answer::contributions).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Questionnaire {
    pub questions: Vec<Question>,
}

impl Questionnaire {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| MatchError::io(path, e))?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let questionnaire: Questionnaire = serde_json::from_reader(reader)
            .map_err(|e| MatchError::MalformedQuestionnaire(e.to_string()))?;
        questionnaire.validate()?;
        Ok(questionnaire)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Self::from_reader(json.as_bytes())
    }

    fn validate(&self) -> Result<()> {
        let mut seen = HashSet::new();
        for question in &self.questions {
            if !seen.insert(question.id.as_str()) {
                return Err(MatchError::MalformedQuestionnaire(format!(
                    "duplicate question id '{}'",
                    question.id
                )));
            }
            match &question.kind {
                QuestionKind::Likert { scale, .. } => {
                    if scale.min > scale.max || !scale.contains(scale.default) {
                        return Err(MatchError::MalformedQuestionnaire(format!(
                            "question '{}' has an inconsistent scale {}..{} (default {})",
                            question.id, scale.min, scale.max, scale.default
                        )));
                    }
                }
                QuestionKind::Mcq { options } | QuestionKind::Checkbox { options }
                    if options.is_empty() =>
                {
                    return Err(MatchError::MalformedQuestionnaire(format!(
                        "question '{}' has no options",
                        question.id
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }

    pub fn question(&self, id: &str) -> Result<&Question> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| MatchError::UnknownQuestion(id.to_string()))
    }

    /// Resolves raw answers into a [`Submission`].
    ///
    /// Unanswered likert questions take their default value; other unanswered
    /// questions are skipped.
    pub fn submission(&self, raw: &RawAnswers) -> Result<Submission> {
        for id in raw.keys() {
            self.question(id)?;
        }

        let mut answers = Vec::new();
        for question in &self.questions {
            if let Some(answer) = resolve(question, raw.get(&question.id))? {
                answers.push(answer);
            }
        }
        tracing::debug!(answers = answers.len(), "resolved questionnaire submission");
        Ok(Submission { answers })
    }
}

fn option_weights(
    question: &Question,
    options: &IndexMap<String, SkillVector>,
    choice: &str,
) -> Result<SkillVector> {
    options.get(choice).cloned().ok_or_else(|| {
        MatchError::InvalidArgument(format!(
            "'{choice}' is not an option of question '{}'",
            question.id
        ))
    })
}

fn resolve(question: &Question, raw: Option<&RawAnswer>) -> Result<Option<Answer>> {
    let mismatch = |expected: &str| {
        MatchError::InvalidArgument(format!(
            "question '{}' expects {expected}",
            question.id
        ))
    };

    let answer = match (&question.kind, raw) {
        (QuestionKind::Open, None) => None,
        (QuestionKind::Open, Some(RawAnswer::Text(text))) => Some(Answer::OpenText(text.clone())),
        (QuestionKind::Open, Some(_)) => return Err(mismatch("free text")),

        (QuestionKind::Likert { scale, skills }, raw) => {
            let value = match raw {
                None => scale.default,
                Some(RawAnswer::Number(value)) => *value,
                Some(_) => return Err(mismatch("a number")),
            };
            if !scale.contains(value) {
                return Err(MatchError::InvalidArgument(format!(
                    "value {value} for question '{}' is outside {}..{}",
                    question.id, scale.min, scale.max
                )));
            }
            Some(Answer::Likert {
                value,
                weights: skills.clone(),
            })
        }

        (QuestionKind::Mcq { .. }, None) => None,
        (QuestionKind::Mcq { options }, Some(RawAnswer::Text(choice))) => Some(Answer::SingleChoice {
            option: choice.clone(),
            weights: option_weights(question, options, choice)?,
        }),
        (QuestionKind::Mcq { .. }, Some(_)) => return Err(mismatch("one option")),

        (QuestionKind::Checkbox { .. }, None) => None,
        (QuestionKind::Checkbox { options }, Some(RawAnswer::Selections(choices))) => {
            let selections = choices
                .iter()
                .map(|choice| -> Result<(String, SkillVector)> {
                    Ok((choice.clone(), option_weights(question, options, choice)?))
                })
                .collect::<Result<Vec<_>>>()?;
            Some(Answer::MultiChoice { selections })
        }
        (QuestionKind::Checkbox { .. }, Some(_)) => return Err(mismatch("a list of options")),
    };
    Ok(answer)
}
