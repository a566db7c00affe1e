use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::utils::{l2_norm, round_to};

/// Mapping of skill name to score. Keys keep their insertion order and any
/// skill that is not present reads as `0.0`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SkillVector(IndexMap<String, f64>);

impl SkillVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every name in `names` mapped to `0.0`.
    pub fn zeros<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        names.into_iter().map(|name| (name.to_string(), 0.0)).collect()
    }

    pub fn get(&self, skill: &str) -> f64 {
        self.0.get(skill).copied().unwrap_or(0.0)
    }

    pub fn contains(&self, skill: &str) -> bool {
        self.0.contains_key(skill)
    }

    pub fn insert(&mut self, skill: impl Into<String>, value: f64) {
        self.0.insert(skill.into(), value);
    }

    /// Adds `value` onto whatever the skill currently holds.
    pub fn add(&mut self, skill: &str, value: f64) {
        *self.0.entry(skill.to_string()).or_insert(0.0) += value;
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.0.iter().map(|(k, v)| (k.as_str(), *v))
    }

    /// Values of `skills` in the given order, missing ones as `0.0`.
    pub fn aligned(&self, skills: &[&str]) -> Vec<f64> {
        skills.iter().map(|skill| self.get(skill)).collect()
    }

    pub fn norm(&self) -> f64 {
        l2_norm(&self.0.values().copied().collect::<Vec<_>>())
    }

    /// Divides every component by the Euclidean norm of the whole vector.
    /// A zero (or empty) vector comes back unchanged.
    pub fn normalize_l2(&self) -> Self {
        let norm = self.norm();
        if norm == 0.0 {
            return self.clone();
        }
        self.iter().map(|(k, v)| (k.to_string(), v / norm)).collect()
    }

    pub fn rounded(&self, decimals: i32) -> Self {
        self.iter()
            .map(|(k, v)| (k.to_string(), round_to(v, decimals)))
            .collect()
    }
}

impl FromIterator<(String, f64)> for SkillVector {
    fn from_iter<I: IntoIterator<Item = (String, f64)>>(iter: I) -> Self {
        SkillVector(iter.into_iter().collect())
    }
}

impl<'a> FromIterator<(&'a str, f64)> for SkillVector {
    fn from_iter<I: IntoIterator<Item = (&'a str, f64)>>(iter: I) -> Self {
        SkillVector(iter.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}

impl IntoIterator for SkillVector {
    type Item = (String, f64);
    type IntoIter = indexmap::map::IntoIter<String, f64>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
