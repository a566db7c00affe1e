use std::cmp::Ordering;

use serde::Serialize;

use crate::catalog::SportCatalog;
use crate::error::{MatchError, Result};
use crate::skill_vector::SkillVector;
use crate::utils::{compute_cosine_similarity, round_to};

/// Number of skills listed by gap summaries and by comparisons made without
/// an explicit skill list.
pub const DEFAULT_DIFF_SKILLS: usize = 6;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub sport: String,
    pub score: f64,
}

/// Side-by-side values of a profile and a sport over a set of skills.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comparison {
    pub sport: String,
    pub skills: Vec<String>,
    pub profile_values: Vec<f64>,
    pub sport_values: Vec<f64>,
}

/// Ranks and explains sports of a catalog against a profile.
#[derive(Debug, Clone, Copy)]
pub struct Recommender<'a> {
    catalog: &'a SportCatalog,
}

impl<'a> Recommender<'a> {
    pub fn new(catalog: &'a SportCatalog) -> Self {
        Self { catalog }
    }

    /// Top `top_n` sports by cosine similarity to `profile`, best first.
    ///
    /// Only the profile's own skills are compared; sport weights for other
    /// skills are ignored. Scores are rounded to three decimals and ties keep
    /// catalog order.
    pub fn recommend(&self, profile: &SkillVector, top_n: usize) -> Result<Vec<Recommendation>> {
        if top_n == 0 {
            return Err(MatchError::InvalidArgument(
                "top_n must be at least 1".into(),
            ));
        }
        if profile.is_empty() {
            return Err(MatchError::InvalidArgument(
                "cannot rank sports against an empty profile".into(),
            ));
        }

        let skills: Vec<&str> = profile.keys().collect();
        let profile_values = profile.aligned(&skills);

        let mut ranked: Vec<Recommendation> = self
            .catalog
            .iter()
            .map(|(sport, weights)| Recommendation {
                sport: sport.to_string(),
                score: round_to(
                    compute_cosine_similarity(&profile_values, &weights.aligned(&skills)),
                    3,
                ),
            })
            .collect();

        ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        ranked.truncate(top_n);

        tracing::debug!(
            returned = ranked.len(),
            best = ranked.first().map(|r| r.sport.as_str()),
            "ranked sports"
        );
        Ok(ranked)
    }

    /// `profile[s] - sport[s]` rounded to two decimals, for every skill of the profile.
    pub fn explain(&self, profile: &SkillVector, sport: &str) -> Result<SkillVector> {
        let weights = self.catalog.get(sport)?;
        Ok(profile
            .iter()
            .map(|(skill, value)| (skill, round_to(value - weights.get(skill), 2)))
            .collect())
    }

    /// The `n` skills where profile and sport differ the most.
    pub fn top_diff_skills(&self, profile: &SkillVector, sport: &str, n: usize) -> Result<SkillVector> {
        self.ranked_diffs(profile, sport, n, |a, b| b.total_cmp(&a))
    }

    /// The `n` skills where profile and sport agree the most.
    pub fn min_diff_skills(&self, profile: &SkillVector, sport: &str, n: usize) -> Result<SkillVector> {
        self.ranked_diffs(profile, sport, n, |a, b| a.total_cmp(&b))
    }

    fn ranked_diffs(
        &self,
        profile: &SkillVector,
        sport: &str,
        n: usize,
        order: impl Fn(f64, f64) -> Ordering,
    ) -> Result<SkillVector> {
        let mut diffs: Vec<(String, f64)> = self.explain(profile, sport)?.into_iter().collect();
        diffs.sort_by(|(_, a), (_, b)| order(a.abs(), b.abs()));
        Ok(diffs.into_iter().take(n).collect())
    }

    /// Profile and sport values over `skills`, or over the
    /// [`DEFAULT_DIFF_SKILLS`] largest differences when none are given.
    pub fn compare(
        &self,
        profile: &SkillVector,
        sport: &str,
        skills: Option<&[String]>,
    ) -> Result<Comparison> {
        let weights = self.catalog.get(sport)?;
        let skills: Vec<String> = match skills {
            Some(skills) => skills.to_vec(),
            None => self
                .top_diff_skills(profile, sport, DEFAULT_DIFF_SKILLS)?
                .keys()
                .map(str::to_string)
                .collect(),
        };

        Ok(Comparison {
            sport: sport.to_string(),
            profile_values: skills.iter().map(|s| profile.get(s)).collect(),
            sport_values: skills.iter().map(|s| weights.get(s)).collect(),
            skills,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const SPORTS: &str = r#"{
        "sports": {
            "Marathon": {"endurance": 0.9, "teamwork": 0.1},
            "Basketball": {"endurance": 0.3, "teamwork": 0.9},
            "Rowing": {"endurance": 0.9, "teamwork": 0.1, "strength": 0.8}
        }
    }"#;

    fn catalog() -> SportCatalog {
        SportCatalog::from_json_str(SPORTS).unwrap()
    }

    fn vector(pairs: &[(&str, f64)]) -> SkillVector {
        pairs.iter().copied().collect()
    }

    #[test]
    fn ranks_closest_sport_first() {
        let catalog = catalog();
        let ranked = Recommender::new(&catalog)
            .recommend(&vector(&[("endurance", 0.95), ("teamwork", 0.05)]), 2)
            .unwrap();
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].sport, "Marathon");
        assert!(ranked[0].score >= ranked[1].score);
    }

    #[test]
    fn skills_outside_the_profile_are_ignored_and_ties_keep_catalog_order() {
        let catalog = catalog();
        // Rowing differs from Marathon only by strength, which the profile lacks.
        let ranked = Recommender::new(&catalog)
            .recommend(&vector(&[("endurance", 0.9), ("teamwork", 0.1)]), 3)
            .unwrap();
        assert_eq!(ranked[0], Recommendation { sport: "Marathon".into(), score: 1.0 });
        assert_eq!(ranked[1], Recommendation { sport: "Rowing".into(), score: 1.0 });
        assert_eq!(ranked[2].sport, "Basketball");
    }

    #[test]
    fn top_n_larger_than_catalog_returns_everything() {
        let catalog = catalog();
        let ranked = Recommender::new(&catalog)
            .recommend(&vector(&[("endurance", 1.0)]), 10)
            .unwrap();
        assert_eq!(ranked.len(), 3);
    }

    #[test]
    fn zero_top_n_and_empty_profiles_are_rejected() {
        let catalog = catalog();
        let recommender = Recommender::new(&catalog);
        assert!(matches!(
            recommender.recommend(&vector(&[("endurance", 1.0)]), 0),
            Err(MatchError::InvalidArgument(_))
        ));
        assert!(matches!(
            recommender.recommend(&SkillVector::new(), 3),
            Err(MatchError::InvalidArgument(_))
        ));
    }

    #[test]
    fn zero_profile_scores_zero_everywhere() {
        let catalog = catalog();
        let ranked = Recommender::new(&catalog)
            .recommend(&vector(&[("endurance", 0.0), ("teamwork", 0.0)]), 3)
            .unwrap();
        assert!(ranked.iter().all(|r| r.score == 0.0));
        assert_eq!(ranked[0].sport, "Marathon");
    }

    #[test]
    fn explain_returns_signed_differences_over_profile_skills() {
        let catalog = catalog();
        let diff = Recommender::new(&catalog)
            .explain(&vector(&[("endurance", 0.95), ("teamwork", 0.05), ("focus", 0.4)]), "Marathon")
            .unwrap();
        assert_eq!(diff.keys().collect::<Vec<_>>(), vec!["endurance", "teamwork", "focus"]);
        assert_eq!(diff.get("endurance"), 0.05);
        assert_eq!(diff.get("teamwork"), -0.05);
        assert_eq!(diff.get("focus"), 0.4);
    }

    #[test]
    fn explain_unknown_sport_is_an_error() {
        let catalog = catalog();
        assert!(matches!(
            Recommender::new(&catalog).explain(&vector(&[("endurance", 1.0)]), "Curling"),
            Err(MatchError::UnknownSport(name)) if name == "Curling"
        ));
    }

    #[test]
    fn diff_skills_sort_by_absolute_difference() {
        let catalog = catalog();
        let recommender = Recommender::new(&catalog);
        let profile = vector(&[("endurance", 0.2), ("teamwork", 0.9), ("strength", 0.1)]);

        // Rowing diffs: endurance -0.7, teamwork 0.8, strength -0.7
        let top = recommender.top_diff_skills(&profile, "Rowing", 2).unwrap();
        assert_eq!(top.keys().collect::<Vec<_>>(), vec!["teamwork", "endurance"]);

        let min = recommender.min_diff_skills(&profile, "Rowing", 2).unwrap();
        assert_eq!(min.keys().collect::<Vec<_>>(), vec!["endurance", "strength"]);
        assert_eq!(min.get("strength"), -0.7);
    }

    #[test]
    fn compare_defaults_to_largest_differences() {
        let catalog = catalog();
        let profile = vector(&[("endurance", 0.2), ("teamwork", 0.9)]);
        let comparison = Recommender::new(&catalog).compare(&profile, "Basketball", None).unwrap();
        assert_eq!(comparison.skills, vec!["endurance".to_string(), "teamwork".to_string()]);
        assert_eq!(comparison.profile_values, vec![0.2, 0.9]);
        assert_eq!(comparison.sport_values, vec![0.3, 0.9]);
    }

    #[test]
    fn compare_uses_explicit_skills() {
        let catalog = catalog();
        let skills = vec!["strength".to_string()];
        let comparison = Recommender::new(&catalog)
            .compare(&vector(&[("endurance", 0.5)]), "Rowing", Some(&skills))
            .unwrap();
        assert_eq!(comparison.profile_values, vec![0.0]);
        assert_eq!(comparison.sport_values, vec![0.8]);
    }

    fn profile_strategy() -> impl Strategy<Value = SkillVector> {
        (0.0f64..10.0, 0.0f64..10.0, 0.0f64..10.0).prop_map(|(e, t, s)| {
            vector(&[("endurance", e), ("teamwork", t), ("strength", s)])
        })
    }

    proptest! {
        #[test]
        fn scores_stay_within_cosine_range(profile in profile_strategy()) {
            let catalog = catalog();
            for rec in Recommender::new(&catalog).recommend(&profile, 3).unwrap() {
                prop_assert!((-1.0..=1.0).contains(&rec.score));
            }
        }

        #[test]
        fn truncated_ranking_is_a_prefix_of_the_full_one(profile in profile_strategy(), k in 1usize..4) {
            let catalog = catalog();
            let recommender = Recommender::new(&catalog);
            let full = recommender.recommend(&profile, catalog.len()).unwrap();
            let top = recommender.recommend(&profile, k).unwrap();
            prop_assert!(top.len() <= k);
            prop_assert_eq!(&full[..top.len()], &top[..]);
            prop_assert!(top.windows(2).all(|w| w[0].score >= w[1].score));
        }
    }
}
