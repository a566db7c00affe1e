use crate::ontology::SkillOntology;
use crate::skill_vector::SkillVector;
use crate::utils::round_to;

/// Averages per-question contributions into one score per ontology skill.
///
/// A skill's score is the mean of every contribution that mentions it, so a
/// skill asked about in many questions is not inflated by repetition. Skills
/// nobody mentions score `0.0`; skills outside the ontology are ignored.
pub fn aggregate(contributions: &[SkillVector], ontology: &SkillOntology) -> SkillVector {
    let names = ontology.names();
    let mut sums = vec![0.0f64; names.len()];
    let mut counts = vec![0usize; names.len()];

    for contribution in contributions {
        for (i, name) in names.iter().enumerate() {
            if contribution.contains(name) {
                sums[i] += contribution.get(name);
                counts[i] += 1;
            }
        }
        for skill in contribution.keys().filter(|s| !ontology.contains(s)) {
            tracing::debug!(skill, "ignoring contribution for skill outside the ontology");
        }
    }

    names
        .into_iter()
        .zip(sums.into_iter().zip(counts))
        .map(|(name, (sum, count))| {
            let mean = if count == 0 { 0.0 } else { sum / count as f64 };
            (name, round_to(mean, 2))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::HashEmbedder;

    fn ontology() -> SkillOntology {
        SkillOntology::from_descriptions(
            vec![
                ("endurance".into(), "staying power".into()),
                ("strength".into(), "raw power".into()),
                ("teamwork".into(), "playing together".into()),
            ],
            &HashEmbedder::new(16),
        )
        .unwrap()
    }

    fn vector(pairs: &[(&str, f64)]) -> SkillVector {
        pairs.iter().copied().collect()
    }

    #[test]
    fn averages_contributions_per_skill() {
        let scores = aggregate(
            &[
                vector(&[("endurance", 8.0), ("strength", 6.0)]),
                vector(&[("endurance", 6.0)]),
            ],
            &ontology(),
        );
        assert_eq!(scores.get("endurance"), 7.0);
        assert_eq!(scores.get("strength"), 6.0);
    }

    #[test]
    fn unmentioned_skills_score_zero() {
        let scores = aggregate(&[vector(&[("endurance", 9.0)])], &ontology());
        assert_eq!(scores.get("teamwork"), 0.0);
        assert!(scores.contains("teamwork"));
    }

    #[test]
    fn no_contributions_gives_all_zero_in_ontology_order() {
        let scores = aggregate(&[], &ontology());
        assert_eq!(
            scores.keys().collect::<Vec<_>>(),
            vec!["endurance", "strength", "teamwork"]
        );
        assert!(scores.iter().all(|(_, v)| v == 0.0));
    }

    #[test]
    fn skills_outside_the_ontology_are_ignored() {
        let scores = aggregate(&[vector(&[("juggling", 10.0), ("strength", 3.0)])], &ontology());
        assert!(!scores.contains("juggling"));
        assert_eq!(scores.len(), 3);
    }

    #[test]
    fn explicit_zero_counts_toward_the_mean() {
        let scores = aggregate(
            &[vector(&[("strength", 0.0)]), vector(&[("strength", 5.0)])],
            &ontology(),
        );
        assert_eq!(scores.get("strength"), 2.5);
    }

    #[test]
    fn mean_is_rounded_to_two_decimals() {
        let scores = aggregate(
            &[
                vector(&[("endurance", 1.0)]),
                vector(&[("endurance", 1.0)]),
                vector(&[("endurance", 2.0)]),
            ],
            &ontology(),
        );
        assert_eq!(scores.get("endurance"), 1.33);
    }
}
