use std::path::PathBuf;

use sport_matcher::{
    EmbeddingProvider, EngineConfig, HashEmbedder, MatchError, Questionnaire, RawAnswers,
    ScoringEngine, SkillOntology, SkillVector, SportCatalog,
};

/// Two-dimensional keyword embedder: axis 0 counts running words, axis 1 team words.
struct KeywordEmbedder;

impl EmbeddingProvider for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    fn encode(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|text| {
                let lower = text.to_lowercase();
                let run = ["run", "race", "distance", "stamina"]
                    .iter()
                    .filter(|w| lower.contains(*w))
                    .count() as f32;
                let team = ["team", "together", "pass"]
                    .iter()
                    .filter(|w| lower.contains(*w))
                    .count() as f32;
                let norm = (run * run + team * team).sqrt();
                if norm == 0.0 {
                    vec![0.0, 0.0]
                } else {
                    vec![run / norm, team / norm]
                }
            })
            .collect())
    }
}

struct BrokenEmbedder;

impl EmbeddingProvider for BrokenEmbedder {
    fn name(&self) -> &str {
        "broken"
    }

    fn encode(&self, _texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        anyhow::bail!("model unavailable")
    }
}

const SKILLS: &str = r#"{
    "endurance": "Running long distance races with stamina",
    "teamwork": "Playing together as a team"
}"#;

const SPORTS: &str = r#"{
    "sports": {
        "Marathon": {"endurance": 0.9, "teamwork": 0.1},
        "Basketball": {"endurance": 0.3, "teamwork": 0.9}
    }
}"#;

fn engine(normalize: bool) -> ScoringEngine<KeywordEmbedder> {
    let ontology = SkillOntology::from_json_str(SKILLS, &KeywordEmbedder).unwrap();
    let catalog = SportCatalog::from_json_str(SPORTS).unwrap();
    let config = EngineConfig {
        normalize,
        ..EngineConfig::default()
    };
    ScoringEngine::new(ontology, catalog, KeywordEmbedder, config).unwrap()
}

fn vector(pairs: &[(&str, f64)]) -> SkillVector {
    pairs.iter().copied().collect()
}

#[test]
fn endurance_profile_prefers_marathon() {
    let engine = engine(false);
    let profile = vector(&[("endurance", 0.95), ("teamwork", 0.05)]);

    let ranked = engine.recommend(&profile, 2).unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(ranked[0].sport, "Marathon");
    assert_eq!(ranked[1].sport, "Basketball");
    assert!(ranked[0].score > ranked[1].score);

    let diff = engine.explain(&profile, "Marathon").unwrap();
    assert_eq!(diff.get("endurance"), 0.05);
    assert_eq!(diff.get("teamwork"), -0.05);
}

#[test]
fn normalization_does_not_change_the_ranking() {
    let profile = vector(&[("endurance", 0.95), ("teamwork", 0.05)]);
    let raw = engine(false).recommend(&profile, 2).unwrap();
    let normalized = engine(true).recommend(&profile, 2).unwrap();
    assert_eq!(raw, normalized);
}

#[test]
fn explain_matches_rounded_difference_for_every_profile_skill() {
    let engine = engine(false);
    let profile = vector(&[("endurance", 0.123), ("teamwork", 0.777), ("focus", 0.5)]);
    let sport = engine.catalog().get("Basketball").unwrap().clone();
    let diff = engine.explain(&profile, "Basketball").unwrap();
    for (skill, value) in profile.iter() {
        let expected = ((value - sport.get(skill)) * 100.0).round() / 100.0;
        assert_eq!(diff.get(skill), expected, "{skill}");
    }
}

#[test]
fn semantic_scores_follow_sentence_content() {
    let engine = engine(false);
    let scores = engine
        .semantic_scores("I run long distance races. My team plays together!")
        .unwrap();
    // Sentence one aligns with endurance, sentence two with teamwork.
    assert!(scores.get("endurance") > 0.0);
    assert!(scores.get("teamwork") > 0.0);
    assert!(scores.get("endurance") <= 10.0);

    let empty = engine.semantic_scores("   ").unwrap();
    assert_eq!(empty, vector(&[("endurance", 0.0), ("teamwork", 0.0)]));
}

#[test]
fn numeric_scores_average_contributions() {
    let engine = engine(false);
    let numeric = engine.numeric_scores(&[
        vector(&[("endurance", 8.0)]),
        vector(&[("endurance", 6.0), ("teamwork", 2.0)]),
    ]);
    assert_eq!(numeric.get("endurance"), 7.0);
    assert_eq!(numeric.get("teamwork"), 2.0);
}

#[test]
fn embedding_failures_surface_unmodified() {
    let err = SkillOntology::from_json_str(SKILLS, &BrokenEmbedder).unwrap_err();
    assert!(matches!(err, MatchError::Embedding(_)));
    assert_eq!(err.to_string(), "model unavailable");
}

#[test]
fn full_pipeline_over_bundled_data() {
    let data = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("data");
    let embedder = HashEmbedder::default();
    let ontology = SkillOntology::load(data.join("skill.json"), &embedder).unwrap();
    let catalog = SportCatalog::load(data.join("sports.json")).unwrap();
    let questionnaire = Questionnaire::load(data.join("questions.json")).unwrap();
    let raw: RawAnswers =
        serde_json::from_str(&std::fs::read_to_string(data.join("answers.json")).unwrap()).unwrap();

    let engine = ScoringEngine::new(ontology, catalog, embedder, EngineConfig::default()).unwrap();
    let submission = questionnaire.submission(&raw).unwrap();
    let analysis = engine.analyze(&submission, 3).unwrap();

    assert_eq!(analysis.profile.len(), engine.ontology().len());
    assert_eq!(analysis.recommendations.len(), 3);
    assert!(analysis
        .recommendations
        .windows(2)
        .all(|w| w[0].score >= w[1].score));
    assert!((analysis.profile.norm() - 1.0).abs() < 1e-9);

    let explanation = analysis.explanation.unwrap();
    assert_eq!(explanation.sport, analysis.recommendations[0].sport);
    assert_eq!(explanation.largest_gaps.len(), 6);
}
