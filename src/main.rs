use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};

use sport_matcher::history::{self, HistoryRecord};
use sport_matcher::{
    Analysis, EmbeddingProvider, EngineConfig, HashEmbedder, Questionnaire, RawAnswers,
    ScoringEngine, SkillOntology, SkillVector, SportCatalog,
};

/// Sentence embedding backend.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum EmbedderKind {
    /// Deterministic feature hashing, no model download.
    Hash,
    /// all-MiniLM-L6-v2 through rust-bert (build with `--features bert`).
    Bert,
}

#[derive(Debug, Parser)]
#[command(
    name = "sport-matcher",
    about = "Scores questionnaire answers into a skill profile and recommends sports"
)]
struct Cli {
    /// Skill ontology: `{ skill: description }`.
    #[arg(long, env = "SPORT_MATCHER_SKILLS", default_value = "data/skill.json")]
    skills: PathBuf,
    /// Sport catalog: `{ "sports": { sport: { skill: weight } } }`.
    #[arg(long, env = "SPORT_MATCHER_SPORTS", default_value = "data/sports.json")]
    sports: PathBuf,
    #[arg(long, value_enum, env = "SPORT_MATCHER_EMBEDDER", default_value_t = EmbedderKind::Hash)]
    embedder: EmbedderKind,
    /// Weight of free-text scores in the profile.
    #[arg(long, default_value_t = 0.6)]
    semantic_weight: f64,
    /// Weight of questionnaire scores in the profile.
    #[arg(long, default_value_t = 0.4)]
    numeric_weight: f64,
    /// Compare raw vectors instead of L2-normalized ones.
    #[arg(long, default_value_t = false)]
    raw: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Scores a questionnaire submission and recommends sports.
    Analyze {
        #[arg(long, default_value = "data/questions.json")]
        questions: PathBuf,
        /// Submitted answers: `{ question_id: value }`.
        #[arg(long)]
        answers: PathBuf,
        #[arg(long, default_value_t = 3)]
        top_n: usize,
        /// CSV file each analysis is appended to.
        #[arg(long, env = "SPORT_MATCHER_HISTORY", default_value = "recommendations.csv")]
        history: PathBuf,
        #[arg(long, default_value_t = false)]
        no_history: bool,
        /// Print the full analysis as JSON.
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Ranks sports for a stored profile `{ skill: score }`.
    Recommend {
        #[arg(long)]
        profile: PathBuf,
        #[arg(long, default_value_t = 3)]
        top_n: usize,
    },
    /// Writes the catalog with every sport vector L2-normalized.
    Normalize {
        #[arg(long, default_value = "data/sports_l2.json")]
        output: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = EngineConfig {
        semantic_weight: cli.semantic_weight,
        numeric_weight: cli.numeric_weight,
        normalize: !cli.raw,
    };
    config.validate()?;

    match &cli.command {
        Commands::Normalize { output } => {
            let catalog = SportCatalog::load(&cli.sports)?;
            catalog.normalize().save(output)?;
            println!(
                "All {} sport vectors have been L2-normalized and saved to {}",
                catalog.len(),
                output.display()
            );
        }
        Commands::Recommend { profile, top_n } => {
            let engine = build_engine(&cli, config)?;
            let stored: SkillVector = read_json(profile)?;
            let profile = engine.conform(&stored);
            let recommendations = engine.recommend(&profile, *top_n)?;

            println!("Best sports for this profile:");
            for rec in &recommendations {
                println!("- {} ({})", rec.sport, rec.score);
            }
            if let Some(best) = recommendations.first() {
                print_skill_vector(
                    &format!("Skill difference vs {}", best.sport),
                    &engine.explain(&profile, &best.sport)?,
                );
            }
        }
        Commands::Analyze {
            questions,
            answers,
            top_n,
            history: history_path,
            no_history,
            json,
        } => {
            let engine = build_engine(&cli, config)?;
            let questionnaire = Questionnaire::load(questions)?;
            let raw: RawAnswers = read_json(answers)?;
            let submission = questionnaire.submission(&raw)?;
            let analysis = engine.analyze(&submission, *top_n)?;

            if *json {
                println!("{}", serde_json::to_string_pretty(&analysis)?);
            } else {
                print_analysis(&analysis);
            }

            if !*no_history {
                history::append(history_path, &HistoryRecord::from_analysis(&analysis)?)?;
                tracing::info!(path = %history_path.display(), "logged analysis");
            }
        }
    }

    Ok(())
}

fn build_engine(
    cli: &Cli,
    config: EngineConfig,
) -> anyhow::Result<ScoringEngine<Box<dyn EmbeddingProvider>>> {
    tracing::info!(embedder = ?cli.embedder, "initializing embedding model");
    let embedder = create_embedder(cli.embedder)?;
    let ontology = SkillOntology::load(&cli.skills, embedder.as_ref())?;
    let catalog = SportCatalog::load(&cli.sports)?;
    Ok(ScoringEngine::new(ontology, catalog, embedder, config)?)
}

fn create_embedder(kind: EmbedderKind) -> anyhow::Result<Box<dyn EmbeddingProvider>> {
    match kind {
        EmbedderKind::Hash => Ok(Box::new(HashEmbedder::default())),
        #[cfg(feature = "bert")]
        EmbedderKind::Bert => Ok(Box::new(sport_matcher::BertEmbedder::remote()?)),
        #[cfg(not(feature = "bert"))]
        EmbedderKind::Bert => {
            anyhow::bail!("the bert embedder needs a build with `--features bert`")
        }
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let file = File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("failed to parse {}", path.display()))
}

fn print_skill_vector(title: &str, vector: &SkillVector) {
    println!("\n{title}");
    for (skill, value) in vector.iter() {
        println!("  {skill:<20} {value:>8.2}");
    }
}

fn print_analysis(analysis: &Analysis) {
    print_skill_vector("Your skill profile", &analysis.profile);

    println!("\nBest sports for you");
    for rec in &analysis.recommendations {
        println!("- {} ({})", rec.sport, rec.score);
    }

    if let Some(explanation) = &analysis.explanation {
        print_skill_vector(
            &format!("Skill difference vs {}", explanation.sport),
            &explanation.differences,
        );
        print_skill_vector("Largest gaps", &explanation.largest_gaps);
        print_skill_vector("Closest matches", &explanation.closest_matches);
    }
}
