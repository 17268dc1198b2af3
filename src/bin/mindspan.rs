//! Mindspan CLI - Command-line interface for the assessment engine
//!
//! Commands:
//! - simulate: Run a full scripted battery session and print the record
//! - classify: Classify a feature-vector JSON into a prediction
//! - cohort: Summarize the category distribution of stored records
//! - sample: Emit a synthetic cohort of result records

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;

use mindspan::battery::digit_span::SpanFeedback;
use mindspan::stimulus::TARGET_LETTER;
use mindspan::types::VisualPhase;
use mindspan::{
    cohort, dataset, AssessmentSession, Classifier, ClassifierStrategy, DomainAverageClassifier,
    EducationLevel, FeatureVector, ParticipantProfile, ResultRecord, SessionConfig, SessionView,
    TrialEvent, WeightedVoteClassifier, ENGINE_VERSION,
};

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

/// Mindspan - On-device assessment engine for cognitive batteries
#[derive(Parser)]
#[command(name = "mindspan")]
#[command(author = "Mindspan Labs")]
#[command(version = ENGINE_VERSION)]
#[command(about = "Administer and score cognitive assessment batteries", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a full scripted session and print the finalized record
    Simulate {
        /// RNG seed for stimuli and the scripted participant
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Participant identifier
        #[arg(long, default_value = "sim-participant")]
        participant_id: String,

        /// Participant age (18-85)
        #[arg(long, default_value = "30")]
        age: u8,

        /// Participant education level
        #[arg(long, value_enum, default_value = "medium")]
        education: EducationArg,

        /// Probability the scripted participant answers correctly
        #[arg(long, default_value = "1.0")]
        skill: f64,

        /// Classification strategy
        #[arg(long, value_enum, default_value = "weighted")]
        model: ModelArg,

        /// Include the digit-span practice block
        #[arg(long)]
        practice: bool,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Classify a feature-vector JSON document
    Classify {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Classification strategy
        #[arg(long, value_enum, default_value = "weighted")]
        model: ModelArg,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Summarize the category distribution of a result-record array
    Cohort {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
    },

    /// Emit a synthetic cohort of result records
    Sample {
        /// Number of records to generate
        #[arg(long, default_value = "20")]
        count: usize,

        /// RNG seed
        #[arg(long, default_value = "0")]
        seed: u64,

        /// Pretty-print the output JSON
        #[arg(long)]
        pretty: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum EducationArg {
    Basic,
    Medium,
    Superior,
}

impl From<EducationArg> for EducationLevel {
    fn from(arg: EducationArg) -> Self {
        match arg {
            EducationArg::Basic => EducationLevel::Basic,
            EducationArg::Medium => EducationLevel::Medium,
            EducationArg::Superior => EducationLevel::Superior,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ModelArg {
    Weighted,
    Average,
}

impl From<ModelArg> for ClassifierStrategy {
    fn from(arg: ModelArg) -> Self {
        match arg {
            ModelArg::Weighted => ClassifierStrategy::WeightedVote,
            ModelArg::Average => ClassifierStrategy::DomainAverage,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let result = match cli.command {
        Commands::Simulate {
            seed,
            participant_id,
            age,
            education,
            skill,
            model,
            practice,
            pretty,
        } => cmd_simulate(
            seed,
            &participant_id,
            age,
            education.into(),
            skill,
            model.into(),
            practice,
            pretty,
        ),
        Commands::Classify { input, model, pretty } => cmd_classify(&input, model, pretty),
        Commands::Cohort { input, pretty } => cmd_cohort(&input, pretty),
        Commands::Sample { count, seed, pretty } => cmd_sample(count, seed, pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("error: {}", message);
            ExitCode::FAILURE
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn cmd_simulate(
    seed: u64,
    participant_id: &str,
    age: u8,
    education: EducationLevel,
    skill: f64,
    strategy: ClassifierStrategy,
    practice: bool,
    pretty: bool,
) -> Result<(), String> {
    let skill = skill.clamp(0.0, 1.0);
    let profile =
        ParticipantProfile::new(participant_id, age, education).map_err(|e| e.to_string())?;
    let mut session = AssessmentSession::new(
        profile,
        SessionConfig {
            include_practice: practice,
            seed: Some(seed),
            strategy,
        },
    )
    .map_err(|e| e.to_string())?;

    // Separate RNG for the scripted participant, so stimulus draws stay
    // identical across skill levels.
    let mut participant = SmallRng::seed_from_u64(seed.wrapping_add(1));
    drive_session(&mut session, &mut participant, skill)?;

    let record = session
        .record()
        .ok_or_else(|| "session did not produce a record".to_string())?;
    print_json(record, pretty)
}

/// Drive a session to completion through its public surface, answering
/// correctly with probability `skill`.
fn drive_session(
    session: &mut AssessmentSession,
    participant: &mut SmallRng,
    skill: f64,
) -> Result<(), String> {
    let mut now = 0u64;
    session.start(now).map_err(|e| e.to_string())?;

    let mut studied: Vec<char> = Vec::new();
    let mut sequence: Vec<u8> = Vec::new();

    // Generous upper bound; a session needs on the order of 100 steps.
    for _ in 0..100_000 {
        match session.view() {
            SessionView::StudySymbol { .. } | SessionView::SpanSequence { .. } => {
                if let SessionView::SpanSequence { digits } = session.view() {
                    sequence = digits;
                }
                // Track the study set the way a real renderer could: from
                // the emitted trial events.
                studied = session
                    .trial_log()
                    .iter()
                    .filter_map(|e| match e {
                        TrialEvent::Visual {
                            phase: VisualPhase::Study,
                            symbol,
                            ..
                        } => Some(*symbol),
                        _ => None,
                    })
                    .collect();
                let deadline = session
                    .next_deadline()
                    .ok_or_else(|| "no pending timer during presentation".to_string())?;
                now = deadline;
                session.poll(now);
            }
            SessionView::RecognitionPrompt { symbol, .. } => {
                let truth = studied.contains(&symbol);
                let answer = if participant.gen_bool(skill) { truth } else { !truth };
                now += 700;
                session
                    .respond_recognition(answer, now)
                    .map_err(|e| e.to_string())?;
            }
            SessionView::SpanInputPrompt { .. } => {
                let mut answer: Vec<u8> = sequence.iter().rev().copied().collect();
                if !participant.gen_bool(skill) && !answer.is_empty() {
                    let slot = participant.gen_range(0..answer.len());
                    answer[slot] = (answer[slot] + 1) % 10;
                }
                now += 650;
                let feedback = session.submit_span(&answer, now).map_err(|e| e.to_string())?;
                if feedback == SpanFeedback::Void {
                    return Err("scripted span answer was voided".to_string());
                }
            }
            SessionView::AttentionLetter { letter, .. } => {
                let is_target = letter == TARGET_LETTER;
                let press = if is_target {
                    participant.gen_bool(skill)
                } else {
                    // Occasional false alarm for unskilled participants.
                    participant.gen_bool((1.0 - skill) * 0.5)
                };
                if press {
                    session.respond_target(now + 400).map_err(|e| e.to_string())?;
                }
                let deadline = session
                    .next_deadline()
                    .ok_or_else(|| "attention run lost its tick".to_string())?;
                now = deadline;
                session.poll(now);
            }
            SessionView::Complete => return Ok(()),
            SessionView::Intake | SessionView::Abandoned => {
                return Err("session left the battery unexpectedly".to_string())
            }
        }
    }
    Err("session did not complete".to_string())
}

fn cmd_classify(input: &PathBuf, model: ModelArg, pretty: bool) -> Result<(), String> {
    let raw = read_input(input)?;
    let features: FeatureVector =
        serde_json::from_str(&raw).map_err(|e| format!("invalid feature vector: {}", e))?;

    let prediction = match model {
        ModelArg::Weighted => WeightedVoteClassifier::new().classify(&features),
        ModelArg::Average => DomainAverageClassifier::new().classify(&features),
    }
    .map_err(|e| e.to_string())?;

    print_json(&prediction, pretty)
}

fn cmd_cohort(input: &PathBuf, pretty: bool) -> Result<(), String> {
    let raw = read_input(input)?;
    let records: Vec<ResultRecord> =
        serde_json::from_str(&raw).map_err(|e| format!("invalid record array: {}", e))?;

    let distribution = cohort::summarize(&records).map_err(|e| e.to_string())?;
    print_json(&distribution, pretty)
}

fn cmd_sample(count: usize, seed: u64, pretty: bool) -> Result<(), String> {
    let records = dataset::generate_seeded(seed, count);
    print_json(&records, pretty)
}

fn read_input(path: &PathBuf) -> Result<String, String> {
    if path.as_os_str() == "-" {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        Ok(buffer)
    } else {
        fs::read_to_string(path).map_err(|e| format!("failed to read {}: {}", path.display(), e))
    }
}

fn print_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<(), String> {
    let output = if pretty {
        serde_json::to_string_pretty(value)
    } else {
        serde_json::to_string(value)
    }
    .map_err(|e| e.to_string())?;
    println!("{}", output);
    Ok(())
}
