use std::path::PathBuf;

use clap::Parser;
use color_eyre::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use quizotidien::badges;
use quizotidien::db::{self, Store};
use quizotidien::generate::GeminiSource;
use quizotidien::models::Difficulty;
use quizotidien::session::{Notify, Phase, QuizSession};

#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// libSQL server address; the local JSON store is used when unset or
    /// unreachable.
    #[arg(long, env = "DATABASE_URL")]
    url: Option<String>,

    /// libSQL authentication token.
    #[arg(long, env = "DATABASE_AUTH_TOKEN", default_value = "")]
    auth_token: String,

    /// Directory for the local fallback store.
    #[arg(long, env = "QUIZ_DATA_DIR", default_value = ".quizotidien")]
    data_dir: PathBuf,

    /// Participant name.
    #[arg(short, long, env = "QUIZ_USERNAME")]
    username: String,

    /// Gemini API key; the static question set is served when unset.
    #[arg(long, env = "GEMINI_API_KEY")]
    gemini_api_key: Option<String>,

    /// Resend API key for the score email.
    #[arg(long, env = "RESEND_API_KEY")]
    resend_api_key: Option<String>,

    /// Recipient of the score email.
    #[arg(long, env = "SCORE_EMAIL")]
    score_email: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;

    let filter =
        std::env::var("RUST_LOG").unwrap_or_else(|_| "quizotidien=info".to_owned());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let args = Args::parse();

    let store = Store::connect(args.url.as_deref(), &args.auth_token, &args.data_dir).await?;
    let user = db::ensure_user(&store, &args.username).await?;

    let config = store.get_global_config().await?;
    if !config.is_quiz_open && !config.is_manual_override {
        println!("Le quiz est fermé pour le moment. Revenez plus tard!");
        return Ok(());
    }

    let notify = match (args.resend_api_key, args.score_email) {
        (Some(resend_api_key), Some(recipient)) => Some(Notify {
            resend_api_key,
            recipient,
        }),
        _ => None,
    };

    let source = GeminiSource::new(args.gemini_api_key);
    let mut session = QuizSession::new(store, source, user, notify).await?;

    if session.phase() == Phase::Blocked {
        print_blocked(&session);
        return Ok(());
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    let rec = session.recommendation();
    println!("As-salamu alaykum, {}!", args.username);
    println!("💡 Recommandé: {}", rec.message);
    if rec.total_taken > 0 {
        println!(
            "   Quizzes complétés: {} | Score moyen: {}%",
            rec.total_taken, rec.average_score
        );
    }
    println!();

    let difficulty = prompt_difficulty(&mut lines).await?;
    println!("L'IA prépare votre quiz...");
    session.start(difficulty).await?;

    while session.phase() == Phase::Playing {
        play_question(&mut session, &mut lines).await?;
    }

    print_finished(&session);
    Ok(())
}

async fn prompt_difficulty(lines: &mut Lines<BufReader<Stdin>>) -> Result<Difficulty> {
    println!("Choisissez votre défi:");
    println!("  1) Débutant (Facile)");
    println!("  2) Intermédiaire");
    println!("  3) Avancé");
    println!("  4) Expert");
    println!("  5) Mode Progressif [défaut]");

    let choice = lines.next_line().await?.unwrap_or_default();
    Ok(match choice.trim() {
        "1" => Difficulty::Easy,
        "2" => Difficulty::Medium,
        "3" => Difficulty::Hard,
        "4" => Difficulty::Expert,
        _ => Difficulty::Adaptive,
    })
}

/// Runs one question: a 1-second ticker against the countdown, racing the
/// player's answer on stdin. Whichever locks the question first wins.
async fn play_question<S>(
    session: &mut QuizSession<S>,
    lines: &mut Lines<BufReader<Stdin>>,
) -> Result<()> {
    let Some(question) = session.current_question() else {
        return Ok(());
    };
    let correct = question.correct_answer_index;
    let explanation = question.explanation.clone();

    println!();
    println!(
        "Question {}/{} [{}] — Score: {}",
        session.current_index() + 1,
        session.question_count(),
        question.difficulty,
        session.score()
    );
    println!("{}", question.question_text);
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}) {}", i + 1, option);
    }
    println!("Votre réponse (1-4), {} secondes:", session.time_left());

    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(1));
    ticker.tick().await; // first tick is immediate

    while !session.is_answered() {
        tokio::select! {
            _ = ticker.tick() => {
                session.tick();
                let left = session.time_left();
                if !session.is_answered() && left <= 5 {
                    println!("⏱ {left}s...");
                }
            }
            line = lines.next_line() => {
                if let Ok(Some(line)) = line {
                    if let Ok(n) = line.trim().parse::<usize>() {
                        if n >= 1 {
                            session.choose(n - 1);
                        }
                    }
                }
            }
        }
    }

    match session.selected() {
        None => println!("Temps écoulé !"),
        Some(i) if i == correct => println!("✅ Bonne réponse !"),
        Some(_) => println!("❌ Mauvaise réponse."),
    }
    if explanation.is_empty() {
        println!("Explication : Réponse correcte.");
    } else {
        println!("Explication : {explanation}");
    }

    session.advance().await
}

fn print_blocked<S>(session: &QuizSession<S>) {
    let rec = session.recommendation();
    println!("Quiz Déjà Complété");
    println!("Vous avez déjà complété votre quiz pour aujourd'hui.");
    println!("📅 Réessayez demain pour continuer votre progression!");
    println!("✨ Prochaine session: {}", rec.message);
    println!(
        "   Quizzes complétés: {} | Score moyen: {}%",
        rec.total_taken, rec.average_score
    );
}

fn print_finished<S>(session: &QuizSession<S>) {
    println!();
    println!("Quiz Terminé !");
    println!(
        "Votre score final ({}) : {}/{}",
        session.difficulty(),
        session.score(),
        session.max_score()
    );

    for id in session.newly_awarded() {
        if let Some(def) = badges::definition(id) {
            println!("🏅 Nouveau badge: {} {} — {}", def.icon, def.name, def.description);
        }
    }
}
