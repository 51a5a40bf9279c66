//! `pressroom` command line tool. Drafts press releases and reports token
//! usage. The API key comes from `OPENAI_API_KEY` (a `.env` file is read if
//! present). Set `RUST_LOG=debug` to see requests.

use std::{path::PathBuf, process::ExitCode};

use chrono::{Local, NaiveDate};
use clap::{Args, Parser, Subcommand};
use pressroom::{
    config::ConfigError,
    release::{Announcement, Briefing},
    usage::{RangeError, MAX_RANGE_DAYS},
    Artifact, Client, Config, DateRange, Generation, Model, ReleaseRequest,
    StyleExample, Submission, Tone, ValidationContext,
};

/// Exit code for configuration errors.
const EXIT_CONFIG: u8 = 2;
/// Exit code when interrupted with Ctrl-C.
const EXIT_INTERRUPTED: u8 = 130;

/// Draft press releases with a chat-completion API and report token usage.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Draft from a title and core message, in the house style.
    Briefing {
        /// Headline of the release.
        #[arg(long)]
        title: String,
        /// Person in charge.
        #[arg(long)]
        contact: String,
        /// Contact phone number (digits and `-` only).
        #[arg(long, default_value = "044-300-0000")]
        phone: String,
        /// What the release must convey.
        #[arg(long)]
        core: String,
        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// Draft from a topic, keywords and contact details.
    Announce {
        /// What the release is about.
        #[arg(long)]
        topic: String,
        /// Key phrase. Repeat up to three times.
        #[arg(long = "keyword")]
        keywords: Vec<String>,
        /// Responsible department.
        #[arg(long)]
        department: Option<String>,
        /// Person in charge.
        #[arg(long)]
        contact: String,
        /// Contact phone number (digits and `-` only).
        #[arg(long, default_value = "044-300-0000")]
        phone: String,
        /// Contact e-mail.
        #[arg(long)]
        email: Option<String>,
        /// When the announced measure applies (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        apply_date: Option<NaiveDate>,
        #[command(flatten)]
        generate: GenerateArgs,
    },
    /// Token usage statistics.
    Usage {
        #[command(subcommand)]
        mode: UsageMode,
    },
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// 단순명료 (concise), 보통설명 (balanced) or 상세한설명 (detailed).
    /// Defaults to the form's own tone.
    #[arg(long)]
    tone: Option<Tone>,
    /// Model override. Takes precedence over `PRESSROOM_MODEL`.
    #[arg(long)]
    model: Option<Model>,
    /// Save the generated text to this file, or to `보도자료.txt` inside this
    /// directory.
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum UsageMode {
    /// One request per day; prints a table. Defaults to the last 7 days.
    Daily {
        /// First day (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<NaiveDate>,
    },
    /// One request for the whole range. Defaults to the last 30 days.
    Total {
        /// First day (YYYY-MM-DD).
        #[arg(long)]
        start: Option<NaiveDate>,
        /// Last day (YYYY-MM-DD). Defaults to today.
        #[arg(long)]
        end: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // A missing .env is fine.
    let _ = dotenvy::dotenv();
    env_logger::init();

    let cli = Cli::parse();
    let today = Local::now().date_naive();

    match cli.command {
        Command::Briefing {
            title,
            contact,
            phone,
            core,
            generate: args,
        } => {
            let request = Briefing {
                title,
                contact_person: contact,
                phone,
                core_message: core,
            };
            generate(request.into(), args).await
        }
        Command::Announce {
            topic,
            keywords,
            department,
            contact,
            phone,
            email,
            apply_date,
            generate: args,
        } => {
            let request = Announcement {
                topic,
                keywords,
                department,
                contact_person: contact,
                phone,
                email,
                apply_date: Some(apply_date.unwrap_or(today)),
            };
            generate(request.into(), args).await
        }
        Command::Usage {
            mode: UsageMode::Daily { start, end },
        } => daily(range(start, end, today, 7)).await,
        Command::Usage {
            mode: UsageMode::Total { start, end },
        } => total(range(start, end, today, 30)).await,
    }
}

/// Rendered generation and the stream it goes to. Only generated text goes to
/// stdout so it can be redirected to a file.
#[derive(Debug, PartialEq, Eq)]
enum Output {
    Stdout(String),
    Stderr(String),
}

impl Output {
    fn of(generation: &Generation) -> Self {
        let text = generation.to_string();
        if generation.is_success() {
            Self::Stdout(text)
        } else {
            Self::Stderr(text)
        }
    }
}

fn config() -> Result<Config, ExitCode> {
    Config::from_env().map_err(config_error)
}

fn client(config: Config) -> Result<Client, ExitCode> {
    config.client().map_err(config_error)
}

fn config_error(error: ConfigError) -> ExitCode {
    eprintln!("{}", error);
    ExitCode::from(EXIT_CONFIG)
}

fn range(
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
    today: NaiveDate,
    default_days: u64,
) -> Result<DateRange, RangeError> {
    let end = end.unwrap_or(today);
    match start {
        Some(start) => DateRange::new(start, end),
        None => DateRange::ending(end, default_days),
    }
}

async fn generate(request: ReleaseRequest, args: GenerateArgs) -> ExitCode {
    let config = match config() {
        Ok(config) => config,
        Err(code) => return code,
    };

    let style = match request {
        ReleaseRequest::Briefing(_) => {
            let style = StyleExample::load(&config.style_file);
            eprintln!("{}", style.status.caption());
            style
        }
        ReleaseRequest::Announcement(_) => StyleExample::empty(),
    };

    let mut submission = Submission::new(&request, &style);
    if let Some(tone) = args.tone {
        submission = submission.tone(tone);
    }
    if let Some(model) = args.model.or_else(|| config.model.clone()) {
        submission = submission.model(model);
    }

    let chat = match submission.prepare(ValidationContext::new()) {
        Ok(chat) => chat,
        Err(ctx) => {
            for error in ctx.errors() {
                eprintln!("{}: {}", error.field(), error);
            }
            return ExitCode::FAILURE;
        }
    };

    let client = match client(config) {
        Ok(client) => client,
        Err(code) => return code,
    };
    eprintln!("보도자료 생성 중...");
    let generation = tokio::select! {
        generation = client.generate(&chat) => generation,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("취소되었습니다.");
            return ExitCode::from(EXIT_INTERRUPTED);
        }
    };

    match Output::of(&generation) {
        Output::Stdout(text) => println!("{}", text),
        Output::Stderr(text) => {
            eprintln!("{}", text);
            return ExitCode::FAILURE;
        }
    }

    if let (Some(target), Some(artifact)) =
        (args.save, Artifact::from_generation(&generation))
    {
        match artifact.save(&target) {
            Ok(path) => eprintln!("저장했습니다: {}", path.display()),
            Err(e) => {
                eprintln!("{} 저장 실패: {}", target.display(), e);
                return ExitCode::FAILURE;
            }
        }
    }

    ExitCode::SUCCESS
}

async fn daily(range: Result<DateRange, RangeError>) -> ExitCode {
    let client = match config().and_then(client) {
        Ok(client) => client,
        Err(code) => return code,
    };
    let range = match range.and_then(|r| r.limit(MAX_RANGE_DAYS)) {
        Ok(range) => range,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    log::info!("Daily usage {} ..= {}", range.start(), range.end());
    eprintln!("사용 통계 조회 중...");
    let report = tokio::select! {
        report = client.daily_usage(range) => report,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("취소되었습니다.");
            return ExitCode::from(EXIT_INTERRUPTED);
        }
    };
    let report = match report {
        Ok(report) => report,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    for warning in report.warnings() {
        eprintln!("{}", warning);
    }
    print!("{}", report);
    println!("합계: {} 토큰", report.total());

    ExitCode::SUCCESS
}

async fn total(range: Result<DateRange, RangeError>) -> ExitCode {
    let client = match config().and_then(client) {
        Ok(client) => client,
        Err(code) => return code,
    };
    let range = match range {
        Ok(range) => range,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    eprintln!("사용 통계 조회 중...");
    let result = tokio::select! {
        result = client.usage_for_range(range) => result,
        _ = tokio::signal::ctrl_c() => {
            eprintln!("취소되었습니다.");
            return ExitCode::from(EXIT_INTERRUPTED);
        }
    };

    match result {
        Ok(summary) => {
            match summary.total_usage {
                Some(tokens) => println!("총 사용량: {} 토큰", tokens),
                None => println!("사용량 데이터를 불러올 수 없습니다."),
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            match e.service_message() {
                Some(body) => eprintln!("{}", body),
                None => eprintln!("{}", e),
            }
            ExitCode::FAILURE
        }
    }
}
