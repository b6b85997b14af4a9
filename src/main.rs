use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use wellness_dashboard::answers::{
    AgeBand, DifficultySleeping, LateNightUsage, MorningTiredness, PhoneLocation, SleepQuality,
};
use wellness_dashboard::{recommend, report, risk, session, AssessmentResponse, DataCache};

#[derive(Parser)]
#[command(name = "wellness-dashboard")]
#[command(about = "Digital wellness dashboard: sleep and social media risk assessment", long_about = None)]
struct Cli {
    /// Directory holding the processed datasets and recommendation lookup
    #[arg(long, global = true, env = "WELLNESS_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,
    /// Log at debug level unless RUST_LOG says otherwise
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Research overview and dataset analytics
    Overview,
    /// Score a questionnaire and show the result
    Assess(AssessArgs),
    /// Algorithm performance behind the assessment
    Research,
    /// Interactive session over stdin/stdout
    Session,
}

#[derive(Args)]
struct AssessArgs {
    #[arg(long)]
    age: AgeBand,
    /// Total daily screen time in hours, all devices
    #[arg(long)]
    daily_usage: u32,
    /// Daily social media time in hours
    #[arg(long)]
    social_media: u32,
    /// Average sleep per night in hours
    #[arg(long)]
    sleep_hours: u32,
    /// Screen time in the two hours before bed
    #[arg(long)]
    bedtime_screen: u32,
    #[arg(long)]
    late_night: LateNightUsage,
    #[arg(long)]
    sleep_quality: SleepQuality,
    #[arg(long)]
    phone: PhoneLocation,
    #[arg(long, default_value = "Sometimes")]
    difficulty_sleeping: DifficultySleeping,
    #[arg(long, default_value = "Sometimes tired")]
    morning_tiredness: MorningTiredness,
    /// Also print the recommendation plan
    #[arg(long)]
    plan: bool,
    /// Write assessment and plan as a markdown report
    #[arg(long)]
    out: Option<PathBuf>,
}

impl AssessArgs {
    fn response(&self) -> AssessmentResponse {
        AssessmentResponse {
            age: self.age,
            daily_usage_hours: self.daily_usage,
            social_media_hours: self.social_media,
            sleep_hours: self.sleep_hours,
            bedtime_screen_hours: self.bedtime_screen,
            late_night_usage: self.late_night,
            sleep_quality: self.sleep_quality,
            phone_location: self.phone,
            difficulty_sleeping: self.difficulty_sleeping,
            morning_tiredness: self.morning_tiredness,
        }
    }
}

fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_directives = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directives))
        .context("invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose)?;

    let cache = DataCache::new(&cli.data_dir);
    let data = cache.get().with_context(|| {
        format!(
            "could not load dashboard data; ensure all data files are in {}",
            cache.data_dir().display()
        )
    })?;

    match cli.command {
        Commands::Overview => {
            print!("{}", report::build_overview(&data));
        }
        Commands::Assess(args) => {
            let response = args.response();
            response.validate()?;
            let result = risk::assess(&response);
            let entry = recommend::select(&result, &data.recommendations);

            print!("{}", report::build_assessment(&result));
            if args.plan {
                println!();
                print!("{}", report::build_recommendations(Some(&result), entry));
            }
            if let Some(out) = args.out {
                let contents = report::build_plan_report(&result, entry, chrono::Utc::now());
                std::fs::write(&out, contents)
                    .with_context(|| format!("failed to write {}", out.display()))?;
                println!("Report written to {}.", out.display());
            }
        }
        Commands::Research => {
            print!("{}", report::build_research(&data));
        }
        Commands::Session => {
            let mut session = session::Session::new();
            let stdin = std::io::stdin();
            let mut input = stdin.lock();
            let mut output = std::io::stdout().lock();
            session::run(&mut session, &data, &mut input, &mut output)?;
        }
    }

    Ok(())
}
