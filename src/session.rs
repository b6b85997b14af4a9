use std::io::{self, BufRead, Write};

use chrono::{DateTime, Utc};
use tracing::{info, info_span, warn};
use uuid::Uuid;

use crate::answers::{
    AgeBand, Choice, DifficultySleeping, HoursRange, LateNightUsage, MorningTiredness,
    PhoneLocation, SleepQuality, BEDTIME_SCREEN_HOURS, DAILY_USAGE_HOURS, SLEEP_HOURS,
    SOCIAL_MEDIA_HOURS,
};
use crate::error::{DashboardError, DashboardResult};
use crate::loader::Datasets;
use crate::models::{AssessmentResponse, AssessmentResult};
use crate::{recommend, report, risk};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    Assessment,
    Recommendations,
    Research,
}

impl View {
    pub fn parse(command: &str) -> Option<Self> {
        match command.trim().to_lowercase().as_str() {
            "overview" | "home" => Some(View::Overview),
            "assess" | "assessment" => Some(View::Assessment),
            "recommend" | "recommendations" | "plan" => Some(View::Recommendations),
            "research" | "results" => Some(View::Research),
            _ => None,
        }
    }
}

#[derive(Debug)]
pub struct Session {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    view: View,
    last_result: Option<AssessmentResult>,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    pub fn new() -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            view: View::Overview,
            last_result: None,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn navigate(&mut self, view: View) {
        self.view = view;
    }

    pub fn last_result(&self) -> Option<&AssessmentResult> {
        self.last_result.as_ref()
    }

    pub fn submit(&mut self, response: &AssessmentResponse) -> DashboardResult<&AssessmentResult> {
        response.validate()?;
        let result = risk::assess(response);
        info!(
            target: "dashboard::session",
            risk_level = result.risk_level.label(),
            risk_score = result.risk_score,
            "assessment submitted"
        );
        self.view = View::Assessment;
        Ok(&*self.last_result.insert(result))
    }

    pub fn render(&self, data: &Datasets) -> String {
        match self.view {
            View::Overview => report::build_overview(data),
            View::Assessment => match &self.last_result {
                Some(result) => report::build_assessment(result),
                None => "No assessment submitted yet. Type `assess` to start.\n".to_string(),
            },
            View::Recommendations => {
                let result = self.last_result.as_ref();
                let entry = result.and_then(|r| recommend::select(r, &data.recommendations));
                report::build_recommendations(result, entry)
            }
            View::Research => report::build_research(data),
        }
    }
}

const HELP: &str = "\
Commands:
  overview         research overview and data analytics
  assess           answer the questionnaire
  recommendations  your personalized plan
  research         algorithm performance
  help             show this list
  quit             end the session
";

enum Interrupt {
    Closed,
    Rejected(DashboardError),
    Io(io::Error),
}

impl From<io::Error> for Interrupt {
    fn from(err: io::Error) -> Self {
        Interrupt::Io(err)
    }
}

struct Prompter<'a, R, W> {
    input: &'a mut R,
    output: &'a mut W,
}

impl<R: BufRead, W: Write> Prompter<'_, R, W> {
    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn answer<T>(
        &mut self,
        question: &str,
        hint: &str,
        parse: impl FnOnce(&str) -> DashboardResult<T>,
        default: T,
    ) -> Result<T, Interrupt> {
        write!(self.output, "{question} [{hint}]: ")?;
        self.output.flush()?;
        let line = self.read_line()?.ok_or(Interrupt::Closed)?;
        if line.is_empty() {
            return Ok(default);
        }
        parse(&line).map_err(Interrupt::Rejected)
    }

    fn choice<T: Choice>(&mut self, default: T) -> Result<T, Interrupt> {
        let hint = T::ALL
            .iter()
            .map(|option| option.label())
            .collect::<Vec<_>>()
            .join(" / ");
        self.answer(T::QUESTION, &hint, crate::answers::parse_choice::<T>, default)
    }

    fn hours(&mut self, range: HoursRange) -> Result<u32, Interrupt> {
        let hint = format!("{}-{} hours, default {}", range.min, range.max, range.default);
        self.answer(range.question, &hint, |line| range.parse(line), range.default)
    }

    fn questionnaire(&mut self) -> Result<AssessmentResponse, Interrupt> {
        Ok(AssessmentResponse {
            age: self.choice(AgeBand::EarlyTeen)?,
            daily_usage_hours: self.hours(DAILY_USAGE_HOURS)?,
            social_media_hours: self.hours(SOCIAL_MEDIA_HOURS)?,
            sleep_hours: self.hours(SLEEP_HOURS)?,
            bedtime_screen_hours: self.hours(BEDTIME_SCREEN_HOURS)?,
            late_night_usage: self.choice(LateNightUsage::Never)?,
            sleep_quality: self.choice(SleepQuality::Average)?,
            morning_tiredness: self.choice(MorningTiredness::SometimesTired)?,
            phone_location: self.choice(PhoneLocation::NextToBed)?,
            difficulty_sleeping: self.choice(DifficultySleeping::Sometimes)?,
        })
    }
}

pub fn run<R: BufRead, W: Write>(
    session: &mut Session,
    data: &Datasets,
    input: &mut R,
    output: &mut W,
) -> anyhow::Result<()> {
    let span = info_span!("session", id = %session.id);
    let _guard = span.enter();
    info!(target: "dashboard::session", started_at = %session.started_at, "session started");

    writeln!(output, "Digital Wellness Dashboard. Type `help` for commands.")?;
    write!(output, "\n{}", session.render(data))?;

    let mut prompter = Prompter { input, output };
    loop {
        write!(prompter.output, "\n> ")?;
        prompter.output.flush()?;
        let Some(command) = prompter.read_line()? else {
            break;
        };

        match command.to_lowercase().as_str() {
            "" => continue,
            "quit" | "exit" => break,
            "help" => write!(prompter.output, "{HELP}")?,
            _ => match View::parse(&command) {
                Some(View::Assessment) => match prompter.questionnaire() {
                    Ok(response) => match session.submit(&response).map(|_| ()) {
                        Ok(()) => write!(prompter.output, "\n{}", session.render(data))?,
                        Err(err) => writeln!(prompter.output, "Submission rejected: {err}")?,
                    },
                    Err(Interrupt::Rejected(err)) => {
                        writeln!(prompter.output, "Submission rejected: {err}")?
                    }
                    Err(Interrupt::Closed) => break,
                    Err(Interrupt::Io(err)) => return Err(err.into()),
                },
                Some(view) => {
                    session.navigate(view);
                    write!(prompter.output, "\n{}", session.render(data))?;
                }
                None => {
                    warn!(target: "dashboard::session", %command, "unknown command");
                    writeln!(prompter.output, "Unknown command `{command}`. Type `help`.")?;
                }
            },
        }
    }

    info!(
        target: "dashboard::session",
        assessed = session.last_result.is_some(),
        "session ended"
    );
    Ok(())
}
