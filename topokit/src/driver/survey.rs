//! Survey: bounded-time scatter/gather.
//!
//! The surveyor sends [`DATE_QUERY`](super::DATE_QUERY) to every connected
//! respondent and collects replies until the survey window closes. A round
//! completes on time alone, whatever number of replies arrived; replies that
//! miss the window are lost. Respondents answer every query with the date.

use super::{arg, attach, date, parse_role, Attach, Driver, DATE_QUERY};
use crate::config::DriverConfig;
use crate::error::DriverError;
use crate::report::Reporter;
use bytes::Bytes;
use std::str::FromStr;
use std::time::{Duration, Instant};
use topokit_core::options::SocketOption;
use topokit_sp::{RespondentSocket, SurveyorSocket};
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Surveyor,
    Respondent,
}

impl FromStr for Role {
    type Err = DriverError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_role(
            s,
            &[
                ("surveyor", Role::Surveyor),
                ("server", Role::Surveyor),
                ("respondent", Role::Respondent),
                ("client", Role::Respondent),
            ],
            Driver::Survey,
        )
    }
}

/// Outcome of one scatter/gather cycle.
#[derive(Debug, Clone)]
pub struct SurveyRound {
    pub query: Bytes,
    /// Replies received inside the window, in arrival order
    pub responses: Vec<Bytes>,
    /// Time from sending the query to the window closing
    pub elapsed: Duration,
}

/// Send `query` and gather replies until the survey window closes.
///
/// A receive deadline shorter than the window only bounds each wait; the
/// round keeps collecting until the window itself has closed.
pub async fn survey_round(sock: &mut SurveyorSocket, query: Bytes) -> Result<SurveyRound, DriverError> {
    let start = Instant::now();
    sock.send(query.clone()).await?;

    let mut responses = Vec::new();
    loop {
        match sock.recv().await {
            Ok(reply) => responses.push(reply),
            Err(e) if e.is_timeout() => {
                if !sock.in_survey() {
                    break;
                }
                trace!("Receive deadline elapsed inside the survey window");
            }
            Err(e) => return Err(e.into()),
        }
    }

    let round = SurveyRound {
        query,
        responses,
        elapsed: start.elapsed(),
    };
    debug!(responses = round.responses.len(), elapsed = ?round.elapsed, "Survey round complete");
    Ok(round)
}

pub async fn run(
    role: Role,
    args: &[String],
    config: &DriverConfig,
    reporter: &dyn Reporter,
) -> Result<(), DriverError> {
    let url = arg(args, 0, Driver::Survey)?;
    match role {
        Role::Surveyor => survey(url, config, reporter).await,
        Role::Respondent => {
            let name = arg(args, 1, Driver::Survey)?;
            respond(url, name, config, reporter).await
        }
    }
}

async fn survey(url: &str, config: &DriverConfig, reporter: &dyn Reporter) -> Result<(), DriverError> {
    let mut sock = SurveyorSocket::with_options(config.socket_options());
    attach(&mut sock, Attach::Listen, url).await?;
    sock.set_option(SocketOption::SurveyTime(config.survey_time))?;

    loop {
        reporter.report("SERVER: SENDING DATE SURVEY REQUEST");
        let round = survey_round(&mut sock, Bytes::from_static(DATE_QUERY.as_bytes())).await?;
        for reply in &round.responses {
            reporter.report(&format!(
                "SERVER: RECEIVED \"{}\" SURVEY RESPONSE",
                String::from_utf8_lossy(reply)
            ));
        }
        reporter.report("SERVER: SURVEY COMPLETE");
    }
}

async fn respond(
    url: &str,
    name: &str,
    config: &DriverConfig,
    reporter: &dyn Reporter,
) -> Result<(), DriverError> {
    let mut sock = RespondentSocket::with_options(config.socket_options());
    attach(&mut sock, Attach::Dial, url).await?;

    loop {
        let query = sock.recv().await?;
        reporter.report(&format!(
            "CLIENT ({name}): RECEIVED \"{}\" SURVEY REQUEST",
            String::from_utf8_lossy(&query)
        ));
        reporter.report(&format!("CLIENT ({name}): SENDING DATE SURVEY RESPONSE"));
        sock.send(Bytes::from(date())).await?;
    }
}
