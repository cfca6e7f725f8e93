//! The two scrape tasks. Assembly and council listings only differ in data:
//! where to click, how columns map onto fields, and which records a row
//! reconciles into. [`Report`] carries that data, [`run`] does the work.

use chrono::Local;
use tracing::info;

use crate::automation::{Automation, Locator};
use crate::config::Config;
use crate::info_time;
use crate::model::{AssemblyCandidacy, CouncilCandidacy, Person, Record};
use crate::navigate::{NavTargets, Navigator};
use crate::parse::{parse_row, CandidateFields, Field, HeaderMap};
use crate::store::{Resolved, Store, UnitOfWork};
use crate::{Error, Result};

const SHOW_ALL_LINK: &str = "//a[b[contains(text(), 'Show All')]]";
const CANDIDATE_ROWS: &str = "tr[id*='_rptCandidatesBySurnameRow_']";
const CANDIDATE_CELLS: &str = "td[headers]";

pub trait Report {
    type Candidacy: Record;

    const NAME: &'static str;
    const HEADERS: &'static HeaderMap;
    const ROWS: &'static str = CANDIDATE_ROWS;

    fn targets() -> NavTargets;

    /// Resolves every entity the row refers to and the candidacy linking them.
    fn reconcile(uow: &UnitOfWork<'_>, fields: &CandidateFields) -> Result<Resolved<Self::Candidacy>>;

    fn progress(fields: &CandidateFields) -> String {
        format!("{}: {}, {}", Self::NAME, fields.ballot_name, fields.locality)
    }
}

pub struct Assembly;

pub struct Council;

impl Report for Assembly {
    type Candidacy = AssemblyCandidacy;

    const NAME: &'static str = "assembly";
    const HEADERS: &'static HeaderMap = &[
        ("CANDIDATEBALLOTNAME", Field::BallotName),
        ("LOCALITY", Field::Locality),
        ("CONTESTAREACODE", Field::District),
        ("AFFILIATION", Field::Party),
        ("PHONE", Field::Phone),
        ("MOBILE", Field::Mobile),
        ("WEBSITE", Field::Website),
        ("EMAIL", Field::Email),
    ];

    fn targets() -> NavTargets {
        NavTargets {
            category_link: Locator::id("ctl00_cphContent_rptHomePage_ctl00_rptAreaType_ctl00_lbBySurname"),
            show_all: Locator::xpath(SHOW_ALL_LINK),
        }
    }

    fn reconcile(uow: &UnitOfWork<'_>, fields: &CandidateFields) -> Result<Resolved<AssemblyCandidacy>> {
        if fields.district.is_empty() {
            return Err(Error::MissingField {
                report: Self::NAME,
                field: "district",
            });
        }
        let district = uow.district(&fields.district)?.into_inner();
        let person = resolve_person(uow, fields)?;
        uow.assembly_candidacy(&person, &district)
    }
}

impl Report for Council {
    type Candidacy = CouncilCandidacy;

    const NAME: &'static str = "council";
    const HEADERS: &'static HeaderMap = &[
        ("CANDIDATEBALLOTNAME", Field::BallotName),
        ("LOCALITY", Field::Locality),
        ("GROUPLABEL", Field::Group),
        ("GROUPNAME", Field::GroupName),
        ("AFFILIATION", Field::Party),
        ("PHONE", Field::Phone),
        ("MOBILE", Field::Mobile),
        ("WEBSITE", Field::Website),
        ("EMAIL", Field::Email),
    ];

    fn targets() -> NavTargets {
        NavTargets {
            category_link: Locator::id("ctl00_cphContent_rptHomePage_ctl00_rptAreaType_ctl01_lbBySurname"),
            show_all: Locator::xpath(SHOW_ALL_LINK),
        }
    }

    fn reconcile(uow: &UnitOfWork<'_>, fields: &CandidateFields) -> Result<Resolved<CouncilCandidacy>> {
        let group = match fields.group.as_str() {
            "" => None,
            identifier => Some(uow.group(identifier, &fields.group_name)?.into_inner()),
        };
        let person = resolve_person(uow, fields)?;
        uow.council_candidacy(&person, group.as_ref())
    }

    fn progress(fields: &CandidateFields) -> String {
        format!(
            "{}: {}, {} [{}]",
            Self::NAME,
            fields.ballot_name,
            fields.locality,
            fields.group_name
        )
    }
}

/// Party first, then the person keyed on `(ballot_name, locality)`.
/// The row's party, when it has one, replaces whatever the person had.
fn resolve_person(uow: &UnitOfWork<'_>, fields: &CandidateFields) -> Result<Person> {
    let party = match fields.party.as_str() {
        "" => None,
        name => Some(uow.party(name)?.into_inner()),
    };
    let mut person = uow.person(fields, party.as_ref())?.into_inner();
    if let Some(party) = &party {
        uow.attach_party(&mut person, party)?;
    }
    Ok(person)
}

/// Outcome of one task run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSummary {
    pub report: &'static str,
    /// Candidate rows reconciled.
    pub processed: usize,
    /// Candidacies that did not exist before this run.
    pub created: usize,
    /// Whether the listing's asynchronous refresh was confirmed finished.
    pub settled: bool,
}

/// Navigates to the listing of `R` and reconciles every row inside one unit
/// of work. Any failure drops the unit, rolling the whole run back.
pub async fn run<R: Report, A: Automation>(
    session: &mut A,
    store: &mut Store,
    config: &Config,
) -> Result<TaskSummary> {
    let start_time = Local::now();
    info_time!("Started {} scrape", R::NAME);

    let settled = Navigator::new(session, config).reach_table(&R::targets()).await?;
    let table = session.read_rows(R::ROWS, CANDIDATE_CELLS).await?;

    let mut summary = TaskSummary {
        report: R::NAME,
        processed: 0,
        created: 0,
        settled,
    };

    let uow = store.begin()?;
    for raw in table.rows() {
        let fields = parse_row(&raw, R::HEADERS);
        let candidacy = R::reconcile(&uow, &fields)?;

        summary.processed += 1;
        if candidacy.was_created() {
            summary.created += 1;
        }
        info!("{}", R::progress(&fields));
    }
    uow.commit()?;

    info_time!(
        start_time,
        "Finished {} scrape: {} candidates, {} new",
        R::NAME,
        summary.processed,
        summary.created
    );
    Ok(summary)
}
