use clap::Subcommand;

use super::{connect_store, records};
use crate::cli::utils::read_attributes;
use crate::cli::OutputFormat;
use crate::database::record::Record;
use crate::filter::FilterOrder;
use crate::handlers::jobs::JobsController;
use crate::handlers::ResourcesController;
use crate::models::{ApplicationStatus, Job};
use crate::operations::records::MatchOptions;

#[derive(Subcommand)]
pub enum JobsCommands {
    #[command(about = "List jobs")]
    List {
        #[arg(long, help = "Only jobs with this application status")]
        status: Option<ApplicationStatus>,
        #[arg(long, help = "Sort order, e.g. company_name:asc::created_at:desc")]
        order: Option<String>,
        #[arg(long, help = "Maximum number of jobs")]
        limit: Option<i64>,
    },

    #[command(about = "Show one job")]
    Show {
        #[arg(help = "Job ID")]
        id: i64,
    },

    #[command(about = "Create a job from JSON attributes (stdin when omitted)")]
    Create {
        #[arg(long, help = "JSON object of job attributes")]
        attributes: Option<String>,
    },

    #[command(about = "Update a job from JSON attributes (stdin when omitted)")]
    Update {
        #[arg(help = "Job ID")]
        id: i64,
        #[arg(long, help = "JSON object of job attributes")]
        attributes: Option<String>,
    },

    #[command(about = "Delete a job")]
    Delete {
        #[arg(help = "Job ID")]
        id: i64,
    },
}

pub async fn handle(cmd: JobsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let resource = JobsController::resource();
    let factory = resource.operation_factory(connect_store().await?)?;

    match cmd {
        JobsCommands::List { status, order, limit } => {
            let mut options = match status {
                Some(status) => Job::with_status(status),
                None => MatchOptions::default(),
            };
            options.order = match order {
                Some(order) => FilterOrder::validate_and_parse(&order.into())?,
                None => resource.default_order().to_vec(),
            };
            options.limit = limit;

            records::list(&factory, resource, options, summary, output_format).await
        }
        JobsCommands::Show { id } => records::show(&factory, resource, id, output_format).await,
        JobsCommands::Create { attributes } => {
            records::create(&factory, resource, read_attributes(attributes)?, output_format).await
        }
        JobsCommands::Update { id, attributes } => {
            records::update(&factory, resource, id, read_attributes(attributes)?, output_format).await
        }
        JobsCommands::Delete { id } => records::delete(&factory, resource, id, output_format).await,
    }
}

fn summary(job: &Record) -> String {
    let id = job.id().map(|id| id.to_string()).unwrap_or_default();
    let title = job.get_str("title").filter(|t| !t.is_empty()).unwrap_or("(untitled)");

    format!(
        "{:>5}  {:<24}  {:<12}  {}",
        id,
        job.get_str("company_name").unwrap_or_default(),
        job.get_str("application_status").unwrap_or_default(),
        title
    )
}
