use clap::Subcommand;
use serde_json::json;

use super::{connect_store, records};
use crate::cli::utils::{output_record, output_success};
use crate::cli::OutputFormat;
use crate::database::record::Record;
use crate::handlers::time_periods::TimePeriodsController;
use crate::handlers::ResourcesController;
use crate::models::TimePeriod;
use crate::operations::records::MatchOptions;

#[derive(Subcommand)]
pub enum TimePeriodsCommands {
    #[command(about = "List time periods, newest first")]
    List,

    #[command(about = "Show the most recent time period")]
    Active,

    #[command(about = "Start a time period")]
    Create {
        #[arg(long, help = "Month (1-12)")]
        month: i64,
        #[arg(long, help = "Year")]
        year: i64,
    },

    #[command(about = "Delete a time period")]
    Delete {
        #[arg(help = "Time period ID")]
        id: i64,
    },
}

pub async fn handle(cmd: TimePeriodsCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let resource = TimePeriodsController::resource();
    let store = connect_store().await?;
    let factory = resource.operation_factory(store.clone())?;

    match cmd {
        TimePeriodsCommands::List => {
            records::list(&factory, resource, MatchOptions::default(), summary, output_format).await
        }
        TimePeriodsCommands::Active => match TimePeriod::active(store).await.into_result()? {
            Some(period) => output_record(&output_format, resource.singular_name(), &period),
            None => output_success(&output_format, "No time periods yet", Some(json!({ "time_period": null }))),
        },
        TimePeriodsCommands::Create { month, year } => {
            let attributes = json!({ "month": month, "year": year });
            records::create(&factory, resource, attributes, output_format).await
        }
        TimePeriodsCommands::Delete { id } => records::delete(&factory, resource, id, output_format).await,
    }
}

fn summary(period: &Record) -> String {
    format!(
        "{:>5}  {}",
        period.id().map(|id| id.to_string()).unwrap_or_default(),
        TimePeriod::label(period).unwrap_or_default()
    )
}
