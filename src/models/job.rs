use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::time_period::TIME_PERIOD;
use crate::database::schema::{AttributeDef, AttributeKind, DefaultValue, RecordClass};
use crate::database::validation::Validation;
use crate::operations::records::MatchOptions;

/// Where an application stands, from prospect to closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Applied,
    Closed,
    Interviewing,
    Prospect,
}

impl ApplicationStatus {
    pub const VALUES: [&'static str; 4] = [
        ApplicationStatus::Applied.as_str(),
        ApplicationStatus::Closed.as_str(),
        ApplicationStatus::Interviewing.as_str(),
        ApplicationStatus::Prospect.as_str(),
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Closed => "closed",
            ApplicationStatus::Interviewing => "interviewing",
            ApplicationStatus::Prospect => "prospect",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    PartTime,
    Contract,
    Freelance,
}

impl JobType {
    pub const VALUES: [&'static str; 4] = [
        JobType::FullTime.as_str(),
        JobType::PartTime.as_str(),
        JobType::Contract.as_str(),
        JobType::Freelance.as_str(),
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            JobType::FullTime => "full_time",
            JobType::PartTime => "part_time",
            JobType::Contract => "contract",
            JobType::Freelance => "freelance",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("'{value}' is not a valid {kind}")]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl FromStr for ApplicationStatus {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "applied" => Ok(ApplicationStatus::Applied),
            "closed" => Ok(ApplicationStatus::Closed),
            "interviewing" => Ok(ApplicationStatus::Interviewing),
            "prospect" => Ok(ApplicationStatus::Prospect),
            _ => Err(ParseEnumError { kind: "application status", value: s.to_string() }),
        }
    }
}

impl FromStr for JobType {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "full_time" => Ok(JobType::FullTime),
            "part_time" => Ok(JobType::PartTime),
            "contract" => Ok(JobType::Contract),
            "freelance" => Ok(JobType::Freelance),
            _ => Err(ParseEnumError { kind: "job type", value: s.to_string() }),
        }
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for JobType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A job listing from a company and the application to it, if any.
pub static JOB: RecordClass = RecordClass {
    name: "Job",
    table: "jobs",
    attributes: &[
        AttributeDef::new("action_required", AttributeKind::Boolean, DefaultValue::Bool(true)),
        AttributeDef::new("application_active", AttributeKind::Boolean, DefaultValue::Bool(true)),
        AttributeDef::new(
            "application_status",
            AttributeKind::String,
            DefaultValue::Str(ApplicationStatus::Prospect.as_str()),
        ),
        AttributeDef::new("company_name", AttributeKind::String, DefaultValue::Str("")),
        AttributeDef::new("data", AttributeKind::Json, DefaultValue::EmptyObject),
        AttributeDef::new("job_type", AttributeKind::String, DefaultValue::Str("")),
        AttributeDef::new("notes", AttributeKind::Text, DefaultValue::Str("")),
        AttributeDef::new("recruiter_agency", AttributeKind::String, DefaultValue::Str("")),
        AttributeDef::new("recruiter_name", AttributeKind::String, DefaultValue::Str("")),
        AttributeDef::new("source", AttributeKind::String, DefaultValue::Null),
        AttributeDef::new("source_data", AttributeKind::Json, DefaultValue::EmptyObject),
        AttributeDef::new("time_period_id", AttributeKind::Reference, DefaultValue::Null),
        AttributeDef::new("title", AttributeKind::String, DefaultValue::Str("")),
    ],
    validations: &[
        Validation::Presence("application_status"),
        Validation::Inclusion {
            field: "application_status",
            values: &ApplicationStatus::VALUES,
            allow_blank: true,
        },
        Validation::Presence("company_name"),
        Validation::Inclusion { field: "job_type", values: &JobType::VALUES, allow_blank: true },
        Validation::Presence("source"),
        Validation::Reference { field: "time_period_id", label: "time_period", class: &TIME_PERIOD },
    ],
    dependents: &[],
    factory: None,
};

pub struct Job;

impl Job {
    pub fn with_status(status: ApplicationStatus) -> MatchOptions {
        MatchOptions::default().condition("application_status", status.as_str())
    }

    pub fn applied() -> MatchOptions {
        Self::with_status(ApplicationStatus::Applied)
    }

    pub fn closed() -> MatchOptions {
        Self::with_status(ApplicationStatus::Closed)
    }

    pub fn interviewing() -> MatchOptions {
        Self::with_status(ApplicationStatus::Interviewing)
    }

    pub fn prospects() -> MatchOptions {
        Self::with_status(ApplicationStatus::Prospect)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory::MemoryStore;
    use crate::database::store::Store;
    use crate::operations::records::Factory;
    use serde_json::json;
    use std::sync::Arc;

    #[test]
    fn test_enums_round_trip_strings() {
        for value in ApplicationStatus::VALUES {
            assert_eq!(value.parse::<ApplicationStatus>().unwrap().as_str(), value);
        }
        assert_eq!("contract".parse::<JobType>(), Ok(JobType::Contract));
        assert!("gig".parse::<JobType>().is_err());
    }

    #[tokio::test]
    async fn test_status_scopes() {
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let period = Factory::for_class(&TIME_PERIOD, store.clone())
            .create()
            .call(Some(&json!({ "month": 1, "year": 2024 })))
            .await
            .into_result()
            .unwrap();

        let factory = Factory::for_class(&JOB, store);
        for (company, status) in [("Acme", "applied"), ("Globex", "prospect"), ("Initech", "applied")] {
            let outcome = factory
                .create()
                .call(Some(&json!({
                    "company_name": company,
                    "source": "Web",
                    "application_status": status,
                    "time_period_id": period.id(),
                })))
                .await;
            assert!(outcome.is_success());
        }

        let applied = factory.find_matching().call(Job::applied()).await.into_result().unwrap();
        assert_eq!(applied.len(), 2);

        let closed = factory.find_matching().call(Job::closed()).await.into_result().unwrap();
        assert!(closed.is_empty());
    }
}
