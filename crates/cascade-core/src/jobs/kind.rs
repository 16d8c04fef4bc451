use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::TaskType;
use crate::error::CoreError;

/// Closed set of job kinds a task type can name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobKind {
    Analysis,
    Notification,
    Area,
    Report,
    Fail,
    Random,
    Sum,
    Long,
}

impl JobKind {
    pub const ALL: [JobKind; 8] = [
        JobKind::Analysis,
        JobKind::Notification,
        JobKind::Area,
        JobKind::Report,
        JobKind::Fail,
        JobKind::Random,
        JobKind::Sum,
        JobKind::Long,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobKind::Analysis => "analysis",
            JobKind::Notification => "notification",
            JobKind::Area => "area",
            JobKind::Report => "report",
            JobKind::Fail => "fail",
            JobKind::Random => "random",
            JobKind::Sum => "sum",
            JobKind::Long => "long",
        }
    }

    pub fn task_type(&self) -> TaskType {
        TaskType::new(self.as_str())
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| CoreError::UnknownTaskType(TaskType::new(s)))
    }
}

impl TryFrom<&TaskType> for JobKind {
    type Error = CoreError;

    fn try_from(task_type: &TaskType) -> Result<Self, Self::Error> {
        task_type.as_str().parse()
    }
}
