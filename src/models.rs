use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Opaque identifier the API attaches to each posting.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum JobId {
    Number(i64),
    Text(String),
    #[default]
    Missing,
    // Floats, integers past i64, objects: kept verbatim so one odd id
    // cannot fail the whole list.
    Other(serde_json::Value),
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobId::Number(n) => write!(f, "{}", n),
            JobId::Text(s) => write!(f, "{}", s),
            JobId::Missing => write!(f, "-"),
            JobId::Other(value) => write!(f, "{}", value),
        }
    }
}

impl JobId {
    /// Compares against a user-typed id, ignoring how the API encoded it.
    pub fn matches(&self, raw: &str) -> bool {
        match self {
            JobId::Missing => false,
            other => other.to_string() == raw.trim(),
        }
    }
}

/// Tags arrive either as one comma-separated string or as a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Tags {
    Csv(String),
    List(Vec<String>),
    Other(serde_json::Value),
}

impl Default for Tags {
    fn default() -> Self {
        Tags::Other(serde_json::Value::Null)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Job {
    #[serde(default)]
    pub job_id: JobId,
    #[serde(default, deserialize_with = "lenient_text")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub company_name: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub location: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub salary: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub publication_date: Option<String>,
    #[serde(default)]
    pub tags: Tags,
    #[serde(default, deserialize_with = "lenient_text")]
    pub job_type: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub source: Option<String>,
    #[serde(default, deserialize_with = "lenient_text")]
    pub description: Option<String>,
}

impl Job {
    pub fn display_title(&self) -> &str {
        non_empty(&self.title).unwrap_or("(untitled)")
    }

    pub fn company(&self) -> Option<&str> {
        non_empty(&self.company_name)
    }

    pub fn location(&self) -> Option<&str> {
        non_empty(&self.location)
    }

    pub fn salary(&self) -> Option<&str> {
        non_empty(&self.salary)
    }

    pub fn url(&self) -> Option<&str> {
        non_empty(&self.url)
    }

    pub fn job_type(&self) -> Option<&str> {
        non_empty(&self.job_type)
    }

    pub fn source(&self) -> Option<&str> {
        non_empty(&self.source)
    }
}

fn non_empty(field: &Option<String>) -> Option<&str> {
    field.as_deref().filter(|s| !s.trim().is_empty())
}

// Display fields are sometimes numbers (salary: 85000) or objects; keep what
// can be shown as text and drop the rest instead of failing the whole list.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::String(s) => Some(s),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_full_record() {
        let raw = r#"{
            "job_id": "abc-1",
            "title": "Rust Engineer",
            "company_name": "Ferrous",
            "location": "Remote",
            "salary": "$120k",
            "url": "https://example.com/jobs/1",
            "publication_date": "2024-05-01T10:00:00Z",
            "tags": "rust,backend",
            "job_type": "full_time",
            "source": "remotive"
        }"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.job_id, JobId::Text("abc-1".into()));
        assert_eq!(job.display_title(), "Rust Engineer");
        assert_eq!(job.tags, Tags::Csv("rust,backend".into()));
        assert_eq!(job.source(), Some("remotive"));
    }

    #[test]
    fn test_deserialize_sparse_record() {
        let job: Job = serde_json::from_str(r#"{"job_id": 42}"#).unwrap();
        assert_eq!(job.job_id, JobId::Number(42));
        assert!(job.title.is_none());
        assert!(job.publication_date.is_none());
        assert_eq!(job.tags, Tags::default());
        assert_eq!(job.display_title(), "(untitled)");
    }

    #[test]
    fn test_null_and_numeric_fields_are_tolerated() {
        let raw = r#"{"job_id": null, "title": null, "salary": 85000, "tags": ["a", "b"], "location": {"city": "x"}}"#;
        let job: Job = serde_json::from_str(raw).unwrap();
        assert_eq!(job.job_id, JobId::Missing);
        assert_eq!(job.salary(), Some("85000"));
        assert_eq!(job.location(), None);
        assert_eq!(job.tags, Tags::List(vec!["a".into(), "b".into()]));
    }

    #[test]
    fn test_odd_tags_fall_back_to_other() {
        let job: Job = serde_json::from_str(r#"{"job_id": 1, "tags": 17}"#).unwrap();
        assert!(matches!(job.tags, Tags::Other(_)));

        let job: Job = serde_json::from_str(r#"{"job_id": 1, "tags": ["a", 2]}"#).unwrap();
        assert!(matches!(job.tags, Tags::Other(_)));
    }

    #[test]
    fn test_empty_strings_read_as_absent() {
        let job: Job = serde_json::from_str(r#"{"job_id": 1, "company_name": "  ", "job_type": ""}"#).unwrap();
        assert_eq!(job.company(), None);
        assert_eq!(job.job_type(), None);
    }

    #[test]
    fn test_unusual_job_ids_do_not_fail_the_list() {
        let raw = r#"[
            {"job_id": 1.5, "title": "float id"},
            {"job_id": 18446744073709551615, "title": "huge id"},
            {"job_id": {"source": "x", "id": 3}},
            {"job_id": 2, "title": "plain"}
        ]"#;
        let jobs: Vec<Job> = serde_json::from_str(raw).unwrap();
        assert_eq!(jobs.len(), 4);
        assert!(matches!(jobs[0].job_id, JobId::Other(_)));
        assert!(jobs[0].job_id.matches("1.5"));
        assert!(jobs[1].job_id.matches("18446744073709551615"));
        assert!(matches!(jobs[2].job_id, JobId::Other(_)));
        assert_eq!(jobs[3].job_id, JobId::Number(2));
    }

    #[test]
    fn test_job_id_matches() {
        assert!(JobId::Number(7).matches("7"));
        assert!(JobId::Text("x-1".into()).matches(" x-1 "));
        assert!(!JobId::Missing.matches("-"));
    }
}
