//! Documents read from the record store.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// One reporting period of an agent's activity (`raw_data` collection).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    /// Agent document id, or the agent's display name in legacy rows.
    #[serde(default, deserialize_with = "string_or_empty")]
    pub agent_id: String,

    /// Reporting date
    #[serde(default, deserialize_with = "flexible_timestamp")]
    pub date: Option<DateTime<Utc>>,

    #[serde(default, deserialize_with = "number_or_zero")]
    pub leads: f64,

    #[serde(default, deserialize_with = "number_or_zero")]
    pub payins: f64,

    #[serde(default, deserialize_with = "number_or_zero")]
    pub sales: f64,
}

impl PerformanceRecord {
    pub fn new(agent_id: impl Into<String>, leads: f64, payins: f64, sales: f64) -> Self {
        Self {
            agent_id: agent_id.into(),
            date: None,
            leads,
            payins,
            sales,
        }
    }
}

/// An agent document (`agents` collection).
///
/// Older documents carry the depot/company/platoon as a plain display string
/// instead of a reference id; both forms are kept so grouping can fall back.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "photoURL", default, deserialize_with = "lenient_string")]
    pub photo_url: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub depot_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub depot: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub company: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub platoon_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub platoon: Option<String>,
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// Placeholder metadata for an agent id that matched nothing.
    pub fn synthetic(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    pub fn display_name(&self) -> &str {
        non_empty(self.name.as_deref()).unwrap_or(&self.id)
    }

    /// Depot reference, preferring the id over the legacy display string.
    pub fn depot_key(&self) -> Option<&str> {
        non_empty(self.depot_id.as_deref()).or_else(|| non_empty(self.depot.as_deref()))
    }

    /// Company reference, preferring the id over the legacy display string.
    pub fn company_key(&self) -> Option<&str> {
        non_empty(self.company_id.as_deref()).or_else(|| non_empty(self.company.as_deref()))
    }
}

/// A depot, company or platoon document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntity {
    #[serde(default)]
    pub id: String,
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: Option<String>,
    #[serde(rename = "photoURL", default, deserialize_with = "lenient_string")]
    pub photo_url: Option<String>,
}

impl ReferenceEntity {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: Some(name.into()),
            photo_url: None,
        }
    }
}

/// Treat empty strings the same as missing values.
pub fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|s| !s.is_empty())
}

/// Interpret a stored date value as a UTC timestamp.
///
/// Accepts RFC 3339 strings and bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    let s = value.as_str()?.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(s) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

fn string_or_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        _ => String::new(),
    })
}

/// Strings pass through and numbers become their text; any other shape is absent.
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn number_or_zero<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    })
}

fn flexible_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_timestamp))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_record_missing_numbers_default_to_zero() {
        let record: PerformanceRecord =
            serde_json::from_value(json!({ "agentId": "a1", "leads": 4 })).unwrap();

        assert_eq!(record.agent_id, "a1");
        assert_eq!(record.leads, 4.0);
        assert_eq!(record.payins, 0.0);
        assert_eq!(record.sales, 0.0);
        assert!(record.date.is_none());
    }

    #[test]
    fn test_record_null_and_string_numbers() {
        let record: PerformanceRecord = serde_json::from_value(json!({
            "agentId": "a1",
            "leads": null,
            "payins": "3",
            "sales": "n/a"
        }))
        .unwrap();

        assert_eq!(record.leads, 0.0);
        assert_eq!(record.payins, 3.0);
        assert_eq!(record.sales, 0.0);
    }

    #[test]
    fn test_record_missing_agent_id_is_empty() {
        let record: PerformanceRecord = serde_json::from_value(json!({ "leads": 1 })).unwrap();
        assert_eq!(record.agent_id, "");
    }

    #[test]
    fn test_record_date_formats() {
        let record: PerformanceRecord = serde_json::from_value(json!({
            "agentId": "a1",
            "date": "2026-02-03T10:30:00Z"
        }))
        .unwrap();
        assert_eq!(
            record.date,
            Some(Utc.with_ymd_and_hms(2026, 2, 3, 10, 30, 0).unwrap())
        );

        let legacy: PerformanceRecord = serde_json::from_value(json!({
            "agentId": "a1",
            "date": "2026-02-03"
        }))
        .unwrap();
        assert_eq!(
            legacy.date,
            Some(Utc.with_ymd_and_hms(2026, 2, 3, 0, 0, 0).unwrap())
        );
    }

    #[test]
    fn test_agent_camel_case_fields() {
        let agent: Agent = serde_json::from_value(json!({
            "id": "a1",
            "name": "Maria Santos",
            "photoURL": "https://img/a1.png",
            "depotId": "d1",
            "platoonId": "p1"
        }))
        .unwrap();

        assert_eq!(agent.photo_url.as_deref(), Some("https://img/a1.png"));
        assert_eq!(agent.depot_id.as_deref(), Some("d1"));
        assert_eq!(agent.platoon_id.as_deref(), Some("p1"));
    }

    #[test]
    fn test_malformed_reference_fields_are_tolerated() {
        let agent: Agent = serde_json::from_value(json!({
            "id": "a1",
            "name": 42,
            "photoURL": { "url": "https://img/a1.png" },
            "depotId": ["d1"],
            "company": true,
            "platoonId": null
        }))
        .unwrap();

        assert_eq!(agent.name.as_deref(), Some("42"));
        assert_eq!(agent.photo_url, None);
        assert_eq!(agent.depot_id, None);
        assert_eq!(agent.company, None);
        assert_eq!(agent.platoon_id, None);

        let depot: ReferenceEntity =
            serde_json::from_value(json!({ "id": "d1", "name": ["North"], "photoURL": 7 }))
                .unwrap();
        assert_eq!(depot.name, None);
        assert_eq!(depot.photo_url.as_deref(), Some("7"));
    }

    #[test]
    fn test_agent_group_keys_prefer_ids() {
        let agent = Agent {
            depot_id: Some("d1".to_string()),
            depot: Some("North Depot".to_string()),
            company_id: Some(String::new()),
            company: Some("Acme".to_string()),
            ..Agent::synthetic("a1")
        };

        assert_eq!(agent.depot_key(), Some("d1"));
        assert_eq!(agent.company_key(), Some("Acme"));
        assert_eq!(Agent::synthetic("a2").depot_key(), None);
    }

    #[test]
    fn test_agent_display_name_falls_back_to_id() {
        assert_eq!(Agent::new("a1", "Ana").display_name(), "Ana");
        assert_eq!(Agent::synthetic("a2").display_name(), "a2");

        let blank = Agent {
            name: Some(String::new()),
            ..Agent::synthetic("a3")
        };
        assert_eq!(blank.display_name(), "a3");
    }
}
