use serde::{Serialize, Deserialize};
use utoipa::ToSchema;
use uuid::Uuid;
use chrono::{DateTime, NaiveDate, Utc};

use crate::error::RegistryError;

/// Address used when a show is created without an explicit location.
pub const DEFAULT_LOCATION: &str = "101 S Fayetteville St, Liberty NC 27298";

const DATE_FORMAT: &str = "%Y-%m-%d";
const MAX_NAME_LEN: usize = 100;

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Show {
	pub id: Uuid,
	pub title: String,
	#[schema(value_type = String, format = Date, example = "2025-03-01")]
	pub date: NaiveDate,
	pub time: String,
	pub description: Option<String>,
	/// Reference into the asset store, e.g. `/uploads/1735689600000-poster.jpg`.
	pub image: Option<String>,
	pub ticket_link: Option<String>,
	pub location: String,
	pub created_at: DateTime<Utc>,
	pub updated_at: DateTime<Utc>,
}

/// Raw text fields as submitted by the admin form. Every field is optional here;
/// [`NewShow::from_fields`] and [`ShowPatch::from_fields`] decide what is required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowFields {
	pub title: Option<String>,
	pub date: Option<String>,
	pub time: Option<String>,
	pub description: Option<String>,
	pub ticket_link: Option<String>,
	pub location: Option<String>,
}

impl ShowFields {
	/// Assign a form field by its wire name. Returns false for names that are not show fields.
	pub fn set(&mut self, name: &str, value: String) -> bool {
		let slot = match name {
			"title" => &mut self.title,
			"date" => &mut self.date,
			"time" => &mut self.time,
			"description" => &mut self.description,
			"ticketLink" | "ticket_link" => &mut self.ticket_link,
			"location" => &mut self.location,
			_ => return false,
		};
		*slot = Some(value);
		true
	}
}

/// Validated input for creating a show.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShow {
	pub title: String,
	pub date: NaiveDate,
	pub time: String,
	pub description: Option<String>,
	pub ticket_link: Option<String>,
	pub location: String,
}

impl NewShow {
	pub fn from_fields(fields: ShowFields) -> Result<Self, RegistryError> {
		let title = required(fields.title, "title")?;
		let date = parse_date(&required(fields.date, "date")?)?;
		let time = required(fields.time, "time")?;
		Ok(Self {
			title,
			date,
			time,
			description: non_blank(fields.description),
			ticket_link: non_blank(fields.ticket_link),
			location: non_blank(fields.location).unwrap_or_else(|| DEFAULT_LOCATION.to_string()),
		})
	}
}

/// Per-field overwrite for an existing show. `None` keeps the stored value; for the
/// nullable columns `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowPatch {
	pub title: Option<String>,
	pub date: Option<NaiveDate>,
	pub time: Option<String>,
	pub description: Option<Option<String>>,
	pub ticket_link: Option<Option<String>>,
	pub location: Option<String>,
	pub image: Option<String>,
}

impl ShowPatch {
	pub fn from_fields(fields: ShowFields) -> Result<Self, RegistryError> {
		let title = fields.title.map(|v| required(Some(v), "title")).transpose()?;
		let date = fields.date.map(|v| parse_date(&v)).transpose()?;
		let time = fields.time.map(|v| required(Some(v), "time")).transpose()?;
		Ok(Self {
			title,
			date,
			time,
			description: fields.description.map(|v| non_blank(Some(v))),
			ticket_link: fields.ticket_link.map(|v| non_blank(Some(v))),
			location: fields.location.map(|v| non_blank(Some(v)).unwrap_or_else(|| DEFAULT_LOCATION.to_string())),
			image: None,
		})
	}

	pub fn is_empty(&self) -> bool { self == &Self::default() }
}

fn required(value: Option<String>, field: &str) -> Result<String, RegistryError> {
	match value {
		Some(v) if !v.trim().is_empty() => Ok(v),
		_ => Err(RegistryError::validation(format!("{field} is required"))),
	}
}

fn non_blank(value: Option<String>) -> Option<String> {
	value.filter(|v| !v.trim().is_empty())
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, RegistryError> {
	NaiveDate::parse_from_str(raw.trim(), DATE_FORMAT)
		.map_err(|_| RegistryError::validation(format!("date must be YYYY-MM-DD, got {raw:?}")))
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EmailTemplate {
	pub name: String,
	pub subject: Option<String>,
	pub html: String,
	/// Editor design document, stored verbatim.
	#[schema(value_type = Option<Object>)]
	pub design: Option<serde_json::Value>,
	pub updated_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, ToSchema)]
pub struct TemplateInput {
	pub subject: Option<String>,
	pub html: String,
	#[schema(value_type = Option<Object>)]
	pub design: Option<serde_json::Value>,
}

#[derive(sqlx::FromRow, Serialize, Deserialize, Debug, Clone, PartialEq, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecipientList {
	pub name: String,
	pub emails: Vec<String>,
	pub updated_at: DateTime<Utc>,
}

/// Trim a document key and bound its length.
pub fn validate_name(raw: &str) -> Result<String, RegistryError> {
	let name = raw.trim();
	if name.is_empty() { return Err(RegistryError::validation("name is required")); }
	if name.chars().count() > MAX_NAME_LEN { return Err(RegistryError::validation(format!("name longer than {MAX_NAME_LEN} characters"))); }
	Ok(name.to_string())
}

/// Trim, drop blanks and duplicates (case-insensitive, first spelling kept), reject entries without `@`.
pub fn normalize_emails<I, S>(raw: I) -> Result<Vec<String>, RegistryError>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	let mut out: Vec<String> = Vec::new();
	for entry in raw {
		let addr = entry.as_ref().trim();
		if addr.is_empty() { continue; }
		if !addr.contains('@') { return Err(RegistryError::validation(format!("invalid email address {addr:?}"))); }
		if out.iter().any(|a| a.eq_ignore_ascii_case(addr)) { continue; }
		out.push(addr.to_string());
	}
	Ok(out)
}
