use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tracing::info;

use concierge_core::domain::business::{BusinessFilter, BusinessRecord, NewBusiness};
use concierge_core::domain::context::{BusinessDetails, ConversationContext, UserDetails};
use concierge_core::errors::DomainError;
use concierge_core::normalize::{canonical_value, normalize_filters};
use concierge_core::specialists::tool_names;
use concierge_db::repositories::BusinessRepository;

use super::{required_arg, string_arg, Tool, ToolError, ToolOutput};

pub const BUSINESS_FORM_TRIGGER: &str = tool_names::DISPLAY_BUSINESS_FORM;

/// Filter keys the directory understands, after canonicalization.
const FILTER_KEYS: &[&str] = &["companyName", "industrySector", "subSector", "location", "name"];

const SEARCH_PREVIEW: usize = 3;

const FORM_FIELDS: &[(&str, bool)] = &[
    ("companyName", true),
    ("industrySector", true),
    ("subSector", false),
    ("location", true),
    ("positionTitle", true),
    ("userName", true),
    ("email", true),
    ("website", false),
    ("briefDescription", false),
];

fn business_line(business: &BusinessRecord) -> String {
    format!("{} ({})", business.details.company_name, business.details.industry_sector)
}

/// Collects string arguments into a canonical directory filter.
pub fn filter_from_input(input: &Value) -> BusinessFilter {
    let raw: BusinessFilter = input
        .as_object()
        .into_iter()
        .flatten()
        .filter_map(|(key, value)| {
            let value = value.as_str()?.trim();
            (!value.is_empty()).then(|| (key.clone(), value.to_string()))
        })
        .collect();

    normalize_filters(&raw)
        .into_iter()
        .filter(|(key, _)| FILTER_KEYS.contains(&key.as_str()))
        .collect()
}

pub struct SearchBusinessesTool {
    businesses: Arc<dyn BusinessRepository>,
}

impl SearchBusinessesTool {
    pub fn new(businesses: Arc<dyn BusinessRepository>) -> Self {
        Self { businesses }
    }
}

#[async_trait]
impl Tool for SearchBusinessesTool {
    fn name(&self) -> &'static str {
        tool_names::SEARCH_BUSINESSES
    }

    fn description(&self) -> &'static str {
        "Searches the summit business directory by industry, location, company or owner."
    }

    async fn execute(
        &self,
        input: &Value,
        _context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let filter = filter_from_input(input);
        let found = self.businesses.search(&filter).await?;

        info!(
            event_name = "tool.search_businesses.completed",
            filters = ?filter,
            matches = found.len(),
            "business search completed"
        );
        if found.is_empty() {
            return Ok(ToolOutput::text("No businesses found matching the provided criteria."));
        }

        let mut lines = vec![format!("Found {} businesses:", found.len())];
        lines.extend(found.iter().take(SEARCH_PREVIEW).enumerate().map(|(index, business)| {
            let owner = business
                .owner_name
                .as_deref()
                .unwrap_or(business.details.user_name.as_str());
            format!("{}. {} - {owner}", index + 1, business_line(business))
        }));
        if found.len() > SEARCH_PREVIEW {
            lines.push(format!("...and {} more.", found.len() - SEARCH_PREVIEW));
        }
        Ok(ToolOutput::text(lines.join("\n")))
    }
}

pub struct GetUserBusinessesTool {
    businesses: Arc<dyn BusinessRepository>,
}

impl GetUserBusinessesTool {
    pub fn new(businesses: Arc<dyn BusinessRepository>) -> Self {
        Self { businesses }
    }
}

#[async_trait]
impl Tool for GetUserBusinessesTool {
    fn name(&self) -> &'static str {
        tool_names::USER_BUSINESSES
    }

    fn description(&self) -> &'static str {
        "Lists the businesses registered by a user."
    }

    async fn execute(
        &self,
        input: &Value,
        context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let user_id = required_arg(input, "user_id", context.user_id.as_ref())?;
        let owned = self.businesses.list_for_user(&user_id).await?;

        if owned.is_empty() {
            return Ok(ToolOutput::text(format!("No businesses found for user {user_id}.")));
        }

        let mut lines = vec![format!("Businesses for user {user_id}:")];
        lines.extend(
            owned
                .iter()
                .enumerate()
                .map(|(index, business)| format!("{}. {}", index + 1, business_line(business))),
        );
        Ok(ToolOutput::text(lines.join("\n")))
    }
}

/// Opens the registration form on the client.
pub struct DisplayBusinessFormTool;

#[async_trait]
impl Tool for DisplayBusinessFormTool {
    fn name(&self) -> &'static str {
        tool_names::DISPLAY_BUSINESS_FORM
    }

    fn description(&self) -> &'static str {
        "Shows the business registration form."
    }

    async fn execute(
        &self,
        _input: &Value,
        _context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let fields = FORM_FIELDS
            .iter()
            .map(|(name, required)| {
                if *required {
                    format!("{name} (required)")
                } else {
                    (*name).to_string()
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        Ok(ToolOutput::text(format!(
            "Please fill in the business registration form. Fields: {fields}."
        ))
        .with_trigger(BUSINESS_FORM_TRIGGER))
    }
}

pub struct AddBusinessTool {
    businesses: Arc<dyn BusinessRepository>,
}

impl AddBusinessTool {
    pub fn new(businesses: Arc<dyn BusinessRepository>) -> Self {
        Self { businesses }
    }
}

/// Overlays submitted form values on what the conversation already knows.
fn merge_details(
    submitted: Option<&Map<String, Value>>,
    context: &ConversationContext,
) -> Result<BusinessDetails, DomainError> {
    let mut base = context.business_details.clone().unwrap_or_default();
    if let Some(user) = context.user_details.as_ref() {
        if base.user_name.trim().is_empty() {
            base.user_name = user.user_name.clone().unwrap_or_default();
        }
        if base.email.trim().is_empty() {
            base.email =
                user.registered_email.clone().or_else(|| user.email.clone()).unwrap_or_default();
        }
    }

    let mut merged = match serde_json::to_value(base) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    };
    for (key, value) in submitted.into_iter().flatten() {
        let key = if key == "user_name" { "userName".to_string() } else { key.clone() };
        merged.insert(key, value.clone());
    }

    let mut details: BusinessDetails = serde_json::from_value(Value::Object(merged)).map_err(
        |error| DomainError::InvalidContextValue {
            field: "business_details".to_string(),
            reason: error.to_string(),
        },
    )?;
    details.industry_sector = canonical_value("industrySector", &details.industry_sector);
    details.location = canonical_value("location", &details.location);
    Ok(details)
}

#[async_trait]
impl Tool for AddBusinessTool {
    fn name(&self) -> &'static str {
        tool_names::ADD_BUSINESS
    }

    fn description(&self) -> &'static str {
        "Registers a business in the summit directory for the current user."
    }

    async fn execute(
        &self,
        input: &Value,
        context: &mut ConversationContext,
    ) -> Result<ToolOutput, ToolError> {
        let details =
            merge_details(input.get("business_details").and_then(Value::as_object), context)?;

        let missing = details.missing_required_fields();
        if !missing.is_empty() {
            context.business_details = Some(details);
            return Ok(ToolOutput::text(format!("Missing required fields: {}", missing.join(", ")))
                .with_trigger(BUSINESS_FORM_TRIGGER));
        }

        let organization_id =
            string_arg(input, "organization_id").or_else(|| context.organization_id.clone());
        let record = self
            .businesses
            .insert(NewBusiness {
                user_id: context.user_id.clone(),
                organization_id,
                details: details.clone(),
            })
            .await?;

        info!(
            event_name = "tool.add_business.inserted",
            business_id = record.id,
            user_id = ?record.user_id,
            "business registered"
        );

        let previous = context.user_details.take().unwrap_or_default();
        context.user_details = Some(UserDetails {
            user_name: Some(details.user_name.clone()),
            registered_email: Some(details.email.clone()),
            registration_id: context.registration_id.clone(),
            ..previous
        });
        let company_name = details.company_name.clone();
        context.business_details = Some(details);

        Ok(ToolOutput::text(format!("Successfully added business {company_name}.")))
    }
}
