// ✉️ Outreach Formatter - templated first-touch email per prospect

use crate::entities::Prospect;
use serde::{Deserialize, Serialize};

pub const DEFAULT_AGENCY_NAME: &str = "Web Sharx";
pub const DEFAULT_AGENCY_SITE: &str = "websharx.ca";

/// Gaps quoted in the email body
const GAP_LIMIT: usize = 2;
/// Services suggested in the email body
const SERVICE_LIMIT: usize = 3;

/// Sender details substituted into the sign-off
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutreachTemplate {
    pub agency_name: String,
    pub agency_site: String,
}

impl Default for OutreachTemplate {
    fn default() -> Self {
        OutreachTemplate {
            agency_name: DEFAULT_AGENCY_NAME.to_string(),
            agency_site: DEFAULT_AGENCY_SITE.to_string(),
        }
    }
}

impl OutreachTemplate {
    pub fn new(agency_name: impl Into<String>, agency_site: impl Into<String>) -> Self {
        OutreachTemplate {
            agency_name: agency_name.into(),
            agency_site: agency_site.into(),
        }
    }

    /// Render the email for `prospect`. Industry, gaps and services are lowercased.
    pub fn render(&self, prospect: &Prospect) -> String {
        let company = &prospect.company;
        let agency = &self.agency_name;

        format!(
            "Subject: Quick thoughts on {company}'s digital presence\n\
             \n\
             Hi {first},\n\
             \n\
             I came across {company} while researching {industry} businesses in {location} and noticed a few opportunities that could help you stand out online.\n\
             \n\
             Specifically, I noticed {gaps} — areas where a targeted investment could make a meaningful difference in how potential clients find and engage with your business.\n\
             \n\
             At {agency}, we specialise in helping businesses like yours strengthen their digital presence. Based on what I've seen, I'd recommend exploring {services} as a starting point.\n\
             \n\
             We've helped similar organisations see significant improvements in their online visibility and lead generation. I'd love to share some specific ideas tailored to {company}.\n\
             \n\
             Would you have 15 minutes this week for a quick call?\n\
             \n\
             Best regards,\n\
             {agency} Team\n\
             {site}",
            first = prospect.first_name(),
            industry = prospect.industry.to_lowercase(),
            location = prospect.location,
            gaps = gap_clause(prospect).to_lowercase(),
            services = service_clause(prospect).to_lowercase(),
            site = self.agency_site,
        )
    }
}

/// First two digital gaps joined with " and ", casing as authored
pub fn gap_clause(prospect: &Prospect) -> String {
    prospect
        .digital_gaps
        .iter()
        .take(GAP_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" and ")
}

/// First three recommended services joined with ", ", casing as authored
pub fn service_clause(prospect: &Prospect) -> String {
    prospect
        .recommended_services
        .iter()
        .take(SERVICE_LIMIT)
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render with the default agency details
pub fn format_outreach_email(prospect: &Prospect) -> String {
    OutreachTemplate::default().render(prospect)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::prospect::sample_prospect;

    fn dana() -> Prospect {
        let mut prospect = sample_prospect("p9", "fort-worth", 88);
        prospect.company = "Cowtown Logistics".to_string();
        prospect.industry = "Logistics".to_string();
        prospect.location = "Fort Worth, TX".to_string();
        prospect.contact_name = "Dana Shapiro".to_string();
        prospect.digital_gaps = vec![
            "no mobile site".to_string(),
            "no SEO".to_string(),
            "No CRM".to_string(),
        ];
        prospect.recommended_services = vec![
            "SEO".to_string(),
            "PPC".to_string(),
            "Content".to_string(),
            "Branding".to_string(),
        ];
        prospect
    }

    #[test]
    fn test_salutation_and_gap_clause() {
        let prospect = dana();
        let email = format_outreach_email(&prospect);

        assert_eq!(gap_clause(&prospect), "no mobile site and no SEO");
        assert!(email.contains("\nHi Dana,\n"));
        assert!(email.contains("Specifically, I noticed no mobile site and no seo — areas"));
        assert!(!email.contains("no crm"));
    }

    #[test]
    fn test_subject_and_services() {
        let email = format_outreach_email(&dana());

        assert!(email.starts_with("Subject: Quick thoughts on Cowtown Logistics's digital presence\n\nHi Dana,"));
        assert!(email.contains("researching logistics businesses in Fort Worth, TX"));
        assert!(email.contains("exploring seo, ppc, content as a starting point"));
        assert!(!email.contains("branding"));
        assert!(email.ends_with("Best regards,\nWeb Sharx Team\nwebsharx.ca"));
    }

    #[test]
    fn test_formatting_is_deterministic() {
        let prospect = dana();
        assert_eq!(format_outreach_email(&prospect), format_outreach_email(&prospect));
    }

    #[test]
    fn test_custom_agency() {
        let template = OutreachTemplate::new("Acme Digital", "acme.example");
        let email = template.render(&dana());

        assert!(email.contains("At Acme Digital, we specialise"));
        assert!(email.ends_with("Acme Digital Team\nacme.example"));
    }

    #[test]
    fn test_short_lists_and_single_token_name() {
        let mut prospect = dana();
        prospect.contact_name = "Cher".to_string();
        prospect.digital_gaps = vec!["Slow site".to_string()];
        prospect.recommended_services = vec![];

        let email = format_outreach_email(&prospect);
        assert!(email.contains("Hi Cher,"));
        assert!(email.contains("I noticed slow site — areas"));
        assert!(email.contains("exploring  as a starting point"));
    }
}
