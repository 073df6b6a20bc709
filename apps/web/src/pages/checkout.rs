//! Mock subscription checkout. No payment is taken; confirming with the
//! terms accepted just sends the admin back to the console.

use serde::{de, Deserialize, Deserializer, Serialize};
use tracing::info;

use crate::errors::AppError;
use crate::pages::admin::CHECKOUT_SUCCESS_STATUS;

pub const DEFAULT_PLAN: &str = "growth";

#[derive(Debug, PartialEq, Eq)]
pub struct Plan {
    pub slug: &'static str,
    pub title: &'static str,
    pub price: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
}

pub const PLANS: &[Plan] = &[
    Plan {
        slug: "starter",
        title: "Starter",
        price: "USD 1,250 / month",
        description: "Perfect for pilot teams that want curated insights and quizzes for up to 250 employees.",
        features: &[
            "250 seats across 2 departments",
            "Weekly AI-curated highlight packs",
            "Adaptive quizzes with review hints",
            "Email analytics for managers",
        ],
    },
    Plan {
        slug: "growth",
        title: "Growth",
        price: "USD 3,400 / month",
        description: "Scale learning across regions with full automation, transcripts, and analytics integrations.",
        features: &[
            "1,200 seats with regional segmentation",
            "Unlimited content sources + Azure transcripts",
            "Animated summaries with ElevenLabs narration",
            "Salesforce and Slack analytics connectors",
        ],
    },
    Plan {
        slug: "enterprise",
        title: "Enterprise",
        price: "Custom pricing",
        description: "Tailored for global rollouts that require advanced security, SSO, and dedicated support.",
        features: &[
            "Unlimited seats with role-based pathways",
            "Dedicated knowledge curator & quarterly workshops",
            "SSO, SCIM, and audit logging included",
            "Priority roadmap shaping and white-glove onboarding",
        ],
    },
];

/// Case-insensitive lookup; unknown or missing slugs resolve to the growth plan.
pub fn resolve_plan(slug: Option<&str>) -> &'static Plan {
    let wanted = slug.map(str::trim).filter(|s| !s.is_empty());
    wanted
        .and_then(|s| PLANS.iter().find(|p| p.slug.eq_ignore_ascii_case(s)))
        .or_else(|| PLANS.iter().find(|p| p.slug == DEFAULT_PLAN))
        .unwrap_or(&PLANS[0])
}

pub fn checkout_href(slug: &str) -> String {
    format!("/admin/checkout?plan={slug}")
}

#[derive(Debug, Clone, Serialize)]
pub struct PlanOption {
    pub slug: &'static str,
    pub title: &'static str,
    pub price: &'static str,
    pub checkout_href: String,
}

/// GET /admin/plans
pub fn plan_options() -> Vec<PlanOption> {
    PLANS
        .iter()
        .map(|p| PlanOption {
            slug: p.slug,
            title: p.title,
            price: p.price,
            checkout_href: checkout_href(p.slug),
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutView {
    pub plan: &'static str,
    pub title: String,
    pub plan_title: &'static str,
    pub price: &'static str,
    pub description: &'static str,
    pub features: &'static [&'static str],
    pub submit_label: String,
    pub back_href: &'static str,
}

/// GET /admin/checkout?plan=<slug>
pub fn checkout_view(slug: Option<&str>) -> CheckoutView {
    let plan = resolve_plan(slug);
    CheckoutView {
        plan: plan.slug,
        title: format!("Complete your {} subscription", plan.title),
        plan_title: plan.title,
        price: plan.price,
        description: plan.description,
        features: plan.features,
        submit_label: format!("Subscribe to {}", plan.title),
        back_href: "/admin",
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutConfirm {
    pub plan: Option<String>,
    /// An unchecked box is simply absent from the form.
    #[serde(default, deserialize_with = "checkbox")]
    pub accepted_terms: bool,
}

/// Browsers post `on` for a checked box without a `value`; `true`/`false`
/// are accepted as well.
fn checkbox<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "1" | "yes" => Ok(true),
        "off" | "false" | "0" | "no" | "" => Ok(false),
        other => Err(de::Error::invalid_value(
            de::Unexpected::Str(other),
            &"a checkbox value such as `on`",
        )),
    }
}

/// POST /admin/checkout: returns where to send the admin next.
pub fn confirm_checkout(request: &CheckoutConfirm) -> Result<String, AppError> {
    if !request.accepted_terms {
        return Err(AppError::Validation(
            "The subscription agreement must be accepted".to_string(),
        ));
    }
    let plan = resolve_plan(request.plan.as_deref());
    info!(plan = plan.slug, "mock checkout confirmed");
    Ok(format!("/admin?status={CHECKOUT_SUCCESS_STATUS}"))
}
