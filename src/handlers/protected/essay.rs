//! Essay analysis: three free-text answers go straight to the language
//! model, which returns a narrative report with an embedded probability.

use axum::{extract::State, Extension, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::HIGH_RISK_THRESHOLD;

static DEPRESSION_PROBABILITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Depression Probability: (\d+\.?\d*)%").unwrap());

const REPORT_MAX_TOKENS: u32 = 1000;

/// Used when the model echoes a report without the probability line.
const FALLBACK_PROBABILITY: f64 = 50.0;

const FALLBACK_REPORT: &str = "We were unable to generate a detailed report at this time. \
We recommend reaching out to a mental health professional for a comprehensive assessment \
and support.";

#[derive(Debug, Deserialize)]
pub struct EssayForm {
    #[serde(rename = "Q1")]
    pub q1: String,
    #[serde(rename = "Q2")]
    pub q2: String,
    #[serde(rename = "Q3")]
    pub q3: String,
}

#[derive(Debug, Serialize)]
pub struct EssayResponse {
    pub report: String,
    pub probability: f64,
    pub high_risk: bool,
}

fn validate(form: &EssayForm) -> Result<(), ApiError> {
    for (name, answer) in [("Q1", &form.q1), ("Q2", &form.q2), ("Q3", &form.q3)] {
        if answer.trim().is_empty() {
            return Err(ApiError::bad_request(format!(
                "Missing or invalid response for {name}"
            )));
        }
    }
    Ok(())
}

fn analysis_prompt(form: &EssayForm) -> String {
    format!(
        "You are an expert mental health analysis model trained to assess emotional well-being \
based on a person's written responses. Given the following responses, analyze them in detail \
and provide a comprehensive report on the user's mental health, including a probability \
estimate of depression.\n\n\
### Instructions:\n\
1. **Emotional Analysis:** Identify emotional patterns, signs of sadness, numbness, or frustration.\n\
2. **Linguistic and Cognitive Patterns:** Analyze tone, self-referential language, and cognitive distortions.\n\
3. **Behavioral and Motivation Indicators:** Detect changes in habits, social withdrawal, and motivation loss.\n\
4. **Coping Mechanisms:** Evaluate adaptive vs. maladaptive coping strategies.\n\
5. **Overall Assessment:** Provide a detailed report with the following sections:\n\
   - **Summary of Emotional State:** Describe the user's emotional well-being.\n\
   - **Risk Factors:** Highlight any concerning patterns or behaviors.\n\
   - **Protective Factors:** Identify any positive or adaptive behaviors.\n\
   - **Depression Probability:** Provide a probability score (0-100%) with supporting \
observations in the format \"Depression Probability: X%\".\n\
   - **Recommendations:** Offer actionable advice to improve mental well-being.\n\
6. Be empathetic, professional, and supportive in your tone.\n\
7. Ensure that the 'Depression Probability: X%' line is included exactly as specified, with a \
numeric value between 0 and 100, followed by a '%' sign.\n\n\
### User Responses:\n\
- **Q1:** {}\n\
- **Q2:** {}\n\
- **Q3:** {}\n\n\
Now, perform the detailed analysis and provide a comprehensive report as a single string.",
        form.q1, form.q2, form.q3,
    )
}

fn extract_probability(report: &str) -> f64 {
    DEPRESSION_PROBABILITY_RE
        .captures(report)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or_else(|| {
            tracing::warn!("report missing probability line, using default");
            FALLBACK_PROBABILITY
        })
}

/// POST /api/essay/analyze
pub async fn analyze(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<EssayForm>,
) -> ApiResult<EssayResponse> {
    validate(&form)?;

    let report = match state
        .openrouter
        .chat(&analysis_prompt(&form), REPORT_MAX_TOKENS)
        .await
    {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => FALLBACK_REPORT.to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "essay analysis failed, using fallback");
            FALLBACK_REPORT.to_string()
        }
    };

    let probability = extract_probability(&report);
    tracing::info!(user_id = %user.user_id, probability, "essay analysis complete");

    Ok(ApiResponse::success(EssayResponse {
        report,
        probability,
        high_risk: probability >= HIGH_RISK_THRESHOLD,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(q1: &str, q2: &str, q3: &str) -> EssayForm {
        EssayForm {
            q1: q1.to_string(),
            q2: q2.to_string(),
            q3: q3.to_string(),
        }
    }

    #[test]
    fn rejects_blank_answers() {
        let err = validate(&form("fine", "   ", "ok")).unwrap_err();
        match err {
            ApiError::BadRequest(message) => {
                assert!(message.contains("Q2"));
            }
            other => panic!("expected bad request, got {other:?}"),
        }
    }

    #[test]
    fn accepts_filled_answers() {
        assert!(validate(&form("a", "b", "c")).is_ok());
    }

    #[test]
    fn extracts_probability() {
        assert_eq!(extract_probability("Depression Probability: 32%"), 32.0);
        assert_eq!(extract_probability("Depression Probability: 81.5%"), 81.5);
    }

    #[test]
    fn falls_back_when_line_missing() {
        assert_eq!(extract_probability("no structured line"), 50.0);
    }

    #[test]
    fn prompt_includes_all_answers() {
        let prompt = analysis_prompt(&form("one", "two", "three"));
        assert!(prompt.contains("**Q1:** one"));
        assert!(prompt.contains("**Q3:** three"));
    }
}
