//! Academic self-assessment: validate the form, score it against the
//! depression predictor, then ask the language model for a narrative report.

use std::collections::HashMap;

use axum::{extract::State, Extension, Json};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::state::AppState;

use super::HIGH_RISK_THRESHOLD;

/// Report line the model is asked to emit verbatim; parsed back out below.
static STRESS_PROBABILITY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"Academic Stress Probability: (\d+\.?\d*)%").unwrap());

const REPORT_MAX_TOKENS: u32 = 500;

const FALLBACK_REPORT: &str = "We were unable to generate a detailed report at this time. \
However, based on the prediction model's output, we recommend reaching out to a mental \
health professional for a comprehensive assessment and support.";

#[derive(Debug, Deserialize)]
pub struct AcademicForm {
    pub age: f64,
    pub academic_pressure: f64,
    pub cgpa: f64,
    pub study_satisfaction: f64,
    pub dietary_habits: f64,
    pub degree: String,
    pub suicidal_thoughts: String,
    pub work_study_hours: f64,
    pub fatigue_index: f64,
    pub stress_risk_score: f64,
}

/// Wire payload for the predictor service, keyed by its training-set
/// column names.
#[derive(Debug, Serialize)]
struct PredictorFeatures {
    #[serde(rename = "Age")]
    age: f64,
    #[serde(rename = "Academic Pressure")]
    academic_pressure: f64,
    #[serde(rename = "CGPA")]
    cgpa: f64,
    #[serde(rename = "Study Satisfaction")]
    study_satisfaction: f64,
    #[serde(rename = "Dietary Habits")]
    dietary_habits: f64,
    #[serde(rename = "Degree")]
    degree: String,
    #[serde(rename = "Have you ever had suicidal thoughts ?")]
    suicidal_thoughts: String,
    #[serde(rename = "Work/Study Hours")]
    work_study_hours: f64,
    #[serde(rename = "Fatigue Index")]
    fatigue_index: f64,
    #[serde(rename = "Stress Risk Score")]
    stress_risk_score: f64,
}

#[derive(Debug, Serialize)]
pub struct AcademicResponse {
    pub prediction: String,
    pub probability: f64,
    pub academic_stress_probability: f64,
    pub high_risk: bool,
    pub report: String,
}

fn validate(form: &AcademicForm) -> Result<(), ApiError> {
    let mut errors: HashMap<String, String> = HashMap::new();

    let mut check_range = |field: &str, value: f64, min: f64, max: f64| {
        if !(min..=max).contains(&value) || !value.is_finite() {
            errors.insert(
                field.to_string(),
                format!("must be between {} and {}", min, max),
            );
        }
    };

    check_range("age", form.age, 10.0, 100.0);
    check_range("academic_pressure", form.academic_pressure, 0.0, 5.0);
    check_range("cgpa", form.cgpa, 0.0, 10.0);
    check_range("study_satisfaction", form.study_satisfaction, 0.0, 5.0);
    check_range("dietary_habits", form.dietary_habits, 0.0, 5.0);
    check_range("work_study_hours", form.work_study_hours, 0.0, 24.0);
    check_range("fatigue_index", form.fatigue_index, 0.0, 10.0);
    check_range("stress_risk_score", form.stress_risk_score, 0.0, 100.0);

    if !matches!(form.degree.as_str(), "Bachelors" | "Masters" | "PhD") {
        errors.insert(
            "degree".to_string(),
            "must be one of Bachelors, Masters, PhD".to_string(),
        );
    }
    if !matches!(form.suicidal_thoughts.as_str(), "Yes" | "No") {
        errors.insert(
            "suicidal_thoughts".to_string(),
            "must be Yes or No".to_string(),
        );
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(ApiError::ValidationError {
            message: "Invalid academic assessment data".to_string(),
            field_errors: Some(errors),
        })
    }
}

fn report_prompt(form: &AcademicForm, prediction: &str, probability: f64) -> String {
    format!(
        "You are a mental health expert. Based on the following academic-related data and a \
machine learning model's prediction, generate a detailed report assessing the user's mental \
health and providing recommendations.\n\n\
User Input:\n\
- Age: {}\n\
- Academic Pressure: {}\n\
- CGPA: {}\n\
- Study Satisfaction: {}\n\
- Dietary Habits: {}\n\
- Degree: {}\n\
- Have you ever had suicidal thoughts ?: {}\n\
- Work/Study Hours: {}\n\
- Fatigue Index: {}\n\
- Stress Risk Score: {}\n\n\
Machine Learning Prediction:\n\
- Depression Risk: {}\n\
- Probability of Depression: {:.2}%\n\n\
Provide a detailed analysis of the user's mental health based on this data. Structure your \
response with the following sections:\n\
- **Summary of Academic Stress:** Describe the user's stress levels related to academics.\n\
- **Risk Factors:** Highlight concerning patterns or behaviors.\n\
- **Protective Factors:** Identify positive or adaptive behaviors.\n\
- **Academic Stress Probability:** Estimate the probability of academic stress (0-100%) based \
on the data and include it in the format 'Academic Stress Probability: X%' (e.g., 'Academic \
Stress Probability: 75%').\n\
- **Recommendations:** Offer actionable advice to manage academic stress.\n\n\
Ensure that the 'Academic Stress Probability: X%' line is included exactly as specified, with \
a numeric value between 0 and 100, followed by a '%' sign. Be empathetic, professional, and \
supportive in your tone.",
        form.age,
        form.academic_pressure,
        form.cgpa,
        form.study_satisfaction,
        form.dietary_habits,
        form.degree,
        form.suicidal_thoughts,
        form.work_study_hours,
        form.fatigue_index,
        form.stress_risk_score,
        prediction,
        probability * 100.0,
    )
}

/// Pull the model's self-reported stress probability back out of the report,
/// falling back to the predictor's probability when the line is missing.
fn extract_stress_probability(report: &str, model_probability: f64) -> f64 {
    STRESS_PROBABILITY_RE
        .captures(report)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse::<f64>().ok())
        .unwrap_or_else(|| {
            tracing::warn!("report missing stress probability line, using model probability");
            model_probability * 100.0
        })
}

/// POST /api/academic/predict
pub async fn predict(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(form): Json<AcademicForm>,
) -> ApiResult<AcademicResponse> {
    validate(&form)?;

    let features = PredictorFeatures {
        age: form.age,
        academic_pressure: form.academic_pressure,
        cgpa: form.cgpa,
        study_satisfaction: form.study_satisfaction,
        dietary_habits: form.dietary_habits,
        degree: form.degree.clone(),
        suicidal_thoughts: form.suicidal_thoughts.clone(),
        work_study_hours: form.work_study_hours,
        fatigue_index: form.fatigue_index,
        stress_risk_score: form.stress_risk_score,
    };
    let prediction = state.predictor.predict_depression(&features).await?;

    tracing::info!(
        user_id = %user.user_id,
        prediction = %prediction.prediction,
        probability = prediction.probability,
        "academic prediction complete"
    );

    let prompt = report_prompt(&form, &prediction.prediction, prediction.probability);
    let report = match state
        .openrouter
        .chat(&prompt, REPORT_MAX_TOKENS)
        .await
    {
        Ok(text) if !text.is_empty() => text,
        Ok(_) => FALLBACK_REPORT.to_string(),
        Err(err) => {
            tracing::warn!(error = %err, "report generation failed, using fallback");
            FALLBACK_REPORT.to_string()
        }
    };

    let academic_stress_probability =
        extract_stress_probability(&report, prediction.probability);
    let high_risk = academic_stress_probability >= HIGH_RISK_THRESHOLD
        || prediction.prediction == "Depression";

    Ok(ApiResponse::success(AcademicResponse {
        prediction: prediction.prediction,
        probability: prediction.probability,
        academic_stress_probability,
        high_risk,
        report,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_form() -> AcademicForm {
        AcademicForm {
            age: 21.0,
            academic_pressure: 4.0,
            cgpa: 7.5,
            study_satisfaction: 2.0,
            dietary_habits: 3.0,
            degree: "Bachelors".to_string(),
            suicidal_thoughts: "No".to_string(),
            work_study_hours: 9.0,
            fatigue_index: 6.0,
            stress_risk_score: 55.0,
        }
    }

    #[test]
    fn accepts_a_valid_form() {
        assert!(validate(&valid_form()).is_ok());
    }

    #[test]
    fn rejects_out_of_range_and_unknown_degree() {
        let mut form = valid_form();
        form.age = 7.0;
        form.degree = "Diploma".to_string();

        let err = validate(&form).unwrap_err();
        match err {
            ApiError::ValidationError { field_errors, .. } => {
                let errors = field_errors.unwrap();
                assert!(errors.contains_key("age"));
                assert!(errors.contains_key("degree"));
                assert_eq!(errors.len(), 2);
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn rejects_non_finite_values() {
        let mut form = valid_form();
        form.cgpa = f64::NAN;
        assert!(validate(&form).is_err());
    }

    #[test]
    fn extracts_probability_from_report() {
        let report = "...\nAcademic Stress Probability: 72.5%\n...";
        assert_eq!(extract_stress_probability(report, 0.4), 72.5);
    }

    #[test]
    fn falls_back_to_model_probability() {
        assert_eq!(extract_stress_probability("no line here", 0.4), 40.0);
    }

    #[test]
    fn prompt_demands_the_probability_line() {
        let prompt = report_prompt(&valid_form(), "No Depression", 0.12);
        assert!(prompt.contains("Academic Stress Probability: X%"));
        assert!(prompt.contains("Probability of Depression: 12.00%"));
    }
}
