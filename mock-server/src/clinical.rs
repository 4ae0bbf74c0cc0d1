//! Derived values the backend computes: pregnancy week, age in months,
//! vaccination schedule and status, growth figures and screening scores.

use chrono::{Days, NaiveDate};
use serde_json::{Map, Value};

/// `(name, code, days after birth)` for the national immunization schedule.
pub const VACCINATION_SCHEDULE: &[(&str, &str, u64)] = &[
    ("BCG", "BCG", 0),
    ("OPV 0", "OPV0", 0),
    ("OPV 1", "OPV1", 42),
    ("DPT-HepB-Hib 1", "PENTA1", 42),
    ("PCV 1", "PCV1", 42),
    ("Rota 1", "ROTA1", 42),
    ("OPV 2", "OPV2", 70),
    ("DPT-HepB-Hib 2", "PENTA2", 70),
    ("PCV 2", "PCV2", 70),
    ("Rota 2", "ROTA2", 70),
    ("OPV 3", "OPV3", 98),
    ("DPT-HepB-Hib 3", "PENTA3", 98),
    ("PCV 3", "PCV3", 98),
    ("IPV", "IPV", 98),
    ("Measles-Rubella 1", "MR1", 270),
    ("Yellow Fever", "YF", 270),
    ("Measles-Rubella 2", "MR2", 540),
    ("DPT Booster", "DPT_BOOSTER", 540),
];

const TERM_DAYS: i64 = 280;

/// Gestational week for a due date, clamped to 1..=42.
pub fn pregnancy_week(due_date: NaiveDate, today: NaiveDate) -> i64 {
    let conception = due_date - chrono::Duration::days(TERM_DAYS);
    ((today - conception).num_days().div_euclid(7)).clamp(1, 42)
}

pub fn weeks_remaining(due_date: NaiveDate, today: NaiveDate) -> i64 {
    ((due_date - today).num_days() / 7).max(0)
}

pub fn trimester(week: i64) -> i64 {
    if week <= 12 {
        1
    } else if week <= 27 {
        2
    } else {
        3
    }
}

/// Whole 30-day months since birth.
pub fn age_months(birth_date: NaiveDate, today: NaiveDate) -> i64 {
    ((today - birth_date).num_days() / 30).max(0)
}

pub fn scheduled_date(birth_date: NaiveDate, days_from_birth: u64) -> NaiveDate {
    birth_date
        .checked_add_days(Days::new(days_from_birth))
        .unwrap_or(birth_date)
}

/// Completed once administered; due up to 30 days late, overdue after.
pub fn vaccination_status(scheduled: NaiveDate, administered: Option<NaiveDate>, today: NaiveDate) -> &'static str {
    if administered.is_some() {
        "completed"
    } else if today > scheduled {
        if (today - scheduled).num_days() > 30 {
            "overdue"
        } else {
            "due"
        }
    } else {
        "pending"
    }
}

pub fn bmi(weight: Option<f64>, height: Option<f64>) -> Option<f64> {
    match (weight, height) {
        (Some(weight), Some(height)) if height > 0.0 => {
            let meters = height / 100.0;
            Some((weight / (meters * meters) * 100.0).round() / 100.0)
        }
        _ => None,
    }
}

// Logistic approximation of the standard normal CDF.
fn norm_cdf(z: f64) -> f64 {
    1.0 / (1.0 + (-1.702 * z).exp())
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Simplified weight-for-age percentile.
pub fn weight_percentile(age_months: i64, weight: f64, male: bool) -> f64 {
    let age = age_months as f64;
    let expected = if male { 3.3 + age * 0.6 } else { 3.2 + age * 0.55 };
    round1(norm_cdf((weight - expected) / (expected * 0.15)) * 100.0)
}

/// Simplified length-for-age percentile.
pub fn height_percentile(age_months: i64, height: f64, male: bool) -> f64 {
    let age = age_months as f64;
    let expected = if male { 50.0 + age * 1.8 } else { 49.5 + age * 1.75 };
    round1(norm_cdf((height - expected) / (expected * 0.1)) * 100.0)
}

pub fn growth_alerts(name: &str, weight_percentile: Option<f64>, height_percentile: Option<f64>) -> Vec<String> {
    let mut alerts = Vec::new();
    match weight_percentile {
        Some(p) if p < 3.0 => alerts.push(format!("{name}: weight is below the 3rd percentile")),
        Some(p) if p > 97.0 => alerts.push(format!("{name}: weight is above the 97th percentile")),
        _ => {}
    }
    if height_percentile.is_some_and(|p| p < 3.0) {
        alerts.push(format!("{name}: length is below the 3rd percentile"));
    }
    alerts
}

pub fn baby_size(week: i64) -> &'static str {
    const SIZES: &[(i64, &str)] = &[
        (40, "watermelon"),
        (36, "cantaloupe"),
        (32, "squash"),
        (28, "eggplant"),
        (24, "ear of corn"),
        (20, "banana"),
        (16, "avocado"),
        (12, "lime"),
        (10, "strawberry"),
        (8, "raspberry"),
        (6, "lentil"),
        (4, "poppy seed"),
    ];
    SIZES
        .iter()
        .find(|(from, _)| week >= *from)
        .map_or("tiny seed", |(_, size)| *size)
}

pub fn common_symptoms(trimester: i64) -> Vec<String> {
    let symptoms: &[&str] = match trimester {
        1 => &["Morning sickness", "Fatigue", "Breast tenderness", "Frequent urination"],
        2 => &["Increased energy", "Growing belly", "Back pain", "Heartburn"],
        _ => &["Braxton Hicks contractions", "Shortness of breath", "Swelling", "Frequent urination"],
    };
    symptoms.iter().map(|s| s.to_string()).collect()
}

pub fn pregnancy_tips(trimester: i64) -> Vec<String> {
    let tips: &[&str] = match trimester {
        1 => &[
            "Take prenatal vitamins with folic acid",
            "Avoid alcohol, smoking, and raw foods",
            "Get plenty of rest",
            "Stay hydrated",
        ],
        2 => &[
            "Start monitoring baby movements",
            "Eat iron-rich foods",
            "Stay active with gentle exercise",
        ],
        _ => &[
            "Prepare your birth plan",
            "Pack a hospital bag",
            "Know the signs of labour",
        ],
    };
    tips.iter().map(|s| s.to_string()).collect()
}

pub fn recommended_appointments(week: i64) -> Vec<String> {
    let mut appointments = Vec::new();
    if week <= 12 {
        appointments.push("First antenatal visit".to_string());
    }
    if (18..=22).contains(&week) {
        appointments.push("Anatomy ultrasound".to_string());
    }
    if (24..=28).contains(&week) {
        appointments.push("Glucose screening".to_string());
    }
    if week >= 36 {
        appointments.push("Weekly antenatal checkup".to_string());
    }
    appointments
}

/// `(symptom, urgency, action)` rows served by `/pregnancy/danger-signs`.
pub const DANGER_SIGNS: &[(&str, &str, &str)] = &[
    ("Vaginal bleeding", "high", "Go to the hospital immediately"),
    ("Severe headache with blurred vision", "high", "Go to the hospital immediately"),
    ("Convulsions or fits", "high", "Call for emergency help"),
    ("Severe abdominal pain", "high", "Go to the hospital immediately"),
    ("Fever above 38°C", "medium", "Visit a health facility within 24 hours"),
    ("Reduced baby movements", "medium", "Visit a health facility today"),
    ("Swelling of face and hands", "medium", "Visit a health facility today"),
];

/// Screening score, clamped to the instrument's range.
pub fn assessment_score(assessment_type: &str, responses: &Map<String, Value>) -> i64 {
    let total: i64 = responses.values().filter_map(Value::as_i64).sum();
    let max = match assessment_type {
        "epds" => 30,
        "gad7" => 21,
        "phq9" => 27,
        _ => return 0,
    };
    total.clamp(0, max)
}

pub fn risk_level(assessment_type: &str, score: i64) -> &'static str {
    match assessment_type {
        "epds" => match score {
            13.. => "high",
            10.. => "moderate",
            _ => "low",
        },
        "gad7" => match score {
            15.. => "high",
            10.. => "moderate",
            5.. => "low",
            _ => "minimal",
        },
        "phq9" => match score {
            20.. => "high",
            15.. => "moderate",
            10.. => "low",
            _ => "minimal",
        },
        _ => "low",
    }
}

pub fn recommendations(risk_level: &str) -> &'static str {
    match risk_level {
        "high" => "Please consider speaking with a healthcare professional immediately. Your responses indicate you may benefit from professional support.",
        "moderate" => "Consider discussing your feelings with a healthcare provider at your next visit.",
        _ => "Continue looking after yourself and reach out if anything changes.",
    }
}
