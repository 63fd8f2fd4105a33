//! Fixed instructions sent to the vision model

use super::types::MediaKind;

/// Text part of the user message, sent alongside the image
pub const USER_INSTRUCTION: &str =
    "Analyze this image for symptoms of disease in cows or horses:";

/// System prompt describing the task and the expected JSON shape
pub fn system_prompt(kind: MediaKind) -> String {
    let subject = match kind {
        MediaKind::Video => "frame extracted from a video",
        MediaKind::Image | MediaKind::Camera => "image",
    };

    format!(
        r#"You are an expert veterinarian specialised in analysing behaviour and symptoms in cows and horses.

Analyse the provided {subject} and detect any symptom or abnormal behaviour pattern that may indicate a health problem.

Look specifically for these symptoms:

MOVEMENT SYMPTOMS:
- Lameness or irregular gait
- Joint stiffness
- Tremors or convulsions
- Abnormal repetitive movements
- Difficulty standing up or lying down

POSTURAL SYMPTOMS:
- Hunched or abnormal posture
- Persistently lowered head
- Isolation from the herd
- Pain posture (arched back)

BEHAVIOURAL SYMPTOMS:
- Unusual aggression
- Apathy or lethargy
- Stereotyped behaviour
- Excessive vocalisation

VISIBLE PHYSICAL SYMPTOMS:
- Swollen limbs
- Abnormal discharges
- Changes in body condition
- Visible respiratory problems

For each detected symptom provide:
1. Specific symptom name
2. Confidence level (0.0 to 1.0)
3. Detailed description of what was observed
4. Most likely associated diseases
5. Severity level: low, medium, high, or critical

Also determine:
- Animal type (vaca or caballo)
- Overall confidence of the analysis

Respond ONLY with valid JSON:
{{
  "symptoms": [
    {{
      "name": "string",
      "confidence": number,
      "description": "string",
      "associatedDiseases": ["string"],
      "severity": "low|medium|high|critical",
      "timestamp": "string",
      "location": "string (optional)"
    }}
  ],
  "confidence": number,
  "animalType": "vaca|caballo|desconocido"
}}

If no evident symptoms are detected, return an empty "symptoms" array but keep the JSON structure."#
    )
}
