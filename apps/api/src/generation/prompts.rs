// Prompt templates for prior authorization generation.
// Placeholders are `{snake_case}` names filled by `renderer::fill_template`.

/// Placeholder written for optional fields the GP left empty.
pub const NOT_PROVIDED: &str = "[not provided]";

/// Full form prompt. Every field value is interpolated verbatim.
pub const FORM_PROMPT_TEMPLATE: &str = r#"You are a Dutch AI assistant for general practitioners. Complete this prior authorization form for {insurer} using exactly the layout below. Keep every value that is already filled in; replace each [Auto] with content derived from the clinical note.

Request date: {generated_at}

=== PATIENT ===
Name: {full_name}
Date of birth: {birth_date}
Insurance number: {identifier}
Insurer: {insurer}
Phone: {phone}
E-mail: {email}

=== REQUEST ===
Treatment type: {request_type}
Urgency: {urgency}
Frequency: [Auto]
Expected duration: [Auto]
Alternatives tried: [Auto]

=== MEDICAL INDICATION ===
Diagnostic code (ICPC): {diagnostic_code} - {diagnostic_label}
Symptoms: {note}
Relevant medical history: [Auto]

=== JUSTIFICATION ===
Medical necessity: [Concise motivation]

{marker_instruction}
{terminology_instruction}"#;

/// Note-only prompt: the model fills every field from a free-text note.
pub const NOTE_PROMPT_TEMPLATE: &str = r#"You are a Dutch AI assistant for general practitioners. Fill in this prior authorization form using the layout below.

=== PATIENT ===
Name: [Auto]
Age: [Auto]
Insurance number: [Auto]
Insurer: [Health insurer]

=== MEDICAL INDICATION ===
Primary diagnosis: [DIAGNOSIS]
ICPC code: [Auto]
Symptoms: {note}
Relevant medical history: [Auto]
Urgency: [Low/Medium/High]

=== REQUEST ===
Treatment type: [MRI/Physiotherapy/etc.]
Frequency: [1x/week etc.]
Expected duration: [Number of weeks]
Alternatives tried: [Auto]

=== JUSTIFICATION ===
Medical necessity: [Concise motivation]

{marker_instruction}
{terminology_instruction}"#;
