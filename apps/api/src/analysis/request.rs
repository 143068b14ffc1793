//! The immutable payload of one analysis run.

use crate::analysis::prompts::FIT_REPORT_PROMPT_TEMPLATE;

/// JD text, resume text and the rendered prompt. Fields are private so the
/// prompt always matches the two inputs it was built from.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    jd_text: String,
    resume_text: String,
    prompt: String,
}

impl AnalysisRequest {
    pub fn new(jd_text: impl Into<String>, resume_text: impl Into<String>) -> Self {
        let jd_text = jd_text.into();
        let resume_text = resume_text.into();
        let prompt = build_prompt(&jd_text, &resume_text);
        Self {
            jd_text,
            resume_text,
            prompt,
        }
    }

    pub fn jd_text(&self) -> &str {
        &self.jd_text
    }

    pub fn resume_text(&self) -> &str {
        &self.resume_text
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

/// Fills the template. The resume is substituted last so a JD containing the
/// literal `{resume_text}` cannot pull the resume in twice.
fn build_prompt(jd_text: &str, resume_text: &str) -> String {
    let (head, tail) = FIT_REPORT_PROMPT_TEMPLATE
        .split_once("{resume_text}")
        .unwrap_or((FIT_REPORT_PROMPT_TEMPLATE, ""));
    format!(
        "{}{}{}",
        head.replace("{jd_text}", jd_text.trim()),
        resume_text.trim(),
        tail
    )
}
