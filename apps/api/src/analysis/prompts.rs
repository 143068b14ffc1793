// Prompt constants for the fit report.

/// Fit report prompt template. Replace `{jd_text}` and `{resume_text}` before sending.
pub const FIT_REPORT_PROMPT_TEMPLATE: &str = r#"You are an experienced technical recruiter and resume strategist.
Evaluate the RESUME against the JOB DESCRIPTION and write a concise fit report in Markdown.

Structure the report exactly as follows:

## Overall Fit Score
A single score out of 100, followed by a one-sentence verdict.

## Strong Matches
Bullet list of requirements the resume clearly satisfies, citing the evidence.

## Partial Matches
Bullet list of requirements the resume only partly covers, and what is missing.

## Gaps
Bullet list of hard requirements with no supporting evidence in the resume.

## Recommendations
Up to five concrete edits that would improve the resume for this role.
Only suggest changes the candidate could truthfully make — never invent experience.

JOB DESCRIPTION:
{jd_text}

RESUME:
{resume_text}"#;
