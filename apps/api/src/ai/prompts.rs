// Prompt templates for the AI gateway. Placeholders in `{braces}` are replaced
// verbatim with caller-supplied text before sending.

pub const RESUME_SCORE_PROMPT: &str = r#"You are a professional resume reviewer. Analyze this resume and provide feedback.

Resume:
{resume_text}

{format_instruction}
{
  "score": <number 1-10>,
  "strengths": [<list 3 strengths as strings>],
  "weaknesses": [<list 3 areas to improve as strings>],
  "suggestions": [<list 3 actionable improvements as strings>],
  "atsScore": <number 1-10 for ATS compatibility>,
  "summary": "<2-3 sentence overall assessment>"
}"#;

pub const SKILL_MATCH_PROMPT: &str = r#"Analyze how well a candidate matches a job position.

Candidate Skills:
{candidate_skills}

Job Title: {job_title}

Job Description:
{job_description}

{format_instruction}
{
  "matchPercentage": <number 0-100>,
  "matchLevel": "<High, Medium, or Low>",
  "matchedSkills": [<list of skills candidate has that match the job>],
  "missingSkills": [<list of required skills candidate lacks>],
  "strengths": [<list 2-3 reasons why candidate is good fit>],
  "gaps": [<list 2-3 skill gaps to address>],
  "recommendations": [<list 2-3 actionable steps to improve candidacy>]
}"#;

pub const CANDIDATE_MATCH_PROMPT: &str = r#"You are an experienced technical recruiter. Evaluate how well this candidate's resume fits the job posting.

Job Title: {job_title}

Job Description:
{job_description}

Candidate Resume:
{resume_text}

{format_instruction}
{
  "matchPercentage": <number 0-100>,
  "matchLevel": "<High, Medium, or Low>",
  "summary": "<2-3 sentence assessment of the fit>",
  "keyStrengths": [<list 3 strengths relevant to this job>],
  "keyConcerns": [<list 2-3 concerns or missing qualifications>],
  "recommendation": "<one of: Strongly Recommend, Recommend, Consider, Not Recommended>"
}"#;

pub const JOB_DESCRIPTION_PROMPT: &str = r#"You are an expert recruiter writing a job posting.

Job Title: {job_title}

Requirements provided by the recruiter:
{requirements}

Skills provided by the recruiter:
{skills}

Write a professional, inclusive job description for this role. The description may use simple HTML tags (<p>, <ul>, <li>, <strong>).

{format_instruction}
{
  "description": "<full job description>",
  "keyRequirements": [<list 4-6 key requirements as strings>],
  "suggestedSkills": [<list 5-8 relevant skills as strings>],
  "tips": [<list 2-3 tips for attracting strong candidates>]
}"#;

pub const CANDIDATE_SUMMARY_PROMPT: &str = r#"You are a recruiter preparing a quick brief on a candidate.

Candidate Name: {candidate_name}

Resume:
{resume_text}

{format_instruction}
{
  "summary": "<2-3 sentence overview of the candidate>",
  "experienceLevel": "<Entry, Mid, Senior, or Lead>",
  "topSkills": [<list 5 strongest skills as strings>],
  "education": "<highest degree and institution, or Not specified>",
  "yearsOfExperience": <number of years of professional experience>
}"#;
